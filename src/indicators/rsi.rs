// =============================================================================
// Relative Strength Index (RSI): simple rolling averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute price changes (deltas) from consecutive closes.
// Step 2: Split deltas into gains (max(d, 0)) and losses (max(-d, 0)).
// Step 3: Average gains and losses over the trailing `period` deltas with a
//          plain rolling mean (no Wilder smoothing).
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Zero-loss policy: when the average loss is zero RS is treated as infinite
// and RSI is 100, including a perfectly flat window.
// =============================================================================

/// Compute the RSI history for `closes`, aligned index-for-index with the
/// input.
///
/// Entry `i` is `Some` once `period` deltas ending at close `i` exist, i.e.
/// from index `period` onward.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - Non-finite averages yield `None` for that index only.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return result;
    }

    let gains: Vec<f64> = closes.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();
    let losses: Vec<f64> = closes.windows(2).map(|w| (w[0] - w[1]).max(0.0)).collect();

    let period_f = period as f64;
    for end in period..=gains.len() {
        let avg_gain = gains[end - period..end].iter().sum::<f64>() / period_f;
        let avg_loss = losses[end - period..end].iter().sum::<f64>() / period_f;
        // Delta `end - 1` belongs to close `end`.
        result[end] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

/// Most recent RSI value, or `None` with fewer than `period + 1` closes.
pub fn current_rsi(closes: &[f64], period: usize) -> Option<f64> {
    calculate_rsi(closes, period).last().copied().flatten()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0 // No losses in the window, flat windows included.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
        assert!(current_rsi(&[], 14).is_none());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(calculate_rsi(&[1.0, 2.0, 3.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_insufficient_data() {
        // 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(current_rsi(&closes, 14).is_none());
        let closes: Vec<f64> = (1..=15).map(|x| x as f64).collect();
        assert!(current_rsi(&closes, 14).is_some());
    }

    #[test]
    fn rsi_series_is_aligned_with_closes() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let series = calculate_rsi(&closes, 14);
        assert_eq!(series.len(), closes.len());
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_all_gains() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10, "expected 100.0, got {v}");
        }
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        for v in calculate_rsi(&closes, 14).into_iter().flatten() {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_flat_market_is_100() {
        let closes = vec![100.0; 30];
        assert_eq!(current_rsi(&closes, 14), Some(100.0));
    }

    #[test]
    fn rsi_matches_rolling_mean_definition() {
        // 14 deltas: 10 gains of +1, 4 losses of -1 => RS = 10/4, RSI = 71.428..
        let mut closes = vec![100.0];
        for i in 0..14 {
            let last = *closes.last().unwrap();
            closes.push(if i < 10 { last + 1.0 } else { last - 1.0 });
        }
        let expected = 100.0 - 100.0 / (1.0 + 10.0 / 4.0);
        assert!((current_rsi(&closes, 14).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn rsi_stays_in_range_for_random_walks() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..200 {
            let len = rng.gen_range(15..300);
            let mut price = rng.gen_range(1.0..500.0);
            let mut closes = Vec::with_capacity(len);
            for _ in 0..len {
                price *= 1.0 + rng.gen_range(-0.08..0.08);
                closes.push(price);
            }
            for v in calculate_rsi(&closes, 14).into_iter().flatten() {
                assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
            }
        }
    }
}
