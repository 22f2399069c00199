// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

use super::finite;

/// Mean of the trailing `period` values.
///
/// Returns `None` when `period == 0` or fewer than `period` values exist.
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    finite(window.iter().sum::<f64>() / period as f64)
}

/// Percentage distance of `price` from `average`:
/// `(price - average) / average * 100`.
///
/// Returns `None` for a zero average.
pub fn deviation_pct(price: f64, average: f64) -> Option<f64> {
    if average == 0.0 {
        return None;
    }
    finite((price - average) / average * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_trailing_window() {
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        // Last three: 8, 9, 10
        assert!((calculate_sma(&values, 3).unwrap() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn sma_insufficient_history() {
        assert!(calculate_sma(&[1.0, 2.0], 3).is_none());
        assert!(calculate_sma(&[1.0, 2.0], 0).is_none());
    }

    #[test]
    fn deviation_zero_average() {
        assert!(deviation_pct(10.0, 0.0).is_none());
        assert!((deviation_pct(105.0, 100.0).unwrap() - 5.0).abs() < 1e-12);
    }
}
