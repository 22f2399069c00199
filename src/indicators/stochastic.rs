// =============================================================================
// Stochastic Oscillator (%K)
// =============================================================================
//
//   %K = 100 * (close - lowest_low(n)) / (highest_high(n) - lowest_low(n))
//
// Zero-range policy: when the high-low range of the window is zero the
// oscillator is undefined and `None` is returned.

use super::finite;

/// Stochastic %K at the last point.
///
/// `highs`, `lows` and `closes` must have the same length; `None` is returned
/// otherwise, or when fewer than `period` points exist.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
) -> Option<f64> {
    let n = closes.len();
    if period == 0 || n < period || highs.len() != n || lows.len() != n {
        return None;
    }

    let start = n - period;
    let lowest = lows[start..].iter().copied().fold(f64::INFINITY, f64::min);
    let highest = highs[start..].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = highest - lowest;
    if range == 0.0 {
        return None;
    }

    finite(100.0 * (closes[n - 1] - lowest) / range)
}
