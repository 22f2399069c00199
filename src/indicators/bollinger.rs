// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ). The Band Width (BBW) is the normalised
// distance: BBW = (upper - lower) / middle * 100.
//
// σ is the sample standard deviation of the window (n - 1 divisor).
//
// BBW is the primary metric used by the regime classifier.

use super::stats::sample_std;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Calculate Bollinger Bands over the trailing `period` closes.
///
/// Returns `None` when:
/// - Fewer than `period` data points (or `period < 2`).
/// - Middle band is zero (degenerate input).
/// - Any intermediate value is non-finite.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerResult> {
    if period < 2 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let middle = window.iter().sum::<f64>() / period as f64;

    if middle == 0.0 || !middle.is_finite() {
        return None;
    }

    let std_dev = sample_std(window)?;

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = (upper - lower) / middle * 100.0;

    if width.is_finite() {
        Some(BollingerResult {
            upper,
            middle,
            lower,
            width,
        })
    } else {
        None
    }
}

/// Bands as they stood `lookback` points before the last close.
pub fn bollinger_at_lookback(
    closes: &[f64],
    period: usize,
    num_std: f64,
    lookback: usize,
) -> Option<BollingerResult> {
    let end = closes.len().checked_sub(lookback)?;
    calculate_bollinger(&closes[..end], period, num_std)
}
