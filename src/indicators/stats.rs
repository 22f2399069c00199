// =============================================================================
// Return statistics
// =============================================================================
//
// Daily returns are simple percent changes between consecutive closes.
// Standard deviations use the sample (n - 1) divisor.

use super::finite;

/// Simple returns `close[i] / close[i - 1] - 1` as fractions.
///
/// Pairs whose previous close is zero are skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| w[1] / w[0] - 1.0)
        .filter(|r| r.is_finite())
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    finite(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation. Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    finite((ss / (values.len() - 1) as f64).sqrt())
}

/// Total return of the series in percent: `(last / first - 1) * 100`.
pub fn overall_return_pct(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first == 0.0 {
        return None;
    }
    finite((last / first - 1.0) * 100.0)
}
