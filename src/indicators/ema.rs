// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (span + 1)
//   EMA_0      = close_0
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The recursion is seeded with the first value (no SMA warm-up), so the output
// has exactly one value per input.
// =============================================================================

/// Compute the EMA series for `values` with the given `span`.
///
/// # Edge cases
/// - `span == 0` or empty input => empty vec
/// - Non-finite intermediate values stop the series; downstream consumers
///   should not trust anything after a broken value.
pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let multiplier = 2.0 / (span + 1) as f64;

    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    if !prev.is_finite() {
        return result;
    }
    result.push(prev);

    for &value in &values[1..] {
        let ema = value * multiplier + prev * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev = ema;
    }

    result
}
