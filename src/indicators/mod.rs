// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators behind the
// dashboard. Every public function returns `Option<T>` (or a series of them)
// so callers are forced to handle insufficient history and degenerate input
// instead of receiving NaN.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod range;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod stochastic;

/// Keep finite values, map everything else to `None`.
pub(crate) fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
