// =============================================================================
// Price range analysis: drawdown, recovery, Fibonacci retracement
// =============================================================================

use serde::Serialize;

use super::finite;

/// Standard retracement ratios, low to high.
pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Position of the current close within a high/low window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RangePosition {
    pub high: f64,
    pub low: f64,
    /// `(close - high) / high * 100`, always <= 0 for closes inside the window.
    pub drawdown_pct: f64,
    /// `(close - low) / low * 100`.
    pub recovery_pct: f64,
}

/// Drawdown from the window high and recovery from the window low, where the
/// window is the trailing `period` closes (the whole series for `None`).
pub fn range_position(closes: &[f64], period: Option<usize>) -> Option<RangePosition> {
    let close = *closes.last()?;
    let start = match period {
        Some(0) => return None,
        Some(p) => closes.len().saturating_sub(p),
        None => 0,
    };
    let window = &closes[start..];
    let high = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = window.iter().copied().fold(f64::INFINITY, f64::min);
    if high == 0.0 || low == 0.0 {
        return None;
    }

    Some(RangePosition {
        high,
        low,
        drawdown_pct: finite((close - high) / high * 100.0)?,
        recovery_pct: finite((close - low) / low * 100.0)?,
    })
}

/// One retracement price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Retracement levels measured up from `low`: `low + (high - low) * ratio`.
pub fn fibonacci_levels(high: f64, low: f64) -> Vec<FibLevel> {
    FIB_LEVELS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: low + (high - low) * ratio,
        })
        .collect()
}

/// The pair of adjacent levels bracketing `price`, or `None` when the price is
/// outside the low/high range.
pub fn fibonacci_zone(levels: &[FibLevel], price: f64) -> Option<(FibLevel, FibLevel)> {
    levels
        .windows(2)
        .find(|w| w[0].price <= price && price <= w[1].price)
        .map(|w| (w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawdown_and_recovery_over_full_series() {
        let closes = [100.0, 150.0, 50.0, 120.0];
        let pos = range_position(&closes, None).unwrap();
        assert_eq!(pos.high, 150.0);
        assert_eq!(pos.low, 50.0);
        assert!((pos.drawdown_pct - (-20.0)).abs() < 1e-9);
        assert!((pos.recovery_pct - 140.0).abs() < 1e-9);
    }

    #[test]
    fn trailing_window_ignores_older_points() {
        let closes = [500.0, 100.0, 110.0, 105.0];
        let pos = range_position(&closes, Some(3)).unwrap();
        assert_eq!(pos.high, 110.0);
        assert_eq!(pos.low, 100.0);
    }

    #[test]
    fn empty_or_zero_period() {
        assert!(range_position(&[], None).is_none());
        assert!(range_position(&[1.0], Some(0)).is_none());
    }

    #[test]
    fn zone_brackets_price() {
        let levels = fibonacci_levels(200.0, 100.0);
        assert_eq!(levels.len(), 7);
        assert!((levels[3].price - 150.0).abs() < 1e-12);
        let (lo, hi) = fibonacci_zone(&levels, 155.0).unwrap();
        assert_eq!(lo.ratio, 0.5);
        assert_eq!(hi.ratio, 0.618);
        assert!(fibonacci_zone(&levels, 250.0).is_none());
    }
}
