// =============================================================================
// MACD (12, 26, 9)
// =============================================================================

use serde::Serialize;

use super::ema::calculate_ema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD line (fast EMA - slow EMA), its signal EMA and the histogram, at the
/// last close.
pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdResult> {
    if closes.is_empty() || fast == 0 || slow == 0 || signal == 0 {
        return None;
    }

    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);
    if fast_ema.len() != closes.len() || slow_ema.len() != closes.len() {
        return None;
    }

    let macd_line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = calculate_ema(&macd_line, signal);

    let line = *macd_line.last()?;
    let signal = *signal_line.last()?;
    Some(MacdResult {
        line,
        signal,
        histogram: line - signal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_zero_macd() {
        let m = calculate_macd(&[10.0; 60], 12, 26, 9).unwrap();
        assert!(m.line.abs() < 1e-12);
        assert!(m.histogram.abs() < 1e-12);
    }

    #[test]
    fn rising_series_has_positive_line() {
        let closes: Vec<f64> = (1..=80).map(|i| 100.0 + i as f64).collect();
        let m = calculate_macd(&closes, 12, 26, 9).unwrap();
        assert!(m.line > 0.0);
        assert!((m.histogram - (m.line - m.signal)).abs() < 1e-12);
    }

    #[test]
    fn empty_input() {
        assert!(calculate_macd(&[], 12, 26, 9).is_none());
    }
}
