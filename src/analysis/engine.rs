// =============================================================================
// Indicator Engine
// =============================================================================
//
// Computes the full indicator set for the latest point of a price series.
// Values that need more history than the series holds, or that hit a zero
// denominator, are `None`; NaN never leaves this module.
//
//   MA20 / MA125 / MA200   trailing simple means of close
//   overall return         (last / first - 1) * 100
//   return stddev          sample stddev of daily returns * 100, whole series
//   sigma levels           -1x, -2x, -3x the stddev
//   RSI(14)                rolling-mean RSI, 100 when there are no losses
//   Stoch(14)              %K, undefined for a zero high-low range
//   RSI-Stoch              mean of the two when both exist
//   gaps                   (close - MA) / MA * 100 for MA20 / MA125 / MA200

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::bollinger::{calculate_bollinger, BollingerResult};
use crate::indicators::macd::{calculate_macd, MacdResult};
use crate::indicators::range::{fibonacci_levels, fibonacci_zone, range_position, RangePosition};
use crate::indicators::rsi::{calculate_rsi, current_rsi};
use crate::indicators::sma::{calculate_sma, deviation_pct};
use crate::indicators::stats::{daily_returns, mean, overall_return_pct, sample_std};
use crate::indicators::stochastic::calculate_stochastic;
use crate::types::PriceSeries;

pub const RSI_PERIOD: usize = 14;
pub const STOCH_PERIOD: usize = 14;
pub const MA_SHORT: usize = 20;
pub const MA_MID: usize = 125;
pub const MA_LONG: usize = 200;

/// Indicator snapshot for the latest point of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub close: f64,
    pub overall_return_pct: Option<f64>,
    pub return_stddev_pct: Option<f64>,
    pub sigma_minus_1: Option<f64>,
    pub sigma_minus_2: Option<f64>,
    pub sigma_minus_3: Option<f64>,
    pub rsi14: Option<f64>,
    pub stoch14: Option<f64>,
    pub rsi_stoch: Option<f64>,
    pub ma20: Option<f64>,
    pub ma125: Option<f64>,
    pub ma200: Option<f64>,
    pub gap_short: Option<f64>,
    pub gap_mid: Option<f64>,
    pub gap_long: Option<f64>,
}

impl IndicatorSet {
    /// Names of the indicator keys, in the order `entries()` yields them.
    pub const KEYS: [&'static str; 14] = [
        "overall_return_pct",
        "return_stddev_pct",
        "sigma_minus_1",
        "sigma_minus_2",
        "sigma_minus_3",
        "rsi14",
        "stoch14",
        "rsi_stoch",
        "ma20",
        "ma125",
        "ma200",
        "gap_short",
        "gap_mid",
        "gap_long",
    ];

    /// The fixed-key mapping of indicator name to value.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 14] {
        let values = [
            self.overall_return_pct,
            self.return_stddev_pct,
            self.sigma_minus_1,
            self.sigma_minus_2,
            self.sigma_minus_3,
            self.rsi14,
            self.stoch14,
            self.rsi_stoch,
            self.ma20,
            self.ma125,
            self.ma200,
            self.gap_short,
            self.gap_mid,
            self.gap_long,
        ];
        let mut out = [("", None); 14];
        for (slot, (key, value)) in out.iter_mut().zip(Self::KEYS.iter().zip(values)) {
            *slot = (*key, value);
        }
        out
    }
}

/// Compute the indicator set. Returns `None` only for an empty series.
pub fn compute_indicators(series: &PriceSeries) -> Option<IndicatorSet> {
    let last = series.last()?;
    let closes = series.closes();
    let close = last.close;

    let returns = daily_returns(&closes);
    let stddev = sample_std(&returns).map(|s| s * 100.0);

    let rsi14 = current_rsi(&closes, RSI_PERIOD);
    let stoch14 = calculate_stochastic(&series.highs(), &series.lows(), &closes, STOCH_PERIOD);
    let rsi_stoch = match (rsi14, stoch14) {
        (Some(r), Some(s)) => Some((r + s) / 2.0),
        _ => None,
    };

    let ma20 = calculate_sma(&closes, MA_SHORT);
    let ma125 = calculate_sma(&closes, MA_MID);
    let ma200 = calculate_sma(&closes, MA_LONG);

    Some(IndicatorSet {
        ticker: series.ticker().to_string(),
        as_of: last.date,
        close,
        overall_return_pct: overall_return_pct(&closes),
        return_stddev_pct: stddev,
        sigma_minus_1: stddev.map(|s| -s),
        sigma_minus_2: stddev.map(|s| -2.0 * s),
        sigma_minus_3: stddev.map(|s| -3.0 * s),
        rsi14,
        stoch14,
        rsi_stoch,
        ma20,
        ma125,
        ma200,
        gap_short: ma20.and_then(|m| deviation_pct(close, m)),
        gap_mid: ma125.and_then(|m| deviation_pct(close, m)),
        gap_long: ma200.and_then(|m| deviation_pct(close, m)),
    })
}

/// RSI(14) for every point of the series, aligned with its closes.
pub fn rsi_series(series: &PriceSeries) -> Vec<Option<f64>> {
    calculate_rsi(&series.closes(), RSI_PERIOD)
}

// =============================================================================
// Extended metrics
// =============================================================================

/// Where the close sits on the Fibonacci ladder of the full-series range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FibonacciPlacement {
    pub levels: Vec<f64>,
    /// e.g. `"Fib 0.500 ~ 0.618"`, or `"out of range"`.
    pub zone: String,
}

/// Supplementary per-ticker metrics shown on the ETF detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedMetrics {
    pub daily_change_pct: Option<f64>,
    /// Today's move expressed in standard deviations of daily returns.
    pub move_in_sigmas: Option<f64>,
    pub macd: Option<MacdResult>,
    pub bollinger: Option<BollingerResult>,
    pub full_range: Option<RangePosition>,
    pub recent_range: Option<RangePosition>,
    pub fibonacci: Option<FibonacciPlacement>,
}

pub fn compute_extended(series: &PriceSeries) -> ExtendedMetrics {
    let closes = series.closes();

    let daily_change_pct = match closes.as_slice() {
        [.., prev, last] if *prev != 0.0 => Some((last - prev) / prev * 100.0),
        _ => None,
    };

    let returns = daily_returns(&closes);
    let move_in_sigmas = match (daily_change_pct, mean(&returns), sample_std(&returns)) {
        (Some(change), Some(m), Some(s)) if s != 0.0 => Some((change - m * 100.0) / (s * 100.0)),
        _ => None,
    };

    let full_range = range_position(&closes, None);
    let fibonacci = match (full_range, closes.last()) {
        (Some(range), Some(&close)) => {
            let levels = fibonacci_levels(range.high, range.low);
            let zone = match fibonacci_zone(&levels, close) {
                Some((lo, hi)) => format!("Fib {:.3} ~ {:.3}", lo.ratio, hi.ratio),
                None => "out of range".to_string(),
            };
            Some(FibonacciPlacement {
                levels: levels.iter().map(|l| l.price).collect(),
                zone,
            })
        }
        _ => None,
    };

    ExtendedMetrics {
        daily_change_pct,
        move_in_sigmas,
        macd: calculate_macd(&closes, 12, 26, 9),
        bollinger: calculate_bollinger(&closes, MA_SHORT, 2.0),
        full_range,
        recent_range: range_position(&closes, Some(MA_SHORT)),
        fibonacci,
    }
}
