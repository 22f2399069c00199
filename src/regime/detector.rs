// =============================================================================
// Bollinger Regime Detector
// =============================================================================
//
// Classifies the latest point of a series on three axes and maps the
// combination to a short forecast:
//
//   center   d = (close - MA20) / MA20 * 100
//            |d| <= 1 near, d > 1 above, d < -1 below
//   width    BBW = (upper - lower) / MA20 * 100
//            <= 5 very narrow, <= 10 moderate, otherwise wide
//   trend    BBW now vs. BBW five points earlier (needs 25 points)
//
// Forecast table (first match wins, anything else is "trend unclear"):
//
//   above + wide        + expanding    -> uptrend continuation likely
//   below + very narrow + contracting  -> downtrend or consolidation likely
//   near  + very narrow + contracting  -> large volatility event expected

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::indicators::bollinger::{bollinger_at_lookback, calculate_bollinger, BollingerResult};
use crate::indicators::finite;
use crate::types::PriceSeries;

/// Band period (MA20) and multiplier.
pub const BAND_PERIOD: usize = 20;
pub const BAND_STD: f64 = 2.0;

/// Points back the previous band width is measured at.
pub const TREND_LOOKBACK: usize = 5;

/// Minimum points before a width trend is reported.
pub const TREND_MIN_POINTS: usize = 25;

/// Rendered in place of a regime when one cannot be computed.
pub const REGIME_UNAVAILABLE: &str = "Bollinger regime unavailable";

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CenterPosition {
    Above,
    Near,
    Below,
}

impl CenterPosition {
    pub fn from_deviation(d: f64) -> Self {
        if d.abs() <= 1.0 {
            Self::Near
        } else if d > 1.0 {
            Self::Above
        } else {
            Self::Below
        }
    }
}

impl fmt::Display for CenterPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Above => write!(f, "above center"),
            Self::Near => write!(f, "near center"),
            Self::Below => write!(f, "below center"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandWidthClass {
    VeryNarrow,
    Moderate,
    Wide,
}

impl BandWidthClass {
    pub fn from_width(width: f64) -> Self {
        if width <= 5.0 {
            Self::VeryNarrow
        } else if width <= 10.0 {
            Self::Moderate
        } else {
            Self::Wide
        }
    }
}

impl fmt::Display for BandWidthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryNarrow => write!(f, "very narrow"),
            Self::Moderate => write!(f, "moderate"),
            Self::Wide => write!(f, "wide"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BandTrend {
    Expanding,
    Contracting,
    NoChange,
    /// Too little history to compare against.
    Indeterminate,
}

impl BandTrend {
    pub fn compare(current: f64, previous: f64) -> Self {
        if current > previous {
            Self::Expanding
        } else if current < previous {
            Self::Contracting
        } else {
            Self::NoChange
        }
    }
}

impl fmt::Display for BandTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanding => write!(f, "expanding"),
            Self::Contracting => write!(f, "contracting"),
            Self::NoChange => write!(f, "no change"),
            Self::Indeterminate => write!(f, "trend indeterminate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Forecast {
    UptrendContinuation,
    DowntrendOrConsolidation,
    VolatilityEvent,
    Unclear,
}

impl Forecast {
    pub fn lookup(center: CenterPosition, width: BandWidthClass, trend: BandTrend) -> Self {
        use BandTrend::*;
        use BandWidthClass::*;
        use CenterPosition::*;

        match (center, width, trend) {
            (Above, Wide, Expanding) => Self::UptrendContinuation,
            (Below, VeryNarrow, Contracting) => Self::DowntrendOrConsolidation,
            (Near, VeryNarrow, Contracting) => Self::VolatilityEvent,
            _ => Self::Unclear,
        }
    }
}

impl fmt::Display for Forecast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UptrendContinuation => write!(f, "uptrend continuation likely"),
            Self::DowntrendOrConsolidation => write!(f, "downtrend or consolidation likely"),
            Self::VolatilityEvent => write!(f, "large volatility event expected"),
            Self::Unclear => write!(f, "trend unclear"),
        }
    }
}

/// Regime of the latest point plus the band geometry it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerRegime {
    pub center: CenterPosition,
    pub width_class: BandWidthClass,
    pub trend: BandTrend,
    pub forecast: Forecast,

    pub close: f64,
    pub bands: BollingerResult,
    /// `d`, the close's deviation from MA20 in percent.
    pub center_deviation_pct: f64,
    /// Band width five points earlier, when enough history exists.
    pub previous_width: Option<f64>,
}

impl fmt::Display for BollingerRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} -> {}",
            self.center, self.width_class, self.trend, self.forecast
        )
    }
}

// =============================================================================
// Detection
// =============================================================================

/// Classify the latest point of `series`. `None` with fewer than 20 points,
/// a zero MA20 or any non-finite intermediate.
pub fn detect_regime(series: &PriceSeries) -> Option<BollingerRegime> {
    let closes = series.closes();
    let close = *closes.last()?;

    let bands = calculate_bollinger(&closes, BAND_PERIOD, BAND_STD)?;
    let d = finite((close - bands.middle) / bands.middle * 100.0)?;

    let center = CenterPosition::from_deviation(d);
    let width_class = BandWidthClass::from_width(bands.width);

    let previous_width = if closes.len() >= TREND_MIN_POINTS {
        Some(bollinger_at_lookback(&closes, BAND_PERIOD, BAND_STD, TREND_LOOKBACK)?.width)
    } else {
        trace!(ticker = series.ticker(), points = closes.len(), "Regime: too short for width trend");
        None
    };
    let trend = match previous_width {
        Some(prev) => BandTrend::compare(bands.width, prev),
        None => BandTrend::Indeterminate,
    };

    let forecast = Forecast::lookup(center, width_class, trend);

    debug!(
        ticker = series.ticker(),
        d = format!("{:.2}", d),
        bbw = format!("{:.2}", bands.width),
        center = %center,
        width = %width_class,
        trend = %trend,
        forecast = %forecast,
        "Regime detected"
    );

    Some(BollingerRegime {
        center,
        width_class,
        trend,
        forecast,
        close,
        bands,
        center_deviation_pct: d,
        previous_width,
    })
}

/// One-line regime description, or the fixed fallback.
pub fn describe_regime(series: &PriceSeries) -> String {
    match detect_regime(series) {
        Some(regime) => regime.to_string(),
        None => REGIME_UNAVAILABLE.to_string(),
    }
}
