// =============================================================================
// Regime Detection Module
// =============================================================================
//
// Bollinger-band regime classification: where the close sits against the
// 20-day center line, how wide the bands are, and whether they are widening.

pub mod detector;

pub use detector::{
    describe_regime, detect_regime, BandTrend, BandWidthClass, BollingerRegime, CenterPosition,
    Forecast, REGIME_UNAVAILABLE,
};
