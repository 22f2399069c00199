// =============================================================================
// Analysis: indicator engine and the views built on it
// =============================================================================

pub mod chart;
pub mod engine;
pub mod insight;
pub mod metrics_table;
pub mod readings;

pub use engine::{compute_extended, compute_indicators, ExtendedMetrics, IndicatorSet};
pub use readings::TickerSignals;
