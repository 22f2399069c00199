// =============================================================================
// Signals Module
// =============================================================================
//
// Threshold tables that turn indicator values into labelled signals:
// - Deviation ("gap") signals, with two independent policies
// - Oscillator signals (RSI, Stoch, RSI-Stoch) in two label framings
//
// Classifiers return structured labels; `Display` renders the text form used
// in tables and insight exports.

pub mod gap;
pub mod label;
pub mod oscillator;

pub use gap::{classify_gap, GapPolicy, Horizon};
pub use label::{CueColor, SignalCategory, SignalLabel, SignalReading, ValueStyle};
pub use oscillator::{classify_oscillator, oscillator_cue, Oscillator, OscillatorFraming};
