// =============================================================================
// Oscillator signals: RSI, Stoch, RSI-Stoch
// =============================================================================
//
// value < 30 => low zone, value > 70 => high zone, otherwise neutral.
//
// The zone is labelled in one of two framings chosen by the caller:
//   TradeAction  low => Buy,      high => Sell        (metrics table)
//   Regime       low => Oversold, high => Overbought  (insight text)

use serde::Serialize;

use super::label::{CueColor, SignalCategory, SignalLabel, SignalReading, ValueStyle};

pub const LOW_THRESHOLD: f64 = 30.0;
pub const HIGH_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Oscillator {
    Rsi,
    Stoch,
    RsiStoch,
}

impl Oscillator {
    pub const ALL: [Oscillator; 3] = [Oscillator::Rsi, Oscillator::Stoch, Oscillator::RsiStoch];

    pub fn label(self) -> &'static str {
        match self {
            Self::Rsi => "RSI",
            Self::Stoch => "Stoch",
            Self::RsiStoch => "RSI-Stoch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillatorFraming {
    TradeAction,
    Regime,
}

pub fn classify_oscillator(
    framing: OscillatorFraming,
    oscillator: Oscillator,
    value: Option<f64>,
) -> SignalReading {
    let source = oscillator.label();
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return SignalReading::Unavailable {
            source: source.to_string(),
        };
    };

    let category = match (framing, zone(value)) {
        (_, Zone::Neutral) => SignalCategory::Neutral,
        (OscillatorFraming::TradeAction, Zone::Low) => SignalCategory::Buy,
        (OscillatorFraming::TradeAction, Zone::High) => SignalCategory::Sell,
        (OscillatorFraming::Regime, Zone::Low) => SignalCategory::Oversold,
        (OscillatorFraming::Regime, Zone::High) => SignalCategory::Overbought,
    };

    SignalReading::Signal(SignalLabel::new(source, category, value, ValueStyle::Plain))
}

/// Table colouring of a raw oscillator value: `<= 30` blue, `>= 70` red,
/// nothing in between. Unlike the classifier these bounds are inclusive.
pub fn oscillator_cue(value: Option<f64>) -> Option<CueColor> {
    let v = value.filter(|v| v.is_finite())?;
    if v <= LOW_THRESHOLD {
        Some(CueColor::Blue)
    } else if v >= HIGH_THRESHOLD {
        Some(CueColor::Red)
    } else {
        None
    }
}

enum Zone {
    Low,
    Neutral,
    High,
}

fn zone(value: f64) -> Zone {
    if value < LOW_THRESHOLD {
        Zone::Low
    } else if value > HIGH_THRESHOLD {
        Zone::High
    } else {
        Zone::Neutral
    }
}
