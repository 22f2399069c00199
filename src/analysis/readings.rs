// =============================================================================
// Classified readings for an indicator set
// =============================================================================

use serde::Serialize;

use super::engine::IndicatorSet;
use crate::signals::{
    classify_gap, classify_oscillator, GapPolicy, Horizon, Oscillator, OscillatorFraming,
    SignalReading,
};

pub fn gap_value(set: &IndicatorSet, horizon: Horizon) -> Option<f64> {
    match horizon {
        Horizon::Short => set.gap_short,
        Horizon::Mid => set.gap_mid,
        Horizon::Long => set.gap_long,
    }
}

pub fn oscillator_value(set: &IndicatorSet, oscillator: Oscillator) -> Option<f64> {
    match oscillator {
        Oscillator::Rsi => set.rsi14,
        Oscillator::Stoch => set.stoch14,
        Oscillator::RsiStoch => set.rsi_stoch,
    }
}

/// Short, mid and long gap readings.
pub fn gap_readings(set: &IndicatorSet, policy: GapPolicy) -> Vec<SignalReading> {
    Horizon::ALL
        .iter()
        .map(|&h| classify_gap(policy, h, gap_value(set, h)))
        .collect()
}

/// RSI, Stoch and RSI-Stoch readings.
pub fn oscillator_readings(set: &IndicatorSet, framing: OscillatorFraming) -> Vec<SignalReading> {
    Oscillator::ALL
        .iter()
        .map(|&o| classify_oscillator(framing, o, oscillator_value(set, o)))
        .collect()
}

pub fn join_readings(readings: &[SignalReading], sep: &str) -> String {
    readings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(sep)
}

/// Every policy and framing applied to one indicator set.
#[derive(Debug, Clone, Serialize)]
pub struct TickerSignals {
    pub ticker: String,
    pub gap_horizon_scaled: Vec<SignalReading>,
    pub gap_quick_cue: Vec<SignalReading>,
    pub oscillator_trade_action: Vec<SignalReading>,
    pub oscillator_regime: Vec<SignalReading>,
}

impl TickerSignals {
    pub fn from_set(set: &IndicatorSet) -> Self {
        Self {
            ticker: set.ticker.clone(),
            gap_horizon_scaled: gap_readings(set, GapPolicy::HorizonScaled),
            gap_quick_cue: gap_readings(set, GapPolicy::QuickCue),
            oscillator_trade_action: oscillator_readings(set, OscillatorFraming::TradeAction),
            oscillator_regime: oscillator_readings(set, OscillatorFraming::Regime),
        }
    }
}
