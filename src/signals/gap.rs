// =============================================================================
// Deviation ("gap") signals
// =============================================================================
//
// Two policies classify the same gap metric and are kept apart on purpose:
//
//   HorizonScaled  buy  if gap <= -T, sell if gap >= +T, T = 5 / 10 / 15
//                  for the short / mid / long horizon (table-grade signal)
//
//   QuickCue       buy  if gap >= +2, sell if gap <= -2, colour-coded
//                  (red / blue / gray). Buy and sell are the inverse of
//                  HorizonScaled; both call sites exist in the dashboard.
//
// All boundaries are inclusive.

use serde::Serialize;

use super::label::{CueColor, SignalCategory, SignalLabel, SignalReading, ValueStyle};

/// Moving-average horizon a gap is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// MA20
    Short,
    /// MA125
    Mid,
    /// MA200
    Long,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::Short, Horizon::Mid, Horizon::Long];

    pub fn label(self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Mid => "Mid",
            Self::Long => "Long",
        }
    }

    /// HorizonScaled threshold in percent.
    pub fn threshold(self) -> f64 {
        match self {
            Self::Short => 5.0,
            Self::Mid => 10.0,
            Self::Long => 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    HorizonScaled,
    QuickCue,
}

const QUICK_CUE_THRESHOLD: f64 = 2.0;

/// Classify a gap percentage for `horizon` under `policy`.
pub fn classify_gap(policy: GapPolicy, horizon: Horizon, gap: Option<f64>) -> SignalReading {
    let source = horizon.label();
    let Some(gap) = gap.filter(|g| g.is_finite()) else {
        return SignalReading::Unavailable {
            source: source.to_string(),
        };
    };

    let label = match policy {
        GapPolicy::HorizonScaled => {
            let t = horizon.threshold();
            let category = if gap >= t {
                SignalCategory::Sell
            } else if gap <= -t {
                SignalCategory::Buy
            } else {
                SignalCategory::Neutral
            };
            SignalLabel::new(source, category, gap, ValueStyle::Percent)
        }
        GapPolicy::QuickCue => {
            let (category, cue) = if gap >= QUICK_CUE_THRESHOLD {
                (SignalCategory::Buy, CueColor::Red)
            } else if gap <= -QUICK_CUE_THRESHOLD {
                (SignalCategory::Sell, CueColor::Blue)
            } else {
                (SignalCategory::Neutral, CueColor::Gray)
            };
            SignalLabel::new(source, category, gap, ValueStyle::Percent).with_cue(cue)
        }
    };

    SignalReading::Signal(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(horizon: Horizon, gap: f64) -> SignalCategory {
        classify_gap(GapPolicy::HorizonScaled, horizon, Some(gap))
            .category()
            .unwrap()
    }

    #[test]
    fn short_horizon_boundaries_are_inclusive() {
        assert_eq!(scaled(Horizon::Short, 5.0), SignalCategory::Sell);
        assert_eq!(scaled(Horizon::Short, 5.01), SignalCategory::Sell);
        assert_eq!(scaled(Horizon::Short, 4.99), SignalCategory::Neutral);
        assert_eq!(scaled(Horizon::Short, -5.0), SignalCategory::Buy);
        assert_eq!(scaled(Horizon::Short, -5.01), SignalCategory::Buy);
        assert_eq!(scaled(Horizon::Short, -4.99), SignalCategory::Neutral);
    }

    #[test]
    fn thresholds_scale_with_horizon() {
        assert_eq!(scaled(Horizon::Mid, 9.99), SignalCategory::Neutral);
        assert_eq!(scaled(Horizon::Mid, -10.0), SignalCategory::Buy);
        assert_eq!(scaled(Horizon::Long, 14.99), SignalCategory::Neutral);
        assert_eq!(scaled(Horizon::Long, 15.0), SignalCategory::Sell);
    }

    #[test]
    fn scaled_display() {
        let r = classify_gap(GapPolicy::HorizonScaled, Horizon::Short, Some(-6.44));
        assert_eq!(r.to_string(), "Short: Buy (-6.4%)");
    }

    #[test]
    fn quick_cue_inverts_buy_and_sell() {
        let up = classify_gap(GapPolicy::QuickCue, Horizon::Short, Some(2.0));
        let label = up.label().unwrap();
        assert_eq!(label.category, SignalCategory::Buy);
        assert_eq!(label.cue, Some(CueColor::Red));

        let down = classify_gap(GapPolicy::QuickCue, Horizon::Long, Some(-2.0));
        assert_eq!(down.category(), Some(SignalCategory::Sell));
        assert_eq!(down.label().unwrap().cue, Some(CueColor::Blue));

        let flat = classify_gap(GapPolicy::QuickCue, Horizon::Mid, Some(1.99));
        assert_eq!(flat.category(), Some(SignalCategory::Neutral));
        assert_eq!(flat.label().unwrap().cue, Some(CueColor::Gray));
    }

    #[test]
    fn policies_disagree_on_same_gap() {
        // +6 % above MA20: table says sell, quick cue says buy.
        assert_eq!(scaled(Horizon::Short, 6.0), SignalCategory::Sell);
        assert_eq!(
            classify_gap(GapPolicy::QuickCue, Horizon::Short, Some(6.0)).category(),
            Some(SignalCategory::Buy)
        );
    }

    #[test]
    fn undefined_gap_is_unavailable() {
        let r = classify_gap(GapPolicy::HorizonScaled, Horizon::Long, None);
        assert_eq!(r.to_string(), "Long: N/A");
        let r = classify_gap(GapPolicy::QuickCue, Horizon::Mid, Some(f64::NAN));
        assert_eq!(r.to_string(), "Mid: N/A");
    }
}
