// =============================================================================
// Signal labels
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Discrete outcome of a threshold classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SignalCategory {
    Buy,
    Sell,
    Neutral,
    Overbought,
    Oversold,
}

impl fmt::Display for SignalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Overbought => write!(f, "Overbought"),
            Self::Oversold => write!(f, "Oversold"),
        }
    }
}

impl FromStr for SignalCategory {
    type Err = ParseSignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Self::Buy),
            "Sell" => Ok(Self::Sell),
            "Neutral" => Ok(Self::Neutral),
            "Overbought" => Ok(Self::Overbought),
            "Oversold" => Ok(Self::Oversold),
            other => Err(ParseSignalError::Category(other.to_string())),
        }
    }
}

/// How the embedded value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueStyle {
    /// Sign-forced with a `%` suffix: `+5.0%`.
    Percent,
    /// One decimal, no sign: `42.3`.
    Plain,
}

/// Display colour attached by cue-style policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CueColor {
    Red,
    Blue,
    Gray,
}

/// A classified indicator value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalLabel {
    pub source: String,
    pub category: SignalCategory,
    /// Source value rounded to one decimal.
    pub value: f64,
    pub style: ValueStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cue: Option<CueColor>,
}

impl SignalLabel {
    pub fn new(source: impl Into<String>, category: SignalCategory, raw: f64, style: ValueStyle) -> Self {
        Self {
            source: source.into(),
            category,
            value: round1(raw),
            style,
            cue: None,
        }
    }

    pub fn with_cue(mut self, cue: CueColor) -> Self {
        self.cue = Some(cue);
        self
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            ValueStyle::Percent => {
                write!(f, "{}: {} ({:+.1}%)", self.source, self.category, self.value)
            }
            ValueStyle::Plain => write!(f, "{}: {} ({:.1})", self.source, self.category, self.value),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseSignalError {
    #[error("malformed signal label: {0:?}")]
    Malformed(String),
    #[error("unknown signal category: {0:?}")]
    Category(String),
    #[error("invalid signal value: {0:?}")]
    Value(String),
}

impl FromStr for SignalLabel {
    type Err = ParseSignalError;

    /// Parse `"{source}: {category} ({value}[%])"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseSignalError::Malformed(s.to_string());

        let (head, tail) = s.rsplit_once(" (").ok_or_else(malformed)?;
        let inner = tail.strip_suffix(')').ok_or_else(malformed)?;
        let (number, style) = match inner.strip_suffix('%') {
            Some(n) => (n, ValueStyle::Percent),
            None => (inner, ValueStyle::Plain),
        };
        let value: f64 = number
            .parse()
            .map_err(|_| ParseSignalError::Value(number.to_string()))?;

        let (source, category) = head.rsplit_once(": ").ok_or_else(malformed)?;

        Ok(Self {
            source: source.to_string(),
            category: category.parse()?,
            value,
            style,
            cue: None,
        })
    }
}

/// Outcome of classifying a value that may be undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignalReading {
    Signal(SignalLabel),
    Unavailable { source: String },
}

impl SignalReading {
    pub fn label(&self) -> Option<&SignalLabel> {
        match self {
            Self::Signal(label) => Some(label),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn category(&self) -> Option<SignalCategory> {
        self.label().map(|l| l.category)
    }
}

impl fmt::Display for SignalReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(label) => write!(f, "{label}"),
            Self::Unavailable { source } => write!(f, "{source}: N/A"),
        }
    }
}

/// Round half away from zero to one decimal; negative zero becomes zero.
pub(crate) fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
