// =============================================================================
// Shared types used across the ETF Lab service
// =============================================================================

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// One trading day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl PricePoint {
    /// A bar where open, high, low and close are all `price`.
    pub fn flat(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0,
        }
    }
}

/// Chronologically ordered daily series for a single ticker.
///
/// Construction sorts by date and drops repeated dates (the last point
/// supplied for a date wins), so every consumer can rely on strictly
/// ascending, unique dates.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps supply order within a date, so the last one survives
        // the reverse dedup below.
        points.sort_by_key(|p| p.date);
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.low).collect()
    }
}

/// Source of "today" for cache keys and retention windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Local calendar date of the host.
    System,
    /// Pinned date, used by tests and by `ETFLAB_AS_OF`.
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Self::System => Local::now().date_naive(),
            Self::Fixed(date) => *date,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::System
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn series_is_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            "SPY",
            vec![
                PricePoint::flat(day(3), 3.0),
                PricePoint::flat(day(1), 1.0),
                PricePoint::flat(day(2), 2.0),
                PricePoint::flat(day(3), 30.0),
            ],
        );
        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 30.0]);
    }

    #[test]
    fn fixed_clock_returns_pinned_date() {
        assert_eq!(Clock::Fixed(day(9)).today(), day(9));
    }
}
