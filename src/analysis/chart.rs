// =============================================================================
// Normalised price chart
// =============================================================================
//
// For a window of N points, each ticker's last N closes are shifted so the
// first close of the window is zero. Tickers with fewer than N points are
// left out.

use chrono::NaiveDate;
use serde::Serialize;

use crate::market_data::{PriceSeriesProvider, QuoteSource};
use crate::types::PriceSeries;

/// Window lengths offered by the dashboard.
pub const CHART_PERIODS: [usize; 4] = [30, 90, 180, 365];
pub const DEFAULT_CHART_PERIOD: usize = 90;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    pub ticker: String,
    pub points: Vec<ChartPoint>,
}

pub fn normalized_line(series: &PriceSeries, days: usize) -> Option<ChartLine> {
    if days == 0 || series.len() < days {
        return None;
    }
    let window = &series.points()[series.len() - days..];
    let base = window[0].close;
    Some(ChartLine {
        ticker: series.ticker().to_string(),
        points: window
            .iter()
            .map(|p| ChartPoint {
                date: p.date,
                change: p.close - base,
            })
            .collect(),
    })
}

pub async fn group_chart<S: QuoteSource>(
    provider: &PriceSeriesProvider<S>,
    tickers: &[String],
    days: usize,
) -> Vec<ChartLine> {
    provider
        .lookup_many(tickers)
        .await
        .iter()
        .filter_map(|(_, lookup)| normalized_line(lookup.series()?, days))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::engine::tests::series_from_closes;

    #[test]
    fn window_starts_at_zero() {
        let series = series_from_closes("A", &[5.0, 10.0, 12.0, 9.0]);
        let line = normalized_line(&series, 3).unwrap();
        let changes: Vec<f64> = line.points.iter().map(|p| p.change).collect();
        assert_eq!(changes, vec![0.0, 2.0, -1.0]);
        assert_eq!(line.points[0].date, series.points()[1].date);
    }

    #[test]
    fn short_series_is_skipped() {
        let series = series_from_closes("A", &[1.0, 2.0]);
        assert!(normalized_line(&series, 3).is_none());
        assert!(normalized_line(&series, 0).is_none());
        assert_eq!(normalized_line(&series, 2).unwrap().points.len(), 2);
    }
}
