// =============================================================================
// Group metrics table
// =============================================================================
//
// One row per ticker with a series, in group order. Numbers are rounded to
// two decimals; signals use the HorizonScaled gap table and the TradeAction
// oscillator framing. Building a row records the indicator set in the audit
// log.

use serde::Serialize;
use tracing::warn;

use super::engine::{compute_indicators, IndicatorSet};
use super::readings::{gap_readings, join_readings, oscillator_readings};
use crate::insight_log::InsightLog;
use crate::market_data::{PriceSeriesProvider, QuoteSource};
use crate::signals::{oscillator_cue, CueColor, GapPolicy, OscillatorFraming};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub ticker: String,
    pub price: f64,
    pub overall_return_pct: Option<f64>,
    pub return_stddev_pct: Option<f64>,
    pub sigma_minus_1: Option<f64>,
    pub sigma_minus_2: Option<f64>,
    pub sigma_minus_3: Option<f64>,
    pub rsi14: Option<f64>,
    pub stoch14: Option<f64>,
    pub rsi_stoch: Option<f64>,
    pub ma20: Option<f64>,
    pub ma125: Option<f64>,
    pub ma200: Option<f64>,
    /// `"Short: ... / Mid: ... / Long: ..."`
    pub gap_signals: String,
    /// `"RSI: ... / Stoch: ... / RSI-Stoch: ..."`
    pub oscillator_signals: String,
    pub rsi_cue: Option<CueColor>,
    pub stoch_cue: Option<CueColor>,
    pub rsi_stoch_cue: Option<CueColor>,
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

pub fn metrics_row(set: &IndicatorSet) -> MetricsRow {
    let r = |v: Option<f64>| v.map(round2);
    MetricsRow {
        ticker: set.ticker.clone(),
        price: round2(set.close),
        overall_return_pct: r(set.overall_return_pct),
        return_stddev_pct: r(set.return_stddev_pct),
        sigma_minus_1: r(set.sigma_minus_1),
        sigma_minus_2: r(set.sigma_minus_2),
        sigma_minus_3: r(set.sigma_minus_3),
        rsi14: r(set.rsi14),
        stoch14: r(set.stoch14),
        rsi_stoch: r(set.rsi_stoch),
        ma20: r(set.ma20),
        ma125: r(set.ma125),
        ma200: r(set.ma200),
        gap_signals: join_readings(&gap_readings(set, GapPolicy::HorizonScaled), " / "),
        oscillator_signals: join_readings(
            &oscillator_readings(set, OscillatorFraming::TradeAction),
            " / ",
        ),
        rsi_cue: oscillator_cue(set.rsi14),
        stoch_cue: oscillator_cue(set.stoch14),
        rsi_stoch_cue: oscillator_cue(set.rsi_stoch),
    }
}

/// Rows for every ticker with data, in input order. Audit-log failures are
/// logged and do not drop the row.
pub async fn group_metrics<S: QuoteSource>(
    provider: &PriceSeriesProvider<S>,
    log: &InsightLog,
    tickers: &[String],
) -> Vec<MetricsRow> {
    let lookups = provider.lookup_many(tickers).await;

    let mut rows = Vec::with_capacity(lookups.len());
    for (ticker, lookup) in lookups {
        let Some(set) = lookup.series().and_then(compute_indicators) else {
            continue;
        };
        if let Err(e) = log.record(&set) {
            warn!(ticker = %ticker, error = %e, "failed to record indicator snapshot");
        }
        rows.push(metrics_row(&set));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::engine::tests::{flat_series, series_from_closes};
    use crate::market_data::provider::tests::FakeSource;
    use crate::types::Clock;
    use chrono::NaiveDate;

    #[test]
    fn row_rounds_and_classifies() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.777).collect();
        let set = compute_indicators(&series_from_closes("DOWN", &closes)).unwrap();
        let row = metrics_row(&set);

        assert_eq!(row.price, 77.47);
        assert_eq!(row.rsi14, Some(0.0));
        assert_eq!(row.rsi_cue, Some(CueColor::Blue));
        assert!(row.oscillator_signals.starts_with("RSI: Buy (0.0) / Stoch: "));
        assert!(row.gap_signals.ends_with(" / Mid: N/A / Long: N/A"));
        assert!(row.ma125.is_none());
    }

    #[test]
    fn flat_row_has_no_stoch_cue() {
        let row = metrics_row(&compute_indicators(&flat_series("F", 30, 10.0)).unwrap());
        assert_eq!(row.rsi_cue, Some(CueColor::Red));
        assert_eq!(row.stoch_cue, None);
        assert_eq!(row.sigma_minus_1, Some(0.0));
        assert_eq!(
            row.oscillator_signals,
            "RSI: Sell (100.0) / Stoch: N/A / RSI-Stoch: N/A"
        );
    }

    #[tokio::test]
    async fn group_rows_keep_order_and_log_each_ticker() {
        let cache = tempfile::tempdir().unwrap();
        let logs = tempfile::tempdir().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let source = FakeSource::default()
            .with("SPY", &[1.0, 2.0, 3.0])
            .with("AGG", &[4.0, 5.0]);
        let provider = PriceSeriesProvider::new(source, cache.path(), 7, Clock::Fixed(today));
        let log = InsightLog::new(logs.path(), 7, Clock::Fixed(today));

        let tickers = vec!["SPY".to_string(), "MISSING".to_string(), "AGG".to_string()];
        let rows = group_metrics(&provider, &log, &tickers).await;

        let names: Vec<_> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(names, ["SPY", "AGG"]);
        assert!(logs.path().join("SPY_20240510.csv").exists());
        assert!(logs.path().join("AGG_20240510.csv").exists());
        assert!(!logs.path().join("MISSING_20240510.csv").exists());
    }
}
