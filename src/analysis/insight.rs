// =============================================================================
// Insight text
// =============================================================================
//
// Four lines per ticker:
//
//   Ticker: SPY  Price: 512.34 USD  Overall change: +23.4%
//   [Gap signals] Short: ...  Mid: ...  Long: ...
//   [Oscillator signals] RSI: ...  Stoch: ...  RSI-Stoch: ...
//   [Bollinger] <regime or fallback>
//
// A group batch sorts tickers, writes a "no data" line for any ticker whose
// series is unavailable and joins the summaries with a blank line.

use tracing::debug;

use super::engine::compute_indicators;
use super::readings::{gap_readings, join_readings, oscillator_readings};
use crate::market_data::{PriceSeriesProvider, QuoteSource, SeriesLookup};
use crate::regime::describe_regime;
use crate::signals::{GapPolicy, OscillatorFraming};
use crate::types::PriceSeries;

const READING_SEP: &str = "  ";

/// Summary for one series; `None` for an empty series.
pub fn compose_insight(series: &PriceSeries) -> Option<String> {
    let set = compute_indicators(series)?;

    let change = match set.overall_return_pct {
        Some(pct) => format!("{:+.1}%", pct),
        None => "N/A".to_string(),
    };

    let lines = [
        format!(
            "Ticker: {}  Price: {:.2} USD  Overall change: {}",
            set.ticker, set.close, change
        ),
        format!(
            "[Gap signals] {}",
            join_readings(&gap_readings(&set, GapPolicy::HorizonScaled), READING_SEP)
        ),
        format!(
            "[Oscillator signals] {}",
            join_readings(&oscillator_readings(&set, OscillatorFraming::Regime), READING_SEP)
        ),
        format!("[Bollinger] {}", describe_regime(series)),
    ];
    Some(lines.join("\n"))
}

pub fn no_data_line(ticker: &str) -> String {
    format!("Ticker: {ticker}  no data")
}

/// Summary for a lookup result, "no data" when unavailable.
pub fn insight_for(ticker: &str, lookup: &SeriesLookup) -> String {
    match lookup {
        SeriesLookup::Ready(series) => {
            compose_insight(series).unwrap_or_else(|| no_data_line(ticker))
        }
        SeriesLookup::Unavailable { reason } => {
            debug!(ticker, reason = %reason, "insight skipped");
            no_data_line(ticker)
        }
    }
}

/// Alphabetical batch over `tickers`, fetched concurrently.
pub async fn group_insights<S: QuoteSource>(
    provider: &PriceSeriesProvider<S>,
    tickers: &[String],
) -> String {
    let mut sorted = tickers.to_vec();
    sorted.sort();
    sorted.dedup();

    provider
        .lookup_many(&sorted)
        .await
        .iter()
        .map(|(ticker, lookup)| insight_for(ticker, lookup))
        .collect::<Vec<_>>()
        .join("\n\n")
}
