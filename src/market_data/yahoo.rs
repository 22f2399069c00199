// =============================================================================
// Yahoo Finance chart API client
// =============================================================================
//
// GET {base}/v8/finance/chart/{ticker}?range=3y&interval=1d
//
// The response carries parallel arrays (timestamp, open, high, low, close,
// volume). Bars with any null price are skipped; timestamps are shifted by
// the exchange's gmtoffset before taking the calendar date.

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::provider::QuoteSource;
use crate::types::PricePoint;

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    range: String,
    client: reqwest::Client,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, range: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("etf-lab/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self {
            base_url,
            range: range.into(),
            client,
        })
    }

    /// GET /v8/finance/chart/{ticker}: daily bars for the configured range.
    #[instrument(skip(self), name = "yahoo::fetch_chart")]
    pub async fn fetch_chart(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let resp = self
            .client
            .get(&url)
            .query(&[("range", self.range.as_str()), ("interval", "1d")])
            .send()
            .await
            .with_context(|| format!("GET chart for {ticker} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Yahoo chart for {} returned {}: {}", ticker, status, body);
        }

        let body: ChartResponse = resp
            .json()
            .await
            .with_context(|| format!("failed to parse chart response for {ticker}"))?;

        let points = parse_chart(body)?;
        debug!(ticker, bars = points.len(), "chart fetched");
        Ok(points)
    }
}

impl QuoteSource for YahooClient {
    async fn fetch_daily(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        self.fetch_chart(ticker).await
    }
}

// =============================================================================
// Response model
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteArrays>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteArrays {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Flatten a chart response into daily points.
pub fn parse_chart(body: ChartResponse) -> Result<Vec<PricePoint>> {
    if let Some(err) = body.chart.error {
        anyhow::bail!("chart error {}: {}", err.code, err.description);
    }

    let result = body
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("chart response has no result")?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let points = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PricePoint {
                date,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    Ok(points)
}
