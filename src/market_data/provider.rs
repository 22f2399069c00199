// =============================================================================
// Price series provider with a per-day CSV cache
// =============================================================================
//
// Lookups are keyed by (ticker, calendar day). The first lookup of the day
// fetches from the quote source and writes `{TICKER}_{YYYYMMDD}.csv`; later
// lookups on the same day read that file back. Cache files whose embedded
// date is `expiry_days` or more in the past are deleted before each lookup.

use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::types::{Clock, PricePoint, PriceSeries};

/// Anything that can produce a daily OHLCV history for a ticker.
pub trait QuoteSource: Send + Sync + 'static {
    fn fetch_daily(&self, ticker: &str) -> impl Future<Output = Result<Vec<PricePoint>>> + Send;
}

/// Outcome of a series lookup. Failures never reach the indicator engine.
#[derive(Debug, Clone)]
pub enum SeriesLookup {
    Ready(PriceSeries),
    Unavailable { reason: String },
}

impl SeriesLookup {
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            Self::Ready(series) => Some(series),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn into_series(self) -> Option<PriceSeries> {
        match self {
            Self::Ready(series) => Some(series),
            Self::Unavailable { .. } => None,
        }
    }
}

pub struct PriceSeriesProvider<S> {
    source: S,
    cache_dir: PathBuf,
    expiry_days: i64,
    clock: Clock,
}

impl<S: QuoteSource> PriceSeriesProvider<S> {
    pub fn new(source: S, cache_dir: impl Into<PathBuf>, expiry_days: i64, clock: Clock) -> Self {
        Self {
            source,
            cache_dir: cache_dir.into(),
            expiry_days,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Series for `ticker`, from today's cache file when present.
    pub async fn lookup(&self, ticker: &str) -> SeriesLookup {
        let ticker = normalize_ticker(ticker);
        if !is_valid_ticker(&ticker) {
            return SeriesLookup::Unavailable {
                reason: format!("invalid ticker {ticker:?}"),
            };
        }

        let today = self.today();
        if let Err(e) = cleanup_dated_files(&self.cache_dir, today, self.expiry_days) {
            warn!(error = %e, dir = %self.cache_dir.display(), "price cache cleanup failed");
        }

        let path = self.cache_dir.join(dated_file_name(&ticker, today));
        if path.exists() {
            match read_cache(&path) {
                Ok(points) if !points.is_empty() => {
                    debug!(ticker = %ticker, path = %path.display(), "using cached series");
                    return SeriesLookup::Ready(PriceSeries::new(ticker, points));
                }
                Ok(_) => warn!(ticker = %ticker, "cached series is empty, refetching"),
                Err(e) => warn!(ticker = %ticker, error = %e, "unreadable cache file, refetching"),
            }
        }

        let points = match self.source.fetch_daily(&ticker).await {
            Ok(points) => points,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "quote fetch failed");
                return SeriesLookup::Unavailable {
                    reason: format!("{e:#}"),
                };
            }
        };
        if points.is_empty() {
            return SeriesLookup::Unavailable {
                reason: "no price data".to_string(),
            };
        }

        let series = PriceSeries::new(ticker.clone(), points);
        match write_cache(&path, series.points()) {
            Ok(()) => info!(ticker = %ticker, path = %path.display(), bars = series.len(), "saved series"),
            Err(e) => warn!(ticker = %ticker, error = %e, "failed to write price cache"),
        }
        SeriesLookup::Ready(series)
    }

    /// Look up several tickers concurrently, preserving input order.
    pub async fn lookup_many(&self, tickers: &[String]) -> Vec<(String, SeriesLookup)> {
        let lookups = join_all(tickers.iter().map(|t| self.lookup(t))).await;
        tickers.iter().cloned().zip(lookups).collect()
    }
}

// =============================================================================
// Ticker and file naming
// =============================================================================

pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Letters, digits and the punctuation used by index and class symbols.
pub fn is_valid_ticker(ticker: &str) -> bool {
    !ticker.is_empty()
        && ticker.len() <= 16
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

pub(crate) fn dated_file_name(ticker: &str, day: NaiveDate) -> String {
    format!("{}_{}.csv", ticker, day.format("%Y%m%d"))
}

/// Date embedded in a `{TICKER}_{YYYYMMDD}.csv` name.
pub(crate) fn file_name_date(name: &str) -> Option<NaiveDate> {
    let stem = name.strip_suffix(".csv")?;
    let (_, stamp) = stem.rsplit_once('_')?;
    NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()
}

/// Delete dated files at least `keep_days` old. Files without a parsable
/// date are left alone; files removed concurrently are not an error.
pub(crate) fn cleanup_dated_files(dir: &Path, today: NaiveDate, keep_days: i64) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e).with_context(|| format!("reading {}", dir.display())),
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(file_name_date) else {
            continue;
        };
        if (today - date).num_days() < keep_days {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => {
                info!(path = %entry.path().display(), "deleted expired file");
                removed += 1;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("removing {}", entry.path().display()))
            }
        }
    }
    Ok(removed)
}

fn read_cache(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    reader
        .deserialize()
        .collect::<Result<Vec<PricePoint>, _>>()
        .with_context(|| format!("parsing {}", path.display()))
}

fn write_cache(path: &Path, points: &[PricePoint]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}
