// =============================================================================
// Indicator audit log
// =============================================================================
//
// One CSV per ticker per day, `{TICKER}_{YYYYMMDD}.csv`, holding a header row
// and a single data row with the latest IndicatorSet. Writing the same ticker
// twice on one day overwrites the file. Files whose embedded date falls
// outside the retention window are removed before every write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::analysis::engine::IndicatorSet;
use crate::market_data::provider::{cleanup_dated_files, dated_file_name};
use crate::types::Clock;

pub struct InsightLog {
    dir: PathBuf,
    retention_days: i64,
    clock: Clock,
}

impl InsightLog {
    pub fn new(dir: impl Into<PathBuf>, retention_days: i64, clock: Clock) -> Self {
        Self {
            dir: dir.into(),
            retention_days,
            clock,
        }
    }

    /// Record `set` under today's file for its ticker. Returns the path written.
    pub fn record(&self, set: &IndicatorSet) -> Result<PathBuf> {
        let today = self.clock.today();
        if let Err(e) = cleanup_dated_files(&self.dir, today, self.retention_days) {
            warn!(error = %e, dir = %self.dir.display(), "insight log cleanup failed");
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let path = self.dir.join(dated_file_name(&set.ticker, today));

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;

        let mut header = vec!["ticker", "as_of", "close"];
        header.extend(IndicatorSet::KEYS);
        writer.write_record(&header)?;

        let mut row = vec![
            set.ticker.clone(),
            set.as_of.to_string(),
            set.close.to_string(),
        ];
        row.extend(
            set.entries()
                .iter()
                .map(|(_, v)| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
        writer.flush()?;

        info!(ticker = %set.ticker, path = %path.display(), "saved indicator snapshot");
        Ok(path)
    }
}
