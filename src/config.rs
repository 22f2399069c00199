// =============================================================================
// Application Configuration: JSON file with env overrides and atomic save
// =============================================================================
//
// All fields carry serde defaults so a partial (or empty) file still loads.
// Environment variables applied after loading:
//
//   ETFLAB_DATA_DIR   root for caches, logs and favorites
//   ETFLAB_BIND_ADDR  listen address
//   ETFLAB_AS_OF      pin "today" (YYYY-MM-DD)
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::favorites::DEFAULT_MAX_TICKERS;
use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::types::Clock;

pub const CONFIG_FILE: &str = "etf_lab.json";

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_expiry_days() -> i64 {
    7
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_history_range() -> String {
    "3y".to_string()
}

fn default_quote_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_tickers() -> usize {
    DEFAULT_MAX_TICKERS
}

fn default_fx_ticker() -> String {
    "KRW=X".to_string()
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory; the caches and favorites file live beneath it.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Price cache files this many days old are deleted.
    #[serde(default = "default_expiry_days")]
    pub price_cache_expiry_days: i64,

    /// Indicator log files this many days old are deleted.
    #[serde(default = "default_expiry_days")]
    pub insight_retention_days: i64,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Chart API `range` parameter.
    #[serde(default = "default_history_range")]
    pub history_range: String,

    #[serde(default = "default_quote_base_url")]
    pub quote_base_url: String,

    #[serde(default = "default_max_tickers")]
    pub max_tickers_per_group: usize,

    /// Symbol whose last close is the USD/KRW rate.
    #[serde(default = "default_fx_ticker")]
    pub fx_ticker: String,

    /// Fixed "today"; the host date when absent.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            price_cache_expiry_days: default_expiry_days(),
            insight_retention_days: default_expiry_days(),
            bind_addr: default_bind_addr(),
            history_range: default_history_range(),
            quote_base_url: default_quote_base_url(),
            max_tickers_per_group: default_max_tickers(),
            fx_ticker: default_fx_ticker(),
            as_of: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            data_dir = %config.data_dir.display(),
            bind_addr = %config.bind_addr,
            "config loaded"
        );

        Ok(config)
    }

    /// Atomic write: `.tmp` sibling, then rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    /// Apply `ETFLAB_*` overrides read through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("ETFLAB_DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = var("ETFLAB_BIND_ADDR").filter(|v| !v.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(raw) = var("ETFLAB_AS_OF").filter(|v| !v.is_empty()) {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("ETFLAB_AS_OF is not a YYYY-MM-DD date: {raw:?}"))?;
            self.as_of = Some(date);
        }
        Ok(())
    }

    pub fn clock(&self) -> Clock {
        match self.as_of {
            Some(date) => Clock::Fixed(date),
            None => Clock::System,
        }
    }

    pub fn stock_data_dir(&self) -> PathBuf {
        self.data_dir.join("stock_data")
    }

    pub fn stock_insight_dir(&self) -> PathBuf {
        self.data_dir.join("stock_insight")
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join("favorite.json")
    }
}
