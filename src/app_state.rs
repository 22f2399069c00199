// =============================================================================
// Central Application State: ETF Lab service
// =============================================================================
//
// Shared across request handlers via `Arc<AppState<S>>`. Nothing here is
// authoritative computed state: series come from the provider (and its
// per-day cache), indicators are recomputed per request, and the only
// mutable data, favorites, serialises its own read-modify-write cycle.
//
// `S` is the quote source, the Yahoo client in production.
// =============================================================================

use std::time::Instant;

use crate::config::AppConfig;
use crate::favorites::FavoritesStore;
use crate::insight_log::InsightLog;
use crate::market_data::{PriceSeriesProvider, QuoteSource};

pub struct AppState<S> {
    pub config: AppConfig,
    pub provider: PriceSeriesProvider<S>,
    pub favorites: FavoritesStore,
    pub insight_log: InsightLog,

    /// Bearer token required for favorites mutations; mutations are refused
    /// when unset.
    pub admin_token: Option<String>,

    /// Instant the service started. Used for uptime in `/health`.
    pub start_time: Instant,
}

impl<S: QuoteSource> AppState<S> {
    /// Wire every subsystem from `config`. Paths are taken from the config
    /// and created lazily on first write.
    pub fn new(config: AppConfig, source: S, admin_token: Option<String>) -> Self {
        let clock = config.clock();
        let provider = PriceSeriesProvider::new(
            source,
            config.stock_data_dir(),
            config.price_cache_expiry_days,
            clock,
        );
        let favorites = FavoritesStore::new(config.favorites_path(), config.max_tickers_per_group);
        let insight_log =
            InsightLog::new(config.stock_insight_dir(), config.insight_retention_days, clock);

        Self {
            config,
            provider,
            favorites,
            insight_log,
            admin_token: admin_token.filter(|t| !t.is_empty()),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
