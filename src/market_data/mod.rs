// =============================================================================
// Market data: quote sources and the cached series provider
// =============================================================================

pub mod provider;
pub mod yahoo;

pub use provider::{normalize_ticker, PriceSeriesProvider, QuoteSource, SeriesLookup};
pub use yahoo::YahooClient;
