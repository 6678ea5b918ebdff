//! Core contracts for stockscope.
//!
//! This crate contains:
//! - Validated domain models (symbols, dated series, statements)
//! - The derived-metrics pipeline (alignment, ratios, fundamentals, peer P/E)
//! - The provider contract, the Yahoo adapter and a caching decorator
//! - The exchange/ticker directory and the dashboard views built on top
//! - Response envelope and structured errors

pub mod adapters;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod directory;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod metrics;
pub mod throttling;

pub use adapters::YahooAdapter;
pub use cache::{CacheKey, CacheMode, CacheStore, CachedProvider};
pub use config::StockscopeConfig;
pub use dashboard::{Advanced, Dashboard, Financials, KeyMetrics, Overview};
pub use data_source::{
    DataProvider, Dataset, ProviderId, RatioName, SourceError, SourceErrorKind, SourceFuture,
};
pub use directory::{DirectoryError, InstrumentDirectory};
pub use domain::{
    line_items, AnalystPriceTargets, DatedSeries, DatedValue, FinancialStatement, FiscalPeriod,
    InstrumentMetadata, LookbackRange, MarketDate, PriceBar, PriceSeries, StatementFrequency,
    Symbol, UtcDateTime, UNKNOWN_STOCK,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use metrics::{
    dividend_table, eps_history, forward_fill, historic_pe, margins, ratio, ratio_of,
    DividendRow, DividendSeries, HistoricRatioRow, HistoricRatioSeries, MarginRow, MarginSeries,
    PeerIndex, PeerRatio, PeerRatioAggregator, PeerRatioTable, PEER_INDICES,
};
pub use throttling::RequestThrottle;
