//! # Domain Models
//!
//! Validated value types shared by providers, transforms and the CLI.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Normalized provider ticker |
//! | [`LookbackRange`] | Price-history window (`1d` .. `max`) |
//! | [`MarketDate`] | Zone-free wall-clock key |
//! | [`DatedSeries`] | Strictly ordered date-keyed series with a zone annotation |
//! | [`PriceSeries`] | Daily `Close` / `Volume` rows |
//! | [`FinancialStatement`] | Fiscal periods of named line items |
//! | [`InstrumentMetadata`] | Descriptive and valuation fields, all optional |
//! | [`UtcDateTime`] | UTC timestamp for envelope metadata |
//!
//! Constructors enforce ordering and uniqueness of keys, so every series and
//! statement handed to the metric transforms is already well-formed.

mod instrument;
mod price;
mod range;
mod series;
mod statement;
mod symbol;
mod timestamp;

pub use instrument::{AnalystPriceTargets, InstrumentMetadata, UNKNOWN_STOCK};
pub use price::{PriceBar, PriceSeries};
pub use range::LookbackRange;
pub use series::{DatedSeries, DatedValue};
pub use statement::{line_items, FinancialStatement, FiscalPeriod, StatementFrequency};
pub use symbol::Symbol;
pub use timestamp::{MarketDate, UtcDateTime};
