//! Provider contract and its error type.
//!
//! [`DataProvider`] is the seam between the metric transforms and whatever
//! serves market data. Every method returns a boxed future so the trait
//! stays object safe and adapters can be decorated (see
//! [`CachedProvider`](crate::CachedProvider)).
//!
//! | Method | Response |
//! |--------|----------|
//! | [`price_history`](DataProvider::price_history) | [`PriceSeries`] |
//! | [`income_statement`](DataProvider::income_statement) | [`FinancialStatement`] |
//! | [`balance_sheet`](DataProvider::balance_sheet) | [`FinancialStatement`] |
//! | [`dividends`](DataProvider::dividends) | `DatedSeries<f64>` |
//! | [`scalar_ratio`](DataProvider::scalar_ratio) | `Option<f64>` |
//! | [`instrument_metadata`](DataProvider::instrument_metadata) | [`InstrumentMetadata`] |
//!
//! Fields the provider does not report come back as `None`, never as zero.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{
    DatedSeries, FinancialStatement, InstrumentMetadata, LookbackRange, PriceSeries,
    StatementFrequency, Symbol,
};

/// Canonical provider identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset kinds served by a provider, used for cache keys and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    PriceHistory,
    IncomeStatement,
    BalanceSheet,
    Dividends,
    ScalarRatio,
    Metadata,
}

impl Dataset {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceHistory => "price_history",
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::Dividends => "dividends",
            Self::ScalarRatio => "scalar_ratio",
            Self::Metadata => "metadata",
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-valued valuation ratios a provider can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioName {
    TrailingPe,
    ForwardPe,
    PriceToBook,
}

impl RatioName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrailingPe => "trailing_pe",
            Self::ForwardPe => "forward_pe",
            Self::PriceToBook => "price_to_book",
        }
    }

    /// Reads the ratio from already fetched metadata.
    pub fn pick(self, metadata: &InstrumentMetadata) -> Option<f64> {
        match self {
            Self::TrailingPe => metadata.trailing_pe,
            Self::ForwardPe => metadata.forward_pe,
            Self::PriceToBook => metadata.price_to_book,
        }
    }
}

impl Display for RatioName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    NotFound,
    InvalidRequest,
    Internal,
}

/// Structured provider error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Boxed future returned by every [`DataProvider`] method.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Market data provider contract.
///
/// Implementations must be `Send + Sync`; the peer aggregator issues several
/// requests against one provider concurrently.
pub trait DataProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Daily close and volume over `range`, keyed in the exchange's zone.
    fn price_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: LookbackRange,
    ) -> SourceFuture<'a, PriceSeries>;

    fn income_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement>;

    fn balance_sheet<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement>;

    /// Every recorded dividend payment, keyed by ex-date.
    fn dividends<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, DatedSeries<f64>>;

    /// One valuation ratio; `Ok(None)` when the provider does not report it.
    fn scalar_ratio<'a>(
        &'a self,
        symbol: &'a Symbol,
        ratio: RatioName,
    ) -> SourceFuture<'a, Option<f64>>;

    fn instrument_metadata<'a>(&'a self, symbol: &'a Symbol)
        -> SourceFuture<'a, InstrumentMetadata>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SourceError::unavailable("x").code(), "source.unavailable");
        assert_eq!(SourceError::not_found("x").code(), "source.not_found");
        assert!(SourceError::rate_limited("x").retryable());
        assert!(!SourceError::invalid_request("x").retryable());
    }

    #[test]
    fn ratio_name_picks_metadata_field() {
        let metadata = InstrumentMetadata {
            trailing_pe: Some(21.5),
            ..InstrumentMetadata::default()
        };
        assert_eq!(RatioName::TrailingPe.pick(&metadata), Some(21.5));
        assert_eq!(RatioName::PriceToBook.pick(&metadata), None);
    }
}
