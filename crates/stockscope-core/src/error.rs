use thiserror::Error;

use crate::data_source::SourceError;
use crate::directory::DirectoryError;

/// Validation and contract errors exposed by `stockscope-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid range '{value}', expected one of 1d, 5d, 1mo, 3mo, ytd, 1y, 5y, 10y, max")]
    InvalidRange { value: String },
    #[error("invalid statement frequency '{value}', expected yearly or quarterly")]
    InvalidFrequency { value: String },

    #[error("date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("series contains duplicate date {date}")]
    DuplicateDate { date: String },
    #[error("statement contains more than one period ending {date}")]
    DuplicatePeriod { date: String },
    #[error("ratio columns differ in length: numerator={numerator}, denominator={denominator}")]
    ColumnLengthMismatch { numerator: usize, denominator: usize },

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Lookup(#[from] DirectoryError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
