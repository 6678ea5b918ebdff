//! Exchange/company/ticker lookup table.
//!
//! The table is a CSV file with the header `Market,Name,Symbol`. Selection
//! follows a two-step flow: pick an exchange, then a company listed on it.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{Symbol, ValidationError};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read instrument directory '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed instrument directory at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("directory entry '{name}' on '{exchange}' has an invalid symbol: {source}")]
    InvalidSymbol {
        exchange: String,
        name: String,
        #[source]
        source: ValidationError,
    },

    #[error("no instrument named '{name}' is listed on '{exchange}'")]
    NotFound { exchange: String, name: String },
}

/// One row of the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct DirectoryRecord {
    #[serde(rename = "Market")]
    market: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Symbol")]
    symbol: String,
}

/// In-memory lookup table, rows kept in file order.
#[derive(Debug, Clone, Default)]
pub struct InstrumentDirectory {
    records: Vec<DirectoryRecord>,
}

impl InstrumentDirectory {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DirectoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let directory = Self::from_reader(file)?;
        debug!(path = %path.display(), rows = directory.len(), "loaded instrument directory");
        Ok(directory)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, DirectoryError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for result in csv_reader.deserialize::<DirectoryRecord>() {
            let record = result.map_err(|source| DirectoryError::Csv {
                line: source.position().map_or(0, csv::Position::line),
                source,
            })?;
            records.push(record);
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct markets in first-seen order.
    pub fn exchanges(&self) -> Vec<&str> {
        let mut exchanges: Vec<&str> = Vec::new();
        for record in &self.records {
            if !exchanges.contains(&record.market.as_str()) {
                exchanges.push(&record.market);
            }
        }
        exchanges
    }

    /// Distinct company names listed on `exchange`, in first-seen order.
    pub fn stocks(&self, exchange: &str) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for record in self.records.iter().filter(|r| r.market == exchange) {
            if !names.contains(&record.name.as_str()) {
                names.push(&record.name);
            }
        }
        names
    }

    /// Ticker of the first row matching both exchange and name.
    pub fn lookup(&self, exchange: &str, name: &str) -> Result<Symbol, DirectoryError> {
        let record = self
            .records
            .iter()
            .find(|r| r.market == exchange && r.name == name)
            .ok_or_else(|| DirectoryError::NotFound {
                exchange: exchange.to_owned(),
                name: name.to_owned(),
            })?;

        Symbol::parse(&record.symbol).map_err(|source| DirectoryError::InvalidSymbol {
            exchange: exchange.to_owned(),
            name: name.to_owned(),
            source,
        })
    }
}
