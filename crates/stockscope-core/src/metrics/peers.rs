//! Trailing P/E for a fixed set of market indices and sector funds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{DataProvider, RatioName, SourceError, Symbol};

/// One configured peer: a display label and its provider symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerIndex {
    pub label: &'static str,
    pub symbol: &'static str,
}

impl PeerIndex {
    pub const fn new(label: &'static str, symbol: &'static str) -> Self {
        Self { label, symbol }
    }
}

/// Index-tracking funds followed by sector SPDR funds. Index tickers
/// themselves carry no trailing P/E, so the tracking ETF stands in.
pub const PEER_INDICES: [PeerIndex; 8] = [
    PeerIndex::new("Dow Jones", "DIA"),
    PeerIndex::new("NASDAQ", "QQQ"),
    PeerIndex::new("S&P 500", "SPY"),
    PeerIndex::new("Technology", "XLK"),
    PeerIndex::new("Financials", "XLF"),
    PeerIndex::new("Energy", "XLE"),
    PeerIndex::new("Healthcare", "XLV"),
    PeerIndex::new("Real Estate", "XLRE"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRatio {
    pub label: String,
    pub symbol: String,
    pub trailing_pe: Option<f64>,
}

/// Peer trailing P/E values in configuration order, optionally next to the
/// selected stock's own value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeerRatioTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<PeerRatio>,
    pub entries: Vec<PeerRatio>,
}

impl PeerRatioTable {
    pub fn get(&self, label: &str) -> Option<&PeerRatio> {
        self.entries.iter().find(|entry| entry.label == label)
    }

    /// Number of labels with a reported value.
    pub fn available_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.trailing_pe.is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fetches one trailing P/E per configured peer.
///
/// Lookups run concurrently. A failed, timed out or unreported lookup leaves
/// that label's value empty and never fails the table.
pub struct PeerRatioAggregator<'a, P: ?Sized> {
    provider: &'a P,
    peers: Vec<PeerIndex>,
    timeout: Option<Duration>,
}

impl<'a, P> PeerRatioAggregator<'a, P>
where
    P: DataProvider + ?Sized,
{
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            peers: PEER_INDICES.to_vec(),
            timeout: None,
        }
    }

    pub fn with_peers(mut self, peers: impl IntoIterator<Item = PeerIndex>) -> Self {
        self.peers = peers.into_iter().collect();
        self
    }

    /// Bounds each individual lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub async fn collect(&self) -> PeerRatioTable {
        let lookups = self.peers.iter().map(|peer| self.lookup(*peer));
        let entries = futures::future::join_all(lookups).await;

        let table = PeerRatioTable {
            stock: None,
            entries,
        };
        debug!(
            available = table.available_count(),
            configured = table.len(),
            "collected peer ratios"
        );
        table
    }

    /// Collects the peers and the stock's own trailing P/E concurrently. The
    /// stock degrades like any peer; its label is its symbol.
    pub async fn collect_with_stock(&self, stock: &Symbol) -> PeerRatioTable {
        let (mut table, selected) =
            futures::join!(self.collect(), self.ratio(stock.as_str(), stock.as_str()));
        table.stock = Some(selected);
        table
    }

    async fn lookup(&self, peer: PeerIndex) -> PeerRatio {
        self.ratio(peer.label, peer.symbol).await
    }

    async fn ratio(&self, label: &str, raw_symbol: &str) -> PeerRatio {
        let trailing_pe = match self.fetch(raw_symbol).await {
            Ok(value) => value.filter(|pe| !pe.is_nan()),
            Err(error) => {
                warn!(
                    label,
                    symbol = raw_symbol,
                    code = error.code(),
                    error = %error,
                    "peer ratio unavailable"
                );
                None
            }
        };

        PeerRatio {
            label: label.to_owned(),
            symbol: raw_symbol.to_owned(),
            trailing_pe,
        }
    }

    async fn fetch(&self, raw_symbol: &str) -> Result<Option<f64>, SourceError> {
        let symbol = Symbol::parse(raw_symbol)
            .map_err(|error| SourceError::invalid_request(error.to_string()))?;
        let request = self.provider.scalar_ratio(&symbol, RatioName::TrailingPe);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, request).await.map_err(|_| {
                SourceError::unavailable(format!(
                    "trailing P/E lookup for '{symbol}' timed out after {}ms",
                    limit.as_millis()
                ))
            })?,
            None => request.await,
        }
    }
}
