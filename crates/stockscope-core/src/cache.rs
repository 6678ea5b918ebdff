//! In-memory memoization of provider responses.
//!
//! [`CachedProvider`] wraps any [`DataProvider`] and stores each response as
//! JSON under a `(symbol, dataset, variant)` key. Cached values decode to the
//! same types the provider returns, so caching changes latency only.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::data_source::{DataProvider, Dataset, ProviderId, RatioName, SourceError, SourceFuture};
use crate::{
    DatedSeries, FinancialStatement, InstrumentMetadata, LookbackRange, PriceSeries,
    StatementFrequency, Symbol,
};

/// How a request interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Serve a live entry when present, otherwise fetch and store.
    #[default]
    Use,
    /// Always fetch, then overwrite the entry.
    Refresh,
    /// Always fetch and leave the cache untouched.
    Bypass,
}

/// Cache key: one dataset variant of one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: Symbol,
    pub dataset: Dataset,
    pub variant: String,
}

impl CacheKey {
    pub fn new(symbol: &Symbol, dataset: Dataset, variant: impl Into<String>) -> Self {
        Self {
            symbol: symbol.clone(),
            dataset,
            variant: variant.into(),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.symbol, self.dataset, self.variant)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    map: HashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

/// Thread-safe TTL store of serialized responses.
#[derive(Debug, Clone)]
pub struct CacheStore {
    inner: Arc<tokio::sync::RwLock<CacheInner>>,
}

impl CacheStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner {
                map: HashMap::new(),
                ttl,
            })),
        }
    }

    /// A store that never keeps anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let store = self.inner.read().await;
        store
            .map
            .get(key)
            .filter(|entry| Instant::now() <= entry.expires_at)
            .map(|entry| entry.body.clone())
    }

    pub async fn put(&self, key: CacheKey, body: String) {
        let mut store = self.inner.write().await;
        if store.ttl.is_zero() {
            return;
        }

        let now = Instant::now();
        store.map.retain(|_, entry| entry.expires_at > now);
        let expires_at = now + store.ttl;
        store.map.insert(key, CacheEntry { body, expires_at });
    }

    /// Drops every entry of `symbol`, e.g. when the selected instrument changes.
    pub async fn invalidate_symbol(&self, symbol: &Symbol) -> usize {
        let mut store = self.inner.write().await;
        let before = store.map.len();
        store.map.retain(|key, _| &key.symbol != symbol);
        before - store.map.len()
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Memoizing decorator around a provider.
pub struct CachedProvider<P> {
    inner: P,
    store: CacheStore,
    mode: CacheMode,
    hits: AtomicU64,
}

impl<P> CachedProvider<P>
where
    P: DataProvider,
{
    pub fn new(inner: P, store: CacheStore) -> Self {
        Self {
            inner,
            store,
            mode: CacheMode::default(),
            hits: AtomicU64::new(0),
        }
    }

    pub fn with_mode(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    /// Responses served from the cache so far.
    pub fn cache_hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub async fn invalidate_symbol(&self, symbol: &Symbol) -> usize {
        let removed = self.store.invalidate_symbol(symbol).await;
        debug!(%symbol, removed, "invalidated cached datasets");
        removed
    }

    async fn cached<T, F>(&self, key: CacheKey, fetch: F) -> Result<T, SourceError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, SourceError>>,
    {
        if self.mode == CacheMode::Use {
            if let Some(body) = self.store.get(&key).await {
                match serde_json::from_str(&body) {
                    Ok(value) => {
                        self.hits.fetch_add(1, Ordering::Relaxed);
                        debug!(%key, "cache hit");
                        return Ok(value);
                    }
                    Err(error) => warn!(%key, %error, "discarding undecodable cache entry"),
                }
            }
        }

        let value = fetch.await?;
        if self.mode != CacheMode::Bypass {
            match serde_json::to_string(&value) {
                Ok(body) => self.store.put(key, body).await,
                Err(error) => warn!(%key, %error, "response not cacheable"),
            }
        }
        Ok(value)
    }
}

impl<P> DataProvider for CachedProvider<P>
where
    P: DataProvider,
{
    fn id(&self) -> ProviderId {
        self.inner.id()
    }

    fn price_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: LookbackRange,
    ) -> SourceFuture<'a, PriceSeries> {
        let key = CacheKey::new(symbol, Dataset::PriceHistory, range.as_str());
        Box::pin(self.cached(key, self.inner.price_history(symbol, range)))
    }

    fn income_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        let key = CacheKey::new(symbol, Dataset::IncomeStatement, frequency.as_str());
        Box::pin(self.cached(key, self.inner.income_statement(symbol, frequency)))
    }

    fn balance_sheet<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        let key = CacheKey::new(symbol, Dataset::BalanceSheet, frequency.as_str());
        Box::pin(self.cached(key, self.inner.balance_sheet(symbol, frequency)))
    }

    fn dividends<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, DatedSeries<f64>> {
        let key = CacheKey::new(symbol, Dataset::Dividends, "all");
        Box::pin(self.cached(key, self.inner.dividends(symbol)))
    }

    fn scalar_ratio<'a>(
        &'a self,
        symbol: &'a Symbol,
        ratio: RatioName,
    ) -> SourceFuture<'a, Option<f64>> {
        let key = CacheKey::new(symbol, Dataset::ScalarRatio, ratio.as_str());
        Box::pin(self.cached(key, self.inner.scalar_ratio(symbol, ratio)))
    }

    fn instrument_metadata<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> SourceFuture<'a, InstrumentMetadata> {
        let key = CacheKey::new(symbol, Dataset::Metadata, "summary");
        Box::pin(self.cached(key, self.inner.instrument_metadata(symbol)))
    }
}
