//! Shared fixtures for behavior tests: date helpers and an in-memory provider.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stockscope_core::{
    DataProvider, DatedSeries, FinancialStatement, FiscalPeriod, InstrumentMetadata,
    LookbackRange, MarketDate, PriceBar, PriceSeries, ProviderId, RatioName, SourceError,
    SourceFuture, StatementFrequency, Symbol,
};

pub fn day(raw: &str) -> MarketDate {
    MarketDate::parse(raw).expect("valid test date")
}

pub fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid test symbol")
}

/// Daily closes without volume, timezone-naive.
pub fn prices(rows: &[(&str, f64)]) -> PriceSeries {
    DatedSeries::from_pairs(
        None,
        rows.iter()
            .map(|(date, close)| (day(date), PriceBar::new(*close, None))),
    )
    .expect("unique price dates")
}

/// Yearly statement from `(period end, [(line item, value)])` rows.
pub fn statement(periods: &[(&str, &[(&str, f64)])]) -> FinancialStatement {
    let periods = periods
        .iter()
        .map(|(end, items)| {
            items
                .iter()
                .fold(FiscalPeriod::new(day(end)), |period, (name, value)| {
                    period.with_item(*name, *value)
                })
        })
        .collect();
    FinancialStatement::new(StatementFrequency::Yearly, periods).expect("unique period ends")
}

#[derive(Clone)]
enum RatioReply {
    Value(Option<f64>),
    Fail(SourceError),
    Slow(Duration, Option<f64>),
}

/// Scripted provider. Unscripted ratios report `Ok(None)`.
#[derive(Default)]
pub struct StubProvider {
    prices: Option<PriceSeries>,
    income: Option<FinancialStatement>,
    balance: Option<FinancialStatement>,
    dividends: Option<DatedSeries<f64>>,
    metadata: InstrumentMetadata,
    ratios: HashMap<String, RatioReply>,
    primary_failure: Option<SourceError>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prices(mut self, prices: PriceSeries) -> Self {
        self.prices = Some(prices);
        self
    }

    pub fn with_income(mut self, statement: FinancialStatement) -> Self {
        self.income = Some(statement);
        self
    }

    pub fn with_balance(mut self, statement: FinancialStatement) -> Self {
        self.balance = Some(statement);
        self
    }

    pub fn with_dividends(mut self, dividends: DatedSeries<f64>) -> Self {
        self.dividends = Some(dividends);
        self
    }

    pub fn with_metadata(mut self, metadata: InstrumentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_ratio(mut self, symbol: &str, value: f64) -> Self {
        self.ratios
            .insert(symbol.to_owned(), RatioReply::Value(Some(value)));
        self
    }

    pub fn with_failing_ratio(mut self, symbol: &str) -> Self {
        self.ratios.insert(
            symbol.to_owned(),
            RatioReply::Fail(SourceError::unavailable(format!("{symbol} lookup failed"))),
        );
        self
    }

    pub fn with_slow_ratio(mut self, symbol: &str, delay: Duration, value: f64) -> Self {
        self.ratios
            .insert(symbol.to_owned(), RatioReply::Slow(delay, Some(value)));
        self
    }

    /// Every non-ratio call fails with `error`.
    pub fn failing_with(mut self, error: SourceError) -> Self {
        self.primary_failure = Some(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn primary<T: Clone>(&self, value: &Option<T>, what: &str) -> Result<T, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.primary_failure {
            return Err(error.clone());
        }
        value
            .clone()
            .ok_or_else(|| SourceError::not_found(format!("no scripted {what}")))
    }
}

impl DataProvider for StubProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn price_history<'a>(
        &'a self,
        _symbol: &'a Symbol,
        _range: LookbackRange,
    ) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move { self.primary(&self.prices, "prices") })
    }

    fn income_statement<'a>(
        &'a self,
        _symbol: &'a Symbol,
        _frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async move { self.primary(&self.income, "income statement") })
    }

    fn balance_sheet<'a>(
        &'a self,
        _symbol: &'a Symbol,
        _frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async move { self.primary(&self.balance, "balance sheet") })
    }

    fn dividends<'a>(&'a self, _symbol: &'a Symbol) -> SourceFuture<'a, DatedSeries<f64>> {
        Box::pin(async move { self.primary(&self.dividends, "dividends") })
    }

    fn scalar_ratio<'a>(
        &'a self,
        symbol: &'a Symbol,
        _ratio: RatioName,
    ) -> SourceFuture<'a, Option<f64>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.ratios.get(symbol.as_str()).cloned() {
                Some(RatioReply::Value(value)) => Ok(value),
                Some(RatioReply::Fail(error)) => Err(error),
                Some(RatioReply::Slow(delay, value)) => {
                    tokio::time::sleep(delay).await;
                    Ok(value)
                }
                None => Ok(None),
            }
        })
    }

    fn instrument_metadata<'a>(
        &'a self,
        _symbol: &'a Symbol,
    ) -> SourceFuture<'a, InstrumentMetadata> {
        Box::pin(async move {
            let metadata = Some(self.metadata.clone());
            self.primary(&metadata, "metadata")
        })
    }
}
