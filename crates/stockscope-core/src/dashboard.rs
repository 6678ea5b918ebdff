//! View assembly for one selected instrument.
//!
//! [`Dashboard`] keeps no selection state: every view takes the symbol it
//! renders. Failures fetching a view's primary data are returned to the
//! caller; only peer lookups degrade to missing values.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::{
    dividend_table, eps_history, historic_pe, margins, DividendSeries, HistoricRatioSeries,
    MarginSeries, PeerRatioAggregator, PeerRatioTable,
};
use crate::{
    AnalystPriceTargets, CoreError, DataProvider, DatedSeries, FinancialStatement,
    InstrumentDirectory, LookbackRange, PriceSeries, SourceError, StatementFrequency, Symbol,
};

/// Price window used for the historic P/E view.
pub const HISTORIC_PE_RANGE: LookbackRange = LookbackRange::FiveYears;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub trailing_pe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub symbol: Symbol,
    pub name: String,
    pub currency: Option<String>,
    pub business_summary: Option<String>,
    pub key_metrics: KeyMetrics,
    pub analyst_targets: Option<AnalystPriceTargets>,
    pub range: LookbackRange,
    pub prices: PriceSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub symbol: Symbol,
    pub currency: Option<String>,
    pub income_statement: FinancialStatement,
    pub balance_sheet: FinancialStatement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advanced {
    pub symbol: Symbol,
    pub margins: MarginSeries,
    pub eps_history: DatedSeries<Option<f64>>,
    pub historic_pe: HistoricRatioSeries,
    pub dividends: DividendSeries,
}

pub struct Dashboard<P> {
    provider: P,
    directory: InstrumentDirectory,
    peer_timeout: Option<Duration>,
}

impl<P> Dashboard<P>
where
    P: DataProvider,
{
    pub fn new(provider: P, directory: InstrumentDirectory) -> Self {
        Self {
            provider,
            directory,
            peer_timeout: None,
        }
    }

    pub fn with_peer_timeout(mut self, timeout: Duration) -> Self {
        self.peer_timeout = Some(timeout);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn directory(&self) -> &InstrumentDirectory {
        &self.directory
    }

    pub fn resolve(&self, exchange: &str, name: &str) -> Result<Symbol, CoreError> {
        let symbol = self.directory.lookup(exchange, name)?;
        debug!(exchange, name, %symbol, "resolved instrument");
        Ok(symbol)
    }

    pub async fn overview(
        &self,
        symbol: &Symbol,
        range: LookbackRange,
    ) -> Result<Overview, CoreError> {
        let (metadata, prices) = futures::try_join!(
            self.provider.instrument_metadata(symbol),
            self.provider.price_history(symbol, range),
        )?;
        debug!(%symbol, %range, rows = prices.len(), "assembled overview");

        Ok(Overview {
            symbol: symbol.clone(),
            name: metadata.display_name().to_owned(),
            currency: metadata.currency,
            business_summary: metadata.long_business_summary,
            key_metrics: KeyMetrics {
                price_to_book: metadata.price_to_book,
                dividend_yield: metadata.dividend_yield,
                trailing_pe: metadata.trailing_pe,
            },
            analyst_targets: metadata.analyst_price_targets,
            range,
            prices,
        })
    }

    /// Yearly income statement and balance sheet.
    pub async fn financials(&self, symbol: &Symbol) -> Result<Financials, CoreError> {
        let frequency = StatementFrequency::Yearly;
        let (income_statement, balance_sheet) = futures::try_join!(
            self.provider.income_statement(symbol, frequency),
            self.provider.balance_sheet(symbol, frequency),
        )?;

        let currency = income_statement
            .currency()
            .or_else(|| balance_sheet.currency())
            .map(str::to_owned);

        Ok(Financials {
            symbol: symbol.clone(),
            currency,
            income_statement,
            balance_sheet,
        })
    }

    pub async fn margins(&self, symbol: &Symbol) -> Result<MarginSeries, CoreError> {
        let statement = self.yearly_income(symbol).await?;
        Ok(margins(&statement)?)
    }

    pub async fn pe_history(&self, symbol: &Symbol) -> Result<HistoricRatioSeries, CoreError> {
        let (prices, statement) = futures::try_join!(
            self.provider.price_history(symbol, HISTORIC_PE_RANGE),
            self.yearly_income(symbol),
        )?;
        Ok(historic_pe(&prices, &statement)?)
    }

    pub async fn dividends(&self, symbol: &Symbol) -> Result<DividendSeries, CoreError> {
        let payments = self.provider.dividends(symbol).await?;
        Ok(dividend_table(&payments))
    }

    /// Margins, EPS history, historic P/E and dividends from one fetch of
    /// each input.
    pub async fn advanced(&self, symbol: &Symbol) -> Result<Advanced, CoreError> {
        let (statement, prices, payments) = futures::try_join!(
            self.yearly_income(symbol),
            self.provider.price_history(symbol, HISTORIC_PE_RANGE),
            self.provider.dividends(symbol),
        )?;

        let advanced = Advanced {
            symbol: symbol.clone(),
            margins: margins(&statement)?,
            eps_history: eps_history(&statement),
            historic_pe: historic_pe(&prices, &statement)?,
            dividends: dividend_table(&payments),
        };
        debug!(
            %symbol,
            periods = advanced.margins.len(),
            price_rows = advanced.historic_pe.len(),
            dividends = advanced.dividends.len(),
            "assembled advanced view"
        );
        Ok(advanced)
    }

    pub async fn peers(&self) -> PeerRatioTable {
        self.peer_aggregator().collect().await
    }

    /// Peer table with `symbol`'s own trailing P/E alongside.
    pub async fn peers_with_stock(&self, symbol: &Symbol) -> PeerRatioTable {
        self.peer_aggregator().collect_with_stock(symbol).await
    }

    fn peer_aggregator(&self) -> PeerRatioAggregator<'_, P> {
        let aggregator = PeerRatioAggregator::new(&self.provider);
        match self.peer_timeout {
            Some(timeout) => aggregator.with_timeout(timeout),
            None => aggregator,
        }
    }

    async fn yearly_income(&self, symbol: &Symbol) -> Result<FinancialStatement, SourceError> {
        let frequency = StatementFrequency::Yearly;
        self.provider.income_statement(symbol, frequency).await
    }
}
