use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use time::{Date, OffsetDateTime, UtcOffset, Weekday};
use tracing::{debug, warn};

use crate::data_source::{DataProvider, ProviderId, RatioName, SourceError, SourceFuture};
use crate::http_client::{HttpClient, HttpError, HttpRequest, NoopHttpClient};
use crate::line_items;
use crate::throttling::RequestThrottle;
use crate::{
    AnalystPriceTargets, DatedSeries, FinancialStatement, FiscalPeriod, InstrumentMetadata,
    LookbackRange, MarketDate, PriceBar, PriceSeries, StatementFrequency, Symbol,
    ValidationError,
};

const REFERER: &str = "https://finance.yahoo.com/";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryDetail,defaultKeyStatistics,assetProfile,financialData";

/// Earliest statement period requested from the timeseries endpoint (1985-08-23).
const TIMESERIES_PERIOD_START: i64 = 493_590_046;

const CRUMB_TTL: Duration = Duration::from_secs(3_600);
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 120;

// ============================================================================
// Session: cookie + crumb handshake
// ============================================================================

#[derive(Debug, Default)]
struct CrumbState {
    crumb: Option<String>,
    fetched_at: Option<Instant>,
}

impl CrumbState {
    fn live(&self, ttl: Duration) -> Option<String> {
        match (&self.crumb, self.fetched_at) {
            (Some(crumb), Some(at)) if at.elapsed() < ttl => Some(crumb.clone()),
            _ => None,
        }
    }
}

/// Cookie/crumb session required by the query endpoints.
///
/// The cookie lives in the transport's jar; only the crumb is kept here. It
/// expires after an hour and is dropped whenever Yahoo answers 401. The lock
/// is held for the whole handshake, so concurrent callers on a cold session
/// wait for one negotiation and share its crumb.
#[derive(Debug)]
struct YahooSession {
    state: tokio::sync::Mutex<CrumbState>,
    ttl: Duration,
}

impl Default for YahooSession {
    fn default() -> Self {
        Self {
            state: tokio::sync::Mutex::new(CrumbState::default()),
            ttl: CRUMB_TTL,
        }
    }
}

impl YahooSession {
    async fn invalidate(&self) {
        *self.state.lock().await = CrumbState::default();
    }

    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        throttle: &RequestThrottle,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let mut state = self.state.lock().await;
        if let Some(crumb) = state.live(self.ttl) {
            return Ok(crumb);
        }

        throttle.ready().await;
        let cookie_request = HttpRequest::get(COOKIE_URL)
            .with_header("referer", REFERER)
            .with_timeout_ms(timeout_ms);
        // fc.yahoo.com answers 404 but still sets the session cookie.
        http_client
            .execute(cookie_request)
            .await
            .map_err(|e| transport_error("cookie handshake", e))?;

        for url in CRUMB_URLS {
            throttle.ready().await;
            let request = HttpRequest::get(url)
                .with_header("referer", REFERER)
                .with_timeout_ms(timeout_ms);
            let response = match http_client.execute(request).await {
                Ok(response) => response,
                Err(error) => {
                    debug!(url, error = %error, "crumb endpoint failed");
                    continue;
                }
            };

            if response.status == 429 {
                return Err(SourceError::rate_limited(
                    "yahoo rate limited the crumb request",
                ));
            }

            let body = response.body.trim();
            if response.is_success() && is_plausible_crumb(body) {
                state.crumb = Some(body.to_owned());
                state.fetched_at = Some(Instant::now());
                debug!("refreshed yahoo crumb");
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to obtain a yahoo crumb from any endpoint",
        ))
    }
}

fn is_plausible_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
        && !body.to_ascii_lowercase().contains("too many requests")
}

// ============================================================================
// Adapter
// ============================================================================

/// Yahoo Finance provider.
///
/// With an offline transport ([`NoopHttpClient`]) every method serves
/// deterministic sample data instead of calling the network.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    session: Arc<YahooSession>,
    throttle: RequestThrottle,
    timeout_ms: u64,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            session: Arc::new(YahooSession::default()),
            throttle: RequestThrottle::per_minute(DEFAULT_REQUESTS_PER_MINUTE),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Fetches `url` with the session crumb appended and maps HTTP failures.
    async fn get(&self, url: &str) -> Result<String, SourceError> {
        let crumb = self
            .session
            .crumb(self.http_client.as_ref(), &self.throttle, self.timeout_ms)
            .await?;
        let separator = if url.contains('?') { '&' } else { '?' };
        let url = format!("{url}{separator}crumb={}", urlencoding::encode(&crumb));

        self.throttle.ready().await;
        let request = HttpRequest::get(url.as_str())
            .with_header("referer", REFERER)
            .with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| transport_error("request", e))?;

        match response.status {
            200..=299 => Ok(response.body),
            401 => {
                self.session.invalidate().await;
                Err(SourceError::unavailable(
                    "yahoo rejected the session crumb (status 401)",
                ))
            }
            404 => Err(SourceError::not_found(format!(
                "yahoo has no data at {}",
                strip_query(&url)
            ))),
            429 => Err(SourceError::rate_limited("yahoo returned status 429")),
            status => Err(SourceError::unavailable(format!(
                "yahoo returned status {status}"
            ))),
        }
    }

    async fn fetch_chart(
        &self,
        symbol: &Symbol,
        range: LookbackRange,
    ) -> Result<ChartSeries, SourceError> {
        let url = format!(
            "{CHART_URL}/{}?range={}&interval=1d&events=div",
            urlencoding::encode(symbol.as_str()),
            range.as_str()
        );
        let body = self.get(&url).await?;
        let chart = parse_chart(&body)?;
        debug!(
            %symbol,
            range = range.as_str(),
            rows = chart.prices.len(),
            "fetched yahoo chart"
        );
        Ok(chart)
    }

    async fn fetch_statement(
        &self,
        symbol: &Symbol,
        frequency: StatementFrequency,
        items: &[&str],
    ) -> Result<FinancialStatement, SourceError> {
        let prefix = timeseries_prefix(frequency);
        let types = items
            .iter()
            .map(|item| format!("{prefix}{item}"))
            .collect::<Vec<_>>()
            .join(",");
        let encoded = urlencoding::encode(symbol.as_str());
        let url = format!(
            "{TIMESERIES_URL}/{encoded}?symbol={encoded}&type={types}&period1={TIMESERIES_PERIOD_START}&period2={}",
            OffsetDateTime::now_utc().unix_timestamp()
        );
        let body = self.get(&url).await?;
        let statement = parse_timeseries(&body, frequency)?;
        debug!(%symbol, %frequency, periods = statement.len(), "fetched yahoo statement");
        Ok(statement)
    }

    async fn fetch_metadata(&self, symbol: &Symbol) -> Result<InstrumentMetadata, SourceError> {
        let url = format!(
            "{QUOTE_SUMMARY_URL}/{}?modules={QUOTE_SUMMARY_MODULES}",
            urlencoding::encode(symbol.as_str())
        );
        let body = self.get(&url).await?;
        let mut metadata = parse_quote_summary(&body)?;
        metadata.symbol = Some(symbol.clone());
        Ok(metadata)
    }
}

impl DataProvider for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn price_history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: LookbackRange,
    ) -> SourceFuture<'a, PriceSeries> {
        Box::pin(async move {
            if self.use_real_api {
                Ok(self.fetch_chart(symbol, range).await?.prices)
            } else {
                fake_prices(symbol, range)
            }
        })
    }

    fn income_statement<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_statement(symbol, frequency, &line_items::INCOME_STATEMENT)
                    .await
            } else {
                fake_income_statement(symbol, frequency)
            }
        })
    }

    fn balance_sheet<'a>(
        &'a self,
        symbol: &'a Symbol,
        frequency: StatementFrequency,
    ) -> SourceFuture<'a, FinancialStatement> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_statement(symbol, frequency, &line_items::BALANCE_SHEET)
                    .await
            } else {
                fake_balance_sheet(symbol, frequency)
            }
        })
    }

    fn dividends<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, DatedSeries<f64>> {
        Box::pin(async move {
            if self.use_real_api {
                Ok(self.fetch_chart(symbol, LookbackRange::Max).await?.dividends)
            } else {
                fake_dividends(symbol)
            }
        })
    }

    fn scalar_ratio<'a>(
        &'a self,
        symbol: &'a Symbol,
        ratio: RatioName,
    ) -> SourceFuture<'a, Option<f64>> {
        Box::pin(async move {
            let metadata = self.instrument_metadata(symbol).await?;
            Ok(ratio.pick(&metadata))
        })
    }

    fn instrument_metadata<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> SourceFuture<'a, InstrumentMetadata> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_metadata(symbol).await
            } else {
                Ok(fake_metadata(symbol))
            }
        })
    }
}

// ============================================================================
// Payload parsing
// ============================================================================

struct ChartSeries {
    prices: PriceSeries,
    dividends: DatedSeries<f64>,
}

fn parse_chart(body: &str) -> Result<ChartSeries, SourceError> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;
    if let Some(error) = response.chart.error {
        return Err(error.into_source_error("chart"));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found("yahoo chart returned no result"))?;

    let offset_seconds = result.meta.gmtoffset.unwrap_or(0);
    let zone = UtcOffset::from_whole_seconds(offset_seconds).map_err(|e| {
        SourceError::internal(format!("invalid exchange offset {offset_seconds}: {e}"))
    })?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    // Keyed by trading day; a trailing intraday row for today replaces the
    // daily row of the same date.
    let mut rows = BTreeMap::new();
    for (index, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = quote.close.get(index).copied().flatten() else {
            continue;
        };
        let volume = quote
            .volume
            .get(index)
            .copied()
            .flatten()
            .and_then(|v| u64::try_from(v).ok());
        let day = trading_day(*ts, zone)?;
        rows.insert(day, PriceBar::new(close, volume));
    }

    let mut payments = BTreeMap::new();
    if let Some(events) = result.events {
        for dividend in events.dividends.into_values() {
            payments.insert(trading_day(dividend.date, zone)?, dividend.amount);
        }
    }

    Ok(ChartSeries {
        prices: DatedSeries::from_pairs(Some(zone), rows).map_err(validation_to_error)?,
        dividends: DatedSeries::from_pairs(Some(zone), payments).map_err(validation_to_error)?,
    })
}

fn trading_day(unix_seconds: i64, zone: UtcOffset) -> Result<MarketDate, SourceError> {
    MarketDate::from_unix_at_offset(unix_seconds, zone)
        .map(MarketDate::at_midnight)
        .map_err(validation_to_error)
}

fn timeseries_prefix(frequency: StatementFrequency) -> &'static str {
    match frequency {
        StatementFrequency::Yearly => "annual",
        StatementFrequency::Quarterly => "quarterly",
    }
}

fn parse_timeseries(
    body: &str,
    frequency: StatementFrequency,
) -> Result<FinancialStatement, SourceError> {
    let response: TimeseriesResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo timeseries: {e}")))?;
    if let Some(error) = response.timeseries.error {
        return Err(error.into_source_error("timeseries"));
    }

    let prefix = timeseries_prefix(frequency);
    let mut periods: BTreeMap<MarketDate, FiscalPeriod> = BTreeMap::new();
    let mut currency = None;

    for result in response.timeseries.result.unwrap_or_default() {
        // Each result carries exactly one line item under a dynamic key.
        let Some(type_name) = result["meta"]["type"].get(0).and_then(Value::as_str) else {
            continue;
        };
        let Some(item) = type_name.strip_prefix(prefix) else {
            continue;
        };
        let Some(cells) = result[type_name].as_array() else {
            continue;
        };

        for cell in cells {
            let (Some(as_of), Some(value)) = (
                cell["asOfDate"].as_str(),
                cell["reportedValue"]["raw"].as_f64(),
            ) else {
                continue;
            };
            let end = MarketDate::parse(as_of).map_err(validation_to_error)?;
            if currency.is_none() {
                currency = cell["currencyCode"].as_str().map(str::to_owned);
            }
            let period = periods
                .remove(&end)
                .unwrap_or_else(|| FiscalPeriod::new(end))
                .with_item(item, value);
            periods.insert(end, period);
        }
    }

    FinancialStatement::new(frequency, periods.into_values().collect())
        .map(|statement| statement.with_currency(currency))
        .map_err(validation_to_error)
}

fn parse_quote_summary(body: &str) -> Result<InstrumentMetadata, SourceError> {
    let response: QuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo quoteSummary: {e}")))?;
    if let Some(error) = response.quote_summary.error {
        return Err(error.into_source_error("quoteSummary"));
    }

    let result = response
        .quote_summary
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| SourceError::not_found("yahoo quoteSummary returned no result"))?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let statistics = result.default_key_statistics.unwrap_or_default();
    let profile = result.asset_profile.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Ok(InstrumentMetadata {
        symbol: None,
        long_name: price.long_name,
        currency: price
            .currency
            .or(detail.currency)
            .or(financial.financial_currency),
        price_to_book: raw(&statistics.price_to_book),
        dividend_yield: raw(&detail.dividend_yield),
        trailing_pe: raw(&detail.trailing_pe),
        forward_pe: raw(&detail.forward_pe).or_else(|| raw(&statistics.forward_pe)),
        long_business_summary: profile.long_business_summary,
        analyst_price_targets: AnalystPriceTargets::from_parts(
            raw(&financial.target_high_price),
            raw(&financial.target_low_price),
            raw(&financial.target_mean_price),
        ),
    })
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(YahooRawValue::value)
}

fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn transport_error(stage: &str, error: HttpError) -> SourceError {
    if error.timed_out() {
        warn!(stage, error = %error, "yahoo request timed out");
    }
    SourceError::unavailable(format!("yahoo {stage} failed: {}", error.message()))
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn into_source_error(self, endpoint: &str) -> SourceError {
        let message = format!(
            "yahoo {endpoint} error {}: {}",
            self.code,
            self.description.as_deref().unwrap_or("no description")
        );
        if self.code.eq_ignore_ascii_case("not found") {
            SourceError::not_found(message)
        } else {
            SourceError::unavailable(message)
        }
    }
}

/// `{"raw": 1.23, "fmt": "1.23"}` wrapper; `{}` and non-numeric raws are missing.
#[derive(Debug, Default, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<Value>,
}

impl YahooRawValue {
    fn value(&self) -> Option<f64> {
        self.raw.as_ref().and_then(Value::as_f64)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    events: Option<ChartEvents>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: HashMap<String, ChartDividend>,
}

#[derive(Debug, Deserialize)]
struct ChartDividend {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesData,
}

#[derive(Debug, Deserialize)]
struct TimeseriesData {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryData,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryData {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
    asset_profile: Option<AssetProfileModule>,
    financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<YahooRawValue>,
    dividend_yield: Option<YahooRawValue>,
    currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct KeyStatisticsModule {
    price_to_book: Option<YahooRawValue>,
    #[serde(rename = "forwardPE")]
    forward_pe: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AssetProfileModule {
    long_business_summary: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FinancialDataModule {
    target_high_price: Option<YahooRawValue>,
    target_low_price: Option<YahooRawValue>,
    target_mean_price: Option<YahooRawValue>,
    financial_currency: Option<String>,
}

// ============================================================================
// Offline sample data
// ============================================================================

/// Last session of the offline calendar, so sample output is reproducible.
const FAKE_ANCHOR: Date = time::macros::date!(2024-12-31);
const FAKE_ZONE_SECONDS: i32 = -5 * 3_600;

fn fake_prices(symbol: &Symbol, range: LookbackRange) -> Result<PriceSeries, SourceError> {
    let seed = symbol_seed(symbol);
    let zone = UtcOffset::from_whole_seconds(FAKE_ZONE_SECONDS)
        .map_err(|e| SourceError::internal(e.to_string()))?;

    let days = trading_days_until(FAKE_ANCHOR, range.approx_trading_days());
    let rows = days.into_iter().enumerate().map(|(index, day)| {
        let drift = index as f64 * 0.05;
        let wave = (seed.wrapping_add(index as u64) % 40) as f64 / 10.0;
        let close = 60.0 + (seed % 120) as f64 + drift + wave;
        let volume = 1_000_000 + (seed % 50_000) + index as u64 * 37;
        (MarketDate::from_date(day), PriceBar::new(close, Some(volume)))
    });

    DatedSeries::from_pairs(Some(zone), rows).map_err(validation_to_error)
}

fn trading_days_until(anchor: Date, count: usize) -> Vec<Date> {
    let mut days = Vec::with_capacity(count);
    let mut cursor = Some(anchor);
    while days.len() < count {
        let Some(day) = cursor else { break };
        if !matches!(day.weekday(), Weekday::Saturday | Weekday::Sunday) {
            days.push(day);
        }
        cursor = day.previous_day();
    }
    days.reverse();
    days
}

fn fake_period_ends(frequency: StatementFrequency) -> Vec<MarketDate> {
    let year = FAKE_ANCHOR.year();
    let ends = match frequency {
        StatementFrequency::Yearly => (0..4)
            .map(|back| Date::from_calendar_date(year - back, time::Month::December, 31))
            .collect::<Vec<_>>(),
        StatementFrequency::Quarterly => [
            (year, time::Month::December, 31),
            (year, time::Month::September, 30),
            (year, time::Month::June, 30),
            (year, time::Month::March, 31),
            (year - 1, time::Month::December, 31),
        ]
        .into_iter()
        .map(|(y, m, d)| Date::from_calendar_date(y, m, d))
        .collect(),
    };

    ends.into_iter()
        .filter_map(Result::ok)
        .map(MarketDate::from_date)
        .collect()
}

fn frequency_scale(frequency: StatementFrequency) -> f64 {
    match frequency {
        StatementFrequency::Yearly => 1.0,
        StatementFrequency::Quarterly => 0.25,
    }
}

fn fake_income_statement(
    symbol: &Symbol,
    frequency: StatementFrequency,
) -> Result<FinancialStatement, SourceError> {
    let seed = symbol_seed(symbol);
    let scale = frequency_scale(frequency);
    let periods = fake_period_ends(frequency)
        .into_iter()
        .enumerate()
        .map(|(back, end)| {
            let growth = 1.0 - back as f64 * 0.06;
            let revenue = (40_000.0 + (seed % 9_000) as f64) * 1e6 * scale * growth;
            let gross = revenue * (0.35 + (seed % 20) as f64 / 100.0);
            let operating = gross * 0.55;
            let net = operating * 0.8;
            let eps = net / 2.5e9;
            FiscalPeriod::new(end)
                .with_item(line_items::TOTAL_REVENUE, revenue)
                .with_item(line_items::GROSS_PROFIT, gross)
                .with_item(line_items::OPERATING_INCOME, operating)
                .with_item(line_items::NET_INCOME, net)
                .with_item(line_items::DILUTED_EPS, eps)
                .with_item(line_items::BASIC_EPS, eps * 1.01)
        })
        .collect();

    FinancialStatement::new(frequency, periods)
        .map(|statement| statement.with_currency(Some(String::from("USD"))))
        .map_err(validation_to_error)
}

fn fake_balance_sheet(
    symbol: &Symbol,
    frequency: StatementFrequency,
) -> Result<FinancialStatement, SourceError> {
    let seed = symbol_seed(symbol);
    let periods = fake_period_ends(frequency)
        .into_iter()
        .enumerate()
        .map(|(back, end)| {
            let assets = (90_000.0 + (seed % 30_000) as f64) * 1e6 * (1.0 - back as f64 * 0.04);
            let liabilities = assets * 0.6;
            FiscalPeriod::new(end)
                .with_item(line_items::TOTAL_ASSETS, assets)
                .with_item(line_items::TOTAL_LIABILITIES, liabilities)
                .with_item(line_items::STOCKHOLDERS_EQUITY, assets - liabilities)
                .with_item(line_items::CASH_AND_EQUIVALENTS, assets * 0.12)
                .with_item(line_items::TOTAL_DEBT, liabilities * 0.45)
        })
        .collect();

    FinancialStatement::new(frequency, periods)
        .map(|statement| statement.with_currency(Some(String::from("USD"))))
        .map_err(validation_to_error)
}

fn fake_dividends(symbol: &Symbol) -> Result<DatedSeries<f64>, SourceError> {
    let zone = UtcOffset::from_whole_seconds(FAKE_ZONE_SECONDS)
        .map_err(|e| SourceError::internal(e.to_string()))?;
    if symbol.is_index() {
        return Ok(DatedSeries::empty(Some(zone)));
    }

    let seed = symbol_seed(symbol);
    let base = 0.10 + (seed % 40) as f64 / 100.0;
    let months = [
        time::Month::February,
        time::Month::May,
        time::Month::August,
        time::Month::November,
    ];
    let payments = (0..5)
        .flat_map(|back| {
            months
                .into_iter()
                .map(move |month| (FAKE_ANCHOR.year() - 4 + back, month, back))
        })
        .filter_map(|(year, month, back)| {
            let day = Date::from_calendar_date(year, month, 9).ok()?;
            Some((MarketDate::from_date(day), base + back as f64 * 0.01))
        });

    DatedSeries::from_pairs(Some(zone), payments).map_err(validation_to_error)
}

fn fake_metadata(symbol: &Symbol) -> InstrumentMetadata {
    let seed = symbol_seed(symbol);
    let close = 60.0 + (seed % 120) as f64;
    InstrumentMetadata {
        symbol: Some(symbol.clone()),
        long_name: Some(format!("{symbol} Sample Holdings")),
        currency: Some(String::from("USD")),
        price_to_book: Some(1.5 + (seed % 80) as f64 / 10.0),
        dividend_yield: (!symbol.is_index()).then(|| 0.004 + (seed % 30) as f64 / 1_000.0),
        trailing_pe: Some(12.0 + (seed % 250) as f64 / 10.0),
        forward_pe: Some(11.0 + (seed % 200) as f64 / 10.0),
        long_business_summary: Some(format!(
            "{symbol} is an offline sample instrument used when no network transport is configured."
        )),
        analyst_price_targets: (!symbol.is_index()).then_some(AnalystPriceTargets {
            high: Some(close * 1.3),
            low: Some(close * 0.8),
            mean: Some(close * 1.08),
        }),
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_rows_use_exchange_trading_day() {
        // 2024-01-02T14:30:00Z and 2024-01-03T14:30:00Z, New York session opens.
        let body = r#"{"chart":{"result":[{
            "meta":{"currency":"USD","gmtoffset":-18000},
            "timestamp":[1704205800,1704292200],
            "events":{"dividends":{"1704292200":{"amount":0.24,"date":1704292200}}},
            "indicators":{"quote":[{"close":[185.64,null],"volume":[82488700,58414500]}]}
        }],"error":null}}"#;

        let chart = parse_chart(body).expect("chart parses");
        assert_eq!(chart.prices.len(), 1);
        assert_eq!(chart.prices.zone().map(UtcOffset::whole_hours), Some(-5));
        let first = chart.prices.first().expect("one row");
        assert_eq!(first.date.to_string(), "2024-01-02");
        assert_eq!(first.value.volume, Some(82_488_700));
        assert_eq!(chart.dividends.values().copied().collect::<Vec<_>>(), vec![0.24]);
    }

    #[test]
    fn chart_error_object_maps_to_not_found() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let error = parse_chart(body).err().expect("must fail");
        assert_eq!(error.code(), "source.not_found");
    }

    #[test]
    fn quote_summary_keeps_absent_fields_empty() {
        let body = r#"{"quoteSummary":{"result":[{
            "price":{"longName":"Apple Inc.","currency":"USD"},
            "summaryDetail":{"trailingPE":{"raw":31.2,"fmt":"31.20"},"dividendYield":{}},
            "defaultKeyStatistics":{"priceToBook":{"raw":47.1}}
        }],"error":null}}"#;

        let metadata = parse_quote_summary(body).expect("summary parses");
        assert_eq!(metadata.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(metadata.trailing_pe, Some(31.2));
        assert_eq!(metadata.price_to_book, Some(47.1));
        assert_eq!(metadata.dividend_yield, None);
        assert_eq!(metadata.long_business_summary, None);
        assert_eq!(metadata.analyst_price_targets, None);
    }

    #[test]
    fn timeseries_groups_items_by_period() {
        let body = r#"{"timeseries":{"result":[
            {"meta":{"symbol":["AAPL"],"type":["annualTotalRevenue"]},
             "annualTotalRevenue":[
                {"asOfDate":"2022-09-30","currencyCode":"USD","reportedValue":{"raw":394328000000.0}},
                {"asOfDate":"2023-09-30","currencyCode":"USD","reportedValue":{"raw":383285000000.0}}]},
            {"meta":{"symbol":["AAPL"],"type":["annualDilutedEPS"]},
             "annualDilutedEPS":[null,
                {"asOfDate":"2023-09-30","currencyCode":"USD","reportedValue":{"raw":6.13}}]},
            {"meta":{"symbol":["AAPL"],"type":["annualGrossProfit"]}}
        ],"error":null}}"#;

        let statement =
            parse_timeseries(body, StatementFrequency::Yearly).expect("timeseries parses");
        assert_eq!(statement.len(), 2);
        assert_eq!(statement.currency(), Some("USD"));
        assert_eq!(
            statement
                .line_item(line_items::DILUTED_EPS)
                .values()
                .copied()
                .collect::<Vec<_>>(),
            vec![None, Some(6.13)]
        );
        assert!(statement
            .line_item(line_items::GROSS_PROFIT)
            .values()
            .all(Option::is_none));
    }

    #[test]
    fn offline_prices_cover_requested_range() {
        let symbol = Symbol::parse("AAPL").expect("valid symbol");
        let prices = fake_prices(&symbol, LookbackRange::OneMonth).expect("offline prices");
        assert_eq!(prices.len(), LookbackRange::OneMonth.approx_trading_days());
        assert_eq!(
            prices.last().map(|entry| entry.date),
            Some(MarketDate::from_date(FAKE_ANCHOR))
        );
    }

    #[test]
    fn crumb_plausibility() {
        assert!(is_plausible_crumb("aB3.dE/fG"));
        assert!(!is_plausible_crumb(""));
        assert!(!is_plausible_crumb("<html>blocked</html>"));
        assert!(!is_plausible_crumb("Too Many Requests"));
    }
}
