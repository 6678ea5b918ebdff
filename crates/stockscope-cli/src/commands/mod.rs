mod advanced;
mod directory;
mod financials;
mod overview;
mod peers;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use stockscope_core::{
    CacheMode, CacheStore, CachedProvider, Dashboard, DataProvider, Envelope, EnvelopeError,
    EnvelopeMeta, InstrumentDirectory, ProviderId, ReqwestHttpClient, RequestThrottle,
    SourceError, StockscopeConfig, Symbol, YahooAdapter,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cli::{Cli, Command, InstrumentArgs};
use crate::error::CliError;
use crate::output::Table;

type AppDashboard = Dashboard<CachedProvider<YahooAdapter>>;

pub struct CommandResult {
    pub data: Value,
    pub tables: Vec<Table>,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub symbol: Option<Symbol>,
    pub provider: Option<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            tables: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            symbol: None,
            provider: None,
        }
    }

    /// Primary data could not be fetched; the envelope carries the error.
    pub fn failed(error: &SourceError) -> Self {
        Self::ok(Value::Null)
            .with_provider(ProviderId::Yahoo)
            .with_error(EnvelopeError::from(error))
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_error(mut self, error: EnvelopeError) -> Self {
        self.errors.push(error);
        self
    }

    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }
}

pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub tables: Vec<Table>,
}

impl CommandOutput {
    /// Wraps a command outcome in an envelope. A failed primary fetch still
    /// yields an envelope, with null data and the source error; other
    /// failures abort the command.
    pub fn assemble(
        outcome: Result<CommandResult, CliError>,
        latency_ms: u64,
        cache_hit: bool,
        mock: bool,
    ) -> Result<Self, CliError> {
        let command_result = match outcome {
            Ok(result) => result,
            Err(CliError::Source(error)) => CommandResult::failed(&error),
            Err(error) => return Err(error),
        };

        let CommandResult {
            data,
            tables,
            warnings,
            errors,
            symbol,
            provider,
        } = command_result;

        let mut meta =
            EnvelopeMeta::new(Uuid::new_v4().to_string(), latency_ms)?.with_cache_hit(cache_hit);
        if let Some(provider) = provider {
            meta = meta.with_provider(provider);
        }
        if let Some(symbol) = symbol {
            meta = meta.with_symbol(symbol);
        }

        if mock && provider.is_some() {
            meta.push_warning("--mock is set: values are deterministic offline samples");
        }
        for warning in warnings {
            meta.push_warning(warning);
        }

        let envelope = Envelope::with_errors(meta, data, errors)?;
        Ok(Self { envelope, tables })
    }

    /// Process exit code once the envelope has been rendered: 3 when it
    /// carries errors, and a strict-mode failure when `strict` is set and
    /// anything was reported.
    pub fn exit_code(&self, strict: bool) -> Result<u8, CliError> {
        let warning_count = self.envelope.meta.warnings.len();
        let error_count = self.envelope.errors.len();

        if strict && (warning_count > 0 || error_count > 0) {
            return Err(CliError::StrictModeViolation {
                warning_count,
                error_count,
            });
        }
        if error_count > 0 {
            return Ok(3);
        }
        Ok(0)
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let started = Instant::now();
    let config = settings(cli);
    let dashboard = build_dashboard(cli, &config)?;

    let outcome = dispatch(&cli.command, &dashboard).await;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let cache_hit = dashboard.provider().cache_hits() > 0;
    CommandOutput::assemble(outcome, latency_ms, cache_hit, cli.mock)
}

pub async fn dispatch<P: DataProvider>(
    command: &Command,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    match command {
        Command::Exchanges => directory::exchanges(dashboard),
        Command::Stocks(args) => directory::stocks(args, dashboard),
        Command::Lookup(args) => directory::lookup(args, dashboard),
        Command::Overview(args) => overview::run(args, dashboard).await,
        Command::Financials(args) => financials::run(args, dashboard).await,
        Command::Advanced(args) => advanced::advanced(args, dashboard).await,
        Command::Margins(args) => advanced::margins(args, dashboard).await,
        Command::PeHistory(args) => advanced::pe_history(args, dashboard).await,
        Command::Dividends(args) => advanced::dividends(args, dashboard).await,
        Command::Peers(args) => peers::run(args, dashboard).await,
    }
}

fn settings(cli: &Cli) -> StockscopeConfig {
    let mut config = StockscopeConfig::from_env();
    if let Some(path) = &cli.directory {
        config = config.with_directory_path(path);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_http_timeout_ms(timeout_ms);
    }
    if cli.no_cache {
        config = config.with_cache_ttl(Duration::ZERO);
    }
    debug!(?config, "resolved settings");
    config
}

fn build_dashboard(cli: &Cli, config: &StockscopeConfig) -> Result<AppDashboard, CliError> {
    let adapter = if cli.mock {
        YahooAdapter::default()
    } else {
        let client = ReqwestHttpClient::new().map_err(|e| CliError::Command(e.to_string()))?;
        YahooAdapter::with_http_client(Arc::new(client))
    }
    .with_throttle(RequestThrottle::per_minute(config.requests_per_minute))
    .with_timeout_ms(config.http_timeout_ms);

    let (store, mode) = if config.caching_enabled() {
        (CacheStore::new(config.cache_ttl), CacheMode::Use)
    } else {
        (CacheStore::disabled(), CacheMode::Bypass)
    };
    let provider = CachedProvider::new(adapter, store).with_mode(mode);
    info!(provider = %provider.id(), offline = cli.mock, "provider ready");

    let directory = if cli.command.needs_directory() {
        InstrumentDirectory::from_path(&config.directory_path)?
    } else {
        InstrumentDirectory::default()
    };

    Ok(Dashboard::new(provider, directory).with_peer_timeout(config.peer_timeout))
}

/// Symbol from `--symbol`, or from the directory via `--exchange/--name`.
fn resolve_symbol<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<Symbol, CliError> {
    match (&args.symbol, &args.exchange, &args.name) {
        (Some(raw), _, _) => Ok(Symbol::parse(raw)?),
        (None, Some(exchange), Some(name)) => Ok(dashboard.resolve(exchange, name)?),
        _ => Err(CliError::Command(String::from(
            "select an instrument with --symbol or with --exchange and --name",
        ))),
    }
}
