//! CLI argument definitions for stockscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `exchanges` | List exchanges in the instrument directory |
//! | `stocks` | List companies listed on one exchange |
//! | `lookup` | Resolve exchange + company name to a ticker |
//! | `overview` | Price history, key ratios and analyst targets |
//! | `financials` | Yearly income statement and balance sheet |
//! | `advanced` | Margins, EPS history, historic P/E and dividends |
//! | `margins` | Gross and operating margin per fiscal year |
//! | `pe-history` | Daily price joined with forward-filled EPS and P/E |
//! | `dividends` | Dividend payment history |
//! | `peers` | Trailing P/E of market indices and sector funds, optionally beside a stock |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--mock` | `false` | Serve deterministic offline data |
//! | `--no-cache` | `false` | Bypass the response cache |
//! | `--directory` | `data/exchange_lookup.csv` | Instrument directory CSV |
//! | `--timeout-ms` | `10000` | Per-request HTTP timeout |
//!
//! # Examples
//!
//! ```bash
//! stockscope stocks --exchange "Oslo Børs"
//! stockscope overview --exchange NASDAQ --name "Apple Inc." --range 5y --format table
//! stockscope advanced --symbol EQNR.OL --pretty
//! stockscope peers --symbol AAPL --format table
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Stock fundamentals and derived ratios from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "stockscope",
    author,
    version,
    about = "Stock fundamentals and derived ratios",
    long_about = "stockscope resolves a company through an exchange lookup table, fetches \
prices and statements from Yahoo Finance and derives margins, EPS history, historic P/E \
and peer index valuations.\n\
\n\
Use 'stockscope <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Serve deterministic offline data instead of calling the provider.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Fetch everything fresh and store nothing.
    #[arg(long, global = true, default_value_t = false)]
    pub no_cache: bool,

    /// Instrument directory CSV (header `Market,Name,Symbol`).
    ///
    /// Overrides STOCKSCOPE_DIRECTORY.
    #[arg(long, global = true)]
    pub directory: Option<PathBuf>,

    /// Per-request HTTP timeout in milliseconds.
    ///
    /// Overrides STOCKSCOPE_HTTP_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table; missing values print as N/A.
    Table,
    /// Single JSON envelope.
    Json,
    /// Envelope on one line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List exchanges in the instrument directory.
    Exchanges,

    /// List companies listed on an exchange.
    Stocks(StocksArgs),

    /// Resolve an exchange and company name to its ticker.
    Lookup(LookupArgs),

    /// Price history, key ratios and analyst price targets.
    ///
    /// # Examples
    ///
    ///   stockscope overview --symbol AAPL
    ///   stockscope overview --exchange NASDAQ --name "Apple Inc." --range 5y
    Overview(OverviewArgs),

    /// Yearly income statement and balance sheet.
    Financials(InstrumentArgs),

    /// Margins, EPS history, historic P/E and dividends in one response.
    Advanced(InstrumentArgs),

    /// Gross profit and operating margin per fiscal year.
    Margins(InstrumentArgs),

    /// Five years of daily closes with forward-filled EPS and P/E.
    PeHistory(InstrumentArgs),

    /// Dividend payment history.
    Dividends(InstrumentArgs),

    /// Trailing P/E of major indices and sector funds.
    ///
    /// # Examples
    ///
    ///   stockscope peers
    ///   stockscope peers --symbol EQNR.OL
    Peers(PeersArgs),
}

#[derive(Debug, Args)]
pub struct StocksArgs {
    /// Exchange name exactly as listed in the directory.
    #[arg(long)]
    pub exchange: String,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[arg(long)]
    pub exchange: String,

    /// Company name exactly as listed in the directory.
    #[arg(long)]
    pub name: String,
}

#[derive(Debug, Args)]
pub struct PeersArgs {
    /// Also show this ticker's own trailing P/E.
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Selects an instrument either by ticker or through the directory.
#[derive(Debug, Clone, Args)]
pub struct InstrumentArgs {
    /// Provider ticker, e.g. AAPL or EQNR.OL.
    #[arg(
        long,
        conflicts_with_all = ["exchange", "name"],
        required_unless_present = "exchange"
    )]
    pub symbol: Option<String>,

    #[arg(long, requires = "name")]
    pub exchange: Option<String>,

    #[arg(long, requires = "exchange")]
    pub name: Option<String>,
}

impl InstrumentArgs {
    pub fn needs_directory(&self) -> bool {
        self.symbol.is_none()
    }
}

#[derive(Debug, Args)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub instrument: InstrumentArgs,

    /// Price window: 1d, 5d, 1mo, 3mo, ytd, 1y, 5y, 10y or max.
    #[arg(long, default_value = "1y")]
    pub range: String,
}

impl Command {
    /// Whether the command must read the instrument directory.
    pub fn needs_directory(&self) -> bool {
        match self {
            Self::Exchanges | Self::Stocks(_) | Self::Lookup(_) => true,
            Self::Overview(args) => args.instrument.needs_directory(),
            Self::Financials(args)
            | Self::Advanced(args)
            | Self::Margins(args)
            | Self::PeHistory(args)
            | Self::Dividends(args) => args.needs_directory(),
            Self::Peers(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_can_be_selected_through_the_directory() {
        let cli = Cli::try_parse_from([
            "stockscope",
            "margins",
            "--exchange",
            "Oslo Børs",
            "--name",
            "Equinor ASA",
        ])
        .expect("valid arguments");

        assert!(cli.command.needs_directory());
        let Command::Margins(args) = cli.command else {
            panic!("expected margins");
        };
        assert_eq!(args.exchange.as_deref(), Some("Oslo Børs"));
        assert_eq!(args.symbol, None);
    }

    #[test]
    fn symbol_and_directory_selection_are_exclusive() {
        let result = Cli::try_parse_from([
            "stockscope",
            "overview",
            "--symbol",
            "AAPL",
            "--exchange",
            "NASDAQ",
            "--name",
            "Apple Inc.",
        ]);
        assert!(result.is_err());

        let missing = Cli::try_parse_from(["stockscope", "dividends"]);
        assert!(missing.is_err(), "an instrument is required");
    }

    #[test]
    fn global_flags_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from(["stockscope", "peers", "--format", "table", "--mock"])
            .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.mock);
        assert!(!cli.command.needs_directory());
    }

    #[test]
    fn peers_accept_an_optional_stock() {
        let cli = Cli::try_parse_from(["stockscope", "peers", "--symbol", "EQNR.OL"])
            .expect("valid arguments");

        assert!(!cli.command.needs_directory());
        let Command::Peers(args) = cli.command else {
            panic!("expected peers");
        };
        assert_eq!(args.symbol.as_deref(), Some("EQNR.OL"));
    }
}
