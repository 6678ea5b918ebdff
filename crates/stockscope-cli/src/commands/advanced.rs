use stockscope_core::{
    Dashboard, DataProvider, DatedSeries, DividendSeries, HistoricRatioSeries, MarginSeries,
    ProviderId, Symbol,
};

use crate::cli::InstrumentArgs;
use crate::error::CliError;
use crate::output::{self, Table};

use super::{resolve_symbol, CommandResult};

pub async fn advanced<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = resolve_symbol(args, dashboard)?;
    let advanced = dashboard.advanced(&symbol).await?;

    let mut warnings = Vec::new();
    warnings.extend(margin_warning(&symbol, &advanced.margins));
    warnings.extend(pe_warning(&symbol, &advanced.historic_pe));
    warnings.extend(dividend_warning(&symbol, &advanced.dividends));

    Ok(respond(serde_json::to_value(&advanced)?, symbol)
        .with_warnings(warnings)
        .with_table(margin_table(&advanced.margins))
        .with_table(eps_table(&advanced.eps_history))
        .with_table(pe_table(&advanced.historic_pe))
        .with_table(dividend_table(&advanced.dividends)))
}

pub async fn margins<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = resolve_symbol(args, dashboard)?;
    let margins = dashboard.margins(&symbol).await?;
    let warnings = margin_warning(&symbol, &margins).into_iter().collect();

    Ok(respond(serde_json::to_value(&margins)?, symbol)
        .with_warnings(warnings)
        .with_table(margin_table(&margins)))
}

pub async fn pe_history<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = resolve_symbol(args, dashboard)?;
    let history = dashboard.pe_history(&symbol).await?;
    let warnings = pe_warning(&symbol, &history).into_iter().collect();

    Ok(respond(serde_json::to_value(&history)?, symbol)
        .with_warnings(warnings)
        .with_table(pe_table(&history)))
}

pub async fn dividends<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = resolve_symbol(args, dashboard)?;
    let dividends = dashboard.dividends(&symbol).await?;
    let warnings = dividend_warning(&symbol, &dividends).into_iter().collect();

    Ok(respond(serde_json::to_value(&dividends)?, symbol)
        .with_warnings(warnings)
        .with_table(dividend_table(&dividends)))
}

fn respond(data: serde_json::Value, symbol: Symbol) -> CommandResult {
    CommandResult::ok(data)
        .with_symbol(symbol)
        .with_provider(ProviderId::Yahoo)
}

fn margin_warning(symbol: &Symbol, margins: &MarginSeries) -> Option<String> {
    margins
        .is_empty()
        .then(|| format!("no fiscal periods reported for '{symbol}'"))
}

fn pe_warning(symbol: &Symbol, history: &HistoricRatioSeries) -> Option<String> {
    let has_ratio = history.values().any(|row| row.pe_ratio.is_some());
    (!has_ratio).then(|| {
        format!("no P/E could be derived for '{symbol}': prices and EPS do not overlap")
    })
}

fn dividend_warning(symbol: &Symbol, dividends: &DividendSeries) -> Option<String> {
    dividends
        .is_empty()
        .then(|| format!("no dividend history for '{symbol}'"))
}

fn margin_table(margins: &MarginSeries) -> Table {
    let mut table =
        Table::new(["Date", "GrossProfitMargin", "OperatingMargin"]).titled("Margins");
    for entry in margins.entries() {
        table.push_row(vec![
            output::date(entry.date),
            output::number(entry.value.gross_profit_margin),
            output::number(entry.value.operating_margin),
        ]);
    }
    table
}

fn eps_table(eps: &DatedSeries<Option<f64>>) -> Table {
    let mut table = Table::new(["Date", "DilutedEPS"]).titled("EPS History");
    for entry in eps.entries() {
        table.push_row(vec![output::date(entry.date), output::number(entry.value)]);
    }
    table
}

fn pe_table(history: &HistoricRatioSeries) -> Table {
    let mut table = Table::new(["Date", "Close", "Volume", "DilutedEPS", "PE-ratio"])
        .titled("Historic P/E");
    for entry in history.entries() {
        let row = &entry.value;
        table.push_row(vec![
            output::date(entry.date),
            output::number(Some(row.close)),
            output::integer(row.volume),
            output::number(row.diluted_eps),
            output::number(row.pe_ratio),
        ]);
    }
    table
}

fn dividend_table(dividends: &DividendSeries) -> Table {
    let mut table = Table::new(["Date", "Dividends"]).titled("Dividends");
    for entry in dividends.entries() {
        table.push_row(vec![
            output::date(entry.date),
            output::number(Some(entry.value.dividends)),
        ]);
    }
    table
}
