use stockscope_core::{
    Dashboard, DataProvider, LookbackRange, Overview, ProviderId, UNKNOWN_STOCK,
};

use crate::cli::OverviewArgs;
use crate::error::CliError;
use crate::output::{self, Table};

use super::{resolve_symbol, CommandResult};

const NO_ANALYST_TARGETS: &str = "No analyst price targets available";

pub async fn run<P: DataProvider>(
    args: &OverviewArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let range: LookbackRange = args.range.parse()?;
    let symbol = resolve_symbol(&args.instrument, dashboard)?;
    let overview = dashboard.overview(&symbol, range).await?;

    let mut warnings = Vec::new();
    if overview.name == UNKNOWN_STOCK {
        warnings.push(format!("provider reported no company name for '{symbol}'"));
    }
    if overview.prices.is_empty() {
        warnings.push(format!("no price history for '{symbol}' over {range}"));
    }

    let tables = tables(&overview);
    let mut result = CommandResult::ok(serde_json::to_value(&overview)?)
        .with_symbol(symbol)
        .with_provider(ProviderId::Yahoo)
        .with_warnings(warnings);
    for table in tables {
        result = result.with_table(table);
    }
    Ok(result)
}

fn tables(overview: &Overview) -> Vec<Table> {
    let metrics = &overview.key_metrics;
    let company = Table::new(["Field", "Value"])
        .titled(overview.name.as_str())
        .with_row(vec![String::from("Symbol"), overview.symbol.to_string()])
        .with_row(vec![
            String::from("Currency"),
            output::text(overview.currency.as_deref()),
        ])
        .with_row(vec![
            String::from("Price/Book"),
            output::number(metrics.price_to_book),
        ])
        .with_row(vec![
            String::from("Dividend Yield"),
            output::number(metrics.dividend_yield),
        ])
        .with_row(vec![
            String::from("Trailing P/E"),
            output::number(metrics.trailing_pe),
        ])
        .with_row(vec![
            String::from("Summary"),
            output::text(overview.business_summary.as_deref()),
        ]);

    let targets = match &overview.analyst_targets {
        Some(targets) => Table::new(["High", "Low", "Mean"]).with_row(vec![
            output::number(targets.high),
            output::number(targets.low),
            output::number(targets.mean),
        ]),
        None => Table::default().with_row(vec![NO_ANALYST_TARGETS.to_owned()]),
    }
    .titled("Analyst Price Targets");

    let mut prices = Table::new(["Date", "Close", "Volume"])
        .titled(format!("Prices ({})", overview.range));
    for entry in overview.prices.entries() {
        prices.push_row(vec![
            output::date(entry.date),
            output::number(Some(entry.value.close)),
            output::integer(entry.value.volume),
        ]);
    }

    vec![company, targets, prices]
}
