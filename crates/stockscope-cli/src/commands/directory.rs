use serde_json::json;
use stockscope_core::{Dashboard, DataProvider};

use crate::cli::{LookupArgs, StocksArgs};
use crate::error::CliError;
use crate::output::Table;

use super::CommandResult;

pub fn exchanges<P: DataProvider>(dashboard: &Dashboard<P>) -> Result<CommandResult, CliError> {
    let exchanges = dashboard.directory().exchanges();

    let mut table = Table::new(["Exchange"]);
    for exchange in &exchanges {
        table.push_row(vec![(*exchange).to_owned()]);
    }

    let mut result = CommandResult::ok(json!({ "exchanges": exchanges })).with_table(table);
    if exchanges.is_empty() {
        result = result.with_warning("instrument directory lists no exchanges");
    }
    Ok(result)
}

pub fn stocks<P: DataProvider>(
    args: &StocksArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let names = dashboard.directory().stocks(&args.exchange);

    let mut table = Table::new(["Name"]).titled(args.exchange.as_str());
    for name in &names {
        table.push_row(vec![(*name).to_owned()]);
    }

    let mut result = CommandResult::ok(json!({
        "exchange": args.exchange,
        "stocks": names,
    }))
    .with_table(table);
    if names.is_empty() {
        result = result.with_warning(format!("no companies listed on '{}'", args.exchange));
    }
    Ok(result)
}

pub fn lookup<P: DataProvider>(
    args: &LookupArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = dashboard.resolve(&args.exchange, &args.name)?;

    let table = Table::new(["Exchange", "Name", "Symbol"]).with_row(vec![
        args.exchange.clone(),
        args.name.clone(),
        symbol.to_string(),
    ]);

    Ok(CommandResult::ok(json!({
        "exchange": args.exchange,
        "name": args.name,
        "symbol": symbol,
    }))
    .with_table(table)
    .with_symbol(symbol))
}
