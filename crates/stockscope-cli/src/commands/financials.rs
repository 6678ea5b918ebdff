use stockscope_core::{line_items, Dashboard, DataProvider, FinancialStatement, ProviderId};

use crate::cli::InstrumentArgs;
use crate::error::CliError;
use crate::output::{self, Table};

use super::{resolve_symbol, CommandResult};

pub async fn run<P: DataProvider>(
    args: &InstrumentArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let symbol = resolve_symbol(args, dashboard)?;
    let financials = dashboard.financials(&symbol).await?;

    let mut warnings = Vec::new();
    if financials.income_statement.is_empty() {
        warnings.push(format!("no income statement reported for '{symbol}'"));
    }
    if financials.balance_sheet.is_empty() {
        warnings.push(format!("no balance sheet reported for '{symbol}'"));
    }

    let currency = output::text(financials.currency.as_deref());
    let income = statement_table(
        &financials.income_statement,
        &line_items::INCOME_STATEMENT,
        format!("Income Statement ({currency})"),
    );
    let balance = statement_table(
        &financials.balance_sheet,
        &line_items::BALANCE_SHEET,
        format!("Balance Sheet ({currency})"),
    );

    Ok(CommandResult::ok(serde_json::to_value(&financials)?)
        .with_symbol(symbol)
        .with_provider(ProviderId::Yahoo)
        .with_warnings(warnings)
        .with_table(income)
        .with_table(balance))
}

/// One row per line item, one column per fiscal period.
fn statement_table(statement: &FinancialStatement, items: &[&str], title: String) -> Table {
    let headers = std::iter::once(String::from("Line item"))
        .chain(statement.periods().iter().map(|period| output::date(period.end)));
    let mut table = Table::new(headers).titled(title);

    for item in items {
        let row = std::iter::once((*item).to_owned())
            .chain(
                statement
                    .periods()
                    .iter()
                    .map(|period| output::number(period.value(item))),
            )
            .collect();
        table.push_row(row);
    }
    table
}
