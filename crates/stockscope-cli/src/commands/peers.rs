use stockscope_core::{Dashboard, DataProvider, ProviderId, Symbol};

use crate::cli::PeersArgs;
use crate::error::CliError;
use crate::output::{self, Table};

use super::CommandResult;

pub async fn run<P: DataProvider>(
    args: &PeersArgs,
    dashboard: &Dashboard<P>,
) -> Result<CommandResult, CliError> {
    let stock = args.symbol.as_deref().map(Symbol::parse).transpose()?;
    let table = match &stock {
        Some(symbol) => dashboard.peers_with_stock(symbol).await,
        None => dashboard.peers().await,
    };

    let mut rendered = Table::new(["Label", "Symbol", "Trailing P/E"]).titled("Peer valuations");
    let mut warnings = Vec::new();
    for entry in table.stock.iter().chain(&table.entries) {
        rendered.push_row(vec![
            entry.label.clone(),
            entry.symbol.clone(),
            output::number(entry.trailing_pe),
        ]);
        if entry.trailing_pe.is_none() {
            warnings.push(format!(
                "no trailing P/E for {} ({})",
                entry.label, entry.symbol
            ));
        }
    }

    let mut result = CommandResult::ok(serde_json::to_value(&table)?)
        .with_provider(ProviderId::Yahoo)
        .with_warnings(warnings)
        .with_table(rendered);
    if let Some(symbol) = stock {
        result = result.with_symbol(symbol);
    }
    Ok(result)
}
