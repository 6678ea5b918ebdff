use serde_json::Value;
use stockscope_core::{Envelope, MarketDate};

use crate::cli::OutputFormat;
use crate::error::CliError;

pub const MISSING: &str = "N/A";

/// Column-aligned text block used by `--format table`.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: None,
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn with_row(mut self, row: Vec<String>) -> Self {
        self.push_row(row);
        self
    }

    fn lines(&self) -> Vec<String> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0_usize; columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (index, cell) in row.iter().enumerate() {
                widths[index] = widths[index].max(cell.chars().count());
            }
        }

        let format_row = |row: &[String]| -> String {
            let mut line = String::new();
            for (index, width) in widths.iter().enumerate() {
                let cell = row.get(index).map_or("", String::as_str);
                if index > 0 {
                    line.push_str("  ");
                }
                line.push_str(cell);
                let pad = width.saturating_sub(cell.chars().count());
                line.extend(std::iter::repeat(' ').take(pad));
            }
            line.trim_end().to_owned()
        };

        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        if let Some(title) = &self.title {
            lines.push(format!("{title}:"));
        }
        if !self.headers.is_empty() {
            lines.push(format_row(&self.headers));
            lines.push(
                widths
                    .iter()
                    .map(|width| "-".repeat(*width))
                    .collect::<Vec<_>>()
                    .join("  "),
            );
        }
        for row in &self.rows {
            lines.push(format_row(row));
        }
        lines
    }
}

pub fn number(value: Option<f64>) -> String {
    match value {
        Some(value) if value.is_finite() => format!("{value:.4}"),
        Some(value) => value.to_string(),
        None => MISSING.to_owned(),
    }
}

pub fn integer(value: Option<u64>) -> String {
    value.map_or_else(|| MISSING.to_owned(), |value| value.to_string())
}

pub fn text(value: Option<&str>) -> String {
    value
        .filter(|value| !value.trim().is_empty())
        .map_or_else(|| MISSING.to_owned(), str::to_owned)
}

pub fn date(value: MarketDate) -> String {
    value.to_string()
}

pub fn render(
    envelope: &Envelope<Value>,
    tables: &[Table],
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(envelope)?;
            println!("{payload}");
        }
        OutputFormat::Table => render_table(envelope, tables)?,
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>, tables: &[Table]) -> Result<(), CliError> {
    println!("request_id  : {}", envelope.meta.request_id);
    println!("generated_at: {}", envelope.meta.generated_at);
    if let Some(provider) = envelope.meta.provider {
        println!("provider    : {provider}");
    }
    if let Some(symbol) = &envelope.meta.symbol {
        println!("symbol      : {symbol}");
    }
    println!("latency_ms  : {}", envelope.meta.latency_ms);
    println!("cache_hit   : {}", envelope.meta.cache_hit);

    if !envelope.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &envelope.meta.warnings {
            println!("  - {warning}");
        }
    }

    if tables.is_empty() {
        if !envelope.data.is_null() {
            println!("data:");
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                println!("  {line}");
            }
        }
    } else {
        for table in tables {
            println!();
            for line in table.lines() {
                println!("{line}");
            }
        }
    }

    if !envelope.errors.is_empty() {
        println!("errors:");
        for error in &envelope.errors {
            println!("  - {}: {}", error.code, error.message);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_render_as_na() {
        assert_eq!(number(None), "N/A");
        assert_eq!(number(Some(0.25)), "0.2500");
        assert_eq!(number(Some(f64::INFINITY)), "inf");
        assert_eq!(text(Some("  ")), "N/A");
        assert_eq!(integer(Some(12)), "12");
    }

    #[test]
    fn aligns_columns() {
        let table = Table::new(["Label", "P/E"])
            .titled("Peers")
            .with_row(vec![String::from("S&P 500"), number(Some(24.1))])
            .with_row(vec![String::from("Energy"), number(None)]);

        assert_eq!(
            table.lines(),
            vec![
                "Peers:",
                "Label    P/E",
                "-------  -------",
                "S&P 500  24.1000",
                "Energy   N/A",
            ]
        );
    }
}
