//! Statement- and price-derived tables: margins, EPS, historic P/E, dividends.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::line_items::{DILUTED_EPS, GROSS_PROFIT, OPERATING_INCOME, TOTAL_REVENUE};
use crate::metrics::align::forward_fill;
use crate::metrics::ratio::ratio;
use crate::{DatedSeries, FinancialStatement, PriceSeries, ValidationError};

/// Gross and operating margin for one fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginRow {
    #[serde(rename = "GrossProfitMargin", default, with = "ratio_value")]
    pub gross_profit_margin: Option<f64>,
    #[serde(rename = "OperatingMargin", default, with = "ratio_value")]
    pub operating_margin: Option<f64>,
}

pub type MarginSeries = DatedSeries<MarginRow>;

/// Daily price row extended with the prevailing EPS and the resulting P/E.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoricRatioRow {
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
    #[serde(rename = "DilutedEPS")]
    pub diluted_eps: Option<f64>,
    #[serde(rename = "PE-ratio", default, with = "ratio_value")]
    pub pe_ratio: Option<f64>,
}

pub type HistoricRatioSeries = DatedSeries<HistoricRatioRow>;

/// One dividend payment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividendRow {
    #[serde(rename = "Dividends")]
    pub dividends: f64,
}

pub type DividendSeries = DatedSeries<DividendRow>;

/// Ratio columns on the wire. JSON has no infinity, so `x/0` is written as
/// `"inf"` or `"-inf"` instead of collapsing into `null` (missing).
mod ratio_value {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match *value {
            Some(ratio) if ratio == f64::INFINITY => serializer.serialize_str("inf"),
            Some(ratio) if ratio == f64::NEG_INFINITY => serializer.serialize_str("-inf"),
            Some(ratio) => serializer.serialize_f64(ratio),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Wire>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Wire::Number(ratio)) => Ok(Some(ratio)),
            Some(Wire::Text(text)) => match text.as_str() {
                "inf" => Ok(Some(f64::INFINITY)),
                "-inf" => Ok(Some(f64::NEG_INFINITY)),
                other => Err(D::Error::invalid_value(
                    Unexpected::Str(other),
                    &"a number, \"inf\" or \"-inf\"",
                )),
            },
        }
    }
}

fn column(statement: &FinancialStatement, name: &str) -> Vec<Option<f64>> {
    statement.line_item(name).values().copied().collect()
}

/// Gross profit and operating margin per fiscal period.
pub fn margins(statement: &FinancialStatement) -> Result<MarginSeries, ValidationError> {
    let revenue = statement.line_item(TOTAL_REVENUE);
    let revenue_values = revenue.values().copied().collect::<Vec<_>>();

    let gross = ratio(&column(statement, GROSS_PROFIT), &revenue_values)?;
    let operating = ratio(&column(statement, OPERATING_INCOME), &revenue_values)?;

    let rows = gross
        .into_iter()
        .zip(operating)
        .map(|(gross_profit_margin, operating_margin)| MarginRow {
            gross_profit_margin,
            operating_margin,
        })
        .collect();

    debug!(periods = statement.len(), "computed margin series");
    Ok(revenue.with_values(rows))
}

/// Diluted EPS per fiscal period; all missing when the statement lacks the line item.
pub fn eps_history(statement: &FinancialStatement) -> DatedSeries<Option<f64>> {
    statement.line_item(DILUTED_EPS)
}

/// Daily P/E from closing prices and the most recently reported diluted EPS.
///
/// Price keys lose their zone before alignment so exchange-local trading days
/// line up with naive period-end dates. Days before the first reported EPS
/// have no ratio.
pub fn historic_pe(
    prices: &PriceSeries,
    statement: &FinancialStatement,
) -> Result<HistoricRatioSeries, ValidationError> {
    let prices = prices.clone().strip_timezone();
    let eps = eps_history(statement).strip_timezone();

    let aligned = forward_fill(&prices, &eps)
        .values()
        .copied()
        .map(Option::flatten)
        .collect::<Vec<_>>();
    let closes = prices.values().map(|bar| Some(bar.close)).collect::<Vec<_>>();
    let pe = ratio(&closes, &aligned)?;

    let rows = prices
        .values()
        .zip(aligned)
        .zip(pe)
        .map(|((bar, diluted_eps), pe_ratio)| HistoricRatioRow {
            close: bar.close,
            volume: bar.volume,
            diluted_eps,
            pe_ratio,
        })
        .collect();

    debug!(days = prices.len(), reports = eps.len(), "computed historic P/E");
    Ok(prices.with_values(rows))
}

/// Dividend payments as a `Dividends` column.
pub fn dividend_table(dividends: &DatedSeries<f64>) -> DividendSeries {
    dividends.map(|amount| DividendRow { dividends: *amount })
}

#[cfg(test)]
mod tests {
    use time::macros::{date, offset};

    use super::*;
    use crate::{FiscalPeriod, MarketDate, PriceBar, StatementFrequency};

    #[test]
    fn margins_of_empty_statement_are_empty() {
        let statement =
            FinancialStatement::new(StatementFrequency::Yearly, Vec::new()).expect("statement");
        let out = margins(&statement).expect("margins");
        assert!(out.is_empty());
    }

    #[test]
    fn zero_revenue_margins_are_written_as_signed_infinity() {
        // Given: a period with profit and loss but no revenue
        let statement = FinancialStatement::new(
            StatementFrequency::Yearly,
            vec![FiscalPeriod::new(MarketDate::from_date(date!(2023-12-31)))
                .with_item(TOTAL_REVENUE, 0.0)
                .with_item(GROSS_PROFIT, 5.0)
                .with_item(OPERATING_INCOME, -3.0)],
        )
        .expect("statement");

        // When: the margins are serialized
        let json = serde_json::to_value(margins(&statement).expect("margins")).expect("json");

        // Then: infinity stays distinguishable from a missing value
        let row = &json["entries"][0]["value"];
        assert_eq!(row["GrossProfitMargin"], "inf");
        assert_eq!(row["OperatingMargin"], "-inf");

        let parsed: MarginRow = serde_json::from_value(row.clone()).expect("readable again");
        assert_eq!(parsed.gross_profit_margin, Some(f64::INFINITY));
        assert_eq!(parsed.operating_margin, Some(f64::NEG_INFINITY));
    }

    #[test]
    fn missing_ratios_stay_null() {
        let row = MarginRow {
            gross_profit_margin: Some(0.25),
            operating_margin: None,
        };
        let json = serde_json::to_value(row).expect("json");

        assert_eq!(json["GrossProfitMargin"], 0.25);
        assert!(json["OperatingMargin"].is_null());
    }

    #[test]
    fn eps_history_without_line_item_is_missing() {
        let statement = FinancialStatement::new(
            StatementFrequency::Yearly,
            vec![FiscalPeriod::new(MarketDate::from_date(date!(2023-12-31)))
                .with_item(TOTAL_REVENUE, 10.0)],
        )
        .expect("statement");

        let eps = eps_history(&statement);
        assert_eq!(eps.values().copied().collect::<Vec<_>>(), vec![None]);
    }

    #[test]
    fn historic_pe_strips_exchange_zone() {
        let prices = PriceSeries::from_pairs(
            Some(offset!(-5)),
            [(MarketDate::from_date(date!(2024-01-03)), PriceBar::new(30.0, Some(10)))],
        )
        .expect("prices");
        let statement = FinancialStatement::new(
            StatementFrequency::Yearly,
            vec![FiscalPeriod::new(MarketDate::from_date(date!(2023-12-31)))
                .with_item(DILUTED_EPS, 6.0)],
        )
        .expect("statement");

        let table = historic_pe(&prices, &statement).expect("pe");
        assert!(table.is_naive());
        let row = table.first().map(|entry| entry.value).expect("one row");
        assert_eq!(row.diluted_eps, Some(6.0));
        assert_eq!(row.pe_ratio, Some(5.0));
    }

    #[test]
    fn dividend_table_uses_dividends_column() {
        let payments = DatedSeries::from_pairs(
            None,
            [(MarketDate::from_date(date!(2024-02-09)), 0.24)],
        )
        .expect("payments");
        let json = serde_json::to_value(dividend_table(&payments)).expect("json");
        assert_eq!(json["entries"][0]["value"]["Dividends"], 0.24);
    }
}
