use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DatedSeries, DatedValue, MarketDate, ValidationError};

/// Well-known statement line items.
pub mod line_items {
    pub const TOTAL_REVENUE: &str = "TotalRevenue";
    pub const GROSS_PROFIT: &str = "GrossProfit";
    pub const OPERATING_INCOME: &str = "OperatingIncome";
    pub const NET_INCOME: &str = "NetIncome";
    pub const DILUTED_EPS: &str = "DilutedEPS";
    pub const BASIC_EPS: &str = "BasicEPS";

    pub const TOTAL_ASSETS: &str = "TotalAssets";
    pub const TOTAL_LIABILITIES: &str = "TotalLiabilitiesNetMinorityInterest";
    pub const STOCKHOLDERS_EQUITY: &str = "StockholdersEquity";
    pub const CASH_AND_EQUIVALENTS: &str = "CashAndCashEquivalents";
    pub const TOTAL_DEBT: &str = "TotalDebt";

    pub const INCOME_STATEMENT: [&str; 6] = [
        TOTAL_REVENUE,
        GROSS_PROFIT,
        OPERATING_INCOME,
        NET_INCOME,
        DILUTED_EPS,
        BASIC_EPS,
    ];

    pub const BALANCE_SHEET: [&str; 5] = [
        TOTAL_ASSETS,
        TOTAL_LIABILITIES,
        STOCKHOLDERS_EQUITY,
        CASH_AND_EQUIVALENTS,
        TOTAL_DEBT,
    ];
}

/// Reporting cadence of a financial statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementFrequency {
    #[default]
    Yearly,
    Quarterly,
}

impl StatementFrequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yearly => "yearly",
            Self::Quarterly => "quarterly",
        }
    }
}

impl Display for StatementFrequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementFrequency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yearly" | "annual" => Ok(Self::Yearly),
            "quarterly" => Ok(Self::Quarterly),
            other => Err(ValidationError::InvalidFrequency {
                value: other.to_owned(),
            }),
        }
    }
}

/// Line items reported for one fiscal period. Absent keys are missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    pub end: MarketDate,
    pub items: BTreeMap<String, f64>,
}

impl FiscalPeriod {
    pub fn new(end: MarketDate) -> Self {
        Self {
            end,
            items: BTreeMap::new(),
        }
    }

    /// Adds a line item; non-finite values are treated as missing.
    pub fn with_item(mut self, name: impl Into<String>, value: f64) -> Self {
        if value.is_finite() {
            self.items.insert(name.into(), value);
        }
        self
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.items.get(name).copied()
    }
}

/// Income statement or balance sheet, periods ordered by end date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStatement", into = "RawStatement")]
pub struct FinancialStatement {
    frequency: StatementFrequency,
    currency: Option<String>,
    periods: Vec<FiscalPeriod>,
}

impl FinancialStatement {
    pub fn new(
        frequency: StatementFrequency,
        mut periods: Vec<FiscalPeriod>,
    ) -> Result<Self, ValidationError> {
        periods.sort_by_key(|period| period.end);
        if let Some(pair) = periods.windows(2).find(|pair| pair[0].end == pair[1].end) {
            return Err(ValidationError::DuplicatePeriod {
                date: pair[0].end.to_string(),
            });
        }

        Ok(Self {
            frequency,
            currency: None,
            periods,
        })
    }

    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency;
        self
    }

    pub const fn frequency(&self) -> StatementFrequency {
        self.frequency
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn periods(&self) -> &[FiscalPeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn value(&self, end: MarketDate, name: &str) -> Option<f64> {
        self.periods
            .binary_search_by_key(&end, |period| period.end)
            .ok()
            .and_then(|index| self.periods[index].value(name))
    }

    /// Column view of one line item, keyed by period end. Timezone-naive.
    pub fn line_item(&self, name: &str) -> DatedSeries<Option<f64>> {
        let entries = self
            .periods
            .iter()
            .map(|period| DatedValue::new(period.end, period.value(name)))
            .collect();
        // Period ends are already unique and ordered.
        DatedSeries::naive(entries).unwrap_or_else(|_| DatedSeries::empty(None))
    }
}

#[derive(Serialize, Deserialize)]
struct RawStatement {
    frequency: StatementFrequency,
    #[serde(default)]
    currency: Option<String>,
    periods: Vec<FiscalPeriod>,
}

impl TryFrom<RawStatement> for FinancialStatement {
    type Error = ValidationError;

    fn try_from(raw: RawStatement) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.frequency, raw.periods)?.with_currency(raw.currency))
    }
}

impl From<FinancialStatement> for RawStatement {
    fn from(value: FinancialStatement) -> Self {
        Self {
            frequency: value.frequency,
            currency: value.currency,
            periods: value.periods,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::line_items::{DILUTED_EPS, TOTAL_REVENUE};
    use super::*;

    #[test]
    fn orders_periods_and_projects_line_item() {
        let statement = FinancialStatement::new(
            StatementFrequency::Yearly,
            vec![
                FiscalPeriod::new(MarketDate::from_date(date!(2023-12-31)))
                    .with_item(TOTAL_REVENUE, 120.0),
                FiscalPeriod::new(MarketDate::from_date(date!(2022-12-31)))
                    .with_item(TOTAL_REVENUE, 100.0)
                    .with_item(DILUTED_EPS, 1.5),
            ],
        )
        .expect("valid statement");

        let eps = statement.line_item(DILUTED_EPS);
        assert!(eps.is_naive());
        assert_eq!(eps.values().copied().collect::<Vec<_>>(), vec![Some(1.5), None]);
        assert_eq!(
            statement.value(MarketDate::from_date(date!(2023-12-31)), TOTAL_REVENUE),
            Some(120.0)
        );
    }

    #[test]
    fn rejects_duplicate_period_end() {
        let end = MarketDate::from_date(date!(2023-12-31));
        let err = FinancialStatement::new(
            StatementFrequency::Quarterly,
            vec![FiscalPeriod::new(end), FiscalPeriod::new(end)],
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::DuplicatePeriod { .. }));
    }

    #[test]
    fn non_finite_items_are_missing() {
        let period = FiscalPeriod::new(MarketDate::from_date(date!(2023-12-31)))
            .with_item(TOTAL_REVENUE, f64::NAN);
        assert_eq!(period.value(TOTAL_REVENUE), None);
    }

    #[test]
    fn parses_frequency() {
        assert_eq!(
            "Quarterly".parse::<StatementFrequency>().expect("parse"),
            StatementFrequency::Quarterly
        );
        assert!("weekly".parse::<StatementFrequency>().is_err());
    }
}
