use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Lookback window accepted by price-history requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LookbackRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "ytd")]
    YearToDate,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl LookbackRange {
    pub const ALL: [Self; 9] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::YearToDate,
        Self::OneYear,
        Self::FiveYears,
        Self::TenYears,
        Self::Max,
    ];

    /// Wire value, identical to the provider's `range` query parameter.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::YearToDate => "ytd",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::Max => "max",
        }
    }

    /// Approximate number of trading sessions covered by the window.
    ///
    /// `ytd` is treated as half a year and `max` as twenty years.
    pub const fn approx_trading_days(self) -> usize {
        match self {
            Self::OneDay => 1,
            Self::FiveDays => 5,
            Self::OneMonth => 21,
            Self::ThreeMonths => 63,
            Self::YearToDate => 126,
            Self::OneYear => 252,
            Self::FiveYears => 1_260,
            Self::TenYears => 2_520,
            Self::Max => 5_040,
        }
    }
}

impl Display for LookbackRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookbackRange {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == normalized)
            .ok_or(ValidationError::InvalidRange { value: normalized })
    }
}
