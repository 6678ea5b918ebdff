use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Display name used when the provider does not report one.
pub const UNKNOWN_STOCK: &str = "Unknown Stock";

/// Analyst consensus price targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalystPriceTargets {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub mean: Option<f64>,
}

impl AnalystPriceTargets {
    /// `None` when the provider reports none of the three targets.
    pub fn from_parts(high: Option<f64>, low: Option<f64>, mean: Option<f64>) -> Option<Self> {
        if high.is_none() && low.is_none() && mean.is_none() {
            return None;
        }
        Some(Self { high, low, mean })
    }
}

/// Descriptive fields for one instrument. Every field may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    pub symbol: Option<Symbol>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub long_business_summary: Option<String>,
    pub analyst_price_targets: Option<AnalystPriceTargets>,
}

impl InstrumentMetadata {
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_STOCK)
    }
}
