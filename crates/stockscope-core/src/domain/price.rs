use serde::{Deserialize, Serialize};

use crate::DatedSeries;

/// Daily closing price and traded volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
}

impl PriceBar {
    pub const fn new(close: f64, volume: Option<u64>) -> Self {
        Self { close, volume }
    }
}

/// One row per trading day, annotated with the exchange zone.
pub type PriceSeries = DatedSeries<PriceBar>;
