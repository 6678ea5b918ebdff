//! # Derived Metrics
//!
//! Pure transforms from fetched statements and prices to ratio tables, plus
//! the concurrent peer P/E lookup.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`align`] | Forward-fill a sparse series onto a denser index |
//! | [`ratio`] | Elementwise division with the missing-value policy |
//! | [`fundamentals`] | Margins, EPS history, historic P/E, dividends |
//! | [`peers`] | Trailing P/E for the fixed index/sector configuration |
//!
//! Missing inputs always produce missing outputs (`None`), never zero.

pub mod align;
pub mod fundamentals;
pub mod peers;
pub mod ratio;

pub use align::forward_fill;
pub use fundamentals::{
    dividend_table, eps_history, historic_pe, margins, DividendRow, DividendSeries,
    HistoricRatioRow, HistoricRatioSeries, MarginRow, MarginSeries,
};
pub use peers::{PeerIndex, PeerRatio, PeerRatioAggregator, PeerRatioTable, PEER_INDICES};
pub use ratio::{ratio, ratio_of};
