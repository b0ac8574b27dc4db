//! Domain layer
//!
//! Pure types and math with no I/O: bar buckets, price bars, fund
//! disclosure records and the rate-of-change statistics the strategies
//! are built on.

pub mod bar;
pub mod fund;
pub mod stats;
pub mod timeframe;

pub use bar::{Bar, QueryWindow};
pub use fund::{ARK_FUNDS, FundTrade, Holding, HoldingsDocument, TradeDirection, TradesDocument};
pub use timeframe::{Timeframe, TimeframeError};
