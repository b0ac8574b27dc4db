//! Command-level error type.

use thiserror::Error;

use crate::application::ports::{BrokerError, FundDataError, MarketDataError};
use crate::application::strategies::StrategyError;
use crate::config::ConfigError;
use crate::domain::TimeframeError;
use crate::infrastructure::broker::AlpacaError;
use crate::infrastructure::fund_data::ArkError;
use crate::infrastructure::persistence::StorageError;

/// Any failure a command can end with.
///
/// Errors pass through unchanged so the process exits with the
/// collaborator's own message.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Settings or credentials.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unsupported timeframe name.
    #[error(transparent)]
    Timeframe(#[from] TimeframeError),

    /// Alpaca client construction.
    #[error(transparent)]
    Alpaca(#[from] AlpacaError),

    /// ARK client construction.
    #[error(transparent)]
    Ark(#[from] ArkError),

    /// Broker call.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Market data call.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Fund data call.
    #[error(transparent)]
    FundData(#[from] FundDataError),

    /// Ticker or cache file.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Strategy run.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// Writing command output.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Rendering JSON output.
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}
