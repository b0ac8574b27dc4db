//! Trading strategies.
//!
//! Each strategy takes an immutable config record and runs to completion
//! against the ports it was built with.

mod base;
mod copycat;
mod mean_reversion;
mod simple;

use thiserror::Error;

use crate::application::ports::{BrokerError, FundDataError, MarketDataError};
use crate::infrastructure::persistence::StorageError;

pub use base::BaseStrategy;
pub use copycat::{ActionOutcome, CopyAction, CopyCatConfig, CopyCatReport, CopyCatStrategy};
pub use mean_reversion::{
    Decision, MEAN_LOOKBACK_BARS, MeanReversionConfig, MeanReversionReport, MeanReversionStrategy,
    Signal,
};
pub use simple::{ExitReason, SimpleConfig, SimpleOutcome, SimpleStrategy};

/// Strategy errors.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Config values out of range.
    #[error("Invalid strategy config: {0}")]
    InvalidConfig(String),

    /// Broker failure.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// Market data failure.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// Fund data failure.
    #[error(transparent)]
    FundData(#[from] FundDataError),

    /// Cache file failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
