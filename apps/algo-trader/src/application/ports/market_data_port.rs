//! Market Data Port (Driven Port)
//!
//! Interface for historical bars and latest crypto prices.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::{Bar, QueryWindow, Timeframe};

/// Parameters for a bar request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarQuery {
    /// Bucket size.
    pub timeframe: Timeframe,
    /// Window start.
    pub start: Option<DateTime<FixedOffset>>,
    /// Window end.
    pub end: Option<DateTime<FixedOffset>>,
    /// Maximum number of bars.
    pub limit: Option<u32>,
    /// Select from the newest end of the window. Results are still
    /// returned oldest first.
    pub newest_first: bool,
}

impl BarQuery {
    /// Query with no window or limit.
    #[must_use]
    pub const fn new(timeframe: Timeframe) -> Self {
        Self {
            timeframe,
            start: None,
            end: None,
            limit: None,
            newest_first: false,
        }
    }

    /// Query for the single most recent bar.
    #[must_use]
    pub const fn latest(timeframe: Timeframe) -> Self {
        Self::new(timeframe).descending().with_limit(1)
    }

    /// Apply the limit from the newest bar backwards.
    #[must_use]
    pub const fn descending(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Restrict to a window.
    #[must_use]
    pub fn with_window(mut self, window: QueryWindow) -> Self {
        self.start = Some(window.start);
        self.end = Some(window.end);
        self
    }

    /// Restrict the start only.
    #[must_use]
    pub fn starting_at(mut self, start: DateTime<FixedOffset>) -> Self {
        self.start = Some(start);
        self
    }

    /// Cap the number of bars.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Market data error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarketDataError {
    /// Connection error.
    #[error("Market data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// API returned an error.
    #[error("Market data API error: {message}")]
    ApiError {
        /// Error details.
        message: String,
    },

    /// No data for the symbol.
    #[error("No market data available for {symbol}")]
    NoData {
        /// Requested symbol.
        symbol: String,
    },
}

/// Port for market data.
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Fetch bars for one symbol, oldest first.
    async fn get_bars(&self, symbol: &str, query: &BarQuery) -> Result<Vec<Bar>, MarketDataError>;

    /// Latest trade price of a crypto asset quoted in USD.
    async fn get_latest_crypto_price(&self, symbol: &str) -> Result<f64, MarketDataError>;
}
