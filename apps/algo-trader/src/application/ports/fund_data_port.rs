//! Fund Data Port (Driven Port)
//!
//! Interface for the public ARK fund-disclosure API.

use async_trait::async_trait;
use serde_json::Value;

/// Default number of rows requested from the disclosure API.
pub const DEFAULT_FUND_LIMIT: u32 = 100;

/// Parameters for a holdings or trades request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundQuery {
    /// Fund ticker.
    pub symbol: String,
    /// Earliest date, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Latest date, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Maximum rows.
    pub limit: u32,
}

impl FundQuery {
    /// Query the most recent disclosure for a fund.
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start_date: None,
            end_date: None,
            limit: DEFAULT_FUND_LIMIT,
        }
    }

    /// Restrict to a date range.
    #[must_use]
    pub fn with_dates(mut self, start_date: Option<String>, end_date: Option<String>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Set the row limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Fund data error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FundDataError {
    /// Connection error.
    #[error("Fund data connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// API returned an error status.
    #[error("Fund data API error ({status}): {message}")]
    ApiError {
        /// HTTP status.
        status: u16,
        /// Response body or message.
        message: String,
    },

    /// Response could not be interpreted.
    #[error("Invalid fund data response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

/// Port for fund disclosure queries.
///
/// Both queries return the API document unchanged.
#[async_trait]
pub trait FundDataPort: Send + Sync {
    /// Disclosed holdings of a fund.
    async fn get_etf_holdings(&self, query: &FundQuery) -> Result<Value, FundDataError>;

    /// Disclosed trades of a fund.
    async fn get_etf_trades(&self, query: &FundQuery) -> Result<Value, FundDataError>;
}
