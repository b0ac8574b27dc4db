//! Alpaca-specific error types.

use thiserror::Error;

use crate::application::ports::{BrokerError, MarketDataError};

/// Errors from the Alpaca adapter.
#[derive(Debug, Error, Clone)]
pub enum AlpacaError {
    /// API returned an error.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from the API.
        code: String,
        /// Error message from the API.
        message: String,
    },

    /// Order was rejected.
    #[error("Order rejected: {0}")]
    OrderRejected(String),

    /// Authentication failed or credentials missing.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Rate limited.
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Suggested retry delay in seconds.
        retry_after_secs: u64,
    },

    /// Resource not found.
    #[error("Not found: {path}")]
    NotFound {
        /// Requested path.
        path: String,
    },

    /// Network error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Max retries exceeded.
    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded {
        /// Number of attempts made before giving up.
        attempts: u32,
    },
}

impl From<AlpacaError> for BrokerError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Network(msg) | AlpacaError::JsonParse(msg) => {
                Self::ConnectionError { message: msg }
            }
            AlpacaError::Api { code, message } => Self::Unknown {
                message: format!("{}: {}", code, message),
            },
            AlpacaError::OrderRejected(msg) => Self::OrderRejected { reason: msg },
            AlpacaError::AuthenticationFailed => Self::AuthenticationFailed,
            AlpacaError::RateLimited { .. } => Self::RateLimited,
            AlpacaError::NotFound { path } => Self::Unknown {
                message: format!("Not found: {path}"),
            },
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {} attempts", attempts),
            },
        }
    }
}

impl From<AlpacaError> for MarketDataError {
    fn from(err: AlpacaError) -> Self {
        match err {
            AlpacaError::Network(message) => Self::ConnectionError { message },
            AlpacaError::MaxRetriesExceeded { attempts } => Self::ConnectionError {
                message: format!("Max retries exceeded after {} attempts", attempts),
            },
            other => Self::ApiError {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpaca_error_to_broker_error_network() {
        let err = AlpacaError::Network("connection refused".to_string());
        let broker_err: BrokerError = err.into();
        assert!(matches!(broker_err, BrokerError::ConnectionError { .. }));
    }

    #[test]
    fn alpaca_error_to_broker_error_auth() {
        let broker_err: BrokerError = AlpacaError::AuthenticationFailed.into();
        assert!(matches!(broker_err, BrokerError::AuthenticationFailed));
    }

    #[test]
    fn alpaca_error_to_broker_error_rate_limited() {
        let err = AlpacaError::RateLimited {
            retry_after_secs: 60,
        };
        let broker_err: BrokerError = err.into();
        assert!(matches!(broker_err, BrokerError::RateLimited));
    }

    #[test]
    fn alpaca_error_to_broker_error_order_rejected() {
        let err = AlpacaError::OrderRejected("insufficient funds".to_string());
        let broker_err: BrokerError = err.into();
        assert!(matches!(broker_err, BrokerError::OrderRejected { .. }));
    }

    #[test]
    fn alpaca_error_to_market_data_error() {
        let err: MarketDataError = AlpacaError::MaxRetriesExceeded { attempts: 3 }.into();
        assert!(matches!(err, MarketDataError::ConnectionError { .. }));

        let err: MarketDataError = AlpacaError::Api {
            code: "40010001".to_string(),
            message: "invalid symbol".to_string(),
        }
        .into();
        assert!(err.to_string().contains("invalid symbol"));
    }
}
