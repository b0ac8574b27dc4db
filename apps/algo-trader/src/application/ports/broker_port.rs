//! Broker Port (Driven Port)
//!
//! Interface for interacting with a brokerage account.

use std::fmt;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Request to submit a market order for the trading day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol to trade.
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Whole-share quantity.
    pub qty: Decimal,
}

impl OrderRequest {
    /// Create a market order request with a fresh client order ID.
    #[must_use]
    pub fn market(symbol: impl Into<String>, side: OrderSide, qty: Decimal) -> Self {
        Self {
            client_order_id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            side,
            qty,
        }
    }
}

/// Acknowledgment from the broker after order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Broker-assigned order ID.
    pub order_id: String,
    /// Client order ID echoed back.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Broker order status.
    pub status: String,
}

/// Account balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Settled cash.
    pub cash: Decimal,
    /// Buying power.
    pub buying_power: Decimal,
    /// Total equity.
    pub equity: Decimal,
}

/// Open position in a single symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol.
    pub symbol: String,
    /// Quantity held.
    pub qty: Decimal,
    /// Average entry price.
    pub avg_entry_price: Decimal,
}

/// Broker port error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Connection error.
    #[error("Broker connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Credentials rejected.
    #[error("Broker authentication failed")]
    AuthenticationFailed,

    /// Order rejected by broker.
    #[error("Order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason.
        reason: String,
    },

    /// Rate limited.
    #[error("Rate limited by broker")]
    RateLimited,

    /// Unknown error.
    #[error("Broker error: {message}")]
    Unknown {
        /// Error details.
        message: String,
    },
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Get account balances.
    async fn get_account(&self) -> Result<Account, BrokerError>;

    /// Get the open position for a symbol, if any.
    async fn get_position(&self, symbol: &str) -> Result<Option<Position>, BrokerError>;

    /// Get all open positions exactly as the broker reports them.
    async fn get_positions_raw(&self) -> Result<Value, BrokerError>;

    /// Submit an order.
    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn market_order_gets_unique_client_id() {
        let a = OrderRequest::market("AAPL", OrderSide::Buy, dec!(1));
        let b = OrderRequest::market("AAPL", OrderSide::Buy, dec!(1));
        assert_ne!(a.client_order_id, b.client_order_id);
        assert_eq!(a.symbol, "AAPL");
    }

    #[test]
    fn order_side_display() {
        assert_eq!(OrderSide::Buy.to_string(), "buy");
        assert_eq!(OrderSide::Sell.to_string(), "sell");
    }
}
