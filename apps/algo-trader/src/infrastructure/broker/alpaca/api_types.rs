//! Alpaca API request and response types.
//!
//! These types map directly to Alpaca's REST API format.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::ports::{Account, OrderAck, OrderRequest, Position};
use crate::domain::Bar;

// ============================================================================
// Market Data Types
// ============================================================================

/// Response of `GET /v2/stocks/{symbol}/bars`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBarsResponse {
    /// Bars, oldest first. Alpaca sends `null` when the window is empty.
    #[serde(default)]
    pub bars: Option<Vec<AlpacaBar>>,
    /// Pagination token.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Single bar in Alpaca's compact format.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaBar {
    /// Bucket start.
    pub t: DateTime<Utc>,
    /// Open.
    pub o: f64,
    /// High.
    pub h: f64,
    /// Low.
    pub l: f64,
    /// Close.
    pub c: f64,
    /// Volume.
    #[serde(default)]
    pub v: u64,
}

impl From<AlpacaBar> for Bar {
    fn from(bar: AlpacaBar) -> Self {
        Self {
            timestamp: bar.t,
            open: bar.o,
            high: bar.h,
            low: bar.l,
            close: bar.c,
            volume: bar.v,
        }
    }
}

/// Response of `GET /v1beta3/crypto/us/latest/trades`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaLatestTradesResponse {
    /// Latest trade keyed by pair (`ETH/USD`).
    #[serde(default)]
    pub trades: HashMap<String, AlpacaTrade>,
}

/// Single trade print.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaTrade {
    /// Price.
    pub p: f64,
    /// Size.
    #[serde(default)]
    pub s: Option<f64>,
}

// ============================================================================
// Order Types
// ============================================================================

/// Order request for Alpaca API.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaOrderRequest {
    /// Stock symbol.
    pub symbol: String,
    /// Quantity (shares).
    pub qty: String,
    /// Order side.
    pub side: String,
    /// Order type.
    #[serde(rename = "type")]
    pub order_type: String,
    /// Time in force.
    pub time_in_force: String,
    /// Client order ID.
    pub client_order_id: String,
}

impl From<&OrderRequest> for AlpacaOrderRequest {
    fn from(request: &OrderRequest) -> Self {
        Self {
            symbol: request.symbol.clone(),
            qty: request.qty.to_string(),
            side: request.side.to_string(),
            order_type: "market".to_string(),
            time_in_force: "day".to_string(),
            client_order_id: request.client_order_id.clone(),
        }
    }
}

/// Order response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    /// Broker order ID.
    pub id: String,
    /// Client order ID.
    pub client_order_id: String,
    /// Symbol.
    pub symbol: String,
    /// Order status.
    pub status: String,
}

impl From<AlpacaOrderResponse> for OrderAck {
    fn from(response: AlpacaOrderResponse) -> Self {
        Self {
            order_id: response.id,
            client_order_id: response.client_order_id,
            symbol: response.symbol,
            status: response.status,
        }
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// Account response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaAccountResponse {
    /// Account equity.
    pub equity: String,
    /// Cash balance.
    pub cash: String,
    /// Buying power.
    pub buying_power: String,
}

impl AlpacaAccountResponse {
    /// Parse the decimal strings into an `Account`.
    pub fn to_account(&self) -> Result<Account, String> {
        Ok(Account {
            cash: parse_decimal("cash", &self.cash)?,
            buying_power: parse_decimal("buying_power", &self.buying_power)?,
            equity: parse_decimal("equity", &self.equity)?,
        })
    }
}

// ============================================================================
// Position Types
// ============================================================================

/// Position response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaPositionResponse {
    /// Symbol.
    pub symbol: String,
    /// Quantity.
    pub qty: String,
    /// Average entry price.
    pub avg_entry_price: String,
}

impl AlpacaPositionResponse {
    /// Parse the decimal strings into a `Position`.
    pub fn to_position(&self) -> Result<Position, String> {
        Ok(Position {
            symbol: self.symbol.clone(),
            qty: parse_decimal("qty", &self.qty)?,
            avg_entry_price: parse_decimal("avg_entry_price", &self.avg_entry_price)?,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error response from Alpaca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaErrorResponse {
    /// Error code.
    #[serde(default)]
    pub code: Option<u64>,
    /// Error message.
    pub message: String,
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, String> {
    raw.parse()
        .map_err(|_| format!("Failed to parse {field}: {raw:?}"))
}
