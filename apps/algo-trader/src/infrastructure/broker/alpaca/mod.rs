//! Alpaca Markets Adapter
//!
//! Implementation of `BrokerPort` and `MarketDataPort` for the Alpaca
//! REST APIs with:
//! - Retry logic with exponential backoff
//! - Environment-aware safety checks (PAPER vs LIVE)
//! - Base URL overrides for proxies and mock servers

mod adapter;
mod api_types;
mod config;
mod error;
mod http_client;

pub use adapter::AlpacaBrokerAdapter;
pub use config::{AlpacaConfig, AlpacaEnvironment, RetryConfig};
pub use error::AlpacaError;
