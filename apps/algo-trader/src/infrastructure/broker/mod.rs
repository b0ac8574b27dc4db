//! Broker Adapters
//!
//! Implementations of `BrokerPort` and `MarketDataPort`.

pub mod alpaca;

pub use alpaca::{AlpacaBrokerAdapter, AlpacaConfig, AlpacaEnvironment, AlpacaError, RetryConfig};
