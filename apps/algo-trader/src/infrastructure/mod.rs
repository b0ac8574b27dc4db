//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `broker/`: Alpaca trading and market data REST adapter
//! - `fund_data/`: ARK fund-disclosure client
//! - `persistence/`: ticker list and mean cache files
//! - `mock/`: in-memory ports for tests
//! - `container`: wiring of adapters into strategies

pub mod broker;
pub mod container;
pub mod fund_data;
pub mod mock;
pub mod persistence;

pub use container::{AlpacaContainer, Container, ark_client};
