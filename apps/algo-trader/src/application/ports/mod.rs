//! Application Ports (Driven)
//!
//! Interfaces for the systems this tool talks to:
//! - `BrokerPort`: account, positions and order placement
//! - `MarketDataPort`: historical bars and crypto prices
//! - `FundDataPort`: ARK fund holdings and trades

mod broker_port;
mod fund_data_port;
mod market_data_port;

pub use broker_port::{Account, BrokerError, BrokerPort, OrderAck, OrderRequest, OrderSide, Position};
pub use fund_data_port::{DEFAULT_FUND_LIMIT, FundDataError, FundDataPort, FundQuery};
pub use market_data_port::{BarQuery, MarketDataError, MarketDataPort};
