//! In-memory port implementations for tests and offline runs.

mod broker;
mod fund_data;

pub use broker::MockBroker;
pub use fund_data::{FundCall, MockFundData};
