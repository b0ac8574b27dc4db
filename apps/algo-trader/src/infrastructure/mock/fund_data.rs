//! Mock fund-disclosure source for testing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ports::{FundDataError, FundDataPort, FundQuery};

/// Which disclosure endpoint a call hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundCall {
    /// Holdings query.
    Holdings(FundQuery),
    /// Trades query.
    Trades(FundQuery),
}

/// Mock fund data returning canned documents per fund.
///
/// Funds without a canned document return an empty one.
#[derive(Debug, Default)]
pub struct MockFundData {
    holdings: RwLock<HashMap<String, Value>>,
    trades: RwLock<HashMap<String, Value>>,
    calls: RwLock<Vec<FundCall>>,
}

impl MockFundData {
    /// Create an empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the holdings document for a fund.
    pub fn set_holdings(&self, symbol: &str, document: Value) {
        self.holdings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), document);
    }

    /// Set the trades document for a fund.
    pub fn set_trades(&self, symbol: &str, document: Value) {
        self.trades
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), document);
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<FundCall> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: FundCall) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

#[async_trait]
impl FundDataPort for MockFundData {
    async fn get_etf_holdings(&self, query: &FundQuery) -> Result<Value, FundDataError> {
        self.record(FundCall::Holdings(query.clone()));
        Ok(self
            .holdings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query.symbol)
            .cloned()
            .unwrap_or_else(|| json!({"symbol": query.symbol, "holdings": []})))
    }

    async fn get_etf_trades(&self, query: &FundQuery) -> Result<Value, FundDataError> {
        self.record(FundCall::Trades(query.clone()));
        Ok(self
            .trades
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&query.symbol)
            .cloned()
            .unwrap_or_else(|| json!({"symbol": query.symbol, "trades": []})))
    }
}
