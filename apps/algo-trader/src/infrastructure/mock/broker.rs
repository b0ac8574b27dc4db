//! Mock brokerage for testing.
//!
//! Implements both `BrokerPort` and `MarketDataPort` over scripted state so
//! strategies can be driven without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde_json::Value;

use crate::application::ports::{
    Account, BarQuery, BrokerError, BrokerPort, MarketDataError, MarketDataPort, OrderAck,
    OrderRequest, OrderSide, Position,
};
use crate::domain::{Bar, Timeframe};

/// Mock broker and market data source.
#[derive(Debug)]
pub struct MockBroker {
    account: RwLock<Account>,
    positions: RwLock<Vec<Position>>,
    minute_prices: RwLock<HashMap<String, VecDeque<f64>>>,
    quoted: RwLock<HashMap<String, f64>>,
    bars: RwLock<HashMap<(String, Timeframe), Vec<Bar>>>,
    crypto_prices: RwLock<HashMap<String, f64>>,
    orders: RwLock<Vec<OrderRequest>>,
    bar_queries: RwLock<Vec<(String, BarQuery)>>,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    /// Create a mock with $100,000 cash and no positions.
    #[must_use]
    pub fn new() -> Self {
        let cash = Decimal::new(100_000, 0);
        Self {
            account: RwLock::new(Account {
                cash,
                buying_power: cash,
                equity: cash,
            }),
            positions: RwLock::new(vec![]),
            minute_prices: RwLock::new(HashMap::new()),
            quoted: RwLock::new(HashMap::new()),
            bars: RwLock::new(HashMap::new()),
            crypto_prices: RwLock::new(HashMap::new()),
            orders: RwLock::new(vec![]),
            bar_queries: RwLock::new(vec![]),
        }
    }

    /// Set the cash balance.
    pub fn set_cash(&self, cash: Decimal) {
        let mut account = self.account.write().unwrap_or_else(PoisonError::into_inner);
        account.cash = cash;
        account.buying_power = cash;
    }

    /// Add or replace a position.
    pub fn set_position(&self, symbol: &str, qty: Decimal, avg_entry_price: Decimal) {
        let mut positions = self.positions.write().unwrap_or_else(PoisonError::into_inner);
        positions.retain(|p| p.symbol != symbol);
        positions.push(Position {
            symbol: symbol.to_string(),
            qty,
            avg_entry_price,
        });
    }

    /// Script successive latest-minute closes. The last one repeats.
    pub fn push_prices(&self, symbol: &str, prices: &[f64]) {
        self.minute_prices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(symbol.to_string())
            .or_default()
            .extend(prices);
    }

    /// Set the bars returned for a symbol and timeframe.
    pub fn set_bars(&self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) {
        self.bars
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((symbol.to_string(), timeframe), bars);
    }

    /// Set the latest USD price of a crypto asset.
    pub fn set_crypto_price(&self, symbol: &str, price: f64) {
        self.crypto_prices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_uppercase(), price);
    }

    /// Orders submitted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Bar queries received so far.
    #[must_use]
    pub fn bar_queries(&self) -> Vec<(String, BarQuery)> {
        self.bar_queries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_minute_price(&self, symbol: &str) -> Option<f64> {
        let mut scripted = self
            .minute_prices
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let queue = scripted.get_mut(symbol)?;
        let price = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        }?;
        self.quoted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(symbol.to_string(), price);
        Some(price)
    }

    // Fill at the last quoted price, or the next scripted one if never quoted.
    fn last_price(&self, symbol: &str) -> Option<f64> {
        if let Some(price) = self
            .quoted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
        {
            return Some(*price);
        }
        self.minute_prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .and_then(|q| q.front().copied())
    }

    fn apply_fill(&self, request: &OrderRequest) {
        let price = self
            .last_price(&request.symbol)
            .and_then(Decimal::from_f64)
            .unwrap_or(Decimal::ZERO);
        let mut positions = self.positions.write().unwrap_or_else(PoisonError::into_inner);
        let mut account = self.account.write().unwrap_or_else(PoisonError::into_inner);

        match request.side {
            OrderSide::Buy => {
                account.cash -= price * request.qty;
                if let Some(pos) = positions.iter_mut().find(|p| p.symbol == request.symbol) {
                    let total = pos.qty + request.qty;
                    pos.avg_entry_price =
                        (pos.avg_entry_price * pos.qty + price * request.qty) / total;
                    pos.qty = total;
                } else {
                    positions.push(Position {
                        symbol: request.symbol.clone(),
                        qty: request.qty,
                        avg_entry_price: price,
                    });
                }
            }
            OrderSide::Sell => {
                account.cash += price * request.qty;
                if let Some(pos) = positions.iter_mut().find(|p| p.symbol == request.symbol) {
                    pos.qty -= request.qty;
                }
                positions.retain(|p| p.qty > Decimal::ZERO);
            }
        }
    }
}

#[async_trait]
impl BrokerPort for MockBroker {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        Ok(self
            .account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<Position>, BrokerError> {
        Ok(self
            .positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.symbol == symbol)
            .cloned())
    }

    async fn get_positions_raw(&self) -> Result<Value, BrokerError> {
        let positions = self
            .positions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        serde_json::to_value(positions).map_err(|e| BrokerError::Unknown {
            message: e.to_string(),
        })
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        if request.qty <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected {
                reason: "qty must be positive".to_string(),
            });
        }
        self.apply_fill(&request);

        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        orders.push(request.clone());

        Ok(OrderAck {
            order_id: format!("mock-{}", orders.len()),
            client_order_id: request.client_order_id,
            symbol: request.symbol,
            status: "filled".to_string(),
        })
    }
}

#[async_trait]
impl MarketDataPort for MockBroker {
    async fn get_bars(&self, symbol: &str, query: &BarQuery) -> Result<Vec<Bar>, MarketDataError> {
        self.bar_queries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((symbol.to_string(), query.clone()));

        if query.timeframe == Timeframe::Minute {
            if let Some(close) = self.next_minute_price(symbol) {
                return Ok(vec![Bar {
                    timestamp: Utc::now(),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 0,
                }]);
            }
        }

        let bars = self.bars.read().unwrap_or_else(PoisonError::into_inner);
        let mut selected: Vec<Bar> = bars
            .get(&(symbol.to_string(), query.timeframe))
            .map(|all| {
                all.iter()
                    .filter(|b| query.start.is_none_or(|s| b.timestamp >= s))
                    .filter(|b| query.end.is_none_or(|e| b.timestamp <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(limit) = query.limit.map(|l| l as usize) {
            if query.newest_first {
                selected.drain(..selected.len().saturating_sub(limit));
            } else {
                selected.truncate(limit);
            }
        }
        Ok(selected)
    }

    async fn get_latest_crypto_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.crypto_prices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&symbol.to_uppercase())
            .copied()
            .ok_or_else(|| MarketDataError::NoData {
                symbol: format!("{}/USD", symbol.to_uppercase()),
            })
    }
}
