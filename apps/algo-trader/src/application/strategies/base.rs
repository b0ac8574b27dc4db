//! Price and portfolio queries shared by every strategy.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde_json::Value;

use crate::application::ports::{
    BarQuery, BrokerError, BrokerPort, MarketDataError, MarketDataPort, OrderAck, OrderRequest,
    OrderSide,
};
use crate::domain::Timeframe;

/// Days searched back for the previous session's daily bar.
pub const YESTERDAY_WINDOW_DAYS: i64 = 10;

/// Base strategy over a broker and a market data source.
pub struct BaseStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    broker: Arc<B>,
    market_data: Arc<M>,
}

impl<B, M> Clone for BaseStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    fn clone(&self) -> Self {
        Self {
            broker: Arc::clone(&self.broker),
            market_data: Arc::clone(&self.market_data),
        }
    }
}

impl<B, M> BaseStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    /// Create a new base strategy.
    pub const fn new(broker: Arc<B>, market_data: Arc<M>) -> Self {
        Self {
            broker,
            market_data,
        }
    }

    /// Broker port.
    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Market data port.
    pub fn market_data(&self) -> &M {
        &self.market_data
    }

    /// Close of the most recent one-minute bar.
    pub async fn current_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let bars = self
            .market_data
            .get_bars(symbol, &BarQuery::latest(Timeframe::Minute))
            .await?;

        bars.last()
            .map(|bar| bar.close)
            .ok_or_else(|| MarketDataError::NoData {
                symbol: symbol.to_string(),
            })
    }

    /// Close of the latest daily bar dated before today (UTC).
    pub async fn yesterday_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.yesterday_price_at(symbol, Utc::now()).await
    }

    async fn yesterday_price_at(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<f64, MarketDataError> {
        let start = (now - TimeDelta::days(YESTERDAY_WINDOW_DAYS)).fixed_offset();
        let bars = self
            .market_data
            .get_bars(symbol, &BarQuery::new(Timeframe::Day).starting_at(start))
            .await?;

        let today = now.date_naive();
        bars.iter()
            .filter(|bar| bar.timestamp.date_naive() < today)
            .max_by_key(|bar| bar.timestamp)
            .map(|bar| bar.close)
            .ok_or_else(|| MarketDataError::NoData {
                symbol: symbol.to_string(),
            })
    }

    /// Latest USD trade price of a crypto asset.
    pub async fn current_crypto_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        self.market_data.get_latest_crypto_price(symbol).await
    }

    /// Open positions exactly as the broker reports them.
    pub async fn portfolio_raw(&self) -> Result<Value, BrokerError> {
        self.broker.get_positions_raw().await
    }

    /// Settled cash as a float.
    pub async fn cash(&self) -> Result<f64, BrokerError> {
        let account = self.broker.get_account().await?;
        Ok(account.cash.to_f64().unwrap_or(0.0))
    }

    /// Submit a market order for the day.
    pub async fn market_order(
        &self,
        symbol: &str,
        side: OrderSide,
        qty: Decimal,
    ) -> Result<OrderAck, BrokerError> {
        let ack = self
            .broker
            .submit_order(OrderRequest::market(symbol, side, qty))
            .await?;
        tracing::info!(symbol = %symbol, side = %side, qty = %qty, order_id = %ack.order_id, "Order placed");
        Ok(ack)
    }
}

/// Whole shares affordable with `amount` at `price`.
#[must_use]
pub fn whole_shares(amount: f64, price: f64) -> Decimal {
    if price <= 0.0 || amount <= 0.0 || !amount.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64((amount / price).floor()).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::domain::Bar;
    use crate::infrastructure::mock::MockBroker;

    fn daily(day: u32, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 5, day, 4, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100,
        }
    }

    fn base(broker: &Arc<MockBroker>) -> BaseStrategy<MockBroker, MockBroker> {
        BaseStrategy::new(Arc::clone(broker), Arc::clone(broker))
    }

    #[tokio::test]
    async fn current_price_is_latest_minute_close() {
        let broker = Arc::new(MockBroker::new());
        broker.push_prices("AAPL", &[150.25]);

        assert!((base(&broker).current_price("AAPL").await.unwrap() - 150.25).abs() < f64::EPSILON);

        let (_, query) = &broker.bar_queries()[0];
        assert_eq!(*query, BarQuery::latest(Timeframe::Minute));
    }

    #[tokio::test]
    async fn current_price_without_bars_is_no_data() {
        let broker = Arc::new(MockBroker::new());
        let err = base(&broker).current_price("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { .. }));
    }

    #[tokio::test]
    async fn yesterday_skips_todays_bar() {
        let broker = Arc::new(MockBroker::new());
        broker.set_bars(
            "AAPL",
            Timeframe::Day,
            vec![daily(6, 10.0), daily(7, 11.0), daily(8, 12.0)],
        );
        let now = Utc.with_ymd_and_hms(2024, 5, 8, 15, 0, 0).unwrap();

        let price = base(&broker).yesterday_price_at("AAPL", now).await.unwrap();

        assert!((price - 11.0).abs() < f64::EPSILON);
        let (_, query) = &broker.bar_queries()[0];
        assert_eq!(
            query.start,
            Some(Utc.with_ymd_and_hms(2024, 4, 28, 15, 0, 0).unwrap().fixed_offset())
        );
    }

    #[tokio::test]
    async fn yesterday_without_history_is_no_data() {
        let broker = Arc::new(MockBroker::new());
        broker.set_bars("AAPL", Timeframe::Day, vec![daily(8, 12.0)]);
        let now = Utc.with_ymd_and_hms(2024, 5, 8, 15, 0, 0).unwrap();

        let err = base(&broker).yesterday_price_at("AAPL", now).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoData { .. }));
    }

    #[tokio::test]
    async fn portfolio_raw_passes_through() {
        let broker = Arc::new(MockBroker::new());
        broker.set_position("TSLA", dec!(2), dec!(180));

        let raw = base(&broker).portfolio_raw().await.unwrap();
        assert_eq!(raw[0]["symbol"], "TSLA");
    }

    #[test]
    fn whole_shares_floors() {
        assert_eq!(whole_shares(1000.0, 333.0), dec!(3));
        assert_eq!(whole_shares(100.0, 150.0), Decimal::ZERO);
        assert_eq!(whole_shares(100.0, 0.0), Decimal::ZERO);
        assert_eq!(whole_shares(-5.0, 1.0), Decimal::ZERO);
    }
}
