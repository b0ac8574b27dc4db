//! Single-symbol take-profit / stop-loss strategy.

use std::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::application::ports::{BrokerPort, MarketDataPort, OrderSide};

use super::StrategyError;
use super::base::BaseStrategy;

/// Parameters of a simple run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleConfig {
    /// Symbol to trade.
    pub symbol: String,
    /// Shares to buy when no position is held.
    pub qty: u32,
    /// Take-profit threshold in percent above entry.
    pub gain_pct: f64,
    /// Stop-loss threshold in percent below entry.
    pub loss_pct: f64,
}

impl SimpleConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.qty == 0 {
            return Err(StrategyError::InvalidConfig(
                "qty must be greater than zero".to_string(),
            ));
        }
        if !(self.gain_pct.is_finite() && self.gain_pct >= 0.0) {
            return Err(StrategyError::InvalidConfig(format!(
                "gain must be a non-negative percentage, got {}",
                self.gain_pct
            )));
        }
        if !(self.loss_pct.is_finite() && (0.0..=100.0).contains(&self.loss_pct)) {
            return Err(StrategyError::InvalidConfig(format!(
                "loss must be a percentage between 0 and 100, got {}",
                self.loss_pct
            )));
        }
        Ok(())
    }

    /// Exit prices for a given entry: `(take_profit, stop_loss)`.
    #[must_use]
    pub fn exit_levels(&self, entry: f64) -> (f64, f64) {
        (
            entry * (1.0 + self.gain_pct / 100.0),
            entry * (1.0 - self.loss_pct / 100.0),
        )
    }
}

/// Why the position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Price reached the gain threshold.
    TakeProfit,
    /// Price reached the loss threshold.
    StopLoss,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeProfit => write!(f, "take-profit"),
            Self::StopLoss => write!(f, "stop-loss"),
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleOutcome {
    /// Symbol traded.
    pub symbol: String,
    /// Shares sold at exit.
    pub qty: Decimal,
    /// Entry price used for the thresholds.
    pub entry_price: f64,
    /// Price that triggered the exit.
    pub exit_price: f64,
    /// Exit trigger.
    pub reason: ExitReason,
    /// Broker ID of the exit order.
    pub exit_order_id: String,
}

/// Buy once, then hold until a threshold is crossed.
pub struct SimpleStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    base: BaseStrategy<B, M>,
    poll_interval: Duration,
}

impl<B, M> SimpleStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    /// Create a new simple strategy polling at `poll_interval`.
    pub const fn new(base: BaseStrategy<B, M>, poll_interval: Duration) -> Self {
        Self {
            base,
            poll_interval,
        }
    }

    /// Run until the position is closed.
    pub async fn run(&self, config: &SimpleConfig) -> Result<SimpleOutcome, StrategyError> {
        config.validate()?;
        let symbol = config.symbol.as_str();

        let (qty, entry_price) = match self.base.broker().get_position(symbol).await? {
            Some(position) if position.qty > Decimal::ZERO => {
                let entry = position.avg_entry_price.to_f64().unwrap_or(0.0);
                tracing::info!(symbol = %symbol, qty = %position.qty, entry, "Adopting existing position");
                (position.qty, entry)
            }
            _ => {
                let entry = self.base.current_price(symbol).await?;
                let qty = Decimal::from(config.qty);
                self.base.market_order(symbol, OrderSide::Buy, qty).await?;
                (qty, entry)
            }
        };

        let (take_profit, stop_loss) = config.exit_levels(entry_price);
        tracing::info!(symbol = %symbol, entry_price, take_profit, stop_loss, "Watching position");

        let (exit_price, reason) = loop {
            let price = self.base.current_price(symbol).await?;
            if price >= take_profit {
                break (price, ExitReason::TakeProfit);
            }
            if price <= stop_loss {
                break (price, ExitReason::StopLoss);
            }
            tracing::debug!(symbol = %symbol, price, "No exit yet");
            tokio::time::sleep(self.poll_interval).await;
        };

        tracing::info!(symbol = %symbol, price = exit_price, reason = %reason, "Exit triggered");
        let ack = self.base.market_order(symbol, OrderSide::Sell, qty).await?;

        Ok(SimpleOutcome {
            symbol: symbol.to_string(),
            qty,
            entry_price,
            exit_price,
            reason,
            exit_order_id: ack.order_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;
    use test_case::test_case;

    use super::*;
    use crate::infrastructure::mock::MockBroker;

    fn config(gain_pct: f64, loss_pct: f64) -> SimpleConfig {
        SimpleConfig {
            symbol: "AAPL".to_string(),
            qty: 2,
            gain_pct,
            loss_pct,
        }
    }

    fn strategy(broker: &Arc<MockBroker>) -> SimpleStrategy<MockBroker, MockBroker> {
        SimpleStrategy::new(
            BaseStrategy::new(Arc::clone(broker), Arc::clone(broker)),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn buys_then_takes_profit() {
        let broker = Arc::new(MockBroker::new());
        broker.push_prices("AAPL", &[100.0, 100.5, 99.5, 101.0]);

        let outcome = strategy(&broker).run(&config(1.0, 1.0)).await.unwrap();

        assert_eq!(outcome.reason, ExitReason::TakeProfit);
        assert!((outcome.entry_price - 100.0).abs() < f64::EPSILON);
        assert!((outcome.exit_price - 101.0).abs() < f64::EPSILON);

        let orders = broker.orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].side, OrderSide::Buy);
        assert_eq!(orders[0].qty, dec!(2));
        assert_eq!(orders[1].side, OrderSide::Sell);
        assert_eq!(orders[1].qty, dec!(2));
    }

    #[tokio::test]
    async fn existing_position_stops_out_without_buying() {
        let broker = Arc::new(MockBroker::new());
        broker.set_position("AAPL", dec!(7), dec!(200));
        broker.push_prices("AAPL", &[199.0, 189.0]);

        let outcome = strategy(&broker).run(&config(10.0, 5.0)).await.unwrap();

        assert_eq!(outcome.reason, ExitReason::StopLoss);
        assert_eq!(outcome.qty, dec!(7));
        let orders = broker.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].side, OrderSide::Sell);
        assert_eq!(orders[0].qty, dec!(7));
    }

    #[test_case(0, 1.0, 1.0 ; "zero qty")]
    #[test_case(1, -1.0, 1.0 ; "negative gain")]
    #[test_case(1, 1.0, -0.5 ; "negative loss")]
    #[test_case(1, 1.0, 150.0 ; "loss above hundred")]
    #[test_case(1, f64::NAN, 1.0 ; "nan gain")]
    fn invalid_config_rejected(qty: u32, gain_pct: f64, loss_pct: f64) {
        let cfg = SimpleConfig {
            symbol: "AAPL".to_string(),
            qty,
            gain_pct,
            loss_pct,
        };
        assert!(matches!(cfg.validate(), Err(StrategyError::InvalidConfig(_))));
    }

    #[test]
    fn exit_levels() {
        let (take_profit, stop_loss) = config(2.0, 5.0).exit_levels(100.0);
        assert!((take_profit - 102.0).abs() < 1e-9);
        assert!((stop_loss - 95.0).abs() < 1e-9);
    }
}
