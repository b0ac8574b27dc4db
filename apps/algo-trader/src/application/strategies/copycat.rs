//! Mirror the most recent disclosed trades of an ETF.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::application::ports::{
    BrokerPort, FundDataError, FundDataPort, FundQuery, MarketDataPort, OrderSide,
};
use crate::domain::{FundTrade, TradeDirection, TradesDocument};

use super::StrategyError;
use super::base::{BaseStrategy, whole_shares};

/// Parameters of a copycat run.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyCatConfig {
    /// ETF whose trades are mirrored.
    pub etf_symbol: String,
    /// Share of cash to spend today, in percent.
    pub daily_budget_pct: f64,
    /// Cash that must remain after buying.
    pub min_balance: f64,
}

impl CopyCatConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if !(self.daily_budget_pct.is_finite() && (0.0..=100.0).contains(&self.daily_budget_pct)) {
            return Err(StrategyError::InvalidConfig(format!(
                "daily budget must be a percentage between 0 and 100, got {}",
                self.daily_budget_pct
            )));
        }
        if !(self.min_balance.is_finite() && self.min_balance >= 0.0) {
            return Err(StrategyError::InvalidConfig(format!(
                "minimum balance must be non-negative, got {}",
                self.min_balance
            )));
        }
        Ok(())
    }

    /// Spendable amount for `cash`: the daily budget, capped so that at
    /// least `min_balance` remains.
    #[must_use]
    pub fn spendable(&self, cash: f64) -> f64 {
        let budget = cash * self.daily_budget_pct / 100.0;
        budget.min(cash - self.min_balance).max(0.0)
    }
}

/// What happened to one mirrored trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Order accepted by the broker.
    Placed {
        /// Broker order ID.
        order_id: String,
    },
    /// No order sent.
    Skipped {
        /// Why.
        reason: String,
    },
}

/// One mirrored trade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAction {
    /// Ticker traded by the fund.
    pub ticker: String,
    /// Direction copied.
    pub side: OrderSide,
    /// Shares ordered (zero when skipped before sizing).
    pub qty: Decimal,
    /// Result.
    pub outcome: ActionOutcome,
}

/// Summary of a copycat run.
#[derive(Debug, Clone, PartialEq)]
pub struct CopyCatReport {
    /// ETF mirrored.
    pub etf_symbol: String,
    /// Disclosure date mirrored, if the fund reported any trades.
    pub trade_date: Option<NaiveDate>,
    /// Amount available for buys.
    pub budget: f64,
    /// Per-trade results, in disclosure order.
    pub actions: Vec<CopyAction>,
}

impl CopyCatReport {
    /// Number of orders placed.
    #[must_use]
    pub fn placed(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, ActionOutcome::Placed { .. }))
            .count()
    }
}

/// Copies an ETF's latest trades within a daily budget.
pub struct CopyCatStrategy<B, M, F>
where
    B: BrokerPort,
    M: MarketDataPort,
    F: FundDataPort,
{
    base: BaseStrategy<B, M>,
    funds: Arc<F>,
}

impl<B, M, F> CopyCatStrategy<B, M, F>
where
    B: BrokerPort,
    M: MarketDataPort,
    F: FundDataPort,
{
    /// Create a new copycat strategy.
    pub const fn new(base: BaseStrategy<B, M>, funds: Arc<F>) -> Self {
        Self { base, funds }
    }

    /// Mirror the ETF's most recent trading day once.
    pub async fn run(&self, config: &CopyCatConfig) -> Result<CopyCatReport, StrategyError> {
        config.validate()?;

        let raw = self
            .funds
            .get_etf_trades(&FundQuery::new(&config.etf_symbol))
            .await?;
        let document =
            TradesDocument::from_value(&raw).map_err(|e| FundDataError::InvalidResponse {
                message: format!("{} trades: {e}", config.etf_symbol),
            })?;
        let latest = document.latest_day();
        let trade_date = latest.first().map(|t| t.date);

        let cash = self.base.cash().await?;
        let budget = config.spendable(cash);

        let mut report = CopyCatReport {
            etf_symbol: config.etf_symbol.clone(),
            trade_date,
            budget,
            actions: Vec::new(),
        };

        if budget <= 0.0 {
            tracing::info!(cash, min_balance = config.min_balance, "No spendable budget, not trading");
            return Ok(report);
        }

        let tradable: Vec<(&str, &FundTrade)> = latest
            .iter()
            .filter_map(|t| {
                let ticker = t.ticker.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                Some((ticker, *t))
            })
            .collect();
        let buys: Vec<&FundTrade> = tradable
            .iter()
            .map(|(_, t)| *t)
            .filter(|t| t.direction == TradeDirection::Buy)
            .collect();
        let total_weight: f64 = buys.iter().map(|t| weight(t)).sum();

        for (ticker, trade) in tradable {
            let action = match trade.direction {
                TradeDirection::Buy => {
                    let share = if total_weight > 0.0 {
                        weight(trade) / total_weight
                    } else {
                        1.0 / buys.len() as f64
                    };
                    self.buy(ticker, budget * share).await?
                }
                TradeDirection::Sell => self.sell(ticker).await?,
            };
            report.actions.push(action);
        }

        tracing::info!(
            etf = %config.etf_symbol,
            date = ?report.trade_date,
            placed = report.placed(),
            "Copycat run finished"
        );
        Ok(report)
    }

    async fn buy(&self, ticker: &str, allocation: f64) -> Result<CopyAction, StrategyError> {
        let price = match self.base.current_price(ticker).await {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(ticker = %ticker, error = %e, "No price, skipping buy");
                return Ok(skipped(ticker, OrderSide::Buy, Decimal::ZERO, e.to_string()));
            }
        };

        let qty = whole_shares(allocation, price);
        if qty.is_zero() {
            return Ok(skipped(
                ticker,
                OrderSide::Buy,
                qty,
                format!("allocation {allocation:.2} buys no whole share at {price}"),
            ));
        }

        let ack = self.base.market_order(ticker, OrderSide::Buy, qty).await?;
        Ok(placed(ticker, OrderSide::Buy, qty, ack.order_id))
    }

    async fn sell(&self, ticker: &str) -> Result<CopyAction, StrategyError> {
        match self.base.broker().get_position(ticker).await? {
            Some(position) if position.qty > Decimal::ZERO => {
                let ack = self
                    .base
                    .market_order(ticker, OrderSide::Sell, position.qty)
                    .await?;
                Ok(placed(ticker, OrderSide::Sell, position.qty, ack.order_id))
            }
            _ => Ok(skipped(
                ticker,
                OrderSide::Sell,
                Decimal::ZERO,
                "no position held".to_string(),
            )),
        }
    }
}

fn weight(trade: &FundTrade) -> f64 {
    trade.etf_percent.filter(|p| p.is_finite()).unwrap_or(0.0).max(0.0)
}

fn placed(ticker: &str, side: OrderSide, qty: Decimal, order_id: String) -> CopyAction {
    CopyAction {
        ticker: ticker.to_string(),
        side,
        qty,
        outcome: ActionOutcome::Placed { order_id },
    }
}

fn skipped(ticker: &str, side: OrderSide, qty: Decimal, reason: String) -> CopyAction {
    CopyAction {
        ticker: ticker.to_string(),
        side,
        qty,
        outcome: ActionOutcome::Skipped { reason },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;
    use crate::infrastructure::mock::{MockBroker, MockFundData};

    fn config(daily_budget_pct: f64, min_balance: f64) -> CopyCatConfig {
        CopyCatConfig {
            etf_symbol: "ARKK".to_string(),
            daily_budget_pct,
            min_balance,
        }
    }

    fn strategy(
        broker: &Arc<MockBroker>,
        funds: &Arc<MockFundData>,
    ) -> CopyCatStrategy<MockBroker, MockBroker, MockFundData> {
        CopyCatStrategy::new(
            BaseStrategy::new(Arc::clone(broker), Arc::clone(broker)),
            Arc::clone(funds),
        )
    }

    fn trades() -> serde_json::Value {
        json!({
            "symbol": "ARKK",
            "trades": [
                {"fund": "ARKK", "date": "2024-05-01", "ticker": "OLD", "direction": "Buy", "etf_percent": 1.0},
                {"fund": "ARKK", "date": "2024-05-02", "ticker": "TSLA", "direction": "Buy", "etf_percent": 0.75},
                {"fund": "ARKK", "date": "2024-05-02", "ticker": "ROKU", "direction": "Buy", "etf_percent": 0.25},
                {"fund": "ARKK", "date": "2024-05-02", "ticker": "COIN", "direction": "Sell", "etf_percent": 0.2}
            ]
        })
    }

    #[test]
    fn spendable_respects_floor() {
        assert!((config(10.0, 0.0).spendable(1000.0) - 100.0).abs() < 1e-9);
        assert!((config(10.0, 950.0).spendable(1000.0) - 50.0).abs() < 1e-9);
        assert!(config(10.0, 2000.0).spendable(1000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mirrors_latest_day_proportionally() {
        let broker = Arc::new(MockBroker::new());
        broker.set_cash(dec!(10000));
        broker.push_prices("TSLA", &[100.0]);
        broker.push_prices("ROKU", &[50.0]);
        broker.set_position("COIN", dec!(4), dec!(200));
        let funds = Arc::new(MockFundData::new());
        funds.set_trades("ARKK", trades());

        let report = strategy(&broker, &funds).run(&config(10.0, 0.0)).await.unwrap();

        assert_eq!(report.trade_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        assert!((report.budget - 1000.0).abs() < 1e-9);
        assert_eq!(report.placed(), 3);

        let orders = broker.orders();
        // 750 / 100 and 250 / 50
        assert_eq!(orders[0].symbol, "TSLA");
        assert_eq!(orders[0].qty, dec!(7));
        assert_eq!(orders[1].symbol, "ROKU");
        assert_eq!(orders[1].qty, dec!(5));
        assert_eq!(orders[2].symbol, "COIN");
        assert_eq!(orders[2].side, OrderSide::Sell);
        assert_eq!(orders[2].qty, dec!(4));
    }

    #[tokio::test]
    async fn no_budget_means_no_trading() {
        let broker = Arc::new(MockBroker::new());
        broker.set_cash(dec!(500));
        let funds = Arc::new(MockFundData::new());
        funds.set_trades("ARKK", trades());

        let report = strategy(&broker, &funds).run(&config(10.0, 500.0)).await.unwrap();

        assert!(report.actions.is_empty());
        assert!(broker.orders().is_empty());
    }

    #[tokio::test]
    async fn unaffordable_and_unheld_are_skipped() {
        let broker = Arc::new(MockBroker::new());
        broker.set_cash(dec!(1000));
        broker.push_prices("TSLA", &[900.0]);
        broker.push_prices("ROKU", &[900.0]);
        let funds = Arc::new(MockFundData::new());
        funds.set_trades("ARKK", trades());

        let report = strategy(&broker, &funds).run(&config(10.0, 0.0)).await.unwrap();

        assert_eq!(report.actions.len(), 3);
        assert_eq!(report.placed(), 0);
        assert!(
            report
                .actions
                .iter()
                .all(|a| matches!(a.outcome, ActionOutcome::Skipped { .. }))
        );
    }

    #[tokio::test]
    async fn blank_tickers_do_not_dilute_budget() {
        let broker = Arc::new(MockBroker::new());
        broker.set_cash(dec!(1000));
        broker.push_prices("TSLA", &[10.0]);
        let funds = Arc::new(MockFundData::new());
        funds.set_trades(
            "ARKK",
            json!({"trades": [
                {"date": "2024-05-02", "ticker": "TSLA", "direction": "Buy", "etf_percent": 0.5},
                {"date": "2024-05-02", "ticker": " ", "direction": "Buy", "etf_percent": 0.5},
                {"date": "2024-05-02", "direction": "Buy", "etf_percent": 0.5}
            ]}),
        );

        let report = strategy(&broker, &funds).run(&config(10.0, 0.0)).await.unwrap();

        assert_eq!(report.actions.len(), 1);
        // whole 100 budget goes to TSLA at 10
        assert_eq!(broker.orders()[0].qty, dec!(10));
    }

    #[tokio::test]
    async fn zero_weights_split_equally() {
        let broker = Arc::new(MockBroker::new());
        broker.set_cash(dec!(1000));
        broker.push_prices("AAA", &[10.0]);
        broker.push_prices("BBB", &[10.0]);
        let funds = Arc::new(MockFundData::new());
        funds.set_trades(
            "ARKK",
            json!({"trades": [
                {"date": "2024-05-02", "ticker": "AAA", "direction": "Buy"},
                {"date": "2024-05-02", "ticker": "BBB", "direction": "Buy", "etf_percent": 0.0}
            ]}),
        );

        strategy(&broker, &funds).run(&config(100.0, 0.0)).await.unwrap();

        let qtys: Vec<Decimal> = broker.orders().iter().map(|o| o.qty).collect();
        assert_eq!(qtys, vec![dec!(50), dec!(50)]);
    }

    #[tokio::test]
    async fn invalid_budget_rejected() {
        let broker = Arc::new(MockBroker::new());
        let funds = Arc::new(MockFundData::new());
        let err = strategy(&broker, &funds).run(&config(150.0, 0.0)).await.unwrap_err();
        assert!(matches!(err, StrategyError::InvalidConfig(_)));
        assert!(funds.calls().is_empty());
    }
}
