//! Mean-reversion over a symbol universe.
//!
//! A symbol's "mean" is the average bar-to-bar close rate of change over the
//! last [`MEAN_LOOKBACK_BARS`] buckets of a timeframe. Today's move relative
//! to yesterday's close is compared against it: moves below the mean are
//! bought, moves above it are sold if held.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::application::ports::{BarQuery, BrokerPort, MarketDataError, MarketDataPort, OrderSide};
use crate::domain::Timeframe;
use crate::domain::stats::{mean_rate_of_change, rate_of_change};
use crate::infrastructure::persistence::{MeanCache, MeanMap};

use super::StrategyError;
use super::base::{BaseStrategy, whole_shares};

/// Buckets of history behind each mean.
pub const MEAN_LOOKBACK_BARS: u32 = 100;

/// Parameters of a mean-reversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionConfig {
    /// Universe, in processing order.
    pub symbols: Vec<String>,
    /// Read and extend the mean cache instead of recomputing everything.
    pub cache_means: bool,
    /// Bucket size of the mean.
    pub timeframe: Timeframe,
    /// Mean cache location.
    pub cache_path: PathBuf,
    /// Dry run: decide and report, place no orders.
    pub testing: bool,
    /// Total spend across buys; zero means the account's cash.
    pub budget: f64,
}

/// Per-symbol decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Moved below its mean.
    Buy,
    /// Moved above its mean while held.
    Sell,
    /// Nothing to do.
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "Buy"),
            Self::Sell => write!(f, "Sell"),
            Self::Hold => write!(f, "Hold"),
        }
    }
}

/// Classify today's change against the mean.
#[must_use]
pub fn classify(change: f64, mean: f64, held: bool) -> Signal {
    if change < mean {
        Signal::Buy
    } else if change > mean && held {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Decision for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Symbol.
    pub symbol: String,
    /// Signal.
    pub signal: Signal,
    /// Today's change against yesterday's close.
    pub change: f64,
    /// Historical mean rate of change.
    pub mean: f64,
    /// Shares to trade, when an order is warranted.
    pub qty: Option<Decimal>,
    /// Broker order ID, when an order was placed.
    pub order_id: Option<String>,
}

impl Decision {
    /// Render as printed by the `mean-reversion` command.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = format!(
            "{}: {} change={:.6} mean={:.6}",
            self.symbol, self.signal, self.change, self.mean
        );
        if let Some(qty) = self.qty {
            line.push_str(&format!(" qty={qty}"));
        }
        line
    }
}

/// Result of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionReport {
    /// Means used, including cached ones.
    pub means: MeanMap,
    /// Decisions in universe order. Symbols without data are absent.
    pub decisions: Vec<Decision>,
    /// Whether orders were suppressed.
    pub dry_run: bool,
}

struct Candidate {
    symbol: String,
    signal: Signal,
    change: f64,
    mean: f64,
    price: f64,
    held: Decimal,
}

/// Mean-reversion strategy.
pub struct MeanReversionStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    base: BaseStrategy<B, M>,
}

impl<B, M> MeanReversionStrategy<B, M>
where
    B: BrokerPort,
    M: MarketDataPort,
{
    /// Create a new mean-reversion strategy.
    pub const fn new(base: BaseStrategy<B, M>) -> Self {
        Self { base }
    }

    /// Mean rate of change of one symbol, `None` with fewer than two bars.
    pub async fn symbol_mean(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<f64>, MarketDataError> {
        self.symbol_mean_at(symbol, timeframe, Utc::now()).await
    }

    async fn symbol_mean_at(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Option<f64>, MarketDataError> {
        let start = (now - timeframe.span() * MEAN_LOOKBACK_BARS as i32).fixed_offset();
        let query = BarQuery::new(timeframe)
            .starting_at(start)
            .with_limit(MEAN_LOOKBACK_BARS);
        let bars = self.base.market_data().get_bars(symbol, &query).await?;
        let closes: Vec<f64> = bars.iter().map(|bar| bar.close).collect();
        Ok(mean_rate_of_change(&closes))
    }

    /// Means of several symbols.
    ///
    /// Symbols without enough history, or whose bars cannot be fetched,
    /// are left out.
    pub async fn means(&self, symbols: &[String], timeframe: Timeframe) -> MeanMap {
        let mut means = MeanMap::new();
        for symbol in symbols {
            match self.symbol_mean(symbol, timeframe).await {
                Ok(Some(mean)) => {
                    means.insert(symbol.clone(), mean);
                }
                Ok(None) => tracing::debug!(symbol = %symbol, "Not enough bars for a mean"),
                Err(e) => tracing::warn!(symbol = %symbol, error = %e, "Skipping mean"),
            }
        }
        means
    }

    async fn resolve_means(&self, config: &MeanReversionConfig) -> Result<MeanMap, StrategyError> {
        if !config.cache_means {
            return Ok(self.means(&config.symbols, config.timeframe).await);
        }

        let cache = MeanCache::new(&config.cache_path);
        let mut means = cache.load()?;
        let missing: Vec<String> = config
            .symbols
            .iter()
            .filter(|s| !means.contains_key(s.as_str()))
            .cloned()
            .collect();

        tracing::info!(
            cached = means.len(),
            missing = missing.len(),
            path = %cache.path().display(),
            "Using mean cache"
        );
        means.extend(self.means(&missing, config.timeframe).await);
        cache.store(&means)?;
        Ok(means)
    }

    async fn candidate(&self, symbol: &str, mean: f64) -> Result<Option<Candidate>, StrategyError> {
        let price = self.base.current_price(symbol).await?;
        let yesterday = self.base.yesterday_price(symbol).await?;
        let Some(change) = rate_of_change(yesterday, price) else {
            return Ok(None);
        };

        let held = if change > mean {
            self.base
                .broker()
                .get_position(symbol)
                .await?
                .map_or(Decimal::ZERO, |p| p.qty)
        } else {
            Decimal::ZERO
        };

        Ok(Some(Candidate {
            symbol: symbol.to_string(),
            signal: classify(change, mean, held > Decimal::ZERO),
            change,
            mean,
            price,
            held,
        }))
    }

    /// Decide for every symbol and, unless testing, place the orders.
    pub async fn run(
        &self,
        config: &MeanReversionConfig,
    ) -> Result<MeanReversionReport, StrategyError> {
        if !(config.budget.is_finite() && config.budget >= 0.0) {
            return Err(StrategyError::InvalidConfig(format!(
                "budget must be non-negative, got {}",
                config.budget
            )));
        }

        let means = self.resolve_means(config).await?;

        let mut candidates = Vec::new();
        for symbol in &config.symbols {
            let Some(&mean) = means.get(symbol) else {
                continue;
            };
            match self.candidate(symbol, mean).await {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => tracing::debug!(symbol = %symbol, "No previous close"),
                Err(StrategyError::MarketData(e)) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Skipping symbol");
                }
                Err(e) => return Err(e),
            }
        }

        let buys = candidates.iter().filter(|c| c.signal == Signal::Buy).count();
        let share = if buys == 0 {
            0.0
        } else {
            let total = if config.budget > 0.0 {
                config.budget
            } else {
                self.base.cash().await?
            };
            total / buys as f64
        };

        let mut decisions = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let (side, qty) = match candidate.signal {
                Signal::Buy => (Some(OrderSide::Buy), whole_shares(share, candidate.price)),
                Signal::Sell => (Some(OrderSide::Sell), candidate.held),
                Signal::Hold => (None, Decimal::ZERO),
            };

            let mut order_id = None;
            if let Some(side) = side.filter(|_| !qty.is_zero() && !config.testing) {
                let ack = self.base.market_order(&candidate.symbol, side, qty).await?;
                order_id = Some(ack.order_id);
            }

            decisions.push(Decision {
                symbol: candidate.symbol,
                signal: candidate.signal,
                change: candidate.change,
                mean: candidate.mean,
                qty: (!qty.is_zero()).then_some(qty),
                order_id,
            });
        }

        Ok(MeanReversionReport {
            means,
            decisions,
            dry_run: config.testing,
        })
    }
}
