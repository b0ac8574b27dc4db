//! Dependency Injection Container
//!
//! Wires adapters into the strategies the commands run.

use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{BrokerPort, FundDataPort, MarketDataPort};
use crate::application::strategies::{
    BaseStrategy, CopyCatStrategy, MeanReversionStrategy, SimpleStrategy,
};
use crate::config::Settings;
use crate::error::CommandError;

use super::broker::AlpacaBrokerAdapter;
use super::fund_data::{ArkClient, ArkError};

/// Container wired to Alpaca and the ARK API.
pub type AlpacaContainer = Container<AlpacaBrokerAdapter, AlpacaBrokerAdapter, ArkClient>;

/// Dependency injection container.
pub struct Container<B, M, F>
where
    B: BrokerPort + 'static,
    M: MarketDataPort + 'static,
    F: FundDataPort + 'static,
{
    broker: Arc<B>,
    market_data: Arc<M>,
    funds: Arc<F>,
    poll_interval: Duration,
}

impl<B, M, F> Container<B, M, F>
where
    B: BrokerPort + 'static,
    M: MarketDataPort + 'static,
    F: FundDataPort + 'static,
{
    /// Create a new container with all dependencies.
    pub const fn new(
        broker: Arc<B>,
        market_data: Arc<M>,
        funds: Arc<F>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            broker,
            market_data,
            funds,
            poll_interval,
        }
    }

    /// Get the fund data port.
    pub fn funds(&self) -> Arc<F> {
        Arc::clone(&self.funds)
    }

    /// Create a `BaseStrategy`.
    pub fn base(&self) -> BaseStrategy<B, M> {
        BaseStrategy::new(Arc::clone(&self.broker), Arc::clone(&self.market_data))
    }

    /// Create a `SimpleStrategy`.
    pub fn simple_strategy(&self) -> SimpleStrategy<B, M> {
        SimpleStrategy::new(self.base(), self.poll_interval)
    }

    /// Create a `CopyCatStrategy`.
    pub fn copycat_strategy(&self) -> CopyCatStrategy<B, M, F> {
        CopyCatStrategy::new(self.base(), Arc::clone(&self.funds))
    }

    /// Create a `MeanReversionStrategy`.
    pub fn mean_reversion_strategy(&self) -> MeanReversionStrategy<B, M> {
        MeanReversionStrategy::new(self.base())
    }
}

impl AlpacaContainer {
    /// Wire the production adapters. Fails without brokerage credentials.
    pub fn from_settings(settings: &Settings) -> Result<Self, CommandError> {
        let credentials = settings.credentials()?;
        let alpaca = Arc::new(AlpacaBrokerAdapter::new(
            settings.alpaca_config(&credentials),
        )?);
        if alpaca.is_live() {
            tracing::warn!("Trading environment is LIVE");
        }
        let funds = Arc::new(ark_client(settings)?);

        Ok(Self::new(
            Arc::clone(&alpaca),
            alpaca,
            funds,
            settings.poll_interval(),
        ))
    }
}

/// ARK client for these settings. Needs no credentials.
pub fn ark_client(settings: &Settings) -> Result<ArkClient, ArkError> {
    ArkClient::new(settings.ark_url.as_deref(), settings.timeout())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::ConfigError;
    use crate::infrastructure::mock::{MockBroker, MockFundData};

    #[tokio::test]
    async fn strategies_share_ports() {
        let broker = Arc::new(MockBroker::new());
        broker.set_crypto_price("ETH", 10.0);
        let container = Container::new(
            Arc::clone(&broker),
            Arc::clone(&broker),
            Arc::new(MockFundData::new()),
            Duration::ZERO,
        );

        let price = container.base().current_crypto_price("ETH").await.unwrap();
        assert!((price - 10.0).abs() < f64::EPSILON);
        assert_eq!(Arc::strong_count(&broker), 3);
    }

    #[test]
    fn production_container_requires_credentials() {
        let settings = Settings::from_vars(&HashMap::new()).unwrap();
        let result = AlpacaContainer::from_settings(&settings);
        assert!(matches!(
            result,
            Err(CommandError::Config(ConfigError::MissingCredentials { .. }))
        ));
    }

    #[test]
    fn ark_client_honours_override() {
        let mut vars = HashMap::new();
        vars.insert("TRADER_ARK_URL".to_string(), "http://127.0.0.1:9".to_string());
        let settings = Settings::from_vars(&vars).unwrap();

        assert_eq!(ark_client(&settings).unwrap().base_url(), "http://127.0.0.1:9");
    }
}
