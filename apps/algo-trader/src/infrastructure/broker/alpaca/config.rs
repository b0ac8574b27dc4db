//! Alpaca adapter configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Environment for Alpaca API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlpacaEnvironment {
    /// Paper trading (simulated).
    #[default]
    Paper,
    /// Live trading (real money).
    Live,
}

impl AlpacaEnvironment {
    /// Get the base URL for the trading API.
    #[must_use]
    pub const fn trading_base_url(&self) -> &'static str {
        match self {
            Self::Paper => "https://paper-api.alpaca.markets",
            Self::Live => "https://api.alpaca.markets",
        }
    }

    /// Get the base URL for the market data API.
    #[must_use]
    pub const fn data_base_url(&self) -> &'static str {
        "https://data.alpaca.markets"
    }

    /// Stock data feed available to accounts in this environment.
    #[must_use]
    pub const fn stock_feed(&self) -> &'static str {
        match self {
            Self::Paper => "iex",
            Self::Live => "sip",
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl std::fmt::Display for AlpacaEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "PAPER"),
            Self::Live => write!(f, "LIVE"),
        }
    }
}

impl FromStr for AlpacaEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paper" => Ok(Self::Paper),
            "live" => Ok(Self::Live),
            other => Err(format!("unknown trading environment '{other}' (expected paper or live)")),
        }
    }
}

impl<'de> Deserialize<'de> for AlpacaEnvironment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Configuration for the Alpaca adapter.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// API key.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
    /// Trading environment.
    pub environment: AlpacaEnvironment,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy configuration.
    pub retry: RetryConfig,
    /// Trading API base URL override.
    pub trading_url: Option<String>,
    /// Data API base URL override.
    pub data_url: Option<String>,
}

impl AlpacaConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(api_key: String, api_secret: String, environment: AlpacaEnvironment) -> Self {
        Self {
            api_key,
            api_secret,
            environment,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            trading_url: None,
            data_url: None,
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Point the adapter at other hosts (mock servers, proxies).
    #[must_use]
    pub fn with_base_urls(mut self, trading_url: Option<String>, data_url: Option<String>) -> Self {
        self.trading_url = trading_url;
        self.data_url = data_url;
        self
    }

    /// Get the trading API base URL.
    #[must_use]
    pub fn trading_base_url(&self) -> &str {
        self.trading_url
            .as_deref()
            .unwrap_or_else(|| self.environment.trading_base_url())
    }

    /// Get the data API base URL.
    #[must_use]
    pub fn data_base_url(&self) -> &str {
        self.data_url
            .as_deref()
            .unwrap_or_else(|| self.environment.data_base_url())
    }
}

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl RetryConfig {
    /// Default backoff with a custom attempt budget.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper_config() -> AlpacaConfig {
        AlpacaConfig::new(
            "key".to_string(),
            "secret".to_string(),
            AlpacaEnvironment::Paper,
        )
    }

    #[test]
    fn paper_environment_urls() {
        let env = AlpacaEnvironment::Paper;
        assert!(env.trading_base_url().contains("paper"));
        assert_eq!(env.stock_feed(), "iex");
        assert!(!env.is_live());
    }

    #[test]
    fn live_environment_urls() {
        let env = AlpacaEnvironment::Live;
        assert!(!env.trading_base_url().contains("paper"));
        assert_eq!(env.stock_feed(), "sip");
        assert!(env.is_live());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("PAPER".parse::<AlpacaEnvironment>(), Ok(AlpacaEnvironment::Paper));
        assert_eq!(" live ".parse::<AlpacaEnvironment>(), Ok(AlpacaEnvironment::Live));
        assert!("sandbox".parse::<AlpacaEnvironment>().is_err());
    }

    #[test]
    fn environment_display() {
        assert_eq!(format!("{}", AlpacaEnvironment::Paper), "PAPER");
        assert_eq!(format!("{}", AlpacaEnvironment::Live), "LIVE");
    }

    #[test]
    fn config_defaults_to_environment_urls() {
        let config = paper_config();
        assert!(config.trading_base_url().contains("paper"));
        assert!(config.data_base_url().contains("data.alpaca"));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn config_base_url_overrides() {
        let config = paper_config().with_base_urls(
            Some("http://127.0.0.1:9000".to_string()),
            Some("http://127.0.0.1:9001".to_string()),
        );
        assert_eq!(config.trading_base_url(), "http://127.0.0.1:9000");
        assert_eq!(config.data_base_url(), "http://127.0.0.1:9001");
    }

    #[test]
    fn retry_config_default() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.initial_backoff, Duration::from_millis(100));
        assert_eq!(retry.max_backoff, Duration::from_secs(10));
        assert_eq!(retry.multiplier, 2.0);
    }

    #[test]
    fn retry_config_custom_attempts() {
        let retry = RetryConfig::with_max_attempts(1);
        assert_eq!(retry.max_attempts, 1);
        assert_eq!(retry.multiplier, 2.0);
    }
}
