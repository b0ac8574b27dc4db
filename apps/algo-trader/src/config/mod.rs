//! Runtime settings.
//!
//! Assembled with the `config` crate from built-in defaults, then `TRADER_*`
//! environment variables, then the `API_KEY` / `API_SECRET` credentials.
//! A `.env` file is loaded into the process environment by `main` before
//! this runs.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::infrastructure::broker::{AlpacaConfig, AlpacaEnvironment, RetryConfig};

/// Prefix of tunable environment variables.
pub const ENV_PREFIX: &str = "TRADER";

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "API_KEY";

/// Environment variable holding the API secret.
pub const API_SECRET_VAR: &str = "API_SECRET";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be merged or deserialized.
    #[error("Failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    /// Brokerage credentials absent.
    #[error("Missing required environment variable(s): {missing}")]
    MissingCredentials {
        /// Comma-separated variable names.
        missing: String,
    },

    /// A value is out of range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Brokerage API credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API key ID.
    pub api_key: String,
    /// API secret.
    pub api_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"***")
            .finish()
    }
}

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Paper or live trading.
    pub environment: AlpacaEnvironment,
    /// Trading API base URL override.
    #[serde(default)]
    pub trading_url: Option<String>,
    /// Market data API base URL override.
    #[serde(default)]
    pub data_url: Option<String>,
    /// Fund-disclosure API base URL override.
    #[serde(default)]
    pub ark_url: Option<String>,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// HTTP attempts per request, including the first.
    pub max_attempts: u32,
    /// Strategy polling interval in seconds.
    pub poll_interval_secs: u64,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    api_secret: Option<String>,
}

impl Settings {
    /// Build from the process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&utf8_vars(std::env::vars_os()))
    }

    /// Build from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let settings: Self = ::config::Config::builder()
            .set_default("environment", "paper")?
            .set_default("timeout_secs", 30)?
            .set_default("max_attempts", 3)?
            .set_default("poll_interval_secs", 60)?
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("api_key", non_blank(vars.get(API_KEY_VAR)))?
            .set_override_option("api_secret", non_blank(vars.get(API_SECRET_VAR)))?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(environment = %settings.environment, "Loaded settings");
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "TRADER_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "TRADER_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Brokerage credentials, or an error naming every missing variable.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        match (&self.api_key, &self.api_secret) {
            (Some(api_key), Some(api_secret)) => Ok(Credentials {
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
            }),
            (key, secret) => {
                let missing: Vec<&str> = [
                    key.is_none().then_some(API_KEY_VAR),
                    secret.is_none().then_some(API_SECRET_VAR),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(ConfigError::MissingCredentials {
                    missing: missing.join(", "),
                })
            }
        }
    }

    /// HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Strategy polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Alpaca adapter configuration for these settings.
    #[must_use]
    pub fn alpaca_config(&self, credentials: &Credentials) -> AlpacaConfig {
        AlpacaConfig::new(
            credentials.api_key.clone(),
            credentials.api_secret.clone(),
            self.environment,
        )
        .with_timeout(self.timeout())
        .with_retry(RetryConfig::with_max_attempts(self.max_attempts))
        .with_base_urls(self.trading_url.clone(), self.data_url.clone())
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn utf8_vars<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_variables() {
        let settings = Settings::from_vars(&HashMap::new()).unwrap();

        assert_eq!(settings.environment, AlpacaEnvironment::Paper);
        assert_eq!(settings.timeout(), Duration::from_secs(30));
        assert_eq!(settings.max_attempts, 3);
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
        assert!(settings.trading_url.is_none());
        assert!(settings.ark_url.is_none());
    }

    #[test]
    fn prefixed_variables_override_defaults() {
        let settings = Settings::from_vars(&vars(&[
            ("TRADER_ENVIRONMENT", "LIVE"),
            ("TRADER_TIMEOUT_SECS", "5"),
            ("TRADER_MAX_ATTEMPTS", "1"),
            ("TRADER_POLL_INTERVAL_SECS", "2"),
            ("TRADER_ARK_URL", "http://localhost:9000"),
        ]))
        .unwrap();

        assert_eq!(settings.environment, AlpacaEnvironment::Live);
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.max_attempts, 1);
        assert_eq!(settings.poll_interval_secs, 2);
        assert_eq!(settings.ark_url.as_deref(), Some("http://localhost:9000"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let raw = vec![
            (OsString::from("API_KEY"), OsString::from("key")),
            (OsString::from("GARBLED"), OsString::from_vec(vec![0x66, 0xff, 0x6f])),
            (OsString::from_vec(vec![0xfe, 0x41]), OsString::from("value")),
        ];

        let vars = utf8_vars(raw);

        assert_eq!(vars.len(), 1);
        assert_eq!(vars["API_KEY"], "key");
    }

    #[test]
    fn unknown_environment_rejected() {
        let err = Settings::from_vars(&vars(&[("TRADER_ENVIRONMENT", "sandbox")])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        let err = Settings::from_vars(&vars(&[("TRADER_MAX_ATTEMPTS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn credentials_present() {
        let settings =
            Settings::from_vars(&vars(&[("API_KEY", "key"), ("API_SECRET", "secret")])).unwrap();
        let credentials = settings.credentials().unwrap();

        assert_eq!(credentials.api_key, "key");
        assert_eq!(credentials.api_secret, "secret");
        assert!(!format!("{credentials:?}").contains("secret\""));
    }

    #[test]
    fn missing_credentials_named() {
        let settings = Settings::from_vars(&HashMap::new()).unwrap();
        let err = settings.credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable(s): API_KEY, API_SECRET"
        );
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let settings =
            Settings::from_vars(&vars(&[("API_KEY", "key"), ("API_SECRET", "  ")])).unwrap();
        let err = settings.credentials().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required environment variable(s): API_SECRET"
        );
    }

    #[test]
    fn alpaca_config_carries_overrides() {
        let settings = Settings::from_vars(&vars(&[
            ("TRADER_TRADING_URL", "http://127.0.0.1:1"),
            ("TRADER_MAX_ATTEMPTS", "2"),
        ]))
        .unwrap();
        let config = settings.alpaca_config(&Credentials {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
        });

        assert_eq!(config.trading_base_url(), "http://127.0.0.1:1");
        assert_eq!(config.data_base_url(), "https://data.alpaca.markets");
        assert_eq!(config.retry.max_attempts, 2);
    }
}
