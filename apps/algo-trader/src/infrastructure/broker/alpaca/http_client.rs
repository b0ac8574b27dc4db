//! Authenticated REST transport for the trading and market data hosts.
//!
//! Each request is attempted up to `RetryConfig::max_attempts` times.
//! Transport failures, 408, 429 and 5xx responses are retried with
//! exponential backoff; a `Retry-After` header on 429 overrides the delay.

use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::AlpacaErrorResponse;
use super::config::{AlpacaConfig, RetryConfig};
use super::error::AlpacaError;

/// Query string parameters.
pub type Query<'a> = [(&'a str, String)];

/// Which Alpaca host a request goes to.
#[derive(Debug, Clone, Copy)]
enum Host {
    Trading,
    Data,
}

/// HTTP client shared by the broker and market data adapters.
#[derive(Debug, Clone)]
pub struct AlpacaHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    trading_base_url: String,
    data_base_url: String,
    retry: RetryConfig,
}

impl AlpacaHttpClient {
    /// Build the client. Empty credentials fail fast.
    pub fn new(config: &AlpacaConfig) -> Result<Self, AlpacaError> {
        if config.api_key.is_empty() || config.api_secret.is_empty() {
            return Err(AlpacaError::AuthenticationFailed);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AlpacaError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            trading_base_url: config.trading_base_url().trim_end_matches('/').to_string(),
            data_base_url: config.data_base_url().trim_end_matches('/').to_string(),
            retry: config.retry.clone(),
        })
    }

    /// GET from the trading host.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AlpacaError> {
        self.send(Method::GET, Host::Trading, path, &[], None::<&()>)
            .await
    }

    /// POST a JSON body to the trading host.
    #[allow(clippy::future_not_send)]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AlpacaError> {
        self.send(Method::POST, Host::Trading, path, &[], Some(body))
            .await
    }

    /// GET from the market data host with query parameters.
    pub async fn data_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
    ) -> Result<T, AlpacaError> {
        self.send(Method::GET, Host::Data, path, query, None::<&()>)
            .await
    }

    fn url(&self, host: Host, path: &str) -> String {
        let base = match host {
            Host::Trading => &self.trading_base_url,
            Host::Data => &self.data_base_url,
        };
        format!("{base}{path}")
    }

    #[allow(clippy::future_not_send)]
    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        host: Host,
        path: &str,
        query: &Query<'_>,
        body: Option<&B>,
    ) -> Result<T, AlpacaError> {
        let url = self.url(host, path);
        let mut backoff = Backoff::new(&self.retry);

        loop {
            tracing::debug!(method = %method, path = %path, attempt = backoff.attempt + 1, "Alpaca request");

            let outcome = match self.attempt(&method, &url, query, body).await {
                Ok(response) => Self::read(response, path).await,
                Err(e) => Outcome::Retry {
                    error: AlpacaError::Network(e.to_string()),
                    retry_after: None,
                },
            };

            let (error, retry_after) = match outcome {
                Outcome::Done(result) => return result,
                Outcome::Retry { error, retry_after } => (error, retry_after),
            };

            let Some(delay) = backoff.next_delay() else {
                return Err(exhausted(error, backoff.attempt));
            };
            let delay = retry_after.unwrap_or(delay);
            tracing::warn!(
                path = %path,
                error = %error,
                delay_ms = delay.as_millis(),
                attempt = backoff.attempt,
                "Retrying Alpaca request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    #[allow(clippy::future_not_send)]
    async fn attempt<B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        query: &Query<'_>,
        body: Option<&B>,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.api_secret);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    async fn read<T: DeserializeOwned>(response: Response, path: &str) -> Outcome<T> {
        let status = response.status();

        if status.is_success() {
            let result = match response.text().await {
                // Some endpoints answer with an empty body.
                Ok(text) if text.is_empty() => serde_json::from_str("null")
                    .map_err(|e| AlpacaError::JsonParse(e.to_string())),
                Ok(text) => {
                    serde_json::from_str(&text).map_err(|e| AlpacaError::JsonParse(e.to_string()))
                }
                Err(e) => Err(AlpacaError::Network(e.to_string())),
            };
            return Outcome::Done(result);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<AlpacaErrorResponse>(&text) {
            Ok(body) => (
                body.code
                    .map_or_else(|| status.as_u16().to_string(), |c| c.to_string()),
                body.message,
            ),
            Err(_) => (status.as_u16().to_string(), text),
        };

        match classify(status) {
            Disposition::Throttled => Outcome::Retry {
                error: AlpacaError::RateLimited {
                    retry_after_secs: retry_after.unwrap_or(60),
                },
                retry_after: retry_after.map(Duration::from_secs),
            },
            Disposition::Transient => Outcome::Retry {
                error: AlpacaError::Api { code, message },
                retry_after: None,
            },
            Disposition::Fatal => Outcome::Done(Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    AlpacaError::AuthenticationFailed
                }
                StatusCode::NOT_FOUND => AlpacaError::NotFound {
                    path: path.to_string(),
                },
                StatusCode::UNPROCESSABLE_ENTITY => AlpacaError::OrderRejected(message),
                _ => AlpacaError::Api { code, message },
            })),
        }
    }
}

/// Result of a single attempt.
enum Outcome<T> {
    Done(Result<T, AlpacaError>),
    Retry {
        error: AlpacaError,
        retry_after: Option<Duration>,
    },
}

/// How a failed status is handled.
#[derive(Debug, PartialEq, Eq)]
enum Disposition {
    Throttled,
    Transient,
    Fatal,
}

const fn classify(status: StatusCode) -> Disposition {
    match status.as_u16() {
        429 => Disposition::Throttled,
        408 | 500..=599 => Disposition::Transient,
        _ => Disposition::Fatal,
    }
}

/// Error reported once no attempts remain.
fn exhausted(last: AlpacaError, attempts: u32) -> AlpacaError {
    match last {
        AlpacaError::RateLimited { .. } => last,
        _ if attempts <= 1 => last,
        _ => AlpacaError::MaxRetriesExceeded { attempts },
    }
}

/// Delay schedule between attempts.
struct Backoff {
    attempt: u32,
    max_attempts: u32,
    next: Duration,
    cap: Duration,
    multiplier: f64,
}

impl Backoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            next: config.initial_backoff,
            cap: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    /// Record a failed attempt; `None` once the budget is spent.
    fn next_delay(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let delay = self.next;
        self.next = Duration::from_secs_f64(
            (self.next.as_secs_f64() * self.multiplier).min(self.cap.as_secs_f64()),
        );
        Some(delay)
    }
}
