//! Client for the public ARK Invest disclosure API (arkfunds.io).
//!
//! No credentials are required. Responses are returned as raw JSON so the
//! research command can print them unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::application::ports::{FundDataError, FundDataPort, FundQuery};

/// Default API base URL.
pub const ARK_BASE_URL: &str = "https://arkfunds.io/api/v2";

/// Errors from the ARK client.
#[derive(Debug, Error, Clone)]
pub enum ArkError {
    /// Transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Body was not JSON.
    #[error("JSON parsing error: {0}")]
    JsonParse(String),
}

impl From<ArkError> for FundDataError {
    fn from(err: ArkError) -> Self {
        match err {
            ArkError::Network(message) => Self::ConnectionError { message },
            ArkError::Status { status, body } => Self::ApiError {
                status,
                message: body,
            },
            ArkError::JsonParse(message) => Self::InvalidResponse { message },
        }
    }
}

/// HTTP client for the ARK disclosure API.
#[derive(Debug, Clone)]
pub struct ArkClient {
    client: Client,
    base_url: String,
}

impl ArkClient {
    /// Create a client against `base_url` (defaults to [`ARK_BASE_URL`]).
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self, ArkError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ArkError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(ARK_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Base URL in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn params(query: &FundQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("symbol", query.symbol.clone())];
        if let Some(start) = &query.start_date {
            params.push(("date_from", start.clone()));
        }
        if let Some(end) = &query.end_date {
            params.push(("date_to", end.clone()));
        }
        params.push(("limit", query.limit.to_string()));
        params
    }

    async fn fetch(&self, path: &str, query: &FundQuery) -> Result<Value, ArkError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(path = %path, symbol = %query.symbol, "ARK request");

        let response = self
            .client
            .get(&url)
            .query(&Self::params(query))
            .send()
            .await
            .map_err(|e| ArkError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ArkError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), path = %path, "ARK request failed");
            return Err(ArkError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ArkError::JsonParse(e.to_string()))
    }
}

#[async_trait]
impl FundDataPort for ArkClient {
    async fn get_etf_holdings(&self, query: &FundQuery) -> Result<Value, FundDataError> {
        Ok(self.fetch("/etf/holdings", query).await?)
    }

    async fn get_etf_trades(&self, query: &FundQuery) -> Result<Value, FundDataError> {
        Ok(self.fetch("/etf/trades", query).await?)
    }
}
