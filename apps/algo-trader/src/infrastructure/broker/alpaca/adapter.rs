//! Alpaca adapter implementing `BrokerPort` and `MarketDataPort`.

use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{
    Account, BarQuery, BrokerError, BrokerPort, MarketDataError, MarketDataPort, OrderAck,
    OrderRequest, Position,
};
use crate::domain::Bar;
use crate::domain::bar::format_instant;

use super::api_types::{
    AlpacaAccountResponse, AlpacaBarsResponse, AlpacaLatestTradesResponse, AlpacaOrderRequest,
    AlpacaOrderResponse, AlpacaPositionResponse,
};
use super::config::{AlpacaConfig, AlpacaEnvironment};
use super::error::AlpacaError;
use super::http_client::AlpacaHttpClient;

/// Alpaca Markets adapter.
///
/// One client serves both the trading API (account, positions, orders)
/// and the market data API (bars, crypto trades).
#[derive(Debug, Clone)]
pub struct AlpacaBrokerAdapter {
    client: AlpacaHttpClient,
    environment: AlpacaEnvironment,
}

impl AlpacaBrokerAdapter {
    /// Create a new Alpaca adapter.
    pub fn new(config: AlpacaConfig) -> Result<Self, AlpacaError> {
        let client = AlpacaHttpClient::new(&config)?;
        Ok(Self {
            client,
            environment: config.environment,
        })
    }

    /// Check if we're in live trading mode.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.environment.is_live()
    }

    fn bar_params(&self, query: &BarQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("timeframe", query.timeframe.alpaca_code().to_string()),
            ("feed", self.environment.stock_feed().to_string()),
        ];
        if let Some(start) = &query.start {
            params.push(("start", format_instant(start)));
        }
        if let Some(end) = &query.end {
            params.push(("end", format_instant(end)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if query.newest_first {
            params.push(("sort", "desc".to_string()));
        }
        params
    }
}

#[async_trait]
impl BrokerPort for AlpacaBrokerAdapter {
    async fn get_account(&self) -> Result<Account, BrokerError> {
        let account: AlpacaAccountResponse = self.client.get("/v2/account").await?;
        account
            .to_account()
            .map_err(|message| BrokerError::Unknown { message })
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<Position>, BrokerError> {
        let result: Result<AlpacaPositionResponse, AlpacaError> =
            self.client.get(&format!("/v2/positions/{symbol}")).await;

        match result {
            Ok(position) => position
                .to_position()
                .map(Some)
                .map_err(|message| BrokerError::Unknown { message }),
            Err(AlpacaError::NotFound { .. }) => Ok(None),
            Err(e) => Err(BrokerError::from(e)),
        }
    }

    async fn get_positions_raw(&self) -> Result<Value, BrokerError> {
        Ok(self.client.get("/v2/positions").await?)
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<OrderAck, BrokerError> {
        if self.is_live() {
            tracing::warn!(
                client_order_id = %request.client_order_id,
                symbol = %request.symbol,
                "Submitting LIVE order - this will execute real trades"
            );
        }

        let alpaca_request = AlpacaOrderRequest::from(&request);

        tracing::info!(
            client_order_id = %request.client_order_id,
            symbol = %request.symbol,
            side = %alpaca_request.side,
            qty = %alpaca_request.qty,
            "Submitting order to Alpaca"
        );

        let response: AlpacaOrderResponse = self.client.post("/v2/orders", &alpaca_request).await?;

        tracing::info!(
            client_order_id = %request.client_order_id,
            broker_order_id = %response.id,
            status = %response.status,
            "Order submitted successfully"
        );

        Ok(response.into())
    }
}

#[async_trait]
impl MarketDataPort for AlpacaBrokerAdapter {
    async fn get_bars(&self, symbol: &str, query: &BarQuery) -> Result<Vec<Bar>, MarketDataError> {
        let path = format!("/v2/stocks/{symbol}/bars");
        let mut bars: Vec<Bar> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = self.bar_params(query);
            if let Some(limit) = query.limit {
                let remaining = (limit as usize).saturating_sub(bars.len());
                if let Some(entry) = params.iter_mut().find(|entry| entry.0 == "limit") {
                    entry.1 = remaining.to_string();
                }
            }
            if let Some(token) = page_token.take() {
                params.push(("page_token", token));
            }

            let response: AlpacaBarsResponse = self.client.data_get(&path, &params).await?;
            bars.extend(response.bars.unwrap_or_default().into_iter().map(Bar::from));

            let limit_reached = query.limit.is_some_and(|limit| bars.len() >= limit as usize);
            match response.next_page_token {
                Some(token) if !limit_reached && !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        if query.newest_first {
            bars.reverse();
        }

        tracing::debug!(symbol = %symbol, count = bars.len(), "Fetched bars");
        Ok(bars)
    }

    async fn get_latest_crypto_price(&self, symbol: &str) -> Result<f64, MarketDataError> {
        let pair = format!("{}/USD", symbol.to_uppercase());
        let response: AlpacaLatestTradesResponse = self
            .client
            .data_get(
                "/v1beta3/crypto/us/latest/trades",
                &[("symbols", pair.clone())],
            )
            .await?;

        response
            .trades
            .get(&pair)
            .map(|trade| trade.p)
            .ok_or_else(|| MarketDataError::NoData { symbol: pair })
    }
}
