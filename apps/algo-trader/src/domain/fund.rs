//! ARK fund disclosure records.
//!
//! The disclosure API is printed verbatim by the research command, so the
//! raw JSON document is the primary representation. These typed views are
//! parsed from it for the strategies that consume holdings and trades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ARK funds whose holdings make up the default trading universe, in query order.
pub const ARK_FUNDS: [&str; 6] = ["ARKK", "ARKQ", "ARKW", "ARKG", "ARKF", "ARKX"];

/// Holdings response document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoldingsDocument {
    /// Holdings rows.
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

/// Single disclosed position of a fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Fund ticker.
    #[serde(default)]
    pub fund: Option<String>,
    /// Disclosure date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Held security ticker. Missing for cash and some foreign listings.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Company name.
    #[serde(default)]
    pub company: Option<String>,
    /// Shares held.
    #[serde(default)]
    pub shares: Option<f64>,
    /// Portfolio weight in percent.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl HoldingsDocument {
    /// Parse a raw holdings document.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Non-blank tickers in document order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.holdings
            .iter()
            .filter_map(|h| h.ticker.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Trade direction reported by the fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    /// Fund added shares.
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    /// Fund removed shares.
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

/// Trades response document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradesDocument {
    /// Trade rows.
    #[serde(default)]
    pub trades: Vec<FundTrade>,
}

/// Single disclosed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundTrade {
    /// Fund ticker.
    #[serde(default)]
    pub fund: Option<String>,
    /// Trade date.
    pub date: NaiveDate,
    /// Traded security ticker.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Buy or sell.
    pub direction: TradeDirection,
    /// Shares traded.
    #[serde(default)]
    pub shares: Option<f64>,
    /// Size of the trade as a percentage of the ETF.
    #[serde(default)]
    pub etf_percent: Option<f64>,
}

impl TradesDocument {
    /// Parse a raw trades document.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Trades from the most recent trade date present, in document order.
    #[must_use]
    pub fn latest_day(&self) -> Vec<&FundTrade> {
        let Some(latest) = self.trades.iter().map(|t| t.date).max() else {
            return Vec::new();
        };
        self.trades.iter().filter(|t| t.date == latest).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn holdings_tickers_skip_blank_and_missing() {
        let doc = HoldingsDocument::from_value(&json!({
            "symbol": "ARKK",
            "holdings": [
                {"fund": "ARKK", "date": "2024-05-01", "ticker": "TSLA", "company": "TESLA INC", "shares": 10.0, "weight": 9.5},
                {"fund": "ARKK", "date": "2024-05-01", "ticker": null, "company": "CASH"},
                {"fund": "ARKK", "date": "2024-05-01", "ticker": "  ", "company": "BLANK"},
                {"fund": "ARKK", "date": "2024-05-01", "ticker": "ROKU"}
            ]
        }))
        .unwrap();

        let tickers: Vec<_> = doc.tickers().collect();
        assert_eq!(tickers, vec!["TSLA", "ROKU"]);
    }

    #[test]
    fn holdings_document_without_rows_is_empty() {
        let doc = HoldingsDocument::from_value(&json!({"symbol": "ARKX"})).unwrap();
        assert_eq!(doc.tickers().count(), 0);
    }

    #[test]
    fn trades_latest_day_filters_older_dates() {
        let doc = TradesDocument::from_value(&json!({
            "trades": [
                {"date": "2024-05-01", "ticker": "TSLA", "direction": "Buy", "etf_percent": 0.2},
                {"date": "2024-05-02", "ticker": "ROKU", "direction": "Sell", "etf_percent": 0.1},
                {"date": "2024-05-02", "ticker": "COIN", "direction": "Buy", "etf_percent": 0.3}
            ]
        }))
        .unwrap();

        let latest = doc.latest_day();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].ticker.as_deref(), Some("ROKU"));
        assert_eq!(latest[0].direction, TradeDirection::Sell);
        assert_eq!(latest[1].ticker.as_deref(), Some("COIN"));
    }

    #[test]
    fn trade_direction_accepts_lowercase() {
        let trade: FundTrade = serde_json::from_value(json!({
            "date": "2024-05-02",
            "ticker": "COIN",
            "direction": "sell"
        }))
        .unwrap();
        assert_eq!(trade.direction, TradeDirection::Sell);
    }

    #[test]
    fn empty_trades_have_no_latest_day() {
        assert!(TradesDocument::default().latest_day().is_empty());
    }
}
