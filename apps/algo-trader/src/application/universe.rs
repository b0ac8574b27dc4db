//! Default trading universe: every ticker currently held by an ARK fund.

use crate::application::ports::{FundDataError, FundDataPort, FundQuery};
use crate::domain::{ARK_FUNDS, HoldingsDocument};

/// Collect the current holdings of every ARK fund.
///
/// Funds are queried in [`ARK_FUNDS`] order; tickers keep the order they
/// are first seen in, without duplicates. Blank or missing tickers are
/// skipped.
pub async fn all_ark_holdings<F>(funds: &F) -> Result<Vec<String>, FundDataError>
where
    F: FundDataPort + ?Sized,
{
    let mut tickers: Vec<String> = Vec::new();

    for fund in ARK_FUNDS {
        let raw = funds.get_etf_holdings(&FundQuery::new(fund)).await?;
        let document =
            HoldingsDocument::from_value(&raw).map_err(|e| FundDataError::InvalidResponse {
                message: format!("{fund} holdings: {e}"),
            })?;

        let before = tickers.len();
        for ticker in document.tickers() {
            if !tickers.iter().any(|t| t == ticker) {
                tickers.push(ticker.to_string());
            }
        }
        tracing::debug!(fund = %fund, added = tickers.len() - before, "Collected fund holdings");
    }

    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::infrastructure::mock::{FundCall, MockFundData};

    #[tokio::test]
    async fn dedupes_in_first_seen_order() {
        let funds = MockFundData::new();
        funds.set_holdings(
            "ARKK",
            json!({"holdings": [{"ticker": "TSLA"}, {"ticker": "ROKU"}, {"ticker": null}]}),
        );
        funds.set_holdings(
            "ARKW",
            json!({"holdings": [{"ticker": "COIN"}, {"ticker": "TSLA"}, {"ticker": ""}]}),
        );
        funds.set_holdings("ARKX", json!({"holdings": [{"ticker": "KTOS"}]}));

        let tickers = all_ark_holdings(&funds).await.unwrap();

        assert_eq!(tickers, vec!["TSLA", "ROKU", "COIN", "KTOS"]);
    }

    #[tokio::test]
    async fn queries_every_fund_in_order() {
        let funds = MockFundData::new();
        all_ark_holdings(&funds).await.unwrap();

        let symbols: Vec<String> = funds
            .calls()
            .into_iter()
            .map(|call| match call {
                FundCall::Holdings(q) | FundCall::Trades(q) => q.symbol,
            })
            .collect();
        assert_eq!(symbols, ARK_FUNDS);
    }

    #[tokio::test]
    async fn malformed_document_is_invalid_response() {
        let funds = MockFundData::new();
        funds.set_holdings("ARKQ", json!({"holdings": "oops"}));

        let err = all_ark_holdings(&funds).await.unwrap_err();
        assert!(matches!(err, FundDataError::InvalidResponse { .. }));
    }
}
