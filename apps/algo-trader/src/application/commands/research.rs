//! Read-only ARK fund research.

use std::io::Write;

use crate::application::ports::{DEFAULT_FUND_LIMIT, FundDataPort, FundQuery};
use crate::error::CommandError;

use super::write_pretty_json;

/// Which disclosure to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArkMode {
    /// Current or historical holdings.
    Holdings,
    /// Buy and sell disclosures.
    Trades,
}

impl ArkMode {
    /// Parse a mode name; anything else is `None`.
    #[must_use]
    pub fn parse(mode: &str) -> Option<Self> {
        match mode {
            "holdings" => Some(Self::Holdings),
            "trades" => Some(Self::Trades),
            _ => None,
        }
    }
}

/// Arguments of the `ark` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArkArgs {
    /// Fund ticker.
    pub symbol: String,
    /// `holdings` or `trades`.
    pub mode: String,
    /// Earliest date.
    pub start_date: Option<String>,
    /// Latest date.
    pub end_date: Option<String>,
    /// Row limit.
    pub limit: u32,
}

impl ArkArgs {
    /// Arguments with no dates and the default limit.
    #[must_use]
    pub fn new(symbol: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            mode: mode.into(),
            start_date: None,
            end_date: None,
            limit: DEFAULT_FUND_LIMIT,
        }
    }
}

/// Print a fund's holdings or trades as indented JSON.
///
/// An unknown mode prints `Invalid mode` and queries nothing.
pub async fn ark<F, W>(funds: &F, args: &ArkArgs, out: &mut W) -> Result<(), CommandError>
where
    F: FundDataPort + ?Sized,
    W: Write + ?Sized,
{
    let Some(mode) = ArkMode::parse(&args.mode) else {
        tracing::debug!(mode = %args.mode, "Unknown ark mode");
        writeln!(out, "Invalid mode")?;
        return Ok(());
    };

    let query = FundQuery::new(&args.symbol)
        .with_dates(args.start_date.clone(), args.end_date.clone())
        .with_limit(args.limit);

    let document = match mode {
        ArkMode::Holdings => funds.get_etf_holdings(&query).await?,
        ArkMode::Trades => funds.get_etf_trades(&query).await?,
    };
    write_pretty_json(out, &document)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;
    use crate::infrastructure::mock::{FundCall, MockFundData};

    #[test_case("holdings" => Some(ArkMode::Holdings))]
    #[test_case("trades" => Some(ArkMode::Trades))]
    #[test_case("Holdings" => None ; "case sensitive")]
    #[test_case("news" => None)]
    fn mode_parse(mode: &str) -> Option<ArkMode> {
        ArkMode::parse(mode)
    }

    #[tokio::test]
    async fn holdings_printed_with_four_space_indent() {
        let funds = MockFundData::new();
        funds.set_holdings("ARKK", json!({"symbol": "ARKK"}));

        let mut out = Vec::new();
        ark(&funds, &ArkArgs::new("ARKK", "holdings"), &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "{\n    \"symbol\": \"ARKK\"\n}\n");
    }

    #[tokio::test]
    async fn modes_hit_distinct_queries() {
        let funds = MockFundData::new();
        let mut args = ArkArgs::new("ARKW", "trades");
        args.start_date = Some("2024-01-01".to_string());
        args.limit = 5;

        let mut out = Vec::new();
        ark(&funds, &args, &mut out).await.unwrap();
        ark(&funds, &ArkArgs::new("ARKW", "holdings"), &mut out).await.unwrap();

        let calls = funds.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            &calls[0],
            FundCall::Trades(q) if q.limit == 5 && q.start_date.as_deref() == Some("2024-01-01")
        ));
        assert!(matches!(&calls[1], FundCall::Holdings(_)));
    }

    #[tokio::test]
    async fn invalid_mode_prints_message_without_querying() {
        let funds = MockFundData::new();

        let mut out = Vec::new();
        ark(&funds, &ArkArgs::new("ARKK", "bogus"), &mut out).await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Invalid mode\n");
        assert!(funds.calls().is_empty());
    }
}
