//! Price lookups and account queries.

use std::io::Write;

use chrono::{DateTime, FixedOffset};

use crate::application::ports::{BarQuery, BrokerPort, MarketDataError, MarketDataPort};
use crate::application::strategies::{BaseStrategy, MeanReversionStrategy};
use crate::domain::{QueryWindow, Timeframe};
use crate::error::CommandError;

use super::write_pretty_json;

/// Crypto asset priced by the `test` command.
pub const TEST_CRYPTO_SYMBOL: &str = "ETH";

/// Print bars for the 100 days ending one hour before `now`.
///
/// The window end and start are printed first, in that order.
pub async fn historical<M, W>(
    market: &M,
    symbol: &str,
    timeframe: &str,
    limit: u32,
    now: DateTime<FixedOffset>,
    out: &mut W,
) -> Result<(), CommandError>
where
    M: MarketDataPort + ?Sized,
    W: Write + ?Sized,
{
    let timeframe = Timeframe::lookup(timeframe)?;
    let window = QueryWindow::historical(now);
    writeln!(out, "{}", window.end_str())?;
    writeln!(out, "{}", window.start_str())?;

    let query = BarQuery::new(timeframe).with_window(window).with_limit(limit);
    let bars = market.get_bars(symbol, &query).await?;
    for bar in &bars {
        writeln!(out, "{}", bar.display_line())?;
    }
    Ok(())
}

/// Print the close of the latest one-minute bar.
pub async fn current<B, M, W>(
    base: &BaseStrategy<B, M>,
    symbol: &str,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let price = base.current_price(symbol).await?;
    writeln!(out, "{price}")?;
    Ok(())
}

/// Print the previous session's close.
pub async fn yesterday<B, M, W>(
    base: &BaseStrategy<B, M>,
    symbol: &str,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let price = base.yesterday_price(symbol).await?;
    writeln!(out, "{price}")?;
    Ok(())
}

/// Print a symbol's mean rate of change over `timeframe`.
pub async fn mean<B, M, W>(
    strategy: &MeanReversionStrategy<B, M>,
    symbol: &str,
    timeframe: &str,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let timeframe = Timeframe::lookup(timeframe)?;
    let mean = strategy
        .symbol_mean(symbol, timeframe)
        .await?
        .ok_or_else(|| MarketDataError::NoData {
            symbol: symbol.to_string(),
        })?;
    writeln!(out, "{mean}")?;
    Ok(())
}

/// Print the current price of [`TEST_CRYPTO_SYMBOL`].
pub async fn test<B, M, W>(base: &BaseStrategy<B, M>, out: &mut W) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let price = base.current_crypto_price(TEST_CRYPTO_SYMBOL).await?;
    writeln!(out, "{price}")?;
    Ok(())
}

/// Print open positions as indented JSON.
pub async fn portfolio<B, M, W>(base: &BaseStrategy<B, M>, out: &mut W) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let positions = base.portfolio_raw().await?;
    write_pretty_json(out, &positions)
}
