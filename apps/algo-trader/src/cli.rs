//! Command-line interface.

use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};

use crate::application::commands::{self, ArkArgs, MeanReversionArgs};
use crate::application::ports::{BrokerPort, DEFAULT_FUND_LIMIT, FundDataPort, MarketDataPort};
use crate::application::strategies::{CopyCatConfig, SimpleConfig};
use crate::config::Settings;
use crate::error::CommandError;
use crate::infrastructure::{AlpacaContainer, Container, ark_client};

/// Algorithmic trading against Alpaca, with ARK fund research.
#[derive(Debug, Parser)]
#[command(name = "algo-trader", author, version, about, long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Buy a symbol and sell it at a gain or loss threshold
    Simple {
        /// Symbol to trade
        symbol: String,
        /// Shares to buy
        #[arg(long, default_value_t = 1)]
        qty: u32,
        /// Take-profit threshold in percent
        #[arg(long, default_value_t = 1.0)]
        gain: f64,
        /// Stop-loss threshold in percent
        #[arg(long, default_value_t = 1.0)]
        loss: f64,
    },

    /// Mirror an ETF's latest disclosed trades
    Copycat {
        /// ETF to mirror
        symbol: String,
        /// Share of cash to spend per day, in percent
        #[arg(long)]
        daily_budget_percentage: f64,
        /// Cash balance that must remain
        #[arg(long)]
        min_bal: f64,
    },

    /// Print an ARK fund's holdings or trades
    Ark {
        /// ARK fund ticker
        symbol: String,
        /// "holdings" or "trades"
        mode: String,
        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        /// Maximum rows
        #[arg(long, default_value_t = DEFAULT_FUND_LIMIT)]
        limit: u32,
    },

    /// Print bars for the last 100 days
    Historical {
        /// Symbol to query
        symbol: String,
        /// Bar size: minute, hour, day, week or month
        #[arg(long, default_value = "day")]
        timeframe: String,
        /// Maximum bars
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },

    /// Print the latest price
    Current {
        /// Symbol to query
        symbol: String,
    },

    /// Print the previous session's close
    Yesterday {
        /// Symbol to query
        symbol: String,
    },

    /// Print the mean rate of change
    Mean {
        /// Symbol to query
        symbol: String,
        /// Bar size: minute, hour, day, week or month
        #[arg(long, default_value = "month")]
        timeframe: String,
    },

    /// Run mean reversion over the ticker file's universe
    #[command(alias = "mean_reversion")]
    MeanReversion {
        /// Symbols (repeatable or comma separated); only used to decide
        /// whether to create the ticker file
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        /// Universe file, one symbol per line
        #[arg(long, default_value = "./tickers.txt")]
        ticker_file: PathBuf,
        /// Reuse and extend cached means
        #[arg(long)]
        cache_means: bool,
        /// Mean cache file
        #[arg(long, default_value = "./mean_reversion.json")]
        cache_filename: PathBuf,
        /// Total spend across buys; 0 uses the account's cash
        #[arg(long, default_value_t = 0.0)]
        budget: f64,
        /// Decide without placing orders
        #[arg(long)]
        testing: bool,
        /// Bar size: minute, hour, day, week or month
        #[arg(long, default_value = "month")]
        timeframe: String,
    },

    /// Print the current ETH price
    Test,

    /// Print open positions as JSON
    Portfolio,
}

/// Run one command against the production adapters.
///
/// `ark` only builds the fund-disclosure client; everything else needs
/// brokerage credentials.
pub async fn execute<W>(command: Command, settings: &Settings, out: &mut W) -> Result<(), CommandError>
where
    W: Write + ?Sized,
{
    if let Command::Ark { .. } = command {
        let funds = ark_client(settings)?;
        return ark(&funds, command, out).await;
    }

    let container = AlpacaContainer::from_settings(settings)?;
    dispatch(command, &container, out).await
}

/// Run one command against an already wired container.
pub async fn dispatch<B, M, F, W>(
    command: Command,
    container: &Container<B, M, F>,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort + 'static,
    M: MarketDataPort + 'static,
    F: FundDataPort + 'static,
    W: Write + ?Sized,
{
    tracing::debug!(command = ?command, "Dispatching");
    match command {
        Command::Simple {
            symbol,
            qty,
            gain,
            loss,
        } => {
            let config = SimpleConfig {
                symbol,
                qty,
                gain_pct: gain,
                loss_pct: loss,
            };
            commands::simple(&container.simple_strategy(), &config, out).await
        }
        Command::Copycat {
            symbol,
            daily_budget_percentage,
            min_bal,
        } => {
            let config = CopyCatConfig {
                etf_symbol: symbol,
                daily_budget_pct: daily_budget_percentage,
                min_balance: min_bal,
            };
            commands::copycat(&container.copycat_strategy(), &config, out).await
        }
        Command::Ark { .. } => ark(container.funds().as_ref(), command, out).await,
        Command::Historical {
            symbol,
            timeframe,
            limit,
        } => {
            let base = container.base();
            let now = Local::now().fixed_offset();
            commands::historical(base.market_data(), &symbol, &timeframe, limit, now, out).await
        }
        Command::Current { symbol } => commands::current(&container.base(), &symbol, out).await,
        Command::Yesterday { symbol } => {
            commands::yesterday(&container.base(), &symbol, out).await
        }
        Command::Mean { symbol, timeframe } => {
            commands::mean(&container.mean_reversion_strategy(), &symbol, &timeframe, out).await
        }
        Command::MeanReversion {
            symbols,
            ticker_file,
            cache_means,
            cache_filename,
            budget,
            testing,
            timeframe,
        } => {
            let args = MeanReversionArgs {
                symbols: (!symbols.is_empty()).then_some(symbols),
                ticker_file,
                cache_means,
                cache_filename,
                budget,
                testing,
                timeframe,
            };
            let funds = container.funds();
            commands::mean_reversion(
                &container.mean_reversion_strategy(),
                funds.as_ref(),
                &args,
                out,
            )
            .await
            .map(|_| ())
        }
        Command::Test => commands::test(&container.base(), out).await,
        Command::Portfolio => commands::portfolio(&container.base(), out).await,
    }
}

async fn ark<F, W>(funds: &F, command: Command, out: &mut W) -> Result<(), CommandError>
where
    F: FundDataPort + ?Sized,
    W: Write + ?Sized,
{
    let Command::Ark {
        symbol,
        mode,
        start_date,
        end_date,
        limit,
    } = command
    else {
        return Ok(());
    };

    let args = ArkArgs {
        symbol,
        mode,
        start_date,
        end_date,
        limit,
    };
    commands::ark(funds, &args, out).await
}
