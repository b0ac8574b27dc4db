//! Strategy commands.

use std::io::Write;
use std::path::PathBuf;

use crate::application::ports::{BrokerPort, FundDataPort, MarketDataPort};
use crate::application::strategies::{
    ActionOutcome, CopyCatConfig, CopyCatStrategy, MeanReversionConfig, MeanReversionReport,
    MeanReversionStrategy, SimpleConfig, SimpleStrategy,
};
use crate::application::universe::all_ark_holdings;
use crate::domain::Timeframe;
use crate::error::CommandError;
use crate::infrastructure::persistence::TickerFile;

/// Run the simple strategy and print how it exited.
pub async fn simple<B, M, W>(
    strategy: &SimpleStrategy<B, M>,
    config: &SimpleConfig,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    W: Write + ?Sized,
{
    let outcome = strategy.run(config).await?;
    writeln!(
        out,
        "{}: {} at {} (entry {}, qty {})",
        outcome.symbol, outcome.reason, outcome.exit_price, outcome.entry_price, outcome.qty
    )?;
    Ok(())
}

/// Run the copycat strategy and print one line per mirrored trade.
pub async fn copycat<B, M, F, W>(
    strategy: &CopyCatStrategy<B, M, F>,
    config: &CopyCatConfig,
    out: &mut W,
) -> Result<(), CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    F: FundDataPort,
    W: Write + ?Sized,
{
    let report = strategy.run(config).await?;
    for action in &report.actions {
        match &action.outcome {
            ActionOutcome::Placed { order_id } => writeln!(
                out,
                "{}: {} {} (order {order_id})",
                action.ticker, action.side, action.qty
            )?,
            ActionOutcome::Skipped { reason } => {
                writeln!(out, "{}: {} skipped ({reason})", action.ticker, action.side)?;
            }
        }
    }
    Ok(())
}

/// Arguments of the `mean-reversion` command.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanReversionArgs {
    /// Explicit universe. Only decides whether the ticker file is bootstrapped.
    pub symbols: Option<Vec<String>>,
    /// Universe file.
    pub ticker_file: PathBuf,
    /// Use the mean cache.
    pub cache_means: bool,
    /// Mean cache file.
    pub cache_filename: PathBuf,
    /// Total spend; zero means account cash.
    pub budget: f64,
    /// Dry run.
    pub testing: bool,
    /// Timeframe name.
    pub timeframe: String,
}

impl Default for MeanReversionArgs {
    fn default() -> Self {
        Self {
            symbols: None,
            ticker_file: PathBuf::from("./tickers.txt"),
            cache_means: false,
            cache_filename: PathBuf::from("./mean_reversion.json"),
            budget: 0.0,
            testing: false,
            timeframe: Timeframe::Month.name().to_string(),
        }
    }
}

/// Resolve the strategy config for a mean-reversion run.
///
/// When no symbols were given and the ticker file is absent, the file is
/// created from every ARK fund's holdings. The universe is then always the
/// ticker file's contents, even if symbols were given. Testing forces the
/// mean cache on.
pub async fn prepare_mean_reversion<F>(
    funds: &F,
    args: &MeanReversionArgs,
) -> Result<MeanReversionConfig, CommandError>
where
    F: FundDataPort + ?Sized,
{
    let timeframe = Timeframe::lookup(&args.timeframe)?;
    let tickers = TickerFile::new(&args.ticker_file);

    if args.symbols.is_none() && !tickers.exists() {
        tracing::info!(path = %tickers.path().display(), "Bootstrapping ticker file from ARK holdings");
        let holdings = all_ark_holdings(funds).await?;
        tickers.bootstrap(holdings.as_slice())?;
    }

    let symbols = tickers.read()?;
    if let Some(explicit) = args.symbols.as_ref().filter(|s| **s != symbols) {
        tracing::warn!(
            explicit = ?explicit,
            path = %tickers.path().display(),
            "Ignoring explicit symbols; the ticker file defines the universe"
        );
    }

    Ok(MeanReversionConfig {
        symbols,
        cache_means: args.cache_means || args.testing,
        timeframe,
        cache_path: args.cache_filename.clone(),
        testing: args.testing,
        budget: args.budget,
    })
}

/// Run mean reversion and print one line per decision.
pub async fn mean_reversion<B, M, F, W>(
    strategy: &MeanReversionStrategy<B, M>,
    funds: &F,
    args: &MeanReversionArgs,
    out: &mut W,
) -> Result<MeanReversionReport, CommandError>
where
    B: BrokerPort,
    M: MarketDataPort,
    F: FundDataPort + ?Sized,
    W: Write + ?Sized,
{
    let config = prepare_mean_reversion(funds, args).await?;
    tracing::info!(
        symbols = config.symbols.len(),
        timeframe = %config.timeframe,
        cache_means = config.cache_means,
        testing = config.testing,
        "Running mean reversion"
    );

    let report = strategy.run(&config).await?;
    for decision in &report.decisions {
        writeln!(out, "{}", decision.display_line())?;
    }
    Ok(report)
}
