//! Algo Trader Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run -p algo-trader -- current AAPL
//! cargo run -p algo-trader -- mean-reversion --testing
//! ```
//!
//! # Environment Variables
//!
//! ## Required (all commands except `ark`)
//! - `API_KEY`: Alpaca API key
//! - `API_SECRET`: Alpaca API secret
//!
//! ## Optional
//! - `TRADER_ENVIRONMENT`: paper | live (default: paper)
//! - `TRADER_TRADING_URL` / `TRADER_DATA_URL`: Override Alpaca endpoints
//! - `TRADER_ARK_URL`: Override the ARK endpoint
//! - `TRADER_TIMEOUT_SECS`: HTTP timeout (default: 30)
//! - `TRADER_MAX_ATTEMPTS`: HTTP attempts per request (default: 3)
//! - `TRADER_POLL_INTERVAL_SECS`: Simple strategy poll interval (default: 60)
//! - `RUST_LOG`: Log filter (default: warn)
//!
//! A `.env` file in the working directory or any ancestor is loaded first.

use std::io::Write;
use std::process::ExitCode;

use algo_trader::cli::{Cli, execute};
use algo_trader::config::Settings;
use algo_trader::telemetry::init_tracing;
use anyhow::Context;
use clap::Parser;

fn main() -> ExitCode {
    load_dotenv();
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::from_env().context("failed to load settings")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(execute(cli.command, &settings, &mut out))?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

/// Load `.env` from the working directory, then from the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
