// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements,
        clippy::type_complexity
    )
)]

//! Algo Trader - Strategy Runner and Research Library
//!
//! Runs small trading strategies against the Alpaca brokerage and reads
//! ARK Invest fund disclosures for research.
//!
//! # Architecture (Clean Architecture + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Bars, timeframes, fund documents, rate-of-change statistics
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`BrokerPort`, `MarketDataPort`, `FundDataPort`)
//!   - `strategies`: Simple, CopyCat and MeanReversion on a shared `BaseStrategy`
//!   - `commands`: One handler per CLI command, writing to any `Write`
//!   - `universe`: Symbol universe built from every ARK fund's holdings
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: Alpaca REST adapter (trading and market data)
//!   - `fund_data`: arkfunds.io client
//!   - `persistence`: Ticker file and mean cache
//!   - `mock`: In-memory adapters for tests and dry runs
//!   - `container`: Dependency wiring
//!
//! `config`, `telemetry` and `cli` sit at the crate root and are used by the
//! binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core types with no external dependencies.
pub mod domain;

/// Application layer - Ports, strategies and command handlers.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Binary support
// =============================================================================

/// Command-line definition and dispatch.
pub mod cli;

/// Settings from the environment.
pub mod config;

/// Top-level command error.
pub mod error;

/// Tracing subscriber setup.
pub mod telemetry;

pub use cli::{Cli, Command};
pub use config::Settings;
pub use error::CommandError;
