//! Logging setup.
//!
//! Logs go to stderr; stdout carries only command output.

use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor `--log-level` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Pick the filter directive: `RUST_LOG` wins, then the CLI level, then
/// [`DEFAULT_LOG_LEVEL`].
#[must_use]
pub fn filter_directive(rust_log: Option<&str>, cli_level: Option<&str>) -> String {
    rust_log
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| cli_level.map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// Install the global fmt subscriber.
///
/// Calling this more than once keeps the first subscriber.
pub fn init_tracing(cli_level: Option<&str>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(rust_log.as_deref(), cli_level);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(None, None => "warn" ; "default")]
    #[test_case(None, Some("debug") => "debug" ; "cli level")]
    #[test_case(Some("algo_trader=trace"), Some("debug") => "algo_trader=trace" ; "rust log wins")]
    #[test_case(Some("  "), Some("info") => "info" ; "blank rust log ignored")]
    fn directive_precedence(rust_log: Option<&str>, cli_level: Option<&str>) -> String {
        filter_directive(rust_log, cli_level)
    }

    #[test]
    fn init_twice_is_harmless() {
        init_tracing(Some("error"));
        init_tracing(Some("error"));
    }
}
