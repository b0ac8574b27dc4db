//! OHLCV bars and historical query windows.

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Gap between "now" and the end of the historical query window.
pub const HISTORICAL_END_OFFSET_HOURS: i64 = 1;

/// Length of the historical query window.
pub const HISTORICAL_LOOKBACK_DAYS: i64 = 100;

/// Single OHLCV price record for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bucket start time.
    pub timestamp: DateTime<Utc>,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: u64,
}

impl Bar {
    /// Render the bar the way the `historical` command prints it.
    ///
    /// The hour is on a 12-hour clock (`%I`), matching the established
    /// output of the tool.
    #[must_use]
    pub fn display_line(&self) -> String {
        format!(
            "Date: {} Open: {} Close: {} High: {} Low: {} Volume: {}",
            self.timestamp.format("%Y-%m-%d %I:%M:%S"),
            self.open,
            self.close,
            self.high,
            self.low,
            self.volume
        )
    }
}

/// Start/end instants for a bar query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    /// Inclusive start.
    pub start: DateTime<FixedOffset>,
    /// Inclusive end.
    pub end: DateTime<FixedOffset>,
}

impl QueryWindow {
    /// Window used by the `historical` command.
    ///
    /// Ends one hour before `now` and starts 100 days before that end.
    #[must_use]
    pub fn historical(now: DateTime<FixedOffset>) -> Self {
        let end = now - TimeDelta::hours(HISTORICAL_END_OFFSET_HOURS);
        let start = end - TimeDelta::days(HISTORICAL_LOOKBACK_DAYS);
        Self { start, end }
    }

    /// ISO-8601 rendering of the start instant (microsecond precision, numeric offset).
    #[must_use]
    pub fn start_str(&self) -> String {
        format_instant(&self.start)
    }

    /// ISO-8601 rendering of the end instant (microsecond precision, numeric offset).
    #[must_use]
    pub fn end_str(&self) -> String {
        format_instant(&self.end)
    }
}

/// Format an instant as RFC 3339 with microseconds and a numeric offset.
#[must_use]
pub fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, false)
}
