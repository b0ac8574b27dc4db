//! Bar bucket sizes.
//!
//! The CLI accepts timeframe names as plain strings; they are mapped
//! through a closed lookup table so that an unsupported name is a hard,
//! testable failure instead of a silent default.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use thiserror::Error;

/// Error returned when a timeframe name is not in the lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    /// The name does not match any supported bucket.
    #[error("Unknown timeframe '{name}' (expected one of: minute, hour, day, week, month)")]
    Unknown {
        /// The rejected name.
        name: String,
    },
}

/// Bar bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    /// One-minute bars.
    Minute,
    /// One-hour bars.
    Hour,
    /// Daily bars.
    Day,
    /// Weekly bars.
    Week,
    /// Monthly bars.
    Month,
}

impl Timeframe {
    /// Every supported bucket, smallest first.
    pub const ALL: [Self; 5] = [Self::Minute, Self::Hour, Self::Day, Self::Week, Self::Month];

    /// Look up a bucket by its CLI name.
    ///
    /// Names are matched exactly (`"day"`, not `"Day"`).
    pub fn lookup(name: &str) -> Result<Self, TimeframeError> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.name() == name)
            .ok_or_else(|| TimeframeError::Unknown {
                name: name.to_string(),
            })
    }

    /// CLI name of the bucket.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Alpaca market data `timeframe` parameter.
    #[must_use]
    pub const fn alpaca_code(&self) -> &'static str {
        match self {
            Self::Minute => "1Min",
            Self::Hour => "1Hour",
            Self::Day => "1Day",
            Self::Week => "1Week",
            Self::Month => "1Month",
        }
    }

    /// Approximate wall-clock span of one bucket.
    ///
    /// Months are treated as 30 days.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        match self {
            Self::Minute => TimeDelta::minutes(1),
            Self::Hour => TimeDelta::hours(1),
            Self::Day => TimeDelta::days(1),
            Self::Week => TimeDelta::weeks(1),
            Self::Month => TimeDelta::days(30),
        }
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use test_case::test_case;

    use super::*;

    #[test_case("minute", Timeframe::Minute, "1Min")]
    #[test_case("hour", Timeframe::Hour, "1Hour")]
    #[test_case("day", Timeframe::Day, "1Day")]
    #[test_case("week", Timeframe::Week, "1Week")]
    #[test_case("month", Timeframe::Month, "1Month")]
    fn lookup_maps_name_to_bucket(name: &str, expected: Timeframe, code: &str) {
        let tf = Timeframe::lookup(name).unwrap();
        assert_eq!(tf, expected);
        assert_eq!(tf.alpaca_code(), code);
        assert_eq!(tf.to_string(), name);
    }

    #[test_case("Day")]
    #[test_case("days")]
    #[test_case("")]
    #[test_case("year")]
    fn lookup_rejects_unknown_names(name: &str) {
        let err = Timeframe::lookup(name).unwrap_err();
        assert_eq!(
            err,
            TimeframeError::Unknown {
                name: name.to_string()
            }
        );
    }

    #[test]
    fn bucket_codes_are_distinct() {
        let codes: HashSet<_> = Timeframe::ALL.iter().map(Timeframe::alpaca_code).collect();
        assert_eq!(codes.len(), Timeframe::ALL.len());
    }

    #[test]
    fn spans_increase_with_bucket_size() {
        let spans: Vec<_> = Timeframe::ALL.iter().map(Timeframe::span).collect();
        assert!(spans.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn from_str_uses_lookup() {
        assert_eq!("week".parse::<Timeframe>().unwrap(), Timeframe::Week);
        assert!("fortnight".parse::<Timeframe>().is_err());
    }
}
