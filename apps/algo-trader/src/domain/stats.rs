//! Rate-of-change statistics.

/// Mean of bar-to-bar close rate of change.
///
/// Each step contributes `(c[i] - c[i-1]) / c[i-1]`. Returns `None` when
/// fewer than two closes are given; steps starting from a zero close are
/// ignored.
#[must_use]
pub fn mean_rate_of_change(closes: &[f64]) -> Option<f64> {
    let changes: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();

    if changes.is_empty() {
        return None;
    }

    Some(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Fractional change from `previous` to `current`.
///
/// Returns `None` when `previous` is zero.
#[must_use]
pub fn rate_of_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous)
}
