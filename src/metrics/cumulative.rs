//! Compounded growth curves.

use crate::domain::{CumulativePoint, SymbolSeries};
use crate::error::MetricError;
use crate::metrics::returns::daily_returns_zero_filled;

/// Running `Π(1 + r) − 1` over zero-filled daily returns.
///
/// The first point is always `0.0`.
pub fn cumulative_returns(series: &SymbolSeries) -> Result<Vec<CumulativePoint>, MetricError> {
    let returns = daily_returns_zero_filled(series)?;

    let mut growth = 1.0;
    Ok(series
        .bars()
        .iter()
        .zip(returns)
        .map(|(bar, r)| {
            growth *= 1.0 + r;
            CumulativePoint {
                date: bar.date,
                symbol: series.symbol().to_string(),
                cumulative_return: growth - 1.0,
            }
        })
        .collect())
}
