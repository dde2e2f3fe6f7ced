//! Return sequences and small statistics helpers.
//!
//! Two daily-return sequences exist on purpose:
//! - `daily_returns`: first day excluded (summary statistics)
//! - `daily_returns_zero_filled`: first day is `0.0` (compounding)
//!
//! They differ in length by one and must not be mixed.

use crate::domain::SymbolSeries;
use crate::error::MetricError;

/// Simple returns `c[i] / c[i-1] - 1` for `i >= 1`.
///
/// `Err(i)` names the first index whose base `c[i-1]` is zero.
pub fn simple_returns(closes: &[f64]) -> Result<Vec<f64>, usize> {
    let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
    for i in 1..closes.len() {
        let base = closes[i - 1];
        if base == 0.0 {
            return Err(i);
        }
        out.push(closes[i] / base - 1.0);
    }
    Ok(out)
}

/// Daily close-to-close returns, first day excluded.
pub fn daily_returns(series: &SymbolSeries) -> Result<Vec<f64>, MetricError> {
    let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
    simple_returns(&closes).map_err(|i| zero_base(series, i - 1))
}

/// Daily close-to-close returns with the first day's return set to `0.0`.
pub fn daily_returns_zero_filled(series: &SymbolSeries) -> Result<Vec<f64>, MetricError> {
    if series.is_empty() {
        return Ok(Vec::new());
    }
    let mut out = Vec::with_capacity(series.len());
    out.push(0.0);
    out.extend(daily_returns(series)?);
    Ok(out)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator). `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let n = values.len() as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

pub(crate) fn zero_base(series: &SymbolSeries, idx: usize) -> MetricError {
    MetricError::ZeroBasePrice {
        symbol: series.symbol().to_string(),
        date: series.bars()[idx].date,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, NaiveDate};

    use crate::domain::{DailyBar, SymbolSeries};

    /// Consecutive calendar days starting 2024-01-01, one bar per close.
    pub fn series_from_closes(symbol: &str, closes: &[f64]) -> SymbolSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dated: Vec<(NaiveDate, f64)> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| (start + Duration::days(i as i64), *c))
            .collect();
        series_from_dated(symbol, &dated)
    }

    pub fn series_from_dated(symbol: &str, points: &[(NaiveDate, f64)]) -> SymbolSeries {
        let bars = points
            .iter()
            .map(|(date, close)| DailyBar {
                date: *date,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1_000,
            })
            .collect();
        SymbolSeries::from_sorted(symbol, bars).unwrap()
    }
}
