//! Month-by-month performance.
//!
//! Groups are keyed by calendar month number only. A series covering several
//! years therefore merges e.g. every January into one group: the return runs
//! from the first January close to the last January close. Callers can detect
//! this with `spans_multiple_years` and flag it.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::domain::{MonthlyReturn, SymbolSeries};
use crate::error::MetricError;

/// Intramonth return per observed calendar month, ordered by month.
///
/// Months without observations are absent. A single-observation month yields
/// `0.0`.
pub fn monthly_returns(series: &SymbolSeries) -> Result<Vec<MonthlyReturn>, MetricError> {
    // month -> (first bar, last bar) in date order
    let mut groups: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for (idx, bar) in series.bars().iter().enumerate() {
        groups
            .entry(bar.date.month())
            .and_modify(|(_, last)| *last = idx)
            .or_insert((idx, idx));
    }

    let bars = series.bars();
    let mut out = Vec::with_capacity(groups.len());
    for (month, (first, last)) in groups {
        let first_close = bars[first].close;
        if first_close == 0.0 {
            return Err(MetricError::ZeroBasePrice {
                symbol: series.symbol().to_string(),
                date: bars[first].date,
            });
        }
        out.push(MonthlyReturn {
            symbol: series.symbol().to_string(),
            month,
            monthly_return: (bars[last].close - first_close) / first_close,
        });
    }
    Ok(out)
}

/// `true` when the series covers more than one calendar year, i.e. when
/// `monthly_returns` merges months across years.
pub fn spans_multiple_years(series: &SymbolSeries) -> bool {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => first.date.year() != last.date.year(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::returns::fixtures::series_from_dated;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_january_record_is_zero() {
        let s = series_from_dated("SBIN", &[(d(2024, 1, 15), 100.0)]);
        let rows = monthly_returns(&s).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].monthly_return, 0.0);
    }

    #[test]
    fn first_to_last_close_within_month() {
        let s = series_from_dated(
            "TCS",
            &[
                (d(2024, 1, 2), 100.0),
                (d(2024, 1, 20), 90.0),
                (d(2024, 1, 31), 110.0),
                (d(2024, 3, 1), 50.0),
                (d(2024, 3, 28), 40.0),
            ],
        );
        let rows = monthly_returns(&s).unwrap();
        let months: Vec<u32> = rows.iter().map(|r| r.month).collect();
        // February has no trading days and is absent, not zero.
        assert_eq!(months, vec![1, 3]);
        assert!((rows[0].monthly_return - 0.10).abs() < 1e-12);
        assert!((rows[1].monthly_return + 0.20).abs() < 1e-12);
        assert!(!spans_multiple_years(&s));
    }

    #[test]
    fn months_collapse_across_years() {
        let s = series_from_dated(
            "INFY",
            &[
                (d(2023, 1, 10), 100.0),
                (d(2023, 6, 10), 70.0),
                (d(2024, 1, 10), 150.0),
            ],
        );
        let rows = monthly_returns(&s).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month, 1);
        assert!((rows[0].monthly_return - 0.5).abs() < 1e-12);
        assert!(spans_multiple_years(&s));
    }

    #[test]
    fn zero_first_close_in_month_fails() {
        let s = series_from_dated("Z", &[(d(2024, 2, 1), 0.0), (d(2024, 2, 2), 5.0)]);
        assert!(matches!(monthly_returns(&s), Err(MetricError::ZeroBasePrice { .. })));
    }
}
