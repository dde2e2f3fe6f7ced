//! Per-symbol performance summary (yearly return, volatility, volume, status).

use rayon::prelude::*;

use crate::domain::{Status, SummaryRow, SymbolSeries};
use crate::error::MetricError;
use crate::metrics::returns::{daily_returns, mean, sample_std, zero_base};

/// Minimum number of rows a series needs before it can be summarized.
pub const MIN_SUMMARY_ROWS: usize = 2;

/// Summarize one series.
///
/// Fails with `InsufficientData` below two rows and with `ZeroBasePrice` when a
/// return would divide by zero; never emits a non-finite value.
pub fn summarize(series: &SymbolSeries) -> Result<SummaryRow, MetricError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(insufficient(series));
    };
    if series.len() < MIN_SUMMARY_ROWS {
        return Err(insufficient(series));
    }

    if first.close == 0.0 {
        return Err(zero_base(series, 0));
    }
    let yearly_return = (last.close - first.close) / first.close;

    let returns = daily_returns(series)?;
    let volatility = sample_std(&returns);

    let volumes: Vec<f64> = series.bars().iter().map(|b| b.volume as f64).collect();
    let avg_volume = mean(&volumes).unwrap_or(0.0);

    Ok(SummaryRow {
        symbol: series.symbol().to_string(),
        yearly_return,
        volatility,
        avg_volume,
        status: Status::from_return(yearly_return),
    })
}

/// Summarize many series in parallel.
///
/// Rows come back in input order; failures are returned alongside instead of
/// aborting the batch.
pub fn summarize_all<'a, I>(series: I) -> (Vec<SummaryRow>, Vec<MetricError>)
where
    I: IntoIterator<Item = &'a SymbolSeries>,
{
    let series: Vec<&SymbolSeries> = series.into_iter().collect();
    let results: Vec<Result<SummaryRow, MetricError>> = series.par_iter().map(|s| summarize(s)).collect();

    let mut rows = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for r in results {
        match r {
            Ok(row) => rows.push(row),
            Err(e) => failures.push(e),
        }
    }
    (rows, failures)
}

fn insufficient(series: &SymbolSeries) -> MetricError {
    MetricError::InsufficientData {
        symbol: series.symbol().to_string(),
        needed: MIN_SUMMARY_ROWS,
        got: series.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::returns::fixtures::series_from_closes;

    #[test]
    fn worked_example_is_red() {
        let s = series_from_closes("SBIN", &[100.0, 110.0, 99.0]);
        let row = summarize(&s).unwrap();

        assert!((row.yearly_return + 0.01).abs() < 1e-12);
        assert_eq!(row.status, Status::Red);
        assert!((row.volatility.unwrap() - 0.1414213562).abs() < 1e-9);
        assert_eq!(row.avg_volume, 1_000.0);
    }

    #[test]
    fn two_rows_have_return_but_no_volatility() {
        let s = series_from_closes("TCS", &[100.0, 120.0]);
        let row = summarize(&s).unwrap();
        assert!((row.yearly_return - 0.2).abs() < 1e-12);
        assert_eq!(row.status, Status::Green);
        assert_eq!(row.volatility, None);
    }

    #[test]
    fn flat_series_is_red() {
        let s = series_from_closes("ITC", &[50.0, 51.0, 50.0]);
        assert_eq!(summarize(&s).unwrap().status, Status::Red);
    }

    #[test]
    fn short_series_is_insufficient() {
        let s = series_from_closes("ONE", &[10.0]);
        assert_eq!(
            summarize(&s).unwrap_err(),
            MetricError::InsufficientData {
                symbol: "ONE".to_string(),
                needed: 2,
                got: 1
            }
        );
    }

    #[test]
    fn zero_first_close_is_an_error_not_infinity() {
        let s = series_from_closes("ZERO", &[0.0, 10.0, 12.0]);
        assert!(matches!(summarize(&s), Err(MetricError::ZeroBasePrice { .. })));

        let mid = series_from_closes("MID", &[10.0, 0.0, 12.0]);
        assert!(matches!(summarize(&mid), Err(MetricError::ZeroBasePrice { .. })));
    }

    #[test]
    fn volatility_scales_out_but_shifts_do_not() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;
        use rand_distr::{Distribution, Normal};

        let mut rng = StdRng::seed_from_u64(7);
        let shocks = Normal::new(0.0, 0.02).unwrap();
        let mut price = 250.0;
        let mut closes = Vec::new();
        for _ in 0..60 {
            price *= 1.0 + shocks.sample(&mut rng);
            closes.push(price);
        }

        let base = summarize(&series_from_closes("A", &closes)).unwrap();
        let scaled: Vec<f64> = closes.iter().map(|c| c * 3.5).collect();
        let shifted: Vec<f64> = closes.iter().map(|c| c + 100.0).collect();

        let v = base.volatility.unwrap();
        let v_scaled = summarize(&series_from_closes("A", &scaled)).unwrap().volatility.unwrap();
        let v_shifted = summarize(&series_from_closes("A", &shifted)).unwrap().volatility.unwrap();

        assert!((v - v_scaled).abs() < 1e-12);
        assert!((v - v_shifted).abs() > 1e-4);
    }

    #[test]
    fn summarize_all_keeps_going_after_failures() {
        let good = series_from_closes("GOOD", &[1.0, 2.0]);
        let short = series_from_closes("SHORT", &[1.0]);
        let (rows, failures) = summarize_all([&good, &short]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "GOOD");
        assert_eq!(failures.len(), 1);
    }
}
