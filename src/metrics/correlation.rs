//! Pairwise correlation of daily close-to-close returns.
//!
//! Every pair is joined on its own common dates (inner join per pair), so a gap
//! in one symbol never shrinks the sample of an unrelated pair. Cells that
//! cannot be computed carry an `UndefinedReason` instead of a number.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Correlation, CorrelationMatrix, SymbolSeries, UndefinedReason};
use crate::metrics::returns::simple_returns;

/// Build the correlation matrix for the given series, in the given order.
pub fn correlation_matrix(series: &[&SymbolSeries]) -> CorrelationMatrix {
    let n = series.len();
    let symbols: Vec<String> = series.iter().map(|s| s.symbol().to_string()).collect();

    // Upper triangle including the diagonal; each pair is computed once.
    let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();
    let values: Vec<(usize, usize, Correlation)> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let c = if i == j {
                self_correlation(series[i])
            } else {
                pair_correlation(series[i], series[j])
            };
            (i, j, c)
        })
        .collect();

    let mut cells = DMatrix::from_element(n, n, Correlation::Undefined(UndefinedReason::TooFewReturns));
    for (i, j, c) in values {
        cells[(i, j)] = c;
        cells[(j, i)] = c;
    }
    CorrelationMatrix::new(symbols, cells)
}

fn self_correlation(series: &SymbolSeries) -> Correlation {
    if series.len() >= 2 {
        Correlation::Defined(1.0)
    } else {
        Correlation::Undefined(UndefinedReason::InsufficientOverlap { common: series.len() })
    }
}

/// Correlation of returns computed over the pair's common dates.
pub fn pair_correlation(a: &SymbolSeries, b: &SymbolSeries) -> Correlation {
    let (xa, xb) = join_closes(a, b);
    if xa.len() < 2 {
        return Correlation::Undefined(UndefinedReason::InsufficientOverlap { common: xa.len() });
    }

    let (Ok(ra), Ok(rb)) = (simple_returns(&xa), simple_returns(&xb)) else {
        return Correlation::Undefined(UndefinedReason::ZeroBasePrice);
    };
    if ra.len() < 2 {
        return Correlation::Undefined(UndefinedReason::TooFewReturns);
    }

    match pearson(&ra, &rb) {
        Some(r) => Correlation::Defined(r.clamp(-1.0, 1.0)),
        None => Correlation::Undefined(UndefinedReason::ZeroVariance),
    }
}

/// Closes of both series on dates present in both, in date order.
fn join_closes(a: &SymbolSeries, b: &SymbolSeries) -> (Vec<f64>, Vec<f64>) {
    let (ba, bb) = (a.bars(), b.bars());
    let (mut i, mut j) = (0, 0);
    let mut xa = Vec::new();
    let mut xb = Vec::new();

    while i < ba.len() && j < bb.len() {
        match ba[i].date.cmp(&bb[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                xa.push(ba[i].close);
                xb.push(bb[j].close);
                i += 1;
                j += 1;
            }
        }
    }
    (xa, xb)
}

/// Pearson coefficient; `None` when either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return None;
    }

    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(sxy / denom)
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::returns::fixtures::{series_from_closes, series_from_dated};
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let a = series_from_closes("A", &[10.0, 11.0, 10.5, 12.0, 11.8]);
        let b = series_from_closes("B", &[20.0, 21.5, 21.0, 23.9, 23.0]);
        let c = series_from_closes("C", &[5.0, 4.8, 5.1, 4.7, 4.9]);

        let m = correlation_matrix(&[&a, &b, &c]);
        assert_eq!(m.len(), 3);
        for i in 0..3 {
            assert_eq!(m.at(i, i), Correlation::Defined(1.0));
            for j in 0..3 {
                assert_eq!(m.at(i, j), m.at(j, i));
                let v = m.at(i, j).value().unwrap();
                assert!((-1.0..=1.0).contains(&v));
            }
        }
        assert!(m.get("A", "B").unwrap().value().unwrap() > 0.9);
        assert!(m.get("A", "C").unwrap().value().unwrap() < 0.0);
    }

    #[test]
    fn proportional_series_correlate_perfectly() {
        let a = series_from_closes("A", &[1.0, 2.0, 1.5, 3.0]);
        let b = series_from_closes("B", &[10.0, 20.0, 15.0, 30.0]);
        let v = pair_correlation(&a, &b).value().unwrap();
        assert!((v - 1.0).abs() < 1e-12);
        assert!(v <= 1.0);
    }

    #[test]
    fn pairs_join_on_their_own_common_dates() {
        // A and B overlap on 4 dates; C overlaps A on one date only.
        let a = series_from_dated("A", &[(d(1), 1.0), (d(2), 2.0), (d(3), 1.0), (d(4), 3.0), (d(5), 2.0)]);
        let b = series_from_dated("B", &[(d(2), 4.0), (d(3), 2.0), (d(4), 6.0), (d(5), 4.0)]);
        let c = series_from_dated("C", &[(d(1), 9.0), (d(9), 8.0)]);

        let m = correlation_matrix(&[&a, &b, &c]);
        assert!((m.get("A", "B").unwrap().value().unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(
            m.get("A", "C"),
            Some(Correlation::Undefined(UndefinedReason::InsufficientOverlap { common: 1 }))
        );
        assert_eq!(
            m.get("B", "C"),
            Some(Correlation::Undefined(UndefinedReason::InsufficientOverlap { common: 0 }))
        );
        assert_eq!(m.get("C", "C"), Some(Correlation::Defined(1.0)));
    }

    #[test]
    fn degenerate_pairs_are_undefined_not_zero() {
        let a = series_from_closes("A", &[1.0, 2.0]);
        let b = series_from_closes("B", &[3.0, 4.0]);
        assert_eq!(pair_correlation(&a, &b), Correlation::Undefined(UndefinedReason::TooFewReturns));

        let flat = series_from_closes("F", &[5.0, 5.0, 5.0]);
        let moving = series_from_closes("M", &[1.0, 2.0, 1.0]);
        assert_eq!(pair_correlation(&flat, &moving), Correlation::Undefined(UndefinedReason::ZeroVariance));

        let zero = series_from_closes("Z", &[0.0, 2.0, 1.0]);
        assert_eq!(pair_correlation(&zero, &moving), Correlation::Undefined(UndefinedReason::ZeroBasePrice));

        let single = series_from_closes("S", &[1.0]);
        let m = correlation_matrix(&[&single]);
        assert_eq!(m.at(0, 0), Correlation::Undefined(UndefinedReason::InsufficientOverlap { common: 1 }));
    }
}
