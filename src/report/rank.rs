//! Rankings and aggregates over computed metrics.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{MonthlyReturn, SectorSummary, Status, SummaryRow};

/// Market-wide view of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketOverview {
    pub symbols: usize,
    /// `None` when there are no summaries.
    pub average_return: Option<f64>,
    pub green: usize,
    pub red: usize,
}

/// Top and bottom symbols by yearly return, plus the most volatile.
#[derive(Debug, Clone)]
pub struct Rankings {
    pub gainers: Vec<SummaryRow>,
    pub losers: Vec<SummaryRow>,
    pub volatile: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectorPerformance {
    pub sector: String,
    pub average_return: f64,
    pub symbols: usize,
}

/// Best and worst symbols of one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthLeaders {
    pub month: u32,
    pub gainers: Vec<MonthlyReturn>,
    pub losers: Vec<MonthlyReturn>,
}

pub fn market_overview(rows: &[SummaryRow]) -> MarketOverview {
    let green = rows.iter().filter(|r| r.status == Status::Green).count();
    let average_return = if rows.is_empty() {
        None
    } else {
        Some(rows.iter().map(|r| r.yearly_return).sum::<f64>() / rows.len() as f64)
    };
    MarketOverview {
        symbols: rows.len(),
        average_return,
        green,
        red: rows.len() - green,
    }
}

/// Descending by value, ties broken by symbol so output is stable.
fn desc_by<T>(items: &mut [T], value: impl Fn(&T) -> f64, symbol: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        value(b)
            .partial_cmp(&value(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| symbol(a).cmp(symbol(b)))
    });
}

fn asc_by<T>(items: &mut [T], value: impl Fn(&T) -> f64, symbol: impl Fn(&T) -> &str) {
    items.sort_by(|a, b| {
        value(a)
            .partial_cmp(&value(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| symbol(a).cmp(symbol(b)))
    });
}

/// Top-N gainers, losers and volatility. Symbols without a volatility value
/// are left out of the volatility ranking.
pub fn rank_summaries(rows: &[SummaryRow], top_n: usize) -> Rankings {
    let mut gainers = rows.to_vec();
    desc_by(&mut gainers, |r| r.yearly_return, |r| r.symbol.as_str());
    gainers.truncate(top_n);

    let mut losers = rows.to_vec();
    asc_by(&mut losers, |r| r.yearly_return, |r| r.symbol.as_str());
    losers.truncate(top_n);

    let mut volatile: Vec<SummaryRow> = rows.iter().filter(|r| r.volatility.is_some()).cloned().collect();
    desc_by(&mut volatile, |r| r.volatility.unwrap_or(0.0), |r| r.symbol.as_str());
    volatile.truncate(top_n);

    Rankings { gainers, losers, volatile }
}

/// Symbols of the top-N by yearly return.
pub fn top_symbols(rows: &[SummaryRow], top_n: usize) -> Vec<String> {
    rank_summaries(rows, top_n)
        .gainers
        .into_iter()
        .map(|r| r.symbol)
        .collect()
}

/// Mean yearly return per sector, best sector first. Unmapped symbols are
/// not counted.
pub fn sector_performance(rows: &[SectorSummary]) -> Vec<SectorPerformance> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in rows {
        if let Some(sector) = r.sector.as_deref() {
            let g = groups.entry(sector).or_insert((0.0, 0));
            g.0 += r.summary.yearly_return;
            g.1 += 1;
        }
    }

    let mut out: Vec<SectorPerformance> = groups
        .into_iter()
        .map(|(sector, (sum, n))| SectorPerformance {
            sector: sector.to_string(),
            average_return: sum / n as f64,
            symbols: n,
        })
        .collect();
    desc_by(&mut out, |s| s.average_return, |s| s.sector.as_str());
    out
}

/// Per observed month, the top-N gainers and losers.
pub fn monthly_leaders(rows: &[MonthlyReturn], top_n: usize) -> Vec<MonthLeaders> {
    let mut by_month: BTreeMap<u32, Vec<MonthlyReturn>> = BTreeMap::new();
    for r in rows {
        by_month.entry(r.month).or_default().push(r.clone());
    }

    by_month
        .into_iter()
        .map(|(month, mut rows)| {
            let mut losers = rows.clone();
            desc_by(&mut rows, |r| r.monthly_return, |r| r.symbol.as_str());
            rows.truncate(top_n);
            asc_by(&mut losers, |r| r.monthly_return, |r| r.symbol.as_str());
            losers.truncate(top_n);
            MonthLeaders {
                month,
                gainers: rows,
                losers,
            }
        })
        .collect()
}
