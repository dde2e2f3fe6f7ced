//! Plain-text terminal reports.
//!
//! Every function returns a `String`; printing is left to the caller.

use std::collections::BTreeMap;

use crate::domain::{CorrelationMatrix, CumulativePoint, SummaryRow};
use crate::report::rank::{MarketOverview, MonthLeaders, Rankings, SectorPerformance};
use crate::report::run::RunReport;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// What went in, what came out, and what was dropped.
pub fn format_run_report(report: &RunReport) -> String {
    let mut out = String::new();

    out.push_str("=== stm - run report ===\n");
    out.push_str(&format!(
        "Documents: {} | records read={} resolved={}\n",
        report.documents_read, report.records_read, report.records_resolved
    ));
    out.push_str(&format!(
        "Symbols: built={} summarized={}\n",
        report.symbols_built, report.symbols_summarized
    ));

    if report.skips.is_empty() {
        out.push_str("Skipped: none\n");
    } else {
        out.push_str(&format!("Skipped: {}\n", report.skips.total()));
        for (reason, n) in report.skips.iter() {
            out.push_str(&format!("  {:<34} {n:>8}\n", reason.to_string()));
        }
    }

    for (symbol, err) in &report.symbol_failures {
        out.push_str(&format!("  excluded {symbol}: {err}\n"));
    }
    for (table, msg) in &report.store_failures {
        out.push_str(&format!("  not written {table}: {msg}\n"));
    }
    if !report.months_collapsed.is_empty() {
        out.push_str(&format!(
            "Monthly groups span several years: {}\n",
            report.months_collapsed.join(", ")
        ));
    }
    out
}

pub fn format_overview(overview: &MarketOverview) -> String {
    let avg = overview
        .average_return
        .map_or_else(|| "n/a".to_string(), fmt_pct);
    format!(
        "Market overview: {} symbols | average return {avg} | green {} | red {}\n",
        overview.symbols, overview.green, overview.red
    )
}

/// Gainer, loser and volatility tables.
pub fn format_rankings(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Top gainers (yearly return):\n");
    out.push_str(&summary_table(&rankings.gainers));
    out.push('\n');

    out.push_str("Top losers (yearly return):\n");
    out.push_str(&summary_table(&rankings.losers));
    out.push('\n');

    out.push_str("Most volatile (daily return std):\n");
    out.push_str(&summary_table(&rankings.volatile));

    out
}

fn summary_table(rows: &[SummaryRow]) -> String {
    let mut out = header_lines(&[
        ("symbol", 16, true),
        ("return", 10, false),
        ("volatility", 10, false),
        ("avg_volume", 14, false),
        ("status", 6, true),
    ]);
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<16} {:>10} {:>10} {:>14.0} {:<6}",
                truncate(&r.symbol, 16),
                fmt_pct(r.yearly_return),
                r.volatility.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}")),
                r.avg_volume,
                r.status,
            ),
        );
    }
    out
}

pub fn format_sector_performance(sectors: &[SectorPerformance]) -> String {
    if sectors.is_empty() {
        return "Sector performance: no sector mapping\n".to_string();
    }
    let mut out = String::from("Sector performance (mean yearly return):\n");
    out.push_str(&header_lines(&[("sector", 24, true), ("return", 10, false), ("symbols", 8, false)]));
    for s in sectors {
        push_line(
            &mut out,
            format!(
                "{:<24} {:>10} {:>8}",
                truncate(&s.sector, 24),
                fmt_pct(s.average_return),
                s.symbols
            ),
        );
    }
    out
}

pub fn format_monthly_leaders(leaders: &[MonthLeaders]) -> String {
    let mut out = String::from("Monthly leaders:\n");
    for m in leaders {
        let name = MONTH_NAMES
            .get((m.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("?");
        let list = |rows: &[crate::domain::MonthlyReturn]| {
            rows.iter()
                .map(|r| format!("{} {}", r.symbol, fmt_pct(r.monthly_return)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        out.push_str(&format!("{name}: up   {}\n", list(&m.gainers)));
        out.push_str(&format!("{name}: down {}\n", list(&m.losers)));
    }
    out
}

/// Last cumulative value per curve, in first-seen symbol order.
pub fn format_cumulative(points: &[CumulativePoint]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut finals: BTreeMap<&str, &CumulativePoint> = BTreeMap::new();
    for p in points {
        if finals.insert(p.symbol.as_str(), p).is_none() {
            order.push(p.symbol.as_str());
        }
    }

    let mut out = String::from("Cumulative return (last observation):\n");
    out.push_str(&header_lines(&[("symbol", 16, true), ("date", 10, true), ("cumulative", 12, false)]));
    for sym in order {
        if let Some(p) = finals.get(sym) {
            push_line(
                &mut out,
                format!(
                    "{:<16} {:<10} {:>12}",
                    truncate(sym, 16),
                    p.date.format("%Y-%m-%d").to_string(),
                    fmt_pct(p.cumulative_return)
                ),
            );
        }
    }
    out
}

/// Square grid; undefined cells show as `-`.
pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    if matrix.is_empty() {
        return "Correlation: no symbols\n".to_string();
    }
    let mut out = String::from("Correlation of daily returns:\n");

    let mut header = format!("{:<12}", "");
    for s in matrix.symbols() {
        header.push_str(&format!(" {:>10}", truncate(s, 10)));
    }
    push_line(&mut out, header);

    for (i, s) in matrix.symbols().iter().enumerate() {
        let mut line = format!("{:<12}", truncate(s, 12));
        for j in 0..matrix.len() {
            let cell = matrix
                .at(i, j)
                .value()
                .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
            line.push_str(&format!(" {cell:>10}"));
        }
        push_line(&mut out, line);
    }
    out
}

/// Column header plus dashed underline. `(name, width, left_aligned)`.
fn header_lines(cols: &[(&str, usize, bool)]) -> String {
    let names: Vec<String> = cols
        .iter()
        .map(|&(name, w, left)| {
            if left { format!("{name:<w$}") } else { format!("{name:>w$}") }
        })
        .collect();
    let dashes: Vec<String> = cols.iter().map(|&(_, w, _)| "-".repeat(w)).collect();

    let mut out = String::new();
    push_line(&mut out, names.join(" "));
    push_line(&mut out, dashes.join(" "));
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_pct(v: f64) -> String {
    format!("{:+.2}%", v * 100.0)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
