//! Canonical entries → per-symbol daily series.
//!
//! Per symbol:
//! 1. parse dates (unparseable entries are dropped)
//! 2. deduplicate by date, last occurrence in input order wins
//! 3. sort ascending
//! 4. coerce OHLCV values (unparseable → missing)
//! 5. forward-fill each column, then drop rows that are still incomplete
//!
//! Symbols whose series ends up empty are omitted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rayon::prelude::*;

use crate::domain::{CanonicalEntry, DailyBar, Field, RawValue, SkipReason, SymbolSeries};
use crate::report::run::SkipTally;

const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Builder output: one series per symbol plus what was dropped on the way.
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub series: BTreeMap<String, SymbolSeries>,
    pub skips: SkipTally,
}

/// Accumulates entries per symbol; call `finish` to build the series.
#[derive(Debug, Default)]
pub struct SeriesBuilder {
    groups: BTreeMap<String, Vec<CanonicalEntry>>,
}

impl SeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: CanonicalEntry) {
        self.groups.entry(entry.symbol.clone()).or_default().push(entry);
    }

    /// Build every symbol's series. Symbols are processed in parallel.
    pub fn finish(self) -> BuildOutput {
        let built: Vec<(String, Option<SymbolSeries>, SkipTally)> = self
            .groups
            .into_par_iter()
            .map(|(symbol, entries)| {
                let (series, skips) = build_symbol(&symbol, &entries);
                (symbol, series, skips)
            })
            .collect();

        let mut out = BuildOutput::default();
        for (symbol, series, skips) in built {
            out.skips.merge(&skips);
            if let Some(series) = series {
                out.series.insert(symbol, series);
            }
        }
        out
    }
}

impl Extend<CanonicalEntry> for SeriesBuilder {
    fn extend<I: IntoIterator<Item = CanonicalEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Convenience wrapper: build series from any entry stream.
pub fn build_series<I>(entries: I) -> BuildOutput
where
    I: IntoIterator<Item = CanonicalEntry>,
{
    let mut builder = SeriesBuilder::new();
    builder.extend(entries);
    builder.finish()
}

/// Build one symbol's series from its entries (in input order).
pub fn build_symbol(symbol: &str, entries: &[CanonicalEntry]) -> (Option<SymbolSeries>, SkipTally) {
    let mut skips = SkipTally::new();

    // Dedupe on insert: later entries replace earlier ones for the same date.
    let mut by_date: BTreeMap<NaiveDate, &CanonicalEntry> = BTreeMap::new();
    for entry in entries {
        let Some(date) = parse_date(&entry.date) else {
            skips.add(SkipReason::UnparseableDate);
            continue;
        };
        if by_date.insert(date, entry).is_some() {
            skips.add(SkipReason::DuplicateDate);
        }
    }

    let mut last_valid: [Option<f64>; 5] = [None; 5];
    let mut bars = Vec::with_capacity(by_date.len());

    for (date, entry) in by_date {
        let mut row: [Option<f64>; 5] = [None; 5];
        for (idx, field) in Field::OHLCV.iter().enumerate() {
            let coerced = entry.field(*field).and_then(|v| coerce(*field, v, &mut skips));
            if let Some(v) = coerced {
                last_valid[idx] = Some(v);
            }
            row[idx] = coerced.or(last_valid[idx]);
        }

        match row {
            [Some(open), Some(high), Some(low), Some(close), Some(volume)] => bars.push(DailyBar {
                date,
                open,
                high,
                low,
                close,
                volume: volume as u64,
            }),
            _ => skips.add(SkipReason::IncompleteRow),
        }
    }

    if bars.is_empty() {
        return (None, skips);
    }
    // Dates come out of a BTreeMap, so the ordering invariant holds.
    (SymbolSeries::from_sorted(symbol, bars), skips)
}

/// Coerce one present value; invalid values count as skips and become missing.
fn coerce(field: Field, value: &RawValue, skips: &mut SkipTally) -> Option<f64> {
    if !value.is_present() {
        return None;
    }
    let parsed = value.as_f64().and_then(|v| match field {
        Field::Volume if v < 0.0 => None,
        Field::Volume => Some(v.round()),
        _ => Some(v),
    });
    if parsed.is_none() {
        skips.add(SkipReason::InvalidField(field));
    }
    parsed
}

/// Parse a resolved date value into a calendar date.
///
/// Text accepts ISO dates, ISO date-times (time discarded), RFC 3339 and a few
/// day-first layouts; integers are read as `YYYYMMDD`.
pub fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Text(s) => parse_date_str(s.trim()),
        RawValue::Integer(i) if (10_000_101..=99_991_231).contains(i) => {
            NaiveDate::parse_from_str(&i.to_string(), "%Y%m%d").ok()
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
