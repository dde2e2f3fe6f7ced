//! Shared pipeline stages used by every subcommand.
//!
//! documents -> resolver -> series builder -> daily tables
//! daily tables (or in-memory series) -> metrics -> analysis tables
//!
//! Stages take the store as `&dyn TableStore`; they never open one themselves.
//! Per-symbol failures land in the `RunReport` and the run carries on.

use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::domain::{
    CorrelationMatrix, CumulativePoint, MonthlyReturn, RawRecord, SectorSummary, SymbolSeries,
};
use crate::error::{AppError, MetricError};
use crate::io::{SectorMap, read_documents, without_sectors};
use crate::metrics::{correlation_matrix, cumulative_returns, monthly_returns, spans_multiple_years, summarize_all};
use crate::report::{RunReport, top_symbols};
use crate::resolve::FieldResolver;
use crate::series::build_series;
use crate::store::{
    CORRELATION_TABLE, CUMULATIVE_TABLE, MONTHLY_TABLE, SECTORS_TABLE, SUMMARY_TABLE, TableStore,
    correlation_to_table, cumulative_to_table, monthly_to_table, sectors_to_table, series_from_table,
    series_to_table, summary_to_table, symbol_from_table, table_name,
};

pub type SeriesMap = BTreeMap<String, SymbolSeries>;

/// All computed outputs of one analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub summaries: Vec<SectorSummary>,
    pub monthly: Vec<MonthlyReturn>,
    /// Curves of the top symbols by yearly return, one after another.
    pub cumulative: Vec<CumulativePoint>,
    pub correlation: CorrelationMatrix,
    pub sectors: Option<SectorMap>,
}

/// Resolve and build series from raw records.
pub fn ingest_records(records: Vec<RawRecord>, resolver: &FieldResolver, report: &mut RunReport) -> SeriesMap {
    report.records_read += records.len();

    let resolved: Vec<_> = records.par_iter().map(|r| resolver.resolve(r)).collect();
    let mut entries = Vec::with_capacity(resolved.len());
    for outcome in resolved {
        match outcome {
            Ok(entry) => entries.push(entry),
            Err(reason) => report.skips.add(reason),
        }
    }
    report.records_resolved += entries.len();
    debug!(resolved = entries.len(), "records resolved");

    let built = build_series(entries);
    report.skips.merge(&built.skips);
    report.symbols_built += built.series.len();
    info!(symbols = built.series.len(), "series built");
    built.series
}

/// Read every document below `dir` and build series from it.
pub fn ingest_documents(dir: &Path, resolver: &FieldResolver, report: &mut RunReport) -> Result<SeriesMap, AppError> {
    let batch = read_documents(dir)?;
    info!(
        dir = %dir.display(),
        documents = batch.documents_read,
        records = batch.records.len(),
        "documents read"
    );
    report.documents_read += batch.documents_read;
    report.skips.merge(&batch.skips);

    let series = ingest_records(batch.records, resolver, report);
    if series.is_empty() {
        return Err(AppError::new(3, "No usable series remain after normalization."));
    }
    Ok(series)
}

/// Write one daily table per symbol. Returns how many were written.
///
/// Symbols that map to the same table name are not written over each other:
/// the first in symbol order keeps the table, the rest are recorded as skipped.
pub fn persist_series(store: &dyn TableStore, series: &SeriesMap, suffix: &str, report: &mut RunReport) -> usize {
    let mut by_table: BTreeMap<String, Vec<(&str, &SymbolSeries)>> = BTreeMap::new();
    for (symbol, s) in series {
        by_table.entry(table_name(symbol, suffix)).or_default().push((symbol.as_str(), s));
    }

    let mut targets = Vec::with_capacity(by_table.len());
    for (name, group) in by_table {
        let (kept, s) = group[0];
        for (symbol, _) in &group[1..] {
            warn!(
                table = %name,
                symbol = %symbol,
                kept = %kept,
                "table name already taken, series not written"
            );
            report.record_table_collision(&name, symbol, kept);
        }
        targets.push((name, s));
    }

    let outcomes: Vec<(String, Result<(), String>)> = targets
        .into_par_iter()
        .map(|(name, s)| {
            let res = store.write_table(&name, &series_to_table(s)).map_err(|e| e.to_string());
            (name, res)
        })
        .collect();

    let mut written = 0;
    for (name, res) in outcomes {
        match res {
            Ok(()) => written += 1,
            Err(msg) => {
                warn!(table = %name, error = %msg, "daily table not written");
                report.record_store_failure(&name, msg);
            }
        }
    }
    info!(tables = written, "daily tables written");
    written
}

/// Read every daily table back into series.
///
/// Unreadable tables are recorded and skipped; an empty result is an error.
pub fn load_series(store: &dyn TableStore, suffix: &str, report: &mut RunReport) -> Result<SeriesMap, AppError> {
    let names = store.tables_with_suffix(suffix)?;
    let mut out = SeriesMap::new();

    for name in names {
        let Some(symbol) = symbol_from_table(&name, suffix) else {
            continue;
        };
        let loaded = store
            .read_table(&name)
            .and_then(|table| series_from_table(&name, &symbol, &table));
        match loaded {
            Ok((series, skips)) => {
                report.skips.merge(&skips);
                if let Some(series) = series {
                    out.insert(symbol, series);
                }
            }
            Err(e) => {
                warn!(table = %name, error = %e, "daily table not readable");
                report.record_store_failure(&name, e.to_string());
            }
        }
    }

    report.symbols_built += out.len();
    info!(symbols = out.len(), "series loaded from store");
    if out.is_empty() {
        return Err(AppError::new(
            3,
            format!("No readable daily tables with suffix '{suffix}' in the store."),
        ));
    }
    Ok(out)
}

/// Compute every metric over the built series.
pub fn analyze(
    series: &SeriesMap,
    sectors: Option<SectorMap>,
    config: &PipelineConfig,
    report: &mut RunReport,
) -> Result<AnalysisOutput, AppError> {
    let (rows, failures) = summarize_all(series.values());
    for err in failures {
        warn!(error = %err, "symbol excluded from summary");
        report.record_failure(err);
    }
    report.symbols_summarized = rows.len();
    if rows.is_empty() {
        return Err(AppError::new(3, "No symbol has enough data for a summary."));
    }

    let top = top_symbols(&rows, config.curve_top);
    let summaries = match &sectors {
        Some(map) => map.join(rows),
        None => without_sectors(rows),
    };

    let monthly = monthly_stage(series, report);
    let cumulative = cumulative_stage(series, &top, report);

    let picked = correlation_symbols(series, &config.correlate, &top);
    let correlation = correlation_matrix(&picked);
    info!(
        summaries = summaries.len(),
        monthly = monthly.len(),
        correlated = correlation.len(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        summaries,
        monthly,
        cumulative,
        correlation,
        sectors,
    })
}

fn monthly_stage(series: &SeriesMap, report: &mut RunReport) -> Vec<MonthlyReturn> {
    let all: Vec<&SymbolSeries> = series.values().collect();
    let outcomes: Vec<(bool, Result<Vec<MonthlyReturn>, MetricError>)> = all
        .par_iter()
        .map(|s| (spans_multiple_years(s), monthly_returns(s)))
        .collect();

    let mut out = Vec::new();
    for (s, (collapsed, res)) in all.iter().zip(outcomes) {
        if collapsed {
            warn!(symbol = s.symbol(), "monthly groups merge the same month across years");
            report.months_collapsed.push(s.symbol().to_string());
        }
        match res {
            Ok(rows) => out.extend(rows),
            Err(err) => {
                warn!(error = %err, "symbol excluded from monthly performance");
                report.record_failure(err);
            }
        }
    }
    out
}

fn cumulative_stage(series: &SeriesMap, symbols: &[String], report: &mut RunReport) -> Vec<CumulativePoint> {
    let mut out = Vec::new();
    for s in symbols.iter().filter_map(|sym| series.get(sym)) {
        match cumulative_returns(s) {
            Ok(points) => out.extend(points),
            Err(err) => {
                warn!(error = %err, "symbol excluded from cumulative returns");
                report.record_failure(err);
            }
        }
    }
    out
}

/// Requested symbols that exist, or the default set when none were requested.
fn correlation_symbols<'a>(series: &'a SeriesMap, requested: &[String], default: &[String]) -> Vec<&'a SymbolSeries> {
    let wanted = if requested.is_empty() { default } else { requested };
    wanted
        .iter()
        .filter_map(|sym| {
            let found = series.get(sym);
            if found.is_none() {
                warn!(symbol = %sym, "no series for requested correlation symbol");
            }
            found
        })
        .collect()
}

/// Write the analysis tables, replacing any previous run's.
pub fn persist_analysis(store: &dyn TableStore, output: &AnalysisOutput) -> Result<(), AppError> {
    store.write_table(SUMMARY_TABLE, &summary_to_table(&output.summaries, output.sectors.is_some()))?;
    store.write_table(MONTHLY_TABLE, &monthly_to_table(&output.monthly))?;
    store.write_table(CUMULATIVE_TABLE, &cumulative_to_table(&output.cumulative))?;
    store.write_table(CORRELATION_TABLE, &correlation_to_table(&output.correlation))?;
    if let Some(map) = &output.sectors {
        store.write_table(SECTORS_TABLE, &sectors_to_table(map.iter()))?;
    }
    info!("analysis tables written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PipelineArgs;
    use crate::domain::{RawValue, SkipReason};
    use crate::error::StoreError;
    use crate::store::{DEFAULT_DAILY_SUFFIX, MemoryTableStore, Table};

    fn config(correlate: &[&str]) -> PipelineConfig {
        let args = PipelineArgs {
            top: 10,
            curve_top: 2,
            monthly_top: 5,
            correlate: correlate.iter().map(|s| s.to_string()).collect(),
            ..PipelineArgs::default()
        };
        PipelineConfig::from_args_with_env(&args, |_| None).unwrap()
    }

    fn record(symbol: &str, date: &str, close: f64) -> RawRecord {
        [
            ("tradingsymbol", RawValue::Text(symbol.to_string())),
            ("date", RawValue::Text(date.to_string())),
            ("open", RawValue::Float(close)),
            ("high", RawValue::Float(close)),
            ("low", RawValue::Float(close)),
            ("close", RawValue::Float(close)),
            ("volume", RawValue::Integer(100)),
        ]
        .into_iter()
        .collect()
    }

    fn records() -> Vec<RawRecord> {
        vec![
            record("SBIN", "2024-01-02", 100.0),
            record("SBIN", "2024-01-03", 110.0),
            record("SBIN", "2024-01-04", 99.0),
            record("TCS", "2024-01-02", 50.0),
            record("TCS", "2024-01-03", 55.0),
            record("TCS", "2024-01-04", 60.0),
            record("INFY", "2024-01-02", 10.0),
            // duplicate date, later one wins
            record("INFY", "2024-01-02", 12.0),
            [("note", RawValue::Text("no symbol here".into()))].into_iter().collect(),
        ]
    }

    #[test]
    fn ingest_counts_every_outcome() {
        let mut report = RunReport::default();
        let series = ingest_records(records(), &FieldResolver::default(), &mut report);

        assert_eq!(report.records_read, 9);
        assert_eq!(report.records_resolved, 8);
        assert_eq!(report.skips.get(SkipReason::UnresolvedSymbol), 1);
        assert_eq!(report.skips.get(SkipReason::DuplicateDate), 1);
        assert_eq!(series.len(), 3);
        assert_eq!(series["INFY"].bars()[0].close, 12.0);
    }

    #[test]
    fn store_round_trip_then_analyze() {
        let store = MemoryTableStore::new();
        let mut report = RunReport::default();
        let series = ingest_records(records(), &FieldResolver::default(), &mut report);
        assert_eq!(persist_series(&store, &series, DEFAULT_DAILY_SUFFIX, &mut report), 3);

        let loaded = load_series(&store, DEFAULT_DAILY_SUFFIX, &mut report).unwrap();
        assert_eq!(loaded, series);

        let mut sectors = SectorMap::new();
        sectors.insert("SBIN", "Banking");
        let out = analyze(&loaded, Some(sectors), &config(&[]), &mut report).unwrap();

        // INFY has a single row and drops out of the summary.
        assert_eq!(report.symbols_summarized, 2);
        assert_eq!(report.skips.get(SkipReason::InsufficientData), 1);
        let sbin = out.summaries.iter().find(|s| s.summary.symbol == "SBIN").unwrap();
        assert!((sbin.summary.yearly_return + 0.01).abs() < 1e-12);
        assert_eq!(sbin.sector.as_deref(), Some("Banking"));

        // Default correlation set: top 2 by yearly return.
        assert_eq!(out.correlation.symbols(), ["TCS", "SBIN"]);
        let last_tcs = out.cumulative.iter().filter(|p| p.symbol == "TCS").next_back().unwrap();
        assert!((last_tcs.cumulative_return - 0.2).abs() < 1e-12);

        persist_analysis(&store, &out).unwrap();
        let tables = store.list_tables().unwrap();
        for t in [SUMMARY_TABLE, MONTHLY_TABLE, CUMULATIVE_TABLE, CORRELATION_TABLE, SECTORS_TABLE] {
            assert!(tables.iter().any(|n| n == t), "missing {t}");
        }
    }

    #[test]
    fn requested_correlation_symbols_skip_unknown_ones() {
        let mut report = RunReport::default();
        let series = ingest_records(records(), &FieldResolver::default(), &mut report);
        let out = analyze(&series, None, &config(&["SBIN", "NOPE", "INFY"]), &mut report).unwrap();
        assert_eq!(out.correlation.symbols(), ["SBIN", "INFY"]);
        assert!(out.sectors.is_none());
    }

    #[test]
    fn symbols_sharing_a_table_name_are_not_overwritten() {
        let mut report = RunReport::default();
        let input = vec![
            record("sbin", "2024-01-02", 100.0),
            record("sbin", "2024-01-03", 101.0),
            record("SBIN", "2024-01-02", 500.0),
            record("SBIN", "2024-01-03", 505.0),
        ];
        let series = ingest_records(input, &FieldResolver::default(), &mut report);
        assert_eq!(series.len(), 2);

        let store = MemoryTableStore::new();
        let written = persist_series(&store, &series, DEFAULT_DAILY_SUFFIX, &mut report);

        assert_eq!(written, 1);
        assert_eq!(store.list_tables().unwrap(), ["sbin_daily"]);
        assert_eq!(report.skips.get(SkipReason::TableNameCollision), 1);
        assert_eq!(report.store_failures.len(), 1);
        assert_eq!(report.store_failures[0].0, "sbin_daily");

        // "SBIN" sorts first and keeps the table.
        let loaded = load_series(&store, DEFAULT_DAILY_SUFFIX, &mut report).unwrap();
        assert_eq!(loaded["SBIN"].bars()[0].close, 500.0);
    }

    #[test]
    fn months_across_years_are_flagged_not_skipped() {
        let mut report = RunReport::default();
        let input = vec![
            record("SBIN", "2023-12-28", 100.0),
            record("SBIN", "2023-12-29", 102.0),
            record("SBIN", "2024-01-02", 104.0),
            record("SBIN", "2024-01-03", 103.0),
        ];
        let series = ingest_records(input, &FieldResolver::default(), &mut report);
        let skipped_before = report.skips.total();

        let out = analyze(&series, None, &config(&[]), &mut report).unwrap();
        assert!(!out.monthly.is_empty());
        assert_eq!(report.months_collapsed, ["SBIN"]);
        assert_eq!(report.skips.total(), skipped_before);
    }

    struct FailingStore;

    impl TableStore for FailingStore {
        fn write_table(&self, name: &str, _table: &Table) -> Result<(), StoreError> {
            if name.starts_with("tcs") {
                Err(StoreError::Io(std::io::Error::other("disk full")))
            } else {
                Ok(())
            }
        }

        fn read_table(&self, name: &str) -> Result<Table, StoreError> {
            Err(StoreError::NotFound(name.to_string()))
        }

        fn list_tables(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn one_failed_write_does_not_stop_the_others() {
        let mut report = RunReport::default();
        let series = ingest_records(records(), &FieldResolver::default(), &mut report);
        let written = persist_series(&FailingStore, &series, DEFAULT_DAILY_SUFFIX, &mut report);

        assert_eq!(written, 2);
        assert_eq!(report.skips.get(SkipReason::StoreFailure), 1);
        assert_eq!(report.store_failures[0].0, "tcs_daily");

        let err = load_series(&FailingStore, DEFAULT_DAILY_SUFFIX, &mut report).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
