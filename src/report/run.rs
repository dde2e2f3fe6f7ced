//! Run bookkeeping: what was skipped, and why.
//!
//! Skips are counted per `SkipReason`; per-record detail is not kept. Symbols
//! that produced no summary are listed with the metric error that stopped them.

use std::collections::BTreeMap;

use crate::domain::SkipReason;
use crate::error::MetricError;

/// Counts of skipped items per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipTally {
    counts: BTreeMap<SkipReason, usize>,
}

impl SkipTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reason: SkipReason) {
        self.add_n(reason, 1);
    }

    pub fn add_n(&mut self, reason: SkipReason, n: usize) {
        if n > 0 {
            *self.counts.entry(reason).or_insert(0) += n;
        }
    }

    pub fn merge(&mut self, other: &SkipTally) {
        for (reason, n) in &other.counts {
            self.add_n(*reason, *n);
        }
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkipReason, usize)> + '_ {
        self.counts.iter().map(|(r, n)| (*r, *n))
    }
}

/// Outcome of a whole run: volumes in, volumes out, and skips in between.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub documents_read: usize,
    pub records_read: usize,
    pub records_resolved: usize,
    pub symbols_built: usize,
    pub symbols_summarized: usize,
    pub skips: SkipTally,
    /// Symbols excluded from one or more outputs, with the reason.
    pub symbol_failures: Vec<(String, MetricError)>,
    /// Tables that could not be read or written, with the store message.
    pub store_failures: Vec<(String, String)>,
    /// Symbols whose month-of-year groups mix several years. Not a skip:
    /// their monthly returns are still produced.
    pub months_collapsed: Vec<String>,
}

impl RunReport {
    /// Record a per-symbol metric failure and count it under its skip reason.
    pub fn record_failure(&mut self, err: MetricError) {
        let (symbol, reason) = match &err {
            MetricError::InsufficientData { symbol, .. } => (symbol.clone(), SkipReason::InsufficientData),
            MetricError::ZeroBasePrice { symbol, .. } => (symbol.clone(), SkipReason::ZeroBasePrice),
        };
        self.skips.add(reason);
        self.symbol_failures.push((symbol, err));
    }

    pub fn record_store_failure(&mut self, table: &str, message: impl Into<String>) {
        self.skips.add(SkipReason::StoreFailure);
        self.store_failures.push((table.to_string(), message.into()));
    }

    /// `symbol` maps to the same table as `kept`, so its series is not written.
    pub fn record_table_collision(&mut self, table: &str, symbol: &str, kept: &str) {
        self.skips.add(SkipReason::TableNameCollision);
        self.store_failures
            .push((table.to_string(), format!("{symbol} shares the table name with {kept}")));
    }
}
