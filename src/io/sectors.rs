//! Sector mapping input.
//!
//! The sector CSV carries `Symbol` and `sector` columns. Symbol cells may hold
//! a display label such as `"SBI: SBIN"`; the ticker is the text after the
//! last `": "`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::{SectorSummary, SummaryRow};
use crate::error::AppError;

const SYMBOL_COLUMN: &str = "symbol";
const SECTOR_COLUMN: &str = "sector";
const LABEL_SEPARATOR: &str = ": ";

/// Symbol → sector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectorMap {
    by_symbol: BTreeMap<String, String>,
}

impl SectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later inserts for the same symbol replace earlier ones.
    pub fn insert(&mut self, symbol: impl Into<String>, sector: impl Into<String>) {
        self.by_symbol.insert(symbol.into(), sector.into());
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.by_symbol.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_symbol.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_empty()
    }

    /// Pairs in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_symbol.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Left join: every summary row is kept; unmapped symbols get no sector.
    pub fn join(&self, rows: Vec<SummaryRow>) -> Vec<SectorSummary> {
        rows.into_iter()
            .map(|summary| SectorSummary {
                sector: self.get(&summary.symbol).map(str::to_string),
                summary,
            })
            .collect()
    }
}

/// Summary rows with no sector information.
pub fn without_sectors(rows: Vec<SummaryRow>) -> Vec<SectorSummary> {
    rows.into_iter()
        .map(|summary| SectorSummary { summary, sector: None })
        .collect()
}

/// Ticker from a symbol label: the text after the last `": "`, trimmed.
pub fn split_symbol_label(label: &str) -> &str {
    label
        .rsplit_once(LABEL_SEPARATOR)
        .map_or(label, |(_, ticker)| ticker)
        .trim()
}

pub fn read_sector_csv(path: &Path) -> Result<SectorMap, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open sector CSV '{}': {e}", path.display()),
        )
    })?;
    parse_sector_csv(file)
}

/// Parse sector CSV content. Rows missing either value are ignored.
pub fn parse_sector_csv<R: Read>(reader: R) -> Result<SectorMap, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read sector CSV headers: {e}")))?
        .clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| normalize_header(h) == name)
            .ok_or_else(|| AppError::new(2, format!("Sector CSV is missing required column '{name}'")))
    };
    let symbol_idx = find(SYMBOL_COLUMN)?;
    let sector_idx = find(SECTOR_COLUMN)?;

    let mut map = SectorMap::new();
    for (idx, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| {
            AppError::new(2, format!("Sector CSV parse error on line {}: {e}", idx + 2))
        })?;
        let symbol = rec.get(symbol_idx).map(split_symbol_label).unwrap_or_default();
        let sector = rec.get(sector_idx).map(str::trim).unwrap_or_default();
        if symbol.is_empty() || sector.is_empty() {
            debug!(line = idx + 2, "sector row without symbol or sector");
            continue;
        }
        map.insert(symbol, sector);
    }
    Ok(map)
}

fn normalize_header(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}
