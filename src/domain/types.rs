//! Shared domain types.
//!
//! These types flow through every stage of the pipeline:
//!
//! - loosely-typed input (`RawValue`, `RawRecord`)
//! - resolver output (`CanonicalEntry`)
//! - built series (`DailyBar`, `SymbolSeries`)
//! - derived outputs (`SummaryRow`, `MonthlyReturn`, `CumulativePoint`, `CorrelationMatrix`)
//! - skip bookkeeping (`SkipReason`)

use std::fmt;

use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// A scalar value as handed over by a document reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    /// `false` for `Null` and blank text.
    pub fn is_present(&self) -> bool {
        match self {
            RawValue::Null => false,
            RawValue::Text(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// Trimmed, non-empty text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.trim()).filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Numeric interpretation: numbers as-is, numeric text parsed.
    ///
    /// Non-finite values are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            RawValue::Integer(i) => *i as f64,
            RawValue::Float(f) => *f,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Null | RawValue::Bool(_) => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Best-effort typing of a text cell (CSV documents and CSV tables).
    pub fn infer(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() {
            return RawValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return RawValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return RawValue::Float(f);
            }
        }
        RawValue::Text(s.to_string())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => Ok(()),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// One loosely-keyed input record.
///
/// Keys keep the order in which the document listed them. Inserting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &RawValue> {
        self.fields.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Canonical record fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Symbol,
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub const OHLCV: [Field; 5] = [Field::Open, Field::High, Field::Low, Field::Close, Field::Volume];

    pub fn name(self) -> &'static str {
        match self {
            Field::Symbol => "symbol",
            Field::Date => "date",
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Volume => "volume",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolver output: canonical keys, values not yet coerced.
///
/// `None` is the missing-value marker for OHLCV fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEntry {
    pub symbol: String,
    pub date: RawValue,
    pub open: Option<RawValue>,
    pub high: Option<RawValue>,
    pub low: Option<RawValue>,
    pub close: Option<RawValue>,
    pub volume: Option<RawValue>,
}

impl CanonicalEntry {
    pub fn field(&self, field: Field) -> Option<&RawValue> {
        match field {
            Field::Symbol | Field::Date => None,
            Field::Open => self.open.as_ref(),
            Field::High => self.high.as_ref(),
            Field::Low => self.low.as_ref(),
            Field::Close => self.close.as_ref(),
            Field::Volume => self.volume.as_ref(),
        }
    }
}

/// One complete trading day of a built series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered daily series for one symbol.
///
/// Invariants (established by the series builder, never mutated afterwards):
/// - dates strictly increasing, hence unique
/// - every bar carries all OHLCV values
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSeries {
    symbol: String,
    bars: Vec<DailyBar>,
}

impl SymbolSeries {
    /// Build a series from bars already sorted by strictly increasing date.
    ///
    /// Returns `None` when the ordering invariant does not hold.
    pub fn from_sorted(symbol: impl Into<String>, bars: Vec<DailyBar>) -> Option<Self> {
        if bars.windows(2).any(|w| w[0].date >= w[1].date) {
            return None;
        }
        Some(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&DailyBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    /// Re-express the series as resolver output (useful for rebuilding).
    pub fn to_entries(&self) -> Vec<CanonicalEntry> {
        self.bars
            .iter()
            .map(|b| CanonicalEntry {
                symbol: self.symbol.clone(),
                date: RawValue::Text(b.date.format("%Y-%m-%d").to_string()),
                open: Some(RawValue::Float(b.open)),
                high: Some(RawValue::Float(b.high)),
                low: Some(RawValue::Float(b.low)),
                close: Some(RawValue::Float(b.close)),
                volume: Some(RawValue::Integer(i64::try_from(b.volume).unwrap_or(i64::MAX))),
            })
            .collect()
    }
}

/// Win/loss status over the observed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Green,
    Red,
}

impl Status {
    /// Strictly positive returns are green; zero is red.
    pub fn from_return(yearly_return: f64) -> Self {
        if yearly_return > 0.0 { Status::Green } else { Status::Red }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Green => f.write_str("Green"),
            Status::Red => f.write_str("Red"),
        }
    }
}

/// Per-symbol performance summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub symbol: String,
    pub yearly_return: f64,
    /// `None` when fewer than two daily returns exist.
    pub volatility: Option<f64>,
    pub avg_volume: f64,
    pub status: Status,
}

/// Summary joined with the external sector mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorSummary {
    pub summary: SummaryRow,
    pub sector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReturn {
    pub symbol: String,
    /// Calendar month, 1..=12.
    pub month: u32,
    pub monthly_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub cumulative_return: f64,
}

/// Why a correlation cell has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedReason {
    /// Fewer than two dates shared by the pair.
    InsufficientOverlap { common: usize },
    /// Fewer than two return pairs after joining.
    TooFewReturns,
    /// One side of the pair never moves.
    ZeroVariance,
    /// A joined close used as a return base is zero.
    ZeroBasePrice,
}

impl fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedReason::InsufficientOverlap { common } => {
                write!(f, "only {common} common date(s)")
            }
            UndefinedReason::TooFewReturns => f.write_str("fewer than 2 return pairs"),
            UndefinedReason::ZeroVariance => f.write_str("zero variance"),
            UndefinedReason::ZeroBasePrice => f.write_str("zero base price"),
        }
    }
}

/// One cell of a correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Correlation {
    Defined(f64),
    Undefined(UndefinedReason),
}

impl Correlation {
    pub fn value(self) -> Option<f64> {
        match self {
            Correlation::Defined(v) => Some(v),
            Correlation::Undefined(_) => None,
        }
    }
}

/// Square, symmetric symbol × symbol correlation grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    symbols: Vec<String>,
    cells: DMatrix<Correlation>,
}

impl CorrelationMatrix {
    pub(crate) fn new(symbols: Vec<String>, cells: DMatrix<Correlation>) -> Self {
        Self { symbols, cells }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn at(&self, row: usize, col: usize) -> Correlation {
        self.cells[(row, col)]
    }

    /// Look up a cell by symbol pair.
    pub fn get(&self, a: &str, b: &str) -> Option<Correlation> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.cells[(i, j)])
    }
}

/// Tagged reason a piece of input did not make it into the outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkipReason {
    UnreadableDocument,
    UnsupportedDocument,
    UnresolvedSymbol,
    UnresolvedDate,
    UnparseableDate,
    DuplicateDate,
    InvalidField(Field),
    IncompleteRow,
    InsufficientData,
    ZeroBasePrice,
    StoreFailure,
    TableNameCollision,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnreadableDocument => f.write_str("unreadable document"),
            SkipReason::UnsupportedDocument => f.write_str("unsupported document type"),
            SkipReason::UnresolvedSymbol => f.write_str("record without symbol"),
            SkipReason::UnresolvedDate => f.write_str("record without date"),
            SkipReason::UnparseableDate => f.write_str("unparseable date"),
            SkipReason::DuplicateDate => f.write_str("superseded duplicate date"),
            SkipReason::InvalidField(field) => write!(f, "invalid `{field}` value"),
            SkipReason::IncompleteRow => f.write_str("row incomplete after forward-fill"),
            SkipReason::InsufficientData => f.write_str("symbol with fewer than 2 rows"),
            SkipReason::ZeroBasePrice => f.write_str("symbol with zero base price"),
            SkipReason::StoreFailure => f.write_str("table read or write failure"),
            SkipReason::TableNameCollision => f.write_str("symbol sharing another symbol's table name"),
        }
    }
}
