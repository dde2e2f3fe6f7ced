//! Named tabular datasets exchanged with a `TableStore`.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::RawValue;

/// One table cell.
///
/// Stores that only keep text (e.g. CSV) hand cells back as `Text`; the typed
/// accessors parse text on demand.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Text cell from a stored string; blank strings are missing.
    pub fn from_stored(s: &str) -> Self {
        if s.trim().is_empty() { Cell::Missing } else { Cell::Text(s.to_string()) }
    }

    pub fn from_opt_f64(v: Option<f64>) -> Self {
        v.map_or(Cell::Missing, Cell::Float)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Loosely-typed view, as a document reader would have produced it.
    pub fn to_raw(&self) -> RawValue {
        match self {
            Cell::Missing => RawValue::Null,
            Cell::Text(s) => RawValue::infer(s),
            Cell::Int(i) => RawValue::Integer(*i),
            Cell::Float(v) => RawValue::Float(*v),
            Cell::Date(d) => RawValue::Text(d.format("%Y-%m-%d").to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Column names plus rows of cells. Every row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding short rows with `Missing` and truncating long ones.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_width() {
        let mut t = Table::new(["a", "b", "c"]);
        t.push_row(vec![Cell::Int(1)]);
        t.push_row(vec![Cell::Int(1), Cell::Int(2), Cell::Int(3), Cell::Int(4)]);
        assert_eq!(t.rows()[0], vec![Cell::Int(1), Cell::Missing, Cell::Missing]);
        assert_eq!(t.rows()[1].len(), 3);
    }

    #[test]
    fn text_cells_parse_on_demand() {
        assert_eq!(Cell::from_stored("12.5").to_raw(), RawValue::Float(12.5));
        assert_eq!(Cell::from_stored("  "), Cell::Missing);
        assert_eq!(Cell::Text("2024-01-02".to_string()).to_raw(), RawValue::Text("2024-01-02".to_string()));
        assert_eq!(Cell::Text("7".to_string()).to_raw(), RawValue::Integer(7));
    }

    #[test]
    fn column_lookup_ignores_case() {
        let t = Table::new(["Date", "Close"]);
        assert_eq!(t.column_index("close"), Some(1));
        assert_eq!(t.column_index("volume"), None);
    }
}
