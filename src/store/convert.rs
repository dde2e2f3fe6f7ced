//! Conversions between domain values and store tables.
//!
//! Column names here are the persisted layout; downstream readers rely on them.

use crate::domain::{
    CanonicalEntry, CorrelationMatrix, CumulativePoint, MonthlyReturn, SectorSummary, SymbolSeries,
};
use crate::error::StoreError;
use crate::report::SkipTally;
use crate::series::build_symbol;
use crate::store::table::{Cell, Table};

pub const DAILY_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Daily table for one series, rows in date order.
pub fn series_to_table(series: &SymbolSeries) -> Table {
    let mut t = Table::new(DAILY_COLUMNS);
    for b in series.bars() {
        t.push_row(vec![
            Cell::Date(b.date),
            Cell::Float(b.open),
            Cell::Float(b.high),
            Cell::Float(b.low),
            Cell::Float(b.close),
            Cell::Int(i64::try_from(b.volume).unwrap_or(i64::MAX)),
        ]);
    }
    t
}

/// Rebuild a series from a daily table.
///
/// Rows go through the series builder again, so a table edited by hand is
/// cleaned the same way fresh input would be. `Date` and `Close` columns are
/// required; the other OHLCV columns may be absent.
pub fn series_from_table(
    name: &str,
    symbol: &str,
    table: &Table,
) -> Result<(Option<SymbolSeries>, SkipTally), StoreError> {
    let col = |c: &str| table.column_index(c);
    let date_col = col("Date").ok_or_else(|| StoreError::schema(name, "missing `Date` column"))?;
    let close_col = col("Close").ok_or_else(|| StoreError::schema(name, "missing `Close` column"))?;
    let (open_col, high_col, low_col, volume_col) = (col("Open"), col("High"), col("Low"), col("Volume"));

    let pick = |row: &[Cell], idx: Option<usize>| {
        idx.map(|i| &row[i]).filter(|c| !c.is_missing()).map(Cell::to_raw)
    };

    let entries: Vec<CanonicalEntry> = table
        .rows()
        .iter()
        .map(|row| row.as_slice())
        .map(|row| CanonicalEntry {
            symbol: symbol.to_string(),
            date: row[date_col].to_raw(),
            open: pick(row, open_col),
            high: pick(row, high_col),
            low: pick(row, low_col),
            close: pick(row, Some(close_col)),
            volume: pick(row, volume_col),
        })
        .collect();

    Ok(build_symbol(symbol, &entries))
}

/// Summary table; the `sector` column is written only when a mapping was given.
pub fn summary_to_table(rows: &[SectorSummary], with_sector: bool) -> Table {
    let mut columns = vec!["symbol", "yearly_return", "volatility", "avg_volume", "status"];
    if with_sector {
        columns.push("sector");
    }
    let mut t = Table::new(columns);
    for r in rows {
        let s = &r.summary;
        let mut row = vec![
            Cell::Text(s.symbol.clone()),
            Cell::Float(s.yearly_return),
            Cell::from_opt_f64(s.volatility),
            Cell::Float(s.avg_volume),
            Cell::Text(s.status.to_string()),
        ];
        if with_sector {
            row.push(r.sector.clone().map_or(Cell::Missing, Cell::Text));
        }
        t.push_row(row);
    }
    t
}

pub fn monthly_to_table(rows: &[MonthlyReturn]) -> Table {
    let mut t = Table::new(["Month", "symbol", "monthly_return"]);
    for r in rows {
        t.push_row(vec![
            Cell::Int(i64::from(r.month)),
            Cell::Text(r.symbol.clone()),
            Cell::Float(r.monthly_return),
        ]);
    }
    t
}

/// Square layout: a `symbol` column, then one column per symbol.
/// Undefined cells are written as missing values.
pub fn correlation_to_table(matrix: &CorrelationMatrix) -> Table {
    let mut columns = vec!["symbol".to_string()];
    columns.extend(matrix.symbols().iter().cloned());
    let mut t = Table::new(columns);
    for (i, sym) in matrix.symbols().iter().enumerate() {
        let mut row = vec![Cell::Text(sym.clone())];
        row.extend((0..matrix.len()).map(|j| Cell::from_opt_f64(matrix.at(i, j).value())));
        t.push_row(row);
    }
    t
}

pub fn cumulative_to_table(points: &[CumulativePoint]) -> Table {
    let mut t = Table::new(["Date", "symbol", "cumulative_return"]);
    for p in points {
        t.push_row(vec![
            Cell::Date(p.date),
            Cell::Text(p.symbol.clone()),
            Cell::Float(p.cumulative_return),
        ]);
    }
    t
}

pub fn sectors_to_table<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Table {
    let mut t = Table::new(["symbol", "sector"]);
    for (symbol, sector) in pairs {
        t.push_row(vec![Cell::Text(symbol.to_string()), Cell::Text(sector.to_string())]);
    }
    t
}
