use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::store::port::TableStore;
use crate::store::table::{Cell, Table};

const EXTENSION: &str = "csv";

/// Table store keeping one `<name>.csv` file per table in a directory.
///
/// Every value is written as text; reads hand back `Cell::Text` (blank cells
/// become `Cell::Missing`).
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    dir: PathBuf,
}

impl CsvTableStore {
    /// Open (and create if needed) the store directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
            return Err(StoreError::schema(name, "invalid table name"));
        }
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

impl TableStore for CsvTableStore {
    fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        // Write next to the target, then rename over it.
        let tmp = path.with_extension("csv.tmp");

        let mut w = csv::Writer::from_path(&tmp)?;
        w.write_record(table.columns())?;
        for row in table.rows() {
            w.write_record(row.iter().map(|c| c.to_string()))?;
        }
        w.flush()?;
        drop(w);

        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(&path)?;
        let headers = rdr.headers()?.clone();
        let mut table = Table::new(headers.iter());
        for rec in rdr.records() {
            let rec = rec?;
            table.push_row(rec.iter().map(Cell::from_stored).collect());
        }
        Ok(table)
    }

    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawValue;

    fn sample() -> Table {
        let mut t = Table::new(["Date", "Close", "Note"]);
        t.push_row(vec![
            Cell::Date(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            Cell::Float(101.5),
            Cell::Missing,
        ]);
        t.push_row(vec![Cell::Text("2024-01-03".into()), Cell::Int(99), Cell::Text("a, b".into())]);
        t
    }

    #[test]
    fn tables_survive_a_round_trip_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::open(dir.path().join("store")).unwrap();
        store.write_table("sbin_daily", &sample()).unwrap();

        let back = store.read_table("sbin_daily").unwrap();
        assert_eq!(back.columns(), ["Date", "Close", "Note"]);
        assert_eq!(back.len(), 2);
        assert_eq!(back.rows()[0][0], Cell::Text("2024-01-02".into()));
        assert_eq!(back.rows()[0][1].to_raw(), RawValue::Float(101.5));
        assert!(back.rows()[0][2].is_missing());
        assert_eq!(back.rows()[1][2], Cell::Text("a, b".into()));
    }

    #[test]
    fn listing_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::open(dir.path()).unwrap();
        store.write_table("tcs_daily", &sample()).unwrap();
        store.write_table("stock_performance_summary", &Table::new(["symbol"])).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        assert_eq!(
            store.list_tables().unwrap(),
            vec!["stock_performance_summary", "tcs_daily"]
        );
        assert_eq!(store.tables_with_suffix("_daily").unwrap(), vec!["tcs_daily"]);
    }

    #[test]
    fn bad_names_and_missing_tables_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvTableStore::open(dir.path()).unwrap();
        assert!(matches!(store.read_table("absent"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.write_table("../escape", &sample()),
            Err(StoreError::Schema { .. })
        ));
    }
}
