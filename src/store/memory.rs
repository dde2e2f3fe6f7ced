use dashmap::DashMap;

use crate::error::StoreError;
use crate::store::port::TableStore;
use crate::store::table::Table;

/// In-process table store backed by a concurrent map.
///
/// Parallel stages may write different tables at the same time.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: DashMap<String, Table>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemoryTableStore {
    fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError> {
        self.tables.insert(name.to_string(), table.clone());
        Ok(())
    }

    fn read_table(&self, name: &str) -> Result<Table, StoreError> {
        self.tables
            .get(name)
            .map(|t| t.value().clone())
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = self.tables.iter().map(|e| e.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::table::Cell;

    #[test]
    fn write_replaces_and_lists_sorted() {
        let store = MemoryTableStore::new();
        let mut t = Table::new(["x"]);
        t.push_row(vec![Cell::Int(1)]);
        store.write_table("tcs_daily", &t).unwrap();
        store.write_table("sbin_daily", &t).unwrap();
        store.write_table("stock_sectors", &Table::new(["symbol"])).unwrap();

        t.push_row(vec![Cell::Int(2)]);
        store.write_table("tcs_daily", &t).unwrap();

        assert_eq!(store.read_table("tcs_daily").unwrap().len(), 2);
        assert_eq!(
            store.list_tables().unwrap(),
            vec!["sbin_daily", "stock_sectors", "tcs_daily"]
        );
        assert_eq!(
            store.tables_with_suffix("_daily").unwrap(),
            vec!["sbin_daily", "tcs_daily"]
        );
    }

    #[test]
    fn missing_table_is_not_found() {
        let store = MemoryTableStore::new();
        assert!(matches!(store.read_table("nope"), Err(StoreError::NotFound(_))));
    }
}
