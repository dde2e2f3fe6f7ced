//! Table store capability and the table naming contract.
//!
//! Pipeline stages never hold a store themselves: whichever stage needs to read
//! or write a named dataset receives a `&dyn TableStore`.

use crate::error::StoreError;
use crate::store::table::Table;

/// Suffix appended to per-symbol daily tables (`sbin` → `sbin_daily`).
pub const DEFAULT_DAILY_SUFFIX: &str = "_daily";

pub const SUMMARY_TABLE: &str = "stock_performance_summary";
pub const SECTORS_TABLE: &str = "stock_sectors";
pub const MONTHLY_TABLE: &str = "monthly_performance";
pub const CORRELATION_TABLE: &str = "correlation_matrix";
pub const CUMULATIVE_TABLE: &str = "cumulative_returns";

/// Storage for named tabular datasets.
///
/// Writes replace any existing table of the same name.
pub trait TableStore: Send + Sync {
    fn write_table(&self, name: &str, table: &Table) -> Result<(), StoreError>;

    fn read_table(&self, name: &str) -> Result<Table, StoreError>;

    /// All table names, sorted.
    fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    /// Sorted names of tables ending in `suffix`.
    fn tables_with_suffix(&self, suffix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .list_tables()?
            .into_iter()
            .filter(|name| name.len() > suffix.len() && name.ends_with(suffix))
            .collect())
    }
}

/// Daily table name for a symbol: lowercase, `-` → `_`, plus `suffix`.
pub fn table_name(symbol: &str, suffix: &str) -> String {
    format!("{}{suffix}", symbol.to_lowercase().replace('-', "_"))
}

/// Symbol for a daily table name: suffix stripped, uppercased.
///
/// This inverts `table_name` for symbols without `-`.
pub fn symbol_from_table(name: &str, suffix: &str) -> Option<String> {
    name.strip_suffix(suffix)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
}
