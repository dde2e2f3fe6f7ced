//! Record → `CanonicalEntry` resolution.
//!
//! Resolution is a pure function of the record and the alias table:
//! - keys are tried in alias-table order
//! - the symbol fallback scans values in record (document) order
//!
//! so re-resolving the same record always yields the same outcome.

use crate::domain::{CanonicalEntry, Field, RawRecord, RawValue, SkipReason};
use crate::resolve::aliases::AliasTable;

/// Inclusive length bounds for the uppercase-symbol fallback.
pub const FALLBACK_SYMBOL_MIN_LEN: usize = 2;
pub const FALLBACK_SYMBOL_MAX_LEN: usize = 15;

#[derive(Debug, Clone, Default)]
pub struct FieldResolver {
    aliases: AliasTable,
}

impl FieldResolver {
    pub fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    /// Resolve one record.
    ///
    /// `Err` is the "unresolvable" outcome (no symbol or no date); callers count
    /// it and move on.
    pub fn resolve(&self, record: &RawRecord) -> Result<CanonicalEntry, SkipReason> {
        let symbol = self
            .lookup_where(record, Field::Symbol, |v| v.as_text().is_some())
            .and_then(RawValue::as_text)
            .or_else(|| fallback_symbol(record))
            .ok_or(SkipReason::UnresolvedSymbol)?
            .to_string();

        let date = self
            .lookup_where(record, Field::Date, |v| {
                matches!(v, RawValue::Text(_) | RawValue::Integer(_) | RawValue::Float(_))
            })
            .cloned()
            .ok_or(SkipReason::UnresolvedDate)?;

        Ok(CanonicalEntry {
            symbol,
            date,
            open: self.lookup(record, Field::Open).cloned(),
            high: self.lookup(record, Field::High).cloned(),
            low: self.lookup(record, Field::Low).cloned(),
            close: self.lookup(record, Field::Close).cloned(),
            volume: self.lookup(record, Field::Volume).cloned(),
        })
    }

    /// First present value among the field's keys.
    fn lookup<'a>(&self, record: &'a RawRecord, field: Field) -> Option<&'a RawValue> {
        self.lookup_where(record, field, |_| true)
    }

    /// First present value among the field's keys that `accept` admits.
    ///
    /// A rejected value does not stop the scan; later keys are still tried.
    fn lookup_where<'a>(
        &self,
        record: &'a RawRecord,
        field: Field,
        accept: impl Fn(&RawValue) -> bool,
    ) -> Option<&'a RawValue> {
        self.aliases
            .keys(field)
            .iter()
            .filter_map(|key| record.get(key))
            .find(|value| value.is_present() && accept(value))
    }
}

/// First text value that looks like a ticker: 2–15 ASCII uppercase letters.
fn fallback_symbol(record: &RawRecord) -> Option<&str> {
    record.values().filter_map(RawValue::as_text).find(|s| looks_like_ticker(s))
}

fn looks_like_ticker(s: &str) -> bool {
    let len = s.chars().count();
    (FALLBACK_SYMBOL_MIN_LEN..=FALLBACK_SYMBOL_MAX_LEN).contains(&len)
        && s.chars().all(|c| c.is_ascii_uppercase())
}
