//! Accepted source keys per canonical field.
//!
//! The first entry of every list is the canonical key itself; the rest are
//! aliases seen in real exports, in priority order. Lookups are case-sensitive.

use crate::domain::Field;

pub const SYMBOL_KEYS: &[&str] = &["symbol", "tradingsymbol", "Symbol", "ticker"];
pub const DATE_KEYS: &[&str] = &["date", "Date"];
pub const OPEN_KEYS: &[&str] = &["open", "Open"];
pub const HIGH_KEYS: &[&str] = &["high", "High"];
pub const LOW_KEYS: &[&str] = &["low", "Low"];
pub const CLOSE_KEYS: &[&str] = &["close", "Close"];
pub const VOLUME_KEYS: &[&str] = &["volume", "Volume"];

/// Ordered key lists for every canonical field.
#[derive(Debug, Clone)]
pub struct AliasTable {
    symbol: Vec<String>,
    date: Vec<String>,
    open: Vec<String>,
    high: Vec<String>,
    low: Vec<String>,
    close: Vec<String>,
    volume: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        fn owned(keys: &[&str]) -> Vec<String> {
            keys.iter().map(|k| k.to_string()).collect()
        }
        Self {
            symbol: owned(SYMBOL_KEYS),
            date: owned(DATE_KEYS),
            open: owned(OPEN_KEYS),
            high: owned(HIGH_KEYS),
            low: owned(LOW_KEYS),
            close: owned(CLOSE_KEYS),
            volume: owned(VOLUME_KEYS),
        }
    }
}

impl AliasTable {
    pub fn keys(&self, field: Field) -> &[String] {
        match field {
            Field::Symbol => &self.symbol,
            Field::Date => &self.date,
            Field::Open => &self.open,
            Field::High => &self.high,
            Field::Low => &self.low,
            Field::Close => &self.close,
            Field::Volume => &self.volume,
        }
    }

    /// Append an extra alias at the lowest priority. Duplicates are ignored.
    pub fn with_alias(mut self, field: Field, key: impl Into<String>) -> Self {
        let key = key.into();
        let keys = match field {
            Field::Symbol => &mut self.symbol,
            Field::Date => &mut self.date,
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
            Field::Volume => &mut self.volume,
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
        self
    }
}
