//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loosely-typed input records (`RawRecord`, `RawValue`)
//! - resolved and built price data (`CanonicalEntry`, `DailyBar`, `SymbolSeries`)
//! - metric outputs (`SummaryRow`, `MonthlyReturn`, `CumulativePoint`, `CorrelationMatrix`)

pub mod types;

pub use types::*;
