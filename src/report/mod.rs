//! Reporting: run bookkeeping, rankings and terminal text.
//!
//! - skip tallies and the run report (`run`)
//! - overview, rankings, sector and monthly aggregates (`rank`)
//! - plain-text rendering (`format`)

pub mod format;
pub mod rank;
pub mod run;

pub use format::*;
pub use rank::*;
pub use run::*;
