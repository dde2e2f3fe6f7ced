//! Field resolution: arbitrary key/value records to canonical OHLCV entries.
//!
//! - ordered alias tables per canonical field (`aliases`)
//! - the resolver itself, including the symbol fallback scan (`resolver`)

pub mod aliases;
pub mod resolver;

pub use aliases::*;
pub use resolver::*;
