//! Input adapters.
//!
//! - raw document reading (`documents`)
//! - sector mapping CSV (`sectors`)

pub mod documents;
pub mod sectors;

pub use documents::*;
pub use sectors::*;
