//! Series construction: resolved entries → ordered, complete daily series.

pub mod builder;

pub use builder::*;
