//! Derived metrics over built series.
//!
//! - yearly return / volatility / volume summary (`summary`)
//! - intramonth returns by calendar month (`monthly`)
//! - compounded growth curves (`cumulative`)
//! - pairwise return correlation (`correlation`)
//!
//! Every calculator is a pure function of its input series.

pub mod correlation;
pub mod cumulative;
pub mod monthly;
pub mod returns;
pub mod summary;

pub use correlation::*;
pub use cumulative::*;
pub use monthly::*;
pub use returns::*;
pub use summary::*;
