//! Table store: named tabular datasets shared between pipeline stages.
//!
//! - `port`: the `TableStore` capability and table naming
//! - `table`: `Table` / `Cell`
//! - `memory`: concurrent in-process store
//! - `csv_dir`: one CSV file per table in a directory
//! - `convert`: domain values ↔ tables

pub mod convert;
pub mod csv_dir;
pub mod memory;
pub mod port;
pub mod table;

pub use convert::*;
pub use csv_dir::*;
pub use memory::*;
pub use port::*;
pub use table::*;
