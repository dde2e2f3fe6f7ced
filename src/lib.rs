//! `stock-metrics` library crate.
//!
//! Normalizes loosely-structured daily stock records into per-symbol price
//! series and derives performance metrics from them. The binary (`stm`) is a
//! thin wrapper so every stage stays testable without spawning processes.

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod resolve;
pub mod series;
pub mod store;
