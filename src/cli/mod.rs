//! Command-line parsing for the stock metrics pipeline.
//!
//! Parsing only; `app` turns these arguments into a `PipelineConfig` and
//! dispatches.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "stm", version, about = "Stock price normalization and performance metrics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read raw documents, build daily series and write one daily table per symbol.
    Ingest(PipelineArgs),
    /// Read daily tables back from the store, compute metrics and print reports.
    Analyze(PipelineArgs),
    /// Ingest then analyze in one pass.
    Run(PipelineArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone, Default)]
pub struct PipelineArgs {
    /// Directory of raw JSON/CSV documents (falls back to `STOCK_DATA_ROOT`).
    #[arg(short = 'i', long, value_name = "DIR")]
    pub input: Option<PathBuf>,

    /// Table store directory (falls back to `STOCK_STORE_DIR`, then `./store`).
    #[arg(short = 's', long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Sector mapping CSV with `Symbol` and `sector` columns (falls back to `STOCK_SECTORS_CSV`).
    #[arg(long, value_name = "CSV")]
    pub sectors: Option<PathBuf>,

    /// Suffix of per-symbol daily tables.
    #[arg(long)]
    pub suffix: Option<String>,

    /// Rows shown in gainer/loser/volatility rankings.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub top: usize,

    /// Symbols whose cumulative curves (and default correlation set) are computed.
    #[arg(long, default_value_t = 5)]
    pub curve_top: usize,

    /// Gainers and losers shown per month.
    #[arg(long, default_value_t = 5)]
    pub monthly_top: usize,

    /// Comma-separated symbols to correlate (default: top `--curve-top` by yearly return).
    #[arg(long, value_delimiter = ',', value_name = "SYMBOLS")]
    pub correlate: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_symbol_list() {
        let cli = Cli::parse_from([
            "stm", "run", "-i", "data", "--correlate", "sbin,TCS", "-n", "3",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.input, Some(PathBuf::from("data")));
        assert_eq!(args.correlate, vec!["sbin", "TCS"]);
        assert_eq!(args.top, 3);
        assert_eq!(args.curve_top, 5);
        assert_eq!(args.suffix, None);
    }
}
