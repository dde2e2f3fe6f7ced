//! Run configuration.
//!
//! Command-line values win; unset paths fall back to environment variables,
//! which may come from a `.env` file.

use std::path::PathBuf;

use crate::cli::PipelineArgs;
use crate::error::AppError;
use crate::store::DEFAULT_DAILY_SUFFIX;

pub const ENV_DATA_ROOT: &str = "STOCK_DATA_ROOT";
pub const ENV_STORE_DIR: &str = "STOCK_STORE_DIR";
pub const ENV_SECTORS_CSV: &str = "STOCK_SECTORS_CSV";

const DEFAULT_STORE_DIR: &str = "store";

/// Validated settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_dir: Option<PathBuf>,
    pub store_dir: PathBuf,
    pub sectors_csv: Option<PathBuf>,
    pub table_suffix: String,
    pub top_n: usize,
    pub curve_top: usize,
    pub monthly_top: usize,
    /// Uppercased, deduplicated, in the order given.
    pub correlate: Vec<String>,
}

impl PipelineConfig {
    /// Build from CLI args, loading `.env` and reading the process environment.
    pub fn from_args(args: &PipelineArgs) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_args_with_env(args, |key| std::env::var(key).ok())
    }

    /// Build from CLI args with an explicit environment lookup.
    pub fn from_args_with_env(
        args: &PipelineArgs,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let env_path = |key: &str| env(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

        let table_suffix = args
            .suffix
            .clone()
            .unwrap_or_else(|| DEFAULT_DAILY_SUFFIX.to_string());
        if table_suffix.is_empty() || table_suffix.contains(['/', '\\']) {
            return Err(AppError::new(2, format!("Invalid table suffix '{table_suffix}'")));
        }
        if args.top == 0 || args.curve_top == 0 || args.monthly_top == 0 {
            return Err(AppError::new(2, "--top, --curve-top and --monthly-top must be at least 1"));
        }

        let mut correlate: Vec<String> = Vec::new();
        for sym in &args.correlate {
            let sym = sym.trim().to_uppercase();
            if !sym.is_empty() && !correlate.contains(&sym) {
                correlate.push(sym);
            }
        }

        Ok(Self {
            input_dir: args.input.clone().or_else(|| env_path(ENV_DATA_ROOT)),
            store_dir: args
                .store
                .clone()
                .or_else(|| env_path(ENV_STORE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR)),
            sectors_csv: args.sectors.clone().or_else(|| env_path(ENV_SECTORS_CSV)),
            table_suffix,
            top_n: args.top,
            curve_top: args.curve_top,
            monthly_top: args.monthly_top,
            correlate,
        })
    }

    /// Input directory, required by the ingest stage.
    pub fn require_input_dir(&self) -> Result<&PathBuf, AppError> {
        self.input_dir.as_ref().ok_or_else(|| {
            AppError::new(
                2,
                format!("No input directory: pass --input or set {ENV_DATA_ROOT}"),
            )
        })
    }
}
