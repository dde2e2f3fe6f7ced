//! Top-level application orchestration.
//!
//! `src/main.rs` only maps errors to exit codes; this module:
//! - parses CLI arguments into a `PipelineConfig`
//! - opens the table store
//! - runs the ingest and/or analyze stages
//! - prints reports to stdout

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, PipelineArgs};
use crate::config::PipelineConfig;
use crate::error::AppError;
use crate::io::{SectorMap, read_sector_csv};
use crate::report::{
    RunReport, format_correlation, format_cumulative, format_monthly_leaders, format_overview, format_rankings,
    format_run_report, format_sector_performance, market_overview, monthly_leaders, rank_summaries,
    sector_performance,
};
use crate::resolve::FieldResolver;
use crate::store::CsvTableStore;

pub mod pipeline;

use pipeline::AnalysisOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stages {
    Ingest,
    Analyze,
    Both,
}

/// Entry point for the `stm` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Ingest(args) => handle(&args, Stages::Ingest),
        Command::Analyze(args) => handle(&args, Stages::Analyze),
        Command::Run(args) => handle(&args, Stages::Both),
    }
}

fn handle(args: &PipelineArgs, stages: Stages) -> Result<(), AppError> {
    let config = PipelineConfig::from_args(args)?;
    let store = CsvTableStore::open(&config.store_dir)?;
    info!(store = %store.dir().display(), "table store opened");

    let mut report = RunReport::default();

    let series = match stages {
        Stages::Ingest | Stages::Both => {
            let input = config.require_input_dir()?;
            let series = pipeline::ingest_documents(input, &FieldResolver::default(), &mut report)?;
            pipeline::persist_series(&store, &series, &config.table_suffix, &mut report);
            series
        }
        Stages::Analyze => pipeline::load_series(&store, &config.table_suffix, &mut report)?,
    };

    if stages != Stages::Ingest {
        let sectors = load_sectors(&config)?;
        let output = pipeline::analyze(&series, sectors, &config, &mut report)?;
        pipeline::persist_analysis(&store, &output)?;
        print_analysis(&output, &config);
    }

    println!("{}", format_run_report(&report));
    Ok(())
}

fn load_sectors(config: &PipelineConfig) -> Result<Option<SectorMap>, AppError> {
    let Some(path) = &config.sectors_csv else {
        return Ok(None);
    };
    let map = read_sector_csv(path)?;
    info!(path = %path.display(), symbols = map.len(), "sector mapping loaded");
    Ok(Some(map))
}

fn print_analysis(output: &AnalysisOutput, config: &PipelineConfig) {
    let rows: Vec<_> = output.summaries.iter().map(|s| s.summary.clone()).collect();

    println!("{}", format_overview(&market_overview(&rows)));
    println!("{}", format_rankings(&rank_summaries(&rows, config.top_n)));
    if output.sectors.is_some() {
        println!("{}", format_sector_performance(&sector_performance(&output.summaries)));
    }
    println!("{}", format_monthly_leaders(&monthly_leaders(&output.monthly, config.monthly_top)));
    println!("{}", format_cumulative(&output.cumulative));
    println!("{}", format_correlation(&output.correlation));
}
