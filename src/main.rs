use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use log::{debug, error, info};
use serde::Serialize;

use faceset_extract::{
    FilterConfig, PersonCopyResult, SelectionStats, assign_demographics, filter_subjects,
    load_attributes, materialize,
};

/// Filter dataset and copy selected folders based on attributes
#[derive(Debug, Parser)]
#[command(name = "faceset-extract", version)]
struct Args {
    /// Source dataset directory path
    #[arg(short, long)]
    input_dir: PathBuf,

    /// Destination directory path
    #[arg(short, long, default_value = "./datasets/extracted_images")]
    output_dir: PathBuf,

    /// Attribute record file path
    #[arg(short = 'r', long)]
    attribute_record: PathBuf,

    /// Ethnic attribute to filter by
    #[arg(short, long = "ethnic", default_value = "Asian")]
    ethnic: String,

    /// Age attributes to filter by
    #[arg(
        short,
        long,
        num_args = 1..,
        default_values_t = ["Child".to_string(), "Youth".to_string(), "Middle Aged".to_string()]
    )]
    ages: Vec<String>,

    /// Threshold for filtering attributes (reserved)
    #[arg(short, long, default_value_t = 0.0)]
    threshold: f64,

    /// Write a JSON run report (selection statistics and copy outcomes)
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    stats: &'a SelectionStats,
    outcomes: &'a [PersonCopyResult],
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("An error occurred: {e}");
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args) -> anyhow::Result<()> {
    let data = load_attributes(&args.attribute_record)
        .with_context(|| format!("loading {}", args.attribute_record.display()))?;

    let config = FilterConfig::new(args.ethnic.clone(), args.ages.clone())
        .with_threshold(args.threshold);
    debug!("{config}");

    let data = assign_demographics(&data)?;

    info!(
        "Filtering persons: {} AND ({})",
        config.ethnicity,
        config.ages.iter().join(" OR ")
    );
    let (selected, stats) = filter_subjects(&data, &config)?;

    // Hash-set iteration order is unspecified; sort for stable logs
    let mut persons: Vec<String> = selected.into_iter().collect();
    persons.sort_unstable();

    info!("Copying selected person folders...");
    let outcomes = materialize(&args.input_dir, &args.output_dir, &persons)?;

    if let Some(path) = &args.report {
        let report = RunReport {
            stats: &stats,
            outcomes: &outcomes,
        };
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))?;
        info!("Run report written to {}", path.display());
    }

    info!("Processing completed successfully");
    Ok(())
}
