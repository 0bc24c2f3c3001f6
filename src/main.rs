//! Wattwitness CLI
//!
//! Runs the occupancy detection pipeline over raw household electricity
//! and occupancy files and prints per-k accuracy and confusion matrices.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wattwitness::{
    align::{align, OccupancyTable},
    config::PipelineConfig,
    core::WindowPlan,
    dataset::{build_dataset, FEATURE_NAMES},
    eval::evaluate,
    loader::{load_occupancy_csv, load_phase_dir},
    series::Channel,
    VERSION,
};

#[derive(Parser)]
#[command(name = "wattwitness")]
#[command(version = VERSION)]
#[command(about = "Occupancy detection from household electricity traces", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and print evaluation results
    Run {
        /// Summer-season occupancy CSV
        #[arg(long)]
        occupancy_summer: PathBuf,

        /// Winter-season occupancy CSV
        #[arg(long)]
        occupancy_winter: PathBuf,

        /// Directory of per-day files for phase 1
        #[arg(long)]
        phase1_dir: PathBuf,

        /// Directory of per-day files for phase 2
        #[arg(long)]
        phase2_dir: PathBuf,

        /// Directory of per-day files for phase 3
        #[arg(long)]
        phase3_dir: PathBuf,

        /// Pipeline configuration file (JSON); defaults are used if absent
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Write the normalized dataset as JSON for inspection
        #[arg(long)]
        dataset_out: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Pipeline configuration file (JSON)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            occupancy_summer,
            occupancy_winter,
            phase1_dir,
            phase2_dir,
            phase3_dir,
            config,
            dataset_out,
        } => cmd_run(
            &occupancy_summer,
            &occupancy_winter,
            [&phase1_dir, &phase2_dir, &phase3_dir],
            config.as_deref(),
            dataset_out.as_deref(),
        ),
        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn cmd_run(
    occupancy_summer: &std::path::Path,
    occupancy_winter: &std::path::Path,
    phase_dirs: [&std::path::Path; 3],
    config_path: Option<&std::path::Path>,
    dataset_out: Option<&std::path::Path>,
) -> Result<()> {
    let config = load_config(config_path)?;

    let summer = load_occupancy_csv(occupancy_summer)?;
    let winter = load_occupancy_csv(occupancy_winter)?;
    let occupancy = OccupancyTable::merge(summer, winter)
        .context("merging seasonal occupancy tables")?;

    let mut phases = Vec::with_capacity(3);
    for (dir, channel) in phase_dirs.into_iter().zip(Channel::POWER_PHASES) {
        phases.push(load_phase_dir(dir, channel)?);
    }

    let days = align(
        &occupancy,
        [&phases[0], &phases[1], &phases[2]],
        config.active_window,
    )
    .context("aligning occupancy and power tables")?;
    if days.is_empty() {
        bail!("no day carries both occupancy and all three power phases");
    }

    let plan = WindowPlan::new(config.active_window, config.window_length_secs)
        .context("building window plan")?;
    let dataset = build_dataset(&days, &plan);
    if dataset.is_empty() {
        bail!("no window survived complete-case filtering");
    }

    println!(
        "dataset: {} rows over {} days ({} occupied, {} absent)",
        dataset.len(),
        days.len(),
        dataset.label_count(1),
        dataset.label_count(0),
    );

    let report = evaluate(&dataset, &config).context("evaluating classifier")?;
    println!(
        "split: {} train / {} test (seed {})",
        report.train_size, report.test_size, config.random_seed
    );

    let degenerate = report.stats.degenerate_columns();
    if !degenerate.is_empty() {
        println!("degenerate feature columns: {}", degenerate.join(", "));
    }

    for evaluation in &report.evaluations {
        println!();
        println!("k = {:<3} accuracy = {:.4}", evaluation.k, evaluation.accuracy);
        println!("{}", evaluation.confusion);
    }

    for (k, error) in &report.rejected {
        println!();
        println!("k = {k:<3} skipped: {error}");
    }

    if let Some(path) = dataset_out {
        let json = serde_json::to_string_pretty(&report.normalized)
            .context("serializing normalized dataset")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing dataset to {}", path.display()))?;
        println!();
        println!("normalized dataset written to {}", path.display());
    }

    Ok(())
}

fn cmd_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!();
    println!("feature columns: {}", FEATURE_NAMES.join(", "));
    Ok(())
}
