//! Command-line parsing for the surface temperature pipeline.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the retrieval/persistence code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "pst",
    version,
    about = "Polar surface temperature retrieval with Monte Carlo uncertainty"
)]
pub struct Cli {
    /// Show progress diagnostics.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Show debug diagnostics (implies --verbose).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Retrieve a scene, perturb every valid pixel, and persist the results.
    Run(RunArgs),
    /// Print per-algorithm delta statistics from a result database.
    Stats(StatsArgs),
}

/// Options for a retrieval + perturbation run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Satellite id; must be present in both calibration tables.
    #[arg(short = 's', long)]
    pub satellite: String,

    /// Calibration coefficient table file.
    #[arg(long, value_name = "FILE")]
    pub coefficients: PathBuf,

    /// Instrument noise (NEdT) table file.
    #[arg(long, value_name = "FILE")]
    pub sigmas: PathBuf,

    /// Result database (falls back to the POLARST_DATABASE environment variable).
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Synthetic scene rows.
    #[arg(long, default_value_t = 64)]
    pub rows: usize,

    /// Synthetic scene columns.
    #[arg(long, default_value_t = 64)]
    pub cols: usize,

    /// Monte Carlo draws per pixel.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub perturbations: usize,

    /// Base random seed; per-pixel seeds derive from this and grid position.
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
}

/// Options for the aggregation report.
#[derive(Debug, Parser, Clone)]
pub struct StatsArgs {
    /// Result database (falls back to the POLARST_DATABASE environment variable).
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Satellite label for the report header; defaults to the database file stem.
    #[arg(short = 's', long)]
    pub satellite: Option<String>,

    /// Include only latitudes greater than or equal to this.
    #[arg(long, value_name = "DEG")]
    pub lat_gt: Option<f64>,

    /// Include only latitudes less than this.
    #[arg(long, value_name = "DEG")]
    pub lat_lt: Option<f64>,

    /// Include only rows where |sun zenith - sat zenith| is at most this.
    #[arg(long, value_name = "DEG")]
    pub angle_difference_limit: Option<f64>,

    /// Restrict the report to one algorithm (e.g. `ist`, `sst_day`).
    #[arg(long, value_name = "NAME")]
    pub algorithm: Option<String>,

    /// Write the `.stat` table to this file (always printed to stdout too).
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON stats export to this file.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}
