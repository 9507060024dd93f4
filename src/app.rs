//! Application entry: CLI parsing, tracing setup, command dispatch.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::calib::{CoefficientSet, NoiseSigmaSet};
use crate::cli::{Cli, Command, RunArgs, StatsArgs};
use crate::data::generate_scene;
use crate::domain::{Algorithm, RunConfig};
use crate::error::AppError;
use crate::io::export::{write_stats_json, write_stats_table};
use crate::report::algorithm_stats;
use crate::report::format::{format_run_summary, format_stats_table};
use crate::store::{QueryFilter, ResultStore};

pub mod pipeline;

/// Parse the CLI, set up diagnostics, and run the selected command.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Command::Run(args) => handle_run(args),
        Command::Stats(args) => handle_stats(args),
    }
}

/// `RUST_LOG` wins; otherwise the -v/-d flags pick the level.
fn init_tracing(cli: &Cli) {
    let fallback = if cli.debug {
        "polar_st=debug"
    } else if cli.verbose {
        "polar_st=info"
    } else {
        "polar_st=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let database_path = resolve_database(args.database.clone())?;

    let coeff = CoefficientSet::load(&args.coefficients, &args.satellite)?;
    let sigmas = NoiseSigmaSet::load(&args.sigmas, &args.satellite)?;

    let config = RunConfig {
        satellite: args.satellite.clone(),
        coefficients_path: args.coefficients.clone(),
        sigmas_path: args.sigmas.clone(),
        database_path: database_path.clone(),
        rows: args.rows,
        cols: args.cols,
        perturbations: args.perturbations,
        seed: args.seed,
    };

    info!(
        satellite = %config.satellite,
        rows = config.rows,
        cols = config.cols,
        perturbations = config.perturbations,
        seed = config.seed,
        "run starting"
    );

    let grid = generate_scene(&config.satellite, config.rows, config.cols, config.seed)?;
    let mut store = ResultStore::open(&database_path)?;
    let output = pipeline::run_grid(&config, &grid, &coeff, &sigmas, &mut store)?;

    print!("{}", format_run_summary(&config.satellite, &output));
    Ok(())
}

fn handle_stats(args: &StatsArgs) -> Result<(), AppError> {
    let database_path = resolve_database(args.database.clone())?;
    if !database_path.is_file() {
        return Err(AppError::input(format!(
            "Result database '{}' does not exist.",
            database_path.display()
        )));
    }

    let satellite = match &args.satellite {
        Some(s) => s.clone(),
        None => database_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string()),
    };

    let filter = stats_filter(args)?;
    let store = ResultStore::open(&database_path)?;
    let stats = algorithm_stats(&store, &filter)?;

    let table = format_stats_table(&satellite, &stats);
    print!("{table}");

    if let Some(path) = &args.output {
        write_stats_table(path, &satellite, &stats)?;
        info!(path = %path.display(), "stat table written");
    }
    if let Some(path) = &args.json {
        write_stats_json(path, &satellite, &stats)?;
        info!(path = %path.display(), "stats JSON written");
    }
    Ok(())
}

fn stats_filter(args: &StatsArgs) -> Result<QueryFilter, AppError> {
    let lat_range = match (args.lat_gt, args.lat_lt) {
        (None, None) => None,
        (gt, lt) => Some((
            gt.unwrap_or(f64::NEG_INFINITY),
            lt.unwrap_or(f64::INFINITY),
        )),
    };
    let algorithm = args
        .algorithm
        .as_deref()
        .map(Algorithm::parse)
        .transpose()?;
    Ok(QueryFilter {
        lat_range,
        angle_difference_limit: args.angle_difference_limit,
        algorithm,
        temperature_range: None,
    })
}

/// The --database flag wins over the POLARST_DATABASE environment variable.
fn resolve_database(flag: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(path) = flag {
        return Ok(path);
    }
    match std::env::var("POLARST_DATABASE") {
        Ok(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
        _ => Err(AppError::input(
            "No result database given; pass --database or set POLARST_DATABASE.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lat_bounds_default_to_open_ends() {
        let args = StatsArgs {
            database: Some(PathBuf::from("x.db")),
            satellite: None,
            lat_gt: Some(70.0),
            lat_lt: None,
            angle_difference_limit: None,
            algorithm: None,
            output: None,
            json: None,
        };
        let filter = stats_filter(&args).unwrap();
        let (low, high) = filter.lat_range.unwrap();
        assert_eq!(low, 70.0);
        assert!(high.is_infinite());
    }

    #[test]
    fn unknown_algorithm_name_is_an_input_error() {
        let args = StatsArgs {
            database: Some(PathBuf::from("x.db")),
            satellite: None,
            lat_gt: None,
            lat_lt: None,
            angle_difference_limit: None,
            algorithm: Some("sst_noon".to_string()),
            output: None,
            json: None,
        };
        let err = stats_filter(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn database_flag_wins_over_environment() {
        let path = resolve_database(Some(PathBuf::from("given.db"))).unwrap();
        assert_eq!(path, PathBuf::from("given.db"));
    }
}
