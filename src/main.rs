#[macro_use] extern crate log;
extern crate simplelog;
extern crate percolation;

use anyhow::{Context, Result};
use clap::Parser;
use simplelog::*;
use std::io;

use percolation::{Grid, JsonSnapshots, Outcome, SimulationConfig, Step, StepObserver, TextHeatMap};

fn parse_positive(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("Invalid number: {e}"))?;
    if n == 0 {
        return Err("Value must be at least 1".to_string());
    }
    Ok(n)
}

/// Site percolation on a square grid
///
/// Opens random cells until the open cells connect the top row to the bottom row
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Side length of the square grid
    #[clap(short = 'n', long = "grid-size", default_value = "6", value_parser = parse_positive)]
    grid_size: usize,

    /// Maximum number of cells to open
    #[clap(short = 'i', long = "iterations", default_value = "20")]
    iterations: usize,

    /// Seed for the random source (entropy when omitted)
    #[clap(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Number of independent runs; more than one estimates the threshold
    #[clap(short = 't', long = "trials", default_value = "1", value_parser = parse_positive)]
    trials: usize,

    /// Write one JSON heat-map record per step to stdout
    #[clap(long = "snapshots")]
    snapshots: bool,

    /// Debug logging, including a text heat map per step
    #[clap(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let log_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    CombinedLogger::init(vec![
        TermLogger::new(level, log_config, TerminalMode::Stderr, ColorChoice::Auto),
    ]).context("failed to initialise logging")?;

    let config = SimulationConfig {
        grid_size: args.grid_size,
        iterations: args.iterations,
        seed: args.seed,
    };

    if args.trials > 1 {
        if args.snapshots {
            warn!("--snapshots is ignored when running several trials");
        }
        let estimate = percolation::estimate_threshold(&config, args.trials)
            .context("threshold estimation failed")?;
        println!("estimated threshold over {} trials: {:.4} (stddev {:.4})",
            estimate.trials, estimate.mean, estimate.stddev);
        return Ok(());
    }

    let mut snapshots = if args.snapshots { Some(JsonSnapshots::new(io::stdout())) } else { None };
    let mut heat_map = TextHeatMap;
    let mut observer = |n: usize, step: &Step, grid: &Grid| {
        heat_map.on_step(n, step, grid);
        if let Some(s) = snapshots.as_mut() {
            s.on_step(n, step, grid);
        }
    };

    let outcome = percolation::run_percolation(&config, &mut observer)
        .context("simulation failed")?;
    match outcome {
        Outcome::Percolated { step, opened, total, fraction } => println!(
            "percolated when {:.4} of total cells were open ({} of {}, step {})",
            fraction, opened, total, step),
        Outcome::NotPercolated { steps, opened, total } => println!(
            "did not percolate within {} steps ({} of {} cells open)",
            steps, opened, total),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_grid_size_and_trials_are_rejected() {
        assert!(Args::try_parse_from(["percolation", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["percolation", "--trials", "0"]).is_err());
        assert!(Args::try_parse_from(["percolation", "-n", "abc"]).is_err());
    }

    #[test]
    fn positive_values_parse() {
        let args = Args::try_parse_from(["percolation", "-n", "8", "-t", "3", "-s", "42"]).unwrap();
        assert_eq!(args.grid_size, 8);
        assert_eq!(args.trials, 3);
        assert_eq!(args.seed, Some(42));
        assert_eq!(parse_positive("1"), Ok(1));
        assert!(parse_positive("0").is_err());
    }
}
