use std::io::Write;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::error::GridError;
use crate::grid::{Grid, Step};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
	pub grid_size: usize,
	pub iterations: usize,
	pub seed: Option<u64>,
}

impl Default for SimulationConfig {
	fn default() -> SimulationConfig {
		SimulationConfig {
			grid_size: 6,
			iterations: 20,
			seed: None,
		}
	}
}

impl SimulationConfig {
	pub fn num_cells(&self) -> usize {
		self.grid_size * self.grid_size
	}

	/// Seeded when a seed is configured, otherwise drawn from OS entropy.
	pub fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
	/// First percolating step, counted from 1.
	Percolated { step: usize, opened: usize, total: usize, fraction: f64 },
	NotPercolated { steps: usize, opened: usize, total: usize },
}

impl Outcome {
	pub fn percolated(&self) -> bool {
		match self {
			Outcome::Percolated { .. } => true,
			Outcome::NotPercolated { .. } => false,
		}
	}
}

/// Receives the grid once per step, after the opened cell has been wired in.
pub trait StepObserver {
	fn on_step(&mut self, step_number: usize, step: &Step, grid: &Grid);
}

impl StepObserver for () {
	fn on_step(&mut self, _step_number: usize, _step: &Step, _grid: &Grid) {}
}

impl<F: FnMut(usize, &Step, &Grid)> StepObserver for F {
	fn on_step(&mut self, step_number: usize, step: &Step, grid: &Grid) {
		self(step_number, step, grid)
	}
}

/// Writes one JSON heat-map record per step. A failed write disables the
/// observer instead of aborting the run.
pub struct JsonSnapshots<W: Write> {
	out: W,
	failed: bool,
}

impl<W: Write> JsonSnapshots<W> {
	pub fn new(out: W) -> JsonSnapshots<W> {
		JsonSnapshots { out, failed: false }
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

impl<W: Write> StepObserver for JsonSnapshots<W> {
	fn on_step(&mut self, step_number: usize, step: &Step, grid: &Grid) {
		if self.failed {
			return;
		}
		let record = json!({
			"step": step_number,
			"row": step.cell.row,
			"col": step.cell.col,
			"open": grid.open_count(),
			"fraction": grid.open_fraction(),
			"percolates": step.percolates,
			"closed": grid.closed_matrix(),
		});
		if let Err(e) = writeln!(self.out, "{}", record) {
			warn!("snapshot output failed, no further snapshots: {}", e);
			self.failed = true;
		}
	}
}

/// Logs the text heat map at debug level.
pub struct TextHeatMap;

impl StepObserver for TextHeatMap {
	fn on_step(&mut self, step_number: usize, _step: &Step, grid: &Grid) {
		debug!("step {}:\n{}", step_number, grid.render());
	}
}

pub struct Simulation<R: Rng> {
	grid: Grid,
	rng: R,
	steps: usize,
	percolated_at: Option<usize>,
}

impl<R: Rng> Simulation<R> {
	pub fn new(grid_size: usize, rng: R) -> Simulation<R> {
		Simulation {
			grid: Grid::new(grid_size),
			rng,
			steps: 0,
			percolated_at: None,
		}
	}

	pub fn grid(&self) -> &Grid {
		&self.grid
	}

	pub fn steps(&self) -> usize {
		self.steps
	}

	/// Step at which percolation was first seen; stays set once reached.
	pub fn percolated_at(&self) -> Option<usize> {
		self.percolated_at
	}

	pub fn step(&mut self) -> Result<Step, GridError> {
		let step = self.grid.step(&mut self.rng)?;
		self.steps += 1;
		if step.percolates && self.percolated_at.is_none() {
			self.percolated_at = Some(self.steps);
		}
		Ok(step)
	}

	/// Runs at most `iterations` steps, stopping at the first percolating one.
	pub fn run<O: StepObserver>(&mut self, iterations: usize, observer: &mut O) -> Result<Outcome, GridError> {
		let total = self.grid.num_cells();
		for _ in 0..iterations {
			let step = self.step()?;
			observer.on_step(self.steps, &step, &self.grid);
			if step.percolates {
				let opened = self.grid.open_count();
				return Ok(Outcome::Percolated {
					step: self.steps,
					opened,
					total,
					fraction: self.grid.open_fraction(),
				});
			}
		}
		Ok(Outcome::NotPercolated {
			steps: self.steps,
			opened: self.grid.open_count(),
			total,
		})
	}
}

pub fn run_percolation<O: StepObserver>(config: &SimulationConfig, observer: &mut O) -> Result<Outcome, GridError> {
	info!("grid {}x{}, up to {} steps, seed {:?}",
		config.grid_size, config.grid_size, config.iterations, config.seed);
	let mut sim = Simulation::new(config.grid_size, config.rng());
	let outcome = sim.run(config.iterations, observer)?;
	match outcome {
		Outcome::Percolated { step, fraction, .. } =>
			info!("percolated at step {} with {:.4} of cells open", step, fraction),
		Outcome::NotPercolated { steps, .. } =>
			info!("no percolation within {} steps", steps),
	}
	Ok(outcome)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdEstimate {
	pub trials: usize,
	pub mean: f64,
	pub stddev: f64,
}

/// Monte Carlo estimate of the open fraction at first percolation. Each
/// trial opens cells until it percolates; trial seeds come from the
/// configured seed.
///
/// # Panics
///
/// Panics if `trials` is zero.
pub fn estimate_threshold(config: &SimulationConfig, trials: usize) -> Result<ThresholdEstimate, GridError> {
	assert!(trials > 0, "at least one trial is required");
	let mut seeds = config.rng();
	let mut fractions = Vec::with_capacity(trials);
	for trial in 0..trials {
		let mut sim = Simulation::new(config.grid_size, StdRng::seed_from_u64(seeds.gen()));
		match sim.run(config.num_cells(), &mut ())? {
			Outcome::Percolated { fraction, .. } => {
				debug!("trial {}: {:.4}", trial, fraction);
				fractions.push(fraction);
			}
			Outcome::NotPercolated { .. } => warn!("trial {} opened every cell without percolating", trial),
		}
	}

	let n = fractions.len() as f64;
	let mean = fractions.iter().sum::<f64>() / n;
	let stddev = if fractions.len() > 1 {
		(fractions.iter().map(|f| (f - mean) * (f - mean)).sum::<f64>() / (n - 1.0)).sqrt()
	} else {
		0.0
	};
	info!("{} trials on {}x{}: mean {:.4}, stddev {:.4}",
		fractions.len(), config.grid_size, config.grid_size, mean, stddev);
	Ok(ThresholdEstimate { trials: fractions.len(), mean, stddev })
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::Value;
	use std::io;

	struct Broken {
		attempts: usize,
	}

	impl Write for Broken {
		fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
			self.attempts += 1;
			Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	fn seeded(grid_size: usize, iterations: usize, seed: u64) -> SimulationConfig {
		SimulationConfig { grid_size, iterations, seed: Some(seed) }
	}

	#[test]
	fn bound_too_small_reports_no_percolation() {
		// a 10x10 grid needs at least 10 open cells to span
		let outcome = run_percolation(&seeded(10, 5, 1), &mut ()).unwrap();
		assert_eq!(outcome, Outcome::NotPercolated { steps: 5, opened: 5, total: 100 });
		assert!(!outcome.percolated());
	}

	#[test]
	fn unbounded_run_always_percolates() {
		for seed in 0..20 {
			let outcome = run_percolation(&seeded(5, 25, seed), &mut ()).unwrap();
			match outcome {
				Outcome::Percolated { step, opened, total, fraction } => {
					assert_eq!(step, opened);
					assert_eq!(total, 25);
					assert!(opened >= 5);
					assert_eq!(fraction, opened as f64 / 25.0);
				}
				other => panic!("seed {} did not percolate: {:?}", seed, other),
			}
		}
	}

	#[test]
	fn single_cell_grid_percolates_on_first_step() {
		let outcome = run_percolation(&seeded(1, 3, 9), &mut ()).unwrap();
		assert_eq!(outcome, Outcome::Percolated { step: 1, opened: 1, total: 1, fraction: 1.0 });
	}

	#[test]
	fn same_seed_same_outcome() {
		let config = seeded(8, 64, 1234);
		assert_eq!(run_percolation(&config, &mut ()).unwrap(), run_percolation(&config, &mut ()).unwrap());
	}

	#[test]
	fn observer_sees_every_step() {
		let mut seen = Vec::new();
		let mut record = |n: usize, step: &Step, grid: &Grid| {
			assert!(grid.is_open(step.cell));
			seen.push((n, grid.open_count(), step.percolates));
		};
		let outcome = run_percolation(&seeded(4, 16, 3), &mut record).unwrap();
		let steps = match outcome {
			Outcome::Percolated { step, .. } => step,
			Outcome::NotPercolated { steps, .. } => steps,
		};
		assert_eq!(seen.len(), steps);
		for (i, &(n, open, percolates)) in seen.iter().enumerate() {
			assert_eq!(n, i + 1);
			assert_eq!(open, i + 1);
			assert_eq!(percolates, i + 1 == steps && outcome.percolated());
		}
	}

	#[test]
	fn percolation_is_sticky() {
		let mut sim = Simulation::new(3, StdRng::seed_from_u64(5));
		while sim.percolated_at().is_none() {
			sim.step().unwrap();
		}
		let first = sim.percolated_at();
		while sim.grid().closed_count() > 0 {
			assert!(sim.step().unwrap().percolates);
		}
		assert_eq!(sim.percolated_at(), first);
		assert_eq!(sim.step(), Err(GridError::NoClosedCells));
	}

	#[test]
	fn json_snapshots_one_line_per_step() {
		let mut snapshots = JsonSnapshots::new(Vec::new());
		let outcome = run_percolation(&seeded(3, 2, 11), &mut snapshots).unwrap();
		assert!(!outcome.percolated());
		let out = String::from_utf8(snapshots.into_inner()).unwrap();
		let records: Vec<Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
		assert_eq!(records.len(), 2);
		assert_eq!(records[1]["step"], 2);
		assert_eq!(records[1]["open"], 2);
		assert_eq!(records[1]["percolates"], false);
		let closed: u64 = records[1]["closed"].as_array().unwrap().iter()
			.flat_map(|row| row.as_array().unwrap().iter())
			.map(|v| v.as_u64().unwrap())
			.sum();
		assert_eq!(closed, 7);
	}

	#[test]
	fn failed_snapshot_write_does_not_abort_run() {
		let mut snapshots = JsonSnapshots::new(Broken { attempts: 0 });
		let outcome = run_percolation(&seeded(10, 5, 4), &mut snapshots);
		assert_eq!(outcome, Ok(Outcome::NotPercolated { steps: 5, opened: 5, total: 100 }));
		assert!(snapshots.failed);
		// later steps never touch the writer again
		assert_eq!(snapshots.into_inner().attempts, 1);
	}

	#[test]
	#[should_panic(expected = "at least one trial")]
	fn zero_trials_is_fatal() {
		let _ = estimate_threshold(&seeded(4, 0, 1), 0);
	}

	#[test]
	fn threshold_estimate_is_plausible() {
		let estimate = estimate_threshold(&seeded(8, 0, 77), 20).unwrap();
		assert_eq!(estimate.trials, 20);
		assert!(estimate.mean > 0.3 && estimate.mean < 0.9, "mean {}", estimate.mean);
		assert!(estimate.stddev > 0.0);
	}
}
