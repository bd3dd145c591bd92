#[macro_use] extern crate log;
extern crate rand;
extern crate serde_json;
extern crate pathfinding;

mod data;
mod error;
mod grid;
mod simulation;
mod union_find;

pub use data::{Cell, CellState, Direction};
pub use error::GridError;
pub use grid::{Grid, Step};
pub use simulation::{Simulation, SimulationConfig, Outcome, StepObserver, JsonSnapshots, TextHeatMap,
	ThresholdEstimate, run_percolation, estimate_threshold};
pub use union_find::QuickUnion;
