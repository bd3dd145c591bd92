use pathfinding::prelude::{bfs, Matrix};
use rand::Rng;

use crate::data::{Cell, CellState, Direction};
use crate::error::GridError;
use crate::union_find::QuickUnion;

/// Result of opening one cell and wiring it into its open neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub cell: Cell,
    pub neighbors: Vec<Cell>,
    pub percolates: bool,
}

/// A `side` x `side` grid of sites that only ever move from closed to open,
/// with open neighbors merged into a shared `QuickUnion`.
pub struct Grid {
    side: usize,
    states: Matrix<CellState>,
    closed: Vec<Cell>, // pool for random selection
    connected_cells: QuickUnion,
}

impl Grid {
    pub fn new(side: usize) -> Grid {
        assert!(side > 0, "grid side must be positive");
        let mut closed = Vec::with_capacity(side * side);
        for row in 0..side {
            for col in 0..side {
                closed.push(Cell::new(row, col));
            }
        }
        Grid {
            side,
            states: Matrix::new_square(side, CellState::Closed),
            closed,
            connected_cells: QuickUnion::new(side * side),
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    pub fn num_cells(&self) -> usize {
        self.side * self.side
    }

    pub fn connected_cells(&self) -> &QuickUnion {
        &self.connected_cells
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.side && cell.col < self.side
    }

    pub fn index_of(&self, cell: Cell) -> usize {
        assert!(self.contains(cell), "cell {} outside grid of side {}", cell, self.side);
        cell.row * self.side + cell.col
    }

    pub fn cell_at(&self, index: usize) -> Cell {
        assert!(index < self.num_cells(), "index {} outside grid of side {}", index, self.side);
        Cell::new(index / self.side, index % self.side)
    }

    pub fn state(&self, cell: Cell) -> CellState {
        self.states[(cell.row, cell.col)]
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.state(cell) == CellState::Open
    }

    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    pub fn open_count(&self) -> usize {
        self.num_cells() - self.closed.len()
    }

    pub fn open_fraction(&self) -> f64 {
        self.open_count() as f64 / self.num_cells() as f64
    }

    /// Opens a cell drawn uniformly from the cells that are still closed.
    pub fn open_random_cell<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Cell, GridError> {
        if self.closed.is_empty() {
            return Err(GridError::NoClosedCells);
        }
        let pick = rng.gen_range(0..self.closed.len());
        let cell = self.closed.swap_remove(pick);
        self.states[(cell.row, cell.col)] = CellState::Open;
        Ok(cell)
    }

    /// Opens a specific cell. Returns false if it was already open.
    pub fn open_cell(&mut self, cell: Cell) -> bool {
        assert!(self.contains(cell), "cell {} outside grid of side {}", cell, self.side);
        match self.closed.iter().position(|&c| c == cell) {
            Some(pos) => {
                self.closed.swap_remove(pos);
                self.states[(cell.row, cell.col)] = CellState::Open;
                true
            }
            None => false,
        }
    }

    /// In-bounds neighbors of `cell` that are already open, scanned left,
    /// right, up, down.
    pub fn open_neighbors(&self, cell: Cell) -> Vec<Cell> {
        Direction::adjacent_directions().iter()
            .filter_map(|&d| cell.step_toward(d, self.side))
            .filter(|&n| self.is_open(n))
            .collect()
    }

    pub fn connect(&mut self, cell: Cell, neighbors: &[Cell]) {
        let cell_idx = self.index_of(cell);
        for &n in neighbors {
            let n_idx = self.index_of(n);
            self.connected_cells.union(cell_idx, n_idx);
        }
    }

    pub fn percolates(&self) -> bool {
        self.connected_cells.percolates()
    }

    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Step, GridError> {
        let cell = self.open_random_cell(rng)?;
        let neighbors = self.open_neighbors(cell);
        self.connect(cell, &neighbors);
        let percolates = self.percolates();
        debug!("opened {} with open neighbors {:?}, percolates: {}", cell, neighbors, percolates);
        Ok(Step { cell, neighbors, percolates })
    }

    /// A shortest path of open cells from the top row to the bottom row,
    /// searched directly over the cell states.
    pub fn open_path(&self) -> Option<Vec<Cell>> {
        let bottom = self.side - 1;
        // `None` is a virtual source above the top row
        let path = bfs(
            &None,
            |node: &Option<Cell>| match *node {
                None => (0..self.side)
                    .map(|col| Cell::new(0, col))
                    .filter(|&c| self.is_open(c))
                    .map(Some)
                    .collect::<Vec<_>>(),
                Some(c) => self.open_neighbors(c).into_iter().map(Some).collect(),
            },
            |node: &Option<Cell>| node.map_or(false, |c| c.row == bottom),
        )?;
        Some(path.into_iter().flatten().collect())
    }

    /// Heat-map matrix: 1 for closed cells, 0 for open ones.
    pub fn closed_matrix(&self) -> Vec<Vec<u8>> {
        (0..self.side)
            .map(|row| (0..self.side)
                .map(|col| match self.states[(row, col)] {
                    CellState::Closed => 1,
                    CellState::Open => 0,
                })
                .collect())
            .collect()
    }

    /// Text heat map, `#` closed and `.` open, one line per row.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.side * (self.side + 1));
        for row in 0..self.side {
            for col in 0..self.side {
                out.push(match self.states[(row, col)] {
                    CellState::Closed => '#',
                    CellState::Open => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}
