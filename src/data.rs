use std::fmt;

/// A grid coordinate; `row` 0 is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Cell {
        Cell { row, col }
    }

    /// The adjacent cell in direction `d`, or `None` past the edge of a
    /// `side` x `side` grid.
    pub fn step_toward(&self, d: Direction, side: usize) -> Option<Cell> {
        match d {
            Direction::Left if self.col > 0 => Some(Cell::new(self.row, self.col - 1)),
            Direction::Right if self.col + 1 < side => Some(Cell::new(self.row, self.col + 1)),
            Direction::Up if self.row > 0 => Some(Cell::new(self.row - 1, self.col)),
            Direction::Down if self.row + 1 < side => Some(Cell::new(self.row + 1, self.col)),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Left, Right, Up, Down,
}

impl Direction {
    /// Neighbor scan order.
    pub fn adjacent_directions() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Closed, Open,
}
