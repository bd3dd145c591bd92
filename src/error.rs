use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Every cell is already open.
    NoClosedCells,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GridError::NoClosedCells => write!(f, "no closed cells remain"),
        }
    }
}

impl Error for GridError {}
