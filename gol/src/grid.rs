// grid.rs - Grid types for Conway's Game of Life

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// Two canonical cell states, same bytes as the image boundary
pub type TCell = u8;
pub const ALIVE: TCell = 255;
pub const DEAD: TCell = 0;

/// Position of a single cell: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A `width x height` toroidal world stored row-major.
///
/// Once a grid has been handed to the workers it is only ever read; every
/// generation is assembled into a fresh `Grid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width  : usize,
    height : usize,
    cells  : Vec<TCell>,
}

impl Grid {
    /// An all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![DEAD; width * height] }
    }

    /// Build a grid from row-major cell values as delivered by the input
    /// collaborator. Anything other than `ALIVE` is read as dead.
    pub fn from_cells(width: usize, height: usize, mut cells: Vec<TCell>) -> Result<Self> {
        let expected = width * height;
        if cells.len() != expected {
            return Err(Error::InputSize { expected, got: cells.len() });
        }
        for cell in cells.iter_mut() {
            if *cell != ALIVE { *cell = DEAD; }
        }
        Ok(Self { width, height, cells })
    }

    /// A grid with exactly the given cells alive. Coordinates wrap.
    pub fn from_alive(width: usize, height: usize, alive: &[Cell]) -> Self {
        let mut grid = Self::new(width, height);
        for cell in alive {
            grid.set(cell.x % width, cell.y % height, ALIVE);
        }
        grid
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }

    pub fn get(&self, x: usize, y: usize) -> TCell {
        self.cells[y * self.width + x]
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == ALIVE
    }

    pub fn set(&mut self, x: usize, y: usize, state: TCell) {
        self.cells[y * self.width + x] = state;
    }

    pub fn row(&self, y: usize) -> &[TCell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Copy a run of finished rows into place starting at `start_row`.
    pub(crate) fn write_rows(&mut self, start_row: usize, rows: &[TCell]) {
        let start = start_row * self.width;
        self.cells[start..start + rows.len()].copy_from_slice(rows);
    }

    pub fn count_alive(&self) -> usize {
        self.cells.iter().filter(|&&c| c == ALIVE).count()
    }

    /// Alive cells in row-major order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        let mut alive = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_alive(x, y) { alive.push(Cell::new(x, y)); }
            }
        }
        alive
    }

    pub fn as_bytes(&self) -> &[TCell] {
        &self.cells
    }
}
