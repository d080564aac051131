// rules.rs - Toroidal neighbour counting and the B3/S23 transition rule

use crate::grid::{Grid, TCell, ALIVE, DEAD};

const OFFSETS: [(isize, isize); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1,  0),          (1,  0),
    (-1,  1), (0,  1), (1,  1),
];

#[inline]
fn wrap(coord: usize, offset: isize, dim: usize) -> usize {
    ((coord + dim) as isize + offset) as usize % dim
}

/// Live cells among the 8 neighbours of `(x, y)`, edges wrapping around.
pub fn alive_neighbours(grid: &Grid, x: usize, y: usize) -> usize {
    let (width, height) = (grid.width(), grid.height());
    OFFSETS
        .iter()
        .filter(|&&(dx, dy)| grid.is_alive(wrap(x, dx, width), wrap(y, dy, height)))
        .count()
}

/// Next state of a cell given its current state and live-neighbour count.
pub fn next_state(current: TCell, neighbours: usize) -> TCell {
    match (current == ALIVE, neighbours) {
        (true, 2) | (true, 3) => ALIVE,   // Survival
        (false, 3)            => ALIVE,   // Birth
        _                     => DEAD,    // Death or stays dead
    }
}
