// patterns.rs - Named seed patterns and random fills for initial grids

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::{Cell, Grid, ALIVE, DEAD};

/// A pattern as `(x, y)` offsets from its top-left corner.
pub struct Pattern {
    pub name  : &'static str,
    pub cells : &'static [(usize, usize)],
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "Block",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
    },
    Pattern {
        name: "Toad",
        cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (1, 0), (0, 1), (1, 1), (2, 2), (3, 2), (2, 3), (3, 3)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top half
            (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
            (0, 2), (5, 2), (7, 2), (12, 2),
            (0, 3), (5, 3), (7, 3), (12, 3),
            (0, 4), (5, 4), (7, 4), (12, 4),
            (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
            // Bottom half (mirrored)
            (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
            (0, 8), (5, 8), (7, 8), (12, 8),
            (0, 9), (5, 9), (7, 9), (12, 9),
            (0, 10), (5, 10), (7, 10), (12, 10),
            (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
        ],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (0, 4), (1, 4), (0, 5), (1, 5),
            (10, 4), (10, 5), (10, 6), (11, 3), (11, 7), (12, 2), (12, 8),
            (13, 2), (13, 8), (14, 5), (15, 3), (15, 7), (16, 4), (16, 5),
            (16, 6), (17, 5), (20, 2), (20, 3), (20, 4), (21, 2), (21, 3),
            (21, 4), (22, 1), (22, 5), (24, 0), (24, 1), (24, 5), (24, 6),
            (34, 2), (34, 3), (35, 2), (35, 3),
        ],
    },
];

/// Look a pattern up by name, ignoring case, spaces and dashes.
pub fn find(name: &str) -> Option<&'static Pattern> {
    let key = |s: &str| -> String {
        s.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
    };
    let wanted = key(name);
    PATTERNS.iter().find(|p| key(p.name) == wanted)
}

impl Pattern {
    /// Absolute cells with the pattern's corner at `at`, wrapping on a
    /// `width x height` torus.
    pub fn cells_at(&self, at: Cell, width: usize, height: usize) -> Vec<Cell> {
        self.cells
            .iter()
            .map(|&(dx, dy)| Cell::new((at.x + dx) % width, (at.y + dy) % height))
            .collect()
    }
}

/// Stamp `pattern` onto `grid` without clearing what is already there.
pub fn apply_pattern(grid: &mut Grid, pattern: &Pattern, at: Cell) {
    for cell in pattern.cells_at(at, grid.width(), grid.height()) {
        grid.set(cell.x, cell.y, ALIVE);
    }
}

/// Fill every cell pseudo-randomly, roughly a third alive. The same seed
/// always gives the same grid.
pub fn apply_random_pattern(grid: &mut Grid, seed_value: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_value);

    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let state = if rng.random_ratio(1, 3) { ALIVE } else { DEAD };
            grid.set(x, y, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_is_forgiving_about_names() {
        assert_eq!(find("glider").map(|p| p.name), Some("Glider"));
        assert_eq!(find("gosper-glider-gun").map(|p| p.name), Some("Gosper Glider Gun"));
        assert!(find("spaceship").is_none());
    }

    #[test]
    fn pattern_sizes() {
        let sizes: Vec<_> = PATTERNS.iter().map(|p| (p.name, p.cells.len())).collect();
        assert!(sizes.contains(&("Pulsar", 48)));
        assert!(sizes.contains(&("Gosper Glider Gun", 36)));
    }

    #[test]
    fn placement_wraps_around_edges() {
        let block = find("block").unwrap();
        let mut grid = Grid::new(4, 4);
        apply_pattern(&mut grid, block, Cell::new(3, 3));
        assert_eq!(
            grid.alive_cells(),
            vec![Cell::new(0, 0), Cell::new(3, 0), Cell::new(0, 3), Cell::new(3, 3)]
        );
    }

    #[test]
    fn random_fill_is_repeatable() {
        let mut a = Grid::new(32, 32);
        let mut b = Grid::new(32, 32);
        apply_random_pattern(&mut a, 7);
        apply_random_pattern(&mut b, 7);
        assert_eq!(a, b);
        let alive = a.count_alive();
        assert!(alive > 32 * 32 / 5 && alive < 32 * 32 / 2, "{alive} alive");

        let mut c = Grid::new(32, 32);
        apply_random_pattern(&mut c, 8);
        assert_ne!(a, c);
    }
}
