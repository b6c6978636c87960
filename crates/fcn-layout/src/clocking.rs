//! Clocking schemes
//!
//! A clocking scheme assigns one of `num_clocks` phases to every tile.
//! Information flows from phase `k` into the adjacent phase `k + 1 (mod K)`.
//! Regular schemes repeat a small pattern across the grid; the irregular
//! `Open` scheme lets each layout assign phases tile by tile.

use crate::tile::Tile;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

/// Name of the default scheme
pub const DEFAULT_SCHEME: &str = "2DDWave";

/// An immutable, named clock-phase assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockingScheme {
    pub name: String,
    pub num_clocks: u8,
    /// Most clocked neighbors that can feed a single tile
    pub max_in_degree: usize,
    /// Most clocked neighbors a single tile can feed
    pub max_out_degree: usize,
    /// Phase pattern indexed `[y % rows][x % columns]`; empty if irregular
    pattern: Vec<Vec<u8>>,
}

impl ClockingScheme {
    /// Build a regular scheme from a repeating pattern. Degree bounds are
    /// derived from the pattern on the infinite Cartesian grid.
    pub fn regular(name: &str, num_clocks: u8, pattern: Vec<Vec<u8>>) -> Self {
        let mut scheme = Self {
            name: name.to_string(),
            num_clocks,
            max_in_degree: 0,
            max_out_degree: 0,
            pattern,
        };
        let rows = scheme.pattern.len();
        let cols = scheme.pattern.first().map_or(0, Vec::len);
        for y in 0..rows {
            for x in 0..cols {
                let clk = scheme.pattern[y][x];
                let neighbors = [
                    scheme.pattern[(y + rows - 1) % rows][x],
                    scheme.pattern[(y + 1) % rows][x],
                    scheme.pattern[y][(x + 1) % cols],
                    scheme.pattern[y][(x + cols - 1) % cols],
                ];
                let incoming = neighbors
                    .iter()
                    .filter(|n| (**n + 1) % num_clocks == clk)
                    .count();
                let outgoing = neighbors
                    .iter()
                    .filter(|n| (clk + 1) % num_clocks == **n)
                    .count();
                scheme.max_in_degree = scheme.max_in_degree.max(incoming);
                scheme.max_out_degree = scheme.max_out_degree.max(outgoing);
            }
        }
        scheme
    }

    /// Build an irregular scheme whose phases are assigned per layout
    pub fn irregular(name: &str, num_clocks: u8, max_in_degree: usize, max_out_degree: usize) -> Self {
        Self {
            name: name.to_string(),
            num_clocks,
            max_in_degree,
            max_out_degree,
            pattern: Vec::new(),
        }
    }

    pub fn is_regular(&self) -> bool {
        !self.pattern.is_empty()
    }

    /// Whether the phase grows by a constant step along each axis and
    /// information can only move east or south. Any path between two tiles
    /// then has the same length, fixed by their positions.
    pub fn is_linear(&self) -> bool {
        let k = self.num_clocks;
        let rows = self.pattern.len();
        let cols = self.pattern.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 || k < 3 || self.pattern.iter().any(|r| r.len() != cols) {
            return false;
        }
        let step = |from: u8, to: u8| ((to as u16 + k as u16 - (from % k) as u16) % k as u16) as u8;
        let dx = step(self.pattern[0][0], self.pattern[0][1 % cols]);
        let dy = step(self.pattern[0][0], self.pattern[1 % rows][0]);
        let constant = (0..rows).all(|y| {
            (0..cols).all(|x| {
                let clk = self.pattern[y][x];
                step(clk, self.pattern[y][(x + 1) % cols]) == dx
                    && step(clk, self.pattern[(y + 1) % rows][x]) == dy
            })
        });
        // a step of K - 1 would let signals flow back west or north
        constant && dx != k - 1 && dy != k - 1
    }

    /// Phase of a tile under the pattern (0 for irregular schemes)
    pub fn clock_number(&self, t: &Tile) -> u8 {
        let rows = self.pattern.len();
        if rows == 0 {
            return 0;
        }
        let row = &self.pattern[t.y as usize % rows];
        if row.is_empty() {
            return 0;
        }
        row[t.x as usize % row.len()]
    }
}

fn two_d_d_wave() -> ClockingScheme {
    let pattern = (0..4u8)
        .map(|y| (0..4u8).map(|x| (x + y) % 4).collect())
        .collect();
    ClockingScheme::regular("2DDWave", 4, pattern)
}

fn use_scheme() -> ClockingScheme {
    ClockingScheme::regular(
        "USE",
        4,
        vec![
            vec![0, 1, 2, 3],
            vec![3, 2, 1, 0],
            vec![2, 3, 0, 1],
            vec![1, 0, 3, 2],
        ],
    )
}

fn res_scheme() -> ClockingScheme {
    ClockingScheme::regular(
        "RES",
        4,
        vec![
            vec![3, 0, 1, 2],
            vec![0, 1, 0, 3],
            vec![1, 2, 3, 0],
            vec![0, 3, 2, 1],
        ],
    )
}

fn columnar() -> ClockingScheme {
    ClockingScheme::regular("Columnar", 4, vec![vec![0, 1, 2, 3]])
}

fn row() -> ClockingScheme {
    ClockingScheme::regular("Row", 4, vec![vec![0], vec![1], vec![2], vec![3]])
}

fn open() -> ClockingScheme {
    ClockingScheme::irregular("Open", 4, 3, 3)
}

fn registry() -> &'static [Arc<ClockingScheme>] {
    static SCHEMES: OnceLock<Vec<Arc<ClockingScheme>>> = OnceLock::new();
    SCHEMES.get_or_init(|| {
        // the default scheme comes first
        vec![
            Arc::new(two_d_d_wave()),
            Arc::new(use_scheme()),
            Arc::new(res_scheme()),
            Arc::new(columnar()),
            Arc::new(row()),
            Arc::new(open()),
        ]
    })
}

/// The `2DDWave` scheme
pub fn default_clocking_scheme() -> Arc<ClockingScheme> {
    Arc::clone(&registry()[0])
}

/// Look up a scheme by name, ignoring case
pub fn get_clocking_scheme(name: &str) -> Option<Arc<ClockingScheme>> {
    registry()
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .cloned()
}

/// All supported schemes
pub fn clocking_schemes() -> impl Iterator<Item = &'static Arc<ClockingScheme>> {
    registry().iter()
}
