//! Tile-based layout
//!
//! A Cartesian 2.5D grid bounded by an inclusive aspect ratio. Tiles on
//! `z == 0` form the ground layer, tiles on `z == 1` the crossing layer.
//! North is towards `y == 0`.
//!
//! Neighbor queries never leave the grid: at a border they return the queried
//! tile itself, so callers compare the result against the input.

use crate::coordinates::{CoordIter, OffsetCoord};
use serde::{Deserialize, Serialize};

/// A tile address
pub type Tile = OffsetCoord;

/// Compass directions on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

/// Grid topology queries, all derived from the aspect ratio
///
/// Every layout layer implements this by handing out its aspect ratio, which
/// makes the full query surface available through composition.
pub trait Topology {
    /// Inclusive maximum `(x, y, z)` of the layout
    fn aspect_ratio(&self) -> Tile;

    fn x(&self) -> u32 {
        self.aspect_ratio().x
    }

    fn y(&self) -> u32 {
        self.aspect_ratio().y
    }

    fn z(&self) -> u8 {
        self.aspect_ratio().z
    }

    fn area(&self) -> u64 {
        (self.x() as u64 + 1) * (self.y() as u64 + 1)
    }

    fn volume(&self) -> u64 {
        self.area() * (self.z() as u64 + 1)
    }

    // ------------------------------------------------------------------------
    // Neighbors
    // ------------------------------------------------------------------------

    fn north(&self, t: &Tile) -> Tile {
        if t.y == 0 {
            *t
        } else {
            Tile::new(t.x, t.y - 1, t.z)
        }
    }

    fn east(&self, t: &Tile) -> Tile {
        if t.x >= self.x() {
            *t
        } else {
            Tile::new(t.x + 1, t.y, t.z)
        }
    }

    fn south(&self, t: &Tile) -> Tile {
        if t.y >= self.y() {
            *t
        } else {
            Tile::new(t.x, t.y + 1, t.z)
        }
    }

    fn west(&self, t: &Tile) -> Tile {
        if t.x == 0 {
            *t
        } else {
            Tile::new(t.x - 1, t.y, t.z)
        }
    }

    fn north_east(&self, t: &Tile) -> Tile {
        if t.y == 0 || t.x >= self.x() {
            *t
        } else {
            Tile::new(t.x + 1, t.y - 1, t.z)
        }
    }

    fn south_east(&self, t: &Tile) -> Tile {
        if t.y >= self.y() || t.x >= self.x() {
            *t
        } else {
            Tile::new(t.x + 1, t.y + 1, t.z)
        }
    }

    fn south_west(&self, t: &Tile) -> Tile {
        if t.y >= self.y() || t.x == 0 {
            *t
        } else {
            Tile::new(t.x - 1, t.y + 1, t.z)
        }
    }

    fn north_west(&self, t: &Tile) -> Tile {
        if t.y == 0 || t.x == 0 {
            *t
        } else {
            Tile::new(t.x - 1, t.y - 1, t.z)
        }
    }

    fn neighbor(&self, t: &Tile, direction: Direction) -> Tile {
        match direction {
            Direction::North => self.north(t),
            Direction::NorthEast => self.north_east(t),
            Direction::East => self.east(t),
            Direction::SouthEast => self.south_east(t),
            Direction::South => self.south(t),
            Direction::SouthWest => self.south_west(t),
            Direction::West => self.west(t),
            Direction::NorthWest => self.north_west(t),
        }
    }

    fn above(&self, t: &Tile) -> Tile {
        if t.z >= self.z() {
            *t
        } else {
            Tile::new(t.x, t.y, t.z + 1)
        }
    }

    fn below(&self, t: &Tile) -> Tile {
        if t.z == 0 {
            *t
        } else {
            Tile::new(t.x, t.y, t.z - 1)
        }
    }

    // ------------------------------------------------------------------------
    // Relations: `is_<dir>_of(t1, t2)` holds if t2 is the <dir> neighbor of t1
    // ------------------------------------------------------------------------

    fn is_north_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.north(t1) == *t2
    }

    fn is_east_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.east(t1) == *t2
    }

    fn is_south_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.south(t1) == *t2
    }

    fn is_west_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.west(t1) == *t2
    }

    /// Cardinal neighbors on the same layer
    fn is_adjacent_of(&self, t1: &Tile, t2: &Tile) -> bool {
        self.is_north_of(t1, t2)
            || self.is_east_of(t1, t2)
            || self.is_south_of(t1, t2)
            || self.is_west_of(t1, t2)
    }

    /// Cardinal neighbors on any layer
    fn is_adjacent_elevation_of(&self, t1: &Tile, t2: &Tile) -> bool {
        self.is_adjacent_of(t1, t2)
            || self.is_adjacent_of(t1, &self.above(t2))
            || self.is_adjacent_of(t1, &self.below(t2))
    }

    fn is_above(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.above(t1) == *t2
    }

    fn is_below(&self, t1: &Tile, t2: &Tile) -> bool {
        t1 != t2 && self.below(t1) == *t2
    }

    /// t2 lies anywhere north of t1 in the same column and layer
    fn is_northwards_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1.z == t2.z && t1.x == t2.x && t2.y < t1.y
    }

    fn is_eastwards_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1.z == t2.z && t1.y == t2.y && t2.x > t1.x
    }

    fn is_southwards_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1.z == t2.z && t1.x == t2.x && t2.y > t1.y
    }

    fn is_westwards_of(&self, t1: &Tile, t2: &Tile) -> bool {
        t1.z == t2.z && t1.y == t2.y && t2.x < t1.x
    }

    // ------------------------------------------------------------------------
    // Borders
    // ------------------------------------------------------------------------

    fn is_at_northern_border(&self, t: &Tile) -> bool {
        t.y == 0
    }

    fn is_at_eastern_border(&self, t: &Tile) -> bool {
        t.x == self.x()
    }

    fn is_at_southern_border(&self, t: &Tile) -> bool {
        t.y == self.y()
    }

    fn is_at_western_border(&self, t: &Tile) -> bool {
        t.x == 0
    }

    fn is_at_any_border(&self, t: &Tile) -> bool {
        self.is_at_northern_border(t)
            || self.is_at_eastern_border(t)
            || self.is_at_southern_border(t)
            || self.is_at_western_border(t)
    }

    fn northern_border_of(&self, t: &Tile) -> Tile {
        Tile::new(t.x, 0, t.z)
    }

    fn eastern_border_of(&self, t: &Tile) -> Tile {
        Tile::new(self.x(), t.y, t.z)
    }

    fn southern_border_of(&self, t: &Tile) -> Tile {
        Tile::new(t.x, self.y(), t.z)
    }

    fn western_border_of(&self, t: &Tile) -> Tile {
        Tile::new(0, t.y, t.z)
    }

    // ------------------------------------------------------------------------
    // Layers and bounds
    // ------------------------------------------------------------------------

    fn is_ground_layer(&self, t: &Tile) -> bool {
        t.z == 0
    }

    fn is_crossing_layer(&self, t: &Tile) -> bool {
        t.z == 1
    }

    fn is_within_bounds(&self, t: &Tile) -> bool {
        !t.dead && t.x <= self.x() && t.y <= self.y() && t.z <= self.z()
    }

    // ------------------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------------------

    /// All tiles on all layers
    fn coordinates(&self) -> CoordIter<Tile> {
        CoordIter::new(self.aspect_ratio())
    }

    /// All tiles from `start` onwards
    fn coordinates_from(&self, start: Tile) -> CoordIter<Tile> {
        CoordIter::starting_at(self.aspect_ratio(), start)
    }

    /// Tiles of the ground layer only
    fn ground_coordinates(&self) -> CoordIter<Tile> {
        let ar = self.aspect_ratio();
        CoordIter::new(Tile::new(ar.x, ar.y, 0))
    }

    /// Cardinal neighbors on the same layer, in N, E, S, W order
    fn adjacent_coordinates(&self, t: &Tile) -> Vec<Tile> {
        Direction::CARDINAL
            .iter()
            .map(|d| self.neighbor(t, *d))
            .filter(|n| n != t)
            .collect()
    }

    /// Pairs of opposite cardinal neighbors that both exist
    fn adjacent_opposite_coordinates(&self, t: &Tile) -> Vec<(Tile, Tile)> {
        [
            (self.north(t), self.south(t)),
            (self.east(t), self.west(t)),
        ]
        .into_iter()
        .filter(|(a, b)| a != t && b != t)
        .collect()
    }

    /// Direction in which `to` lies from `from` if the two are ground-plane
    /// neighbors (layers are ignored)
    fn direction_between(&self, from: &Tile, to: &Tile) -> Option<Direction> {
        let flat = Tile::new(from.x, from.y, to.z);
        Direction::ALL
            .into_iter()
            .find(|d| {
                let n = self.neighbor(&flat, *d);
                n != flat && n == *to
            })
    }
}

/// A bare tile grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    aspect_ratio: Tile,
}

impl TileLayout {
    pub fn new(aspect_ratio: Tile) -> Self {
        Self { aspect_ratio }
    }

    pub fn resize(&mut self, aspect_ratio: Tile) {
        self.aspect_ratio = aspect_ratio;
    }
}

impl Default for TileLayout {
    fn default() -> Self {
        Self::new(Tile::new(0, 0, 0))
    }
}

impl Topology for TileLayout {
    fn aspect_ratio(&self) -> Tile {
        self.aspect_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> TileLayout {
        TileLayout::new(Tile::new(3, 2, 1))
    }

    #[test]
    fn test_dimensions() {
        let lyt = layout();
        assert_eq!((lyt.x(), lyt.y(), lyt.z()), (3, 2, 1));
        assert_eq!(lyt.area(), 12);
        assert_eq!(lyt.volume(), 24);

        let mut lyt = lyt;
        lyt.resize(Tile::new(1, 1, 0));
        assert_eq!(lyt.area(), 4);
    }

    #[test]
    fn test_neighbors_self_return_at_borders() {
        let lyt = layout();
        let origin = Tile::new(0, 0, 0);
        assert_eq!(lyt.north(&origin), origin);
        assert_eq!(lyt.west(&origin), origin);
        assert_eq!(lyt.north_east(&origin), origin);
        assert_eq!(lyt.east(&origin), Tile::new(1, 0, 0));
        assert_eq!(lyt.south_east(&origin), Tile::new(1, 1, 0));

        let corner = Tile::new(3, 2, 0);
        assert_eq!(lyt.east(&corner), corner);
        assert_eq!(lyt.south(&corner), corner);
        assert_eq!(lyt.north_west(&corner), Tile::new(2, 1, 0));
    }

    #[test]
    fn test_layers() {
        let lyt = layout();
        let t = Tile::new(1, 1, 0);
        let up = lyt.above(&t);
        assert_eq!(up, Tile::new(1, 1, 1));
        assert_eq!(lyt.above(&up), up);
        assert_eq!(lyt.below(&t), t);
        assert!(lyt.is_above(&t, &up));
        assert!(lyt.is_below(&up, &t));
        assert!(lyt.is_crossing_layer(&up));
        assert!(lyt.is_ground_layer(&t));
    }

    #[test]
    fn test_relations() {
        let lyt = layout();
        let t = Tile::new(1, 1, 0);
        assert!(lyt.is_north_of(&t, &Tile::new(1, 0, 0)));
        assert!(lyt.is_east_of(&t, &Tile::new(2, 1, 0)));
        assert!(lyt.is_adjacent_of(&t, &Tile::new(0, 1, 0)));
        assert!(!lyt.is_adjacent_of(&t, &Tile::new(0, 1, 1)));
        assert!(lyt.is_adjacent_elevation_of(&t, &Tile::new(0, 1, 1)));
        assert!(!lyt.is_adjacent_of(&t, &Tile::new(2, 2, 0)));
        assert!(lyt.is_southwards_of(&Tile::new(1, 0, 0), &Tile::new(1, 2, 0)));
        assert!(lyt.is_westwards_of(&Tile::new(3, 0, 0), &Tile::new(0, 0, 0)));
    }

    #[test]
    fn test_borders() {
        let lyt = layout();
        let t = Tile::new(1, 1, 0);
        assert!(!lyt.is_at_any_border(&t));
        assert!(lyt.is_at_any_border(&Tile::new(3, 1, 0)));
        assert_eq!(lyt.northern_border_of(&t), Tile::new(1, 0, 0));
        assert_eq!(lyt.eastern_border_of(&t), Tile::new(3, 1, 0));
        assert_eq!(lyt.southern_border_of(&t), Tile::new(1, 2, 0));
        assert_eq!(lyt.western_border_of(&t), Tile::new(0, 1, 0));
    }

    #[test]
    fn test_enumeration() {
        let lyt = layout();
        assert_eq!(lyt.coordinates().count() as u64, lyt.volume());
        assert_eq!(lyt.ground_coordinates().count() as u64, lyt.area());
        assert!(lyt.ground_coordinates().all(|t| lyt.is_ground_layer(&t)));
        assert!(lyt.coordinates().all(|t| lyt.is_within_bounds(&t)));
        assert!(!lyt.is_within_bounds(&Tile::new(4, 0, 0)));
    }

    #[test]
    fn test_adjacent_coordinates() {
        let lyt = layout();
        assert_eq!(lyt.adjacent_coordinates(&Tile::new(0, 0, 0)).len(), 2);
        assert_eq!(lyt.adjacent_coordinates(&Tile::new(1, 1, 0)).len(), 4);
        assert_eq!(lyt.adjacent_opposite_coordinates(&Tile::new(1, 1, 0)).len(), 2);
        assert_eq!(lyt.adjacent_opposite_coordinates(&Tile::new(0, 1, 0)).len(), 1);
    }

    #[test]
    fn test_direction_between() {
        let lyt = layout();
        let t = Tile::new(1, 1, 0);
        assert_eq!(lyt.direction_between(&t, &Tile::new(1, 0, 0)), Some(Direction::North));
        assert_eq!(lyt.direction_between(&t, &Tile::new(2, 2, 1)), Some(Direction::SouthEast));
        assert_eq!(lyt.direction_between(&t, &Tile::new(3, 1, 0)), None);
    }
}
