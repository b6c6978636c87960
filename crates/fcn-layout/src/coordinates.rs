//! Layout coordinates
//!
//! Three coordinate spaces share one contract:
//!
//! - [`OffsetCoord`]: unsigned Cartesian tile address with a 1-bit layer, packable into a `u64`
//! - [`CubeCoord`]: signed triple that supports vector arithmetic
//! - [`SiqadCoord`]: signed `(x, y)` plus the dimer sublattice index `z`
//!
//! Every coordinate carries an explicit *dead* flag. A dead coordinate names no
//! location; the default value is dead at the origin and enumeration ends in a
//! dead sentinel.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::{Add, Sub};

const FIELD_MASK_31: u32 = 0x7FFF_FFFF;

/// Common interface of all coordinate types
pub trait Coordinate:
    Copy + Eq + Ord + Hash + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Construct a live coordinate; values are truncated to the field widths
    fn from_xyz(x: i64, y: i64, z: i64) -> Self;

    fn x(&self) -> i64;
    fn y(&self) -> i64;
    fn z(&self) -> i64;

    fn is_dead(&self) -> bool;

    /// Copy of `self` with the dead flag set; x, y and z are kept
    fn get_dead(&self) -> Self;

    /// The next coordinate in enumeration order within `aspect_ratio`,
    /// or the dead copy of `aspect_ratio` when `self` is the last one
    fn successor(&self, aspect_ratio: &Self) -> Self;
}

// ============================================================================
// Offset coordinates
// ============================================================================

/// Unsigned offset coordinate: 31-bit x and y, 1-bit z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
    #[serde(default)]
    pub dead: bool,
}

impl OffsetCoord {
    pub const fn new(x: u32, y: u32, z: u8) -> Self {
        Self {
            x: x & FIELD_MASK_31,
            y: y & FIELD_MASK_31,
            z: z & 1,
            dead: false,
        }
    }

    /// Ground-layer coordinate
    pub const fn ground(x: u32, y: u32) -> Self {
        Self::new(x, y, 0)
    }

    /// Pack into 64 bits, MSB to LSB: dead, z, 31 bits y, 31 bits x
    pub fn to_packed(&self) -> u64 {
        ((self.dead as u64) << 63)
            | (((self.z & 1) as u64) << 62)
            | (((self.y & FIELD_MASK_31) as u64) << 31)
            | (self.x & FIELD_MASK_31) as u64
    }

    pub fn from_packed(packed: u64) -> Self {
        Self {
            x: (packed & FIELD_MASK_31 as u64) as u32,
            y: ((packed >> 31) & FIELD_MASK_31 as u64) as u32,
            z: ((packed >> 62) & 1) as u8,
            dead: (packed >> 63) == 1,
        }
    }
}

impl Default for OffsetCoord {
    fn default() -> Self {
        Self {
            dead: true,
            ..Self::new(0, 0, 0)
        }
    }
}

impl Ord for OffsetCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.y, self.x, self.dead).cmp(&(other.z, other.y, other.x, other.dead))
    }
}

impl PartialOrd for OffsetCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OffsetCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl From<u64> for OffsetCoord {
    fn from(packed: u64) -> Self {
        Self::from_packed(packed)
    }
}

impl From<OffsetCoord> for u64 {
    fn from(c: OffsetCoord) -> Self {
        c.to_packed()
    }
}

impl Coordinate for OffsetCoord {
    fn from_xyz(x: i64, y: i64, z: i64) -> Self {
        Self::new(x as u32, y as u32, z as u8)
    }

    fn x(&self) -> i64 {
        self.x as i64
    }

    fn y(&self) -> i64 {
        self.y as i64
    }

    fn z(&self) -> i64 {
        self.z as i64
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn get_dead(&self) -> Self {
        Self { dead: true, ..*self }
    }

    fn successor(&self, aspect_ratio: &Self) -> Self {
        if self == aspect_ratio {
            return aspect_ratio.get_dead();
        }
        let mut next = *self;
        next.x += 1;
        if next.x > aspect_ratio.x {
            next.x = 0;
            next.y += 1;
            if next.y > aspect_ratio.y {
                next.y = 0;
                next.z = (next.z + 1) & 1;
            }
        }
        next
    }
}

// ============================================================================
// Cube coordinates
// ============================================================================

/// Signed cube coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default)]
    pub dead: bool,
}

impl CubeCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self {
            x,
            y,
            z,
            dead: false,
        }
    }
}

impl Default for CubeCoord {
    fn default() -> Self {
        Self {
            dead: true,
            ..Self::new(0, 0, 0)
        }
    }
}

impl Add for CubeCoord {
    type Output = CubeCoord;

    fn add(self, rhs: Self) -> Self::Output {
        CubeCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for CubeCoord {
    type Output = CubeCoord;

    fn sub(self, rhs: Self) -> Self::Output {
        CubeCoord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Ord for CubeCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.z, self.y, self.x, self.dead).cmp(&(other.z, other.y, other.x, other.dead))
    }
}

impl PartialOrd for CubeCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl Coordinate for CubeCoord {
    fn from_xyz(x: i64, y: i64, z: i64) -> Self {
        Self::new(x as i32, y as i32, z as i32)
    }

    fn x(&self) -> i64 {
        self.x as i64
    }

    fn y(&self) -> i64 {
        self.y as i64
    }

    fn z(&self) -> i64 {
        self.z as i64
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn get_dead(&self) -> Self {
        Self { dead: true, ..*self }
    }

    fn successor(&self, aspect_ratio: &Self) -> Self {
        if self == aspect_ratio {
            return aspect_ratio.get_dead();
        }
        let mut next = *self;
        next.x += 1;
        if next.x > aspect_ratio.x {
            next.x = 0;
            next.y += 1;
            if next.y > aspect_ratio.y {
                next.y = 0;
                next.z += 1;
            }
        }
        next
    }
}

// ============================================================================
// SiQAD coordinates
// ============================================================================

/// SiQAD lattice coordinate; `z` selects the dimer row of a lattice row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SiqadCoord {
    pub x: i32,
    pub y: i32,
    pub z: u8,
    #[serde(default)]
    pub dead: bool,
}

impl SiqadCoord {
    pub const fn new(x: i32, y: i32, z: u8) -> Self {
        Self {
            x,
            y,
            z: z & 1,
            dead: false,
        }
    }
}

impl Default for SiqadCoord {
    fn default() -> Self {
        Self {
            dead: true,
            ..Self::new(0, 0, 0)
        }
    }
}

impl Ord for SiqadCoord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.z, self.x, self.dead).cmp(&(other.y, other.z, other.x, other.dead))
    }
}

impl PartialOrd for SiqadCoord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SiqadCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

impl Coordinate for SiqadCoord {
    fn from_xyz(x: i64, y: i64, z: i64) -> Self {
        Self::new(x as i32, y as i32, z as u8)
    }

    fn x(&self) -> i64 {
        self.x as i64
    }

    fn y(&self) -> i64 {
        self.y as i64
    }

    fn z(&self) -> i64 {
        self.z as i64
    }

    fn is_dead(&self) -> bool {
        self.dead
    }

    fn get_dead(&self) -> Self {
        Self { dead: true, ..*self }
    }

    /// The dimer row toggles before the lattice row advances. An aspect ratio
    /// with `z == 0` has a single dimer row per lattice row.
    fn successor(&self, aspect_ratio: &Self) -> Self {
        if self == aspect_ratio {
            return aspect_ratio.get_dead();
        }
        let mut next = *self;
        next.x += 1;
        if next.x > aspect_ratio.x {
            next.x = 0;
            if aspect_ratio.z == 0 {
                next.y += 1;
            } else {
                next.y += next.z as i32;
                next.z ^= 1;
            }
        }
        next
    }
}

// ============================================================================
// Conversions and measures
// ============================================================================

/// Map a SiQAD coordinate onto a single-layer grid: `(x, 2y + z, 0)`.
/// Dead coordinates map to the default dead coordinate.
pub fn to_fiction_coord<C: Coordinate>(coord: &SiqadCoord) -> C {
    if coord.dead {
        return C::default();
    }
    C::from_xyz(coord.x as i64, 2 * coord.y as i64 + coord.z as i64, 0)
}

/// Inverse of [`to_fiction_coord`]: row `y` becomes lattice row `y div 2`, dimer row `y mod 2`
pub fn to_siqad_coord<C: Coordinate>(coord: &C) -> SiqadCoord {
    if coord.is_dead() {
        return SiqadCoord::default();
    }
    SiqadCoord::new(
        coord.x() as i32,
        coord.y().div_euclid(2) as i32,
        coord.y().rem_euclid(2) as u8,
    )
}

/// `(x + 1) * (y + 1)` of an aspect ratio
pub fn area<C: Coordinate>(aspect_ratio: &C) -> u64 {
    ((aspect_ratio.x() + 1) * (aspect_ratio.y() + 1)) as u64
}

/// `(x + 1) * (y + 1) * (z + 1)` of an aspect ratio
pub fn volume<C: Coordinate>(aspect_ratio: &C) -> u64 {
    area(aspect_ratio) * (aspect_ratio.z() + 1) as u64
}

// ============================================================================
// Enumeration
// ============================================================================

/// Lazy enumeration of all coordinates within an aspect ratio
///
/// x advances fastest, then y, then z (SiQAD: the dimer row before y). The
/// sequence ends when the current coordinate turns dead.
#[derive(Debug, Clone)]
pub struct CoordIter<C: Coordinate> {
    aspect_ratio: C,
    current: C,
}

impl<C: Coordinate> CoordIter<C> {
    /// Enumerate from the origin
    pub fn new(aspect_ratio: C) -> Self {
        Self::starting_at(aspect_ratio, C::from_xyz(0, 0, 0))
    }

    pub fn starting_at(aspect_ratio: C, start: C) -> Self {
        Self {
            aspect_ratio,
            current: start,
        }
    }

    /// Current coordinate; does not advance
    pub fn current(&self) -> C {
        self.current
    }

    /// Pre-increment
    pub fn advance(&mut self) -> &mut Self {
        if !self.current.is_dead() {
            self.current = self.current.successor(&self.aspect_ratio);
        }
        self
    }

    /// Post-increment: advance and return the coordinate before the step
    pub fn post_advance(&mut self) -> C {
        let previous = self.current;
        self.advance();
        previous
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_dead()
    }
}

impl<C: Coordinate> PartialEq for CoordIter<C> {
    fn eq(&self, other: &Self) -> bool {
        self.current == other.current
    }
}

impl<C: Coordinate> Iterator for CoordIter<C> {
    type Item = C;

    fn next(&mut self) -> Option<C> {
        if self.current.is_dead() {
            return None;
        }
        Some(self.post_advance())
    }
}

impl<C: Coordinate> std::iter::FusedIterator for CoordIter<C> {}
