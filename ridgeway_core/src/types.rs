// Core types shared by every planner.
//
// Defines grid coordinates (`Coord`), dense node identifiers (`NodeId`), and
// the four movement directions (`Direction`) that both the graph searches and
// the move-sequence optimizers are built on. Movement is strictly
// four-directional: there is no diagonal step anywhere in the crate.
//
// See also: `grid.rs` for the dense cell storage these ids index into,
// `evolve/genome.rs` for how a sequence of `Direction`s decodes to a path.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on the 2D grid.
///
/// `x` grows to the right (columns), `y` grows downward (rows). Signed so
/// that a neighbor offset can step off the edge and be rejected by bounds
/// checks instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate one step away in `dir`. May be out of bounds.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance between two coordinates.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// Planar straight-line distance, ignoring elevation.
    pub fn planar_distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dense index of a cell in a `Grid` (row-major: `x + y * width`).
///
/// Only meaningful for the grid that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// One axis-aligned move. The discriminants double as the gene encoding used
/// by the metaheuristics (0 = up, 1 = right, 2 = down, 3 = left).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in neighbor-enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// `(dx, dy)` for this move. Up is toward smaller `y`.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Map an arbitrary index onto a direction (wraps modulo 4).
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % 4]
    }
}
