// Dense 2D elevation grid with per-cell search scratch state.
//
// Cells are stored as a flat `Vec<Node>` indexed row-major by
// `x + y * width`, giving O(1) access by `NodeId` or `Coord`. Each cell
// carries its terrain (height, obstacle flag) plus the scratch fields the
// graph searches write into (`g`, `rhs`, `h`, `f`, `parent`).
//
// Scratch ownership: the scratch fields belong to whichever search is
// currently running against this grid. Baseline searches and AD* reset and
// mutate them; the metaheuristics only take `&Grid` and never touch them.
// Two searches that must run side by side each need their own `clone()` of
// the grid (see `compare.rs`).
//
// Neighbors are the four axis-aligned, in-bounds, non-obstacle cells,
// enumerated in `Direction::ALL` order (up, right, down, left).
//
// See also: `cost.rs` for edge costs over this grid, `pathfinding.rs` and
// `adstar/` for the searches that own the scratch fields.

use crate::error::GridError;
use crate::types::{Coord, Direction, NodeId};
use smallvec::SmallVec;

/// One grid cell: terrain plus search scratch state.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub x: i32,
    pub y: i32,
    /// Elevation, always finite and >= 0.
    pub height: f64,
    pub is_obstacle: bool,
    /// Cost-so-far (baseline searches) or cost-to-goal (AD*).
    pub g: f64,
    /// AD* one-step lookahead value.
    pub rhs: f64,
    /// Cached heuristic estimate for the current run.
    pub h: f64,
    /// `g + h` priority; written by the baseline searches only.
    pub f: f64,
    /// Back-pointer for path reconstruction in the baseline searches.
    pub parent: Option<NodeId>,
}

impl Node {
    fn new(x: i32, y: i32, height: f64) -> Self {
        Self {
            x,
            y,
            height,
            is_obstacle: false,
            g: f64::INFINITY,
            rhs: f64::INFINITY,
            h: 0.0,
            f: f64::INFINITY,
            parent: None,
        }
    }

    pub fn coord(&self) -> Coord {
        Coord::new(self.x, self.y)
    }

    /// `g == rhs`. Both infinite counts as consistent.
    pub fn is_consistent(&self) -> bool {
        self.g == self.rhs
    }

    fn reset_scratch(&mut self) {
        self.g = f64::INFINITY;
        self.rhs = f64::INFINITY;
        self.h = 0.0;
        self.f = f64::INFINITY;
        self.parent = None;
    }
}

/// Fixed-size 2D field of cells.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    /// Flat storage: index = x + y * width.
    nodes: Vec<Node>,
    width: u32,
    height: u32,
}

impl Grid {
    /// Create an obstacle-free grid with every height at 0.
    pub fn new(width: u32, height: u32) -> Self {
        let mut nodes = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                nodes.push(Node::new(x, y, 0.0));
            }
        }
        Self {
            nodes,
            width,
            height,
        }
    }

    /// Create an obstacle-free grid from a row-major height array.
    pub fn from_heights(width: u32, height: u32, heights: &[f64]) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid);
        }
        let expected = width as usize * height as usize;
        if heights.len() != expected {
            return Err(GridError::DimensionMismatch {
                expected,
                actual: heights.len(),
            });
        }
        let mut grid = Self::new(width, height);
        for (node, &h) in grid.nodes.iter_mut().zip(heights) {
            if !h.is_finite() || h < 0.0 {
                return Err(GridError::InvalidHeight {
                    coord: node.coord(),
                    height: h,
                });
            }
            node.height = h;
        }
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check whether a coordinate is within bounds.
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Convert a coordinate to a node id. Returns `None` if out of bounds.
    pub fn id(&self, coord: Coord) -> Option<NodeId> {
        if self.in_bounds(coord) {
            Some(NodeId(coord.x as u32 + coord.y as u32 * self.width))
        } else {
            None
        }
    }

    /// Coordinate of a node id.
    pub fn coord(&self, id: NodeId) -> Coord {
        self.nodes[id.index()].coord()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Look a node up by coordinate.
    pub fn node_at(&self, coord: Coord) -> Option<&Node> {
        self.id(coord).map(|id| self.node(id))
    }

    /// Iterate over all cells in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Elevation of a cell. Returns 0 for out-of-bounds coordinates.
    pub fn height_at(&self, coord: Coord) -> f64 {
        self.node_at(coord).map_or(0.0, |n| n.height)
    }

    /// In bounds and not an obstacle.
    pub fn is_passable(&self, coord: Coord) -> bool {
        self.node_at(coord).is_some_and(|n| !n.is_obstacle)
    }

    /// Set or clear the obstacle flag. Returns `true` if the flag changed,
    /// which is the signal to pass `coord` on to AD* replanning.
    /// Out-of-bounds coordinates are a no-op.
    pub fn set_obstacle(&mut self, coord: Coord, blocked: bool) -> bool {
        match self.id(coord) {
            Some(id) => {
                let node = self.node_mut(id);
                let changed = node.is_obstacle != blocked;
                node.is_obstacle = blocked;
                changed
            }
            None => false,
        }
    }

    /// Change a cell's elevation. Returns whether the value changed.
    pub fn set_height(&mut self, coord: Coord, height: f64) -> Result<bool, GridError> {
        let id = self.id(coord).ok_or(GridError::OutOfBounds(coord))?;
        if !height.is_finite() || height < 0.0 {
            return Err(GridError::InvalidHeight { coord, height });
        }
        let node = self.node_mut(id);
        let changed = node.height != height;
        node.height = height;
        Ok(changed)
    }

    /// The passable axis-aligned neighbors of `id`, in up/right/down/left order.
    pub fn neighbors(&self, id: NodeId) -> SmallVec<[NodeId; 4]> {
        let here = self.coord(id);
        Direction::ALL
            .iter()
            .filter_map(|&dir| {
                let next = here.step(dir);
                self.id(next).filter(|&nid| !self.node(nid).is_obstacle)
            })
            .collect()
    }

    /// Reset `g`, `rhs`, `h`, `f` and `parent` on every cell.
    pub fn reset_search_state(&mut self) {
        for node in &mut self.nodes {
            node.reset_scratch();
        }
    }

    /// Caller-side validation that `start` and `goal` are usable endpoints.
    /// The searches themselves assume this holds and do not re-check it.
    pub fn check_endpoints(&self, start: Coord, goal: Coord) -> Result<(), GridError> {
        for c in [start, goal] {
            let node = self.node_at(c).ok_or(GridError::OutOfBounds(c))?;
            if node.is_obstacle {
                return Err(GridError::BlockedEndpoint(c));
            }
        }
        Ok(())
    }
}
