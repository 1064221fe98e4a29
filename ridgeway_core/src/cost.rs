// Slope-penalized edge cost and elevation-aware heuristic.
//
// Every strategy in the crate prices moves through one `CostModel`, so path
// costs are comparable across Dijkstra, A*, AD* and the metaheuristics.
//
// For two adjacent cells with planar deltas `dx, dy` and absolute height
// difference `dz`:
//
//     base    = sqrt(dx² + dy²)
//     penalty = 1 + alpha * dz^p
//     cost    = base * penalty + beta * dz^p
//
// so a climb costs disproportionately more as the slope grows. The cost is
// symmetric (`dz` is an absolute value), which AD* relies on when it treats
// grid neighbors as both predecessors and successors.
//
// The heuristic is the 3D straight-line distance between the two cells,
// `sqrt(dx² + dy² + dh²)`, with no slope penalty. With the default
// coefficients a step costs at least its own straight-line length, so the
// heuristic does not overestimate; other coefficients (e.g. `alpha = beta =
// 0`) can break that, and nothing in the searches depends on it for
// termination.

use crate::config::CostParams;
use crate::grid::Grid;
use crate::types::{Coord, NodeId};

#[derive(Clone, Debug, PartialEq)]
pub struct CostModel {
    pub alpha: f64,
    pub beta: f64,
    pub exponent: i32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::from(&CostParams::default())
    }
}

impl From<&CostParams> for CostModel {
    fn from(params: &CostParams) -> Self {
        Self {
            alpha: params.alpha,
            beta: params.beta,
            exponent: params.exponent,
        }
    }
}

impl CostModel {
    /// Cost of one move between coordinates with the given heights.
    fn price(&self, from: Coord, to: Coord, from_height: f64, to_height: f64) -> f64 {
        let base = from.planar_distance(to);
        let slope = (to_height - from_height).abs().powi(self.exponent);
        base * (1.0 + self.alpha * slope) + self.beta * slope
    }

    /// Cost of moving from node `a` to adjacent node `b`.
    pub fn edge_cost(&self, grid: &Grid, a: NodeId, b: NodeId) -> f64 {
        let na = grid.node(a);
        let nb = grid.node(b);
        self.price(na.coord(), nb.coord(), na.height, nb.height)
    }

    /// Cost of moving between two coordinates, reading heights from `grid`.
    pub fn step_cost(&self, grid: &Grid, a: Coord, b: Coord) -> f64 {
        self.price(a, b, grid.height_at(a), grid.height_at(b))
    }

    /// Straight-line 3D distance from `from` to `target`, ignoring the slope
    /// penalty.
    pub fn heuristic(&self, grid: &Grid, from: NodeId, target: NodeId) -> f64 {
        let a = grid.node(from);
        let b = grid.node(target);
        let dx = f64::from(b.x - a.x);
        let dy = f64::from(b.y - a.y);
        let dh = b.height - a.height;
        (dx * dx + dy * dy + dh * dh).sqrt()
    }

    /// Sum of step costs along a path of coordinates. Empty and single-cell
    /// paths cost 0.
    pub fn path_cost(&self, grid: &Grid, path: &[Coord]) -> f64 {
        path.windows(2)
            .map(|w| self.step_cost(grid, w[0], w[1]))
            .sum()
    }
}
