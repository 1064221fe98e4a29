// Planner interfaces and result types.
//
// Two capability sets share the grid and cost contracts but differ in how
// they treat the grid:
//
// - `GraphSearch` (Dijkstra, A*, AD*) takes `&mut Grid` and owns the per-cell
//   scratch fields for the duration of a run.
// - `SequenceOptimizer` (genetic algorithm, simulated annealing, swarm
//   search) takes `&Grid`: it reads terrain and obstacles only, and searches
//   over fixed-length move sequences that decode to walked paths.
//
// Both report instrumentation alongside the path (expansion counts, or a
// convergence history plus work units) for external logging and plotting.

use crate::cost::CostModel;
use crate::evolve::genome::{self, Evaluation};
use crate::grid::Grid;
use crate::types::{Coord, Direction, NodeId};

// ---------------------------------------------------------------------------
// Graph searches
// ---------------------------------------------------------------------------

/// Outcome of a graph search.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    /// Coordinates from start to goal inclusive. Empty when no path was found.
    pub path: Vec<Coord>,
    /// Total edge cost of `path`; infinite when `path` is empty.
    pub cost: f64,
    /// Nodes expanded (popped and processed), the work-unit metric.
    pub expansions: u64,
}

impl SearchResult {
    pub fn not_found(expansions: u64) -> Self {
        Self {
            path: Vec::new(),
            cost: f64::INFINITY,
            expansions,
        }
    }

    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Exhaustive/incremental searches that write scratch state into the grid.
pub trait GraphSearch {
    fn name(&self) -> &'static str;

    fn cost_model(&self) -> &CostModel;

    /// Heuristic estimate from `node` toward `target`.
    fn heuristic(&self, grid: &Grid, node: NodeId, target: NodeId) -> f64 {
        self.cost_model().heuristic(grid, node, target)
    }

    /// Cost of the move from `a` to adjacent `b`.
    fn cost(&self, grid: &Grid, a: NodeId, b: NodeId) -> f64 {
        self.cost_model().edge_cost(grid, a, b)
    }

    /// Plan a path. `start` and `goal` must be in bounds and passable.
    fn find_path(&mut self, grid: &mut Grid, start: Coord, goal: Coord) -> SearchResult;
}

// ---------------------------------------------------------------------------
// Move-sequence optimizers
// ---------------------------------------------------------------------------

/// Outcome of a metaheuristic run.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizerResult {
    /// Best goal-reaching path found, or the best-effort partial walk of the
    /// fittest individual when nothing reached the goal.
    pub path: Vec<Coord>,
    pub reached_goal: bool,
    /// Step cost of `path` (no unreached-goal penalty).
    pub cost: f64,
    /// Best-ever fitness after each generation or iteration.
    pub history: Vec<f64>,
    /// Fitness evaluations performed, for cross-strategy effort comparison.
    pub work_units: u64,
}

/// Population/trajectory searches over fixed-length move sequences.
pub trait SequenceOptimizer {
    fn name(&self) -> &'static str;

    fn cost_model(&self) -> &CostModel;

    /// Walk `genome` from `start`. See `genome::decode_path`.
    fn decode(&self, grid: &Grid, genome: &[Direction], start: Coord, goal: Coord) -> Vec<Coord> {
        genome::decode_path(grid, genome, start, goal)
    }

    /// Path cost plus the unreached-goal penalty. Lower is better.
    fn fitness(&self, grid: &Grid, genome: &[Direction], start: Coord, goal: Coord) -> Evaluation {
        let path = self.decode(grid, genome, start, goal);
        genome::evaluate_path(self.cost_model(), grid, path, goal)
    }

    fn find_path(&mut self, grid: &Grid, start: Coord, goal: Coord) -> OptimizerResult;
}
