// Side-by-side strategy comparison.
//
// `run_strategy` runs one named strategy against a private clone of the
// grid and returns its path, convergence history (empty for the graph
// searches) and `RunMetrics`. `run_all` runs all six in parallel with
// rayon. Each run owns its own grid copy, so no scratch state is shared
// between threads.
//
// Endpoints are validated here, once, with `Grid::check_endpoints`; the
// planners themselves assume valid endpoints.

use crate::adstar::AdStar;
use crate::config::PlannerConfig;
use crate::cost::CostModel;
use crate::error::GridError;
use crate::evolve::{GeneticSearch, SimulatedAnnealing, SwarmSearch};
use crate::grid::Grid;
use crate::metrics::RunMetrics;
use crate::pathfinding::{AStar, Dijkstra};
use crate::planner::{GraphSearch, SequenceOptimizer};
use crate::types::Coord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    Dijkstra,
    AStar,
    AdStar,
    Genetic,
    Annealing,
    Swarm,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Dijkstra,
        Strategy::AStar,
        Strategy::AdStar,
        Strategy::Genetic,
        Strategy::Annealing,
        Strategy::Swarm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Dijkstra => "Dijkstra",
            Strategy::AStar => "A*",
            Strategy::AdStar => "AD*",
            Strategy::Genetic => "GA",
            Strategy::Annealing => "SA",
            Strategy::Swarm => "SSA",
        }
    }

    /// Whether the strategy is an exhaustive graph search (as opposed to a
    /// sequence optimizer).
    pub fn is_graph_search(self) -> bool {
        matches!(self, Strategy::Dijkstra | Strategy::AStar | Strategy::AdStar)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub struct StrategyRun {
    pub strategy: Strategy,
    pub path: Vec<Coord>,
    /// Best fitness per generation/iteration; empty for graph searches.
    pub history: Vec<f64>,
    pub metrics: RunMetrics,
}

/// Run one strategy on a clone of `grid`.
pub fn run_strategy(
    strategy: Strategy,
    grid: &Grid,
    start: Coord,
    goal: Coord,
    config: &PlannerConfig,
) -> Result<StrategyRun, GridError> {
    grid.check_endpoints(start, goal)?;
    let mut scratch = grid.clone();
    let model = CostModel::from(&config.cost);

    let timer = Instant::now();
    let (path, history, work_units) = match strategy {
        Strategy::Dijkstra => graph(&mut Dijkstra::new(model.clone()), &mut scratch, start, goal),
        Strategy::AStar => graph(&mut AStar::new(model.clone()), &mut scratch, start, goal),
        Strategy::AdStar => graph(
            &mut AdStar::new(model.clone(), &config.adstar),
            &mut scratch,
            start,
            goal,
        ),
        Strategy::Genetic => {
            sequence(&mut GeneticSearch::from_config(config), &scratch, start, goal)
        }
        Strategy::Annealing => {
            sequence(&mut SimulatedAnnealing::from_config(config), &scratch, start, goal)
        }
        Strategy::Swarm => sequence(&mut SwarmSearch::from_config(config), &scratch, start, goal),
    };
    let elapsed = timer.elapsed();

    let metrics = RunMetrics::measure(
        strategy.name(),
        grid,
        &model,
        &path,
        goal,
        elapsed,
        work_units,
    );
    info!(
        strategy = %strategy,
        cost = metrics.path_cost,
        reached_goal = metrics.reached_goal,
        work_units,
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "strategy finished"
    );
    Ok(StrategyRun {
        strategy,
        path,
        history,
        metrics,
    })
}

/// Run every strategy in parallel, each on its own grid clone. Results come
/// back in `Strategy::ALL` order.
pub fn run_all(
    grid: &Grid,
    start: Coord,
    goal: Coord,
    config: &PlannerConfig,
) -> Result<Vec<StrategyRun>, GridError> {
    grid.check_endpoints(start, goal)?;
    Strategy::ALL
        .par_iter()
        .map(|&strategy| run_strategy(strategy, grid, start, goal, config))
        .collect()
}

fn graph(
    search: &mut impl GraphSearch,
    grid: &mut Grid,
    start: Coord,
    goal: Coord,
) -> (Vec<Coord>, Vec<f64>, u64) {
    let result = search.find_path(grid, start, goal);
    (result.path, Vec::new(), result.expansions)
}

fn sequence(
    optimizer: &mut impl SequenceOptimizer,
    grid: &Grid,
    start: Coord,
    goal: Coord,
) -> (Vec<Coord>, Vec<f64>, u64) {
    let result = optimizer.find_path(grid, start, goal);
    (result.path, result.history, result.work_units)
}
