// Metaheuristic path optimizers over fixed-length move sequences.
//
// Three strategies share one representation (see `genome.rs`) and one
// fitness function:
// - `genetic.rs`: elitist GA with tournament selection, one/two-point
//   crossover, per-gene mutation, and a mutation boost on stagnation.
// - `anneal.rs`: single-trajectory simulated annealing with Metropolis
//   acceptance and multiplicative cooling.
// - `swarm.rs`: producer/scrounger/sentinel swarm search.
//
// All of them only read the grid. Each run draws from its own
// `ChaCha8Rng` seeded from the config, so a given seed and grid always
// reproduce the same result.
//
// `Incumbent` tracks the two "bests" every strategy reports: the best
// goal-reaching path (what the caller actually wants) and the best fitness
// overall (what the convergence history plots, and the fallback path when
// nothing reached the goal).

pub mod anneal;
pub mod genetic;
pub mod genome;
pub mod swarm;

pub use anneal::SimulatedAnnealing;
pub use genetic::GeneticSearch;
pub use swarm::SwarmSearch;

use crate::grid::Grid;
use crate::planner::OptimizerResult;
use genome::{Evaluation, default_genome_length};

/// Genome length from an optional override, defaulting from grid size.
pub(crate) fn resolve_genome_length(grid: &Grid, configured: Option<usize>) -> usize {
    configured.unwrap_or_else(|| default_genome_length(grid)).max(1)
}

#[derive(Default)]
pub(crate) struct Incumbent {
    fittest: Option<Evaluation>,
    feasible: Option<Evaluation>,
}

impl Incumbent {
    /// Offer a candidate. Returns `true` if it improved the best fitness.
    pub(crate) fn offer(&mut self, eval: &Evaluation) -> bool {
        if eval.reached && self.feasible.as_ref().is_none_or(|f| eval.cost < f.cost) {
            self.feasible = Some(eval.clone());
        }
        if self.fittest.as_ref().is_none_or(|f| eval.fitness < f.fitness) {
            self.fittest = Some(eval.clone());
            return true;
        }
        false
    }

    pub(crate) fn best_fitness(&self) -> f64 {
        self.fittest.as_ref().map_or(f64::INFINITY, |e| e.fitness)
    }

    pub(crate) fn into_result(self, history: Vec<f64>, work_units: u64) -> OptimizerResult {
        let chosen = self.feasible.or(self.fittest);
        match chosen {
            Some(eval) => OptimizerResult {
                reached_goal: eval.reached,
                cost: eval.cost,
                path: eval.path,
                history,
                work_units,
            },
            None => OptimizerResult {
                path: Vec::new(),
                reached_goal: false,
                cost: f64::INFINITY,
                history,
                work_units,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn eval(fitness: f64, cost: f64, reached: bool) -> Evaluation {
        Evaluation {
            fitness,
            cost,
            path: vec![Coord::new(0, 0)],
            reached,
        }
    }

    #[test]
    fn incumbent_prefers_feasible_paths() {
        let mut inc = Incumbent::default();
        assert!(inc.offer(&eval(5.0, 5.0, false)));
        assert!(!inc.offer(&eval(9.0, 9.0, true)));
        assert_eq!(inc.best_fitness(), 5.0);
        let result = inc.into_result(vec![5.0], 2);
        assert!(result.reached_goal);
        assert_eq!(result.cost, 9.0);
    }

    #[test]
    fn incumbent_falls_back_to_fittest() {
        let mut inc = Incumbent::default();
        inc.offer(&eval(30.0, 3.0, false));
        inc.offer(&eval(20.0, 4.0, false));
        let result = inc.into_result(Vec::new(), 0);
        assert!(!result.reached_goal);
        assert_eq!(result.cost, 4.0);
    }

    #[test]
    fn empty_incumbent_reports_nothing() {
        let result = Incumbent::default().into_result(Vec::new(), 0);
        assert!(result.path.is_empty());
        assert_eq!(result.cost, f64::INFINITY);
    }

    #[test]
    fn genome_length_override() {
        let grid = Grid::new(5, 5);
        assert_eq!(resolve_genome_length(&grid, None), 20);
        assert_eq!(resolve_genome_length(&grid, Some(7)), 7);
    }
}
