// Simulated annealing over a single move sequence.
//
// Each iteration re-rolls one random gene of the current genome, scores the
// neighbor, and accepts it by the Metropolis rule: always if it is no worse,
// otherwise with probability `exp(-delta / T)`. The temperature then cools
// multiplicatively; the run ends once it drops to `min_temperature`.
//
// The history records the best-ever fitness after each iteration, and one
// iteration is one work unit.

use super::genome::{random_direction, random_genome};
use super::{Incumbent, resolve_genome_length};
use crate::config::{AnnealParams, PlannerConfig};
use crate::cost::CostModel;
use crate::grid::Grid;
use crate::planner::{OptimizerResult, SequenceOptimizer};
use crate::types::Coord;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub struct SimulatedAnnealing {
    cost: CostModel,
    params: AnnealParams,
    seed: u64,
}

impl SimulatedAnnealing {
    pub fn new(cost: CostModel, params: &AnnealParams, seed: u64) -> Self {
        Self {
            cost,
            params: params.clone(),
            seed,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(CostModel::from(&config.cost), &config.annealing, config.seed)
    }
}

/// Metropolis criterion for a minimization: `delta` is new minus current.
pub fn metropolis_accept(delta: f64, temperature: f64, rng: &mut impl Rng) -> bool {
    if delta <= 0.0 {
        true
    } else {
        let probability = (-delta / temperature).exp();
        rng.random::<f64>() < probability
    }
}

impl SequenceOptimizer for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "annealing"
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    fn find_path(&mut self, grid: &Grid, start: Coord, goal: Coord) -> OptimizerResult {
        let params = &self.params;
        let len = resolve_genome_length(grid, params.genome_length);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut current = random_genome(&mut rng, len);
        let mut current_eval = self.fitness(grid, &current, start, goal);
        let mut incumbent = Incumbent::default();
        incumbent.offer(&current_eval);

        // A rate outside (0, 1), an infinite start or a floor at or below
        // zero would never let the temperature cross the floor.
        let cools = params.cooling_rate > 0.0
            && params.cooling_rate < 1.0
            && params.initial_temperature.is_finite();
        let floor = params.min_temperature.max(f64::MIN_POSITIVE);
        let mut temperature = params.initial_temperature;
        let mut history = Vec::new();
        let mut accepted = 0u64;

        while cools && temperature > floor {
            let mut candidate = current.clone();
            let gene = rng.random_range(0..len);
            candidate[gene] = random_direction(&mut rng);
            let eval = self.fitness(grid, &candidate, start, goal);

            if metropolis_accept(eval.fitness - current_eval.fitness, temperature, &mut rng) {
                current = candidate;
                current_eval = eval;
                incumbent.offer(&current_eval);
                accepted += 1;
            }
            history.push(incumbent.best_fitness());
            temperature *= params.cooling_rate;
        }

        let work_units = history.len() as u64;
        debug!(
            best_fitness = incumbent.best_fitness(),
            iterations = work_units,
            accepted,
            "annealing finished"
        );
        incumbent.into_result(history, work_units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn improvements_are_always_accepted() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..1000 {
            assert!(metropolis_accept(-3.0, 0.01, &mut rng));
            assert!(metropolis_accept(0.0, 0.01, &mut rng));
        }
    }

    #[test]
    fn worsening_acceptance_matches_boltzmann_probability() {
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let trials = 20_000;
        for (delta, temperature) in [(1.0, 2.0), (5.0, 5.0), (3.0, 1.0)] {
            let accepted = (0..trials)
                .filter(|_| metropolis_accept(delta, temperature, &mut rng))
                .count();
            let observed = accepted as f64 / trials as f64;
            let expected = (-delta / temperature).exp();
            assert!(
                (observed - expected).abs() < 0.02,
                "delta {delta}, T {temperature}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn iteration_count_follows_cooling_schedule() {
        let params = AnnealParams {
            initial_temperature: 10.0,
            cooling_rate: 0.5,
            min_temperature: 1.0,
            genome_length: Some(8),
        };
        let grid = Grid::new(4, 4);
        let mut sa = SimulatedAnnealing::new(CostModel::default(), &params, 3);
        let result = sa.find_path(&grid, c(0, 0), c(3, 3));
        // 10, 5, 2.5, 1.25 are all above the floor; 0.625 is not.
        assert_eq!(result.history.len(), 4);
        assert_eq!(result.work_units, 4);
    }

    #[test]
    fn finds_goal_and_history_never_worsens() {
        let grid = Grid::new(4, 4);
        let mut sa = SimulatedAnnealing::new(CostModel::default(), &AnnealParams::default(), 42);
        let result = sa.find_path(&grid, c(0, 0), c(3, 3));
        assert!(result.reached_goal);
        assert_eq!(result.path.first(), Some(&c(0, 0)));
        assert_eq!(result.path.last(), Some(&c(3, 3)));
        assert!(result.path.len() <= 17);
        assert_eq!(result.work_units, result.history.len() as u64);
        for w in result.history.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn cooling_rate_of_one_does_not_spin() {
        let params = AnnealParams {
            cooling_rate: 1.0,
            ..AnnealParams::default()
        };
        let grid = Grid::new(3, 3);
        let result = SimulatedAnnealing::new(CostModel::default(), &params, 0).find_path(
            &grid,
            c(0, 0),
            c(2, 2),
        );
        assert!(result.history.is_empty());
        assert_eq!(result.work_units, 0);
        assert!(!result.path.is_empty());
    }

    #[test]
    fn floor_at_or_below_zero_still_terminates() {
        let grid = Grid::new(3, 3);
        for floor in [0.0, -1.0, f64::NAN] {
            let params = AnnealParams {
                initial_temperature: 1.0,
                cooling_rate: 0.5,
                min_temperature: floor,
                ..AnnealParams::default()
            };
            let result = SimulatedAnnealing::new(CostModel::default(), &params, 3).find_path(
                &grid,
                c(0, 0),
                c(2, 2),
            );
            // Halving from 1.0 stops once the temperature reaches the
            // smallest normal f64, 2^-1022.
            assert_eq!(result.history.len(), 1022, "floor {floor}");
        }
    }

    #[test]
    fn infinite_start_temperature_does_not_spin() {
        let params = AnnealParams {
            initial_temperature: f64::INFINITY,
            ..AnnealParams::default()
        };
        let grid = Grid::new(3, 3);
        let result = SimulatedAnnealing::new(CostModel::default(), &params, 0).find_path(
            &grid,
            c(0, 0),
            c(2, 2),
        );
        assert_eq!(result.work_units, 0);
    }
}
