// Producer/scrounger/sentinel swarm search over move sequences.
//
// Every iteration ranks the population by fitness and updates it in three
// roles:
// - Producers (the best-ranked `producer_fraction`): one alarm draw per
//   iteration decides the mode for all of them. Below `safety_threshold`
//   they search locally, re-rolling each gene with probability
//   `1 - exp(-(rank + 1) / (alpha * iterations))`, so better-ranked
//   producers move less. At or above it they flee to a fresh random genome.
// - Scroungers (everyone else): the lower-ranked half drifts, overwriting
//   genes at `scrounger_drift_rate` with genes picked from the worst
//   genome; the rest follow the best genome position by position at
//   `scrounger_follow_rate`.
// - Sentinels (a random `sentinel_fraction` of the whole population,
//   drawn fresh each iteration): re-roll genes at `sentinel_mutation_rate`
//   on top of whatever their role did.
//
// Best and worst are snapshotted before any updates. The population is
// re-scored after all three roles have run; one iteration costs
// `population_size` work units.

use super::genome::{Evaluation, random_direction, random_genome};
use super::{Incumbent, resolve_genome_length};
use crate::config::{PlannerConfig, SwarmParams};
use crate::cost::CostModel;
use crate::grid::Grid;
use crate::planner::{OptimizerResult, SequenceOptimizer};
use crate::types::{Coord, Direction};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub struct SwarmSearch {
    cost: CostModel,
    params: SwarmParams,
    seed: u64,
}

impl SwarmSearch {
    pub fn new(cost: CostModel, params: &SwarmParams, seed: u64) -> Self {
        Self {
            cost,
            params: params.clone(),
            seed,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(CostModel::from(&config.cost), &config.swarm, config.seed)
    }

    /// Number of producers and sentinels per iteration.
    pub fn role_counts(&self) -> (usize, usize) {
        let pop = self.params.population_size;
        let producers = (pop as f64 * self.params.producer_fraction) as usize;
        let sentinels = (pop as f64 * self.params.sentinel_fraction) as usize;
        (producers.min(pop), sentinels.min(pop))
    }

    /// Per-gene re-roll probability for the producer at `rank`.
    fn search_radius(&self, rank: usize) -> f64 {
        let scale = self.params.alpha * self.params.iterations.max(1) as f64;
        1.0 - (-(rank as f64 + 1.0) / scale).exp()
    }

    fn update_roles(
        &self,
        population: &mut [Vec<Direction>],
        evals: &[Evaluation],
        rng: &mut impl Rng,
    ) {
        let pop = population.len();
        let mut ranked: Vec<usize> = (0..pop).collect();
        ranked.sort_by(|&a, &b| evals[a].fitness.total_cmp(&evals[b].fitness).then(a.cmp(&b)));
        let (producers, sentinels) = self.role_counts();
        let (Some(&best_idx), Some(&worst_idx)) = (ranked.first(), ranked.last()) else {
            return;
        };
        let best = population[best_idx].clone();
        let worst = population[worst_idx].clone();

        let alarm: f64 = rng.random();
        for (rank, &i) in ranked.iter().enumerate().take(producers) {
            if alarm < self.params.safety_threshold {
                let radius = self.search_radius(rank);
                reroll(&mut population[i], radius, rng);
            } else {
                let len = population[i].len();
                population[i] = random_genome(rng, len);
            }
        }

        for (rank, &i) in ranked.iter().enumerate().skip(producers) {
            let genome = &mut population[i];
            if rank > pop / 2 {
                for gene in genome.iter_mut() {
                    if rng.random::<f64>() < self.params.scrounger_drift_rate && !worst.is_empty() {
                        *gene = worst[rng.random_range(0..worst.len())];
                    }
                }
            } else {
                for (gene, &leader) in genome.iter_mut().zip(&best) {
                    if rng.random::<f64>() < self.params.scrounger_follow_rate {
                        *gene = leader;
                    }
                }
            }
        }

        for i in index::sample(rng, pop, sentinels.min(pop)) {
            reroll(&mut population[i], self.params.sentinel_mutation_rate, rng);
        }
    }
}

fn reroll(genome: &mut [Direction], rate: f64, rng: &mut impl Rng) {
    for gene in genome.iter_mut() {
        if rng.random::<f64>() < rate {
            *gene = random_direction(rng);
        }
    }
}

impl SequenceOptimizer for SwarmSearch {
    fn name(&self) -> &'static str {
        "swarm"
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    fn find_path(&mut self, grid: &Grid, start: Coord, goal: Coord) -> OptimizerResult {
        let params = &self.params;
        let len = resolve_genome_length(grid, params.genome_length);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut population: Vec<Vec<Direction>> = (0..params.population_size)
            .map(|_| random_genome(&mut rng, len))
            .collect();

        let mut incumbent = Incumbent::default();
        let mut evals: Vec<Evaluation> = population
            .iter()
            .map(|g| self.fitness(grid, g, start, goal))
            .collect();
        for eval in &evals {
            incumbent.offer(eval);
        }

        let mut history = Vec::with_capacity(params.iterations);
        for _ in 0..params.iterations {
            self.update_roles(&mut population, &evals, &mut rng);
            evals = population
                .iter()
                .map(|g| self.fitness(grid, g, start, goal))
                .collect();
            for eval in &evals {
                incumbent.offer(eval);
            }
            history.push(incumbent.best_fitness());
        }

        let work_units = (params.iterations * params.population_size) as u64;
        debug!(
            best_fitness = incumbent.best_fitness(),
            iterations = params.iterations,
            work_units,
            "swarm search finished"
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

    fn small_params() -> SwarmParams {
        SwarmParams {
            population_size: 20,
            iterations: 60,
            ..SwarmParams::default()
        }
    }

    #[test]
    fn default_role_counts() {
        let swarm = SwarmSearch::new(CostModel::default(), &SwarmParams::default(), 0);
        assert_eq!(swarm.role_counts(), (6, 3));
    }

    #[test]
    fn better_ranked_producers_move_less() {
        let swarm = SwarmSearch::new(CostModel::default(), &SwarmParams::default(), 0);
        let r0 = swarm.search_radius(0);
        let r5 = swarm.search_radius(5);
        assert!(r0 > 0.0 && r0 < r5 && r5 < 1.0, "{r0} {r5}");
    }

    #[test]
    fn reports_history_and_work_units() {
        let grid = Grid::new(5, 5);
        let mut swarm = SwarmSearch::new(CostModel::default(), &small_params(), 42);
        let result = swarm.find_path(&grid, c(0, 0), c(4, 4));
        assert_eq!(result.history.len(), 60);
        assert_eq!(result.work_units, 60 * 20);
        for w in result.history.windows(2) {
            assert!(w[1] <= w[0]);
        }
        assert!(result.reached_goal);
        assert_eq!(result.path.last(), Some(&c(4, 4)));
    }

    #[test]
    fn paths_avoid_obstacles() {
        let mut grid = Grid::new(7, 7);
        for y in 0..6 {
            grid.set_obstacle(c(3, y), true);
        }
        let mut swarm = SwarmSearch::new(CostModel::default(), &small_params(), 9);
        let result = swarm.find_path(&grid, c(0, 0), c(6, 0));
        assert_eq!(result.path.first(), Some(&c(0, 0)));
        for &cell in &result.path {
            assert!(grid.is_passable(cell));
        }
        assert!(result.path.len() <= 28 + 1);
    }

    #[test]
    fn same_seed_same_result() {
        let grid = Grid::new(6, 6);
        let run = |seed| {
            SwarmSearch::new(CostModel::default(), &small_params(), seed).find_path(
                &grid,
                c(0, 5),
                c(5, 0),
            )
        };
        assert_eq!(run(3), run(3));
    }
}
