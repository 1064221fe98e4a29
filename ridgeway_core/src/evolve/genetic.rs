// Genetic algorithm over move sequences.
//
// Each generation:
// 1. Score every genome (see `genome::evaluate_path`).
// 2. Copy the `elite_count` fittest genomes unchanged.
// 3. Fill the rest with children: two tournament winners, crossed over
//    (one- or two-point), then mutated gene by gene.
//
// If `stagnation_window` generations pass without the best-ever fitness
// improving, the mutation rate doubles (capped at `max_mutation_rate`) until
// the next improvement.

use super::genome::{Evaluation, random_direction, random_genome};
use super::{Incumbent, resolve_genome_length};
use crate::config::{Crossover, GeneticParams, PlannerConfig};
use crate::cost::CostModel;
use crate::grid::Grid;
use crate::planner::{OptimizerResult, SequenceOptimizer};
use crate::types::{Coord, Direction};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub struct GeneticSearch {
    cost: CostModel,
    params: GeneticParams,
    seed: u64,
}

impl GeneticSearch {
    pub fn new(cost: CostModel, params: &GeneticParams, seed: u64) -> Self {
        Self {
            cost,
            params: params.clone(),
            seed,
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(CostModel::from(&config.cost), &config.genetic, config.seed)
    }

    /// Breed the next population from the current one and its fitness
    /// scores (lower is better). The first `elite_count` entries of the
    /// result are the elite, fittest first.
    pub fn next_generation(
        &self,
        population: &[Vec<Direction>],
        scores: &[f64],
        mutation_rate: f64,
        rng: &mut impl Rng,
    ) -> Vec<Vec<Direction>> {
        let target = self.params.population_size;
        let mut next = Vec::with_capacity(target);
        if population.is_empty() {
            return next;
        }

        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));
        next.extend(
            ranked
                .iter()
                .take(self.params.elite_count.min(target))
                .map(|&i| population[i].clone()),
        );

        while next.len() < target {
            let a = &population[self.tournament(scores, rng)];
            let b = &population[self.tournament(scores, rng)];
            let mut child = self.crossover(a, b, rng);
            mutate(&mut child, mutation_rate, rng);
            next.push(child);
        }
        next
    }

    /// Index of the fittest of `tournament_size` distinct random picks.
    fn tournament(&self, scores: &[f64], rng: &mut impl Rng) -> usize {
        let k = self.params.tournament_size.clamp(1, scores.len());
        index::sample(rng, scores.len(), k)
            .into_iter()
            .min_by(|&a, &b| scores[a].total_cmp(&scores[b]))
            .unwrap_or(0)
    }

    fn crossover(&self, a: &[Direction], b: &[Direction], rng: &mut impl Rng) -> Vec<Direction> {
        let len = a.len().min(b.len());
        if len < 2 {
            return a.to_vec();
        }
        let (lo, hi) = match self.params.crossover {
            Crossover::OnePoint => (rng.random_range(1..len), len),
            Crossover::TwoPoint => {
                let picks = index::sample(rng, len, 2);
                let (p, q) = (picks.index(0), picks.index(1));
                (p.min(q), p.max(q))
            }
        };
        let mut child = Vec::with_capacity(len);
        child.extend_from_slice(&a[..lo]);
        child.extend_from_slice(&b[lo..hi]);
        child.extend_from_slice(&a[hi..len]);
        child
    }

    fn boosted_rate(&self) -> f64 {
        (self.params.mutation_rate * 2.0).min(self.params.max_mutation_rate)
    }
}

/// Re-roll each gene with probability `rate`.
fn mutate(genome: &mut [Direction], rate: f64, rng: &mut impl Rng) {
    for gene in genome.iter_mut() {
        if rng.random::<f64>() < rate {
            *gene = random_direction(rng);
        }
    }
}

impl SequenceOptimizer for GeneticSearch {
    fn name(&self) -> &'static str {
        "genetic"
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
        let mut history = Vec::with_capacity(params.generations);
        let mut stagnant = 0usize;

        for generation in 0..params.generations {
            let evals: Vec<Evaluation> = population
                .iter()
                .map(|g| self.fitness(grid, g, start, goal))
                .collect();
            let mut improved = false;
            for eval in &evals {
                improved |= incumbent.offer(eval);
            }
            history.push(incumbent.best_fitness());

            if improved {
                stagnant = 0;
            } else {
                stagnant += 1;
            }
            let rate = match params.stagnation_window {
                Some(window) if stagnant >= window => {
                    if stagnant == window {
                        debug!(
                            generation,
                            rate = self.boosted_rate(),
                            "GA stagnating, boosting mutation"
                        );
                    }
                    self.boosted_rate()
                }
                _ => params.mutation_rate,
            };

            if generation + 1 < params.generations {
                let scores: Vec<f64> = evals.iter().map(|e| e.fitness).collect();
                population = self.next_generation(&population, &scores, rate, &mut rng);
            }
        }

        let work_units = (params.generations * params.population_size) as u64;
        debug!(
            best_fitness = incumbent.best_fitness(),
            generations = params.generations,
            work_units,
            "GA finished"
        );
        incumbent.into_result(history, work_units)
    }
}
