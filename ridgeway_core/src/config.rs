// Planner configuration.
//
// All tunable parameters live in `PlannerConfig`, a plain value passed into
// planner constructors. Nothing in the crate reads process-wide state: two
// planners built from different configs can coexist in one process. The
// config loads from JSON and is never mutated by the planners.
//
// Parameters are grouped per concern:
// - `GridParams`:    dimensions and obstacle density for external map
//                    generators (the planners themselves read the `Grid`).
// - `CostParams`:    slope penalty coefficients shared by every strategy.
// - `AdStarParams`:  inflation schedule and safety caps for AD*.
// - `GeneticParams`, `AnnealParams`, `SwarmParams`: metaheuristic
//                    hyperparameters.
//
// See also: `cost.rs` which turns `CostParams` into a `CostModel`,
// `compare.rs` which builds every planner from one config.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Map dimensions and density, consumed by map generators outside this crate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub width: u32,
    pub height: u32,
    /// Fraction of cells (0.0–1.0) a generator should turn into obstacles.
    pub obstacle_density: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            obstacle_density: 0.1,
        }
    }
}

/// Slope penalty: `cost = base * (1 + alpha * dz^p) + beta * dz^p`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParams {
    /// Multiplicative slope penalty on the planar step length.
    pub alpha: f64,
    /// Additive slope penalty.
    pub beta: f64,
    /// Exponent `p` applied to the absolute height difference.
    pub exponent: i32,
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            beta: 1.0,
            exponent: 2,
        }
    }
}

/// AD* inflation schedule and runaway guards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AdStarParams {
    /// Heuristic inflation for the first pass. 1.0 means a single optimal pass.
    pub initial_epsilon: f64,
    /// Amount epsilon drops between passes (floored at 1.0).
    pub epsilon_step: f64,
    /// Pops allowed in one `compute_shortest_path` pass before it gives up.
    pub max_iterations_per_pass: u64,
    /// OPEN length (stale entries included) that aborts a pass.
    pub max_open_size: usize,
}

impl Default for AdStarParams {
    fn default() -> Self {
        Self {
            initial_epsilon: 2.0,
            epsilon_step: 0.5,
            max_iterations_per_pass: 1_000_000,
            max_open_size: 4_000_000,
        }
    }
}

/// Crossover operator for the genetic algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    OnePoint,
    TwoPoint,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Individuals sampled per tournament.
    pub tournament_size: usize,
    pub crossover: Crossover,
    /// Generations without a best-ever improvement before the mutation rate
    /// doubles. `None` keeps the rate fixed.
    pub stagnation_window: Option<usize>,
    /// Ceiling for the boosted mutation rate.
    pub max_mutation_rate: f64,
    /// Moves per individual. `None` means `(width + height) * 2`.
    pub genome_length: Option<usize>,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.02,
            elite_count: 2,
            tournament_size: 3,
            crossover: Crossover::TwoPoint,
            stagnation_window: Some(20),
            max_mutation_rate: 0.5,
            genome_length: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealParams {
    pub initial_temperature: f64,
    /// Multiplicative cooling per iteration, in (0, 1).
    pub cooling_rate: f64,
    /// Annealing stops once the temperature falls below this.
    pub min_temperature: f64,
    pub genome_length: Option<usize>,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            min_temperature: 0.1,
            genome_length: None,
        }
    }
}

/// Producer/scrounger/sentinel swarm search.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmParams {
    pub population_size: usize,
    pub iterations: usize,
    /// Best-ranked fraction acting as producers.
    pub producer_fraction: f64,
    /// Fraction drawn at random each iteration as sentinels.
    pub sentinel_fraction: f64,
    /// Alarm draws below this keep producers in wide-search mode;
    /// draws at or above it make them flee.
    pub safety_threshold: f64,
    /// Scale of the producer search radius decay.
    pub alpha: f64,
    /// Per-gene probability a low-ranked scrounger copies from the worst.
    pub scrounger_drift_rate: f64,
    /// Per-gene probability a scrounger copies from the best.
    pub scrounger_follow_rate: f64,
    /// Per-gene probability a sentinel re-randomizes.
    pub sentinel_mutation_rate: f64,
    pub genome_length: Option<usize>,
}

impl Default for SwarmParams {
    fn default() -> Self {
        Self {
            population_size: 30,
            iterations: 100,
            producer_fraction: 0.2,
            sentinel_fraction: 0.1,
            safety_threshold: 0.8,
            alpha: 0.8,
            scrounger_drift_rate: 0.2,
            scrounger_follow_rate: 0.5,
            sentinel_mutation_rate: 0.3,
            genome_length: None,
        }
    }
}

/// Top-level configuration. Loaded from JSON, never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub grid: GridParams,
    pub cost: CostParams,
    pub adstar: AdStarParams,
    pub genetic: GeneticParams,
    pub annealing: AnnealParams,
    pub swarm: SwarmParams,
    /// Seed for every stochastic strategy.
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            grid: GridParams::default(),
            cost: CostParams::default(),
            adstar: AdStarParams::default(),
            genetic: GeneticParams::default(),
            annealing: AnnealParams::default(),
            swarm: SwarmParams::default(),
            seed: 42,
        }
    }
}

impl PlannerConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject values the planners cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("grid.obstacle_density", self.grid.obstacle_density)?;

        if !at_least(self.cost.alpha, 0.0) || !at_least(self.cost.beta, 0.0) {
            return Err(ConfigError::invalid(
                "cost",
                "alpha and beta must be non-negative",
            ));
        }
        if self.cost.exponent < 0 {
            return Err(ConfigError::invalid("cost.exponent", "must be >= 0"));
        }

        let ad = &self.adstar;
        if !at_least(ad.initial_epsilon, 1.0) {
            return Err(ConfigError::invalid("adstar.initial_epsilon", "must be >= 1.0"));
        }
        if !positive(ad.epsilon_step) {
            return Err(ConfigError::invalid("adstar.epsilon_step", "must be > 0"));
        }
        if ad.max_iterations_per_pass == 0 || ad.max_open_size == 0 {
            return Err(ConfigError::invalid("adstar", "safety caps must be > 0"));
        }

        let ga = &self.genetic;
        if ga.population_size <= ga.elite_count {
            return Err(ConfigError::invalid(
                "genetic.population_size",
                format!("must exceed elite_count ({})", ga.elite_count),
            ));
        }
        if ga.tournament_size == 0 || ga.tournament_size > ga.population_size {
            return Err(ConfigError::invalid(
                "genetic.tournament_size",
                "must be in 1..=population_size",
            ));
        }
        check_fraction("genetic.mutation_rate", ga.mutation_rate)?;
        check_fraction("genetic.max_mutation_rate", ga.max_mutation_rate)?;
        check_genome_length("genetic.genome_length", ga.genome_length)?;

        let sa = &self.annealing;
        if !positive(sa.cooling_rate) || sa.cooling_rate >= 1.0 {
            return Err(ConfigError::invalid(
                "annealing.cooling_rate",
                "must be in (0, 1)",
            ));
        }
        if !positive(sa.min_temperature) {
            return Err(ConfigError::invalid("annealing.min_temperature", "must be > 0"));
        }
        check_genome_length("annealing.genome_length", sa.genome_length)?;

        let sw = &self.swarm;
        if sw.population_size < 2 {
            return Err(ConfigError::invalid("swarm.population_size", "must be >= 2"));
        }
        check_fraction("swarm.producer_fraction", sw.producer_fraction)?;
        check_fraction("swarm.sentinel_fraction", sw.sentinel_fraction)?;
        check_fraction("swarm.safety_threshold", sw.safety_threshold)?;
        check_fraction("swarm.scrounger_drift_rate", sw.scrounger_drift_rate)?;
        check_fraction("swarm.scrounger_follow_rate", sw.scrounger_follow_rate)?;
        check_fraction("swarm.sentinel_mutation_rate", sw.sentinel_mutation_rate)?;
        if !positive(sw.alpha) {
            return Err(ConfigError::invalid("swarm.alpha", "must be > 0"));
        }
        check_genome_length("swarm.genome_length", sw.genome_length)?;

        Ok(())
    }
}

// NaN fails both of these.
fn at_least(value: f64, floor: f64) -> bool {
    value >= floor
}

fn positive(value: f64) -> bool {
    value > 0.0
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn check_genome_length(field: &'static str, len: Option<usize>) -> Result<(), ConfigError> {
    match len {
        Some(0) => Err(ConfigError::invalid(field, "must be > 0")),
        _ => Ok(()),
    }
}
