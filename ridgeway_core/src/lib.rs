// ridgeway_core: slope-aware path planning over elevation grids.
//
// This crate plans a path across a 2D grid of cells that carry elevation,
// with several interchangeable strategies that all price moves through one
// slope-penalized cost model. It has no rendering, plotting, CLI, or map
// generation; callers build a populated `Grid` and read back paths plus
// instrumentation.
//
// Module overview:
// - `types.rs`:       Coord, NodeId, Direction.
// - `grid.rs`:        Dense row-major elevation grid with per-cell search scratch state.
// - `cost.rs`:        CostModel: slope-penalized edge cost and 3D straight-line heuristic.
// - `config.rs`:      PlannerConfig: every tunable parameter, loaded from JSON.
// - `error.rs`:       GridError, ConfigError.
// - `planner.rs`:     GraphSearch / SequenceOptimizer traits and their result types.
// - `pathfinding.rs`: Baseline A* and Dijkstra (also AD*'s fallback).
// - `adstar/`:        Anytime Dynamic A*: inflated passes plus incremental replanning.
// - `evolve/`:        Move-sequence metaheuristics: genetic algorithm, simulated
//                     annealing, producer/scrounger/sentinel swarm search.
// - `metrics.rs`:     RunMetrics: per-run path cost, length, effort.
// - `compare.rs`:     Strategy enum and the parallel side-by-side runner.
//
// **Scratch ownership.** Graph searches reset and write the `g`/`rhs`/`h`/
// `f`/`parent` fields of the grid they are given; metaheuristics only read
// terrain. Two searches must never share one grid at the same time; give
// each its own clone.
//
// **Determinism.** All randomness comes from `ChaCha8Rng` seeded from the
// config, and priority queues break ties by insertion order, so a given
// grid and config always produce the same paths.

pub mod adstar;
pub mod compare;
pub mod config;
pub mod cost;
pub mod error;
pub mod evolve;
pub mod grid;
pub mod metrics;
pub mod pathfinding;
pub mod planner;
pub mod types;
