// Cross-strategy scenario tests.
//
// Each test builds a map from the fixtures in `ridgeway_scenarios` and checks
// behavior that spans several planners: graph searches agreeing on optimal
// cost, AD*'s anytime and replanning guarantees, and the metaheuristics'
// decoded-path invariants on the same maps.

use ridgeway_core::adstar::AdStar;
use ridgeway_core::compare::{Strategy, run_all};
use ridgeway_core::config::{AdStarParams, PlannerConfig};
use ridgeway_core::cost::CostModel;
use ridgeway_core::evolve::genome::default_genome_length;
use ridgeway_core::evolve::{GeneticSearch, SimulatedAnnealing, SwarmSearch};
use ridgeway_core::grid::Grid;
use ridgeway_core::pathfinding::{AStar, Dijkstra};
use ridgeway_core::planner::{GraphSearch, SequenceOptimizer};
use ridgeway_core::types::Coord;
use ridgeway_scenarios::{
    flat_grid, init_tracing, random_terrain, ridge_grid, walled_grid_with_gap,
};

fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

fn graph_searches(config: &PlannerConfig) -> Vec<Box<dyn GraphSearch>> {
    let model = CostModel::from(&config.cost);
    vec![
        Box::new(Dijkstra::new(model.clone())),
        Box::new(AStar::new(model.clone())),
        Box::new(AdStar::new(model, &config.adstar)),
    ]
}

fn optimizers(config: &PlannerConfig) -> Vec<Box<dyn SequenceOptimizer>> {
    vec![
        Box::new(GeneticSearch::from_config(config)),
        Box::new(SimulatedAnnealing::from_config(config)),
        Box::new(SwarmSearch::from_config(config)),
    ]
}

fn assert_walk(grid: &Grid, path: &[Coord], start: Coord, max_len: usize, who: &str) {
    assert_eq!(path.first(), Some(&start), "{who}: path must begin at start");
    assert!(path.len() <= max_len, "{who}: {} cells > {max_len}", path.len());
    for &cell in path {
        assert!(grid.in_bounds(cell), "{who}: {cell} out of bounds");
        assert!(grid.is_passable(cell), "{who}: {cell} is an obstacle");
    }
    for w in path.windows(2) {
        assert_eq!(w[0].manhattan_distance(w[1]), 1, "{who}: jump {} -> {}", w[0], w[1]);
    }
}

// ---------------------------------------------------------------------------
// Graph searches
// ---------------------------------------------------------------------------

#[test]
fn flat_five_by_five_costs_eight_for_every_graph_search() {
    init_tracing();
    let mut config = PlannerConfig::default();
    config.adstar.initial_epsilon = 1.0;
    for mut search in graph_searches(&config) {
        let mut grid = flat_grid(5, 5);
        let result = search.find_path(&mut grid, c(0, 0), c(4, 4));
        assert_eq!(result.path.len(), 9, "{}", search.name());
        assert_eq!(result.cost, 8.0, "{}", search.name());
    }
}

#[test]
fn adstar_converges_to_baseline_optimum_on_random_terrain() {
    init_tracing();
    let start = c(0, 0);
    let goal = c(24, 19);
    for seed in 0..6 {
        let grid = random_terrain(25, 20, 2.0, 0.2, seed, &[start, goal]);
        let mut reference = grid.clone();
        let optimum = Dijkstra::default().find_path(&mut reference, start, goal);

        let mut work = grid.clone();
        let mut adstar = AdStar::default();
        let result = adstar.find_path(&mut work, start, goal);
        if optimum.is_found() {
            assert!(
                (result.cost - optimum.cost).abs() < 1e-9,
                "seed {seed}: AD* {} vs Dijkstra {}",
                result.cost,
                optimum.cost
            );
            assert!(!adstar.used_fallback(), "seed {seed}");
        } else {
            assert!(result.path.is_empty(), "seed {seed}");
        }
    }
}

#[test]
fn adstar_best_cost_is_monotone_across_phases() {
    init_tracing();
    let start = c(0, 15);
    let goal = c(29, 0);
    let params = AdStarParams {
        initial_epsilon: 5.0,
        epsilon_step: 0.5,
        ..AdStarParams::default()
    };
    for seed in 10..14 {
        let mut grid = random_terrain(30, 16, 3.0, 0.15, seed, &[start, goal]);
        let mut adstar = AdStar::new(CostModel::default(), &params);
        adstar.find_path(&mut grid, start, goal);
        let phases = adstar.phases();
        assert_eq!(phases.len(), 9, "5.0 down to 1.0 in steps of 0.5");
        for w in phases.windows(2) {
            assert!(w[1].epsilon < w[0].epsilon);
            assert!(w[1].best_cost <= w[0].best_cost, "seed {seed}: {w:?}");
        }
    }
}

#[test]
fn empty_replan_is_a_no_op() {
    init_tracing();
    let start = c(1, 1);
    let goal = c(18, 13);
    let mut grid = random_terrain(20, 15, 2.5, 0.1, 77, &[start, goal]);
    let mut adstar = AdStar::default();
    let first = adstar.find_path(&mut grid, start, goal);
    for _ in 0..3 {
        let again = adstar.replan_after_changes(&mut grid, &[]);
        assert_eq!(again.path, first.path);
        assert_eq!(again.cost, first.cost);
    }
}

#[test]
fn ridge_is_walked_around_not_over() {
    init_tracing();
    let config = PlannerConfig::default();
    for mut search in graph_searches(&config) {
        let mut grid = ridge_grid(7, 5, 3, 4.0);
        let result = search.find_path(&mut grid, c(0, 0), c(6, 0));
        assert!(
            result.path.contains(&c(3, 4)),
            "{} should cross at ground level: {:?}",
            search.name(),
            result.path
        );
        // Down four rows, six across, back up.
        assert_eq!(result.cost, 14.0, "{}", search.name());
    }
}

// ---------------------------------------------------------------------------
// Wall with a gap, then replanning after the wall is removed
// ---------------------------------------------------------------------------

#[test]
fn every_strategy_routes_through_the_gap() {
    init_tracing();
    let config = PlannerConfig::default();
    let walled = walled_grid_with_gap(7, 5, 3, 2);
    let (start, goal) = (c(0, 2), c(6, 2));

    for mut search in graph_searches(&config) {
        let mut grid = walled.grid.clone();
        let result = search.find_path(&mut grid, start, goal);
        assert!(result.path.contains(&walled.gap), "{}", search.name());
    }

    let mut any_reached = false;
    for mut optimizer in optimizers(&config) {
        let result = optimizer.find_path(&walled.grid, start, goal);
        let max_len = default_genome_length(&walled.grid) + 1;
        assert_walk(&walled.grid, &result.path, start, max_len, optimizer.name());
        if result.reached_goal {
            any_reached = true;
            assert!(result.path.contains(&walled.gap), "{}", optimizer.name());
        }
    }
    assert!(any_reached, "no metaheuristic crossed the wall");
}

#[test]
fn replan_after_wall_removal_drops_to_open_optimum() {
    init_tracing();
    let mut walled = walled_grid_with_gap(12, 10, 6, 9);
    let (start, goal) = (c(0, 0), c(11, 0));
    let mut adstar = AdStar::default();

    let blocked = adstar.find_path(&mut walled.grid, start, goal);
    assert!(blocked.path.contains(&walled.gap));

    for &cell in &walled.wall {
        assert!(walled.grid.set_obstacle(cell, false));
    }
    let repaired = adstar.replan_after_changes(&mut walled.grid, &walled.wall);

    let mut open = flat_grid(12, 10);
    let optimum = AStar::default().find_path(&mut open, start, goal);
    assert_eq!(repaired.cost, optimum.cost);
    assert_eq!(repaired.cost, 11.0);
    assert!(repaired.cost < blocked.cost);
}

#[test]
fn replan_after_closing_the_gap_finds_no_path() {
    init_tracing();
    let mut walled = walled_grid_with_gap(8, 6, 4, 5);
    let (start, goal) = (c(0, 0), c(7, 0));
    let mut adstar = AdStar::default();
    assert!(adstar.find_path(&mut walled.grid, start, goal).is_found());

    walled.grid.set_obstacle(walled.gap, true);
    let result = adstar.replan_after_changes(&mut walled.grid, &[walled.gap]);
    assert!(result.path.is_empty());
    assert!(adstar.used_fallback());

    // Reopening forces a full replan (the fallback invalidated the session).
    walled.grid.set_obstacle(walled.gap, false);
    let reopened = adstar.replan_after_changes(&mut walled.grid, &[walled.gap]);
    assert!(reopened.path.contains(&walled.gap));
}

// ---------------------------------------------------------------------------
// Metaheuristics
// ---------------------------------------------------------------------------

#[test]
fn decoded_paths_stay_on_passable_cells() {
    init_tracing();
    let mut config = PlannerConfig::default();
    config.genetic.generations = 30;
    config.swarm.iterations = 30;
    config.annealing.cooling_rate = 0.98;
    let start = c(0, 0);
    let goal = c(11, 11);
    for seed in [1, 2, 3] {
        config.seed = seed;
        let grid = random_terrain(12, 12, 1.5, 0.25, seed, &[start, goal]);
        let max_len = default_genome_length(&grid) + 1;
        for mut optimizer in optimizers(&config) {
            let result = optimizer.find_path(&grid, start, goal);
            assert_walk(&grid, &result.path, start, max_len, optimizer.name());
            assert_eq!(result.reached_goal, result.path.last() == Some(&goal));
            assert!(!result.history.is_empty());
        }
    }
}

#[test]
fn genome_length_override_bounds_the_walk() {
    init_tracing();
    let mut config = PlannerConfig::default();
    config.genetic.genome_length = Some(5);
    config.genetic.generations = 10;
    let grid = flat_grid(10, 10);
    let result = GeneticSearch::from_config(&config).find_path(&grid, c(0, 0), c(9, 9));
    assert!(result.path.len() <= 6);
    assert!(!result.reached_goal);
}

#[test]
fn config_seed_reproduces_runs() {
    init_tracing();
    let config = PlannerConfig::from_json_str(
        r#"{ "seed": 99, "genetic": { "generations": 15 }, "swarm": { "iterations": 15 } }"#,
    )
    .unwrap();
    let grid = random_terrain(10, 10, 2.0, 0.1, 4, &[c(0, 0), c(9, 9)]);
    for (mut a, mut b) in optimizers(&config).into_iter().zip(optimizers(&config)) {
        assert_eq!(
            a.find_path(&grid, c(0, 0), c(9, 9)),
            b.find_path(&grid, c(0, 0), c(9, 9)),
            "{}",
            a.name()
        );
    }
}

// ---------------------------------------------------------------------------
// Comparison runner
// ---------------------------------------------------------------------------

#[test]
fn run_all_graph_searches_agree() {
    init_tracing();
    let mut config = PlannerConfig::default();
    config.genetic.generations = 20;
    config.swarm.iterations = 20;
    config.annealing.cooling_rate = 0.97;
    let start = c(0, 0);
    let goal = c(14, 14);
    let grid = random_terrain(15, 15, 2.0, 0.1, 8, &[start, goal]);

    let runs = run_all(&grid, start, goal, &config).unwrap();
    assert_eq!(runs.len(), Strategy::ALL.len());

    let graph_costs: Vec<f64> = runs
        .iter()
        .filter(|r| r.strategy.is_graph_search())
        .map(|r| r.metrics.path_cost)
        .collect();
    assert_eq!(graph_costs.len(), 3);
    let optimum = graph_costs[0];
    for &cost in &graph_costs {
        if optimum.is_finite() {
            assert!((cost - optimum).abs() < 1e-9, "{graph_costs:?}");
        } else {
            assert!(cost.is_infinite(), "{graph_costs:?}");
        }
    }
    // No sequence optimizer can beat the exhaustive optimum.
    for run in runs.iter().filter(|r| !r.strategy.is_graph_search()) {
        if run.metrics.reached_goal {
            assert!(run.metrics.path_cost >= optimum - 1e-9, "{}", run.strategy);
        }
    }
}
