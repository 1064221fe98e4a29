// Test-only grid fixtures for cross-strategy scenario tests.
//
// Builds the small maps the integration tests share: flat ground, a wall
// with a single gap, a ridge that is cheaper to walk around than over, and
// seeded random terrain. Everything here produces plain `Grid` values through
// the public `ridgeway_core` API, the same way an external map generator
// would.
//
// See also: `tests/scenarios.rs` for the scenarios themselves.

use std::sync::Once;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use ridgeway_core::grid::Grid;
use ridgeway_core::types::Coord;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber, once per process. Honors
/// `RUST_LOG`; silent by default apart from warnings.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Obstacle-free grid at height 0.
pub fn flat_grid(width: u32, height: u32) -> Grid {
    Grid::new(width, height)
}

/// A flat grid split by a vertical wall with one gap.
pub struct WalledGrid {
    pub grid: Grid,
    /// Every obstacle cell of the wall, top to bottom.
    pub wall: Vec<Coord>,
    pub gap: Coord,
}

/// Flat `width x height` grid with a wall at column `wall_x`, open only at
/// row `gap_y`.
pub fn walled_grid_with_gap(width: u32, height: u32, wall_x: i32, gap_y: i32) -> WalledGrid {
    let mut grid = Grid::new(width, height);
    let mut wall = Vec::new();
    for y in 0..height as i32 {
        if y != gap_y {
            grid.set_obstacle(Coord::new(wall_x, y), true);
            wall.push(Coord::new(wall_x, y));
        }
    }
    WalledGrid {
        grid,
        wall,
        gap: Coord::new(wall_x, gap_y),
    }
}

/// Flat grid with a steep ridge of height `peak` along column `ridge_x`,
/// except at the bottom row, which stays at ground level.
pub fn ridge_grid(width: u32, height: u32, ridge_x: i32, peak: f64) -> Grid {
    let mut grid = Grid::new(width, height);
    for y in 0..height as i32 - 1 {
        grid.set_height(Coord::new(ridge_x, y), peak)
            .expect("ridge_grid: peak must be finite and >= 0");
    }
    grid
}

/// Seeded random terrain: heights uniform in `[0, max_height)` and each
/// cell an obstacle with probability `obstacle_density`. Cells listed in
/// `keep_clear` are never obstacles.
pub fn random_terrain(
    width: u32,
    height: u32,
    max_height: f64,
    obstacle_density: f64,
    seed: u64,
    keep_clear: &[Coord],
) -> Grid {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let heights: Vec<f64> = (0..width * height)
        .map(|_| rng.random::<f64>() * max_height)
        .collect();
    let mut grid = Grid::from_heights(width, height, &heights)
        .expect("random_terrain: max_height must be finite and >= 0");
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let coord = Coord::new(x, y);
            if rng.random::<f64>() < obstacle_density && !keep_clear.contains(&coord) {
                grid.set_obstacle(coord, true);
            }
        }
    }
    grid
}
