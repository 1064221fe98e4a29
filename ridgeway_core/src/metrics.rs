// Per-run path metrics.
//
// Plain values computed from a returned path, for external CSV writers and
// plotting. `path_cost` prices the path with the shared slope-penalized
// cost model (the number every strategy optimizes); `surface_length` is the
// unpenalized 3D walking distance over the terrain.

use crate::cost::CostModel;
use crate::grid::Grid;
use crate::types::Coord;
use serde::Serialize;
use std::time::Duration;

pub fn path_cost(grid: &Grid, model: &CostModel, path: &[Coord]) -> f64 {
    model.path_cost(grid, path)
}

/// Sum of 3D straight-line step lengths along `path`.
pub fn surface_length(grid: &Grid, path: &[Coord]) -> f64 {
    path.windows(2)
        .map(|w| {
            let planar = w[0].planar_distance(w[1]);
            let dh = grid.height_at(w[1]) - grid.height_at(w[0]);
            planar.hypot(dh)
        })
        .sum()
}

/// Whether a non-empty path ends on `goal`.
pub fn reaches(path: &[Coord], goal: Coord) -> bool {
    path.last() == Some(&goal)
}

/// One strategy run, flattened for serialization.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunMetrics {
    pub strategy: &'static str,
    pub elapsed_secs: f64,
    /// Number of coordinates in the path, start and end included.
    pub path_length: usize,
    pub path_cost: f64,
    pub surface_length: f64,
    pub reached_goal: bool,
    pub work_units: u64,
}

impl RunMetrics {
    pub fn measure(
        strategy: &'static str,
        grid: &Grid,
        model: &CostModel,
        path: &[Coord],
        goal: Coord,
        elapsed: Duration,
        work_units: u64,
    ) -> Self {
        let reached_goal = reaches(path, goal);
        Self {
            strategy,
            elapsed_secs: elapsed.as_secs_f64(),
            path_length: path.len(),
            path_cost: if path.is_empty() {
                f64::INFINITY
            } else {
                path_cost(grid, model, path)
            },
            surface_length: surface_length(grid, path),
            reached_goal,
            work_units,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn surface_length_includes_climb() {
        let grid = Grid::from_heights(2, 1, &[0.0, 1.0]).unwrap();
        let len = surface_length(&grid, &[c(0, 0), c(1, 0)]);
        assert!((len - 2f64.sqrt()).abs() < 1e-12);
        // The penalized cost is higher: 1 * (1 + 2) + 1 = 4.
        assert_eq!(path_cost(&grid, &CostModel::default(), &[c(0, 0), c(1, 0)]), 4.0);
    }

    #[test]
    fn reaches_checks_last_cell() {
        assert!(reaches(&[c(0, 0), c(1, 0)], c(1, 0)));
        assert!(!reaches(&[c(0, 0), c(1, 0)], c(0, 0)));
        assert!(!reaches(&[], c(0, 0)));
    }

    #[test]
    fn measure_empty_path() {
        let grid = Grid::new(2, 2);
        let m = RunMetrics::measure(
            "A*",
            &grid,
            &CostModel::default(),
            &[],
            c(1, 1),
            Duration::from_millis(5),
            17,
        );
        assert!(!m.reached_goal);
        assert_eq!(m.path_length, 0);
        assert_eq!(m.path_cost, f64::INFINITY);
        assert_eq!(m.work_units, 17);
    }

    #[test]
    fn metrics_serialize_to_json() {
        let grid = Grid::new(3, 1);
        let path = [c(0, 0), c(1, 0), c(2, 0)];
        let m = RunMetrics::measure(
            "Dijkstra",
            &grid,
            &CostModel::default(),
            &path,
            c(2, 0),
            Duration::ZERO,
            3,
        );
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["strategy"], "Dijkstra");
        assert_eq!(json["path_length"], 3);
        assert_eq!(json["path_cost"], 2.0);
        assert_eq!(json["reached_goal"], true);
    }
}
