// Move-sequence genomes: decoding and fitness.
//
// A genome is a fixed-length `Vec<Direction>`. Decoding walks it from the
// start cell one gene at a time:
// - a gene whose target is out of bounds or an obstacle is skipped (the
//   walker stays put),
// - the walk stops as soon as it lands on the goal,
// - otherwise it runs until the genome is exhausted.
//
// So a decoded path always starts at `start`, only visits passable
// in-bounds cells, moves one cell per step, and is at most
// `genome.len() + 1` long.
//
// Fitness (lower is better) is the shared slope-penalized path cost, plus
// `planar distance(last cell, goal) * max(width, height)` when the walk
// stops short of the goal. The penalty dwarfs any realistic path cost so
// the population is pulled toward feasibility first.

use crate::cost::CostModel;
use crate::grid::Grid;
use crate::types::{Coord, Direction};
use rand::Rng;

/// Moves per genome when the config leaves it unset: `(width + height) * 2`.
pub fn default_genome_length(grid: &Grid) -> usize {
    (grid.width() as usize + grid.height() as usize) * 2
}

pub fn random_direction(rng: &mut impl Rng) -> Direction {
    Direction::from_index(rng.random_range(0..Direction::ALL.len()))
}

pub fn random_genome(rng: &mut impl Rng, len: usize) -> Vec<Direction> {
    (0..len).map(|_| random_direction(rng)).collect()
}

/// Walk `genome` from `start`. See the module comment for the rules.
pub fn decode_path(grid: &Grid, genome: &[Direction], start: Coord, goal: Coord) -> Vec<Coord> {
    let mut here = start;
    let mut path = vec![here];
    if here == goal {
        return path;
    }
    for &dir in genome {
        let next = here.step(dir);
        if !grid.is_passable(next) {
            continue;
        }
        here = next;
        path.push(here);
        if here == goal {
            break;
        }
    }
    path
}

/// A decoded, scored genome.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// Path cost plus the unreached-goal penalty.
    pub fitness: f64,
    /// Path cost alone.
    pub cost: f64,
    pub path: Vec<Coord>,
    pub reached: bool,
}

/// Score an already decoded path.
pub fn evaluate_path(model: &CostModel, grid: &Grid, path: Vec<Coord>, goal: Coord) -> Evaluation {
    let cost = model.path_cost(grid, &path);
    let last = path.last().copied();
    let reached = last == Some(goal);
    let fitness = match last {
        Some(last) if !reached => {
            let scale = f64::from(grid.width().max(grid.height()));
            cost + last.planar_distance(goal) * scale
        }
        Some(_) => cost,
        None => f64::INFINITY,
    };
    Evaluation {
        fitness,
        cost,
        path,
        reached,
    }
}
