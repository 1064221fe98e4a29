// Baseline single-pass searches: A* and Dijkstra.
//
// Both run the same best-first loop over a `BinaryHeap` (min-heap via
// reversed ordering, same pattern as the AD* OPEN queue). Scores live in the
// grid's scratch fields: `g` is cost-so-far from the start, `h` the cached
// heuristic, `f = g + h` the priority, and `parent` the back-pointer used to
// rebuild the path. The loop prices moves and estimates through the
// `GraphSearch` trait, so Dijkstra is A* with `heuristic` overridden to 0.
//
// The heap has no decrease-key: an improved node is pushed again and the
// older entry is skipped when popped (the node is already closed).
//
// These also serve as AD*'s deterministic fallback, see `adstar/mod.rs`.

use crate::cost::CostModel;
use crate::grid::Grid;
use crate::planner::{GraphSearch, SearchResult};
use crate::types::{Coord, NodeId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Entry in the open set (min-heap via reversed ordering).
struct OpenEntry {
    node: NodeId,
    priority: f64,
    sequence: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap: smallest priority is "greatest", earlier
        // insertion wins ties.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A* with the elevation-aware straight-line heuristic toward the goal.
#[derive(Clone, Debug, Default)]
pub struct AStar {
    cost: CostModel,
}

impl AStar {
    pub fn new(cost: CostModel) -> Self {
        Self { cost }
    }
}

impl GraphSearch for AStar {
    fn name(&self) -> &'static str {
        "A*"
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    fn find_path(&mut self, grid: &mut Grid, start: Coord, goal: Coord) -> SearchResult {
        best_first(self, grid, start, goal)
    }
}

/// Uniform-cost search: A* with a zero heuristic.
#[derive(Clone, Debug, Default)]
pub struct Dijkstra {
    cost: CostModel,
}

impl Dijkstra {
    pub fn new(cost: CostModel) -> Self {
        Self { cost }
    }
}

impl GraphSearch for Dijkstra {
    fn name(&self) -> &'static str {
        "Dijkstra"
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    fn heuristic(&self, _grid: &Grid, _node: NodeId, _target: NodeId) -> f64 {
        0.0
    }

    fn find_path(&mut self, grid: &mut Grid, start: Coord, goal: Coord) -> SearchResult {
        best_first(self, grid, start, goal)
    }
}

/// Shared best-first loop. Resets the grid's scratch state first.
pub(crate) fn best_first<S: GraphSearch + ?Sized>(
    search: &S,
    grid: &mut Grid,
    start: Coord,
    goal: Coord,
) -> SearchResult {
    grid.reset_search_state();

    let (Some(start_id), Some(goal_id)) = (grid.id(start), grid.id(goal)) else {
        return SearchResult::not_found(0);
    };

    let estimate = |grid: &Grid, node: NodeId| search.heuristic(grid, node, goal_id);

    let mut closed = vec![false; grid.len()];
    let mut open = BinaryHeap::new();
    let mut sequence = 0u64;
    let mut expansions = 0u64;

    let h_start = estimate(grid, start_id);
    {
        let node = grid.node_mut(start_id);
        node.g = 0.0;
        node.h = h_start;
        node.f = h_start;
    }
    open.push(OpenEntry {
        node: start_id,
        priority: h_start,
        sequence,
    });

    while let Some(current) = open.pop() {
        let ci = current.node;
        if closed[ci.index()] {
            continue;
        }
        closed[ci.index()] = true;
        expansions += 1;

        if ci == goal_id {
            let path = reconstruct_path(grid, goal_id);
            return SearchResult {
                path,
                cost: grid.node(goal_id).g,
                expansions,
            };
        }

        let current_g = grid.node(ci).g;
        for neighbor in grid.neighbors(ci) {
            if closed[neighbor.index()] {
                continue;
            }
            let tentative_g = current_g + search.cost(grid, ci, neighbor);
            if tentative_g < grid.node(neighbor).g {
                let h = estimate(grid, neighbor);
                let node = grid.node_mut(neighbor);
                node.g = tentative_g;
                node.h = h;
                node.f = tentative_g + h;
                node.parent = Some(ci);
                sequence += 1;
                open.push(OpenEntry {
                    node: neighbor,
                    priority: tentative_g + h,
                    sequence,
                });
            }
        }
    }

    SearchResult::not_found(expansions)
}

/// Follow `parent` pointers from `goal` back to the start, then reverse.
fn reconstruct_path(grid: &Grid, goal: NodeId) -> Vec<Coord> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        path.push(grid.coord(id));
        current = grid.node(id).parent;
    }
    path.reverse();
    path
}
