// Anytime Dynamic A* (AD*): inflated, incremental replanning search.
//
// The search is rooted at the goal. Each cell's `g` is its settled
// cost-to-goal and `rhs` the one-step lookahead `min(g(nbr) + cost)` over its
// neighbors; a cell is consistent when the two agree. Costs are symmetric, so
// every grid neighbor is both a predecessor and a successor. The focusing
// heuristic `h` is measured toward the start (the cell the backward search
// is trying to reach) and cached in each cell's `h` field.
//
// A session is one `find_path` call plus any number of
// `replan_after_changes` calls on the same start/goal:
//
// 1. `find_path` resets the grid scratch state, seeds `rhs(goal) = 0`, and
//    runs `improve_path`: one `compute_shortest_path` pass per epsilon,
//    starting from `initial_epsilon` and stepping down to 1.0. After each
//    pass the greedy `extract_path` walk is recorded if it reaches the goal
//    and is no worse than the best so far.
// 2. `replan_after_changes` reruns `update_vertex` on each edited cell and
//    its neighbors, then repairs with one more pass at epsilon 1.0 without
//    touching the surviving `g`/`rhs` values. Localized edits therefore cost
//    far fewer expansions than a fresh search.
//
// Priority of a cell is the scalar key `min(g, rhs) + epsilon * h`.
//
// OPEN / INCONS / CLOSED: during an inflated pass a cell may be expanded
// at most once (CLOSED). A cell that turns inconsistent after it was
// expanded is parked in INCONS instead of OPEN; every other inconsistent cell
// goes straight to OPEN. Whenever epsilon changes, INCONS is merged into
// OPEN, every key is recomputed, and CLOSED is cleared. At epsilon 1.0 the
// CLOSED rule is off and inconsistent cells always go to OPEN.
//
// Safety caps: a pass that pops more than `max_iterations_per_pass` entries
// or lets OPEN grow past `max_open_size` logs a warning and stops early. If
// no pass produced a goal-reaching path, the engine falls back to plain A*
// on the same grid. A* overwrites the scratch fields, so the session is
// marked invalid and the next replan does a full `find_path`.
//
// See also: `queue.rs` for the lazily-validated OPEN heap,
// `pathfinding.rs` for the A* fallback, `grid.rs` for the scratch fields.

mod queue;

use crate::config::AdStarParams;
use crate::cost::CostModel;
use crate::grid::Grid;
use crate::pathfinding::best_first;
use crate::planner::{GraphSearch, SearchResult};
use crate::types::{Coord, NodeId};
use queue::OpenQueue;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Outcome of one epsilon pass, recorded for anytime-behavior inspection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PhaseRecord {
    pub epsilon: f64,
    /// Cost of the path extracted after this pass; infinite if it did not
    /// reach the goal.
    pub path_cost: f64,
    /// Best path cost recorded so far in this call, this pass included.
    pub best_cost: f64,
    /// Entries expanded during this pass.
    pub expansions: u64,
    /// The pass stopped on a safety cap rather than converging.
    pub capped: bool,
}

/// How a `compute_shortest_path` pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PassOutcome {
    /// Terminal condition met: the start's key is settled.
    Settled,
    /// OPEN ran dry first.
    Exhausted,
    /// Iteration or OPEN-size cap tripped.
    Capped,
}

/// Start/goal of the current planning session.
#[derive(Clone, Copy, Debug)]
struct Session {
    start: NodeId,
    goal: NodeId,
    start_coord: Coord,
    goal_coord: Coord,
    /// Grid dimensions the session's scratch state was built against.
    width: u32,
    height: u32,
}

pub struct AdStar {
    cost: CostModel,
    params: AdStarParams,
    epsilon: f64,
    open: OpenQueue,
    incons: BTreeSet<NodeId>,
    closed: Vec<bool>,
    session: Option<Session>,
    /// False when the grid's `g`/`rhs` no longer reflect this engine's search
    /// (after the A* fallback ran).
    session_valid: bool,
    best: Option<(Vec<Coord>, f64)>,
    phases: Vec<PhaseRecord>,
    expansions: u64,
    used_fallback: bool,
}

impl Default for AdStar {
    fn default() -> Self {
        Self::new(CostModel::default(), &AdStarParams::default())
    }
}

impl AdStar {
    pub fn new(cost: CostModel, params: &AdStarParams) -> Self {
        Self {
            cost,
            params: params.clone(),
            epsilon: starting_epsilon(params),
            open: OpenQueue::new(0),
            incons: BTreeSet::new(),
            closed: Vec::new(),
            session: None,
            session_valid: false,
            best: None,
            phases: Vec::new(),
            expansions: 0,
            used_fallback: false,
        }
    }

    /// Current inflation factor. 1.0 once a `find_path` has completed.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Per-pass records from the most recent `find_path` or replan.
    pub fn phases(&self) -> &[PhaseRecord] {
        &self.phases
    }

    /// Whether the most recent call had to fall back to A*.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Repair the current session after the given cells changed (obstacle
    /// flag or height) and return the updated path.
    ///
    /// Reuses the surviving `g`/`rhs` values. With no prior session there
    /// is nothing to repair and an empty result comes back; after an A*
    /// fallback this runs a full `find_path` instead.
    pub fn replan_after_changes(&mut self, grid: &mut Grid, changed: &[Coord]) -> SearchResult {
        let Some(session) = self.session else {
            return SearchResult::not_found(0);
        };
        if !self.session_valid || session.width != grid.width() || session.height != grid.height()
        {
            debug!("AD* session invalid, replanning from scratch");
            return self.find_path(grid, session.start_coord, session.goal_coord);
        }

        self.begin_call();
        // Heights may have moved, and `h` depends on them.
        self.cache_heuristic(grid, session.start);

        for &coord in changed {
            let Some(id) = grid.id(coord) else {
                continue;
            };
            self.update_vertex(grid, id, session.goal);
            for nbr in grid.neighbors(id) {
                self.update_vertex(grid, nbr, session.goal);
            }
        }
        self.rebuild_open(grid);
        self.improve_path(grid, session);
        self.finish(grid, session)
    }

    /// Greedy walk from the start along `argmin(g(nbr) + cost)`.
    ///
    /// Stops at the goal, at a dead end, or at a step whose best neighbor has
    /// infinite `g`; the latter two return the partial walk. Also stops after
    /// `width * height` steps, which only an inconsistent field can reach.
    pub fn extract_path(&self, grid: &Grid) -> Vec<Coord> {
        let Some(session) = self.session else {
            return Vec::new();
        };
        let mut current = session.start;
        let mut path = vec![grid.coord(current)];
        for _ in 0..grid.len() {
            if current == session.goal {
                break;
            }
            let mut best: Option<(NodeId, f64)> = None;
            for nbr in grid.neighbors(current) {
                let through = grid.node(nbr).g + self.cost.edge_cost(grid, current, nbr);
                if best.is_none_or(|(_, b)| through < b) {
                    best = Some((nbr, through));
                }
            }
            match best {
                Some((nbr, through)) if through.is_finite() => {
                    current = nbr;
                    path.push(grid.coord(nbr));
                }
                _ => break,
            }
        }
        path
    }

    // -----------------------------------------------------------------------
    // Session bookkeeping
    // -----------------------------------------------------------------------

    fn begin_call(&mut self) {
        self.best = None;
        self.phases.clear();
        self.expansions = 0;
        self.used_fallback = false;
    }

    fn cache_heuristic(&self, grid: &mut Grid, start: NodeId) {
        for i in 0..grid.len() {
            let id = NodeId(i as u32);
            let h = self.cost.heuristic(grid, id, start);
            grid.node_mut(id).h = h;
        }
    }

    /// Inflation for the next pass. A step that does not strictly lower
    /// epsilon (zero, negative, NaN, or lost to rounding) jumps to 1.0.
    fn next_epsilon(&self) -> f64 {
        let next = self.epsilon - self.params.epsilon_step;
        if next < self.epsilon { next.max(1.0) } else { 1.0 }
    }

    fn key(&self, grid: &Grid, id: NodeId) -> f64 {
        let node = grid.node(id);
        node.g.min(node.rhs) + self.epsilon * node.h
    }

    /// Merge INCONS into OPEN under the current epsilon and clear CLOSED.
    fn rebuild_open(&mut self, grid: &Grid) {
        let mut pending: BTreeSet<NodeId> = self.open.members().collect();
        pending.append(&mut self.incons);
        self.open.clear();
        for id in pending {
            if !grid.node(id).is_consistent() {
                let key = self.key(grid, id);
                self.open.push(id, key);
            }
        }
        self.closed.iter_mut().for_each(|c| *c = false);
    }

    /// Produce the call's result, falling back to A* if no pass reached the
    /// goal.
    fn finish(&mut self, grid: &mut Grid, session: Session) -> SearchResult {
        if let Some((path, cost)) = self.best.take() {
            return SearchResult {
                path,
                cost,
                expansions: self.expansions,
            };
        }
        warn!(
            start = %session.start_coord,
            goal = %session.goal_coord,
            expansions = self.expansions,
            "AD* produced no path; falling back to A*"
        );
        // The trait's default heuristic points at `goal`, which is plain A*.
        let fallback = best_first(&*self, grid, session.start_coord, session.goal_coord);
        self.used_fallback = true;
        self.session_valid = false;
        SearchResult {
            expansions: self.expansions + fallback.expansions,
            ..fallback
        }
    }

    // -----------------------------------------------------------------------
    // Core state machine
    // -----------------------------------------------------------------------

    /// Recompute `rhs` for `id` and file it into OPEN or INCONS as needed.
    fn update_vertex(&mut self, grid: &mut Grid, id: NodeId, goal: NodeId) {
        if id != goal {
            let rhs = if grid.node(id).is_obstacle {
                f64::INFINITY
            } else {
                grid.neighbors(id)
                    .into_iter()
                    .map(|nbr| grid.node(nbr).g + self.cost.edge_cost(grid, id, nbr))
                    .fold(f64::INFINITY, f64::min)
            };
            grid.node_mut(id).rhs = rhs;
        }

        if self.open.contains(id) {
            self.open.remove(id);
        }
        if grid.node(id).is_consistent() {
            self.incons.remove(&id);
        } else if self.epsilon > 1.0 && self.closed[id.index()] {
            self.incons.insert(id);
        } else {
            self.incons.remove(&id);
            let key = self.key(grid, id);
            self.open.push(id, key);
        }
    }

    /// Expand OPEN until the start's key is settled, OPEN runs out, or a
    /// safety cap trips.
    fn compute_shortest_path(&mut self, grid: &mut Grid, session: Session) -> PassOutcome {
        let mut iterations = 0u64;
        loop {
            let Some(top_key) = self.open.peek_key() else {
                return PassOutcome::Exhausted;
            };
            if top_key >= self.key(grid, session.start)
                && grid.node(session.start).is_consistent()
            {
                return PassOutcome::Settled;
            }
            if iterations >= self.params.max_iterations_per_pass {
                warn!(
                    epsilon = self.epsilon,
                    cap = self.params.max_iterations_per_pass,
                    "AD* pass hit its iteration cap, stopping early"
                );
                return PassOutcome::Capped;
            }
            if self.open.len() > self.params.max_open_size {
                warn!(
                    epsilon = self.epsilon,
                    open = self.open.len(),
                    cap = self.params.max_open_size,
                    "AD* OPEN list exceeded its size cap, stopping early"
                );
                return PassOutcome::Capped;
            }
            let Some((id, _)) = self.open.pop() else {
                return PassOutcome::Exhausted;
            };
            iterations += 1;
            self.expansions += 1;

            let node = grid.node(id);
            if node.g > node.rhs {
                // Overconsistent: settle and propagate.
                let rhs = node.rhs;
                grid.node_mut(id).g = rhs;
                self.closed[id.index()] = true;
                for nbr in grid.neighbors(id) {
                    self.update_vertex(grid, nbr, session.goal);
                }
            } else {
                // Underconsistent: invalidate and let neighbors re-derive.
                grid.node_mut(id).g = f64::INFINITY;
                self.update_vertex(grid, id, session.goal);
                for nbr in grid.neighbors(id) {
                    self.update_vertex(grid, nbr, session.goal);
                }
            }
        }
    }

    /// Anytime loop: one pass per epsilon, down to and including 1.0.
    fn improve_path(&mut self, grid: &mut Grid, session: Session) {
        loop {
            let before = self.expansions;
            let outcome = self.compute_shortest_path(grid, session);

            let mut path_cost = f64::INFINITY;
            let start = grid.node(session.start);
            if start.g.is_finite() || start.rhs.is_finite() {
                let path = self.extract_path(grid);
                if path.last() == Some(&session.goal_coord) {
                    path_cost = self.cost.path_cost(grid, &path);
                    if self.best.as_ref().is_none_or(|(_, best)| path_cost <= *best) {
                        self.best = Some((path, path_cost));
                    }
                }
            }
            let record = PhaseRecord {
                epsilon: self.epsilon,
                path_cost,
                best_cost: self.best.as_ref().map_or(f64::INFINITY, |(_, c)| *c),
                expansions: self.expansions - before,
                capped: outcome == PassOutcome::Capped,
            };
            debug!(
                epsilon = record.epsilon,
                path_cost = record.path_cost,
                expansions = record.expansions,
                outcome = ?outcome,
                "AD* pass complete"
            );
            self.phases.push(record);

            if self.epsilon <= 1.0 {
                break;
            }
            self.epsilon = self.next_epsilon();
            self.rebuild_open(grid);
        }
    }
}

/// Inflation for the first pass: finite and never below 1.0.
fn starting_epsilon(params: &AdStarParams) -> f64 {
    let eps = params.initial_epsilon;
    if eps.is_finite() { eps.max(1.0) } else { 1.0 }
}

impl GraphSearch for AdStar {
    fn name(&self) -> &'static str {
        "AD*"
    }

    fn cost_model(&self) -> &CostModel {
        &self.cost
    }

    fn find_path(&mut self, grid: &mut Grid, start: Coord, goal: Coord) -> SearchResult {
        self.begin_call();
        let (Some(start_id), Some(goal_id)) = (grid.id(start), grid.id(goal)) else {
            self.session = None;
            return SearchResult::not_found(0);
        };
        let session = Session {
            start: start_id,
            goal: goal_id,
            start_coord: start,
            goal_coord: goal,
            width: grid.width(),
            height: grid.height(),
        };
        self.session = Some(session);
        self.session_valid = true;
        self.epsilon = starting_epsilon(&self.params);
        self.open = OpenQueue::new(grid.len());
        self.incons.clear();
        self.closed = vec![false; grid.len()];

        grid.reset_search_state();
        self.cache_heuristic(grid, start_id);
        grid.node_mut(goal_id).rhs = 0.0;
        let key = self.key(grid, goal_id);
        self.open.push(goal_id, key);

        self.improve_path(grid, session);
        self.finish(grid, session)
    }
}
