//! Routing trait and default A* implementation.
//!
//! # Pluggability
//!
//! The vehicle engine calls routing via the [`Router`] trait, so a scenario
//! can swap in a different search without touching the engine.
//!
//! # Cost units
//!
//! Step costs are held in **milli-units** (u32) internally so heap ordering
//! is exact.  Entering a cell costs
//!
//!   1000 + 1000 × traffic(cell) × congestion(cell)
//!
//! and the heuristic is `1000 × manhattan`, which never overestimates since
//! every step costs at least 1000.  `Route::total_cost` is reported back in
//! whole units.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fleet_core::{GridBounds, GridPos};

use crate::{BlockageRegistry, GridError, GridResult, TrafficField};

const UNIT: u32 = 1000;

// ── GridMap ───────────────────────────────────────────────────────────────────

/// Read-only view of everything a route depends on.
#[derive(Clone, Copy)]
pub struct GridMap<'a> {
    pub bounds:    GridBounds,
    pub traffic:   &'a TrafficField,
    pub blockages: &'a BlockageRegistry,
}

impl<'a> GridMap<'a> {
    pub fn new(traffic: &'a TrafficField, blockages: &'a BlockageRegistry) -> Self {
        Self { bounds: traffic.bounds(), traffic, blockages }
    }

    /// Inside the map and not under an active blockage.
    #[inline]
    pub fn is_passable(&self, p: GridPos) -> bool {
        self.bounds.contains(p) && !self.blockages.is_blocked(p)
    }

    /// Cost of stepping into `p`, in milli-units.
    #[inline]
    pub fn step_cost(&self, p: GridPos) -> u32 {
        let extra = self.traffic.weight(p) * self.blockages.congestion(p);
        UNIT + (extra * UNIT as f32).round() as u32
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    /// Cells to visit in order; excludes the start, includes the goal.
    pub cells:      Vec<GridPos>,
    pub total_cost: f32,
}

impl Route {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` when start and goal coincide.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Returns `Ok` with an empty route when `from == to`.
pub trait Router: Send + Sync {
    fn route(&self, map: &GridMap<'_>, from: GridPos, to: GridPos) -> GridResult<Route>;
}

/// Path-or-nothing convenience over any router: an unreachable goal, an
/// off-map cell, or an exhausted search budget all yield an empty path.
pub fn find_path<R: Router + ?Sized>(
    router: &R,
    map: &GridMap<'_>,
    from: GridPos,
    to: GridPos,
) -> Vec<GridPos> {
    match router.route(map, from, to) {
        Ok(route) => route.cells,
        Err(e) => {
            tracing::trace!(target: "fleet_grid::router", %from, %to, error = %e, "no path");
            Vec::new()
        }
    }
}

// ── AStarRouter ───────────────────────────────────────────────────────────────

/// A* over the 4-connected grid.
///
/// Ties on `f` prefer the lower heuristic (the node nearer the goal), then
/// the lower row-major cell index, so identical inputs always produce the
/// identical path.
#[derive(Clone, Debug, Default)]
pub struct AStarRouter {
    /// Maximum node expansions per request.  `None` = one per map cell.
    pub max_expansions: Option<usize>,
}

impl AStarRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_budget(max_expansions: usize) -> Self {
        Self { max_expansions: Some(max_expansions) }
    }
}

impl Router for AStarRouter {
    fn route(&self, map: &GridMap<'_>, from: GridPos, to: GridPos) -> GridResult<Route> {
        let budget = self.max_expansions.unwrap_or_else(|| map.bounds.cell_count());
        astar(map, from, to, budget)
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

fn astar(map: &GridMap<'_>, from: GridPos, to: GridPos, budget: usize) -> GridResult<Route> {
    let bounds = map.bounds;
    let start = bounds.index(from).ok_or(GridError::OutOfBounds(from))?;
    let goal = bounds.index(to).ok_or(GridError::OutOfBounds(to))?;

    if from == to {
        return Ok(Route::default());
    }
    if map.blockages.is_blocked(to) {
        return Err(GridError::NoRoute { from, to });
    }

    let n = bounds.cell_count();
    // g[v] = best known cost (milli) to reach v.
    let mut g      = vec![u32::MAX; n];
    let mut prev   = vec![usize::MAX; n];
    let mut closed = vec![false; n];

    let h = |p: GridPos| p.manhattan(to) * UNIT;

    g[start] = 0;
    // Min-heap on (f, h, idx).
    let mut heap: BinaryHeap<Reverse<(u32, u32, usize)>> = BinaryHeap::new();
    heap.push(Reverse((h(from), h(from), start)));

    let mut expanded = 0usize;
    while let Some(Reverse((_, _, idx))) = heap.pop() {
        if closed[idx] {
            continue;
        }
        if idx == goal {
            return Ok(reconstruct(bounds, &prev, start, goal, g[goal]));
        }
        closed[idx] = true;

        expanded += 1;
        if expanded > budget {
            return Err(GridError::SearchBudgetExceeded(budget));
        }

        let pos = bounds.pos_at(idx);
        for next in pos.neighbors4() {
            let Some(ni) = bounds.index(next) else { continue };
            if closed[ni] || map.blockages.is_blocked(next) {
                continue;
            }
            let cost = g[idx].saturating_add(map.step_cost(next));
            if cost < g[ni] {
                g[ni] = cost;
                prev[ni] = idx;
                let hn = h(next);
                heap.push(Reverse((cost.saturating_add(hn), hn, ni)));
            }
        }
    }

    Err(GridError::NoRoute { from, to })
}

fn reconstruct(bounds: GridBounds, prev: &[usize], start: usize, goal: usize, total: u32) -> Route {
    let mut cells = Vec::new();
    let mut cur = goal;
    while cur != start {
        cells.push(bounds.pos_at(cur));
        cur = prev[cur];
    }
    cells.reverse();
    Route { cells, total_cost: total as f32 / UNIT as f32 }
}
