//! D* Lite incremental pathfinding (Koenig & Likhachev)
//!
//! Searches backwards from the goal keeping two estimates per cell: `g`, the
//! settled cost-to-goal, and `rhs`, the one-step lookahead. A cell is
//! consistent when both agree; only inconsistent cells sit on the open list.
//! After grid changes only the cells whose `rhs` moved are re-expanded.
//!
//! The key modifier `km` lets the search root move without re-keying the
//! whole open list.
//!
//! # Example
//!
//! ```rust
//! use warenav_core::{CellCoord, Pathfinder};
//! use warenav_library::algorithms::dstar_lite::DStarLitePlanner;
//! use warenav_library::algorithms::occupancy_grid::OccupancyGrid;
//!
//! let mut grid = OccupancyGrid::new(5, 5);
//! let mut planner = DStarLitePlanner::new();
//! planner.initialize(&grid);
//!
//! let (start, goal) = (CellCoord::new(0, 0), CellCoord::new(4, 4));
//! assert_eq!(planner.find_path(&grid, start, goal, None).unwrap().unwrap().len(), 9);
//!
//! // A full column separates start and goal
//! let wall = grid.set_line_walkable(CellCoord::new(2, 0), CellCoord::new(2, 4), false);
//! planner.handle_changed_cells(&grid, &wall);
//! assert!(planner.find_path(&grid, start, goal, None).unwrap().is_none());
//! ```

use crate::algorithms::priority_queue::IndexedPriorityQueue;
use std::collections::HashMap;
use warenav_core::pathfinding::check_endpoints;
use warenav_core::{
    heuristic, AgentId, CellCoord, Cost, GridMap, NavResult, Path, Pathfinder, INFINITE_COST,
    MAX_PATH_CELLS, MOVE_COST,
};

/// Two-component priority, compared lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DStarLiteKey {
    pub k1: Cost,
    pub k2: Cost,
}

/// Per-cell D* Lite bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DStarLiteState {
    pub g: Cost,
    pub rhs: Cost,
    blocked: bool,
}

impl DStarLiteState {
    fn new(blocked: bool) -> Self {
        Self {
            g: INFINITE_COST,
            rhs: INFINITE_COST,
            blocked,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.g == self.rhs
    }
}

/// D* Lite planner
#[derive(Debug, Default)]
pub struct DStarLitePlanner {
    states: HashMap<CellCoord, DStarLiteState>,
    open: IndexedPriorityQueue<CellCoord, DStarLiteKey>,
    start: Option<CellCoord>,
    goal: Option<CellCoord>,
    requester: Option<AgentId>,
    km: Cost,
    last_path: Option<Path>,
    last_expanded: usize,
}

impl DStarLitePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulated key modifier
    pub fn km(&self) -> Cost {
        self.km
    }

    /// Cells expanded by the most recent query or repair
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    pub fn state(&self, coord: CellCoord) -> Option<&DStarLiteState> {
        self.states.get(&coord)
    }

    fn reset(&mut self) {
        self.states.clear();
        self.open.clear();
        self.start = None;
        self.goal = None;
        self.requester = None;
        self.km = 0;
        self.last_path = None;
        self.last_expanded = 0;
    }

    fn initialize_search(
        &mut self,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) {
        self.reset();
        self.start = Some(start);
        self.goal = Some(goal);
        self.requester = requester;

        self.state_mut(grid, goal).rhs = 0;
        let key = self.calculate_key(goal);
        self.open.enqueue(goal, key);

        tracing::debug!(%start, %goal, ?requester, "d* lite search initialized");
    }

    fn g(&self, coord: CellCoord) -> Cost {
        self.states.get(&coord).map_or(INFINITE_COST, |s| s.g)
    }

    fn rhs(&self, coord: CellCoord) -> Cost {
        self.states.get(&coord).map_or(INFINITE_COST, |s| s.rhs)
    }

    fn state_mut(&mut self, grid: &dyn GridMap, coord: CellCoord) -> &mut DStarLiteState {
        let requester = self.requester;
        self.states
            .entry(coord)
            .or_insert_with(|| DStarLiteState::new(!grid.is_traversable(coord, requester)))
    }

    fn cost(&self, grid: &dyn GridMap, a: CellCoord, b: CellCoord) -> Cost {
        if grid.is_traversable(a, self.requester) && grid.is_traversable(b, self.requester) {
            MOVE_COST
        } else {
            INFINITE_COST
        }
    }

    fn calculate_key(&self, coord: CellCoord) -> DStarLiteKey {
        let best = self.g(coord).min(self.rhs(coord));
        let to_start = self.start.map_or(0, |start| heuristic(start, coord));
        DStarLiteKey {
            k1: best.saturating_add(to_start).saturating_add(self.km),
            k2: best,
        }
    }

    fn update_vertex(&mut self, grid: &dyn GridMap, u: CellCoord) {
        if Some(u) != self.goal {
            let rhs = if grid.is_traversable(u, self.requester) {
                grid.neighbors(u)
                    .into_iter()
                    .map(|s| self.cost(grid, u, s).saturating_add(self.g(s)))
                    .min()
                    .unwrap_or(INFINITE_COST)
            } else {
                INFINITE_COST
            };
            self.state_mut(grid, u).rhs = rhs;
        }

        self.open.remove(&u);
        if self.g(u) != self.rhs(u) {
            let key = self.calculate_key(u);
            self.open.enqueue(u, key);
        }
    }

    fn compute_shortest_path(&mut self, grid: &dyn GridMap) {
        let Some(start) = self.start else {
            return;
        };

        while let Ok(top) = self.open.peek_top_key() {
            if top >= self.calculate_key(start) && self.rhs(start) == self.g(start) {
                break;
            }
            let Some((u, k_old)) = self.open.pop() else {
                break;
            };
            self.last_expanded += 1;

            let k_new = self.calculate_key(u);
            let (g_u, rhs_u) = (self.g(u), self.rhs(u));
            if k_old < k_new {
                // Keyed before km grew
                self.open.enqueue(u, k_new);
            } else if g_u > rhs_u {
                self.state_mut(grid, u).g = rhs_u;
                for s in grid.neighbors(u) {
                    self.update_vertex(grid, s);
                }
            } else {
                self.state_mut(grid, u).g = INFINITE_COST;
                self.update_vertex(grid, u);
                for s in grid.neighbors(u) {
                    self.update_vertex(grid, s);
                }
            }
        }
    }

    /// Refresh snapshots and rhs values around `cells`
    fn apply_changes(&mut self, grid: &dyn GridMap, cells: &[CellCoord]) {
        let requester = self.requester;
        for &cell in cells {
            if !grid.in_bounds(cell.x, cell.y) {
                continue;
            }
            self.state_mut(grid, cell).blocked = !grid.is_traversable(cell, requester);
            self.update_vertex(grid, cell);
            for neighbor in grid.neighbors(cell) {
                self.update_vertex(grid, neighbor);
            }
        }
    }

    fn unreported_changes(&self, grid: &dyn GridMap) -> Vec<CellCoord> {
        let mut changed: Vec<CellCoord> = self
            .states
            .iter()
            .filter(|(coord, state)| state.blocked == grid.is_traversable(**coord, self.requester))
            .map(|(coord, _)| *coord)
            .collect();
        changed.sort();
        changed
    }

    /// Greedy descent over `c + g` from the start
    fn extract_path(&self, grid: &dyn GridMap) -> Option<Path> {
        let (start, goal) = (self.start?, self.goal?);
        if self.rhs(start) == INFINITE_COST {
            return None;
        }

        let mut path = vec![start];
        let mut current = start;
        while current != goal {
            if path.len() >= MAX_PATH_CELLS {
                tracing::warn!(%start, %goal, cap = MAX_PATH_CELLS, "d* lite path extraction hit the cell cap");
                return None;
            }

            let (next, cost) = grid
                .neighbors(current)
                .into_iter()
                .map(|s| (s, self.cost(grid, current, s).saturating_add(self.g(s))))
                .min_by_key(|(_, cost)| *cost)?;
            if cost == INFINITE_COST {
                tracing::debug!(at = %current, "d* lite extraction reached a dead end");
                return None;
            }

            path.push(next);
            current = next;
        }
        Some(path)
    }
}

impl Pathfinder for DStarLitePlanner {
    fn initialize(&mut self, grid: &dyn GridMap) {
        self.reset();
        tracing::debug!(
            algorithm = self.algorithm_name(),
            width = grid.width(),
            height = grid.height(),
            "planner initialized"
        );
    }

    fn find_path(
        &mut self,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) -> NavResult<Option<Path>> {
        check_endpoints(grid, start, goal)?;

        if !grid.is_traversable(start, requester) || !grid.is_traversable(goal, requester) {
            tracing::debug!(%start, %goal, "endpoint blocked for requester");
            return Ok(None);
        }

        self.last_expanded = 0;
        if self.start != Some(start) || self.goal != Some(goal) || self.requester != requester {
            self.initialize_search(grid, start, goal, requester);
        } else {
            let changed = self.unreported_changes(grid);
            if !changed.is_empty() {
                tracing::debug!(cells = changed.len(), "reconciling unreported grid changes");
                self.apply_changes(grid, &changed);
            }
        }

        self.compute_shortest_path(grid);
        let path = self.extract_path(grid);
        tracing::debug!(
            algorithm = self.algorithm_name(),
            %start,
            %goal,
            expanded = self.last_expanded,
            cells = path.as_ref().map_or(0, |p| p.len()),
            "search finished"
        );

        self.last_path = path.clone();
        Ok(path)
    }

    fn handle_changed_cells(&mut self, grid: &dyn GridMap, cells: &[CellCoord]) {
        if cells.is_empty() || self.goal.is_none() {
            return;
        }

        match (self.last_path.as_ref().and_then(|p| p.first()), self.start) {
            (Some(&path_start), Some(start)) => {
                self.km = self.km.saturating_add(heuristic(path_start, start));
                self.start = Some(path_start);
            }
            _ => {
                tracing::warn!("no previous path to rebase on, replanning from the last start");
            }
        }

        self.last_expanded = 0;
        self.apply_changes(grid, cells);
        self.compute_shortest_path(grid);
        tracing::debug!(
            algorithm = self.algorithm_name(),
            changed = cells.len(),
            expanded = self.last_expanded,
            km = self.km,
            "repaired after grid change"
        );
    }

    fn algorithm_name(&self) -> &'static str {
        "D* Lite Pathfinding"
    }
}

mod tests;
