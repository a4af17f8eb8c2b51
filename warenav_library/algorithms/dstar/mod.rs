//! D* incremental pathfinding (Stentz)
//!
//! Goal-rooted search: every expanded cell stores its cost-to-goal `h` and a
//! back-pointer toward the goal. When cells change, only the affected region
//! is re-expanded; raised costs travel as RAISE states and improvements as
//! LOWER states until the open list drains.
//!
//! # Features
//!
//! - Reuses search effort across queries with the same goal
//! - Repairs the cost field after obstacles appear or disappear
//! - Detects grid changes nobody reported on the next query
//! - Path extraction capped at [`MAX_PATH_CELLS`] cells
//!
//! # Example
//!
//! ```rust
//! use warenav_core::{CellCoord, Pathfinder};
//! use warenav_library::algorithms::dstar::DStarPlanner;
//! use warenav_library::algorithms::occupancy_grid::OccupancyGrid;
//!
//! let mut grid = OccupancyGrid::new(5, 5);
//! let mut dstar = DStarPlanner::new();
//! dstar.initialize(&grid);
//!
//! let start = CellCoord::new(0, 0);
//! let goal = CellCoord::new(4, 4);
//! assert_eq!(dstar.find_path(&grid, start, goal, None).unwrap().unwrap().len(), 9);
//!
//! // Wall off the bottom row next to the start and repair
//! let mut changed = grid.set_walkable(CellCoord::new(1, 0), false).unwrap();
//! changed.extend(grid.set_walkable(CellCoord::new(0, 1), false).unwrap());
//! dstar.handle_changed_cells(&grid, &changed);
//!
//! assert!(dstar.find_path(&grid, start, goal, None).unwrap().is_none());
//! ```

use crate::algorithms::priority_queue::IndexedPriorityQueue;
use std::collections::HashMap;
use warenav_core::pathfinding::check_endpoints;
use warenav_core::{
    AgentId, CellCoord, Cost, GridMap, NavResult, Path, Pathfinder, INFINITE_COST,
    MAX_PATH_CELLS, MOVE_COST,
};

/// Search tag of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DStarTag {
    New,
    Open,
    Closed,
}

/// Per-cell D* bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DStarState {
    pub tag: DStarTag,
    /// Cost-to-goal estimate
    pub h: Cost,
    /// Smallest `h` since the cell was last put on the open list
    pub k: Cost,
    /// Next cell toward the goal
    pub back_pointer: Option<CellCoord>,
    /// Traversability seen when the cell was last looked at
    blocked: bool,
}

impl DStarState {
    fn new(blocked: bool) -> Self {
        Self {
            tag: DStarTag::New,
            h: INFINITE_COST,
            k: INFINITE_COST,
            back_pointer: None,
            blocked,
        }
    }
}

/// Stentz D* planner
#[derive(Debug, Default)]
pub struct DStarPlanner {
    states: HashMap<CellCoord, DStarState>,
    open: IndexedPriorityQueue<CellCoord, Cost>,
    goal: Option<CellCoord>,
    requester: Option<AgentId>,
    last_expanded: usize,
}

impl DStarPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// States expanded by the most recent query or repair
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Current bookkeeping for `coord`, if the search has touched it
    pub fn state(&self, coord: CellCoord) -> Option<&DStarState> {
        self.states.get(&coord)
    }

    fn reset(&mut self) {
        self.states.clear();
        self.open.clear();
        self.goal = None;
        self.requester = None;
        self.last_expanded = 0;
    }

    fn initialize_search(&mut self, grid: &dyn GridMap, goal: CellCoord, requester: Option<AgentId>) {
        self.reset();
        self.goal = Some(goal);
        self.requester = requester;

        let mut root = DStarState::new(!grid.is_traversable(goal, requester));
        root.h = 0;
        root.k = 0;
        root.tag = DStarTag::Open;
        self.states.insert(goal, root);
        self.open.enqueue(goal, 0);

        tracing::debug!(%goal, ?requester, "d* search rooted");
    }

    fn tag(&self, coord: CellCoord) -> DStarTag {
        self.states.get(&coord).map_or(DStarTag::New, |s| s.tag)
    }

    fn h(&self, coord: CellCoord) -> Cost {
        self.states.get(&coord).map_or(INFINITE_COST, |s| s.h)
    }

    fn back_pointer(&self, coord: CellCoord) -> Option<CellCoord> {
        self.states.get(&coord).and_then(|s| s.back_pointer)
    }

    fn state_mut(&mut self, grid: &dyn GridMap, coord: CellCoord) -> &mut DStarState {
        let requester = self.requester;
        self.states
            .entry(coord)
            .or_insert_with(|| DStarState::new(!grid.is_traversable(coord, requester)))
    }

    fn cost(&self, grid: &dyn GridMap, a: CellCoord, b: CellCoord) -> Cost {
        if grid.is_traversable(a, self.requester) && grid.is_traversable(b, self.requester) {
            MOVE_COST
        } else {
            INFINITE_COST
        }
    }

    /// Put `coord` on the open list with cost-to-goal `h_new`
    fn update_vertex(&mut self, grid: &dyn GridMap, coord: CellCoord, h_new: Cost) {
        let state = self.state_mut(grid, coord);
        state.k = match state.tag {
            DStarTag::New => h_new,
            DStarTag::Open => state.k.min(h_new),
            DStarTag::Closed => state.h.min(h_new),
        };
        state.h = h_new;
        state.tag = DStarTag::Open;
        let key = state.k;
        self.open.enqueue(coord, key);
    }

    fn adopt(&mut self, grid: &dyn GridMap, child: CellCoord, parent: CellCoord, h_new: Cost) {
        self.state_mut(grid, child).back_pointer = Some(parent);
        self.update_vertex(grid, child, h_new);
    }

    fn process_state(&mut self, grid: &dyn GridMap, x: CellCoord, k_old: Cost) {
        self.state_mut(grid, x).tag = DStarTag::Closed;
        let neighbors = grid.neighbors(x);

        // RAISE: look for a neighbor that is already optimal and cheaper
        if k_old < self.h(x) {
            for &y in &neighbors {
                let h_y = self.h(y);
                let via_y = h_y.saturating_add(self.cost(grid, y, x));
                if self.tag(y) != DStarTag::New && h_y <= k_old && self.h(x) > via_y {
                    let state = self.state_mut(grid, x);
                    state.back_pointer = Some(y);
                    state.h = via_y;
                }
            }
        }

        let h_x = self.h(x);
        if k_old == h_x {
            // LOWER: x is optimal, pass its cost on
            for &y in &neighbors {
                let through_x = h_x.saturating_add(self.cost(grid, x, y));
                let (tag_y, h_y, b_y) = (self.tag(y), self.h(y), self.back_pointer(y));

                if tag_y == DStarTag::New && through_x == INFINITE_COST {
                    self.state_mut(grid, y);
                } else if tag_y == DStarTag::New
                    || (b_y == Some(x) && h_y != through_x)
                    || (b_y != Some(x) && h_y > through_x)
                {
                    self.adopt(grid, y, x, through_x);
                }
            }
        } else {
            // Still raised: push the raise to dependants, and re-queue
            // whichever side can improve the other
            for &y in &neighbors {
                let through_x = h_x.saturating_add(self.cost(grid, x, y));
                let (tag_y, h_y, b_y) = (self.tag(y), self.h(y), self.back_pointer(y));

                if tag_y == DStarTag::New && through_x == INFINITE_COST {
                    self.state_mut(grid, y);
                } else if tag_y == DStarTag::New || (b_y == Some(x) && h_y != through_x) {
                    self.adopt(grid, y, x, through_x);
                } else if b_y != Some(x) && h_y > through_x {
                    self.update_vertex(grid, x, h_x);
                } else if b_y != Some(x)
                    && h_x > h_y.saturating_add(self.cost(grid, y, x))
                    && tag_y == DStarTag::Closed
                    && h_y > k_old
                {
                    self.update_vertex(grid, y, h_y);
                }
            }
        }
    }

    /// Expand states until the open list is empty
    fn compute_shortest_path(&mut self, grid: &dyn GridMap) {
        while let Some((x, k_old)) = self.open.pop() {
            self.last_expanded += 1;
            self.process_state(grid, x, k_old);
        }
    }

    /// Apply arc cost changes around `cells` to the open list
    fn apply_changes(&mut self, grid: &dyn GridMap, cells: &[CellCoord]) {
        let requester = self.requester;
        for &cell in cells {
            if !grid.in_bounds(cell.x, cell.y) {
                continue;
            }
            let blocked = !grid.is_traversable(cell, requester);
            if let Some(state) = self.states.get_mut(&cell) {
                state.blocked = blocked;
            }

            let tag = self.tag(cell);
            if Some(cell) == self.goal && !blocked {
                self.state_mut(grid, cell).back_pointer = None;
                self.update_vertex(grid, cell, 0);
            } else if blocked {
                if tag != DStarTag::New {
                    self.update_vertex(grid, cell, INFINITE_COST);
                }
            } else if tag == DStarTag::Closed {
                let h = self.h(cell);
                self.update_vertex(grid, cell, h);
            }

            for neighbor in grid.neighbors(cell) {
                if self.tag(neighbor) == DStarTag::Closed {
                    let h = self.h(neighbor);
                    self.update_vertex(grid, neighbor, h);
                }
            }
        }
    }

    /// Cells whose traversability differs from what the search last saw
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

    /// Follow back-pointers from `start` to the goal
    fn extract_path(&self, start: CellCoord) -> Option<Path> {
        let goal = self.goal?;
        if self.h(start) == INFINITE_COST {
            return None;
        }

        let mut path = vec![start];
        let mut current = start;
        while current != goal {
            if path.len() >= MAX_PATH_CELLS {
                tracing::warn!(%start, %goal, cap = MAX_PATH_CELLS, "d* path extraction hit the cell cap");
                return None;
            }
            current = self.back_pointer(current)?;
            if self.h(current) == INFINITE_COST {
                return None;
            }
            path.push(current);
        }
        Some(path)
    }
}

impl Pathfinder for DStarPlanner {
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
        if self.goal != Some(goal) || self.requester != requester {
            self.initialize_search(grid, goal, requester);
        } else {
            let changed = self.unreported_changes(grid);
            if !changed.is_empty() {
                tracing::debug!(cells = changed.len(), "reconciling unreported grid changes");
                self.apply_changes(grid, &changed);
            }
        }

        self.compute_shortest_path(grid);
        let path = self.extract_path(start);
        tracing::debug!(
            algorithm = self.algorithm_name(),
            %start,
            %goal,
            expanded = self.last_expanded,
            cells = path.as_ref().map_or(0, |p| p.len()),
            "search finished"
        );
        Ok(path)
    }

    fn handle_changed_cells(&mut self, grid: &dyn GridMap, cells: &[CellCoord]) {
        if cells.is_empty() || self.goal.is_none() {
            return;
        }

        self.last_expanded = 0;
        self.apply_changes(grid, cells);
        self.compute_shortest_path(grid);
        tracing::debug!(
            algorithm = self.algorithm_name(),
            changed = cells.len(),
            expanded = self.last_expanded,
            "repaired after grid change"
        );
    }

    fn algorithm_name(&self) -> &'static str {
        "D* Pathfinding"
    }
}
