//! A* grid pathfinding
//!
//! Stateless best-first search on the 4-connected warehouse grid. Every call
//! searches from scratch, which makes A* the baseline the incremental planners
//! are measured against and the fallback when their state is in doubt.
//!
//! # Features
//!
//! - Manhattan heuristic scaled by [`MOVE_COST`]
//! - Ties on `f` resolved toward the smaller `h` (closer to the goal first)
//! - Occupied cells are passable only for their occupant
//! - Paths longer than [`MAX_PATH_CELLS`] cells are reported as unreachable
//!
//! # Example
//!
//! ```rust
//! use warenav_core::{CellCoord, Pathfinder};
//! use warenav_library::algorithms::astar::AStarPlanner;
//! use warenav_library::algorithms::occupancy_grid::OccupancyGrid;
//!
//! let grid = OccupancyGrid::new(5, 5);
//! let mut astar = AStarPlanner::new();
//! astar.initialize(&grid);
//!
//! let path = astar
//!     .find_path(&grid, CellCoord::new(0, 0), CellCoord::new(4, 4), None)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(path.len(), 9);
//! ```

use crate::algorithms::priority_queue::IndexedPriorityQueue;
use std::collections::{HashMap, HashSet};
use warenav_core::pathfinding::check_endpoints;
use warenav_core::{
    heuristic, AgentId, CellCoord, Cost, GridMap, NavResult, Path, Pathfinder, MAX_PATH_CELLS,
    MOVE_COST,
};

/// Open list key: `(f, h)`, compared lexicographically
type AStarKey = (Cost, Cost);

/// A* planner. Holds no state between calls apart from diagnostics.
#[derive(Debug, Default)]
pub struct AStarPlanner {
    last_expanded: usize,
}

impl AStarPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes expanded by the most recent search
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    fn search(
        &mut self,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) -> Option<Path> {
        let mut open: IndexedPriorityQueue<CellCoord, AStarKey> = IndexedPriorityQueue::new();
        let mut closed: HashSet<CellCoord> = HashSet::new();
        let mut g_cost: HashMap<CellCoord, Cost> = HashMap::new();
        let mut came_from: HashMap<CellCoord, CellCoord> = HashMap::new();

        let h_start = heuristic(start, goal);
        g_cost.insert(start, 0);
        open.enqueue(start, (h_start, h_start));

        while let Some((current, _)) = open.pop() {
            if current == goal {
                return Self::reconstruct_path(&came_from, start, current);
            }

            closed.insert(current);
            self.last_expanded += 1;

            let current_g = g_cost.get(&current).copied().unwrap_or(0);
            for neighbor in grid.neighbors(current) {
                if closed.contains(&neighbor) || !grid.is_traversable(neighbor, requester) {
                    continue;
                }

                let tentative_g = current_g.saturating_add(MOVE_COST);
                let improved = g_cost
                    .get(&neighbor)
                    .map_or(true, |&known| tentative_g < known);

                if improved {
                    came_from.insert(neighbor, current);
                    g_cost.insert(neighbor, tentative_g);
                    let h = heuristic(neighbor, goal);
                    open.enqueue(neighbor, (tentative_g.saturating_add(h), h));
                }
            }
        }

        None
    }

    /// Walk `came_from` back from `end`, giving up past the cell cap
    fn reconstruct_path(
        came_from: &HashMap<CellCoord, CellCoord>,
        start: CellCoord,
        end: CellCoord,
    ) -> Option<Path> {
        let mut path = vec![end];
        let mut current = end;
        while let Some(&previous) = came_from.get(&current) {
            if path.len() >= MAX_PATH_CELLS {
                tracing::warn!(%start, goal = %end, cap = MAX_PATH_CELLS, "a* path exceeds the cell cap");
                return None;
            }
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}

impl Pathfinder for AStarPlanner {
    fn initialize(&mut self, grid: &dyn GridMap) {
        self.last_expanded = 0;
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
        self.last_expanded = 0;

        if !grid.is_traversable(start, requester) || !grid.is_traversable(goal, requester) {
            tracing::debug!(%start, %goal, "endpoint blocked for requester");
            return Ok(None);
        }

        let path = self.search(grid, start, goal, requester);
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

    fn handle_changed_cells(&mut self, _grid: &dyn GridMap, _cells: &[CellCoord]) {
        // Every query searches from scratch
    }

    fn algorithm_name(&self) -> &'static str {
        "A* Pathfinding"
    }
}
