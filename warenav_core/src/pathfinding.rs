//! Planner contract and the cost model every planner shares
//!
//! Movement is 4-connected with a uniform cost of [`MOVE_COST`] per step.
//! Infinite cost is represented by [`INFINITE_COST`] and all additions
//! saturate, so `INFINITE_COST + MOVE_COST == INFINITE_COST`.

use crate::error::{NavError, NavResult};
use crate::grid::{AgentId, CellCoord, GridMap};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Path cost in tenths of a step
pub type Cost = u32;

/// Cost of one orthogonal move
pub const MOVE_COST: Cost = 10;

/// Unreachable / blocked
pub const INFINITE_COST: Cost = Cost::MAX;

/// Hard cap on the number of cells in an extracted path
pub const MAX_PATH_CELLS: usize = 1000;

/// Ordered cells from start to goal, both inclusive
pub type Path = Vec<CellCoord>;

/// Manhattan distance scaled by the move cost
pub fn heuristic(a: CellCoord, b: CellCoord) -> Cost {
    a.manhattan(&b).saturating_mul(MOVE_COST)
}

/// Total cost of walking `path`
pub fn path_cost(path: &[CellCoord]) -> Cost {
    (path.len().saturating_sub(1) as Cost).saturating_mul(MOVE_COST)
}

/// True when every consecutive pair of cells is 4-adjacent
pub fn is_contiguous(path: &[CellCoord]) -> bool {
    path.windows(2).all(|pair| pair[0].is_adjacent(&pair[1]))
}

/// Common interface of the A*, D* and D* Lite planners.
///
/// Planners never keep a reference to the grid; each call borrows it, which
/// keeps grid mutation and planning serialized by the caller.
pub trait Pathfinder {
    /// Bind to `grid` and clear all persistent state
    fn initialize(&mut self, grid: &dyn GridMap);

    /// Shortest path from `start` to `goal` for `requester`.
    ///
    /// Returns `Ok(None)` when the goal is unreachable and
    /// [`NavError::InvalidEndpoint`] when an endpoint lies outside the grid.
    fn find_path(
        &mut self,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) -> NavResult<Option<Path>>;

    /// Notification that walkability or occupancy of `cells` changed
    fn handle_changed_cells(&mut self, grid: &dyn GridMap, cells: &[CellCoord]);

    /// Human readable algorithm name
    fn algorithm_name(&self) -> &'static str;
}

/// Resolve both endpoints against the grid before any state is touched
pub fn check_endpoints(grid: &dyn GridMap, start: CellCoord, goal: CellCoord) -> NavResult<()> {
    for endpoint in [start, goal] {
        if grid.cell_at(endpoint.x, endpoint.y).is_none() {
            return Err(NavError::invalid_endpoint(endpoint.x, endpoint.y));
        }
    }
    Ok(())
}

/// Planner kinds available to the facade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanningAlgorithm {
    AStar,
    DStar,
    DStarLite,
}

impl PlanningAlgorithm {
    pub const ALL: [PlanningAlgorithm; 3] = [
        PlanningAlgorithm::AStar,
        PlanningAlgorithm::DStar,
        PlanningAlgorithm::DStarLite,
    ];

    /// Identifier used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanningAlgorithm::AStar => "a-star",
            PlanningAlgorithm::DStar => "d-star",
            PlanningAlgorithm::DStarLite => "d-star-lite",
        }
    }
}

impl Default for PlanningAlgorithm {
    fn default() -> Self {
        PlanningAlgorithm::AStar
    }
}

impl fmt::Display for PlanningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanningAlgorithm {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "a-star" | "astar" | "a*" => Ok(PlanningAlgorithm::AStar),
            "d-star" | "dstar" | "d*" => Ok(PlanningAlgorithm::DStar),
            "d-star-lite" | "dstar-lite" | "dstarlite" | "d*-lite" => {
                Ok(PlanningAlgorithm::DStarLite)
            }
            other => Err(NavError::PlannerNotConfigured(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_is_scaled_manhattan() {
        assert_eq!(heuristic(CellCoord::new(0, 0), CellCoord::new(4, 4)), 80);
        assert_eq!(heuristic(CellCoord::new(3, 1), CellCoord::new(1, 2)), 30);
        assert_eq!(heuristic(CellCoord::new(2, 2), CellCoord::new(2, 2)), 0);
    }

    #[test]
    fn test_infinite_cost_saturates() {
        assert_eq!(INFINITE_COST.saturating_add(MOVE_COST), INFINITE_COST);
    }

    #[test]
    fn test_path_helpers() {
        let path: Path = vec![
            CellCoord::new(0, 0),
            CellCoord::new(1, 0),
            CellCoord::new(1, 1),
        ];
        assert!(is_contiguous(&path));
        assert_eq!(path_cost(&path), 20);
        assert_eq!(path_cost(&[]), 0);

        let broken = vec![CellCoord::new(0, 0), CellCoord::new(2, 0)];
        assert!(!is_contiguous(&broken));
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("astar".parse::<PlanningAlgorithm>().unwrap(), PlanningAlgorithm::AStar);
        assert_eq!("D_Star".parse::<PlanningAlgorithm>().unwrap(), PlanningAlgorithm::DStar);
        assert_eq!(
            "d-star-lite".parse::<PlanningAlgorithm>().unwrap(),
            PlanningAlgorithm::DStarLite
        );
        assert!("dijkstra".parse::<PlanningAlgorithm>().is_err());

        for algorithm in PlanningAlgorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<PlanningAlgorithm>().unwrap(), algorithm);
        }
    }
}
