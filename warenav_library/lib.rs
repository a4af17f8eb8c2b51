//! # warenav Library
//!
//! Planners, the concrete occupancy grid and the fleet simulation built on
//! top of `warenav_core`.
//!
//! ## Structure
//!
//! ```text
//! warenav_library/
//! ── algorithms/     # Priority queue, A*, D*, D* Lite, occupancy grid
//! ── nodes/          # Planner facade and fleet simulation
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use warenav_library::{OccupancyGrid, PathPlanner};
//! use warenav_core::{CellCoord, PlanningAlgorithm};
//!
//! let grid = OccupancyGrid::new(5, 5);
//! let mut planner = PathPlanner::new(&grid);
//! planner.set_algorithm(PlanningAlgorithm::DStarLite).unwrap();
//!
//! let path = planner
//!     .find_path(&grid, CellCoord::new(0, 0), CellCoord::new(4, 4), None)
//!     .unwrap();
//! assert_eq!(path.map(|p| p.len()), Some(9));
//! ```

pub mod algorithms;
pub mod nodes;

// Re-export the planners and the grid at the crate root for convenience
pub use algorithms::astar::AStarPlanner;
pub use algorithms::dstar::DStarPlanner;
pub use algorithms::dstar_lite::{DStarLiteKey, DStarLitePlanner};
pub use algorithms::occupancy_grid::{GridStats, OccupancyGrid};
pub use algorithms::priority_queue::IndexedPriorityQueue;

pub use nodes::fleet::{Fleet, RobotAgent, RobotPhase, TickReport};
pub use nodes::path_planner::PathPlanner;
