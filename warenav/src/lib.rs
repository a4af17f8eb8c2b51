//! # warenav - warehouse robot navigation
//!
//! Grid path planning for robot fleets that share one warehouse floor. Three
//! planners sit behind a single facade: a from-scratch A* and the incremental
//! D* and D* Lite, which repair their previous search when cells change.
//!
//! ## Quick Start
//!
//! ```rust
//! use warenav::prelude::*;
//!
//! let mut grid = OccupancyGrid::from_ascii(
//!     "
//!     .....
//!     .##..
//!     1....
//!     ",
//! )?;
//! let params = NavParams {
//!     algorithm: PlanningAlgorithm::DStarLite,
//!     ..NavParams::default()
//! };
//! let mut planner = PathPlanner::from_params(&grid, &params);
//!
//! let (start, goal) = (CellCoord::new(0, 0), CellCoord::new(4, 2));
//! let path = planner.find_path(&grid, start, goal, Some(AgentId(1)))?;
//! assert_eq!(path.map(|p| p.len()), Some(7));
//!
//! // Tell every planner about the change, then ask again
//! let changed = grid.set_walkable(CellCoord::new(3, 0), false)?;
//! planner.notify_changed_cells(&grid, &changed);
//! let detour = planner.find_path(&grid, start, goal, Some(AgentId(1)))?;
//! assert!(detour.is_some_and(|p| !p.contains(&CellCoord::new(3, 0))));
//! # Ok::<(), NavError>(())
//! ```
//!
//! ## Crates
//!
//! - [`warenav_core`]: grid contract, planner trait, errors and params
//! - [`warenav_library`]: the planners, the occupancy grid and the fleet simulation

// Re-export core components
pub use warenav_core::{self, *};

// Re-export the planners and simulation with alias
pub use warenav_library as library;

/// The warenav prelude - everything needed to plan on a grid
pub mod prelude {
    // Grid
    pub use warenav_core::{AgentId, Cell, CellCoord, GridMap};

    // Planning
    pub use warenav_core::pathfinding::{heuristic, is_contiguous, path_cost};
    pub use warenav_core::{Cost, Path, Pathfinder, PlanningAlgorithm, INFINITE_COST, MOVE_COST};

    // Error types and params
    pub use warenav_core::{NavError, NavParams, NavResult};

    // Implementations
    pub use warenav_library::{
        AStarPlanner, DStarLitePlanner, DStarPlanner, Fleet, OccupancyGrid, PathPlanner,
        RobotPhase, TickReport,
    };

    // Common traits
    pub use serde::{Deserialize, Serialize};

    // Re-export anyhow for error handling
    pub use anyhow::{anyhow, bail, ensure, Context, Result as AnyResult};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get warenav version
pub fn version() -> &'static str {
    VERSION
}
