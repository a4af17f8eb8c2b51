//! # warenav Core
//!
//! The shared foundation of the warenav warehouse navigation stack.
//!
//! Warehouse robots fetch shelves and bring them back to stations while sharing
//! a single occupancy grid. This crate holds everything the planners and the
//! surrounding simulation agree on:
//!
//! - **Grid**: cell coordinates, agent identities and the [`GridMap`] read boundary
//! - **Pathfinding**: the [`Pathfinder`] contract, cost constants and algorithm kinds
//! - **Errors**: [`NavError`] and the [`NavResult`] alias
//! - **Params**: typed runtime configuration loaded from YAML or TOML
//!
//! ## Quick Start
//!
//! ```rust
//! use warenav_core::{AgentId, Cell, CellCoord, GridMap};
//!
//! struct OpenFloor;
//!
//! impl GridMap for OpenFloor {
//!     fn width(&self) -> i32 { 5 }
//!     fn height(&self) -> i32 { 5 }
//!     fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
//!         self.in_bounds(x, y).then(|| Cell::free(CellCoord::new(x, y)))
//!     }
//! }
//!
//! let floor = OpenFloor;
//! assert_eq!(floor.neighbors(CellCoord::new(0, 0)).len(), 2);
//! assert!(floor.is_traversable(CellCoord::new(2, 2), Some(AgentId(1))));
//! ```

pub mod error;
pub mod grid;
pub mod params;
pub mod pathfinding;

// Re-export commonly used types for easy access
pub use error::{NavError, NavResult};
pub use grid::{AgentId, Cell, CellCoord, GridMap};
pub use params::NavParams;
pub use pathfinding::{
    heuristic, Cost, Path, Pathfinder, PlanningAlgorithm, INFINITE_COST, MAX_PATH_CELLS,
    MOVE_COST,
};
