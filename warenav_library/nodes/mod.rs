//! warenav nodes
//!
//! Higher level components that drive the algorithms:
//!
//! - `PathPlanner` - one planner per algorithm, change broadcast, runtime switching
//! - `Fleet` - tick-based simulation of robots fetching shelves on a shared grid

pub mod fleet;
pub mod path_planner;

pub use fleet::{Fleet, RobotAgent, RobotPhase, TickReport};
pub use path_planner::PathPlanner;
