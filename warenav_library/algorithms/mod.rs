//! Pure grid planning algorithms
//!
//! No I/O: every planner borrows the grid for the duration of a call and keeps
//! only its own per-cell bookkeeping.
//!
//! # Available Algorithms
//!
//! ## Planning
//! - **astar**: A* search from scratch on every query
//! - **dstar**: Stentz's D*, repairs a goal-rooted cost field after changes
//! - **dstar_lite**: D* Lite, incremental `g`/`rhs` search with key modifier
//!
//! ## Supporting structures
//! - **priority_queue**: indexed binary min-heap shared by the planners
//! - **occupancy_grid**: warehouse grid with walkability and occupants

pub mod astar;
pub mod dstar;
pub mod dstar_lite;
pub mod occupancy_grid;
pub mod priority_queue;
