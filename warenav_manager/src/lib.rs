//! warenav Manager Library
//!
//! Scenario loading, terminal rendering and the subcommands behind the
//! `warenav` binary.

pub mod commands;
pub mod render;
pub mod scenario;
