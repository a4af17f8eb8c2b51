//! Subcommands of the `warenav` binary

pub mod compare;
pub mod params;
pub mod plan;
pub mod simulate;
