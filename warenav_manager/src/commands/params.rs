//! warenav params command
//!
//! Prints the default runtime parameters, or writes them to a file

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;
use warenav_core::NavParams;

/// Run the params command
pub fn run_params(output: Option<&Path>) -> Result<()> {
    let params = NavParams::default();

    let Some(path) = output else {
        print!("{}", serde_yaml::to_string(&params)?);
        return Ok(());
    };

    params
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {}", "Wrote default parameters to".green().bold(), path.display());
    println!("  Load them with {}", "NavParams::load".yellow());
    Ok(())
}
