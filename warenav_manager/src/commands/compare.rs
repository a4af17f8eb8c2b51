//! warenav compare command
//!
//! Runs every planner on the same route. When the scenario has obstacle
//! events, they are all applied afterwards and each planner replans, so the
//! incremental planners can be compared against a fresh A* search.

use crate::scenario::{requester_at, Scenario};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path as FsPath;
use std::time::Instant;
use warenav_core::pathfinding::path_cost;
use warenav_core::{CellCoord, Cost, NavResult, Path, PlanningAlgorithm};
use warenav_library::PathPlanner;

/// Path length and timing for one planner
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonRow {
    pub algorithm: PlanningAlgorithm,
    pub cells: Option<usize>,
    pub cost: Option<Cost>,
    pub elapsed_us: u64,
    /// Present only when the scenario has events
    pub replan: Option<ReplanRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplanRow {
    pub changed_cells: usize,
    pub cells: Option<usize>,
    pub cost: Option<Cost>,
    pub elapsed_us: u64,
}

fn timed<F>(query: F) -> NavResult<(Option<Path>, u64)>
where
    F: FnOnce() -> NavResult<Option<Path>>,
{
    let started = Instant::now();
    let path = query()?;
    Ok((path, started.elapsed().as_micros() as u64))
}

pub fn compare(
    scenario: &Scenario,
    from: Option<CellCoord>,
    to: Option<CellCoord>,
) -> NavResult<Vec<ComparisonRow>> {
    let (start, goal) = scenario.resolve_route(from, to)?;
    let mut rows = Vec::new();

    for kind in PlanningAlgorithm::ALL {
        let mut grid = scenario.build_grid()?;
        let requester = requester_at(&grid, start);
        let mut planner = PathPlanner::with_algorithms(&grid, &[kind])?;

        let (path, elapsed_us) = timed(|| planner.find_path(&grid, start, goal, requester))?;
        let mut row = ComparisonRow {
            algorithm: kind,
            cells: path.as_ref().map(Vec::len),
            cost: path.as_deref().map(path_cost),
            elapsed_us,
            replan: None,
        };

        if !scenario.events.is_empty() {
            let mut changed = Vec::new();
            for event in &scenario.events {
                changed.extend(grid.set_walkable(event.cell, !event.blocked)?);
            }
            let (path, elapsed_us) = timed(|| {
                planner.notify_changed_cells(&grid, &changed);
                planner.find_path(&grid, start, goal, requester)
            })?;
            row.replan = Some(ReplanRow {
                changed_cells: changed.len(),
                cells: path.as_ref().map(Vec::len),
                cost: path.as_deref().map(path_cost),
                elapsed_us,
            });
        }

        tracing::debug!(algorithm = %kind, cells = ?row.cells, elapsed_us = row.elapsed_us, "compared");
        rows.push(row);
    }
    Ok(rows)
}

fn cells_text(cells: Option<usize>) -> String {
    cells.map_or_else(|| "none".to_string(), |n| n.to_string())
}

/// Run the compare command
pub fn run_compare(
    scenario_path: &FsPath,
    from: Option<CellCoord>,
    to: Option<CellCoord>,
    json: bool,
) -> Result<()> {
    let scenario = Scenario::load(scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;
    let rows = compare(&scenario, from, to).context("Comparison failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{}", "Comparing planners".cyan().bold());
    println!();
    println!(
        "  {:<12} {:>8} {:>8} {:>10}   {:>8} {:>10}",
        "algorithm", "cells", "cost", "time (us)", "replan", "time (us)"
    );
    for row in &rows {
        let (replan_cells, replan_time) = match &row.replan {
            Some(replan) => (cells_text(replan.cells), replan.elapsed_us.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "  {:<12} {:>8} {:>8} {:>10}   {:>8} {:>10}",
            row.algorithm.as_str().yellow(),
            cells_text(row.cells),
            row.cost.map_or_else(|| "-".to_string(), |c| c.to_string()),
            row.elapsed_us,
            replan_cells,
            replan_time
        );
    }

    let lengths: Vec<Option<usize>> = rows.iter().map(|row| row.cells).collect();
    println!();
    if lengths.windows(2).all(|pair| pair[0] == pair[1]) {
        println!("{}", "All planners agree on the path length".green().bold());
    } else {
        println!("{}", "Planners disagree on the path length".red().bold());
    }
    Ok(())
}
