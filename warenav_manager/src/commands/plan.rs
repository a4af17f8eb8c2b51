//! warenav plan command
//!
//! Plans a single route on a scenario's map and draws it

use crate::render::{format_path, render_grid};
use crate::scenario::{requester_at, Scenario};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path as FsPath;
use std::time::Instant;
use warenav_core::pathfinding::path_cost;
use warenav_core::{AgentId, CellCoord, Cost, NavResult, Path, PlanningAlgorithm};
use warenav_library::{OccupancyGrid, PathPlanner};

/// Result of one planning query
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub algorithm: PlanningAlgorithm,
    pub start: CellCoord,
    pub goal: CellCoord,
    pub requester: Option<AgentId>,
    pub path: Option<Path>,
    pub cost: Option<Cost>,
    pub elapsed_us: u64,
}

/// Plan on the scenario grid, returning the grid for rendering
pub fn plan(
    scenario: &Scenario,
    algorithm: Option<PlanningAlgorithm>,
    from: Option<CellCoord>,
    to: Option<CellCoord>,
) -> NavResult<(OccupancyGrid, PlanOutcome)> {
    let params = scenario.params_with(algorithm);
    let grid = scenario.build_grid()?;
    let (start, goal) = scenario.resolve_route(from, to)?;
    let requester = requester_at(&grid, start);

    let mut planner = PathPlanner::with_algorithms(&grid, &[params.algorithm])?;
    let started = Instant::now();
    let path = planner.find_path(&grid, start, goal, requester)?;
    let elapsed_us = started.elapsed().as_micros() as u64;

    let outcome = PlanOutcome {
        algorithm: params.algorithm,
        start,
        goal,
        requester,
        cost: path.as_deref().map(path_cost),
        path,
        elapsed_us,
    };
    Ok((grid, outcome))
}

/// Run the plan command
pub fn run_plan(
    scenario_path: &FsPath,
    algorithm: Option<PlanningAlgorithm>,
    from: Option<CellCoord>,
    to: Option<CellCoord>,
    json: bool,
) -> Result<()> {
    let scenario = Scenario::load(scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;
    let (grid, outcome) = plan(&scenario, algorithm, from, to).context("Planning failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let fallback = scenario_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("scenario");
    println!(
        "{} {} with {}",
        "Planning".cyan().bold(),
        scenario.title(fallback),
        outcome.algorithm.as_str().yellow()
    );
    println!("  {} -> {}", outcome.start, outcome.goal);
    if let Some(agent) = outcome.requester {
        println!("  requested by {}", agent.to_string().yellow());
    }
    println!();

    match &outcome.path {
        Some(path) => {
            print!("{}", render_grid(&grid, Some(path)));
            println!();
            println!(
                "{} {} cells, cost {} ({} us)",
                "Path found:".green().bold(),
                path.len(),
                outcome.cost.unwrap_or_default(),
                outcome.elapsed_us
            );
            println!("  {}", format_path(path));
        }
        None => {
            print!("{}", render_grid(&grid, None));
            println!();
            println!("{} goal is unreachable", "No path:".yellow().bold());
        }
    }
    Ok(())
}
