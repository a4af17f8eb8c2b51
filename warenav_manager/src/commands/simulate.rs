//! warenav simulate command
//!
//! Runs the fleet tick by tick, applying the scenario's obstacle events
//! before the tick they are scheduled for.

use crate::render::render_grid;
use crate::scenario::{ObstacleEvent, Scenario};
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::path::Path as FsPath;
use warenav_core::{AgentId, NavResult, PlanningAlgorithm};
use warenav_library::{Fleet, GridStats, RobotAgent, TickReport};

/// One tick together with the events applied before it
#[derive(Debug, Clone, Serialize)]
pub struct TickLog {
    pub events: Vec<ObstacleEvent>,
    /// Robots replanned because of `events`
    pub rerouted: Vec<AgentId>,
    pub report: TickReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub algorithm: PlanningAlgorithm,
    pub ticks: u32,
    pub trips: u32,
    pub moves: usize,
    pub replans: usize,
    pub idle: bool,
    pub grid: GridStats,
    pub robots: Vec<RobotAgent>,
    pub log: Vec<TickLog>,
}

/// Run the scenario for at most `ticks` ticks (default `params.max_ticks`).
/// Stops early once every robot is idle and no event is left.
pub fn simulate(
    scenario: &Scenario,
    algorithm: Option<PlanningAlgorithm>,
    ticks: Option<u32>,
) -> NavResult<(Fleet, SimulationSummary)> {
    let mut fleet = scenario.build_fleet(algorithm)?;
    let limit = ticks.unwrap_or(scenario.params_with(algorithm).max_ticks);
    let last_event = scenario.last_event_tick();
    let mut log = Vec::new();

    while fleet.ticks() < limit {
        let next = fleet.ticks() + 1;
        if fleet.is_idle() && next > last_event {
            break;
        }

        let mut events = Vec::new();
        let mut rerouted = Vec::new();
        for event in scenario.events_at(next) {
            let affected = if event.blocked {
                fleet.add_obstacle(event.cell)?
            } else {
                fleet.remove_obstacle(event.cell)?
            };
            tracing::info!(tick = next, cell = %event.cell, blocked = event.blocked, rerouted = affected.len(), "obstacle event");
            rerouted.extend(affected);
            events.push(event.clone());
        }

        let report = fleet.tick()?;
        log.push(TickLog {
            events,
            rerouted,
            report,
        });
    }

    let robots: Vec<RobotAgent> = fleet.robots().cloned().collect();
    let summary = SimulationSummary {
        algorithm: fleet.planner().current_algorithm(),
        ticks: fleet.ticks(),
        trips: robots.iter().map(|robot| robot.trips).sum(),
        moves: log.iter().map(|entry| entry.report.moves).sum(),
        replans: log.iter().map(|entry| entry.report.replans).sum(),
        idle: fleet.is_idle(),
        grid: fleet.grid().stats(),
        robots,
        log,
    };
    Ok((fleet, summary))
}

fn print_tick(entry: &TickLog) {
    let tick = entry.report.tick;
    for event in &entry.events {
        let verb = if event.blocked { "blocked" } else { "cleared" };
        println!("  {} {} {}", format!("tick {:>4}", tick).dimmed(), verb.yellow(), event.cell);
    }
    if !entry.rerouted.is_empty() {
        let ids: Vec<String> = entry.rerouted.iter().map(ToString::to_string).collect();
        println!("  {} rerouted {}", format!("tick {:>4}", tick).dimmed(), ids.join(", "));
    }

    let mut line = format!(
        "  {} {} moved, {} replanned",
        format!("tick {:>4}", tick).dimmed(),
        entry.report.moves,
        entry.report.replans
    );
    if !entry.report.blocked.is_empty() {
        line.push_str(&format!(", {} waiting", entry.report.blocked.len()).red().to_string());
    }
    for agent in &entry.report.completed_trips {
        line.push_str(&format!(", {} finished a trip", agent).green().to_string());
    }
    println!("{}", line);
}

/// Run the simulate command
pub fn run_simulate(
    scenario_path: &FsPath,
    algorithm: Option<PlanningAlgorithm>,
    ticks: Option<u32>,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let scenario = Scenario::load(scenario_path)
        .with_context(|| format!("Failed to load scenario {}", scenario_path.display()))?;
    let (fleet, summary) =
        simulate(&scenario, algorithm, ticks).context("Simulation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {} robots with {}",
        "Simulating".cyan().bold(),
        summary.robots.len(),
        summary.algorithm.as_str().yellow()
    );
    println!();
    if !quiet {
        for entry in &summary.log {
            print_tick(entry);
        }
        println!();
    }

    print!("{}", render_grid(fleet.grid(), None));
    println!();
    for robot in &summary.robots {
        println!(
            "  {} at {} ({} trips, {} queued)",
            robot.id.to_string().yellow(),
            robot.position,
            robot.trips,
            robot.pending.len()
        );
    }
    println!();
    println!(
        "  {} ticks, {} moves, {} replans, {} blocked cells",
        summary.ticks, summary.moves, summary.replans, summary.grid.blocked
    );

    if summary.idle {
        println!("{} {} trips completed", "Done:".green().bold(), summary.trips);
    } else {
        println!(
            "{} stopped after {} ticks with robots still busy",
            "Warning:".yellow().bold(),
            summary.ticks
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use warenav_core::CellCoord;

    const AISLE: &str = r#"
map:
  - "......"
  - ".##.#."
  - "1....."
robots:
  - id: 1
    home: { x: 0, y: 0 }
tasks:
  - robot: 1
    shelf: { x: 5, y: 2 }
events:
  - tick: 2
    cell: { x: 3, y: 0 }
"#;

    #[test]
    fn test_trip_completes_around_event() {
        let scenario = Scenario::from_yaml_str(AISLE).unwrap();
        for kind in PlanningAlgorithm::ALL {
            let (fleet, summary) = simulate(&scenario, Some(kind), None).unwrap();
            assert!(summary.idle, "{}", kind);
            assert_eq!(summary.trips, 1, "{}", kind);
            assert_eq!(summary.grid.blocked, 4);
            assert_eq!(summary.log[1].events.len(), 1);
            assert_eq!(fleet.robot(AgentId(1)).unwrap().position, CellCoord::new(0, 0));
            assert!(summary.ticks < scenario.params.max_ticks);
        }
    }

    #[test]
    fn test_tick_limit_stops_early() {
        let scenario = Scenario::from_yaml_str(AISLE).unwrap();
        let (_, summary) = simulate(&scenario, None, Some(3)).unwrap();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.log.len(), 3);
        assert!(!summary.idle);
        assert_eq!(summary.trips, 0);
    }

    #[test]
    fn test_late_events_still_apply_to_idle_fleet() {
        let scenario = Scenario::from_yaml_str(
            r#"
map: ["...", "..."]
events:
  - tick: 3
    cell: { x: 1, y: 1 }
"#,
        )
        .unwrap();
        let (fleet, summary) = simulate(&scenario, None, None).unwrap();
        assert_eq!(summary.ticks, 3);
        assert!(!fleet.grid().is_walkable(CellCoord::new(1, 1)));
    }
}
