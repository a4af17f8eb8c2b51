//! Scenario files
//!
//! A scenario describes one warehouse floor: the ASCII map, the robots that
//! live on it, the shelves they should fetch and obstacles that appear or
//! disappear while the simulation runs. Files ending in `.yaml`/`.yml` are
//! read as YAML, `.toml` as TOML.
//!
//! Map digits are parked robots. A robot listed under `robots` whose id
//! matches a digit takes over that cell as its home.

use serde::{Deserialize, Serialize};
use std::path::Path;
use warenav_core::{AgentId, CellCoord, GridMap, NavError, NavParams, NavResult, PlanningAlgorithm};
use warenav_library::{Fleet, OccupancyGrid, PathPlanner};

/// A robot to spawn before the simulation starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotEntry {
    pub id: u32,
    pub home: CellCoord,
}

/// A shelf trip handed to a robot at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub robot: u32,
    pub shelf: CellCoord,
}

/// Walkability change applied right before `tick` runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleEvent {
    pub tick: u32,
    pub cell: CellCoord,
    #[serde(default = "default_blocked")]
    pub blocked: bool,
}

fn default_blocked() -> bool {
    true
}

/// Default endpoints for `plan` and `compare`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub from: Option<CellCoord>,
    pub to: Option<CellCoord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    /// Map rows, top row first
    pub map: Vec<String>,
    #[serde(default)]
    pub robots: Vec<RobotEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    #[serde(default)]
    pub events: Vec<ObstacleEvent>,
    #[serde(default)]
    pub route: Option<RouteEntry>,
    #[serde(default)]
    pub params: NavParams,
}

impl Scenario {
    pub fn load(path: &Path) -> NavResult<Self> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            Some("toml") => Self::from_toml_str(&text),
            _ => Err(NavError::config(format!(
                "unsupported scenario file {:?} (expected .yaml, .yml or .toml)",
                path
            ))),
        }
    }

    pub fn from_yaml_str(text: &str) -> NavResult<Self> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.params.validate()?;
        Ok(scenario)
    }

    pub fn from_toml_str(text: &str) -> NavResult<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.params.validate()?;
        Ok(scenario)
    }

    /// Display name, falling back to the given file stem
    pub fn title<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    pub fn build_grid(&self) -> NavResult<OccupancyGrid> {
        OccupancyGrid::from_ascii(&self.map.join("\n"))
    }

    /// Scenario params with an optional algorithm override
    pub fn params_with(&self, algorithm: Option<PlanningAlgorithm>) -> NavParams {
        let mut params = self.params.clone();
        if let Some(algorithm) = algorithm {
            params.algorithm = algorithm;
        }
        params
    }

    /// Grid, planner and robots ready to tick, with every task assigned
    pub fn build_fleet(&self, algorithm: Option<PlanningAlgorithm>) -> NavResult<Fleet> {
        let params = self.params_with(algorithm);
        let grid = self.build_grid()?;
        let planner = PathPlanner::from_params(&grid, &params);
        let mut fleet = Fleet::new(grid, planner, params);

        for robot in &self.robots {
            fleet.spawn_robot(AgentId(robot.id), robot.home)?;
        }
        for task in &self.tasks {
            fleet.assign_task(AgentId(task.robot), task.shelf)?;
        }
        Ok(fleet)
    }

    /// Events scheduled for `tick`, in file order
    pub fn events_at(&self, tick: u32) -> impl Iterator<Item = &ObstacleEvent> {
        self.events.iter().filter(move |event| event.tick == tick)
    }

    pub fn last_event_tick(&self) -> u32 {
        self.events.iter().map(|event| event.tick).max().unwrap_or(0)
    }

    /// Resolve endpoints: explicit values first, then the scenario's route,
    /// then the first robot's home and the first task's shelf
    pub fn resolve_route(
        &self,
        from: Option<CellCoord>,
        to: Option<CellCoord>,
    ) -> NavResult<(CellCoord, CellCoord)> {
        let route = self.route.clone().unwrap_or_default();
        let start = from
            .or(route.from)
            .or_else(|| self.robots.first().map(|robot| robot.home))
            .ok_or_else(|| NavError::config("no start cell: pass --from or add a route"))?;
        let goal = to
            .or(route.to)
            .or_else(|| self.tasks.first().map(|task| task.shelf))
            .ok_or_else(|| NavError::config("no goal cell: pass --to or add a route"))?;
        Ok((start, goal))
    }
}

/// Agent standing on `start`, so a robot may plan out of its own cell
pub fn requester_at(grid: &OccupancyGrid, start: CellCoord) -> Option<AgentId> {
    grid.cell_at(start.x, start.y).and_then(|cell| cell.occupant)
}
