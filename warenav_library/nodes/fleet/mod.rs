//! Fleet simulation
//!
//! Robots shuttle between their home station and shelf access cells on one
//! shared [`OccupancyGrid`]. Each tick every busy robot advances one cell;
//! the cells it vacates and enters are broadcast to the planners so the
//! incremental ones stay current. A robot whose next cell is taken replans,
//! and a target nobody can reach is swapped for the nearest accessible cell.

use crate::algorithms::occupancy_grid::OccupancyGrid;
use crate::nodes::path_planner::PathPlanner;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use warenav_core::{AgentId, CellCoord, GridMap, NavError, NavParams, NavResult, Path};

/// What a robot is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "target", rename_all = "kebab-case")]
pub enum RobotPhase {
    Idle,
    FetchingShelf(CellCoord),
    Returning,
}

/// One simulated robot
#[derive(Debug, Clone, Serialize)]
pub struct RobotAgent {
    pub id: AgentId,
    pub position: CellCoord,
    pub home: CellCoord,
    pub phase: RobotPhase,
    pub path: Path,
    /// Index of `position` within `path`
    pub path_index: usize,
    pub trips: u32,
    /// Shelves waiting for this robot after the current trip
    pub pending: VecDeque<CellCoord>,
}

impl RobotAgent {
    fn new(id: AgentId, home: CellCoord) -> Self {
        Self {
            id,
            position: home,
            home,
            phase: RobotPhase::Idle,
            path: Path::new(),
            path_index: 0,
            trips: 0,
            pending: VecDeque::new(),
        }
    }

    /// Cell the robot is heading for
    pub fn destination(&self) -> Option<CellCoord> {
        match self.phase {
            RobotPhase::Idle => None,
            RobotPhase::FetchingShelf(target) => Some(target),
            RobotPhase::Returning => Some(self.home),
        }
    }

    /// Cells still ahead of the robot, excluding its own
    pub fn remaining_path(&self) -> &[CellCoord] {
        self.path.get(self.path_index + 1..).unwrap_or_default()
    }

    pub fn is_idle(&self) -> bool {
        self.phase == RobotPhase::Idle && self.pending.is_empty()
    }

    fn next_cell(&self) -> Option<CellCoord> {
        self.path.get(self.path_index + 1).copied()
    }
}

/// Summary of one simulation step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u32,
    pub moves: usize,
    pub replans: usize,
    /// Robots that wanted to move but could not
    pub blocked: Vec<AgentId>,
    pub completed_trips: Vec<AgentId>,
}

/// Robots sharing one grid and one planner
#[derive(Debug)]
pub struct Fleet {
    grid: OccupancyGrid,
    planner: PathPlanner,
    params: NavParams,
    robots: BTreeMap<AgentId, RobotAgent>,
    tick: u32,
}

impl Fleet {
    pub fn new(grid: OccupancyGrid, planner: PathPlanner, params: NavParams) -> Self {
        Self {
            grid,
            planner,
            params,
            robots: BTreeMap::new(),
            tick: 0,
        }
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut PathPlanner {
        &mut self.planner
    }

    pub fn robots(&self) -> impl Iterator<Item = &RobotAgent> {
        self.robots.values()
    }

    pub fn robot(&self, id: AgentId) -> Option<&RobotAgent> {
        self.robots.get(&id)
    }

    pub fn ticks(&self) -> u32 {
        self.tick
    }

    /// True when no robot has work left
    pub fn is_idle(&self) -> bool {
        self.robots.values().all(RobotAgent::is_idle)
    }

    /// Place a new robot on its home cell
    pub fn spawn_robot(&mut self, id: AgentId, home: CellCoord) -> NavResult<()> {
        if self.robots.contains_key(&id) {
            return Err(NavError::config(format!("{} already spawned", id)));
        }
        if self.grid.cell_at(home.x, home.y).is_none() {
            return Err(NavError::invalid_endpoint(home.x, home.y));
        }
        if !self.grid.is_traversable(home, Some(id)) {
            return Err(NavError::config(format!("home {} of {} is not free", home, id)));
        }

        let changed = self.grid.move_agent(id, home)?;
        self.planner.notify_changed_cells(&self.grid, &changed);
        self.robots.insert(id, RobotAgent::new(id, home));
        tracing::info!(robot = %id, %home, "robot spawned");
        Ok(())
    }

    /// Send a robot to `shelf`, or queue the trip if it is busy
    pub fn assign_task(&mut self, id: AgentId, shelf: CellCoord) -> NavResult<()> {
        if self.grid.cell_at(shelf.x, shelf.y).is_none() {
            return Err(NavError::invalid_endpoint(shelf.x, shelf.y));
        }
        let robot = self.robot_mut(id)?;
        if robot.phase != RobotPhase::Idle {
            robot.pending.push_back(shelf);
            tracing::debug!(robot = %id, %shelf, queued = robot.pending.len(), "task queued");
            return Ok(());
        }

        robot.phase = RobotPhase::FetchingShelf(shelf);
        tracing::info!(robot = %id, %shelf, "task assigned");
        self.plan_route(id)?;
        Ok(())
    }

    /// Block `coord` and replan robots whose route crossed it
    pub fn add_obstacle(&mut self, coord: CellCoord) -> NavResult<Vec<AgentId>> {
        let changed = self.grid.set_walkable(coord, false)?;
        self.apply_environment_change(&changed)
    }

    /// Free `coord` and retry robots that had no route
    pub fn remove_obstacle(&mut self, coord: CellCoord) -> NavResult<Vec<AgentId>> {
        let changed = self.grid.set_walkable(coord, true)?;
        self.apply_environment_change(&changed)
    }

    /// Advance every busy robot by one cell
    pub fn tick(&mut self) -> NavResult<TickReport> {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        let ids: Vec<AgentId> = self.robots.keys().copied().collect();
        for id in ids {
            self.step_robot(id, &mut report)?;
        }

        tracing::debug!(
            tick = report.tick,
            moves = report.moves,
            replans = report.replans,
            blocked = report.blocked.len(),
            "tick finished"
        );
        Ok(report)
    }

    /// Tick until every robot is idle or `max_ticks` is reached
    pub fn run_until_idle(&mut self) -> NavResult<Vec<TickReport>> {
        let mut reports = Vec::new();
        while !self.is_idle() && reports.len() < self.params.max_ticks as usize {
            reports.push(self.tick()?);
        }
        if !self.is_idle() {
            tracing::warn!(max_ticks = self.params.max_ticks, "simulation stopped with busy robots");
        }
        Ok(reports)
    }

    fn robot_mut(&mut self, id: AgentId) -> NavResult<&mut RobotAgent> {
        self.robots.get_mut(&id).ok_or(NavError::UnknownAgent(id.0))
    }

    fn apply_environment_change(&mut self, changed: &[CellCoord]) -> NavResult<Vec<AgentId>> {
        if changed.is_empty() {
            return Ok(Vec::new());
        }
        self.planner.notify_changed_cells(&self.grid, changed);
        if !self.params.replan_on_block {
            return Ok(Vec::new());
        }

        let affected: Vec<AgentId> = self
            .robots
            .values()
            .filter(|robot| robot.phase != RobotPhase::Idle)
            .filter(|robot| {
                robot.path.is_empty()
                    || robot
                        .remaining_path()
                        .iter()
                        .any(|cell| !self.grid.is_walkable(*cell))
            })
            .map(|robot| robot.id)
            .collect();

        for &id in &affected {
            tracing::info!(robot = %id, "route affected by grid change, replanning");
            self.plan_route(id)?;
        }
        Ok(affected)
    }

    /// Plan from the robot's position to its destination, falling back to
    /// the nearest reachable accessible cell around it
    fn plan_route(&mut self, id: AgentId) -> NavResult<bool> {
        let robot = self.robots.get(&id).ok_or(NavError::UnknownAgent(id.0))?;
        let (position, phase) = (robot.position, robot.phase);
        let Some(destination) = robot.destination() else {
            return Ok(false);
        };

        let mut route = self
            .planner
            .find_path(&self.grid, position, destination, Some(id))?;
        let mut substitute = None;

        if route.is_none() {
            let radius = self.params.fallback_search_radius;
            for candidate in self.grid.accessible_within(destination, radius, Some(id)) {
                if candidate == destination {
                    continue;
                }
                if let Some(path) = self
                    .planner
                    .find_path(&self.grid, position, candidate, Some(id))?
                {
                    tracing::info!(robot = %id, %destination, %candidate, "using substitute target");
                    route = Some(path);
                    substitute = Some(candidate);
                    break;
                }
            }
        }

        let robot = self.robot_mut(id)?;
        robot.path_index = 0;
        match route {
            Some(path) => {
                robot.path = path;
                if let (Some(target), RobotPhase::FetchingShelf(_)) = (substitute, phase) {
                    robot.phase = RobotPhase::FetchingShelf(target);
                }
                Ok(true)
            }
            None => {
                robot.path.clear();
                tracing::warn!(robot = %id, %position, %destination, "no route found");
                Ok(false)
            }
        }
    }

    fn step_robot(&mut self, id: AgentId, report: &mut TickReport) -> NavResult<()> {
        let Some(robot) = self.robots.get(&id) else {
            return Ok(());
        };
        if robot.phase == RobotPhase::Idle {
            return Ok(());
        }

        if robot.path.is_empty() {
            report.replans += 1;
            if !self.plan_route(id)? {
                report.blocked.push(id);
                return Ok(());
            }
        }

        let Some(mut next) = self.robot_mut(id)?.next_cell() else {
            return self.arrive(id, report);
        };

        if !self.grid.is_traversable(next, Some(id)) {
            if !self.params.replan_on_block {
                report.blocked.push(id);
                return Ok(());
            }
            report.replans += 1;
            if !self.plan_route(id)? {
                report.blocked.push(id);
                return Ok(());
            }
            match self.robot_mut(id)?.next_cell() {
                Some(cell) if self.grid.is_traversable(cell, Some(id)) => next = cell,
                Some(_) => {
                    report.blocked.push(id);
                    return Ok(());
                }
                None => return self.arrive(id, report),
            }
        }

        let changed = self.grid.move_agent(id, next)?;
        self.planner.notify_changed_cells(&self.grid, &changed);
        let robot = self.robot_mut(id)?;
        robot.position = next;
        robot.path_index += 1;
        report.moves += 1;

        if robot.next_cell().is_none() {
            self.arrive(id, report)?;
        }
        Ok(())
    }

    fn arrive(&mut self, id: AgentId, report: &mut TickReport) -> NavResult<()> {
        let robot = self.robot_mut(id)?;
        robot.path.clear();
        robot.path_index = 0;

        match robot.phase {
            RobotPhase::FetchingShelf(shelf) => {
                tracing::info!(robot = %id, %shelf, "shelf reached, returning home");
                robot.phase = RobotPhase::Returning;
                self.plan_route(id)?;
            }
            RobotPhase::Returning => {
                robot.trips += 1;
                report.completed_trips.push(id);
                tracing::info!(robot = %id, trips = robot.trips, "trip completed");

                robot.phase = match robot.pending.pop_front() {
                    Some(shelf) => RobotPhase::FetchingShelf(shelf),
                    None => RobotPhase::Idle,
                };
                if robot.phase != RobotPhase::Idle {
                    self.plan_route(id)?;
                }
            }
            RobotPhase::Idle => {}
        }
        Ok(())
    }
}
