use crate::algorithms::astar::AStarPlanner;
use crate::algorithms::dstar::DStarPlanner;
use crate::algorithms::dstar_lite::DStarLitePlanner;
use std::collections::BTreeMap;
use warenav_core::{
    AgentId, CellCoord, GridMap, NavError, NavParams, NavResult, Path, Pathfinder,
    PlanningAlgorithm,
};

type BoxedPlanner = Box<dyn Pathfinder + Send>;

/// Path Planner - one entry point over the A*, D* and D* Lite planners
///
/// Every configured planner is initialized against the same grid and receives
/// every change notification, so an idle planner is already consistent when
/// it is switched in. Queries go to the active planner only.
pub struct PathPlanner {
    planners: BTreeMap<PlanningAlgorithm, BoxedPlanner>,
    current: PlanningAlgorithm,
}

impl std::fmt::Debug for PathPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathPlanner")
            .field("configured", &self.configured())
            .field("current", &self.current)
            .finish()
    }
}

fn build_planner(kind: PlanningAlgorithm) -> BoxedPlanner {
    match kind {
        PlanningAlgorithm::AStar => Box::new(AStarPlanner::new()),
        PlanningAlgorithm::DStar => Box::new(DStarPlanner::new()),
        PlanningAlgorithm::DStarLite => Box::new(DStarLitePlanner::new()),
    }
}

impl PathPlanner {
    /// All three planners, A* active
    pub fn new(grid: &dyn GridMap) -> Self {
        let mut planners = BTreeMap::new();
        for kind in PlanningAlgorithm::ALL {
            let mut planner = build_planner(kind);
            planner.initialize(grid);
            planners.insert(kind, planner);
        }
        Self {
            planners,
            current: PlanningAlgorithm::AStar,
        }
    }

    /// All three planners, starting with `params.algorithm`
    pub fn from_params(grid: &dyn GridMap, params: &NavParams) -> Self {
        let mut planner = Self::new(grid);
        planner.current = params.algorithm;
        planner
    }

    /// Only the listed planners; the first one is active
    pub fn with_algorithms(grid: &dyn GridMap, kinds: &[PlanningAlgorithm]) -> NavResult<Self> {
        let current = *kinds
            .first()
            .ok_or_else(|| NavError::config("at least one planning algorithm is required"))?;

        let mut planners = BTreeMap::new();
        for &kind in kinds {
            let mut planner = build_planner(kind);
            planner.initialize(grid);
            planners.insert(kind, planner);
        }
        Ok(Self { planners, current })
    }

    /// Switch the active planner. Unconfigured kinds leave the current one in place.
    pub fn set_algorithm(&mut self, kind: PlanningAlgorithm) -> NavResult<()> {
        if !self.planners.contains_key(&kind) {
            tracing::warn!(requested = %kind, current = %self.current, "planner not configured");
            return Err(NavError::PlannerNotConfigured(kind.to_string()));
        }
        if kind != self.current {
            tracing::info!(from = %self.current, to = %kind, "switching planner");
        }
        self.current = kind;
        Ok(())
    }

    pub fn current_algorithm(&self) -> PlanningAlgorithm {
        self.current
    }

    /// Display name of the active planner
    pub fn algorithm_name(&self) -> &'static str {
        self.planners
            .get(&self.current)
            .map_or("unconfigured", |planner| planner.algorithm_name())
    }

    pub fn configured(&self) -> Vec<PlanningAlgorithm> {
        self.planners.keys().copied().collect()
    }

    /// Query the active planner
    pub fn find_path(
        &mut self,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) -> NavResult<Option<Path>> {
        self.find_path_with(self.current, grid, start, goal, requester)
    }

    /// Query a specific configured planner without switching to it
    pub fn find_path_with(
        &mut self,
        kind: PlanningAlgorithm,
        grid: &dyn GridMap,
        start: CellCoord,
        goal: CellCoord,
        requester: Option<AgentId>,
    ) -> NavResult<Option<Path>> {
        let planner = self
            .planners
            .get_mut(&kind)
            .ok_or_else(|| NavError::PlannerNotConfigured(kind.to_string()))?;
        planner.find_path(grid, start, goal, requester)
    }

    /// Query by raw coordinates, resolving both against the grid first
    pub fn find_path_xy(
        &mut self,
        grid: &dyn GridMap,
        start: (i32, i32),
        goal: (i32, i32),
        requester: Option<AgentId>,
    ) -> NavResult<Option<Path>> {
        let resolve = |(x, y): (i32, i32)| {
            grid.cell_at(x, y)
                .map(|cell| cell.coord)
                .ok_or(NavError::InvalidEndpoint { x, y })
        };
        let start = resolve(start)?;
        let goal = resolve(goal)?;
        self.find_path(grid, start, goal, requester)
    }

    /// Broadcast changed cells to every configured planner
    pub fn notify_changed_cells(&mut self, grid: &dyn GridMap, cells: &[CellCoord]) {
        if cells.is_empty() {
            return;
        }
        tracing::debug!(cells = cells.len(), planners = self.planners.len(), "broadcasting grid change");
        for planner in self.planners.values_mut() {
            planner.handle_changed_cells(grid, cells);
        }
    }

    /// Re-bind every planner to `grid`, dropping all search state
    pub fn reinitialize(&mut self, grid: &dyn GridMap) {
        for planner in self.planners.values_mut() {
            planner.initialize(grid);
        }
    }
}
