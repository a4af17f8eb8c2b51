#[cfg(test)]
mod tests {
    use super::super::{DStarLiteKey, DStarLitePlanner};
    use crate::algorithms::astar::AStarPlanner;
    use crate::algorithms::occupancy_grid::OccupancyGrid;
    use warenav_core::pathfinding::is_contiguous;
    use warenav_core::{AgentId, CellCoord, NavError, Pathfinder, INFINITE_COST};

    fn c(x: i32, y: i32) -> CellCoord {
        CellCoord::new(x, y)
    }

    fn planner(grid: &OccupancyGrid) -> DStarLitePlanner {
        let mut dstar_lite = DStarLitePlanner::new();
        dstar_lite.initialize(grid);
        dstar_lite
    }

    fn astar_len(grid: &OccupancyGrid, start: CellCoord, goal: CellCoord) -> Option<usize> {
        let mut astar = AStarPlanner::new();
        astar.initialize(grid);
        astar.find_path(grid, start, goal, None).unwrap().map(|p| p.len())
    }

    #[test]
    fn test_key_order_is_lexicographic() {
        let low = DStarLiteKey { k1: 10, k2: 50 };
        let high = DStarLiteKey { k1: 20, k2: 0 };
        assert!(low < high);
        assert!(DStarLiteKey { k1: 10, k2: 5 } < low);
    }

    #[test]
    fn test_open_grid_is_manhattan_optimal() {
        let grid = OccupancyGrid::new(5, 5);
        let mut planner = planner(&grid);

        let path = planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();
        assert_eq!(path.len(), 9);
        assert_eq!(path[0], c(0, 0));
        assert_eq!(path[8], c(4, 4));
        assert!(is_contiguous(&path));

        let start = planner.state(c(0, 0)).unwrap();
        assert!(start.is_consistent());
        assert_eq!(start.g, 80);
    }

    #[test]
    fn test_obstacle_before_first_query() {
        let mut grid = OccupancyGrid::new(5, 5);
        grid.set_walkable(c(2, 2), false).unwrap();
        let mut planner = planner(&grid);

        let path = planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();
        assert!(!path.contains(&c(2, 2)));
        assert!(path.len() >= 9);
    }

    #[test]
    fn test_start_equals_goal_and_bad_endpoints() {
        let grid = OccupancyGrid::new(5, 5);
        let mut planner = planner(&grid);

        assert_eq!(planner.find_path(&grid, c(2, 2), c(2, 2), None).unwrap(), Some(vec![c(2, 2)]));
        assert!(matches!(
            planner.find_path(&grid, c(-1, 2), c(2, 2), None),
            Err(NavError::InvalidEndpoint { x: -1, y: 2 })
        ));
    }

    #[test]
    fn test_column_separates_start_and_goal() {
        let mut grid = OccupancyGrid::new(5, 5);
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 0), c(4, 4));
        planner.find_path(&grid, start, goal, None).unwrap().unwrap();

        let mut column = Vec::new();
        for y in 0..5 {
            column.extend(grid.set_walkable(c(2, y), false).unwrap());
        }
        assert_eq!(column.len(), 5);
        planner.handle_changed_cells(&grid, &column);

        assert_eq!(planner.state(start).unwrap().rhs, INFINITE_COST);
        assert!(planner.find_path(&grid, start, goal, None).unwrap().is_none());
    }

    #[test]
    fn test_obstacle_on_path_is_repaired() {
        let mut grid = OccupancyGrid::new(6, 6);
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 0), c(5, 5));

        let original = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        let victim = original[5];

        let changed = grid.set_walkable(victim, false).unwrap();
        planner.handle_changed_cells(&grid, &changed);

        let replanned = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        assert!(!replanned.contains(&victim));
        assert!(replanned.len() >= original.len());
        assert!(is_contiguous(&replanned));
        assert_eq!(Some(replanned.len()), astar_len(&grid, start, goal));
    }

    #[test]
    fn test_unreported_change_is_reconciled() {
        let mut grid = OccupancyGrid::new(6, 6);
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 0), c(5, 5));

        let original = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        let victim = original[2];

        grid.set_walkable(victim, false).unwrap();
        let replanned = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        assert!(!replanned.contains(&victim));
        assert_eq!(Some(replanned.len()), astar_len(&grid, start, goal));
    }

    #[test]
    fn test_empty_change_set_is_idempotent() {
        let mut grid = OccupancyGrid::new(7, 7);
        grid.set_line_walkable(c(3, 0), c(3, 5), false);
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 0), c(6, 0));

        let before_path = planner.find_path(&grid, start, goal, None).unwrap();
        let before_states = planner.states.clone();
        let before_open = planner.open.len();

        planner.handle_changed_cells(&grid, &[]);

        assert_eq!(planner.states, before_states);
        assert_eq!(planner.open.len(), before_open);
        assert_eq!(planner.km(), 0);
        assert_eq!(planner.find_path(&grid, start, goal, None).unwrap(), before_path);
    }

    #[test]
    fn test_rebase_moves_start_and_grows_km() {
        let mut grid = OccupancyGrid::new(5, 5);
        let mut planner = planner(&grid);
        let goal = c(4, 4);
        planner.find_path(&grid, c(0, 0), goal, None).unwrap().unwrap();

        // The robot has advanced one cell along its previous path
        planner.last_path = Some(vec![c(1, 0), c(2, 0)]);
        let changed = grid.set_walkable(c(3, 3), false).unwrap();
        planner.handle_changed_cells(&grid, &changed);

        assert_eq!(planner.km(), 10);
        assert_eq!(planner.start, Some(c(1, 0)));

        let path = planner.find_path(&grid, c(1, 0), goal, None).unwrap().unwrap();
        assert_eq!(planner.km(), 10);
        assert!(!path.contains(&c(3, 3)));
        assert_eq!(path.len(), 8);
        assert!(is_contiguous(&path));
    }

    #[test]
    fn test_replan_without_previous_path_skips_rebase() {
        let mut grid = OccupancyGrid::new(5, 5);
        grid.set_line_walkable(c(2, 0), c(2, 4), false);
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 0), c(4, 4));

        assert!(planner.find_path(&grid, start, goal, None).unwrap().is_none());

        let gap = grid.set_walkable(c(2, 0), true).unwrap();
        planner.handle_changed_cells(&grid, &gap);
        assert_eq!(planner.km(), 0);
        assert_eq!(planner.state(start).unwrap().rhs, 80);

        let path = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        assert!(path.contains(&c(2, 0)));
        assert_eq!(path.len(), 9);
    }

    #[test]
    fn test_changes_before_any_query_are_ignored() {
        let mut grid = OccupancyGrid::new(3, 3);
        let mut planner = planner(&grid);

        let changed = grid.set_walkable(c(1, 1), false).unwrap();
        planner.handle_changed_cells(&grid, &changed);
        assert!(planner.states.is_empty());
        assert!(planner.open.is_empty());
    }

    #[test]
    fn test_extraction_stops_on_synthetic_cycle() {
        let grid = OccupancyGrid::new(5, 5);
        let mut planner = planner(&grid);
        planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();

        // Make (0, 0) and (1, 0) each look like the cheapest way on for the other
        planner.states.get_mut(&c(0, 0)).unwrap().g = 0;
        planner.states.get_mut(&c(1, 0)).unwrap().g = 0;

        assert!(planner.extract_path(&grid).is_none());
    }

    #[test]
    fn test_occupant_self_permeability() {
        let grid = OccupancyGrid::from_ascii(
            "
            ..#..
            ..3..
            ..#..
            ",
        )
        .unwrap();
        let mut planner = planner(&grid);
        let (start, goal) = (c(0, 1), c(4, 1));

        let own = planner.find_path(&grid, start, goal, Some(AgentId(3))).unwrap().unwrap();
        assert!(own.contains(&c(2, 1)));
        assert!(planner.find_path(&grid, start, goal, Some(AgentId(1))).unwrap().is_none());
        assert!(planner.find_path(&grid, start, goal, None).unwrap().is_none());
    }

    #[test]
    fn test_new_start_reinitializes() {
        let grid = OccupancyGrid::new(6, 6);
        let mut planner = planner(&grid);
        let goal = c(5, 5);

        let first = planner.find_path(&grid, c(0, 0), goal, None).unwrap().unwrap();
        let second = planner.find_path(&grid, c(3, 1), goal, None).unwrap().unwrap();
        assert_eq!(first.len(), 11);
        assert_eq!(second.len(), 7);
        assert_eq!(planner.km(), 0);

        for _ in 0..3 {
            assert_eq!(planner.find_path(&grid, c(3, 1), goal, None).unwrap(), Some(second.clone()));
        }
        assert_eq!(planner.algorithm_name(), "D* Lite Pathfinding");
    }
}
