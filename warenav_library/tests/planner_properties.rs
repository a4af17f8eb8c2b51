//! Properties every planner has to satisfy, checked across A*, D* and D* Lite

use warenav_core::pathfinding::{is_contiguous, path_cost};
use warenav_core::{AgentId, CellCoord, GridMap, PlanningAlgorithm, MAX_PATH_CELLS};
use warenav_library::{OccupancyGrid, PathPlanner};

fn c(x: i32, y: i32) -> CellCoord {
    CellCoord::new(x, y)
}

fn planner_for(grid: &OccupancyGrid, kind: PlanningAlgorithm) -> PathPlanner {
    PathPlanner::with_algorithms(grid, &[kind]).unwrap()
}

/// Seeded warehouse-like floors with scattered obstacles
fn cluttered_grids() -> Vec<OccupancyGrid> {
    (0..6u64)
        .map(|seed| {
            let mut grid = OccupancyGrid::new(16, 12);
            grid.scatter_obstacles(0.25, seed, &[c(0, 0), c(15, 11)]);
            grid
        })
        .collect()
}

#[test]
fn open_grid_scenario_gives_nine_cells() {
    let grid = OccupancyGrid::new(5, 5);
    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);
        let path = planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();
        assert_eq!(path.len(), 9, "{}", kind);
        assert_eq!(path_cost(&path), 80);
    }
}

#[test]
fn blocked_center_scenario_avoids_the_cell() {
    let mut grid = OccupancyGrid::new(5, 5);
    grid.set_walkable(c(2, 2), false).unwrap();

    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);
        let path = planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();
        assert!(!path.contains(&c(2, 2)), "{}", kind);
        assert!(path.len() >= 9, "{}", kind);
    }
}

#[test]
fn dstar_lite_column_scenario_is_unreachable() {
    let mut grid = OccupancyGrid::new(5, 5);
    let mut planner = planner_for(&grid, PlanningAlgorithm::DStarLite);
    planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap().unwrap();

    let column = grid.set_line_walkable(c(2, 0), c(2, 4), false);
    planner.notify_changed_cells(&grid, &column);

    assert_eq!(planner.find_path(&grid, c(0, 0), c(4, 4), None).unwrap(), None);
}

#[test]
fn open_grids_are_manhattan_optimal() {
    let grid = OccupancyGrid::new(9, 7);
    let pairs = [
        (c(0, 0), c(8, 6)),
        (c(8, 0), c(0, 6)),
        (c(4, 3), c(4, 3)),
        (c(1, 5), c(7, 2)),
        (c(3, 0), c(3, 6)),
    ];

    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);
        for (start, goal) in pairs {
            let path = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
            assert_eq!(path.len() as u32, start.manhattan(&goal) + 1, "{} {} -> {}", kind, start, goal);
            assert!(is_contiguous(&path));
        }
    }
}

#[test]
fn planners_agree_and_never_cross_obstacles() {
    for grid in cluttered_grids() {
        let mut lengths = Vec::new();
        for kind in PlanningAlgorithm::ALL {
            let mut planner = planner_for(&grid, kind);
            let path = planner.find_path(&grid, c(0, 0), c(15, 11), None).unwrap();
            if let Some(path) = &path {
                assert!(path.iter().all(|cell| grid.is_traversable(*cell, None)), "{}", kind);
                assert!(is_contiguous(path));
                assert!(path.len() <= MAX_PATH_CELLS);
            }
            lengths.push(path.map(|p| p.len()));
        }
        assert!(lengths.windows(2).all(|w| w[0] == w[1]), "{:?}", lengths);
    }
}

#[test]
fn repeated_queries_are_deterministic() {
    for grid in cluttered_grids().into_iter().take(3) {
        for kind in PlanningAlgorithm::ALL {
            let mut planner = planner_for(&grid, kind);
            let first = planner.find_path(&grid, c(0, 0), c(15, 11), None).unwrap();
            for _ in 0..3 {
                let again = planner.find_path(&grid, c(0, 0), c(15, 11), None).unwrap();
                assert_eq!(again.map(|p| p.len()), first.as_ref().map(|p| p.len()));
            }
        }
    }
}

#[test]
fn occupant_may_cross_its_own_cell_only() {
    let grid = OccupancyGrid::from_ascii(
        "
        ###.###
        ...7...
        ###.###
        ",
    )
    .unwrap();

    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);

        let own = planner
            .find_path(&grid, c(0, 1), c(6, 1), Some(AgentId(7)))
            .unwrap()
            .unwrap();
        assert!(own.contains(&c(3, 1)), "{}", kind);

        let other = planner.find_path(&grid, c(0, 1), c(6, 1), Some(AgentId(4))).unwrap();
        assert!(other.is_none(), "{}", kind);
    }
}

#[test]
fn new_obstacle_on_path_is_avoided_and_never_shortens() {
    for kind in [PlanningAlgorithm::DStar, PlanningAlgorithm::DStarLite] {
        let mut grid = OccupancyGrid::new(10, 8);
        grid.set_line_walkable(c(5, 0), c(5, 5), false);
        let mut planner = planner_for(&grid, kind);
        let (start, goal) = (c(0, 0), c(9, 0));

        let mut previous = planner.find_path(&grid, start, goal, None).unwrap().unwrap();
        for step in 0..4 {
            let victim = previous[previous.len() / 2];
            let changed = grid.set_walkable(victim, false).unwrap();
            planner.notify_changed_cells(&grid, &changed);

            let mut reference = PathPlanner::with_algorithms(&grid, &[PlanningAlgorithm::AStar]).unwrap();
            let expected = reference.find_path(&grid, start, goal, None).unwrap();
            let replanned = planner.find_path(&grid, start, goal, None).unwrap();

            assert_eq!(
                replanned.as_ref().map(|p| p.len()),
                expected.as_ref().map(|p| p.len()),
                "{} step {}",
                kind,
                step
            );
            match replanned {
                Some(path) => {
                    assert!(!path.contains(&victim));
                    assert!(path.len() >= previous.len());
                    previous = path;
                }
                None => break,
            }
        }
    }
}

#[test]
fn empty_change_set_leaves_paths_alone() {
    let mut grid = OccupancyGrid::new(8, 8);
    grid.set_line_walkable(c(4, 0), c(4, 6), false);

    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);
        let before = planner.find_path(&grid, c(0, 0), c(7, 0), None).unwrap();
        planner.notify_changed_cells(&grid, &[]);
        let after = planner.find_path(&grid, c(0, 0), c(7, 0), None).unwrap();
        assert_eq!(before, after, "{}", kind);
    }
}

#[test]
fn start_held_by_another_agent_is_unreachable_for_every_planner() {
    let grid = OccupancyGrid::from_ascii(
        "
        .....
        2....
        ",
    )
    .unwrap();

    for kind in PlanningAlgorithm::ALL {
        let mut planner = planner_for(&grid, kind);
        let (start, goal) = (c(0, 0), c(4, 1));

        assert_eq!(planner.find_path(&grid, start, goal, Some(AgentId(5))).unwrap(), None, "{}", kind);
        assert_eq!(planner.find_path(&grid, start, goal, None).unwrap(), None, "{}", kind);

        let own = planner.find_path(&grid, start, goal, Some(AgentId(2))).unwrap().unwrap();
        assert_eq!(own.len(), 6, "{}", kind);
    }
}
