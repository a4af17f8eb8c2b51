//! Grid abstraction shared by every planner
//!
//! Cells are identified by their integer coordinates only. A cell carries its
//! walkability and at most one occupying agent; all planner bookkeeping lives
//! in the planners' own state maps keyed by [`CellCoord`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer grid coordinate. Equality and hashing are coordinate based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Number of orthogonal steps between two cells
    pub fn manhattan(&self, other: &CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// True when the two cells share an edge
    pub fn is_adjacent(&self, other: &CellCoord) -> bool {
        self.manhattan(other) == 1
    }
}

impl From<(i32, i32)> for CellCoord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identity of a robot (or any other agent) that can occupy a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// Snapshot of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub coord: CellCoord,
    pub walkable: bool,
    pub occupant: Option<AgentId>,
}

impl Cell {
    /// Walkable, unoccupied cell
    pub fn free(coord: CellCoord) -> Self {
        Self {
            coord,
            walkable: true,
            occupant: None,
        }
    }

    /// Whether `requester` may enter this cell.
    ///
    /// An occupant equal to the requester does not block it.
    pub fn is_accessible_for(&self, requester: Option<AgentId>) -> bool {
        self.walkable
            && match self.occupant {
                None => true,
                Some(occupant) => Some(occupant) == requester,
            }
    }
}

/// Read boundary between the planners and whatever owns the grid.
///
/// Implementors only provide bounds and [`GridMap::cell_at`]; adjacency and
/// traversability derive from them.
pub trait GridMap {
    /// Grid width in cells
    fn width(&self) -> i32;

    /// Grid height in cells
    fn height(&self) -> i32;

    /// Bounds-checked cell lookup
    fn cell_at(&self, x: i32, y: i32) -> Option<Cell>;

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() && y < self.height()
    }

    /// Up to four orthogonal neighbors in N, E, S, W order
    fn neighbors(&self, coord: CellCoord) -> Vec<CellCoord> {
        const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

        DIRECTIONS
            .iter()
            .map(|(dx, dy)| CellCoord::new(coord.x + dx, coord.y + dy))
            .filter(|c| self.in_bounds(c.x, c.y))
            .collect()
    }

    /// `walkable && (occupant is none || occupant == requester)`.
    /// Out-of-bounds coordinates are never traversable.
    fn is_traversable(&self, coord: CellCoord, requester: Option<AgentId>) -> bool {
        self.cell_at(coord.x, coord.y)
            .map(|cell| cell.is_accessible_for(requester))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Floor {
        blocked: HashSet<CellCoord>,
        parked: Option<(CellCoord, AgentId)>,
    }

    impl GridMap for Floor {
        fn width(&self) -> i32 {
            3
        }

        fn height(&self) -> i32 {
            3
        }

        fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
            if !self.in_bounds(x, y) {
                return None;
            }
            let coord = CellCoord::new(x, y);
            Some(Cell {
                coord,
                walkable: !self.blocked.contains(&coord),
                occupant: self.parked.filter(|(c, _)| *c == coord).map(|(_, a)| a),
            })
        }
    }

    fn floor() -> Floor {
        Floor {
            blocked: [CellCoord::new(1, 1)].into_iter().collect(),
            parked: Some((CellCoord::new(2, 2), AgentId(7))),
        }
    }

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = floor();

        assert_eq!(
            grid.neighbors(CellCoord::new(1, 1)),
            vec![
                CellCoord::new(1, 2),
                CellCoord::new(2, 1),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
            ]
        );
        assert_eq!(
            grid.neighbors(CellCoord::new(0, 0)),
            vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]
        );
    }

    #[test]
    fn test_cell_lookup_is_bounds_checked() {
        let grid = floor();
        assert!(grid.cell_at(-1, 0).is_none());
        assert!(grid.cell_at(3, 0).is_none());
        assert!(grid.cell_at(2, 2).is_some());
    }

    #[test]
    fn test_traversability() {
        let grid = floor();

        // Obstacle blocks everybody
        assert!(!grid.is_traversable(CellCoord::new(1, 1), None));
        assert!(!grid.is_traversable(CellCoord::new(1, 1), Some(AgentId(7))));

        // Occupied cell is passable only for its occupant
        assert!(grid.is_traversable(CellCoord::new(2, 2), Some(AgentId(7))));
        assert!(!grid.is_traversable(CellCoord::new(2, 2), Some(AgentId(3))));
        assert!(!grid.is_traversable(CellCoord::new(2, 2), None));

        // Outside the grid
        assert!(!grid.is_traversable(CellCoord::new(5, 5), None));
    }

    #[test]
    fn test_coord_helpers() {
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(4, 4);
        assert_eq!(a.manhattan(&b), 8);
        assert!(a.is_adjacent(&CellCoord::new(0, 1)));
        assert!(!a.is_adjacent(&CellCoord::new(1, 1)));
        assert_eq!(CellCoord::from((2, 3)), CellCoord::new(2, 3));
        assert_eq!(a.to_string(), "(0, 0)");
    }
}
