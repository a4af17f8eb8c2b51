//! Warehouse occupancy grid
//!
//! Concrete [`GridMap`] owned by the simulation. Cells are binary walkable or
//! blocked and carry at most one occupying agent.
//!
//! # Features
//!
//! - ASCII map loading and rendering
//! - Mutators report the cells that actually changed, ready for replanning
//! - Agent position tracking (one cell per agent)
//! - Nearest accessible cell search for unreachable targets
//! - Line drawing and seeded random obstacle scattering
//!
//! # Example
//!
//! ```rust
//! use warenav_core::{AgentId, CellCoord, GridMap};
//! use warenav_library::algorithms::occupancy_grid::OccupancyGrid;
//!
//! let mut grid = OccupancyGrid::from_ascii(
//!     "
//!     ..#..
//!     .1#..
//!     .....
//!     ",
//! )
//! .unwrap();
//!
//! assert_eq!((grid.width(), grid.height()), (5, 3));
//! assert!(!grid.is_traversable(CellCoord::new(2, 2), None));
//! assert_eq!(grid.occupant_position(AgentId(1)), Some(CellCoord::new(1, 1)));
//!
//! // Freeing the wall cell reports exactly that cell
//! let changed = grid.set_walkable(CellCoord::new(2, 2), true).unwrap();
//! assert_eq!(changed, vec![CellCoord::new(2, 2)]);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use warenav_core::{AgentId, Cell, CellCoord, GridMap, NavError, NavResult};

/// Cell counts used to sanity check a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridStats {
    pub total: usize,
    pub blocked: usize,
    pub occupied: usize,
    pub free: usize,
}

/// 2D occupancy grid. Row `y = 0` is the bottom row.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
    occupants: Vec<Option<AgentId>>,
    agents: HashMap<AgentId, CellCoord>,
}

impl OccupancyGrid {
    /// Create a grid with every cell walkable and empty
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = (width * height) as usize;
        Self {
            width,
            height,
            walkable: vec![true; cells],
            occupants: vec![None; cells],
            agents: HashMap::new(),
        }
    }

    /// Parse an ASCII map.
    ///
    /// `.` is free, `#` is blocked and a digit is a free cell occupied by the
    /// agent with that id. The first non-empty line is the top row. Leading
    /// and trailing whitespace on each line is ignored.
    pub fn from_ascii(text: &str) -> NavResult<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |row| row.chars().count()) as i32;
        if width == 0 {
            return Err(NavError::config("map has no cells"));
        }

        let mut grid = Self::new(width, height);
        for (row_index, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(NavError::config(format!(
                    "map row {} has {} cells, expected {}",
                    row_index + 1,
                    row.chars().count(),
                    width
                )));
            }

            let y = height - 1 - row_index as i32;
            for (x, symbol) in row.chars().enumerate() {
                let coord = CellCoord::new(x as i32, y);
                match symbol {
                    '.' => {}
                    '#' => {
                        grid.set_walkable(coord, false)?;
                    }
                    digit if digit.is_ascii_digit() => {
                        let agent = AgentId(digit.to_digit(10).unwrap_or_default());
                        if let Some(previous) = grid.occupant_position(agent) {
                            return Err(NavError::config(format!(
                                "{} appears twice in map, at {} and {}",
                                agent, previous, coord
                            )));
                        }
                        grid.set_occupant(coord, Some(agent))?;
                    }
                    other => {
                        return Err(NavError::config(format!(
                            "unexpected map symbol '{}' at {}",
                            other, coord
                        )));
                    }
                }
            }
        }

        Ok(grid)
    }

    /// Render the grid, marking `path` cells with `*`.
    ///
    /// Occupants are drawn as their id's last digit.
    pub fn to_ascii(&self, path: Option<&[CellCoord]>) -> String {
        let on_path: std::collections::HashSet<CellCoord> =
            path.unwrap_or_default().iter().copied().collect();

        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let coord = CellCoord::new(x, y);
                let slot = self.slot(coord);
                let symbol = if !self.walkable[slot] {
                    '#'
                } else if let Some(agent) = self.occupants[slot] {
                    char::from_digit(agent.0 % 10, 10).unwrap_or('@')
                } else if on_path.contains(&coord) {
                    '*'
                } else {
                    '.'
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }

    /// Change walkability. Returns the cell if its walkability flipped.
    pub fn set_walkable(&mut self, coord: CellCoord, walkable: bool) -> NavResult<Vec<CellCoord>> {
        let slot = self.checked_slot(coord)?;
        if self.walkable[slot] == walkable {
            return Ok(Vec::new());
        }
        self.walkable[slot] = walkable;
        Ok(vec![coord])
    }

    /// Place `occupant` on `coord`, or clear it with `None`.
    ///
    /// An agent occupies at most one cell: placing it releases the cell it
    /// held before, and any other agent on `coord` is evicted.
    pub fn set_occupant(
        &mut self,
        coord: CellCoord,
        occupant: Option<AgentId>,
    ) -> NavResult<Vec<CellCoord>> {
        let slot = self.checked_slot(coord)?;
        if self.occupants[slot] == occupant {
            return Ok(Vec::new());
        }

        let mut changed = Vec::with_capacity(2);
        if let Some(agent) = occupant {
            if let Some(previous) = self.agents.insert(agent, coord) {
                let previous_slot = self.slot(previous);
                self.occupants[previous_slot] = None;
                changed.push(previous);
            }
        }
        if let Some(evicted) = self.occupants[slot] {
            self.agents.remove(&evicted);
        }

        self.occupants[slot] = occupant;
        changed.push(coord);
        Ok(changed)
    }

    /// Move `agent` to `to`, releasing its previous cell
    pub fn move_agent(&mut self, agent: AgentId, to: CellCoord) -> NavResult<Vec<CellCoord>> {
        self.set_occupant(to, Some(agent))
    }

    /// Remove `agent` from the grid
    pub fn remove_agent(&mut self, agent: AgentId) -> Vec<CellCoord> {
        match self.agents.remove(&agent) {
            Some(coord) => {
                let slot = self.slot(coord);
                self.occupants[slot] = None;
                vec![coord]
            }
            None => Vec::new(),
        }
    }

    /// Release every occupied cell
    pub fn clear_occupants(&mut self) -> Vec<CellCoord> {
        let mut released: Vec<CellCoord> = self.agents.drain().map(|(_, coord)| coord).collect();
        released.sort();
        self.occupants.fill(None);
        released
    }

    pub fn occupant_position(&self, agent: AgentId) -> Option<CellCoord> {
        self.agents.get(&agent).copied()
    }

    pub fn occupant_at(&self, coord: CellCoord) -> Option<AgentId> {
        self.checked_slot(coord)
            .ok()
            .and_then(|slot| self.occupants[slot])
    }

    pub fn is_walkable(&self, coord: CellCoord) -> bool {
        self.checked_slot(coord)
            .map(|slot| self.walkable[slot])
            .unwrap_or(false)
    }

    /// Closest cell within a square of `radius` around `center` that
    /// `requester` may enter
    pub fn nearest_accessible(
        &self,
        center: CellCoord,
        radius: u32,
        requester: Option<AgentId>,
    ) -> Option<CellCoord> {
        self.accessible_within(center, radius, requester)
            .into_iter()
            .next()
    }

    /// All cells within a square of `radius` around `center` that `requester`
    /// may enter, closest first (Manhattan distance, then scan order)
    pub fn accessible_within(
        &self,
        center: CellCoord,
        radius: u32,
        requester: Option<AgentId>,
    ) -> Vec<CellCoord> {
        let r = radius.min(i32::MAX as u32) as i32;
        let mut cells = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let coord = CellCoord::new(center.x.saturating_add(dx), center.y.saturating_add(dy));
                if self.is_traversable(coord, requester) {
                    cells.push(coord);
                }
            }
        }
        // Stable sort keeps scan order among equal distances
        cells.sort_by_key(|coord| coord.manhattan(&center));
        cells
    }

    /// Set walkability along a straight line (Bresenham), endpoints included.
    /// Cells outside the grid are skipped.
    pub fn set_line_walkable(
        &mut self,
        from: CellCoord,
        to: CellCoord,
        walkable: bool,
    ) -> Vec<CellCoord> {
        let mut changed = Vec::new();
        for coord in bresenham_line(from, to) {
            if let Ok(mut cells) = self.set_walkable(coord, walkable) {
                changed.append(&mut cells);
            }
        }
        changed
    }

    /// Block roughly `density` of the free cells at random, never touching
    /// `keep` or occupied cells. Deterministic for a given `seed`.
    pub fn scatter_obstacles(&mut self, density: f64, seed: u64, keep: &[CellCoord]) -> Vec<CellCoord> {
        let density = density.clamp(0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut changed = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let coord = CellCoord::new(x, y);
                let slot = self.slot(coord);
                if !rng.gen_bool(density)
                    || keep.contains(&coord)
                    || self.occupants[slot].is_some()
                    || !self.walkable[slot]
                {
                    continue;
                }
                self.walkable[slot] = false;
                changed.push(coord);
            }
        }

        tracing::debug!(blocked = changed.len(), seed, "scattered obstacles");
        changed
    }

    /// Count blocked, occupied and free cells
    pub fn stats(&self) -> GridStats {
        let blocked = self.walkable.iter().filter(|walkable| !**walkable).count();
        let occupied = self.occupants.iter().filter(|o| o.is_some()).count();
        let free = self
            .walkable
            .iter()
            .zip(&self.occupants)
            .filter(|(walkable, occupant)| **walkable && occupant.is_none())
            .count();

        GridStats {
            total: self.walkable.len(),
            blocked,
            occupied,
            free,
        }
    }

    fn slot(&self, coord: CellCoord) -> usize {
        (coord.y * self.width + coord.x) as usize
    }

    fn checked_slot(&self, coord: CellCoord) -> NavResult<usize> {
        if self.in_bounds(coord.x, coord.y) {
            Ok(self.slot(coord))
        } else {
            Err(NavError::invalid_endpoint(coord.x, coord.y))
        }
    }
}

impl GridMap for OccupancyGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn cell_at(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let coord = CellCoord::new(x, y);
        let slot = self.slot(coord);
        Some(Cell {
            coord,
            walkable: self.walkable[slot],
            occupant: self.occupants[slot],
        })
    }
}

/// Bresenham's line algorithm
fn bresenham_line(from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    let mut cells = Vec::new();

    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx - dy;

    let mut x = from.x;
    let mut y = from.y;

    loop {
        cells.push(CellCoord::new(x, y));

        if x == to.x && y == to.y {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x += sx;
        }

        if e2 < dx {
            err += dx;
            y += sy;
        }
    }

    cells
}
