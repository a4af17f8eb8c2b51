//! Terminal rendering and argument parsing helpers

use colored::*;
use warenav_core::{CellCoord, PlanningAlgorithm};
use warenav_library::OccupancyGrid;

/// Parse `x,y` into a cell coordinate
pub fn parse_cell(text: &str) -> Result<CellCoord, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{}'", text))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad x in '{}': {}", text, e))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("bad y in '{}': {}", text, e))?;
    Ok(CellCoord::new(x, y))
}

pub fn parse_algorithm(text: &str) -> Result<PlanningAlgorithm, String> {
    text.parse::<PlanningAlgorithm>().map_err(|_| {
        format!(
            "unknown algorithm '{}' (expected one of: {})",
            text,
            PlanningAlgorithm::ALL.map(|kind| kind.as_str()).join(", ")
        )
    })
}

/// Grid with an optional path overlay, one colored line per row
pub fn render_grid(grid: &OccupancyGrid, path: Option<&[CellCoord]>) -> String {
    let mut out = String::new();
    for line in grid.to_ascii(path).lines() {
        out.push_str("  ");
        for symbol in line.chars() {
            let text = symbol.to_string();
            let painted = match symbol {
                '#' => text.white().on_black(),
                '*' => text.green().bold(),
                '.' => text.dimmed(),
                _ => text.cyan().bold(),
            };
            out.push_str(&painted.to_string());
        }
        out.push('\n');
    }
    out
}

/// `(0, 0) -> (1, 0) -> ...`, shortened in the middle for long paths
pub fn format_path(path: &[CellCoord]) -> String {
    const SHOWN: usize = 6;
    let cells: Vec<String> = path.iter().map(ToString::to_string).collect();
    if cells.len() <= SHOWN * 2 {
        return cells.join(" -> ");
    }
    format!(
        "{} -> ... ({} cells) ... -> {}",
        cells[..SHOWN].join(" -> "),
        cells.len() - SHOWN * 2,
        cells[cells.len() - SHOWN..].join(" -> ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("3,4"), Ok(CellCoord::new(3, 4)));
        assert_eq!(parse_cell(" 0 , -2 "), Ok(CellCoord::new(0, -2)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("a,1").is_err());
        assert!(parse_cell("1,").is_err());
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!(parse_algorithm("dstar-lite"), Ok(PlanningAlgorithm::DStarLite));
        assert_eq!(parse_algorithm("astar"), Ok(PlanningAlgorithm::AStar));
        let err = parse_algorithm("dijkstra").unwrap_err();
        assert!(err.contains("a-star, d-star, d-star-lite"));
    }

    #[test]
    fn test_render_keeps_layout() {
        let grid = OccupancyGrid::from_ascii("..#\n1..").unwrap();
        let path = [CellCoord::new(1, 0), CellCoord::new(1, 1)];
        let rendered = render_grid(&grid, Some(&path));
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.lines().all(|line| line.starts_with("  ")));
    }

    #[test]
    fn test_format_path_shortens_long_paths() {
        let short: Vec<CellCoord> = (0..3).map(|x| CellCoord::new(x, 0)).collect();
        assert_eq!(format_path(&short), "(0, 0) -> (1, 0) -> (2, 0)");

        let long: Vec<CellCoord> = (0..20).map(|x| CellCoord::new(x, 0)).collect();
        let text = format_path(&long);
        assert!(text.starts_with("(0, 0) -> "));
        assert!(text.contains("(8 cells)"));
        assert!(text.ends_with("(19, 0)"));
    }
}
