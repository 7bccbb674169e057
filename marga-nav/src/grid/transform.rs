//! World ↔ grid coordinate transform

use serde::{Deserialize, Serialize};
use std::fmt;

/// Grid cell index
///
/// Columns grow east, rows grow south, so row 0 is the far (north) edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub column: i32,
    pub row: i32,
}

impl GridCell {
    #[inline]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Neighbour one step away along `(dx, dy)`
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.column + dx, self.row + dy)
    }

    /// 8-connected neighbours with their unit steps (cardinals first)
    pub fn neighbors_8(self) -> [(GridCell, (i32, i32)); 8] {
        const STEPS: [(i32, i32); 8] = [
            (0, -1),
            (1, 0),
            (0, 1),
            (-1, 0),
            (1, -1),
            (1, 1),
            (-1, 1),
            (-1, -1),
        ];
        STEPS.map(|(dx, dy)| (self.offset(dx, dy), (dx, dy)))
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Maps field positions to grid cells
///
/// `column = x / cell_size + origin_column`, `row = origin_row - y / cell_size`,
/// truncated toward zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    pub cell_size: f32,
    pub origin_column: i32,
    pub origin_row: i32,
    pub width: usize,
    pub height: usize,
}

impl Default for GridTransform {
    fn default() -> Self {
        Self {
            cell_size: 10.0,
            origin_column: 9,
            origin_row: 26,
            width: 19,
            height: 27,
        }
    }
}

impl GridTransform {
    /// Cell containing `(x, y)`, or `None` outside the grid
    pub fn to_cell(&self, x: f32, y: f32) -> Option<GridCell> {
        let column = x / self.cell_size + self.origin_column as f32;
        let row = self.origin_row as f32 - y / self.cell_size;
        if !(column >= 0.0 && row >= 0.0) {
            return None;
        }

        let cell = GridCell::new(column as i32, row as i32);
        self.contains(cell).then_some(cell)
    }

    /// Field position of a cell's reference corner
    pub fn to_world(&self, cell: GridCell) -> (f32, f32) {
        (
            (cell.column - self.origin_column) as f32 * self.cell_size,
            (self.origin_row - cell.row) as f32 * self.cell_size,
        )
    }

    /// True if the cell lies inside the grid
    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        cell.column >= 0
            && cell.row >= 0
            && (cell.column as usize) < self.width
            && (cell.row as usize) < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_puck_positions_map_to_cells() {
        let t = GridTransform::default();
        assert_eq!(t.to_cell(-50.0, 60.0), Some(GridCell::new(4, 20)));
        assert_eq!(t.to_cell(0.0, 120.0), Some(GridCell::new(9, 14)));
        assert_eq!(t.to_cell(50.0, 180.0), Some(GridCell::new(14, 8)));
        assert_eq!(t.to_cell(0.0, 0.0), Some(GridCell::new(9, 26)));
    }

    #[test]
    fn test_truncates_toward_zero() {
        let t = GridTransform::default();
        assert_eq!(t.to_cell(-10.0, 250.0), Some(GridCell::new(8, 1)));
        assert_eq!(t.to_cell(19.9, 0.0), Some(GridCell::new(10, 26)));
        assert_eq!(t.to_cell(0.0, 5.0), Some(GridCell::new(9, 25)));
    }

    #[test]
    fn test_outside_grid() {
        let t = GridTransform::default();
        assert_eq!(t.to_cell(-100.0, 0.0), None);
        assert_eq!(t.to_cell(100.0, 0.0), None);
        assert_eq!(t.to_cell(0.0, -20.0), None);
        assert_eq!(t.to_cell(0.0, 270.0), None);
    }

    #[test]
    fn test_world_inverse() {
        let t = GridTransform::default();
        for cell in [GridCell::new(4, 20), GridCell::new(9, 0), GridCell::new(18, 26)] {
            let (x, y) = t.to_world(cell);
            assert_eq!(t.to_cell(x, y), Some(cell));
        }
    }
}
