//! Arena occupancy grid

use super::transform::{GridCell, GridTransform};

/// Occupancy of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Free,
    /// Wall or puck
    Blocked,
    /// A puck was dropped here
    Delivered,
}

impl Cell {
    /// Cells the robot may drive through
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Cell::Blocked)
    }
}

/// Row-major occupancy grid of the arena
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FieldGrid {
    /// All-free grid
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Free; width * height],
        }
    }

    /// Walled arena with pucks
    ///
    /// The perimeter is blocked except for the delivery gap in the top row at
    /// the origin column; every puck position is blocked.
    pub fn arena(transform: &GridTransform, pucks: &[(f32, f32)]) -> Self {
        let mut grid = Self::new(transform.width, transform.height);
        let (w, h) = (transform.width as i32, transform.height as i32);

        for column in 0..w {
            grid.set(GridCell::new(column, 0), Cell::Blocked);
            grid.set(GridCell::new(column, h - 1), Cell::Blocked);
        }
        for row in 0..h {
            grid.set(GridCell::new(0, row), Cell::Blocked);
            grid.set(GridCell::new(w - 1, row), Cell::Blocked);
        }
        grid.set(GridCell::new(transform.origin_column, 0), Cell::Free);

        for &(x, y) in pucks {
            if let Some(cell) = transform.to_cell(x, y) {
                grid.set(cell, Cell::Blocked);
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// True if the cell lies inside the grid
    #[inline]
    pub fn contains(&self, cell: GridCell) -> bool {
        self.index(cell).is_some()
    }

    /// Occupancy of a cell, `None` outside the grid
    pub fn get(&self, cell: GridCell) -> Option<Cell> {
        self.index(cell).map(|i| self.cells[i])
    }

    /// Overwrite a cell; returns false outside the grid
    pub fn set(&mut self, cell: GridCell, value: Cell) -> bool {
        match self.index(cell) {
            Some(i) => {
                self.cells[i] = value;
                true
            }
            None => false,
        }
    }

    /// True if the cell is inside the grid and not blocked
    pub fn is_passable(&self, cell: GridCell) -> bool {
        self.get(cell).is_some_and(Cell::is_passable)
    }

    /// Number of cells in the given state
    pub fn count(&self, value: Cell) -> usize {
        self.cells.iter().filter(|c| **c == value).count()
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        if cell.column < 0 || cell.row < 0 {
            return None;
        }
        let (column, row) = (cell.column as usize, cell.row as usize);
        (column < self.width && row < self.height).then(|| row * self.width + column)
    }
}
