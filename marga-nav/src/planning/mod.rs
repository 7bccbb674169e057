//! Path search over the arena grid

mod astar;

pub use astar::AStarSearch;

use crate::grid::{FieldGrid, GridCell};

/// Grid path search
///
/// Returns the unit steps `(dx, dy)` leading from `from` to `to`, empty when
/// they coincide, or `None` if the goal cannot be reached.
pub trait PathSearch {
    fn search(&self, grid: &FieldGrid, from: GridCell, to: GridCell) -> Option<Vec<(i32, i32)>>;
}
