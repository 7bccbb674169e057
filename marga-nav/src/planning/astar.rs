//! 8-connected A* over the arena grid

use super::PathSearch;
use crate::grid::{FieldGrid, GridCell};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

/// A node in the A* open set
#[derive(Clone, Debug)]
struct AStarNode {
    cell: GridCell,
    g_cost: f32,
    f_cost: f32,
}

impl Eq for AStarNode {}

impl PartialEq for AStarNode {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .partial_cmp(&self.f_cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* path search
///
/// The goal cell is admissible even when blocked, since targets sit on
/// blocked cells. Diagonal moves may not cut the corner of a blocked cell.
#[derive(Clone, Debug)]
pub struct AStarSearch {
    /// Diagonal move cost relative to a cardinal move
    pub diagonal_cost: f32,
    /// Maximum number of nodes to expand before giving up
    pub max_expansions: usize,
}

impl Default for AStarSearch {
    fn default() -> Self {
        Self {
            diagonal_cost: std::f32::consts::SQRT_2,
            max_expansions: 10_000,
        }
    }
}

impl AStarSearch {
    /// Octile distance
    fn heuristic(&self, from: GridCell, to: GridCell) -> f32 {
        let dx = (from.column - to.column).abs() as f32;
        let dy = (from.row - to.row).abs() as f32;
        let min = dx.min(dy);
        let max = dx.max(dy);
        min * self.diagonal_cost + (max - min)
    }

    fn can_enter(grid: &FieldGrid, cell: GridCell, goal: GridCell) -> bool {
        (cell == goal && grid.contains(cell)) || grid.is_passable(cell)
    }

    fn reconstruct(
        came_from: &HashMap<GridCell, (GridCell, (i32, i32))>,
        goal: GridCell,
    ) -> Vec<(i32, i32)> {
        let mut steps = Vec::new();
        let mut current = goal;
        while let Some(&(prev, step)) = came_from.get(&current) {
            steps.push(step);
            current = prev;
        }
        steps.reverse();
        steps
    }
}

impl PathSearch for AStarSearch {
    fn search(&self, grid: &FieldGrid, from: GridCell, to: GridCell) -> Option<Vec<(i32, i32)>> {
        trace!("[AStar] search: {} -> {}", from, to);

        if !grid.contains(from) || !grid.contains(to) {
            debug!("[AStar] {} or {} outside grid", from, to);
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from: HashMap<GridCell, (GridCell, (i32, i32))> = HashMap::new();
        let mut g_scores: HashMap<GridCell, f32> = HashMap::new();

        open_set.push(AStarNode {
            cell: from,
            g_cost: 0.0,
            f_cost: self.heuristic(from, to),
        });
        g_scores.insert(from, 0.0);

        let mut expanded = 0;

        while let Some(current) = open_set.pop() {
            if current.cell == to {
                let steps = Self::reconstruct(&came_from, to);
                debug!(
                    "[AStar] {} -> {}: {} steps, cost {:.2}, {} nodes expanded",
                    from,
                    to,
                    steps.len(),
                    current.g_cost,
                    expanded
                );
                return Some(steps);
            }

            if !closed_set.insert(current.cell) {
                continue;
            }
            expanded += 1;
            if expanded > self.max_expansions {
                debug!("[AStar] gave up after {} expansions", expanded);
                return None;
            }

            for (neighbor, (dx, dy)) in current.cell.neighbors_8() {
                if closed_set.contains(&neighbor) || !Self::can_enter(grid, neighbor, to) {
                    continue;
                }

                let diagonal = dx != 0 && dy != 0;
                if diagonal
                    && !(grid.is_passable(current.cell.offset(dx, 0))
                        && grid.is_passable(current.cell.offset(0, dy)))
                {
                    continue;
                }

                let move_cost = if diagonal { self.diagonal_cost } else { 1.0 };
                let tentative_g = current.g_cost + move_cost;

                let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(f32::INFINITY);
                if tentative_g < neighbor_g {
                    came_from.insert(neighbor, (current.cell, (dx, dy)));
                    g_scores.insert(neighbor, tentative_g);
                    open_set.push(AStarNode {
                        cell: neighbor,
                        g_cost: tentative_g,
                        f_cost: tentative_g + self.heuristic(neighbor, to),
                    });
                }
            }
        }

        debug!("[AStar] no path {} -> {} after {} expansions", from, to, expanded);
        None
    }
}
