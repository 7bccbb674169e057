//! Target pucks and nearest-target selection

use crate::error::{NavError, Result};
use crate::grid::{GridCell, GridTransform};
use chakra_drive::Pose;

/// Puck layout of the arena: three rows of three
pub const DEFAULT_PUCKS: [(f32, f32); 9] = [
    (-50.0, 60.0),
    (0.0, 60.0),
    (50.0, 60.0),
    (-50.0, 120.0),
    (0.0, 120.0),
    (50.0, 120.0),
    (-50.0, 180.0),
    (0.0, 180.0),
    (50.0, 180.0),
];

/// A puck to collect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub x: f32,
    pub y: f32,
    pub captured: bool,
}

/// Fixed set of targets, in selection order
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSet {
    targets: Vec<Target>,
}

impl Default for TargetSet {
    fn default() -> Self {
        Self::new(DEFAULT_PUCKS)
    }
}

impl TargetSet {
    /// Uncaptured targets at the given positions
    pub fn new(positions: impl IntoIterator<Item = (f32, f32)>) -> Self {
        Self {
            targets: positions
                .into_iter()
                .map(|(x, y)| Target {
                    x,
                    y,
                    captured: false,
                })
                .collect(),
        }
    }

    /// Index of the closest uncaptured target
    ///
    /// Ties go to the lowest index; `None` once everything is captured.
    pub fn nearest(&self, pose: &Pose) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, target) in self.targets.iter().enumerate() {
            if target.captured {
                continue;
            }
            let distance = pose.distance_to(target.x, target.y);
            if best.is_none_or(|(_, smallest)| distance < smallest) {
                best = Some((i, distance));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Mark a target as captured
    pub fn mark_captured(&mut self, index: usize) -> Result<()> {
        let target = self
            .targets
            .get_mut(index)
            .ok_or(NavError::UnknownTarget(index))?;
        target.captured = true;
        Ok(())
    }

    /// Mark the first uncaptured target lying in `cell`
    pub fn mark_captured_at(&mut self, cell: GridCell, transform: &GridTransform) -> Option<usize> {
        let index = self.targets.iter().position(|t| {
            !t.captured && transform.to_cell(t.x, t.y) == Some(cell)
        })?;
        self.targets[index].captured = true;
        Some(index)
    }

    /// Number of targets not yet captured
    pub fn remaining(&self) -> usize {
        self.targets.iter().filter(|t| !t.captured).count()
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chakra_drive::Heading;

    #[test]
    fn test_nearest_skips_captured() {
        let mut targets = TargetSet::new([(0.0, 60.0), (50.0, 60.0)]);
        let pose = Pose::new(0.0, 0.0, Heading::NORTH);

        assert_eq!(targets.nearest(&pose), Some(0));
        targets.mark_captured(0).unwrap();
        assert_eq!(targets.nearest(&pose), Some(1));
        targets.mark_captured(1).unwrap();
        assert_eq!(targets.nearest(&pose), None);
        assert_eq!(targets.remaining(), 0);
    }

    #[test]
    fn test_ties_resolve_to_first() {
        let targets = TargetSet::new([(-50.0, 60.0), (50.0, 60.0), (0.0, 200.0)]);
        let pose = Pose::new(0.0, 60.0, Heading::SOUTH);
        assert_eq!(targets.nearest(&pose), Some(0));
    }

    #[test]
    fn test_default_layout() {
        let targets = TargetSet::default();
        assert_eq!(targets.len(), 9);
        let pose = Pose::new(-10.0, 250.0, Heading::SOUTH);
        // (0, 180) is closest to the start corner
        assert_eq!(targets.nearest(&pose), Some(7));
    }

    #[test]
    fn test_mark_captured_at_cell() {
        let mut targets = TargetSet::default();
        let transform = GridTransform::default();

        let cell = transform.to_cell(50.0, 120.0).unwrap();
        assert_eq!(targets.mark_captured_at(cell, &transform), Some(5));
        assert_eq!(targets.mark_captured_at(cell, &transform), None);
        assert_eq!(targets.remaining(), 8);

        assert_eq!(targets.mark_captured_at(GridCell::new(1, 1), &transform), None);
    }

    #[test]
    fn test_unknown_target() {
        let mut targets = TargetSet::default();
        assert!(matches!(targets.mark_captured(9), Err(NavError::UnknownTarget(9))));
    }
}
