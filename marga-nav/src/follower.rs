//! Grid path follower
//!
//! Turns a sequence of unit grid steps into rotate + translate pairs, one
//! pair per maximal run of identical steps.

use crate::error::Result;
use chakra_drive::{Heading, MotionKind, Wheels};
use tracing::{debug, info, warn};

/// Distance covered by one cardinal grid step
pub const CARDINAL_STEP: f32 = 10.0;

/// Distance covered by one diagonal grid step
pub const DIAGONAL_STEP: f32 = 14.14;

/// Heading that a grid step faces
///
/// Grid rows grow southward, so `dy = -1` is north.
pub fn step_heading(step: (i32, i32)) -> Option<Heading> {
    match step {
        (-1, -1) => Some(Heading::NORTH_WEST),
        (-1, 1) => Some(Heading::SOUTH_WEST),
        (1, -1) => Some(Heading::NORTH_EAST),
        (1, 1) => Some(Heading::SOUTH_EAST),
        (0, 1) => Some(Heading::SOUTH),
        (0, -1) => Some(Heading::NORTH),
        (-1, 0) => Some(Heading::WEST),
        (1, 0) => Some(Heading::EAST),
        _ => None,
    }
}

/// A straight run of identical steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    /// The repeated unit step
    pub step: (i32, i32),
    /// Number of merged steps
    pub count: usize,
    /// Total distance to travel
    pub distance: f32,
}

impl Leg {
    /// Heading to face for this leg, `None` for a malformed step
    pub fn heading(&self) -> Option<Heading> {
        step_heading(self.step)
    }
}

/// How a follow run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowEnd {
    /// Every leg was issued
    Completed,
    /// A stop command interrupted the leg sequence
    Stopped { legs_run: usize },
    /// A step was not a unit grid step
    MalformedStep { legs_run: usize, step: (i32, i32) },
}

/// Merges steps into legs and drives them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathFollower {
    pub cardinal_step: f32,
    pub diagonal_step: f32,
}

impl Default for PathFollower {
    fn default() -> Self {
        Self {
            cardinal_step: CARDINAL_STEP,
            diagonal_step: DIAGONAL_STEP,
        }
    }
}

impl PathFollower {
    /// Merge maximal runs of identical steps
    pub fn legs(&self, steps: &[(i32, i32)]) -> Vec<Leg> {
        let mut legs: Vec<Leg> = Vec::new();
        for &step in steps {
            let length = if step.0 != 0 && step.1 != 0 {
                self.diagonal_step
            } else {
                self.cardinal_step
            };
            match legs.last_mut() {
                Some(leg) if leg.step == step => {
                    leg.count += 1;
                    leg.distance += length;
                }
                _ => legs.push(Leg {
                    step,
                    count: 1,
                    distance: length,
                }),
            }
        }
        legs
    }

    /// Drive the path: face each leg's heading, then travel its distance
    ///
    /// Each call blocks until the previous leg has finished. A malformed
    /// step or a stop command ends the sequence early without error.
    pub fn follow(&self, wheels: &Wheels, steps: &[(i32, i32)]) -> Result<FollowEnd> {
        let legs = self.legs(steps);
        info!("Following {} steps as {} legs", steps.len(), legs.len());

        // The follower never issues Stop, so a Stop published after this
        // point came from outside
        let start = wheels.command().seq();
        let stopped = || {
            let command = wheels.command();
            command.kind == MotionKind::Stop && command.seq() != start
        };

        for (legs_run, leg) in legs.iter().enumerate() {
            let Some(heading) = leg.heading() else {
                warn!("Malformed path step {:?}, abandoning path", leg.step);
                return Ok(FollowEnd::MalformedStep {
                    legs_run,
                    step: leg.step,
                });
            };

            debug!(
                "Leg {}: {} x {:?} -> {} for {:.2}",
                legs_run, leg.count, leg.step, heading, leg.distance
            );
            wheels.rotate_to(heading)?;
            if stopped() {
                info!("Path interrupted by stop after {} legs", legs_run);
                return Ok(FollowEnd::Stopped { legs_run });
            }
            wheels.travel(leg.distance)?;
            if stopped() {
                info!("Path interrupted by stop during leg {}", legs_run);
                return Ok(FollowEnd::Stopped { legs_run });
            }
        }

        Ok(FollowEnd::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_step_headings() {
        assert_eq!(step_heading((0, -1)), Some(Heading::NORTH));
        assert_eq!(step_heading((1, -1)), Some(Heading::NORTH_EAST));
        assert_eq!(step_heading((1, 0)), Some(Heading::EAST));
        assert_eq!(step_heading((1, 1)), Some(Heading::SOUTH_EAST));
        assert_eq!(step_heading((0, 1)), Some(Heading::SOUTH));
        assert_eq!(step_heading((-1, 1)), Some(Heading::SOUTH_WEST));
        assert_eq!(step_heading((-1, 0)), Some(Heading::WEST));
        assert_eq!(step_heading((-1, -1)), Some(Heading::NORTH_WEST));
        assert_eq!(step_heading((0, 0)), None);
        assert_eq!(step_heading((2, 0)), None);
    }

    #[test]
    fn test_straight_run_is_one_leg() {
        let legs = PathFollower::default().legs(&[(0, -1); 6]);
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].count, 6);
        assert_eq!(legs[0].distance, 60.0);
    }

    #[test]
    fn test_mixed_runs() {
        let steps = [(1, 1), (1, 1), (0, 1), (0, 1), (0, 1), (1, 1)];
        let legs = PathFollower::default().legs(&steps);
        assert_eq!(legs.len(), 3);
        assert_relative_eq!(legs[0].distance, 28.28, epsilon = 1e-4);
        assert_eq!(legs[1].distance, 30.0);
        assert_eq!(legs[1].heading(), Some(Heading::SOUTH));
        assert_relative_eq!(legs[2].distance, 14.14);
    }

    #[test]
    fn test_empty_path() {
        assert!(PathFollower::default().legs(&[]).is_empty());
    }
}
