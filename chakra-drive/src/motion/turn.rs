//! Coarse open-loop turn profiles
//!
//! In-place turns are realised by sending opposite relative position targets
//! to the two wheels. The mapping from requested angle to wheel setpoint is
//! calibrated only for a handful of angles; everything else is a linear
//! extrapolation and therefore approximate.

use crate::config::TurnProfile;

/// Speed divisor for mid-turns (finer steps need a slower wheel)
const MID_TURN_SPEED_DIVISOR: i32 = 8;

/// Speed divisor for every other turn
const TURN_SPEED_DIVISOR: i32 = 6;

/// Wheel setpoints for one in-place turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnPlan {
    /// Relative position target for the left wheel (right wheel gets the negation)
    pub position: i32,
    /// Wheel speed to run the turn at
    pub speed: i32,
}

impl TurnProfile {
    /// Wheel position setpoint for a signed turn of `angle` degrees
    pub fn setpoint(&self, angle: i32) -> i32 {
        let magnitude = angle.abs();
        let sign = if angle > 0 { 1 } else { -1 };

        if magnitude > 0 && magnitude <= 45 {
            sign * self.mid_turn
        } else if magnitude == 90 {
            sign * self.quarter_turn
        } else if magnitude == 180 {
            sign * self.half_turn
        } else if magnitude == 360 || angle == 0 {
            sign * self.full_turn
        } else {
            angle * 2 + 10 * angle / 90
        }
    }

    /// Setpoint and reduced speed for a turn, given the wheel's rated maximum
    pub fn plan(&self, angle: i32, max_speed: i32) -> TurnPlan {
        let position = self.setpoint(angle);
        let magnitude = angle.abs();
        let divisor = if magnitude > 0 && magnitude <= 45 {
            MID_TURN_SPEED_DIVISOR
        } else {
            TURN_SPEED_DIVISOR
        };

        TurnPlan {
            position,
            speed: max_speed / divisor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibrated_setpoints() {
        let profile = TurnProfile::default();
        assert_eq!(profile.setpoint(30), profile.mid_turn);
        assert_eq!(profile.setpoint(-45), -profile.mid_turn);
        assert_eq!(profile.setpoint(90), profile.quarter_turn);
        assert_eq!(profile.setpoint(-90), -profile.quarter_turn);
        assert_eq!(profile.setpoint(-180), -profile.half_turn);
        assert_eq!(profile.setpoint(360), profile.full_turn);
        assert_eq!(profile.setpoint(0), -profile.full_turn);
    }

    #[test]
    fn test_extrapolated_setpoint() {
        let profile = TurnProfile::default();
        // 135 * 2 + 10 * 135 / 90 = 270 + 15
        assert_eq!(profile.setpoint(135), 285);
        assert_eq!(profile.setpoint(-135), -285);
    }

    #[test]
    fn test_turn_speed_reduction() {
        let profile = TurnProfile::default();
        assert_eq!(profile.plan(45, 1050).speed, 131);
        assert_eq!(profile.plan(-45, 1050).speed, 131);
        assert_eq!(profile.plan(90, 1050).speed, 175);
        assert_eq!(profile.plan(135, 1050).speed, 175);
    }
}
