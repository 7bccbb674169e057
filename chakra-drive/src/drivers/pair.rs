//! Paired wheel actuators
//!
//! Only paired operations are exposed, so both wheels always see the same run
//! and stop transitions.

use super::tacho::{StateFlags, TachoCommand, TachoMotor};
use crate::error::Result;

/// Left and right drive wheels
pub struct WheelPair {
    left: Box<dyn TachoMotor>,
    right: Box<dyn TachoMotor>,
}

impl WheelPair {
    /// Pair two tacho motors
    pub fn new(left: Box<dyn TachoMotor>, right: Box<dyn TachoMotor>) -> Self {
        Self { left, right }
    }

    /// Rated maximum speed of the slower wheel
    pub fn max_speed(&self) -> Result<i32> {
        Ok(self.left.max_speed()?.min(self.right.max_speed()?))
    }

    /// Apply the same ramp-down setpoint to both wheels
    pub fn set_ramp_down(&mut self, ms: u32) -> Result<()> {
        self.left.set_ramp_down_sp(ms)?;
        self.right.set_ramp_down_sp(ms)
    }

    /// Apply the same speed setpoint to both wheels
    pub fn set_speed(&mut self, speed: i32) -> Result<()> {
        self.left.set_speed_sp(speed)?;
        self.right.set_speed_sp(speed)
    }

    /// Run both wheels at `speed` until stopped
    pub fn run_forever(&mut self, speed: i32) -> Result<()> {
        self.set_speed(speed)?;
        self.send(TachoCommand::RunForever)
    }

    /// Run both wheels at `speed` for `ms` milliseconds
    pub fn run_timed(&mut self, speed: i32, ms: u64) -> Result<()> {
        self.set_speed(speed)?;
        self.left.set_time_sp(ms)?;
        self.right.set_time_sp(ms)?;
        self.send(TachoCommand::RunTimed)
    }

    /// Run each wheel to a relative position at `speed`
    pub fn run_to_rel_pos(&mut self, left: i32, right: i32, speed: i32) -> Result<()> {
        self.set_speed(speed)?;
        self.left.set_position_sp(left)?;
        self.right.set_position_sp(right)?;
        self.send(TachoCommand::RunToRelPos)
    }

    /// Stop both wheels
    ///
    /// The right wheel is stopped even if stopping the left one failed.
    pub fn stop(&mut self) -> Result<()> {
        let left = self.left.send(TachoCommand::Stop);
        let right = self.right.send(TachoCommand::Stop);
        left.and(right)
    }

    /// State flags of both wheels
    pub fn state(&self) -> Result<(StateFlags, StateFlags)> {
        Ok((self.left.state_flags()?, self.right.state_flags()?))
    }

    /// True if either wheel reports a non-idle state
    ///
    /// A wheel that cannot be read is treated as idle.
    pub fn is_moving(&self) -> bool {
        match self.state() {
            Ok((left, right)) => !left.is_empty() || !right.is_empty(),
            Err(e) => {
                log::warn!("ChakraDrive: Failed to read wheel state: {}", e);
                false
            }
        }
    }

    fn send(&mut self, command: TachoCommand) -> Result<()> {
        self.left.send(command)?;
        self.right.send(command)
    }
}
