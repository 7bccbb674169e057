//! Tacho motor driver trait

use crate::error::Result;
use bitflags::bitflags;
use std::fmt;

/// Run command understood by a tacho motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TachoCommand {
    /// Run at `speed_sp` until told otherwise
    RunForever,
    /// Run at `speed_sp` for `time_sp` milliseconds
    RunTimed,
    /// Run at `speed_sp` until `position_sp` counts from the current position
    RunToRelPos,
    /// Stop the motor
    Stop,
}

impl TachoCommand {
    /// Command string written to the `command` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunForever => "run-forever",
            Self::RunTimed => "run-timed",
            Self::RunToRelPos => "run-to-rel-pos",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for TachoCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Motor state flags (ev3dev `state` attribute)
    ///
    /// An empty set means the motor is idle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StateFlags: u8 {
        const RUNNING = 0b0_0001;
        const RAMPING = 0b0_0010;
        const HOLDING = 0b0_0100;
        const OVERLOADED = 0b0_1000;
        const STALLED = 0b1_0000;
    }
}

impl StateFlags {
    /// Parse the space separated flag list ev3dev reports
    ///
    /// Unknown words are ignored.
    pub fn parse(text: &str) -> Self {
        let mut flags = StateFlags::empty();
        for word in text.split_whitespace() {
            match word {
                "running" => flags.insert(Self::RUNNING),
                "ramping" => flags.insert(Self::RAMPING),
                "holding" => flags.insert(Self::HOLDING),
                "overloaded" => flags.insert(Self::OVERLOADED),
                "stalled" => flags.insert(Self::STALLED),
                _ => {}
            }
        }
        flags
    }
}

/// A single tacho motor
///
/// Setpoints only take effect with the next [`TachoCommand`].
pub trait TachoMotor: Send {
    /// Speed setpoint in tacho counts per second (sign selects direction)
    fn set_speed_sp(&mut self, speed: i32) -> Result<()>;

    /// Relative position setpoint in tacho counts
    fn set_position_sp(&mut self, position: i32) -> Result<()>;

    /// Run time setpoint in milliseconds
    fn set_time_sp(&mut self, ms: u64) -> Result<()>;

    /// Ramp-down time setpoint in milliseconds
    fn set_ramp_down_sp(&mut self, ms: u32) -> Result<()>;

    /// Issue a run or stop command
    fn send(&mut self, command: TachoCommand) -> Result<()>;

    /// Current state flags
    fn state_flags(&self) -> Result<StateFlags>;

    /// Rated maximum speed in tacho counts per second
    fn max_speed(&self) -> Result<i32>;
}
