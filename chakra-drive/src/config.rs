//! Drive configuration
//!
//! Loaded from the `[drive]` table of a TOML file. Every field has a default
//! matching the puck-grabber calibration, so an empty table is valid.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Drive subsystem configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Port address of the left wheel motor (ev3dev `address` attribute)
    pub left_port: String,

    /// Port address of the right wheel motor
    pub right_port: String,

    /// Speed fraction applied at startup, in (0, 1]
    pub initial_speed: f32,

    /// Distance units covered per second at the commanded speed
    pub dist_per_sec: f32,

    /// Empirical factor converting `distance / dist_per_sec` into run time.
    ///
    /// Timed runs slightly undershoot at 1.0; 0.97 was measured on the arena.
    pub travel_time_scale: f32,

    /// Odometry update period in milliseconds
    pub odometry_tick_ms: u64,

    /// Pause between a finished motion and the next command, in milliseconds
    pub settle_ms: u64,

    /// Ramp-down setpoint applied to both wheels at startup, in milliseconds
    pub ramp_down_ms: u32,

    /// Upper bound on how long a waiting caller sleeps before re-checking the
    /// actuator state flags, in milliseconds
    pub idle_poll_ms: u64,

    /// Wheel position setpoints for the coarse turn profiles
    pub turn: TurnProfile,
}

/// Wheel position setpoints (tacho counts) for in-place turns
///
/// The left wheel receives `+setpoint`, the right wheel `-setpoint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TurnProfile {
    /// Any turn in (0°, 45°]
    pub mid_turn: i32,
    /// Exactly 90°
    pub quarter_turn: i32,
    /// Exactly 180°
    pub half_turn: i32,
    /// 0° or 360°
    pub full_turn: i32,
}

impl Default for TurnProfile {
    fn default() -> Self {
        Self {
            mid_turn: 95,
            quarter_turn: 190,
            half_turn: 380,
            full_turn: 760,
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            left_port: "ev3-ports:outA".to_string(),
            right_port: "ev3-ports:outB".to_string(),
            initial_speed: 0.3,
            dist_per_sec: 20.0,
            travel_time_scale: 0.97,
            odometry_tick_ms: 500,
            settle_ms: 500,
            ramp_down_ms: 500,
            idle_poll_ms: 10,
            turn: TurnProfile::default(),
        }
    }
}

impl DriveConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Odometry tick as a duration
    pub fn odometry_tick(&self) -> Duration {
        Duration::from_millis(self.odometry_tick_ms)
    }

    /// Settle pause as a duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Poll bound for waiting callers
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms.max(1))
    }

    /// Distance advanced by the odometry updater on each tick
    ///
    /// Half the per-second rate at the default 500 ms tick.
    pub fn step_per_tick(&self) -> f32 {
        self.dist_per_sec * self.odometry_tick().as_secs_f32()
    }

    /// Run time needed to cover `distance` at the commanded speed
    pub fn travel_time(&self, distance: f32) -> Duration {
        let ms = (1000.0 * self.travel_time_scale * distance / self.dist_per_sec) as u64;
        Duration::from_millis(ms)
    }

    /// Distance covered by a timed run of `duration`
    pub fn timed_distance(&self, duration: Duration) -> f32 {
        self.dist_per_sec * duration.as_secs_f32()
    }
}
