//! ChakraDrive - Differential drive and dead-reckoning odometry
//!
//! Drives a two-wheeled robot through a pair of tacho motors and keeps a
//! pose estimate on a 45° compass from elapsed actuation time.
//!
//! - [`Wheels`]: drive executor (stop, rotate, translate, settle rule)
//! - odometry updater: background thread integrating the pose per tick
//! - [`devices`]: ev3dev sysfs motors and a simulated motor for tests

pub mod config;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod motion;
mod odometry;
mod state;
pub mod types;
mod wheels;

// Re-export commonly used types
pub use config::{DriveConfig, TurnProfile};
pub use devices::{SimTacho, SysfsTacho};
pub use drivers::{StateFlags, TachoCommand, TachoMotor, WheelPair};
pub use error::{Error, Result};
pub use motion::{Direction, MotionCommand, MotionKind, Span};
pub use odometry::THREAD_NAME as ODOMETRY_THREAD_NAME;
pub use types::{Heading, Pose, PositionFix, quantize_turn};
pub use wheels::Wheels;
