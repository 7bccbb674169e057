//! Actuator driver traits

pub mod pair;
pub mod tacho;

pub use pair::WheelPair;
pub use tacho::{StateFlags, TachoCommand, TachoMotor};
