//! Tacho motor implementations

pub mod ev3dev;
pub mod mock;

pub use ev3dev::{SysfsTacho, TACHO_CLASS_DIR};
pub use mock::SimTacho;
