//! Motion commands and turn profiles

pub mod commands;
pub mod turn;

pub use commands::{Direction, MotionCommand, MotionKind, Span};
pub use turn::TurnPlan;
