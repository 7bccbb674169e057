//! Shared value types

pub mod pose;

pub use pose::{Heading, Pose, PositionFix, quantize_turn};
