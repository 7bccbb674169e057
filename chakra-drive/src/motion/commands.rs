//! Motion command definitions

use std::time::Duration;

/// Kind of the in-flight motion command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionKind {
    /// Wheels stopped
    #[default]
    Stop,
    /// In-place relative turn
    Rotate,
    /// Forward run
    TranslateForward,
    /// Reverse run
    TranslateBackward,
    /// Path follower in control
    AutoNav,
}

impl MotionKind {
    /// Command kinds that displace the robot
    pub fn is_translation(self) -> bool {
        matches!(
            self,
            Self::TranslateForward | Self::TranslateBackward | Self::AutoNav
        )
    }
}

/// Travel direction for a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// +1 for forward, -1 for backward
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    pub(crate) fn kind(self) -> MotionKind {
        match self {
            Self::Forward => MotionKind::TranslateForward,
            Self::Backward => MotionKind::TranslateBackward,
        }
    }
}

/// How long a translation lasts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Span {
    /// Fixed distance in field units
    Distance(f32),
    /// Fixed run time
    Duration(Duration),
    /// Until explicitly stopped
    Indefinite,
}

/// The single in-flight motion instruction
///
/// Shared between the issuing thread and the odometry updater; only ever read
/// or written under the drive state lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionCommand {
    /// What the wheels were told to do
    pub kind: MotionKind,
    /// Commanded distance (0 when unbounded or not a translation)
    pub distance: f32,
    /// Commanded run time in milliseconds (0 when not timed)
    pub duration_ms: u64,
    /// Relative turn in degrees, within (-360, 360)
    pub angle: i32,
    /// Issued but not yet consumed by the odometry updater
    pub dirty: bool,
    /// Issue counter, bumped on every accepted command
    pub(crate) seq: u64,
}

impl MotionCommand {
    /// Overwrite the command attributes (dirty flag untouched)
    pub(crate) fn set(&mut self, kind: MotionKind, distance: f32, duration_ms: u64, angle: i32) {
        self.kind = kind;
        self.distance = distance;
        self.duration_ms = duration_ms;
        self.angle = angle % 360;
    }

    /// Mark the command as issued
    pub(crate) fn publish(&mut self) {
        self.seq = self.seq.wrapping_add(1);
        self.dirty = true;
    }

    /// Issue counter; changes whenever a new command is published
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// True if the next command must wait for this one's motion to settle
    pub fn needs_settle(&self) -> bool {
        self.duration_ms != 0 || self.kind == MotionKind::Rotate
    }

    /// Distance the odometry updater should run to, if bounded
    pub(crate) fn target_distance(&self) -> Option<f32> {
        if self.kind.is_translation() && (self.distance > 0.0 || self.duration_ms > 0) {
            Some(self.distance)
        } else {
            None
        }
    }
}
