//! State shared between the command issuer and the odometry updater

use crate::drivers::WheelPair;
use crate::motion::MotionCommand;
use crate::types::Pose;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

/// Everything guarded by the drive lock
///
/// Pose, command and wheels live under one lock so a command's actuation and
/// its publication are a single critical section.
pub(crate) struct DriveState {
    pub pose: Pose,
    pub command: MotionCommand,
    pub wheels: WheelPair,
    /// Odometry updater is inside a command (between consuming it and reconciling)
    pub busy: bool,
}

impl DriveState {
    /// True while anything is still in flight
    pub fn in_motion(&self) -> bool {
        self.command.dirty || self.busy || self.wheels.is_moving()
    }
}

/// Lock plus the two wake-up channels around it
pub(crate) struct Shared {
    pub state: Mutex<DriveState>,
    /// Signalled when a command is published or on shutdown
    pub issued: Condvar,
    /// Signalled when the odometry updater finishes a command
    pub settled: Condvar,
    pub running: AtomicBool,
}

impl Shared {
    pub fn new(state: DriveState) -> Self {
        Self {
            state: Mutex::new(state),
            issued: Condvar::new(),
            settled: Condvar::new(),
            running: AtomicBool::new(true),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}
