//! Odometry updater
//!
//! Background thread that consumes published motion commands and integrates
//! the pose from elapsed actuation time. Translations advance the pose at the
//! end of every tick along the current heading; when the run ends the pose is
//! rebuilt from the pre-move position so tick rounding never accumulates.

use crate::config::DriveConfig;
use crate::error::{Error, Result};
use crate::motion::{MotionCommand, MotionKind};
use crate::state::{DriveState, Shared};
use crate::types::Pose;
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Thread name of the odometry updater
pub const THREAD_NAME: &str = "chakra-odometry";

/// How a displacement run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunEnd {
    /// Accumulated distance reached the target
    Reached,
    /// Wheels went idle on their own
    Stopped,
    /// A newer command was published, or the subsystem is shutting down
    Preempted,
}

/// Start the odometry updater for `shared`
pub(crate) fn spawn(shared: Arc<Shared>, config: &DriveConfig) -> Result<JoinHandle<()>> {
    let tick = config.odometry_tick();
    let step = config.step_per_tick();

    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || run(&shared, tick, step))
        .map_err(|e| Error::ThreadSpawn(e.to_string()))
}

fn run(shared: &Shared, tick: Duration, step: f32) {
    log::info!(
        "ChakraDrive: Odometry updater started ({}ms tick, {:.2} units/tick)",
        tick.as_millis(),
        step
    );

    let mut state = shared.state.lock();
    loop {
        while !state.command.dirty && shared.is_running() {
            shared.issued.wait(&mut state);
        }
        if !shared.is_running() {
            break;
        }

        state.command.dirty = false;
        state.busy = true;
        let command = state.command.clone();

        match command.kind {
            MotionKind::Stop => {
                log::debug!("ChakraDrive: Stop consumed");
            }
            MotionKind::Rotate => {
                let before = state.pose.heading;
                state.pose.heading = before.rotated(command.angle);
                log::debug!(
                    "ChakraDrive: Rotate {} -> heading {} (was {})",
                    command.angle,
                    state.pose.heading,
                    before
                );
            }
            MotionKind::TranslateForward | MotionKind::TranslateBackward | MotionKind::AutoNav => {
                displace(shared, &mut state, &command, tick, step);
            }
        }

        // A command published while this one ran stays pending.
        if state.command.seq == command.seq {
            state.command.dirty = false;
        }
        state.busy = false;
        shared.settled.notify_all();
    }

    state.busy = false;
    shared.settled.notify_all();
    drop(state);

    log::info!("ChakraDrive: Odometry updater stopped");
}

/// Advance the pose until the run ends, then reconcile it
///
/// One critical section per tick; the lock is released while waiting for the
/// next tick.
fn displace(
    shared: &Shared,
    state: &mut MutexGuard<'_, DriveState>,
    command: &MotionCommand,
    tick: Duration,
    step: f32,
) {
    let start = state.pose;
    let heading = start.heading;
    let sign = if command.kind == MotionKind::TranslateBackward {
        -1.0
    } else {
        1.0
    };
    let (ux, uy) = heading.unit_vector();
    let target = command.target_distance();

    let mut traveled = 0.0_f32;
    let mut deadline = Instant::now();

    let end = loop {
        if state.command.dirty || !shared.is_running() {
            break RunEnd::Preempted;
        }
        if !state.wheels.is_moving() {
            break RunEnd::Stopped;
        }
        if let Some(target) = target
            && traveled >= target
        {
            if let Err(e) = state.wheels.stop() {
                log::warn!("ChakraDrive: Failed to stop wheels at target: {}", e);
            }
            break RunEnd::Reached;
        }

        let tick_start = deadline;
        deadline += tick;
        while !state.command.dirty && shared.is_running() {
            if shared.issued.wait_until(state, deadline).timed_out() {
                break;
            }
        }

        // Preempted mid-tick: commit up to the nearest tick boundary
        if (state.command.dirty || !shared.is_running())
            && Instant::now() < tick_start + tick / 2
        {
            break RunEnd::Preempted;
        }

        traveled += step;
        state.pose.x += sign * ux * step;
        state.pose.y += sign * uy * step;
        log::trace!(
            "ChakraDrive: Pose ({:.2}, {:.2}) after {:.2} units",
            state.pose.x,
            state.pose.y,
            traveled
        );
    };

    let distance = match (end, target) {
        (RunEnd::Preempted, _) | (_, None) => traveled,
        (_, Some(target)) => target,
    };

    let (x, y) = Pose::offset(start.x, start.y, heading, sign * distance);
    state.pose.x = x;
    state.pose.y = y;

    log::debug!(
        "ChakraDrive: {:?} run {:?} after {:.2} units, reconciled {:.2} along {} -> ({:.2}, {:.2})",
        command.kind,
        end,
        traveled,
        sign * distance,
        heading,
        x,
        y
    );
}
