//! Drive executor
//!
//! [`Wheels`] turns motion requests into paired actuator setpoints, publishes
//! the matching [`MotionCommand`] and owns the odometry updater thread.
//!
//! Every motion-initiating call first applies the settle rule: if the previous
//! command was timed or was a rotation, the caller blocks until the wheels are
//! idle, both wheels are stopped and a fixed settle pause elapses.

use crate::config::DriveConfig;
use crate::devices::{SimTacho, SysfsTacho};
use crate::drivers::{TachoMotor, WheelPair};
use crate::error::{Error, Result};
use crate::motion::{Direction, MotionCommand, MotionKind, Span};
use crate::odometry;
use crate::state::{DriveState, Shared};
use crate::types::{Heading, Pose, PositionFix};
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Two-wheel differential drive with dead-reckoning odometry
///
/// # Example
///
/// ```no_run
/// use chakra_drive::{DriveConfig, Heading, Wheels};
///
/// # fn main() -> chakra_drive::Result<()> {
/// let mut wheels = Wheels::ev3dev(DriveConfig::default())?;
/// wheels.rotate_to(Heading::EAST)?;
/// wheels.travel(30.0)?;
/// wheels.wait_until_idle()?;
/// println!("Now at {:?}", wheels.pose());
/// wheels.shutdown()?;
/// # Ok(())
/// # }
/// ```
pub struct Wheels {
    shared: Arc<Shared>,
    config: DriveConfig,
    max_speed: i32,
    worker: Option<JoinHandle<()>>,
}

impl Wheels {
    // === Constructors ===

    /// Bring up the drive on two tacho motors and start the odometry updater
    pub fn new(
        left: Box<dyn TachoMotor>,
        right: Box<dyn TachoMotor>,
        config: DriveConfig,
    ) -> Result<Self> {
        validate(&config)?;

        let mut wheels = WheelPair::new(left, right);
        let max_speed = wheels.max_speed()?;
        wheels.set_ramp_down(config.ramp_down_ms)?;
        let speed = scaled_speed(max_speed, config.initial_speed);
        wheels.set_speed(speed)?;

        let pose = Pose {
            speed,
            ..Pose::default()
        };
        let shared = Arc::new(Shared::new(DriveState {
            pose,
            command: MotionCommand::default(),
            wheels,
            busy: false,
        }));
        let worker = odometry::spawn(Arc::clone(&shared), &config)?;

        log::info!(
            "ChakraDrive: Drive ready (max speed {}, speed {}, {:.1} units/s)",
            max_speed,
            speed,
            config.dist_per_sec
        );

        Ok(Self {
            shared,
            config,
            max_speed,
            worker: Some(worker),
        })
    }

    /// Drive on the ev3dev motors named in the configuration
    pub fn ev3dev(config: DriveConfig) -> Result<Self> {
        let left = SysfsTacho::on_port(&config.left_port)?;
        let right = SysfsTacho::on_port(&config.right_port)?;
        Self::new(Box::new(left), Box::new(right), config)
    }

    /// Drive on simulated motors rated at `max_speed`
    pub fn simulated(max_speed: i32, config: DriveConfig) -> Result<Self> {
        Self::new(
            Box::new(SimTacho::new(max_speed)),
            Box::new(SimTacho::new(max_speed)),
            config,
        )
    }

    // === Motion ===

    /// Stop both wheels immediately and publish a `Stop` command
    ///
    /// An in-flight translation is reconciled to the distance elapsed so far.
    pub fn stop(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.wheels.stop()?;
        self.publish(&mut state, MotionKind::Stop, 0.0, 0, 0);
        log::debug!("ChakraDrive: Stop");
        Ok(())
    }

    /// Turn in place by a signed angle in degrees (positive = clockwise)
    pub fn rotate_by(&self, angle: i32) -> Result<()> {
        let Some(mut state) = self.settle()? else {
            return Ok(());
        };
        self.issue_rotate(&mut state, angle)
    }

    /// Same as [`Wheels::rotate_by`]
    pub fn rotate(&self, angle: i32) -> Result<()> {
        self.rotate_by(angle)
    }

    /// Turn to an absolute heading along the shorter direction
    ///
    /// Does nothing if already facing `target` or if the wheels are still
    /// moving after the settle rule.
    pub fn rotate_to(&self, target: impl Into<Heading>) -> Result<()> {
        let target = target.into();
        let Some(mut state) = self.settle()? else {
            return Ok(());
        };
        if state.wheels.is_moving() {
            log::debug!("ChakraDrive: rotate_to {} ignored, wheels moving", target);
            return Ok(());
        }
        let delta = state.pose.heading.delta_to(target);
        if delta == 0 {
            return Ok(());
        }
        self.issue_rotate(&mut state, delta)
    }

    /// Run straight for a distance, a duration, or until stopped
    ///
    /// Zero or negative distances and zero durations do nothing.
    pub fn translate(&self, direction: Direction, span: Span) -> Result<()> {
        let (distance, duration_ms) = match span {
            Span::Distance(distance) => {
                (distance, self.config.travel_time(distance).as_millis() as u64)
            }
            Span::Duration(duration) => (
                self.config.timed_distance(duration),
                duration.as_millis() as u64,
            ),
            Span::Indefinite => (0.0, 0),
        };
        if span != Span::Indefinite && distance <= 0.0 {
            log::debug!("ChakraDrive: Ignoring empty translation {:?}", span);
            return Ok(());
        }

        let Some(mut state) = self.settle()? else {
            return Ok(());
        };
        let speed = direction.sign() as i32 * state.pose.speed.abs();
        if span == Span::Indefinite {
            state.wheels.run_forever(speed)?;
        } else {
            state.wheels.run_timed(speed, duration_ms)?;
        }
        state.pose.speed = speed;
        self.publish(&mut state, direction.kind(), distance, duration_ms, 0);

        log::debug!(
            "ChakraDrive: Translate {:?} {:?} at speed {} ({} ms)",
            direction,
            span,
            speed,
            duration_ms
        );
        Ok(())
    }

    /// Travel a signed distance (negative = backward)
    pub fn travel(&self, distance: f32) -> Result<()> {
        let direction = if distance < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        };
        self.translate(direction, Span::Distance(distance.abs()))
    }

    /// Run forward for a fixed time
    pub fn run_timed(&self, duration: Duration) -> Result<()> {
        self.translate(Direction::Forward, Span::Duration(duration))
    }

    /// Run forward until stopped
    pub fn run_forever(&self) -> Result<()> {
        self.translate(Direction::Forward, Span::Indefinite)
    }

    /// Scale the rated maximum speed by `fraction` in (0, 1]
    pub fn set_speed(&self, fraction: f32) -> Result<()> {
        check_fraction(fraction)?;
        let speed = scaled_speed(self.max_speed, fraction);

        let mut state = self.lock()?;
        state.wheels.set_speed(speed)?;
        state.pose.speed = speed;
        log::debug!("ChakraDrive: Speed set to {} ({:.2})", speed, fraction);
        Ok(())
    }

    // === Status ===

    /// True if either wheel reports a non-idle state
    pub fn is_moving(&self) -> bool {
        self.shared.state.lock().wheels.is_moving()
    }

    /// Block until the last command is consumed and reconciled and both
    /// wheels are idle
    pub fn wait_until_idle(&self) -> Result<()> {
        let poll = self.config.idle_poll();
        let mut state = self.lock()?;
        while state.in_motion() {
            self.shared.settled.wait_for(&mut state, poll);
            if !self.shared.is_running() {
                return Err(Error::ShutDown);
            }
        }
        Ok(())
    }

    /// Snapshot of the pose estimate
    pub fn pose(&self) -> Pose {
        self.shared.state.lock().pose
    }

    /// Snapshot of the last published command
    pub fn command(&self) -> MotionCommand {
        self.shared.state.lock().command.clone()
    }

    /// Rated maximum wheel speed
    pub fn max_speed(&self) -> i32 {
        self.max_speed
    }

    /// Drive configuration in use
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    // === Pose corrections ===

    /// Overwrite position and heading (timeout recovery)
    pub fn reset_pose(&self, x: f32, y: f32, heading: Heading) -> Result<()> {
        let mut state = self.lock()?;
        state.pose.x = x;
        state.pose.y = y;
        state.pose.heading = heading;
        log::info!("ChakraDrive: Pose reset to ({:.1}, {:.1}) facing {}", x, y, heading);
        Ok(())
    }

    /// Apply an absolute correction from an external position reference
    pub fn apply_fix(&self, fix: PositionFix) -> Result<()> {
        if fix.is_empty() {
            return Ok(());
        }
        let mut state = self.lock()?;
        if let Some(x) = fix.x {
            state.pose.x = x;
        }
        if let Some(y) = fix.y {
            state.pose.y = y;
        }
        log::debug!("ChakraDrive: Position fix {:?} -> ({:.1}, {:.1})", fix, state.pose.x, state.pose.y);
        Ok(())
    }

    /// Enter path-follower control
    ///
    /// Waits out the previous motion, then marks the command as `AutoNav`
    /// without publishing it. A stop that arrives meanwhile stays visible.
    pub fn begin_autonav(&self) -> Result<()> {
        let mut state = match self.settle()? {
            Some(mut state) => {
                state.command.kind = MotionKind::AutoNav;
                state
            }
            None => self.lock()?,
        };
        state.pose.autonav = true;
        Ok(())
    }

    /// Leave path-follower control
    ///
    /// A finished translation is relabelled `AutoNav` so callers can tell a
    /// navigation just completed. `Stop` is kept so an interrupted path stays
    /// visible, and `Rotate` is kept so the next command still settles.
    pub fn end_autonav(&self) -> Result<()> {
        let mut state = self.lock()?;
        if !matches!(state.command.kind, MotionKind::Stop | MotionKind::Rotate) {
            state.command.kind = MotionKind::AutoNav;
        }
        state.pose.autonav = false;
        Ok(())
    }

    // === Teardown ===

    /// Stop the wheels and join the odometry updater
    ///
    /// Safe to call more than once. Later motion calls return
    /// [`Error::ShutDown`].
    pub fn shutdown(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        log::info!("ChakraDrive: Shutting down");

        let stopped = {
            let mut state = self.shared.state.lock();
            self.shared.running.store(false, Ordering::Release);
            let stopped = state.wheels.stop();
            self.shared.issued.notify_all();
            self.shared.settled.notify_all();
            stopped
        };

        if let Err(e) = worker.join() {
            log::error!("ChakraDrive: Odometry updater panicked: {:?}", e);
        }

        log::info!("ChakraDrive: Shutdown complete");
        stopped
    }

    // === Internals ===

    fn lock(&self) -> Result<MutexGuard<'_, DriveState>> {
        let state = self.shared.state.lock();
        if !self.shared.is_running() {
            return Err(Error::ShutDown);
        }
        Ok(state)
    }

    /// Settle rule shared by all motion-initiating calls
    ///
    /// Returns the locked state ready for the next command, or `None` when a
    /// stop was published while waiting; the caller then issues nothing.
    fn settle(&self) -> Result<Option<MutexGuard<'_, DriveState>>> {
        let state = self.lock()?;
        if !state.command.needs_settle() {
            return Ok(Some(state));
        }
        let seq = state.command.seq;
        drop(state);

        self.wait_until_idle()?;
        self.lock()?.wheels.stop()?;
        thread::sleep(self.config.settle());

        let state = self.lock()?;
        if state.command.seq != seq && state.command.kind == MotionKind::Stop {
            log::debug!("ChakraDrive: Stopped while settling, command dropped");
            return Ok(None);
        }
        Ok(Some(state))
    }

    fn issue_rotate(&self, state: &mut DriveState, angle: i32) -> Result<()> {
        let plan = self.config.turn.plan(angle, self.max_speed);
        let previous = state.pose.speed.abs();

        state
            .wheels
            .run_to_rel_pos(plan.position, -plan.position, plan.speed)?;
        state.wheels.set_speed(previous)?;
        self.publish(state, MotionKind::Rotate, 0.0, 0, angle);

        log::debug!(
            "ChakraDrive: Rotate {} (setpoint {}, speed {})",
            angle,
            plan.position,
            plan.speed
        );
        Ok(())
    }

    fn publish(
        &self,
        state: &mut DriveState,
        kind: MotionKind,
        distance: f32,
        duration_ms: u64,
        angle: i32,
    ) {
        state.command.set(kind, distance, duration_ms, angle);
        state.command.publish();
        self.shared.issued.notify_all();
    }
}

impl Drop for Wheels {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("ChakraDrive: Failed to stop wheels on shutdown: {}", e);
        }
    }
}

fn check_fraction(fraction: f32) -> Result<()> {
    if fraction > 0.0 && fraction <= 1.0 {
        Ok(())
    } else {
        log::error!("ChakraDrive: Speed fraction {} outside (0, 1]", fraction);
        Err(Error::InvalidSpeed(fraction))
    }
}

fn validate(config: &DriveConfig) -> Result<()> {
    check_fraction(config.initial_speed)?;
    if config.dist_per_sec.is_nan() || config.dist_per_sec <= 0.0 {
        log::error!("ChakraDrive: dist_per_sec must be positive, got {}", config.dist_per_sec);
        return Err(Error::Config(format!(
            "dist_per_sec must be positive, got {}",
            config.dist_per_sec
        )));
    }
    if config.odometry_tick_ms == 0 {
        log::error!("ChakraDrive: odometry_tick_ms must be non-zero");
        return Err(Error::Config("odometry_tick_ms must be non-zero".to_string()));
    }
    Ok(())
}

fn scaled_speed(max_speed: i32, fraction: f32) -> i32 {
    (max_speed as f32 * fraction) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> DriveConfig {
        DriveConfig {
            dist_per_sec: 100.0,
            odometry_tick_ms: 20,
            settle_ms: 5,
            ..DriveConfig::default()
        }
    }

    #[test]
    fn test_rejects_bad_initial_speed() {
        let config = DriveConfig {
            initial_speed: 1.5,
            ..fast_config()
        };
        let err = Wheels::simulated(1000, config).err().unwrap();
        assert!(matches!(err, Error::InvalidSpeed(_)));
    }

    #[test]
    fn test_rejects_zero_tick() {
        let config = DriveConfig {
            odometry_tick_ms: 0,
            ..fast_config()
        };
        let err = Wheels::simulated(1000, config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_set_speed_out_of_range_keeps_state() {
        let wheels = Wheels::simulated(1000, fast_config()).unwrap();
        assert_eq!(wheels.pose().speed, 300);

        assert!(matches!(wheels.set_speed(0.0), Err(Error::InvalidSpeed(_))));
        assert!(matches!(wheels.set_speed(1.01), Err(Error::InvalidSpeed(_))));
        assert_eq!(wheels.pose().speed, 300);

        wheels.set_speed(0.5).unwrap();
        assert_eq!(wheels.pose().speed, 500);
    }

    #[test]
    fn test_autonav_marks_without_publishing() {
        let wheels = Wheels::simulated(1000, fast_config()).unwrap();
        wheels.begin_autonav().unwrap();
        assert!(wheels.pose().autonav);
        let command = wheels.command();
        assert_eq!(command.kind, MotionKind::AutoNav);
        assert!(!command.dirty);

        wheels.end_autonav().unwrap();
        assert!(!wheels.pose().autonav);
        assert_eq!(wheels.command().kind, MotionKind::AutoNav);
    }

    #[test]
    fn test_end_autonav_keeps_stop() {
        let wheels = Wheels::simulated(1000, fast_config()).unwrap();
        wheels.begin_autonav().unwrap();
        wheels.stop().unwrap();

        wheels.end_autonav().unwrap();
        assert!(!wheels.pose().autonav);
        assert_eq!(wheels.command().kind, MotionKind::Stop);
    }

    #[test]
    fn test_operations_after_shutdown() {
        let mut wheels = Wheels::simulated(1000, fast_config()).unwrap();
        wheels.shutdown().unwrap();
        wheels.shutdown().unwrap();

        assert!(matches!(wheels.stop(), Err(Error::ShutDown)));
        assert!(matches!(wheels.travel(10.0), Err(Error::ShutDown)));
        assert!(matches!(wheels.wait_until_idle(), Err(Error::ShutDown)));
        assert!(!wheels.is_moving());
    }
}
