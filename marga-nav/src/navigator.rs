//! Navigation facade
//!
//! Ties the drive, the arena grid, path search and the target set together
//! behind the calls a behaviour loop needs: `go_to`, `nearest_target`,
//! capture and delivery bookkeeping, zone corrections and recovery.

use crate::config::NavConfig;
use crate::error::{NavError, Result};
use crate::follower::{FollowEnd, PathFollower};
use crate::grid::{Cell, FieldGrid, GridCell, GridTransform};
use crate::planning::{AStarSearch, PathSearch};
use crate::targets::{Target, TargetSet};
use crate::zones::{FloorColor, ZoneCorrector};
use chakra_drive::{Heading, Pose, Wheels};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Drives the robot around the arena
pub struct Navigator<S: PathSearch = AStarSearch> {
    wheels: Arc<Wheels>,
    grid: FieldGrid,
    transform: GridTransform,
    search: S,
    follower: PathFollower,
    targets: TargetSet,
    zones: ZoneCorrector,
}

impl<S: PathSearch> Navigator<S> {
    /// Build a navigator over the configured arena
    pub fn new(wheels: Wheels, config: &NavConfig, search: S) -> Self {
        let transform = config.field.transform();
        let positions = config.field.target_positions();
        let grid = FieldGrid::arena(&transform, &positions);

        info!(
            "Navigator ready: {}x{} grid, {} targets",
            transform.width,
            transform.height,
            positions.len()
        );

        Self {
            wheels: Arc::new(wheels),
            grid,
            transform,
            search,
            follower: PathFollower::default(),
            targets: TargetSet::new(positions),
            zones: ZoneCorrector::new(config.mission.reverted_side),
        }
    }

    /// Plan a path to `(x, y)` and drive it
    pub fn go_to(&self, x: f32, y: f32) -> Result<FollowEnd> {
        let pose = self.wheels.pose();
        let from = self.cell_at(pose.x.round(), pose.y.round())?;
        let to = self.cell_at(x, y)?;

        let steps = self
            .search
            .search(&self.grid, from, to)
            .ok_or(NavError::NoPath { from, to })?;
        info!("go_to ({:.1}, {:.1}): {} -> {} in {} steps", x, y, from, to, steps.len());

        self.follow_path(&steps)
    }

    /// Drive a step sequence under path-follower control
    pub fn follow_path(&self, steps: &[(i32, i32)]) -> Result<FollowEnd> {
        self.wheels.begin_autonav()?;
        let result = self.follower.follow(&self.wheels, steps);
        let ended = self.wheels.end_autonav();

        let end = result?;
        ended?;
        if end != FollowEnd::Completed {
            warn!("Path ended early: {:?}", end);
        }
        Ok(end)
    }

    /// Index of the closest uncaptured target
    pub fn nearest_target(&self) -> Option<usize> {
        self.targets.nearest(&self.wheels.pose())
    }

    pub fn target(&self, index: usize) -> Option<&Target> {
        self.targets.get(index)
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Mark a target captured by index
    pub fn mark_captured(&mut self, index: usize) -> Result<()> {
        self.targets.mark_captured(index)
    }

    /// Capture the target under the robot, if any
    ///
    /// The captured puck's cell is freed on the grid.
    pub fn capture_at_pose(&mut self) -> Option<usize> {
        let pose = self.wheels.pose();
        let cell = self.transform.to_cell(pose.x.round(), pose.y.round())?;
        let index = self.targets.mark_captured_at(cell, &self.transform)?;
        self.grid.set(cell, Cell::Free);
        info!("Captured target {} at {}", index, cell);
        Some(index)
    }

    /// Record a delivered puck in `cell`
    pub fn deliver(&mut self, cell: GridCell) -> Result<()> {
        if !self.grid.set(cell, Cell::Delivered) {
            let (x, y) = self.transform.to_world(cell);
            return Err(NavError::OutOfField { x, y });
        }
        debug!("Delivered at {}", cell);
        Ok(())
    }

    /// Record a delivered puck at the robot's position
    pub fn deliver_at_pose(&mut self) -> Result<GridCell> {
        let pose = self.wheels.pose();
        let cell = self.cell_at(pose.x.round(), pose.y.round())?;
        self.deliver(cell)?;
        Ok(cell)
    }

    /// Apply the zone correction for a sensed floor colour
    pub fn on_floor_color(&self, color: FloorColor) -> Result<()> {
        let fix = self.zones.fix(color);
        if !fix.is_empty() {
            debug!("Zone {:?} fix {:?}", color, fix);
            self.wheels.apply_fix(fix)?;
        }
        Ok(())
    }

    /// Stop and restart dead reckoning from the origin facing north
    pub fn recover(&self) -> Result<()> {
        warn!("Recovering: pose reset to origin");
        self.wheels.stop()?;
        self.wheels.wait_until_idle()?;
        self.wheels.reset_pose(0.0, 0.0, Heading::NORTH)?;
        Ok(())
    }

    pub fn pose(&self) -> Pose {
        self.wheels.pose()
    }

    /// Handle for stopping the robot from another thread (e.g. a signal handler)
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            running: Arc::new(AtomicBool::new(true)),
            drive: Arc::downgrade(&self.wheels),
        }
    }

    /// Shared handle to the drive
    pub fn wheels(&self) -> &Arc<Wheels> {
        &self.wheels
    }

    pub fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Stop the drive and join its odometry updater
    ///
    /// If other strong handles to the drive remain, it is shut down when the
    /// last one drops.
    pub fn shutdown(self) -> Result<()> {
        match Arc::try_unwrap(self.wheels) {
            Ok(mut wheels) => Ok(wheels.shutdown()?),
            Err(wheels) => {
                warn!(
                    "Drive still shared by {} handles, deferring shutdown",
                    Arc::strong_count(&wheels) - 1
                );
                Ok(())
            }
        }
    }

    fn cell_at(&self, x: f32, y: f32) -> Result<GridCell> {
        self.transform
            .to_cell(x, y)
            .ok_or(NavError::OutOfField { x, y })
    }
}

/// Requests a stop from outside the behaviour loop
///
/// Holds only a weak reference to the drive, so it never keeps the odometry
/// updater alive past [`Navigator::shutdown`].
#[derive(Debug, Clone)]
pub struct StopHandle {
    running: Arc<AtomicBool>,
    drive: Weak<Wheels>,
}

impl StopHandle {
    /// Clear the running flag and stop the wheels if the drive is still up
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(wheels) = self.drive.upgrade()
            && let Err(e) = wheels.stop()
        {
            warn!("Stop request failed: {}", e);
        }
    }

    /// False once a stop has been requested
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
