//! MargaNav demo mission
//!
//! Runs the puck-collecting mission against simulated wheels: pick the
//! nearest uncaptured puck, drive to it, push it to the delivery line,
//! repeat until the field is empty or Ctrl-C is pressed.

use chakra_drive::{Heading, Wheels};
use clap::Parser;
use marga_nav::{AStarSearch, NavConfig, NavError, Navigator, Result, StopHandle};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Grid navigation demo for the puck-collecting robot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marga_nav=info,chakra_drive=info")),
        )
        .init();

    let args = Args::parse();

    info!("MargaNav v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            NavConfig::load(path)?
        }
        None => {
            info!("Using default configuration");
            NavConfig::default()
        }
    };

    let wheels = Wheels::simulated(config.mission.sim_max_speed, config.drive.clone())?;
    wheels.reset_pose(
        config.mission.start_x,
        config.mission.start_y,
        config.mission.start_heading(),
    )?;

    let mut navigator = Navigator::new(wheels, &config, AStarSearch::default());

    let stop = navigator.stop_handle();
    let handler = stop.clone();
    ctrlc::set_handler(move || {
        info!("Interrupted, stopping");
        handler.request_stop();
    })?;

    let delivered = run_mission(&mut navigator, &config, &stop)?;

    info!(
        "Mission finished: {} delivered, {} remaining",
        delivered,
        navigator.targets().remaining()
    );
    navigator.shutdown()?;
    Ok(())
}

/// Collect pucks until none remain or a stop is requested
fn run_mission(navigator: &mut Navigator, config: &NavConfig, stop: &StopHandle) -> Result<usize> {
    let mut delivered = 0;

    while stop.is_running() {
        let Some(index) = navigator.nearest_target() else {
            info!("All targets captured");
            break;
        };
        let Some(target) = navigator.target(index).copied() else {
            break;
        };
        info!("Heading for target {} at ({:.0}, {:.0})", index, target.x, target.y);

        match navigator.go_to(target.x, target.y) {
            Ok(_) => {}
            Err(NavError::NoPath { from, to }) => {
                warn!("Target {} unreachable ({} -> {}), skipping", index, from, to);
                navigator.mark_captured(index)?;
                continue;
            }
            Err(e) => return Err(e),
        }
        navigator.wheels().wait_until_idle()?;
        if !stop.is_running() {
            break;
        }

        if navigator.capture_at_pose().is_none() {
            let pose = navigator.pose();
            warn!(
                "No target under ({:.1}, {:.1}), marking {} captured",
                pose.x, pose.y, index
            );
            navigator.mark_captured(index)?;
        }

        let pose = navigator.pose();
        navigator.go_to(pose.x.round(), config.mission.delivery_y)?;
        navigator.wheels().wait_until_idle()?;
        if !stop.is_running() {
            break;
        }

        let cell = navigator.deliver_at_pose()?;
        delivered += 1;
        info!("Delivered target {} at {}", index, cell);

        // Face back into the field for the next search
        navigator.wheels().rotate_to(Heading::SOUTH)?;
        navigator.wheels().wait_until_idle()?;
    }

    Ok(delivered)
}
