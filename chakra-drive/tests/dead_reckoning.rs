//! Dead-reckoning behaviour of the drive against simulated wheels
//!
//! Ticks are shortened to 20 ms and the rate raised to 100 units/s, giving
//! 2 units per tick.

use approx::assert_relative_eq;
use chakra_drive::{
    Direction, DriveConfig, Heading, MotionKind, PositionFix, SimTacho, Span, TachoCommand,
    Wheels,
};
use std::f32::consts::FRAC_1_SQRT_2;
use std::thread;
use std::time::Duration;

/// Fast enough that in-place turns finish in well under 100 ms
const MAX_SPEED: i32 = 60_000;

const STEP: f32 = 2.0;

fn config() -> DriveConfig {
    DriveConfig {
        dist_per_sec: 100.0,
        odometry_tick_ms: 20,
        settle_ms: 10,
        idle_poll_ms: 5,
        ..DriveConfig::default()
    }
}

fn drive() -> (Wheels, SimTacho, SimTacho) {
    let left = SimTacho::new(MAX_SPEED);
    let right = SimTacho::new(MAX_SPEED);
    let wheels = Wheels::new(Box::new(left.clone()), Box::new(right.clone()), config()).unwrap();
    (wheels, left, right)
}

#[test]
fn test_startup_state() {
    let (wheels, left, right) = drive();
    let pose = wheels.pose();
    assert_eq!(pose.x, 0.0);
    assert_eq!(pose.y, 0.0);
    assert_eq!(pose.heading, Heading::NORTH);
    assert_eq!(pose.speed, 18_000);
    assert_eq!(wheels.command().kind, MotionKind::Stop);
    assert_eq!(left.ramp_down_sp(), 500);
    assert_eq!(right.speed_sp(), 18_000);
    assert!(!wheels.is_moving());
}

#[test]
fn test_cardinal_travel_reconciles_exactly() {
    let (wheels, _, _) = drive();

    wheels.travel(20.0).unwrap();
    wheels.wait_until_idle().unwrap();
    let pose = wheels.pose();
    assert_eq!(pose.x, 0.0);
    assert_eq!(pose.y, 20.0);

    wheels.rotate_to(Heading::EAST).unwrap();
    wheels.travel(7.0).unwrap();
    wheels.wait_until_idle().unwrap();
    let pose = wheels.pose();
    assert_eq!(pose.heading, Heading::EAST);
    assert_relative_eq!(pose.x, 7.0, epsilon = 1e-5);
    assert_relative_eq!(pose.y, 20.0, epsilon = 1e-5);
}

#[test]
fn test_diagonal_travel_splits_evenly() {
    let (wheels, _, _) = drive();

    wheels.rotate_to(Heading::SOUTH_WEST).unwrap();
    wheels.travel(14.14).unwrap();
    wheels.wait_until_idle().unwrap();

    let pose = wheels.pose();
    assert_eq!(pose.heading, Heading::SOUTH_WEST);
    assert_relative_eq!(pose.x, -14.14 * FRAC_1_SQRT_2, epsilon = 1e-4);
    assert_relative_eq!(pose.y, -14.14 * FRAC_1_SQRT_2, epsilon = 1e-4);
    assert_relative_eq!(pose.x.hypot(pose.y), 14.14, epsilon = 1e-4);
}

#[test]
fn test_backward_travel_reverses_wheels() {
    let (wheels, left, right) = drive();

    wheels.travel(-10.0).unwrap();
    assert_eq!(left.speed_sp(), -18_000);
    assert_eq!(right.speed_sp(), -18_000);
    assert_eq!(wheels.command().kind, MotionKind::TranslateBackward);

    wheels.wait_until_idle().unwrap();
    let pose = wheels.pose();
    assert_relative_eq!(pose.y, -10.0, epsilon = 1e-5);
    assert_eq!(pose.speed, -18_000);

    // Forward again restores a positive setpoint
    wheels.travel(10.0).unwrap();
    assert_eq!(left.speed_sp(), 18_000);
    wheels.wait_until_idle().unwrap();
    assert_relative_eq!(wheels.pose().y, 0.0, epsilon = 1e-5);
}

#[test]
fn test_timed_run_uses_calibrated_time() {
    let (wheels, left, _) = drive();

    wheels.travel(20.0).unwrap();
    assert_eq!(left.time_sp(), 194);
    assert_eq!(left.last_command(), Some(TachoCommand::RunTimed));
    let command = wheels.command();
    assert_eq!(command.distance, 20.0);
    assert_eq!(command.duration_ms, 194);
    wheels.wait_until_idle().unwrap();

    wheels.run_timed(Duration::from_millis(150)).unwrap();
    assert_eq!(left.time_sp(), 150);
    wheels.wait_until_idle().unwrap();
    assert_relative_eq!(wheels.pose().y, 35.0, epsilon = 1e-4);
}

#[test]
fn test_is_moving_tracks_actuation() {
    let (wheels, _, _) = drive();
    assert!(!wheels.is_moving());

    wheels.travel(20.0).unwrap();
    assert!(wheels.is_moving());

    wheels.wait_until_idle().unwrap();
    assert!(!wheels.is_moving());
}

#[test]
fn test_rotate_to_twice_is_noop() {
    let (wheels, left, _) = drive();

    wheels.rotate_to(Heading::EAST).unwrap();
    wheels.rotate_to(Heading::EAST).unwrap();
    wheels.wait_until_idle().unwrap();

    assert_eq!(left.count(TachoCommand::RunToRelPos), 1);
    assert_eq!(wheels.pose().heading, Heading::EAST);
}

#[test]
fn test_rotate_to_takes_shorter_way() {
    let (wheels, left, _) = drive();

    wheels.rotate_to(Heading::WEST).unwrap();
    assert_eq!(left.position_sp(), -190);
    assert_eq!(wheels.command().angle, -90);

    wheels.rotate_to(Heading::NORTH_WEST).unwrap();
    assert_eq!(left.position_sp(), 95);
    wheels.wait_until_idle().unwrap();
    assert_eq!(wheels.pose().heading, Heading::NORTH_WEST);
}

#[test]
fn test_rotation_restores_speed() {
    let (wheels, left, right) = drive();

    wheels.rotate_by(90).unwrap();
    assert_eq!(left.position_sp(), 190);
    assert_eq!(right.position_sp(), -190);
    // Turn ran at max/6, then the drive speed was put back
    assert_eq!(left.speed_sp(), 18_000);
    assert_eq!(wheels.pose().speed, 18_000);
    wheels.wait_until_idle().unwrap();
}

#[test]
fn test_rotation_heading_is_quantized() {
    let (wheels, _, _) = drive();

    wheels.rotate_by(30).unwrap();
    wheels.wait_until_idle().unwrap();
    assert_eq!(wheels.pose().heading, Heading::NORTH_EAST);

    wheels.rotate(-135).unwrap();
    wheels.wait_until_idle().unwrap();
    assert_eq!(wheels.pose().heading, Heading::WEST);

    wheels.rotate_by(360).unwrap();
    wheels.wait_until_idle().unwrap();
    assert_eq!(wheels.pose().heading, Heading::WEST);
}

#[test]
fn test_settle_rule_serializes_motions() {
    let (wheels, left, right) = drive();

    wheels.travel(20.0).unwrap();
    // Blocks until the first run has finished and settled
    wheels.travel(20.0).unwrap();
    wheels.wait_until_idle().unwrap();

    assert_relative_eq!(wheels.pose().y, 40.0, epsilon = 1e-5);
    let history = left.history();
    let runs: Vec<usize> = history
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == TachoCommand::RunTimed)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(runs.len(), 2);
    assert!(history[runs[0]..runs[1]].contains(&TachoCommand::Stop));
    assert_eq!(right.count(TachoCommand::RunTimed), 2);
}

#[test]
fn test_stop_commits_elapsed_distance() {
    let (wheels, _, _) = drive();

    wheels.travel(100.0).unwrap();
    thread::sleep(Duration::from_millis(110));
    wheels.stop().unwrap();
    wheels.wait_until_idle().unwrap();

    let y = wheels.pose().y;
    assert!(y > 0.0, "no distance committed");
    assert!(y < 100.0, "requested distance committed: {}", y);
    // Whole ticks only
    assert_eq!(y % STEP, 0.0);
    assert_eq!(wheels.command().kind, MotionKind::Stop);
    assert!(!wheels.command().dirty);
}

/// 200 ms ticks at 100 units/s: 20 units per tick
fn slow_tick_drive() -> Wheels {
    let config = DriveConfig {
        odometry_tick_ms: 200,
        ..config()
    };
    let left = SimTacho::new(MAX_SPEED);
    let right = SimTacho::new(MAX_SPEED);
    Wheels::new(Box::new(left), Box::new(right), config).unwrap()
}

#[test]
fn test_immediate_stop_commits_nothing() {
    let wheels = slow_tick_drive();

    wheels.travel(100.0).unwrap();
    thread::sleep(Duration::from_millis(5));
    wheels.stop().unwrap();
    wheels.wait_until_idle().unwrap();

    assert_eq!(wheels.pose().y, 0.0);
}

#[test]
fn test_stop_rounds_to_nearest_tick() {
    let wheels = slow_tick_drive();

    // 130 ms into the first tick is closer to its end than its start
    wheels.travel(100.0).unwrap();
    thread::sleep(Duration::from_millis(130));
    wheels.stop().unwrap();
    wheels.wait_until_idle().unwrap();

    assert_eq!(wheels.pose().y, 20.0);
}

#[test]
fn test_stop_while_settling_drops_pending_command() {
    let config = DriveConfig {
        settle_ms: 200,
        ..config()
    };
    let left = SimTacho::new(MAX_SPEED);
    let right = SimTacho::new(MAX_SPEED);
    let wheels = Wheels::new(Box::new(left.clone()), Box::new(right), config).unwrap();

    wheels.rotate_by(90).unwrap();
    thread::scope(|s| {
        // Blocks in the settle pause after the turn
        let pending = s.spawn(|| wheels.travel(30.0));
        thread::sleep(Duration::from_millis(60));
        wheels.stop().unwrap();
        pending.join().unwrap().unwrap();
    });
    wheels.wait_until_idle().unwrap();

    assert_eq!(left.count(TachoCommand::RunTimed), 0);
    assert_eq!(wheels.command().kind, MotionKind::Stop);
    let pose = wheels.pose();
    assert_eq!((pose.x, pose.y), (0.0, 0.0));
    assert_eq!(pose.heading, Heading::EAST);

    // The next request goes through
    wheels.travel(10.0).unwrap();
    wheels.wait_until_idle().unwrap();
    assert_eq!(wheels.pose().x, 10.0);
}

#[test]
fn test_indefinite_run_until_stopped() {
    let (wheels, left, _) = drive();

    wheels.run_forever().unwrap();
    assert_eq!(left.last_command(), Some(TachoCommand::RunForever));
    thread::sleep(Duration::from_millis(70));
    assert!(wheels.is_moving());

    // Still moving, so an absolute turn is ignored
    wheels.rotate_to(Heading::EAST).unwrap();
    assert_eq!(left.count(TachoCommand::RunToRelPos), 0);

    wheels.stop().unwrap();
    wheels.wait_until_idle().unwrap();
    let pose = wheels.pose();
    assert_eq!(pose.heading, Heading::NORTH);
    assert!(pose.y >= STEP);
    assert_eq!(pose.y % STEP, 0.0);
}

#[test]
fn test_new_translation_preempts_indefinite_run() {
    let (wheels, _, _) = drive();

    wheels.translate(Direction::Forward, Span::Indefinite).unwrap();
    thread::sleep(Duration::from_millis(50));
    wheels.translate(Direction::Backward, Span::Distance(10.0)).unwrap();
    wheels.wait_until_idle().unwrap();

    // Elapsed forward ticks, then exactly 10 back
    let y = wheels.pose().y;
    assert_relative_eq!((y + 10.0) % STEP, 0.0, epsilon = 1e-4);
    assert!(y + 10.0 >= STEP);
}

#[test]
fn test_empty_translations_do_nothing() {
    let (wheels, left, _) = drive();

    wheels.travel(0.0).unwrap();
    wheels
        .translate(Direction::Forward, Span::Duration(Duration::ZERO))
        .unwrap();
    wheels
        .translate(Direction::Backward, Span::Distance(-5.0))
        .unwrap();

    assert!(left.history().is_empty());
    assert_eq!(wheels.command().kind, MotionKind::Stop);
}

#[test]
fn test_position_corrections() {
    let (wheels, _, _) = drive();

    wheels
        .apply_fix(PositionFix {
            x: Some(-50.0),
            y: None,
        })
        .unwrap();
    let pose = wheels.pose();
    assert_eq!((pose.x, pose.y), (-50.0, 0.0));

    wheels.reset_pose(10.0, 20.0, Heading::SOUTH).unwrap();
    let pose = wheels.pose();
    assert_eq!((pose.x, pose.y, pose.heading), (10.0, 20.0, Heading::SOUTH));

    wheels.travel(10.0).unwrap();
    wheels.wait_until_idle().unwrap();
    assert_relative_eq!(wheels.pose().y, 10.0, epsilon = 1e-5);
}

#[test]
fn test_drop_while_running_joins_worker() {
    let (wheels, left, _) = drive();
    wheels.run_forever().unwrap();
    thread::sleep(Duration::from_millis(30));

    drop(wheels);
    assert_eq!(left.last_command(), Some(TachoCommand::Stop));
}
