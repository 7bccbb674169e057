//! Simulated tacho motor for testing and the demo mission
//!
//! Motion is modelled lazily: a run command records when it will finish and
//! `state_flags()` compares that against the clock. Clones share state, so a
//! test can keep a handle while the wheel pair owns the motor.

use crate::drivers::{StateFlags, TachoCommand, TachoMotor};
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Simulated tacho motor
#[derive(Clone)]
pub struct SimTacho {
    state: Arc<Mutex<SimState>>,
}

#[derive(Debug)]
struct SimState {
    max_speed: i32,
    speed_sp: i32,
    position_sp: i32,
    time_sp: u64,
    ramp_down_sp: u32,
    run: Run,
    history: Vec<TachoCommand>,
}

#[derive(Debug, Clone, Copy)]
enum Run {
    Idle,
    Forever,
    Until(Instant),
}

impl SimTacho {
    /// Create a simulated motor rated at `max_speed` counts per second
    pub fn new(max_speed: i32) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                max_speed,
                speed_sp: 0,
                position_sp: 0,
                time_sp: 0,
                ramp_down_sp: 0,
                run: Run::Idle,
                history: Vec::new(),
            })),
        }
    }

    /// Current speed setpoint
    pub fn speed_sp(&self) -> i32 {
        self.state.lock().speed_sp
    }

    /// Current relative position setpoint
    pub fn position_sp(&self) -> i32 {
        self.state.lock().position_sp
    }

    /// Current run time setpoint in milliseconds
    pub fn time_sp(&self) -> u64 {
        self.state.lock().time_sp
    }

    /// Current ramp-down setpoint in milliseconds
    pub fn ramp_down_sp(&self) -> u32 {
        self.state.lock().ramp_down_sp
    }

    /// Every command sent so far, oldest first
    pub fn history(&self) -> Vec<TachoCommand> {
        self.state.lock().history.clone()
    }

    /// Most recent command
    pub fn last_command(&self) -> Option<TachoCommand> {
        self.state.lock().history.last().copied()
    }

    /// Number of times `command` was sent
    pub fn count(&self, command: TachoCommand) -> usize {
        self.state
            .lock()
            .history
            .iter()
            .filter(|c| **c == command)
            .count()
    }
}

impl SimState {
    fn rel_pos_duration(&self) -> Duration {
        if self.speed_sp == 0 {
            return Duration::ZERO;
        }
        let secs = self.position_sp.unsigned_abs() as f64 / self.speed_sp.unsigned_abs() as f64;
        Duration::from_secs_f64(secs)
    }
}

impl TachoMotor for SimTacho {
    fn set_speed_sp(&mut self, speed: i32) -> Result<()> {
        self.state.lock().speed_sp = speed;
        Ok(())
    }

    fn set_position_sp(&mut self, position: i32) -> Result<()> {
        self.state.lock().position_sp = position;
        Ok(())
    }

    fn set_time_sp(&mut self, ms: u64) -> Result<()> {
        self.state.lock().time_sp = ms;
        Ok(())
    }

    fn set_ramp_down_sp(&mut self, ms: u32) -> Result<()> {
        self.state.lock().ramp_down_sp = ms;
        Ok(())
    }

    fn send(&mut self, command: TachoCommand) -> Result<()> {
        let mut state = self.state.lock();
        let now = Instant::now();
        state.run = match command {
            TachoCommand::RunForever => Run::Forever,
            TachoCommand::RunTimed => Run::Until(now + Duration::from_millis(state.time_sp)),
            TachoCommand::RunToRelPos => Run::Until(now + state.rel_pos_duration()),
            TachoCommand::Stop => Run::Idle,
        };
        state.history.push(command);
        Ok(())
    }

    fn state_flags(&self) -> Result<StateFlags> {
        let state = self.state.lock();
        let running = match state.run {
            Run::Idle => false,
            Run::Forever => true,
            Run::Until(end) => Instant::now() < end,
        };
        Ok(if running {
            StateFlags::RUNNING
        } else {
            StateFlags::empty()
        })
    }

    fn max_speed(&self) -> Result<i32> {
        Ok(self.state.lock().max_speed)
    }
}
