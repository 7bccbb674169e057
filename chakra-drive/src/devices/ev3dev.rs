//! ev3dev `tacho-motor` class driver
//!
//! Each motor is a directory of text attributes under
//! `/sys/class/tacho-motor/motorN`. Setpoints are written as decimal text;
//! `state` is a space separated flag list, empty when the motor is idle.

use crate::drivers::{StateFlags, TachoCommand, TachoMotor};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Default sysfs class directory for tacho motors
pub const TACHO_CLASS_DIR: &str = "/sys/class/tacho-motor";

/// Tacho motor addressed through sysfs
#[derive(Debug, Clone)]
pub struct SysfsTacho {
    path: PathBuf,
    port: String,
}

impl SysfsTacho {
    /// Find the motor plugged into `port` (e.g. "ev3-ports:outA") under `root`
    pub fn find<P: AsRef<Path>>(root: P, port: &str) -> Result<Self> {
        let root = root.as_ref();
        let entries =
            fs::read_dir(root).map_err(|_| Error::ActuatorNotFound(port.to_string()))?;

        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with("motor"))
            })
            .collect();
        candidates.sort();

        for path in candidates {
            let Ok(address) = fs::read_to_string(path.join("address")) else {
                continue;
            };
            if address.trim() == port {
                log::info!("ChakraDrive: Found tacho motor on {} at {}", port, path.display());
                return Ok(Self {
                    path,
                    port: port.to_string(),
                });
            }
        }

        Err(Error::ActuatorNotFound(port.to_string()))
    }

    /// Find the motor on `port` under the default class directory
    pub fn on_port(port: &str) -> Result<Self> {
        Self::find(TACHO_CLASS_DIR, port)
    }

    /// Port address this motor answered on
    pub fn port(&self) -> &str {
        &self.port
    }

    fn write_attr(&self, attribute: &str, value: &str) -> Result<()> {
        fs::write(self.path.join(attribute), value)?;
        Ok(())
    }

    fn read_attr(&self, attribute: &str) -> Result<String> {
        Ok(fs::read_to_string(self.path.join(attribute))?)
    }
}

impl TachoMotor for SysfsTacho {
    fn set_speed_sp(&mut self, speed: i32) -> Result<()> {
        self.write_attr("speed_sp", &speed.to_string())
    }

    fn set_position_sp(&mut self, position: i32) -> Result<()> {
        self.write_attr("position_sp", &position.to_string())
    }

    fn set_time_sp(&mut self, ms: u64) -> Result<()> {
        self.write_attr("time_sp", &ms.to_string())
    }

    fn set_ramp_down_sp(&mut self, ms: u32) -> Result<()> {
        self.write_attr("ramp_down_sp", &ms.to_string())
    }

    fn send(&mut self, command: TachoCommand) -> Result<()> {
        self.write_attr("command", command.as_str())
    }

    fn state_flags(&self) -> Result<StateFlags> {
        Ok(StateFlags::parse(&self.read_attr("state")?))
    }

    fn max_speed(&self) -> Result<i32> {
        let raw = self.read_attr("max_speed")?;
        raw.trim().parse().map_err(|_| Error::InvalidAttribute {
            attribute: "max_speed",
            value: raw.trim().to_string(),
        })
    }
}
