//! Configuration loading for MargaNav

use crate::error::Result;
use crate::grid::GridTransform;
use crate::targets::DEFAULT_PUCKS;
use chakra_drive::{DriveConfig, Heading};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NavConfig {
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub field: FieldConfig,
    #[serde(default)]
    pub mission: MissionConfig,
}

/// Arena geometry
#[derive(Clone, Debug, Deserialize)]
pub struct FieldConfig {
    /// Side of one grid cell in field units (default: 10)
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,

    /// Grid columns (default: 19)
    #[serde(default = "default_width")]
    pub width: usize,

    /// Grid rows (default: 27)
    #[serde(default = "default_height")]
    pub height: usize,

    /// Column containing x = 0, also the delivery gap (default: 9)
    #[serde(default = "default_origin_column")]
    pub origin_column: i32,

    /// Row containing y = 0 (default: 26)
    #[serde(default = "default_origin_row")]
    pub origin_row: i32,

    /// Puck positions as `[x, y]` pairs
    #[serde(default = "default_targets")]
    pub targets: Vec<[f32; 2]>,
}

/// Demo mission settings
#[derive(Clone, Debug, Deserialize)]
pub struct MissionConfig {
    /// Starting x after the opening run (default: -10)
    #[serde(default = "default_start_x")]
    pub start_x: f32,

    /// Starting y after the opening run (default: 250)
    #[serde(default = "default_start_y")]
    pub start_y: f32,

    /// Starting heading in degrees (default: 180, facing into the field)
    #[serde(default = "default_start_heading")]
    pub start_heading: i32,

    /// Robot starts on the mirrored side of the arena
    #[serde(default)]
    pub reverted_side: bool,

    /// y coordinate of the delivery line (default: 240)
    #[serde(default = "default_delivery_y")]
    pub delivery_y: f32,

    /// Rated speed of the simulated wheels (default: 1050)
    #[serde(default = "default_sim_max_speed")]
    pub sim_max_speed: i32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            width: default_width(),
            height: default_height(),
            origin_column: default_origin_column(),
            origin_row: default_origin_row(),
            targets: default_targets(),
        }
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            start_x: default_start_x(),
            start_y: default_start_y(),
            start_heading: default_start_heading(),
            reverted_side: false,
            delivery_y: default_delivery_y(),
            sim_max_speed: default_sim_max_speed(),
        }
    }
}

impl FieldConfig {
    /// World ↔ grid transform for this arena
    pub fn transform(&self) -> GridTransform {
        GridTransform {
            cell_size: self.cell_size,
            origin_column: self.origin_column,
            origin_row: self.origin_row,
            width: self.width,
            height: self.height,
        }
    }

    /// Puck positions as tuples
    pub fn target_positions(&self) -> Vec<(f32, f32)> {
        self.targets.iter().map(|[x, y]| (*x, *y)).collect()
    }
}

impl MissionConfig {
    pub fn start_heading(&self) -> Heading {
        Heading::from_degrees(self.start_heading)
    }
}

impl NavConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// Default value functions
fn default_cell_size() -> f32 {
    10.0
}
fn default_width() -> usize {
    19
}
fn default_height() -> usize {
    27
}
fn default_origin_column() -> i32 {
    9
}
fn default_origin_row() -> i32 {
    26
}
fn default_targets() -> Vec<[f32; 2]> {
    DEFAULT_PUCKS.iter().map(|&(x, y)| [x, y]).collect()
}

// Mission defaults
fn default_start_x() -> f32 {
    -10.0
}
fn default_start_y() -> f32 {
    250.0
}
fn default_start_heading() -> i32 {
    180
}
fn default_delivery_y() -> f32 {
    240.0
}
fn default_sim_max_speed() -> i32 {
    1050
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_arena() {
        let config = NavConfig::default();
        assert_eq!(config.field.transform(), GridTransform::default());
        assert_eq!(config.field.target_positions(), DEFAULT_PUCKS.to_vec());
        assert_eq!(config.mission.start_heading(), Heading::SOUTH);
        assert_eq!(config.drive.odometry_tick_ms, 500);
    }

    #[test]
    fn test_partial_toml() {
        let config = NavConfig::from_toml_str(
            r#"
[drive]
odometry_tick_ms = 50
dist_per_sec = 80.0

[field]
targets = [[0.0, 60.0], [50.0, 60.0]]

[mission]
reverted_side = true
"#,
        )
        .unwrap();

        assert_eq!(config.drive.odometry_tick_ms, 50);
        assert_eq!(config.drive.settle_ms, 500);
        assert_eq!(config.field.targets.len(), 2);
        assert_eq!(config.field.width, 19);
        assert!(config.mission.reverted_side);
        assert_eq!(config.mission.start_y, 250.0);
    }

    #[test]
    fn test_bad_toml() {
        let err = NavConfig::from_toml_str("[field]\nwidth = -3").unwrap_err();
        assert!(matches!(err, crate::NavError::Config(_)));
    }
}
