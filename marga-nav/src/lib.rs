//! MargaNav - Grid navigation for the puck-collecting robot
//!
//! Plans 8-connected paths over the arena grid and drives them through
//! [`chakra_drive::Wheels`], merging straight runs into single legs.
//!
//! ## Modules
//!
//! - [`grid`]: arena occupancy grid and world ↔ grid transform
//! - [`planning`]: path search (A*)
//! - [`follower`]: step sequence → rotate/translate legs
//! - [`targets`]: puck set and nearest-target selection
//! - [`zones`]: floor colour position fixes
//! - [`navigator`]: `go_to` and mission bookkeeping

pub mod config;
pub mod error;
pub mod follower;
pub mod grid;
pub mod navigator;
pub mod planning;
pub mod targets;
pub mod zones;

pub use config::{FieldConfig, MissionConfig, NavConfig};
pub use error::{NavError, Result};
pub use follower::{FollowEnd, Leg, PathFollower};
pub use grid::{Cell, FieldGrid, GridCell, GridTransform};
pub use navigator::{Navigator, StopHandle};
pub use planning::{AStarSearch, PathSearch};
pub use targets::{DEFAULT_PUCKS, Target, TargetSet};
pub use zones::{FloorColor, ZoneCorrector};
