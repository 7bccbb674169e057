//! Pose estimate and compass heading

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;
use std::fmt;

/// Compass heading quantized to 45° steps
///
/// 0° faces +y (north), 90° faces +x (east). The stored value is always one
/// of 0, 45, ..., 315.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Heading(u16);

impl Heading {
    pub const NORTH: Heading = Heading(0);
    pub const NORTH_EAST: Heading = Heading(45);
    pub const EAST: Heading = Heading(90);
    pub const SOUTH_EAST: Heading = Heading(135);
    pub const SOUTH: Heading = Heading(180);
    pub const SOUTH_WEST: Heading = Heading(225);
    pub const WEST: Heading = Heading(270);
    pub const NORTH_WEST: Heading = Heading(315);

    /// Build a heading from any angle in degrees
    ///
    /// Wraps into [0, 360) and snaps to the nearest 45° direction.
    pub fn from_degrees(degrees: i32) -> Self {
        let wrapped = degrees.rem_euclid(360);
        Heading((((wrapped + 22) / 45 * 45) % 360) as u16)
    }

    /// Heading in degrees, in [0, 360)
    #[inline]
    pub fn degrees(self) -> i32 {
        self.0 as i32
    }

    /// True for north, east, south and west
    #[inline]
    pub fn is_cardinal(self) -> bool {
        self.0 % 90 == 0
    }

    /// Heading after turning by `angle` degrees (positive = clockwise)
    ///
    /// The turn is first snapped with [`quantize_turn`].
    pub fn rotated(self, angle: i32) -> Self {
        Heading::from_degrees(self.degrees() + quantize_turn(angle))
    }

    /// Signed shortest turn from this heading to `target`, in [-180, 180)
    pub fn delta_to(self, target: Heading) -> i32 {
        (target.degrees() - self.degrees() + 180).rem_euclid(360) - 180
    }

    /// Unit displacement for one unit of travel along this heading
    ///
    /// Diagonal headings split the unit equally across both axes.
    pub fn unit_vector(self) -> (f32, f32) {
        match self.0 {
            0 => (0.0, 1.0),
            45 => (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            90 => (1.0, 0.0),
            135 => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            180 => (0.0, -1.0),
            225 => (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
            270 => (-1.0, 0.0),
            _ => (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
        }
    }
}

impl From<i32> for Heading {
    fn from(degrees: i32) -> Self {
        Heading::from_degrees(degrees)
    }
}

impl From<Heading> for i32 {
    fn from(heading: Heading) -> Self {
        heading.degrees()
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Snap a signed turn to what the coarse turn profiles physically perform
///
/// Anything in (0, 45] is a mid-turn of 45°; other angles round to the
/// nearest multiple of 45°.
pub fn quantize_turn(angle: i32) -> i32 {
    let magnitude = angle.abs();
    let snapped = if magnitude > 0 && magnitude <= 45 {
        45
    } else {
        ((magnitude + 22) / 45) * 45
    };
    snapped * angle.signum()
}

/// Dead-reckoning estimate of the robot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// East-west position in field units
    pub x: f32,
    /// North-south position in field units
    pub y: f32,
    /// Quantized compass heading
    pub heading: Heading,
    /// Current commanded wheel speed (tacho counts/s, negative when reversing)
    pub speed: i32,
    /// Robot is under path-follower control
    pub autonav: bool,
}

impl Pose {
    /// Pose at `(x, y)` facing `heading`
    pub fn new(x: f32, y: f32, heading: Heading) -> Self {
        Self {
            x,
            y,
            heading,
            ..Self::default()
        }
    }

    /// Position after travelling `distance` along `heading` from `(x, y)`
    pub fn offset(x: f32, y: f32, heading: Heading, distance: f32) -> (f32, f32) {
        let (ux, uy) = heading.unit_vector();
        (x + ux * distance, y + uy * distance)
    }

    /// Euclidean distance to a point
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// Absolute position correction from an external reference (e.g. a floor zone)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionFix {
    pub x: Option<f32>,
    pub y: Option<f32>,
}

impl PositionFix {
    /// True when the fix changes nothing
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}
