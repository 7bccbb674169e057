//! Floor colour zones used as absolute position references
//!
//! The arena floor carries coloured lines at known positions. Crossing one
//! pins a single coordinate of the dead-reckoned pose.

use chakra_drive::PositionFix;

/// Colour reported by the floor-facing colour sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorColor {
    Unknown,
    Black,
    Blue,
    Green,
    Yellow,
    Red,
    White,
    Brown,
}

impl FloorColor {
    /// Decode the sensor's colour index (0 = none, 1 = black, ... 7 = brown)
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Self::Black,
            2 => Self::Blue,
            3 => Self::Green,
            4 => Self::Yellow,
            5 => Self::Red,
            6 => Self::White,
            7 => Self::Brown,
            _ => Self::Unknown,
        }
    }
}

/// Maps floor colours to position fixes for one side of the arena
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCorrector {
    side: f32,
}

impl ZoneCorrector {
    /// `reverted` selects the mirrored starting side
    pub fn new(reverted: bool) -> Self {
        Self {
            side: if reverted { -1.0 } else { 1.0 },
        }
    }

    pub fn is_reverted(&self) -> bool {
        self.side < 0.0
    }

    /// Position fix implied by standing on `color`
    pub fn fix(&self, color: FloorColor) -> PositionFix {
        let reverted = self.is_reverted();
        match color {
            FloorColor::Yellow => PositionFix {
                x: Some(-50.0 * self.side),
                y: None,
            },
            FloorColor::Red => PositionFix {
                x: Some(50.0 * self.side),
                y: None,
            },
            FloorColor::Blue => PositionFix {
                x: None,
                y: Some(if reverted { 180.0 } else { 60.0 }),
            },
            FloorColor::Green => PositionFix {
                x: None,
                y: Some(if reverted { 60.0 } else { 180.0 }),
            },
            FloorColor::White => PositionFix {
                x: None,
                y: Some(240.0),
            },
            FloorColor::Unknown | FloorColor::Black | FloorColor::Brown => PositionFix::default(),
        }
    }
}
