//! # Coordinate types
//!
//! Pixel points come from the object detector in image coordinates. Table points are in the arm
//! frame on the work surface: X positive to the right, Y positive forward, origin fixed by the
//! calibration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A point in image coordinates.
///
/// Units: pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// A point on the table.
///
/// Units: meters
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TablePoint {
    pub x_m: f64,
    pub y_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl TablePoint {
    pub fn new(x_m: f64, y_m: f64) -> Self {
        Self { x_m, y_m }
    }

    /// Return this point shifted by a relative offset.
    pub fn offset(&self, dx_m: f64, dy_m: f64) -> Self {
        Self {
            x_m: self.x_m + dx_m,
            y_m: self.y_m + dy_m,
        }
    }
}

impl From<(i32, i32)> for PixelPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_offset() {
        let p = TablePoint::new(0.15, 0.0).offset(-0.03, 0.05);
        assert!((p.x_m - 0.12).abs() < 1e-12);
        assert!((p.y_m - 0.05).abs() < 1e-12);
    }
}
