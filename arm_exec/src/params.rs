//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ArmExecParams {
    /// Calibration file, relative to the software root unless absolute
    pub calibration_path: String,

    /// Real distance between the reference clicks of the calibration procedure
    ///
    /// Units: meters
    pub calib_reference_m: f64,

    /// Width of the camera frame
    ///
    /// Units: pixels
    pub frame_width_px: i32,

    /// Height of the camera frame
    ///
    /// Units: pixels
    pub frame_height_px: i32,

    /// Spacing of the calibration reference grid
    ///
    /// Units: pixels
    pub grid_step_px: i32,

    /// Number of grid lines either side of the origin
    pub grid_half_count: i32,
}
