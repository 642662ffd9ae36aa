//! # Arm library.
//!
//! This library allows other crates in the workspace to access items defined inside the arm
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - converts positioning commands into joint angles and servo demands
pub mod arm_ctrl;

/// Calibration - the camera to table mapping and arm geometry, and where they are stored
pub mod calib;

/// Coordinate transforms between camera pixels and the table
pub mod coord;

/// Executable parameters
pub mod params;
