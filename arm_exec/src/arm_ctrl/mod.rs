//! Arm control module
//!
//! Turns positioning commands into joint angles and servo demands. Every
//! command is solved in one shot against a single calibration snapshot.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod arm_config;
mod inverse_kinematics;
mod servo_map;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use arm_config::*;
pub use inverse_kinematics::*;
pub use servo_map::*;
pub use state::*;

use crate::calib::CalibError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("ArmCtrl has not been initialised with a calibration store")]
    NotInitialised,

    #[error("Recieved an invalid arm command, {0} is not finite")]
    InvalidArmCmd(&'static str),

    #[error("Target {0} is not finite or is far outside any reachable space")]
    InvalidTarget(&'static str),

    #[error("Calibration error: {0}")]
    Calib(#[from] CalibError),
}
