//! # Telecommand module
//!
//! Commands arrive either from the command line (parsed with `structopt`) or from the external
//! command interpreter as JSON.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod arm_ctrl;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use arm_ctrl::ArmCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing a telecommand.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("The telecommand is not valid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Parse an arm command from a JSON packet.
///
/// Packets use serde's externally tagged enum layout, for example
/// `{"Table": {"x_m": 0.15, "y_m": 0.0, "z_m": 0.02}}`.
pub fn from_json(json_str: &str) -> Result<ArmCmd, TcParseError> {
    serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
}
