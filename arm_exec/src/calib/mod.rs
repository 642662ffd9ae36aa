//! Camera to table calibration module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod procedure;
mod profile;
mod store;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use procedure::*;
pub use profile::*;
pub use store::*;

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while handling calibration data.
#[derive(Debug, thiserror::Error)]
pub enum CalibError {
    #[error("Invalid calibration: {field} {reason}")]
    ConfigInvalid {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Cannot read the calibration file {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("Cannot parse the calibration file {0:?}: {1}")]
    ParseError(PathBuf, serde_json::Error),

    #[error("Cannot serialise the calibration profile: {0}")]
    SerialiseError(serde_json::Error),

    #[error("Cannot write the calibration file {0:?}: {1}")]
    WriteError(PathBuf, std::io::Error),
}
