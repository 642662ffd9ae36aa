//! # Arm control telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::{clap::AppSettings, StructOpt};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Height of the grabbing point above the table when a command doesn't give one.
///
/// Units: meters
pub const DEFAULT_GRAB_HEIGHT_M: f64 = 0.02;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A positioning command that can be completed by arm control.
///
/// Every command is solved in a single shot, there is no motion planning between commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
pub enum ArmCmd {
    /// Reach the table point under a pixel reported by the object detector.
    #[structopt(name = "px", setting = AppSettings::AllowNegativeNumbers)]
    Pixel {
        /// Pixel column of the object centroid.
        cx: i32,

        /// Pixel row of the object centroid.
        cy: i32,

        /// Height of the grabbing point above the table in meters.
        #[structopt(long, default_value = "0.02")]
        #[serde(default = "default_grab_height_m")]
        z_m: f64,
    },

    /// Reach a point given directly in table coordinates.
    #[structopt(name = "ik", setting = AppSettings::AllowNegativeNumbers)]
    Table {
        /// Table X coordinate in meters, positive to the right.
        x_m: f64,

        /// Table Y coordinate in meters, positive forward.
        y_m: f64,

        /// Height of the grabbing point above the table in meters.
        #[structopt(long, default_value = "0.02")]
        #[serde(default = "default_grab_height_m")]
        z_m: f64,
    },

    /// Pick the object under a pixel and place it at an offset from where it was found.
    ///
    /// Produces two independent solutions, one for the pick point and one for the place point.
    #[structopt(name = "pick", setting = AppSettings::AllowNegativeNumbers)]
    PickPlace {
        /// Pixel column of the object centroid.
        cx: i32,

        /// Pixel row of the object centroid.
        cy: i32,

        /// Place offset along table X in meters.
        dx_m: f64,

        /// Place offset along table Y in meters.
        dy_m: f64,

        /// Height of the grabbing point above the table in meters.
        #[structopt(long, default_value = "0.02")]
        #[serde(default = "default_grab_height_m")]
        z_m: f64,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmCmd {
    /// Returns the name of the first non-finite numeric field, if any.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        let fields: Vec<(&'static str, f64)> = match self {
            ArmCmd::Pixel { z_m, .. } => vec![("z_m", *z_m)],
            ArmCmd::Table { x_m, y_m, z_m } => vec![("x_m", *x_m), ("y_m", *y_m), ("z_m", *z_m)],
            ArmCmd::PickPlace {
                dx_m, dy_m, z_m, ..
            } => vec![("dx_m", *dx_m), ("dy_m", *dy_m), ("z_m", *z_m)],
        };

        fields
            .into_iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(n, _)| n)
    }
}

fn default_grab_height_m() -> f64 {
    DEFAULT_GRAB_HEIGHT_M
}
