//! Arm Configuration structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use arm_if::{
    eqpt::arm::{ActId, ServoCommand, NUM_ARM_JOINTS},
    geom::{PixelPoint, TablePoint},
};
use serde::Serialize;

// Internal
use super::IkSolution;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A solved arm configuration - where the arm was asked to go, the joint
/// angles that get it there and the servo demands for those angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmConfig {
    /// Pixel the target was taken from, if it came from the camera.
    pub pixel: Option<PixelPoint>,

    /// Target grabbing point in table coordinates.
    pub target_m: TablePoint,

    /// Target grabbing point height above the table.
    ///
    /// Units: meters
    pub z_m: f64,

    /// Inverse kinematics solution for the target.
    pub solution: IkSolution,

    /// Servo demands for the solution.
    pub servo: ServoCommand,

    /// Joints whose servo pulse had to be limited.
    pub pulse_limited: [bool; NUM_ARM_JOINTS],
}

/// Per joint view of a configuration, used for operator reporting.
#[derive(Debug, Clone, Serialize)]
pub struct JointReport {
    pub name: &'static str,
    pub gpio_pin: u8,
    pub angle_deg: f64,
    pub pulse_us: u16,
    pub pulse_limited: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Demands output by arm control for one command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ArmDems {
    /// A single positioning command.
    Single(ArmConfig),

    /// Pick then place, the two configurations are solved independently.
    PickPlace { pick: ArmConfig, place: ArmConfig },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmConfig {
    /// True if the target was beyond reach or any servo pulse was limited.
    pub fn is_limited(&self) -> bool {
        self.solution.reach_limited() || self.pulse_limited.iter().any(|l| *l)
    }

    /// Break the configuration down per joint.
    pub fn joints(&self) -> Vec<JointReport> {
        ActId::arm_ids()
            .iter()
            .map(|act_id| JointReport {
                name: act_id.name(),
                gpio_pin: act_id.gpio_pin(),
                angle_deg: self.solution.angles.get(*act_id),
                pulse_us: self.servo[*act_id],
                pulse_limited: self.pulse_limited[act_id.index()],
            })
            .collect()
    }
}

impl ArmDems {
    /// All configurations in execution order.
    pub fn configs(&self) -> Vec<&ArmConfig> {
        match self {
            ArmDems::Single(c) => vec![c],
            ArmDems::PickPlace { pick, place } => vec![pick, place],
        }
    }
}
