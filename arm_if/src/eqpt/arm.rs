//! # Arm Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::ops::Index;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of actuated joints on the arm.
pub const NUM_ARM_JOINTS: usize = 4;

const ARM_IDS: [ActId; NUM_ARM_JOINTS] = [
    ActId::Base,
    ActId::Shoulder,
    ActId::Elbow,
    ActId::Wrist,
];

/// Servo pulse width at a joint angle of zero.
///
/// Units: microseconds
pub const PULSE_CENTRE_US: u16 = 1500;

/// Lowest pulse width the servos accept.
///
/// Units: microseconds
pub const PULSE_MIN_US: u16 = 900;

/// Highest pulse width the servos accept.
///
/// Units: microseconds
pub const PULSE_MAX_US: u16 = 2100;

/// Pulse width change for a 90 degree joint rotation.
///
/// Units: microseconds
pub const PULSE_US_PER_90_DEG: f64 = 600.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint angles of the arm.
///
/// All angles are measured from each servo's centre position.
///
/// Units: degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct JointAngles {
    /// Base yaw, zero along the table +X axis, positive towards +Y.
    pub base_deg: f64,

    /// Shoulder pitch of the upper arm above the horizontal.
    pub shoulder_deg: f64,

    /// Elbow interior angle between the upper and lower arm.
    pub elbow_deg: f64,

    /// Wrist pitch which keeps the hand vertical.
    pub wrist_deg: f64,
}

/// Servo demands for the arm, one pulse width per joint in [`ActId::arm_ids`] order.
///
/// Serialised as a bare four element array, which is the format the actuator transport expects.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct ServoCommand {
    /// Pulse widths in microseconds.
    pub pulse_us: [u16; NUM_ARM_JOINTS],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators on the arm
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    Base,
    Shoulder,
    Elbow,
    Wrist,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl ActId {
    /// All arm joints in command order.
    pub fn arm_ids() -> &'static [ActId; NUM_ARM_JOINTS] {
        &ARM_IDS
    }

    /// Position of this joint in a [`ServoCommand`].
    pub fn index(&self) -> usize {
        match self {
            ActId::Base => 0,
            ActId::Shoulder => 1,
            ActId::Elbow => 2,
            ActId::Wrist => 3,
        }
    }

    /// Human readable joint name.
    pub fn name(&self) -> &'static str {
        match self {
            ActId::Base => "base",
            ActId::Shoulder => "shoulder",
            ActId::Elbow => "elbow",
            ActId::Wrist => "wrist",
        }
    }

    /// Microcontroller GPIO pin driving this joint's servo.
    pub fn gpio_pin(&self) -> u8 {
        match self {
            ActId::Base => 5,
            ActId::Shoulder => 18,
            ActId::Elbow => 22,
            ActId::Wrist => 19,
        }
    }
}

impl JointAngles {
    /// Get the angle of a single joint.
    pub fn get(&self, act_id: ActId) -> f64 {
        match act_id {
            ActId::Base => self.base_deg,
            ActId::Shoulder => self.shoulder_deg,
            ActId::Elbow => self.elbow_deg,
            ActId::Wrist => self.wrist_deg,
        }
    }

    /// Angles in [`ActId::arm_ids`] order.
    pub fn as_array(&self) -> [f64; NUM_ARM_JOINTS] {
        [
            self.base_deg,
            self.shoulder_deg,
            self.elbow_deg,
            self.wrist_deg,
        ]
    }
}

impl ServoCommand {
    /// A command placing every servo at its centre position.
    pub fn centred() -> Self {
        Self {
            pulse_us: [PULSE_CENTRE_US; NUM_ARM_JOINTS],
        }
    }
}

impl Default for ServoCommand {
    fn default() -> Self {
        Self::centred()
    }
}

impl Index<ActId> for ServoCommand {
    type Output = u16;

    fn index(&self, act_id: ActId) -> &u16 {
        &self.pulse_us[act_id.index()]
    }
}
