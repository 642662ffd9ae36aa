//! Joint angle to servo pulse width mapping

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arm_if::eqpt::arm::{
    ActId, JointAngles, ServoCommand, NUM_ARM_JOINTS, PULSE_CENTRE_US, PULSE_MAX_US,
    PULSE_MIN_US, PULSE_US_PER_90_DEG,
};
use log::warn;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert joint angles into servo pulse widths.
///
/// Each joint gets `1500 + round(angle * 600 / 90)` microseconds, limited to
/// the servo travel. The second element of the returned tuple flags the joints
/// whose pulse had to be limited. A non-finite angle drives its servo to the
/// centre and is flagged as limited.
pub fn angles_to_servo(angles: &JointAngles) -> (ServoCommand, [bool; NUM_ARM_JOINTS]) {
    let mut cmd = ServoCommand::centred();
    let mut limited = [false; NUM_ARM_JOINTS];

    for act_id in ActId::arm_ids().iter() {
        let i = act_id.index();
        let (pulse_us, was_limited) = angle_to_pulse(angles.get(*act_id));

        if was_limited {
            warn!(
                "{} angle {:.1} deg is outside servo travel, pulse limited to {} us",
                act_id.name(),
                angles.get(*act_id),
                pulse_us
            );
        }

        cmd.pulse_us[i] = pulse_us;
        limited[i] = was_limited;
    }

    (cmd, limited)
}

/// Pulse width for a single joint angle, and whether it was limited.
pub fn angle_to_pulse(angle_deg: f64) -> (u16, bool) {
    if !angle_deg.is_finite() {
        return (PULSE_CENTRE_US, true);
    }

    let raw_us = PULSE_CENTRE_US as f64 + (angle_deg * PULSE_US_PER_90_DEG / 90.0).round();
    let pulse_us = clamp(&raw_us, &(PULSE_MIN_US as f64), &(PULSE_MAX_US as f64));

    (pulse_us as u16, pulse_us != raw_us)
}
