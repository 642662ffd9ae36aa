//! Arm inverse kinematics calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arm_if::eqpt::arm::JointAngles;
use log::{debug, info, warn};
use nalgebra::Vector2;
use serde::Serialize;
use util::maths::clamp;

// Internal imports
use super::ArmCtrlError;
use crate::calib::CalibrationProfile;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest accepted target coordinate magnitude.
///
/// Keeps the squared distances finite so the reach clamp can't produce NaN.
///
/// Units: meters
pub const MAX_TARGET_ABS_M: f64 = 1.0e6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of an inverse kinematics solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IkSolution {
    /// Joint angles reaching the (possibly clamped) target.
    pub angles: JointAngles,

    /// Whether the target was inside the arm's reach.
    pub reach: ReachStatus,

    /// Set if the target sat on a singular configuration.
    pub degenerate: Option<Degeneracy>,

    /// Shoulder to wrist distance actually solved for, after reach clamping.
    ///
    /// Units: meters
    pub target_dist_m: f64,

    /// Sum of the upper and lower arm lengths.
    ///
    /// Units: meters
    pub max_reach_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Reachability of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ReachStatus {
    /// The wrist target was within reach and solved exactly.
    Reachable,

    /// The wrist target was out of reach and was pulled back along the
    /// shoulder to target ray onto the reach boundary.
    BeyondMaxReach {
        /// Shoulder to wrist distance before clamping.
        ///
        /// Units: meters
        requested_dist_m: f64,
    },

    /// The wrist target was closer to the shoulder than the folded arm can
    /// get, the solution is the nearest the arm can fold to.
    InsideMinReach,
}

/// Singular target configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Degeneracy {
    /// The wrist target is exactly on the shoulder joint. The arm is returned
    /// fully folded with the upper arm horizontal.
    CoincidentWithShoulder,

    /// The target is directly above or below the base axis so any base yaw is
    /// valid. The base is left at zero.
    AboveBase,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Solve the joint angles that put the grabbing point at the given table position.
///
/// The arm is a base yaw joint followed by shoulder, elbow and wrist pitch
/// joints. The hand hangs straight down from the wrist, so the wrist is aimed
/// at the point `hand_length_m` above the grabbing point and the wrist angle
/// keeps the hand vertical.
///
/// Targets outside the arm's reach are not an error: they are projected onto
/// the reach boundary and reported in [`IkSolution::reach`]. The only errors
/// are an invalid profile or a non-finite/absurd target.
pub fn solve_ik(
    x_m: f64,
    y_m: f64,
    z_m: f64,
    profile: &CalibrationProfile,
) -> Result<IkSolution, ArmCtrlError> {
    profile.validate()?;
    check_target("x_m", x_m)?;
    check_target("y_m", y_m)?;
    check_target("z_m", z_m)?;

    let upper_m = profile.upper_arm_length_m;
    let lower_m = profile.lower_arm_length_m;
    let max_reach_m = profile.max_reach_m();

    let wrist_z_m = z_m + profile.hand_length_m;

    // Position relative to the base axis
    let rel_m = Vector2::new(x_m - profile.arm_base_x, y_m - profile.arm_base_y);
    let xy_dist_m = rel_m.norm();

    let mut degenerate = None;

    // atan2(0, 0) is taken as zero. Signed zeros are normalised so a target
    // on the axis always gives a zero base angle.
    let base_deg = if xy_dist_m == 0.0 {
        degenerate = Some(Degeneracy::AboveBase);
        0.0
    } else {
        rel_m.y.atan2(rel_m.x).to_degrees()
    };

    // Shoulder to wrist ray in the arm's vertical plane, (horizontal, vertical)
    let mut ray_m = Vector2::new(xy_dist_m, wrist_z_m - profile.shoulder_z_m());
    let mut target_dist_m = ray_m.norm();

    let reach = if target_dist_m > max_reach_m {
        warn!(
            "Target at {:.3}m exceeds max reach {:.3}m, clamping to reach",
            target_dist_m, max_reach_m
        );
        let requested_dist_m = target_dist_m;
        ray_m *= max_reach_m / target_dist_m;
        target_dist_m = max_reach_m;
        ReachStatus::BeyondMaxReach { requested_dist_m }
    } else if target_dist_m < profile.min_reach_m() {
        ReachStatus::InsideMinReach
    } else {
        ReachStatus::Reachable
    };

    // Angle of the ray above horizontal
    let target_angle_deg = ray_m.y.atan2(ray_m.x).to_degrees();

    // Elbow interior angle from the law of cosines. Clamped to absorb rounding
    // at the edges of reach.
    let cos_elbow = clamp(
        &((upper_m.powi(2) + lower_m.powi(2) - target_dist_m.powi(2)) / (2.0 * upper_m * lower_m)),
        &-1.0,
        &1.0,
    );
    let elbow_deg = cos_elbow.acos().to_degrees();

    // Angle between the upper arm and the ray. Undefined when the wrist target
    // is on the shoulder, in which case the upper arm lies along the ray.
    let angle_between_deg = if target_dist_m == 0.0 {
        degenerate = Some(Degeneracy::CoincidentWithShoulder);
        0.0
    } else {
        let cos_between = clamp(
            &((upper_m.powi(2) + target_dist_m.powi(2) - lower_m.powi(2))
                / (2.0 * upper_m * target_dist_m)),
            &-1.0,
            &1.0,
        );
        cos_between.acos().to_degrees()
    };

    let shoulder_deg = target_angle_deg - angle_between_deg;

    // Keep the hand vertical whatever the arm pose
    let wrist_deg = 90.0 - (shoulder_deg + elbow_deg);

    if let Some(d) = degenerate {
        info!("Degenerate target ({:.3}, {:.3}, {:.3}): {:?}", x_m, y_m, z_m, d);
    }

    let angles = JointAngles {
        base_deg,
        shoulder_deg,
        elbow_deg,
        wrist_deg,
    };

    debug!("IK solution for ({:.3}, {:.3}, {:.3}): {:?}", x_m, y_m, z_m, angles);

    Ok(IkSolution {
        angles,
        reach,
        degenerate,
        target_dist_m,
        max_reach_m,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_target(field: &'static str, value: f64) -> Result<(), ArmCtrlError> {
    if value.is_finite() && value.abs() <= MAX_TARGET_ABS_M {
        Ok(())
    } else {
        Err(ArmCtrlError::InvalidTarget(field))
    }
}

impl IkSolution {
    /// True if the target had to be pulled back onto the reach boundary.
    pub fn reach_limited(&self) -> bool {
        matches!(self.reach, ReachStatus::BeyondMaxReach { .. })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_finite(angles: &JointAngles) {
        for a in angles.as_array().iter() {
            assert!(a.is_finite(), "Non-finite angle in {:?}", angles);
        }
    }

    #[test]
    fn test_target_on_x_axis() {
        let sol = solve_ik(0.15, 0.0, 0.02, &CalibrationProfile::default()).unwrap();

        assert_finite(&sol.angles);
        assert_eq!(sol.angles.base_deg, 0.0);
        assert!(sol.angles.elbow_deg >= 0.0 && sol.angles.elbow_deg <= 180.0);
        assert_eq!(sol.reach, ReachStatus::Reachable);
        assert_eq!(sol.degenerate, None);

        // Wrist target (0.15, 0.08) relative to a shoulder at 0.1562
        let dz = 0.08 - 0.1562;
        let expected_dist = (0.15f64.powi(2) + dz * dz).sqrt();
        assert!((sol.target_dist_m - expected_dist).abs() < 1e-12);

        // Hand stays vertical
        assert!(
            (sol.angles.shoulder_deg + sol.angles.elbow_deg + sol.angles.wrist_deg - 90.0).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_forward_kinematics_matches() {
        // Rebuild the wrist position from the angles. The elbow sits below the
        // ray and the elbow angle is interior, so the lower arm points at
        // shoulder + 180 - elbow.
        let profile = CalibrationProfile::default();
        let sol = solve_ik(0.1, 0.05, 0.03, &profile).unwrap();

        let shoulder = sol.angles.shoulder_deg.to_radians();
        let lower_dir = (sol.angles.shoulder_deg + 180.0 - sol.angles.elbow_deg).to_radians();

        let horiz = profile.upper_arm_length_m * shoulder.cos()
            + profile.lower_arm_length_m * lower_dir.cos();
        let vert = profile.upper_arm_length_m * shoulder.sin()
            + profile.lower_arm_length_m * lower_dir.sin();

        let xy = (0.1f64.powi(2) + 0.05f64.powi(2)).sqrt();
        let dz = 0.03 + profile.hand_length_m - profile.shoulder_z_m();

        assert!((horiz - xy).abs() < 1e-9, "{} != {}", horiz, xy);
        assert!((vert - dz).abs() < 1e-9, "{} != {}", vert, dz);
    }

    #[test]
    fn test_unreachable_target_is_clamped() {
        let sol = solve_ik(1.0, 0.0, 0.02, &CalibrationProfile::default()).unwrap();

        assert!(sol.reach_limited());
        match sol.reach {
            ReachStatus::BeyondMaxReach { requested_dist_m } => assert!(requested_dist_m > 0.21),
            r => panic!("Expected BeyondMaxReach, got {:?}", r),
        }
        assert!((sol.target_dist_m - sol.max_reach_m).abs() < 1e-9);
        assert_finite(&sol.angles);

        // Fully stretched
        assert!((sol.angles.elbow_deg - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_clamp_keeps_ray_direction() {
        let profile = CalibrationProfile::default();
        let near = solve_ik(0.5, 0.5, 0.3, &profile).unwrap();
        let far = solve_ik(1.0, 1.0, 0.6, &profile).unwrap();

        assert!(near.reach_limited());
        assert!(far.reach_limited());
        assert!((near.angles.base_deg - 45.0).abs() < 1e-9);
        assert!((near.angles.elbow_deg - 180.0).abs() < 1e-4);

        // The upper arm follows the ray so a steeper target gives a steeper shoulder
        assert!(far.angles.shoulder_deg > near.angles.shoulder_deg);
    }

    #[test]
    fn test_mirror_symmetry() {
        let profile = CalibrationProfile::default();

        for &(x, y) in &[(0.1, 0.05), (0.03, 0.12), (0.2, -0.04), (0.07, -0.1), (0.15, 0.0)] {
            let right = solve_ik(x, y, 0.02, &profile).unwrap();
            let left = solve_ik(-x, y, 0.02, &profile).unwrap();

            let mirror = if y >= 0.0 { 180.0 } else { -180.0 };
            assert!(
                (left.angles.base_deg - (mirror - right.angles.base_deg)).abs() < 1e-9,
                "({}, {}): {} vs {}",
                x,
                y,
                right.angles.base_deg,
                left.angles.base_deg
            );

            // Only the base changes
            assert_eq!(left.angles.shoulder_deg, right.angles.shoulder_deg);
            assert_eq!(left.angles.elbow_deg, right.angles.elbow_deg);
            assert_eq!(left.angles.wrist_deg, right.angles.wrist_deg);
        }
    }

    #[test]
    fn test_target_above_base() {
        let sol = solve_ik(0.0, 0.0, 0.02, &CalibrationProfile::default()).unwrap();

        assert_eq!(sol.angles.base_deg, 0.0);
        assert_eq!(sol.degenerate, Some(Degeneracy::AboveBase));
        assert_finite(&sol.angles);

        // Signed zeros don't flip the base round
        let sol = solve_ik(-0.0, -0.0, 0.02, &CalibrationProfile::default()).unwrap();
        assert_eq!(sol.angles.base_deg, 0.0);
    }

    #[test]
    fn test_target_on_shoulder() {
        // Equal links so the folded arm can reach its own shoulder. Binary
        // exact values so the wrist lands exactly on the shoulder.
        let profile = CalibrationProfile {
            base_height_m: 0.5,
            shoulder_height_m: 0.25,
            hand_length_m: 0.25,
            upper_arm_length_m: 0.125,
            lower_arm_length_m: 0.125,
            ..Default::default()
        };
        let z = profile.shoulder_z_m() - profile.hand_length_m;

        let sol = solve_ik(0.0, 0.0, z, &profile).unwrap();

        assert_eq!(sol.degenerate, Some(Degeneracy::CoincidentWithShoulder));
        assert_eq!(sol.target_dist_m, 0.0);
        assert_eq!(sol.angles.elbow_deg, 0.0);
        assert_eq!(sol.angles.shoulder_deg, 0.0);
        assert_eq!(sol.angles.wrist_deg, 90.0);
        assert_eq!(sol.reach, ReachStatus::Reachable);
    }

    #[test]
    fn test_inside_min_reach() {
        let profile = CalibrationProfile::default();
        let z = profile.shoulder_z_m() - profile.hand_length_m;

        let sol = solve_ik(0.01, 0.0, z, &profile).unwrap();

        assert_eq!(sol.reach, ReachStatus::InsideMinReach);
        assert_finite(&sol.angles);
        assert_eq!(sol.angles.elbow_deg, 0.0);
    }

    #[test]
    fn test_repeatable() {
        let profile = CalibrationProfile::default();

        let a = solve_ik(0.12, -0.07, 0.04, &profile).unwrap();
        let b = solve_ik(0.12, -0.07, 0.04, &profile).unwrap();

        for (x, y) in a.angles.as_array().iter().zip(b.angles.as_array().iter()) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_arm_base_offset() {
        let profile = CalibrationProfile {
            arm_base_x: 0.1,
            arm_base_y: -0.2,
            ..Default::default()
        };

        let sol = solve_ik(0.1, 0.0, 0.02, &profile).unwrap();
        assert!((sol.angles.base_deg - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_input() {
        let profile = CalibrationProfile::default();

        assert!(matches!(
            solve_ik(f64::NAN, 0.0, 0.02, &profile),
            Err(ArmCtrlError::InvalidTarget("x_m"))
        ));
        assert!(matches!(
            solve_ik(0.0, 1e300, 0.02, &profile),
            Err(ArmCtrlError::InvalidTarget("y_m"))
        ));

        let bad = CalibrationProfile {
            upper_arm_length_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            solve_ik(0.1, 0.0, 0.02, &bad),
            Err(ArmCtrlError::Calib(_))
        ));
    }
}
