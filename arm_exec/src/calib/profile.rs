//! Calibration profile structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use arm_if::geom::PixelPoint;
use serde::{Deserialize, Serialize};

// Internal
use super::CalibError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mapping between the camera image and the table, plus the arm geometry.
///
/// Fields missing from a persisted profile take their value from
/// [`CalibrationProfile::default`] when the profile is deserialised. A profile
/// must pass [`CalibrationProfile::validate`] before it is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationProfile {
    // ---- CAMERA MAPPING ----
    /// Pixel which lies over the table origin.
    ///
    /// Units: pixels
    pub origin_px: [i32; 2],

    /// Size of one pixel along table X.
    ///
    /// Units: meters/pixel
    pub scale_x: f64,

    /// Size of one pixel along table Y.
    ///
    /// Units: meters/pixel
    pub scale_y: f64,

    /// Invert table X after scaling (mirrored cameras).
    pub flip_x: bool,

    /// Invert table Y after scaling (image rows grow away from the arm).
    pub flip_y: bool,

    /// Width of the usable table. Informational only.
    ///
    /// Units: meters
    pub table_width_m: f64,

    /// Depth of the usable table. Informational only.
    ///
    /// Units: meters
    pub table_height_m: f64,

    // ---- ARM PLACEMENT ----
    /// Table X of the arm's rotation axis.
    ///
    /// Units: meters
    pub arm_base_x: f64,

    /// Table Y of the arm's rotation axis.
    ///
    /// Units: meters
    pub arm_base_y: f64,

    // ---- ARM GEOMETRY ----
    /// Height of the base above the table.
    ///
    /// Units: meters
    pub base_height_m: f64,

    /// Height of the shoulder joint above the base.
    ///
    /// Units: meters
    pub shoulder_height_m: f64,

    /// Shoulder to elbow length.
    ///
    /// Units: meters
    pub upper_arm_length_m: f64,

    /// Elbow to wrist length.
    ///
    /// Units: meters
    pub lower_arm_length_m: f64,

    /// Wrist to grabbing point length, the hand hangs straight down from the wrist.
    ///
    /// Units: meters
    pub hand_length_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CalibrationProfile {
    /// Calibration for a top-down 640x480 camera centred over the table.
    fn default() -> Self {
        Self {
            origin_px: [320, 240],
            scale_x: 0.0015,
            scale_y: 0.0015,
            flip_x: false,
            flip_y: true,
            table_width_m: 0.60,
            table_height_m: 0.40,
            arm_base_x: 0.0,
            arm_base_y: 0.0,
            base_height_m: 0.0612,
            shoulder_height_m: 0.095,
            upper_arm_length_m: 0.12,
            lower_arm_length_m: 0.09,
            hand_length_m: 0.06,
        }
    }
}

impl CalibrationProfile {
    /// Check the profile can be used by the transform and the solver.
    ///
    /// Scales and link lengths are divisors and must be strictly positive,
    /// heights and the hand length must not be negative, and every value
    /// must be finite.
    pub fn validate(&self) -> Result<(), CalibError> {
        check_positive("scale_x", self.scale_x)?;
        check_positive("scale_y", self.scale_y)?;
        check_non_negative("table_width_m", self.table_width_m)?;
        check_non_negative("table_height_m", self.table_height_m)?;
        check_finite("arm_base_x", self.arm_base_x)?;
        check_finite("arm_base_y", self.arm_base_y)?;
        check_non_negative("base_height_m", self.base_height_m)?;
        check_non_negative("shoulder_height_m", self.shoulder_height_m)?;
        check_positive("upper_arm_length_m", self.upper_arm_length_m)?;
        check_positive("lower_arm_length_m", self.lower_arm_length_m)?;
        check_non_negative("hand_length_m", self.hand_length_m)?;

        Ok(())
    }

    /// The pixel over the table origin.
    pub fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.origin_px[0], self.origin_px[1])
    }

    /// Height of the shoulder joint above the table.
    ///
    /// Units: meters
    pub fn shoulder_z_m(&self) -> f64 {
        self.base_height_m + self.shoulder_height_m
    }

    /// Furthest the wrist can be from the shoulder.
    ///
    /// Units: meters
    pub fn max_reach_m(&self) -> f64 {
        self.upper_arm_length_m + self.lower_arm_length_m
    }

    /// Closest the wrist can be to the shoulder.
    ///
    /// Units: meters
    pub fn min_reach_m(&self) -> f64 {
        (self.upper_arm_length_m - self.lower_arm_length_m).abs()
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_finite(field: &'static str, value: f64) -> Result<(), CalibError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CalibError::ConfigInvalid {
            field,
            reason: "must be finite",
        })
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), CalibError> {
    check_finite(field, value)?;

    if value > 0.0 {
        Ok(())
    } else {
        Err(CalibError::ConfigInvalid {
            field,
            reason: "must be greater than zero",
        })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), CalibError> {
    check_finite(field, value)?;

    if value >= 0.0 {
        Ok(())
    } else {
        Err(CalibError::ConfigInvalid {
            field,
            reason: "must not be negative",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let profile = CalibrationProfile::default();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.origin(), PixelPoint::new(320, 240));
        assert!((profile.max_reach_m() - 0.21).abs() < 1e-12);
        assert!((profile.shoulder_z_m() - 0.1562).abs() < 1e-12);
    }

    fn expect_rejected<F: Fn(&mut CalibrationProfile)>(expected_field: &str, mutate: F) {
        let mut profile = CalibrationProfile::default();
        mutate(&mut profile);

        match profile.validate() {
            Err(CalibError::ConfigInvalid { field, .. }) => assert_eq!(field, expected_field),
            r => panic!("Expected {} to be rejected, got {:?}", expected_field, r),
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        expect_rejected("scale_x", |p| p.scale_x = 0.0);
        expect_rejected("scale_y", |p| p.scale_y = -0.001);
        expect_rejected("scale_x", |p| p.scale_x = f64::NAN);
        expect_rejected("upper_arm_length_m", |p| p.upper_arm_length_m = 0.0);
        expect_rejected("lower_arm_length_m", |p| p.lower_arm_length_m = -0.09);
        expect_rejected("shoulder_height_m", |p| p.shoulder_height_m = -0.01);
        expect_rejected("hand_length_m", |p| p.hand_length_m = f64::INFINITY);
        expect_rejected("arm_base_x", |p| p.arm_base_x = f64::NEG_INFINITY);
    }

    #[test]
    fn test_zero_heights_are_valid() {
        let profile = CalibrationProfile {
            base_height_m: 0.0,
            shoulder_height_m: 0.0,
            hand_length_m: 0.0,
            ..Default::default()
        };
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let profile: CalibrationProfile =
            serde_json::from_str(r#"{"origin_px": [300, 200], "flip_y": false}"#).unwrap();

        assert_eq!(profile.origin_px, [300, 200]);
        assert!(!profile.flip_y);
        assert_eq!(profile.scale_x, 0.0015);
        assert_eq!(profile.upper_arm_length_m, 0.12);
    }
}
