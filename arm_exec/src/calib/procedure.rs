//! Interactive camera to table calibration
//!
//! The operator clicks three points on the camera image:
//!
//! 1. The table origin.
//! 2. A point the reference distance to the right of the origin, which sets the X scale.
//! 3. A point the reference distance forward of the previous click, which sets the Y scale.
//!
//! The procedure only edits a working copy of the profile, it is up to the
//! caller to hand the result to the [`CalibStore`](super::CalibStore).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use arm_if::geom::PixelPoint;
use log::{info, warn};
use serde::Serialize;

use super::{CalibError, CalibrationProfile};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default distance between the origin and scale reference clicks.
///
/// Units: meters
pub const DEFAULT_REFERENCE_M: f64 = 0.10;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The step the procedure is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalibStep {
    Origin,
    ScaleX,
    ScaleY,
    Complete,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Click driven calibration procedure.
#[derive(Debug, Clone)]
pub struct CalibProcedure {
    profile: CalibrationProfile,

    step: CalibStep,

    clicks: Vec<PixelPoint>,

    reference_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CalibProcedure {
    /// Start a new procedure from the given profile.
    ///
    /// `reference_m` is the real distance between the reference clicks and must be positive.
    pub fn new(profile: CalibrationProfile, reference_m: f64) -> Result<Self, CalibError> {
        if !(reference_m.is_finite() && reference_m > 0.0) {
            return Err(CalibError::ConfigInvalid {
                field: "reference_m",
                reason: "must be greater than zero",
            });
        }

        Ok(Self {
            profile,
            step: CalibStep::Origin,
            clicks: Vec::new(),
            reference_m,
        })
    }

    /// The step the next click will complete.
    pub fn step(&self) -> CalibStep {
        self.step
    }

    /// All clicks received since the last reset.
    pub fn clicks(&self) -> &[PixelPoint] {
        &self.clicks
    }

    /// The working profile.
    pub fn profile(&self) -> &CalibrationProfile {
        &self.profile
    }

    /// Consume the procedure, returning the working profile.
    pub fn into_profile(self) -> CalibrationProfile {
        self.profile
    }

    /// Restart the procedure from a fresh profile.
    pub fn reset(&mut self, profile: CalibrationProfile) {
        self.profile = profile;
        self.step = CalibStep::Origin;
        self.clicks.clear();
    }

    /// Handle a click on the image, returning the step now being waited on.
    pub fn click(&mut self, point: PixelPoint) -> CalibStep {
        self.clicks.push(point);

        self.step = match self.step {
            CalibStep::Origin => {
                self.profile.origin_px = [point.x, point.y];
                info!("Set origin to ({}, {})", point.x, point.y);
                CalibStep::ScaleX
            }
            CalibStep::ScaleX => {
                let delta_px = (i64::from(point.x) - i64::from(self.previous_click().x)).abs();
                match self.scale_from_delta(delta_px) {
                    Some(s) => {
                        self.profile.scale_x = s;
                        info!("Set X scale to {:.2} mm/px", s * 1000.0);
                    }
                    None => warn!("X reference click is on the origin column, X scale unchanged"),
                }
                CalibStep::ScaleY
            }
            CalibStep::ScaleY => {
                let delta_px = (i64::from(point.y) - i64::from(self.previous_click().y)).abs();
                match self.scale_from_delta(delta_px) {
                    Some(s) => {
                        self.profile.scale_y = s;
                        info!("Set Y scale to {:.2} mm/px", s * 1000.0);
                    }
                    None => warn!("Y reference click is on the previous row, Y scale unchanged"),
                }
                info!("Calibration complete");
                CalibStep::Complete
            }
            CalibStep::Complete => CalibStep::Complete,
        };

        self.step
    }

    /// The click before the most recent one.
    ///
    /// Only called once at least two clicks have been made.
    fn previous_click(&self) -> PixelPoint {
        self.clicks[self.clicks.len() - 2]
    }

    /// Deltas are widened so clicks anywhere in the `i32` range can't overflow.
    fn scale_from_delta(&self, delta_px: i64) -> Option<f64> {
        if delta_px > 0 {
            Some(self.reference_m / delta_px as f64)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut procedure =
            CalibProcedure::new(CalibrationProfile::default(), DEFAULT_REFERENCE_M).unwrap();

        assert_eq!(procedure.step(), CalibStep::Origin);
        assert_eq!(procedure.click(PixelPoint::new(300, 260)), CalibStep::ScaleX);
        assert_eq!(procedure.profile().origin_px, [300, 260]);

        // 100 px for 10 cm
        assert_eq!(procedure.click(PixelPoint::new(400, 262)), CalibStep::ScaleY);
        assert!((procedure.profile().scale_x - 0.001).abs() < 1e-12);

        // Y is measured against the X reference click, 50 px for 10 cm
        assert_eq!(procedure.click(PixelPoint::new(398, 212)), CalibStep::Complete);
        assert!((procedure.profile().scale_y - 0.002).abs() < 1e-12);

        // Further clicks change nothing
        let before = procedure.profile().clone();
        assert_eq!(procedure.click(PixelPoint::new(0, 0)), CalibStep::Complete);
        assert_eq!(*procedure.profile(), before);
        assert_eq!(procedure.clicks().len(), 4);

        assert!(procedure.into_profile().validate().is_ok());
    }

    #[test]
    fn test_zero_delta_keeps_scale() {
        let mut procedure =
            CalibProcedure::new(CalibrationProfile::default(), DEFAULT_REFERENCE_M).unwrap();

        procedure.click(PixelPoint::new(320, 240));
        procedure.click(PixelPoint::new(320, 100));
        procedure.click(PixelPoint::new(500, 100));

        assert_eq!(procedure.profile().scale_x, 0.0015);
        assert_eq!(procedure.profile().scale_y, 0.0015);
        assert_eq!(procedure.step(), CalibStep::Complete);
    }

    #[test]
    fn test_extreme_clicks() {
        let mut procedure =
            CalibProcedure::new(CalibrationProfile::default(), DEFAULT_REFERENCE_M).unwrap();

        procedure.click(PixelPoint::new(-10, 0));
        procedure.click(PixelPoint::new(i32::MAX, 0));
        procedure.click(PixelPoint::new(i32::MAX, i32::MIN));

        let expected_x = DEFAULT_REFERENCE_M / (i32::MAX as f64 + 10.0);
        let expected_y = DEFAULT_REFERENCE_M / 2_147_483_648.0;

        assert!((procedure.profile().scale_x - expected_x).abs() < 1e-20);
        assert!((procedure.profile().scale_y - expected_y).abs() < 1e-20);
        assert!(procedure.profile().scale_x > 0.0 && procedure.profile().scale_y > 0.0);
        assert_eq!(procedure.step(), CalibStep::Complete);
    }

    #[test]
    fn test_reset() {
        let mut procedure =
            CalibProcedure::new(CalibrationProfile::default(), DEFAULT_REFERENCE_M).unwrap();

        procedure.click(PixelPoint::new(10, 10));
        procedure.reset(CalibrationProfile::default());

        assert_eq!(procedure.step(), CalibStep::Origin);
        assert!(procedure.clicks().is_empty());
        assert_eq!(*procedure.profile(), CalibrationProfile::default());
    }

    #[test]
    fn test_rejects_bad_reference() {
        assert!(CalibProcedure::new(CalibrationProfile::default(), 0.0).is_err());
        assert!(CalibProcedure::new(CalibrationProfile::default(), f64::NAN).is_err());
    }
}
