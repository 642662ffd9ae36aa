//! Implementations for the ArmCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::{
    angles_to_servo, solve_ik, ArmConfig, ArmCtrlError, ArmDems, JointReport, ReachStatus,
};
use crate::{
    calib::{CalibStore, CalibrationProfile},
    coord,
};
use arm_if::{
    eqpt::arm::{JointAngles, ServoCommand, NUM_ARM_JOINTS},
    geom::{PixelPoint, TablePoint},
    tc::arm_ctrl::ArmCmd,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Arm control module state
#[derive(Default)]
pub struct ArmCtrl {
    pub(crate) store: Option<Arc<CalibStore>>,

    pub(crate) report: StatusReport,
}

/// Input data to Arm Control.
#[derive(Default)]
pub struct InputData {
    /// The positioning command to be executed, or `None` if there is no new
    /// command on this cycle.
    pub cmd: Option<ArmCmd>,
}

/// Status report for ArmCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// A target was beyond the arm's reach and was clamped.
    pub reach_limited: bool,

    /// A target sat on a singular configuration.
    pub degenerate: bool,

    /// Joints whose pulse width was limited in any output configuration.
    pub pulse_limited: [bool; NUM_ARM_JOINTS],
}

/// Full breakdown of the arm pose for a single target.
#[derive(Debug, Clone, Serialize)]
pub struct OrientationReport {
    pub position_m: [f64; 3],
    pub angles: JointAngles,
    pub servo: ServoCommand,
    pub reach: ReachStatus,
    pub joints: Vec<JointReport>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ArmCtrl {
    type InitData = Arc<CalibStore>;
    type InitError = ArmCtrlError;

    type InputData = InputData;
    type OutputData = Option<ArmDems>;
    type StatusReport = StatusReport;
    type ProcError = ArmCtrlError;

    /// Initialise the ArmCtrl module.
    ///
    /// Expected init data is the calibration store shared with the rest of the executable.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        // Make sure the store's profile can be used before accepting commands
        init_data.current().validate()?;

        self.store = Some(init_data);
        self.report = StatusReport::default();

        Ok(())
    }

    /// Perform processing of Arm Control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let cmd = match &input_data.cmd {
            Some(c) => c,
            None => return Ok((None, self.report)),
        };

        debug!("New ArmCtrl ArmCmd::{:?}", cmd);

        if let Some(field) = cmd.non_finite_field() {
            return Err(ArmCtrlError::InvalidArmCmd(field));
        }

        // One snapshot for the whole command, so a concurrent calibration
        // change can't split a pick from its place
        let profile = self.profile()?;

        let dems = match *cmd {
            ArmCmd::Pixel { cx, cy, z_m } => {
                let pixel = PixelPoint::new(cx, cy);
                let target_m = coord::pixel_to_table(pixel, &profile)?;
                ArmDems::Single(self.solve(Some(pixel), target_m, z_m, &profile)?)
            }
            ArmCmd::Table { x_m, y_m, z_m } => {
                ArmDems::Single(self.solve(None, TablePoint::new(x_m, y_m), z_m, &profile)?)
            }
            ArmCmd::PickPlace {
                cx,
                cy,
                dx_m,
                dy_m,
                z_m,
            } => {
                let pixel = PixelPoint::new(cx, cy);
                let pick_m = coord::pixel_to_table(pixel, &profile)?;
                let place_m = pick_m.offset(dx_m, dy_m);

                ArmDems::PickPlace {
                    pick: self.solve(Some(pixel), pick_m, z_m, &profile)?,
                    place: self.solve(None, place_m, z_m, &profile)?,
                }
            }
        };

        Ok((Some(dems), self.report))
    }
}

impl ArmCtrl {
    /// Solve a table target and describe every joint, for operator debugging.
    pub fn orientation_report(
        &self,
        x_m: f64,
        y_m: f64,
        z_m: f64,
    ) -> Result<OrientationReport, ArmCtrlError> {
        let profile = self.profile()?;

        let solution = solve_ik(x_m, y_m, z_m, &profile)?;
        let (servo, pulse_limited) = angles_to_servo(&solution.angles);

        let config = ArmConfig {
            pixel: None,
            target_m: TablePoint::new(x_m, y_m),
            z_m,
            solution,
            servo,
            pulse_limited,
        };

        Ok(OrientationReport {
            position_m: [x_m, y_m, z_m],
            angles: solution.angles,
            servo,
            reach: solution.reach,
            joints: config.joints(),
        })
    }

    /// Current calibration snapshot from the attached store.
    fn profile(&self) -> Result<Arc<CalibrationProfile>, ArmCtrlError> {
        match &self.store {
            Some(s) => Ok(s.current()),
            None => Err(ArmCtrlError::NotInitialised),
        }
    }

    /// Solve a single target and fold its flags into the status report.
    fn solve(
        &mut self,
        pixel: Option<PixelPoint>,
        target_m: TablePoint,
        z_m: f64,
        profile: &CalibrationProfile,
    ) -> Result<ArmConfig, ArmCtrlError> {
        let solution = solve_ik(target_m.x_m, target_m.y_m, z_m, profile)?;
        let (servo, pulse_limited) = angles_to_servo(&solution.angles);

        self.report.reach_limited |= solution.reach_limited();
        self.report.degenerate |= solution.degenerate.is_some();
        for (r, l) in self.report.pulse_limited.iter_mut().zip(pulse_limited.iter()) {
            *r |= *l;
        }

        Ok(ArmConfig {
            pixel,
            target_m,
            z_m,
            solution,
            servo,
            pulse_limited,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use arm_if::eqpt::arm::{PULSE_MAX_US, PULSE_MIN_US};

    fn init_ctrl(profile: CalibrationProfile) -> (ArmCtrl, Arc<CalibStore>) {
        let path = std::env::temp_dir().join(format!(
            "arm_ctrl_unused_{}.json",
            std::process::id()
        ));
        let store = Arc::new(CalibStore::new(path));
        store.replace(profile).unwrap();

        let mut ctrl = ArmCtrl::default();
        ctrl.init(store.clone()).unwrap();

        (ctrl, store)
    }

    fn single(dems: Option<ArmDems>) -> ArmConfig {
        match dems {
            Some(ArmDems::Single(c)) => c,
            d => panic!("Expected a single config, got {:?}", d),
        }
    }

    #[test]
    fn test_no_cmd() {
        let (mut ctrl, _) = init_ctrl(CalibrationProfile::default());

        let (out, report) = ctrl.proc(&InputData::default()).unwrap();
        assert!(out.is_none());
        assert_eq!(report, StatusReport::default());
    }

    #[test]
    fn test_uninitialised() {
        let mut ctrl = ArmCtrl::default();

        let input = InputData {
            cmd: Some(ArmCmd::Table {
                x_m: 0.1,
                y_m: 0.0,
                z_m: 0.02,
            }),
        };
        assert!(matches!(
            ctrl.proc(&input),
            Err(ArmCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_pixel_cmd() {
        let (mut ctrl, _) = init_ctrl(CalibrationProfile::default());

        let input = InputData {
            cmd: Some(ArmCmd::Pixel {
                cx: 420,
                cy: 240,
                z_m: 0.02,
            }),
        };
        let (out, report) = ctrl.proc(&input).unwrap();
        let config = single(out);

        assert_eq!(config.pixel, Some(PixelPoint::new(420, 240)));
        assert!((config.target_m.x_m - 0.15).abs() < 1e-12);
        assert_eq!(config.solution.angles.base_deg, 0.0);
        assert_eq!(config.servo[arm_if::eqpt::arm::ActId::Base], 1500);
        assert!(!report.reach_limited);
    }

    #[test]
    fn test_unreachable_cmd_is_flagged() {
        let (mut ctrl, _) = init_ctrl(CalibrationProfile::default());

        let input = InputData {
            cmd: Some(ArmCmd::Table {
                x_m: 1.0,
                y_m: 0.0,
                z_m: 0.02,
            }),
        };
        let (out, report) = ctrl.proc(&input).unwrap();
        let config = single(out);

        assert!(report.reach_limited);
        assert!(config.is_limited());
        for p in config.servo.pulse_us.iter() {
            assert!(*p >= PULSE_MIN_US && *p <= PULSE_MAX_US);
        }

        // The report is cleared on the next call
        let input = InputData {
            cmd: Some(ArmCmd::Table {
                x_m: 0.1,
                y_m: 0.0,
                z_m: 0.02,
            }),
        };
        let (_, report) = ctrl.proc(&input).unwrap();
        assert!(!report.reach_limited);
    }

    #[test]
    fn test_pick_place() {
        let (mut ctrl, _) = init_ctrl(CalibrationProfile::default());

        let input = InputData {
            cmd: Some(ArmCmd::PickPlace {
                cx: 420,
                cy: 240,
                dx_m: -0.05,
                dy_m: 0.05,
                z_m: 0.02,
            }),
        };

        let (pick, place) = match ctrl.proc(&input).unwrap().0 {
            Some(ArmDems::PickPlace { pick, place }) => (pick, place),
            d => panic!("Expected pick and place, got {:?}", d),
        };

        assert!((place.target_m.x_m - 0.10).abs() < 1e-12);
        assert!((place.target_m.y_m - 0.05).abs() < 1e-12);
        assert_eq!(place.pixel, None);
        assert_eq!(pick.solution.angles.base_deg, 0.0);
        assert!(place.solution.angles.base_deg > 0.0);
    }

    #[test]
    fn test_invalid_cmd() {
        let (mut ctrl, _) = init_ctrl(CalibrationProfile::default());

        let input = InputData {
            cmd: Some(ArmCmd::Table {
                x_m: f64::NAN,
                y_m: 0.0,
                z_m: 0.02,
            }),
        };
        assert!(matches!(
            ctrl.proc(&input),
            Err(ArmCtrlError::InvalidArmCmd("x_m"))
        ));
    }

    #[test]
    fn test_repeatable_and_follows_store() {
        let (mut ctrl, store) = init_ctrl(CalibrationProfile::default());

        let input = InputData {
            cmd: Some(ArmCmd::Pixel {
                cx: 400,
                cy: 200,
                z_m: 0.03,
            }),
        };

        let a = ctrl.proc(&input).unwrap();
        let b = ctrl.proc(&input).unwrap();
        assert_eq!(a, b);

        // A new calibration applies to the next command
        store
            .replace(CalibrationProfile {
                origin_px: [400, 200],
                ..Default::default()
            })
            .unwrap();
        let config = single(ctrl.proc(&input).unwrap().0);
        assert_eq!(config.target_m, TablePoint::new(0.0, 0.0));
        assert!(config.solution.degenerate.is_some());
    }

    #[test]
    fn test_orientation_report() {
        let (ctrl, _) = init_ctrl(CalibrationProfile::default());

        let report = ctrl.orientation_report(0.15, 0.0, 0.02).unwrap();

        assert_eq!(report.joints.len(), NUM_ARM_JOINTS);
        assert_eq!(report.joints[0].name, "base");
        assert_eq!(report.joints[0].gpio_pin, 5);
        assert_eq!(report.joints[3].gpio_pin, 19);
        assert_eq!(report.joints[1].pulse_us, report.servo.pulse_us[1]);
        assert_eq!(report.reach, ReachStatus::Reachable);

        assert!(serde_json::to_string(&report).is_ok());
    }
}
