//! Main arm-side executable entry point.
//!
//! # Architecture
//!
//! Each execution solves one positioning command:
//!
//!     - Initialise the session and logging
//!     - Load the executable parameters and the calibration
//!     - Run arm control on the command given on the command line
//!     - Print the demands and save them into the session
//!
//! # Modules
//!
//! All modules (e.g. `arm_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use structopt::StructOpt;

// Internal
use arm_if::tc::arm_ctrl::ArmCmd;
use arm_lib::{
    arm_ctrl::{ArmCtrl, ArmDems, InputData, StatusReport},
    calib::CalibStore,
    params::ArmExecParams,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Solve a single arm positioning command
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec")]
struct Opts {
    /// Calibration file to use instead of the one in the exec parameters
    #[structopt(long, parse(from_os_str))]
    calib: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: ArmCmd,
}

/// Everything produced for one command
#[derive(Serialize)]
struct ExecOutput<'a> {
    cmd: &'a ArmCmd,
    dems: Option<ArmDems>,
    report: StatusReport,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    let calib_path = match opts.calib {
        Some(p) => p,
        None => host::resolve(&params.calibration_path)
            .wrap_err("Could not resolve the calibration path")?,
    };

    let store = Arc::new(CalibStore::new(calib_path));
    store.load();

    let mut arm_ctrl = ArmCtrl::default();
    arm_ctrl
        .init(store.clone())
        .wrap_err("Failed to initialise ArmCtrl")?;
    info!("ArmCtrl init complete\n");

    // ---- PROCESS COMMAND ----

    let (dems, report) = arm_ctrl
        .proc(&InputData {
            cmd: Some(opts.cmd.clone()),
        })
        .wrap_err("ArmCtrl failed to process the command")?;

    if report.reach_limited {
        warn!("Target was out of reach, the arm will stop short of it");
    }
    if report.pulse_limited.iter().any(|l| *l) {
        warn!("Servo pulses were limited: {:?}", report.pulse_limited);
    }

    let output = ExecOutput {
        cmd: &opts.cmd,
        dems,
        report,
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&output).wrap_err("Failed to serialise the output")?
    );

    session
        .save("arm_dems.json", &output)
        .wrap_err("Failed to save the demands")?;

    info!("End of execution");

    Ok(())
}
