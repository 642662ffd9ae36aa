//! Interactive arm shell
//!
//! Runs arm commands and the camera calibration procedure against a live
//! calibration store. Type `help` for the list of commands.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use rustyline::{error::ReadlineError, DefaultEditor};
use serde::Serialize;
use std::sync::Arc;
use structopt::{clap::AppSettings, StructOpt};

use arm_if::{
    geom::{PixelPoint, TablePoint},
    tc::{self, arm_ctrl::ArmCmd},
};
use arm_lib::{
    arm_ctrl::{ArmCtrl, InputData},
    calib::{CalibProcedure, CalibStep, CalibStore},
    coord,
    params::ArmExecParams,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PROMPT: &str = "Arm $ ";
const HISTORY_PATH: &str = "data/history.txt";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(
    name = "arm",
    setting = AppSettings::NoBinaryName,
    setting = AppSettings::DisableVersion
)]
enum ShellCmd {
    #[structopt(flatten)]
    Arm(ArmCmd),

    /// Run an arm command given as a JSON packet
    #[structopt(
        name = "json",
        setting = AppSettings::TrailingVarArg,
        setting = AppSettings::AllowLeadingHyphen
    )]
    Json { packet: Vec<String> },

    /// Convert a pixel into table coordinates
    #[structopt(name = "p2t")]
    PixelToTable { cx: i32, cy: i32 },

    /// Convert a table point into the pixel over it
    #[structopt(name = "t2p", setting = AppSettings::AllowNegativeNumbers)]
    TableToPixel { x_m: f64, y_m: f64 },

    /// Show the full joint breakdown for a table target
    #[structopt(name = "info", setting = AppSettings::AllowNegativeNumbers)]
    Info {
        x_m: f64,
        y_m: f64,
        #[structopt(long, default_value = "0.02")]
        z_m: f64,
    },

    /// Feed a click to the calibration procedure
    #[structopt(name = "click")]
    Click { x: i32, y: i32 },

    /// Show the current calibration and the procedure's working copy
    #[structopt(name = "show")]
    Show,

    /// Show the reference grid for the working calibration
    #[structopt(name = "grid")]
    Grid,

    /// Make the working calibration current without saving it
    #[structopt(name = "apply")]
    Apply,

    /// Save the working calibration and make it current
    #[structopt(name = "save")]
    Save,

    /// Restart the calibration procedure from the current calibration
    #[structopt(name = "reset")]
    Reset,

    /// Reload the calibration file
    #[structopt(name = "reload")]
    Reload,

    /// Exit the shell
    #[structopt(name = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shell state.
struct Shell {
    params: ArmExecParams,
    store: Arc<CalibStore>,
    arm_ctrl: ArmCtrl,
    procedure: CalibProcedure,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let session =
        Session::new("command_line_arm", "sessions").wrap_err("Failed to create the session")?;
    logger_init(LevelFilter::Info, &session).wrap_err("Failed to initialise logging")?;

    let params: ArmExecParams =
        util::params::load("arm_exec.toml").wrap_err("Could not load exec params")?;

    let store = Arc::new(CalibStore::new(
        host::resolve(&params.calibration_path)
            .wrap_err("Could not resolve the calibration path")?,
    ));
    let profile = store.load();

    let mut arm_ctrl = ArmCtrl::default();
    arm_ctrl
        .init(store.clone())
        .wrap_err("Failed to initialise ArmCtrl")?;

    let procedure = CalibProcedure::new((*profile).clone(), params.calib_reference_m)
        .wrap_err("Invalid calibration reference distance")?;

    let mut shell = Shell {
        params,
        store,
        arm_ctrl,
        procedure,
    };

    let history_path = host::resolve(HISTORY_PATH).wrap_err("Could not resolve history path")?;

    let mut rl = DefaultEditor::new().wrap_err("Failed to create the line editor")?;
    if rl.load_history(&history_path).is_err() {
        info!("No history detected");
    }

    loop {
        let line = match rl.readline(PROMPT) {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("Unhandled Error: {:?}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let cmd = match ShellCmd::from_iter_safe(line.split_whitespace()) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e.message);
                continue;
            }
        };

        if let ShellCmd::Quit = cmd {
            break;
        }

        if let Err(e) = shell.exec(cmd) {
            println!("Error: {:#}", e);
        }
    }

    if let Some(parent) = history_path.parent() {
        std::fs::create_dir_all(parent).wrap_err("Failed to create the history directory")?;
    }
    rl.save_history(&history_path)
        .wrap_err("Failed to save the history")?;

    Ok(())
}

fn print_json<T: Serialize>(data: &T) -> Result<(), Report> {
    println!(
        "{}",
        serde_json::to_string_pretty(data).wrap_err("Failed to serialise the output")?
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Shell {
    fn exec(&mut self, cmd: ShellCmd) -> Result<(), Report> {
        match cmd {
            ShellCmd::Json { packet } => {
                let arm_cmd =
                    tc::from_json(&packet.join(" ")).wrap_err("Invalid command packet")?;
                self.exec(ShellCmd::Arm(arm_cmd))?;
            }
            ShellCmd::Arm(arm_cmd) => {
                let (dems, report) = self
                    .arm_ctrl
                    .proc(&InputData { cmd: Some(arm_cmd) })
                    .wrap_err("ArmCtrl failed to process the command")?;

                if let Some(dems) = dems {
                    for config in dems.configs() {
                        println!("{:?}", config.servo.pulse_us);
                    }
                    print_json(&dems)?;
                }
                if report.reach_limited {
                    warn!("Target was out of reach, the arm will stop short of it");
                }
            }
            ShellCmd::PixelToTable { cx, cy } => {
                let point = coord::pixel_to_table(PixelPoint::new(cx, cy), &self.store.current())?;
                println!("({:.4}, {:.4}) m", point.x_m, point.y_m);
            }
            ShellCmd::TableToPixel { x_m, y_m } => {
                let pixel = coord::table_to_pixel(TablePoint::new(x_m, y_m), &self.store.current())?;
                println!("({}, {}) px", pixel.x, pixel.y);
            }
            ShellCmd::Info { x_m, y_m, z_m } => {
                print_json(&self.arm_ctrl.orientation_report(x_m, y_m, z_m)?)?;
            }
            ShellCmd::Click { x, y } => {
                let step = self.procedure.click(PixelPoint::new(x, y));
                match step {
                    CalibStep::Origin => println!("Click the table origin"),
                    CalibStep::ScaleX => println!(
                        "Click {:.0} mm to the right of the origin",
                        self.params.calib_reference_m * 1000.0
                    ),
                    CalibStep::ScaleY => println!(
                        "Click {:.0} mm forward of the last click",
                        self.params.calib_reference_m * 1000.0
                    ),
                    CalibStep::Complete => println!("Calibration complete, `apply` or `save` it"),
                }
            }
            ShellCmd::Show => {
                println!("Current:");
                print_json(&*self.store.current())?;
                println!("Working ({:?}):", self.procedure.step());
                print_json(self.procedure.profile())?;
            }
            ShellCmd::Grid => {
                let grid = coord::reference_grid(
                    self.procedure.profile(),
                    self.params.frame_width_px,
                    self.params.frame_height_px,
                    self.params.grid_step_px,
                    self.params.grid_half_count,
                )?;
                for (pixel, point) in grid {
                    println!(
                        "({:4}, {:4}) px -> ({:+.3}, {:+.3}) m",
                        pixel.x, pixel.y, point.x_m, point.y_m
                    );
                }
            }
            ShellCmd::Apply => {
                self.store.replace(self.procedure.profile().clone())?;
                info!("Working calibration applied");
            }
            ShellCmd::Save => {
                self.store.save(self.procedure.profile().clone())?;
            }
            ShellCmd::Reset => {
                self.procedure.reset((*self.store.current()).clone());
                println!("Click the table origin");
            }
            ShellCmd::Reload => {
                let profile = self.store.load();
                self.procedure.reset((*profile).clone());
            }
            ShellCmd::Quit => (),
        }

        Ok(())
    }
}
