//! Main mission planner executable entry point.
//!
//! # Architecture
//!
//! The executable replays a scenario script of timestamped input messages through the planning
//! modules at a fixed cycle period:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Input acquisition from the script
//!         - Mission planning
//!         - Lane conversion
//!         - Output saving and archiving
//!
//! # Modules
//!
//! All modules (e.g. `mission_planner`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::msg::{MissionLanes, MissionMsg, Msg, Path, Trajectory};
use mission_lib::data_store::DataStore;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingMsgs, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mapless mission planner
#[derive(Debug, StructOpt)]
struct Opts {
    /// Scenario script to replay
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Pace cycles in real time rather than running as fast as possible
    #[structopt(long)]
    realtime: bool,

    #[structopt(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Request a mission on the first cycle, before any scripted mission
    Mission(MissionMsg),
}

/// Everything produced in one cycle, saved as a single JSON file.
#[derive(Serialize)]
struct CycleOutput {
    cycle: u64,
    sim_time_s: f64,
    timestamp: chrono::DateTime<chrono::Utc>,
    mission_lanes: Option<MissionLanes>,
    trajectory: Option<Trajectory>,
    path: Option<Path>,
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
    let session =
        Session::new("mission_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Mapless Mission Planner Executable\n");
    info!("Session started at {}", session::get_epoch());
    info!("Session directory: {:?}\n", session.session_root);

    debug!("CLI arguments: {:?}", opts);

    // ---- LOAD SCRIPT ----

    info!("Loading script from {:?}", opts.script);

    let mut si = ScriptInterpreter::new(&opts.script).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} messages\n",
        si.get_duration(),
        si.get_num_msgs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.mission_planner
        .init("mission_planner.toml", &session)
        .wrap_err("Failed to initialise MissionPlanner")?;
    info!("MissionPlanner init complete");

    ds.lane_converter
        .init("lane_converter.toml", &session)
        .wrap_err("Failed to initialise LaneConverter")?;
    info!("LaneConverter init complete");

    info!("Module initialisation complete\n");

    let mut initial_mission = match opts.cmd {
        Some(Cmd::Mission(m)) => Some(m),
        None => None,
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_PERIOD_S);

        // ---- DATA INPUT ----

        if let Some(m) = initial_mission.take() {
            info!("Requesting {:?} from the command line", m.mission_type);
            ds.accept_msg(Msg::Mission(m));
        }

        match si.get_pending(ds.sim_time_s) {
            PendingMsgs::None => (),
            PendingMsgs::Some(msgs) => {
                for msg in msgs {
                    ds.accept_msg(msg);
                }
            }
            // Exit if end of script reached
            PendingMsgs::EndOfScript => {
                info!("End of script reached, stopping");
                break;
            }
        }

        // ---- PLANNING ----

        match ds.mission_planner.proc(&ds.mission_planner_input) {
            Ok((o, r)) => {
                ds.mission_planner_output = o;
                ds.mission_planner_status_rpt = r;
            }
            Err(e) => {
                // A bad map only costs this cycle, the next one may well be fine
                warn!("Error during MissionPlanner processing: {}", e)
            }
        };

        if let Some(ref lanes) = ds.mission_planner_output {
            match ds.lane_converter.proc(lanes) {
                Ok(((traj, path), r)) => {
                    ds.trajectory = Some(traj);
                    ds.path = Some(path);
                    ds.lane_converter_status_rpt = r;
                }
                Err(e) => warn!("Error during LaneConverter processing: {}", e),
            }
        }

        // ---- SAVE OUTPUTS ----

        if ds.mission_planner_output.is_some() {
            session.save(
                format!("cycles/{:06}.json", ds.num_cycles),
                CycleOutput {
                    cycle: ds.num_cycles,
                    sim_time_s: ds.sim_time_s,
                    timestamp: chrono::Utc::now(),
                    mission_lanes: ds.mission_planner_output.clone(),
                    trajectory: ds.trajectory.clone(),
                    path: ds.path.clone(),
                },
            );
        }

        // ---- CYCLE MANAGEMENT ----

        if opts.realtime {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                ),
            }
        }

        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    info!(
        "Final mission {:?}, target lane {}",
        ds.mission_planner_status_rpt.mission, ds.mission_planner_status_rpt.target_lane
    );

    session.exit();

    info!("End of execution");

    Ok(())
}
