//! # Mission planner module
//!
//! The mission planner turns the local road graph and the requested maneuver into the set of
//! lanes the vehicle can drive in, and tells downstream modules which of them to target.
//!
//! Each cycle the planner:
//!  1. Moves the goal point with the vehicle's motion, if new odometry arrived.
//!  1. Accepts a new mission, triggering the maneuver against the last known lanes.
//!  1. Rebuilds the road graph and lanes from the new local map, retries any maneuver which
//!     could not be triggered, resets the goal point if it fell behind the vehicle and checks
//!     whether the maneuver has been completed.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

use crate::road_graph::RoadGraphError;
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during mission planning.
#[derive(Debug, thiserror::Error)]
pub enum MissionPlannerError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not set up the archive: {0}")]
    ArchiveError(ArchiveError),

    #[error("The local map could not be converted into a road graph: {0}")]
    RoadGraphError(RoadGraphError),
}
