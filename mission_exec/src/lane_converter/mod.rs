//! # Lane converter module
//!
//! Turns the planner's lanes into something a trajectory follower can use: the centerline of
//! the selected lane as oriented waypoints at a constant speed, plus the drivable area around
//! it.

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

use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during lane conversion.
#[derive(Debug, thiserror::Error)]
pub enum LaneConverterError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Could not set up the archive: {0}")]
    ArchiveError(ArchiveError),

    #[error("Target lane {0} was requested but there are no lanes on that side")]
    TargetLaneUnavailable(i32),
}
