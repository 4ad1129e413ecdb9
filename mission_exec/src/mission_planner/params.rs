//! Mission planner parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the mission planner
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Maximum distance between the vehicle and the centerline of its segment for a lane
    /// change to be considered complete.
    pub distance_to_centerline_threshold_m: f64,

    /// How far ahead on the target lane the goal point is placed when a maneuver starts.
    pub projection_distance_on_goallane_m: f64,

    /// Number of attempts at triggering a maneuver before it is dropped.
    pub retrigger_attempts_max: u32,

    /// Frame odometry is expected to be given in.
    pub local_map_frame: String,

    /// Number of odometry updates between two recenterings of the goal point.
    pub recenter_period: usize,

    /// If true every selected lane is extended backwards by one predecessor segment.
    pub prepend_predecessor: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            distance_to_centerline_threshold_m: 0.2,
            projection_distance_on_goallane_m: 30.0,
            retrigger_attempts_max: 10,
            local_map_frame: String::from("map"),
            recenter_period: 10,
            prepend_predecessor: true,
        }
    }
}
