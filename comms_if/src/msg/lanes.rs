//! # Mission lane messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Geometry of one drivable lane: a centerline with the two bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrivingCorridor {
    pub centerline: Vec<Point3<f64>>,
    pub bound_left: Vec<Point3<f64>>,
    pub bound_right: Vec<Point3<f64>>,
}

/// The lanes available to the vehicle and the one it should be driving in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissionLanes {
    /// Selector of the lane to drive in: 0 is the ego lane, `-k` the k-th lane to the left
    /// and `+k` the k-th lane to the right.
    pub target_lane: i32,

    /// Deadline of the current mission in meters.
    pub deadline_target_lane_m: i32,

    pub ego_lane: DrivingCorridor,

    /// Lanes to the left ordered by increasing lateral offset.
    pub drivable_lanes_left: Vec<DrivingCorridor>,

    /// Lanes to the right ordered by increasing lateral offset.
    pub drivable_lanes_right: Vec<DrivingCorridor>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DrivingCorridor {
    /// True if the corridor has no centerline.
    pub fn is_empty(&self) -> bool {
        self.centerline.is_empty()
    }
}
