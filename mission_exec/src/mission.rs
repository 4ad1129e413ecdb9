//! # Missions
//!
//! The planner's view of the requested maneuver.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::MissionType;
use serde::Serialize;

use crate::road_graph::Side;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The maneuver currently being carried out.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Mission {
    /// Keep the current lane.
    Stay,

    /// Move to the leftmost lane, for taking the next exit on the left.
    Left,

    /// Move to the rightmost lane, for taking the next exit on the right.
    Right,

    /// Change into the adjacent lane on the left.
    LaneChangeLeft,

    /// Change into the adjacent lane on the right.
    LaneChangeRight,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Mission {
    fn default() -> Self {
        Mission::Stay
    }
}

impl From<MissionType> for Mission {
    fn from(t: MissionType) -> Self {
        match t {
            MissionType::LaneKeep => Mission::Stay,
            MissionType::LaneChangeLeft => Mission::LaneChangeLeft,
            MissionType::LaneChangeRight => Mission::LaneChangeRight,
            MissionType::TakeNextExitLeft => Mission::Left,
            MissionType::TakeNextExitRight => Mission::Right,
        }
    }
}

impl Mission {
    /// The side the maneuver moves towards, `None` for `Stay`.
    pub fn side(self) -> Option<Side> {
        match self {
            Mission::Stay => None,
            Mission::Left | Mission::LaneChangeLeft => Some(Side::Left),
            Mission::Right | Mission::LaneChangeRight => Some(Side::Right),
        }
    }

    /// True if the maneuver targets the outermost lane rather than the adjacent one.
    pub fn targets_outermost(self) -> bool {
        match self {
            Mission::Left | Mission::Right => true,
            Mission::Stay | Mission::LaneChangeLeft | Mission::LaneChangeRight => false,
        }
    }

    /// Target lane selector for this mission.
    ///
    /// `num_lanes` is the number of lanes available on the mission's side. Lane changes always
    /// select the adjacent lane, exits select the outermost available lane.
    pub fn target_lane(self, num_lanes: usize) -> i32 {
        let offset = match self {
            Mission::Stay => 0,
            Mission::LaneChangeLeft | Mission::LaneChangeRight => 1,
            Mission::Left | Mission::Right => num_lanes as i32,
        };

        match self.side() {
            Some(Side::Left) => -offset,
            Some(Side::Right) => offset,
            None => 0,
        }
    }
}
