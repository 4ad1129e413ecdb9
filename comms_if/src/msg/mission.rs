//! # Mission messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use structopt::StructOpt;

use super::MsgParseError;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A high level maneuver request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, StructOpt)]
pub struct MissionMsg {
    /// The requested maneuver.
    #[structopt(subcommand)]
    pub mission_type: MissionType,

    /// Distance in meters within which the maneuver should be completed. Forwarded to the
    /// mission lanes output without interpretation.
    #[serde(default)]
    #[structopt(long, default_value = "0")]
    pub deadline_m: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The maneuvers that can be requested from the planner.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionType {
    /// Stay in the current lane.
    #[structopt(name = "keep")]
    LaneKeep,

    /// Change into the lane directly to the left.
    #[structopt(name = "change-left")]
    LaneChangeLeft,

    /// Change into the lane directly to the right.
    #[structopt(name = "change-right")]
    LaneChangeRight,

    /// Move to the leftmost lane to take the next exit.
    #[structopt(name = "exit-left")]
    TakeNextExitLeft,

    /// Move to the rightmost lane to take the next exit.
    #[structopt(name = "exit-right")]
    TakeNextExitRight,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl FromStr for MissionType {
    type Err = MsgParseError;

    /// Parse the wire representation of a mission type.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LANE_KEEP" => Ok(MissionType::LaneKeep),
            "LANE_CHANGE_LEFT" => Ok(MissionType::LaneChangeLeft),
            "LANE_CHANGE_RIGHT" => Ok(MissionType::LaneChangeRight),
            "TAKE_NEXT_EXIT_LEFT" => Ok(MissionType::TakeNextExitLeft),
            "TAKE_NEXT_EXIT_RIGHT" => Ok(MissionType::TakeNextExitRight),
            _ => Err(MsgParseError::InvalidType(format!(
                "{} is not a recognised mission type",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mission_type_from_str() {
        assert_eq!(
            "TAKE_NEXT_EXIT_RIGHT".parse::<MissionType>().unwrap(),
            MissionType::TakeNextExitRight
        );
        assert!("lane_keep".parse::<MissionType>().is_err());
    }

    #[test]
    fn test_mission_from_cli() {
        let msg = MissionMsg::from_iter(&["mission", "--deadline-m", "150", "change-right"]);
        assert_eq!(msg.mission_type, MissionType::LaneChangeRight);
        assert_eq!(msg.deadline_m, 150);
    }
}
