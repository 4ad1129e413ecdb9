//! # Data Store

use comms_if::msg::{Msg, Path, Trajectory};
use log::debug;

use crate::{lane_converter, mission_planner};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Simulation time of this cycle
    pub sim_time_s: f64,

    // MissionPlanner
    pub mission_planner: mission_planner::MissionPlanner,
    pub mission_planner_input: mission_planner::InputData,
    pub mission_planner_output: mission_planner::OutputData,
    pub mission_planner_status_rpt: mission_planner::StatusReport,

    // LaneConverter
    pub lane_converter: lane_converter::LaneConverter,
    pub lane_converter_status_rpt: lane_converter::StatusReport,
    pub trajectory: Option<Trajectory>,
    pub path: Option<Path>,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the inputs and outputs of the previous cycle and sets the simulation time.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        self.mission_planner_input = mission_planner::InputData::default();
        self.mission_planner_output = None;
        self.mission_planner_status_rpt = mission_planner::StatusReport::default();

        self.lane_converter_status_rpt = lane_converter::StatusReport::default();
        self.trajectory = None;
        self.path = None;

        self.sim_time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Route a message to the input it feeds.
    ///
    /// If more than one message of a type arrives in the same cycle the latest one is kept.
    pub fn accept_msg(&mut self, msg: Msg) {
        let input = &mut self.mission_planner_input;

        let replaced = match msg {
            Msg::LocalMap(m) => input.local_map.replace(m).is_some(),
            Msg::Mission(m) => input.mission.replace(m).is_some(),
            Msg::Odometry(m) => input.odometry.replace(m).is_some(),
        };

        if replaced {
            debug!(
                "More than one message of a type in cycle {}, using the latest",
                self.num_cycles
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::msg::{LocalMap, MissionMsg, MissionType};

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();

        ds.accept_msg(Msg::LocalMap(LocalMap::default()));
        ds.accept_msg(Msg::Mission(MissionMsg {
            mission_type: MissionType::LaneChangeLeft,
            deadline_m: 10,
        }));
        ds.accept_msg(Msg::Mission(MissionMsg {
            mission_type: MissionType::LaneKeep,
            deadline_m: 20,
        }));

        assert!(ds.mission_planner_input.local_map.is_some());
        assert!(ds.mission_planner_input.odometry.is_none());
        assert_eq!(ds.mission_planner_input.mission.as_ref().map(|m| m.deadline_m), Some(20));

        ds.num_cycles = 5;
        ds.cycle_start(0.1);

        assert!(ds.mission_planner_input.local_map.is_none());
        assert!(ds.mission_planner_input.mission.is_none());
        assert!((ds.sim_time_s - 0.5).abs() < 1e-12);
    }
}
