//! Mission planner module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::{LocalMap, MissionLanes, MissionMsg, Odometry};
use log::{error, info, warn};
use nalgebra::Point2;
use serde::Serialize;

use super::{MissionPlannerError, Params};
use crate::{
    corridor::{build_corridor, build_corridors},
    goal_point::{
        distance_point_to_polyline, is_on_lane, point_on_lane_at_x, GoalPointManager,
        ResetOutcome,
    },
    lane_select::{find_ego_segment, select_lanes, Lanes},
    loc::Pose2,
    mission::Mission,
    road_graph::RoadGraph,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Frame odometry is expected to describe the pose of.
const BODY_FRAME: &str = "base_link";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Mission planner module state.
pub struct MissionPlanner {
    params: Params,

    goal_mgr: GoalPointManager,

    /// Maneuver currently being carried out
    mission: Mission,

    /// Target lane selector given to downstream modules
    target_lane: i32,

    /// Deadline of the last mission, forwarded as is
    deadline_m: i32,

    /// A requested maneuver which could not yet be triggered
    pending: Option<PendingManeuver>,

    /// Road graph and lanes of the last local map
    graph: Option<RoadGraph>,
    lanes: Lanes,

    /// Pose from the previous odometry message
    prev_pose: Option<Pose2>,

    /// Set once a wrongly framed odometry message has been reported
    odom_frame_error_reported: bool,

    report: StatusReport,

    arch_goal: Archiver,

    num_cycles: u64,
}

#[derive(Debug, Copy, Clone)]
struct PendingManeuver {
    mission: Mission,

    /// Number of trigger attempts made so far
    attempts: u32,
}

/// Input data to the mission planner. Any combination of messages may arrive in a cycle.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub odometry: Option<Odometry>,
    pub mission: Option<MissionMsg>,
    pub local_map: Option<LocalMap>,
}

/// Output of the mission planner, present in cycles that received a local map.
pub type OutputData = Option<MissionLanes>;

/// Status report for mission planner processing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Index of the segment occupied by the vehicle, if a local map was processed
    pub ego_segment: Option<usize>,

    pub mission: Mission,

    pub target_lane: i32,

    pub goal_point_m: (f64, f64),

    /// The goal point was snapped to a centerline during the motion update
    pub goal_recentered: bool,

    /// The goal point was behind the vehicle and was reset or given up on
    pub goal_reset: Option<ResetOutcome>,

    /// A pending maneuver was triggered
    pub maneuver_triggered: bool,

    /// A pending maneuver ran out of trigger attempts
    pub maneuver_dropped: bool,

    /// The active maneuver finished this cycle
    pub mission_complete: bool,
}

/// Flat record written to the goal point archive.
#[derive(Serialize)]
struct GoalRecord {
    cycle: u64,
    mission: Mission,
    target_lane: i32,
    goal_x_m: f64,
    goal_y_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for MissionPlanner {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl State for MissionPlanner {
    type InitData = &'static str;
    type InitError = MissionPlannerError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = MissionPlannerError;

    /// Initialise the mission planner.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(MissionPlannerError::ParamLoadError)?;

        *self = Self::with_params(params);

        self.arch_goal = Archiver::from_path(session, "goal_point.csv")
            .map_err(MissionPlannerError::ArchiveError)?;

        Ok(())
    }

    /// Process one planning cycle.
    ///
    /// If the local map can't be converted into a road graph the error is returned and nothing
    /// from this cycle's input is applied.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Build the graph before touching any state so a bad map rejects the whole cycle
        let graph = match input_data.local_map {
            Some(ref map) => Some(
                RoadGraph::from_msg(&map.road_segments)
                    .map_err(MissionPlannerError::RoadGraphError)?,
            ),
            None => None,
        };

        self.report = StatusReport::default();

        if let Some(ref odom) = input_data.odometry {
            self.update_odometry(odom);
        }

        if let Some(ref mission) = input_data.mission {
            self.update_mission(mission);
        }

        let output = match graph {
            Some(g) => Some(self.update_local_map(g)),
            None => None,
        };

        let goal = self.goal_mgr.goal_point();
        self.report.mission = self.mission;
        self.report.target_lane = self.target_lane;
        self.report.goal_point_m = (goal.x, goal.y);

        if let Err(e) = self.write() {
            warn!("Could not archive the goal point: {}", e);
        }

        self.num_cycles += 1;

        Ok((output, self.report.clone()))
    }
}

impl Archived for MissionPlanner {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let goal = self.goal_mgr.goal_point();

        self.arch_goal.serialise(GoalRecord {
            cycle: self.num_cycles,
            mission: self.mission,
            target_lane: self.target_lane,
            goal_x_m: goal.x,
            goal_y_m: goal.y,
        })
    }
}

impl MissionPlanner {
    /// Create a planner from already loaded parameters, without archiving.
    pub fn with_params(params: Params) -> Self {
        Self {
            goal_mgr: GoalPointManager::new(params.recenter_period),
            params,
            mission: Mission::Stay,
            target_lane: 0,
            deadline_m: 0,
            pending: None,
            graph: None,
            lanes: Lanes::none(),
            prev_pose: None,
            odom_frame_error_reported: false,
            report: StatusReport::default(),
            arch_goal: Archiver::default(),
            num_cycles: 0,
        }
    }

    pub fn mission(&self) -> Mission {
        self.mission
    }

    pub fn target_lane(&self) -> i32 {
        self.target_lane
    }

    pub fn goal_point(&self) -> Point2<f64> {
        self.goal_mgr.goal_point()
    }

    /// Lanes selected from the last local map.
    pub fn lanes(&self) -> &Lanes {
        &self.lanes
    }

    fn update_odometry(&mut self, odom: &Odometry) {
        if !self.odom_frame_error_reported
            && (odom.frame_id != self.params.local_map_frame || odom.child_frame_id != BODY_FRAME)
        {
            error!(
                "Odometry is expected to go from <{}> to <{}> but goes from <{}> to <{}>. \
                 It will still be used, this error is only reported once.",
                self.params.local_map_frame, BODY_FRAME, odom.frame_id, odom.child_frame_id
            );
            self.odom_frame_error_reported = true;
        }

        let pose = Pose2::from_odometry(odom);

        if let Some(prev) = self.prev_pose {
            let delta = prev.to_local(&pose);
            self.report.goal_recentered = self.goal_mgr.apply_motion(&delta, self.graph.as_ref());
        }

        self.prev_pose = Some(pose);
    }

    fn update_mission(&mut self, msg: &MissionMsg) {
        let mission = Mission::from(msg.mission_type);
        self.deadline_m = msg.deadline_m;

        match mission {
            Mission::Stay => {
                info!("Lane keeping requested");
                self.mission = Mission::Stay;
                self.target_lane = 0;
                self.pending = None;
            }
            Mission::Left | Mission::Right | Mission::LaneChangeLeft | Mission::LaneChangeRight => {
                info!("{:?} requested", mission);
                self.pending = Some(PendingManeuver {
                    mission,
                    attempts: 0,
                });
                self.try_trigger();
            }
        }
    }

    /// Attempt to start the pending maneuver by placing the goal point on the lane it moves
    /// into.
    fn try_trigger(&mut self) {
        let (mission, attempts) = match self.pending.as_mut() {
            Some(p) => {
                p.attempts += 1;
                (p.mission, p.attempts)
            }
            None => return,
        };

        let side = match mission.side() {
            Some(s) => s,
            None => {
                self.pending = None;
                return;
            }
        };

        let lane = if mission.targets_outermost() {
            self.lanes.outermost(side)
        } else {
            Some(self.lanes.first(side)).filter(|l| !l.is_empty())
        };

        let goal = match (lane, self.graph.as_ref()) {
            (Some(lane), Some(graph)) => {
                point_on_lane_at_x(lane, self.params.projection_distance_on_goallane_m, graph)
            }
            _ => None,
        };

        match goal {
            Some(goal) => {
                info!(
                    "{:?} triggered, goal point at ({:.2}, {:.2})",
                    mission, goal.x, goal.y
                );
                self.goal_mgr.set_goal_point(goal);
                self.mission = mission;
                self.target_lane = mission.target_lane(self.lanes.num_lanes(side));
                self.pending = None;
                self.report.maneuver_triggered = true;
            }
            None => warn!(
                "No lane on the {:?} to move into (attempt {}/{})",
                side, attempts, self.params.retrigger_attempts_max
            ),
        }
    }

    fn update_local_map(&mut self, graph: RoadGraph) -> MissionLanes {
        let ego = find_ego_segment(&graph);
        self.lanes = select_lanes(&graph, ego, self.params.prepend_predecessor);
        self.graph = Some(graph);
        self.report.ego_segment = ego;

        // Retry a maneuver which couldn't be triggered yet
        if let Some(p) = self.pending {
            if p.attempts <= self.params.retrigger_attempts_max {
                self.try_trigger();
            }
        }
        if let Some(p) = self.pending {
            if p.attempts > self.params.retrigger_attempts_max {
                warn!(
                    "{:?} failed after {} attempts, it must be requested again",
                    p.mission, p.attempts
                );
                self.pending = None;
                self.report.maneuver_dropped = true;
            }
        }

        let graph = match self.graph.as_ref() {
            Some(g) => g,
            None => return MissionLanes::default(),
        };

        match self.goal_mgr.check_reset(graph, self.mission) {
            ResetOutcome::Unchanged => (),
            ResetOutcome::Abandoned => {
                warn!("Lane of the goal point can't be determined, mission reset");
                self.mission = Mission::Stay;
                self.target_lane = 0;
                self.report.goal_reset = Some(ResetOutcome::Abandoned);
            }
            outcome => self.report.goal_reset = Some(outcome),
        }

        // Check for completion of the active maneuver
        if let (Some(side), Some(ego)) = (self.mission.side(), ego) {
            let goal = self.goal_mgr.goal_point();
            let on_goal_lane = is_on_lane(ego, &goal, graph);
            let dist_to_centerline = graph
                .segment(ego)
                .map(|s| distance_point_to_polyline(&Point2::origin(), &s.centerline_2d()))
                .unwrap_or(std::f64::INFINITY);

            if on_goal_lane && dist_to_centerline <= self.params.distance_to_centerline_threshold_m
            {
                info!("{:?} complete, keeping lane", self.mission);
                self.mission = Mission::Stay;
                self.target_lane = 0;
                self.report.mission_complete = true;
            } else if on_goal_lane {
                self.target_lane = 0;
            } else {
                self.target_lane = self.mission.target_lane(self.lanes.num_lanes(side));
            }
        }

        MissionLanes {
            target_lane: self.target_lane,
            deadline_target_lane_m: self.deadline_m,
            ego_lane: build_corridor(&self.lanes.ego, graph),
            drivable_lanes_left: build_corridors(&self.lanes.left, graph),
            drivable_lanes_right: build_corridors(&self.lanes.right, graph),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::road_graph::test::straight;
    use comms_if::msg::{MissionType, RoadSegments};
    use nalgebra::{Point3, UnitQuaternion};

    /// Parallel lanes between x = -10 and x = 50, each one 1 m wide. Lane `k` of `lanes` is
    /// centred on `y = k - ego_offset_m`, so the vehicle sits in the lane `ego_offset_m`.
    fn parallel_lanes(num_lanes: i64, ego_offset_m: f64) -> LocalMap {
        let segments = (0..num_lanes)
            .map(|k| {
                let y = k as f64 - ego_offset_m;
                let left = if k + 1 < num_lanes { k + 1 } else { -1 };
                straight(k, -10.0, 50.0, y - 0.5, y + 0.5, [left, -1], vec![-1])
            })
            .collect();

        LocalMap {
            road_segments: RoadSegments { segments },
        }
    }

    fn odometry(x: f64, y: f64) -> Odometry {
        Odometry {
            frame_id: String::from("map"),
            child_frame_id: String::from("base_link"),
            position: Point3::new(x, y, 0.0),
            orientation: UnitQuaternion::identity(),
        }
    }

    fn mission(mission_type: MissionType) -> MissionMsg {
        MissionMsg {
            mission_type,
            deadline_m: 100,
        }
    }

    #[test]
    fn test_lane_keep() {
        let mut mp = MissionPlanner::default();

        let (out, report) = mp
            .proc(&InputData {
                local_map: Some(parallel_lanes(2, 0.0)),
                ..Default::default()
            })
            .unwrap();

        let out = out.unwrap();
        assert_eq!(out.target_lane, 0);
        assert_eq!(report.ego_segment, Some(0));
        assert_eq!(out.ego_lane.centerline[0], Point3::new(-10.0, 0.0, 0.0));
        assert_eq!(out.drivable_lanes_left.len(), 1);
        assert_eq!(out.drivable_lanes_left[0].centerline[0], Point3::new(-10.0, 1.0, 0.0));
        assert_eq!(out.drivable_lanes_right.len(), 1);
        assert!(out.drivable_lanes_right[0].is_empty());
        assert_eq!(mp.mission(), Mission::Stay);
    }

    #[test]
    fn test_lane_change_left() {
        let mut mp = MissionPlanner::default();

        // Learn the lanes
        mp.proc(&InputData {
            odometry: Some(odometry(0.0, 0.0)),
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();

        // Request the change
        let (out, report) = mp
            .proc(&InputData {
                mission: Some(mission(MissionType::LaneChangeLeft)),
                local_map: Some(parallel_lanes(2, 0.0)),
                ..Default::default()
            })
            .unwrap();

        assert!(report.maneuver_triggered);
        assert_eq!(mp.mission(), Mission::LaneChangeLeft);
        assert_eq!(mp.goal_point(), Point2::new(30.0, 1.0));
        let out = out.unwrap();
        assert_eq!(out.target_lane, -1);
        assert_eq!(out.deadline_target_lane_m, 100);

        // The vehicle moves 1 m to the left, the map follows
        let (out, report) = mp
            .proc(&InputData {
                odometry: Some(odometry(0.0, 1.0)),
                local_map: Some(parallel_lanes(2, 1.0)),
                ..Default::default()
            })
            .unwrap();

        assert!((mp.goal_point() - Point2::new(30.0, 0.0)).norm() < 1e-9);
        assert_eq!(report.ego_segment, Some(1));
        assert!(report.mission_complete);
        assert_eq!(mp.mission(), Mission::Stay);
        assert_eq!(out.unwrap().target_lane, 0);
    }

    #[test]
    fn test_lane_change_partway() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            odometry: Some(odometry(0.0, 0.0)),
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();
        mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            ..Default::default()
        })
        .unwrap();

        // Over the lane line but not yet centred: on the goal lane so the target is now 0, but
        // the maneuver is still active
        let (out, report) = mp
            .proc(&InputData {
                odometry: Some(odometry(0.0, 0.6)),
                local_map: Some(parallel_lanes(2, 0.6)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(report.ego_segment, Some(1));
        assert!(!report.mission_complete);
        assert_eq!(mp.mission(), Mission::LaneChangeLeft);
        assert_eq!(out.unwrap().target_lane, 0);
    }

    #[test]
    fn test_trigger_retried_then_dropped() {
        let mut mp = MissionPlanner::with_params(Params {
            retrigger_attempts_max: 2,
            ..Params::default()
        });

        // Only one lane, nothing on the right
        let single = InputData {
            local_map: Some(parallel_lanes(1, 0.0)),
            ..Default::default()
        };
        mp.proc(&single).unwrap();

        let (_, report) = mp
            .proc(&InputData {
                mission: Some(mission(MissionType::LaneChangeRight)),
                local_map: Some(parallel_lanes(1, 0.0)),
                ..Default::default()
            })
            .unwrap();
        assert!(!report.maneuver_triggered);
        assert!(!report.maneuver_dropped);
        assert_eq!(mp.mission(), Mission::Stay);

        // Third attempt fails and the maneuver is given up
        let (_, report) = mp.proc(&single).unwrap();
        assert!(report.maneuver_dropped);

        let (_, report) = mp.proc(&single).unwrap();
        assert!(!report.maneuver_dropped);
        assert_eq!(mp.mission(), Mission::Stay);
    }

    #[test]
    fn test_trigger_retried_until_lane_appears() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            local_map: Some(parallel_lanes(1, 0.0)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mp.mission(), Mission::Stay);

        let (out, report) = mp
            .proc(&InputData {
                local_map: Some(parallel_lanes(2, 0.0)),
                ..Default::default()
            })
            .unwrap();

        assert!(report.maneuver_triggered);
        assert_eq!(mp.mission(), Mission::LaneChangeLeft);
        assert_eq!(out.unwrap().target_lane, -1);
    }

    #[test]
    fn test_take_next_exit_left() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            local_map: Some(parallel_lanes(3, 0.0)),
            ..Default::default()
        })
        .unwrap();

        let (out, _) = mp
            .proc(&InputData {
                mission: Some(mission(MissionType::TakeNextExitLeft)),
                local_map: Some(parallel_lanes(3, 0.0)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(mp.mission(), Mission::Left);
        assert_eq!(mp.goal_point(), Point2::new(30.0, 2.0));
        assert_eq!(out.unwrap().target_lane, -2);
        assert_eq!(mp.lanes().left, vec![vec![1], vec![2]]);
    }

    #[test]
    fn test_goal_reset_abandoned() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            odometry: Some(odometry(0.0, 0.0)),
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();
        mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            ..Default::default()
        })
        .unwrap();

        // Drive 45 m forward, leaving the goal point 15 m behind, and lose the left lane
        let (_, report) = mp
            .proc(&InputData {
                odometry: Some(odometry(45.0, 0.0)),
                local_map: Some(parallel_lanes(1, 0.0)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(report.goal_reset, Some(ResetOutcome::Abandoned));
        assert_eq!(mp.mission(), Mission::Stay);
        assert_eq!(report.target_lane, 0);
    }

    #[test]
    fn test_goal_reset_forward() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            odometry: Some(odometry(0.0, 0.0)),
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();
        mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            ..Default::default()
        })
        .unwrap();

        // Goal point ends up at x = -5, still on the left lane
        let (_, report) = mp
            .proc(&InputData {
                odometry: Some(odometry(35.0, 0.0)),
                local_map: Some(parallel_lanes(2, 0.0)),
                ..Default::default()
            })
            .unwrap();

        assert!(matches!(report.goal_reset, Some(ResetOutcome::Reset { .. })));
        assert_eq!(mp.goal_point(), Point2::new(50.0, 1.0));
        assert_eq!(mp.mission(), Mission::LaneChangeLeft);
    }

    #[test]
    fn test_bad_map_keeps_state() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();

        let mut bad = parallel_lanes(2, 0.0);
        bad.road_segments.segments[1].linestrings.truncate(1);

        let res = mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            local_map: Some(bad),
            ..Default::default()
        });

        assert!(matches!(res, Err(MissionPlannerError::RoadGraphError(_))));
        assert_eq!(mp.mission(), Mission::Stay);
        assert_eq!(mp.lanes().left, vec![vec![1]]);
    }

    #[test]
    fn test_lane_keep_cancels() {
        let mut mp = MissionPlanner::default();

        mp.proc(&InputData {
            local_map: Some(parallel_lanes(2, 0.0)),
            ..Default::default()
        })
        .unwrap();
        mp.proc(&InputData {
            mission: Some(mission(MissionType::LaneChangeLeft)),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mp.target_lane(), -1);

        let (_, report) = mp
            .proc(&InputData {
                mission: Some(mission(MissionType::LaneKeep)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(report.mission, Mission::Stay);
        assert_eq!(report.target_lane, 0);
    }
}
