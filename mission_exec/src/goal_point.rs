//! # Goal point management
//!
//! The goal point marks where the current maneuver should end, for example a point 30 m ahead
//! on the lane being changed into. It is the only state the planner carries from one cycle to
//! the next. Between cycles it is moved with the vehicle's motion and periodically snapped
//! back onto the nearest centerline so odometry drift doesn't carry it off its lane.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use nalgebra::Point2;
use serde::Serialize;

use crate::{
    corridor::build_corridor,
    geom,
    lane_select::{find_ego_segment, select_lanes},
    loc::Pose2,
    mission::Mission,
    road_graph::RoadGraph,
};

pub use crate::geom::distance_point_to_polyline;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Owner of the persistent goal point.
#[derive(Debug, Clone)]
pub struct GoalPointManager {
    goal_point: Point2<f64>,

    /// Number of motion updates between two recenterings
    recenter_period: usize,

    /// Motion updates since the last recentering
    num_updates_since_recenter: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of checking whether the goal point needs resetting.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum ResetOutcome {
    /// The goal point was left where it was.
    Unchanged,

    /// The goal point was behind the vehicle and has been moved forward.
    Reset {
        from: Point2<f64>,
        to: Point2<f64>,
    },

    /// The goal point was behind the vehicle but no lane could be found to move it onto, so
    /// the maneuver can't be completed.
    Abandoned,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalPointManager {
    /// Create a new manager with the goal point at the origin.
    pub fn new(recenter_period: usize) -> Self {
        Self {
            goal_point: Point2::origin(),
            recenter_period,
            num_updates_since_recenter: 0,
        }
    }

    pub fn goal_point(&self) -> Point2<f64> {
        self.goal_point
    }

    pub fn set_goal_point(&mut self, goal_point: Point2<f64>) {
        self.goal_point = goal_point;
    }

    /// Move the goal point onto the nearest centerline.
    pub fn recenter_goal(&mut self, graph: &RoadGraph) {
        self.goal_point = recenter(&self.goal_point, graph);
    }

    /// Move the goal point into the vehicle's new frame.
    ///
    /// `delta` is the vehicle's current pose expressed in its previous frame. Every
    /// `recenter_period` updates the goal point is also recentered on `graph`, if one is
    /// available. Returns true if the goal point was recentered.
    pub fn apply_motion(&mut self, delta: &Pose2, graph: Option<&RoadGraph>) -> bool {
        self.goal_point = delta.to_local_point(&self.goal_point);

        if self.num_updates_since_recenter >= self.recenter_period {
            self.num_updates_since_recenter = 0;
            if let Some(g) = graph {
                self.recenter_goal(g);
                return true;
            }
        } else {
            self.num_updates_since_recenter += 1;
        }

        false
    }

    /// Reset the goal point if it has fallen behind the vehicle during a maneuver.
    ///
    /// Under `Stay` the goal point is never touched. Otherwise a goal point with a negative
    /// forward coordinate is moved to the far end of the lane it lies on. If it isn't on any
    /// lane, the lane the maneuver moves into is used instead: the outermost lane on the
    /// maneuver's side for exits, the adjacent one for lane changes. If neither exists the
    /// maneuver is abandoned and the goal point left unchanged.
    pub fn check_reset(&mut self, graph: &RoadGraph, mission: Mission) -> ResetOutcome {
        let side = match mission.side() {
            Some(s) => s,
            None => return ResetOutcome::Unchanged,
        };

        if self.goal_point.x >= 0.0 {
            return ResetOutcome::Unchanged;
        }

        let lane = match graph.find_occupied_segment(&self.goal_point) {
            Some(idx) => graph.successor_chain(idx),
            None => {
                debug!(
                    "Goal point is not on any lane, using the {:?} lane for {:?}",
                    side, mission
                );
                let lanes = select_lanes(graph, find_ego_segment(graph), false);
                let target = if mission.targets_outermost() {
                    lanes.outermost(side)
                } else {
                    Some(lanes.first(side))
                };
                target.map(|l| l.to_vec()).unwrap_or_default()
            }
        };

        match lane_end_point(&lane, graph) {
            Some(to) => {
                let from = self.goal_point;
                self.goal_point = to;
                info!(
                    "Goal point ({:.2}, {:.2}) is behind the vehicle, reset to ({:.2}, {:.2})",
                    from.x, from.y, to.x, to.y
                );
                ResetOutcome::Reset { from, to }
            }
            None => ResetOutcome::Abandoned,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The point of the lane's centerline with forward coordinate `target_x`.
///
/// If the centerline doesn't reach `target_x` the nearest end of it is returned. Returns `None`
/// for an empty lane.
pub fn point_on_lane_at_x(lane: &[usize], target_x: f64, graph: &RoadGraph) -> Option<Point2<f64>> {
    let centerline = geom::polyline_2d(&build_corridor(lane, graph).centerline);

    geom::point_at_x_clamped(&centerline, target_x)
}

/// The final point of the lane's centerline, or `None` for an empty lane.
pub fn lane_end_point(lane: &[usize], graph: &RoadGraph) -> Option<Point2<f64>> {
    build_corridor(lane, graph)
        .centerline
        .last()
        .map(geom::to_2d)
}

/// Move a point laterally onto the nearest centerline.
///
/// The segment used is the one whose longitudinal extent contains the point and whose
/// centerline is laterally nearest. Points outside every segment are returned unchanged.
pub fn recenter(point: &Point2<f64>, graph: &RoadGraph) -> Point2<f64> {
    graph
        .find_nearest_segment(point)
        .and_then(|idx| graph.segment(idx))
        .and_then(|seg| seg.centerline_y_at(point.x))
        .map(|y| Point2::new(point.x, y))
        .unwrap_or(*point)
}

/// True if the point lies on the lane formed by the successor chain rooted at `lane_id`.
///
/// The point must be within the chain's longitudinal extent and between the bounds of the
/// segment covering it. Points on a boundary count as on the lane.
pub fn is_on_lane(lane_id: usize, point: &Point2<f64>, graph: &RoadGraph) -> bool {
    graph
        .successor_chain(lane_id)
        .iter()
        .filter_map(|&idx| graph.segment(idx))
        .any(|seg| seg.contains(point))
}
