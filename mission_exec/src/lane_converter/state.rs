//! Implementations for the LaneConverter state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::msg::{DrivingCorridor, MissionLanes, Path, Trajectory, TrajectoryPoint};
use log::{trace, warn};
use nalgebra::{Point3, UnitQuaternion};
use serde::Serialize;

// Internal
use super::{LaneConverterError, Params};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Lane converter module state
#[derive(Default)]
pub struct LaneConverter {
    params: Params,

    report: StatusReport,
    arch_report: Archiver,
}

/// Output of the lane converter, the trajectory and the path built around it.
pub type OutputData = (Trajectory, Path);

/// Status report for lane conversion.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// Selector received from the planner
    pub target_lane: i32,

    /// Selector of the corridor actually used, differs from `target_lane` if it was clamped
    pub selected_lane: i32,

    pub num_waypoints: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LaneConverter {
    type InitData = &'static str;
    type InitError = LaneConverterError;

    type InputData = MissionLanes;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LaneConverterError;

    /// Initialise the LaneConverter module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(LaneConverterError::ParamLoadError)?;

        self.arch_report = Archiver::from_path(session, "lane_converter.csv")
            .map_err(LaneConverterError::ArchiveError)?;

        Ok(())
    }

    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let (selected_lane, corridor) = select_corridor(input_data)?;

        if selected_lane != input_data.target_lane {
            warn!(
                "Target lane {} is not available, using lane {} instead",
                input_data.target_lane, selected_lane
            );
        }

        let traj = centerline_to_trajectory(&corridor.centerline, self.params.target_speed_mps);
        let path = build_path(&traj, selected_lane, corridor, &input_data.ego_lane);

        trace!(
            "Converted lane {} into {} waypoints",
            selected_lane,
            traj.points.len()
        );

        self.report = StatusReport {
            target_lane: input_data.target_lane,
            selected_lane,
            num_waypoints: traj.points.len(),
        };

        if let Err(e) = self.write() {
            warn!("Could not archive the lane converter status: {}", e);
        }

        Ok(((traj, path), self.report))
    }
}

impl Archived for LaneConverter {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl LaneConverter {
    /// Create a converter from already loaded parameters, without archiving.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Select the corridor named by the target lane selector.
///
/// 0 is the ego lane, `-k` the k-th lane to the left and `k` the k-th lane to the right. A
/// selector past the outermost lane on its side selects the outermost lane. Returns the
/// selector actually used along with the corridor.
pub fn select_corridor(
    lanes: &MissionLanes,
) -> Result<(i32, &DrivingCorridor), LaneConverterError> {
    let target = lanes.target_lane;

    let corridors = match target {
        0 => return Ok((0, &lanes.ego_lane)),
        t if t < 0 => &lanes.drivable_lanes_left,
        _ => &lanes.drivable_lanes_right,
    };

    let last = corridors
        .len()
        .checked_sub(1)
        .ok_or(LaneConverterError::TargetLaneUnavailable(target))?;
    let idx = (target.unsigned_abs() as usize - 1).min(last);

    Ok((target.signum() * (idx as i32 + 1), &corridors[idx]))
}

/// Turn a centerline into oriented waypoints.
///
/// Consecutive duplicate points are dropped. Each waypoint faces the next one, the final
/// waypoint has no successor and is given the identity orientation.
pub fn centerline_to_trajectory(centerline: &[Point3<f64>], speed_mps: f64) -> Trajectory {
    let mut points = centerline.to_vec();
    points.dedup();

    let points: Vec<TrajectoryPoint> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let orientation = match points.get(i + 1) {
                Some(next) => {
                    let dir = next - p;
                    UnitQuaternion::from_euler_angles(0.0, 0.0, dir.y.atan2(dir.x))
                }
                None => UnitQuaternion::identity(),
            };

            TrajectoryPoint {
                position: *p,
                orientation,
                longitudinal_velocity_mps: speed_mps,
            }
        })
        .collect();

    Trajectory { points }
}

/// Build the path for a trajectory following the `selected_lane` corridor.
///
/// The bound on the side of the maneuver comes from the target corridor and the other from
/// the ego corridor, so the path covers both lanes during a lane change.
pub fn build_path(
    traj: &Trajectory,
    selected_lane: i32,
    target: &DrivingCorridor,
    ego: &DrivingCorridor,
) -> Path {
    let (left_bound, right_bound) = match selected_lane {
        0 => (&ego.bound_left, &ego.bound_right),
        l if l < 0 => (&target.bound_left, &ego.bound_right),
        _ => (&ego.bound_left, &target.bound_right),
    };

    Path {
        points: traj.points.clone(),
        left_bound: left_bound.clone(),
        right_bound: right_bound.clone(),
    }
}
