//! # Trajectory and path messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A single oriented waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub position: Point3<f64>,

    /// Rotation from the local frame into the direction of travel at this point
    pub orientation: UnitQuaternion<f64>,

    pub longitudinal_velocity_mps: f64,
}

/// An ordered sequence of waypoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<TrajectoryPoint>,
}

/// Waypoints plus the drivable area around them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<TrajectoryPoint>,
    pub left_bound: Vec<Point3<f64>>,
    pub right_bound: Vec<Point3<f64>>,
}
