//! # Odometry messages

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Pose estimate of the vehicle body in an odometry frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Odometry {
    /// Frame the pose is expressed in
    pub frame_id: String,

    /// Frame whose pose is given, normally the vehicle body
    pub child_frame_id: String,

    /// Position of the body in `frame_id`
    pub position: Point3<f64>,

    /// Attitude of the body in `frame_id`
    pub orientation: UnitQuaternion<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Odometry {
    /// Yaw of the body about the frame's z axis in radians.
    pub fn yaw(&self) -> f64 {
        self.orientation.euler_angles().2
    }
}
