//! # Localisation
//!
//! The planner works in a frame attached to the vehicle, so the only use of the vehicle's pose
//! is to move persistent points into the new frame after the vehicle has moved.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::Odometry;
use nalgebra::{Isometry2, Point2, Vector2};
use serde::Serialize;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Planar pose of the vehicle body in the odometry frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct Pose2 {
    pub position_m: Vector2<f64>,

    /// Heading about the frame's z axis, in `[-pi, pi)`
    pub psi_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2 {
    pub fn new(x_m: f64, y_m: f64, psi_rad: f64) -> Self {
        Self {
            position_m: Vector2::new(x_m, y_m),
            psi_rad: wrap_pi(psi_rad),
        }
    }

    /// Planar part of an odometry message.
    pub fn from_odometry(odom: &Odometry) -> Self {
        Self::new(odom.position.x, odom.position.y, odom.yaw())
    }

    fn isometry(&self) -> Isometry2<f64> {
        Isometry2::new(self.position_m, self.psi_rad)
    }

    /// Express `other` in the frame whose origin and x axis are given by this pose.
    pub fn to_local(&self, other: &Pose2) -> Pose2 {
        let p = self.to_local_point(&Point2::from(other.position_m));

        Pose2::new(p.x, p.y, other.psi_rad - self.psi_rad)
    }

    /// Express a point in the frame whose origin and x axis are given by this pose.
    pub fn to_local_point(&self, point: &Point2<f64>) -> Point2<f64> {
        self.isometry().inverse_transform_point(point)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::{Point3, UnitQuaternion};

    const PI: f64 = std::f64::consts::PI;

    fn assert_close(a: &Point2<f64>, b: &Point2<f64>) {
        assert!((a - b).norm() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_to_local_translation() {
        let prev = Pose2::new(10.0, 5.0, 0.0);
        let cur = Pose2::new(12.0, 5.0, 0.0);

        let delta = prev.to_local(&cur);
        assert_close(&Point2::from(delta.position_m), &Point2::new(2.0, 0.0));

        // A goal 30 m ahead is now 28 m ahead
        assert_close(
            &delta.to_local_point(&Point2::new(30.0, 1.5)),
            &Point2::new(28.0, 1.5),
        );
    }

    #[test]
    fn test_to_local_rotation() {
        // Vehicle turned left by 90 degrees on the spot
        let prev = Pose2::new(0.0, 0.0, 0.0);
        let cur = Pose2::new(0.0, 0.0, PI / 2.0);

        let delta = prev.to_local(&cur);
        assert!((delta.psi_rad - PI / 2.0).abs() < 1e-12);

        // A point straight ahead is now on the right
        assert_close(
            &delta.to_local_point(&Point2::new(10.0, 0.0)),
            &Point2::new(0.0, -10.0),
        );
    }

    #[test]
    fn test_from_odometry() {
        let odom = Odometry {
            frame_id: String::from("map"),
            child_frame_id: String::from("base_link"),
            position: Point3::new(1.0, 2.0, 3.0),
            orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, 0.3),
        };

        let pose = Pose2::from_odometry(&odom);
        assert_eq!(pose.position_m, Vector2::new(1.0, 2.0));
        assert!((pose.psi_rad - 0.3).abs() < 1e-12);
    }
}
