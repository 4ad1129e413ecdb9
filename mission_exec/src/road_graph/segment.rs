//! Lane segment geometry

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Point3};

use crate::geom::{self, COORD_TOL_M};
use util::maths::is_between;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single lane segment. Boundaries are ordered along the direction of travel.
#[derive(Debug, Clone)]
pub struct LaneSegment {
    /// Id of the segment in the map provider's message
    pub id: i64,

    pub bound_right: Vec<Point3<f64>>,

    pub bound_left: Vec<Point3<f64>>,

    /// Midline between the two bounds
    pub centerline: Vec<Point3<f64>>,

    /// Longitudinal extent covered by either bound
    x_extent: (f64, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LaneSegment {
    /// Create a new segment, deriving its centerline.
    ///
    /// Both bounds must be non-empty.
    pub fn new(id: i64, bound_right: Vec<Point3<f64>>, bound_left: Vec<Point3<f64>>) -> Self {
        let centerline = geom::centerline(&bound_right, &bound_left);

        let x_extent = bound_right
            .iter()
            .chain(bound_left.iter())
            .fold((std::f64::INFINITY, std::f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });

        Self {
            id,
            bound_right,
            bound_left,
            centerline,
            x_extent,
        }
    }

    pub fn centerline_2d(&self) -> Vec<Point2<f64>> {
        geom::polyline_2d(&self.centerline)
    }

    /// The minimum and maximum forward coordinate covered by the segment.
    pub fn x_extent(&self) -> (f64, f64) {
        self.x_extent
    }

    /// True if the forward coordinate lies within the segment's extent (inclusive).
    pub fn contains_x(&self, x: f64) -> bool {
        is_between(x, self.x_extent.0, self.x_extent.1, COORD_TOL_M)
    }

    /// Lateral coordinates of the right and left bound at forward coordinate `x`.
    ///
    /// Bounds not reaching `x` are extended flat from their nearest end point. Returns `None`
    /// if `x` is outside the segment.
    pub fn bounds_at(&self, x: f64) -> Option<(f64, f64)> {
        if !self.contains_x(x) {
            return None;
        }

        let right = geom::point_at_x_clamped(&geom::polyline_2d(&self.bound_right), x)?;
        let left = geom::point_at_x_clamped(&geom::polyline_2d(&self.bound_left), x)?;

        Some((right.y, left.y))
    }

    /// Lateral coordinate of the centerline at forward coordinate `x`, or `None` if `x` is
    /// outside the segment.
    pub fn centerline_y_at(&self, x: f64) -> Option<f64> {
        if !self.contains_x(x) {
            return None;
        }

        geom::point_at_x_clamped(&self.centerline_2d(), x).map(|p| p.y)
    }

    /// Signed lateral offset of the point from the centerline, or `None` if the point is
    /// outside the segment's longitudinal extent.
    pub fn lateral_offset(&self, point: &Point2<f64>) -> Option<f64> {
        self.centerline_y_at(point.x).map(|y| point.y - y)
    }

    /// True if the point lies between the segment's bounds, boundaries included.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        match self.bounds_at(point.x) {
            Some((right, left)) => is_between(point.y, right, left, COORD_TOL_M),
            None => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn segment() -> LaneSegment {
        LaneSegment::new(
            3,
            vec![Point3::new(0.0, -0.5, 0.0), Point3::new(10.0, -1.5, 0.0)],
            vec![Point3::new(0.0, 0.5, 0.0), Point3::new(10.0, 1.5, 0.0)],
        )
    }

    #[test]
    fn test_bounds_at() {
        let seg = segment();

        assert_eq!(seg.x_extent(), (0.0, 10.0));
        assert_eq!(seg.bounds_at(5.0), Some((-1.0, 1.0)));
        assert_eq!(seg.bounds_at(10.5), None);
        assert_eq!(seg.centerline_y_at(5.0), Some(0.0));
    }

    #[test]
    fn test_contains() {
        let seg = segment();

        assert!(seg.contains(&Point2::new(5.0, 1.0)));
        assert!(seg.contains(&Point2::new(0.0, -0.5)));
        assert!(!seg.contains(&Point2::new(5.0, 1.0001)));
        assert!(!seg.contains(&Point2::new(-0.1, 0.0)));
        assert_eq!(seg.lateral_offset(&Point2::new(2.0, 0.25)), Some(0.25));
    }
}
