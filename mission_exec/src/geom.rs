//! # Polyline geometry
//!
//! All lane geometry lives in the ego-relative frame, x forward and y to the left. Points carry
//! a z coordinate which is passed through but never used in any computation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Point3};
use util::maths::{clamp, is_between, lin_map};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used when comparing coordinates along a polyline.
pub const COORD_TOL_M: f64 = 1e-9;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Drop the z coordinate of a point.
pub fn to_2d(point: &Point3<f64>) -> Point2<f64> {
    Point2::new(point.x, point.y)
}

/// Drop the z coordinate of every point of a polyline.
pub fn polyline_2d(line: &[Point3<f64>]) -> Vec<Point2<f64>> {
    line.iter().map(to_2d).collect()
}

/// Distance from a point to the segment `a`-`b`, with the projection clamped to the segment.
pub fn point_segment_distance(point: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();

    if len_sq == 0.0 {
        return (point - a).norm();
    }

    let t = clamp((point - a).dot(&ab) / len_sq, 0.0, 1.0);

    (point - (a + ab * t)).norm()
}

/// Minimum distance from a point to a piecewise linear curve.
///
/// A single point curve gives the distance to that point, an empty curve gives infinity.
pub fn distance_point_to_polyline(point: &Point2<f64>, polyline: &[Point2<f64>]) -> f64 {
    match polyline.len() {
        0 => std::f64::INFINITY,
        1 => (point - polyline[0]).norm(),
        _ => polyline
            .windows(2)
            .map(|w| point_segment_distance(point, &w[0], &w[1]))
            .fold(std::f64::INFINITY, f64::min),
    }
}

/// The minimum and maximum x coordinate of a polyline.
pub fn x_extent(line: &[Point2<f64>]) -> Option<(f64, f64)> {
    let first = line.first()?;

    Some(
        line.iter()
            .fold((first.x, first.x), |(lo, hi), p| (lo.min(p.x), hi.max(p.x))),
    )
}

/// Interpolated point of the polyline with forward coordinate `x`.
///
/// The first pair of consecutive points bracketing `x` is used. Returns `None` if no pair does,
/// including for empty lines.
pub fn interpolate_at_x(line: &[Point2<f64>], x: f64) -> Option<Point2<f64>> {
    if line.len() == 1 {
        return match (line[0].x - x).abs() <= COORD_TOL_M {
            true => Some(line[0]),
            false => None,
        };
    }

    line.windows(2)
        .find(|w| is_between(x, w[0].x, w[1].x, COORD_TOL_M))
        .map(|w| {
            let y = lin_map((w[0].x, w[1].x), (w[0].y, w[1].y), x);
            Point2::new(x, y)
        })
}

/// Lateral coordinate of the polyline at forward coordinate `x`, if the line covers `x`.
pub fn y_at_x(line: &[Point2<f64>], x: f64) -> Option<f64> {
    interpolate_at_x(line, x).map(|p| p.y)
}

/// Point of the polyline at forward coordinate `x`, clamped to the line's end points.
///
/// Where no part of the line covers `x` the end point whose forward coordinate is nearest to
/// `x` is returned, so a target past the end of the line gives its final point.
pub fn point_at_x_clamped(line: &[Point2<f64>], x: f64) -> Option<Point2<f64>> {
    if let Some(p) = interpolate_at_x(line, x) {
        return Some(p);
    }

    let first = line.first()?;
    let last = line.last()?;

    if (last.x - x).abs() <= (first.x - x).abs() {
        Some(*last)
    } else {
        Some(*first)
    }
}

/// Total length of a polyline.
pub fn arc_length(line: &[Point3<f64>]) -> f64 {
    line.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Resample a polyline into `n` points equally spaced along its length.
///
/// The end points are kept exactly. A line with a single point is repeated.
pub fn resample(line: &[Point3<f64>], n: usize) -> Vec<Point3<f64>> {
    if line.len() < 2 || n < 2 {
        return line.iter().cycle().take(n).cloned().collect();
    }

    let total = arc_length(line);
    let mut out = Vec::with_capacity(n);
    out.push(line[0]);

    // Walk along the line keeping track of the distance covered up to the current vertex
    let mut seg_idx = 0;
    let mut seg_start_s = 0.0;

    for i in 1..(n - 1) {
        let target_s = total * (i as f64) / ((n - 1) as f64);

        while seg_idx < line.len() - 2
            && seg_start_s + (line[seg_idx + 1] - line[seg_idx]).norm() < target_s
        {
            seg_start_s += (line[seg_idx + 1] - line[seg_idx]).norm();
            seg_idx += 1;
        }

        let a = line[seg_idx];
        let b = line[seg_idx + 1];
        let seg_len = (b - a).norm();
        let t = if seg_len > 0.0 {
            ((target_s - seg_start_s) / seg_len).max(0.0).min(1.0)
        } else {
            0.0
        };

        out.push(a + (b - a) * t);
    }

    if let Some(last) = line.last() {
        out.push(*last);
    }

    out
}

/// Centerline between two boundaries.
///
/// Boundaries with matching point counts are averaged pairwise, otherwise both are first
/// resampled to the larger point count.
pub fn centerline(right: &[Point3<f64>], left: &[Point3<f64>]) -> Vec<Point3<f64>> {
    if right.len() == left.len() {
        return right
            .iter()
            .zip(left.iter())
            .map(|(r, l)| nalgebra::center(r, l))
            .collect();
    }

    let n = right.len().max(left.len());
    let right = resample(right, n);
    let left = resample(left, n);

    right
        .iter()
        .zip(left.iter())
        .map(|(r, l)| nalgebra::center(r, l))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn line(pts: &[(f64, f64)]) -> Vec<Point2<f64>> {
        pts.iter().map(|(x, y)| Point2::new(*x, *y)).collect()
    }

    #[test]
    fn test_distance_point_to_polyline() {
        let l = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);

        // On vertices
        for p in l.iter() {
            assert_eq!(distance_point_to_polyline(p, &l), 0.0);
        }

        // Projection inside a segment
        assert!((distance_point_to_polyline(&Point2::new(5.0, 2.0), &l) - 2.0).abs() < 1e-12);

        // Projection clamped to the first vertex
        assert!(
            (distance_point_to_polyline(&Point2::new(-3.0, 4.0), &l) - 5.0).abs() < 1e-12
        );

        // Nearest to the second segment
        assert!((distance_point_to_polyline(&Point2::new(12.0, 5.0), &l) - 2.0).abs() < 1e-12);

        assert_eq!(
            distance_point_to_polyline(&Point2::new(3.0, 4.0), &line(&[(0.0, 0.0)])),
            5.0
        );
        assert!(distance_point_to_polyline(&Point2::new(0.0, 0.0), &[]).is_infinite());
    }

    #[test]
    fn test_interpolate_at_x() {
        let l = line(&[(0.0, 0.0), (10.0, 1.0), (20.0, 1.0)]);

        let p = interpolate_at_x(&l, 5.0).unwrap();
        assert!((p.y - 0.5).abs() < 1e-12);
        assert_eq!(y_at_x(&l, 15.0), Some(1.0));
        assert_eq!(y_at_x(&l, 20.0), Some(1.0));
        assert_eq!(y_at_x(&l, 20.5), None);
        assert_eq!(y_at_x(&l, -0.1), None);
        assert_eq!(x_extent(&l), Some((0.0, 20.0)));
        assert_eq!(x_extent(&[]), None);
    }

    #[test]
    fn test_point_at_x_clamped() {
        let l = line(&[(-2.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);

        assert_eq!(point_at_x_clamped(&l, 100.0), Some(Point2::new(20.0, 0.0)));
        assert_eq!(point_at_x_clamped(&l, -5.0), Some(Point2::new(-2.0, 0.0)));
        assert_eq!(point_at_x_clamped(&l, 3.0), Some(Point2::new(3.0, 0.0)));
        assert_eq!(point_at_x_clamped(&[], 3.0), None);
    }

    #[test]
    fn test_centerline() {
        let right = vec![Point3::new(-2.0, -0.5, 0.0), Point3::new(10.0, -0.5, 0.0)];
        let left = vec![Point3::new(-2.0, 0.5, 1.0), Point3::new(10.0, 0.5, 1.0)];

        let c = centerline(&right, &left);
        assert_eq!(c, vec![Point3::new(-2.0, 0.0, 0.5), Point3::new(10.0, 0.0, 0.5)]);

        // Mismatched point counts are resampled
        let left = vec![
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(5.0, 1.0, 0.0),
            Point3::new(10.0, 1.0, 0.0),
        ];
        let right = vec![Point3::new(0.0, -1.0, 0.0), Point3::new(10.0, -1.0, 0.0)];

        let c = centerline(&right, &left);
        assert_eq!(c.len(), 3);
        assert!((c[1].x - 5.0).abs() < 1e-12);
        assert!(c.iter().all(|p| p.y.abs() < 1e-12));
    }

    #[test]
    fn test_resample() {
        let l = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
        ];

        let r = resample(&l, 5);
        assert_eq!(r.len(), 5);
        for (i, p) in r.iter().enumerate() {
            assert!((p.x - i as f64).abs() < 1e-9);
        }

        assert_eq!(resample(&l[..1], 3), vec![l[0]; 3]);
        assert!(resample(&[], 3).is_empty());
    }
}
