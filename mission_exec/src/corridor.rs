//! # Driving corridors
//!
//! Joins the per-segment geometry of a lane into one continuous centerline and pair of bounds.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::msg::DrivingCorridor;
use log::debug;
use nalgebra::Point3;

use crate::road_graph::RoadGraph;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Distance under which the start of a segment's curve is considered the same point as the
/// end of the previous segment's curve.
pub const JUNCTION_TOL_M: f64 = 1e-3;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the corridor of a lane.
///
/// Shared junction points are emitted once. Indices outside the graph are skipped, and an
/// empty lane gives an empty corridor.
pub fn build_corridor(lane: &[usize], graph: &RoadGraph) -> DrivingCorridor {
    let mut corridor = DrivingCorridor::default();

    for &idx in lane.iter() {
        let seg = match graph.segment(idx) {
            Some(s) => s,
            None => continue,
        };

        append(&mut corridor.centerline, &seg.centerline, seg.id);
        append(&mut corridor.bound_left, &seg.bound_left, seg.id);
        append(&mut corridor.bound_right, &seg.bound_right, seg.id);
    }

    corridor
}

/// Build the corridor of every lane in order.
pub fn build_corridors(lanes: &[Vec<usize>], graph: &RoadGraph) -> Vec<DrivingCorridor> {
    lanes.iter().map(|l| build_corridor(l, graph)).collect()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn append(target: &mut Vec<Point3<f64>>, curve: &[Point3<f64>], seg_id: i64) {
    let mut points = curve;

    if let (Some(last), Some(first)) = (target.last(), curve.first()) {
        if (first - last).norm() <= JUNCTION_TOL_M {
            points = &curve[1..];
        } else {
            debug!(
                "Segment {} does not start where the previous segment ends (gap of {:.3} m)",
                seg_id,
                (first - last).norm()
            );
        }
    }

    target.extend_from_slice(points);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::road_graph::test::{straight, three_segments};
    use comms_if::msg::RoadSegments;

    #[test]
    fn test_build_corridor() {
        let msg = RoadSegments {
            segments: vec![
                straight(0, -2.0, 10.0, -0.5, 0.5, [-1, -1], vec![1]),
                straight(1, 10.0, 20.0, -0.5, 0.5, [-1, -1], vec![-1]),
            ],
        };
        let graph = RoadGraph::from_msg(&msg).unwrap();

        let corridor = build_corridor(&[0, 1], &graph);

        assert_eq!(corridor.centerline[0], Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(corridor.bound_right[0], Point3::new(-2.0, -0.5, 0.0));
        assert_eq!(corridor.bound_left[0], Point3::new(-2.0, 0.5, 0.0));

        // The junction at x = 10 appears once
        assert_eq!(
            corridor.centerline,
            vec![
                Point3::new(-2.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(20.0, 0.0, 0.0)
            ]
        );
        assert_eq!(corridor.bound_left.len(), 3);
        assert_eq!(corridor.bound_right.len(), 3);
    }

    #[test]
    fn test_build_corridor_gap() {
        // Segments 0 and 1 are parallel, not consecutive, so nothing is merged
        let graph = RoadGraph::from_msg(&three_segments()).unwrap();

        let corridor = build_corridor(&[0, 1], &graph);
        assert_eq!(corridor.centerline.len(), 4);
        assert_eq!(corridor.centerline[2], Point3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn test_build_corridor_empty() {
        let graph = RoadGraph::from_msg(&three_segments()).unwrap();

        assert_eq!(build_corridor(&[], &graph), DrivingCorridor::default());
        assert!(build_corridors(&[vec![]], &graph)[0].is_empty());
    }
}
