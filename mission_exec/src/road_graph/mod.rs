//! # Road graph
//!
//! The road graph is rebuilt every cycle from the map provider's segment message. Segments are
//! stored in an arena and referred to by their index in it, and connectivity lives in a
//! separate table with one `Connection` per segment.
//!
//! The input only declares connectivity one way (successors, and neighbours as seen from the
//! declaring segment). The builder resolves every id to an arena index, drops ids that don't
//! exist in the message, derives predecessors from successors and makes neighbour relations
//! symmetric.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod segment;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::collections::HashMap;

use comms_if::msg::{RoadSegment, RoadSegments, NO_SEGMENT_ID};
use log::{debug, trace, warn};
use nalgebra::Point2;
use serde::Serialize;

pub use segment::LaneSegment;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Resolved connectivity of a single lane segment. All values are arena indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Connection {
    /// Segments which list this one as a successor, in arena order.
    pub predecessors: Vec<usize>,

    /// Successors in the order they were declared.
    pub successors: Vec<usize>,

    pub left: Option<usize>,

    pub right: Option<usize>,
}

/// Lane segments and their connections for one cycle.
#[derive(Debug, Clone, Default)]
pub struct RoadGraph {
    segments: Vec<LaneSegment>,
    connections: Vec<Connection>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Lateral side of a lane.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// Errors which prevent a road graph being built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoadGraphError {
    #[error("Segment {id} has {found} boundaries, expected at least 2")]
    MissingBoundary { id: i64, found: usize },

    #[error("The {side:?} boundary of segment {id} has no points")]
    EmptyBoundary { id: i64, side: Side },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

impl Connection {
    /// The neighbour on the given side.
    pub fn neighbor(&self, side: Side) -> Option<usize> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    fn neighbor_mut(&mut self, side: Side) -> &mut Option<usize> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl RoadGraph {
    /// Build the graph from the map provider's message.
    ///
    /// The whole message is validated before anything is built, so an error never leaves a
    /// partial graph behind.
    pub fn from_msg(msg: &RoadSegments) -> Result<Self, RoadGraphError> {
        for seg in msg.segments.iter() {
            validate(seg)?;
        }

        // Map from message id to arena index. If an id is repeated the first segment using it
        // is the one other segments refer to.
        let mut index_of: HashMap<i64, usize> = HashMap::with_capacity(msg.segments.len());
        for (idx, seg) in msg.segments.iter().enumerate() {
            if index_of.contains_key(&seg.id) {
                warn!(
                    "Segment id {} is used more than once, references resolve to the first use",
                    seg.id
                );
            } else {
                index_of.insert(seg.id, idx);
            }
        }

        let resolve = |id: i64, from: i64| -> Option<usize> {
            if id == NO_SEGMENT_ID {
                return None;
            }
            let idx = index_of.get(&id).copied();
            if idx.is_none() {
                debug!("Segment {} refers to unknown segment {}, ignored", from, id);
            }
            idx
        };

        let segments: Vec<LaneSegment> = msg
            .segments
            .iter()
            .map(|s| LaneSegment::new(s.id, s.linestrings[0].clone(), s.linestrings[1].clone()))
            .collect();

        // Resolve declared connectivity
        let mut connections: Vec<Connection> = Vec::with_capacity(segments.len());
        for (idx, seg) in msg.segments.iter().enumerate() {
            let mut conn = Connection::default();

            for &id in seg.successor_ids.iter() {
                if let Some(s) = resolve(id, seg.id) {
                    if !conn.successors.contains(&s) {
                        conn.successors.push(s);
                    }
                }
            }

            // A segment can't be its own neighbour
            conn.left = resolve(seg.left_neighbor_id(), seg.id).filter(|&n| n != idx);
            conn.right = resolve(seg.right_neighbor_id(), seg.id).filter(|&n| n != idx);

            connections.push(conn);
        }

        symmetrise_neighbors(&mut connections);

        // Predecessors from successors
        for idx in 0..connections.len() {
            for s in connections[idx].successors.clone() {
                if !connections[s].predecessors.contains(&idx) {
                    connections[s].predecessors.push(idx);
                }
            }
        }

        trace!("Road graph built with {} segments", segments.len());

        Ok(Self {
            segments,
            connections,
        })
    }

    /// Number of segments in the graph
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment(&self, idx: usize) -> Option<&LaneSegment> {
        self.segments.get(idx)
    }

    pub fn connection(&self, idx: usize) -> Option<&Connection> {
        self.connections.get(idx)
    }

    /// The chain of segments reached by repeatedly following the first successor from `start`.
    ///
    /// Following stops when a segment has no successor or its successor is already in the
    /// chain. An index outside the graph gives an empty chain.
    pub fn successor_chain(&self, start: usize) -> Vec<usize> {
        let mut chain = vec![];
        let mut visited = vec![false; self.len()];
        let mut current = Some(start);

        while let Some(idx) = current {
            if idx >= self.len() || visited[idx] {
                break;
            }
            visited[idx] = true;
            chain.push(idx);

            current = self.connections[idx].successors.first().copied();
        }

        chain
    }

    /// Index of the segment containing the point, or `None`.
    ///
    /// If several segments contain the point the one with the laterally nearest centerline is
    /// returned, and ties go to the lowest index.
    pub fn find_occupied_segment(&self, point: &Point2<f64>) -> Option<usize> {
        self.nearest_by_centerline(point, |seg| seg.contains(point))
    }

    /// Index of the segment whose longitudinal extent contains the point and whose centerline
    /// is laterally nearest to it, ties going to the lowest index.
    pub fn find_nearest_segment(&self, point: &Point2<f64>) -> Option<usize> {
        self.nearest_by_centerline(point, |seg| seg.contains_x(point.x))
    }

    fn nearest_by_centerline<F>(&self, point: &Point2<f64>, candidate: F) -> Option<usize>
    where
        F: Fn(&LaneSegment) -> bool,
    {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, seg)| candidate(seg))
            .filter_map(|(idx, seg)| {
                let d = seg.lateral_offset(point)?.abs();
                ordered_float::NotNan::new(d).ok().map(|d| (d, idx))
            })
            .min()
            .map(|(_, idx)| idx)
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn validate(seg: &RoadSegment) -> Result<(), RoadGraphError> {
    if seg.linestrings.len() < 2 {
        return Err(RoadGraphError::MissingBoundary {
            id: seg.id,
            found: seg.linestrings.len(),
        });
    }

    if seg.linestrings[0].is_empty() {
        return Err(RoadGraphError::EmptyBoundary {
            id: seg.id,
            side: Side::Right,
        });
    }
    if seg.linestrings[1].is_empty() {
        return Err(RoadGraphError::EmptyBoundary {
            id: seg.id,
            side: Side::Left,
        });
    }

    Ok(())
}

/// Make every neighbour relation reciprocal.
///
/// Relations are visited in arena order, left before right. A relation whose reverse slot is
/// empty has it filled. If the reverse slot already holds a different segment the relation
/// is dropped, so a segment keeps its own declaration over one made about it and the first
/// segment to claim a neighbour keeps it.
fn symmetrise_neighbors(connections: &mut [Connection]) {
    for idx in 0..connections.len() {
        for &side in [Side::Left, Side::Right].iter() {
            let n = match connections[idx].neighbor(side) {
                Some(n) => n,
                None => continue,
            };

            match connections[n].neighbor(side.opposite()) {
                None => *connections[n].neighbor_mut(side.opposite()) = Some(idx),
                Some(r) if r == idx => (),
                Some(r) => {
                    debug!(
                        "Segment {} declares {} as {:?} neighbour but {} has {} on its {:?}, \
                         relation dropped",
                        idx,
                        n,
                        side,
                        n,
                        r,
                        side.opposite()
                    );
                    *connections[idx].neighbor_mut(side) = None;
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use nalgebra::Point3;

    /// Build a straight segment between `x0` and `x1` with the right and left bound at the
    /// given lateral positions.
    pub(crate) fn straight(
        id: i64,
        x0: f64,
        x1: f64,
        y_right: f64,
        y_left: f64,
        neighbors: [i64; 2],
        successors: Vec<i64>,
    ) -> RoadSegment {
        RoadSegment::new(
            id,
            vec![Point3::new(x0, y_right, 0.0), Point3::new(x1, y_right, 0.0)],
            vec![Point3::new(x0, y_left, 0.0), Point3::new(x1, y_left, 0.0)],
            neighbors,
            successors,
        )
    }

    /// Three segments: 0 and 2 form a straight lane, 1 runs parallel to the left of 0.
    pub(crate) fn three_segments() -> RoadSegments {
        RoadSegments {
            segments: vec![
                straight(0, -2.0, 10.0, -0.5, 0.5, [1, -1], vec![2]),
                straight(1, 0.0, 10.0, 1.0, 2.0, [-1, -1], vec![-1]),
                straight(2, 10.0, 20.0, -0.5, 0.5, [-1, -1], vec![-1]),
            ],
        }
    }

    #[test]
    fn test_build_resolves_ids() {
        let msg = RoadSegments {
            segments: vec![
                straight(40, 0.0, 10.0, -0.5, 0.5, [-1, -1], vec![17, 99]),
                straight(17, 10.0, 20.0, -0.5, 0.5, [-1, 123], vec![-1]),
            ],
        };

        let graph = RoadGraph::from_msg(&msg).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.segment(1).unwrap().id, 17);
        assert_eq!(graph.connection(0).unwrap().successors, vec![1]);
        assert_eq!(graph.connection(1).unwrap().predecessors, vec![0]);
        assert_eq!(graph.connection(1).unwrap().right, None);
        assert!(graph.connection(0).unwrap().predecessors.is_empty());
    }

    #[test]
    fn test_build_symmetric_neighbors() {
        let graph = RoadGraph::from_msg(&three_segments()).unwrap();

        assert_eq!(graph.connection(0).unwrap().left, Some(1));
        assert_eq!(graph.connection(1).unwrap().right, Some(0));
        assert_eq!(graph.connection(1).unwrap().left, None);
        assert_eq!(graph.connection(2).unwrap().left, None);
        assert_eq!(graph.connection(2).unwrap().predecessors, vec![0]);
    }

    #[test]
    fn test_build_conflicting_neighbors() {
        // 0 says 2 is on its left, but 2 says 1 is on its right
        let msg = RoadSegments {
            segments: vec![
                straight(0, 0.0, 10.0, -0.5, 0.5, [2, -1], vec![]),
                straight(1, 0.0, 10.0, 0.5, 1.5, [-1, -1], vec![]),
                straight(2, 0.0, 10.0, 1.5, 2.5, [-1, 1], vec![]),
            ],
        };

        let graph = RoadGraph::from_msg(&msg).unwrap();

        assert_eq!(graph.connection(0).unwrap().left, None);
        assert_eq!(graph.connection(2).unwrap().right, Some(1));
        assert_eq!(graph.connection(1).unwrap().left, Some(2));
        assert_reciprocal(&graph);

        // 0 and 1 both claim 2 as their left neighbour, the first claim wins
        let msg = RoadSegments {
            segments: vec![
                straight(0, 0.0, 10.0, -0.5, 0.5, [2, -1], vec![]),
                straight(1, 0.0, 10.0, -0.5, 0.5, [2, -1], vec![]),
                straight(2, 0.0, 10.0, 0.5, 1.5, [-1, -1], vec![]),
            ],
        };

        let graph = RoadGraph::from_msg(&msg).unwrap();

        assert_eq!(graph.connection(0).unwrap().left, Some(2));
        assert_eq!(graph.connection(1).unwrap().left, None);
        assert_eq!(graph.connection(2).unwrap().right, Some(0));
        assert_reciprocal(&graph);
    }

    fn assert_reciprocal(graph: &RoadGraph) {
        for idx in 0..graph.len() {
            for &side in [Side::Left, Side::Right].iter() {
                if let Some(n) = graph.connection(idx).unwrap().neighbor(side) {
                    assert_eq!(
                        graph.connection(n).unwrap().neighbor(side.opposite()),
                        Some(idx),
                        "{:?} neighbour of {} is not reciprocated",
                        side,
                        idx
                    );
                }
            }
        }
    }

    #[test]
    fn test_build_self_reference() {
        let msg = RoadSegments {
            segments: vec![straight(5, 0.0, 10.0, -0.5, 0.5, [5, 5], vec![5])],
        };

        let graph = RoadGraph::from_msg(&msg).unwrap();
        let conn = graph.connection(0).unwrap();

        assert_eq!(conn.left, None);
        assert_eq!(conn.right, None);
        assert_eq!(conn.successors, vec![0]);
        assert_eq!(graph.successor_chain(0), vec![0]);
    }

    #[test]
    fn test_build_malformed() {
        let mut msg = three_segments();
        msg.segments[1].linestrings.pop();

        assert_eq!(
            RoadGraph::from_msg(&msg).unwrap_err(),
            RoadGraphError::MissingBoundary { id: 1, found: 1 }
        );

        let mut msg = three_segments();
        msg.segments[2].linestrings[1].clear();

        assert_eq!(
            RoadGraph::from_msg(&msg).unwrap_err(),
            RoadGraphError::EmptyBoundary {
                id: 2,
                side: Side::Left
            }
        );
    }

    #[test]
    fn test_build_empty() {
        let graph = RoadGraph::from_msg(&RoadSegments::default()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.successor_chain(0).is_empty());
        assert_eq!(graph.find_nearest_segment(&Point2::origin()), None);
    }

    #[test]
    fn test_successor_chain_cycle() {
        let msg = RoadSegments {
            segments: vec![
                straight(0, 0.0, 10.0, -0.5, 0.5, [-1, -1], vec![1]),
                straight(1, 10.0, 20.0, -0.5, 0.5, [-1, -1], vec![2]),
                straight(2, 20.0, 30.0, -0.5, 0.5, [-1, -1], vec![0]),
            ],
        };

        let graph = RoadGraph::from_msg(&msg).unwrap();
        assert_eq!(graph.successor_chain(1), vec![1, 2, 0]);
    }

    #[test]
    fn test_find_segments() {
        let graph = RoadGraph::from_msg(&three_segments()).unwrap();

        assert_eq!(graph.find_occupied_segment(&Point2::new(-1.0, 0.0)), Some(0));
        assert_eq!(graph.find_occupied_segment(&Point2::new(5.0, 1.5)), Some(1));
        assert_eq!(graph.find_occupied_segment(&Point2::new(15.0, 0.2)), Some(2));
        assert_eq!(graph.find_occupied_segment(&Point2::new(5.0, 0.75)), None);
        assert_eq!(graph.find_occupied_segment(&Point2::new(100.0, 100.0)), None);

        // Nearest only needs the longitudinal extent
        assert_eq!(graph.find_nearest_segment(&Point2::new(5.0, 0.75)), Some(0));
        assert_eq!(graph.find_nearest_segment(&Point2::new(5.0, 1.2)), Some(1));
        assert_eq!(graph.find_nearest_segment(&Point2::new(-1.0, 3.0)), Some(0));
    }
}
