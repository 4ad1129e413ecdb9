//! # Lane selection
//!
//! Traverses the road graph to find the ego lane and the lanes beside it. A lane is a chain of
//! segment indices where each index is a registered successor of the one before it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::trace;
use nalgebra::Point2;
use serde::Serialize;

use crate::road_graph::{RoadGraph, Side};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The ego lane and the lanes to either side of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lanes {
    pub ego: Vec<usize>,

    /// Lanes to the left ordered by increasing lateral offset. Always holds at least one entry,
    /// which is empty if there is no lane to the left.
    pub left: Vec<Vec<usize>>,

    /// Lanes to the right, as for `left`.
    pub right: Vec<Vec<usize>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Lanes {
    /// Lanes for a graph in which the ego segment could not be found.
    pub fn none() -> Self {
        Self {
            ego: vec![],
            left: vec![vec![]],
            right: vec![vec![]],
        }
    }

    /// The lanes on the given side.
    pub fn side(&self, side: Side) -> &[Vec<usize>] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// The adjacent lane on the given side, which may be empty.
    pub fn first(&self, side: Side) -> &[usize] {
        self.side(side).first().map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// The furthest non-empty lane on the given side, if any.
    pub fn outermost(&self, side: Side) -> Option<&[usize]> {
        self.side(side)
            .iter()
            .rev()
            .find(|l| !l.is_empty())
            .map(|l| l.as_slice())
    }

    /// Number of non-empty lanes on the given side.
    pub fn num_lanes(&self, side: Side) -> usize {
        self.side(side).iter().filter(|l| !l.is_empty()).count()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Find the segment occupied by the vehicle, which sits at the origin of the local frame.
///
/// Candidates are the segments whose longitudinal extent contains the origin. The one whose
/// centerline is laterally nearest wins, with ties going to the lowest index.
pub fn find_ego_segment(graph: &RoadGraph) -> Option<usize> {
    graph.find_nearest_segment(&Point2::origin())
}

/// Select the ego lane and its neighbouring lanes.
///
/// The ego lane is the successor chain of `ego_segment`. Each lane to the side is rooted at the
/// first segment of the previous lane (starting with the ego lane) that has a neighbour on that
/// side, and follows that neighbour's successors. Lanes are added outwards until one comes back
/// empty.
///
/// If `prepend_predecessor` is set every non-empty lane is extended backwards by one
/// predecessor, so that corridors start behind the vehicle.
pub fn select_lanes(
    graph: &RoadGraph,
    ego_segment: Option<usize>,
    prepend_predecessor: bool,
) -> Lanes {
    let ego_segment = match ego_segment {
        Some(e) if e < graph.len() => e,
        _ => return Lanes::none(),
    };

    let ego = graph.successor_chain(ego_segment);
    let mut left = lanes_on_side(graph, &ego, Side::Left);
    let mut right = lanes_on_side(graph, &ego, Side::Right);

    let mut ego = ego;
    if prepend_predecessor {
        prepend(graph, &mut ego);
        for lane in left.iter_mut().chain(right.iter_mut()) {
            prepend(graph, lane);
        }
    }

    trace!(
        "Selected lanes: ego {:?}, left {:?}, right {:?}",
        ego,
        left,
        right
    );

    Lanes { ego, left, right }
}

/// The lane beside `lane` on the given side, empty if there is none.
pub fn neighbor_lane(graph: &RoadGraph, lane: &[usize], side: Side) -> Vec<usize> {
    lane.iter()
        .filter_map(|&idx| graph.connection(idx).and_then(|c| c.neighbor(side)))
        .next()
        .map(|root| graph.successor_chain(root))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn lanes_on_side(graph: &RoadGraph, ego: &[usize], side: Side) -> Vec<Vec<usize>> {
    let mut lanes: Vec<Vec<usize>> = vec![];
    let mut used = vec![false; graph.len()];
    for &idx in ego.iter() {
        used[idx] = true;
    }

    let mut current: Vec<usize> = ego.to_vec();

    // Every level uses at least one new segment, so this bounds the search even for
    // inconsistent neighbour declarations
    while lanes.len() < graph.len() {
        let next = neighbor_lane(graph, &current, side);

        // A lane reusing a segment of a closer lane means the neighbour links loop back
        if next.is_empty() || next.iter().any(|&idx| used[idx]) {
            break;
        }

        for &idx in next.iter() {
            used[idx] = true;
        }

        lanes.push(next.clone());
        current = next;
    }

    if lanes.is_empty() {
        lanes.push(vec![]);
    }

    lanes
}

fn prepend(graph: &RoadGraph, lane: &mut Vec<usize>) {
    let first = match lane.first() {
        Some(&f) => f,
        None => return,
    };

    let pred = graph
        .connection(first)
        .and_then(|c| c.predecessors.iter().copied().find(|p| !lane.contains(p)));

    if let Some(p) = pred {
        lane.insert(0, p);
    }
}
