//! # Road segment messages
//!
//! The local road graph is delivered as a flat list of segments in the ego-relative frame.
//! Connectivity is only declared one way (successors and neighbours), and ids refer to other
//! segments in the same message.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Id value used to mark the absence of a neighbour or successor.
pub const NO_SEGMENT_ID: i64 = -1;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The road graph for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalMap {
    pub road_segments: RoadSegments,
}

/// All road segments surrounding the vehicle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadSegments {
    pub segments: Vec<RoadSegment>,
}

/// A single lane segment as described by the map provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Identifier of the segment, unique within the message
    pub id: i64,

    /// Boundary polylines ordered along the direction of travel. The first is the right
    /// boundary, the second the left boundary.
    pub linestrings: Vec<Vec<Point3<f64>>>,

    /// Ids of the left and right neighbours, in that order.
    #[serde(default)]
    pub neighbor_ids: Vec<i64>,

    /// Ids of the successor segments.
    #[serde(default)]
    pub successor_ids: Vec<i64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl RoadSegment {
    /// Create a segment from its right and left boundaries.
    pub fn new(
        id: i64,
        right_boundary: Vec<Point3<f64>>,
        left_boundary: Vec<Point3<f64>>,
        neighbor_ids: [i64; 2],
        successor_ids: Vec<i64>,
    ) -> Self {
        Self {
            id,
            linestrings: vec![right_boundary, left_boundary],
            neighbor_ids: neighbor_ids.to_vec(),
            successor_ids,
        }
    }

    /// Declared left neighbour id, or `NO_SEGMENT_ID`.
    pub fn left_neighbor_id(&self) -> i64 {
        self.neighbor_ids.get(0).copied().unwrap_or(NO_SEGMENT_ID)
    }

    /// Declared right neighbour id, or `NO_SEGMENT_ID`.
    pub fn right_neighbor_id(&self) -> i64 {
        self.neighbor_ids.get(1).copied().unwrap_or(NO_SEGMENT_ID)
    }
}
