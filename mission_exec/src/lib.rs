//! # Mission planner library.
//!
//! Plans which lane the vehicle should drive in from an ego-relative road graph, without a
//! global map. The library is used by the `mission_exec` executable and its benchmarks.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Driving corridors - geometry of whole lanes
pub mod corridor;

/// Global data store for the executable
pub mod data_store;

/// Planar geometry helpers shared by the other modules
pub mod geom;

/// Goal point management - the persistent target of the current maneuver
pub mod goal_point;

/// Lane converter module - turns the target lane into a trajectory
pub mod lane_converter;

/// Lane selection - finds the ego lane and its neighbours
pub mod lane_select;

/// Localisation - planar poses from odometry
pub mod loc;

/// Mission definitions
pub mod mission;

/// Mission planner module - the per-cycle planning state machine
pub mod mission_planner;

/// Road graph - lane segments and how they connect
pub mod road_graph;
