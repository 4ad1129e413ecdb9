//! # Communications interface crate.
//!
//! Provides all message definitions exchanged between the mission planning software and its
//! surroundings.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Messages consumed and produced by the planner each cycle
pub mod msg;
