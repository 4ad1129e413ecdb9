//! Lane converter parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the lane converter
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    /// Speed assigned to every waypoint.
    pub target_speed_mps: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            target_speed_mps: 3.0,
        }
    }
}
