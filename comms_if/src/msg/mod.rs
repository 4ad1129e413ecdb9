//! # Message module
//!
//! Inputs arrive as a JSON envelope naming the message type and carrying its payload, which
//! is the form used by scenario scripts.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod lanes;
pub mod mission;
pub mod odom;
pub mod road;
pub mod traj;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use std::str::FromStr;
use thiserror::Error;

// Internal
pub use lanes::*;
pub use mission::*;
pub use odom::*;
pub use road::*;
pub use traj::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An input message to the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Msg {
    /// The ego-relative road graph for this cycle
    LocalMap(LocalMap),

    /// A new high level maneuver request
    Mission(MissionMsg),

    /// A new odometry estimate
    Odometry(Odometry),
}

/// Message types, used to identify which payload an envelope carries.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub enum MsgType {
    LocalMap,
    Mission,
    Odometry,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum MsgParseError {
    #[error("Message contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Message has an invalid type ({0})")]
    InvalidType(String),

    #[error("Message of type {0:?} is expected to have a payload but it doesn't")]
    MissingPayload(MsgType),

    #[error("Payload of {0:?} message could not be read: {1}")]
    InvalidPayload(MsgType, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Msg {
    /// Parse a new message from a JSON envelope
    pub fn from_json(json_str: &str) -> Result<Self, MsgParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(MsgParseError::InvalidJson)?;

        let type_str = match val["type"].as_str() {
            Some(s) => s,
            None => {
                return Err(MsgParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        let msg_type: MsgType = type_str.parse()?;

        let payload = &val["payload"];
        if payload.is_null() {
            return Err(MsgParseError::MissingPayload(msg_type));
        }

        let invalid = |e| MsgParseError::InvalidPayload(msg_type, e);

        Ok(match msg_type {
            MsgType::LocalMap => {
                Msg::LocalMap(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
            MsgType::Mission => {
                Msg::Mission(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
            MsgType::Odometry => {
                Msg::Odometry(serde_json::from_value(payload.clone()).map_err(invalid)?)
            }
        })
    }

    /// The type of this message
    pub fn msg_type(&self) -> MsgType {
        match self {
            Msg::LocalMap(_) => MsgType::LocalMap,
            Msg::Mission(_) => MsgType::Mission,
            Msg::Odometry(_) => MsgType::Odometry,
        }
    }
}

impl FromStr for MsgType {
    type Err = MsgParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL_MAP" => Ok(MsgType::LocalMap),
            "MISSION" => Ok(MsgType::Mission),
            "ODOMETRY" => Ok(MsgType::Odometry),
            _ => Err(MsgParseError::InvalidType(format!(
                "{} is not a recognised message type",
                s
            ))),
        }
    }
}
