//! Per-driver mission state machine with validated transitions.
//!
//! A mission moves through these states relative to one driver:
//! NotAccepted -> Active -> Completed

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MissionError;

/// State of a mission relative to a single driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    NotAccepted,
    Active,
    Completed,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::NotAccepted => write!(f, "not_accepted"),
            MissionStatus::Active => write!(f, "active"),
            MissionStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for MissionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_accepted" => Ok(MissionStatus::NotAccepted),
            "active" => Ok(MissionStatus::Active),
            "completed" => Ok(MissionStatus::Completed),
            _ => Err(format!("Unknown mission status: {}", s)),
        }
    }
}

/// Validate that a status transition is allowed.
///
/// Valid transitions:
/// - NotAccepted -> Active (acceptance)
/// - Active -> Completed (goal met before the deadline)
///
/// Completed is terminal.
pub fn validate_transition(from: MissionStatus, to: MissionStatus) -> Result<(), MissionError> {
    let valid = matches!(
        (from, to),
        (MissionStatus::NotAccepted, MissionStatus::Active)
            | (MissionStatus::Active, MissionStatus::Completed)
    );

    if valid {
        Ok(())
    } else {
        Err(MissionError::InvalidTransition(from, to))
    }
}
