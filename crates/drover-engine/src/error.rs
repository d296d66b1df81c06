//! Error types for the reward engine.

use crate::mission::state_machine::MissionStatus;
use drover_core::types::{DriverId, MissionId, Timestamp};
use uuid::Uuid;

/// Errors from finishing an action.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    #[error("Action already finished: {0}")]
    AlreadyFinished(Uuid),
    #[error("Action {id} cannot finish at {finished_at} before it was created at {created_at}")]
    FinishedBeforeCreated {
        id: Uuid,
        created_at: Timestamp,
        finished_at: Timestamp,
    },
}

/// Errors from applying an award to a driver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AwardError {
    #[error("Award {id} already awarded at {awarded_at}")]
    AlreadyAwarded { id: Uuid, awarded_at: Timestamp },
}

/// Errors from mission definition, acceptance and completion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MissionError {
    #[error("Mission {mission_id} deadline {deadline} exceeded at {at}")]
    DeadlineExceeded {
        mission_id: MissionId,
        at: Timestamp,
        deadline: Timestamp,
    },
    #[error("Mission {mission_id} window is empty: from {from_time} to {deadline}")]
    InvalidWindow {
        mission_id: MissionId,
        from_time: Timestamp,
        deadline: Timestamp,
    },
    #[error("Invalid mission transition: {0} -> {1}")]
    InvalidTransition(MissionStatus, MissionStatus),
    #[error("Award error: {0}")]
    Award(#[from] AwardError),
}

/// Errors from the driver and mission catalogs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error("Driver not found: {0}")]
    UnknownDriver(DriverId),
    #[error("Mission not found: {0}")]
    UnknownMission(MissionId),
    #[error("Driver already registered: {0}")]
    DuplicateDriver(DriverId),
    #[error("Mission already registered: {0}")]
    DuplicateMission(MissionId),
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

/// Umbrella error returned by [`crate::RewardEngine`] operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Mission(#[from] MissionError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl EngineError {
    /// True when the error is a not-found condition on a catalog lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::Registry(RegistryError::UnknownDriver(_))
                | EngineError::Registry(RegistryError::UnknownMission(_))
        )
    }

    /// True when the error is a deadline rejection.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(
            self,
            EngineError::Mission(MissionError::DeadlineExceeded { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let err = ActionError::AlreadyFinished(id);
        assert_eq!(
            err.to_string(),
            "Action already finished: 550e8400-e29b-41d4-a716-446655440000"
        );

        let err = ActionError::FinishedBeforeCreated {
            id,
            created_at: Timestamp(60),
            finished_at: Timestamp(0),
        };
        assert!(err.to_string().contains("before it was created"));
    }

    #[test]
    fn test_mission_error_display() {
        let err = MissionError::DeadlineExceeded {
            mission_id: MissionId::new("weekly"),
            at: Timestamp(86401),
            deadline: Timestamp(86400),
        };
        assert_eq!(
            err.to_string(),
            "Mission weekly deadline 1970-01-02T00:00:00+00:00 exceeded at 1970-01-02T00:00:01+00:00"
        );

        let err = MissionError::InvalidTransition(MissionStatus::Completed, MissionStatus::Active);
        assert_eq!(
            err.to_string(),
            "Invalid mission transition: completed -> active"
        );
    }

    #[test]
    fn test_mission_error_from_award_error() {
        let award_err = AwardError::AlreadyAwarded {
            id: Uuid::new_v4(),
            awarded_at: Timestamp(0),
        };
        let err: MissionError = award_err.into();
        assert!(matches!(err, MissionError::Award(_)));
        assert!(err.to_string().starts_with("Award error: Award "));

        // Award failures reach engine callers through the mission that applied them.
        let err: EngineError = err.into();
        assert!(matches!(err, EngineError::Mission(MissionError::Award(_))));
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::UnknownDriver(DriverId::new("d1"));
        assert_eq!(err.to_string(), "Driver not found: d1");

        let err = RegistryError::UnknownMission(MissionId::new("m1"));
        assert_eq!(err.to_string(), "Mission not found: m1");

        let err = RegistryError::DuplicateMission(MissionId::new("m1"));
        assert_eq!(err.to_string(), "Mission already registered: m1");

        let err = RegistryError::LockPoisoned("driver");
        assert_eq!(err.to_string(), "Lock poisoned: driver");
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: EngineError = RegistryError::UnknownDriver(DriverId::new("ghost")).into();
        assert_eq!(err.to_string(), "Driver not found: ghost");
        assert!(err.is_not_found());
        assert!(!err.is_deadline_exceeded());
    }

    #[test]
    fn test_engine_error_deadline_classification() {
        let err: EngineError = MissionError::DeadlineExceeded {
            mission_id: MissionId::new("m"),
            at: Timestamp(2),
            deadline: Timestamp(1),
        }
        .into();
        assert!(err.is_deadline_exceeded());
        assert!(!err.is_not_found());
    }
}
