//! Missions: time-boxed goals over a driver's actions.
//!
//! Holds the mission definition, its evaluation window, and the completion
//! transition that distributes awards.

pub mod predicate;
pub mod state_machine;

use std::fmt;
use std::sync::Arc;

use drover_core::types::{MissionId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::award::Award;
use crate::driver::Driver;
use crate::error::MissionError;
use crate::mission::predicate::Predicate;
use crate::mission::state_machine::{validate_transition, MissionStatus};

/// A goal definition shared by every driver who accepts it.
///
/// Immutable after construction. `from_time < deadline` always holds.
#[derive(Clone)]
pub struct Mission {
    id: MissionId,
    title: String,
    description: String,
    from_time: Timestamp,
    deadline: Timestamp,
    awards: Vec<Award>,
    predicate: Arc<dyn Predicate>,
}

/// Read-only projection of a mission for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSummary {
    pub mission_id: MissionId,
    pub title: String,
    pub description: String,
}

impl Mission {
    /// Create a mission, rejecting windows where `from_time >= deadline`.
    pub fn new(
        id: impl Into<MissionId>,
        title: impl Into<String>,
        description: impl Into<String>,
        awards: Vec<Award>,
        from_time: Timestamp,
        deadline: Timestamp,
        predicate: Arc<dyn Predicate>,
    ) -> Result<Self, MissionError> {
        let id = id.into();
        if from_time >= deadline {
            return Err(MissionError::InvalidWindow {
                mission_id: id,
                from_time,
                deadline,
            });
        }
        Ok(Self {
            id,
            title: title.into(),
            description: description.into(),
            from_time,
            deadline,
            awards,
            predicate,
        })
    }

    pub fn id(&self) -> &MissionId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn from_time(&self) -> Timestamp {
        self.from_time
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn awards(&self) -> &[Award] {
        &self.awards
    }

    pub fn predicate(&self) -> &dyn Predicate {
        self.predicate.as_ref()
    }

    pub fn summary(&self) -> MissionSummary {
        MissionSummary {
            mission_id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
        }
    }

    /// True when `at` is past the deadline. The deadline itself is still open.
    pub fn is_past_deadline(&self, at: Timestamp) -> bool {
        at > self.deadline
    }

    /// Actions created at or after `from_time` and finished at or before the
    /// deadline. Unfinished actions never qualify.
    pub fn window<'a>(&self, history: &'a [Action]) -> Vec<&'a Action> {
        history
            .iter()
            .filter(|a| a.created_at() >= self.from_time)
            .filter(|a| a.finished_at().is_some_and(|f| f <= self.deadline))
            .collect()
    }

    /// Evaluate the completion predicate against the window of `history`.
    pub fn is_satisfied(&self, history: &[Action]) -> bool {
        let window = self.window(history);
        self.predicate.is_satisfied(&window)
    }

    /// Complete this mission for `driver`.
    ///
    /// Fails if `completed_at` is past the deadline or the mission is not
    /// active for the driver; in both cases nothing is granted. Otherwise
    /// every award is issued and applied once, in order, and the mission
    /// moves from the driver's active set to its completed set.
    pub fn complete(&self, driver: &mut Driver, completed_at: Timestamp) -> Result<(), MissionError> {
        if self.is_past_deadline(completed_at) {
            return Err(MissionError::DeadlineExceeded {
                mission_id: self.id.clone(),
                at: completed_at,
                deadline: self.deadline,
            });
        }
        validate_transition(driver.mission_status(&self.id), MissionStatus::Completed)?;

        for template in &self.awards {
            let mut award = template.issue();
            if let Err(e) = award.apply_to(driver, completed_at) {
                tracing::error!(
                    mission_id = %self.id,
                    driver_id = %driver.id(),
                    error = %e,
                    "Award applied more than once"
                );
                return Err(e.into());
            }
        }
        driver.mark_completed(&self.id);

        tracing::info!(
            mission_id = %self.id,
            driver_id = %driver.id(),
            awards = self.awards.len(),
            "Mission completed"
        );
        Ok(())
    }
}

impl fmt::Debug for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mission")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("from_time", &self.from_time)
            .field("deadline", &self.deadline)
            .field("awards", &self.awards)
            .field("predicate", &self.predicate.describe())
            .finish()
    }
}
