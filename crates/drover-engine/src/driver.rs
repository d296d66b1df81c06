//! The driver aggregate.
//!
//! A driver owns its balance, vouchers, action history and mission
//! memberships. Every mutation goes through `&mut Driver`, so callers that
//! share a driver across threads serialize access with one lock per driver
//! (see [`crate::registry::DriverRegistry`]).

use std::collections::HashMap;
use std::sync::Arc;

use drover_core::types::{DriverId, MissionId, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::Action;
use crate::award::Award;
use crate::error::{ActionError, MissionError};
use crate::mission::state_machine::{validate_transition, MissionStatus};
use crate::mission::Mission;

/// Whether finished action payouts are credited to the account balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutPolicy {
    #[default]
    Credit,
    /// Only awards move the balance.
    Ignore,
}

#[derive(Debug, Clone)]
pub struct Driver {
    id: DriverId,
    name: String,
    phone: String,
    account_balance: f64,
    payout_policy: PayoutPolicy,
    active: HashMap<MissionId, Arc<Mission>>,
    completed: HashMap<MissionId, Arc<Mission>>,
    vouchers: Vec<Award>,
    action_history: Vec<Action>,
    award_history: Vec<Award>,
}

/// Outcome of [`Driver::action_done`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub action_id: Uuid,
    /// Price of the finished action, whether or not it was credited.
    pub payout: f64,
    /// Missions completed by this action, sorted by id.
    pub completed: Vec<MissionId>,
    /// Missions whose goal was met but whose completion was refused.
    pub rejected: Vec<CompletionRejection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRejection {
    pub mission_id: MissionId,
    pub error: MissionError,
}

/// Read-only projection of a driver for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverSummary {
    pub driver_id: DriverId,
    pub name: String,
    pub phone: String,
    pub account_balance: f64,
    pub voucher_count: usize,
    pub action_count: usize,
    pub active_missions: Vec<MissionId>,
    pub completed_missions: Vec<MissionId>,
}

impl Driver {
    pub fn new(
        id: impl Into<DriverId>,
        name: impl Into<String>,
        phone: impl Into<String>,
        initial_balance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: phone.into(),
            account_balance: initial_balance,
            payout_policy: PayoutPolicy::default(),
            active: HashMap::new(),
            completed: HashMap::new(),
            vouchers: Vec::new(),
            action_history: Vec::new(),
            award_history: Vec::new(),
        }
    }

    pub fn with_payout_policy(mut self, policy: PayoutPolicy) -> Self {
        self.payout_policy = policy;
        self
    }

    pub fn id(&self) -> &DriverId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn account_balance(&self) -> f64 {
        self.account_balance
    }

    pub fn payout_policy(&self) -> PayoutPolicy {
        self.payout_policy
    }

    pub fn vouchers(&self) -> &[Award] {
        &self.vouchers
    }

    pub fn action_history(&self) -> &[Action] {
        &self.action_history
    }

    /// Every award applied to this driver, in application order.
    pub fn award_history(&self) -> &[Award] {
        &self.award_history
    }

    /// Ids of active missions, sorted.
    pub fn active_missions(&self) -> Vec<MissionId> {
        sorted_ids(&self.active)
    }

    /// Ids of completed missions, sorted.
    pub fn completed_missions(&self) -> Vec<MissionId> {
        sorted_ids(&self.completed)
    }

    pub fn mission_status(&self, mission_id: &MissionId) -> MissionStatus {
        if self.active.contains_key(mission_id) {
            MissionStatus::Active
        } else if self.completed.contains_key(mission_id) {
            MissionStatus::Completed
        } else {
            MissionStatus::NotAccepted
        }
    }

    /// The single entry point for balance changes.
    pub fn change_balance(&mut self, amount: f64) {
        self.account_balance += amount;
    }

    pub(crate) fn add_voucher(&mut self, voucher: Award) {
        self.vouchers.push(voucher);
    }

    pub(crate) fn record_award(&mut self, award: Award) {
        self.award_history.push(award);
    }

    /// Accept a mission at `now`.
    ///
    /// Fails with `DeadlineExceeded` if `now` is past the deadline and with
    /// `InvalidTransition` if the driver already completed it. Accepting a
    /// mission that is already active changes nothing.
    pub fn accept_mission(&mut self, mission: Arc<Mission>, now: Timestamp) -> Result<(), MissionError> {
        if mission.is_past_deadline(now) {
            return Err(MissionError::DeadlineExceeded {
                mission_id: mission.id().clone(),
                at: now,
                deadline: mission.deadline(),
            });
        }

        let status = self.mission_status(mission.id());
        if status == MissionStatus::Active {
            tracing::debug!(driver_id = %self.id, mission_id = %mission.id(), "Mission already active");
            return Ok(());
        }
        validate_transition(status, MissionStatus::Active)?;

        tracing::info!(driver_id = %self.id, mission_id = %mission.id(), "Mission accepted");
        self.active.insert(mission.id().clone(), mission);
        Ok(())
    }

    pub(crate) fn mark_completed(&mut self, mission_id: &MissionId) {
        if let Some(mission) = self.active.remove(mission_id) {
            self.completed.insert(mission_id.clone(), mission);
        }
    }

    /// Drop an active mission that no longer exists. Completed missions are
    /// kept as history. Returns true if the mission was active.
    pub(crate) fn withdraw_mission(&mut self, mission_id: &MissionId) -> bool {
        self.active.remove(mission_id).is_some()
    }

    /// Record a finished action and re-evaluate every active mission.
    ///
    /// Finishes `action` at `now`, credits its payout according to the
    /// payout policy and appends it to the history. Each active mission whose
    /// predicate now holds over its window is completed at `now`. Deadline
    /// rejections are returned in the report; the mission stays active.
    pub fn action_done(&mut self, mut action: Action, now: Timestamp) -> Result<ActionReport, ActionError> {
        let payout = action.finish(now)?;
        if self.payout_policy == PayoutPolicy::Credit {
            self.change_balance(payout);
        }
        let action_id = action.id();
        self.action_history.push(action);

        let mut candidates: Vec<Arc<Mission>> = self.active.values().cloned().collect();
        candidates.sort_by(|a, b| a.id().cmp(b.id()));

        let mut completed = Vec::new();
        let mut rejected = Vec::new();

        for mission in candidates {
            let satisfied = mission.is_satisfied(&self.action_history);
            tracing::debug!(
                driver_id = %self.id,
                mission_id = %mission.id(),
                predicate = %mission.predicate().describe(),
                satisfied,
                "Mission evaluated"
            );
            if !satisfied {
                continue;
            }

            match mission.complete(self, now) {
                Ok(()) => completed.push(mission.id().clone()),
                Err(error) => {
                    tracing::warn!(
                        driver_id = %self.id,
                        mission_id = %mission.id(),
                        error = %error,
                        "Mission completion rejected"
                    );
                    rejected.push(CompletionRejection {
                        mission_id: mission.id().clone(),
                        error,
                    });
                }
            }
        }

        Ok(ActionReport {
            action_id,
            payout,
            completed,
            rejected,
        })
    }

    pub fn summary(&self) -> DriverSummary {
        DriverSummary {
            driver_id: self.id.clone(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            account_balance: self.account_balance,
            voucher_count: self.vouchers.len(),
            action_count: self.action_history.len(),
            active_missions: self.active_missions(),
            completed_missions: self.completed_missions(),
        }
    }
}

fn sorted_ids(missions: &HashMap<MissionId, Arc<Mission>>) -> Vec<MissionId> {
    let mut ids: Vec<MissionId> = missions.keys().cloned().collect();
    ids.sort();
    ids
}
