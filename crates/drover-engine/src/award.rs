//! Awards granted to drivers on mission completion.

use drover_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::driver::Driver;
use crate::error::AwardError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AwardKind {
    /// Credited to the driver's account balance.
    Cash { value: f64 },
    /// Kept in the driver's voucher collection.
    Voucher { value: f64 },
}

impl AwardKind {
    pub fn value(&self) -> f64 {
        match self {
            AwardKind::Cash { value } | AwardKind::Voucher { value } => *value,
        }
    }
}

/// A reward unit.
///
/// Missions own awards as templates. Each completion issues fresh instances
/// via [`Award::issue`]; an instance can be applied to a driver once, after
/// which `awarded_at` records when.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    id: Uuid,
    name: String,
    kind: AwardKind,
    created_at: Timestamp,
    awarded_at: Option<Timestamp>,
}

impl Award {
    pub fn new(name: impl Into<String>, kind: AwardKind, created_at: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            created_at,
            awarded_at: None,
        }
    }

    pub fn cash(name: impl Into<String>, value: f64, created_at: Timestamp) -> Self {
        Self::new(name, AwardKind::Cash { value }, created_at)
    }

    pub fn voucher(name: impl Into<String>, value: f64, created_at: Timestamp) -> Self {
        Self::new(name, AwardKind::Voucher { value }, created_at)
    }

    /// Issue a fresh, unapplied instance of this award.
    pub fn issue(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            kind: self.kind,
            created_at: self.created_at,
            awarded_at: None,
        }
    }

    /// Apply this award to `driver`.
    ///
    /// Cash raises the balance by its value, a voucher is added to the
    /// driver's vouchers. Fails with no effect on the driver if this
    /// instance was applied before.
    pub fn apply_to(&mut self, driver: &mut Driver, awarded_at: Timestamp) -> Result<(), AwardError> {
        if let Some(previous) = self.awarded_at {
            return Err(AwardError::AlreadyAwarded {
                id: self.id,
                awarded_at: previous,
            });
        }
        self.awarded_at = Some(awarded_at);

        match self.kind {
            AwardKind::Cash { value } => driver.change_balance(value),
            AwardKind::Voucher { .. } => driver.add_voucher(self.clone()),
        }
        driver.record_award(self.clone());

        tracing::debug!(
            award_id = %self.id,
            driver_id = %driver.id(),
            value = self.kind.value(),
            "Award applied"
        );
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AwardKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.kind.value()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn awarded_at(&self) -> Option<Timestamp> {
        self.awarded_at
    }

    pub fn is_awarded(&self) -> bool {
        self.awarded_at.is_some()
    }
}
