//! Driver actions: timestamped units of paid work.

use drover_core::types::{ActionCategory, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ActionError;

/// What kind of work an action represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Driving { customer_name: String },
    Delivery { customer_name: String },
}

impl ActionKind {
    pub fn category(&self) -> ActionCategory {
        match self {
            ActionKind::Driving { .. } => ActionCategory::Driving,
            ActionKind::Delivery { .. } => ActionCategory::Delivery,
        }
    }

    pub fn customer_name(&self) -> &str {
        match self {
            ActionKind::Driving { customer_name } | ActionKind::Delivery { customer_name } => {
                customer_name
            }
        }
    }
}

/// A unit of driver work with a payout.
///
/// Created when the work starts and finished exactly once when it completes.
/// `finished_at`, once set, is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    id: Uuid,
    name: String,
    kind: ActionKind,
    created_at: Timestamp,
    finished_at: Option<Timestamp>,
    price: f64,
}

impl Action {
    pub fn new(name: impl Into<String>, kind: ActionKind, created_at: Timestamp, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            created_at,
            finished_at: None,
            price,
        }
    }

    pub fn driving(
        name: impl Into<String>,
        customer_name: impl Into<String>,
        created_at: Timestamp,
        price: f64,
    ) -> Self {
        let kind = ActionKind::Driving {
            customer_name: customer_name.into(),
        };
        Self::new(name, kind, created_at, price)
    }

    pub fn delivery(
        name: impl Into<String>,
        customer_name: impl Into<String>,
        created_at: Timestamp,
        price: f64,
    ) -> Self {
        let kind = ActionKind::Delivery {
            customer_name: customer_name.into(),
        };
        Self::new(name, kind, created_at, price)
    }

    /// Finish the action at `at` and return its payout.
    ///
    /// Fails without changing the action if it was already finished or if
    /// `at` precedes `created_at`.
    pub fn finish(&mut self, at: Timestamp) -> Result<f64, ActionError> {
        if self.finished_at.is_some() {
            return Err(ActionError::AlreadyFinished(self.id));
        }
        if at < self.created_at {
            return Err(ActionError::FinishedBeforeCreated {
                id: self.id,
                created_at: self.created_at,
                finished_at: at,
            });
        }
        self.finished_at = Some(at);
        Ok(self.price)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn category(&self) -> ActionCategory {
        self.kind.category()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<Timestamp> {
        self.finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_action_is_unfinished() {
        let action = Action::driving("Airport run", "Alice", Timestamp(100), 2500.0);
        assert!(!action.is_finished());
        assert_eq!(action.finished_at(), None);
        assert_eq!(action.category(), ActionCategory::Driving);
        assert_eq!(action.kind().customer_name(), "Alice");
    }

    #[test]
    fn test_finish_returns_price() {
        let mut action = Action::delivery("Parcel", "Bob", Timestamp(100), 1200.0);
        let payout = action.finish(Timestamp(160)).unwrap();
        assert_eq!(payout, 1200.0);
        assert_eq!(action.finished_at(), Some(Timestamp(160)));
    }

    #[test]
    fn test_finish_at_creation_time_is_allowed() {
        let mut action = Action::delivery("Parcel", "Bob", Timestamp(100), 1.0);
        assert!(action.finish(Timestamp(100)).is_ok());
    }

    #[test]
    fn test_finish_twice_fails_and_keeps_first_time() {
        let mut action = Action::driving("Ride", "Carol", Timestamp(0), 10.0);
        action.finish(Timestamp(10)).unwrap();
        let err = action.finish(Timestamp(20)).unwrap_err();
        assert_eq!(err, ActionError::AlreadyFinished(action.id()));
        assert_eq!(action.finished_at(), Some(Timestamp(10)));
    }

    #[test]
    fn test_finish_before_creation_fails() {
        let mut action = Action::driving("Ride", "Dan", Timestamp(100), 10.0);
        let err = action.finish(Timestamp(99)).unwrap_err();
        assert!(matches!(err, ActionError::FinishedBeforeCreated { .. }));
        assert!(!action.is_finished());
    }

    #[test]
    fn test_actions_get_distinct_ids() {
        let a = Action::driving("Ride", "Eve", Timestamp(0), 1.0);
        let b = Action::driving("Ride", "Eve", Timestamp(0), 1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_action_kind_serializes_tagged() {
        let kind = ActionKind::Delivery {
            customer_name: "Frank".to_string(),
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["kind"], "delivery");
        assert_eq!(json["customer_name"], "Frank");
    }
}
