//! Mission completion predicates.
//!
//! A predicate is a pure function over the actions inside a mission's time
//! window. It must be deterministic, side-effect free, and must not panic on
//! any input, including an empty window.

use std::sync::Arc;

use drover_core::config::{GoalConfig, RewardConfig};
use drover_core::types::ActionCategory;

use crate::action::Action;

/// Decides whether a window of finished actions satisfies a mission goal.
pub trait Predicate: Send + Sync {
    fn is_satisfied(&self, actions: &[&Action]) -> bool;

    /// Short human-readable description, used in logs.
    fn describe(&self) -> String {
        "custom predicate".to_string()
    }
}

impl<F> Predicate for F
where
    F: Fn(&[&Action]) -> bool + Send + Sync,
{
    fn is_satisfied(&self, actions: &[&Action]) -> bool {
        self(actions)
    }
}

/// Wrap a closure as a shareable predicate.
pub fn from_fn<F>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&[&Action]) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Satisfied when the total price of the window reaches `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SumPredicate {
    pub threshold: f64,
}

impl SumPredicate {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Predicate for SumPredicate {
    fn is_satisfied(&self, actions: &[&Action]) -> bool {
        if actions.is_empty() {
            return false;
        }
        let total: f64 = actions.iter().map(|a| a.price()).sum();
        total >= self.threshold
    }

    fn describe(&self) -> String {
        format!("sum(price) >= {}", self.threshold)
    }
}

/// Satisfied when the window holds at least `threshold` actions of `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountPredicate {
    pub category: ActionCategory,
    pub threshold: usize,
}

impl CountPredicate {
    pub fn new(category: ActionCategory, threshold: usize) -> Self {
        Self {
            category,
            threshold,
        }
    }

    pub fn driving(threshold: usize) -> Self {
        Self::new(ActionCategory::Driving, threshold)
    }
}

impl Predicate for CountPredicate {
    fn is_satisfied(&self, actions: &[&Action]) -> bool {
        if actions.is_empty() {
            return false;
        }
        let count = actions
            .iter()
            .filter(|a| a.category() == self.category)
            .count();
        count >= self.threshold
    }

    fn describe(&self) -> String {
        format!("count({}) >= {}", self.category, self.threshold)
    }
}

/// Build the predicate for a configured goal, filling missing thresholds
/// from the reward defaults.
pub fn from_goal(goal: &GoalConfig, defaults: &RewardConfig) -> Arc<dyn Predicate> {
    match goal {
        GoalConfig::Sum { threshold } => Arc::new(SumPredicate::new(
            threshold.unwrap_or(defaults.default_sum_threshold),
        )),
        GoalConfig::Count {
            category,
            threshold,
        } => Arc::new(CountPredicate::new(
            *category,
            threshold.unwrap_or(defaults.default_driving_count_threshold) as usize,
        )),
    }
}
