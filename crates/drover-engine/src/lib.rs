//! Mission and reward engine for Drover.
//!
//! Records driver actions, evaluates time-boxed missions against each
//! driver's action history, and distributes cash and voucher awards when a
//! mission's goal is met.

pub mod action;
pub mod award;
pub mod driver;
pub mod engine;
pub mod error;
pub mod mission;
pub mod registry;

pub use action::{Action, ActionKind};
pub use award::{Award, AwardKind};
pub use driver::{ActionReport, CompletionRejection, Driver, DriverSummary, PayoutPolicy};
pub use engine::RewardEngine;
pub use error::{ActionError, AwardError, EngineError, MissionError, RegistryError};
pub use mission::predicate::{CountPredicate, Predicate, SumPredicate};
pub use mission::state_machine::MissionStatus;
pub use mission::{Mission, MissionSummary};
pub use registry::{DriverRegistry, MissionRegistry};
