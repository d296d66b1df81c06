//! Reward engine facade.
//!
//! Owns the driver and mission catalogs and exposes the operations a front
//! end calls: creating drivers and missions, accepting missions, recording
//! finished actions, and read-only listings.

use std::sync::{Arc, Mutex, MutexGuard};

use drover_core::config::{AwardKindConfig, MissionSeed, RewardConfig};
use drover_core::types::{DriverId, MissionId, Timestamp};

use crate::action::Action;
use crate::award::Award;
use crate::driver::{ActionReport, Driver, DriverSummary, PayoutPolicy};
use crate::error::{EngineError, RegistryError};
use crate::mission::predicate::{self, Predicate};
use crate::mission::{Mission, MissionSummary};
use crate::registry::{DriverRegistry, MissionRegistry};

/// In-memory mission and reward engine.
///
/// Safe to share across threads. Operations on one driver are serialized by
/// that driver's lock; different drivers proceed in parallel.
pub struct RewardEngine {
    drivers: DriverRegistry,
    missions: MissionRegistry,
    config: RewardConfig,
}

impl RewardEngine {
    pub fn new(config: RewardConfig) -> Self {
        Self {
            drivers: DriverRegistry::new(),
            missions: MissionRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    fn payout_policy(&self) -> PayoutPolicy {
        if self.config.credit_action_payouts {
            PayoutPolicy::Credit
        } else {
            PayoutPolicy::Ignore
        }
    }

    // =========================================================================
    // Drivers
    // =========================================================================

    /// Create and register a driver.
    pub fn create_driver(
        &self,
        id: impl Into<DriverId>,
        name: impl Into<String>,
        phone: impl Into<String>,
        initial_balance: f64,
    ) -> Result<Arc<Mutex<Driver>>, EngineError> {
        let driver =
            Driver::new(id, name, phone, initial_balance).with_payout_policy(self.payout_policy());
        Ok(self.drivers.register(driver)?)
    }

    /// Remove a driver from the catalog.
    pub fn dispose_driver(&self, id: &DriverId) -> Result<(), EngineError> {
        self.drivers.unregister(id)?;
        Ok(())
    }

    pub fn driver(&self, id: &DriverId) -> Result<Arc<Mutex<Driver>>, EngineError> {
        Ok(self.drivers.get(id)?)
    }

    // =========================================================================
    // Missions
    // =========================================================================

    /// Create and register a mission.
    #[allow(clippy::too_many_arguments)]
    pub fn create_mission(
        &self,
        id: impl Into<MissionId>,
        title: impl Into<String>,
        description: impl Into<String>,
        awards: Vec<Award>,
        from_time: Timestamp,
        deadline: Timestamp,
        predicate: Arc<dyn Predicate>,
    ) -> Result<Arc<Mission>, EngineError> {
        let mission = Mission::new(id, title, description, awards, from_time, deadline, predicate)?;
        Ok(self.missions.register(mission)?)
    }

    /// Create missions declared in configuration.
    ///
    /// Stops at the first invalid seed; missions registered before it stay.
    pub fn seed_missions(&self, seeds: &[MissionSeed]) -> Result<Vec<Arc<Mission>>, EngineError> {
        let mut created = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let from_time = Timestamp::from_datetime(seed.from_time);
            let awards = seed
                .awards
                .iter()
                .map(|a| match a.kind {
                    AwardKindConfig::Cash => Award::cash(a.name.clone(), a.value, from_time),
                    AwardKindConfig::Voucher => Award::voucher(a.name.clone(), a.value, from_time),
                })
                .collect();
            let mission = self.create_mission(
                seed.id.clone(),
                seed.title.clone(),
                seed.description.clone(),
                awards,
                from_time,
                Timestamp::from_datetime(seed.deadline),
                predicate::from_goal(&seed.goal, &self.config),
            )?;
            created.push(mission);
        }
        Ok(created)
    }

    /// Remove a mission from the catalog and from every driver's active set.
    ///
    /// Drivers that already completed it keep it as history.
    pub fn destroy_mission(&self, id: &MissionId) -> Result<Arc<Mission>, EngineError> {
        let mission = self.missions.unregister(id)?;
        for handle in self.drivers.all()? {
            let mut driver = lock_driver(&handle)?;
            if driver.withdraw_mission(id) {
                tracing::debug!(driver_id = %driver.id(), mission_id = %id, "Active mission withdrawn");
            }
        }
        Ok(mission)
    }

    pub fn mission(&self, id: &MissionId) -> Result<Arc<Mission>, EngineError> {
        Ok(self.missions.get(id)?)
    }

    // =========================================================================
    // Driver operations
    // =========================================================================

    /// Accept a catalogued mission on behalf of a driver.
    pub fn accept_mission(
        &self,
        driver_id: &DriverId,
        mission_id: &MissionId,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let mission = self.missions.get(mission_id)?;
        self.accept_resolved(driver_id, mission, now)
    }

    /// Accept a mission already fetched from the catalog.
    ///
    /// The catalog is checked again under the driver lock: a mission
    /// destroyed (or replaced) since the lookup must not land in the
    /// driver's active set after `destroy_mission` has swept it.
    fn accept_resolved(
        &self,
        driver_id: &DriverId,
        mission: Arc<Mission>,
        now: Timestamp,
    ) -> Result<(), EngineError> {
        let handle = self.drivers.get(driver_id)?;
        let mut driver = lock_driver(&handle)?;
        let current = self.missions.get(mission.id())?;
        if !Arc::ptr_eq(&current, &mission) {
            tracing::debug!(mission_id = %mission.id(), "Mission replaced during accept");
            return Err(RegistryError::UnknownMission(mission.id().clone()).into());
        }
        driver.accept_mission(mission, now)?;
        Ok(())
    }

    /// Record a finished action for a driver and evaluate its missions.
    ///
    /// The driver's lock is held for the whole step, so no other mutation of
    /// that driver interleaves between finishing the action and completing
    /// missions.
    pub fn action_done(
        &self,
        driver_id: &DriverId,
        action: Action,
        now: Timestamp,
    ) -> Result<ActionReport, EngineError> {
        let handle = self.drivers.get(driver_id)?;
        let mut driver = lock_driver(&handle)?;
        Ok(driver.action_done(action, now)?)
    }

    // =========================================================================
    // Read-only listings
    // =========================================================================

    /// Snapshot copies of every driver, ordered by id.
    pub fn list_all_drivers(&self) -> Result<Vec<Driver>, EngineError> {
        let mut drivers = Vec::new();
        for handle in self.drivers.all()? {
            drivers.push(lock_driver(&handle)?.clone());
        }
        Ok(drivers)
    }

    /// Every catalogued mission, ordered by id.
    pub fn list_all_missions(&self) -> Result<Vec<Arc<Mission>>, EngineError> {
        Ok(self.missions.all()?)
    }

    pub fn driver_summaries(&self) -> Result<Vec<DriverSummary>, EngineError> {
        let mut summaries = Vec::new();
        for handle in self.drivers.all()? {
            summaries.push(lock_driver(&handle)?.summary());
        }
        Ok(summaries)
    }

    pub fn mission_summaries(&self) -> Result<Vec<MissionSummary>, EngineError> {
        Ok(self.missions.all()?.iter().map(|m| m.summary()).collect())
    }
}

impl Default for RewardEngine {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

fn lock_driver(handle: &Mutex<Driver>) -> Result<MutexGuard<'_, Driver>, RegistryError> {
    handle
        .lock()
        .map_err(|_| RegistryError::LockPoisoned("driver"))
}
