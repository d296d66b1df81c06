//! Process-wide driver and mission catalogs.
//!
//! Entities are added when created and removed by explicit `unregister`
//! calls. Each catalog guards its map with its own `RwLock`; drivers are
//! stored behind a per-driver `Mutex`. A driver lock may be held while a
//! catalog is read, never the other way round.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};

use drover_core::types::{DriverId, MissionId};

use crate::driver::Driver;
use crate::error::RegistryError;
use crate::mission::Mission;

/// Id-keyed map shared by both catalogs.
struct Catalog<K, V> {
    entries: RwLock<HashMap<K, V>>,
    label: &'static str,
}

impl<K, V> Catalog<K, V>
where
    K: Eq + Hash + Ord + Clone,
    V: Clone,
{
    fn new(label: &'static str) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            label,
        }
    }

    /// Insert unless the key is taken. Returns false on a duplicate.
    fn insert(&self, key: K, value: V) -> Result<bool, RegistryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RegistryError::LockPoisoned(self.label))?;
        if entries.contains_key(&key) {
            return Ok(false);
        }
        entries.insert(key, value);
        Ok(true)
    }

    fn remove(&self, key: &K) -> Result<Option<V>, RegistryError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RegistryError::LockPoisoned(self.label))?;
        Ok(entries.remove(key))
    }

    fn get(&self, key: &K) -> Result<Option<V>, RegistryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RegistryError::LockPoisoned(self.label))?;
        Ok(entries.get(key).cloned())
    }

    /// Values ordered by key.
    fn values(&self) -> Result<Vec<V>, RegistryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RegistryError::LockPoisoned(self.label))?;
        let mut pairs: Vec<(&K, &V)> = entries.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        Ok(pairs.into_iter().map(|(_, v)| v.clone()).collect())
    }

    fn len(&self) -> Result<usize, RegistryError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RegistryError::LockPoisoned(self.label))?;
        Ok(entries.len())
    }
}

/// Catalog of live drivers, each behind its own lock.
pub struct DriverRegistry {
    catalog: Catalog<DriverId, Arc<Mutex<Driver>>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new("driver catalog"),
        }
    }

    /// Register a driver and return its shared handle.
    pub fn register(&self, driver: Driver) -> Result<Arc<Mutex<Driver>>, RegistryError> {
        let id = driver.id().clone();
        let handle = Arc::new(Mutex::new(driver));
        if !self.catalog.insert(id.clone(), Arc::clone(&handle))? {
            return Err(RegistryError::DuplicateDriver(id));
        }
        tracing::info!(driver_id = %id, "Driver registered");
        Ok(handle)
    }

    pub fn unregister(&self, id: &DriverId) -> Result<Arc<Mutex<Driver>>, RegistryError> {
        let handle = self
            .catalog
            .remove(id)?
            .ok_or_else(|| RegistryError::UnknownDriver(id.clone()))?;
        tracing::info!(driver_id = %id, "Driver unregistered");
        Ok(handle)
    }

    pub fn get(&self, id: &DriverId) -> Result<Arc<Mutex<Driver>>, RegistryError> {
        self.catalog
            .get(id)?
            .ok_or_else(|| RegistryError::UnknownDriver(id.clone()))
    }

    /// Handles of every registered driver, ordered by id.
    pub fn all(&self) -> Result<Vec<Arc<Mutex<Driver>>>, RegistryError> {
        self.catalog.values()
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog of live missions.
pub struct MissionRegistry {
    catalog: Catalog<MissionId, Arc<Mission>>,
}

impl MissionRegistry {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new("mission catalog"),
        }
    }

    pub fn register(&self, mission: Mission) -> Result<Arc<Mission>, RegistryError> {
        let id = mission.id().clone();
        let mission = Arc::new(mission);
        if !self.catalog.insert(id.clone(), Arc::clone(&mission))? {
            return Err(RegistryError::DuplicateMission(id));
        }
        tracing::info!(
            mission_id = %id,
            from_time = %mission.from_time(),
            deadline = %mission.deadline(),
            "Mission registered"
        );
        Ok(mission)
    }

    pub fn unregister(&self, id: &MissionId) -> Result<Arc<Mission>, RegistryError> {
        let mission = self
            .catalog
            .remove(id)?
            .ok_or_else(|| RegistryError::UnknownMission(id.clone()))?;
        tracing::info!(mission_id = %id, "Mission unregistered");
        Ok(mission)
    }

    pub fn get(&self, id: &MissionId) -> Result<Arc<Mission>, RegistryError> {
        self.catalog
            .get(id)?
            .ok_or_else(|| RegistryError::UnknownMission(id.clone()))
    }

    /// Every registered mission, ordered by id.
    pub fn all(&self) -> Result<Vec<Arc<Mission>>, RegistryError> {
        self.catalog.values()
    }

    pub fn len(&self) -> Result<usize, RegistryError> {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MissionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::predicate::SumPredicate;
    use drover_core::types::Timestamp;

    fn mission(id: &str) -> Mission {
        Mission::new(
            id,
            "Title",
            "Description",
            vec![],
            Timestamp(0),
            Timestamp(100),
            Arc::new(SumPredicate::new(1.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_register_and_get_driver() {
        let registry = DriverRegistry::new();
        let handle = registry
            .register(Driver::new("d1", "Dana", "+1", 0.0))
            .unwrap();
        let found = registry.get(&DriverId::new("d1")).unwrap();
        assert!(Arc::ptr_eq(&handle, &found));
        assert_eq!(registry.len().unwrap(), 1);
    }

    #[test]
    fn test_register_duplicate_driver_fails() {
        let registry = DriverRegistry::new();
        registry.register(Driver::new("d1", "A", "1", 0.0)).unwrap();
        let err = registry
            .register(Driver::new("d1", "B", "2", 0.0))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateDriver(DriverId::new("d1")));
        // The original stays registered.
        let kept = registry.get(&DriverId::new("d1")).unwrap();
        assert_eq!(kept.lock().unwrap().name(), "A");
    }

    #[test]
    fn test_unregister_driver() {
        let registry = DriverRegistry::new();
        registry.register(Driver::new("d1", "A", "1", 0.0)).unwrap();
        registry.unregister(&DriverId::new("d1")).unwrap();
        assert!(registry.is_empty().unwrap());
        let err = registry.get(&DriverId::new("d1")).unwrap_err();
        assert_eq!(err, RegistryError::UnknownDriver(DriverId::new("d1")));
        assert!(registry.unregister(&DriverId::new("d1")).is_err());
    }

    #[test]
    fn test_all_drivers_sorted_by_id() {
        let registry = DriverRegistry::new();
        for id in ["c", "a", "b"] {
            registry.register(Driver::new(id, id, "0", 0.0)).unwrap();
        }
        let ids: Vec<String> = registry
            .all()
            .unwrap()
            .iter()
            .map(|d| d.lock().unwrap().id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_register_and_unregister_mission() {
        let registry = MissionRegistry::new();
        let m = registry.register(mission("m1")).unwrap();
        assert!(Arc::ptr_eq(&m, &registry.get(&MissionId::new("m1")).unwrap()));

        let err = registry.register(mission("m1")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateMission(MissionId::new("m1")));

        let removed = registry.unregister(&MissionId::new("m1")).unwrap();
        assert!(Arc::ptr_eq(&m, &removed));
        assert!(registry.is_empty().unwrap());
        assert_eq!(
            registry.get(&MissionId::new("m1")).unwrap_err(),
            RegistryError::UnknownMission(MissionId::new("m1"))
        );
    }

    #[test]
    fn test_all_missions_sorted_by_id() {
        let registry = MissionRegistry::new();
        registry.register(mission("z")).unwrap();
        registry.register(mission("a")).unwrap();
        let ids: Vec<String> = registry
            .all()
            .unwrap()
            .iter()
            .map(|m| m.id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "z"]);
    }

    #[test]
    fn test_poisoned_catalog_reports_error() {
        let registry = DriverRegistry::new();
        registry.register(Driver::new("d1", "A", "1", 0.0)).unwrap();

        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = registry.catalog.entries.write().unwrap();
                panic!("writer died holding the catalog lock");
            })
            .join()
        });

        let poisoned = RegistryError::LockPoisoned("driver catalog");
        assert_eq!(registry.len().unwrap_err(), poisoned);
        assert_eq!(registry.is_empty().unwrap_err(), poisoned);
        assert_eq!(registry.get(&DriverId::new("d1")).unwrap_err(), poisoned);
    }
}
