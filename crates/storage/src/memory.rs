//! In-Memory Store Implementation

use crate::records::{AggregateSnapshot, Reading, UnitConfig, UserRecord};
use crate::store::{AggregateStore, ConfigStore, ReadingStore, UserStore};
use crate::StorageError;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// In-memory store backing every collection.
///
/// Each collection sits behind its own `Mutex`: individual operations are
/// atomic, multi-step sequences (read readings, compute, write snapshot)
/// are not.
pub struct MemoryStore {
    readings: Mutex<Vec<Reading>>,
    aggregates: Mutex<HashMap<i64, AggregateSnapshot>>,
    configs: Mutex<HashMap<i64, UnitConfig>>,
    users: Mutex<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        info!("Creating in-memory store");
        Self {
            readings: Mutex::new(Vec::new()),
            aggregates: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Total retained readings across all units.
    pub fn reading_count(&self) -> usize {
        self.readings.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Number of units with a snapshot.
    pub fn unit_count(&self) -> usize {
        self.aggregates.lock().map(|a| a.len()).unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_err<T>(err: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Backend(format!("Lock error: {}", err))
}

impl ReadingStore for MemoryStore {
    fn append(&self, reading: Reading) -> Result<(), StorageError> {
        let mut readings = self.readings.lock().map_err(lock_err)?;
        readings.push(reading);
        Ok(())
    }

    fn readings_for_unit(&self, unit_id: i64) -> Result<Vec<Reading>, StorageError> {
        let readings = self.readings.lock().map_err(lock_err)?;
        let mut unit: Vec<Reading> = readings
            .iter()
            .filter(|r| r.unit_id == unit_id)
            .cloned()
            .collect();
        unit.sort_by_key(|r| r.recorded_at);
        Ok(unit)
    }

    fn evict_oldest(&self, unit_id: i64, keep: usize) -> Result<usize, StorageError> {
        let mut readings = self.readings.lock().map_err(lock_err)?;

        let mut stamps: Vec<_> = readings
            .iter()
            .filter(|r| r.unit_id == unit_id)
            .map(|r| r.recorded_at)
            .collect();
        if stamps.len() <= keep {
            return Ok(0);
        }
        stamps.sort();

        let before = readings.len();
        if keep == 0 {
            readings.retain(|r| r.unit_id != unit_id);
        } else {
            // Everything strictly older than the keep-th newest goes.
            let cutoff = stamps[stamps.len() - keep];
            readings.retain(|r| r.unit_id != unit_id || r.recorded_at >= cutoff);
        }
        let evicted = before - readings.len();

        debug!(unit_id, evicted, "Evicted stale readings");
        Ok(evicted)
    }
}

impl AggregateStore for MemoryStore {
    fn get(&self, unit_id: i64) -> Result<Option<AggregateSnapshot>, StorageError> {
        let aggregates = self.aggregates.lock().map_err(lock_err)?;
        Ok(aggregates.get(&unit_id).cloned())
    }

    fn upsert(&self, snapshot: AggregateSnapshot) -> Result<(), StorageError> {
        let mut aggregates = self.aggregates.lock().map_err(lock_err)?;
        aggregates.insert(snapshot.unit_id, snapshot);
        Ok(())
    }

    fn all(&self) -> Result<Vec<AggregateSnapshot>, StorageError> {
        let aggregates = self.aggregates.lock().map_err(lock_err)?;
        let mut snapshots: Vec<_> = aggregates.values().cloned().collect();
        snapshots.sort_by_key(|s| s.unit_id);
        Ok(snapshots)
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, unit_id: i64) -> Result<Option<UnitConfig>, StorageError> {
        let configs = self.configs.lock().map_err(lock_err)?;
        Ok(configs.get(&unit_id).cloned())
    }

    fn insert_if_absent(&self, config: UnitConfig) -> Result<bool, StorageError> {
        let mut configs = self.configs.lock().map_err(lock_err)?;
        if configs.contains_key(&config.unit_id) {
            return Ok(false);
        }
        info!(unit_id = config.unit_id, "Creating default unit config");
        configs.insert(config.unit_id, config);
        Ok(true)
    }

    fn update(&self, config: UnitConfig) -> Result<(), StorageError> {
        let mut configs = self.configs.lock().map_err(lock_err)?;
        match configs.get_mut(&config.unit_id) {
            Some(existing) => {
                *existing = config;
                Ok(())
            }
            None => Err(StorageError::NotFound),
        }
    }
}

impl UserStore for MemoryStore {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StorageError> {
        let users = self.users.lock().map_err(lock_err)?;
        Ok(users.get(username).cloned())
    }

    fn insert(&self, user: UserRecord) -> Result<(), StorageError> {
        let mut users = self.users.lock().map_err(lock_err)?;
        if users.contains_key(&user.username) {
            return Err(StorageError::Duplicate(user.username));
        }
        users.insert(user.username.clone(), user);
        Ok(())
    }
}
