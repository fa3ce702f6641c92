//! Store Interfaces
//!
//! One narrow trait per collection. The ingestion pipeline and the HTTP
//! handlers only ever see these, so tests run against [`MemoryStore`] and a
//! real document-store client slots in behind the same seams.
//!
//! [`MemoryStore`]: crate::MemoryStore

use crate::records::{AggregateSnapshot, Reading, UnitConfig, UserRecord};
use crate::StorageError;

/// Raw reading history, capped per unit by the caller's eviction policy.
pub trait ReadingStore: Send + Sync {
    /// Append a reading. Readings are immutable once written.
    fn append(&self, reading: Reading) -> Result<(), StorageError>;

    /// All retained readings for a unit, ascending by `recorded_at`.
    fn readings_for_unit(&self, unit_id: i64) -> Result<Vec<Reading>, StorageError>;

    /// Delete all but the `keep` most recent readings for a unit.
    /// Returns how many were evicted.
    fn evict_oldest(&self, unit_id: i64, keep: usize) -> Result<usize, StorageError>;
}

/// Current rolling-average snapshot, one per unit.
pub trait AggregateStore: Send + Sync {
    fn get(&self, unit_id: i64) -> Result<Option<AggregateSnapshot>, StorageError>;

    /// Insert or overwrite the unit's snapshot. One-per-unit is a store
    /// invariant, not an application convention.
    fn upsert(&self, snapshot: AggregateSnapshot) -> Result<(), StorageError>;

    /// Every unit's snapshot, ascending by unit id.
    fn all(&self) -> Result<Vec<AggregateSnapshot>, StorageError>;
}

/// Per-unit threshold configuration, one per unit.
pub trait ConfigStore: Send + Sync {
    fn get(&self, unit_id: i64) -> Result<Option<UnitConfig>, StorageError>;

    /// Create the config only if the unit has none yet. Returns whether a
    /// record was inserted.
    fn insert_if_absent(&self, config: UnitConfig) -> Result<bool, StorageError>;

    /// Overwrite an existing config. `NotFound` if the unit has none.
    fn update(&self, config: UnitConfig) -> Result<(), StorageError>;
}

/// User accounts, keyed by username.
pub trait UserStore: Send + Sync {
    fn get(&self, username: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Insert a new account. `Duplicate` if the username is already taken.
    fn insert(&self, user: UserRecord) -> Result<(), StorageError>;
}
