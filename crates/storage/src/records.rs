//! Persisted Record Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw sample from a sensor unit: three flame channels, one gas
/// channel, three temperature channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub unit_id: i64,
    pub flame: [i32; 3],
    pub gas: i32,
    pub temp: [i32; 3],
    pub recorded_at: DateTime<Utc>,
}

/// Rolling-average snapshot for one unit, recomputed from the retained
/// readings on every ingestion. One snapshot per unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub unit_id: i64,
    pub flame: [f64; 3],
    pub gas: f64,
    pub temp: [f64; 3],
    pub updated_at: DateTime<Utc>,
}

impl AggregateSnapshot {
    /// Seed a snapshot straight from a raw reading. Used for the first
    /// sample of a unit, before there is anything to average over.
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            unit_id: reading.unit_id,
            flame: reading.flame.map(f64::from),
            gas: f64::from(reading.gas),
            temp: reading.temp.map(f64::from),
            updated_at: reading.recorded_at,
        }
    }

    /// Mean of the three flame channel averages.
    pub fn flame_mean(&self) -> f64 {
        self.flame.iter().sum::<f64>() / self.flame.len() as f64
    }

    /// Mean of the three temperature channel averages.
    pub fn temp_mean(&self) -> f64 {
        self.temp.iter().sum::<f64>() / self.temp.len() as f64
    }
}

/// Per-unit alarm thresholds and notification settings.
///
/// Flame references are compared against the *sum* of the three channel
/// averages, and flame sensors read lower under stronger flame, so
/// `ref_flame` is a floor rather than a ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitConfig {
    pub unit_id: i64,
    pub address: Option<String>,
    pub notify_token: Option<String>,
    pub ref_flame: i32,
    pub ref_gas: i32,
    pub ref_temp: i32,
    pub notifications_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

impl UnitConfig {
    /// Default thresholds assigned the first time a unit reports in.
    pub fn with_defaults(unit_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            unit_id,
            address: None,
            notify_token: None,
            ref_flame: 500,
            ref_gas: 2000,
            ref_temp: 50,
            notifications_enabled: true,
            updated_at: now,
        }
    }
}

/// Stored user account. Only the PBKDF2 hash of the password is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub hashed_password: String,
    pub disabled: bool,
}
