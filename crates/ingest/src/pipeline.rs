//! Pipeline Implementation

use crate::IngestError;
use alerting::evaluate;
use chrono::{DateTime, Utc};
use notify::{warning_message, AlarmNotifier};
use serde::Deserialize;
use std::sync::Arc;
use storage::{
    AggregateSnapshot, AggregateStore, ConfigStore, Reading, ReadingStore, UnitConfig,
};
use tracing::{debug, info, warn};

/// How many readings are retained per unit. Older ones are evicted on the
/// ingestion that pushes the count past the cap.
pub const RETAINED_READINGS: usize = 3;

/// One sample as the hardware reports it, before a timestamp is assigned.
/// Sensor values are taken as-is; the hardware is trusted to send whatever
/// its ADCs produced.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSample {
    pub unit_id: i64,
    pub flame: [i32; 3],
    pub gas: i32,
    pub temp: [i32; 3],
}

/// The ingestion pipeline.
///
/// Holds no per-unit state of its own: every unit's running state lives in
/// the injected stores, so the pipeline is re-entrant across requests.
/// No lock spans the read-average-write sequence; concurrent samples for
/// one unit can interleave, and the next ingestion converges the snapshot
/// again since it recomputes from the retained set.
pub struct IngestionPipeline {
    readings: Arc<dyn ReadingStore>,
    aggregates: Arc<dyn AggregateStore>,
    configs: Arc<dyn ConfigStore>,
    notifier: Option<Arc<dyn AlarmNotifier>>,
}

impl IngestionPipeline {
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        aggregates: Arc<dyn AggregateStore>,
        configs: Arc<dyn ConfigStore>,
        notifier: Option<Arc<dyn AlarmNotifier>>,
    ) -> Self {
        Self {
            readings,
            aggregates,
            configs,
            notifier,
        }
    }

    /// Run one sample through the full pipeline.
    ///
    /// Steps run in order with no rollback: a failure leaves the writes of
    /// earlier steps in place. Store failures are fatal for the call.
    pub async fn ingest(&self, sample: RawSample) -> Result<(), IngestError> {
        let now = Utc::now();
        let unit_id = sample.unit_id;

        let reading = Reading {
            unit_id,
            flame: sample.flame,
            gas: sample.gas,
            temp: sample.temp,
            recorded_at: now,
        };
        self.readings.append(reading.clone())?;
        self.readings.evict_oldest(unit_id, RETAINED_READINGS)?;

        let created = self
            .configs
            .insert_if_absent(UnitConfig::with_defaults(unit_id, now))?;
        if created {
            info!(unit_id, "First sample from unit, thresholds defaulted");
        }

        let snapshot = match self.aggregates.get(unit_id)? {
            // First sample for the unit: nothing to average over yet.
            None => AggregateSnapshot::from_reading(&reading),
            Some(_) => {
                let retained = self.readings.readings_for_unit(unit_id)?;
                mean_snapshot(unit_id, &retained, now)
            }
        };
        self.aggregates.upsert(snapshot.clone())?;
        debug!(
            unit_id,
            gas = snapshot.gas,
            "Rolling average updated"
        );

        self.dispatch_alarms(&snapshot).await?;

        Ok(())
    }

    /// Evaluate the fresh snapshot and push a warning if the unit opted in.
    /// Delivery failure is logged and swallowed; the hardware's update call
    /// must not fail because a phone was unreachable.
    async fn dispatch_alarms(&self, snapshot: &AggregateSnapshot) -> Result<(), IngestError> {
        let config = match self.configs.get(snapshot.unit_id)? {
            Some(config) => config,
            None => return Ok(()),
        };

        let flags = evaluate(snapshot, &config);
        if !flags.any() || !config.notifications_enabled {
            return Ok(());
        }

        let (Some(notifier), Some(token)) = (&self.notifier, &config.notify_token) else {
            return Ok(());
        };

        if let Some(message) = warning_message(&flags, &config) {
            if let Err(err) = notifier.notify(token, &message).await {
                warn!(unit_id = snapshot.unit_id, %err, "Alarm notification failed");
            }
        }

        Ok(())
    }
}

/// Channel-wise mean over the retained readings: `flame[i]` and `temp[i]`
/// are averaged per channel position, gas as a single scalar.
fn mean_snapshot(unit_id: i64, readings: &[Reading], now: DateTime<Utc>) -> AggregateSnapshot {
    let n = readings.len().max(1) as f64;

    let mut flame = [0.0; 3];
    let mut temp = [0.0; 3];
    let mut gas = 0.0;
    for reading in readings {
        for i in 0..3 {
            flame[i] += f64::from(reading.flame[i]);
            temp[i] += f64::from(reading.temp[i]);
        }
        gas += f64::from(reading.gas);
    }
    for i in 0..3 {
        flame[i] /= n;
        temp[i] /= n;
    }

    AggregateSnapshot {
        unit_id,
        flame,
        gas: gas / n,
        temp,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use notify::NotifyError;
    use std::sync::Mutex;
    use storage::MemoryStore;

    /// Captures pushed messages instead of hitting the network.
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AlarmNotifier for RecordingNotifier {
        async fn notify(&self, token: &str, message: &str) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .unwrap()
                .push((token.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn pipeline_with(
        store: &Arc<MemoryStore>,
        notifier: Option<Arc<dyn AlarmNotifier>>,
    ) -> IngestionPipeline {
        IngestionPipeline::new(
            store.clone() as Arc<dyn ReadingStore>,
            store.clone() as Arc<dyn AggregateStore>,
            store.clone() as Arc<dyn ConfigStore>,
            notifier,
        )
    }

    fn sample(unit_id: i64, flame: [i32; 3], gas: i32, temp: [i32; 3]) -> RawSample {
        RawSample {
            unit_id,
            flame,
            gas,
            temp,
        }
    }

    // Quiet values against the default thresholds: flame sum well over
    // 500, gas under 2000, temp sum under 50.
    fn quiet(unit_id: i64, gas: i32) -> RawSample {
        sample(unit_id, [300, 300, 300], gas, [10, 10, 10])
    }

    #[tokio::test]
    async fn test_first_sample_seeds_snapshot_and_config() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(&store, None);

        pipeline.ingest(quiet(1, 100)).await.unwrap();

        let snapshot = AggregateStore::get(store.as_ref(), 1).unwrap().unwrap();
        assert_eq!(snapshot.flame, [300.0, 300.0, 300.0]);
        assert_eq!(snapshot.gas, 100.0);
        assert_eq!(snapshot.temp, [10.0, 10.0, 10.0]);

        let config = ConfigStore::get(store.as_ref(), 1).unwrap().unwrap();
        assert_eq!(config.ref_flame, 500);
        assert_eq!(config.ref_gas, 2000);
        assert_eq!(config.ref_temp, 50);
        assert!(config.notifications_enabled);
    }

    #[tokio::test]
    async fn test_history_capped_at_three() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(&store, None);

        for gas in [10, 20, 30, 40, 50] {
            pipeline.ingest(quiet(1, gas)).await.unwrap();
        }

        let retained = store.readings_for_unit(1).unwrap();
        assert_eq!(retained.len(), RETAINED_READINGS);
        assert_eq!(
            retained.iter().map(|r| r.gas).collect::<Vec<_>>(),
            vec![30, 40, 50]
        );
    }

    #[tokio::test]
    async fn test_means_are_per_channel() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(&store, None);

        pipeline
            .ingest(sample(1, [300, 400, 500], 100, [10, 20, 30]))
            .await
            .unwrap();
        pipeline
            .ingest(sample(1, [500, 600, 700], 200, [20, 30, 40]))
            .await
            .unwrap();

        let snapshot = AggregateStore::get(store.as_ref(), 1).unwrap().unwrap();
        assert_eq!(snapshot.flame, [400.0, 500.0, 600.0]);
        assert_eq!(snapshot.gas, 150.0);
        assert_eq!(snapshot.temp, [15.0, 25.0, 35.0]);
    }

    #[tokio::test]
    async fn test_identical_samples_converge_then_shift() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(&store, None);

        for _ in 0..3 {
            pipeline
                .ingest(sample(1, [10, 10, 10], 50, [20, 20, 20]))
                .await
                .unwrap();
        }
        let snapshot = AggregateStore::get(store.as_ref(), 1).unwrap().unwrap();
        assert_eq!(snapshot.flame, [10.0, 10.0, 10.0]);
        assert_eq!(snapshot.gas, 50.0);
        assert_eq!(snapshot.temp, [20.0, 20.0, 20.0]);

        // Fourth sample evicts one of the identical three and shifts the
        // mean toward the new values.
        pipeline
            .ingest(sample(1, [40, 40, 40], 110, [50, 50, 50]))
            .await
            .unwrap();
        let snapshot = AggregateStore::get(store.as_ref(), 1).unwrap().unwrap();
        assert_eq!(snapshot.flame, [20.0, 20.0, 20.0]);
        assert_eq!(snapshot.gas, 70.0);
        assert_eq!(snapshot.temp, [30.0, 30.0, 30.0]);
    }

    #[tokio::test]
    async fn test_units_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = pipeline_with(&store, None);

        pipeline.ingest(quiet(1, 100)).await.unwrap();
        pipeline.ingest(quiet(2, 900)).await.unwrap();

        assert_eq!(
            AggregateStore::get(store.as_ref(), 1).unwrap().unwrap().gas,
            100.0
        );
        assert_eq!(
            AggregateStore::get(store.as_ref(), 2).unwrap().unwrap().gas,
            900.0
        );
        assert_eq!(store.unit_count(), 2);
    }

    #[tokio::test]
    async fn test_notification_fires_with_token() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let pipeline = pipeline_with(&store, Some(notifier.clone()));

        // Seed config, then arm it with a token.
        pipeline.ingest(quiet(1, 100)).await.unwrap();
        let mut config = ConfigStore::get(store.as_ref(), 1).unwrap().unwrap();
        config.notify_token = Some("unit-token".to_string());
        store.update(config).unwrap();

        // Gas well over the 2000 reference.
        pipeline.ingest(quiet(1, 5000)).await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "unit-token");
        assert!(sent[0].1.contains("Gas over 2000"));
    }

    #[tokio::test]
    async fn test_notification_suppressed_without_token_or_opt_out() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let pipeline = pipeline_with(&store, Some(notifier.clone()));

        // No token configured: alarming sample stays local.
        pipeline.ingest(quiet(1, 5000)).await.unwrap();
        assert!(notifier.sent().is_empty());

        // Token present but notifications switched off.
        let mut config = ConfigStore::get(store.as_ref(), 1).unwrap().unwrap();
        config.notify_token = Some("unit-token".to_string());
        config.notifications_enabled = false;
        store.update(config).unwrap();

        pipeline.ingest(quiet(1, 5000)).await.unwrap();
        assert!(notifier.sent().is_empty());
    }
}
