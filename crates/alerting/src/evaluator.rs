//! Alarm Evaluator Implementation

use serde::Serialize;
use storage::{AggregateSnapshot, UnitConfig};
use tracing::debug;

/// Per-measurement alarm state for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlarmFlags {
    pub flame: bool,
    pub gas: bool,
    pub temp: bool,
}

impl AlarmFlags {
    /// True when any measurement crossed its threshold.
    pub fn any(&self) -> bool {
        self.flame || self.gas || self.temp
    }
}

/// Compare a snapshot against the unit's thresholds.
///
/// Flame and temperature are judged on the sum of their three channel
/// averages. The flame check is inverted: the photodiodes report *lower*
/// values the stronger the flame, so the alarm raises when the sum drops
/// below `ref_flame`. Gas is a single channel, compared directly.
pub fn evaluate(snapshot: &AggregateSnapshot, config: &UnitConfig) -> AlarmFlags {
    let flame_sum: f64 = snapshot.flame.iter().sum();
    let temp_sum: f64 = snapshot.temp.iter().sum();

    let flags = AlarmFlags {
        flame: flame_sum < f64::from(config.ref_flame),
        gas: snapshot.gas > f64::from(config.ref_gas),
        temp: temp_sum > f64::from(config.ref_temp),
    };

    if flags.any() {
        debug!(
            unit_id = snapshot.unit_id,
            flame = flags.flame,
            gas = flags.gas,
            temp = flags.temp,
            "Thresholds crossed"
        );
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot(flame: [f64; 3], gas: f64, temp: [f64; 3]) -> AggregateSnapshot {
        AggregateSnapshot {
            unit_id: 1,
            flame,
            gas,
            temp,
            updated_at: Utc::now(),
        }
    }

    fn defaults() -> UnitConfig {
        UnitConfig::with_defaults(1, Utc::now())
    }

    #[test]
    fn test_flame_alarm_is_inverted() {
        // Sum 300 < 500 reads as flame present
        let flags = evaluate(&snapshot([100.0, 100.0, 100.0], 100.0, [5.0, 5.0, 5.0]), &defaults());
        assert!(flags.flame);
        assert!(!flags.gas);
        assert!(!flags.temp);

        // Sum 600 >= 500 reads as no flame
        let flags = evaluate(&snapshot([200.0, 200.0, 200.0], 100.0, [5.0, 5.0, 5.0]), &defaults());
        assert!(!flags.flame);
    }

    #[test]
    fn test_gas_over_reference() {
        let flags = evaluate(&snapshot([600.0, 600.0, 600.0], 2500.0, [5.0, 5.0, 5.0]), &defaults());
        assert!(flags.gas);
        assert!(!flags.flame);

        let flags = evaluate(&snapshot([600.0, 600.0, 600.0], 2000.0, [5.0, 5.0, 5.0]), &defaults());
        assert!(!flags.gas, "reference itself is not over");
    }

    #[test]
    fn test_temp_sum_over_reference() {
        // 20+20+20 = 60 > 50
        let flags = evaluate(&snapshot([600.0, 600.0, 600.0], 100.0, [20.0, 20.0, 20.0]), &defaults());
        assert!(flags.temp);
        assert!(flags.any());

        let flags = evaluate(&snapshot([600.0, 600.0, 600.0], 100.0, [10.0, 10.0, 10.0]), &defaults());
        assert!(!flags.temp);
        assert!(!flags.any());
    }
}
