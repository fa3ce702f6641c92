//! Alerting
//!
//! Turns a unit's rolling-average snapshot and its configured thresholds
//! into per-measurement alarm flags.

mod evaluator;

pub use evaluator::{evaluate, AlarmFlags};
