//! Fire-Alarm Routes

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use alerting::evaluate;
use ingest::RawSample;

/// The unit the hardware poll endpoint is wired to.
const HARDWARE_UNIT: i64 = 1;

/// Update payload as the hardware sends it: flattened channel fields.
#[derive(Debug, Deserialize)]
pub struct UpdatePayload {
    pub number: i64,
    pub gas: i32,
    pub flame1: i32,
    pub flame2: i32,
    pub flame3: i32,
    pub temp1: i32,
    pub temp2: i32,
    pub temp3: i32,
}

impl From<UpdatePayload> for RawSample {
    fn from(payload: UpdatePayload) -> Self {
        RawSample {
            unit_id: payload.number,
            flame: [payload.flame1, payload.flame2, payload.flame3],
            gas: payload.gas,
            temp: [payload.temp1, payload.temp2, payload.temp3],
        }
    }
}

/// Ingest one reading. Returns the plain confirmation the hardware checks
/// for.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdatePayload>,
) -> Result<&'static str, ApiError> {
    state.pipeline.ingest(payload.into()).await?;
    Ok("Update completed.")
}

/// Per-unit status row for the frontend. Flame and temp are collapsed to
/// one number (mean of the three channel averages) for display.
#[derive(Debug, Serialize)]
pub struct RoomStatus {
    pub number: i64,
    pub current_flame: f64,
    pub current_gas: f64,
    pub current_temp: f64,
    pub ref_flame: i32,
    pub ref_gas: i32,
    pub ref_temp: i32,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    #[serde(rename = "Room")]
    pub room: Vec<RoomStatus>,
}

/// Current status of every unit that has reported at least once.
pub async fn get_record(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RecordResponse>, ApiError> {
    let mut room = Vec::new();
    for snapshot in state.aggregates.all()? {
        // A snapshot without its config record has nothing to display
        // against; skip it.
        let Some(config) = state.configs.get(snapshot.unit_id)? else {
            continue;
        };
        room.push(RoomStatus {
            number: snapshot.unit_id,
            current_flame: snapshot.flame_mean(),
            current_gas: snapshot.gas,
            current_temp: snapshot.temp_mean(),
            ref_flame: config.ref_flame,
            ref_gas: config.ref_gas,
            ref_temp: config.ref_temp,
        });
    }
    Ok(Json(RecordResponse { room }))
}

/// 0/1 flags as the hardware expects them on its poll.
#[derive(Debug, Serialize)]
pub struct AlarmResponse {
    pub flame: u8,
    pub gas: u8,
    pub temp: u8,
}

/// Immediate pass/fail alarm check for the hardware unit.
pub async fn alarm(State(state): State<Arc<AppState>>) -> Result<Json<AlarmResponse>, ApiError> {
    let snapshot = state
        .aggregates
        .get(HARDWARE_UNIT)?
        .ok_or(ApiError::NotFound("No data for this unit"))?;
    let config = state
        .configs
        .get(HARDWARE_UNIT)?
        .ok_or(ApiError::NotFound("No config for this unit"))?;

    let flags = evaluate(&snapshot, &config);
    Ok(Json(AlarmResponse {
        flame: flags.flame as u8,
        gas: flags.gas as u8,
        temp: flags.temp as u8,
    }))
}
