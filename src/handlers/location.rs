use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::models::error::ApiError;
use crate::models::position::{now_ms, LocationSnapshot, ReportPayload};
use crate::AppState;

/// `POST /api/location` — ingest a ping. Location updates replace the stored
/// record and trigger a detached reverse-geocode; every other recognized
/// message shape is acked without a state change.
pub async fn report(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let payload: ReportPayload =
        serde_json::from_slice(&body).map_err(|_| ApiError::InvalidPayload)?;

    if let Some(record) = payload.into_record(now_ms()) {
        let _ = Arc::clone(&state.tracker)
            .ingest(record, Arc::clone(&state.geocoder))
            .await;
    }

    Ok(Json(json!({ "ok": true })))
}

/// `GET /api/location` — the stored record plus its age label, or an explicit
/// "no data yet" signal so absence is never confused with a position at (0,0).
pub async fn snapshot(State(state): State<AppState>) -> Result<Json<LocationSnapshot>, ApiError> {
    let record = state.tracker.snapshot().await.ok_or(ApiError::NoData)?;
    Ok(Json(LocationSnapshot::new(record, now_ms())))
}
