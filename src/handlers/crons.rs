use axum::extract::State;
use axum::http::header;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::AppState;

/// `GET /api/crons` — forwards the scheduler gateway's job list untouched.
/// The gateway is optional infrastructure, so any failure degrades to an
/// empty list instead of an error.
pub async fn list_jobs(State(state): State<AppState>) -> Json<Value> {
    match fetch_jobs(&state.http, &state.config).await {
        Ok(jobs) => Json(jobs),
        Err(err) => {
            debug!("cron gateway unavailable: {}", err);
            Json(json!({ "jobs": [] }))
        }
    }
}

async fn fetch_jobs(http: &reqwest::Client, config: &Config) -> Result<Value, reqwest::Error> {
    http.get(format!("{}/api/cron/list", config.gateway_url))
        .bearer_auth(&config.gateway_token)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
