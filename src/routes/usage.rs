use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::DisplayRow;
use crate::usage::format_interval;

// ---

pub const NO_USAGE_MESSAGE: &str = "No usage data found for the given device ID.";

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/usage", post(handler))
}

#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    #[serde(default)]
    device_id: String,
}

/// Table rows, or a "no data" message when the device has none.
#[derive(Debug, Serialize, Deserialize)]
pub struct UsageResponse {
    pub device_id: String,
    pub rows: Vec<DisplayRow>,
    pub message: Option<String>,
}

async fn handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UsageQuery>, JsonRejection>,
) -> Result<Json<UsageResponse>> {
    // ---
    let Json(query) = payload?;
    let device_id = query.device_id.trim();
    if device_id.is_empty() {
        return Err(AppError::Validation("Device ID is required.".to_string()));
    }
    info!("POST /usage - device {:?}", device_id);

    let intervals = state.backend.fetch_usage(device_id).await?;
    let rows: Vec<DisplayRow> = intervals
        .iter()
        .map(|interval| format_interval(interval, &state.clock))
        .collect();

    let message = rows.is_empty().then(|| NO_USAGE_MESSAGE.to_string());
    info!("Usage complete, returning {} rows", rows.len());

    Ok(Json(UsageResponse {
        device_id: device_id.to_string(),
        rows,
        message,
    }))
}
