use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::AppState;
use crate::display::DisplayClock;
use crate::error::{AppError, Result};
use crate::models::{ChartRequest, Parameter, Phase, Selection, Series};
use crate::session::{Publish, PublishedChart};
use crate::shaper::{build_chart, fill_gaps, GapFillConfig};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/chart/readings", post(fetch_chart))
        .route("/chart/readings/{device_id}", get(current_chart))
}

/// Body of `POST /chart/readings`, as sent by the dashboard filter form.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    #[serde(default)]
    device_id: String,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    phases: Vec<Phase>,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

/// Chart-ready payload for the line chart widget.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub device_id: String,
    pub generation: u64,
    /// Display strings, one per row.
    pub labels: Vec<String>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub series: Vec<Series>,
}

impl ChartResponse {
    fn new(published: &PublishedChart, clock: &DisplayClock) -> Self {
        // ---
        let chart = &published.chart;
        Self {
            device_id: published.request.device_id.clone(),
            generation: published.generation,
            labels: chart.labels.iter().map(|ts| clock.format(*ts)).collect(),
            timestamps: chart.labels.clone(),
            series: chart.series.clone(),
        }
    }
}

async fn fetch_chart(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChartQuery>, JsonRejection>,
) -> Result<Json<ChartResponse>> {
    // ---
    let Json(query) = payload?;
    info!("POST /chart/readings - device {:?}", query.device_id);

    let request = ChartRequest::new(
        &query.device_id,
        query.start_date,
        query.end_date,
        Selection::new(query.parameters, query.phases),
    )?;

    let ticket = state.sessions.begin();

    // Step 1: Fetch readings. A failure returns here and keeps the last chart.
    debug!(
        "POST /chart/readings - Step 1 (generation {})",
        ticket.generation()
    );
    let mut readings = state.backend.fetch_readings(&request).await?;

    if readings.windows(2).any(|w| w[0].timestamp > w[1].timestamp) {
        warn!("Backend returned unordered readings, sorting by timestamp");
        readings.sort_by_key(|r| r.timestamp);
    }

    // Step 2: Regularize
    debug!("POST /chart/readings - Step 2");
    let gap_config = GapFillConfig::from_secs(state.config.gap_interval_secs);
    let regular = fill_gaps(&readings, gap_config);

    // Step 3: Shape into series
    debug!("POST /chart/readings - Step 3");
    let chart = build_chart(&regular, &request.selection, state.config.absent_policy);

    // Step 4: Store as current unless a newer fetch already did. The caller
    // gets this request's chart either way.
    let published = Arc::new(PublishedChart::new(ticket, request, chart));
    if let Publish::Superseded(newer) = state.sessions.publish(Arc::clone(&published)) {
        info!(
            "Generation {} not stored, generation {} is newer",
            ticket.generation(),
            newer
        );
    }

    info!(
        "Chart complete: {} readings, {} rows, {} series",
        readings.len(),
        published.chart.labels.len(),
        published.chart.series.len()
    );
    Ok(Json(ChartResponse::new(&published, &state.clock)))
}

/// Last chart published for a device.
async fn current_chart(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<ChartResponse>> {
    // ---
    let published = state
        .sessions
        .current(&device_id)
        .ok_or_else(|| AppError::NotFound(format!("No chart for device {device_id}")))?;

    Ok(Json(ChartResponse::new(&published, &state.clock)))
}
