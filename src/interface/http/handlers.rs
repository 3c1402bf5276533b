use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{MetricExporter, MetricHistory};
use crate::domain::{MetricId, MetricKind, MetricSample};

/// Error returned by the metric endpoints
#[derive(Debug)]
pub enum ApiError {
    UnknownSeries(MetricId),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownSeries(id) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": format!("unknown metric series: {}", id)
                })),
            )
                .into_response(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub exporter: Arc<MetricExporter>,
}

/// One point of a series
#[derive(Debug, Serialize)]
pub struct SampleResponse {
    pub kind: MetricKind,
    pub value: f64,
    pub timestamp: String,
    pub label: String,
}

impl From<&MetricSample> for SampleResponse {
    fn from(sample: &MetricSample) -> Self {
        Self {
            kind: sample.kind,
            value: sample.value,
            timestamp: sample.timestamp.to_rfc3339(),
            label: sample.label(),
        }
    }
}

/// Response for /api/metrics/{id}
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub id: MetricId,
    pub kind: MetricKind,
    pub title: String,
    pub unit: &'static str,
    pub current: Option<SampleResponse>,
    pub history: Vec<SampleResponse>,
}

impl From<&MetricHistory> for SeriesResponse {
    fn from(history: &MetricHistory) -> Self {
        Self {
            id: history.id.clone(),
            kind: history.kind,
            title: history.title.clone(),
            unit: history.unit,
            current: history.current().map(SampleResponse::from),
            history: history.samples.iter().map(SampleResponse::from).collect(),
        }
    }
}

/// Response for /api/metrics (aggregated)
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub timestamp: String,
    pub refresh_interval_secs: u64,
    pub capacity: usize,
    pub metrics: Vec<SeriesResponse>,
}

/// Response for /api/metrics/{id}/current
#[derive(Debug, Serialize)]
pub struct CurrentResponse {
    pub id: MetricId,
    pub current: Option<SampleResponse>,
}

/// Response for /api/metrics/{id}/history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub id: MetricId,
    pub samples: Vec<SampleResponse>,
}

/// Handler for GET /api/health
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "snmpmon"
        })),
    )
}

/// Handler for GET /api/metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsResponse> {
    let exporter = &state.exporter;

    Json(MetricsResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        refresh_interval_secs: exporter.refresh_interval().as_secs(),
        capacity: exporter.capacity(),
        metrics: exporter.dashboard().iter().map(SeriesResponse::from).collect(),
    })
}

/// Handler for GET /api/metrics/{id}
pub async fn metric_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let id = MetricId::new(id);
    let history = state
        .exporter
        .history(&id)
        .ok_or(ApiError::UnknownSeries(id))?;

    Ok(Json(SeriesResponse::from(&history)))
}

/// Handler for GET /api/metrics/{id}/history
pub async fn history_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let id = MetricId::new(id);
    let history = state
        .exporter
        .history(&id)
        .ok_or_else(|| ApiError::UnknownSeries(id.clone()))?;

    Ok(Json(HistoryResponse {
        id,
        samples: history.samples.iter().map(SampleResponse::from).collect(),
    }))
}

/// Handler for GET /api/metrics/{id}/current
pub async fn current_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CurrentResponse>, ApiError> {
    let id = MetricId::new(id);
    if !state.exporter.is_registered(&id) {
        return Err(ApiError::UnknownSeries(id));
    }

    let current = state.exporter.current(&id);
    Ok(Json(CurrentResponse {
        id,
        current: current.as_ref().map(SampleResponse::from),
    }))
}
