use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::application::MetricExporter;

use super::handlers::{
    current_handler, health_handler, history_handler, metric_handler, metrics_handler, AppState,
};

pub fn create_router(exporter: Arc<MetricExporter>) -> Router {
    let state = AppState { exporter };

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/metrics", get(metrics_handler))
        .route("/api/metrics/{id}", get(metric_handler))
        .route("/api/metrics/{id}/current", get(current_handler))
        .route("/api/metrics/{id}/history", get(history_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
