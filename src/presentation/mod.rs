// Presentation layer - HTTP surface over the polled snapshots
pub mod app_state;
pub mod error;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Responses are compressed by the handlers themselves, so no CompressionLayer here.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/machines", get(machine_table))
        .route("/machines/:id", get(machine_detail))
        .route("/alerts", get(list_alerts))
        .route("/alerts/events", get(alert_events))
        .route("/alerts/summary", get(alert_summary))
        .route("/alerts/stream", get(stream_alert_summary))
        .route("/notifications", get(notifications))
        .route("/realtime", get(realtime))
        .route("/factory/kpis", get(factory_kpis))
        .route("/analytics/kpis", get(analytics_kpis))
        .route("/analytics/heatmap", get(analytics_heatmap))
        .route("/history", get(history))
        .route("/session", get(current_session))
        .route("/session/login", post(login))
        .route("/session/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
