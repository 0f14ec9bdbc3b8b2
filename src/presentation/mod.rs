// Presentation layer - HTTP surface over the dashboard service
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    change_range, chart_frame, chart_input, event_stream, health_check, list_charts,
    list_sensors, open_notes,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

// Compression is applied per response body, so no CompressionLayer here
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/charts", get(list_charts))
        .route("/charts/:id/frame", get(chart_frame))
        .route("/charts/:id/events", post(chart_input))
        .route("/sensors", get(list_sensors))
        .route("/range", post(change_range))
        .route("/notes/open", post(open_notes))
        .route("/events", get(event_stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
