// HTTP request handlers
use crate::application::chart_widget::ChartView;
use crate::domain::gesture::InputEvent;
use crate::domain::range::RangeSelection;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

const EVENT_STREAM_BUFFER: usize = 64;

#[derive(Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub view: ChartView,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List charts currently loaded for the machine
pub async fn list_charts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let summaries = state.dashboard_service.chart_summaries();
    into_response(json_response(&summaries, accepts_brotli(&headers)).await)
}

pub async fn list_sensors(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let sensors = state.dashboard_service.sensor_list();
    into_response(json_response(&sensors, accepts_brotli(&headers)).await)
}

/// Current frame of one chart view
pub async fn chart_frame(
    Path(id): Path<usize>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_service.frame(id, query.view) {
        Some(frame) => into_response(json_response(&frame, accepts_brotli(&headers)).await),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Apply one pointer/wheel event to a chart view
pub async fn chart_input(
    Path(id): Path<usize>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(event): Json<InputEvent>,
) -> Response {
    match state.dashboard_service.handle_input(id, query.view, &event) {
        Some(outcome) => into_response(json_response(&outcome, accepts_brotli(&headers)).await),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Select a new time range for every chart
pub async fn change_range(
    State(state): State<Arc<AppState>>,
    Json(range): Json<RangeSelection>,
) -> Response {
    match state.dashboard_service.change_range(range) {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            tracing::warn!("Rejected range change: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response()
        }
    }
}

pub async fn open_notes(State(state): State<Arc<AppState>>) -> StatusCode {
    state.dashboard_service.open_notes();
    StatusCode::ACCEPTED
}

/// Stream dashboard events as they are published
pub async fn event_stream(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let (tx, rx) = mpsc::channel(EVENT_STREAM_BUFFER);

    // Slow readers lose events rather than stalling the publisher
    let subscription = state.bus.subscribe_scoped(move |event| {
        if tx.try_send(event.clone()).is_err() {
            tracing::debug!("Dropping event for slow or closed stream");
        }
    });

    tracing::debug!("Event stream opened, {} bus subscribers", state.bus.subscriber_count());
    stream_from_receiver(rx, subscription, accepts_brotli(&headers))
}

fn into_response(result: Result<Response, StatusCode>) -> Response {
    match result {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}
