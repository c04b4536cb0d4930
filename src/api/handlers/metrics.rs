use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

/// GET /metrics — Prometheus scrape payload.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    // Keep the gauge in step with the flag at scrape time.
    let paused = state.pause_flag.load(Ordering::Relaxed);
    gauge!("alerting_paused").set(if paused { 1.0 } else { 0.0 });

    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
