use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metrics::gauge;
use serde_json::json;

use crate::alerting::MIN_ALERT_INTERVAL;
use crate::api::ws_types::{AlertingStatusData, WsMessage};
use crate::AppState;

fn set_paused(state: &AppState, paused: bool) {
    state.pause_flag.store(paused, Ordering::Relaxed);
    gauge!("alerting_paused").set(if paused { 1.0 } else { 0.0 });
    // Nobody listening is fine.
    let _ = state
        .ws_tx
        .send(WsMessage::AlertingStatus(AlertingStatusData { paused }));
}

/// POST /api/control/stop — Pause opportunity polling and alerting.
pub async fn stop(State(state): State<AppState>) -> impl IntoResponse {
    set_paused(&state, true);
    tracing::warn!("Alerting PAUSED via control API");
    (StatusCode::OK, Json(json!({ "status": "paused" })))
}

/// POST /api/control/resume — Resume opportunity polling and alerting.
pub async fn resume(State(state): State<AppState>) -> impl IntoResponse {
    set_paused(&state, false);
    tracing::info!("Alerting RESUMED via control API");
    (StatusCode::OK, Json(json!({ "status": "running" })))
}

/// GET /api/control/status — Current alerting status.
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let now = Instant::now();
    let paused = state.pause_flag.load(Ordering::Relaxed);
    let last_alert_secs_ago = state
        .policy
        .last_alert_at()
        .map(|t| now.saturating_duration_since(t).as_secs());

    Json(json!({
        "paused": paused,
        "dashboard": state.client.base_url(),
        "poll_interval_secs": state.config.poll_interval_secs,
        "min_alert_interval_ms": MIN_ALERT_INTERVAL.as_millis() as u64,
        "cooldown_remaining_ms": state.policy.cooldown_remaining(now).as_millis() as u64,
        "last_alert_secs_ago": last_alert_secs_ago,
        "alerts_recorded": state.history.len(),
    }))
}
