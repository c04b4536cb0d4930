use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::models::AlertRecord;
use crate::AppState;

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/// GET /api/alerts/recent — Alerts delivered this session, newest first.
pub async fn recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<AlertRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Json(state.history.recent(limit))
}
