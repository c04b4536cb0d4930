use axum::extract::State;
use axum::Json;

use crate::dashboard::ApiStatus;
use crate::errors::AppError;
use crate::AppState;

/// POST /api/scanner/start
pub async fn start(State(state): State<AppState>) -> Result<Json<ApiStatus>, AppError> {
    Ok(Json(state.client.start_scanner().await?))
}

/// POST /api/scanner/stop
pub async fn stop(State(state): State<AppState>) -> Result<Json<ApiStatus>, AppError> {
    Ok(Json(state.client.stop_scanner().await?))
}
