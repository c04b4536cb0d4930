use axum::extract::State;
use axum::Json;

use crate::dashboard::ApiStatus;
use crate::errors::AppError;
use crate::models::SettingsUpdate;
use crate::AppState;

/// PUT /api/settings — Forward a settings form submission to the dashboard.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<SettingsUpdate>,
) -> Result<Json<ApiStatus>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("No settings provided".into()));
    }

    let status = state.client.update_settings(&body).await?;
    tracing::info!(update = ?body, "Dashboard settings updated");
    Ok(Json(status))
}
