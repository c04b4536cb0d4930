use axum::extract::{Path, State};
use axum::Json;

use crate::dashboard::ApiStatus;
use crate::errors::AppError;
use crate::models::OpportunityId;
use crate::AppState;

/// POST /api/opportunities/:id/execute — Ask the dashboard to execute a trade.
pub async fn execute(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiStatus>, AppError> {
    let id = match raw_id.parse::<i64>() {
        Ok(n) => OpportunityId::Int(n),
        Err(_) => OpportunityId::Str(raw_id),
    };

    let status = state.client.execute_trade(&id).await?;
    tracing::info!(id = %id, "Trade execution requested");
    Ok(Json(status))
}
