//! Health, status and reload endpoints

use crate::{ApiError, AppState};
use axum::extract::{Query, State};
use axum::Json;
use tally_core::{reload_shared, LoadOutcome, StatusReport};

/// Health check endpoint
pub async fn api_health() -> &'static str {
    "OK"
}

/// Current retrieval status (JSON API)
pub async fn api_status(state: State<AppState>) -> Json<StatusReport> {
    let ledger = state.ledger.read().await;
    Json(ledger.status())
}

/// Re-fetch every record. Query parameters go to the backend untouched.
pub async fn api_reload(
    state: State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<LoadOutcome>, ApiError> {
    let outcome = reload_shared(&state.ledger, &params).await;

    if let LoadOutcome::Failed { message } = &outcome {
        let ledger = state.ledger.read().await;
        let details = match ledger.store().error() {
            Some(error) => error.to_details(),
            None => tally_core::ErrorDetails::new(tally_core::ErrorCode::Transport, message.clone()),
        };
        return Err(ApiError::Retrieval { details });
    }
    Ok(Json(outcome))
}
