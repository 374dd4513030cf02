use crate::AppState;
use axum::extract::State;
use axum::Json;
use tally_config::Config;

/// Active configuration: palette, currency, page size, backend endpoint
pub async fn api_settings(state: State<AppState>) -> Json<Config> {
    Json(state.config.as_ref().clone())
}
