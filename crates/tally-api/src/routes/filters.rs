//! Filter, sort and page mutations. Each answers with the state it changed.

use crate::{ApiError, AppState};
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tally_config::SortKey;
use tally_core::{FilterUpdate, Page, ViewSnapshot};

#[derive(Debug, Deserialize)]
pub struct FilterRequest {
    pub dimension: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

/// Apply one filter change (facet values toggle)
pub async fn api_set_filter(
    state: State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<ViewSnapshot>, ApiError> {
    let update = FilterUpdate::parse(&request.dimension, request.value)
        .map_err(|message| ApiError::BadRequest { message })?;

    let mut ledger = state.ledger.write().await;
    ledger.set_filter(update);
    Ok(Json(ledger.snapshot()))
}

pub async fn api_reset_filters(state: State<AppState>) -> Json<ViewSnapshot> {
    let mut ledger = state.ledger.write().await;
    ledger.reset_filters();
    Json(ledger.snapshot())
}

/// Same key flips direction, a new key sorts ascending; back to page 1
pub async fn api_set_sort(
    state: State<AppState>,
    Json(request): Json<SortRequest>,
) -> Result<Json<ViewSnapshot>, ApiError> {
    let key: SortKey = request
        .key
        .parse()
        .map_err(|message| ApiError::BadRequest { message })?;

    let mut ledger = state.ledger.write().await;
    ledger.set_sort(key);
    Ok(Json(ledger.snapshot()))
}

pub async fn api_set_page(
    state: State<AppState>,
    Json(request): Json<PageRequest>,
) -> Json<Page> {
    let mut ledger = state.ledger.write().await;
    ledger.set_page(request.page);
    Json(ledger.table_page())
}
