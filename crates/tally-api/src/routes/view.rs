//! Derived view reads

use crate::{ApiError, AppState};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tally_core::{ChartData, FacetOptions, Page, ViewSnapshot};

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub page: Option<usize>,
}

/// Criteria, sort, options and summary cards
pub async fn api_view(state: State<AppState>) -> Json<ViewSnapshot> {
    let ledger = state.ledger.read().await;
    Json(ledger.snapshot())
}

/// One table page, clamped to the last valid page. Without `page` the current page is served.
pub async fn api_records(state: State<AppState>, query: Query<RecordsQuery>) -> Json<Page> {
    let ledger = state.ledger.read().await;
    let page = match query.page {
        Some(page) => ledger.view().page_at(page),
        None => ledger.table_page(),
    };
    Json(page)
}

/// Facet options from the full record set
pub async fn api_options(state: State<AppState>) -> Json<FacetOptions> {
    let ledger = state.ledger.read().await;
    Json(ledger.view().options().clone())
}

/// Chart payload: `category` or `monthly`
pub async fn api_chart(
    state: State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<ChartData>, ApiError> {
    let ledger = state.ledger.read().await;
    match kind.as_str() {
        "category" | "categories" => Ok(Json(ledger.category_chart())),
        "monthly" | "months" => Ok(Json(ledger.monthly_chart())),
        _ => Err(ApiError::NotFound {
            resource: format!("chart '{}'", kind),
        }),
    }
}
