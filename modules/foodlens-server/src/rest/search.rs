use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;

use foodlens_core::SearchOutcome;

use super::ApiResult;
use crate::AppState;

#[derive(Deserialize)]
pub struct SearchRequest {
    query: Option<String>,
}

pub async fn api_search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<SearchOutcome> {
    let Json(body) = body?;
    let query = body.query.unwrap_or_default();
    let outcome = state.search.search(&query).await?;
    Ok(Json(outcome))
}
