use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::ApiResult;
use crate::AppState;

// --- Request bodies ---

#[derive(Deserialize)]
pub struct PromptRequest {
    prompt: Option<String>,
}

#[derive(Deserialize)]
pub struct AskRequest {
    question: Option<String>,
    barcode: Option<String>,
}

#[derive(Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    barcodes: Vec<String>,
}

// --- Handlers ---

pub async fn api_prompt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PromptRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let prompt = body.prompt.unwrap_or_default();
    let text = state.assistant.prompt(&prompt).await?;
    Ok(Json(json!({ "text": text })))
}

pub async fn api_product(
    State(state): State<Arc<AppState>>,
    Path(barcode): Path<String>,
) -> ApiResult<Value> {
    let record = state.assistant.product(&barcode).await?;
    Ok(Json(json!({ "product": record.raw })))
}

pub async fn api_ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let question = body.question.unwrap_or_default();
    let text = state
        .assistant
        .ask(&question, body.barcode.as_deref())
        .await?;
    Ok(Json(json!({ "text": text })))
}

pub async fn api_compare(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(body) = body?;
    let text = state.assistant.compare(&body.barcodes).await?;
    Ok(Json(json!({ "text": text })))
}
