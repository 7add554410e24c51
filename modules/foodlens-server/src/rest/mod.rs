pub mod assistant;
pub mod search;

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::warn;

use foodlens_core::{ErrorKind, PipelineError};

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "" }))
        .route("/prompt", post(assistant::api_prompt))
        .route("/search", post(search::api_search))
        .route("/product/{barcode}", get(assistant::api_product))
        .route("/ask", post(assistant::api_ask))
        .route("/compare", post(assistant::api_compare))
        .with_state(state)
        // The browser extension calls from arbitrary page origins
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only, request bodies stay out of the logs
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

// --- Errors ---

/// Every failure leaves a handler as `{ "error": message }`.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    BadRequest(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Pipeline(err) => {
                let status = match err.kind() {
                    ErrorKind::Input => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Upstream => {
                        warn!(error = %err, "Upstream failure");
                        StatusCode::BAD_GATEWAY
                    }
                };
                (status, err.to_string())
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
