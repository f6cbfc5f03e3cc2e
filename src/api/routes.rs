use axum::{
    routing::{get, post},
    Router,
    extract::{Json, State, rejection::JsonRejection},
    response::{Html, IntoResponse, Response},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use std::any::Any as PanicPayload;
use std::time::Instant;

use crate::error::{Result, AppError};
use crate::api::models::{HealthResponse, SummarizeRequest, SummarizeResponse};
use crate::api::response;
use crate::classifier::is_valid_url;
use crate::extractor::trim_text;
use crate::summary::{ContentKind, generate_summary, source_label};
use crate::AppState;

pub const MISSING_CONTENT: &str = "Please provide some content to summarize";

const INDEX_HTML: &str = include_str!("../../templates/index.html");

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/summarize", post(summarize_handler))
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_handler() -> impl IntoResponse {
    response::success(HealthResponse { status: "healthy" })
}

async fn summarize_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SummarizeRequest>, JsonRejection>,
) -> Response {
    let start_time = Instant::now();

    let result = match payload {
        Ok(Json(req)) => process_summarize_request(&state, &req.content).await,
        Err(rejection) => Err(AppError::Unhandled(rejection.body_text())),
    };

    let elapsed = start_time.elapsed();
    info!(?elapsed, "summarize request finished");

    match result {
        Ok(response_data) => response::success(response_data).into_response(),
        Err(err) => {
            match &err {
                AppError::Validation(msg) => info!("Rejected request: {}", msg),
                AppError::Fetch(msg) => warn!("Fetch error: {}", msg),
                AppError::Model(msg) => error!("Model error: {}", msg),
                AppError::Unhandled(msg) | AppError::Config(msg) => error!("Unhandled error: {}", msg),
            }
            err.into_response()
        }
    }
}

/// Runs one submission through validation, classification, extraction and
/// summarization. The model is only reached when every earlier step passed.
pub async fn process_summarize_request(state: &AppState, content: &str) -> Result<SummarizeResponse> {
    let input = trim_text(content);
    if input.is_empty() {
        return Err(AppError::Validation(MISSING_CONTENT.to_string()));
    }

    let kind = if is_valid_url(input) {
        ContentKind::Url
    } else {
        ContentKind::Text
    };
    info!(?kind, input_chars = input.chars().count(), "Processing summarize request");

    let summary = match kind {
        ContentKind::Url => {
            let extracted = state
                .fetcher
                .extract_text_from_url(input)
                .await
                .map_err(|e| AppError::Fetch(format!("Failed to process URL: {}", e)))?;
            generate_summary(state.model.as_ref(), &extracted.text, kind).await?
        }
        ContentKind::Text => generate_summary(state.model.as_ref(), input, kind).await?,
    };

    Ok(SummarizeResponse {
        summary,
        source_type: kind.source_type(),
        source: source_label(input, kind),
    })
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    };

    error!("Handler panicked: {}", detail);
    AppError::Unhandled(detail).into_response()
}
