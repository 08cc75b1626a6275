mod keywords;
mod refresh;
mod stress;

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use rinsight_core::{Post, TimeWindow, WindowError};
use rinsight_sentiment::{posts_in_window, PostPipeline, Recommender, ScoringConfig, SentimentError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PostPipeline>,
    pub recommender: Recommender,
    pub scoring: Arc<ScoringConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_window_error(request_id: String, error: &WindowError) -> ApiError {
    ApiError::new(request_id, "bad_request", error.to_string())
}

pub(super) fn map_sentiment_error(request_id: String, error: &SentimentError) -> ApiError {
    tracing::error!(request_id = %request_id, error = %error, "failed to aggregate posts");
    ApiError::new(request_id, "internal_error", "failed to aggregate posts")
}

/// Load the current post set and select the posts in `window`.
pub(super) async fn window_posts(
    state: &AppState,
    req_id: &RequestId,
    window: &TimeWindow,
) -> Result<Vec<Post>, ApiError> {
    let batch = state
        .pipeline
        .load()
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;
    tracing::debug!(
        request_id = %req_id.0,
        origin = %batch.origin,
        window = %window.label(),
        "loaded posts"
    );
    let selected = posts_in_window(&batch.posts, window)
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;
    Ok(selected.into_iter().cloned().collect())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/stress-scores", get(stress::stress_scores_query))
        .route("/api/stress-scores/{week}", get(stress::stress_scores_week))
        .route(
            "/api/stress-scores/{start_date}/{end_date}",
            get(stress::stress_scores_range),
        )
        .route("/api/keywords", get(keywords::keywords_all))
        .route("/api/keywords/{week}", get(keywords::keywords_week))
        .route(
            "/api/keywords/{start_date}/{end_date}",
            get(keywords::keywords_range),
        )
        .route("/api/recommendations", get(keywords::recommendations_all))
        .route(
            "/api/recommendations/{week}",
            get(keywords::recommendations_week),
        )
        .route(
            "/api/recent-insights/{start_date}/{end_date}",
            get(keywords::recent_insights_range),
        )
        .route("/api/refresh", post(refresh::refresh))
        .route("/api/reload-csv", get(refresh::reload_csv))
        .route("/api/{*path}", any(api_not_found))
}

/// Build the application router: JSON API plus the static dashboard.
///
/// Paths outside `/api` are served from `static_dir`, with `index.html` as
/// the fallback for anything that does not exist on disk.
pub fn build_app(state: AppState, static_dir: &Path) -> Router {
    let dashboard =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(api_router())
        .fallback_service(dashboard)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

async fn api_not_found(Extension(req_id): Extension<RequestId>) -> ApiError {
    ApiError::new(req_id.0, "not_found", "no such endpoint")
}

#[cfg(test)]
mod tests;
