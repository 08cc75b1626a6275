use axum::{extract::State, Extension, Json};
use rinsight_sentiment::PostOrigin;
use serde::Serialize;

use crate::middleware::RequestId;

use super::AppState;

#[derive(Debug, Serialize)]
pub(super) struct RefreshResult {
    status: &'static str,
    message: String,
    origin: PostOrigin,
    posts: usize,
}

/// Force a live fetch. Degrades like a normal load, so this always succeeds;
/// `origin` tells the caller whether live data was actually obtained.
pub(super) async fn refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<RefreshResult> {
    Json(run_refresh(&state, &req_id, "ok").await)
}

/// `GET /api/reload-csv`, kept for the dashboard's reload button, which
/// checks for `status == "success"`.
pub(super) async fn reload_csv(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<RefreshResult> {
    Json(run_refresh(&state, &req_id, "success").await)
}

async fn run_refresh(state: &AppState, req_id: &RequestId, status: &'static str) -> RefreshResult {
    let batch = state.pipeline.refresh().await;
    let message = match batch.origin {
        PostOrigin::Live => format!("Fetched {} new posts", batch.posts.len()),
        PostOrigin::StaleCache => "Live fetch failed; serving cached posts".to_string(),
        PostOrigin::Fixture => "Live fetch failed; serving sample posts".to_string(),
        PostOrigin::Cache => "Serving cached posts".to_string(),
    };
    tracing::info!(
        request_id = %req_id.0,
        origin = %batch.origin,
        posts = batch.posts.len(),
        "refresh requested"
    );
    RefreshResult {
        status,
        message,
        origin: batch.origin,
        posts: batch.posts.len(),
    }
}
