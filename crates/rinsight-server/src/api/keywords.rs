use axum::{
    extract::{Path, State},
    Extension, Json,
};
use rinsight_core::TimeWindow;
use rinsight_sentiment::{
    keyword_frequencies, keyword_recommendations, recent_insights, Insight, KeywordFrequency,
    KeywordRecommendation,
};

use crate::middleware::RequestId;

use super::{map_sentiment_error, map_window_error, window_posts, ApiError, AppState};

pub(super) async fn keywords_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<KeywordFrequency>>, ApiError> {
    keywords(&state, &req_id, &TimeWindow::All).await
}

pub(super) async fn keywords_week(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(week): Path<String>,
) -> Result<Json<Vec<KeywordFrequency>>, ApiError> {
    let window = TimeWindow::parse_week(&week).map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    keywords(&state, &req_id, &window).await
}

pub(super) async fn keywords_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<KeywordFrequency>>, ApiError> {
    let window = TimeWindow::parse_range(&start_date, &end_date)
        .map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    keywords(&state, &req_id, &window).await
}

async fn keywords(
    state: &AppState,
    req_id: &RequestId,
    window: &TimeWindow,
) -> Result<Json<Vec<KeywordFrequency>>, ApiError> {
    let posts = window_posts(state, req_id, window).await?;
    let refs: Vec<_> = posts.iter().collect();
    Ok(Json(keyword_frequencies(&refs, window)))
}

pub(super) async fn recommendations_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<KeywordRecommendation>>, ApiError> {
    recommendations(&state, &req_id, &TimeWindow::All).await
}

pub(super) async fn recommendations_week(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(week): Path<String>,
) -> Result<Json<Vec<KeywordRecommendation>>, ApiError> {
    let window = TimeWindow::parse_week(&week).map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    recommendations(&state, &req_id, &window).await
}

async fn recommendations(
    state: &AppState,
    req_id: &RequestId,
    window: &TimeWindow,
) -> Result<Json<Vec<KeywordRecommendation>>, ApiError> {
    let posts = window_posts(state, req_id, window).await?;
    let refs: Vec<_> = posts.iter().collect();
    Ok(Json(keyword_recommendations(&refs, window)))
}

pub(super) async fn recent_insights_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<Insight>>, ApiError> {
    let window = TimeWindow::parse_range(&start_date, &end_date)
        .map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    let posts = window_posts(&state, &req_id, &window).await?;
    let refs: Vec<_> = posts.iter().collect();
    recent_insights(&refs)
        .map(Json)
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))
}
