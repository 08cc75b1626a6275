use std::collections::{BTreeMap, BTreeSet};

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use rinsight_core::{Category, Post, RecommenderKind, TimeWindow};
use rinsight_sentiment::{score, StressReport};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_sentiment_error, map_window_error, window_posts, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct StressRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub(super) async fn stress_scores_week(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(week): Path<String>,
) -> Result<Json<StressReport>, ApiError> {
    let window = TimeWindow::parse_week(&week).map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    stress_report(&state, &req_id, &window).await.map(Json)
}

pub(super) async fn stress_scores_range(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<StressReport>, ApiError> {
    let window = TimeWindow::parse_range(&start_date, &end_date)
        .map_err(|e| map_window_error(req_id.0.clone(), &e))?;
    stress_report(&state, &req_id, &window).await.map(Json)
}

/// `?start_date=..&end_date=..`; both or neither.
pub(super) async fn stress_scores_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StressRangeQuery>,
) -> Result<Json<StressReport>, ApiError> {
    let window = match (query.start_date.as_deref(), query.end_date.as_deref()) {
        (Some(start), Some(end)) => TimeWindow::parse_range(start, end)
            .map_err(|e| map_window_error(req_id.0.clone(), &e))?,
        (None, None) => TimeWindow::All,
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "bad_request",
                "start_date and end_date must be given together",
            ))
        }
    };
    stress_report(&state, &req_id, &window).await.map(Json)
}

async fn stress_report(
    state: &AppState,
    req_id: &RequestId,
    window: &TimeWindow,
) -> Result<StressReport, ApiError> {
    let posts = window_posts(state, req_id, window).await?;
    let mut report =
        score(&posts, window, &state.scoring).map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    if state.recommender.kind() == RecommenderKind::Generative {
        let suggestions = state
            .recommender
            .recommend_all(&keywords_by_category(&posts))
            .await;
        for (category, suggestion) in suggestions {
            report.apply_suggestion(category, suggestion);
        }
    }
    Ok(report)
}

fn keywords_by_category(posts: &[Post]) -> BTreeMap<Category, BTreeSet<String>> {
    let mut out: BTreeMap<Category, BTreeSet<String>> = BTreeMap::new();
    for post in posts {
        out.entry(post.category)
            .or_default()
            .extend(post.keywords.iter().cloned());
    }
    out
}
