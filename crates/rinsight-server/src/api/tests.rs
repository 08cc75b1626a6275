use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use rinsight_core::{RecommenderKind, StressCalendar};
use rinsight_sentiment::classifier::LexiconClassifier;
use rinsight_sentiment::{
    Classifier, FixtureSource, MemoryBackend, PostCache, PostSource, RedditConfig, RedditSource,
    SystemClock,
};
use tower::ServiceExt;

use super::*;

/// A Reddit source without credentials: every fetch is unavailable, so
/// requests are served from the fixture set.
fn offline_source() -> Arc<dyn PostSource> {
    Arc::new(RedditSource::new(RedditConfig::default()).expect("reddit source"))
}

fn test_app(source: Arc<dyn PostSource>, kind: RecommenderKind) -> (Router, tempfile::TempDir) {
    let static_dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(static_dir.path().join("index.html"), "<h1>dashboard</h1>").expect("index");
    std::fs::write(static_dir.path().join("script.js"), "console.log('hi');").expect("script");

    let classifier: Arc<dyn Classifier> = Arc::new(LexiconClassifier);
    let cache = PostCache::new(
        Arc::new(MemoryBackend::default()),
        Arc::new(SystemClock),
        Duration::from_secs(3600),
    );
    let state = AppState {
        pipeline: Arc::new(PostPipeline::new(source, Arc::clone(&classifier), cache, 50)),
        recommender: Recommender::new(kind, classifier),
        scoring: Arc::new(ScoringConfig {
            calendar: StressCalendar::empty(),
            ..ScoringConfig::default()
        }),
    };
    (build_app(state, static_dir.path()), static_dir)
}

fn offline_app() -> (Router, tempfile::TempDir) {
    test_app(offline_source(), RecommenderKind::Static)
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).expect("json parse");
    (status, json)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri).await
}

#[test]
fn api_error_bad_request_maps_to_400() {
    let response = ApiError::new("req-1", "bad_request", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_unknown_code_maps_to_500() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_uses_envelope_and_request_id() {
    let (app, _dir) = offline_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .header("x-request-id", "health-1")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("health-1")
    );
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["meta"]["request_id"], "health-1");
}

#[tokio::test]
async fn stress_scores_for_week_cover_present_categories() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/stress-scores/16").await;
    assert_eq!(status, StatusCode::OK);
    for key in ["academic", "financial", "health", "housing", "social"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert!(json["overall"]["score"].is_u64());
    assert!(json["summary"]
        .as_str()
        .is_some_and(|s| s.starts_with("Week 16 stress: ")));
    assert_eq!(json["recommendation"], "Host campus-wide wellness fair");
    assert_eq!(
        json["academic"]["recommendation"],
        "Promote Math Resource Center (MRC)"
    );
    assert!(json["academic"].get("explanation").is_none());
}

#[tokio::test]
async fn stress_scores_omit_absent_categories() {
    // Week 15 holds a single academic post: -0.8 sentiment, two keywords,
    // 25 interactions, off-peak. Raw 2, score 98.
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/stress-scores/15").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json.get("financial").is_none());
    assert_eq!(json["academic"]["score"], 98);
    assert_eq!(json["academic"]["status"], "Low");
    assert_eq!(json["academic"]["trend"], "Stable");
    assert_eq!(
        json["academic"]["trend_data"],
        serde_json::json!([60, 55, 50, 98])
    );
}

#[tokio::test]
async fn stress_scores_accept_path_and_query_ranges() {
    let (app, _dir) = offline_app();
    let (status, by_path) =
        get_json(app.clone(), "/api/stress-scores/2025-04-14/2025-04-16").await;
    assert_eq!(status, StatusCode::OK);
    let (status, by_query) = get_json(
        app,
        "/api/stress-scores?start_date=2025-04-14&end_date=2025-04-16",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_path, by_query);
    assert!(by_path.get("housing").is_some());
    assert!(by_path.get("social").is_some());
    assert!(by_path.get("academic").is_none());
}

#[tokio::test]
async fn empty_window_reports_no_data() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/stress-scores/30").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["summary"], "Week 30 stress: No data");
    assert!(json["overall"].is_null());
}

#[tokio::test]
async fn malformed_windows_are_bad_requests() {
    let (app, _dir) = offline_app();
    for uri in [
        "/api/stress-scores/54",
        "/api/stress-scores/week4",
        "/api/stress-scores/2025-04-20/2025-04-01",
        "/api/stress-scores/2025-13-01/2025-04-01",
        "/api/stress-scores?start_date=2025-04-01",
        "/api/keywords/0",
        "/api/recommendations/abc",
        "/api/recent-insights/2025-04-20/2025-04-01",
    ] {
        let (status, json) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "bad_request", "{uri}");
    }
}

#[tokio::test]
async fn generative_failure_falls_back_with_explanation() {
    let (app, _dir) = test_app(offline_source(), RecommenderKind::Generative);
    let (status, json) = get_json(app, "/api/stress-scores/16").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["financial"]["recommendation"],
        "Link to Student Financial Services"
    );
    assert!(json["financial"]["explanation"]
        .as_str()
        .is_some_and(|e| e.starts_with("Generated recommendation unavailable")));
}

#[tokio::test]
async fn keywords_for_week_keep_first_seen_order() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/keywords/16").await;
    assert_eq!(status, StatusCode::OK);
    let first = &json.as_array().expect("array")[0];
    assert_eq!(first["keyword"], "crashing out");
    assert_eq!(first["frequency"], 1);
    assert_eq!(first["category"], "academic");
    assert_eq!(first["sample"], "Crashing out for math finals");
    assert_eq!(first["week"], "16");
}

#[tokio::test]
async fn keywords_without_window_cover_all_posts() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/keywords").await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().expect("array");
    assert!(items.iter().any(|k| k["keyword"] == "co-op"));
    assert!(items.iter().all(|k| k["week"] == "all"));
}

#[tokio::test]
async fn recommendations_are_unique_and_apply_override() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/recommendations").await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().expect("array");
    let mut keywords: Vec<&str> = items
        .iter()
        .filter_map(|r| r["keyword"].as_str())
        .collect();
    let total = keywords.len();
    keywords.sort_unstable();
    keywords.dedup();
    assert_eq!(keywords.len(), total);

    let brain_fog = items
        .iter()
        .find(|r| r["keyword"] == "brain fog")
        .expect("brain fog");
    assert_eq!(
        brain_fog["suggestion"],
        "Offer Counseling Center drop-ins and mental health workshops"
    );
}

#[tokio::test]
async fn recommendations_for_week_without_override() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/recommendations/16").await;
    assert_eq!(status, StatusCode::OK);
    let items = json.as_array().expect("array");
    let brain_fog = items
        .iter()
        .find(|r| r["keyword"] == "brain fog")
        .expect("brain fog");
    assert_eq!(
        brain_fog["suggestion"],
        "Offer Counseling Center drop-ins for mental health"
    );
    assert!(items.iter().all(|r| r["week"] == "16"));
}

#[tokio::test]
async fn recent_insights_return_two_newest() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/recent-insights/2025-04-14/2025-04-20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        serde_json::json!([
            {"title": "Crashing out for math finals", "category": "academic"},
            {"title": "Locking in but stressed", "category": "academic"},
        ])
    );
}

#[tokio::test]
async fn refresh_reports_origin() {
    let (app, _dir) = test_app(Arc::new(FixtureSource), RecommenderKind::Static);
    let (status, json) = send(app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["origin"], "live");
    assert_eq!(json["posts"], 8);

    let (app, _dir) = offline_app();
    let (_, json) = send(app, "POST", "/api/refresh").await;
    assert_eq!(json["origin"], "fixture");
}

#[tokio::test]
async fn reload_csv_refreshes_for_the_dashboard() {
    let (app, _dir) = test_app(Arc::new(FixtureSource), RecommenderKind::Static);
    let (status, json) = get_json(app, "/api/reload-csv").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["origin"], "live");
    assert_eq!(json["posts"], 8);
}

#[tokio::test]
async fn unknown_api_path_is_json_404() {
    let (app, _dir) = offline_app();
    let (status, json) = get_json(app, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn dashboard_files_and_index_fallback() {
    let (app, _dir) = offline_app();
    for (uri, needle) in [("/script.js", "console.log"), ("/some/page", "dashboard")] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert!(String::from_utf8_lossy(&body).contains(needle), "{uri}");
    }
}
