use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rinsight_core::Category;

use super::*;
use crate::cache::test_support::ManualClock;
use crate::cache::MemoryBackend;
use crate::classifier::Classification;
use crate::sources::FixtureSource;

/// Counts calls and replays a fixed outcome.
struct ScriptedSource {
    calls: AtomicUsize,
    outcome: fn() -> Result<Vec<RawPost>, SentimentError>,
}

impl ScriptedSource {
    fn new(outcome: fn() -> Result<Vec<RawPost>, SentimentError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostSource for ScriptedSource {
    async fn fetch_posts(&self, _limit: usize) -> Result<Vec<RawPost>, SentimentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn classify(&self, _: &str, _: &str) -> Result<Classification, SentimentError> {
        Err(SentimentError::Classifier("offline".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn one_post() -> Result<Vec<RawPost>, SentimentError> {
    Ok(vec![RawPost {
        id: "live1".to_string(),
        title: "Tuition due and I'm broke".to_string(),
        text: "need financial aid".to_string(),
        date: "2025-04-21 09:00:00".to_string(),
        upvotes: 3,
        comments: Some(1),
    }])
}

fn unavailable() -> Result<Vec<RawPost>, SentimentError> {
    Err(SentimentError::SourceUnavailable("down".to_string()))
}

fn empty() -> Result<Vec<RawPost>, SentimentError> {
    Ok(Vec::new())
}

fn setup(
    source: Arc<ScriptedSource>,
    classifier: Arc<dyn Classifier>,
) -> (PostPipeline, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 4, 21, 12, 0, 0)
            .single()
            .expect("valid"),
    ));
    let cache = PostCache::new(
        Arc::new(MemoryBackend::default()),
        clock.clone(),
        Duration::from_secs(3600),
    );
    (PostPipeline::new(source, classifier, cache, 50), clock)
}

#[tokio::test]
async fn fresh_cache_skips_the_source() {
    let source = Arc::new(ScriptedSource::new(one_post));
    let (pipeline, _clock) = setup(source.clone(), Arc::new(LexiconClassifier));

    let first = pipeline.load().await.expect("load");
    assert_eq!(first.origin, PostOrigin::Live);
    let second = pipeline.load().await.expect("load");
    assert_eq!(second.origin, PostOrigin::Cache);
    assert_eq!(second.posts, first.posts);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn stale_cache_triggers_a_fetch() {
    let source = Arc::new(ScriptedSource::new(one_post));
    let (pipeline, clock) = setup(source.clone(), Arc::new(LexiconClassifier));

    pipeline.load().await.expect("load");
    clock.advance(chrono::Duration::seconds(3600));
    let batch = pipeline.load().await.expect("load");
    assert_eq!(batch.origin, PostOrigin::Live);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn live_posts_are_classified() {
    let source = Arc::new(ScriptedSource::new(one_post));
    let (pipeline, _clock) = setup(source, Arc::new(LexiconClassifier));
    let batch = pipeline.load().await.expect("load");
    let post = &batch.posts[0];
    assert_eq!(post.category, Category::Financial);
    assert!(post.keywords.contains("tuition"));
    assert_eq!(post.comments, Some(1));
}

#[tokio::test]
async fn failing_classifier_degrades_to_lexicon() {
    let source = Arc::new(ScriptedSource::new(one_post));
    let (pipeline, _clock) = setup(source, Arc::new(FailingClassifier));
    let batch = pipeline.load().await.expect("load");
    assert_eq!(batch.origin, PostOrigin::Live);
    assert_eq!(batch.posts[0].category, Category::Financial);
}

#[tokio::test]
async fn source_failure_without_cache_serves_fixtures() {
    let source = Arc::new(ScriptedSource::new(unavailable));
    let (pipeline, _clock) = setup(source, Arc::new(LexiconClassifier));
    let batch = pipeline.load().await.expect("load");
    assert_eq!(batch.origin, PostOrigin::Fixture);
    assert_eq!(batch.posts, fixture_posts());
}

#[tokio::test]
async fn empty_fetch_is_treated_as_failure() {
    let source = Arc::new(ScriptedSource::new(empty));
    let (pipeline, _clock) = setup(source, Arc::new(LexiconClassifier));
    let batch = pipeline.load().await.expect("load");
    assert_eq!(batch.origin, PostOrigin::Fixture);
}

#[tokio::test]
async fn source_failure_prefers_stale_cache() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 4, 21, 12, 0, 0)
            .single()
            .expect("valid"),
    ));
    let cache = PostCache::new(
        Arc::new(MemoryBackend::default()),
        clock.clone(),
        Duration::from_secs(60),
    );

    let warm = PostPipeline::new(
        Arc::new(ScriptedSource::new(one_post)),
        Arc::new(LexiconClassifier),
        cache.clone(),
        50,
    );
    warm.load().await.expect("warm");
    clock.advance(chrono::Duration::seconds(120));

    let failing = PostPipeline::new(
        Arc::new(ScriptedSource::new(unavailable)),
        Arc::new(LexiconClassifier),
        cache,
        50,
    );
    let batch = failing.load().await.expect("load");
    assert_eq!(batch.origin, PostOrigin::StaleCache);
    assert_eq!(batch.posts[0].id, "live1");
}

#[tokio::test]
async fn refresh_bypasses_fresh_cache() {
    let source = Arc::new(ScriptedSource::new(one_post));
    let (pipeline, _clock) = setup(source.clone(), Arc::new(LexiconClassifier));
    pipeline.load().await.expect("load");
    let batch = pipeline.refresh().await;
    assert_eq!(batch.origin, PostOrigin::Live);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn live_fetch_writes_raw_csv() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("posts.csv");
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let cache = PostCache::new(
        Arc::new(MemoryBackend::default()),
        clock,
        Duration::from_secs(60),
    );
    let pipeline = PostPipeline::new(
        Arc::new(FixtureSource),
        Arc::new(LexiconClassifier),
        cache,
        4,
    )
    .with_raw_csv(&csv_path);

    let batch = pipeline.load().await.expect("load");
    assert_eq!(batch.posts.len(), 4);
    let rows = crate::persist::read_raw_posts(&csv_path).expect("csv");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].id, "p1");
}
