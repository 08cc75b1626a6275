//! Post pipeline orchestration: cache, live fetch, classification, fallbacks.

use std::path::PathBuf;
use std::sync::Arc;

use rinsight_core::{Post, RawPost};
use serde::Serialize;

use crate::cache::PostCache;
use crate::classifier::{Classifier, LexiconClassifier};
use crate::error::SentimentError;
use crate::persist::write_raw_posts;
use crate::sources::{fixture_posts, PostSource};

/// Where a batch of posts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostOrigin {
    Cache,
    Live,
    StaleCache,
    Fixture,
}

impl PostOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostOrigin::Cache => "cache",
            PostOrigin::Live => "live",
            PostOrigin::StaleCache => "stale_cache",
            PostOrigin::Fixture => "fixture",
        }
    }
}

impl std::fmt::Display for PostOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PostBatch {
    pub posts: Vec<Post>,
    pub origin: PostOrigin,
}

pub struct PostPipeline {
    source: Arc<dyn PostSource>,
    classifier: Arc<dyn Classifier>,
    cache: PostCache,
    fetch_limit: usize,
    raw_csv_path: Option<PathBuf>,
}

impl PostPipeline {
    #[must_use]
    pub fn new(
        source: Arc<dyn PostSource>,
        classifier: Arc<dyn Classifier>,
        cache: PostCache,
        fetch_limit: usize,
    ) -> Self {
        Self {
            source,
            classifier,
            cache,
            fetch_limit,
            raw_csv_path: None,
        }
    }

    /// Also write every live fetch to a raw posts CSV.
    #[must_use]
    pub fn with_raw_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_csv_path = Some(path.into());
        self
    }

    /// Load posts for a request.
    ///
    /// 1. A fresh cache entry is returned without touching the source.
    /// 2. Otherwise posts are fetched, classified and cached.
    /// 3. If the fetch fails or is empty, the stale cache entry is used, and
    ///    failing that, the built-in fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Cache`] or [`SentimentError::Io`] only when
    /// the cache cannot be read at all.
    pub async fn load(&self) -> Result<PostBatch, SentimentError> {
        if let Some(entry) = self.cache.fresh().await? {
            tracing::debug!(posts = entry.data.len(), "serving fresh cache");
            return Ok(PostBatch {
                posts: entry.data,
                origin: PostOrigin::Cache,
            });
        }
        Ok(self.fetch_or_degrade().await)
    }

    /// Bypass the cache and fetch now. Falls back like [`PostPipeline::load`].
    pub async fn refresh(&self) -> PostBatch {
        self.fetch_or_degrade().await
    }

    async fn fetch_or_degrade(&self) -> PostBatch {
        match self.fetch_live().await {
            Ok(posts) => {
                return PostBatch {
                    posts,
                    origin: PostOrigin::Live,
                }
            }
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    error = %e,
                    "live fetch failed; degrading"
                );
            }
        }

        match self.cache.any().await {
            Ok(Some(entry)) if !entry.data.is_empty() => {
                tracing::info!(
                    posts = entry.data.len(),
                    cached_at = %entry.timestamp,
                    "serving stale cache"
                );
                return PostBatch {
                    posts: entry.data,
                    origin: PostOrigin::StaleCache,
                };
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(error = %e, "stale cache unreadable");
            }
        }

        tracing::info!("serving fixture posts");
        PostBatch {
            posts: fixture_posts(),
            origin: PostOrigin::Fixture,
        }
    }

    async fn fetch_live(&self) -> Result<Vec<Post>, SentimentError> {
        let raw = self.source.fetch_posts(self.fetch_limit).await?;
        if raw.is_empty() {
            return Err(SentimentError::SourceUnavailable(format!(
                "{} returned no posts",
                self.source.name()
            )));
        }

        if let Some(path) = &self.raw_csv_path {
            let path = path.clone();
            let rows = raw.clone();
            let written = tokio::task::spawn_blocking(move || write_raw_posts(&path, &rows))
                .await
                .map_err(|e| SentimentError::Io(std::io::Error::other(e)))
                .and_then(|result| result);
            if let Err(e) = written {
                tracing::warn!(error = %e, "failed to write raw posts CSV");
            }
        }

        let mut posts = Vec::with_capacity(raw.len());
        for item in raw {
            posts.push(self.classify(item).await);
        }

        if let Err(e) = self.cache.store(posts.clone()).await {
            tracing::error!(error = %e, "failed to update post cache");
        }
        tracing::info!(
            source = self.source.name(),
            classifier = self.classifier.name(),
            posts = posts.len(),
            "fetched and classified posts"
        );
        Ok(posts)
    }

    async fn classify(&self, raw: RawPost) -> Post {
        let classification = match self.classifier.classify(&raw.title, &raw.text).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(
                    post = %raw.id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "classification failed; using lexicon"
                );
                LexiconClassifier::classify_text(&raw.title, &raw.text)
            }
        };
        Post::from_raw(
            raw,
            classification.sentiment,
            classification.category,
            classification.keywords,
        )
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
