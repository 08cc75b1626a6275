//! Single-slot cache of the most recently classified posts.
//!
//! The slot is read-only until it ages past the freshness window; after that
//! it is treated as absent for normal loads but is still available as a
//! stale fallback. Every store overwrites the slot wholesale.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rinsight_core::Post;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::SentimentError;

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub data: Vec<Post>,
}

/// Storage for the cache slot.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn load(&self) -> Result<Option<CacheEntry>, SentimentError>;
    async fn store(&self, entry: &CacheEntry) -> Result<(), SentimentError>;
}

/// JSON file backend: `{"timestamp": ..., "data": [...]}`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    async fn load(&self) -> Result<Option<CacheEntry>, SentimentError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SentimentError::Cache(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        match serde_json::from_slice::<CacheEntry>(&bytes) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                // A corrupt slot is replaced by the next successful fetch.
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable cache file"
                );
                Ok(None)
            }
        }
    }

    async fn store(&self, entry: &CacheEntry) -> Result<(), SentimentError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec(entry)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-process backend; contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<CacheEntry>>,
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<CacheEntry>, SentimentError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn store(&self, entry: &CacheEntry) -> Result<(), SentimentError> {
        *self.slot.lock().await = Some(entry.clone());
        Ok(())
    }
}

/// Freshness-aware view over a [`CacheBackend`].
#[derive(Clone)]
pub struct PostCache {
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
}

impl PostCache {
    #[must_use]
    pub fn new(backend: Arc<dyn CacheBackend>, clock: Arc<dyn Clock>, freshness: Duration) -> Self {
        Self {
            backend,
            clock,
            freshness,
        }
    }

    #[must_use]
    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// `true` while `now - timestamp` is below the freshness window.
    #[must_use]
    pub fn is_fresh(&self, entry: &CacheEntry) -> bool {
        let age = self.clock.now().signed_duration_since(entry.timestamp);
        // Entries from the future (clock skew) count as fresh.
        age.to_std().map_or(true, |age| age < self.freshness)
    }

    /// The cached posts if the entry is still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Cache`] or [`SentimentError::Io`] if the
    /// backend cannot be read.
    pub async fn fresh(&self) -> Result<Option<CacheEntry>, SentimentError> {
        Ok(self.backend.load().await?.filter(|entry| self.is_fresh(entry)))
    }

    /// The cached entry regardless of age.
    ///
    /// # Errors
    ///
    /// See [`PostCache::fresh`].
    pub async fn any(&self) -> Result<Option<CacheEntry>, SentimentError> {
        self.backend.load().await
    }

    /// Overwrite the slot with `posts`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub async fn store(&self, posts: Vec<Post>) -> Result<CacheEntry, SentimentError> {
        let entry = CacheEntry {
            timestamp: self.clock.now(),
            data: posts,
        };
        self.backend.store(&entry).await?;
        tracing::debug!(posts = entry.data.len(), "cache updated");
        Ok(entry)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Clock that only moves when told to.
    pub(crate) struct ManualClock {
        now: std::sync::Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        pub(crate) fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: std::sync::Mutex::new(now),
            }
        }

        pub(crate) fn advance(&self, by: chrono::Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock lock")
        }
    }
}
