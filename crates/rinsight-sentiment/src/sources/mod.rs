//! Post source abstractions.

mod fixtures;
mod reddit;
mod reddit_helpers;

use std::sync::Arc;

use async_trait::async_trait;
use rinsight_core::{AppConfig, RawPost};

use crate::error::SentimentError;

pub use fixtures::{fixture_posts, FixtureSource};
pub use reddit::{RedditConfig, RedditSource};

/// A community feed that yields raw posts, newest first.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch up to `limit` posts.
    ///
    /// An empty result is not an error; callers decide how to degrade.
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<RawPost>, SentimentError>;

    fn name(&self) -> &str;
}

/// Build the Reddit source from configuration.
///
/// Missing credentials do not fail here; the source reports itself
/// unavailable on each fetch so callers fall back to cached or fixture data.
///
/// # Errors
///
/// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
pub fn build_source(config: &AppConfig) -> Result<Arc<dyn PostSource>, SentimentError> {
    let (client_id, client_secret) = match config.reddit_credentials() {
        Some((id, secret)) => (Some(id.to_string()), Some(secret.to_string())),
        None => {
            tracing::warn!("REDDIT_CLIENT_ID / REDDIT_CLIENT_SECRET not set; live fetches disabled");
            (None, None)
        }
    };
    let source = RedditSource::new(RedditConfig {
        client_id,
        client_secret,
        user_agent: config.reddit_user_agent.clone(),
        subreddit: config.subreddit.clone(),
        timeout_secs: config.request_timeout_secs,
        max_retries: config.max_retries,
        backoff_base_ms: config.retry_backoff_base_ms,
        ..RedditConfig::default()
    })?;
    Ok(Arc::new(source))
}
