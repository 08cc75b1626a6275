//! Content classification: sentiment, category and keyword tags per post.

mod fallback;
mod lexicon;
mod remote;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rinsight_core::{AppConfig, Category, ClassifierKind, Sentiment};
use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::recommend::SupportResource;
use crate::throttle::Throttle;

pub use fallback::FallbackClassifier;
pub use lexicon::LexiconClassifier;
pub use remote::{RemoteClassifier, RemoteClassifierConfig};

/// Labels assigned to one post.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub category: Category,
    pub keywords: BTreeSet<String>,
}

/// Free-text recommendation with the reasoning behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub explanation: String,
}

/// Input to the generation capability of a classifier.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub category: Category,
    pub keywords: BTreeSet<String>,
    pub resources: &'static [SupportResource],
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify a post from its title and body.
    async fn classify(&self, title: &str, text: &str) -> Result<Classification, SentimentError>;

    /// Generate a recommendation for a category. Unsupported by default.
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, SentimentError> {
        Err(SentimentError::Generation(format!(
            "{} classifier cannot generate suggestions for {}",
            self.name(),
            request.category
        )))
    }

    fn name(&self) -> &str;
}

/// Build the classifier selected by configuration.
///
/// The remote classifier is always wrapped in a [`FallbackClassifier`] so
/// that classification failures never reach callers.
///
/// # Errors
///
/// Returns [`SentimentError::Classifier`] if the remote classifier is selected
/// without a URL, or [`SentimentError::Http`] if its HTTP client cannot be built.
pub fn build_classifier(config: &AppConfig) -> Result<Arc<dyn Classifier>, SentimentError> {
    match config.classifier {
        ClassifierKind::Lexicon => Ok(Arc::new(LexiconClassifier)),
        ClassifierKind::Remote => {
            let base_url = config.classifier_url.clone().ok_or_else(|| {
                SentimentError::Classifier("remote classifier requires a URL".to_string())
            })?;
            let remote = RemoteClassifier::new(RemoteClassifierConfig {
                base_url,
                api_key: config.classifier_api_key.clone(),
                model: config.classifier_model.clone(),
                timeout_secs: config.request_timeout_secs,
                max_retries: config.max_retries,
                backoff_base_ms: config.retry_backoff_base_ms,
                throttle: Throttle::new(Duration::from_millis(config.classifier_delay_ms)),
            })?;
            Ok(Arc::new(FallbackClassifier::new(Box::new(remote))))
        }
    }
}
