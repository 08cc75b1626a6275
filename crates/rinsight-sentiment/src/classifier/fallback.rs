use async_trait::async_trait;

use super::{Classification, Classifier, LexiconClassifier, Suggestion, SuggestionRequest};
use crate::error::SentimentError;

/// Wraps an unreliable classifier and answers with the lexicon when it fails.
///
/// `classify` never returns an error. `suggest` is delegated unchanged; the
/// recommendation layer owns its own fallback.
pub struct FallbackClassifier {
    primary: Box<dyn Classifier>,
}

impl FallbackClassifier {
    #[must_use]
    pub fn new(primary: Box<dyn Classifier>) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl Classifier for FallbackClassifier {
    async fn classify(&self, title: &str, text: &str) -> Result<Classification, SentimentError> {
        match self.primary.classify(title, text).await {
            Ok(classification) => Ok(classification),
            Err(e) => {
                tracing::warn!(
                    classifier = self.primary.name(),
                    error = %e,
                    "classification failed; using lexicon fallback"
                );
                Ok(LexiconClassifier::classify_text(title, text))
            }
        }
    }

    async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, SentimentError> {
        self.primary.suggest(request).await
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
