use async_trait::async_trait;
use rinsight_core::Sentiment;

use super::{Classification, Classifier};
use crate::error::SentimentError;
use crate::lexicon::{categorize, extract_keywords, lexicon_score};

/// Deterministic local classifier backed by the campus lexicons.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    /// Synchronous classification; never fails.
    #[must_use]
    pub fn classify_text(title: &str, text: &str) -> Classification {
        let content = format!("{title} {text}");
        let keywords = extract_keywords(&content);
        let category = categorize(&keywords);
        Classification {
            sentiment: Sentiment::Score(lexicon_score(&content)),
            category,
            keywords,
        }
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, title: &str, text: &str) -> Result<Classification, SentimentError> {
        Ok(Self::classify_text(title, text))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
