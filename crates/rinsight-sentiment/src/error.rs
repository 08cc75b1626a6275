use rinsight_core::TimestampError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("post source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("classifier error: {0}")]
    Classifier(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
