//! Shared domain types and configuration for rinsight.

pub mod app_config;
pub mod calendar;
pub mod config;
pub mod types;
pub mod window;

use thiserror::Error;

pub use app_config::{AppConfig, ClassifierKind, Environment, RecommenderKind};
pub use calendar::{AcademicCalendar, StressCalendar};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{Category, Post, RawPost, Sentiment, SentimentLabel, TimestampError};
pub use window::{TimeWindow, WindowError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
