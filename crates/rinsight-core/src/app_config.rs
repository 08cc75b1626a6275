use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which classifier labels freshly fetched posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    /// Deterministic local lexicon.
    Lexicon,
    /// Remote chat-completions model with lexicon fallback.
    Remote,
}

/// How category-level recommendations are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommenderKind {
    Static,
    Generative,
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub static_dir: PathBuf,
    pub data_dir: PathBuf,
    pub cache_ttl_secs: u64,
    pub subreddit: String,
    pub fetch_limit: usize,
    pub classifier: ClassifierKind,
    pub classifier_url: Option<String>,
    pub classifier_api_key: Option<String>,
    pub classifier_model: String,
    pub classifier_delay_ms: u64,
    pub recommender: RecommenderKind,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
}

impl AppConfig {
    #[must_use]
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("rinsight_cache.json")
    }

    #[must_use]
    pub fn raw_posts_path(&self) -> PathBuf {
        self.data_dir.join("posts.csv")
    }

    #[must_use]
    pub fn analyzed_posts_path(&self) -> PathBuf {
        self.data_dir.join("analyzed_posts.csv")
    }

    #[must_use]
    pub fn crash_predictions_path(&self) -> PathBuf {
        self.data_dir.join("crash_predictions.csv")
    }

    /// Reddit credentials, when both halves are configured.
    #[must_use]
    pub fn reddit_credentials(&self) -> Option<(&str, &str)> {
        match (&self.reddit_client_id, &self.reddit_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("static_dir", &self.static_dir)
            .field("data_dir", &self.data_dir)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("subreddit", &self.subreddit)
            .field("fetch_limit", &self.fetch_limit)
            .field("classifier", &self.classifier)
            .field("classifier_url", &self.classifier_url)
            .field(
                "classifier_api_key",
                &self.classifier_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_model", &self.classifier_model)
            .field("classifier_delay_ms", &self.classifier_delay_ms)
            .field("recommender", &self.recommender)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("reddit_client_id", &self.reddit_client_id)
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .finish()
    }
}
