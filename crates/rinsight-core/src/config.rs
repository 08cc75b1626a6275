use crate::app_config::{AppConfig, ClassifierKind, Environment, RecommenderKind};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("RINSIGHT_ENV", "development"))?;
    let bind_addr = parse_addr("RINSIGHT_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("RINSIGHT_LOG_LEVEL", "info");
    let static_dir = PathBuf::from(or_default("RINSIGHT_STATIC_DIR", "./static"));
    let data_dir = PathBuf::from(or_default("RINSIGHT_DATA_DIR", "./data"));
    let cache_ttl_secs = parse_u64("RINSIGHT_CACHE_TTL_SECS", "3600")?;
    let subreddit = or_default("RINSIGHT_SUBREDDIT", "Drexel");

    let fetch_limit = parse_usize("RINSIGHT_FETCH_LIMIT", "50")?;
    if fetch_limit == 0 {
        return Err(invalid("RINSIGHT_FETCH_LIMIT", "must be at least 1".to_string()));
    }

    let classifier = parse_classifier(&or_default("RINSIGHT_CLASSIFIER", "lexicon"))?;
    let classifier_url = optional("RINSIGHT_CLASSIFIER_URL");
    if classifier == ClassifierKind::Remote && classifier_url.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "RINSIGHT_CLASSIFIER_URL".to_string(),
        ));
    }
    let classifier_api_key = optional("RINSIGHT_CLASSIFIER_API_KEY");
    let classifier_model = or_default("RINSIGHT_CLASSIFIER_MODEL", "gpt-4o-mini");
    let classifier_delay_ms = parse_u64("RINSIGHT_CLASSIFIER_DELAY_MS", "1000")?;
    let recommender = parse_recommender(&or_default("RINSIGHT_RECOMMENDER", "static"))?;

    let request_timeout_secs = parse_u64("RINSIGHT_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("RINSIGHT_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("RINSIGHT_RETRY_BACKOFF_BASE_MS", "500")?;

    let reddit_client_id = optional("REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("REDDIT_CLIENT_SECRET");
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "rinsight/0.1 (campus-wellbeing)");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        static_dir,
        data_dir,
        cache_ttl_secs,
        subreddit,
        fetch_limit,
        classifier,
        classifier_url,
        classifier_api_key,
        classifier_model,
        classifier_delay_ms,
        recommender,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RINSIGHT_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

fn parse_classifier(s: &str) -> Result<ClassifierKind, ConfigError> {
    match s {
        "lexicon" => Ok(ClassifierKind::Lexicon),
        "remote" => Ok(ClassifierKind::Remote),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RINSIGHT_CLASSIFIER".to_string(),
            reason: format!("expected \"lexicon\" or \"remote\", got {other:?}"),
        }),
    }
}

fn parse_recommender(s: &str) -> Result<RecommenderKind, ConfigError> {
    match s {
        "static" => Ok(RecommenderKind::Static),
        "generative" => Ok(RecommenderKind::Generative),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RINSIGHT_RECOMMENDER".to_string(),
            reason: format!("expected \"static\" or \"generative\", got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
