//! Chat-completions classifier (OpenAI-compatible API).

use std::collections::BTreeSet;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use rinsight_core::{Category, Sentiment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Classification, Classifier, Suggestion, SuggestionRequest};
use crate::error::SentimentError;
use crate::throttle::{retry_with_backoff, Throttle};

const CLASSIFY_PROMPT: &str = "You label posts from a university subreddit. \
Reply with JSON only: {\"sentiment\": <number from -1 to 1>, \
\"category\": one of \"academic\", \"financial\", \"health\", \"housing\", \"social\", \
\"keywords\": [up to 5 short lowercase phrases]}.";

const SUGGEST_PROMPT: &str = "You advise university student-support staff. \
Pick the single most fitting campus resource from the catalog for the stress signals given. \
Reply with JSON only: {\"recommendation\": <one sentence>, \"explanation\": <one sentence>}.";

#[derive(Debug, Clone)]
pub struct RemoteClassifierConfig {
    /// Base URL of the API, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub throttle: Throttle,
}

pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
    backoff_base_ms: u64,
    throttle: Throttle,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct LabelReply {
    sentiment: Sentiment,
    category: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Deserialize)]
struct SuggestionReply {
    recommendation: String,
    explanation: String,
}

impl RemoteClassifier {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: RemoteClassifierConfig) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key,
            model: config.model,
            max_retries: config.max_retries,
            backoff_base_ms: config.backoff_base_ms,
            throttle: config.throttle,
        })
    }

    /// Send one chat exchange and return the assistant's text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, SentimentError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            self.throttle.wait().await;
            let request = ChatRequest {
                model: &self.model,
                temperature: 0.0,
                messages: [
                    ChatMessage {
                        role: "system",
                        content: system,
                    },
                    ChatMessage {
                        role: "user",
                        content: user,
                    },
                ],
            };
            let mut builder = self.client.post(&self.endpoint).json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }
            let response: ChatResponse = builder.send().await?.error_for_status()?.json().await?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .ok_or_else(|| SentimentError::Classifier("empty completion".to_string()))
        })
        .await
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, title: &str, text: &str) -> Result<Classification, SentimentError> {
        let user = format!("Title: {title}\nBody: {text}");
        let raw = self.complete(CLASSIFY_PROMPT, &user).await?;
        let reply: LabelReply = parse_reply(&raw).map_err(SentimentError::Classifier)?;

        let category = reply
            .category
            .parse::<Category>()
            .map_err(SentimentError::Classifier)?;
        let keywords: BTreeSet<String> = reply
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Ok(Classification {
            sentiment: reply.sentiment,
            category,
            keywords,
        })
    }

    async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, SentimentError> {
        let catalog = request
            .resources
            .iter()
            .map(|r| format!("- {}: {}", r.name, r.description))
            .collect::<Vec<_>>()
            .join("\n");
        let keywords = request
            .keywords
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let user = format!(
            "Category: {}\nObserved keywords: {keywords}\nResource catalog:\n{catalog}",
            request.category
        );

        let raw = self.complete(SUGGEST_PROMPT, &user).await?;
        let reply: SuggestionReply = parse_reply(&raw).map_err(SentimentError::Generation)?;
        if reply.recommendation.trim().is_empty() {
            return Err(SentimentError::Generation(
                "model returned an empty recommendation".to_string(),
            ));
        }
        Ok(Suggestion {
            text: reply.recommendation.trim().to_string(),
            explanation: reply.explanation.trim().to_string(),
        })
    }

    fn name(&self) -> &str {
        "remote"
    }
}

/// Parse a JSON object out of model output, tolerating code fences and chatter.
fn parse_reply<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").ok());

    let unfenced = fence
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or(raw, |m| m.as_str());

    let body = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => return Err(format!("no JSON object in model output: {raw:?}")),
    };

    serde_json::from_str(body).map_err(|e| format!("malformed model output: {e}"))
}
