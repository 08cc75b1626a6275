//! Reddit API post source (client-credentials OAuth).

use std::time::Duration;

use async_trait::async_trait;
use rinsight_core::RawPost;
use serde::Deserialize;

use super::reddit_helpers::to_raw_post;
use super::PostSource;
use crate::error::SentimentError;
use crate::throttle::retry_with_backoff;

/// Reddit caps a listing page at 100 items.
const PAGE_LIMIT: usize = 100;

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Child {
    pub(super) data: PostData,
}

#[derive(Debug, Deserialize)]
pub(super) struct PostData {
    pub(super) id: Option<String>,
    pub(super) title: Option<String>,
    pub(super) selftext: Option<String>,
    pub(super) created_utc: Option<f64>,
    pub(super) score: Option<i64>,
    pub(super) num_comments: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub user_agent: String,
    pub subreddit: String,
    /// Token endpoint host, overridable for tests.
    pub auth_base_url: String,
    /// Listing API host, overridable for tests.
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            user_agent: "rinsight/0.1 (campus-wellbeing)".to_string(),
            subreddit: "Drexel".to_string(),
            auth_base_url: "https://www.reddit.com".to_string(),
            api_base_url: "https://oauth.reddit.com".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Reads the newest posts of one subreddit.
pub struct RedditSource {
    client: reqwest::Client,
    config: RedditConfig,
}

impl RedditSource {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: RedditConfig) -> Result<Self, SentimentError> {
        // oauth.reddit.com sometimes blocks rustls via TLS fingerprinting.
        // If rejected, enable `native-tls` on reqwest and call `.use_native_tls()`.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    async fn fetch_token(&self, client_id: &str, client_secret: &str) -> Result<String, SentimentError> {
        let url = format!(
            "{}/api/v1/access_token",
            self.config.auth_base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .header("User-Agent", &self.config.user_agent)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SentimentError::Reddit(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let token_resp: TokenResponse = response
            .json()
            .await
            .map_err(|e| SentimentError::Reddit(format!("token parse error: {e}")))?;

        Ok(token_resp.access_token)
    }

    async fn fetch_page(
        &self,
        token: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Listing, SentimentError> {
        let endpoint = format!(
            "{}/r/{}/new",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.subreddit
        );
        let mut params: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("raw_json", "1".to_string()),
        ];
        if let Some(cursor) = after {
            params.push(("after", cursor.to_string()));
        }

        retry_with_backoff(self.config.max_retries, self.config.backoff_base_ms, || {
            let request = self
                .client
                .get(&endpoint)
                .bearer_auth(token)
                .header("User-Agent", &self.config.user_agent)
                .query(&params);
            async move {
                let response = request.send().await?.error_for_status()?;
                response
                    .json::<Listing>()
                    .await
                    .map_err(|e| SentimentError::Reddit(format!("listing parse error: {e}")))
            }
        })
        .await
    }
}

#[async_trait]
impl PostSource for RedditSource {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<RawPost>, SentimentError> {
        let (Some(client_id), Some(client_secret)) =
            (&self.config.client_id, &self.config.client_secret)
        else {
            return Err(SentimentError::SourceUnavailable(
                "reddit credentials are not configured".to_string(),
            ));
        };

        let token = self.fetch_token(client_id, client_secret).await?;
        let mut posts = Vec::with_capacity(limit);
        let mut after: Option<String> = None;

        while posts.len() < limit {
            let page_size = (limit - posts.len()).min(PAGE_LIMIT);
            let listing = self.fetch_page(&token, page_size, after.as_deref()).await?;
            let fetched = listing.data.children.len();
            posts.extend(
                listing
                    .data
                    .children
                    .iter()
                    .filter_map(|child| to_raw_post(&child.data)),
            );

            after = listing.data.after;
            if fetched == 0 || after.is_none() {
                break;
            }
        }
        posts.truncate(limit);

        tracing::debug!(
            subreddit = %self.config.subreddit,
            posts = posts.len(),
            "fetched Reddit posts"
        );
        Ok(posts)
    }

    fn name(&self) -> &str {
        "reddit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source(server: &MockServer, with_credentials: bool) -> RedditSource {
        RedditSource::new(RedditConfig {
            client_id: with_credentials.then(|| "id".to_string()),
            client_secret: with_credentials.then(|| "secret".to_string()),
            auth_base_url: server.uri(),
            api_base_url: server.uri(),
            max_retries: 1,
            backoff_base_ms: 1,
            ..RedditConfig::default()
        })
        .expect("client")
    }

    async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "tok" })),
            )
            .mount(server)
            .await;
    }

    fn listing(children: &[serde_json::Value], after: Option<&str>) -> serde_json::Value {
        let children: Vec<serde_json::Value> = children
            .iter()
            .map(|data| serde_json::json!({ "kind": "t3", "data": data }))
            .collect();
        serde_json::json!({ "data": { "children": children, "after": after } })
    }

    #[tokio::test]
    async fn fetches_newest_posts_with_bearer_token() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/r/Drexel/new"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing(
                &[
                    serde_json::json!({
                        "id": "abc", "title": "Finals week", "selftext": "send help",
                        "created_utc": 1_745_143_200.0, "score": 12, "num_comments": 3
                    }),
                    serde_json::json!({
                        "id": "def", "title": "Downvoted", "selftext": "",
                        "created_utc": 1_745_143_200.0, "score": -4
                    }),
                ],
                None,
            )))
            .mount(&server)
            .await;

        let posts = source(&server, true).fetch_posts(50).await.expect("posts");
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "abc");
        assert_eq!(posts[0].date, "2025-04-20 10:00:00");
        assert_eq!(posts[0].comments, Some(3));
        assert_eq!(posts[1].upvotes, 0);
    }

    #[tokio::test]
    async fn follows_pagination_until_limit() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        let post = |id: &str| {
            serde_json::json!({ "id": id, "title": id, "created_utc": 1_745_143_200.0, "score": 1 })
        };
        Mock::given(method("GET"))
            .and(path("/r/Drexel/new"))
            .and(query_param("after", "t3_b"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing(&[post("c"), post("d")], Some("t3_d"))),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/r/Drexel/new"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(listing(&[post("a"), post("b")], Some("t3_b"))),
            )
            .with_priority(2)
            .mount(&server)
            .await;

        let posts = source(&server, true).fetch_posts(3).await.expect("posts");
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn missing_credentials_report_unavailable() {
        let server = MockServer::start().await;
        let err = source(&server, false).fetch_posts(10).await.unwrap_err();
        assert!(matches!(err, SentimentError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn rejected_token_is_a_reddit_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        let err = source(&server, true).fetch_posts(10).await.unwrap_err();
        assert!(matches!(err, SentimentError::Reddit(_)));
    }
}
