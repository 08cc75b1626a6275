use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date formats accepted for post timestamps, tried in order.
pub const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Canonical format used when a timestamp is rendered back to text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Topical bucket a post is assigned to. Exactly one per post.
///
/// Variant order is significant: it is the tie-break order used when a post
/// matches several categories equally well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Academic,
    Financial,
    Health,
    Housing,
    Social,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Academic,
        Category::Financial,
        Category::Health,
        Category::Housing,
        Category::Social,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Academic => "academic",
            Category::Financial => "financial",
            Category::Health => "health",
            Category::Housing => "housing",
            Category::Social => "social",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "academic" => Ok(Category::Academic),
            "financial" => Ok(Category::Financial),
            "health" => Ok(Category::Health),
            "housing" => Ok(Category::Housing),
            "social" => Ok(Category::Social),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(format!("unknown sentiment label: {other}")),
        }
    }
}

/// Sentiment as produced by whichever classifier handled the post.
///
/// Serialized untagged: a bare number for compound scores, a lowercase
/// string for labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sentiment {
    /// Compound polarity, nominally in `[-1.0, 1.0]`.
    Score(f64),
    Label(SentimentLabel),
}

impl Sentiment {
    /// Numeric value used by scoring. Labels map to `1`, `0`, `-1`.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Sentiment::Score(v) => v,
            Sentiment::Label(SentimentLabel::Positive) => 1.0,
            Sentiment::Label(SentimentLabel::Neutral) => 0.0,
            Sentiment::Label(SentimentLabel::Negative) => -1.0,
        }
    }
}

#[derive(Debug, Error)]
#[error("post {id}: unparseable date {value:?}")]
pub struct TimestampError {
    pub id: String,
    pub value: String,
}

/// Parse a post timestamp in either accepted format.
///
/// # Errors
///
/// Returns the parse error of the second format when neither matches.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMATS[0])
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMATS[1]))
}

/// A post as delivered by a source, before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub date: String,
    pub upvotes: u32,
    #[serde(default)]
    pub comments: Option<u32>,
}

impl RawPost {
    /// Title and body joined with a single space.
    #[must_use]
    pub fn content(&self) -> String {
        format!("{} {}", self.title, self.text)
    }
}

/// A classified post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub date: String,
    pub upvotes: u32,
    #[serde(default)]
    pub comments: Option<u32>,
    pub sentiment: Sentiment,
    pub category: Category,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

impl Post {
    #[must_use]
    pub fn from_raw(
        raw: RawPost,
        sentiment: Sentiment,
        category: Category,
        keywords: BTreeSet<String>,
    ) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            text: raw.text,
            date: raw.date,
            upvotes: raw.upvotes,
            comments: raw.comments,
            sentiment,
            category,
            keywords,
        }
    }

    /// Parsed creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TimestampError`] if `date` matches neither accepted format.
    pub fn timestamp(&self) -> Result<NaiveDateTime, TimestampError> {
        parse_timestamp(&self.date).map_err(|_| TimestampError {
            id: self.id.clone(),
            value: self.date.clone(),
        })
    }
}
