//! Keyword frequency and recent-post views over a window of posts.

use std::collections::HashMap;

use rinsight_core::{Category, Post, TimeWindow};
use serde::Serialize;

use crate::error::SentimentError;

/// Maximum number of posts returned by [`recent_insights`].
pub const RECENT_INSIGHTS_LIMIT: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordFrequency {
    pub keyword: String,
    /// Number of posts mentioning the keyword.
    pub frequency: usize,
    /// Category of the first post mentioning it.
    pub category: Category,
    /// Title of the first post mentioning it.
    pub sample: String,
    pub week: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insight {
    pub title: String,
    pub category: Category,
}

/// Count keyword mentions across posts already filtered to `window`.
///
/// Results keep first-seen order, except for date-range windows where they
/// are sorted by frequency, highest first (ties keep first-seen order).
#[must_use]
pub fn keyword_frequencies(posts: &[&Post], window: &TimeWindow) -> Vec<KeywordFrequency> {
    let week = window.label();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<KeywordFrequency> = Vec::new();

    for post in posts {
        for keyword in &post.keywords {
            if let Some(&i) = index.get(keyword.as_str()) {
                out[i].frequency += 1;
            } else {
                index.insert(keyword.as_str(), out.len());
                out.push(KeywordFrequency {
                    keyword: keyword.clone(),
                    frequency: 1,
                    category: post.category,
                    sample: post.title.clone(),
                    week: week.clone(),
                });
            }
        }
    }

    if window.is_range() {
        out.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    }
    out
}

/// The most recent posts in the window, newest first.
///
/// # Errors
///
/// Returns [`SentimentError::InvalidTimestamp`] if a post's date is unparseable.
pub fn recent_insights(posts: &[&Post]) -> Result<Vec<Insight>, SentimentError> {
    let mut dated = posts
        .iter()
        .map(|p| p.timestamp().map(|ts| (ts, *p)))
        .collect::<Result<Vec<_>, _>>()?;
    dated.sort_by(|a, b| b.0.cmp(&a.0));
    Ok(dated
        .into_iter()
        .take(RECENT_INSIGHTS_LIMIT)
        .map(|(_, p)| Insight {
            title: p.title.clone(),
            category: p.category,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fixture_posts;
    use rinsight_core::Sentiment;

    fn post(id: &str, date: &str, keywords: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            title: format!("title {id}"),
            text: String::new(),
            date: date.to_string(),
            upvotes: 0,
            comments: None,
            sentiment: Sentiment::Score(0.0),
            category: Category::Academic,
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    #[test]
    fn week_window_keeps_first_seen_order() {
        let a = post("a", "2025-04-14 10:00:00", &["math"]);
        let b = post("b", "2025-04-15 10:00:00", &["finals", "math"]);
        let freqs = keyword_frequencies(&[&a, &b], &TimeWindow::Week(16));
        let keys: Vec<(&str, usize)> = freqs
            .iter()
            .map(|f| (f.keyword.as_str(), f.frequency))
            .collect();
        assert_eq!(keys, [("math", 2), ("finals", 1)]);
        assert_eq!(freqs[0].sample, "title a");
        assert_eq!(freqs[0].week, "16");
    }

    #[test]
    fn range_window_sorts_by_frequency() {
        let a = post("a", "2025-04-14 10:00:00", &["finals"]);
        let b = post("b", "2025-04-15 10:00:00", &["math"]);
        let c = post("c", "2025-04-16 10:00:00", &["math"]);
        let window = TimeWindow::parse_range("2025-04-14", "2025-04-16").expect("range");
        let freqs = keyword_frequencies(&[&a, &b, &c], &window);
        assert_eq!(freqs[0].keyword, "math");
        assert_eq!(freqs[0].frequency, 2);
        assert_eq!(freqs[0].week, "2025-04-14 to 2025-04-16");
        assert_eq!(freqs[1].keyword, "finals");
    }

    #[test]
    fn recent_insights_returns_two_newest() {
        let posts = fixture_posts();
        let mut refs: Vec<&Post> = posts.iter().collect();
        refs.reverse();
        let insights = recent_insights(&refs).expect("insights");
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "Crashing out for math finals");
        assert_eq!(insights[1].title, "Locking in but stressed");
    }

    #[test]
    fn recent_insights_of_nothing_is_empty() {
        assert!(recent_insights(&[]).expect("insights").is_empty());
    }
}
