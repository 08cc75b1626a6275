//! Built-in sample posts served when no live or cached data is available.

use async_trait::async_trait;
use rinsight_core::{Category, Post, RawPost, Sentiment};

use super::PostSource;
use crate::error::SentimentError;

struct Fixture {
    id: &'static str,
    title: &'static str,
    text: &'static str,
    date: &'static str,
    upvotes: u32,
    comments: u32,
    sentiment: f64,
    category: Category,
    keywords: &'static [&'static str],
}

const FIXTURES: &[Fixture] = &[
    Fixture {
        id: "p1",
        title: "Crashing out for math finals",
        text: "No prep, I'm cooked for MATH 101",
        date: "2025-04-20 10:00:00",
        upvotes: 15,
        comments: 8,
        sentiment: -0.8,
        category: Category::Academic,
        keywords: &["crashing out", "no prep", "math"],
    },
    Fixture {
        id: "p2",
        title: "Locking in but stressed",
        text: "Midterms got me acting unwise",
        date: "2025-04-19 15:30:00",
        upvotes: 10,
        comments: 5,
        sentiment: -0.7,
        category: Category::Academic,
        keywords: &["locking in", "midterms"],
    },
    Fixture {
        id: "p3",
        title: "Broke af, tuition due",
        text: "Can't afford textbooks",
        date: "2025-04-18 09:00:00",
        upvotes: 12,
        comments: 3,
        sentiment: -0.9,
        category: Category::Financial,
        keywords: &["broke af", "tuition"],
    },
    Fixture {
        id: "p4",
        title: "Brain fog is killing me",
        text: "Can't focus, need help",
        date: "2025-04-17 12:00:00",
        upvotes: 8,
        comments: 4,
        sentiment: -0.85,
        category: Category::Health,
        keywords: &["brain fog", "focus"],
    },
    Fixture {
        id: "p5",
        title: "Roommate vibes off",
        text: "Dorm life is rough",
        date: "2025-04-16 14:00:00",
        upvotes: 9,
        comments: 2,
        sentiment: -0.75,
        category: Category::Housing,
        keywords: &["vibes off", "roommate"],
    },
    Fixture {
        id: "p6",
        title: "Bet, joined a club",
        text: "DragonLink is chill",
        date: "2025-04-15 11:00:00",
        upvotes: 14,
        comments: 6,
        sentiment: 0.2,
        category: Category::Social,
        keywords: &["bet", "dragonlink"],
    },
    Fixture {
        id: "p7",
        title: "Housing at API is trash",
        text: "Elevators broken again",
        date: "2025-04-14 10:00:00",
        upvotes: 20,
        comments: 10,
        sentiment: -0.9,
        category: Category::Housing,
        keywords: &["housing", "api"],
    },
    Fixture {
        id: "p8",
        title: "Co-op interviews stressing me out",
        text: "No idea how to prep",
        date: "2025-04-13 16:00:00",
        upvotes: 18,
        comments: 7,
        sentiment: -0.8,
        category: Category::Academic,
        keywords: &["co-op", "stress"],
    },
];

/// The fixture set as classified posts, newest first.
#[must_use]
pub fn fixture_posts() -> Vec<Post> {
    FIXTURES
        .iter()
        .map(|f| Post {
            id: f.id.to_string(),
            title: f.title.to_string(),
            text: f.text.to_string(),
            date: f.date.to_string(),
            upvotes: f.upvotes,
            comments: Some(f.comments),
            sentiment: Sentiment::Score(f.sentiment),
            category: f.category,
            keywords: f.keywords.iter().map(|k| (*k).to_string()).collect(),
        })
        .collect()
}

/// Offline source yielding the fixture posts without their labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSource;

#[async_trait]
impl PostSource for FixtureSource {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<RawPost>, SentimentError> {
        Ok(FIXTURES
            .iter()
            .take(limit)
            .map(|f| RawPost {
                id: f.id.to_string(),
                title: f.title.to_string(),
                text: f.text.to_string(),
                date: f.date.to_string(),
                upvotes: f.upvotes,
                comments: Some(f.comments),
            })
            .collect())
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_have_unique_ids_and_valid_dates() {
        let posts = fixture_posts();
        assert_eq!(posts.len(), 8);
        let ids: std::collections::BTreeSet<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids.len(), posts.len());
        for post in &posts {
            assert!(post.timestamp().is_ok(), "bad fixture date for {}", post.id);
            assert!(post.keywords.iter().all(|k| *k == k.to_lowercase()));
        }
    }

    #[tokio::test]
    async fn fixture_source_respects_limit() {
        let raw = FixtureSource.fetch_posts(3).await.expect("fixtures");
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0].id, "p1");
    }
}
