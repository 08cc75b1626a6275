//! Offline crash-period analysis over historical posts.
//!
//! A crash period is an ISO week whose mean sentiment is low and in which
//! several posts raise mental-health issues. Weeks are matched against the
//! academic calendar to pick an intervention.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use rinsight_core::types::parse_timestamp;
use rinsight_core::{AcademicCalendar, RawPost, TimestampError};

use crate::lexicon::{detect_issues, lexicon_score, Issue};

/// Mean sentiment below which a week can be a crash period.
pub const CRASH_SENTIMENT_THRESHOLD: f64 = -0.2;

/// Mental-health posts needed in a week for it to be a crash period.
pub const CRASH_MENTAL_HEALTH_MIN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedPost {
    pub id: String,
    pub title: String,
    pub text: String,
    pub date: String,
    pub upvotes: u32,
    pub content: String,
    pub issues: BTreeSet<Issue>,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrashPrediction {
    pub year: i32,
    pub week: u32,
    pub sentiment: f64,
    pub mental_health_count: usize,
    pub post_count: usize,
    pub crash_period: bool,
    pub event: String,
    pub recommendation: String,
}

/// Tag each raw post with issues and a lexicon sentiment.
#[must_use]
pub fn analyze(posts: &[RawPost]) -> Vec<AnalyzedPost> {
    posts
        .iter()
        .map(|raw| {
            let content = raw.content();
            AnalyzedPost {
                id: raw.id.clone(),
                title: raw.title.clone(),
                text: raw.text.clone(),
                date: raw.date.clone(),
                upvotes: raw.upvotes,
                issues: detect_issues(&content),
                sentiment: lexicon_score(&content),
                content,
            }
        })
        .collect()
}

/// Group analyzed posts by ISO year and week and flag crash periods.
///
/// Output is ordered by year, then week.
///
/// # Errors
///
/// Returns [`TimestampError`] for the first post whose date is unparseable.
pub fn predict_crash_periods(
    posts: &[AnalyzedPost],
    calendar: &AcademicCalendar,
) -> Result<Vec<CrashPrediction>, TimestampError> {
    #[derive(Default)]
    struct Bucket {
        sentiment_sum: f64,
        mental_health: usize,
        posts: usize,
    }

    let mut buckets: BTreeMap<(i32, u32), Bucket> = BTreeMap::new();
    for post in posts {
        let ts = parse_timestamp(&post.date).map_err(|_| TimestampError {
            id: post.id.clone(),
            value: post.date.clone(),
        })?;
        let iso = ts.iso_week();
        let bucket = buckets.entry((iso.year(), iso.week())).or_default();
        bucket.sentiment_sum += post.sentiment;
        bucket.posts += 1;
        if post.issues.contains(&Issue::MentalHealth) {
            bucket.mental_health += 1;
        }
    }

    Ok(buckets
        .into_iter()
        .map(|((year, week), bucket)| {
            #[allow(clippy::cast_precision_loss)]
            let sentiment = bucket.sentiment_sum / bucket.posts as f64;
            let crash_period = sentiment < CRASH_SENTIMENT_THRESHOLD
                && bucket.mental_health >= CRASH_MENTAL_HEALTH_MIN;
            let event = calendar.event(year, week).unwrap_or_default().to_string();
            let recommendation = crash_recommendation(crash_period, &event).to_string();
            CrashPrediction {
                year,
                week,
                sentiment,
                mental_health_count: bucket.mental_health,
                post_count: bucket.posts,
                crash_period,
                event,
                recommendation,
            }
        })
        .collect())
}

fn crash_recommendation(crash_period: bool, event: &str) -> &'static str {
    if !crash_period {
        ""
    } else if event.contains("Finals") {
        "Host mental health workshop during finals week"
    } else if event.contains("Co-op") {
        "Offer co-op stress management sessions"
    } else {
        "Conduct mental health awareness campaign"
    }
}
