//! Stress scoring: classified posts in a time window to per-category aggregates.
//!
//! Each post gets a raw score from four weighted components (sentiment,
//! keyword density, temporal stress peak, engagement). The raw score is
//! inverted so that lower values mean more stress, then averaged per
//! category.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rinsight_core::{Category, Post, StressCalendar, TimeWindow};
use serde::Serialize;

use crate::classifier::Suggestion;
use crate::error::SentimentError;
use crate::recommend::{category_recommendation, MENTAL_HEALTH_SUGGESTION, UMBRELLA_RECOMMENDATION};

/// Weights and constants for the per-post score.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub sentiment_weight: f64,
    pub keyword_weight: f64,
    pub temporal_weight: f64,
    pub engagement_weight: f64,
    /// Keyword count at which the density component saturates at 1.
    pub keyword_saturation: f64,
    pub peak_value: f64,
    pub off_peak_value: f64,
    /// Upvotes plus comments per unit of engagement. Not capped.
    pub engagement_divisor: f64,
    /// Placeholder scores for earlier periods, oldest first.
    pub trend_history: Vec<u8>,
    pub calendar: StressCalendar,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sentiment_weight: 0.35,
            keyword_weight: 0.25,
            temporal_weight: 0.20,
            engagement_weight: 0.20,
            keyword_saturation: 5.0,
            peak_value: 1.2,
            off_peak_value: 0.5,
            engagement_divisor: 50.0,
            trend_history: vec![60, 55, 50],
            calendar: StressCalendar::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Critical,
    Moderate,
    Low,
}

impl Status {
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score < 50 {
            Status::Critical
        } else if score < 70 {
            Status::Moderate
        } else {
            Status::Low
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Status::Critical => "#EF4444",
            Status::Moderate => "#FBBF24",
            Status::Low => "#10B981",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    pub score: u8,
    pub status: Status,
    pub color: &'static str,
    pub trend: String,
    pub trend_labels: Vec<String>,
    pub trend_data: Vec<u8>,
    pub recommendation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallAggregate {
    pub score: u8,
    pub status: Status,
    pub color: &'static str,
}

/// Result of scoring one window.
///
/// Serializes as a flat object: one key per present category plus
/// `summary`, `recommendation` and `overall`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressReport {
    #[serde(flatten)]
    pub categories: BTreeMap<Category, CategoryAggregate>,
    pub summary: String,
    pub recommendation: String,
    pub overall: Option<OverallAggregate>,
}

impl StressReport {
    /// Replace a category's recommendation unless the mental-health override
    /// already applies to it.
    pub fn apply_suggestion(&mut self, category: Category, suggestion: Suggestion) {
        if let Some(aggregate) = self.categories.get_mut(&category) {
            if aggregate.recommendation != MENTAL_HEALTH_SUGGESTION {
                aggregate.recommendation = suggestion.text;
                aggregate.explanation = Some(suggestion.explanation);
            }
        }
    }
}

/// Posts whose timestamp lies in `window`, in input order.
///
/// # Errors
///
/// Returns [`SentimentError::InvalidTimestamp`] for the first post whose
/// date cannot be parsed.
pub fn posts_in_window<'a>(
    posts: &'a [Post],
    window: &TimeWindow,
) -> Result<Vec<&'a Post>, SentimentError> {
    Ok(timestamped(posts, window)?
        .into_iter()
        .map(|(post, _)| post)
        .collect())
}

fn timestamped<'a>(
    posts: &'a [Post],
    window: &TimeWindow,
) -> Result<Vec<(&'a Post, NaiveDateTime)>, SentimentError> {
    let mut selected = Vec::new();
    for post in posts {
        let ts = post.timestamp()?;
        if window.contains(ts) {
            selected.push((post, ts));
        }
    }
    Ok(selected)
}

/// Raw weighted score of one post, scaled by 100 and not yet inverted.
#[must_use]
pub fn raw_post_score(post: &Post, ts: NaiveDateTime, config: &ScoringConfig) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let density = (post.keywords.len() as f64 / config.keyword_saturation).min(1.0);
    let temporal = if config.calendar.is_stress_peak(ts) {
        config.peak_value
    } else {
        config.off_peak_value
    };
    // Widen before adding: upvotes may already be saturated at u32::MAX.
    let engagement = (f64::from(post.upvotes) + f64::from(post.comments.unwrap_or(0)))
        / config.engagement_divisor;

    (config.sentiment_weight * post.sentiment.value()
        + config.keyword_weight * density
        + config.temporal_weight * temporal
        + config.engagement_weight * engagement)
        * 100.0
}

/// Stress score of one post in `[0, 100]`; lower is more stressed.
#[must_use]
pub fn post_score(post: &Post, ts: NaiveDateTime, config: &ScoringConfig) -> f64 {
    (100.0 - raw_post_score(post, ts, config)).clamp(0.0, 100.0)
}

/// Score every category with at least one post in `window`.
///
/// An empty window yields an empty report with no overall aggregate.
///
/// # Errors
///
/// Returns [`SentimentError::InvalidTimestamp`] if any post's date is
/// unparseable.
pub fn score(
    posts: &[Post],
    window: &TimeWindow,
    config: &ScoringConfig,
) -> Result<StressReport, SentimentError> {
    let selected = timestamped(posts, window)?;
    let heading = window.summary_heading();

    let mut by_category: BTreeMap<Category, (Vec<f64>, Vec<&Post>)> = BTreeMap::new();
    for &(post, ts) in &selected {
        let entry = by_category.entry(post.category).or_default();
        entry.0.push(post_score(post, ts, config));
        entry.1.push(post);
    }

    let mut categories = BTreeMap::new();
    let mut means = Vec::with_capacity(by_category.len());
    for (category, (scores, members)) in &by_category {
        let avg = mean(scores);
        means.push(avg);
        let rounded = round_score(avg);
        let status = Status::from_score(rounded);
        let mut trend_data = config.trend_history.clone();
        trend_data.push(rounded);
        categories.insert(
            *category,
            CategoryAggregate {
                score: rounded,
                status,
                color: status.color(),
                trend: trend_label(config.trend_history.last().copied(), rounded),
                trend_labels: (1..=trend_data.len()).map(|i| format!("Week {i}")).collect(),
                trend_data,
                recommendation: category_recommendation(*category, members).to_string(),
                explanation: None,
            },
        );
    }

    if categories.is_empty() {
        return Ok(StressReport {
            categories,
            summary: format!("{heading} stress: No data"),
            recommendation: UMBRELLA_RECOMMENDATION.to_string(),
            overall: None,
        });
    }

    let overall_score = round_score(mean(&means));
    let overall_status = Status::from_score(overall_score);
    let level = if categories
        .values()
        .any(|agg| agg.status == Status::Critical)
    {
        "High"
    } else {
        "Moderate"
    };

    tracing::debug!(
        window = %window.label(),
        posts = selected.len(),
        categories = categories.len(),
        overall = overall_score,
        "scored window"
    );

    Ok(StressReport {
        categories,
        summary: format!("{heading} stress: {level}"),
        recommendation: UMBRELLA_RECOMMENDATION.to_string(),
        overall: Some(OverallAggregate {
            score: overall_score,
            status: overall_status,
            color: overall_status.color(),
        }),
    })
}

/// `+N%` when the score fell from `previous`, where N is the relative drop.
fn trend_label(previous: Option<u8>, current: u8) -> String {
    match previous {
        Some(prev) if current < prev => {
            let drop = f64::from(prev - current) / f64::from(prev) * 100.0;
            format!("+{}%", drop.round())
        }
        _ => "Stable".to_string(),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
