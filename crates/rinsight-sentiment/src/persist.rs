//! CSV persistence for raw posts, analyzed posts and crash predictions.

use std::collections::BTreeSet;
use std::path::Path;

use rinsight_core::RawPost;
use serde::{Deserialize, Serialize};

use crate::crash::{AnalyzedPost, CrashPrediction};
use crate::error::SentimentError;
use crate::lexicon::Issue;

/// Raw post row. `id` and `comments` are optional so that exports from
/// older scrapers (title, text, date, upvotes only) still load.
#[derive(Debug, Serialize, Deserialize)]
struct RawPostRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    date: String,
    upvotes: i64,
    #[serde(default)]
    comments: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnalyzedRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    date: String,
    upvotes: u32,
    #[serde(default)]
    content: String,
    #[serde(default)]
    issues: String,
    sentiment: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct CrashRecord {
    year: i32,
    week: u32,
    sentiment: f64,
    mental_health_count: usize,
    post_count: usize,
    crash_period: String,
    event: String,
    recommendation: String,
}

fn ensure_parent(path: &Path) -> Result<(), SentimentError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Read raw posts. Rows without an id get `row-{n}` (1-based).
///
/// # Errors
///
/// Returns [`SentimentError::Csv`] if the file is missing or malformed.
pub fn read_raw_posts(path: &Path) -> Result<Vec<RawPost>, SentimentError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut posts = Vec::new();
    for (i, row) in reader.deserialize::<RawPostRecord>().enumerate() {
        let row = row?;
        posts.push(RawPost {
            id: row
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| format!("row-{}", i + 1)),
            title: row.title,
            text: row.text,
            date: row.date,
            upvotes: u32::try_from(row.upvotes.max(0)).unwrap_or(u32::MAX),
            comments: row.comments,
        });
    }
    Ok(posts)
}

/// Write raw posts with columns `id,title,text,date,upvotes,comments`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_raw_posts(path: &Path, posts: &[RawPost]) -> Result<(), SentimentError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for post in posts {
        writer.serialize(RawPostRecord {
            id: Some(post.id.clone()),
            title: post.title.clone(),
            text: post.text.clone(),
            date: post.date.clone(),
            upvotes: i64::from(post.upvotes),
            comments: post.comments,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Read analyzed posts; unknown issue tags are skipped with a warning.
///
/// # Errors
///
/// Returns [`SentimentError::Csv`] if the file is missing or malformed.
pub fn read_analyzed_posts(path: &Path) -> Result<Vec<AnalyzedPost>, SentimentError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut posts = Vec::new();
    for row in reader.deserialize::<AnalyzedRecord>() {
        let row = row?;
        let issues = parse_issues(&row.id, &row.issues);
        posts.push(AnalyzedPost {
            id: row.id,
            title: row.title,
            text: row.text,
            date: row.date,
            upvotes: row.upvotes,
            content: row.content,
            issues,
            sentiment: row.sentiment,
        });
    }
    Ok(posts)
}

/// Write analyzed posts with columns
/// `id,title,text,date,upvotes,content,issues,sentiment`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_analyzed_posts(path: &Path, posts: &[AnalyzedPost]) -> Result<(), SentimentError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for post in posts {
        writer.serialize(AnalyzedRecord {
            id: post.id.clone(),
            title: post.title.clone(),
            text: post.text.clone(),
            date: post.date.clone(),
            upvotes: post.upvotes,
            content: post.content.clone(),
            issues: post
                .issues
                .iter()
                .map(|i| i.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            sentiment: post.sentiment,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write crash predictions with columns
/// `year,week,sentiment,mental_health_count,post_count,crash_period,event,recommendation`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_crash_predictions(
    path: &Path,
    predictions: &[CrashPrediction],
) -> Result<(), SentimentError> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for p in predictions {
        writer.serialize(CrashRecord {
            year: p.year,
            week: p.week,
            sentiment: p.sentiment,
            mental_health_count: p.mental_health_count,
            post_count: p.post_count,
            crash_period: if p.crash_period { "True" } else { "False" }.to_string(),
            event: p.event.clone(),
            recommendation: p.recommendation.clone(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Read crash predictions written by [`write_crash_predictions`].
///
/// # Errors
///
/// Returns [`SentimentError::Csv`] if the file is missing or malformed.
pub fn read_crash_predictions(path: &Path) -> Result<Vec<CrashPrediction>, SentimentError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for row in reader.deserialize::<CrashRecord>() {
        let row = row?;
        out.push(CrashPrediction {
            year: row.year,
            week: row.week,
            sentiment: row.sentiment,
            mental_health_count: row.mental_health_count,
            post_count: row.post_count,
            crash_period: row.crash_period.eq_ignore_ascii_case("true"),
            event: row.event,
            recommendation: row.recommendation,
        });
    }
    Ok(out)
}

fn parse_issues(id: &str, raw: &str) -> BTreeSet<Issue> {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match tag.parse::<Issue>() {
            Ok(issue) => Some(issue),
            Err(e) => {
                tracing::warn!(post = id, error = %e, "skipping issue tag");
                None
            }
        })
        .collect()
}
