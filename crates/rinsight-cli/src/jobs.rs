//! Offline job handlers for the CLI.
//!
//! `scrape` and `score` talk to the live source; `analyze` and
//! `predict-crash` only read and write CSV files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rinsight_core::{AcademicCalendar, AppConfig, TimeWindow, WindowError};
use rinsight_sentiment::persist::{
    read_analyzed_posts, read_raw_posts, write_analyzed_posts, write_crash_predictions,
    write_raw_posts,
};
use rinsight_sentiment::{
    analyze, build_classifier, build_source, predict_crash_periods, score, CrashPrediction,
    FileBackend, PostCache, PostPipeline, ScoringConfig, StressReport, SystemClock,
};

/// Resolve `--week` or `--start/--end` into a window. Neither means all posts.
///
/// # Errors
///
/// Returns [`WindowError`] for a malformed week or date range.
pub(crate) fn parse_window(
    week: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<TimeWindow, WindowError> {
    match (week, start, end) {
        (Some(week), _, _) => TimeWindow::parse_week(week),
        (None, Some(start), Some(end)) => TimeWindow::parse_range(start, end),
        _ => Ok(TimeWindow::All),
    }
}

/// Fetch up to `limit` posts and write them to `output`.
///
/// # Errors
///
/// Returns an error if the source fails, returns nothing, or the CSV cannot
/// be written.
pub(crate) async fn run_scrape(
    config: &AppConfig,
    limit: usize,
    output: &Path,
) -> anyhow::Result<usize> {
    let source = build_source(config)?;
    let posts = source.fetch_posts(limit).await?;
    if posts.is_empty() {
        anyhow::bail!("{} returned no posts", source.name());
    }
    write_raw_posts(output, &posts)?;
    tracing::info!(
        source = source.name(),
        posts = posts.len(),
        output = %output.display(),
        "scraped posts"
    );
    Ok(posts.len())
}

/// Tag every raw post in `input` and write the analyzed set to `output`.
///
/// # Errors
///
/// Returns an error if either CSV cannot be read or written.
pub(crate) fn run_analyze(input: &Path, output: &Path) -> anyhow::Result<usize> {
    let raw = read_raw_posts(input)?;
    let analyzed = analyze(&raw);
    write_analyzed_posts(output, &analyzed)?;
    tracing::info!(
        posts = analyzed.len(),
        input = %input.display(),
        output = %output.display(),
        "analyzed posts"
    );
    Ok(analyzed.len())
}

/// Group analyzed posts by week, flag crash periods and write them to `output`.
///
/// # Errors
///
/// Returns an error if a CSV cannot be read or written, or a post's date
/// does not parse.
pub(crate) fn run_predict_crash(input: &Path, output: &Path) -> anyhow::Result<Vec<CrashPrediction>> {
    let posts = read_analyzed_posts(input)?;
    let predictions = predict_crash_periods(&posts, &AcademicCalendar::default())?;
    write_crash_predictions(output, &predictions)?;
    tracing::info!(
        weeks = predictions.len(),
        crash_weeks = predictions.iter().filter(|p| p.crash_period).count(),
        output = %output.display(),
        "predicted crash periods"
    );
    Ok(predictions)
}

/// Load posts the way the server does and score `window`.
///
/// # Errors
///
/// Returns an error if the source or classifier cannot be built, the cache
/// is unreadable, or a post's date does not parse.
pub(crate) async fn run_score(config: &AppConfig, window: &TimeWindow) -> anyhow::Result<StressReport> {
    let cache = PostCache::new(
        Arc::new(FileBackend::new(config.cache_path())),
        Arc::new(SystemClock),
        Duration::from_secs(config.cache_ttl_secs),
    );
    let pipeline = PostPipeline::new(
        build_source(config)?,
        build_classifier(config)?,
        cache,
        config.fetch_limit,
    )
    .with_raw_csv(config.raw_posts_path());

    let batch = pipeline.load().await?;
    tracing::info!(origin = %batch.origin, posts = batch.posts.len(), "loaded posts");
    Ok(score(&batch.posts, window, &ScoringConfig::default())?)
}
