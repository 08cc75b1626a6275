//! Conversion of Reddit listing items into raw posts.

use chrono::DateTime;
use rinsight_core::types::TIMESTAMP_FORMAT;
use rinsight_core::RawPost;

use super::reddit::PostData;

/// Convert one listing item. Items without an id, title or creation time
/// are dropped.
pub(super) fn to_raw_post(data: &PostData) -> Option<RawPost> {
    let id = data.id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
    let title = data.title.as_deref().map(str::trim)?;

    #[allow(clippy::cast_possible_truncation)]
    let created = DateTime::from_timestamp(data.created_utc? as i64, 0)?;

    let text = match data.selftext.as_deref() {
        Some(body) if body != "[deleted]" && body != "[removed]" => body.trim().to_string(),
        _ => String::new(),
    };

    Some(RawPost {
        id: id.to_string(),
        title: title.to_string(),
        text,
        date: created.naive_utc().format(TIMESTAMP_FORMAT).to_string(),
        upvotes: clamp_score(data.score.unwrap_or(0)),
        comments: data.num_comments,
    })
}

/// Reddit scores can be negative; upvotes are reported as zero then.
fn clamp_score(score: i64) -> u32 {
    u32::try_from(score.max(0)).unwrap_or(u32::MAX)
}
