//! Time windows used to select posts for scoring.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Sentinel accepted in place of a week number to disable filtering.
pub const ALL_WEEKS: &str = "all";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid week {0:?}: expected an ISO week number (1-53) or \"all\"")]
    InvalidWeek(String),

    #[error("invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Selection of posts by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// No filtering.
    All,
    /// Posts whose ISO week number matches, in any year.
    Week(u32),
    /// Posts created on or between the two calendar dates.
    Range { start: NaiveDate, end: NaiveDate },
}

impl TimeWindow {
    /// Parse a week path segment: an ISO week number or `"all"`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidWeek`] for anything else.
    pub fn parse_week(raw: &str) -> Result<Self, WindowError> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(ALL_WEEKS) {
            return Ok(TimeWindow::All);
        }
        match raw.parse::<u32>() {
            Ok(week) if (1..=53).contains(&week) => Ok(TimeWindow::Week(week)),
            _ => Err(WindowError::InvalidWeek(raw.to_string())),
        }
    }

    /// Parse an inclusive `YYYY-MM-DD` date range.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidDate`] if either bound does not parse and
    /// [`WindowError::InvertedRange`] if `start` is after `end`.
    pub fn parse_range(start: &str, end: &str) -> Result<Self, WindowError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(WindowError::InvertedRange { start, end });
        }
        Ok(TimeWindow::Range { start, end })
    }

    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        match *self {
            TimeWindow::All => true,
            TimeWindow::Week(week) => ts.iso_week().week() == week,
            TimeWindow::Range { start, end } => {
                let day = ts.date();
                start <= day && day <= end
            }
        }
    }

    /// Label echoed back in API payloads (`"all"`, `"16"`, `"2025-04-01 to 2025-04-20"`).
    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            TimeWindow::All => ALL_WEEKS.to_string(),
            TimeWindow::Week(week) => week.to_string(),
            TimeWindow::Range { start, end } => format!("{start} to {end}"),
        }
    }

    /// Heading used in the one-line stress summary.
    #[must_use]
    pub fn summary_heading(&self) -> String {
        match *self {
            TimeWindow::All => "All weeks".to_string(),
            TimeWindow::Week(week) => format!("Week {week}"),
            TimeWindow::Range { start, end } => format!("{start} to {end}"),
        }
    }

    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(self, TimeWindow::Range { .. })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, WindowError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| WindowError::InvalidDate(raw.to_string()))
}
