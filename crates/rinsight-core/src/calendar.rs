//! Static academic calendar data.
//!
//! Two tables: named events keyed by `(ISO year, ISO week)` for the crash-period
//! report, and stress-peak periods used by the temporal scoring component.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Named events on the 2024-25 calendar, keyed by `(ISO year, ISO week)`.
const EVENTS: &[((i32, u32), &str)] = &[
    ((2024, 41), "Co-op Deadlines (Fall)"),
    ((2024, 49), "Finals (Fall)"),
    ((2025, 10), "Co-op Deadlines (Winter)"),
    ((2025, 24), "Finals (Spring)"),
];

/// Midterm and finals windows of the 2024-25 quarters, `(start, end)` inclusive.
const PEAK_RANGES: &[((i32, u32, u32), (i32, u32, u32))] = &[
    ((2024, 10, 21), (2024, 11, 1)),
    ((2024, 12, 7), (2024, 12, 14)),
    ((2025, 2, 3), (2025, 2, 14)),
    ((2025, 3, 15), (2025, 3, 22)),
    ((2025, 4, 28), (2025, 5, 9)),
    ((2025, 6, 7), (2025, 6, 14)),
];

/// ISO weeks treated as stress peaks in every year.
const PEAK_WEEKS: [u32; 2] = [4, 8];

#[derive(Debug, Clone)]
pub struct AcademicCalendar {
    events: Vec<((i32, u32), String)>,
}

impl Default for AcademicCalendar {
    fn default() -> Self {
        Self {
            events: EVENTS
                .iter()
                .map(|&(key, name)| (key, name.to_string()))
                .collect(),
        }
    }
}

impl AcademicCalendar {
    #[must_use]
    pub fn new(events: Vec<((i32, u32), String)>) -> Self {
        Self { events }
    }

    /// Event name for the given ISO year and week, if any.
    #[must_use]
    pub fn event(&self, year: i32, week: u32) -> Option<&str> {
        self.events
            .iter()
            .find(|((y, w), _)| *y == year && *w == week)
            .map(|(_, name)| name.as_str())
    }
}

/// Periods in which posts receive the high temporal score.
#[derive(Debug, Clone)]
pub struct StressCalendar {
    ranges: Vec<(NaiveDate, NaiveDate)>,
    weeks: BTreeSet<u32>,
}

impl Default for StressCalendar {
    fn default() -> Self {
        let ranges = PEAK_RANGES
            .iter()
            .filter_map(|&((sy, sm, sd), (ey, em, ed))| {
                Some((
                    NaiveDate::from_ymd_opt(sy, sm, sd)?,
                    NaiveDate::from_ymd_opt(ey, em, ed)?,
                ))
            })
            .collect();
        Self {
            ranges,
            weeks: PEAK_WEEKS.into_iter().collect(),
        }
    }
}

impl StressCalendar {
    #[must_use]
    pub fn new(ranges: Vec<(NaiveDate, NaiveDate)>, weeks: BTreeSet<u32>) -> Self {
        Self { ranges, weeks }
    }

    /// A calendar with no peaks at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), BTreeSet::new())
    }

    #[must_use]
    pub fn is_stress_peak(&self, ts: NaiveDateTime) -> bool {
        if self.weeks.contains(&ts.iso_week().week()) {
            return true;
        }
        let day = ts.date();
        self.ranges
            .iter()
            .any(|&(start, end)| start <= day && day <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::parse_timestamp;

    #[test]
    fn calendar_lookup_hits_known_events() {
        let calendar = AcademicCalendar::default();
        assert_eq!(calendar.event(2024, 49), Some("Finals (Fall)"));
        assert_eq!(calendar.event(2025, 10), Some("Co-op Deadlines (Winter)"));
        assert_eq!(calendar.event(2025, 11), None);
    }

    #[test]
    fn peak_weeks_match_in_any_year() {
        let calendar = StressCalendar::default();
        // 2025-01-20 falls in ISO week 4.
        assert!(calendar.is_stress_peak(parse_timestamp("2025-01-20 09:00:00").unwrap()));
        assert!(calendar.is_stress_peak(parse_timestamp("2026-01-21 09:00:00").unwrap()));
    }

    #[test]
    fn peak_ranges_are_inclusive() {
        let calendar = StressCalendar::default();
        assert!(calendar.is_stress_peak(parse_timestamp("2024-12-07 00:00:00").unwrap()));
        assert!(calendar.is_stress_peak(parse_timestamp("2024-12-14 23:00:00").unwrap()));
        assert!(!calendar.is_stress_peak(parse_timestamp("2024-12-15 08:00:00").unwrap()));
    }

    #[test]
    fn ordinary_week_is_not_a_peak() {
        let calendar = StressCalendar::default();
        assert!(!calendar.is_stress_peak(parse_timestamp("2025-04-16 14:00:00").unwrap()));
    }

    #[test]
    fn empty_calendar_has_no_peaks() {
        let calendar = StressCalendar::empty();
        assert!(!calendar.is_stress_peak(parse_timestamp("2025-01-20 09:00:00").unwrap()));
    }
}
