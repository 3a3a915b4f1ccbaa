//! Sprint label parsing, sprint dates and future-sprint generation.

use super::fields::display_team_name;
use crate::domain::SprintKey;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// `"{TeamLabel} {Year}-{SprintNumber}"`, team label optional.
static SPRINT_LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(?P<team>.*?)\s+)?(?P<year>\d{4})-(?P<number>\d{1,3})\s*$")
        .expect("valid regex")
});

/// A parsed sprint label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintLabel {
    pub team: Option<String>,
    pub key: SprintKey,
}

/// Parse a sprint label such as `Triton 2025-25` or a bare `2025-3`.
///
/// Returns `None` when the label does not follow the pattern or names
/// sprint 0.
pub fn parse_sprint_label(label: &str) -> Option<SprintLabel> {
    let caps = SPRINT_LABEL_PATTERN.captures(label)?;
    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let number: u32 = caps.name("number")?.as_str().parse().ok()?;
    let key = SprintKey::sprint(year, number)?;
    let team = caps
        .name("team")
        .map(|m| m.as_str().trim().to_string())
        .filter(|team| !team.is_empty());
    Some(SprintLabel { team, key })
}

/// Header text for a team's column, e.g. `GH 2025-3` or `Backlog`.
pub fn header_label(team: &str, key: SprintKey) -> String {
    match key {
        SprintKey::Backlog => key.to_string(),
        SprintKey::Sprint { .. } => format!("{} {}", display_team_name(team), key),
    }
}

/// Closed date range, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start.format("%Y-%m-%d"), self.end.format("%Y-%m-%d"))
    }
}

pub fn first_wednesday(year: i32) -> Option<NaiveDate> {
    let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = (7 + Weekday::Wed.num_days_from_monday()
        - jan_first.weekday().num_days_from_monday())
        % 7;
    jan_first.checked_add_signed(Duration::days(i64::from(offset)))
}

/// Date range used when no ticket in a sprint carries its own dates: the
/// first Wednesday of the year plus `(number - 1)` sprint lengths.
pub fn fallback_date_range(key: SprintKey, sprint_length_days: u32) -> Option<DateRange> {
    let SprintKey::Sprint { year, number } = key else {
        return None;
    };
    let length = i64::from(sprint_length_days.max(1));
    let start = first_wednesday(year)?
        .checked_add_signed(Duration::days(i64::from(number - 1) * length))?;
    let end = start.checked_add_signed(Duration::days(length - 1))?;
    Some(DateRange { start, end })
}

/// Date range of a sprint column: the span of the tickets' own dates when
/// any are present, else the computed fallback.
pub fn column_date_range(
    key: SprintKey,
    starts: impl IntoIterator<Item = NaiveDate>,
    ends: impl IntoIterator<Item = NaiveDate>,
    sprint_length_days: u32,
) -> Option<DateRange> {
    if key.is_backlog() {
        return None;
    }
    let start = starts.into_iter().min();
    let end = ends.into_iter().max();
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Some(DateRange { start, end }),
        _ => fallback_date_range(key, sprint_length_days),
    }
}

/// The `count` sprint keys after `current`.
pub fn future_sprints(current: SprintKey, count: usize) -> Vec<SprintKey> {
    current.following(count)
}
