//! Field extraction from raw tracker rows.
//!
//! Every logical field has an ordered list of source columns. The first
//! non-empty one wins except for sprint values, which follow the configured
//! [`SprintResolution`].

use crate::domain::{RawRecord, SprintResolution, NO_EPIC, UNKNOWN_TEAM};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

pub const ISSUE_KEY_COLUMNS: &[&str] = &["Issue key", "Key"];
pub const TITLE_COLUMNS: &[&str] = &["Summary", "Title"];
pub const ISSUE_TYPE_COLUMNS: &[&str] = &["Issue Type", "Type"];
pub const STATUS_COLUMNS: &[&str] = &["Status"];
pub const STUDIO_COLUMNS: &[&str] = &["Custom field (Studio)", "Studio"];
pub const TEAM_COLUMNS: &[&str] = &["Custom field (Team)", "Team"];
pub const EPIC_LINK_COLUMNS: &[&str] = &["Custom field (Epic Link)", "Epic Link", "Parent"];
pub const STORY_POINT_COLUMNS: &[&str] =
    &["Custom field (Story Points)", "Story Points", "Custom field (Story point estimate)"];
pub const PRIORITY_RANK_COLUMNS: &[&str] =
    &["Custom field (Priority Rank)", "Priority Rank", "Priority"];
pub const ASSIGNEE_COLUMNS: &[&str] = &["Assignee"];
pub const START_DATE_COLUMNS: &[&str] = &["Custom field (Start date)", "Start date"];
pub const END_DATE_COLUMNS: &[&str] = &["Custom field (End date)", "End date", "Due date"];

/// Team names shortened when shown inside composite labels.
const TEAM_ABBREVIATIONS: &[(&str, &str)] = &[("Gadget Hackwrench", "GH")];

static CHECKLIST_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^checklist\s*\(.*\)$").expect("valid regex"));

static INTEGER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+$").expect("valid regex"));

/// Where a resolved team name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSource {
    Studio,
    TeamField,
    SprintLabel,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResolution {
    pub name: String,
    pub source: TeamSource,
    /// The team column held a numeric id that was passed over
    pub numeric_ignored: bool,
}

/// Pure integers are opaque ids, never team names.
pub fn is_numeric_id(value: &str) -> bool {
    INTEGER_PATTERN.is_match(value.trim())
}

/// Free-form custom columns are never consulted for sprint values.
pub fn is_custom_field(column: &str) -> bool {
    column.trim().to_ascii_lowercase().starts_with("custom field")
}

pub fn is_usable_sprint_value(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "[]" && !CHECKLIST_PATTERN.is_match(value)
}

/// Pick the raw sprint value of a record.
///
/// Columns named exactly `Sprint` take precedence over other non-custom
/// columns containing "sprint". Within a tier, `First` keeps the first usable
/// value and `Latest` the last one. `None` means the ticket is backlog.
pub fn extract_sprint_value(record: &RawRecord, mode: SprintResolution) -> Option<&str> {
    let exact = record
        .iter()
        .filter(|(column, _)| column.trim().eq_ignore_ascii_case("sprint"))
        .map(|(_, value)| value.trim())
        .filter(|value| is_usable_sprint_value(value));
    if let Some(value) = pick(exact, mode) {
        return Some(value);
    }

    let loose = record
        .iter()
        .filter(|(column, _)| {
            let lower = column.trim().to_ascii_lowercase();
            lower != "sprint" && lower.contains("sprint") && !is_custom_field(column)
        })
        .map(|(_, value)| value.trim())
        .filter(|value| is_usable_sprint_value(value));
    pick(loose, mode)
}

fn pick<'a>(mut values: impl Iterator<Item = &'a str>, mode: SprintResolution) -> Option<&'a str> {
    match mode {
        SprintResolution::First => values.next(),
        SprintResolution::Latest => values.last(),
    }
}

/// Resolve the team of a record.
///
/// `sprint_label_team` is the team token parsed from the record's sprint
/// label, if any.
pub fn resolve_team(record: &RawRecord, sprint_label_team: Option<&str>) -> TeamResolution {
    if let Some(studio) = record.first_of(STUDIO_COLUMNS) {
        return TeamResolution {
            name: studio.to_string(),
            source: TeamSource::Studio,
            numeric_ignored: false,
        };
    }

    let mut numeric_ignored = false;
    if let Some(team) = record.first_of(TEAM_COLUMNS) {
        if !is_numeric_id(team) {
            return TeamResolution {
                name: team.to_string(),
                source: TeamSource::TeamField,
                numeric_ignored,
            };
        }
        numeric_ignored = true;
    }

    if let Some(label_team) = sprint_label_team.map(str::trim).filter(|t| !t.is_empty()) {
        if !is_numeric_id(label_team) {
            return TeamResolution {
                name: label_team.to_string(),
                source: TeamSource::SprintLabel,
                numeric_ignored,
            };
        }
    }

    TeamResolution { name: UNKNOWN_TEAM.to_string(), source: TeamSource::Unknown, numeric_ignored }
}

pub fn extract_epic_link(record: &RawRecord) -> String {
    record.first_of(EPIC_LINK_COLUMNS).unwrap_or(NO_EPIC).to_string()
}

/// Parse story points permissively; placeholders such as `?` or `#` are none.
pub fn parse_story_points(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    value.parse::<f64>().ok().filter(|points| points.is_finite())
}

/// Short form of a team name for headers and other composite labels.
pub fn display_team_name(name: &str) -> Cow<'_, str> {
    TEAM_ABBREVIATIONS
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, short)| Cow::Borrowed(*short))
        .unwrap_or(Cow::Borrowed(name))
}

/// Parse the date formats tracker exports emit. Time suffixes are ignored.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let value = value?.trim();
    let date_part = value.split_whitespace().next()?;
    let date_part = date_part.split('T').next()?;
    ["%Y-%m-%d", "%d/%b/%y", "%d/%b/%Y", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        RawRecord::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn numeric_team_field_is_never_a_name() {
        let r = record(&[("Issue key", "A-1"), ("Summary", "x"), ("Team", "1039")]);
        let team = resolve_team(&r, None);
        assert_eq!(team.name, UNKNOWN_TEAM);
        assert!(team.numeric_ignored);
    }

    #[test]
    fn studio_wins_over_team_and_sprint() {
        let r = record(&[("Studio", "Triton"), ("Team", "Ops")]);
        let team = resolve_team(&r, Some("Kraken"));
        assert_eq!(team.name, "Triton");
        assert_eq!(team.source, TeamSource::Studio);
    }

    #[test]
    fn sprint_label_team_used_when_fields_missing() {
        let r = record(&[("Team", "42")]);
        assert_eq!(resolve_team(&r, Some("Kraken")).name, "Kraken");
        assert_eq!(resolve_team(&r, Some("77")).name, UNKNOWN_TEAM);
    }

    #[test]
    fn junk_sprint_values_resolve_to_backlog() {
        let r = record(&[("Sprint", ""), ("Sprint", "[]"), ("Sprint", "Checklist(x)")]);
        assert_eq!(extract_sprint_value(&r, SprintResolution::First), None);
        assert_eq!(extract_sprint_value(&r, SprintResolution::Latest), None);
    }

    #[test]
    fn resolution_mode_picks_first_or_last() {
        let r = record(&[("Sprint", "T 2025-1"), ("Sprint", ""), ("Sprint", "T 2025-2")]);
        assert_eq!(extract_sprint_value(&r, SprintResolution::First), Some("T 2025-1"));
        assert_eq!(extract_sprint_value(&r, SprintResolution::Latest), Some("T 2025-2"));
    }

    #[test]
    fn exact_sprint_column_beats_loose_match() {
        let r = record(&[("Closed Sprints", "T 2024-9"), ("SPRINT", "T 2025-3")]);
        assert_eq!(extract_sprint_value(&r, SprintResolution::First), Some("T 2025-3"));
    }

    #[test]
    fn custom_sprint_columns_are_ignored() {
        let r = record(&[("Custom field (Sprint goal)", "T 2025-3"), ("Future sprint", "T 2025-4")]);
        assert_eq!(extract_sprint_value(&r, SprintResolution::First), Some("T 2025-4"));
    }

    #[test]
    fn story_points_parse_permissively() {
        assert_eq!(parse_story_points(Some("3")), Some(3.0));
        assert_eq!(parse_story_points(Some("1.0")), Some(1.0));
        assert_eq!(parse_story_points(Some("?")), None);
        assert_eq!(parse_story_points(Some("#")), None);
        assert_eq!(parse_story_points(Some("")), None);
        assert_eq!(parse_story_points(Some("NaN")), None);
        assert_eq!(parse_story_points(None), None);
    }

    #[test]
    fn epic_link_defaults_to_sentinel() {
        assert_eq!(extract_epic_link(&record(&[("Parent", "EP-1")])), "EP-1");
        assert_eq!(extract_epic_link(&record(&[("Epic Link", " ")])), NO_EPIC);
    }

    #[test]
    fn long_team_name_is_abbreviated_for_display() {
        assert_eq!(display_team_name("Gadget Hackwrench"), "GH");
        assert_eq!(display_team_name("Triton"), "Triton");
    }

    #[test]
    fn dates_parse_from_export_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 12);
        assert_eq!(parse_date(Some("2025-03-12")), expected);
        assert_eq!(parse_date(Some("12/Mar/25 9:30 AM")), expected);
        assert_eq!(parse_date(Some("03/12/2025")), expected);
        assert_eq!(parse_date(Some("soon")), None);
    }
}
