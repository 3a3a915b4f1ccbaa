//! Record → ticket classification.

use super::fields::{
    extract_epic_link, extract_sprint_value, parse_date, parse_story_points, resolve_team,
    TeamSource, ASSIGNEE_COLUMNS, END_DATE_COLUMNS, ISSUE_KEY_COLUMNS, ISSUE_TYPE_COLUMNS,
    PRIORITY_RANK_COLUMNS, START_DATE_COLUMNS, STATUS_COLUMNS, STORY_POINT_COLUMNS, TITLE_COLUMNS,
};
use super::sprint::parse_sprint_label;
use crate::domain::{CardKind, RawRecord, SprintKey, SprintResolution, Ticket};

/// How the sprint key of a ticket was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintOutcome {
    Resolved,
    /// A sprint value existed but was not a sprint label
    Unresolved,
    /// No usable sprint value
    Backlog,
}

/// Per-record notes kept for aggregate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    pub sprint: SprintOutcome,
    pub team: TeamSource,
    pub numeric_team_ignored: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingTitle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Ticket { ticket: Ticket, diagnostics: Diagnostics },
    Skipped(SkipReason),
}

/// Classify one record. Never fails; a record without a title is skipped.
pub fn classify_record(record: &RawRecord, mode: SprintResolution) -> Classification {
    let Some(title) = record.first_of(TITLE_COLUMNS) else {
        return Classification::Skipped(SkipReason::MissingTitle);
    };

    let sprint_value = extract_sprint_value(record, mode);
    let label = sprint_value.and_then(parse_sprint_label);
    let sprint = match (&label, sprint_value) {
        (Some(_), _) => SprintOutcome::Resolved,
        (None, Some(value)) => {
            tracing::warn!("Unresolved sprint value '{}', using Backlog", value);
            SprintOutcome::Unresolved
        }
        (None, None) => SprintOutcome::Backlog,
    };
    let sprint_key = label.as_ref().map(|l| l.key).unwrap_or(SprintKey::Backlog);

    let team = resolve_team(record, label.as_ref().and_then(|l| l.team.as_deref()));

    let ticket = Ticket {
        issue_key: record.first_of(ISSUE_KEY_COLUMNS).unwrap_or_default().to_string(),
        title: title.to_string(),
        kind: record
            .first_of(ISSUE_TYPE_COLUMNS)
            .map(CardKind::from_issue_type)
            .unwrap_or(CardKind::UserStory),
        team_name: team.name,
        sprint_key,
        epic_key: extract_epic_link(record),
        story_points: parse_story_points(record.first_of(STORY_POINT_COLUMNS)),
        priority_rank: record.first_of(PRIORITY_RANK_COLUMNS).map(str::to_string),
        status_raw: record.first_of(STATUS_COLUMNS).unwrap_or_default().to_string(),
        assignee: record.first_of(ASSIGNEE_COLUMNS).map(str::to_string),
        start_date: parse_date(record.first_of(START_DATE_COLUMNS)),
        end_date: parse_date(record.first_of(END_DATE_COLUMNS)),
    };

    Classification::Ticket {
        ticket,
        diagnostics: Diagnostics {
            sprint,
            team: team.source,
            numeric_team_ignored: team.numeric_ignored,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NO_EPIC, UNKNOWN_TEAM};

    fn classify(pairs: &[(&str, &str)]) -> Classification {
        classify_record(&RawRecord::from_pairs(pairs.iter().copied()), SprintResolution::First)
    }

    fn ticket(pairs: &[(&str, &str)]) -> Ticket {
        match classify(pairs) {
            Classification::Ticket { ticket, .. } => ticket,
            other => panic!("expected ticket, got {other:?}"),
        }
    }

    #[test]
    fn empty_title_is_skipped() {
        assert_eq!(
            classify(&[("Issue key", "A-1"), ("Summary", "  ")]),
            Classification::Skipped(SkipReason::MissingTitle)
        );
    }

    #[test]
    fn numeric_team_scenario_defaults_to_unknown() {
        let t = ticket(&[("Issue key", "A-1"), ("Summary", "x"), ("Team", "1039")]);
        assert_eq!(t.team_name, UNKNOWN_TEAM);
        assert_eq!(t.sprint_key, SprintKey::Backlog);
        assert_eq!(t.epic_key, NO_EPIC);
    }

    #[test]
    fn studio_scenario_names_team() {
        let t = ticket(&[("Summary", "x"), ("Studio", "Triton")]);
        assert_eq!(t.team_name, "Triton");
    }

    #[test]
    fn team_parsed_from_sprint_label() {
        let t = ticket(&[("Summary", "x"), ("Team", "7"), ("Sprint", "Triton 2025-25")]);
        assert_eq!(t.team_name, "Triton");
        assert_eq!(t.sprint_key.to_string(), "2025-25");
    }

    #[test]
    fn unparseable_sprint_falls_back_to_backlog() {
        match classify(&[("Summary", "x"), ("Sprint", "Sprint Five")]) {
            Classification::Ticket { ticket, diagnostics } => {
                assert_eq!(ticket.sprint_key, SprintKey::Backlog);
                assert_eq!(diagnostics.sprint, SprintOutcome::Unresolved);
            }
            other => panic!("expected ticket, got {other:?}"),
        }
    }

    #[test]
    fn full_record_fills_every_field() {
        let t = ticket(&[
            ("Issue key", "TRI-9"),
            ("Summary", "Ship it"),
            ("Issue Type", "Spike"),
            ("Status", "In Progress"),
            ("Custom field (Team)", "Kraken"),
            ("Sprint", "Kraken 2025-4"),
            ("Custom field (Epic Link)", "TRI-1"),
            ("Custom field (Story Points)", "5.0"),
            ("Custom field (Priority Rank)", "0|i0001:"),
            ("Assignee", "Ana"),
            ("Start date", "2025-02-12"),
        ]);
        assert_eq!(t.issue_key, "TRI-9");
        assert_eq!(t.kind, CardKind::Spike);
        assert_eq!(t.team_name, "Kraken");
        assert_eq!(t.epic_key, "TRI-1");
        assert_eq!(t.story_points, Some(5.0));
        assert_eq!(t.priority_rank.as_deref(), Some("0|i0001:"));
        assert_eq!(t.assignee.as_deref(), Some("Ana"));
        assert!(t.start_date.is_some());
        assert!(t.end_date.is_none());
    }
}
