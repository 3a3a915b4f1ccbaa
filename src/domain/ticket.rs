//! Classified work items and card kinds.

use super::SprintKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NO_EPIC: &str = "No Epic";
pub const UNKNOWN_TEAM: &str = "Unknown";

/// The template a card is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Theme,
    Initiative,
    Milestone,
    Epic,
    UserStory,
    Task,
    Spike,
    Test,
}

/// A field a card template can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayField {
    IssueKey,
    Title,
    Status,
    StoryPoints,
    PriorityRank,
    Assignee,
    EpicLink,
}

impl DisplayField {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayField::IssueKey => "issue_key",
            DisplayField::Title => "title",
            DisplayField::Status => "status",
            DisplayField::StoryPoints => "story_points",
            DisplayField::PriorityRank => "priority_rank",
            DisplayField::Assignee => "assignee",
            DisplayField::EpicLink => "epic_link",
        }
    }
}

use DisplayField::*;

const THEME_FIELDS: &[DisplayField] = &[Title, Status, PriorityRank];
const INITIATIVE_FIELDS: &[DisplayField] = &[IssueKey, Title, Status, PriorityRank];
const MILESTONE_FIELDS: &[DisplayField] = &[IssueKey, Title, Status];
const EPIC_FIELDS: &[DisplayField] = &[IssueKey, Title, Status, PriorityRank];
const STORY_FIELDS: &[DisplayField] = &[IssueKey, Title, StoryPoints, Assignee, Status, EpicLink];
const TASK_FIELDS: &[DisplayField] = &[IssueKey, Title, StoryPoints, Assignee, Status];
const SPIKE_FIELDS: &[DisplayField] = &[IssueKey, Title, StoryPoints, Assignee];
const TEST_FIELDS: &[DisplayField] = &[IssueKey, Title, Assignee, Status];

/// Fields rendered on an epic's reduced label in later sprint columns.
pub const EPIC_LABEL_FIELDS: &[DisplayField] = &[IssueKey, Title];

impl CardKind {
    /// Map an issue-type cell to a card kind. Unknown types render as stories.
    pub fn from_issue_type(value: &str) -> Self {
        let normalized: String =
            value.trim().to_ascii_lowercase().chars().filter(|c| c.is_ascii_alphanumeric()).collect();
        match normalized.as_str() {
            "theme" => CardKind::Theme,
            "initiative" => CardKind::Initiative,
            "milestone" => CardKind::Milestone,
            "epic" => CardKind::Epic,
            "task" | "subtask" | "bug" => CardKind::Task,
            "spike" => CardKind::Spike,
            "test" | "testcase" => CardKind::Test,
            _ => CardKind::UserStory,
        }
    }

    /// Display fields of this card template, in render order.
    pub fn fields(self) -> &'static [DisplayField] {
        match self {
            CardKind::Theme => THEME_FIELDS,
            CardKind::Initiative => INITIATIVE_FIELDS,
            CardKind::Milestone => MILESTONE_FIELDS,
            CardKind::Epic => EPIC_FIELDS,
            CardKind::UserStory => STORY_FIELDS,
            CardKind::Task => TASK_FIELDS,
            CardKind::Spike => SPIKE_FIELDS,
            CardKind::Test => TEST_FIELDS,
        }
    }
}

/// One classified work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub issue_key: String,
    pub title: String,
    pub kind: CardKind,
    pub team_name: String,
    pub sprint_key: SprintKey,
    pub epic_key: String,
    pub story_points: Option<f64>,
    pub priority_rank: Option<String>,
    pub status_raw: String,
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Ticket {
    pub fn has_epic(&self) -> bool {
        self.epic_key != NO_EPIC
    }

    /// Render the given fields to display strings, skipping empty ones.
    pub fn display_fields(&self, fields: &[DisplayField]) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for field in fields {
            let value = match field {
                IssueKey => Some(self.issue_key.clone()),
                Title => Some(self.title.clone()),
                Status => Some(self.status_raw.clone()),
                StoryPoints => self.story_points.map(format_points),
                PriorityRank => self.priority_rank.clone(),
                Assignee => self.assignee.clone(),
                EpicLink => self.has_epic().then(|| self.epic_key.clone()),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                out.insert(field.as_str().to_string(), value);
            }
        }
        out
    }
}

/// Format story points without a trailing `.0` for whole numbers.
pub fn format_points(points: f64) -> String {
    if points.fract() == 0.0 && points.abs() < 1e15 {
        format!("{}", points as i64)
    } else {
        format!("{points}")
    }
}
