//! Aggregate counters surfaced to callers instead of errors.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Outcome counts of one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassifyStats {
    pub records_total: usize,
    pub tickets_classified: usize,
    pub epic_records: usize,
    /// Records dropped because the title was empty
    pub records_skipped_untitled: usize,
    /// Sprint value present but not a `Team YEAR-N` label
    pub sprint_unresolved: usize,
    /// No usable sprint value at all
    pub sprint_backlog: usize,
    pub team_defaulted: usize,
    /// Team column held a numeric id and was ignored
    pub team_numeric_ignored: usize,
    pub tickets_per_team: BTreeMap<String, usize>,
}

impl ClassifyStats {
    pub fn to_report_value(&self) -> Value {
        json!({
            "records_total": self.records_total,
            "tickets_classified": self.tickets_classified,
            "epic_records": self.epic_records,
            "records_skipped": {
                "untitled": self.records_skipped_untitled,
            },
            "defaulted": {
                "sprint_unresolved": self.sprint_unresolved,
                "sprint_backlog": self.sprint_backlog,
                "team_unknown": self.team_defaulted,
                "team_numeric_ignored": self.team_numeric_ignored,
            },
            "tickets_per_team": self.tickets_per_team,
        })
    }
}

/// Outcome counts of one layout pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutStats {
    pub teams: usize,
    pub sprint_columns: usize,
    pub placements: usize,
    pub epics_rolled_over: usize,
    /// Backlog tickets hidden because their epic is scheduled in a sprint
    pub backlog_tickets_suppressed: usize,
}

/// Outcome counts of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileStats {
    pub elements: usize,
    pub team_bands: usize,
    pub sprint_boundaries: usize,
    /// Header labels with no separator nearby
    pub boundaries_ambiguous: usize,
    pub unclassified: usize,
    pub duplicate_groups: usize,
    pub mutations: usize,
}
