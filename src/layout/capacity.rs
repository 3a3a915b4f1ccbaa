//! Story-point capacity per assignee for one team's sprint column.

use super::grouper::SprintColumn;
use crate::domain::{ticket::format_points, LayoutMetrics};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRow {
    pub assignee: String,
    pub story_points: f64,
    pub tickets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacitySummary {
    pub rows: Vec<CapacityRow>,
    pub total_points: f64,
}

impl CapacitySummary {
    /// Assignee rows plus the total row.
    pub fn row_count(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn height(&self, metrics: &LayoutMetrics) -> f64 {
        self.row_count() as f64 * metrics.capacity_row_height
    }

    pub fn render_text(&self) -> String {
        let mut lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| format!("{}: {} pts ({})", row.assignee, format_points(row.story_points), row.tickets))
            .collect();
        lines.push(format!("Total: {} pts", format_points(self.total_points)));
        lines.join("\n")
    }
}

/// Sum story points per assignee. Unestimated tickets count as zero points.
/// Returns `None` when no ticket in the column has an assignee.
pub fn capacity_summary(column: &SprintColumn) -> Option<CapacitySummary> {
    let mut per_assignee: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for ticket in column.tickets() {
        let Some(assignee) = ticket.assignee.as_deref() else {
            continue;
        };
        let entry = per_assignee.entry(assignee).or_insert((0.0, 0));
        entry.0 += ticket.story_points.unwrap_or(0.0);
        entry.1 += 1;
    }
    if per_assignee.is_empty() {
        return None;
    }

    let rows: Vec<CapacityRow> = per_assignee
        .into_iter()
        .map(|(assignee, (story_points, tickets))| CapacityRow {
            assignee: assignee.to_string(),
            story_points,
            tickets,
        })
        .collect();
    let total_points = rows.iter().map(|r| r.story_points).sum();
    Some(CapacitySummary { rows, total_points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CardKind, SprintKey, Ticket, NO_EPIC};
    use crate::layout::grouper::{Epic, EpicPresentation};

    fn ticket(key: &str, assignee: Option<&str>, points: Option<f64>) -> Ticket {
        Ticket {
            issue_key: key.to_string(),
            title: key.to_string(),
            kind: CardKind::Task,
            team_name: "Triton".to_string(),
            sprint_key: SprintKey::sprint(2025, 1).unwrap(),
            epic_key: NO_EPIC.to_string(),
            story_points: points,
            priority_rank: None,
            status_raw: String::new(),
            assignee: assignee.map(str::to_string),
            start_date: None,
            end_date: None,
        }
    }

    fn column(tickets: Vec<Ticket>) -> SprintColumn {
        SprintColumn {
            sprint_key: SprintKey::sprint(2025, 1).unwrap(),
            team_name: "Triton".to_string(),
            epics: vec![Epic {
                epic_key: NO_EPIC.to_string(),
                title: NO_EPIC.to_string(),
                status_raw: String::new(),
                priority_rank: None,
                first_sprint_key: SprintKey::sprint(2025, 1).unwrap(),
                designated_sprint: None,
                presentation: EpicPresentation::Full,
                tickets,
            }],
            columns_needed: 1,
        }
    }

    #[test]
    fn absent_without_assignees() {
        assert!(capacity_summary(&column(vec![ticket("A-1", None, Some(3.0))])).is_none());
    }

    #[test]
    fn sums_points_treating_unestimated_as_zero() {
        let summary = capacity_summary(&column(vec![
            ticket("A-1", Some("Ana"), Some(3.0)),
            ticket("A-2", Some("Ana"), None),
            ticket("A-3", Some("Bo"), Some(2.5)),
            ticket("A-4", None, Some(8.0)),
        ]))
        .expect("summary");
        assert_eq!(summary.rows.len(), 2);
        assert_eq!(summary.rows[0].assignee, "Ana");
        assert_eq!(summary.rows[0].story_points, 3.0);
        assert_eq!(summary.rows[0].tickets, 2);
        assert_eq!(summary.total_points, 5.5);
        assert_eq!(summary.row_count(), 3);
        assert!(summary.render_text().ends_with("Total: 5.5 pts"));
    }
}
