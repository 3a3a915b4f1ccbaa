//! Classification of raw tracker rows into tickets

use crate::domain::{CardKind, ClassifyStats, RawRecord, SprintResolution, Ticket, UNKNOWN_TEAM};
use std::collections::{BTreeMap, BTreeSet};

pub mod classifier;
pub mod fields;
pub mod sprint;

pub use classifier::{classify_record, Classification, Diagnostics, SkipReason, SprintOutcome};
pub use fields::{display_team_name, TeamSource};
pub use sprint::{parse_sprint_label, DateRange, SprintLabel};

/// Result of classifying a whole record set.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOutcome {
    /// Placeable work items, in input order
    pub tickets: Vec<Ticket>,
    /// Epic records keyed by issue key; they describe epics rather than
    /// being placed as cards
    pub epics: BTreeMap<String, Ticket>,
    /// Teams seen with a real name; never contains `Unknown`
    pub known_teams: BTreeSet<String>,
    pub stats: ClassifyStats,
}

/// Classify every record. A bad record is counted and skipped; it never
/// stops the rest of the set.
pub fn classify_records(records: &[RawRecord], mode: SprintResolution) -> ClassifyOutcome {
    let mut outcome = ClassifyOutcome::default();
    outcome.stats.records_total = records.len();

    for (index, record) in records.iter().enumerate() {
        let (ticket, diagnostics) = match classify_record(record, mode) {
            Classification::Ticket { ticket, diagnostics } => (ticket, diagnostics),
            Classification::Skipped(reason) => {
                tracing::debug!("Skipping record {}: {:?}", index, reason);
                outcome.stats.records_skipped_untitled += 1;
                continue;
            }
        };

        match diagnostics.sprint {
            SprintOutcome::Resolved => {}
            SprintOutcome::Unresolved => outcome.stats.sprint_unresolved += 1,
            SprintOutcome::Backlog => outcome.stats.sprint_backlog += 1,
        }
        if diagnostics.team == TeamSource::Unknown {
            outcome.stats.team_defaulted += 1;
        }
        if diagnostics.numeric_team_ignored {
            outcome.stats.team_numeric_ignored += 1;
        }
        if ticket.team_name != UNKNOWN_TEAM {
            outcome.known_teams.insert(ticket.team_name.clone());
        }

        if ticket.kind == CardKind::Epic && !ticket.issue_key.is_empty() {
            outcome.stats.epic_records += 1;
            if outcome.epics.contains_key(&ticket.issue_key) {
                tracing::debug!("Duplicate epic record {} ignored", ticket.issue_key);
                continue;
            }
            outcome.epics.insert(ticket.issue_key.clone(), ticket);
            continue;
        }

        outcome.stats.tickets_classified += 1;
        *outcome.stats.tickets_per_team.entry(ticket.team_name.clone()).or_insert(0) += 1;
        outcome.tickets.push(ticket);
    }

    tracing::debug!(
        "Classified {} tickets and {} epics from {} records",
        outcome.tickets.len(),
        outcome.epics.len(),
        records.len()
    );
    outcome
}
