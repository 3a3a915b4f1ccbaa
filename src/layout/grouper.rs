//! Epic grouping per team and sprint.
//!
//! Each team's tickets are bucketed by sprint key, then by epic. An epic is
//! drawn in full exactly once, in the bucket of its first sprint (computed
//! over all of the team's tickets); every other bucket it shows up in gets a
//! reduced label.

use crate::domain::{SprintKey, Ticket, NO_EPIC, UNKNOWN_TEAM};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EpicPresentation {
    /// Full epic card with every schema field
    Full,
    /// Reduced label in a later column
    Label,
}

/// An epic as it appears in one sprint column of one team.
#[derive(Debug, Clone, PartialEq)]
pub struct Epic {
    pub epic_key: String,
    pub title: String,
    pub status_raw: String,
    pub priority_rank: Option<String>,
    pub first_sprint_key: SprintKey,
    /// Sprint the epic record itself is scheduled in, when not backlog
    pub designated_sprint: Option<SprintKey>,
    pub presentation: EpicPresentation,
    /// Ordered by descending story points (none last), then issue key
    pub tickets: Vec<Ticket>,
}

impl Epic {
    pub fn is_no_epic(&self) -> bool {
        self.epic_key == NO_EPIC
    }

    /// Column slots this epic spans: its own summary card plus its tickets.
    pub fn columns_needed(&self, max_cards_per_column: usize) -> usize {
        columns_needed(self.tickets.len(), max_cards_per_column)
    }
}

/// `ceil((1 + tickets) / max_cards)`; the epic summary takes one slot.
pub fn columns_needed(ticket_count: usize, max_cards_per_column: usize) -> usize {
    (1 + ticket_count).div_ceil(max_cards_per_column.max(1))
}

/// One team's bucket for one sprint key.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintColumn {
    pub sprint_key: SprintKey,
    pub team_name: String,
    pub epics: Vec<Epic>,
    /// Backlog epics sit side by side (sum); sprint epics stack (max)
    pub columns_needed: usize,
}

impl SprintColumn {
    pub fn ticket_count(&self) -> usize {
        self.epics.iter().map(|e| e.tickets.len()).sum()
    }

    pub fn tickets(&self) -> impl Iterator<Item = &Ticket> {
        self.epics.iter().flat_map(|e| e.tickets.iter())
    }
}

/// All buckets of one team, Backlog first then ascending sprint keys.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamGrouping {
    pub team_name: String,
    pub columns: Vec<SprintColumn>,
    /// Backlog tickets hidden because their epic has a designated sprint
    pub suppressed_backlog_tickets: usize,
}

impl TeamGrouping {
    pub fn column(&self, key: SprintKey) -> Option<&SprintColumn> {
        self.columns.iter().find(|c| c.sprint_key == key)
    }
}

/// Order tickets inside an epic: most points first, unestimated last,
/// then by issue key.
pub fn compare_tickets(a: &Ticket, b: &Ticket) -> Ordering {
    let by_points = match (a.story_points, b.story_points) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_points.then_with(|| a.issue_key.cmp(&b.issue_key))
}

fn compare_epics(a: &Epic, b: &Epic) -> Ordering {
    a.is_no_epic()
        .cmp(&b.is_no_epic())
        .then_with(|| match (&a.priority_rank, &b.priority_rank) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.epic_key.cmp(&b.epic_key))
}

/// Epic records of the whole board, plus the epic keys any ticket links to.
#[derive(Debug, Clone)]
pub struct EpicCatalog<'a> {
    records: &'a BTreeMap<String, Ticket>,
    linked: BTreeSet<&'a str>,
}

impl<'a> EpicCatalog<'a> {
    pub fn new(tickets: &'a [Ticket], records: &'a BTreeMap<String, Ticket>) -> Self {
        let linked = tickets.iter().filter(|t| t.has_epic()).map(|t| t.epic_key.as_str()).collect();
        Self { records, linked }
    }

    pub fn get(&self, epic_key: &str) -> Option<&'a Ticket> {
        self.records.get(epic_key)
    }

    /// Sprint the epic record is scheduled in, when not Backlog.
    pub fn designated(&self, epic_key: &str) -> Option<SprintKey> {
        self.get(epic_key).map(|r| r.sprint_key).filter(|k| !k.is_backlog())
    }

    /// Epic records no ticket on the board links to. Only these are placed
    /// by the record's own team; linked epics follow their tickets.
    pub fn unlinked(&self) -> impl Iterator<Item = (&'a str, &'a Ticket)> + '_ {
        self.records
            .iter()
            .filter(|(key, _)| !self.linked.contains(key.as_str()))
            .map(|(key, record)| (key.as_str(), record))
    }
}

/// Group one team's tickets.
///
/// Epics of this team without any ticket anywhere on the board still get a
/// full card in their own sprint.
pub fn group_team(
    team_name: &str,
    tickets: &[&Ticket],
    catalog: &EpicCatalog<'_>,
    max_cards_per_column: usize,
) -> TeamGrouping {
    let designated = |epic_key: &str| catalog.designated(epic_key);

    // First sprint per epic, team-wide.
    let mut first_sprint: BTreeMap<&str, SprintKey> = BTreeMap::new();
    for ticket in tickets {
        let entry = first_sprint.entry(ticket.epic_key.as_str()).or_insert(SprintKey::Backlog);
        if !ticket.sprint_key.is_backlog() && (entry.is_backlog() || ticket.sprint_key < *entry) {
            *entry = ticket.sprint_key;
        }
    }

    let mut buckets: BTreeMap<SprintKey, BTreeMap<&str, Vec<Ticket>>> = BTreeMap::new();
    let mut suppressed = 0usize;
    for ticket in tickets {
        if ticket.sprint_key.is_backlog()
            && ticket.has_epic()
            && designated(ticket.epic_key.as_str()).is_some()
        {
            suppressed += 1;
            continue;
        }
        buckets
            .entry(ticket.sprint_key)
            .or_default()
            .entry(ticket.epic_key.as_str())
            .or_default()
            .push((*ticket).clone());
    }

    // Epics that would otherwise not appear in this row at all.
    let placed: BTreeSet<&str> = buckets.values().flat_map(|b| b.keys().copied()).collect();
    let mut empty_epics: Vec<(&str, SprintKey)> = Vec::new();
    for &epic_key in first_sprint.keys() {
        if !placed.contains(epic_key) {
            if let Some(key) = designated(epic_key) {
                empty_epics.push((epic_key, key));
            }
        }
    }
    for (epic_key, record) in catalog.unlinked() {
        if record.team_name == team_name {
            empty_epics.push((epic_key, record.sprint_key));
        }
    }
    for &(epic_key, key) in &empty_epics {
        first_sprint.insert(epic_key, key);
        buckets.entry(key).or_default().entry(epic_key).or_default();
    }

    let mut columns = Vec::with_capacity(buckets.len());
    for (sprint_key, by_epic) in buckets {
        let mut epics: Vec<Epic> = by_epic
            .into_iter()
            .map(|(epic_key, mut epic_tickets)| {
                epic_tickets.sort_by(compare_tickets);
                let first = first_sprint.get(epic_key).copied().unwrap_or(SprintKey::Backlog);
                let record = catalog.get(epic_key);
                Epic {
                    epic_key: epic_key.to_string(),
                    title: record.map(|r| r.title.clone()).unwrap_or_else(|| epic_key.to_string()),
                    status_raw: record.map(|r| r.status_raw.clone()).unwrap_or_default(),
                    priority_rank: record.and_then(|r| r.priority_rank.clone()),
                    first_sprint_key: first,
                    designated_sprint: designated(epic_key),
                    presentation: if first == sprint_key {
                        EpicPresentation::Full
                    } else {
                        EpicPresentation::Label
                    },
                    tickets: epic_tickets,
                }
            })
            .collect();
        epics.sort_by(compare_epics);

        let per_epic = epics.iter().map(|e| e.columns_needed(max_cards_per_column));
        let columns_needed = if sprint_key.is_backlog() {
            per_epic.sum::<usize>()
        } else {
            per_epic.max().unwrap_or(0)
        };

        columns.push(SprintColumn {
            sprint_key,
            team_name: team_name.to_string(),
            epics,
            columns_needed: columns_needed.max(1),
        });
    }

    if suppressed > 0 {
        tracing::debug!(
            "Team {}: {} backlog tickets hidden under scheduled epics",
            team_name,
            suppressed
        );
    }

    TeamGrouping {
        team_name: team_name.to_string(),
        columns,
        suppressed_backlog_tickets: suppressed,
    }
}

/// Team row order: named teams alphabetically, `Unknown` last.
///
/// An epic record only opens a row of its own when no ticket links to it.
pub fn team_order(tickets: &[Ticket], epic_records: &BTreeMap<String, Ticket>) -> Vec<String> {
    let catalog = EpicCatalog::new(tickets, epic_records);
    let mut teams: BTreeSet<&str> = tickets.iter().map(|t| t.team_name.as_str()).collect();
    teams.extend(catalog.unlinked().map(|(_, r)| r.team_name.as_str()));
    let mut ordered: Vec<String> =
        teams.iter().filter(|t| **t != UNKNOWN_TEAM).map(|t| t.to_string()).collect();
    if teams.contains(UNKNOWN_TEAM) {
        ordered.push(UNKNOWN_TEAM.to_string());
    }
    ordered
}

/// Group every team of the board, in [`team_order`].
pub fn group_board(
    tickets: &[Ticket],
    epic_records: &BTreeMap<String, Ticket>,
    max_cards_per_column: usize,
) -> Vec<TeamGrouping> {
    let catalog = EpicCatalog::new(tickets, epic_records);
    team_order(tickets, epic_records)
        .iter()
        .map(|team| {
            let team_tickets: Vec<&Ticket> =
                tickets.iter().filter(|t| &t.team_name == team).collect();
            group_team(team, &team_tickets, &catalog, max_cards_per_column)
        })
        .collect()
}
