//! Layout synthesis: grouped tickets → absolute geometry.
//!
//! All widths derive from ticket counts, so the board is placed in a single
//! forward pass per team and never measures rendered elements.
//!
//! Sprint columns form one grid shared by every team row: a column is as
//! wide as the widest team needs it, which keeps the same sprint key at the
//! same x offset in every row.

use super::capacity::{capacity_summary, CapacitySummary};
use super::grouper::{Epic, EpicPresentation, SprintColumn, TeamGrouping};
use super::placement::{Placement, SlotRange};
use crate::classify::sprint::{column_date_range, header_label};
use crate::domain::{
    BoardConfig, CardKind, DisplayField, ElementRole, LayoutStats, Rect, SprintKey,
    EPIC_LABEL_FIELDS,
};
use crate::utils::stable_id;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Minimum width of the Backlog column, in column slots.
pub const MIN_BACKLOG_SLOTS: usize = 6;

/// One column of the shared grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    pub sprint_key: SprintKey,
    pub slots: SlotRange,
    pub x: f64,
    pub width: f64,
    /// Generated upcoming sprint that no team has tickets in yet
    pub future: bool,
}

impl ColumnSpec {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// Vertical extent of one team row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRow {
    pub team_name: String,
    pub top: f64,
    pub header_y: f64,
    pub content_top: f64,
    pub cards_bottom: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardLayout {
    pub columns: Vec<ColumnSpec>,
    pub teams: Vec<TeamRow>,
    pub placements: Vec<Placement>,
    pub stats: LayoutStats,
}

pub struct LayoutSynthesizer<'a> {
    config: &'a BoardConfig,
}

impl<'a> LayoutSynthesizer<'a> {
    pub fn new(config: &'a BoardConfig) -> Self {
        Self { config }
    }

    fn unit(&self) -> f64 {
        self.config.metrics.unit_column_width()
    }

    /// Build the shared column grid.
    ///
    /// The grid holds Backlog, every sprint key any team uses, and
    /// `num_future_sprints` keys after the later of `current` and the latest
    /// key in use.
    pub fn column_grid(
        &self,
        groupings: &[TeamGrouping],
        current: Option<SprintKey>,
    ) -> Vec<ColumnSpec> {
        let mut needs: BTreeMap<SprintKey, (usize, bool)> = BTreeMap::new();
        needs.insert(SprintKey::Backlog, (0, false));
        for grouping in groupings {
            for column in &grouping.columns {
                let entry = needs.entry(column.sprint_key).or_insert((0, false));
                entry.0 = entry.0.max(column.columns_needed);
            }
        }

        let latest = needs.keys().copied().filter(|k| !k.is_backlog()).max();
        let current = current.filter(|k| !k.is_backlog());
        let anchor = match (current, latest) {
            (Some(c), Some(l)) => Some(c.max(l)),
            (c, l) => c.or(l),
        };
        if let Some(anchor) = anchor {
            for key in anchor.following(self.config.num_future_sprints) {
                needs.entry(key).or_insert((0, true));
            }
        }

        let unit = self.unit();
        let spacing = self.config.metrics.card_spacing;
        let mut specs = Vec::with_capacity(needs.len());
        let mut x = 0.0;
        let mut slot = 0usize;
        for (sprint_key, (need, future)) in needs {
            let (slots, width) = if sprint_key.is_backlog() {
                let slots = need.max(MIN_BACKLOG_SLOTS);
                (slots, slots as f64 * unit)
            } else {
                let slots = if future { self.config.future_sprint_columns } else { need.max(1) };
                (slots, slots as f64 * unit - spacing)
            };
            specs.push(ColumnSpec { sprint_key, slots: SlotRange::new(slot, slots), x, width, future });
            x += width + spacing;
            slot += slots;
        }
        specs
    }

    /// Place every team row, top to bottom.
    pub fn synthesize(&self, groupings: &[TeamGrouping], current: Option<SprintKey>) -> BoardLayout {
        let columns = self.column_grid(groupings, current);
        let mut placements = Vec::new();
        let mut teams = Vec::with_capacity(groupings.len());
        let mut top = 0.0;

        for grouping in groupings {
            let row = self.place_team(grouping, &columns, top, &mut placements);
            top = row.bottom + self.config.metrics.team_spacing;
            teams.push(row);
        }

        // An epic shared by several teams gets a full card in each row; only
        // the first, in team order, carries the epic's issue key.
        let mut owned: BTreeSet<String> = BTreeSet::new();
        for placement in placements.iter_mut().filter(|p| p.role == ElementRole::EpicCard) {
            if let Some(key) = placement.issue_key.take() {
                if owned.insert(key.clone()) {
                    placement.issue_key = Some(key);
                }
            }
        }

        let max_cards = self.config.max_cards_per_column;
        let stats = LayoutStats {
            teams: teams.len(),
            sprint_columns: columns.len(),
            placements: placements.len(),
            epics_rolled_over: groupings
                .iter()
                .flat_map(|g| g.columns.iter())
                .flat_map(|c| c.epics.iter())
                .filter(|e| e.columns_needed(max_cards) > 1)
                .count(),
            backlog_tickets_suppressed: groupings.iter().map(|g| g.suppressed_backlog_tickets).sum(),
        };
        tracing::debug!(
            "Laid out {} teams over {} columns ({} placements)",
            stats.teams,
            stats.sprint_columns,
            stats.placements
        );

        BoardLayout { columns, teams, placements, stats }
    }

    fn place_team(
        &self,
        grouping: &TeamGrouping,
        columns: &[ColumnSpec],
        top: f64,
        placements: &mut Vec<Placement>,
    ) -> TeamRow {
        let metrics = &self.config.metrics;
        let team = grouping.team_name.as_str();
        let header_y = top + metrics.header_offset;
        let content_top = header_y + metrics.header_height + metrics.content_gap;

        let label_x = columns.first().map(|c| c.x).unwrap_or(0.0);
        placements.push(Placement {
            id: stable_id(&["team", team]),
            role: ElementRole::TeamLabel,
            team_name: team.to_string(),
            sprint_key: None,
            column_slots: None,
            row_offset: 0,
            width_span: 0,
            rect: Rect::new(label_x, top, metrics.card_width * 2.0, metrics.team_label_height),
            kind: None,
            issue_key: None,
            epic_key: None,
            text: team.to_string(),
            fields: BTreeMap::new(),
        });

        let mut cards_bottom = content_top;
        let mut capacity: Vec<(&ColumnSpec, CapacitySummary)> = Vec::new();
        for spec in columns {
            let column = grouping.column(spec.sprint_key);
            self.place_header(team, spec, column, header_y, placements);

            let Some(column) = column else {
                continue;
            };
            let bottom = if spec.sprint_key.is_backlog() {
                self.place_backlog(team, spec, column, content_top, placements)
            } else {
                self.place_sprint(team, spec, column, content_top, placements)
            };
            cards_bottom = cards_bottom.max(bottom);
            if let Some(summary) = capacity_summary(column) {
                capacity.push((spec, summary));
            }
        }

        // Capacity band sits under the cards of the whole row.
        let capacity_top = cards_bottom + metrics.card_spacing;
        let mut capacity_block: f64 = 0.0;
        for (spec, summary) in &capacity {
            let height = summary.height(metrics);
            capacity_block = capacity_block.max(metrics.card_spacing + height);
            let fields = summary
                .rows
                .iter()
                .map(|r| (r.assignee.clone(), crate::domain::ticket::format_points(r.story_points)))
                .collect();
            placements.push(Placement {
                id: stable_id(&["capacity", team, &spec.sprint_key.to_string()]),
                role: ElementRole::CapacitySummary,
                team_name: team.to_string(),
                sprint_key: Some(spec.sprint_key),
                column_slots: Some(spec.slots),
                row_offset: 0,
                width_span: spec.slots.len(),
                rect: Rect::new(spec.x, capacity_top, spec.width, height),
                kind: None,
                issue_key: None,
                epic_key: None,
                text: summary.render_text(),
                fields,
            });
        }
        let bottom = cards_bottom + capacity_block;

        self.place_separators(team, columns, header_y, bottom, placements);

        TeamRow {
            team_name: team.to_string(),
            top,
            header_y,
            content_top,
            cards_bottom,
            bottom,
        }
    }

    fn place_header(
        &self,
        team: &str,
        spec: &ColumnSpec,
        column: Option<&SprintColumn>,
        header_y: f64,
        placements: &mut Vec<Placement>,
    ) {
        let starts = column.into_iter().flat_map(|c| c.tickets()).filter_map(|t| t.start_date);
        let ends = column.into_iter().flat_map(|c| c.tickets()).filter_map(|t| t.end_date);
        let mut fields = BTreeMap::new();
        if let Some(range) =
            column_date_range(spec.sprint_key, starts, ends, self.config.sprint_length_days)
        {
            fields.insert("dates".to_string(), range.to_string());
        }
        placements.push(Placement {
            id: stable_id(&["header", team, &spec.sprint_key.to_string()]),
            role: ElementRole::SprintHeader,
            team_name: team.to_string(),
            sprint_key: Some(spec.sprint_key),
            column_slots: Some(spec.slots),
            row_offset: 0,
            width_span: spec.slots.len(),
            rect: Rect::new(spec.x, header_y, spec.width, self.config.metrics.header_height),
            kind: None,
            issue_key: None,
            epic_key: None,
            text: header_label(team, spec.sprint_key),
            fields,
        });
    }

    /// Backlog epics sit side by side. Returns the lowest card edge.
    fn place_backlog(
        &self,
        team: &str,
        spec: &ColumnSpec,
        column: &SprintColumn,
        content_top: f64,
        placements: &mut Vec<Placement>,
    ) -> f64 {
        let unit = self.unit();
        let mut slot_cursor = 0usize;
        let mut bottom = content_top;
        for epic in &column.epics {
            let origin_x = spec.x + slot_cursor as f64 * unit;
            let block = self.place_epic(
                team,
                spec.sprint_key,
                epic,
                origin_x,
                content_top,
                spec.slots.start + slot_cursor,
                0,
                placements,
            );
            bottom = bottom.max(content_top + block.height);
            slot_cursor += block.columns;
        }
        bottom
    }

    /// Sprint-column epics stack vertically. Returns the lowest card edge.
    fn place_sprint(
        &self,
        team: &str,
        spec: &ColumnSpec,
        column: &SprintColumn,
        content_top: f64,
        placements: &mut Vec<Placement>,
    ) -> f64 {
        let mut y = content_top;
        let mut row_base = 0usize;
        let mut bottom = content_top;
        for epic in &column.epics {
            let block = self.place_epic(
                team,
                spec.sprint_key,
                epic,
                spec.x,
                y,
                spec.slots.start,
                row_base,
                placements,
            );
            bottom = y + block.height;
            y = bottom + self.config.metrics.epic_spacing;
            row_base += block.rows;
        }
        bottom
    }

    /// Place an epic's summary in slot 0 and its tickets in the following
    /// slots, filling each column top to bottom before moving right.
    #[allow(clippy::too_many_arguments)]
    fn place_epic(
        &self,
        team: &str,
        sprint_key: SprintKey,
        epic: &Epic,
        origin_x: f64,
        origin_y: f64,
        slot_base: usize,
        row_base: usize,
        placements: &mut Vec<Placement>,
    ) -> EpicBlock {
        let metrics = &self.config.metrics;
        let max_cards = self.config.max_cards_per_column;
        let unit = self.unit();
        let pitch = metrics.card_height + metrics.card_spacing;
        let columns = epic.columns_needed(max_cards);
        let rows = (1 + epic.tickets.len()).min(max_cards);
        let sprint = sprint_key.to_string();

        let position = |slot: usize| -> (usize, usize, Rect) {
            let col = slot / max_cards;
            let row = slot % max_cards;
            let rect = Rect::new(
                origin_x + col as f64 * unit,
                origin_y + row as f64 * pitch,
                metrics.card_width,
                metrics.card_height,
            );
            (col, row, rect)
        };

        let (_, _, summary_rect) = position(0);
        let (role, fields) = if epic.is_no_epic() {
            (ElementRole::EpicLabel, BTreeMap::new())
        } else {
            match epic.presentation {
                EpicPresentation::Full => {
                    (ElementRole::EpicCard, epic_fields(epic, CardKind::Epic.fields()))
                }
                EpicPresentation::Label => (ElementRole::EpicLabel, epic_fields(epic, EPIC_LABEL_FIELDS)),
            }
        };
        placements.push(Placement {
            id: stable_id(&["epic", team, &sprint, &epic.epic_key]),
            role,
            team_name: team.to_string(),
            sprint_key: Some(sprint_key),
            column_slots: Some(SlotRange::new(slot_base, columns)),
            row_offset: row_base,
            width_span: columns,
            rect: summary_rect,
            kind: Some(CardKind::Epic),
            issue_key: (!epic.is_no_epic()).then(|| epic.epic_key.clone()),
            epic_key: Some(epic.epic_key.clone()),
            text: epic.title.clone(),
            fields,
        });

        for (index, ticket) in epic.tickets.iter().enumerate() {
            let (col, row, rect) = position(index + 1);
            // A key repeated inside one epic is told apart by its occurrence.
            let occurrence =
                epic.tickets[..index].iter().filter(|t| t.issue_key == ticket.issue_key).count();
            let occurrence = occurrence.to_string();
            let mut id_parts = vec![
                "card",
                team,
                sprint.as_str(),
                epic.epic_key.as_str(),
                ticket.issue_key.as_str(),
            ];
            if occurrence != "0" {
                id_parts.push(occurrence.as_str());
            }
            placements.push(Placement {
                id: stable_id(&id_parts),
                role: ElementRole::Card,
                team_name: team.to_string(),
                sprint_key: Some(sprint_key),
                column_slots: Some(SlotRange::new(slot_base + col, 1)),
                row_offset: row_base + row,
                width_span: 1,
                rect,
                kind: Some(ticket.kind),
                issue_key: Some(ticket.issue_key.clone()).filter(|k| !k.is_empty()),
                epic_key: ticket.has_epic().then(|| ticket.epic_key.clone()),
                text: ticket.title.clone(),
                fields: ticket.display_fields(ticket.kind.fields()),
            });
        }

        EpicBlock { columns, rows, height: rows as f64 * pitch - metrics.card_spacing }
    }

    /// Vertical rules at every column boundary, spanning header to row bottom.
    fn place_separators(
        &self,
        team: &str,
        columns: &[ColumnSpec],
        header_y: f64,
        bottom: f64,
        placements: &mut Vec<Placement>,
    ) {
        let metrics = &self.config.metrics;
        let (Some(first), Some(last)) = (columns.first(), columns.last()) else {
            return;
        };
        let mut xs = Vec::with_capacity(columns.len() + 1);
        xs.push(first.x - metrics.card_spacing / 2.0);
        for pair in columns.windows(2) {
            xs.push((pair[0].right() + pair[1].x) / 2.0);
        }
        xs.push(last.right() + metrics.card_spacing / 2.0);

        for (index, x) in xs.into_iter().enumerate() {
            placements.push(Placement {
                id: stable_id(&["separator", team, &index.to_string()]),
                role: ElementRole::Separator,
                team_name: team.to_string(),
                sprint_key: None,
                column_slots: None,
                row_offset: 0,
                width_span: 0,
                rect: Rect::new(
                    x - metrics.separator_width / 2.0,
                    header_y,
                    metrics.separator_width,
                    bottom - header_y,
                ),
                kind: None,
                issue_key: None,
                epic_key: None,
                text: String::new(),
                fields: BTreeMap::new(),
            });
        }
    }
}

struct EpicBlock {
    columns: usize,
    rows: usize,
    height: f64,
}

fn epic_fields(epic: &Epic, fields: &[DisplayField]) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for field in fields {
        let value = match field {
            DisplayField::IssueKey => Some(epic.epic_key.clone()),
            DisplayField::Title => Some(epic.title.clone()),
            DisplayField::Status => Some(epic.status_raw.clone()),
            DisplayField::PriorityRank => epic.priority_rank.clone(),
            _ => None,
        };
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.insert(field.as_str().to_string(), value);
        }
    }
    out
}
