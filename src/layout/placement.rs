//! Placement instructions handed to the rendering collaborator.

use crate::domain::{CardKind, Element, ElementId, ElementMeta, ElementRole, Rect, SprintKey};
use serde::Serialize;
use std::collections::BTreeMap;

/// Half-open range of column slots in a team row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, end: start + len }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// One element to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub id: String,
    pub role: ElementRole,
    pub team_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_key: Option<SprintKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_slots: Option<SlotRange>,
    /// Row index below the column's content start
    pub row_offset: usize,
    /// Column slots the element spans
    pub width_span: usize,
    pub rect: Rect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<CardKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic_key: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Placement {
    /// The element the host would hold after drawing this placement, with
    /// the metadata it attaches.
    pub fn to_element(&self) -> Element {
        let is_epic_label = self.role == ElementRole::EpicLabel;
        let issue_key = match self.role {
            ElementRole::Card | ElementRole::EpicCard => self.issue_key.clone(),
            _ => None,
        };
        Element {
            id: ElementId(self.id.clone()),
            rect: self.rect,
            text: Some(self.text.clone()),
            meta: ElementMeta {
                issue_key,
                team: Some(self.team_name.clone()),
                is_epic_label,
                is_copy: false,
                has_reference_link: false,
                role: Some(self.role),
            },
        }
    }
}
