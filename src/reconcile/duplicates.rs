//! Duplicate card reconciliation.
//!
//! When the same issue key appears on several elements, one of them stays
//! the canonical card and every other member is demoted to a plain copy.

use crate::domain::{Element, ElementId, GeometrySnapshot, Rect};
use crate::utils::{contains_reference_link, strip_reference_links};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Weight of the vertical coordinate in raster order.
pub const RASTER_ROW_WEIGHT: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub issue_key: String,
    pub members: Vec<ElementId>,
    pub canonical: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    ClearIssueKey,
    MarkCopy,
    ReplaceTitle { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationInstruction {
    pub element_id: ElementId,
    #[serde(flatten)]
    pub mutation: Mutation,
}

/// Scalar raster position: left to right, then top to bottom.
pub fn raster_position(rect: &Rect) -> f64 {
    rect.x + rect.y * RASTER_ROW_WEIGHT
}

fn raster_cmp(a: &Element, b: &Element) -> Ordering {
    raster_position(&a.rect)
        .total_cmp(&raster_position(&b.rect))
        .then_with(|| a.id.cmp(&b.id))
}

/// Group work-item elements sharing an issue key. Only keys with more than
/// one member form a group.
pub fn find_duplicates(snapshot: &GeometrySnapshot) -> Vec<DuplicateGroup> {
    let mut by_key: BTreeMap<&str, Vec<&Element>> = BTreeMap::new();
    for element in &snapshot.elements {
        if element.is_label_only() {
            continue;
        }
        if let Some(key) = element.issue_key() {
            by_key.entry(key).or_default().push(element);
        }
    }

    by_key
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .filter_map(|(key, members)| {
            let originals: Vec<&Element> =
                members.iter().copied().filter(|e| !e.meta.is_copy).collect();
            let candidates = if originals.is_empty() { &members } else { &originals };
            let canonical = candidates.iter().copied().min_by(|a, b| raster_cmp(a, b))?;
            Some(DuplicateGroup {
                issue_key: key.to_string(),
                members: members.iter().map(|e| e.id.clone()).collect(),
                canonical: canonical.id.clone(),
            })
        })
        .collect()
}

/// Mutations that demote every non-canonical member of `groups`.
pub fn demotions(snapshot: &GeometrySnapshot, groups: &[DuplicateGroup]) -> Vec<MutationInstruction> {
    let by_id: BTreeMap<&ElementId, &Element> =
        snapshot.elements.iter().map(|e| (&e.id, e)).collect();

    let mut out = Vec::new();
    for group in groups {
        for member_id in group.members.iter().filter(|id| **id != group.canonical) {
            let Some(element) = by_id.get(member_id) else {
                continue;
            };
            let mut push = |mutation| {
                out.push(MutationInstruction { element_id: member_id.clone(), mutation });
            };
            push(Mutation::ClearIssueKey);
            if !element.meta.is_copy {
                push(Mutation::MarkCopy);
            }
            let text = element.text.as_deref().unwrap_or_default();
            if element.meta.has_reference_link || contains_reference_link(text) {
                push(Mutation::ReplaceTitle { title: strip_reference_links(text) });
            }
        }
        tracing::debug!(
            "Issue {}: {} copies of canonical {}",
            group.issue_key,
            group.members.len() - 1,
            group.canonical
        );
    }
    out
}

/// Apply mutations to a snapshot copy, as the host would.
pub fn apply_mutations(snapshot: &GeometrySnapshot, mutations: &[MutationInstruction]) -> GeometrySnapshot {
    let mut next = snapshot.clone();
    let index: BTreeMap<ElementId, usize> =
        next.elements.iter().enumerate().map(|(i, e)| (e.id.clone(), i)).collect();
    for instruction in mutations {
        let Some(&i) = index.get(&instruction.element_id) else {
            continue;
        };
        let element = &mut next.elements[i];
        match &instruction.mutation {
            Mutation::ClearIssueKey => element.meta.issue_key = None,
            Mutation::MarkCopy => element.meta.is_copy = true,
            Mutation::ReplaceTitle { title } => {
                element.text = Some(title.clone());
                element.meta.has_reference_link = false;
            }
        }
    }
    next
}
