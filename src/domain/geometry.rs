//! Value snapshots of placed board elements.
//!
//! The host canvas owns the elements; the core only ever sees copies taken
//! at one instant, addressed by opaque ids.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Opaque handle to a host element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        ElementId(value.to_string())
    }
}

/// What an element is on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementRole {
    Card,
    EpicCard,
    EpicLabel,
    TeamLabel,
    SprintHeader,
    Separator,
    CapacitySummary,
}

impl ElementRole {
    /// Roles that describe the board rather than a work item.
    pub fn is_label_only(self) -> bool {
        matches!(
            self,
            ElementRole::EpicLabel
                | ElementRole::TeamLabel
                | ElementRole::SprintHeader
                | ElementRole::Separator
                | ElementRole::CapacitySummary
        )
    }
}

/// Key-value metadata the host stores on each element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementMeta {
    pub issue_key: Option<String>,
    pub team: Option<String>,
    pub is_epic_label: bool,
    pub is_copy: bool,
    pub has_reference_link: bool,
    pub role: Option<ElementRole>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub rect: Rect,
    /// Visible text (header labels, card titles).
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub meta: ElementMeta,
}

impl Element {
    /// Thin vertical rules drawn between sprint columns.
    pub fn is_separator(&self) -> bool {
        if self.meta.role == Some(ElementRole::Separator) {
            return true;
        }
        let width = self.rect.width.max(0.5);
        self.rect.width <= 4.0 && self.rect.height >= 10.0 * width
    }

    /// Elements that never stand for a duplicable work item.
    pub fn is_label_only(&self) -> bool {
        self.meta.is_epic_label
            || self.meta.role.is_some_and(ElementRole::is_label_only)
            || self.is_separator()
    }

    pub fn issue_key(&self) -> Option<&str> {
        self.meta.issue_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Everything on the board at one instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeometrySnapshot {
    pub elements: Vec<Element>,
}

impl GeometrySnapshot {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(id: &str, rect: Rect) -> Element {
        Element { id: id.into(), rect, text: None, meta: ElementMeta::default() }
    }

    #[test]
    fn thin_tall_shapes_are_separators() {
        assert!(element("s", Rect::new(0.0, 0.0, 2.0, 400.0)).is_separator());
        assert!(!element("c", Rect::new(0.0, 0.0, 240.0, 160.0)).is_separator());
        assert!(!element("dot", Rect::new(0.0, 0.0, 2.0, 2.0)).is_separator());
    }

    #[test]
    fn snapshot_json_flattens_rect() {
        let json = r#"{"elements":[{"id":"e1","x":1,"y":2,"width":3,"height":4,
            "meta":{"issue_key":"A-1","is_copy":true}}]}"#;
        let snapshot: GeometrySnapshot = serde_json::from_str(json).expect("parse snapshot");
        let el = &snapshot.elements[0];
        assert_eq!(el.rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(el.issue_key(), Some("A-1"));
        assert!(el.meta.is_copy);
        assert!(!el.meta.has_reference_link);
    }
}
