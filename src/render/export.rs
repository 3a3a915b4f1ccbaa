//! CSV export of reclassified elements.

use crate::reconcile::ReconcileOutcome;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    element_id: &'a str,
    issue_key: &'a str,
    team: &'a str,
    sprint: String,
    /// Canonical element when this one is a duplicate
    duplicate_of: &'a str,
}

/// One row per work item with an issue key, in snapshot order.
pub fn write_export_csv(path: &Path, outcome: &ReconcileOutcome) -> Result<usize> {
    let mut canonical_of: BTreeMap<&str, &str> = BTreeMap::new();
    for group in &outcome.duplicates {
        for member in group.members.iter().filter(|m| **m != group.canonical) {
            canonical_of.insert(member.0.as_str(), group.canonical.0.as_str());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut rows = 0;
    for assignment in &outcome.assignments {
        let Some(issue_key) = assignment.issue_key.as_deref() else {
            continue;
        };
        let element_id = assignment.element_id.0.as_str();
        writer.serialize(ExportRow {
            element_id,
            issue_key,
            team: assignment.team.as_deref().unwrap_or_default(),
            sprint: assignment.sprint_key.map(|k| k.to_string()).unwrap_or_default(),
            duplicate_of: canonical_of.get(element_id).copied().unwrap_or_default(),
        })?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundaryTuning, Element, ElementMeta, GeometrySnapshot, Rect};
    use crate::reconcile::reconcile;
    use tempfile::TempDir;

    fn card(id: &str, key: &str, x: f64) -> Element {
        Element {
            id: id.into(),
            rect: Rect::new(x, 0.0, 240.0, 160.0),
            text: Some("Login".into()),
            meta: ElementMeta {
                issue_key: Some(key.into()),
                team: Some("Triton".into()),
                ..Default::default()
            },
        }
    }

    #[test]
    fn duplicates_point_at_their_canonical() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("export.csv");
        let snapshot = GeometrySnapshot::new(vec![card("a", "TRI-1", 0.0), card("b", "TRI-1", 300.0)]);
        let outcome = reconcile(&snapshot, &BoundaryTuning::default());

        let rows = write_export_csv(&path, &outcome).expect("export");
        assert_eq!(rows, 2);
        let content = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "element_id,issue_key,team,sprint,duplicate_of");
        assert_eq!(lines[1], "a,TRI-1,Triton,,");
        assert_eq!(lines[2], "b,TRI-1,Triton,,a");
    }
}
