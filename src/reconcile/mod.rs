//! Geometry-driven reconciliation: boundary detection, reclassification and
//! duplicate demotion over one snapshot.

pub mod boundary;
pub mod duplicates;

pub use boundary::{
    classify_element, detect_boundaries, header_key, reclassify, BoardBoundaries, ElementAssignment,
    SprintBoundary, TeamBand, TeamBoundary,
};
pub use duplicates::{
    apply_mutations, demotions, find_duplicates, raster_position, DuplicateGroup, Mutation,
    MutationInstruction,
};

use crate::domain::{BoundaryTuning, GeometrySnapshot, ReconcileStats};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    pub boundaries: BoardBoundaries,
    pub assignments: Vec<ElementAssignment>,
    pub duplicates: Vec<DuplicateGroup>,
    pub mutations: Vec<MutationInstruction>,
    pub stats: ReconcileStats,
}

/// One reconciliation pass. Reads only the snapshot, so a scheduler can call
/// it as often as it likes; applying the returned mutations and calling it
/// again yields no further mutations.
pub fn reconcile(snapshot: &GeometrySnapshot, tuning: &BoundaryTuning) -> ReconcileOutcome {
    let boundaries = detect_boundaries(snapshot, tuning);
    let assignments = reclassify(snapshot, &boundaries);
    let duplicates = find_duplicates(snapshot);
    let mutations = demotions(snapshot, &duplicates);

    let unclassified = snapshot
        .elements
        .iter()
        .zip(&assignments)
        .filter(|(element, assignment)| !element.is_label_only() && !assignment.is_complete())
        .count();
    let stats = ReconcileStats {
        elements: snapshot.elements.len(),
        team_bands: boundaries.bands.len(),
        sprint_boundaries: boundaries.sprint_count(),
        boundaries_ambiguous: boundaries.ambiguous_count(),
        unclassified,
        duplicate_groups: duplicates.len(),
        mutations: mutations.len(),
    };
    if stats.unclassified > 0 {
        tracing::warn!("{} work items fall outside every sprint boundary", stats.unclassified);
    }

    ReconcileOutcome { boundaries, assignments, duplicates, mutations, stats }
}
