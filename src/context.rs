//! Explicit pipeline context.
//!
//! Every operation reads its settings from a [`BoardContext`] passed by the
//! caller; nothing is kept in module state between calls.

use crate::classify::{classify_records, ClassifyOutcome};
use crate::domain::{BoardConfig, GeometrySnapshot, RawRecord, SprintKey};
use crate::error::Result;
use crate::layout::{group_board, BoardLayout, LayoutSynthesizer, TeamGrouping};
use crate::reconcile::{detect_boundaries, reconcile, BoardBoundaries, ReconcileOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct BoardContext {
    config: BoardConfig,
    current_sprint: Option<SprintKey>,
}

impl BoardContext {
    /// Validate `config` and wrap it.
    pub fn new(config: BoardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, current_sprint: None })
    }

    /// Anchor generated future sprints at `current` instead of the latest
    /// sprint in the data.
    pub fn with_current_sprint(mut self, current: Option<SprintKey>) -> Self {
        self.current_sprint = current;
        self
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn classify(&self, records: &[RawRecord]) -> ClassifyOutcome {
        classify_records(records, self.config.sprint_resolution)
    }

    pub fn group(&self, outcome: &ClassifyOutcome) -> Vec<TeamGrouping> {
        group_board(&outcome.tickets, &outcome.epics, self.config.max_cards_per_column)
    }

    pub fn layout(&self, outcome: &ClassifyOutcome) -> BoardLayout {
        let groupings = self.group(outcome);
        LayoutSynthesizer::new(&self.config).synthesize(&groupings, self.current_sprint)
    }

    /// Classify and lay out in one step.
    pub fn layout_records(&self, records: &[RawRecord]) -> (ClassifyOutcome, BoardLayout) {
        let outcome = self.classify(records);
        let layout = self.layout(&outcome);
        (outcome, layout)
    }

    pub fn detect_boundaries(&self, snapshot: &GeometrySnapshot) -> BoardBoundaries {
        detect_boundaries(snapshot, &self.config.boundary)
    }

    pub fn reconcile(&self, snapshot: &GeometrySnapshot) -> ReconcileOutcome {
        reconcile(snapshot, &self.config.boundary)
    }
}
