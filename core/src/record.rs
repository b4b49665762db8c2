use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Outcome, SectionId, WaveDirection, WaveId, WaveKind};

/// Outcome recorded for a single section of a wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionResult {
    /// Section the result belongs to.
    pub section: SectionId,
    /// Majority outcome across the section's columns.
    pub outcome: Outcome,
    /// Mean raw participation rate across the section's columns.
    pub participation: f32,
}

/// Violations of the [`WaveRecord`] invariants.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A wave path must contain at least the origin section.
    #[error("wave path is empty")]
    EmptyPath,
    /// The first path entry must be the origin section.
    #[error("wave path starts at {first} instead of origin {origin}")]
    PathMustStartAtOrigin {
        /// Origin recorded for the wave.
        origin: SectionId,
        /// First section found in the path.
        first: SectionId,
    },
    /// A section appeared twice in the path.
    #[error("{0} appears more than once in the wave path")]
    DuplicateSection(SectionId),
    /// An outcome referenced a section outside the path.
    #[error("{0} is not part of the wave path")]
    SectionNotOnPath(SectionId),
    /// A second outcome was recorded for the same section.
    #[error("{0} already has a recorded outcome")]
    OutcomeAlreadyRecorded(SectionId),
    /// The record was mutated after completion.
    #[error("{0} is already complete")]
    AlreadyCompleted(WaveId),
}

/// Description of one wave instance.
///
/// Created when a trigger fires, appended to while the wave propagates, and
/// sealed exactly once by [`WaveRecord::complete`]. A sealed record rejects
/// every further mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveRecord {
    id: WaveId,
    kind: WaveKind,
    origin: SectionId,
    path: Vec<SectionId>,
    direction: WaveDirection,
    created_at: Duration,
    completed_at: Option<Duration>,
    results: Vec<SectionResult>,
}

impl WaveRecord {
    /// Creates a record after validating the path invariants.
    pub fn new(
        id: WaveId,
        kind: WaveKind,
        origin: SectionId,
        path: Vec<SectionId>,
        direction: WaveDirection,
        created_at: Duration,
    ) -> Result<Self, RecordError> {
        let Some(&first) = path.first() else {
            return Err(RecordError::EmptyPath);
        };
        if first != origin {
            return Err(RecordError::PathMustStartAtOrigin { origin, first });
        }

        let mut seen = HashSet::with_capacity(path.len());
        for section in &path {
            if !seen.insert(*section) {
                return Err(RecordError::DuplicateSection(*section));
            }
        }

        Ok(Self {
            id,
            kind,
            origin,
            path,
            direction,
            created_at,
            completed_at: None,
            results: Vec::new(),
        })
    }

    /// Identifier of the wave.
    #[must_use]
    pub const fn id(&self) -> WaveId {
        self.id
    }

    /// Scoring flavour of the wave.
    #[must_use]
    pub const fn kind(&self) -> WaveKind {
        self.kind
    }

    /// Section the wave started from.
    #[must_use]
    pub const fn origin(&self) -> SectionId {
        self.origin
    }

    /// Ordered sections the wave travels through, origin first.
    #[must_use]
    pub fn path(&self) -> &[SectionId] {
        &self.path
    }

    /// Direction of travel.
    #[must_use]
    pub const fn direction(&self) -> WaveDirection {
        self.direction
    }

    /// Session time at which the wave was created.
    #[must_use]
    pub const fn created_at(&self) -> Duration {
        self.created_at
    }

    /// Session time at which the wave completed, if it has.
    #[must_use]
    pub const fn completed_at(&self) -> Option<Duration> {
        self.completed_at
    }

    /// Per-section outcomes. Recording order while the wave runs, path order
    /// once the record is sealed.
    #[must_use]
    pub fn results(&self) -> &[SectionResult] {
        &self.results
    }

    /// Reports whether the record has been sealed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// A wave succeeds when no recorded section died.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.results
            .iter()
            .all(|result| result.outcome != Outcome::Death)
    }

    /// Reports whether an outcome is already recorded for `section`.
    #[must_use]
    pub fn has_result_for(&self, section: SectionId) -> bool {
        self.results.iter().any(|result| result.section == section)
    }

    /// Path sections without a recorded outcome, in path order.
    pub fn pending_sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.path
            .iter()
            .copied()
            .filter(|section| !self.has_result_for(*section))
    }

    /// Appends the outcome for one path section.
    pub fn record_outcome(&mut self, result: SectionResult) -> Result<(), RecordError> {
        if self.is_complete() {
            return Err(RecordError::AlreadyCompleted(self.id));
        }
        if !self.path.contains(&result.section) {
            return Err(RecordError::SectionNotOnPath(result.section));
        }
        if self.has_result_for(result.section) {
            return Err(RecordError::OutcomeAlreadyRecorded(result.section));
        }
        self.results.push(result);
        Ok(())
    }

    /// Seals the record and puts its results in path order. Succeeds exactly
    /// once.
    pub fn complete(&mut self, at: Duration) -> Result<(), RecordError> {
        if self.is_complete() {
            return Err(RecordError::AlreadyCompleted(self.id));
        }
        let path = &self.path;
        self.results.sort_by_key(|result| {
            path.iter()
                .position(|section| *section == result.section)
                .unwrap_or(usize::MAX)
        });
        self.completed_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u32]) -> Vec<SectionId> {
        values.iter().copied().map(SectionId::new).collect()
    }

    fn record(path: &[u32]) -> Result<WaveRecord, RecordError> {
        WaveRecord::new(
            WaveId::new(1),
            WaveKind::Normal,
            SectionId::new(path.first().copied().unwrap_or(0)),
            ids(path),
            WaveDirection::Forward,
            Duration::from_secs(3),
        )
    }

    fn result(section: u32, outcome: Outcome) -> SectionResult {
        SectionResult {
            section: SectionId::new(section),
            outcome,
            participation: 0.5,
        }
    }

    #[test]
    fn rejects_empty_path() {
        let error = WaveRecord::new(
            WaveId::new(1),
            WaveKind::Normal,
            SectionId::new(0),
            Vec::new(),
            WaveDirection::Forward,
            Duration::ZERO,
        )
        .expect_err("empty path must be rejected");
        assert_eq!(error, RecordError::EmptyPath);
    }

    #[test]
    fn rejects_path_not_starting_at_origin() {
        let error = WaveRecord::new(
            WaveId::new(1),
            WaveKind::Normal,
            SectionId::new(2),
            ids(&[1, 2]),
            WaveDirection::Forward,
            Duration::ZERO,
        )
        .expect_err("origin mismatch must be rejected");
        assert!(matches!(error, RecordError::PathMustStartAtOrigin { .. }));
    }

    #[test]
    fn rejects_duplicate_sections() {
        let error = record(&[1, 2, 1]).expect_err("duplicate must be rejected");
        assert_eq!(error, RecordError::DuplicateSection(SectionId::new(1)));
    }

    #[test]
    fn outcomes_never_exceed_path_length() {
        let mut wave = record(&[1, 2]).expect("valid record");
        wave.record_outcome(result(1, Outcome::Success))
            .expect("first outcome");
        assert_eq!(
            wave.record_outcome(result(1, Outcome::Death)),
            Err(RecordError::OutcomeAlreadyRecorded(SectionId::new(1)))
        );
        assert_eq!(
            wave.record_outcome(result(9, Outcome::Death)),
            Err(RecordError::SectionNotOnPath(SectionId::new(9)))
        );
        wave.record_outcome(result(2, Outcome::Sputter))
            .expect("second outcome");
        assert_eq!(wave.results().len(), wave.path().len());
        assert_eq!(wave.pending_sections().count(), 0);
    }

    #[test]
    fn completion_is_set_exactly_once() {
        let mut wave = record(&[4]).expect("valid record");
        wave.complete(Duration::from_secs(9)).expect("first completion");
        assert_eq!(wave.completed_at(), Some(Duration::from_secs(9)));
        assert_eq!(
            wave.complete(Duration::from_secs(10)),
            Err(RecordError::AlreadyCompleted(WaveId::new(1)))
        );
        assert_eq!(
            wave.record_outcome(result(4, Outcome::Success)),
            Err(RecordError::AlreadyCompleted(WaveId::new(1)))
        );
        assert_eq!(wave.completed_at(), Some(Duration::from_secs(9)));
    }

    #[test]
    fn success_requires_no_death() {
        let mut wave = record(&[1, 2]).expect("valid record");
        wave.record_outcome(result(1, Outcome::Sputter))
            .expect("outcome");
        assert!(wave.succeeded());
        wave.record_outcome(result(2, Outcome::Death)).expect("outcome");
        assert!(!wave.succeeded());
    }

    #[test]
    fn sealing_sorts_results_into_path_order() {
        let mut wave = record(&[5, 6, 7]).expect("valid record");
        wave.record_outcome(result(5, Outcome::Success))
            .expect("outcome");
        wave.record_outcome(result(7, Outcome::Sputter))
            .expect("outcome");
        wave.record_outcome(result(6, Outcome::Death)).expect("outcome");
        let recorded: Vec<u32> = wave.results().iter().map(|r| r.section.get()).collect();
        assert_eq!(recorded, vec![5, 7, 6]);

        wave.complete(Duration::from_secs(2)).expect("complete");
        let sealed: Vec<u32> = wave.results().iter().map(|r| r.section.get()).collect();
        assert_eq!(sealed, vec![5, 6, 7]);
    }

    #[test]
    fn sealed_record_round_trips_through_bincode() {
        let mut wave = record(&[3, 4]).expect("valid record");
        wave.record_outcome(result(3, Outcome::Success))
            .expect("outcome");
        wave.complete(Duration::from_millis(4_250)).expect("complete");
        let bytes = bincode::serialize(&wave).expect("serialize");
        let restored: WaveRecord = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, wave);
    }
}
