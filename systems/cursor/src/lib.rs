#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Continuous propagation cursor that fires discrete column events.
//!
//! The cursor moves along a single axis at a speed derived from the live wave
//! strength. Fixed column boundaries are consumed strictly in order, exactly
//! once each, no matter how far a single tick moves the cursor. Section
//! enter/exit notifications are derived from coordinate containment and are
//! evaluated at every boundary the cursor snaps to as well as at the final
//! position of the tick.

use std::time::Duration;

use crowd_wave_core::{ColumnBoundary, SectionId, WaveDirection};
use serde::Deserialize;
use thiserror::Error;

/// Maps wave strength to cursor speed in world units per second.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeedProfile {
    /// Speed at zero strength before clamping.
    pub base_speed: f32,
    /// Speed gained per strength point.
    pub strength_multiplier: f32,
    /// Lower speed clamp. Must be positive so the cursor always progresses.
    pub min_speed: f32,
    /// Upper speed clamp.
    pub max_speed: f32,
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self {
            base_speed: 6.0,
            strength_multiplier: 0.08,
            min_speed: 4.0,
            max_speed: 16.0,
        }
    }
}

impl SpeedProfile {
    /// Speed for the provided strength.
    #[must_use]
    pub fn speed_for(&self, strength: f32) -> f32 {
        (self.base_speed + strength * self.strength_multiplier).clamp(self.min_speed, self.max_speed)
    }

    /// Reports the first inconsistency in the profile, if any.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        if !(self.min_speed > 0.0) {
            return Some(format!("min_speed {} must be positive", self.min_speed));
        }
        if self.max_speed < self.min_speed {
            return Some(format!(
                "max_speed {} below min_speed {}",
                self.max_speed, self.min_speed
            ));
        }
        None
    }
}

/// Violations of the cursor construction contract.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CursorError {
    /// The track has no column boundaries.
    #[error("column sequence is empty")]
    EmptyColumnSequence,
    /// A coordinate was NaN or infinite.
    #[error("boundary {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending boundary.
        index: usize,
    },
    /// Boundaries must be ordered for the direction of travel.
    #[error("boundary {index} runs against the direction of travel")]
    OutOfOrder {
        /// Position of the offending boundary.
        index: usize,
    },
    /// A boundary references a section without a span.
    #[error("{0} has no span on the cursor track")]
    MissingSpan(SectionId),
    /// A span has a non-finite or inverted range.
    #[error("{0} has an invalid span")]
    InvalidSpan(SectionId),
}

/// Coordinate range covered by one section on the cursor track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionSpan {
    /// Section the span belongs to.
    pub section: SectionId,
    /// Smallest coordinate covered.
    pub low: f32,
    /// Largest coordinate covered.
    pub high: f32,
}

impl SectionSpan {
    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, position: f32) -> bool {
        position >= self.low && position <= self.high
    }

    fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }

    fn leading_edge(&self, direction: WaveDirection) -> f32 {
        match direction {
            WaveDirection::Forward => self.low,
            WaveDirection::Backward => self.high,
        }
    }

    fn trailing_edge(&self, direction: WaveDirection) -> f32 {
        match direction {
            WaveDirection::Forward => self.high,
            WaveDirection::Backward => self.low,
        }
    }
}

/// Validated geometry the cursor travels along.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorTrack {
    direction: WaveDirection,
    boundaries: Vec<ColumnBoundary>,
    spans: Vec<SectionSpan>,
}

impl CursorTrack {
    /// Builds a track from explicit spans, in path order.
    pub fn new(
        direction: WaveDirection,
        boundaries: Vec<ColumnBoundary>,
        spans: Vec<SectionSpan>,
    ) -> Result<Self, CursorError> {
        if boundaries.is_empty() {
            return Err(CursorError::EmptyColumnSequence);
        }

        for (index, boundary) in boundaries.iter().enumerate() {
            if !boundary.world_x.is_finite() {
                return Err(CursorError::NonFiniteCoordinate { index });
            }
            if index > 0 {
                let previous = boundaries[index - 1].world_x;
                if !direction.has_reached(boundary.world_x, previous) {
                    return Err(CursorError::OutOfOrder { index });
                }
            }
        }

        for span in &spans {
            if !span.is_valid() {
                return Err(CursorError::InvalidSpan(span.section));
            }
        }

        for boundary in &boundaries {
            let covered = spans
                .iter()
                .any(|span| span.section == boundary.section && span.contains(boundary.world_x));
            if !covered {
                return Err(CursorError::MissingSpan(boundary.section));
            }
        }

        Ok(Self {
            direction,
            boundaries,
            spans,
        })
    }

    /// Builds a track, deriving each section's span from its boundaries.
    ///
    /// A section's span covers its outermost boundaries plus half a column
    /// pitch on either side. `pitch_of` supplies the pitch; when it yields
    /// nothing usable the smallest gap between the section's boundaries is
    /// used, falling back to one world unit.
    pub fn from_boundaries<F>(
        direction: WaveDirection,
        boundaries: Vec<ColumnBoundary>,
        pitch_of: F,
    ) -> Result<Self, CursorError>
    where
        F: Fn(SectionId) -> Option<f32>,
    {
        let mut spans: Vec<SectionSpan> = Vec::new();
        let mut order: Vec<(SectionId, Vec<f32>)> = Vec::new();
        for boundary in &boundaries {
            match order.iter_mut().find(|(section, _)| *section == boundary.section) {
                Some((_, xs)) => xs.push(boundary.world_x),
                None => order.push((boundary.section, vec![boundary.world_x])),
            }
        }

        for (section, xs) in order {
            let low = xs.iter().copied().fold(f32::INFINITY, f32::min);
            let high = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let pitch = pitch_of(section)
                .filter(|pitch| pitch.is_finite() && *pitch > 0.0)
                .or_else(|| smallest_gap(&xs))
                .unwrap_or(1.0);
            spans.push(SectionSpan {
                section,
                low: low - pitch * 0.5,
                high: high + pitch * 0.5,
            });
        }

        Self::new(direction, boundaries, spans)
    }

    /// Direction of travel.
    #[must_use]
    pub const fn direction(&self) -> WaveDirection {
        self.direction
    }

    /// Column boundaries in crossing order.
    #[must_use]
    pub fn boundaries(&self) -> &[ColumnBoundary] {
        &self.boundaries
    }

    /// Section spans in path order.
    #[must_use]
    pub fn spans(&self) -> &[SectionSpan] {
        &self.spans
    }

    /// Where the cursor starts: the leading edge of the first boundary's section.
    #[must_use]
    pub fn start(&self) -> f32 {
        let first = self.boundaries[0];
        self.span_for(first.section)
            .map_or(first.world_x, |span| span.leading_edge(self.direction))
    }

    /// Where the cursor stops: the trailing edge of the last boundary's section.
    #[must_use]
    pub fn target(&self) -> f32 {
        let last = self.boundaries[self.boundaries.len() - 1];
        self.span_for(last.section)
            .map_or(last.world_x, |span| span.trailing_edge(self.direction))
    }

    fn span_for(&self, section: SectionId) -> Option<&SectionSpan> {
        self.spans.iter().find(|span| span.section == section)
    }

    fn containing_section(&self, position: f32) -> Option<SectionId> {
        self.spans
            .iter()
            .rev()
            .find(|span| span.contains(position))
            .map(|span| span.section)
    }
}

fn smallest_gap(xs: &[f32]) -> Option<f32> {
    xs.windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .filter(|gap| *gap > f32::EPSILON)
        .fold(None, |smallest: Option<f32>, gap| {
            Some(smallest.map_or(gap, |current| current.min(gap)))
        })
}

/// Notifications produced while the cursor advances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CursorEvent {
    /// The cursor moved into a section's span.
    SectionEntered {
        /// Section that was entered.
        section: SectionId,
    },
    /// The cursor crossed a column boundary.
    ColumnReached {
        /// Boundary that was crossed.
        boundary: ColumnBoundary,
        /// Position of the boundary in the crossing order.
        ordinal: usize,
    },
    /// The cursor left a section's span.
    SectionExited {
        /// Section that was left.
        section: SectionId,
    },
    /// Every boundary was consumed and the cursor reached its target.
    Completed,
}

/// Continuously-moving cursor along a [`CursorTrack`].
#[derive(Clone, Debug)]
pub struct PropagationCursor {
    track: CursorTrack,
    speed: SpeedProfile,
    position: f32,
    next_boundary: usize,
    entered: Vec<SectionId>,
    completed: bool,
}

impl PropagationCursor {
    /// Places a cursor at the start of `track`.
    #[must_use]
    pub fn new(track: CursorTrack, speed: SpeedProfile) -> Self {
        let position = track.start();
        Self {
            track,
            speed,
            position,
            next_boundary: 0,
            entered: Vec::new(),
            completed: false,
        }
    }

    /// Track the cursor travels along.
    #[must_use]
    pub fn track(&self) -> &CursorTrack {
        &self.track
    }

    /// Current coordinate.
    #[must_use]
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Number of boundaries already fired.
    #[must_use]
    pub fn boundaries_consumed(&self) -> usize {
        self.next_boundary
    }

    /// Fraction of boundaries fired, in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.next_boundary as f32 / self.track.boundaries.len() as f32
    }

    /// Whether the terminal event has fired.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Sections currently entered and not yet exited.
    #[must_use]
    pub fn entered_sections(&self) -> &[SectionId] {
        &self.entered
    }

    /// Rewinds the cursor to the start of its track.
    pub fn reset(&mut self) {
        self.position = self.track.start();
        self.next_boundary = 0;
        self.entered.clear();
        self.completed = false;
    }

    /// Advances the cursor by `dt` at the speed implied by `strength`.
    pub fn advance(&mut self, dt: Duration, strength: f32, out: &mut Vec<CursorEvent>) {
        if self.completed {
            return;
        }

        let direction = self.track.direction;
        let target = self.track.target();
        let step = self.speed.speed_for(strength) * dt.as_secs_f32();
        let mut destination = self.position + direction.sign() * step;
        if direction.has_reached(destination, target) {
            destination = target;
        }

        while let Some(boundary) = self.track.boundaries.get(self.next_boundary).copied() {
            if !direction.has_reached(destination, boundary.world_x) {
                break;
            }
            self.position = boundary.world_x;
            self.sync_sections(out);
            out.push(CursorEvent::ColumnReached {
                boundary,
                ordinal: self.next_boundary,
            });
            self.next_boundary += 1;
        }

        self.position = destination;
        self.sync_sections(out);

        if self.next_boundary == self.track.boundaries.len()
            && direction.has_reached(self.position, target)
        {
            self.completed = true;
            out.push(CursorEvent::Completed);
        }
    }

    fn sync_sections(&mut self, out: &mut Vec<CursorEvent>) {
        let current = self.track.containing_section(self.position);

        let mut index = 0;
        while index < self.entered.len() {
            let section = self.entered[index];
            if Some(section) == current {
                index += 1;
            } else {
                let _ = self.entered.remove(index);
                out.push(CursorEvent::SectionExited { section });
            }
        }

        if let Some(section) = current {
            if !self.entered.contains(&section) {
                self.entered.push(section);
                out.push(CursorEvent::SectionEntered { section });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_clamped() {
        let profile = SpeedProfile::default();
        assert_eq!(profile.speed_for(0.0), 6.0);
        assert!((profile.speed_for(50.0) - 10.0).abs() < 1e-5);
        assert_eq!(profile.speed_for(500.0), 16.0);
        let slow = SpeedProfile {
            base_speed: 1.0,
            ..SpeedProfile::default()
        };
        assert_eq!(slow.speed_for(0.0), 4.0);
    }

    #[test]
    fn profile_rejects_non_positive_minimum() {
        let profile = SpeedProfile {
            min_speed: 0.0,
            ..SpeedProfile::default()
        };
        assert!(profile.problem().is_some());
        assert!(SpeedProfile::default().problem().is_none());
    }

    #[test]
    fn smallest_gap_ignores_duplicates() {
        assert_eq!(smallest_gap(&[0.0, 0.0, 2.0, 3.0]), Some(1.0));
        assert_eq!(smallest_gap(&[4.0]), None);
    }
}
