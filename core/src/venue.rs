//! Narrow interfaces through which the wave engine consumes its venue.
//!
//! The engine never mutates section or fan state directly. Section aggregates
//! are read through [`SectionStatsProvider`], seats are resolved through
//! [`SeatColumns`], and world geometry comes from an optional
//! [`SpatialMapping`]. A [`Venue`] bundles all three.

use crate::{
    clamp_stat, ColumnBoundary, RandomSource, SectionBounds, SectionId, SectionStats,
    WaveDirection, STAT_MAX,
};

/// Read-only access to per-section aggregates.
pub trait SectionStatsProvider {
    /// Every section in layout order (left to right).
    fn list_sections(&self) -> Vec<SectionStats>;

    /// Mean happiness of the section, or `None` for unknown sections.
    fn average_happiness(&self, section: SectionId) -> Option<f32>;

    /// Aggregates of a single section.
    fn section_stats(&self, section: SectionId) -> Option<SectionStats> {
        self.list_sections()
            .into_iter()
            .find(|stats| stats.id == section)
    }
}

/// A seated fan as seen by the wave engine.
///
/// The wave-scoped fields (strength modifier, participation, reduced effort,
/// animation) are written at most once per wave pass and cleared by
/// [`FanParticipant::reset_wave_state`] before the next wave.
pub trait FanParticipant {
    /// Personal participation chance derived from the fan's own stats, on a `0..=100` scale.
    fn personal_chance(&self) -> f32;

    /// Transient bias applied by the current wave strength.
    fn strength_modifier(&self) -> f32;

    /// Sets the transient wave strength bias.
    fn set_strength_modifier(&mut self, value: f32);

    /// Whether the fan stands for the current column.
    fn will_participate(&self) -> bool;

    /// Records whether the fan stands for the current column.
    fn set_will_participate(&mut self, value: bool);

    /// Whether the fan was pulled up by peer pressure.
    fn reduced_effort(&self) -> bool;

    /// Flags the fan as standing at reduced effort.
    fn set_reduced_effort(&mut self, value: bool);

    /// Toggles the cosmetic "standing animation" state.
    fn set_animating(&mut self, value: bool);

    /// Clears every wave-scoped field.
    fn reset_wave_state(&mut self);

    /// Combined chance: personal formula, section bonus and strength bias, clamped to `[0, 100]`.
    fn participation_chance(&self, section_bonus: f32) -> f32 {
        clamp_stat(self.personal_chance() + section_bonus + self.strength_modifier())
    }

    /// Rolls participation against one uniform draw.
    fn roll_participation(&mut self, section_bonus: f32, rng: &mut dyn RandomSource) -> bool {
        let chance = self.participation_chance(section_bonus);
        rng.next_unit() * STAT_MAX < chance
    }
}

/// Maps sections to world geometry.
pub trait SpatialMapping {
    /// One boundary per traversed grid column, ordered for `direction`.
    ///
    /// Coordinates must be monotonic in the direction of travel; layouts that
    /// wrap around unroll their coordinates past the jump.
    fn column_sequence_for_path(
        &self,
        path: &[SectionId],
        direction: WaveDirection,
    ) -> Vec<ColumnBoundary>;

    /// World bounds of a section.
    fn bounds_of(&self, section: SectionId) -> Option<SectionBounds>;
}

/// Mutable access to seats, one column at a time.
pub trait SeatColumns {
    /// Occupied seats of one column, top to bottom.
    fn column_fans_mut(&mut self, section: SectionId, column: u32) -> Vec<&mut dyn FanParticipant>;

    /// Clears wave-scoped state on every seated fan.
    fn reset_wave_state(&mut self);

    /// Cosmetic reset once a column's animation finished.
    fn finish_column_animation(&mut self, section: SectionId, column: u32);
}

/// Everything the orchestrator needs from the venue.
pub trait Venue: SectionStatsProvider + SeatColumns {
    /// Spatial mapping, or `None` while the layout is unavailable.
    fn spatial(&self) -> Option<&dyn SpatialMapping>;
}
