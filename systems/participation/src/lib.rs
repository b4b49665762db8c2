#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves which fans stand as the wave crosses a column.

use crowd_wave_core::{
    venue::FanParticipant, ColumnVisualState, Outcome, RandomSource, SectionStats,
};
use serde::Deserialize;

/// Tuning knobs controlling per-column participation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticipationTuning {
    /// Raw rate at or above which a column counts as a success.
    pub success_threshold: f32,
    /// Raw rate at or above which a column sputters instead of dying. Must stay below `success_threshold`.
    pub sputter_threshold: f32,
    /// Raw rate at or above which every straggler is pulled up at reduced effort.
    pub peer_pressure_threshold: f32,
    /// Section bonus gained per happiness point above 50.
    pub happiness_weight: f32,
    /// Section bonus gained per attention point above 50.
    pub attention_weight: f32,
    /// Section bonus lost per thirst point above 50.
    pub thirst_weight: f32,
    /// Participation chance added per strength point above `neutral_strength`.
    pub strength_bias_per_point: f32,
    /// Strength at which the wave neither helps nor hurts participation.
    pub neutral_strength: f32,
}

impl Default for ParticipationTuning {
    fn default() -> Self {
        Self {
            success_threshold: 0.6,
            sputter_threshold: 0.4,
            peer_pressure_threshold: 0.6,
            happiness_weight: 0.25,
            attention_weight: 0.15,
            thirst_weight: 0.1,
            strength_bias_per_point: 0.4,
            neutral_strength: 50.0,
        }
    }
}

impl ParticipationTuning {
    /// Reports the first inconsistency in the tuning, if any.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        let unit = 0.0..=1.0;
        if !unit.contains(&self.success_threshold) {
            return Some(format!(
                "success_threshold {} outside [0, 1]",
                self.success_threshold
            ));
        }
        if !unit.contains(&self.sputter_threshold) {
            return Some(format!(
                "sputter_threshold {} outside [0, 1]",
                self.sputter_threshold
            ));
        }
        if !unit.contains(&self.peer_pressure_threshold) {
            return Some(format!(
                "peer_pressure_threshold {} outside [0, 1]",
                self.peer_pressure_threshold
            ));
        }
        if self.sputter_threshold >= self.success_threshold {
            return Some(format!(
                "sputter_threshold {} must be below success_threshold {}",
                self.sputter_threshold, self.success_threshold
            ));
        }
        None
    }
}

/// Result of resolving a single column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnResolution {
    /// Number of occupied seats in the column.
    pub occupied: usize,
    /// Number of fans whose own roll succeeded.
    pub participants: usize,
    /// `participants / occupied`, or `0.0` for an empty column.
    pub raw_rate: f32,
    /// Number of fans pulled up by peer pressure.
    pub pressured: usize,
}

impl ColumnResolution {
    /// Whether the peer-pressure rule changed anyone's participation.
    #[must_use]
    pub const fn peer_pressure_applied(&self) -> bool {
        self.pressured > 0
    }
}

/// Rolls each seat of a column and applies the peer-pressure escalation.
#[derive(Clone, Debug, Default)]
pub struct ParticipationResolver {
    tuning: ParticipationTuning,
}

impl ParticipationResolver {
    /// Creates a resolver with the provided tuning.
    #[must_use]
    pub fn new(tuning: ParticipationTuning) -> Self {
        Self { tuning }
    }

    /// Active tuning.
    #[must_use]
    pub fn tuning(&self) -> &ParticipationTuning {
        &self.tuning
    }

    /// Bonus every fan of the section receives, scaled by the environmental modifier.
    #[must_use]
    pub fn section_bonus(&self, stats: &SectionStats) -> f32 {
        let tuning = &self.tuning;
        let raw = (stats.happiness - 50.0) * tuning.happiness_weight
            + (stats.attention - 50.0) * tuning.attention_weight
            - (stats.thirst - 50.0) * tuning.thirst_weight;
        raw * stats.environment
    }

    /// Per-fan bias derived from the live wave strength.
    #[must_use]
    pub fn strength_modifier(&self, strength: f32) -> f32 {
        (strength - self.tuning.neutral_strength) * self.tuning.strength_bias_per_point
    }

    /// Resolves one column.
    ///
    /// Every fan is rolled independently first. Only after all rolls, when the
    /// raw rate reaches the peer-pressure threshold, the remaining fans are
    /// forced up and flagged as reduced effort.
    pub fn resolve_column(
        &self,
        fans: &mut [&mut dyn FanParticipant],
        section_bonus: f32,
        strength_modifier: f32,
        rng: &mut dyn RandomSource,
    ) -> ColumnResolution {
        let occupied = fans.len();
        let mut participants = 0;

        for fan in fans.iter_mut() {
            fan.set_strength_modifier(strength_modifier);
            fan.set_reduced_effort(false);
            let stands = fan.roll_participation(section_bonus, rng);
            fan.set_will_participate(stands);
            if stands {
                participants += 1;
            }
        }

        let raw_rate = if occupied == 0 {
            0.0
        } else {
            participants as f32 / occupied as f32
        };

        let mut pressured = 0;
        if occupied > 0 && raw_rate >= self.tuning.peer_pressure_threshold {
            for fan in fans.iter_mut() {
                if !fan.will_participate() {
                    fan.set_will_participate(true);
                    fan.set_reduced_effort(true);
                    pressured += 1;
                }
            }
        }

        for fan in fans.iter_mut() {
            if fan.will_participate() {
                fan.set_animating(true);
            }
        }

        ColumnResolution {
            occupied,
            participants,
            raw_rate,
            pressured,
        }
    }

    /// Classifies a raw participation rate.
    #[must_use]
    pub fn classify(&self, rate: f32) -> Outcome {
        if rate >= self.tuning.success_threshold {
            Outcome::Success
        } else if rate >= self.tuning.sputter_threshold {
            Outcome::Sputter
        } else {
            Outcome::Death
        }
    }

    /// Cosmetic state presented for a resolved column.
    #[must_use]
    pub fn visual_state(resolution: &ColumnResolution, outcome: Outcome) -> ColumnVisualState {
        if resolution.peer_pressure_applied() {
            return ColumnVisualState::PeerPressured;
        }
        match outcome {
            Outcome::Success => ColumnVisualState::Surge,
            Outcome::Sputter => ColumnVisualState::Sputter,
            Outcome::Death => ColumnVisualState::Collapse,
        }
    }
}
