#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Strength momentum model for the active wave.
//!
//! Strength is a scalar in `[0, 100]` owned by the currently active wave. It
//! starts at a configured value, moves after every completed section according
//! to the previous and current section outcomes, and is discarded when the
//! wave ends. The transition is a pure function of the previous
//! [`MomentumState`] and the new observation; [`StrengthMomentum`] only adds
//! booster bookkeeping on top.

use crowd_wave_core::Outcome;
use serde::Deserialize;

/// Lowest strength a wave can have.
pub const MIN_STRENGTH: f32 = 0.0;
/// Highest strength a wave can have.
pub const MAX_STRENGTH: f32 = 100.0;

/// Tuning knobs for the strength transition rule.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MomentumTuning {
    /// Strength every wave starts with.
    pub starting_strength: f32,
    /// Flat bonus for chaining two successful sections.
    pub base_success_bonus: f32,
    /// Extra bonus per section already in the success streak.
    pub per_streak_bonus: f32,
    /// Upper bound on the streak-scaled part of the bonus.
    pub consecutive_bonus_cap: f32,
    /// Strength lost when a success is followed by a sputter.
    pub success_to_sputter_penalty: f32,
    /// Strength lost when a success is followed by a death.
    pub success_to_death_penalty: f32,
    /// Participation at or above which a struggling wave recovers.
    pub recovery_rate: f32,
    /// Participation below which a struggling wave collapses.
    pub collapse_rate: f32,
    /// Gain when a sputtering wave recovers.
    pub sputter_recovery_bonus: f32,
    /// Loss while a wave keeps sputtering.
    pub sputter_hold_penalty: f32,
    /// Loss when a sputtering wave collapses.
    pub sputter_collapse_penalty: f32,
    /// Gain when a dead wave recovers.
    pub death_recovery_bonus: f32,
    /// Loss while a dead wave limps on.
    pub death_hold_penalty: f32,
    /// Loss while a dead wave stays low.
    pub death_low_penalty: f32,
    /// Multiplier percents granted by each booster.
    pub boosters: BoosterTuning,
}

impl Default for MomentumTuning {
    fn default() -> Self {
        Self {
            starting_strength: 50.0,
            base_success_bonus: 5.0,
            per_streak_bonus: 2.0,
            consecutive_bonus_cap: 10.0,
            success_to_sputter_penalty: 15.0,
            success_to_death_penalty: 30.0,
            recovery_rate: 0.6,
            collapse_rate: 0.4,
            sputter_recovery_bonus: 10.0,
            sputter_hold_penalty: 8.0,
            sputter_collapse_penalty: 25.0,
            death_recovery_bonus: 15.0,
            death_hold_penalty: 10.0,
            death_low_penalty: 5.0,
            boosters: BoosterTuning::default(),
        }
    }
}

impl MomentumTuning {
    /// Reports the first inconsistency in the tuning, if any.
    #[must_use]
    pub fn problem(&self) -> Option<String> {
        if !(MIN_STRENGTH..=MAX_STRENGTH).contains(&self.starting_strength) {
            return Some(format!(
                "starting_strength {} outside [0, 100]",
                self.starting_strength
            ));
        }
        if self.collapse_rate > self.recovery_rate {
            return Some(format!(
                "collapse_rate {} must not exceed recovery_rate {}",
                self.collapse_rate, self.recovery_rate
            ));
        }
        self.boosters.problem()
    }
}

/// Wave-only boosters that scale positive strength gains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoosterKind {
    /// The mascot runs the aisles.
    Mascot,
    /// The big screen cheers the crowd on.
    Jumbotron,
    /// Cheerleaders lead the section.
    CheerSquad,
}

/// Percent granted by each booster, e.g. `0.2` for a `1.2` multiplier.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoosterTuning {
    /// Percent granted by [`BoosterKind::Mascot`].
    pub mascot: f32,
    /// Percent granted by [`BoosterKind::Jumbotron`].
    pub jumbotron: f32,
    /// Percent granted by [`BoosterKind::CheerSquad`].
    pub cheer_squad: f32,
}

impl Default for BoosterTuning {
    fn default() -> Self {
        Self {
            mascot: 0.2,
            jumbotron: 0.15,
            cheer_squad: 0.3,
        }
    }
}

impl BoosterTuning {
    /// Configured percent for `kind`.
    #[must_use]
    pub fn percent(&self, kind: BoosterKind) -> f32 {
        match kind {
            BoosterKind::Mascot => self.mascot,
            BoosterKind::Jumbotron => self.jumbotron,
            BoosterKind::CheerSquad => self.cheer_squad,
        }
    }

    fn problem(&self) -> Option<String> {
        [
            ("mascot", self.mascot),
            ("jumbotron", self.jumbotron),
            ("cheer_squad", self.cheer_squad),
        ]
        .into_iter()
        .find(|(_, percent)| *percent < 0.0)
        .map(|(name, percent)| format!("booster {name} percent {percent} is negative"))
    }
}

/// Momentum state carried between sections of one wave.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumState {
    /// Current strength in `[0, 100]`.
    pub strength: f32,
    /// Outcome of the previous section, `None` before the first section.
    pub last: Option<Outcome>,
    /// Number of consecutive successful sections.
    pub streak: u32,
}

impl MomentumState {
    /// Fresh state for a new wave.
    #[must_use]
    pub fn starting(strength: f32) -> Self {
        Self {
            strength: clamp_strength(strength),
            last: None,
            streak: 0,
        }
    }
}

/// Clamps a strength value into `[MIN_STRENGTH, MAX_STRENGTH]`.
#[must_use]
pub fn clamp_strength(value: f32) -> f32 {
    if value.is_nan() {
        return MIN_STRENGTH;
    }
    value.clamp(MIN_STRENGTH, MAX_STRENGTH)
}

/// Applies one section observation to `state`.
///
/// The first section of a wave is judged as if it followed a success.
#[must_use]
pub fn transition(
    state: MomentumState,
    tuning: &MomentumTuning,
    outcome: Outcome,
    participation: f32,
    booster_multiplier: f32,
) -> MomentumState {
    let mut streak = state.streak;
    let delta = match state.last.unwrap_or(Outcome::Success) {
        Outcome::Success => match outcome {
            Outcome::Success => {
                let streak_bonus =
                    (streak as f32 * tuning.per_streak_bonus).min(tuning.consecutive_bonus_cap);
                streak = streak.saturating_add(1);
                (tuning.base_success_bonus + streak_bonus) * booster_multiplier
            }
            Outcome::Sputter => {
                streak = 0;
                -tuning.success_to_sputter_penalty
            }
            Outcome::Death => {
                streak = 0;
                -tuning.success_to_death_penalty
            }
        },
        Outcome::Sputter => {
            if participation >= tuning.recovery_rate {
                tuning.sputter_recovery_bonus * booster_multiplier
            } else if participation >= tuning.collapse_rate {
                -tuning.sputter_hold_penalty
            } else {
                streak = 0;
                -tuning.sputter_collapse_penalty
            }
        }
        Outcome::Death => {
            streak = 0;
            if participation >= tuning.recovery_rate {
                tuning.death_recovery_bonus * booster_multiplier
            } else if participation >= tuning.collapse_rate {
                -tuning.death_hold_penalty
            } else {
                -tuning.death_low_penalty
            }
        }
    };

    MomentumState {
        strength: clamp_strength(state.strength + delta),
        last: Some(outcome),
        streak,
    }
}

/// Strength before and after one update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrengthChange {
    /// Strength before the update.
    pub previous: f32,
    /// Strength after the update.
    pub current: f32,
}

impl StrengthChange {
    /// Whether the update moved the strength at all.
    #[must_use]
    pub fn changed(&self) -> bool {
        (self.current - self.previous).abs() > f32::EPSILON
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveBooster {
    kind: BoosterKind,
    percent: f32,
}

/// Strength owner for the active wave.
#[derive(Clone, Debug)]
pub struct StrengthMomentum {
    tuning: MomentumTuning,
    state: MomentumState,
    booster: Option<ActiveBooster>,
}

impl Default for StrengthMomentum {
    fn default() -> Self {
        Self::new(MomentumTuning::default())
    }
}

impl StrengthMomentum {
    /// Creates a model resting at the configured starting strength.
    #[must_use]
    pub fn new(tuning: MomentumTuning) -> Self {
        let state = MomentumState::starting(tuning.starting_strength);
        Self {
            tuning,
            state,
            booster: None,
        }
    }

    /// Active tuning.
    #[must_use]
    pub fn tuning(&self) -> &MomentumTuning {
        &self.tuning
    }

    /// Current strength.
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.state.strength
    }

    /// Full momentum state.
    #[must_use]
    pub fn state(&self) -> MomentumState {
        self.state
    }

    /// Starts a new wave at the configured strength plus an additive bonus.
    pub fn reset(&mut self, bonus: f32) -> StrengthChange {
        let previous = self.state.strength;
        self.state = MomentumState::starting(self.tuning.starting_strength + bonus);
        StrengthChange {
            previous,
            current: self.state.strength,
        }
    }

    /// Feeds one completed section into the model.
    pub fn observe(&mut self, outcome: Outcome, participation: f32) -> StrengthChange {
        let previous = self.state.strength;
        self.state = transition(
            self.state,
            &self.tuning,
            outcome,
            participation,
            self.booster_multiplier(),
        );
        StrengthChange {
            previous,
            current: self.state.strength,
        }
    }

    /// Activates a booster, replacing any booster already active.
    pub fn apply_booster(&mut self, kind: BoosterKind) {
        self.booster = Some(ActiveBooster {
            kind,
            percent: self.tuning.boosters.percent(kind),
        });
    }

    /// Removes the active booster.
    pub fn clear_booster(&mut self) {
        self.booster = None;
    }

    /// Booster currently active, if any.
    #[must_use]
    pub fn active_booster(&self) -> Option<BoosterKind> {
        self.booster.map(|booster| booster.kind)
    }

    /// Multiplier applied to positive strength gains; exactly `1.0` without a booster.
    #[must_use]
    pub fn booster_multiplier(&self) -> f32 {
        self.booster
            .map_or(1.0, |booster| 1.0 + booster.percent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAST_STATES: [Option<Outcome>; 4] = [
        None,
        Some(Outcome::Success),
        Some(Outcome::Sputter),
        Some(Outcome::Death),
    ];
    const RATES: [f32; 7] = [0.0, 0.2, 0.39, 0.4, 0.5, 0.6, 1.0];

    fn state(strength: f32, last: Option<Outcome>, streak: u32) -> MomentumState {
        MomentumState {
            strength,
            last,
            streak,
        }
    }

    #[test]
    fn strength_stays_bounded_for_every_combination() {
        let tuning = MomentumTuning::default();
        for strength in [0.0, 1.0, 50.0, 99.0, 100.0] {
            for last in LAST_STATES {
                for outcome in Outcome::PRIORITY {
                    for rate in RATES {
                        for multiplier in [1.0, 1.3, 5.0] {
                            for streak in [0, 3, 40] {
                                let next = transition(
                                    state(strength, last, streak),
                                    &tuning,
                                    outcome,
                                    rate,
                                    multiplier,
                                );
                                assert!(
                                    (MIN_STRENGTH..=MAX_STRENGTH).contains(&next.strength),
                                    "{strength} {last:?} {outcome:?} {rate} -> {}",
                                    next.strength
                                );
                                assert_eq!(next.last, Some(outcome));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn success_streak_bonus_is_capped() {
        let tuning = MomentumTuning::default();
        let first = transition(
            state(50.0, Some(Outcome::Success), 0),
            &tuning,
            Outcome::Success,
            0.9,
            1.0,
        );
        assert!((first.strength - 55.0).abs() < 1e-4);
        assert_eq!(first.streak, 1);

        let capped = transition(
            state(50.0, Some(Outcome::Success), 20),
            &tuning,
            Outcome::Success,
            0.9,
            1.0,
        );
        assert!((capped.strength - 65.0).abs() < 1e-4);
        assert_eq!(capped.streak, 21);

        let boosted = transition(
            state(50.0, Some(Outcome::Success), 2),
            &tuning,
            Outcome::Success,
            0.9,
            1.5,
        );
        assert!((boosted.strength - 63.5).abs() < 1e-4);
    }

    #[test]
    fn success_penalties_reset_streak() {
        let tuning = MomentumTuning::default();
        let sputter = transition(
            state(50.0, Some(Outcome::Success), 4),
            &tuning,
            Outcome::Sputter,
            0.5,
            1.0,
        );
        assert!((sputter.strength - 35.0).abs() < 1e-4);
        assert_eq!(sputter.streak, 0);

        let death = transition(
            state(50.0, Some(Outcome::Success), 4),
            &tuning,
            Outcome::Death,
            0.1,
            1.0,
        );
        assert!((death.strength - 20.0).abs() < 1e-4);
        assert_eq!(death.streak, 0);
    }

    #[test]
    fn sputter_branches_on_participation() {
        let tuning = MomentumTuning::default();
        let last = Some(Outcome::Sputter);
        let recover = transition(state(40.0, last, 0), &tuning, Outcome::Success, 0.6, 1.2);
        assert!((recover.strength - 52.0).abs() < 1e-4);
        let hold = transition(state(40.0, last, 0), &tuning, Outcome::Sputter, 0.5, 1.2);
        assert!((hold.strength - 32.0).abs() < 1e-4);
        let collapse = transition(state(40.0, last, 2), &tuning, Outcome::Death, 0.2, 1.2);
        assert!((collapse.strength - 15.0).abs() < 1e-4);
        assert_eq!(collapse.streak, 0);
    }

    #[test]
    fn death_branches_on_participation() {
        let tuning = MomentumTuning::default();
        let last = Some(Outcome::Death);
        let recover = transition(state(20.0, last, 1), &tuning, Outcome::Success, 0.7, 1.0);
        assert!((recover.strength - 35.0).abs() < 1e-4);
        assert_eq!(recover.streak, 0);
        let limp = transition(state(20.0, last, 0), &tuning, Outcome::Sputter, 0.45, 1.0);
        assert!((limp.strength - 10.0).abs() < 1e-4);
        let low = transition(state(3.0, last, 0), &tuning, Outcome::Death, 0.1, 1.0);
        assert_eq!(low.strength, 0.0);
    }

    #[test]
    fn booster_round_trip_restores_unit_multiplier() {
        let mut momentum = StrengthMomentum::default();
        let _ = momentum.reset(0.0);
        assert_eq!(momentum.strength(), 50.0);
        momentum.apply_booster(BoosterKind::Mascot);
        assert!((momentum.booster_multiplier() - 1.2).abs() < 1e-6);
        momentum.clear_booster();
        assert_eq!(momentum.booster_multiplier(), 1.0);
    }

    #[test]
    fn boosters_replace_rather_than_stack() {
        let mut momentum = StrengthMomentum::default();
        momentum.apply_booster(BoosterKind::CheerSquad);
        momentum.apply_booster(BoosterKind::Jumbotron);
        assert_eq!(momentum.active_booster(), Some(BoosterKind::Jumbotron));
        assert!((momentum.booster_multiplier() - 1.15).abs() < 1e-6);
    }

    #[test]
    fn reset_discards_previous_wave() {
        let mut momentum = StrengthMomentum::default();
        let _ = momentum.observe(Outcome::Death, 0.0);
        assert!(momentum.strength() < 50.0);
        let change = momentum.reset(10.0);
        assert!(change.changed());
        assert_eq!(momentum.strength(), 60.0);
        assert_eq!(momentum.state().last, None);
        assert_eq!(momentum.state().streak, 0);
        let _ = momentum.reset(500.0);
        assert_eq!(momentum.strength(), 100.0);
    }
}
