use crowd_wave_core::{Outcome, WaveKind};
use serde::{Deserialize, Serialize};

use crate::config::ScoringTuning;

/// Cumulative score of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    /// Points earned so far.
    pub total_points: f32,
    /// Live multiplier applied to the next successful section.
    pub multiplier: f32,
    /// Sections that ended in success.
    pub successful_sections: u32,
    /// Waves that reached the end of their path.
    pub waves_completed: u32,
    /// Completed waves without a dead section.
    pub waves_succeeded: u32,
    /// Points available had every section of every wave succeeded, streak
    /// multiplier included.
    pub max_possible_score: f32,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            total_points: 0.0,
            multiplier: 1.0,
            successful_sections: 0,
            waves_completed: 0,
            waves_succeeded: 0,
            max_possible_score: 0.0,
        }
    }
}

impl Scoreboard {
    /// Scores one completed section. Returns the points awarded.
    pub fn record_section(
        &mut self,
        outcome: Outcome,
        kind: WaveKind,
        tuning: &ScoringTuning,
    ) -> f32 {
        match outcome {
            Outcome::Success => {
                let awarded =
                    tuning.points_per_section * self.multiplier * tuning.kind_multiplier(kind);
                self.total_points += awarded;
                self.successful_sections += 1;
                self.multiplier =
                    (self.multiplier + tuning.multiplier_step).min(tuning.multiplier_cap);
                awarded
            }
            Outcome::Sputter => 0.0,
            Outcome::Death => {
                self.multiplier = 1.0;
                0.0
            }
        }
    }

    /// Books a finished wave. `start_multiplier` is the live multiplier the
    /// wave's first section was scored with.
    pub fn record_wave(
        &mut self,
        success: bool,
        path_len: usize,
        kind: WaveKind,
        start_multiplier: f32,
        tuning: &ScoringTuning,
    ) {
        self.waves_completed += 1;
        if success {
            self.waves_succeeded += 1;
        }
        self.max_possible_score += best_case(path_len, kind, start_multiplier, tuning);
    }
}

/// Points a path earns when every section succeeds.
fn best_case(
    path_len: usize,
    kind: WaveKind,
    start_multiplier: f32,
    tuning: &ScoringTuning,
) -> f32 {
    let mut multiplier = start_multiplier;
    let mut total = 0.0;
    for _ in 0..path_len {
        total += tuning.points_per_section * multiplier * tuning.kind_multiplier(kind);
        multiplier = (multiplier + tuning.multiplier_step).min(tuning.multiplier_cap);
    }
    total
}
