use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use crowd_wave_core::WaveKind;
use crowd_wave_system_cursor::SpeedProfile;
use crowd_wave_system_momentum::MomentumTuning;
use crowd_wave_system_participation::ParticipationTuning;
use serde::Deserialize;
use thiserror::Error;

use crate::path::PathTopology;

/// Failure to load or validate a [`WaveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read wave config from {path:?}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The TOML document was malformed.
    #[error("failed to parse wave config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value was out of range or inconsistent with another.
    #[error("invalid [{table}] settings: {reason}")]
    Invalid {
        /// Table holding the offending value.
        table: &'static str,
        /// Human readable description.
        reason: String,
    },
}

/// When and how likely a wave starts.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggerTuning {
    /// Seconds after session start before the first trigger check.
    pub startup_grace_secs: f32,
    /// Seconds between trigger checks.
    pub check_interval_secs: f32,
    /// Happiness below which the low band applies.
    pub low_happiness_below: f32,
    /// Happiness above which the high band applies.
    pub high_happiness_above: f32,
    /// Trigger probability in the low band.
    pub low_probability: f32,
    /// Trigger probability in the medium band.
    pub medium_probability: f32,
    /// Trigger probability in the high band.
    pub high_probability: f32,
    /// Extra ordering weight given to sections at the edges.
    pub edge_weight_bonus: f32,
    /// Chance a triggered wave is a super wave.
    pub super_wave_chance: f32,
    /// Chance a triggered wave is a double-down wave.
    pub double_down_chance: f32,
}

impl Default for TriggerTuning {
    fn default() -> Self {
        Self {
            startup_grace_secs: 5.0,
            check_interval_secs: 1.0,
            low_happiness_below: 20.0,
            high_happiness_above: 60.0,
            low_probability: 0.4,
            medium_probability: 0.6,
            high_probability: 0.9,
            edge_weight_bonus: 1.0,
            super_wave_chance: 0.1,
            double_down_chance: 0.05,
        }
    }
}

impl TriggerTuning {
    /// Trigger probability for a section with the given average happiness.
    #[must_use]
    pub fn probability_for(&self, happiness: f32) -> f32 {
        if happiness < self.low_happiness_below {
            self.low_probability
        } else if happiness > self.high_happiness_above {
            self.high_probability
        } else {
            self.medium_probability
        }
    }

    /// Startup grace as a duration.
    #[must_use]
    pub fn startup_grace(&self) -> Duration {
        seconds(self.startup_grace_secs)
    }

    /// Check interval as a duration.
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        seconds(self.check_interval_secs)
    }

    fn problem(&self) -> Option<String> {
        let probabilities = [
            ("low_probability", self.low_probability),
            ("medium_probability", self.medium_probability),
            ("high_probability", self.high_probability),
            ("super_wave_chance", self.super_wave_chance),
            ("double_down_chance", self.double_down_chance),
        ];
        if let Some((name, value)) = probabilities
            .into_iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Some(format!("{name} {value} must lie in [0, 1]"));
        }
        if self.super_wave_chance + self.double_down_chance > 1.0 {
            return Some("super_wave_chance and double_down_chance exceed 1 combined".to_owned());
        }
        if self.low_happiness_below > self.high_happiness_above {
            return Some(format!(
                "low_happiness_below {} exceeds high_happiness_above {}",
                self.low_happiness_below, self.high_happiness_above
            ));
        }
        if !(self.edge_weight_bonus >= 0.0) {
            return Some(format!(
                "edge_weight_bonus {} must be non-negative",
                self.edge_weight_bonus
            ));
        }
        negative_duration(&[
            ("startup_grace_secs", self.startup_grace_secs),
            ("check_interval_secs", self.check_interval_secs),
        ])
    }
}

/// Global and per-section pacing between waves.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CooldownTuning {
    /// Gap after a failed wave.
    pub base_secs: f32,
    /// Amount a successful wave shortens the gap by.
    pub success_refund_secs: f32,
    /// Minimum gap before an origin section may start another wave.
    pub per_section_secs: f32,
    /// Length of the "incoming" countdown.
    pub countdown_secs: f32,
}

impl Default for CooldownTuning {
    fn default() -> Self {
        Self {
            base_secs: 12.0,
            success_refund_secs: 4.0,
            per_section_secs: 30.0,
            countdown_secs: 3.0,
        }
    }
}

impl CooldownTuning {
    /// Gap before the next wave, given how the last one ended.
    #[must_use]
    pub fn global_cooldown(&self, success: bool) -> Duration {
        let base = seconds(self.base_secs);
        if success {
            base.saturating_sub(seconds(self.success_refund_secs))
        } else {
            base
        }
    }

    /// Per-section cooldown as a duration.
    #[must_use]
    pub fn per_section(&self) -> Duration {
        seconds(self.per_section_secs)
    }

    /// Countdown as a duration.
    #[must_use]
    pub fn countdown(&self) -> Duration {
        seconds(self.countdown_secs)
    }

    fn problem(&self) -> Option<String> {
        negative_duration(&[
            ("base_secs", self.base_secs),
            ("success_refund_secs", self.success_refund_secs),
            ("per_section_secs", self.per_section_secs),
            ("countdown_secs", self.countdown_secs),
        ])
    }
}

/// Points and multipliers.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Points for each successful section before multipliers.
    pub points_per_section: f32,
    /// Multiplier growth per successful section.
    pub multiplier_step: f32,
    /// Highest live multiplier.
    pub multiplier_cap: f32,
    /// Kind multiplier for normal waves.
    pub normal_multiplier: f32,
    /// Kind multiplier for super waves.
    pub super_multiplier: f32,
    /// Kind multiplier for double-down waves.
    pub double_down_multiplier: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            points_per_section: 100.0,
            multiplier_step: 0.25,
            multiplier_cap: 3.0,
            normal_multiplier: 1.0,
            super_multiplier: 2.0,
            double_down_multiplier: 1.5,
        }
    }
}

impl ScoringTuning {
    /// Score multiplier tied to the wave kind.
    #[must_use]
    pub fn kind_multiplier(&self, kind: WaveKind) -> f32 {
        match kind {
            WaveKind::Normal => self.normal_multiplier,
            WaveKind::Super => self.super_multiplier,
            WaveKind::DoubleDown => self.double_down_multiplier,
        }
    }

    fn problem(&self) -> Option<String> {
        if self.multiplier_cap < 1.0 {
            return Some(format!(
                "multiplier_cap {} must be at least 1",
                self.multiplier_cap
            ));
        }
        [
            ("points_per_section", self.points_per_section),
            ("multiplier_step", self.multiplier_step),
            ("normal_multiplier", self.normal_multiplier),
            ("super_multiplier", self.super_multiplier),
            ("double_down_multiplier", self.double_down_multiplier),
        ]
        .into_iter()
        .find(|(_, value)| !(*value >= 0.0))
        .map(|(name, value)| format!("{name} {value} must be non-negative"))
    }
}

/// Cosmetic column animation timing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    /// Seconds a column keeps standing before it sits down again.
    pub column_secs: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self { column_secs: 0.8 }
    }
}

impl AnimationTuning {
    /// Column animation as a duration.
    #[must_use]
    pub fn column(&self) -> Duration {
        seconds(self.column_secs)
    }

    fn problem(&self) -> Option<String> {
        negative_duration(&[("column_secs", self.column_secs)])
    }
}

/// How the section path is walked.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathTuning {
    /// Whether the path stops at the last section or wraps around the bowl.
    pub topology: PathTopology,
}

/// Every tuning table of the wave engine.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Trigger checks.
    pub trigger: TriggerTuning,
    /// Global and per-section cooldowns.
    pub cooldown: CooldownTuning,
    /// Scoring.
    pub scoring: ScoringTuning,
    /// Cosmetic animation.
    pub animation: AnimationTuning,
    /// Path walking.
    pub path: PathTuning,
    /// Column participation.
    pub participation: ParticipationTuning,
    /// Strength momentum.
    pub momentum: MomentumTuning,
    /// Cursor speed.
    pub speed: SpeedProfile,
}

impl WaveConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: WaveConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects inconsistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("trigger", self.trigger.problem()),
            ("cooldown", self.cooldown.problem()),
            ("scoring", self.scoring.problem()),
            ("animation", self.animation.problem()),
            ("participation", self.participation.problem()),
            ("momentum", self.momentum.problem()),
            ("speed", self.speed.problem()),
        ];
        match checks
            .into_iter()
            .find_map(|(table, problem)| problem.map(|reason| (table, reason)))
        {
            Some((table, reason)) => Err(ConfigError::Invalid { table, reason }),
            None => Ok(()),
        }
    }
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value).unwrap_or(Duration::ZERO)
}

fn negative_duration(fields: &[(&str, f32)]) -> Option<String> {
    fields
        .iter()
        .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
        .map(|(name, value)| format!("{name} {value} must be a non-negative number of seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(WaveConfig::default().validate().is_ok());
    }

    #[test]
    fn happiness_bands_select_probability() {
        let trigger = TriggerTuning::default();
        assert_eq!(trigger.probability_for(10.0), 0.4);
        assert_eq!(trigger.probability_for(20.0), 0.6);
        assert_eq!(trigger.probability_for(60.0), 0.6);
        assert_eq!(trigger.probability_for(60.5), 0.9);
    }

    #[test]
    fn successful_waves_earn_a_refund() {
        let cooldown = CooldownTuning::default();
        assert_eq!(cooldown.global_cooldown(true), Duration::from_secs(8));
        assert_eq!(cooldown.global_cooldown(false), Duration::from_secs(12));

        let generous = CooldownTuning {
            success_refund_secs: 50.0,
            ..CooldownTuning::default()
        };
        assert_eq!(generous.global_cooldown(true), Duration::ZERO);
    }

    #[test]
    fn partial_documents_keep_defaults() {
        let config = WaveConfig::from_toml_str(
            r#"
            [trigger]
            startup_grace_secs = 0.0

            [path]
            topology = "linear"

            [participation]
            sputter_threshold = 0.3
            "#,
        )
        .expect("valid config");
        assert_eq!(config.trigger.startup_grace(), Duration::ZERO);
        assert_eq!(config.trigger.check_interval(), Duration::from_secs(1));
        assert_eq!(config.path.topology, PathTopology::Linear);
        assert_eq!(config.participation.sputter_threshold, 0.3);
        assert_eq!(config.cooldown, CooldownTuning::default());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let error = WaveConfig::from_toml_str(
            r#"
            [participation]
            success_threshold = 0.3
            sputter_threshold = 0.5
            "#,
        )
        .expect_err("inverted thresholds");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                table: "participation",
                ..
            }
        ));
    }

    #[test]
    fn negative_durations_are_rejected() {
        let error = WaveConfig::from_toml_str("[cooldown]\ncountdown_secs = -1.0")
            .expect_err("negative countdown");
        assert!(error.to_string().contains("countdown_secs"));
    }

    #[test]
    fn malformed_documents_report_parse_errors() {
        let error = WaveConfig::from_toml_str("[trigger\n").expect_err("malformed");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_files_report_their_path() {
        let error = WaveConfig::from_file(Path::new("/definitely/not/here.toml"))
            .expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
