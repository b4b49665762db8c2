#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave lifecycle orchestration.
//!
//! [`WaveOrchestrator`] owns every piece of mutable wave state: the session
//! clock, global and per-section cooldowns, the active [`WaveRecord`], the
//! strength model and the propagation cursor. A single [`WaveOrchestrator::tick`]
//! call drives the lifecycle
//! `idle -> countdown -> propagating -> complete -> idle`, resolving columns and
//! sections synchronously inside the tick that detects them.

mod animation;
mod config;
mod path;
mod scoring;

use std::{collections::BTreeMap, time::Duration};

use crowd_wave_core::{
    venue::{SectionStatsProvider, SpatialMapping, Venue},
    ColumnBoundary, Outcome, RandomSource, SectionId, SectionResult, WaveDirection, WaveEvent,
    WaveId, WaveKind, WaveRecord,
};
use crowd_wave_system_cursor::{CursorEvent, CursorTrack, PropagationCursor};
use crowd_wave_system_momentum::{StrengthChange, StrengthMomentum};
use crowd_wave_system_participation::ParticipationResolver;
use serde::Serialize;

pub use animation::{AnimationTicket, AnimationTracker};
pub use config::{
    AnimationTuning, ConfigError, CooldownTuning, PathTuning, ScoringTuning, TriggerTuning,
    WaveConfig,
};
pub use crowd_wave_system_momentum::BoosterKind;
pub use path::{compute_path, PathTopology};
pub use scoring::Scoreboard;

const IDLE_LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Externally visible lifecycle phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WavePhase {
    /// Waiting for the next trigger.
    Idle,
    /// A wave was triggered and the "incoming" countdown runs.
    Countdown,
    /// The cursor is sweeping the path.
    Propagating,
}

/// Point-in-time view of the orchestrator.
#[derive(Clone, Debug, PartialEq)]
pub struct OrchestratorSnapshot {
    /// Current lifecycle phase.
    pub phase: WavePhase,
    /// Simulated session time.
    pub clock: Duration,
    /// Current wave strength.
    pub strength: f32,
    /// Wave in countdown or propagation.
    pub active_wave: Option<WaveId>,
    /// Booster currently active.
    pub booster: Option<BoosterKind>,
    /// Fraction of column boundaries crossed by the cursor.
    pub cursor_progress: Option<f32>,
    /// Time left on the global cooldown.
    pub cooldown_remaining: Duration,
    /// Cumulative score.
    pub scoreboard: Scoreboard,
    /// Number of finished waves.
    pub waves_archived: usize,
}

#[derive(Clone, Debug)]
struct SectionTally {
    section: SectionId,
    forced: Option<Outcome>,
    columns: Vec<(Outcome, f32)>,
}

impl SectionTally {
    fn new(section: SectionId, forced: Option<Outcome>) -> Self {
        Self {
            section,
            forced,
            columns: Vec::new(),
        }
    }

    /// Section outcome and mean raw participation.
    fn resolve(&self, resolver: &ParticipationResolver) -> (Outcome, f32) {
        let participation = if self.columns.is_empty() {
            0.0
        } else {
            self.columns.iter().map(|(_, rate)| rate).sum::<f32>() / self.columns.len() as f32
        };
        let outcome = self
            .forced
            .or_else(|| majority_outcome(&self.columns))
            .unwrap_or_else(|| resolver.classify(participation));
        (outcome, participation)
    }
}

/// Majority vote over column outcomes; ties favour success, then sputter.
fn majority_outcome(columns: &[(Outcome, f32)]) -> Option<Outcome> {
    let votes = |outcome: Outcome| columns.iter().filter(|(vote, _)| *vote == outcome).count();
    let best = Outcome::PRIORITY
        .into_iter()
        .map(|outcome| votes(outcome))
        .max()
        .filter(|count| *count > 0)?;
    Outcome::PRIORITY
        .into_iter()
        .find(|outcome| votes(*outcome) == best)
}

#[derive(Clone, Debug)]
struct ActiveWave {
    record: WaveRecord,
    start_multiplier: f32,
    countdown: Duration,
    cursor: Option<PropagationCursor>,
    tallies: Vec<SectionTally>,
}

/// Drives waves from trigger to completion.
#[derive(Clone, Debug)]
pub struct WaveOrchestrator {
    config: WaveConfig,
    resolver: ParticipationResolver,
    momentum: StrengthMomentum,
    scoreboard: Scoreboard,
    animations: AnimationTracker,
    clock: Duration,
    next_check_at: Duration,
    cooldown_until: Duration,
    origin_started: BTreeMap<SectionId, Duration>,
    next_wave: WaveId,
    propagating: bool,
    active: Option<ActiveWave>,
    history: Vec<WaveRecord>,
    strength_bonus: f32,
    forced_outcome: Option<Outcome>,
    last_idle_log: Option<Duration>,
}

impl Default for WaveOrchestrator {
    fn default() -> Self {
        Self::new(WaveConfig::default())
    }
}

impl WaveOrchestrator {
    /// Creates an idle orchestrator at session time zero.
    #[must_use]
    pub fn new(config: WaveConfig) -> Self {
        Self {
            resolver: ParticipationResolver::new(config.participation.clone()),
            momentum: StrengthMomentum::new(config.momentum.clone()),
            scoreboard: Scoreboard::default(),
            animations: AnimationTracker::new(),
            clock: Duration::ZERO,
            next_check_at: config.trigger.startup_grace(),
            cooldown_until: Duration::ZERO,
            origin_started: BTreeMap::new(),
            next_wave: WaveId::new(1),
            propagating: false,
            active: None,
            history: Vec::new(),
            strength_bonus: 0.0,
            forced_outcome: None,
            last_idle_log: None,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Simulated session time.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        match &self.active {
            None => WavePhase::Idle,
            Some(_) if self.propagating => WavePhase::Propagating,
            Some(_) => WavePhase::Countdown,
        }
    }

    /// Whether a cursor is currently sweeping.
    #[must_use]
    pub fn is_propagating(&self) -> bool {
        self.propagating
    }

    /// Current wave strength.
    #[must_use]
    pub fn strength(&self) -> f32 {
        self.momentum.strength()
    }

    /// Record of the wave in countdown or propagation.
    #[must_use]
    pub fn active_record(&self) -> Option<&WaveRecord> {
        self.active.as_ref().map(|active| &active.record)
    }

    /// Finished waves, oldest first.
    #[must_use]
    pub fn history(&self) -> &[WaveRecord] {
        &self.history
    }

    /// Cumulative score.
    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Column animations still playing.
    #[must_use]
    pub fn pending_animations(&self) -> &[AnimationTicket] {
        self.animations.pending()
    }

    /// Captures a point-in-time view for adapters.
    #[must_use]
    pub fn snapshot(&self) -> OrchestratorSnapshot {
        OrchestratorSnapshot {
            phase: self.phase(),
            clock: self.clock,
            strength: self.momentum.strength(),
            active_wave: self.active.as_ref().map(|active| active.record.id()),
            booster: self.momentum.active_booster(),
            cursor_progress: self
                .active
                .as_ref()
                .and_then(|active| active.cursor.as_ref())
                .map(PropagationCursor::progress),
            cooldown_remaining: self.cooldown_until.saturating_sub(self.clock),
            scoreboard: self.scoreboard.clone(),
            waves_archived: self.history.len(),
        }
    }

    /// Activates a wave-only booster, replacing any active one.
    pub fn apply_booster(&mut self, kind: BoosterKind) {
        self.momentum.apply_booster(kind);
        tracing::info!(
            target: "crowd_wave::orchestrator",
            booster = ?kind,
            multiplier = self.momentum.booster_multiplier(),
            "wave.booster.applied"
        );
    }

    /// Removes the active booster.
    pub fn clear_booster(&mut self) {
        self.momentum.clear_booster();
    }

    /// Sets the additive strength bonus consumed when the next wave starts moving.
    pub fn set_strength_bonus(&mut self, amount: f32) {
        self.strength_bonus = if amount.is_finite() { amount } else { 0.0 };
    }

    /// Forces the outcome of the next section the cursor enters.
    pub fn force_next_section(&mut self, outcome: Outcome) {
        self.forced_outcome = Some(outcome);
    }

    /// Advances the session by `dt`.
    pub fn tick<V>(
        &mut self,
        dt: Duration,
        venue: &mut V,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) where
        V: Venue + ?Sized,
    {
        self.clock += dt;
        self.finish_animations(dt, venue, out);

        match self.phase() {
            WavePhase::Idle => {
                if self.clock >= self.next_check_at {
                    self.next_check_at = self.clock + self.config.trigger.check_interval();
                    let _ = self.check_wave_probability(&*venue, rng, out);
                }
            }
            WavePhase::Countdown => self.advance_countdown(dt, venue, out),
            WavePhase::Propagating => self.advance_propagation(dt, venue, rng, out),
        }
    }

    /// Runs one trigger evaluation.
    ///
    /// Does nothing while a wave is active, during the global cooldown or the
    /// startup grace. Otherwise sections are visited in edge-weighted random
    /// order, skipping those on per-section cooldown, and each one gets a
    /// single draw against its happiness band. The first hit becomes the
    /// origin of a new wave.
    pub fn check_wave_probability<P>(
        &mut self,
        stats: &P,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) -> Option<WaveId>
    where
        P: SectionStatsProvider + ?Sized,
    {
        if self.active.is_some() {
            tracing::debug!(
                target: "crowd_wave::orchestrator",
                propagating = self.propagating,
                "wave.trigger.ignored_active"
            );
            return None;
        }
        if self.clock < self.cooldown_until || self.clock < self.config.trigger.startup_grace() {
            return None;
        }

        let sections = stats.list_sections();
        let layout: Vec<SectionId> = sections.iter().map(|stats| stats.id).collect();
        let candidates: Vec<(usize, (SectionId, f32))> = sections
            .iter()
            .enumerate()
            .filter(|(_, stats)| !self.on_section_cooldown(stats.id))
            .map(|(index, stats)| (index, (stats.id, stats.happiness)))
            .collect();
        let order = path::weighted_order(
            candidates,
            layout.len(),
            self.config.trigger.edge_weight_bonus,
            rng,
        );

        for (section, listed_happiness) in order {
            let happiness = stats.average_happiness(section).unwrap_or(listed_happiness);
            let probability = self.config.trigger.probability_for(happiness);
            let draw = rng.next_unit();
            if draw < probability {
                tracing::debug!(
                    target: "crowd_wave::orchestrator",
                    section = %section,
                    happiness,
                    probability,
                    draw,
                    "wave.trigger.hit"
                );
                return self.start_wave(&layout, section, rng, out);
            }
        }

        self.log_idle(layout.len());
        None
    }

    /// Starts a wave at `origin`, ignoring cooldowns but not an active wave.
    pub fn trigger_wave_at<P>(
        &mut self,
        origin: SectionId,
        stats: &P,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) -> Option<WaveId>
    where
        P: SectionStatsProvider + ?Sized,
    {
        if self.active.is_some() {
            tracing::debug!(
                target: "crowd_wave::orchestrator",
                section = %origin,
                "wave.trigger.ignored_active"
            );
            return None;
        }
        let layout: Vec<SectionId> = stats.list_sections().iter().map(|stats| stats.id).collect();
        self.start_wave(&layout, origin, rng, out)
    }

    fn on_section_cooldown(&self, section: SectionId) -> bool {
        self.origin_started
            .get(&section)
            .is_some_and(|started| self.clock < *started + self.config.cooldown.per_section())
    }

    fn log_idle(&mut self, sections: usize) {
        let due = self
            .last_idle_log
            .map_or(true, |last| self.clock.saturating_sub(last) >= IDLE_LOG_INTERVAL);
        if due {
            self.last_idle_log = Some(self.clock);
            tracing::debug!(
                target: "crowd_wave::orchestrator",
                sections,
                clock_secs = self.clock.as_secs_f32(),
                "wave.trigger.none"
            );
        }
    }

    fn draw_kind(&self, rng: &mut dyn RandomSource) -> WaveKind {
        let tuning = &self.config.trigger;
        if tuning.super_wave_chance + tuning.double_down_chance <= 0.0 {
            return WaveKind::Normal;
        }
        let draw = rng.next_unit();
        if draw < tuning.super_wave_chance {
            WaveKind::Super
        } else if draw < tuning.super_wave_chance + tuning.double_down_chance {
            WaveKind::DoubleDown
        } else {
            WaveKind::Normal
        }
    }

    fn start_wave(
        &mut self,
        layout: &[SectionId],
        origin: SectionId,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) -> Option<WaveId> {
        let Some(index) = layout.iter().position(|section| *section == origin) else {
            tracing::warn!(
                target: "crowd_wave::orchestrator",
                section = %origin,
                "wave.trigger.unknown_section"
            );
            return None;
        };

        let kind = self.draw_kind(rng);
        let direction = path::choose_direction(index, layout.len(), rng);
        let path = compute_path(layout, origin, direction, self.config.path.topology);
        let id = self.next_wave;
        let record = match WaveRecord::new(id, kind, origin, path.clone(), direction, self.clock) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(
                    target: "crowd_wave::orchestrator",
                    section = %origin,
                    error = %error,
                    "wave.trigger.invalid_path"
                );
                return None;
            }
        };
        self.next_wave = id.next();

        let countdown = self.config.cooldown.countdown();
        tracing::info!(
            target: "crowd_wave::orchestrator",
            wave = %id,
            origin = %origin,
            kind = kind.as_str(),
            direction = ?direction,
            sections = path.len(),
            "wave.created"
        );
        out.push(WaveEvent::WaveCreated {
            wave: id,
            kind,
            origin,
            path,
            direction,
        });
        out.push(WaveEvent::CountdownStarted {
            wave: id,
            origin,
            duration: countdown,
        });
        self.active = Some(ActiveWave {
            record,
            start_multiplier: self.scoreboard.multiplier,
            countdown,
            cursor: None,
            tallies: Vec::new(),
        });
        Some(id)
    }

    fn advance_countdown<V>(&mut self, dt: Duration, venue: &mut V, out: &mut Vec<WaveEvent>)
    where
        V: Venue + ?Sized,
    {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.countdown = active.countdown.saturating_sub(dt);
        if active.countdown.is_zero() {
            self.start_propagation(venue, out);
        }
    }

    fn start_propagation<V>(&mut self, venue: &mut V, out: &mut Vec<WaveEvent>)
    where
        V: Venue + ?Sized,
    {
        if self.propagating {
            return;
        }
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let wave = active.record.id();
        let direction = active.record.direction();
        let path = active.record.path().to_vec();

        let track = match venue.spatial() {
            Some(spatial) => build_track(spatial, &path, direction),
            None => {
                tracing::warn!(
                    target: "crowd_wave::orchestrator",
                    wave = %wave,
                    "wave.propagation.no_spatial_mapping"
                );
                return;
            }
        };
        let Some(track) = track else {
            tracing::warn!(
                target: "crowd_wave::orchestrator",
                wave = %wave,
                "wave.propagation.no_track"
            );
            return;
        };

        venue.reset_wave_state();
        let bonus = std::mem::take(&mut self.strength_bonus);
        let change = self.momentum.reset(bonus);
        let columns = track.boundaries().len();
        let cursor = PropagationCursor::new(track, self.config.speed.clone());
        if let Some(active) = self.active.as_mut() {
            active.cursor = Some(cursor);
        }
        self.propagating = true;

        tracing::info!(
            target: "crowd_wave::orchestrator",
            wave = %wave,
            columns,
            strength = self.momentum.strength(),
            "wave.propagation.started"
        );
        out.push(WaveEvent::PropagationStarted { wave, columns });
        publish_strength(wave, change, out);
    }

    fn advance_propagation<V>(
        &mut self,
        dt: Duration,
        venue: &mut V,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) where
        V: Venue + ?Sized,
    {
        let strength = self.momentum.strength();
        let mut steps = Vec::new();
        match self
            .active
            .as_mut()
            .and_then(|active| active.cursor.as_mut())
        {
            Some(cursor) => cursor.advance(dt, strength, &mut steps),
            None => {
                self.propagating = false;
                return;
            }
        }

        for step in steps {
            match step {
                CursorEvent::SectionEntered { section } => self.enter_section(section),
                CursorEvent::ColumnReached { boundary, .. } => {
                    self.resolve_column(boundary, venue, rng, out);
                }
                CursorEvent::SectionExited { section } => self.complete_section(section, out),
                CursorEvent::Completed => self.finish_wave(out),
            }
        }
    }

    fn enter_section(&mut self, section: SectionId) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let seen = active.record.has_result_for(section)
            || active.tallies.iter().any(|tally| tally.section == section);
        if seen {
            return;
        }
        let forced = self.forced_outcome.take();
        if let Some(outcome) = forced {
            tracing::info!(
                target: "crowd_wave::orchestrator",
                wave = %active.record.id(),
                section = %section,
                outcome = outcome.as_str(),
                "wave.section.forced"
            );
        }
        active.tallies.push(SectionTally::new(section, forced));
    }

    fn resolve_column<V>(
        &mut self,
        boundary: ColumnBoundary,
        venue: &mut V,
        rng: &mut dyn RandomSource,
        out: &mut Vec<WaveEvent>,
    ) where
        V: Venue + ?Sized,
    {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let section = boundary.section;
        if active.record.has_result_for(section) {
            return;
        }
        let wave = active.record.id();
        let slot = match active
            .tallies
            .iter()
            .position(|tally| tally.section == section)
        {
            Some(slot) => slot,
            None => {
                active.tallies.push(SectionTally::new(section, None));
                active.tallies.len() - 1
            }
        };

        let bonus = venue
            .section_stats(section)
            .map_or(0.0, |stats| self.resolver.section_bonus(&stats));
        let modifier = self.resolver.strength_modifier(self.momentum.strength());
        let resolution = {
            let mut fans = venue.column_fans_mut(section, boundary.column_index);
            self.resolver
                .resolve_column(&mut fans, bonus, modifier, rng)
        };

        let tally = &mut active.tallies[slot];
        let outcome = tally
            .forced
            .unwrap_or_else(|| self.resolver.classify(resolution.raw_rate));
        tally.columns.push((outcome, resolution.raw_rate));
        let visual_state = ParticipationResolver::visual_state(&resolution, outcome);

        self.animations.schedule(
            wave,
            section,
            boundary.column_index,
            self.config.animation.column(),
        );
        tracing::debug!(
            target: "crowd_wave::orchestrator",
            wave = %wave,
            section = %section,
            column = boundary.column_index,
            occupied = resolution.occupied,
            participants = resolution.participants,
            pressured = resolution.pressured,
            rate = resolution.raw_rate,
            "wave.column.reached"
        );
        out.push(WaveEvent::ColumnReached {
            wave,
            section,
            column_index: boundary.column_index,
            participation_rate: resolution.raw_rate,
            visual_state,
        });
    }

    fn complete_section(&mut self, section: SectionId, out: &mut Vec<WaveEvent>) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.record.has_result_for(section) {
            return;
        }
        let tally = active
            .tallies
            .iter()
            .position(|tally| tally.section == section)
            .map(|slot| active.tallies.remove(slot));
        let (outcome, participation) = match &tally {
            Some(tally) => tally.resolve(&self.resolver),
            None => (self.resolver.classify(0.0), 0.0),
        };

        let result = SectionResult {
            section,
            outcome,
            participation,
        };
        if let Err(error) = active.record.record_outcome(result) {
            tracing::warn!(
                target: "crowd_wave::orchestrator",
                wave = %active.record.id(),
                section = %section,
                error = %error,
                "wave.section.rejected"
            );
            return;
        }
        let wave = active.record.id();
        let kind = active.record.kind();

        let awarded = self
            .scoreboard
            .record_section(outcome, kind, &self.config.scoring);
        let change = self.momentum.observe(outcome, participation);
        tracing::info!(
            target: "crowd_wave::orchestrator",
            wave = %wave,
            section = %section,
            outcome = outcome.as_str(),
            participation,
            awarded,
            strength = change.current,
            "wave.section.complete"
        );
        out.push(WaveEvent::SectionComplete {
            wave,
            section,
            outcome,
            aggregate_participation: participation,
        });
        publish_strength(wave, change, out);
    }

    fn finish_wave(&mut self, out: &mut Vec<WaveEvent>) {
        let pending: Vec<SectionId> = match self.active.as_ref() {
            Some(active) => active.record.pending_sections().collect(),
            None => return,
        };
        for section in pending {
            self.complete_section(section, out);
        }

        let Some(mut active) = self.active.take() else {
            return;
        };
        let wave = active.record.id();
        if let Err(error) = active.record.complete(self.clock) {
            tracing::warn!(
                target: "crowd_wave::orchestrator",
                wave = %wave,
                error = %error,
                "wave.complete.rejected"
            );
        }
        let success = active.record.succeeded();
        self.scoreboard.record_wave(
            success,
            active.record.path().len(),
            active.record.kind(),
            active.start_multiplier,
            &self.config.scoring,
        );

        let cooldown = self.config.cooldown.global_cooldown(success);
        self.cooldown_until = self.clock + cooldown;
        self.next_check_at = self.next_check_at.max(self.cooldown_until);
        let _ = self
            .origin_started
            .insert(active.record.origin(), active.record.created_at());
        self.momentum.clear_booster();
        self.propagating = false;

        tracing::info!(
            target: "crowd_wave::orchestrator",
            wave = %wave,
            success,
            sections = active.record.results().len(),
            cooldown_secs = cooldown.as_secs_f32(),
            total_points = self.scoreboard.total_points,
            "wave.complete"
        );
        out.push(WaveEvent::WaveComplete {
            wave,
            success,
            results: active.record.results().to_vec(),
        });
        out.push(WaveEvent::WaveCooldownStarted { success, cooldown });
        self.history.push(active.record);
    }

    fn finish_animations<V>(&mut self, dt: Duration, venue: &mut V, out: &mut Vec<WaveEvent>)
    where
        V: Venue + ?Sized,
    {
        let mut expired = Vec::new();
        self.animations.advance(dt, &mut expired);
        for ticket in expired {
            venue.finish_column_animation(ticket.section, ticket.column_index);
            out.push(WaveEvent::ColumnAnimationComplete {
                wave: ticket.wave,
                section: ticket.section,
                column_index: ticket.column_index,
            });
        }
    }
}

fn publish_strength(wave: WaveId, change: StrengthChange, out: &mut Vec<WaveEvent>) {
    if change.changed() {
        out.push(WaveEvent::StrengthChanged {
            wave,
            previous: change.previous,
            current: change.current,
        });
    }
}

/// Cursor track for `path`, degrading to coarser geometry when the column
/// sequence is empty or malformed.
fn build_track(
    spatial: &dyn SpatialMapping,
    path: &[SectionId],
    direction: WaveDirection,
) -> Option<CursorTrack> {
    let boundaries = spatial.column_sequence_for_path(path, direction);
    if boundaries.is_empty() {
        tracing::warn!(
            target: "crowd_wave::orchestrator",
            sections = path.len(),
            "wave.cursor.empty_sequence"
        );
    } else {
        let pitches: Vec<(SectionId, f32)> = path
            .iter()
            .filter_map(|section| {
                let columns = boundaries
                    .iter()
                    .filter(|boundary| boundary.section == *section)
                    .count();
                let bounds = spatial.bounds_of(*section)?;
                (columns > 0).then(|| (*section, bounds.width() / columns as f32))
            })
            .collect();
        let pitch_of = |section: SectionId| {
            pitches
                .iter()
                .find(|(candidate, _)| *candidate == section)
                .map(|(_, pitch)| *pitch)
        };
        match CursorTrack::from_boundaries(direction, boundaries, pitch_of) {
            Ok(track) => return Some(track),
            Err(error) => tracing::warn!(
                target: "crowd_wave::orchestrator",
                error = %error,
                "wave.cursor.invalid_sequence"
            ),
        }
    }

    let centres: Vec<ColumnBoundary> = path
        .iter()
        .filter_map(|section| {
            spatial.bounds_of(*section).map(|bounds| ColumnBoundary {
                section: *section,
                column_index: 0,
                world_x: bounds.center_x(),
            })
        })
        .collect();
    if !centres.is_empty() {
        if let Ok(track) = CursorTrack::from_boundaries(direction, centres, |_| None) {
            return Some(track);
        }
    }

    let origin = *path.first()?;
    let segment = vec![ColumnBoundary {
        section: origin,
        column_index: 0,
        world_x: 0.0,
    }];
    CursorTrack::from_boundaries(direction, segment, |_| Some(1.0)).ok()
}
