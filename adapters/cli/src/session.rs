use std::{cell::RefCell, rc::Rc, time::Duration};

use crowd_wave_core::{EventBus, EventKind, EventScope, RngSource, SectionId, WaveEvent, WaveRecord};
use crowd_wave_stadium::{self as stadium, Command, SectionPlan, Stadium};
use crowd_wave_system_orchestrator::{Scoreboard, WaveConfig, WaveOrchestrator, WavePhase};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Vendors walk the aisles this often, one section per round.
const VENDOR_INTERVAL: Duration = Duration::from_secs(20);

/// Shape and pacing of a headless session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SessionPlan {
    /// Simulated length of the session.
    pub(crate) duration: Duration,
    /// Fixed simulation step.
    pub(crate) tick: Duration,
    /// Seed shared by seat population and wave draws.
    pub(crate) seed: u64,
    /// Number of sections, left to right.
    pub(crate) sections: u32,
    /// Seat rows per section.
    pub(crate) rows: u32,
    /// Seat columns per section.
    pub(crate) columns: u32,
}

/// Everything a finished session reports.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct SessionReport {
    /// Simulated seconds actually run.
    pub(crate) simulated_secs: f32,
    /// Phase the orchestrator ended in.
    pub(crate) final_phase: WavePhase,
    /// Strength at the end of the session.
    pub(crate) final_strength: f32,
    /// Events delivered through the bus.
    pub(crate) events_published: usize,
    /// Archived waves, oldest first.
    pub(crate) waves: Vec<WaveRecord>,
    /// Cumulative score.
    pub(crate) scoreboard: Scoreboard,
}

/// Runs one fixed-step session.
pub(crate) fn run_session(plan: &SessionPlan, config: WaveConfig) -> SessionReport {
    let section_plan = SectionPlan {
        rows: plan.rows,
        columns: plan.columns,
        ..SectionPlan::default()
    };
    let mut stadium = Stadium::builder()
        .sections(plan.sections, section_plan)
        .seed(plan.seed)
        .build();
    let mut orchestrator = WaveOrchestrator::new(config);
    let mut rng = RngSource::new(ChaCha8Rng::seed_from_u64(plan.seed));

    let published = Rc::new(RefCell::new(0_usize));
    let mut bus = EventBus::new();
    let counter = Rc::clone(&published);
    let _ = bus.subscribe(EventScope::All, move |event| {
        *counter.borrow_mut() += 1;
        log_event(event);
    });
    let _ = bus.subscribe(EventScope::Only(EventKind::WaveComplete), |event| {
        if let WaveEvent::WaveComplete {
            wave,
            success,
            results,
        } = event
        {
            tracing::info!(
                target: "crowd_wave::cli",
                wave = %wave,
                success,
                sections = results.len(),
                "session.wave_finished"
            );
        }
    });

    let ticks = tick_count(plan.duration, plan.tick);
    let mut events = Vec::new();
    let mut stadium_events = Vec::new();
    let mut since_vendor = Duration::ZERO;
    let mut vendor_round = 0_u32;

    for _ in 0..ticks {
        stadium::apply(&mut stadium, Command::Decay { dt: plan.tick }, &mut stadium_events);
        since_vendor += plan.tick;
        if since_vendor >= VENDOR_INTERVAL && plan.sections > 0 {
            since_vendor = Duration::ZERO;
            let section = SectionId::new(vendor_round % plan.sections);
            vendor_round = vendor_round.wrapping_add(1);
            stadium::apply(
                &mut stadium,
                Command::ServeSection { section },
                &mut stadium_events,
            );
        }
        stadium_events.clear();

        orchestrator.tick(plan.tick, &mut stadium, &mut rng, &mut events);
        bus.publish(&events);
        events.clear();
    }

    let events_published = *published.borrow();
    SessionReport {
        simulated_secs: orchestrator.clock().as_secs_f32(),
        final_phase: orchestrator.phase(),
        final_strength: orchestrator.strength(),
        events_published,
        waves: orchestrator.history().to_vec(),
        scoreboard: orchestrator.scoreboard().clone(),
    }
}

fn tick_count(duration: Duration, tick: Duration) -> u64 {
    if tick.is_zero() {
        return 0;
    }
    let ticks = duration.as_nanos() / tick.as_nanos();
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

fn log_event(event: &WaveEvent) {
    match event {
        WaveEvent::ColumnReached { .. } | WaveEvent::ColumnAnimationComplete { .. } => {
            tracing::trace!(target: "crowd_wave::cli", kind = ?event.kind(), "session.event");
        }
        _ => tracing::debug!(target: "crowd_wave::cli", kind = ?event.kind(), "session.event"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(seconds: u64) -> SessionPlan {
        SessionPlan {
            duration: Duration::from_secs(seconds),
            tick: Duration::from_millis(100),
            seed: 9,
            sections: 4,
            rows: 4,
            columns: 5,
        }
    }

    #[test]
    fn tick_count_floors_partial_steps() {
        assert_eq!(
            tick_count(Duration::from_millis(950), Duration::from_millis(100)),
            9
        );
        assert_eq!(tick_count(Duration::from_secs(1), Duration::ZERO), 0);
    }

    #[test]
    fn sessions_are_reproducible() {
        let first = run_session(&plan(60), WaveConfig::default());
        let second = run_session(&plan(60), WaveConfig::default());
        assert_eq!(first.waves, second.waves);
        assert_eq!(first.scoreboard, second.scoreboard);
        assert_eq!(first.events_published, second.events_published);
        assert!(!first.waves.is_empty());
        assert!((first.simulated_secs - 60.0).abs() < 1e-3);
    }

    #[test]
    fn empty_venue_never_starts_a_wave() {
        let empty = SessionPlan {
            sections: 0,
            ..plan(30)
        };
        let report = run_session(&empty, WaveConfig::default());
        assert!(report.waves.is_empty());
        assert_eq!(report.events_published, 0);
        assert_eq!(report.final_phase, WavePhase::Idle);
    }
}
