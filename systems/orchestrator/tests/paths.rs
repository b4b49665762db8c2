use std::collections::HashSet;

use crowd_wave_core::{ScriptedDraws, SectionId, WaveDirection, WaveEvent};
use crowd_wave_stadium::{SectionPlan, Stadium};
use crowd_wave_system_orchestrator::{compute_path, PathTopology, WaveConfig, WaveOrchestrator};

const A: SectionId = SectionId::new(0);
const B: SectionId = SectionId::new(1);
const C: SectionId = SectionId::new(2);

fn created_path(events: &[WaveEvent]) -> Option<(Vec<SectionId>, WaveDirection)> {
    events.iter().find_map(|event| match event {
        WaveEvent::WaveCreated {
            path, direction, ..
        } => Some((path.clone(), *direction)),
        _ => None,
    })
}

fn orchestrator(topology: PathTopology) -> WaveOrchestrator {
    let mut config = WaveConfig::default();
    config.trigger.super_wave_chance = 0.0;
    config.trigger.double_down_chance = 0.0;
    config.path.topology = topology;
    WaveOrchestrator::new(config)
}

#[test]
fn middle_origin_heading_right_respects_topology() {
    let sections = [A, B, C];
    assert_eq!(
        compute_path(&sections, B, WaveDirection::Forward, PathTopology::Linear),
        vec![B, C]
    );
    assert_eq!(
        compute_path(&sections, B, WaveDirection::Forward, PathTopology::Wrap),
        vec![B, C, A]
    );
    assert_eq!(
        compute_path(&sections, B, WaveDirection::Backward, PathTopology::Linear),
        vec![B, A]
    );
}

#[test]
fn paths_never_repeat_a_section() {
    let sections: Vec<SectionId> = (0..7).map(SectionId::new).collect();
    for topology in [PathTopology::Linear, PathTopology::Wrap] {
        for direction in [WaveDirection::Forward, WaveDirection::Backward] {
            for origin in &sections {
                let path = compute_path(&sections, *origin, direction, topology);
                let unique: HashSet<_> = path.iter().collect();
                assert_eq!(unique.len(), path.len());
                assert_eq!(path.first(), Some(origin));
            }
        }
    }
}

#[test]
fn middle_trigger_draws_its_direction() {
    let stadium = Stadium::builder()
        .sections(3, SectionPlan::default())
        .build();

    let mut rightward = orchestrator(PathTopology::Linear);
    let mut draws = ScriptedDraws::new(vec![0.2]);
    let mut events = Vec::new();
    let _ = rightward.trigger_wave_at(B, &stadium, &mut draws, &mut events);
    assert_eq!(
        created_path(&events),
        Some((vec![B, C], WaveDirection::Forward))
    );

    let mut leftward = orchestrator(PathTopology::Wrap);
    let mut draws = ScriptedDraws::new(vec![0.7]);
    let mut events = Vec::new();
    let _ = leftward.trigger_wave_at(B, &stadium, &mut draws, &mut events);
    assert_eq!(
        created_path(&events),
        Some((vec![B, A, C], WaveDirection::Backward))
    );
}

#[test]
fn edge_trigger_heads_inward_without_drawing() {
    let stadium = Stadium::builder()
        .sections(3, SectionPlan::default())
        .build();
    let mut orchestrator = orchestrator(PathTopology::Linear);
    let mut draws = ScriptedDraws::new(Vec::new());
    let mut events = Vec::new();
    let _ = orchestrator.trigger_wave_at(C, &stadium, &mut draws, &mut events);
    assert_eq!(draws.consumed(), 0);
    assert_eq!(
        created_path(&events),
        Some((vec![C, B, A], WaveDirection::Backward))
    );
}
