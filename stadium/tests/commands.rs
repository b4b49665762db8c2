use std::time::Duration;

use crowd_wave_core::{
    venue::{SectionStatsProvider, Venue},
    SectionId,
};
use crowd_wave_stadium::{
    self as stadium, query, Command, LayoutConfig, SectionPlan, Stadium, StadiumEvent, StatDeltas,
};

fn plan() -> SectionPlan {
    SectionPlan {
        rows: 4,
        columns: 5,
        occupancy: 1.0,
        happiness: 50.0,
        thirst: 50.0,
        attention: 50.0,
        spread: 0.0,
        environment: 1.0,
    }
}

fn stadium() -> Stadium {
    Stadium::builder().sections(3, plan()).seed(11).build()
}

#[test]
fn decay_raises_thirst_and_drains_attention() {
    let mut stadium = stadium();
    let mut events = Vec::new();
    stadium::apply(
        &mut stadium,
        Command::Decay {
            dt: Duration::from_secs(10),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![StadiumEvent::TimeAdvanced {
            dt: Duration::from_secs(10)
        }]
    );
    let stats = stadium
        .section_stats(SectionId::new(1))
        .expect("section exists");
    assert!((stats.thirst - 58.0).abs() < 1e-3);
    assert!((stats.attention - 45.0).abs() < 1e-3);
    assert!((stats.happiness - 50.0).abs() < 1e-3);
}

#[test]
fn thirsty_fans_lose_happiness_until_served() {
    let mut stadium = stadium();
    let mut events = Vec::new();
    stadium::apply(
        &mut stadium,
        Command::AdjustSection {
            section: SectionId::new(0),
            deltas: StatDeltas {
                thirst: 30.0,
                ..StatDeltas::default()
            },
        },
        &mut events,
    );
    stadium::apply(
        &mut stadium,
        Command::Decay {
            dt: Duration::from_secs(10),
        },
        &mut events,
    );
    let parched = stadium
        .average_happiness(SectionId::new(0))
        .expect("section exists");
    assert!((parched - 47.0).abs() < 1e-3);

    stadium::apply(
        &mut stadium,
        Command::ServeSection {
            section: SectionId::new(0),
        },
        &mut events,
    );
    let stats = stadium
        .section_stats(SectionId::new(0))
        .expect("section exists");
    assert!((stats.happiness - 52.0).abs() < 1e-3);
    assert!((stats.thirst - 48.0).abs() < 1e-3);
    assert_eq!(
        events.last(),
        Some(&StadiumEvent::SectionUpdated {
            section: SectionId::new(0)
        })
    );
}

#[test]
fn unknown_sections_are_reported_not_applied() {
    let mut stadium = stadium();
    let before = stadium.list_sections();
    let mut events = Vec::new();
    stadium::apply(
        &mut stadium,
        Command::ServeSection {
            section: SectionId::new(99),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![StadiumEvent::UnknownSection {
            section: SectionId::new(99)
        }]
    );
    assert_eq!(stadium.list_sections(), before);
}

#[test]
fn environment_modifier_is_reported_in_stats() {
    let mut stadium = stadium();
    let mut events = Vec::new();
    stadium::apply(
        &mut stadium,
        Command::SetEnvironment {
            section: SectionId::new(2),
            modifier: 1.5,
        },
        &mut events,
    );
    let stats = stadium
        .section_stats(SectionId::new(2))
        .expect("section exists");
    assert_eq!(stats.environment, 1.5);

    stadium::apply(
        &mut stadium,
        Command::SetEnvironment {
            section: SectionId::new(2),
            modifier: f32::NAN,
        },
        &mut events,
    );
    assert_eq!(
        events.last(),
        Some(&StadiumEvent::EnvironmentChanged {
            section: SectionId::new(2),
            modifier: 1.0
        })
    );
}

#[test]
fn layout_can_be_detached_and_restored() {
    let mut stadium = stadium();
    assert!(stadium.spatial().is_some());

    let mut events = Vec::new();
    stadium::apply(
        &mut stadium,
        Command::ConfigureLayout { layout: None },
        &mut events,
    );
    assert!(stadium.spatial().is_none());
    assert!(query::layout(&stadium).is_none());

    stadium::apply(
        &mut stadium,
        Command::ConfigureLayout {
            layout: Some(LayoutConfig {
                column_pitch: 2.0,
                ..LayoutConfig::default()
            }),
        },
        &mut events,
    );
    let bounds = stadium
        .spatial()
        .and_then(|spatial| spatial.bounds_of(SectionId::new(0)))
        .expect("layout restored");
    assert_eq!(bounds.width(), 10.0);
    assert_eq!(
        events,
        vec![
            StadiumEvent::LayoutChanged { available: false },
            StadiumEvent::LayoutChanged { available: true },
        ]
    );
}

#[test]
fn seeded_builds_are_reproducible() {
    let noisy = SectionPlan {
        occupancy: 0.6,
        spread: 15.0,
        ..plan()
    };
    let first = Stadium::builder().sections(4, noisy).seed(99).build();
    let second = Stadium::builder().sections(4, noisy).seed(99).build();
    assert_eq!(first.list_sections(), second.list_sections());
    assert_eq!(query::seating(&first), query::seating(&second));
    assert_eq!(query::section_count(&first), 4);
}
