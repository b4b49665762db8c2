#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reference venue for the crowd wave engine.
//!
//! A [`Stadium`] is a left-to-right row of seated sections. It owns every fan,
//! answers the engine's read-only aggregate queries and hands out mutable seat
//! columns while a wave passes. Ambient mood changes flow through [`apply`].

mod fan;
mod layout;
mod population;

use std::time::Duration;

use crowd_wave_core::{
    clamp_stat,
    venue::{FanParticipant, SeatColumns, SectionStatsProvider, SpatialMapping, Venue},
    SectionId, SectionStats,
};

pub use fan::Fan;
pub use layout::{GridLayout, LayoutConfig};
pub use population::SectionPlan;

use population::Populator;

const DEFAULT_SEED: u64 = 0x5eed_ba11_c0de_f00d;

const THIRST_PER_SECOND: f32 = 0.8;
const ATTENTION_DECAY_PER_SECOND: f32 = 0.5;
const THIRSTY_THRESHOLD: f32 = 70.0;
const THIRSTY_HAPPINESS_PER_SECOND: f32 = 0.3;

const SERVE_THIRST_RELIEF: f32 = 40.0;
const SERVE_HAPPINESS_GAIN: f32 = 5.0;

/// Changes the stadium accepts from drivers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances ambient mood drift by `dt`.
    Decay {
        /// Simulated time elapsed.
        dt: Duration,
    },
    /// A vendor serves every fan of a section.
    ServeSection {
        /// Section being served.
        section: SectionId,
    },
    /// Shifts the stats of every fan in a section.
    AdjustSection {
        /// Target section.
        section: SectionId,
        /// Per-stat deltas applied to each fan.
        deltas: StatDeltas,
    },
    /// Replaces a section's environment modifier.
    SetEnvironment {
        /// Target section.
        section: SectionId,
        /// New multiplier.
        modifier: f32,
    },
    /// Installs or removes the spatial layout.
    ConfigureLayout {
        /// Layout to install; `None` detaches it.
        layout: Option<LayoutConfig>,
    },
}

/// Additive changes to a fan's stats.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatDeltas {
    /// Happiness delta.
    pub happiness: f32,
    /// Thirst delta.
    pub thirst: f32,
    /// Attention delta.
    pub attention: f32,
}

/// Facts emitted by the stadium after applying a command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StadiumEvent {
    /// Ambient drift was applied.
    TimeAdvanced {
        /// Simulated time elapsed.
        dt: Duration,
    },
    /// A section's stats changed.
    SectionUpdated {
        /// Section whose aggregates moved.
        section: SectionId,
    },
    /// A section's environment modifier changed.
    EnvironmentChanged {
        /// Target section.
        section: SectionId,
        /// New multiplier.
        modifier: f32,
    },
    /// The spatial layout was installed or removed.
    LayoutChanged {
        /// Whether a layout is now available.
        available: bool,
    },
    /// A command referenced a section that does not exist.
    UnknownSection {
        /// Offending identifier.
        section: SectionId,
    },
}

#[derive(Clone, Debug)]
struct Section {
    id: SectionId,
    rows: u32,
    columns: u32,
    environment: f32,
    fallback: SectionPlan,
    seats: Vec<Option<Fan>>,
}

impl Section {
    fn fans(&self) -> impl Iterator<Item = &Fan> {
        self.seats.iter().flatten()
    }

    fn fans_mut(&mut self) -> impl Iterator<Item = &mut Fan> {
        self.seats.iter_mut().flatten()
    }

    fn occupied(&self) -> usize {
        self.fans().count()
    }

    fn stats(&self) -> SectionStats {
        let count = self.occupied();
        if count == 0 {
            return SectionStats {
                id: self.id,
                happiness: clamp_stat(self.fallback.happiness),
                thirst: clamp_stat(self.fallback.thirst),
                attention: clamp_stat(self.fallback.attention),
                environment: self.environment,
            };
        }
        let (happiness, thirst, attention) =
            self.fans().fold((0.0, 0.0, 0.0), |(h, t, a), fan| {
                (h + fan.happiness(), t + fan.thirst(), a + fan.attention())
            });
        let count = count as f32;
        SectionStats {
            id: self.id,
            happiness: happiness / count,
            thirst: thirst / count,
            attention: attention / count,
            environment: self.environment,
        }
    }

    fn column_mut(&mut self, column: u32) -> impl Iterator<Item = &mut Fan> {
        let columns = self.columns.max(1) as usize;
        let column = column as usize;
        let in_range = column < self.columns as usize;
        self.seats
            .iter_mut()
            .enumerate()
            .filter(move |(index, _)| in_range && index % columns == column)
            .filter_map(|(_, seat)| seat.as_mut())
    }
}

/// Builder for [`Stadium`].
#[derive(Clone, Debug)]
pub struct StadiumBuilder {
    plans: Vec<SectionPlan>,
    layout: Option<LayoutConfig>,
    seed: u64,
}

impl Default for StadiumBuilder {
    fn default() -> Self {
        Self {
            plans: Vec::new(),
            layout: Some(LayoutConfig::default()),
            seed: DEFAULT_SEED,
        }
    }
}

impl StadiumBuilder {
    /// Appends one section to the right of the existing ones.
    #[must_use]
    pub fn section(mut self, plan: SectionPlan) -> Self {
        self.plans.push(plan);
        self
    }

    /// Appends `count` identical sections.
    #[must_use]
    pub fn sections(mut self, count: u32, plan: SectionPlan) -> Self {
        self.plans.extend(std::iter::repeat(plan).take(count as usize));
        self
    }

    /// Uses the provided layout geometry.
    #[must_use]
    pub fn layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Builds the stadium without any spatial layout.
    #[must_use]
    pub fn without_layout(mut self) -> Self {
        self.layout = None;
        self
    }

    /// Seeds fan population.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Populates every section and resolves the layout.
    #[must_use]
    pub fn build(self) -> Stadium {
        let mut populator = Populator::new(self.seed);
        let sections: Vec<Section> = self
            .plans
            .iter()
            .enumerate()
            .map(|(index, plan)| Section {
                id: SectionId::new(index as u32),
                rows: plan.rows,
                columns: plan.columns,
                environment: plan.environment,
                fallback: *plan,
                seats: populator.seats(plan),
            })
            .collect();
        let mut stadium = Stadium {
            sections,
            layout: None,
        };
        stadium.install_layout(self.layout);
        stadium
    }
}

/// Seated sections plus optional geometry.
#[derive(Clone, Debug)]
pub struct Stadium {
    sections: Vec<Section>,
    layout: Option<GridLayout>,
}

impl Stadium {
    /// Starts building a stadium.
    #[must_use]
    pub fn builder() -> StadiumBuilder {
        StadiumBuilder::default()
    }

    fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    fn section_mut(&mut self, id: SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.id == id)
    }

    fn install_layout(&mut self, config: Option<LayoutConfig>) {
        self.layout = config.map(|config| {
            let shape: Vec<(SectionId, u32, u32)> = self
                .sections
                .iter()
                .map(|section| (section.id, section.rows, section.columns))
                .collect();
            GridLayout::new(config, &shape)
        });
    }
}

/// Applies a command to the stadium, recording resulting events.
pub fn apply(stadium: &mut Stadium, command: Command, out_events: &mut Vec<StadiumEvent>) {
    match command {
        Command::Decay { dt } => {
            let seconds = dt.as_secs_f32();
            for section in &mut stadium.sections {
                for fan in section.fans_mut() {
                    let thirsty = fan.thirst() >= THIRSTY_THRESHOLD;
                    let happiness = if thirsty {
                        -THIRSTY_HAPPINESS_PER_SECOND * seconds
                    } else {
                        0.0
                    };
                    fan.adjust(
                        happiness,
                        THIRST_PER_SECOND * seconds,
                        -ATTENTION_DECAY_PER_SECOND * seconds,
                    );
                }
            }
            out_events.push(StadiumEvent::TimeAdvanced { dt });
        }
        Command::ServeSection { section } => match stadium.section_mut(section) {
            Some(target) => {
                for fan in target.fans_mut() {
                    fan.adjust(SERVE_HAPPINESS_GAIN, -SERVE_THIRST_RELIEF, 0.0);
                }
                out_events.push(StadiumEvent::SectionUpdated { section });
            }
            None => out_events.push(StadiumEvent::UnknownSection { section }),
        },
        Command::AdjustSection { section, deltas } => match stadium.section_mut(section) {
            Some(target) => {
                for fan in target.fans_mut() {
                    fan.adjust(deltas.happiness, deltas.thirst, deltas.attention);
                }
                out_events.push(StadiumEvent::SectionUpdated { section });
            }
            None => out_events.push(StadiumEvent::UnknownSection { section }),
        },
        Command::SetEnvironment { section, modifier } => match stadium.section_mut(section) {
            Some(target) => {
                let modifier = if modifier.is_finite() {
                    modifier.max(0.0)
                } else {
                    1.0
                };
                target.environment = modifier;
                out_events.push(StadiumEvent::EnvironmentChanged { section, modifier });
            }
            None => out_events.push(StadiumEvent::UnknownSection { section }),
        },
        Command::ConfigureLayout { layout } => {
            stadium.install_layout(layout);
            out_events.push(StadiumEvent::LayoutChanged {
                available: stadium.layout.is_some(),
            });
        }
    }
}

impl SectionStatsProvider for Stadium {
    fn list_sections(&self) -> Vec<SectionStats> {
        self.sections.iter().map(Section::stats).collect()
    }

    fn average_happiness(&self, section: SectionId) -> Option<f32> {
        self.section(section).map(|section| section.stats().happiness)
    }

    fn section_stats(&self, section: SectionId) -> Option<SectionStats> {
        self.section(section).map(Section::stats)
    }
}

impl SeatColumns for Stadium {
    fn column_fans_mut(&mut self, section: SectionId, column: u32) -> Vec<&mut dyn FanParticipant> {
        match self.section_mut(section) {
            Some(section) => section
                .column_mut(column)
                .map(|fan| fan as &mut dyn FanParticipant)
                .collect(),
            None => Vec::new(),
        }
    }

    fn reset_wave_state(&mut self) {
        for section in &mut self.sections {
            for fan in section.fans_mut() {
                fan.reset_wave_state();
            }
        }
    }

    fn finish_column_animation(&mut self, section: SectionId, column: u32) {
        if let Some(section) = self.section_mut(section) {
            for fan in section.column_mut(column) {
                fan.set_animating(false);
            }
        }
    }
}

impl Venue for Stadium {
    fn spatial(&self) -> Option<&dyn SpatialMapping> {
        self.layout
            .as_ref()
            .map(|layout| layout as &dyn SpatialMapping)
    }
}

/// Read-only views over the stadium.
pub mod query {
    use crowd_wave_core::SectionId;

    use super::{Fan, GridLayout, Stadium};

    /// Seating summary of one section.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct SeatingSnapshot {
        /// Section identifier.
        pub section: SectionId,
        /// Seat rows.
        pub rows: u32,
        /// Seat columns.
        pub columns: u32,
        /// Occupied seats.
        pub occupied: usize,
        /// Fans currently standing.
        pub animating: usize,
    }

    /// Number of sections, left to right.
    #[must_use]
    pub fn section_count(stadium: &Stadium) -> usize {
        stadium.sections.len()
    }

    /// Seating summaries in layout order.
    #[must_use]
    pub fn seating(stadium: &Stadium) -> Vec<SeatingSnapshot> {
        stadium
            .sections
            .iter()
            .map(|section| SeatingSnapshot {
                section: section.id,
                rows: section.rows,
                columns: section.columns,
                occupied: section.occupied(),
                animating: section.fans().filter(|fan| fan.is_animating()).count(),
            })
            .collect()
    }

    /// Fan seated at `row`/`column`, if any.
    #[must_use]
    pub fn fan(stadium: &Stadium, section: SectionId, row: u32, column: u32) -> Option<&Fan> {
        let section = stadium.section(section)?;
        if row >= section.rows || column >= section.columns {
            return None;
        }
        let index = row as usize * section.columns as usize + column as usize;
        section.seats.get(index)?.as_ref()
    }

    /// Installed layout, if any.
    #[must_use]
    pub fn layout(stadium: &Stadium) -> Option<&GridLayout> {
        stadium.layout.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_plan() -> SectionPlan {
        SectionPlan {
            rows: 3,
            columns: 4,
            occupancy: 1.0,
            spread: 0.0,
            ..SectionPlan::default()
        }
    }

    #[test]
    fn builder_assigns_sequential_ids() {
        let stadium = Stadium::builder().sections(3, full_plan()).build();
        let ids: Vec<u32> = stadium
            .list_sections()
            .iter()
            .map(|stats| stats.id.get())
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(stadium.spatial().is_some());
    }

    #[test]
    fn column_fans_span_every_row() {
        let mut stadium = Stadium::builder().sections(1, full_plan()).build();
        assert_eq!(stadium.column_fans_mut(SectionId::new(0), 2).len(), 3);
        assert!(stadium.column_fans_mut(SectionId::new(0), 4).is_empty());
        assert!(stadium.column_fans_mut(SectionId::new(7), 0).is_empty());
    }

    #[test]
    fn empty_section_reports_plan_means() {
        let plan = SectionPlan {
            occupancy: 0.0,
            happiness: 42.0,
            ..SectionPlan::default()
        };
        let stadium = Stadium::builder().section(plan).build();
        assert_eq!(stadium.average_happiness(SectionId::new(0)), Some(42.0));
    }

    #[test]
    fn finishing_a_column_only_touches_that_column() {
        let mut stadium = Stadium::builder().sections(1, full_plan()).build();
        for column in 0..2 {
            for fan in stadium.column_fans_mut(SectionId::new(0), column) {
                fan.set_animating(true);
            }
        }
        stadium.finish_column_animation(SectionId::new(0), 0);
        let seating = query::seating(&stadium);
        assert_eq!(seating[0].animating, 3);
        assert!(!query::fan(&stadium, SectionId::new(0), 1, 0)
            .expect("seated")
            .is_animating());
        assert!(query::fan(&stadium, SectionId::new(0), 1, 1)
            .expect("seated")
            .is_animating());
    }
}
