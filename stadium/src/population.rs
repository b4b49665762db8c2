use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use crowd_wave_core::clamp_stat;

use crate::Fan;

/// Seating plan and mood distribution for one section.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SectionPlan {
    /// Number of seat rows.
    pub rows: u32,
    /// Number of seat columns.
    pub columns: u32,
    /// Probability that a seat is occupied.
    pub occupancy: f32,
    /// Mean fan happiness.
    pub happiness: f32,
    /// Mean fan thirst.
    pub thirst: f32,
    /// Mean fan attention.
    pub attention: f32,
    /// Standard deviation applied to every stat.
    pub spread: f32,
    /// Section-wide multiplier on the participation bonus.
    pub environment: f32,
}

impl Default for SectionPlan {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 8,
            occupancy: 0.85,
            happiness: 60.0,
            thirst: 35.0,
            attention: 55.0,
            spread: 12.0,
            environment: 1.0,
        }
    }
}

/// Deterministic seat filler.
#[derive(Debug)]
pub(crate) struct Populator {
    rng: ChaCha8Rng,
}

impl Populator {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Row-major seats; `None` marks an empty seat.
    pub(crate) fn seats(&mut self, plan: &SectionPlan) -> Vec<Option<Fan>> {
        let occupancy = if plan.occupancy.is_nan() {
            0.0
        } else {
            f64::from(plan.occupancy.clamp(0.0, 1.0))
        };
        let seat_count = plan.rows as usize * plan.columns as usize;
        (0..seat_count)
            .map(|_| {
                if !self.rng.gen_bool(occupancy) {
                    return None;
                }
                let happiness = self.sample(plan.happiness, plan.spread);
                let thirst = self.sample(plan.thirst, plan.spread);
                let attention = self.sample(plan.attention, plan.spread);
                Some(Fan::new(happiness, thirst, attention))
            })
            .collect()
    }

    fn sample(&mut self, mean: f32, spread: f32) -> f32 {
        match Normal::new(mean, spread) {
            Ok(normal) if spread > 0.0 => clamp_stat(normal.sample(&mut self.rng)),
            _ => clamp_stat(mean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_fill_identically() {
        let plan = SectionPlan::default();
        let first = Populator::new(7).seats(&plan);
        let second = Populator::new(7).seats(&plan);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn zero_spread_yields_exact_means() {
        let plan = SectionPlan {
            occupancy: 1.0,
            spread: 0.0,
            ..SectionPlan::default()
        };
        let seats = Populator::new(1).seats(&plan);
        assert!(seats.iter().all(|seat| seat
            .as_ref()
            .map(|fan| fan.happiness() == 60.0 && fan.thirst() == 35.0)
            .unwrap_or(false)));
    }

    #[test]
    fn empty_occupancy_leaves_every_seat_vacant() {
        let plan = SectionPlan {
            occupancy: 0.0,
            ..SectionPlan::default()
        };
        assert!(Populator::new(3).seats(&plan).iter().all(Option::is_none));
    }

    #[test]
    fn plans_deserialize_with_defaults() {
        let plan: SectionPlan = toml::from_str("rows = 2\nhappiness = 90.0").expect("plan");
        assert_eq!(plan.rows, 2);
        assert_eq!(plan.happiness, 90.0);
        assert_eq!(plan.columns, SectionPlan::default().columns);
    }
}
