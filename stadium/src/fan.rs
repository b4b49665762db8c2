use crowd_wave_core::{clamp_stat, venue::FanParticipant};

const PERSONAL_BASE: f32 = 10.0;
const HAPPINESS_WEIGHT: f32 = 0.6;
const ATTENTION_WEIGHT: f32 = 0.4;
const THIRST_WEIGHT: f32 = 0.2;

/// A spectator occupying one seat.
#[derive(Clone, Debug, PartialEq)]
pub struct Fan {
    happiness: f32,
    thirst: f32,
    attention: f32,
    strength_modifier: f32,
    will_participate: bool,
    reduced_effort: bool,
    animating: bool,
}

impl Fan {
    /// Creates a fan with clamped personal statistics.
    #[must_use]
    pub fn new(happiness: f32, thirst: f32, attention: f32) -> Self {
        Self {
            happiness: clamp_stat(happiness),
            thirst: clamp_stat(thirst),
            attention: clamp_stat(attention),
            strength_modifier: 0.0,
            will_participate: false,
            reduced_effort: false,
            animating: false,
        }
    }

    /// Personal happiness in `[0, 100]`.
    #[must_use]
    pub fn happiness(&self) -> f32 {
        self.happiness
    }

    /// Personal thirst in `[0, 100]`.
    #[must_use]
    pub fn thirst(&self) -> f32 {
        self.thirst
    }

    /// Personal attention in `[0, 100]`.
    #[must_use]
    pub fn attention(&self) -> f32 {
        self.attention
    }

    /// Whether the standing animation is still playing.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub(crate) fn adjust(&mut self, happiness: f32, thirst: f32, attention: f32) {
        self.happiness = clamp_stat(self.happiness + happiness);
        self.thirst = clamp_stat(self.thirst + thirst);
        self.attention = clamp_stat(self.attention + attention);
    }
}

impl FanParticipant for Fan {
    fn personal_chance(&self) -> f32 {
        PERSONAL_BASE + self.happiness * HAPPINESS_WEIGHT + self.attention * ATTENTION_WEIGHT
            - self.thirst * THIRST_WEIGHT
    }

    fn strength_modifier(&self) -> f32 {
        self.strength_modifier
    }

    fn set_strength_modifier(&mut self, value: f32) {
        self.strength_modifier = value;
    }

    fn will_participate(&self) -> bool {
        self.will_participate
    }

    fn set_will_participate(&mut self, value: bool) {
        self.will_participate = value;
    }

    fn reduced_effort(&self) -> bool {
        self.reduced_effort
    }

    fn set_reduced_effort(&mut self, value: bool) {
        self.reduced_effort = value;
    }

    fn set_animating(&mut self, value: bool) {
        self.animating = value;
    }

    fn reset_wave_state(&mut self) {
        self.strength_modifier = 0.0;
        self.will_participate = false;
        self.reduced_effort = false;
        self.animating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_chance_blends_stats() {
        let fan = Fan::new(50.0, 50.0, 50.0);
        assert!((fan.personal_chance() - 50.0).abs() < 1e-4);
        let parched = Fan::new(50.0, 100.0, 50.0);
        assert!(parched.personal_chance() < fan.personal_chance());
    }

    #[test]
    fn reset_clears_wave_scoped_fields() {
        let mut fan = Fan::new(80.0, 10.0, 60.0);
        fan.set_strength_modifier(4.0);
        fan.set_will_participate(true);
        fan.set_reduced_effort(true);
        fan.set_animating(true);
        fan.reset_wave_state();
        assert_eq!(fan, Fan::new(80.0, 10.0, 60.0));
    }

    #[test]
    fn adjustments_stay_in_range() {
        let mut fan = Fan::new(95.0, 5.0, 50.0);
        fan.adjust(20.0, -20.0, 0.0);
        assert_eq!(fan.happiness(), 100.0);
        assert_eq!(fan.thirst(), 0.0);
    }
}
