use std::collections::VecDeque;

use rand::Rng;

/// Source of uniform draws in `[0, 1)`.
///
/// All probabilistic decisions in the engine flow through this trait so that
/// callers can seed or script determinism.
pub trait RandomSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f32;
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wraps the provided generator.
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Mutable access to the wrapped generator.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }
}

/// Replays a fixed sequence of draws, then repeats a fallback value.
#[derive(Clone, Debug)]
pub struct ScriptedDraws {
    draws: VecDeque<f32>,
    fallback: f32,
    consumed: usize,
}

impl ScriptedDraws {
    /// Replays `draws` in order, then yields `0.0` forever.
    #[must_use]
    pub fn new<I>(draws: I) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.0,
            consumed: 0,
        }
    }

    /// Replaces the value yielded once the scripted draws run out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f32) -> Self {
        self.fallback = fallback;
        self
    }

    /// Number of scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    /// Total number of draws handed out so far, scripted or fallback.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> f32 {
        self.consumed += 1;
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
