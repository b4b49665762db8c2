use std::time::Duration;

use crowd_wave_core::{SectionId, WaveId};

/// A column whose standing animation is still playing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationTicket {
    /// Wave that animated the column.
    pub wave: WaveId,
    /// Section containing the column.
    pub section: SectionId,
    /// Column index local to the section.
    pub column_index: u32,
    /// Time left before the column sits down.
    pub remaining: Duration,
}

/// Fire-and-forget countdowns for cosmetic column animations.
///
/// Nothing in wave resolution waits on the tracker; it only reports which
/// columns may be reset.
#[derive(Clone, Debug, Default)]
pub struct AnimationTracker {
    pending: Vec<AnimationTicket>,
}

impl AnimationTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a column animation.
    pub fn schedule(
        &mut self,
        wave: WaveId,
        section: SectionId,
        column_index: u32,
        duration: Duration,
    ) {
        self.pending.push(AnimationTicket {
            wave,
            section,
            column_index,
            remaining: duration,
        });
    }

    /// Animations still playing, in scheduling order.
    #[must_use]
    pub fn pending(&self) -> &[AnimationTicket] {
        &self.pending
    }

    /// Advances every ticket and moves expired ones into `expired`.
    pub fn advance(&mut self, dt: Duration, expired: &mut Vec<AnimationTicket>) {
        self.pending.retain_mut(|ticket| {
            ticket.remaining = ticket.remaining.saturating_sub(dt);
            if ticket.remaining.is_zero() {
                expired.push(*ticket);
                false
            } else {
                true
            }
        });
    }
}
