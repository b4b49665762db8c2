use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    ColumnVisualState, Outcome, SectionId, SectionResult, WaveDirection, WaveId, WaveKind,
};

/// Notifications broadcast by the wave engine. Consumers never reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WaveEvent {
    /// A trigger fired and a new wave record exists.
    WaveCreated {
        /// Identifier of the new wave.
        wave: WaveId,
        /// Scoring flavour of the wave.
        kind: WaveKind,
        /// Section the wave starts from.
        origin: SectionId,
        /// Ordered sections the wave will travel through.
        path: Vec<SectionId>,
        /// Direction of travel.
        direction: WaveDirection,
    },
    /// The "incoming" countdown started.
    CountdownStarted {
        /// Wave being announced.
        wave: WaveId,
        /// Section the wave starts from.
        origin: SectionId,
        /// Time until visible propagation.
        duration: Duration,
    },
    /// The cursor was spawned and the wave became visible.
    PropagationStarted {
        /// Wave that started moving.
        wave: WaveId,
        /// Number of column boundaries the cursor will cross.
        columns: usize,
    },
    /// The cursor crossed one column and its fans were resolved.
    ColumnReached {
        /// Wave that reached the column.
        wave: WaveId,
        /// Section containing the column.
        section: SectionId,
        /// Column index local to the section.
        column_index: u32,
        /// Raw participation rate before peer pressure.
        participation_rate: f32,
        /// Cosmetic state to present for the column.
        visual_state: ColumnVisualState,
    },
    /// All columns of a section were aggregated into one outcome.
    SectionComplete {
        /// Wave the section belongs to.
        wave: WaveId,
        /// Section that completed.
        section: SectionId,
        /// Majority outcome.
        outcome: Outcome,
        /// Mean raw participation across the section's columns.
        aggregate_participation: f32,
    },
    /// The cursor reached the end of the path.
    WaveComplete {
        /// Wave that finished.
        wave: WaveId,
        /// `true` when no section died.
        success: bool,
        /// Per-section outcomes in path order.
        results: Vec<SectionResult>,
    },
    /// The global cooldown started.
    WaveCooldownStarted {
        /// Whether the finished wave succeeded.
        success: bool,
        /// Gap before the next wave may trigger.
        cooldown: Duration,
    },
    /// The active wave's strength changed.
    StrengthChanged {
        /// Wave whose strength changed.
        wave: WaveId,
        /// Strength before the change.
        previous: f32,
        /// Strength after the change.
        current: f32,
    },
    /// Cosmetic animation for a column finished.
    ColumnAnimationComplete {
        /// Wave that animated the column.
        wave: WaveId,
        /// Section containing the column.
        section: SectionId,
        /// Column index local to the section.
        column_index: u32,
    },
}

impl WaveEvent {
    /// Discriminant of the event, used for scoped subscriptions.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::WaveCreated { .. } => EventKind::WaveCreated,
            Self::CountdownStarted { .. } => EventKind::CountdownStarted,
            Self::PropagationStarted { .. } => EventKind::PropagationStarted,
            Self::ColumnReached { .. } => EventKind::ColumnReached,
            Self::SectionComplete { .. } => EventKind::SectionComplete,
            Self::WaveComplete { .. } => EventKind::WaveComplete,
            Self::WaveCooldownStarted { .. } => EventKind::WaveCooldownStarted,
            Self::StrengthChanged { .. } => EventKind::StrengthChanged,
            Self::ColumnAnimationComplete { .. } => EventKind::ColumnAnimationComplete,
        }
    }
}

/// Event categories a subscriber can listen to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// See [`WaveEvent::WaveCreated`].
    WaveCreated,
    /// See [`WaveEvent::CountdownStarted`].
    CountdownStarted,
    /// See [`WaveEvent::PropagationStarted`].
    PropagationStarted,
    /// See [`WaveEvent::ColumnReached`].
    ColumnReached,
    /// See [`WaveEvent::SectionComplete`].
    SectionComplete,
    /// See [`WaveEvent::WaveComplete`].
    WaveComplete,
    /// See [`WaveEvent::WaveCooldownStarted`].
    WaveCooldownStarted,
    /// See [`WaveEvent::StrengthChanged`].
    StrengthChanged,
    /// See [`WaveEvent::ColumnAnimationComplete`].
    ColumnAnimationComplete,
}

/// Which events a subscription receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// Every published event.
    All,
    /// Only events of one category.
    Only(EventKind),
}

impl EventScope {
    fn admits(self, event: &WaveEvent) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => event.kind() == kind,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&WaveEvent)>;

struct Subscriber {
    id: SubscriptionId,
    scope: EventScope,
    handler: Handler,
}

/// Typed publish/subscribe fan-out for [`WaveEvent`]s.
///
/// Subscribers are invoked synchronously in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    next_id: u64,
}

impl EventBus {
    /// Creates a bus without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every event admitted by `scope`.
    pub fn subscribe<F>(&mut self, scope: EventScope, handler: F) -> SubscriptionId
    where
        F: FnMut(&WaveEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.subscribers.push(Subscriber {
            id,
            scope,
            handler: Box::new(handler),
        });
        id
    }

    /// Removes a subscription. Returns `false` when the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|subscriber| subscriber.id != id);
        before != self.subscribers.len()
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers every event to each matching subscriber.
    pub fn publish(&mut self, events: &[WaveEvent]) {
        for event in events {
            for subscriber in &mut self.subscribers {
                if subscriber.scope.admits(event) {
                    (subscriber.handler)(event);
                }
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
