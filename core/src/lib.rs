#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the crowd wave engine.
//!
//! This crate defines the vocabulary that connects the venue (sections and
//! seated fans), the pure wave systems, and adapters. The venue is consumed
//! exclusively through the collaborator traits in [`venue`], systems emit
//! [`WaveEvent`] values describing what happened, and every wave instance is
//! captured by an append-only [`WaveRecord`].

mod events;
mod random;
mod record;
pub mod venue;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use self::events::{EventBus, EventKind, EventScope, SubscriptionId, WaveEvent};
pub use self::random::{RandomSource, RngSource, ScriptedDraws};
pub use self::record::{RecordError, SectionResult, WaveRecord};

/// Lowest value any section or fan statistic may take.
pub const STAT_MIN: f32 = 0.0;
/// Highest value any section or fan statistic may take.
pub const STAT_MAX: f32 = 100.0;

/// Clamps a statistic into the inclusive `[STAT_MIN, STAT_MAX]` range.
#[must_use]
pub fn clamp_stat(value: f32) -> f32 {
    if value.is_nan() {
        return STAT_MIN;
    }
    value.clamp(STAT_MIN, STAT_MAX)
}

/// Unique identifier assigned to a seating section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(u32);

impl SectionId {
    /// Creates a new section identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Monotonic identifier assigned to each wave by the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u64);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for WaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave#{}", self.0)
    }
}

/// Flavour of a wave. Only affects scoring multipliers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveKind {
    /// Regular crowd wave.
    Normal,
    /// Rare wave worth more points.
    Super,
    /// Wave where the crowd doubles down on the previous attempt.
    DoubleDown,
}

impl WaveKind {
    /// Stable lowercase label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Super => "super",
            Self::DoubleDown => "double_down",
        }
    }
}

/// Direction of travel along the ordered section layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveDirection {
    /// Travels toward increasing world X.
    Forward,
    /// Travels toward decreasing world X.
    Backward,
}

impl WaveDirection {
    /// Unit sign of travel along the X axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    /// Reports whether `position` has reached or passed `mark` when travelling in this direction.
    #[must_use]
    pub fn has_reached(self, position: f32, mark: f32) -> bool {
        match self {
            Self::Forward => position >= mark,
            Self::Backward => position <= mark,
        }
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Classification of a column or section once the wave passed through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The crowd rose cleanly.
    Success,
    /// Degraded but not failed.
    Sputter,
    /// The wave collapsed.
    Death,
}

impl Outcome {
    /// Every outcome ordered by tie-break priority (highest first).
    pub const PRIORITY: [Outcome; 3] = [Outcome::Success, Outcome::Sputter, Outcome::Death];

    /// Stable lowercase label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Sputter => "sputter",
            Self::Death => "death",
        }
    }
}

/// Cosmetic state attached to a column-reached notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnVisualState {
    /// Everyone rose on their own.
    Surge,
    /// Peer pressure pulled stragglers up at reduced effort.
    PeerPressured,
    /// Patchy participation.
    Sputter,
    /// Almost nobody stood.
    Collapse,
}

/// Aggregate statistics of one seating section.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionStats {
    /// Section the aggregates belong to.
    pub id: SectionId,
    /// Mean happiness in `[0, 100]`.
    pub happiness: f32,
    /// Mean thirst in `[0, 100]`.
    pub thirst: f32,
    /// Mean attention in `[0, 100]`.
    pub attention: f32,
    /// Multiplicative environmental modifier, `1.0` when neutral.
    pub environment: f32,
}

/// Axis-aligned bounds of a section in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectionBounds {
    /// Smallest world X covered by the section.
    pub left: f32,
    /// Largest world X covered by the section.
    pub right: f32,
    /// Smallest world Y covered by the section.
    pub top: f32,
    /// Largest world Y covered by the section.
    pub bottom: f32,
}

impl SectionBounds {
    /// Horizontal extent of the section.
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.right - self.left).abs()
    }

    /// Horizontal midpoint of the section.
    #[must_use]
    pub fn center_x(&self) -> f32 {
        (self.left + self.right) * 0.5
    }
}

/// Fixed world X at which the wave reaches one grid column.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnBoundary {
    /// Section containing the column.
    pub section: SectionId,
    /// Zero-based column index local to the section.
    pub column_index: u32,
    /// World X of the column, possibly unrolled across wrap-around jumps.
    pub world_x: f32,
}
