//! Character Context
//!
//! The per-character blackboard read by mapping rules, transition
//! conditions and hit classification. Each character owns exactly one;
//! other characters only ever see read-only snapshots.

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::combat::hitbox::ProcessedHitResult;
use crate::input::signal::{AttackSignal, DirectionSignal};
use super::state::StateKind;

/// Character slot in a match (0 or 1).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub u8);

impl CharacterId {
    /// The other slot of a two-character match.
    #[inline]
    pub fn opponent(self) -> Self {
        CharacterId(1 - (self.0 & 1))
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// Index of a state inside its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub u16);

/// Index of a named trigger inside its graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u16);

bitflags! {
    /// Situational flags maintained by states.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ContextFlags: u8 {
        /// Standing on the ground
        const GROUNDED = 1 << 0;
        /// In the air
        const AIRBORNE = 1 << 1;
        /// Guarding
        const BLOCKING = 1 << 2;
    }
}

/// Per-character blackboard.
#[derive(Clone, Debug)]
pub struct ContextData {
    /// Owning character
    pub owner: CharacterId,
    /// Opposing character
    pub opponent: CharacterId,
    /// Active state
    pub current_state: StateId,
    /// Kind of the active state
    pub current_kind: StateKind,
    /// Ticks spent in the active state
    pub frames_in_state: u32,
    /// Situational flags
    pub flags: ContextFlags,
    /// Newest direction signal
    pub direction: DirectionSignal,
    /// Newest attack signal
    pub attack: AttackSignal,
    /// Remaining health
    pub health: i32,
    /// Facing side
    pub facing_right: bool,
    /// One of our hits connected on the previous tick
    pub hit_confirmed_this_frame: bool,
    /// Hits we landed on the previous tick
    pub finalized_hits: Vec<ProcessedHitResult>,
}

impl ContextData {
    /// Fresh context for a character standing in `initial`.
    pub fn new(owner: CharacterId, initial: StateId, kind: StateKind, health: i32, facing_right: bool) -> Self {
        Self {
            owner,
            opponent: owner.opponent(),
            current_state: initial,
            current_kind: kind,
            frames_in_state: 0,
            flags: ContextFlags::GROUNDED,
            direction: DirectionSignal::default(),
            attack: AttackSignal::default(),
            health,
            facing_right,
            hit_confirmed_this_frame: false,
            finalized_hits: Vec::new(),
        }
    }

    /// Reset fields that only describe a single tick.
    pub fn clear_per_frame(&mut self) {
        self.hit_confirmed_this_frame = false;
        self.finalized_hits.clear();
    }
}
