//! Simulation Events
//!
//! Everything observable a tick produced, for presentation, UI and replay
//! comparison. Events of one tick are ordered by [`EventPriority`], keeping
//! production order among equals.

use serde::{Serialize, Deserialize};

use crate::behavior::context::CharacterId;
use crate::behavior::state::Notification;
use crate::combat::hitbox::{HitType, ProcessedHitResult};

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Knockouts first
    KnockOut = 0,
    /// Then resolved hits
    HitResolution = 1,
    /// Then state changes
    StateChange = 2,
    /// Then hitbox / hurtbox switches
    ColliderToggle = 3,
    /// Then command bookkeeping
    Command = 4,
    /// Presentation cues last
    Presentation = 5,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventData {
    /// Health reached zero
    KnockedOut {
        /// Character knocked out
        character: CharacterId,
    },

    /// Hit applied
    HitResolved {
        /// Attacker
        attacker: CharacterId,
        /// Character hit
        target: CharacterId,
        /// Hurtbox struck
        hurtbox: String,
        /// Attack-instance group
        group: u32,
        /// Outcome class
        hit_type: HitType,
        /// Health removed
        damage: i32,
        /// Health left afterwards
        remaining_health: i32,
        /// Went through an unmodelled path (throws)
        known_gap: bool,
    },

    /// Active state changed
    StateChanged {
        /// Character
        character: CharacterId,
        /// State left
        from: String,
        /// State entered
        to: String,
    },

    /// Command recognized and queued
    CommandMatched {
        /// Character
        character: CharacterId,
        /// Command name
        command: String,
    },

    /// Queued command consumed as a trigger
    CommandConsumed {
        /// Character
        character: CharacterId,
        /// Command name
        command: String,
        /// Trigger raised
        trigger: String,
    },

    /// Notification emitted by a state
    Notified {
        /// Character
        character: CharacterId,
        /// Payload
        notification: Notification,
    },
}

/// An event with timing and priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    /// Tick when the event occurred
    pub tick: u32,
    /// Processing priority
    pub priority: EventPriority,
    /// Character involved
    pub character: Option<CharacterId>,
    /// Payload
    pub data: SimEventData,
}

impl SimEvent {
    /// Create a new event.
    pub fn new(tick: u32, priority: EventPriority, data: SimEventData) -> Self {
        let character = match &data {
            SimEventData::KnockedOut { character } => Some(*character),
            SimEventData::HitResolved { target, .. } => Some(*target),
            SimEventData::StateChanged { character, .. } => Some(*character),
            SimEventData::CommandMatched { character, .. } => Some(*character),
            SimEventData::CommandConsumed { character, .. } => Some(*character),
            SimEventData::Notified { character, .. } => Some(*character),
        };

        Self {
            tick,
            priority,
            character,
            data,
        }
    }

    /// Create knocked out event.
    pub fn knocked_out(tick: u32, character: CharacterId) -> Self {
        Self::new(tick, EventPriority::KnockOut, SimEventData::KnockedOut { character })
    }

    /// Create hit resolved event.
    pub fn hit_resolved(tick: u32, hit: &ProcessedHitResult, remaining_health: i32) -> Self {
        Self::new(
            tick,
            EventPriority::HitResolution,
            SimEventData::HitResolved {
                attacker: hit.attacker,
                target: hit.target,
                hurtbox: hit.target_hurtbox.clone(),
                group: hit.hitbox.group,
                hit_type: hit.hit_type,
                damage: hit.effect.damage,
                remaining_health,
                known_gap: hit.known_gap,
            },
        )
    }

    /// Create state changed event.
    pub fn state_changed(tick: u32, character: CharacterId, from: &str, to: &str) -> Self {
        Self::new(
            tick,
            EventPriority::StateChange,
            SimEventData::StateChanged {
                character,
                from: from.into(),
                to: to.into(),
            },
        )
    }

    /// Create command matched event.
    pub fn command_matched(tick: u32, character: CharacterId, command: &str) -> Self {
        Self::new(
            tick,
            EventPriority::Command,
            SimEventData::CommandMatched {
                character,
                command: command.into(),
            },
        )
    }

    /// Create command consumed event.
    pub fn command_consumed(tick: u32, character: CharacterId, command: &str, trigger: &str) -> Self {
        Self::new(
            tick,
            EventPriority::Command,
            SimEventData::CommandConsumed {
                character,
                command: command.into(),
                trigger: trigger.into(),
            },
        )
    }

    /// Wrap a state notification, prioritized by what it touches.
    pub fn notified(tick: u32, character: CharacterId, notification: Notification) -> Self {
        let priority = match notification {
            Notification::HitboxActivated { .. }
            | Notification::HitboxDeactivated { .. }
            | Notification::HurtboxSet { .. } => EventPriority::ColliderToggle,
            _ => EventPriority::Presentation,
        };
        Self::new(tick, priority, SimEventData::Notified { character, notification })
    }
}

/// Order a tick's events by priority, keeping production order among equals.
pub fn sort_events(events: &mut [SimEvent]) {
    events.sort_by_key(|e| e.priority);
}
