//! Hitbox, Hurtbox and Hit Effect Types
//!
//! Static descriptors authored per attack, and the result record produced
//! for every hit that survives deduplication.

use serde::{Serialize, Deserialize};

use crate::behavior::context::CharacterId;
use crate::core::vec2::FixedVec2;
use super::resolve::CombatError;

/// Height class of an attack, which decides how it can be guarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    /// Guarded standing or crouching while holding back.
    High,
    /// Guarded only holding back and down.
    Low,
    /// Guarded only holding back while standing.
    Overhead,
    /// Cannot be guarded.
    Throw,
}

/// Outcome class of a hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HitType {
    /// No interaction
    None = 0,
    /// Clean hit
    NormalHit = 1,
    /// Hit during the target's own attack startup
    CounterHit = 2,
    /// Hit during the target's attack recovery
    PunishCounter = 3,
    /// Guarded
    Blocked = 4,
}

/// Counter status of a collision, computed by the collision producer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterKind {
    /// Plain collision
    #[default]
    None,
    /// Counter hit
    Counter,
    /// Punish counter
    Punish,
}

/// Damage, stun and knockback applied to a target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitEffect {
    /// Health removed
    pub damage: i32,
    /// Stun length in ticks
    pub recovery_frames: u32,
    /// Impulse applied to the target, authored facing right
    #[serde(default)]
    pub knockback: FixedVec2,
}

/// Attack hitbox descriptor with its four outcome payloads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitboxConfig {
    /// Attack-instance group. One hit per target per group per activation.
    pub group: u32,
    /// Offset from the character origin
    #[serde(default)]
    pub offset: FixedVec2,
    /// Box extents
    #[serde(default)]
    pub size: FixedVec2,
    /// Physics layer mask of valid targets
    #[serde(default)]
    pub target_layer: u32,
    /// Guard class
    pub attack_type: AttackType,
    /// Applied when guarded
    pub on_block: HitEffect,
    /// Applied on a clean hit
    pub on_hit: HitEffect,
    /// Applied on a counter hit
    pub on_counter: HitEffect,
    /// Applied on a punish counter
    pub on_punish_counter: HitEffect,
}

impl HitboxConfig {
    /// Payload for a hit type.
    pub fn effect_for(&self, hit_type: HitType) -> Result<HitEffect, CombatError> {
        match hit_type {
            HitType::Blocked => Ok(self.on_block),
            HitType::NormalHit => Ok(self.on_hit),
            HitType::CounterHit => Ok(self.on_counter),
            HitType::PunishCounter => Ok(self.on_punish_counter),
            HitType::None => Err(CombatError::NoPayload(hit_type)),
        }
    }
}

/// Hurtbox descriptor toggled by attack sub-events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurtboxConfig {
    /// Hurtbox name on the character
    pub id: String,
    /// Offset from the character origin
    #[serde(default)]
    pub offset: FixedVec2,
    /// Box extents
    #[serde(default)]
    pub size: FixedVec2,
    /// State while the sub-event is active
    pub active: bool,
}

/// Hit that survived deduplication, with the payload to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedHitResult {
    /// Attacking character
    pub attacker: CharacterId,
    /// Character hit
    pub target: CharacterId,
    /// Hurtbox that was struck
    pub target_hurtbox: String,
    /// Source hitbox
    pub hitbox: HitboxConfig,
    /// Payload selected by `hit_type`
    pub effect: HitEffect,
    /// Outcome class
    pub hit_type: HitType,
    /// Resolved through a path that is not modelled yet (throws)
    pub known_gap: bool,
}
