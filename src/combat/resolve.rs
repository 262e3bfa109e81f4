//! Hit Resolution Pipeline
//!
//! Turns staged raw collisions into applied hits:
//!
//! ```text
//!   staging ──drain──► dedup (group × target) ──► classify ──► select payload ──► apply
//! ```
//!
//! Each attack-instance group hits a given target at most once per attack
//! activation. The registry backing that rule belongs to the attacker and is
//! reset whenever its attack state is entered.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, warn};

use crate::behavior::context::{CharacterId, ContextData};
use crate::behavior::state::StateKind;
use crate::input::signal::Direction;
use super::hitbox::{AttackType, CounterKind, HitType, ProcessedHitResult};
use super::staging::{CollisionStaging, RawCollision};

/// Hit resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    /// Hit type without an effect payload reached payload selection.
    #[error("hit type {0:?} has no effect payload")]
    NoPayload(HitType),
    /// Collision names a character that is not in the match.
    #[error("collision references unknown character {0}")]
    UnknownCharacter(CharacterId),
    /// Collision where attacker and target are the same character.
    #[error("character {0} cannot hit itself")]
    SelfHit(CharacterId),
}

// =============================================================================
// HIT REGISTRY
// =============================================================================

/// Targets already hit by each attack-instance group in the current activation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HitRegistry {
    groups: BTreeMap<u32, BTreeSet<CharacterId>>,
}

impl HitRegistry {
    /// Whether `group` already hit `target`.
    pub fn has_hit(&self, group: u32, target: CharacterId) -> bool {
        self.groups.get(&group).is_some_and(|targets| targets.contains(&target))
    }

    /// Record a hit. Returns false if it was already recorded.
    pub fn register(&mut self, group: u32, target: CharacterId) -> bool {
        self.groups.entry(group).or_default().insert(target)
    }

    /// Forget every hit (new attack activation).
    pub fn reset(&mut self) {
        self.groups.clear();
    }

    /// Whether nothing has been hit.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Result of classifying one collision against its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// Outcome class
    pub hit_type: HitType,
    /// Went through the unmodelled throw path
    pub known_gap: bool,
}

/// Whether holding `direction` guards an attack of `attack_type`.
///
/// `None` for throws, which no guard stops.
pub fn guards(attack_type: AttackType, direction: Direction) -> Option<bool> {
    match attack_type {
        AttackType::High => Some(direction.contains(Direction::BACK)),
        AttackType::Low => Some(direction.contains(Direction::BACK | Direction::DOWN)),
        AttackType::Overhead => Some(direction.contains(Direction::BACK) && !direction.contains(Direction::DOWN)),
        AttackType::Throw => None,
    }
}

/// Classify a collision from the target's current state and held direction.
///
/// Precedence: hit stun, block stun, non-guarding state, then the guard
/// test. Counter status from the detector upgrades a clean hit, except on a
/// target already in hit stun.
pub fn classify(target: &ContextData, attack_type: AttackType, counter: CounterKind) -> Classification {
    let mut known_gap = false;

    if target.current_kind == StateKind::HitStun {
        return Classification { hit_type: HitType::NormalHit, known_gap };
    }

    let blocked = match target.current_kind {
        StateKind::BlockStun => true,
        kind if !kind.can_guard() => false,
        _ => match guards(attack_type, target.direction.flags) {
            Some(blocked) => blocked,
            None => {
                warn!(defender = %target.owner, "throw resolution is not implemented, treating as unguardable");
                known_gap = true;
                false
            }
        },
    };

    let hit_type = if blocked {
        HitType::Blocked
    } else {
        match counter {
            CounterKind::None => HitType::NormalHit,
            CounterKind::Counter => HitType::CounterHit,
            CounterKind::Punish => HitType::PunishCounter,
        }
    };

    Classification { hit_type, known_gap }
}

// =============================================================================
// PIPELINE
// =============================================================================

/// Participant in hit resolution.
pub trait Combatant {
    /// Slot of this character.
    fn id(&self) -> CharacterId;
    /// Read-only blackboard, used to classify incoming hits.
    fn context(&self) -> &ContextData;
    /// Registry of this character's own attacks.
    fn registry_mut(&mut self) -> &mut HitRegistry;
    /// Apply an incoming hit (damage, stun, knockback, forced state).
    fn apply_hit(&mut self, hit: &ProcessedHitResult);
}

/// Drains staged collisions and resolves them into applied hits.
#[derive(Clone, Debug, Default)]
pub struct HitResolutionPipeline {
    staging: CollisionStaging,
}

impl HitResolutionPipeline {
    /// Create a pipeline with its own staging list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer handle for the collision detector.
    pub fn staging(&self) -> CollisionStaging {
        self.staging.clone()
    }

    /// Resolve everything staged since the last call, in staging order.
    ///
    /// Returns the hits that were applied.
    pub fn process<C: Combatant>(&self, fighters: &mut [C]) -> Result<Vec<ProcessedHitResult>, CombatError> {
        let mut applied = Vec::new();

        for raw in self.staging.drain() {
            if let Some(hit) = resolve_one(fighters, raw)? {
                applied.push(hit);
            }
        }

        Ok(applied)
    }
}

fn index_of<C: Combatant>(fighters: &[C], id: CharacterId) -> Result<usize, CombatError> {
    fighters
        .iter()
        .position(|f| f.id() == id)
        .ok_or(CombatError::UnknownCharacter(id))
}

fn resolve_one<C: Combatant>(fighters: &mut [C], raw: RawCollision) -> Result<Option<ProcessedHitResult>, CombatError> {
    if raw.attacker == raw.target {
        return Err(CombatError::SelfHit(raw.attacker));
    }
    let attacker = index_of(fighters, raw.attacker)?;
    let target = index_of(fighters, raw.target)?;
    let group = raw.hitbox.group;

    if fighters[attacker].registry_mut().has_hit(group, raw.target) {
        return Ok(None);
    }

    let classification = classify(fighters[target].context(), raw.hitbox.attack_type, raw.counter);
    if classification.hit_type == HitType::None {
        return Ok(None);
    }

    fighters[attacker].registry_mut().register(group, raw.target);
    let effect = raw.hitbox.effect_for(classification.hit_type)?;

    let hit = ProcessedHitResult {
        attacker: raw.attacker,
        target: raw.target,
        target_hurtbox: raw.hurtbox,
        hitbox: raw.hitbox,
        effect,
        hit_type: classification.hit_type,
        known_gap: classification.known_gap,
    };

    debug!(
        attacker = %hit.attacker,
        defender = %hit.target,
        hurtbox = %hit.target_hurtbox,
        group,
        hit_type = ?hit.hit_type,
        damage = effect.damage,
        "hit resolved"
    );

    fighters[target].apply_hit(&hit);
    Ok(Some(hit))
}

// =============================================================================
// TESTS
// =============================================================================
