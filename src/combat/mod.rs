//! Combat Module
//!
//! - `hitbox`: hitbox / hurtbox descriptors, effect payloads, hit results
//! - `staging`: lock-protected hand-off from collision detection
//! - `resolve`: deduplication, classification and application of hits

pub mod hitbox;
pub mod staging;
pub mod resolve;

pub use hitbox::{AttackType, CounterKind, HitEffect, HitType, HitboxConfig, HurtboxConfig, ProcessedHitResult};
pub use staging::{CollisionStaging, RawCollision};
pub use resolve::{classify, CombatError, Combatant, HitRegistry, HitResolutionPipeline};
