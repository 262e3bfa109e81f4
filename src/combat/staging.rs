//! Collision Staging
//!
//! Hand-off point between the external collision detector and the
//! simulation. The detector may report from any thread; the simulation
//! drains everything once per tick. This is the only lock in the core.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Serialize, Deserialize};

use crate::behavior::context::CharacterId;
use super::hitbox::{CounterKind, HitboxConfig};

/// Overlap reported by collision detection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCollision {
    /// Owner of the hitbox
    pub attacker: CharacterId,
    /// Owner of the hurtbox
    pub target: CharacterId,
    /// Hitbox that overlapped
    pub hitbox: HitboxConfig,
    /// Hurtbox that was overlapped
    pub hurtbox: String,
    /// Counter status computed by the detector
    #[serde(default)]
    pub counter: CounterKind,
}

/// Shared, lock-protected staging list.
///
/// Cloning yields another handle to the same list.
#[derive(Clone, Debug, Default)]
pub struct CollisionStaging {
    queue: Arc<Mutex<Vec<RawCollision>>>,
}

impl CollisionStaging {
    /// Create an empty staging list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of collisions.
    pub fn stage<I: IntoIterator<Item = RawCollision>>(&self, collisions: I) {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.extend(collisions);
    }

    /// Take every staged collision, leaving the list empty.
    pub fn drain(&self) -> Vec<RawCollision> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *queue)
    }

    /// Number of staged collisions.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
