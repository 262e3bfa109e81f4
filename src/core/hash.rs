//! Replay verification hashes.
//!
//! SHA-256 over a fixed field order. A simulation hash and an input
//! recording hash never collide because each starts from its own domain tag.

use sha2::{Sha256, Digest};
use super::vec2::FixedVec2;

/// Hash output type (256 bits / 32 bytes)
pub type StateHash = [u8; 32];

/// Ordered SHA-256 accumulator over simulation fields.
pub struct StateHasher {
    hasher: Sha256,
}

impl StateHasher {
    /// Start a hash under `domain`.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Hasher for [`Simulation::compute_hash`](crate::game::Simulation::compute_hash).
    pub fn for_simulation() -> Self {
        Self::new(b"DUEL_CORE_STATE_V1")
    }

    /// Hasher for input recordings.
    pub fn for_inputs() -> Self {
        Self::new(b"DUEL_CORE_INPUTS_V1")
    }

    /// One byte.
    #[inline]
    pub fn update_u8(&mut self, value: u8) {
        self.hasher.update([value]);
    }

    /// Little-endian.
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Little-endian.
    #[inline]
    pub fn update_i32(&mut self, value: i32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// As a single byte.
    #[inline]
    pub fn update_bool(&mut self, value: bool) {
        self.update_u8(value as u8);
    }

    /// Both raw components, x first.
    #[inline]
    pub fn update_vec2(&mut self, value: FixedVec2) {
        self.update_i32(value.x);
        self.update_i32(value.y);
    }

    /// A buffered signal: its flag bits, then how long it has been held.
    #[inline]
    pub fn update_signal(&mut self, bits: u8, duration: u8) {
        self.hasher.update([bits, duration]);
    }

    /// Finalize and return the hash.
    pub fn finalize(self) -> StateHash {
        self.hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_hasher_determinism() {
        let make_hash = || {
            let mut hasher = StateHasher::for_simulation();
            hasher.update_u32(100);
            hasher.update_i32(-250);
            hasher.update_vec2(FixedVec2::from_ints(1, 2));
            hasher.update_signal(0b0101, 12);
            hasher.update_bool(true);
            hasher.finalize()
        };

        assert_eq!(make_hash(), make_hash());
    }

    #[test]
    fn test_hash_order_matters() {
        let hash1 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(1);
            h.update_u32(2);
            h.finalize()
        };

        let hash2 = {
            let mut h = StateHasher::new(b"test");
            h.update_u32(2);
            h.update_u32(1);
            h.finalize()
        };

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_signal_duration_is_hashed() {
        let held = |duration| {
            let mut h = StateHasher::for_inputs();
            h.update_signal(0b0001, duration);
            h.finalize()
        };
        assert_ne!(held(1), held(2));
    }

    #[test]
    fn test_domain_separation() {
        let mut a = StateHasher::for_simulation();
        let mut b = StateHasher::for_inputs();
        a.update_u32(7);
        b.update_u32(7);
        assert_ne!(a.finalize(), b.finalize());
    }
}
