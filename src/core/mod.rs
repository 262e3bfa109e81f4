//! Core deterministic primitives.
//!
//! Integer-only arithmetic and hashing shared by every simulation module.

pub mod fixed;
pub mod vec2;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use hash::{StateHash, StateHasher};
