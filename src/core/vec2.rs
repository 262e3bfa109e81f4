//! Facing-relative fixed-point vectors.
//!
//! Hitbox offsets, hitbox sizes, launch velocities and knockback impulses.
//! Content is authored for a character facing right; [`FixedVec2::facing`]
//! mirrors it into world space.

use std::fmt;
use serde::{Serialize, Deserialize};

use super::fixed::{Fixed, FIXED_SCALE, signed_by, to_float};

/// 2D vector with fixed-point components.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixedVec2 {
    /// Horizontal component, positive away from the owner's back
    pub x: Fixed,
    /// Vertical component, positive up
    pub y: Fixed,
}

impl FixedVec2 {
    /// No displacement.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// From raw fixed-point components.
    #[inline]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// From whole units, for authored content.
    #[inline]
    pub const fn from_ints(x: i32, y: i32) -> Self {
        Self {
            x: x << FIXED_SCALE,
            y: y << FIXED_SCALE,
        }
    }

    /// Mirror the horizontal component unless facing right.
    #[inline]
    pub fn facing(self, facing_right: bool) -> Self {
        Self {
            x: signed_by(self.x, facing_right),
            y: self.y,
        }
    }

    /// Whether this would move nothing.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl fmt::Debug for FixedVec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedVec2({:.3}, {:.3})", to_float(self.x), to_float(self.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::FIXED_ONE;

    #[test]
    fn test_vec2_from_ints() {
        let v = FixedVec2::from_ints(2, -1);
        assert_eq!(v.x, 2 * FIXED_ONE);
        assert_eq!(v.y, -FIXED_ONE);
        assert!(!v.is_zero());
        assert!(FixedVec2::ZERO.is_zero());
    }

    #[test]
    fn test_vec2_facing_mirrors_x_only() {
        let knockback = FixedVec2::from_ints(3, 1);
        assert_eq!(knockback.facing(true), knockback);
        assert_eq!(knockback.facing(false), FixedVec2::from_ints(-3, 1));
    }

    #[test]
    fn test_vec2_debug_in_units() {
        let launch = FixedVec2::new(FIXED_ONE / 2, -2 * FIXED_ONE);
        assert_eq!(format!("{:?}", launch), "FixedVec2(0.500, -2.000)");
    }
}
