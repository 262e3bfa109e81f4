//! Q16.16 fixed-point scalars.
//!
//! Locomotion speeds, launch velocities and knockback are stored as `i32`
//! with sixteen fractional bits. Nothing inside a tick touches a float;
//! [`to_float`] exists only for log and debug output.

/// Q16.16 fixed-point number stored as i32.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

// =============================================================================
// LOCOMOTION CONSTANTS
// =============================================================================

/// Forward walk speed, 4.0 units/sec
pub const WALK_FORWARD_SPEED: Fixed = 4 << FIXED_SCALE;

/// Backward walk speed, 3.0 units/sec
pub const WALK_BACKWARD_SPEED: Fixed = 3 << FIXED_SCALE;

/// Vertical launch velocity of every jump, 12.0
pub const JUMP_VELOCITY: Fixed = 12 << FIXED_SCALE;

/// Horizontal drift of a directional jump, 3.5
pub const JUMP_DRIFT: Fixed = (7 << FIXED_SCALE) / 2;

/// Fixed-point to float, for display.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Negate `value` when `positive` is false.
///
/// Turns a facing-relative quantity into a world-space one.
#[inline]
pub fn signed_by(value: Fixed, positive: bool) -> Fixed {
    if positive {
        value
    } else {
        value.wrapping_neg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locomotion_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(WALK_FORWARD_SPEED, 262144);
        assert_eq!(WALK_BACKWARD_SPEED, 196608);
        assert_eq!(JUMP_DRIFT, 229376);
        assert!(WALK_BACKWARD_SPEED < WALK_FORWARD_SPEED);
    }

    #[test]
    fn test_signed_by_facing() {
        assert_eq!(signed_by(WALK_FORWARD_SPEED, true), WALK_FORWARD_SPEED);
        assert_eq!(signed_by(WALK_FORWARD_SPEED, false), -WALK_FORWARD_SPEED);
        assert_eq!(signed_by(0, false), 0);
    }

    #[test]
    fn test_to_float_display() {
        assert!((to_float(JUMP_DRIFT) - 3.5).abs() < f32::EPSILON);
        assert!((to_float(-FIXED_ONE) + 1.0).abs() < f32::EPSILON);
    }
}
