//! Input Signals
//!
//! A signal is the set of inputs held on one frame plus how many
//! consecutive frames that exact set has been held. Directions are
//! facing-relative: `FRONT` always points at the opponent.

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::SIGNAL_DURATION_CAP;

bitflags! {
    /// Facing-relative directional inputs.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Direction: u8 {
        /// Toward the opponent
        const FRONT = 1 << 0;
        /// Away from the opponent
        const BACK = 1 << 1;
        /// Down
        const DOWN = 1 << 2;
        /// Up
        const UP = 1 << 3;
    }
}

bitflags! {
    /// Attack buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AttackButtons: u8 {
        /// Light punch
        const LIGHT_PUNCH = 1 << 0;
        /// Light kick
        const LIGHT_KICK = 1 << 1;
        /// Medium punch
        const MEDIUM_PUNCH = 1 << 2;
        /// Medium kick
        const MEDIUM_KICK = 1 << 3;
        /// Heavy punch
        const HEAVY_PUNCH = 1 << 4;
        /// Heavy kick
        const HEAVY_KICK = 1 << 5;
    }
}

impl Direction {
    /// Build a facing-relative direction from raw stick axes.
    ///
    /// `horizontal` and `vertical` are world-space (positive = right / up).
    /// A character facing right treats right as `FRONT`; facing left flips it.
    pub fn from_axes(horizontal: i8, vertical: i8, facing_right: bool) -> Self {
        let mut dir = Direction::empty();
        if horizontal != 0 {
            let toward_right = horizontal > 0;
            if toward_right == facing_right {
                dir |= Direction::FRONT;
            } else {
                dir |= Direction::BACK;
            }
        }
        if vertical > 0 {
            dir |= Direction::UP;
        } else if vertical < 0 {
            dir |= Direction::DOWN;
        }
        dir
    }
}

/// Flag set usable as the payload of a [`Signal`].
pub trait SignalFlags: Copy + Eq + Default + std::fmt::Debug {
    /// Raw bits, for hashing.
    fn raw(self) -> u8;

    /// No input held.
    fn is_neutral(self) -> bool {
        self == Self::default()
    }

    /// Whether `self` satisfies the required set.
    ///
    /// A neutral requirement only matches neutral input; any other
    /// requirement matches a superset.
    fn covers(self, required: Self) -> bool;
}

impl SignalFlags for Direction {
    fn raw(self) -> u8 {
        self.bits()
    }

    fn covers(self, required: Self) -> bool {
        if required.is_empty() {
            self.is_empty()
        } else {
            self.contains(required)
        }
    }
}

impl SignalFlags for AttackButtons {
    fn raw(self) -> u8 {
        self.bits()
    }

    fn covers(self, required: Self) -> bool {
        if required.is_empty() {
            self.is_empty()
        } else {
            self.contains(required)
        }
    }
}

/// Flags plus the number of consecutive frames they have been held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal<F> {
    /// Inputs held
    pub flags: F,
    /// Consecutive identical frames, saturating at [`SIGNAL_DURATION_CAP`]
    #[serde(default = "default_duration")]
    pub duration: u8,
}

fn default_duration() -> u8 {
    1
}

/// Directional signal.
pub type DirectionSignal = Signal<Direction>;

/// Attack signal.
pub type AttackSignal = Signal<AttackButtons>;

impl<F: SignalFlags> Signal<F> {
    /// A freshly pressed signal (duration 1).
    pub fn new(flags: F) -> Self {
        Self { flags, duration: 1 }
    }

    /// A signal with an explicit duration, clamped to the cap.
    pub fn held(flags: F, duration: u8) -> Self {
        Self {
            flags,
            duration: duration.min(SIGNAL_DURATION_CAP),
        }
    }

    /// Extend by one frame, saturating at the cap.
    pub fn extend(&mut self) {
        if self.duration < SIGNAL_DURATION_CAP {
            self.duration += 1;
        }
    }

    /// Whether this buffered entry satisfies a required signal.
    pub fn satisfies(&self, required: &Signal<F>) -> bool {
        self.flags.covers(required.flags) && self.duration >= required.duration
    }
}
