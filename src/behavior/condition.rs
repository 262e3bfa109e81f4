//! Context Conditions
//!
//! Boolean predicates over [`ContextData`] shared by mapping rules and
//! conditional transitions. Configuration names states by string; the
//! graph builder resolves them to [`StateId`]s before evaluation.

use serde::{Serialize, Deserialize};

use crate::input::signal::{Direction, SignalFlags};
use super::context::{ContextData, ContextFlags, StateId};

/// Numeric comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `==`
    Equal,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanOrEqual,
    /// `>=`
    GreaterThanOrEqual,
}

impl Comparison {
    /// Compare `value` against `threshold`.
    pub fn holds<T: Ord>(self, value: T, threshold: T) -> bool {
        match self {
            Comparison::Equal => value == threshold,
            Comparison::LessThan => value < threshold,
            Comparison::GreaterThan => value > threshold,
            Comparison::LessThanOrEqual => value <= threshold,
            Comparison::GreaterThanOrEqual => value >= threshold,
        }
    }
}

/// Predicate over a character's context.
///
/// `S` is how a state is referenced: a name in configuration, a
/// [`StateId`] once resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition<S = String> {
    /// All of `flags` are set.
    HasFlags {
        /// Required flags
        flags: ContextFlags,
    },
    /// None of `flags` are set.
    LacksFlags {
        /// Forbidden flags
        flags: ContextFlags,
    },
    /// The newest direction covers `direction` (neutral means no direction held).
    Holding {
        /// Direction set
        direction: Direction,
    },
    /// The newest direction does not cover `direction`.
    NotHolding {
        /// Direction set
        direction: Direction,
    },
    /// The active state is `state`.
    InState {
        /// State reference
        state: S,
    },
    /// Whether one of our hits connected on the previous tick.
    HitConfirmed {
        /// Expected value
        value: bool,
    },
    /// Health compared with a threshold.
    Health {
        /// Operator
        comparison: Comparison,
        /// Right-hand side
        threshold: i32,
    },
    /// Ticks in the active state compared with a threshold.
    FramesInState {
        /// Operator
        comparison: Comparison,
        /// Right-hand side
        threshold: u32,
    },
}

impl<S> Condition<S> {
    /// Re-map state references, failing on the first unresolved one.
    pub fn resolve<T, E>(self, mut lookup: impl FnMut(S) -> Result<T, E>) -> Result<Condition<T>, E> {
        Ok(match self {
            Condition::HasFlags { flags } => Condition::HasFlags { flags },
            Condition::LacksFlags { flags } => Condition::LacksFlags { flags },
            Condition::Holding { direction } => Condition::Holding { direction },
            Condition::NotHolding { direction } => Condition::NotHolding { direction },
            Condition::InState { state } => Condition::InState { state: lookup(state)? },
            Condition::HitConfirmed { value } => Condition::HitConfirmed { value },
            Condition::Health { comparison, threshold } => Condition::Health { comparison, threshold },
            Condition::FramesInState { comparison, threshold } => {
                Condition::FramesInState { comparison, threshold }
            }
        })
    }
}

impl Condition<StateId> {
    /// Evaluate against a context.
    pub fn evaluate(&self, ctx: &ContextData) -> bool {
        match self {
            Condition::HasFlags { flags } => ctx.flags.contains(*flags),
            Condition::LacksFlags { flags } => !ctx.flags.intersects(*flags),
            Condition::Holding { direction } => ctx.direction.flags.covers(*direction),
            Condition::NotHolding { direction } => !ctx.direction.flags.covers(*direction),
            Condition::InState { state } => ctx.current_state == *state,
            Condition::HitConfirmed { value } => ctx.hit_confirmed_this_frame == *value,
            Condition::Health { comparison, threshold } => comparison.holds(ctx.health, *threshold),
            Condition::FramesInState { comparison, threshold } => {
                comparison.holds(ctx.frames_in_state, *threshold)
            }
        }
    }
}

/// Whether every condition holds (an empty list always holds).
pub fn all_hold(conditions: &[Condition<StateId>], ctx: &ContextData) -> bool {
    conditions.iter().all(|c| c.evaluate(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::context::CharacterId;
    use crate::behavior::state::StateKind;
    use crate::input::signal::DirectionSignal;

    fn ctx() -> ContextData {
        ContextData::new(CharacterId(0), StateId(2), StateKind::Crouch, 500, true)
    }

    #[test]
    fn test_comparisons() {
        assert!(Comparison::Equal.holds(3, 3));
        assert!(Comparison::LessThan.holds(2, 3));
        assert!(!Comparison::GreaterThan.holds(3, 3));
        assert!(Comparison::LessThanOrEqual.holds(3, 3));
        assert!(Comparison::GreaterThanOrEqual.holds(4, 3));
    }

    #[test]
    fn test_holding_uses_signal_semantics() {
        let mut ctx = ctx();
        ctx.direction = DirectionSignal::new(Direction::DOWN | Direction::BACK);

        assert!(Condition::Holding { direction: Direction::DOWN }.evaluate(&ctx));
        assert!(!Condition::NotHolding { direction: Direction::BACK }.evaluate(&ctx));
        // neutral only matches when nothing is held
        assert!(!Condition::Holding { direction: Direction::empty() }.evaluate(&ctx));
        ctx.direction = DirectionSignal::new(Direction::empty());
        assert!(Condition::Holding { direction: Direction::empty() }.evaluate(&ctx));
    }

    #[test]
    fn test_flags_and_state() {
        let ctx = ctx();
        assert!(Condition::HasFlags { flags: ContextFlags::GROUNDED }.evaluate(&ctx));
        assert!(Condition::LacksFlags { flags: ContextFlags::AIRBORNE }.evaluate(&ctx));
        assert!(Condition::InState { state: StateId(2) }.evaluate(&ctx));
        assert!(!Condition::InState { state: StateId(0) }.evaluate(&ctx));
        assert!(Condition::Health { comparison: Comparison::LessThan, threshold: 1000 }.evaluate(&ctx));
    }

    #[test]
    fn test_empty_list_holds() {
        assert!(all_hold(&[], &ctx()));
    }

    #[test]
    fn test_resolve_names() {
        let named: Condition = Condition::InState { state: "crouch".to_string() };
        let resolved = named
            .resolve(|name| if name == "crouch" { Ok(StateId(2)) } else { Err(name) })
            .unwrap();
        assert_eq!(resolved, Condition::InState { state: StateId(2) });

        let missing: Condition = Condition::InState { state: "dash".to_string() };
        assert_eq!(missing.resolve(|name| Err::<StateId, _>(name)).unwrap_err(), "dash");
    }

    #[test]
    fn test_deserialize_condition() {
        let json = r#"{"type":"holding","direction":"BACK | DOWN"}"#;
        let cond: Condition = serde_json::from_str(json).unwrap();
        assert_eq!(cond, Condition::Holding { direction: Direction::BACK | Direction::DOWN });
    }
}
