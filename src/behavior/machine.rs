//! Behavior State Machine
//!
//! Owns one [`BehaviorState`] per graph state and keeps exactly one active.
//! Each tick applies at most one transition, chosen in this order:
//!
//! 1. named triggers raised since the last tick, first raised first tried
//! 2. the active state's own request (move complete / return to idle)
//! 3. conditional transitions of the active state, in authored order
//!
//! The exit of the old state always runs before the enter of the new one,
//! so an interrupted attack releases its hitboxes before anything else.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use super::context::{StateId, TriggerId};
use super::graph::StateGraph;
use super::state::{BehaviorState, StateContext, StateKind, StateRequest};

/// Why a transition happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionCause {
    /// Named trigger
    Trigger(TriggerId),
    /// The active state asked to return to idle
    Explicit,
    /// Conditional transition
    Condition,
}

/// Applied transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// State left
    pub from: StateId,
    /// State entered
    pub to: StateId,
    /// Cause
    pub cause: TransitionCause,
}

/// Hierarchical state machine of one character.
#[derive(Clone, Debug)]
pub struct StateMachine {
    graph: Arc<StateGraph>,
    states: Vec<BehaviorState>,
    active: StateId,
    pending: VecDeque<TriggerId>,
}

impl StateMachine {
    /// Instantiate every state of `graph`. Call [`start`](Self::start)
    /// before the first tick.
    pub fn new(graph: Arc<StateGraph>) -> Self {
        let states = (0..graph.state_count())
            .map(|i| BehaviorState::new(graph.behavior(StateId(i as u16)).clone()))
            .collect();
        let active = graph.initial();
        Self {
            graph,
            states,
            active,
            pending: VecDeque::new(),
        }
    }

    /// Graph this machine runs.
    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }

    /// Enter the initial state.
    pub fn start(&mut self, ctx: &mut StateContext<'_>) {
        self.active = self.graph.initial();
        self.pending.clear();
        self.sync_context(ctx);
        self.states[self.active.0 as usize].on_enter(ctx);
    }

    /// Active state.
    pub fn active(&self) -> StateId {
        self.active
    }

    /// Kind of the active state.
    pub fn active_kind(&self) -> StateKind {
        self.states[self.active.0 as usize].kind()
    }

    /// Name of the active state.
    pub fn active_name(&self) -> &str {
        self.graph.state_name(self.active)
    }

    /// Runtime instance of the active state.
    pub fn active_state(&self) -> &BehaviorState {
        &self.states[self.active.0 as usize]
    }

    /// Remaining stun of the active state, if it is a stun state.
    pub fn countdown(&self) -> Option<u32> {
        self.active_state().countdown()
    }

    /// Triggers waiting for the next tick.
    pub fn pending_triggers(&self) -> impl Iterator<Item = TriggerId> + '_ {
        self.pending.iter().copied()
    }

    /// Raise a trigger, handled on the next [`tick`](Self::tick).
    pub fn trigger(&mut self, trigger: TriggerId) {
        self.pending.push_back(trigger);
    }

    /// Handle a trigger right now, outside the tick order.
    pub fn force_trigger(&mut self, trigger: TriggerId, ctx: &mut StateContext<'_>) -> Option<Transition> {
        let to = self.graph.resolve_trigger(self.active, trigger)?;
        Some(self.transition(to, TransitionCause::Trigger(trigger), ctx))
    }

    /// Advance the active state by one tick and apply at most one transition.
    pub fn tick(&mut self, ctx: &mut StateContext<'_>) -> Option<Transition> {
        ctx.context.frames_in_state = ctx.context.frames_in_state.saturating_add(1);
        let request = self.states[self.active.0 as usize].on_logic(ctx);

        // dropping the drain discards the triggers that lost
        let triggered = self
            .pending
            .drain(..)
            .find_map(|t| self.graph.resolve_trigger(self.active, t).map(|to| (to, t)));

        if let Some((to, trigger)) = triggered {
            return Some(self.transition(to, TransitionCause::Trigger(trigger), ctx));
        }

        match request {
            Some(StateRequest::Complete) => {
                let trigger = self.graph.move_complete();
                if let Some(to) = self.graph.resolve_trigger(self.active, trigger) {
                    return Some(self.transition(to, TransitionCause::Trigger(trigger), ctx));
                }
            }
            Some(StateRequest::ReturnToIdle) => {
                let idle = self.graph.idle();
                if idle != self.active {
                    return Some(self.transition(idle, TransitionCause::Explicit, ctx));
                }
            }
            None => {}
        }

        let to = self.graph.first_conditional(self.active, ctx.context)?;
        Some(self.transition(to, TransitionCause::Condition, ctx))
    }

    fn transition(&mut self, to: StateId, cause: TransitionCause, ctx: &mut StateContext<'_>) -> Transition {
        let from = self.active;
        self.states[from.0 as usize].on_exit(ctx);
        self.active = to;
        self.sync_context(ctx);
        self.states[to.0 as usize].on_enter(ctx);

        trace!(
            character = %ctx.context.owner,
            from = self.graph.state_name(from),
            to = self.graph.state_name(to),
            ?cause,
            "state transition"
        );

        Transition { from, to, cause }
    }

    fn sync_context(&self, ctx: &mut StateContext<'_>) {
        ctx.context.current_state = self.active;
        ctx.context.current_kind = self.active_kind();
        ctx.context.frames_in_state = 0;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::context::{CharacterId, ContextData};
    use crate::behavior::graph::StateGraphConfig;
    use crate::behavior::state::{BehaviorConfig, Notification, PendingImpact};
    use crate::combat::resolve::HitRegistry;
    use crate::input::signal::{Direction, DirectionSignal};

    struct Rig {
        machine: StateMachine,
        context: ContextData,
        outbox: Vec<Notification>,
        pending: PendingImpact,
        registry: HitRegistry,
    }

    impl Rig {
        fn new(config: StateGraphConfig) -> Self {
            let graph = Arc::new(config.build().unwrap());
            let initial = graph.initial();
            let kind = graph.kind_of(initial);
            let mut rig = Self {
                machine: StateMachine::new(graph),
                context: ContextData::new(CharacterId(0), initial, kind, 100, true),
                outbox: Vec::new(),
                pending: PendingImpact::default(),
                registry: HitRegistry::default(),
            };
            let mut ctx = StateContext {
                context: &mut rig.context,
                outbox: &mut rig.outbox,
                pending: &mut rig.pending,
                registry: &mut rig.registry,
            };
            rig.machine.start(&mut ctx);
            rig
        }

        fn tick(&mut self) -> Option<Transition> {
            let mut ctx = StateContext {
                context: &mut self.context,
                outbox: &mut self.outbox,
                pending: &mut self.pending,
                registry: &mut self.registry,
            };
            self.machine.tick(&mut ctx)
        }

        fn force(&mut self, trigger: TriggerId) -> Option<Transition> {
            let mut ctx = StateContext {
                context: &mut self.context,
                outbox: &mut self.outbox,
                pending: &mut self.pending,
                registry: &mut self.registry,
            };
            self.machine.force_trigger(trigger, &mut ctx)
        }

        fn hold(&mut self, direction: Direction) {
            self.context.direction = DirectionSignal::new(direction);
        }

        fn id(&self, name: &str) -> StateId {
            self.machine.graph().state_id(name).unwrap()
        }

        fn trigger(&self, name: &str) -> TriggerId {
            self.machine.graph().trigger_id(name).unwrap()
        }
    }

    fn with_attacks() -> StateGraphConfig {
        let mut config = StateGraphConfig::standard();
        config
            .add_state("jab", None, BehaviorConfig::Attack { duration: 3, events: vec![] })
            .add_state("sweep", None, BehaviorConfig::Attack { duration: 3, events: vec![] })
            .add_trigger_transition(Some("neutral"), "Jab", "jab", false)
            .add_trigger_transition(Some("neutral"), "Sweep", "sweep", false);
        config
    }

    #[test]
    fn test_start_enters_initial() {
        let rig = Rig::new(StateGraphConfig::standard());
        assert_eq!(rig.machine.active_name(), "idle");
        assert_eq!(rig.context.current_kind, StateKind::Idle);
        assert_eq!(rig.outbox, vec![Notification::Animation { clip: "idle".into() }]);
    }

    #[test]
    fn test_conditional_walk_and_back() {
        let mut rig = Rig::new(StateGraphConfig::standard());
        rig.hold(Direction::FRONT);
        let t = rig.tick().unwrap();
        assert_eq!(t.to, rig.id("walk_forward"));
        assert_eq!(t.cause, TransitionCause::Condition);
        assert_eq!(rig.context.current_state, t.to);
        assert_eq!(rig.context.frames_in_state, 0);

        assert_eq!(rig.tick(), None);
        assert_eq!(rig.context.frames_in_state, 1);

        rig.hold(Direction::empty());
        assert_eq!(rig.tick().unwrap().to, rig.id("idle"));
    }

    #[test]
    fn test_trigger_beats_conditional() {
        let mut rig = Rig::new(with_attacks());
        rig.hold(Direction::FRONT);
        let jab = rig.trigger("Jab");
        rig.machine.trigger(jab);

        let t = rig.tick().unwrap();
        assert_eq!(t.to, rig.id("jab"));
        assert_eq!(t.cause, TransitionCause::Trigger(jab));
    }

    #[test]
    fn test_pending_triggers_fifo_and_cleared() {
        let mut rig = Rig::new(with_attacks());
        let (jab, sweep) = (rig.trigger("Jab"), rig.trigger("Sweep"));
        rig.machine.trigger(sweep);
        rig.machine.trigger(jab);

        assert_eq!(rig.tick().unwrap().to, rig.id("sweep"));
        assert_eq!(rig.machine.pending_triggers().count(), 0);
    }

    #[test]
    fn test_unhandled_trigger_falls_through() {
        let mut rig = Rig::new(with_attacks());
        rig.hold(Direction::DOWN);
        // no transition for MoveComplete out of idle
        let complete = rig.machine.graph().move_complete();
        rig.machine.trigger(complete);
        assert_eq!(rig.tick().unwrap().to, rig.id("crouch"));
    }

    #[test]
    fn test_attack_completes_to_idle() {
        let mut rig = Rig::new(with_attacks());
        let jab = rig.trigger("Jab");
        rig.machine.trigger(jab);
        rig.tick();
        assert_eq!(rig.tick(), None);
        assert_eq!(rig.tick(), None);
        let t = rig.tick().unwrap();
        assert_eq!(t.to, rig.id("idle"));
        assert_eq!(t.cause, TransitionCause::Trigger(rig.machine.graph().move_complete()));
    }

    #[test]
    fn test_jump_returns_to_idle_explicitly() {
        let mut config = StateGraphConfig::standard();
        config.states.iter_mut().for_each(|s| {
            if let BehaviorConfig::Jump { duration, .. } = &mut s.behavior {
                *duration = 2;
            }
        });
        let mut rig = Rig::new(config);
        rig.hold(Direction::UP);
        assert_eq!(rig.tick().unwrap().to, rig.id("jump_neutral"));
        rig.hold(Direction::empty());
        assert_eq!(rig.tick(), None);
        let t = rig.tick().unwrap();
        assert_eq!((t.to, t.cause), (rig.id("idle"), TransitionCause::Explicit));
    }

    #[test]
    fn test_forced_stun_refreshes_countdown() {
        let mut rig = Rig::new(StateGraphConfig::standard());
        let hit = rig.machine.graph().hit_stun();

        rig.pending.stun_frames = 5;
        assert_eq!(rig.force(hit).unwrap().to, rig.id("hit_stun"));
        rig.tick();
        rig.tick();
        assert_eq!(rig.machine.countdown(), Some(3));

        rig.pending.stun_frames = 4;
        let again = rig.force(hit).unwrap();
        assert_eq!(again.from, again.to);
        assert_eq!(rig.machine.countdown(), Some(4));

        for _ in 0..3 {
            assert_eq!(rig.tick(), None);
        }
        assert_eq!(rig.tick().unwrap().to, rig.id("idle"));
    }
}
