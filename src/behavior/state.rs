//! Behavior States
//!
//! The closed catalog of state kinds a character can be in. Every state
//! shares the enter / logic / exit lifecycle and is dispatched by `match`
//! on its configuration. States never change the active state themselves;
//! they hand a [`StateRequest`] back to the machine.
//!
//! Side effects leave through the outbox as [`Notification`]s, drained once
//! per tick by the simulation.

use serde::{Serialize, Deserialize};

use crate::combat::hitbox::{HitboxConfig, HurtboxConfig};
use crate::combat::resolve::HitRegistry;
use crate::core::fixed::{Fixed, JUMP_DRIFT, JUMP_VELOCITY, WALK_BACKWARD_SPEED, WALK_FORWARD_SPEED, signed_by};
use crate::core::vec2::FixedVec2;
use super::context::{ContextData, ContextFlags};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Walk direction relative to the opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkDirection {
    /// Toward the opponent
    Forward,
    /// Away from the opponent
    Backward,
}

/// Jump arc relative to the opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpDirection {
    /// Straight up
    Neutral,
    /// Toward the opponent
    Forward,
    /// Away from the opponent
    Backward,
}

/// What an attack sub-event does while active.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubEventAction {
    /// Play an animation clip
    Animation {
        /// Clip name
        clip: String,
    },
    /// Enable a hitbox
    Hitbox(HitboxConfig),
    /// Switch a hurtbox
    Hurtbox(HurtboxConfig),
    /// Fire a presentation cue (sound, particles)
    Cue {
        /// Cue name
        name: String,
    },
}

/// Frame-scheduled sub-event of an attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEvent {
    /// First active frame
    pub start: u32,
    /// Active frame count
    pub duration: u32,
    /// Effect while active
    #[serde(flatten)]
    pub action: SubEventAction,
}

impl SubEvent {
    /// Whether the sub-event is active on `frame`.
    #[inline]
    pub fn covers(&self, frame: u32) -> bool {
        frame >= self.start && frame < self.start.saturating_add(self.duration)
    }
}

/// Authored behavior of a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BehaviorConfig {
    /// Standing neutral
    Idle {
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
    /// Walking
    Walk {
        /// Direction
        direction: WalkDirection,
        /// Speed (Q16.16), defaults per direction
        #[serde(default)]
        speed: Option<Fixed>,
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
    /// Crouching
    Crouch {
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
    /// Airborne arc
    Jump {
        /// Arc direction
        direction: JumpDirection,
        /// Ticks until landing
        duration: u32,
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
    /// Attack with scheduled sub-events
    Attack {
        /// Total ticks
        duration: u32,
        /// Sub-events, any order
        #[serde(default)]
        events: Vec<SubEvent>,
    },
    /// Stunned after being hit
    HitStun {
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
    /// Stunned after guarding
    BlockStun {
        /// Clip played on enter
        #[serde(default)]
        animation: Option<String>,
    },
}

/// Coarse classification of a state, used by hit classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateKind {
    /// Standing neutral
    Idle,
    /// Walking toward the opponent
    WalkForward,
    /// Walking away from the opponent
    WalkBackward,
    /// Crouching
    Crouch,
    /// Airborne
    Jump,
    /// Attacking
    Attack,
    /// Hit stun
    HitStun,
    /// Block stun
    BlockStun,
}

impl StateKind {
    /// States from which a guard can be attempted.
    #[inline]
    pub fn can_guard(self) -> bool {
        matches!(self, StateKind::Idle | StateKind::Crouch | StateKind::WalkBackward)
    }
}

impl BehaviorConfig {
    /// Classification of this behavior.
    pub fn kind(&self) -> StateKind {
        match self {
            BehaviorConfig::Idle { .. } => StateKind::Idle,
            BehaviorConfig::Walk { direction: WalkDirection::Forward, .. } => StateKind::WalkForward,
            BehaviorConfig::Walk { direction: WalkDirection::Backward, .. } => StateKind::WalkBackward,
            BehaviorConfig::Crouch { .. } => StateKind::Crouch,
            BehaviorConfig::Jump { .. } => StateKind::Jump,
            BehaviorConfig::Attack { .. } => StateKind::Attack,
            BehaviorConfig::HitStun { .. } => StateKind::HitStun,
            BehaviorConfig::BlockStun { .. } => StateKind::BlockStun,
        }
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

/// Outbound side effect of a state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// Play a clip
    Animation {
        /// Clip name
        clip: String,
    },
    /// Hitbox enabled; the collision layer reports overlaps with this config
    HitboxActivated {
        /// Hitbox descriptor
        hitbox: HitboxConfig,
    },
    /// Hitbox disabled
    HitboxDeactivated {
        /// Attack-instance group of the hitbox
        group: u32,
    },
    /// Hurtbox switched
    HurtboxSet {
        /// Hurtbox name
        id: String,
        /// New state
        active: bool,
    },
    /// Presentation cue
    Cue {
        /// Cue name
        name: String,
    },
    /// Horizontal locomotion changed (world space, Q16.16 per second)
    Movement {
        /// New horizontal velocity
        velocity_x: Fixed,
    },
    /// Left the ground
    Launch {
        /// Initial velocity (world space)
        velocity: FixedVec2,
    },
    /// Pushed by a hit
    Knockback {
        /// Impulse (world space)
        impulse: FixedVec2,
    },
}

/// Stun and knockback waiting for the next stun state to consume.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingImpact {
    /// Stun ticks
    pub stun_frames: u32,
    /// Knockback impulse (world space)
    pub knockback: FixedVec2,
}

/// What a state hands back to the machine after its logic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateRequest {
    /// Fire the shared move-complete trigger.
    Complete,
    /// Switch straight to the idle state.
    ReturnToIdle,
}

/// Character-owned data a state may touch during its lifecycle.
pub struct StateContext<'a> {
    /// Blackboard
    pub context: &'a mut ContextData,
    /// Outbound notifications
    pub outbox: &'a mut Vec<Notification>,
    /// Pending stun / knockback
    pub pending: &'a mut PendingImpact,
    /// Per-activation hit registry of this character's attacks
    pub registry: &'a mut HitRegistry,
}

/// Runtime instance of a state. Built once, reused on every entry.
#[derive(Clone, Debug)]
pub struct BehaviorState {
    config: BehaviorConfig,
    frame: u32,
    countdown: u32,
    active_events: Vec<bool>,
}

impl BehaviorState {
    /// Instantiate from configuration.
    pub fn new(config: BehaviorConfig) -> Self {
        let events = match &config {
            BehaviorConfig::Attack { events, .. } => events.len(),
            _ => 0,
        };
        Self {
            config,
            frame: 0,
            countdown: 0,
            active_events: vec![false; events],
        }
    }

    /// Classification.
    pub fn kind(&self) -> StateKind {
        self.config.kind()
    }

    /// Frames since entry (attack and jump).
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Remaining stun ticks, for stun states.
    pub fn countdown(&self) -> Option<u32> {
        match self.config {
            BehaviorConfig::HitStun { .. } | BehaviorConfig::BlockStun { .. } => Some(self.countdown),
            _ => None,
        }
    }

    /// Number of currently active attack sub-events.
    pub fn active_sub_events(&self) -> usize {
        self.active_events.iter().filter(|a| **a).count()
    }

    /// Hitboxes currently enabled by attack sub-events.
    pub fn active_hitboxes(&self) -> impl Iterator<Item = &HitboxConfig> + '_ {
        let events: &[SubEvent] = match &self.config {
            BehaviorConfig::Attack { events, .. } => events,
            _ => &[],
        };
        events
            .iter()
            .zip(&self.active_events)
            .filter(|(_, active)| **active)
            .filter_map(|(event, _)| match &event.action {
                SubEventAction::Hitbox(hitbox) => Some(hitbox),
                _ => None,
            })
    }

    /// Called when the state becomes active.
    pub fn on_enter(&mut self, ctx: &mut StateContext<'_>) {
        self.frame = 0;

        match &self.config {
            BehaviorConfig::Idle { animation } | BehaviorConfig::Crouch { animation } => {
                play(ctx, animation);
            }
            BehaviorConfig::Walk { direction, speed, animation } => {
                let (default_speed, forward) = match direction {
                    WalkDirection::Forward => (WALK_FORWARD_SPEED, true),
                    WalkDirection::Backward => (WALK_BACKWARD_SPEED, false),
                };
                let speed = speed.unwrap_or(default_speed);
                let toward_right = forward == ctx.context.facing_right;
                ctx.outbox.push(Notification::Movement {
                    velocity_x: signed_by(speed, toward_right),
                });
                play(ctx, animation);
            }
            BehaviorConfig::Jump { direction, animation, .. } => {
                ctx.context.flags.remove(ContextFlags::GROUNDED);
                ctx.context.flags.insert(ContextFlags::AIRBORNE);
                let drift = match direction {
                    JumpDirection::Neutral => 0,
                    JumpDirection::Forward => signed_by(JUMP_DRIFT, ctx.context.facing_right),
                    JumpDirection::Backward => signed_by(JUMP_DRIFT, !ctx.context.facing_right),
                };
                ctx.outbox.push(Notification::Launch {
                    velocity: FixedVec2::new(drift, JUMP_VELOCITY),
                });
                play(ctx, animation);
            }
            BehaviorConfig::Attack { .. } => {
                ctx.registry.reset();
                self.update_sub_events(ctx);
            }
            BehaviorConfig::HitStun { animation } | BehaviorConfig::BlockStun { animation } => {
                let pending = std::mem::take(ctx.pending);
                self.countdown = pending.stun_frames;
                if !pending.knockback.is_zero() {
                    ctx.outbox.push(Notification::Knockback {
                        impulse: pending.knockback,
                    });
                }
                if matches!(self.config, BehaviorConfig::BlockStun { .. }) {
                    ctx.context.flags.insert(ContextFlags::BLOCKING);
                }
                play(ctx, animation);
            }
        }
    }

    /// Called once per tick while active.
    pub fn on_logic(&mut self, ctx: &mut StateContext<'_>) -> Option<StateRequest> {
        match &self.config {
            BehaviorConfig::Idle { .. } | BehaviorConfig::Walk { .. } | BehaviorConfig::Crouch { .. } => None,
            BehaviorConfig::Jump { duration, .. } => {
                self.frame += 1;
                (self.frame >= *duration).then_some(StateRequest::ReturnToIdle)
            }
            BehaviorConfig::Attack { duration, .. } => {
                let duration = *duration;
                self.frame += 1;
                self.update_sub_events(ctx);
                (self.frame >= duration).then_some(StateRequest::Complete)
            }
            BehaviorConfig::HitStun { .. } | BehaviorConfig::BlockStun { .. } => {
                self.countdown = self.countdown.saturating_sub(1);
                (self.countdown == 0).then_some(StateRequest::Complete)
            }
        }
    }

    /// Called when the state stops being active.
    pub fn on_exit(&mut self, ctx: &mut StateContext<'_>) {
        match &self.config {
            BehaviorConfig::Walk { .. } => {
                ctx.outbox.push(Notification::Movement { velocity_x: 0 });
            }
            BehaviorConfig::Jump { .. } => {
                ctx.context.flags.remove(ContextFlags::AIRBORNE);
                ctx.context.flags.insert(ContextFlags::GROUNDED);
            }
            BehaviorConfig::Attack { events, .. } => {
                for (event, active) in events.iter().zip(self.active_events.iter_mut()) {
                    if *active {
                        deactivate(event, ctx);
                        *active = false;
                    }
                }
            }
            BehaviorConfig::BlockStun { .. } => {
                ctx.context.flags.remove(ContextFlags::BLOCKING);
            }
            BehaviorConfig::Idle { .. } | BehaviorConfig::Crouch { .. } | BehaviorConfig::HitStun { .. } => {}
        }
    }

    fn update_sub_events(&mut self, ctx: &mut StateContext<'_>) {
        let BehaviorConfig::Attack { events, .. } = &self.config else {
            return;
        };
        for (event, active) in events.iter().zip(self.active_events.iter_mut()) {
            let should_be_active = event.covers(self.frame);
            if should_be_active && !*active {
                activate(event, ctx);
                *active = true;
            } else if !should_be_active && *active {
                deactivate(event, ctx);
                *active = false;
            }
        }
    }
}

fn play(ctx: &mut StateContext<'_>, animation: &Option<String>) {
    if let Some(clip) = animation {
        ctx.outbox.push(Notification::Animation { clip: clip.clone() });
    }
}

fn activate(event: &SubEvent, ctx: &mut StateContext<'_>) {
    let notification = match &event.action {
        SubEventAction::Animation { clip } => Notification::Animation { clip: clip.clone() },
        SubEventAction::Hitbox(hitbox) => Notification::HitboxActivated {
            hitbox: hitbox.clone(),
        },
        SubEventAction::Hurtbox(hurtbox) => Notification::HurtboxSet {
            id: hurtbox.id.clone(),
            active: hurtbox.active,
        },
        SubEventAction::Cue { name } => Notification::Cue { name: name.clone() },
    };
    ctx.outbox.push(notification);
}

fn deactivate(event: &SubEvent, ctx: &mut StateContext<'_>) {
    match &event.action {
        SubEventAction::Hitbox(hitbox) => ctx.outbox.push(Notification::HitboxDeactivated {
            group: hitbox.group,
        }),
        SubEventAction::Hurtbox(hurtbox) => ctx.outbox.push(Notification::HurtboxSet {
            id: hurtbox.id.clone(),
            active: !hurtbox.active,
        }),
        // clips and cues run to completion on their own
        SubEventAction::Animation { .. } | SubEventAction::Cue { .. } => {}
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::context::{CharacterId, StateId};
    use crate::combat::hitbox::{AttackType, HitEffect};

    struct Harness {
        context: ContextData,
        outbox: Vec<Notification>,
        pending: PendingImpact,
        registry: HitRegistry,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                context: ContextData::new(CharacterId(0), StateId(0), StateKind::Idle, 1000, true),
                outbox: Vec::new(),
                pending: PendingImpact::default(),
                registry: HitRegistry::default(),
            }
        }

        fn ctx(&mut self) -> StateContext<'_> {
            StateContext {
                context: &mut self.context,
                outbox: &mut self.outbox,
                pending: &mut self.pending,
                registry: &mut self.registry,
            }
        }
    }

    fn hitbox() -> HitboxConfig {
        HitboxConfig {
            group: 3,
            offset: FixedVec2::ZERO,
            size: FixedVec2::from_ints(1, 1),
            target_layer: 0,
            attack_type: AttackType::High,
            on_block: HitEffect::default(),
            on_hit: HitEffect::default(),
            on_counter: HitEffect::default(),
            on_punish_counter: HitEffect::default(),
        }
    }

    fn attack() -> BehaviorState {
        BehaviorState::new(BehaviorConfig::Attack {
            duration: 6,
            events: vec![
                SubEvent {
                    start: 0,
                    duration: 6,
                    action: SubEventAction::Animation { clip: "jab".into() },
                },
                SubEvent {
                    start: 2,
                    duration: 2,
                    action: SubEventAction::Hitbox(hitbox()),
                },
                SubEvent {
                    start: 1,
                    duration: 4,
                    action: SubEventAction::Hurtbox(HurtboxConfig {
                        id: "arm".into(),
                        offset: FixedVec2::ZERO,
                        size: FixedVec2::from_ints(1, 1),
                        active: true,
                    }),
                },
            ],
        })
    }

    #[test]
    fn test_attack_sub_event_window() {
        let mut h = Harness::new();
        let mut state = attack();

        state.on_enter(&mut h.ctx());
        assert_eq!(h.outbox, vec![Notification::Animation { clip: "jab".into() }]);
        h.outbox.clear();

        // frame 1: hurtbox on
        assert_eq!(state.on_logic(&mut h.ctx()), None);
        assert_eq!(h.outbox, vec![Notification::HurtboxSet { id: "arm".into(), active: true }]);
        h.outbox.clear();

        // frame 2: hitbox on
        state.on_logic(&mut h.ctx());
        assert_eq!(h.outbox, vec![Notification::HitboxActivated { hitbox: hitbox() }]);
        assert_eq!(state.active_hitboxes().map(|h| h.group).collect::<Vec<_>>(), vec![3]);
        h.outbox.clear();

        // frame 3: nothing changes, frame 4: hitbox off
        state.on_logic(&mut h.ctx());
        assert!(h.outbox.is_empty());
        state.on_logic(&mut h.ctx());
        assert_eq!(h.outbox, vec![Notification::HitboxDeactivated { group: 3 }]);
        h.outbox.clear();

        // frame 5: hurtbox off, frame 6: complete
        assert_eq!(state.on_logic(&mut h.ctx()), None);
        assert_eq!(h.outbox, vec![Notification::HurtboxSet { id: "arm".into(), active: false }]);
        assert_eq!(state.on_logic(&mut h.ctx()), Some(StateRequest::Complete));
    }

    #[test]
    fn test_attack_interrupt_deactivates_active_only() {
        let mut h = Harness::new();
        let mut state = attack();
        state.on_enter(&mut h.ctx());
        state.on_logic(&mut h.ctx());
        state.on_logic(&mut h.ctx());
        assert_eq!(state.active_sub_events(), 3);
        h.outbox.clear();

        state.on_exit(&mut h.ctx());
        assert_eq!(state.active_sub_events(), 0);
        assert_eq!(
            h.outbox,
            vec![
                Notification::HitboxDeactivated { group: 3 },
                Notification::HurtboxSet { id: "arm".into(), active: false },
            ]
        );
    }

    #[test]
    fn test_attack_enter_resets_registry() {
        let mut h = Harness::new();
        h.registry.register(3, CharacterId(1));
        let mut state = attack();
        state.on_enter(&mut h.ctx());
        assert!(!h.registry.has_hit(3, CharacterId(1)));
    }

    #[test]
    fn test_stun_consumes_pending_and_counts_down() {
        let mut h = Harness::new();
        h.pending = PendingImpact {
            stun_frames: 3,
            knockback: FixedVec2::from_ints(-2, 0),
        };
        let mut state = BehaviorState::new(BehaviorConfig::BlockStun { animation: None });

        state.on_enter(&mut h.ctx());
        assert_eq!(state.countdown(), Some(3));
        assert_eq!(h.pending, PendingImpact::default());
        assert!(h.context.flags.contains(ContextFlags::BLOCKING));
        assert_eq!(h.outbox, vec![Notification::Knockback { impulse: FixedVec2::from_ints(-2, 0) }]);

        assert_eq!(state.on_logic(&mut h.ctx()), None);
        assert_eq!(state.on_logic(&mut h.ctx()), None);
        assert_eq!(state.on_logic(&mut h.ctx()), Some(StateRequest::Complete));

        state.on_exit(&mut h.ctx());
        assert!(!h.context.flags.contains(ContextFlags::BLOCKING));
    }

    #[test]
    fn test_jump_flags_and_landing() {
        let mut h = Harness::new();
        let mut state = BehaviorState::new(BehaviorConfig::Jump {
            direction: JumpDirection::Forward,
            duration: 2,
            animation: None,
        });
        state.on_enter(&mut h.ctx());
        assert!(h.context.flags.contains(ContextFlags::AIRBORNE));
        assert!(!h.context.flags.contains(ContextFlags::GROUNDED));
        assert_eq!(
            h.outbox,
            vec![Notification::Launch { velocity: FixedVec2::new(JUMP_DRIFT, JUMP_VELOCITY) }]
        );

        assert_eq!(state.on_logic(&mut h.ctx()), None);
        assert_eq!(state.on_logic(&mut h.ctx()), Some(StateRequest::ReturnToIdle));
        state.on_exit(&mut h.ctx());
        assert!(h.context.flags.contains(ContextFlags::GROUNDED));
    }

    #[test]
    fn test_walk_backward_facing_left_moves_right() {
        let mut h = Harness::new();
        h.context.facing_right = false;
        let mut state = BehaviorState::new(BehaviorConfig::Walk {
            direction: WalkDirection::Backward,
            speed: None,
            animation: None,
        });
        state.on_enter(&mut h.ctx());
        state.on_exit(&mut h.ctx());
        assert_eq!(
            h.outbox,
            vec![
                Notification::Movement { velocity_x: WALK_BACKWARD_SPEED },
                Notification::Movement { velocity_x: 0 },
            ]
        );
    }

    #[test]
    fn test_guard_stances() {
        assert!(StateKind::Idle.can_guard());
        assert!(StateKind::Crouch.can_guard());
        assert!(StateKind::WalkBackward.can_guard());
        assert!(!StateKind::WalkForward.can_guard());
        assert!(!StateKind::Attack.can_guard());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "kind": "attack",
            "duration": 12,
            "events": [
                {"start": 0, "duration": 12, "type": "animation", "clip": "sweep"},
                {"start": 3, "duration": 2, "type": "cue", "name": "whoosh"}
            ]
        }"#;
        let config: BehaviorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind(), StateKind::Attack);
    }
}
