//! Character
//!
//! One fighter: input history, command catalog and request queue, the
//! state machine and its blackboard, and the bookkeeping hit resolution
//! needs. The simulation drives it through a fixed sequence each tick:
//!
//! ```text
//!   begin_frame ─► read_input ─► update ─► (hits applied) ─► drain_notifications
//! ```

use std::sync::Arc;

use tracing::{debug, trace};

use crate::behavior::context::{CharacterId, ContextData};
use crate::behavior::machine::{StateMachine, Transition};
use crate::behavior::state::{Notification, PendingImpact, StateContext, StateKind};
use crate::combat::hitbox::{HitType, HitboxConfig, ProcessedHitResult};
use crate::combat::resolve::{Combatant, HitRegistry};
use crate::command::definition::{CommandCatalog, CommandError};
use crate::command::matcher::is_performed;
use crate::command::scheduler::{PendingRequest, RequestScheduler, SchedulerSnapshot};
use crate::config::{CharacterConfig, SimConfig};
use crate::core::hash::StateHasher;
use crate::input::recorder::{InputFrame, InputRecorder, InputRecording};
use super::tick::SimError;

/// What happened on the command side during one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandStep {
    /// Requests that timed out
    pub expired: usize,
    /// Command recognized and queued this tick
    pub matched: Option<String>,
    /// Command consumed, with the trigger it raised
    pub consumed: Option<(String, String)>,
}

/// One fighter in a match.
#[derive(Clone, Debug)]
pub struct Character {
    id: CharacterId,
    name: String,
    recorder: InputRecorder,
    recording: InputRecording,
    catalog: CommandCatalog,
    scheduler: RequestScheduler<PendingRequest>,
    machine: StateMachine,
    context: ContextData,
    registry: HitRegistry,
    pending: PendingImpact,
    outbox: Vec<Notification>,
    forced: Vec<Transition>,
}

impl Character {
    /// Build from configuration and enter the initial state.
    pub fn new(id: CharacterId, config: &CharacterConfig, sim: &SimConfig, facing_right: bool) -> Result<Self, SimError> {
        let graph = Arc::new(config.graph.build()?);
        let catalog = CommandCatalog::compile(&config.commands, &graph)?;
        let initial = graph.initial();
        let context = ContextData::new(id, initial, graph.kind_of(initial), sim.max_health, facing_right);

        let mut character = Self {
            id,
            name: config.name.clone(),
            recorder: InputRecorder::new(sim.buffer_capacity)?,
            recording: InputRecording::new(id),
            catalog,
            scheduler: RequestScheduler::new(),
            machine: StateMachine::new(graph),
            context,
            registry: HitRegistry::default(),
            pending: PendingImpact::default(),
            outbox: Vec::new(),
            forced: Vec::new(),
        };

        let mut ctx = StateContext {
            context: &mut character.context,
            outbox: &mut character.outbox,
            pending: &mut character.pending,
            registry: &mut character.registry,
        };
        character.machine.start(&mut ctx);

        debug!(character = %id, name = %character.name, commands = character.catalog.len(), "character ready");
        Ok(character)
    }

    /// Slot in the match.
    pub fn id(&self) -> CharacterId {
        self.id
    }

    /// Blackboard.
    pub fn context(&self) -> &ContextData {
        &self.context
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Remaining health.
    pub fn health(&self) -> i32 {
        self.context.health
    }

    /// State machine.
    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Name of the active state.
    pub fn state_name(&self) -> &str {
        self.machine.active_name()
    }

    /// Kind of the active state.
    pub fn state_kind(&self) -> StateKind {
        self.machine.active_kind()
    }

    /// Input history.
    pub fn recorder(&self) -> &InputRecorder {
        &self.recorder
    }

    /// Raw input log.
    pub fn recording(&self) -> &InputRecording {
        &self.recording
    }

    /// Compiled commands.
    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    /// Queue of matched requests.
    pub fn scheduler(&self) -> &RequestScheduler<PendingRequest> {
        &self.scheduler
    }

    /// Diagnostic view of the request queue.
    pub fn scheduler_snapshot(&self) -> SchedulerSnapshot {
        self.scheduler.snapshot()
    }

    /// Hitboxes enabled right now.
    pub fn active_hitboxes(&self) -> impl Iterator<Item = &HitboxConfig> + '_ {
        self.machine.active_state().active_hitboxes()
    }

    /// Start a tick: reset per-tick context, then publish the hits this
    /// character landed on the previous tick.
    pub fn begin_frame(&mut self, landed: &[ProcessedHitResult]) {
        self.context.clear_per_frame();
        self.context.hit_confirmed_this_frame = landed.iter().any(|h| h.hit_type != HitType::Blocked);
        self.context.finalized_hits.extend(landed.iter().cloned());
    }

    /// Record input, age the request queue, queue the first performed
    /// command and raise the trigger of the first request that maps.
    pub fn read_input(&mut self, tick: u32, frame: InputFrame) -> Result<CommandStep, CommandError> {
        let mut step = CommandStep::default();

        self.recording.record(tick, frame);
        self.recorder.record(frame)?;
        self.context.direction = self.recorder.current_direction();
        self.context.attack = self.recorder.current_attack();

        step.expired = self.scheduler.tick();

        for (index, command) in self.catalog.commands().iter().enumerate() {
            if is_performed(command, &self.recorder)? {
                trace!(character = %self.id, command = %command.name, "command matched");
                self.scheduler.enqueue(PendingRequest {
                    command: index,
                    name: command.name.clone(),
                    priority: command.priority,
                    lifetime: command.lifetime,
                });
                step.matched = Some(command.name.clone());
                break;
            }
        }

        let catalog = &self.catalog;
        let context = &self.context;
        let consumed = self
            .scheduler
            .dequeue_first_matching(|request| catalog.get(request.command)?.map(context));

        if let Some((request, trigger)) = consumed {
            self.machine.trigger(trigger);
            let trigger_name = self.machine.graph().trigger_name(trigger).to_string();
            debug!(character = %self.id, command = %request.name, trigger = %trigger_name, "command consumed");
            step.consumed = Some((request.name, trigger_name));
        }

        #[cfg(feature = "debug-tracing")]
        self.scheduler.snapshot();

        Ok(step)
    }

    /// Advance the state machine by one tick.
    pub fn update(&mut self) -> Option<Transition> {
        let mut ctx = StateContext {
            context: &mut self.context,
            outbox: &mut self.outbox,
            pending: &mut self.pending,
            registry: &mut self.registry,
        };
        self.machine.tick(&mut ctx)
    }

    /// Notifications emitted since the last drain.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    /// Transitions forced by incoming hits since the last drain.
    pub fn drain_forced(&mut self) -> Vec<Transition> {
        std::mem::take(&mut self.forced)
    }

    /// Feed this character's state into a hasher.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        let ctx = &self.context;
        hasher.update_u8(self.id.0);
        hasher.update_u32(u32::from(self.machine.active().0));
        hasher.update_u32(ctx.frames_in_state);
        hasher.update_u32(self.machine.active_state().frame());
        hasher.update_u32(self.machine.countdown().unwrap_or(0));
        hasher.update_i32(ctx.health);
        hasher.update_u8(ctx.flags.bits());
        hasher.update_bool(ctx.facing_right);
        hasher.update_signal(ctx.direction.flags.bits(), ctx.direction.duration);
        hasher.update_signal(ctx.attack.flags.bits(), ctx.attack.duration);
        hasher.update_u32(self.pending.stun_frames);
        hasher.update_vec2(self.pending.knockback);
        for (request, remaining) in self.scheduler.iter() {
            hasher.update_u32(request.command as u32);
            hasher.update_u32(remaining);
        }
    }
}

impl Combatant for Character {
    fn id(&self) -> CharacterId {
        self.id
    }

    fn context(&self) -> &ContextData {
        &self.context
    }

    fn registry_mut(&mut self) -> &mut HitRegistry {
        &mut self.registry
    }

    fn apply_hit(&mut self, hit: &ProcessedHitResult) {
        self.context.health = self.context.health.saturating_sub(hit.effect.damage).max(0);
        // authored for an attacker facing right; the attacker faces us
        self.pending = PendingImpact {
            stun_frames: hit.effect.recovery_frames,
            knockback: hit.effect.knockback.facing(!self.context.facing_right),
        };

        let graph = self.machine.graph();
        let trigger = if hit.hit_type == HitType::Blocked {
            graph.block_stun()
        } else {
            graph.hit_stun()
        };

        let mut ctx = StateContext {
            context: &mut self.context,
            outbox: &mut self.outbox,
            pending: &mut self.pending,
            registry: &mut self.registry,
        };
        if let Some(transition) = self.machine.force_trigger(trigger, &mut ctx) {
            self.forced.push(transition);
        }
    }
}
