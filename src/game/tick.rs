//! Simulation Tick
//!
//! The per-frame loop over both characters. The order inside a tick is
//! fixed:
//!
//! 1. publish last tick's landed hits to each attacker
//! 2. record input, age and fill the request queues, raise triggers
//! 3. advance both state machines (sub-events switch hitboxes here)
//! 4. resolve collisions staged by the detector, forcing stun states
//! 5. gather events, ordered by priority
//!
//! Given the same roster, inputs and staged collisions, two runs produce
//! identical events and identical state hashes.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::behavior::context::CharacterId;
use crate::behavior::graph::GraphError;
use crate::behavior::state::StateKind;
use crate::combat::hitbox::{CounterKind, ProcessedHitResult};
use crate::combat::resolve::{CombatError, HitResolutionPipeline};
use crate::combat::staging::{CollisionStaging, RawCollision};
use crate::command::definition::CommandError;
use crate::config::{ConfigError, RosterConfig};
use crate::core::hash::{StateHash, StateHasher};
use crate::input::buffer::BufferError;
use crate::input::recorder::InputFrame;
use super::character::Character;
use super::events::{sort_events, SimEvent};

/// Simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid roster.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Invalid state graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Invalid command catalog, or a command that cannot be matched.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// Input history failure.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// Collision that cannot be resolved.
    #[error(transparent)]
    Combat(#[from] CombatError),
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick that was simulated
    pub tick: u32,
    /// Events generated this tick, by priority
    pub events: Vec<SimEvent>,
    /// Hits applied this tick
    pub hits: Vec<ProcessedHitResult>,
}

/// Two-character combat simulation.
#[derive(Debug)]
pub struct Simulation {
    tick: u32,
    characters: Vec<Character>,
    pipeline: HitResolutionPipeline,
    landed: Vec<ProcessedHitResult>,
}

impl Simulation {
    /// Build both characters. Player one starts facing right.
    pub fn new(roster: &RosterConfig) -> Result<Self, SimError> {
        roster.validate()?;
        let characters = roster
            .characters
            .iter()
            .enumerate()
            .map(|(slot, config)| Character::new(CharacterId(slot as u8), config, &roster.sim, slot == 0))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            p1 = %characters[0].name(),
            p2 = %characters[1].name(),
            "simulation ready"
        );

        Ok(Self {
            tick: 0,
            characters,
            pipeline: HitResolutionPipeline::new(),
            landed: Vec::new(),
        })
    }

    /// Next tick to simulate.
    pub fn current_tick(&self) -> u32 {
        self.tick
    }

    /// Character in `id`'s slot.
    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id.0 as usize)
    }

    /// Both characters.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Producer handle for the collision detector.
    pub fn staging(&self) -> CollisionStaging {
        self.pipeline.staging()
    }

    /// Collisions of every active hitbox against the opponent's body,
    /// ignoring geometry. A stand-in detector for scripted matches; an
    /// opponent caught in an attack turns the hit into a counter.
    pub fn point_blank_collisions(&self) -> Vec<RawCollision> {
        let mut collisions = Vec::new();
        for attacker in &self.characters {
            let id = attacker.id();
            let Some(target) = self.character(id.opponent()) else {
                continue;
            };
            let counter = match target.state_kind() {
                StateKind::Attack => CounterKind::Counter,
                _ => CounterKind::None,
            };
            collisions.extend(attacker.active_hitboxes().map(|hitbox| RawCollision {
                attacker: id,
                target: id.opponent(),
                hitbox: hitbox.clone(),
                hurtbox: "body".into(),
                counter,
            }));
        }
        collisions
    }

    /// Simulate one tick with player one's and player two's input.
    pub fn tick(&mut self, inputs: [InputFrame; 2]) -> Result<TickResult, SimError> {
        let tick = self.tick;
        let mut result = TickResult {
            tick,
            ..TickResult::default()
        };

        // 1. hits landed last tick become visible to their attackers
        let landed = std::mem::take(&mut self.landed);
        for character in &mut self.characters {
            let id = character.id();
            let own: Vec<_> = landed.iter().filter(|h| h.attacker == id).cloned().collect();
            character.begin_frame(&own);
        }

        // 2. commands
        for (character, frame) in self.characters.iter_mut().zip(inputs) {
            let id = character.id();
            let step = character.read_input(tick, frame)?;
            if let Some(command) = &step.matched {
                result.events.push(SimEvent::command_matched(tick, id, command));
            }
            if let Some((command, trigger)) = &step.consumed {
                result.events.push(SimEvent::command_consumed(tick, id, command, trigger));
            }
        }

        // 3. state machines
        for character in &mut self.characters {
            if let Some(transition) = character.update() {
                let graph = character.machine().graph();
                result.events.push(SimEvent::state_changed(
                    tick,
                    character.id(),
                    graph.state_name(transition.from),
                    graph.state_name(transition.to),
                ));
            }
        }

        // 4. hits
        let hits = self.pipeline.process(&mut self.characters)?;
        for hit in &hits {
            let Some(target) = self.character(hit.target) else {
                continue;
            };
            result.events.push(SimEvent::hit_resolved(tick, hit, target.health()));
            if target.health() == 0 {
                info!(tick, character = %hit.target, "knocked out");
                result.events.push(SimEvent::knocked_out(tick, hit.target));
            }
        }

        // 5. events
        for character in &mut self.characters {
            let id = character.id();
            for transition in character.drain_forced() {
                let graph = character.machine().graph();
                result.events.push(SimEvent::state_changed(
                    tick,
                    id,
                    graph.state_name(transition.from),
                    graph.state_name(transition.to),
                ));
            }
            result
                .events
                .extend(character.drain_notifications().into_iter().map(|n| SimEvent::notified(tick, id, n)));
        }
        sort_events(&mut result.events);

        if !hits.is_empty() {
            debug!(tick, hits = hits.len(), "tick resolved hits");
        }
        self.landed = hits.clone();
        result.hits = hits;
        self.tick += 1;

        Ok(result)
    }

    /// SHA-256 over the tick counter and both characters.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_simulation();
        hasher.update_u32(self.tick);
        for character in &self.characters {
            character.hash_into(&mut hasher);
        }
        hasher.finalize()
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Input and detector output for one tick of a scripted match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScriptedTick {
    /// Player one's and player two's input
    pub inputs: [InputFrame; 2],
    /// Use [`Simulation::point_blank_collisions`] as the detector
    #[serde(default)]
    pub point_blank: bool,
    /// Extra collisions to stage before resolving
    #[serde(skip)]
    pub collisions: Vec<RawCollision>,
}

impl ScriptedTick {
    /// Tick with input only.
    pub fn input(p1: InputFrame, p2: InputFrame) -> Self {
        Self {
            inputs: [p1, p2],
            ..Self::default()
        }
    }

    /// Tick with input and the point-blank detector.
    pub fn contact(p1: InputFrame, p2: InputFrame) -> Self {
        Self {
            inputs: [p1, p2],
            point_blank: true,
            collisions: Vec::new(),
        }
    }
}

/// Run a scripted match from a fresh simulation.
///
/// Collisions for a tick are staged after the state machines of the
/// previous tick ran, so the detector sees exactly the hitboxes that were
/// live going into the tick.
pub fn replay(roster: &RosterConfig, script: &[ScriptedTick]) -> Result<(Simulation, Vec<SimEvent>), SimError> {
    let mut sim = Simulation::new(roster)?;
    let staging = sim.staging();
    let mut all_events = Vec::new();

    for step in script {
        if step.point_blank {
            staging.stage(sim.point_blank_collisions());
        }
        staging.stage(step.collisions.iter().cloned());
        let result = sim.tick(step.inputs)?;
        all_events.extend(result.events);
    }

    Ok((sim, all_events))
}
