//! Simulation and Roster Configuration
//!
//! Everything a match is built from: simulation limits, and for each of the
//! two characters its state graph and command catalog. Loaded from JSON or
//! taken from the built-in sample roster.

use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::behavior::condition::Condition;
use crate::behavior::graph::StateGraphConfig;
use crate::behavior::state::{BehaviorConfig, SubEvent, SubEventAction};
use crate::combat::hitbox::{AttackType, HitEffect, HitboxConfig, HurtboxConfig};
use crate::command::definition::{CommandDefinition, CommandKind, MappingRule};
use crate::core::vec2::FixedVec2;
use crate::input::signal::{AttackButtons, AttackSignal, Direction, DirectionSignal};
use crate::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_HEALTH, TICK_RATE};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON.
    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A match needs exactly two characters.
    #[error("roster must have exactly 2 characters, found {0}")]
    CharacterCount(usize),
    /// Input buffers need room for at least two entries.
    #[error("buffer capacity must be at least 2, got {0}")]
    BufferCapacity(usize),
    /// Characters must start alive.
    #[error("max health must be positive, got {0}")]
    MaxHealth(i32),
}

fn default_buffer_capacity() -> usize {
    DEFAULT_BUFFER_CAPACITY
}

fn default_max_health() -> i32 {
    DEFAULT_MAX_HEALTH
}

fn default_tick_rate() -> u32 {
    TICK_RATE
}

/// Simulation limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Slots in each input history
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    /// Starting health
    #[serde(default = "default_max_health")]
    pub max_health: i32,
    /// Ticks per second
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_health: DEFAULT_MAX_HEALTH,
            tick_rate: TICK_RATE,
        }
    }
}

impl SimConfig {
    /// Check limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity < 2 {
            return Err(ConfigError::BufferCapacity(self.buffer_capacity));
        }
        if self.max_health <= 0 {
            return Err(ConfigError::MaxHealth(self.max_health));
        }
        Ok(())
    }
}

/// One character: its states and its commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterConfig {
    /// Display name
    pub name: String,
    /// State graph
    pub graph: StateGraphConfig,
    /// Command catalog, in authored order
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

/// Both characters of a match plus the simulation limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Simulation limits
    #[serde(default)]
    pub sim: SimConfig,
    /// Player one, then player two
    pub characters: Vec<CharacterConfig>,
}

impl RosterConfig {
    /// Parse and validate from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let roster: Self = serde_json::from_str(json)?;
        roster.validate()?;
        Ok(roster)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check counts and limits. Graph and catalog references are checked
    /// when the characters are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.characters.len() != 2 {
            return Err(ConfigError::CharacterCount(self.characters.len()));
        }
        self.sim.validate()
    }

    /// Two copies of the built-in sample character.
    pub fn sample() -> Self {
        let mut second = sample_character();
        second.name = "Rival".into();
        Self {
            sim: SimConfig::default(),
            characters: vec![sample_character(), second],
        }
    }
}

// =============================================================================
// SAMPLE CHARACTER
// =============================================================================

/// Trigger names used by the sample character.
pub mod triggers {
    /// Standing light punch
    pub const JAB: &str = "Jab";
    /// Crouching light kick
    pub const SWEEP: &str = "Sweep";
    /// Forward heavy kick
    pub const OVERHEAD: &str = "Overhead";
    /// Light punch + light kick
    pub const THROW: &str = "Throw";
    /// Quarter circle forward + heavy punch
    pub const FIREBALL: &str = "Fireball";
    /// Fireball cancelled out of a connecting jab
    pub const FIREBALL_CANCEL: &str = "FireballCancel";
}

fn effect(damage: i32, recovery_frames: u32, push: i32) -> HitEffect {
    HitEffect {
        damage,
        recovery_frames,
        knockback: FixedVec2::from_ints(push, 0),
    }
}

fn hitbox(group: u32, attack_type: AttackType, damage: i32, hit_stun: u32, block_stun: u32) -> HitboxConfig {
    HitboxConfig {
        group,
        offset: FixedVec2::from_ints(1, 1),
        size: FixedVec2::from_ints(1, 1),
        target_layer: 1,
        attack_type,
        on_block: effect(damage / 10, block_stun, 1),
        on_hit: effect(damage, hit_stun, 2),
        on_counter: effect(damage + damage / 5, hit_stun + 4, 3),
        on_punish_counter: effect(damage + damage / 2, hit_stun + 8, 4),
    }
}

/// Attack with an animation over its whole duration, a hitbox over
/// `[active_start, active_start + active)` and an extended hurtbox around it.
fn attack(clip: &str, duration: u32, active_start: u32, active: u32, hitbox: HitboxConfig) -> BehaviorConfig {
    BehaviorConfig::Attack {
        duration,
        events: vec![
            SubEvent {
                start: 0,
                duration,
                action: SubEventAction::Animation { clip: clip.into() },
            },
            SubEvent {
                start: active_start.saturating_sub(1),
                duration: active + 2,
                action: SubEventAction::Hurtbox(HurtboxConfig {
                    id: format!("{clip}_limb"),
                    offset: FixedVec2::from_ints(1, 1),
                    size: FixedVec2::from_ints(1, 1),
                    active: true,
                }),
            },
            SubEvent {
                start: active_start,
                duration: active,
                action: SubEventAction::Hitbox(hitbox),
            },
        ],
    }
}

fn command(name: &str, directions: &[Direction], attack: AttackButtons, lifetime: u32, rules: Vec<MappingRule>) -> CommandDefinition {
    CommandDefinition {
        name: name.into(),
        kind: CommandKind::Attack,
        directions: directions.iter().map(|d| DirectionSignal::new(*d)).collect(),
        attacks: vec![AttackSignal::new(attack)],
        window_length: crate::command::definition::DEFAULT_WINDOW_LENGTH,
        priority: None,
        lifetime,
        rules,
    }
}

fn rule(trigger: &str, required_states: &[&str], conditions: Vec<Condition>) -> MappingRule {
    MappingRule {
        conditions,
        required_states: required_states.iter().map(|s| s.to_string()).collect(),
        trigger: trigger.into(),
        priority: 0,
    }
}

// states attacks can start from; requests made elsewhere wait in the queue
const NEUTRAL: &[&str] = &["idle", "walk_forward", "walk_backward", "crouch"];

/// Standard movement plus five attacks covering every attack type.
pub fn sample_character() -> CharacterConfig {
    use triggers::*;

    let mut graph = StateGraphConfig::standard();
    graph
        .add_state("jab", None, attack("jab", 12, 3, 3, hitbox(1, AttackType::High, 300, 14, 8)))
        .add_state("sweep", None, attack("sweep", 18, 5, 3, hitbox(2, AttackType::Low, 600, 20, 10)))
        .add_state("overhead", None, attack("overhead", 24, 12, 3, hitbox(3, AttackType::Overhead, 700, 18, 10)))
        .add_state("throw", None, attack("throw", 20, 2, 2, hitbox(4, AttackType::Throw, 1200, 30, 0)))
        .add_state("fireball", None, attack("fireball", 30, 10, 4, hitbox(5, AttackType::High, 900, 22, 12)))
        .add_trigger_transition(Some("neutral"), JAB, "jab", false)
        .add_trigger_transition(Some("crouch"), SWEEP, "sweep", false)
        .add_trigger_transition(Some("neutral"), OVERHEAD, "overhead", false)
        .add_trigger_transition(Some("neutral"), THROW, "throw", false)
        .add_trigger_transition(Some("neutral"), FIREBALL, "fireball", false)
        .add_trigger_transition(Some("jab"), FIREBALL_CANCEL, "fireball", false);

    let fireball_motion = [Direction::DOWN, Direction::DOWN | Direction::FRONT, Direction::FRONT];
    let commands = vec![
        command(
            "fireball",
            &fireball_motion,
            AttackButtons::HEAVY_PUNCH,
            6,
            vec![
                rule(FIREBALL_CANCEL, &["jab"], vec![Condition::HitConfirmed { value: true }]),
                rule(FIREBALL, NEUTRAL, vec![]),
            ],
        ),
        command("throw", &[], AttackButtons::LIGHT_PUNCH | AttackButtons::LIGHT_KICK, 3, vec![rule(THROW, NEUTRAL, vec![])]),
        command("overhead", &[Direction::FRONT], AttackButtons::HEAVY_KICK, 4, vec![rule(OVERHEAD, NEUTRAL, vec![])]),
        command("sweep", &[Direction::DOWN], AttackButtons::LIGHT_KICK, 4, vec![rule(SWEEP, &["crouch"], vec![])]),
        command("jab", &[], AttackButtons::LIGHT_PUNCH, 4, vec![rule(JAB, NEUTRAL, vec![])]),
    ];

    CharacterConfig {
        name: "Striker".into(),
        graph,
        commands,
    }
}
