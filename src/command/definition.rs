//! Command Definitions
//!
//! A command is an ordered input sequence (directions and/or buttons) that
//! must appear within a frame window, plus the rules that map a recognized
//! command to a state-machine trigger depending on the character's context.
//!
//! Definitions are authored with state and trigger names and compiled into
//! a [`CommandCatalog`] against a built state graph, so every reference is
//! checked once at setup.

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::behavior::condition::{all_hold, Condition};
use crate::behavior::context::{ContextData, StateId, TriggerId};
use crate::behavior::graph::StateGraph;
use crate::input::buffer::BufferError;
use crate::input::signal::{AttackSignal, DirectionSignal};

/// Default frame window for a command.
pub const DEFAULT_WINDOW_LENGTH: u32 = 20;

/// Default lifetime of a matched request.
pub const DEFAULT_LIFETIME: u32 = 10;

/// Command catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Kind has no matching rule.
    #[error("command '{command}': {kind:?} commands are not supported")]
    UnsupportedKind {
        /// Command name
        command: String,
        /// Offending kind
        kind: CommandKind,
    },
    /// Required sequence missing for the kind.
    #[error("command '{command}' has no required {what} signals")]
    EmptySequence {
        /// Command name
        command: String,
        /// Which sequence is missing
        what: &'static str,
    },
    /// Window of zero frames can never match.
    #[error("command '{0}' has a zero-length window")]
    ZeroWindow(String),
    /// A request that expires before it is ever dequeued.
    #[error("command '{0}' has a zero lifetime")]
    ZeroLifetime(String),
    /// Mapping rule names an unknown state.
    #[error("command '{command}' references unknown state '{state}'")]
    UnknownState {
        /// Command name
        command: String,
        /// Missing state
        state: String,
    },
    /// Mapping rule names an unknown trigger.
    #[error("command '{command}' references unknown trigger '{trigger}'")]
    UnknownTrigger {
        /// Command name
        command: String,
        /// Missing trigger
        trigger: String,
    },
    /// Input history could not be read.
    #[error("input history: {0}")]
    Buffer(#[from] BufferError),
}

/// How a command's inputs are recognized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Direction sequence only.
    Move,
    /// Fresh button press, optionally preceded by a direction sequence.
    Attack,
    /// Hold-and-release input. Recognized by no matcher.
    Charge,
}

/// Context-dependent mapping from a matched command to a trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// All must hold
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Active state must be one of these (empty = any)
    #[serde(default)]
    pub required_states: Vec<String>,
    /// Trigger fired when the rule applies
    pub trigger: String,
    /// Lower is tried first
    #[serde(default)]
    pub priority: u32,
}

/// Authored command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDefinition {
    /// Unique name
    pub name: String,
    /// Recognition kind
    pub kind: CommandKind,
    /// Ordered direction sequence, oldest first
    #[serde(default)]
    pub directions: Vec<DirectionSignal>,
    /// Ordered button sequence, oldest first
    #[serde(default)]
    pub attacks: Vec<AttackSignal>,
    /// Frames the whole sequence must fit in
    #[serde(default = "default_window_length")]
    pub window_length: u32,
    /// Lower wins. Defaults to the position in the catalog.
    #[serde(default)]
    pub priority: Option<u32>,
    /// Ticks a matched request stays consumable
    #[serde(default = "default_lifetime")]
    pub lifetime: u32,
    /// Trigger mappings, tried by rule priority
    #[serde(default)]
    pub rules: Vec<MappingRule>,
}

fn default_window_length() -> u32 {
    DEFAULT_WINDOW_LENGTH
}

fn default_lifetime() -> u32 {
    DEFAULT_LIFETIME
}

/// Mapping rule with resolved references.
#[derive(Clone, Debug)]
pub struct CompiledRule {
    conditions: Vec<Condition<StateId>>,
    required_states: Vec<StateId>,
    /// Trigger to fire
    pub trigger: TriggerId,
}

impl CompiledRule {
    /// Whether the rule applies in `ctx`.
    pub fn matches(&self, ctx: &ContextData) -> bool {
        (self.required_states.is_empty() || self.required_states.contains(&ctx.current_state))
            && all_hold(&self.conditions, ctx)
    }
}

/// Command ready for matching.
#[derive(Clone, Debug)]
pub struct Command {
    /// Unique name
    pub name: String,
    /// Recognition kind
    pub kind: CommandKind,
    /// Ordered direction sequence, oldest first
    pub directions: Vec<DirectionSignal>,
    /// Ordered button sequence, oldest first
    pub attacks: Vec<AttackSignal>,
    /// Frames the whole sequence must fit in
    pub window_length: u32,
    /// Lower wins
    pub priority: u32,
    /// Ticks a matched request stays consumable
    pub lifetime: u32,
    rules: Vec<CompiledRule>,
}

impl Command {
    /// First rule that applies in `ctx`.
    pub fn map(&self, ctx: &ContextData) -> Option<TriggerId> {
        self.rules.iter().find(|r| r.matches(ctx)).map(|r| r.trigger)
    }
}

/// Compiled commands, in ascending priority (stable).
#[derive(Clone, Debug, Default)]
pub struct CommandCatalog {
    commands: Vec<Command>,
}

impl CommandCatalog {
    /// Validate and resolve authored commands against a graph.
    pub fn compile(definitions: &[CommandDefinition], graph: &StateGraph) -> Result<Self, CommandError> {
        let mut commands = Vec::with_capacity(definitions.len());

        for (index, def) in definitions.iter().enumerate() {
            validate_sequence(def)?;

            let mut rules = def
                .rules
                .iter()
                .map(|rule| compile_rule(&def.name, rule, graph).map(|r| (rule.priority, r)))
                .collect::<Result<Vec<_>, _>>()?;
            rules.sort_by_key(|(priority, _)| *priority);

            commands.push(Command {
                name: def.name.clone(),
                kind: def.kind,
                directions: def.directions.clone(),
                attacks: def.attacks.clone(),
                window_length: def.window_length,
                priority: def.priority.unwrap_or(index as u32),
                lifetime: def.lifetime,
                rules: rules.into_iter().map(|(_, r)| r).collect(),
            });
        }

        commands.sort_by_key(|c| c.priority);
        debug!(count = commands.len(), "compiled command catalog");
        Ok(Self { commands })
    }

    /// Commands in evaluation order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Command at `index`.
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the catalog has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn validate_sequence(def: &CommandDefinition) -> Result<(), CommandError> {
    if def.window_length == 0 {
        return Err(CommandError::ZeroWindow(def.name.clone()));
    }
    if def.lifetime == 0 {
        return Err(CommandError::ZeroLifetime(def.name.clone()));
    }
    match def.kind {
        CommandKind::Move if def.directions.is_empty() => Err(CommandError::EmptySequence {
            command: def.name.clone(),
            what: "direction",
        }),
        CommandKind::Attack if def.attacks.is_empty() => Err(CommandError::EmptySequence {
            command: def.name.clone(),
            what: "attack",
        }),
        CommandKind::Charge => Err(CommandError::UnsupportedKind {
            command: def.name.clone(),
            kind: def.kind,
        }),
        _ => Ok(()),
    }
}

fn compile_rule(command: &str, rule: &MappingRule, graph: &StateGraph) -> Result<CompiledRule, CommandError> {
    let state = |name: String| {
        graph.state_id(&name).ok_or_else(|| CommandError::UnknownState {
            command: command.to_string(),
            state: name,
        })
    };

    let conditions = rule
        .conditions
        .iter()
        .cloned()
        .map(|c| c.resolve(state))
        .collect::<Result<Vec<_>, _>>()?;
    let required_states = rule
        .required_states
        .iter()
        .cloned()
        .map(state)
        .collect::<Result<Vec<_>, _>>()?;
    let trigger = graph.trigger_id(&rule.trigger).ok_or_else(|| CommandError::UnknownTrigger {
        command: command.to_string(),
        trigger: rule.trigger.clone(),
    })?;

    Ok(CompiledRule {
        conditions,
        required_states,
        trigger,
    })
}
