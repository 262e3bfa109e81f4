//! State Graph
//!
//! Authored description of a character's states, their grouping and the
//! transitions between them, and the validated, index-resolved graph the
//! state machine runs on.
//!
//! ```text
//!   StateGraphConfig (names, JSON) ──build()──► StateGraph (ids, lookups)
//! ```
//!
//! States may sit in nested groups. A transition authored from a group
//! applies to every state below it; one authored with no source applies
//! from any state. Lookups walk outward: exact state, enclosing groups from
//! nearest to farthest, then "any".

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::input::signal::Direction;
use super::condition::{all_hold, Condition};
use super::context::{ContextData, StateId, TriggerId};
use super::state::{BehaviorConfig, JumpDirection, StateKind, WalkDirection};

/// Jump length of the standard graph, in ticks.
pub const STANDARD_JUMP_DURATION: u32 = 36;

/// Graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Two states share a name.
    #[error("duplicate state '{0}'")]
    DuplicateState(String),
    /// Two groups share a name, or a group shadows a state.
    #[error("duplicate group '{0}'")]
    DuplicateGroup(String),
    /// Reference to a state that does not exist.
    #[error("{context} references unknown state '{name}'")]
    UnknownState {
        /// Where the reference was found
        context: String,
        /// Missing name
        name: String,
    },
    /// Reference to a group that does not exist.
    #[error("{context} references unknown group '{name}'")]
    UnknownGroup {
        /// Where the reference was found
        context: String,
        /// Missing name
        name: String,
    },
    /// Group is its own ancestor.
    #[error("group '{0}' is part of a parent cycle")]
    GroupCycle(String),
    /// Transition with neither a trigger nor conditions.
    #[error("transition to '{0}' has no trigger and no conditions")]
    EmptyTransition(String),
    /// Same trigger authored twice from the same source.
    #[error("trigger '{trigger}' is defined twice from {source_name}")]
    DuplicateTrigger {
        /// Source state or group (or "any")
        source_name: String,
        /// Trigger name
        trigger: String,
    },
    /// Trigger the runtime relies on has no transition.
    #[error("required trigger '{0}' has no transition")]
    MissingTrigger(String),
    /// Graph has no states.
    #[error("graph has no states")]
    Empty,
    /// More states or triggers than an id can address.
    #[error("graph exceeds {0} states or triggers")]
    TooLarge(usize),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Authored state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// Unique name
    pub name: String,
    /// Enclosing group
    #[serde(default)]
    pub group: Option<String>,
    /// Behavior
    pub behavior: BehaviorConfig,
}

/// Authored state group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Unique name
    pub name: String,
    /// Enclosing group
    #[serde(default)]
    pub parent: Option<String>,
}

/// Authored transition.
///
/// With a trigger it fires when that trigger is raised; without one it
/// fires on its own as soon as every condition holds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Source state or group; `None` is any state
    #[serde(default)]
    pub from: Option<String>,
    /// Target state
    pub to: String,
    /// Trigger name
    #[serde(default)]
    pub trigger: Option<String>,
    /// Conditions of a conditional transition
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Allow the target to be the current state (exit + enter again)
    #[serde(default)]
    pub reenter: bool,
}

fn default_initial() -> String {
    "idle".into()
}

fn default_move_complete() -> String {
    "MoveComplete".into()
}

fn default_hit_stun() -> String {
    "HitStun".into()
}

fn default_block_stun() -> String {
    "BlockStun".into()
}

/// Authored state graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateGraphConfig {
    /// States, in id order
    pub states: Vec<StateConfig>,
    /// Groups
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    /// Transitions, in evaluation order
    #[serde(default)]
    pub transitions: Vec<TransitionConfig>,
    /// State entered on start
    #[serde(default = "default_initial")]
    pub initial: String,
    /// State a landing jump returns to
    #[serde(default = "default_initial")]
    pub idle_state: String,
    /// Trigger fired by attacks and stuns when they finish
    #[serde(default = "default_move_complete")]
    pub move_complete_trigger: String,
    /// Trigger forced by a clean hit
    #[serde(default = "default_hit_stun")]
    pub hit_stun_trigger: String,
    /// Trigger forced by a guarded hit
    #[serde(default = "default_block_stun")]
    pub block_stun_trigger: String,
}

impl Default for StateGraphConfig {
    fn default() -> Self {
        Self {
            states: Vec::new(),
            groups: Vec::new(),
            transitions: Vec::new(),
            initial: default_initial(),
            idle_state: default_initial(),
            move_complete_trigger: default_move_complete(),
            hit_stun_trigger: default_hit_stun(),
            block_stun_trigger: default_block_stun(),
        }
    }
}

impl StateGraphConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Basic movement catalog: idle, walks, crouch, three jumps and both
    /// stuns, with the locomotion transitions and the runtime triggers.
    pub fn standard() -> Self {
        let mut config = Self::default();
        config.add_group("neutral", None);

        config
            .add_state("idle", Some("neutral"), BehaviorConfig::Idle { animation: Some("idle".into()) })
            .add_state("walk_forward", Some("neutral"), walk(WalkDirection::Forward, "walk_forward"))
            .add_state("walk_backward", Some("neutral"), walk(WalkDirection::Backward, "walk_backward"))
            .add_state("crouch", Some("neutral"), BehaviorConfig::Crouch { animation: Some("crouch".into()) })
            .add_state("jump_neutral", None, jump(JumpDirection::Neutral))
            .add_state("jump_forward", None, jump(JumpDirection::Forward))
            .add_state("jump_backward", None, jump(JumpDirection::Backward))
            .add_state("hit_stun", None, BehaviorConfig::HitStun { animation: Some("hit_stun".into()) })
            .add_state("block_stun", None, BehaviorConfig::BlockStun { animation: Some("block_stun".into()) });

        // jumps are checked before walks
        config
            .add_conditional(Some("idle"), "crouch", vec![holding(Direction::DOWN)])
            .add_conditional(Some("idle"), "jump_forward", vec![holding(Direction::UP | Direction::FRONT)])
            .add_conditional(Some("idle"), "jump_backward", vec![holding(Direction::UP | Direction::BACK)])
            .add_conditional(Some("idle"), "jump_neutral", vec![holding(Direction::UP)])
            .add_conditional(Some("idle"), "walk_forward", vec![holding(Direction::FRONT)])
            .add_conditional(Some("idle"), "walk_backward", vec![holding(Direction::BACK)])
            .add_conditional(Some("walk_forward"), "idle", vec![not_holding(Direction::FRONT)])
            .add_conditional(Some("walk_forward"), "jump_forward", vec![holding(Direction::UP | Direction::FRONT)])
            .add_conditional(Some("walk_forward"), "crouch", vec![holding(Direction::DOWN)])
            .add_conditional(Some("walk_backward"), "idle", vec![not_holding(Direction::BACK)])
            .add_conditional(Some("walk_backward"), "jump_backward", vec![holding(Direction::UP | Direction::BACK)])
            .add_conditional(Some("walk_backward"), "crouch", vec![holding(Direction::DOWN)])
            .add_conditional(Some("crouch"), "idle", vec![not_holding(Direction::DOWN)]);

        let (complete, hit, block) = (
            config.move_complete_trigger.clone(),
            config.hit_stun_trigger.clone(),
            config.block_stun_trigger.clone(),
        );
        config
            .add_trigger_transition(None, &complete, "idle", false)
            .add_trigger_transition(None, &hit, "hit_stun", true)
            .add_trigger_transition(None, &block, "block_stun", true);

        config
    }

    /// Add a group.
    pub fn add_group(&mut self, name: &str, parent: Option<&str>) -> &mut Self {
        self.groups.push(GroupConfig {
            name: name.into(),
            parent: parent.map(Into::into),
        });
        self
    }

    /// Add a state.
    pub fn add_state(&mut self, name: &str, group: Option<&str>, behavior: BehaviorConfig) -> &mut Self {
        self.states.push(StateConfig {
            name: name.into(),
            group: group.map(Into::into),
            behavior,
        });
        self
    }

    /// Add a trigger-driven transition.
    pub fn add_trigger_transition(&mut self, from: Option<&str>, trigger: &str, to: &str, reenter: bool) -> &mut Self {
        self.transitions.push(TransitionConfig {
            from: from.map(Into::into),
            to: to.into(),
            trigger: Some(trigger.into()),
            conditions: Vec::new(),
            reenter,
        });
        self
    }

    /// Add a conditional transition.
    pub fn add_conditional(&mut self, from: Option<&str>, to: &str, conditions: Vec<Condition>) -> &mut Self {
        self.transitions.push(TransitionConfig {
            from: from.map(Into::into),
            to: to.into(),
            trigger: None,
            conditions,
            reenter: false,
        });
        self
    }

    /// Validate and resolve every reference.
    pub fn build(&self) -> Result<StateGraph, GraphError> {
        GraphBuilder::new(self)?.finish()
    }
}

fn walk(direction: WalkDirection, clip: &str) -> BehaviorConfig {
    BehaviorConfig::Walk {
        direction,
        speed: None,
        animation: Some(clip.into()),
    }
}

fn jump(direction: JumpDirection) -> BehaviorConfig {
    BehaviorConfig::Jump {
        direction,
        duration: STANDARD_JUMP_DURATION,
        animation: Some("jump".into()),
    }
}

fn holding(direction: Direction) -> Condition {
    Condition::Holding { direction }
}

fn not_holding(direction: Direction) -> Condition {
    Condition::NotHolding { direction }
}

// =============================================================================
// RESOLVED GRAPH
// =============================================================================

/// Where a transition applies from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Source {
    State(StateId),
    Group(usize),
    Any,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Target {
    to: StateId,
    reenter: bool,
}

#[derive(Clone, Debug)]
struct Conditional {
    to: StateId,
    conditions: Vec<Condition<StateId>>,
}

#[derive(Clone, Debug)]
struct StateNode {
    name: String,
    group: Option<usize>,
    behavior: BehaviorConfig,
}

/// Validated graph with every name resolved to an index.
#[derive(Clone, Debug)]
pub struct StateGraph {
    states: Vec<StateNode>,
    group_parents: Vec<Option<usize>>,
    state_ids: BTreeMap<String, StateId>,
    trigger_names: Vec<String>,
    trigger_ids: BTreeMap<String, TriggerId>,
    triggers: BTreeMap<(Source, TriggerId), Target>,
    // per state: own, enclosing groups, then any
    conditionals: Vec<Vec<Conditional>>,
    initial: StateId,
    idle: StateId,
    move_complete: TriggerId,
    hit_stun: TriggerId,
    block_stun: TriggerId,
}

impl StateGraph {
    /// Id of a state by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.state_ids.get(name).copied()
    }

    /// Id of a trigger by name.
    pub fn trigger_id(&self, name: &str) -> Option<TriggerId> {
        self.trigger_ids.get(name).copied()
    }

    /// Name of a state.
    pub fn state_name(&self, id: StateId) -> &str {
        &self.states[id.0 as usize].name
    }

    /// Name of a trigger.
    pub fn trigger_name(&self, id: TriggerId) -> &str {
        &self.trigger_names[id.0 as usize]
    }

    /// Kind of a state.
    pub fn kind_of(&self, id: StateId) -> StateKind {
        self.states[id.0 as usize].behavior.kind()
    }

    /// Behavior of a state.
    pub fn behavior(&self, id: StateId) -> &BehaviorConfig {
        &self.states[id.0 as usize].behavior
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// State entered on start.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    /// State a landing jump returns to.
    pub fn idle(&self) -> StateId {
        self.idle
    }

    /// Trigger fired when an attack or stun finishes.
    pub fn move_complete(&self) -> TriggerId {
        self.move_complete
    }

    /// Trigger forced by a clean hit.
    pub fn hit_stun(&self) -> TriggerId {
        self.hit_stun
    }

    /// Trigger forced by a guarded hit.
    pub fn block_stun(&self) -> TriggerId {
        self.block_stun
    }

    /// Target of `trigger` raised while in `from`.
    ///
    /// `None` when no transition handles it, or when it would re-enter the
    /// current state without allowing it.
    pub fn resolve_trigger(&self, from: StateId, trigger: TriggerId) -> Option<StateId> {
        let target = self
            .sources(from)
            .find_map(|source| self.triggers.get(&(source, trigger)))?;
        (target.to != from || target.reenter).then_some(target.to)
    }

    /// First conditional transition out of `from` whose conditions hold.
    pub fn first_conditional(&self, from: StateId, ctx: &ContextData) -> Option<StateId> {
        self.conditionals[from.0 as usize]
            .iter()
            .find(|c| all_hold(&c.conditions, ctx))
            .map(|c| c.to)
    }

    fn sources(&self, state: StateId) -> impl Iterator<Item = Source> + '_ {
        let groups = std::iter::successors(self.states[state.0 as usize].group, |g| self.group_parents[*g]);
        std::iter::once(Source::State(state))
            .chain(groups.map(Source::Group))
            .chain(std::iter::once(Source::Any))
    }
}

// =============================================================================
// BUILDER
// =============================================================================

struct GraphBuilder<'a> {
    config: &'a StateGraphConfig,
    state_ids: BTreeMap<String, StateId>,
    group_ids: BTreeMap<String, usize>,
    group_parents: Vec<Option<usize>>,
}

impl<'a> GraphBuilder<'a> {
    fn new(config: &'a StateGraphConfig) -> Result<Self, GraphError> {
        if config.states.is_empty() {
            return Err(GraphError::Empty);
        }
        if config.states.len() > u16::MAX as usize {
            return Err(GraphError::TooLarge(u16::MAX as usize));
        }

        let mut state_ids = BTreeMap::new();
        for (index, state) in config.states.iter().enumerate() {
            if state_ids.insert(state.name.clone(), StateId(index as u16)).is_some() {
                return Err(GraphError::DuplicateState(state.name.clone()));
            }
        }

        let mut group_ids = BTreeMap::new();
        for (index, group) in config.groups.iter().enumerate() {
            if state_ids.contains_key(&group.name) || group_ids.insert(group.name.clone(), index).is_some() {
                return Err(GraphError::DuplicateGroup(group.name.clone()));
            }
        }

        let mut builder = Self {
            config,
            state_ids,
            group_ids,
            group_parents: Vec::with_capacity(config.groups.len()),
        };

        for group in &config.groups {
            let parent = group
                .parent
                .as_deref()
                .map(|p| builder.group(p, &format!("group '{}'", group.name)))
                .transpose()?;
            builder.group_parents.push(parent);
        }
        builder.check_cycles()?;

        Ok(builder)
    }

    fn state(&self, name: &str, context: &str) -> Result<StateId, GraphError> {
        self.state_ids.get(name).copied().ok_or_else(|| GraphError::UnknownState {
            context: context.into(),
            name: name.into(),
        })
    }

    fn group(&self, name: &str, context: &str) -> Result<usize, GraphError> {
        self.group_ids.get(name).copied().ok_or_else(|| GraphError::UnknownGroup {
            context: context.into(),
            name: name.into(),
        })
    }

    fn source(&self, from: Option<&str>, context: &str) -> Result<Source, GraphError> {
        let Some(name) = from else {
            return Ok(Source::Any);
        };
        if let Some(id) = self.state_ids.get(name) {
            return Ok(Source::State(*id));
        }
        self.group(name, context).map(Source::Group)
    }

    fn check_cycles(&self) -> Result<(), GraphError> {
        for (start, group) in self.config.groups.iter().enumerate() {
            let mut seen = BTreeSet::new();
            let mut cursor = Some(start);
            while let Some(g) = cursor {
                if !seen.insert(g) {
                    return Err(GraphError::GroupCycle(group.name.clone()));
                }
                cursor = self.group_parents[g];
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<StateGraph, GraphError> {
        let config = self.config;

        let states = config
            .states
            .iter()
            .map(|s| {
                let group = s
                    .group
                    .as_deref()
                    .map(|g| self.group(g, &format!("state '{}'", s.name)))
                    .transpose()?;
                Ok(StateNode {
                    name: s.name.clone(),
                    group,
                    behavior: s.behavior.clone(),
                })
            })
            .collect::<Result<Vec<_>, GraphError>>()?;

        let mut trigger_names: Vec<String> = Vec::new();
        let mut trigger_ids: BTreeMap<String, TriggerId> = BTreeMap::new();
        let mut triggers = BTreeMap::new();
        let mut authored_conditionals: Vec<(Source, Conditional)> = Vec::new();

        for transition in &config.transitions {
            let context = format!("transition to '{}'", transition.to);
            let source = self.source(transition.from.as_deref(), &context)?;
            let to = self.state(&transition.to, &context)?;

            match &transition.trigger {
                Some(name) => {
                    let trigger = match trigger_ids.get(name) {
                        Some(id) => *id,
                        None => {
                            if trigger_names.len() >= u16::MAX as usize {
                                return Err(GraphError::TooLarge(u16::MAX as usize));
                            }
                            let id = TriggerId(trigger_names.len() as u16);
                            trigger_names.push(name.clone());
                            trigger_ids.insert(name.clone(), id);
                            id
                        }
                    };
                    let target = Target {
                        to,
                        reenter: transition.reenter,
                    };
                    if triggers.insert((source, trigger), target).is_some() {
                        return Err(GraphError::DuplicateTrigger {
                            source_name: transition.from.clone().unwrap_or_else(|| "any".into()),
                            trigger: name.clone(),
                        });
                    }
                }
                None => {
                    if transition.conditions.is_empty() {
                        return Err(GraphError::EmptyTransition(transition.to.clone()));
                    }
                    let conditions = transition
                        .conditions
                        .iter()
                        .cloned()
                        .map(|c| c.resolve(|name: String| self.state(&name, &context)))
                        .collect::<Result<Vec<_>, _>>()?;
                    authored_conditionals.push((source, Conditional { to, conditions }));
                }
            }
        }

        let required = |name: &str| {
            trigger_ids
                .get(name)
                .copied()
                .ok_or_else(|| GraphError::MissingTrigger(name.into()))
        };
        let move_complete = required(&config.move_complete_trigger)?;
        let hit_stun = required(&config.hit_stun_trigger)?;
        let block_stun = required(&config.block_stun_trigger)?;
        let initial = self.state(&config.initial, "initial state")?;
        let idle = self.state(&config.idle_state, "idle state")?;

        let mut graph = StateGraph {
            states,
            group_parents: self.group_parents,
            state_ids: self.state_ids,
            trigger_names,
            trigger_ids,
            triggers,
            conditionals: Vec::new(),
            initial,
            idle,
            move_complete,
            hit_stun,
            block_stun,
        };

        // flatten each state's conditionals in lookup order, dropping self-loops
        let conditionals: Vec<Vec<Conditional>> = (0..graph.states.len())
            .map(|index| {
                let id = StateId(index as u16);
                graph
                    .sources(id)
                    .flat_map(|source| {
                        authored_conditionals
                            .iter()
                            .filter(move |(s, c)| *s == source && c.to != id)
                            .map(|(_, c)| c.clone())
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        graph.conditionals = conditionals;

        debug!(
            states = graph.states.len(),
            triggers = graph.trigger_names.len(),
            "built state graph"
        );
        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::context::CharacterId;
    use crate::input::signal::DirectionSignal;

    fn ctx(graph: &StateGraph, state: &str, direction: Direction) -> ContextData {
        let id = graph.state_id(state).unwrap();
        let mut ctx = ContextData::new(CharacterId(0), id, graph.kind_of(id), 100, true);
        ctx.direction = DirectionSignal::new(direction);
        ctx
    }

    #[test]
    fn test_standard_builds() {
        let graph = StateGraphConfig::standard().build().unwrap();
        assert_eq!(graph.state_count(), 9);
        assert_eq!(graph.state_name(graph.initial()), "idle");
        assert_eq!(graph.kind_of(graph.state_id("walk_backward").unwrap()), StateKind::WalkBackward);
        assert_eq!(graph.trigger_name(graph.hit_stun()), "HitStun");
    }

    #[test]
    fn test_standard_conditionals() {
        let graph = StateGraphConfig::standard().build().unwrap();
        let id = |n: &str| graph.state_id(n);
        let idle = id("idle").unwrap();

        let cases = [
            (Direction::empty(), None),
            (Direction::DOWN | Direction::BACK, id("crouch")),
            (Direction::UP | Direction::FRONT, id("jump_forward")),
            (Direction::UP, id("jump_neutral")),
            (Direction::FRONT, id("walk_forward")),
            (Direction::BACK, id("walk_backward")),
        ];
        for (direction, expected) in cases {
            assert_eq!(graph.first_conditional(idle, &ctx(&graph, "idle", direction)), expected, "{direction:?}");
        }

        let crouch = id("crouch").unwrap();
        assert_eq!(graph.first_conditional(crouch, &ctx(&graph, "crouch", Direction::DOWN)), None);
        assert_eq!(graph.first_conditional(crouch, &ctx(&graph, "crouch", Direction::empty())), Some(idle));
    }

    #[test]
    fn test_trigger_self_target_needs_reenter() {
        let graph = StateGraphConfig::standard().build().unwrap();
        let idle = graph.initial();
        let hit_stun = graph.state_id("hit_stun").unwrap();

        assert_eq!(graph.resolve_trigger(idle, graph.move_complete()), None);
        assert_eq!(graph.resolve_trigger(hit_stun, graph.move_complete()), Some(idle));
        assert_eq!(graph.resolve_trigger(hit_stun, graph.hit_stun()), Some(hit_stun));
    }

    #[test]
    fn test_trigger_precedence_state_group_any() {
        let mut config = StateGraphConfig::standard();
        config
            .add_group("grounded", None)
            .add_state("taunt", None, BehaviorConfig::Idle { animation: None })
            .add_state("jab", None, BehaviorConfig::Attack { duration: 4, events: vec![] })
            .add_state("crouch_jab", None, BehaviorConfig::Attack { duration: 4, events: vec![] })
            .add_trigger_transition(None, "LP", "taunt", false)
            .add_trigger_transition(Some("neutral"), "LP", "jab", false)
            .add_trigger_transition(Some("crouch"), "LP", "crouch_jab", false);
        config.groups[0].parent = Some("grounded".into());
        let graph = config.build().unwrap();
        let lp = graph.trigger_id("LP").unwrap();
        let at = |n: &str| graph.state_id(n).unwrap();

        assert_eq!(graph.resolve_trigger(at("crouch"), lp), Some(at("crouch_jab")));
        assert_eq!(graph.resolve_trigger(at("walk_forward"), lp), Some(at("jab")));
        assert_eq!(graph.resolve_trigger(at("jump_neutral"), lp), Some(at("taunt")));
    }

    #[test]
    fn test_unknown_references_rejected() {
        let mut config = StateGraphConfig::standard();
        config.add_trigger_transition(Some("nowhere"), "X", "idle", false);
        assert!(matches!(config.build(), Err(GraphError::UnknownGroup { .. })));

        let mut config = StateGraphConfig::standard();
        config.add_trigger_transition(None, "X", "dash", false);
        assert!(matches!(config.build(), Err(GraphError::UnknownState { .. })));

        let mut config = StateGraphConfig::standard();
        config.add_conditional(Some("idle"), "crouch", vec![Condition::InState { state: "dash".into() }]);
        assert!(matches!(config.build(), Err(GraphError::UnknownState { .. })));
    }

    #[test]
    fn test_structural_errors() {
        let mut config = StateGraphConfig::standard();
        config.add_state("idle", None, BehaviorConfig::Idle { animation: None });
        assert_eq!(config.build().unwrap_err(), GraphError::DuplicateState("idle".into()));

        let mut config = StateGraphConfig::standard();
        config.add_group("a", Some("b")).add_group("b", Some("a"));
        assert!(matches!(config.build(), Err(GraphError::GroupCycle(_))));

        let mut config = StateGraphConfig::standard();
        config.add_conditional(None, "idle", vec![]);
        assert_eq!(config.build().unwrap_err(), GraphError::EmptyTransition("idle".into()));

        let mut config = StateGraphConfig::standard();
        config.transitions.retain(|t| t.trigger.as_deref() != Some("BlockStun"));
        assert_eq!(config.build().unwrap_err(), GraphError::MissingTrigger("BlockStun".into()));

        let mut config = StateGraphConfig::standard();
        config.add_trigger_transition(None, "HitStun", "idle", false);
        assert!(matches!(config.build(), Err(GraphError::DuplicateTrigger { .. })));

        assert_eq!(StateGraphConfig::default().build().unwrap_err(), GraphError::Empty);
    }

    #[test]
    fn test_json_round_trip() {
        let config = StateGraphConfig::standard();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = StateGraphConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(parsed.build().is_ok());
    }
}
