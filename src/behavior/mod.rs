//! Behavior Module
//!
//! - `context`: per-character blackboard and id types
//! - `condition`: predicates over the blackboard
//! - `state`: the closed catalog of state kinds and their lifecycle
//! - `graph`: authored state graph and its validated form
//! - `machine`: the running state machine

pub mod context;
pub mod condition;
pub mod state;
pub mod graph;
pub mod machine;

pub use context::{CharacterId, ContextData, ContextFlags, StateId, TriggerId};
pub use condition::{Comparison, Condition};
pub use state::{BehaviorConfig, BehaviorState, Notification, PendingImpact, StateContext, StateKind, SubEvent, SubEventAction};
pub use graph::{GraphError, StateGraph, StateGraphConfig};
pub use machine::{StateMachine, Transition, TransitionCause};
