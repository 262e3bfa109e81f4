//! Game Module
//!
//! Orchestration of a two-character match. Deterministic given the same
//! roster, inputs and staged collisions.
//!
//! ## Module Structure
//!
//! - `character`: one fighter and its per-tick steps
//! - `tick`: the simulation loop and scripted replays
//! - `events`: events emitted by a tick

pub mod character;
pub mod tick;
pub mod events;

pub use character::{Character, CommandStep};
pub use tick::{replay, ScriptedTick, SimError, Simulation, TickResult};
pub use events::{EventPriority, SimEvent, SimEventData};
