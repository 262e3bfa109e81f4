//! # Duel Core
//!
//! Deterministic per-frame combat resolution for a two-player fighting game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        DUEL CORE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  input/          - Per-character input history               │
//! │  ├── signal.rs   - Direction / attack flag sets + duration   │
//! │  ├── buffer.rs   - Fixed-capacity signal ring buffer         │
//! │  └── recorder.rs - Compression and replay recordings         │
//! │                                                              │
//! │  command/        - Input → request                           │
//! │  ├── definition.rs - Commands, mapping rules, catalog        │
//! │  ├── matcher.rs  - Windowed sequence matching                │
//! │  └── scheduler.rs- Pooled priority queue with expiry         │
//! │                                                              │
//! │  behavior/       - Request → state                           │
//! │  ├── context.rs  - Per-character blackboard                  │
//! │  ├── condition.rs- Predicates over the blackboard            │
//! │  ├── state.rs    - State kinds and sub-events                │
//! │  ├── graph.rs    - Hierarchical state graph                  │
//! │  └── machine.rs  - The state machine                         │
//! │                                                              │
//! │  combat/         - Collision → hit                           │
//! │  ├── hitbox.rs   - Hitbox / hurtbox / effect payloads        │
//! │  ├── staging.rs  - Locked collision hand-off                 │
//! │  └── resolve.rs  - Dedup, classification, application        │
//! │                                                              │
//! │  game/           - Orchestration                             │
//! │  ├── character.rs- One fighter                               │
//! │  ├── tick.rs     - Simulation loop and replay                │
//! │  └── events.rs   - Outbound events                           │
//! │                                                              │
//! │  config.rs       - Simulation and roster configuration       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything under `Simulation::tick` is deterministic:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - Collisions are consumed in staging order
//!
//! Given the same roster, inputs and staged collisions, two runs produce
//! **identical events and state hashes**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod input;
pub mod command;
pub mod behavior;
pub mod combat;
pub mod game;
pub mod config;

// Re-export commonly used types
pub use self::core::fixed::{Fixed, FIXED_ONE, FIXED_SCALE};
pub use self::core::vec2::FixedVec2;
pub use input::{AttackButtons, Direction, InputFrame, SignalBuffer};
pub use behavior::{CharacterId, StateGraphConfig};
pub use command::{CommandDefinition, RequestScheduler};
pub use combat::{HitResolutionPipeline, HitType, ProcessedHitResult};
pub use game::{replay, ScriptedTick, SimError, SimEvent, Simulation, TickResult};
pub use config::{ConfigError, RosterConfig, SimConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Longest hold a signal records, in frames
pub const SIGNAL_DURATION_CAP: u8 = 99;

/// Default slots per input history
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// Default starting health
pub const DEFAULT_MAX_HEALTH: i32 = 10_000;
