//! Command Module
//!
//! - `definition`: authored commands, mapping rules and the compiled catalog
//! - `matcher`: sequence matching against the input history
//! - `scheduler`: pooled priority queue of matched requests

pub mod definition;
pub mod matcher;
pub mod scheduler;

pub use definition::{Command, CommandCatalog, CommandDefinition, CommandError, CommandKind, MappingRule};
pub use matcher::{is_performed, match_sequence};
pub use scheduler::{PendingRequest, Prioritized, RequestScheduler, SchedulerSnapshot};
