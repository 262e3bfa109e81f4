//! Input Module
//!
//! - `signal`: direction and attack flag sets with hold durations
//! - `buffer`: fixed-capacity ring buffer of signals
//! - `recorder`: per-character compression and replay recordings

pub mod signal;
pub mod buffer;
pub mod recorder;

pub use signal::{AttackButtons, AttackSignal, Direction, DirectionSignal, Signal, SignalFlags};
pub use buffer::{BufferError, SignalBuffer};
pub use recorder::{InputFrame, InputRecorder, InputRecording};
