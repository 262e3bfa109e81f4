//! Input Recording
//!
//! Turns raw per-tick input into compressed signals for a character, and
//! keeps a delta-compressed log of the raw input for replays.

use serde::{Serialize, Deserialize};

use crate::behavior::context::CharacterId;
use crate::core::hash::{StateHash, StateHasher};
use super::buffer::{BufferError, SignalBuffer};
use super::signal::{AttackButtons, AttackSignal, Direction, DirectionSignal, Signal, SignalFlags};

// =============================================================================
// INPUT FRAME
// =============================================================================

/// Raw input for one character on one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Facing-relative directions held
    #[serde(default)]
    pub direction: Direction,
    /// Attack buttons held
    #[serde(default)]
    pub attack: AttackButtons,
}

impl InputFrame {
    /// No input.
    pub const fn new() -> Self {
        Self {
            direction: Direction::empty(),
            attack: AttackButtons::empty(),
        }
    }

    /// Input holding only directions.
    pub const fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            attack: AttackButtons::empty(),
        }
    }

    /// Input holding directions and buttons.
    pub const fn with_attack(direction: Direction, attack: AttackButtons) -> Self {
        Self { direction, attack }
    }

    /// Build from raw stick axes, resolving front/back by facing side.
    pub fn from_axes(horizontal: i8, vertical: i8, attack: AttackButtons, facing_right: bool) -> Self {
        Self {
            direction: Direction::from_axes(horizontal, vertical, facing_right),
            attack,
        }
    }

    /// Nothing held.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.direction.is_empty() && self.attack.is_empty()
    }
}

// =============================================================================
// SIGNAL RECORDER
// =============================================================================

/// Per-character direction and attack histories.
///
/// Consecutive identical inputs collapse into one entry whose duration
/// grows each tick (saturating at the cap).
#[derive(Clone, Debug)]
pub struct InputRecorder {
    direction: SignalBuffer<DirectionSignal>,
    attack: SignalBuffer<AttackSignal>,
}

impl InputRecorder {
    /// Create both buffers with `capacity` slots.
    ///
    /// Compression needs to know whether a newest entry exists, so a
    /// capacity of 1 is rejected.
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 1 {
            return Err(BufferError::IndeterminateEmptiness);
        }
        Ok(Self {
            direction: SignalBuffer::new(capacity)?,
            attack: SignalBuffer::new(capacity)?,
        })
    }

    /// Push this tick's input into both histories.
    pub fn record(&mut self, frame: InputFrame) -> Result<(), BufferError> {
        compress_into(&mut self.direction, frame.direction)?;
        compress_into(&mut self.attack, frame.attack)?;
        Ok(())
    }

    /// Direction history.
    pub fn directions(&self) -> &SignalBuffer<DirectionSignal> {
        &self.direction
    }

    /// Attack history.
    pub fn attacks(&self) -> &SignalBuffer<AttackSignal> {
        &self.attack
    }

    /// Newest direction signal (default when nothing recorded yet).
    pub fn current_direction(&self) -> DirectionSignal {
        self.direction.read(0).copied().unwrap_or_default()
    }

    /// Newest attack signal (default when nothing recorded yet).
    pub fn current_attack(&self) -> AttackSignal {
        self.attack.read(0).copied().unwrap_or_default()
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.direction.clear();
        self.attack.clear();
    }
}

fn compress_into<F: SignalFlags>(buffer: &mut SignalBuffer<Signal<F>>, flags: F) -> Result<(), BufferError> {
    if let Some(latest) = buffer.latest_mut()? {
        if latest.flags == flags {
            latest.extend();
            return Ok(());
        }
    }
    buffer.write(Signal::new(flags));
    Ok(())
}

// =============================================================================
// REPLAY RECORDING
// =============================================================================

/// Input change at a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDelta {
    /// Tick when this input began
    pub tick: u32,
    /// The new input
    pub frame: InputFrame,
}

/// Raw input log for one character, storing only ticks where input changed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputRecording {
    /// Character the inputs belong to
    pub character: CharacterId,
    /// First recorded tick
    pub start_tick: u32,
    /// Last recorded tick
    pub end_tick: u32,
    deltas: Vec<InputDelta>,
    #[serde(skip)]
    last_frame: InputFrame,
}

impl InputRecording {
    /// Create an empty recording.
    pub fn new(character: CharacterId) -> Self {
        Self {
            character,
            start_tick: 0,
            end_tick: 0,
            deltas: Vec::with_capacity(256),
            last_frame: InputFrame::new(),
        }
    }

    /// Record input for a tick, storing it only if it changed.
    pub fn record(&mut self, tick: u32, frame: InputFrame) {
        self.end_tick = tick;
        if frame != self.last_frame {
            self.deltas.push(InputDelta { tick, frame });
            self.last_frame = frame;
        }
    }

    /// Input held at `tick`.
    pub fn input_at(&self, tick: u32) -> InputFrame {
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            InputFrame::new()
        } else {
            self.deltas[idx - 1].frame
        }
    }

    /// Stored changes.
    pub fn deltas(&self) -> &[InputDelta] {
        &self.deltas
    }

    /// Iterate `(tick, input)` for every tick from start to end.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: self.start_tick,
            delta_idx: 0,
            current_frame: InputFrame::new(),
        }
    }

    /// Hash of the recorded inputs.
    pub fn hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_inputs();
        hasher.update_u8(self.character.0);
        hasher.update_u32(self.start_tick);
        hasher.update_u32(self.end_tick);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.frame.direction.bits());
            hasher.update_u8(delta.frame.attack.bits());
        }
        hasher.finalize()
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Decode with bincode.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        let mut recording: Self = bincode::deserialize(bytes)?;
        recording.last_frame = recording.deltas.last().map(|d| d.frame).unwrap_or_default();
        Ok(recording)
    }
}

/// Tick-by-tick replay of an [`InputRecording`].
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current_frame: InputFrame,
}

impl<'a> Iterator for ReplayIterator<'a> {
    type Item = (u32, InputFrame);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick > self.recording.end_tick {
            return None;
        }

        while let Some(delta) = self.recording.deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current_frame = delta.frame;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current_frame);
        self.current_tick += 1;
        Some(item)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SIGNAL_DURATION_CAP;

    #[test]
    fn test_identical_inputs_compress() {
        let mut recorder = InputRecorder::new(8).unwrap();
        for _ in 0..5 {
            recorder.record(InputFrame::with_direction(Direction::BACK)).unwrap();
        }
        assert_eq!(recorder.directions().len().unwrap(), 1);
        assert_eq!(recorder.current_direction(), DirectionSignal::held(Direction::BACK, 5));
    }

    #[test]
    fn test_compression_saturates_at_cap() {
        let mut recorder = InputRecorder::new(8).unwrap();
        for _ in 0..150 {
            recorder.record(InputFrame::with_direction(Direction::DOWN)).unwrap();
        }
        assert_eq!(recorder.directions().len().unwrap(), 1);
        assert_eq!(recorder.current_direction().duration, SIGNAL_DURATION_CAP);
    }

    #[test]
    fn test_change_starts_new_entry() {
        let mut recorder = InputRecorder::new(8).unwrap();
        recorder.record(InputFrame::with_direction(Direction::DOWN)).unwrap();
        recorder.record(InputFrame::with_direction(Direction::DOWN)).unwrap();
        recorder
            .record(InputFrame::with_attack(Direction::DOWN | Direction::FRONT, AttackButtons::LIGHT_PUNCH))
            .unwrap();

        assert_eq!(recorder.directions().len().unwrap(), 2);
        assert_eq!(recorder.current_direction().duration, 1);
        assert_eq!(recorder.current_attack(), AttackSignal::new(AttackButtons::LIGHT_PUNCH));
        // attack history: neutral x2, then the press
        assert_eq!(recorder.attacks().read(1).unwrap().duration, 2);
    }

    #[test]
    fn test_capacity_one_rejected() {
        assert!(InputRecorder::new(1).is_err());
        assert_eq!(InputRecorder::new(0).unwrap_err(), BufferError::ZeroCapacity);
    }

    #[test]
    fn test_empty_recorder_current_signal_is_default() {
        let recorder = InputRecorder::new(4).unwrap();
        assert_eq!(recorder.current_attack().duration, 0);
        assert!(recorder.current_direction().flags.is_empty());
    }

    #[test]
    fn test_from_axes_frame() {
        let frame = InputFrame::from_axes(-1, -1, AttackButtons::empty(), true);
        assert_eq!(frame.direction, Direction::BACK | Direction::DOWN);
        let frame = InputFrame::from_axes(-1, 0, AttackButtons::HEAVY_KICK, false);
        assert_eq!(frame.direction, Direction::FRONT);
        assert!(!frame.is_idle());
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut recording = InputRecording::new(CharacterId(0));
        let back = InputFrame::with_direction(Direction::BACK);
        for t in 0..4 {
            recording.record(t, back);
        }
        assert_eq!(recording.deltas().len(), 1);
        recording.record(4, InputFrame::new());
        assert_eq!(recording.deltas().len(), 2);
    }

    #[test]
    fn test_recording_input_at() {
        let mut recording = InputRecording::new(CharacterId(1));
        let down = InputFrame::with_direction(Direction::DOWN);
        let punch = InputFrame::with_attack(Direction::DOWN, AttackButtons::MEDIUM_PUNCH);
        recording.record(10, down);
        recording.record(20, punch);

        assert!(recording.input_at(5).is_idle());
        assert_eq!(recording.input_at(10), down);
        assert_eq!(recording.input_at(15), down);
        assert_eq!(recording.input_at(99), punch);
    }

    #[test]
    fn test_replay_iterator() {
        let mut recording = InputRecording::new(CharacterId(0));
        recording.record(0, InputFrame::with_direction(Direction::FRONT));
        recording.record(3, InputFrame::with_direction(Direction::BACK));
        recording.record(5, InputFrame::with_direction(Direction::BACK));

        let frames: Vec<_> = recording.replay_iter().collect();
        assert_eq!(frames.len(), 6);
        assert_eq!(frames[2].1.direction, Direction::FRONT);
        assert_eq!(frames[3].1.direction, Direction::BACK);
        assert_eq!(frames[5].1.direction, Direction::BACK);
    }

    #[test]
    fn test_recording_bincode_preserves_hash() {
        let mut recording = InputRecording::new(CharacterId(1));
        recording.record(2, InputFrame::with_direction(Direction::UP));
        recording.record(7, InputFrame::with_attack(Direction::empty(), AttackButtons::HEAVY_PUNCH));

        let bytes = recording.to_bytes().unwrap();
        let mut decoded = InputRecording::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.hash(), recording.hash());

        // continuing the decoded recording with the same input stores nothing
        decoded.record(8, InputFrame::with_attack(Direction::empty(), AttackButtons::HEAVY_PUNCH));
        assert_eq!(decoded.deltas().len(), 2);
    }
}
