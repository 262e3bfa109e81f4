//! Command Matcher
//!
//! Decides whether the recent input history contains a command's required
//! sequence. The required signals are matched newest-first against the
//! buffered window; other inputs may sit between them.

use crate::input::buffer::{BufferError, SignalBuffer};
use crate::input::recorder::InputRecorder;
use crate::input::signal::{Signal, SignalFlags};
use super::definition::{Command, CommandError, CommandKind};

/// Whether `required` (oldest first) appears within the last
/// `window_length` frames of `buffer`.
pub fn match_sequence<F: SignalFlags>(
    buffer: &SignalBuffer<Signal<F>>,
    required: &[Signal<F>],
    window_length: u32,
) -> Result<bool, BufferError> {
    let Some(window) = buffer.window_size(window_length)? else {
        return Ok(false);
    };
    let Some(mut expected) = required.len().checked_sub(1) else {
        return Ok(false);
    };

    for offset in 0..window {
        let entry = buffer.read(offset)?;
        if !entry.satisfies(&required[expected]) {
            continue;
        }
        match expected.checked_sub(1) {
            Some(next) => expected = next,
            None => return Ok(true),
        }
    }

    Ok(false)
}

/// Whether `command` is performed by the inputs in `recorder`.
pub fn is_performed(command: &Command, recorder: &InputRecorder) -> Result<bool, CommandError> {
    match command.kind {
        CommandKind::Move => Ok(match_sequence(recorder.directions(), &command.directions, command.window_length)?),
        CommandKind::Attack => Ok(match_attack(command, recorder)?),
        CommandKind::Charge => Err(CommandError::UnsupportedKind {
            command: command.name.clone(),
            kind: command.kind,
        }),
    }
}

fn match_attack(command: &Command, recorder: &InputRecorder) -> Result<bool, BufferError> {
    // only a press that started this very frame can start an attack
    let current = recorder.current_attack();
    if current.flags.is_neutral() || current.duration != 1 {
        return Ok(false);
    }
    if !match_sequence(recorder.attacks(), &command.attacks, command.window_length)? {
        return Ok(false);
    }
    if command.directions.is_empty() {
        return Ok(true);
    }
    match_sequence(recorder.directions(), &command.directions, command.window_length)
}
