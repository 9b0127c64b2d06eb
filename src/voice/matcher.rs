//! Free-text transcript → elevator command.

use crate::elevator::{DoorAction, ElevatorCommand, ModeAction, FLOOR_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceIntent {
    Command(ElevatorCommand),
    Unrecognized,
}

/// Matches a transcript against the command phrases, first rule wins.
///
/// Rules in priority order: floor call, open door, close door, emergency
/// on/off, maintenance on/off. A transcript that mentions "floor" is always
/// treated as a floor call, so an out-of-range number yields
/// [`VoiceIntent::Unrecognized`] instead of falling through.
pub fn match_transcript(transcript: &str) -> VoiceIntent {
    let text = transcript.to_lowercase();

    if text.contains("floor") {
        return match floor_number(&text) {
            Some(floor) if (1..=FLOOR_COUNT).contains(&floor) => {
                VoiceIntent::Command(ElevatorCommand::Floor(floor))
            }
            _ => VoiceIntent::Unrecognized,
        };
    }

    if text.contains("door") {
        if text.contains("open") {
            return VoiceIntent::Command(ElevatorCommand::Door(DoorAction::Open));
        }
        if text.contains("close") {
            return VoiceIntent::Command(ElevatorCommand::Door(DoorAction::Close));
        }
    }

    if text.contains("emergency") {
        if let Some(action) = mode_action(&text) {
            return VoiceIntent::Command(ElevatorCommand::Emergency(action));
        }
    }

    if text.contains("maintenance") {
        if let Some(action) = mode_action(&text) {
            return VoiceIntent::Command(ElevatorCommand::Maintenance(action));
        }
    }

    VoiceIntent::Unrecognized
}

/// The number after the first "floor" that is followed by whitespace and
/// digits. Numbers too large for `u32` count as absent.
fn floor_number(text: &str) -> Option<u32> {
    text.match_indices("floor").find_map(|(idx, word)| {
        let rest = &text[idx + word.len()..];
        let digits_start = rest.trim_start();
        if digits_start.len() == rest.len() {
            return None;
        }
        let digits: String = digits_start
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return None;
        }
        Some(digits.parse().unwrap_or(u32::MAX))
    })
}

fn mode_action(text: &str) -> Option<ModeAction> {
    if mentions_activate(text) || text.contains("start") {
        Some(ModeAction::Activate)
    } else if text.contains("deactivate") || text.contains("stop") || text.contains("reset") {
        Some(ModeAction::Deactivate)
    } else {
        None
    }
}

/// "activate" that is not the tail of "deactivate".
fn mentions_activate(text: &str) -> bool {
    text.match_indices("activate")
        .any(|(idx, _)| !text[..idx].ends_with("de"))
}
