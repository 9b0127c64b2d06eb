use serde_json::json;
use std::fmt;

use crate::mqtt::topics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorAction {
    Open,
    Close,
}

impl DoorAction {
    pub fn as_str(self) -> &'static str {
        match self {
            DoorAction::Open => "open",
            DoorAction::Close => "close",
        }
    }
}

/// Switch for the emergency and maintenance modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAction {
    Activate,
    Deactivate,
}

impl ModeAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ModeAction::Activate => "activate",
            ModeAction::Deactivate => "deactivate",
        }
    }

    /// The action that flips a mode which is currently `active`.
    pub fn toggle_from(active: bool) -> Self {
        if active {
            ModeAction::Deactivate
        } else {
            ModeAction::Activate
        }
    }
}

/// A control intent for the elevator, ready to be put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorCommand {
    Floor(u32),
    Door(DoorAction),
    Emergency(ModeAction),
    Maintenance(ModeAction),
}

impl ElevatorCommand {
    pub fn topic(&self) -> &'static str {
        match self {
            ElevatorCommand::Floor(_) | ElevatorCommand::Door(_) => topics::COMMAND,
            ElevatorCommand::Emergency(_) => topics::EMERGENCY,
            ElevatorCommand::Maintenance(_) => topics::MAINTENANCE,
        }
    }

    /// Wire payload. Floor and door commands are JSON objects, the mode
    /// switches are the bare action word.
    pub fn payload(&self) -> Vec<u8> {
        match self {
            ElevatorCommand::Floor(floor) => json!({ "floor": floor }).to_string().into_bytes(),
            ElevatorCommand::Door(action) => {
                json!({ "door": action.as_str() }).to_string().into_bytes()
            }
            ElevatorCommand::Emergency(action) | ElevatorCommand::Maintenance(action) => {
                action.as_str().as_bytes().to_vec()
            }
        }
    }
}

impl fmt::Display for ElevatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ElevatorCommand::Floor(floor) => write!(f, "call to floor {}", floor),
            ElevatorCommand::Door(action) => write!(f, "{} door", action.as_str()),
            ElevatorCommand::Emergency(action) => write!(f, "{} emergency", action.as_str()),
            ElevatorCommand::Maintenance(action) => write!(f, "{} maintenance", action.as_str()),
        }
    }
}
