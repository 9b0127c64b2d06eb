//! Elevator domain types: the records decoded from the status, diagnostics
//! and log topics, and the commands the dashboard sends back.

pub mod command;
pub mod model;

pub use command::{DoorAction, ElevatorCommand, ModeAction};
pub use model::{
    DoorState, ElevatorDiagnostics, ElevatorStatus, LogEntry, MotionState, FLOOR_COUNT,
};
