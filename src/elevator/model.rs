use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of floors served by the simulated elevator.
pub const FLOOR_COUNT: u32 = 3;

/// Direction of travel reported in the `state` field of a status message.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    #[default]
    Idle,
    MovingUp,
    MovingDown,
}

impl MotionState {
    pub fn is_moving(self) -> bool {
        matches!(self, MotionState::MovingUp | MotionState::MovingDown)
    }
}

impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            MotionState::Idle => "idle",
            MotionState::MovingUp => "moving up",
            MotionState::MovingDown => "moving down",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorState {
    Open,
    #[default]
    Closed,
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorState::Open => write!(f, "Open"),
            DoorState::Closed => write!(f, "Closed"),
        }
    }
}

/// Snapshot published on `building/elevator/status`.
///
/// Every message carries the complete state of the car; a decoded snapshot
/// replaces the previous one as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorStatus {
    pub floor: u32,
    pub target_floor: u32,
    pub state: MotionState,
    pub door: DoorState,
    pub emergency: bool,
    pub maintenance: bool,
    pub overload: bool,
    pub door_obstructed: bool,
}

impl Default for ElevatorStatus {
    /// What the dashboard shows before the first status message arrives.
    fn default() -> Self {
        Self {
            floor: 1,
            target_floor: 1,
            state: MotionState::Idle,
            door: DoorState::Closed,
            emergency: false,
            maintenance: false,
            overload: false,
            door_obstructed: false,
        }
    }
}

impl ElevatorStatus {
    pub fn door_open(&self) -> bool {
        self.door == DoorState::Open
    }
}

/// Health counters published on `building/elevator/diagnostics`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevatorDiagnostics {
    pub uptime_seconds: u64,
    pub total_trips: u64,
    pub door_operations: u64,
    pub wifi_rssi: i32,
    pub free_heap: u64,
    pub current_floor: u32,
}

impl ElevatorDiagnostics {
    /// Formats the uptime as `1d 2h 3m 4s`, or `N/A` before the first tick.
    pub fn uptime_display(&self) -> String {
        format_uptime(self.uptime_seconds)
    }
}

pub fn format_uptime(seconds: u64) -> String {
    if seconds == 0 {
        return "N/A".to_string();
    }
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, secs)
}

/// One line of the controller's event log (`building/elevator/log`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Epoch milliseconds, as stamped by the elevator controller.
    pub timestamp: i64,
    pub message: String,
}

impl LogEntry {
    /// Local wall-clock time of the entry, `HH:MM:SS`.
    pub fn time_of_day(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|utc| {
                utc.with_timezone(&chrono::Local)
                    .format("%H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| "--:--:--".to_string())
    }
}
