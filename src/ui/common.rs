//! # UI Common Components
//!
//! Shared navigation state, the dark colour palette and frame helpers used by
//! every dashboard panel.

use egui::{Color32, Frame, Stroke};

use crate::elevator::ElevatorStatus;

/// Screen shown in the central panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    /// Shaft, status, controls and voice input
    Dashboard,
    /// Controller log and raw broker traffic
    Traffic,
}

/// Creates a bordered frame in the dashboard style.
pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

/// Colour palette for the dark theme.
///
/// Background colours go from darkest (`EXTREME_BG`) to lightest (`MAIN_BG`);
/// the remaining constants carry meaning for the elevator's state.
pub struct UiColors;

impl UiColors {
    pub const MAIN_BG: Color32 = Color32::from_rgb(30, 30, 30);
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);
    pub const EXTREME_BG: Color32 = Color32::from_rgb(20, 20, 20);
    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Connected, idle, healthy
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);
    /// Disconnected or emergency
    pub const INACTIVE: Color32 = Color32::from_rgb(200, 50, 20);
    /// Maintenance mode and warnings
    pub const WARNING: Color32 = Color32::from_rgb(220, 180, 30);
    /// Car in motion
    pub const MOVING: Color32 = Color32::from_rgb(40, 130, 220);
    pub const MUTED_TEXT: Color32 = Color32::from_rgb(140, 140, 140);
}

/// Headline colour for the car: emergency beats maintenance beats motion.
pub fn status_color(status: &ElevatorStatus) -> Color32 {
    if status.emergency {
        UiColors::INACTIVE
    } else if status.maintenance {
        UiColors::WARNING
    } else if status.state.is_moving() {
        UiColors::MOVING
    } else {
        UiColors::ACTIVE
    }
}

/// Signal quality label for a Wi-Fi RSSI in dBm.
pub fn signal_quality(rssi: i32) -> (&'static str, Color32) {
    match rssi {
        r if r >= -60 => ("Excellent", UiColors::ACTIVE),
        r if r >= -70 => ("Good", UiColors::ACTIVE),
        r if r >= -80 => ("Fair", UiColors::WARNING),
        _ => ("Poor", UiColors::INACTIVE),
    }
}
