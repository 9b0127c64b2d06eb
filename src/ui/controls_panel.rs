use egui::{Button, RichText, Ui, Vec2};

use super::common::{create_frame, UiColors};
use crate::elevator::{DoorAction, ElevatorCommand, ElevatorStatus, ModeAction, FLOOR_COUNT};
use crate::sound::{SoundEffect, SoundService};
use crate::store::DashboardStore;

/// One button of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    Floor(u32),
    Door(DoorAction),
    Emergency,
    Maintenance,
}

impl ControlButton {
    /// Command and click sound for pressing this button while the car is in
    /// `status`. The mode buttons toggle.
    pub fn press(self, status: &ElevatorStatus) -> (ElevatorCommand, SoundEffect) {
        match self {
            ControlButton::Floor(floor) => (ElevatorCommand::Floor(floor), SoundEffect::ButtonClick),
            ControlButton::Door(action) => (ElevatorCommand::Door(action), SoundEffect::ButtonClick),
            ControlButton::Emergency => (
                ElevatorCommand::Emergency(ModeAction::toggle_from(status.emergency)),
                SoundEffect::Alarm,
            ),
            ControlButton::Maintenance => (
                ElevatorCommand::Maintenance(ModeAction::toggle_from(status.maintenance)),
                SoundEffect::ButtonClick,
            ),
        }
    }

    /// Everything but the emergency switch is locked during an emergency.
    pub fn enabled(self, status: &ElevatorStatus) -> bool {
        matches!(self, ControlButton::Emergency) || !status.emergency
    }

    pub fn label(self, status: &ElevatorStatus) -> String {
        match self {
            ControlButton::Floor(floor) => format!("Floor {}", floor),
            ControlButton::Door(DoorAction::Open) => "Open Door".to_string(),
            ControlButton::Door(DoorAction::Close) => "Close Door".to_string(),
            ControlButton::Emergency if status.emergency => "Reset".to_string(),
            ControlButton::Emergency => "Emergency".to_string(),
            ControlButton::Maintenance if status.maintenance => "Exit Maintenance".to_string(),
            ControlButton::Maintenance => "Maintenance".to_string(),
        }
    }
}

/// Floor, door and mode buttons.
pub fn render(ui: &mut Ui, status: &ElevatorStatus, store: &DashboardStore, sound: &mut SoundService) {
    create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("Elevator Controls");
        });

        let width = (ui.available_width() - 16.0).max(120.0);
        let size = Vec2::new(width / 2.0, 28.0);

        ui.label(RichText::new("Floors").color(UiColors::MUTED_TEXT));
        for floor in (1..=FLOOR_COUNT).rev() {
            let highlight = floor == status.floor;
            control_button(ui, ControlButton::Floor(floor), status, store, sound, size, highlight);
        }

        ui.separator();
        ui.label(RichText::new("Door").color(UiColors::MUTED_TEXT));
        ui.horizontal(|ui| {
            control_button(
                ui,
                ControlButton::Door(DoorAction::Open),
                status,
                store,
                sound,
                size,
                status.door_open(),
            );
            control_button(
                ui,
                ControlButton::Door(DoorAction::Close),
                status,
                store,
                sound,
                size,
                !status.door_open(),
            );
        });

        ui.separator();
        ui.horizontal(|ui| {
            control_button(ui, ControlButton::Emergency, status, store, sound, size, status.emergency);
            control_button(
                ui,
                ControlButton::Maintenance,
                status,
                store,
                sound,
                size,
                status.maintenance,
            );
        });
    });
}

fn control_button(
    ui: &mut Ui,
    button: ControlButton,
    status: &ElevatorStatus,
    store: &DashboardStore,
    sound: &mut SoundService,
    size: Vec2,
    highlight: bool,
) {
    let fill = match button {
        ControlButton::Emergency if highlight => UiColors::INACTIVE,
        ControlButton::Maintenance if highlight => UiColors::WARNING,
        _ if highlight => UiColors::MOVING,
        _ => UiColors::MAIN_BG,
    };
    let widget = Button::new(button.label(status)).min_size(size).fill(fill);
    if ui.add_enabled(button.enabled(status), widget).clicked() {
        let (command, effect) = button.press(status);
        sound.play(effect);
        store.issue(command);
    }
}
