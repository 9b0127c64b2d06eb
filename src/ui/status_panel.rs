use egui::{RichText, Ui};

use super::common::{create_frame, signal_quality, status_color, UiColors};
use crate::elevator::{ElevatorDiagnostics, ElevatorStatus};

/// Current status and diagnostics. Stateless, everything comes from the
/// store snapshot.
pub fn render(ui: &mut Ui, status: &ElevatorStatus, diagnostics: Option<&ElevatorDiagnostics>) {
    create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
        ui.vertical_centered(|ui| {
            ui.heading("System Status");
            ui.label(RichText::new("Current Floor").color(UiColors::MUTED_TEXT));
            ui.label(
                RichText::new(status.floor.to_string())
                    .size(48.0)
                    .strong()
                    .color(status_color(status)),
            );
        });

        ui.columns(2, |columns| {
            egui::Grid::new("status_grid")
                .num_columns(2)
                .show(&mut columns[0], |ui| {
                    ui.label("Status");
                    ui.colored_label(status_color(status), status.state.to_string());
                    ui.end_row();

                    ui.label("Door");
                    let door_color = if status.door_open() {
                        UiColors::ACTIVE
                    } else {
                        egui::Color32::WHITE
                    };
                    ui.colored_label(door_color, status.door.to_string());
                    ui.end_row();

                    ui.label("Target Floor");
                    ui.label(status.target_floor.to_string());
                    ui.end_row();
                });

            match diagnostics {
                Some(diagnostics) => diagnostics_grid(&mut columns[1], diagnostics),
                None => {
                    columns[1].label(
                        RichText::new("Waiting for diagnostics...").color(UiColors::MUTED_TEXT),
                    );
                }
            }
        });

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            flag(ui, "Emergency", status.emergency, UiColors::INACTIVE);
            flag(ui, "Maintenance", status.maintenance, UiColors::WARNING);
            flag(ui, "Overload", status.overload, UiColors::INACTIVE);
            flag(ui, "Door Obstructed", status.door_obstructed, UiColors::WARNING);
        });
    });
}

fn diagnostics_grid(ui: &mut Ui, diagnostics: &ElevatorDiagnostics) {
    egui::Grid::new("diagnostics_grid")
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Trips");
            ui.label(diagnostics.total_trips.to_string());
            ui.end_row();

            ui.label("Door Ops");
            ui.label(diagnostics.door_operations.to_string());
            ui.end_row();

            ui.label("Uptime");
            ui.label(diagnostics.uptime_display());
            ui.end_row();

            ui.label("Wi-Fi");
            let (quality, color) = signal_quality(diagnostics.wifi_rssi);
            ui.colored_label(color, format!("{} dBm ({})", diagnostics.wifi_rssi, quality));
            ui.end_row();

            ui.label("Free Heap");
            ui.label(format!("{:.1} KiB", diagnostics.free_heap as f64 / 1024.0));
            ui.end_row();
        });
}

fn flag(ui: &mut Ui, label: &str, active: bool, color: egui::Color32) {
    let (stroke, text) = if active {
        (color, RichText::new(label).strong().color(color))
    } else {
        (UiColors::BORDER, RichText::new(label).color(UiColors::MUTED_TEXT))
    };
    egui::Frame::new()
        .stroke(egui::Stroke::new(1.0, stroke))
        .inner_margin(4)
        .show(ui, |ui| {
            ui.label(text);
        });
}
