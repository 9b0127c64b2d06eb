use egui::{RichText, ScrollArea, Ui};

use super::common::{create_frame, UiColors};
use crate::mqtt::RawMessageRecord;
use crate::store::DashboardState;

/// Controller log next to the raw broker traffic.
#[derive(Default)]
pub struct TrafficMenuData {
    topic_filter: String,
    selected: Option<RawMessageRecord>,
}

impl TrafficMenuData {
    pub fn render(&mut self, ui: &mut Ui, state: &DashboardState) {
        let available = ui.available_size();
        let column_width = (available.x - 24.0) / 2.0;

        ui.horizontal_top(|ui| {
            ui.vertical(|ui| {
                ui.set_width(column_width);
                log_panel(ui, state, available.y - 20.0);
            });
            ui.add_space(4.0);
            ui.vertical(|ui| {
                ui.set_width(column_width);
                self.message_panel(ui, state, available.y - 20.0);
            });
        });
    }

    fn message_panel(&mut self, ui: &mut Ui, state: &DashboardState, height: f32) {
        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Broker Traffic");
                ui.label(
                    RichText::new(format!(
                        "{}/{}",
                        state.all_messages.len(),
                        state.all_messages.capacity()
                    ))
                    .color(UiColors::MUTED_TEXT),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Topic filter");
                ui.text_edit_singleline(&mut self.topic_filter);
            });

            let filter = self.topic_filter.trim();
            ScrollArea::vertical()
                .id_salt("raw_messages")
                .max_height(height * 0.6)
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let mut shown = 0;
                    for record in state
                        .all_messages
                        .iter()
                        .filter(|record| filter.is_empty() || record.topic.contains(filter))
                    {
                        shown += 1;
                        let selected = self.selected.as_ref() == Some(record);
                        if ui.selectable_label(selected, record.to_string()).clicked() {
                            self.selected = Some(record.clone());
                        }
                    }
                    if shown == 0 {
                        ui.label(RichText::new("No messages yet").color(UiColors::MUTED_TEXT));
                    }
                });

            ui.separator();
            match &self.selected {
                Some(record) => {
                    ScrollArea::vertical()
                        .id_salt("raw_message_detail")
                        .show(ui, |ui| {
                            ui.add(
                                egui::Label::new(RichText::new(record.render()).monospace())
                                    .wrap(),
                            );
                        });
                }
                None => {
                    ui.label(
                        RichText::new("Select a message to see its payload")
                            .color(UiColors::MUTED_TEXT),
                    );
                }
            }
        });
    }
}

fn log_panel(ui: &mut Ui, state: &DashboardState, height: f32) {
    create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
        ui.heading("Elevator Log");
        ScrollArea::vertical()
            .id_salt("elevator_log")
            .max_height(height)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if state.logs.is_empty() {
                    ui.label(
                        RichText::new("Waiting for elevator activity...")
                            .color(UiColors::MUTED_TEXT),
                    );
                }
                for entry in state.logs.iter() {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new(entry.time_of_day()).color(UiColors::MUTED_TEXT));
                        ui.label(&entry.message);
                    });
                }
            });
    });
}
