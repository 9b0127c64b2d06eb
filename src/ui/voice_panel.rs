use egui::{Key, RichText, TextEdit, Ui};

use super::common::{create_frame, UiColors};
use crate::sound::SoundService;
use crate::store::DashboardStore;
use crate::voice::{TypedTranscripts, VoiceControl};

const PHRASES: [&str; 5] = [
    "\"floor 2\"",
    "\"open door\" / \"close door\"",
    "\"activate emergency\" / \"stop emergency\"",
    "\"start maintenance\" / \"stop maintenance\"",
    "\"reset emergency\"",
];

pub struct VoicePanelData {
    control: VoiceControl,
    source: TypedTranscripts,
    input: String,
}

impl VoicePanelData {
    pub fn new(supported: bool) -> Self {
        Self {
            control: VoiceControl::new(supported),
            source: TypedTranscripts::default(),
            input: String::new(),
        }
    }

    pub fn render(&mut self, ui: &mut Ui, store: &DashboardStore, sound: &mut SoundService) {
        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ui.heading("Voice Commands");

            if !self.control.is_supported() {
                ui.label(
                    RichText::new("Voice commands are not available in this session")
                        .color(UiColors::MUTED_TEXT),
                );
                return;
            }

            ui.horizontal(|ui| {
                let response = ui.add(
                    TextEdit::singleline(&mut self.input)
                        .hint_text("Say something like \"floor 3\"")
                        .desired_width(ui.available_width() - 60.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter));
                if ui.button("Send").clicked() || submitted {
                    self.source.submit(&self.input);
                    self.input.clear();
                }
            });

            self.control.drain(&mut self.source, store, sound);

            if let Some(transcript) = self.control.last_transcript() {
                ui.label(format!("Heard: \"{}\"", transcript));
            }
            if let Some(command) = self.control.last_command() {
                ui.colored_label(UiColors::ACTIVE, format!("Last command: {}", command));
            }

            ui.collapsing("Available phrases", |ui| {
                for phrase in PHRASES {
                    ui.label(RichText::new(phrase).color(UiColors::MUTED_TEXT));
                }
            });
        });
    }
}
