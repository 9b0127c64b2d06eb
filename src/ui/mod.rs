//! # Elevator Dashboard User Interface
//!
//! eframe/egui front end. Every panel reads the same [`DashboardState`]
//! snapshot from the store and issues commands through [`DashboardStore`];
//! no panel talks to the MQTT worker directly.
//!
//! ## Layout
//!
//! - **Top Panel**: navigation between the dashboard and the traffic view,
//!   plus the notice strip
//! - **Central Panel**: the selected screen
//! - **Bottom Panel**: connection indicator, message counters and mute switch
//!
//! The snapshot is only cloned when the store has changed since the previous
//! frame. Repaints are requested at the configured frame rate so incoming
//! broker traffic shows up without user input.

pub mod common;
pub mod connection_panel;
pub mod controls_panel;
pub mod notices;
pub mod shaft;
pub mod status_panel;
pub mod traffic_menu;
pub mod voice_panel;

use egui::{Button, Vec2};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{error, info};

use crate::config::DashboardConfig;
use crate::elevator::ElevatorStatus;
use crate::sound::{transition_cues, SoundEffect, SoundService};
use crate::store::{DashboardState, DashboardStore};

use self::common::{MenuState, UiColors};
use self::connection_panel::ConnectionPanelData;
use self::traffic_menu::TrafficMenuData;
use self::voice_panel::VoicePanelData;

pub struct DashboardUI {
    menu_state: MenuState,
    runtime: Handle,
    store: DashboardStore,
    state_rx: watch::Receiver<DashboardState>,
    /// Last snapshot read from the store
    state: DashboardState,
    /// Status the sound cues were last computed against
    heard_status: ElevatorStatus,
    config: DashboardConfig,
    sound: SoundService,
    repaint_interval: Duration,
    connection_panel: ConnectionPanelData,
    voice_panel: VoicePanelData,
    traffic_menu: TrafficMenuData,
}

impl DashboardUI {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Handle,
        store: DashboardStore,
        config: DashboardConfig,
        sound: SoundService,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let mut state_rx = store.subscribe();
        let state = state_rx.borrow_and_update().clone();

        DashboardUI {
            menu_state: MenuState::Dashboard,
            connection_panel: ConnectionPanelData::new(runtime.clone(), &config.broker),
            voice_panel: VoicePanelData::new(config.voice.enabled),
            traffic_menu: TrafficMenuData::default(),
            repaint_interval: config.ui.repaint_interval(),
            heard_status: state.status.clone(),
            runtime,
            store,
            state_rx,
            state,
            config,
            sound,
        }
    }

    fn refresh_state(&mut self) {
        if !self.state_rx.has_changed().unwrap_or(false) {
            return;
        }
        self.state = self.state_rx.borrow_and_update().clone();

        if self.state.status != self.heard_status {
            for cue in transition_cues(&self.heard_status, &self.state.status) {
                self.sound.play(cue);
            }
            self.heard_status = self.state.status.clone();
        }
    }

    fn persist_config(&self) {
        let config = self.config.clone();
        self.runtime.spawn(async move {
            if let Err(e) = config.save().await {
                error!("Failed to save config: {}", e);
            }
        });
    }

    fn dashboard_screen(&mut self, ui: &mut egui::Ui) {
        let status = self.state.status.clone();
        ui.columns(3, |columns| {
            if let Some(broker) =
                self.connection_panel
                    .render(&mut columns[0], &self.store, self.state.is_connected)
            {
                info!("Connected, remembering broker {}", broker);
                self.sound.play(SoundEffect::Connection);
                self.config.remember_broker(&broker);
                self.persist_config();
            }
            columns[0].add_space(4.0);
            status_panel::render(&mut columns[0], &status, self.state.diagnostics.as_ref());

            columns[1].vertical_centered(|ui| {
                ui.heading("Shaft");
                shaft::render(ui, &status);
            });

            controls_panel::render(&mut columns[2], &status, &self.store, &mut self.sound);
            columns[2].add_space(4.0);
            self.voice_panel
                .render(&mut columns[2], &self.store, &mut self.sound);
        });
    }
}

impl eframe::App for DashboardUI {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh_state();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.ctx().request_repaint_after(self.repaint_interval);
            let width = ui.available_width() - 40.0;

            egui::TopBottomPanel::top("top_panel")
                .show_separator_line(false)
                .show_inside(ui, |ui| {
                    ui.horizontal(|ui| {
                        let size = Vec2::new(width / 2.0, 20.0);
                        if ui
                            .add(Button::new("Dashboard").min_size(size))
                            .clicked()
                        {
                            self.menu_state = MenuState::Dashboard;
                        }
                        if ui.add(Button::new("Traffic").min_size(size)).clicked() {
                            self.menu_state = MenuState::Traffic;
                        }
                    });
                    notices::render(ui, self.state.notices.iter(), &self.store);
                });

            egui::TopBottomPanel::bottom("bottom_panel")
                .show_separator_line(false)
                .show_inside(ui, |ui| {
                    ui.horizontal_centered(|ui| {
                        let (color, text) = if self.state.is_connected {
                            (UiColors::ACTIVE, "MQTT connected")
                        } else {
                            (UiColors::INACTIVE, "MQTT disconnected")
                        };
                        ui.colored_label(color, "\u{2B24}");
                        ui.label(text);
                        ui.separator();
                        ui.label(format!("Messages: {}", self.state.all_messages.len()));
                        ui.label(format!("Log: {}", self.state.logs.len()));
                        ui.separator();

                        let mute_label = if self.sound.is_muted() {
                            "Unmute"
                        } else {
                            "Mute"
                        };
                        if ui.button(mute_label).clicked() {
                            self.config.sound.muted = self.sound.toggle_mute();
                            self.persist_config();
                        }
                    });
                });

            egui::CentralPanel::default().show_inside(ui, |ui| match self.menu_state {
                MenuState::Dashboard => self.dashboard_screen(ui),
                MenuState::Traffic => self.traffic_menu.render(ui, &self.state),
            });
        });
    }
}
