use egui::{RichText, TextEdit, Ui};
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use super::common::{create_frame, UiColors};
use crate::mqtt::{ConnectionConfig, SyncError};
use crate::store::{DashboardStore, NoticeLevel};

type PendingConnect = (ConnectionConfig, oneshot::Receiver<Result<(), SyncError>>);

/// Broker form with connect and disconnect buttons.
///
/// Connect calls run on the tokio runtime; the panel polls their result once
/// per frame.
pub struct ConnectionPanelData {
    runtime: Handle,
    hostname: String,
    port: String,
    path: String,
    client_id: String,
    username: String,
    password: String,
    show_advanced: bool,
    template: ConnectionConfig,
    pending: Option<PendingConnect>,
}

impl ConnectionPanelData {
    pub fn new(runtime: Handle, broker: &ConnectionConfig) -> Self {
        Self {
            runtime,
            hostname: broker.hostname.clone(),
            port: broker.port.to_string(),
            path: broker.path.clone(),
            client_id: broker.client_id.clone(),
            username: broker.username.clone(),
            password: broker.password.clone(),
            show_advanced: false,
            template: broker.clone(),
            pending: None,
        }
    }

    pub fn is_connecting(&self) -> bool {
        self.pending.is_some()
    }

    /// Builds the config from the form, keeping the non-visible settings of
    /// the remembered broker.
    fn form_config(&self) -> Result<ConnectionConfig, String> {
        let port = self
            .port
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("\"{}\" is not a valid port", self.port.trim()))?;
        Ok(ConnectionConfig {
            hostname: self.hostname.trim().to_string(),
            port,
            path: self.path.trim().to_string(),
            client_id: self.client_id.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            ..self.template.clone()
        })
    }

    fn start_connect(&mut self, store: &DashboardStore) {
        let config = match self.form_config() {
            Ok(config) => config,
            Err(reason) => {
                warn!("Invalid broker settings: {}", reason);
                store.notify(NoticeLevel::Error, "Invalid Settings", &reason);
                return;
            }
        };

        info!("Connect requested for {}", config);
        let (tx, rx) = oneshot::channel();
        let connecting = store.clone();
        let attempt = config.clone();
        self.runtime.spawn(async move {
            let _ = tx.send(connecting.connect(attempt).await);
        });
        self.pending = Some((config, rx));
    }

    /// Returns the broker config once a connect started here has succeeded.
    fn poll_pending(&mut self) -> Option<ConnectionConfig> {
        let (_, rx) = self.pending.as_mut()?;
        match rx.try_recv() {
            Ok(Ok(())) => self.pending.take().map(|(config, _)| config),
            Ok(Err(e)) => {
                debug!("Connect finished with {}", e);
                self.pending = None;
                None
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.pending = None;
                None
            }
        }
    }

    /// Draws the panel. Returns the broker settings of a connect that
    /// succeeded since the last frame.
    pub fn render(
        &mut self,
        ui: &mut Ui,
        store: &DashboardStore,
        is_connected: bool,
    ) -> Option<ConnectionConfig> {
        let connected_config = self.poll_pending();

        create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading("MQTT Connection");
                let (color, text) = if is_connected {
                    (UiColors::ACTIVE, "Connected")
                } else if self.is_connecting() {
                    (UiColors::WARNING, "Connecting...")
                } else {
                    (UiColors::INACTIVE, "Disconnected")
                };
                ui.colored_label(color, "\u{2B24}");
                ui.label(RichText::new(text).color(color));
            });

            let editable = !is_connected && !self.is_connecting();
            ui.add_enabled_ui(editable, |ui| {
                egui::Grid::new("broker_form")
                    .num_columns(2)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label("Host");
                        ui.text_edit_singleline(&mut self.hostname);
                        ui.end_row();

                        ui.label("Port");
                        ui.add(TextEdit::singleline(&mut self.port).desired_width(60.0));
                        ui.end_row();

                        ui.label("Path");
                        ui.text_edit_singleline(&mut self.path);
                        ui.end_row();

                        if self.show_advanced {
                            ui.label("Client ID");
                            ui.text_edit_singleline(&mut self.client_id);
                            ui.end_row();

                            ui.label("User");
                            ui.text_edit_singleline(&mut self.username);
                            ui.end_row();

                            ui.label("Password");
                            ui.add(TextEdit::singleline(&mut self.password).password(true));
                            ui.end_row();
                        }
                    });
                ui.checkbox(&mut self.show_advanced, "Advanced");
            });

            ui.horizontal(|ui| {
                if is_connected {
                    if ui.button("Disconnect").clicked() {
                        info!("Disconnect requested");
                        store.disconnect();
                    }
                } else if self.is_connecting() {
                    ui.spinner();
                    if ui.button("Cancel").clicked() {
                        store.disconnect();
                    }
                } else if ui.button("Connect").clicked() {
                    self.start_connect(store);
                }
            });
        });

        connected_config
    }
}
