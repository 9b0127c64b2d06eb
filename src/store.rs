//! # State Distribution Layer
//!
//! Bridges the sync worker's listener fan-out into one current-value store
//! that every widget reads. Widgets never register listeners themselves;
//! they hold a [`DashboardStore`] and read its [`watch`] snapshot.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::elevator::{
    DoorAction, ElevatorCommand, ElevatorDiagnostics, ElevatorStatus, LogEntry, ModeAction,
};
use crate::mqtt::{
    BoundedHistory, ConnectionConfig, RawMessageRecord, Subscription, SyncError, SyncHandle,
};

pub const LOG_CAPACITY: usize = 100;
pub const MESSAGE_CAPACITY: usize = 200;
pub const NOTICE_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A toast-style notification shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
    pub timestamp: i64,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice {
            level,
            title: title.into(),
            description: description.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Everything the widgets render.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub is_connected: bool,
    pub status: ElevatorStatus,
    pub diagnostics: Option<ElevatorDiagnostics>,
    /// Newest first.
    pub logs: BoundedHistory<LogEntry>,
    /// Newest first, every topic.
    pub all_messages: BoundedHistory<RawMessageRecord>,
    pub notices: BoundedHistory<Notice>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            is_connected: false,
            status: ElevatorStatus::default(),
            diagnostics: None,
            logs: BoundedHistory::new(LOG_CAPACITY),
            all_messages: BoundedHistory::new(MESSAGE_CAPACITY),
            notices: BoundedHistory::new(NOTICE_CAPACITY),
        }
    }
}

/// Cloneable access to the store plus the command functions widgets use.
#[derive(Clone)]
pub struct DashboardStore {
    handle: SyncHandle,
    state: Arc<watch::Sender<DashboardState>>,
}

impl DashboardStore {
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected
    }

    pub fn notify(&self, level: NoticeLevel, title: &str, description: &str) {
        let notice = Notice::new(level, title, description);
        self.state.send_modify(|state| state.notices.push(notice));
    }

    pub fn dismiss_notices(&self) {
        self.state.send_modify(|state| state.notices.clear());
    }

    /// Connects through the sync worker. A failure is also pushed as a
    /// notice.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<(), SyncError> {
        let result = self.handle.connect(config).await;
        match &result {
            Ok(()) => {}
            Err(SyncError::Superseded) | Err(SyncError::Cancelled) => {
                info!("Connection attempt replaced: {:?}", result);
            }
            Err(e) => {
                warn!("Failed to connect to MQTT broker: {}", e);
                self.notify(
                    NoticeLevel::Error,
                    "Connection Failed",
                    "Failed to connect to MQTT broker. Please check your settings.",
                );
            }
        }
        result
    }

    pub fn disconnect(&self) {
        self.handle.request_disconnect();
    }

    /// Issues `command`, or pushes a "Not Connected" notice when the store
    /// shows no connection.
    pub fn issue(&self, command: ElevatorCommand) -> bool {
        if !self.is_connected() {
            warn!("Not connected to MQTT broker, {} not sent", command);
            self.notify(
                NoticeLevel::Error,
                "Not Connected",
                "Please connect to MQTT broker first",
            );
            return false;
        }
        self.handle.send_command(command);
        true
    }

    pub fn send_floor_command(&self, floor: u32) -> bool {
        self.issue(ElevatorCommand::Floor(floor))
    }

    pub fn send_door_command(&self, action: DoorAction) -> bool {
        self.issue(ElevatorCommand::Door(action))
    }

    pub fn send_emergency_command(&self, action: ModeAction) -> bool {
        self.issue(ElevatorCommand::Emergency(action))
    }

    pub fn send_maintenance_command(&self, action: ModeAction) -> bool {
        self.issue(ElevatorCommand::Maintenance(action))
    }
}

/// Owns the five listener registrations for one application session.
pub struct StateBridge {
    store: DashboardStore,
    subscriptions: Vec<Subscription>,
}

impl StateBridge {
    /// Registers the store's listeners with the worker behind `handle`.
    pub fn attach(handle: SyncHandle) -> Self {
        let state = Arc::new(watch::Sender::new(DashboardState::default()));

        let on_status = state.clone();
        let on_diagnostics = state.clone();
        let on_log = state.clone();
        let on_connection = state.clone();
        let on_message = state.clone();

        let subscriptions = vec![
            handle.on_status_update(move |status| {
                let status = status.clone();
                on_status.send_modify(|s| s.status = status);
            }),
            handle.on_diagnostics_update(move |diagnostics| {
                let diagnostics = diagnostics.clone();
                on_diagnostics.send_modify(|s| s.diagnostics = Some(diagnostics));
            }),
            handle.on_log_update(move |entry| {
                let entry = entry.clone();
                on_log.send_modify(|s| s.logs.push(entry));
            }),
            handle.on_connection_status_change(move |connected| {
                let connected = *connected;
                let notice = if connected {
                    Notice::new(
                        NoticeLevel::Info,
                        "Connected to MQTT Broker",
                        "Successfully connected to the MQTT broker",
                    )
                } else {
                    Notice::new(
                        NoticeLevel::Error,
                        "Disconnected from MQTT Broker",
                        "Connection to MQTT broker was lost",
                    )
                };
                on_connection.send_modify(|s| {
                    s.is_connected = connected;
                    s.notices.push(notice);
                });
            }),
            handle.on_message_received(move |record| {
                let record = record.clone();
                on_message.send_modify(|s| s.all_messages.push(record));
            }),
        ];

        info!("State bridge attached");
        StateBridge {
            store: DashboardStore { handle, state },
            subscriptions,
        }
    }

    pub fn store(&self) -> DashboardStore {
        self.store.clone()
    }

    /// Removes all five listeners and closes the connection.
    pub fn detach(self) {
        for subscription in self.subscriptions {
            subscription.unsubscribe();
        }
        self.store.handle.request_disconnect();
        info!("State bridge detached");
    }
}
