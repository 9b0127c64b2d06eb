use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

use super::config::ConnectionConfig;
use super::error::SyncError;
use super::listeners::{Listener, ListenerId, Listeners};
use super::message_manager::RawMessageRecord;
use super::topics::{self, DecodedTopic};
use super::transport::{
    AttemptId, EventSender, Transport, TransportEvent, TransportEventKind, TransportSession,
};
use crate::elevator::{
    DoorAction, ElevatorCommand, ElevatorDiagnostics, ElevatorStatus, LogEntry, ModeAction,
};

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Errored(String),
}

pub type ConnectReply = oneshot::Sender<Result<(), SyncError>>;

/// The session a connect call created. Only events tagged with `attempt`
/// are acted on.
struct LiveSession {
    attempt: AttemptId,
    session: Box<dyn TransportSession>,
    pending: Option<ConnectReply>,
}

/// Keeps the dashboard's view of the elevator in sync with the broker.
///
/// Owns at most one transport session. Inbound transport events are fed in
/// through [`StatusSync::handle_event`]; every call runs to completion before
/// the next one, so no locking is needed inside.
pub struct StatusSync<T: Transport> {
    transport: T,
    events: EventSender,
    last_attempt: AttemptId,
    live: Option<LiveSession>,
    state: ConnectionState,
    status: Option<ElevatorStatus>,
    diagnostics: Option<ElevatorDiagnostics>,
    listeners: Listeners,
}

impl<T: Transport> StatusSync<T> {
    /// Creates the module together with the receiving end of its transport
    /// event channel.
    pub fn new(transport: T) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, event_rx) = mpsc::unbounded_channel();
        let sync = StatusSync {
            transport,
            events,
            last_attempt: AttemptId::default(),
            live: None,
            state: ConnectionState::Disconnected,
            status: None,
            diagnostics: None,
            listeners: Listeners::default(),
        };
        (sync, event_rx)
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn status(&self) -> Option<&ElevatorStatus> {
        self.status.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&ElevatorDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Attempt id of the live session, if any.
    pub fn current_attempt(&self) -> Option<AttemptId> {
        self.live.as_ref().map(|live| live.attempt)
    }

    pub fn register(&mut self, id: ListenerId, listener: Listener) {
        debug!("Registering {} for {} events", id, listener.category());
        self.listeners.register(id, listener);
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.unregister(id);
        if !removed {
            debug!("{} was not registered", id);
        }
        removed
    }

    /// Starts a new connection, replacing any existing one.
    ///
    /// `reply` resolves once the broker has acknowledged the wildcard
    /// subscription, or with the error that ended the attempt.
    pub fn connect(&mut self, config: ConnectionConfig, reply: ConnectReply) {
        if let Err(e) = config.validate() {
            warn!("Refusing to connect: {}", e);
            let _ = reply.send(Err(e));
            return;
        }

        self.teardown(SyncError::Superseded);

        let attempt = self.last_attempt.next();
        self.last_attempt = attempt;
        info!("Connecting to {} ({})", config, attempt);

        match self.transport.open(attempt, &config, self.events.clone()) {
            Ok(session) => {
                self.state = ConnectionState::Connecting;
                self.live = Some(LiveSession {
                    attempt,
                    session,
                    pending: Some(reply),
                });
            }
            Err(e) => {
                error!("Failed to open {}: {}", attempt, e);
                let err = SyncError::ConnectFailed(e.to_string());
                self.state = ConnectionState::Errored(err.to_string());
                let _ = reply.send(Err(err));
            }
        }
    }

    /// Closes the current session. Does nothing when there is none.
    pub fn disconnect(&mut self) {
        if self.live.is_none() {
            trace!("Disconnect requested without a session");
            return;
        }
        info!("Disconnecting from MQTT broker");
        self.teardown(SyncError::Cancelled);
        self.state = ConnectionState::Disconnected;
    }

    /// Closes the live session, rejects a pending connect with `reason` and
    /// tells connection listeners if the session had been up.
    fn teardown(&mut self, reason: SyncError) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        live.session.close();
        if let Some(reply) = live.pending.take() {
            debug!("Abandoning {}: {}", live.attempt, reason);
            let _ = reply.send(Err(reason));
        }
        if self.is_connected() {
            self.state = ConnectionState::Disconnected;
            self.listeners.connection.notify(&false);
        }
    }

    /// Ends the live attempt with `err`.
    fn fail(&mut self, err: SyncError) {
        error!("MQTT connection error: {}", err);
        let was_connected = self.is_connected();
        if let Some(mut live) = self.live.take() {
            live.session.close();
            if let Some(reply) = live.pending.take() {
                let _ = reply.send(Err(err.clone()));
            }
        }
        self.state = ConnectionState::Errored(err.to_string());
        if was_connected {
            self.listeners.connection.notify(&false);
        }
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        if self.current_attempt() != Some(event.attempt) {
            debug!("Dropping event from stale {}: {:?}", event.attempt, event.kind);
            return;
        }

        match event.kind {
            TransportEventKind::Connected => {
                info!("Connected to MQTT broker, subscribing to {}", topics::SUBSCRIPTION_FILTER);
                let subscribed = match self.live.as_mut() {
                    Some(live) => live.session.subscribe(topics::SUBSCRIPTION_FILTER),
                    None => return,
                };
                if let Err(e) = subscribed {
                    self.fail(SyncError::SubscribeFailed(e.to_string()));
                }
            }
            TransportEventKind::Subscribed => {
                if self.is_connected() {
                    return;
                }
                self.state = ConnectionState::Connected;
                if let Some(reply) = self.live.as_mut().and_then(|live| live.pending.take()) {
                    let _ = reply.send(Ok(()));
                }
                self.listeners.connection.notify(&true);
            }
            TransportEventKind::SubscribeFailed(reason) => {
                self.fail(SyncError::SubscribeFailed(reason));
            }
            TransportEventKind::Message { topic, payload } => {
                self.dispatch(&topic, &payload);
            }
            TransportEventKind::Error(reason) => {
                let pending = self.live.as_ref().is_some_and(|live| live.pending.is_some());
                if pending {
                    self.fail(SyncError::ConnectFailed(reason));
                } else {
                    warn!("MQTT connection lost: {}", reason);
                    let was_connected = self.is_connected();
                    self.state = ConnectionState::Errored(reason);
                    if was_connected {
                        self.listeners.connection.notify(&false);
                    }
                }
            }
            TransportEventKind::Closed => {
                info!("MQTT connection closed");
                let pending = self.live.as_ref().is_some_and(|live| live.pending.is_some());
                if pending {
                    self.fail(SyncError::ConnectFailed("connection closed".into()));
                    return;
                }
                let was_connected = self.is_connected();
                self.live = None;
                if was_connected {
                    self.state = ConnectionState::Disconnected;
                    self.listeners.connection.notify(&false);
                }
            }
        }
    }

    /// Routes one inbound message: raw listeners first, then the typed
    /// decode for the three inbound topics.
    pub fn dispatch(&mut self, topic: &str, payload: &[u8]) {
        let text = String::from_utf8_lossy(payload).into_owned();
        let record = RawMessageRecord::received(topic, text);
        debug!("Received message on {}", topic);
        self.listeners.message.notify(&record);

        match DecodedTopic::classify(topic) {
            Some(DecodedTopic::Status) => {
                if let Some(status) = self.decode::<ElevatorStatus>(topic, &record.payload) {
                    self.listeners.status.notify(&status);
                    self.status = Some(status);
                }
            }
            Some(DecodedTopic::Diagnostics) => {
                if let Some(diagnostics) =
                    self.decode::<ElevatorDiagnostics>(topic, &record.payload)
                {
                    self.listeners.diagnostics.notify(&diagnostics);
                    self.diagnostics = Some(diagnostics);
                }
            }
            Some(DecodedTopic::Log) => {
                if let Some(entry) = self.decode::<LogEntry>(topic, &record.payload) {
                    self.listeners.log.notify(&entry);
                }
            }
            None => trace!("No typed decode for {}", topic),
        }
    }

    fn decode<D: DeserializeOwned>(&self, topic: &str, payload: &str) -> Option<D> {
        match serde_json::from_str(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Error parsing message on {}: {}", topic, e);
                None
            }
        }
    }

    /// Publishes `command` without waiting for delivery.
    pub fn send(&mut self, command: ElevatorCommand) -> Result<(), SyncError> {
        if !self.is_connected() {
            error!("Not connected to MQTT broker, dropping {}", command);
            return Err(SyncError::NotConnected);
        }
        let Some(live) = self.live.as_mut() else {
            return Err(SyncError::NotConnected);
        };
        debug!("Publishing {} to {}", command, command.topic());
        live.session
            .publish(command.topic(), command.payload())
            .map_err(|e| {
                error!("Failed to publish {}: {}", command, e);
                SyncError::PublishFailed(e.to_string())
            })?;
        Ok(())
    }

    pub fn send_floor_command(&mut self, floor: u32) -> Result<(), SyncError> {
        self.send(ElevatorCommand::Floor(floor))
    }

    pub fn send_door_command(&mut self, action: DoorAction) -> Result<(), SyncError> {
        self.send(ElevatorCommand::Door(action))
    }

    pub fn send_emergency_command(&mut self, action: ModeAction) -> Result<(), SyncError> {
        self.send(ElevatorCommand::Emergency(action))
    }

    pub fn send_maintenance_command(&mut self, action: ModeAction) -> Result<(), SyncError> {
        self.send(ElevatorCommand::Maintenance(action))
    }
}
