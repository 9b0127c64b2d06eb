//! Worker task and handle for the status synchronization module.
//!
//! The [`StatusSync`] core lives on one tokio task. UI code talks to it via
//! the cloneable [`SyncHandle`], which turns calls into [`SyncAction`]s;
//! transport events reach the same task through the event channel. Both
//! streams are handled one message at a time.
//!
//! ```text
//! SyncHandle ─[SyncAction]──────┐
//!                               ├─► worker (StatusSync) ─► listeners
//! Transport ─[TransportEvent]───┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::config::ConnectionConfig;
use super::error::SyncError;
use super::listeners::{Listener, ListenerId};
use super::message_manager::RawMessageRecord;
use super::status_sync::{ConnectReply, StatusSync};
use super::transport::{Transport, TransportEvent};
use crate::elevator::{
    DoorAction, ElevatorCommand, ElevatorDiagnostics, ElevatorStatus, LogEntry, ModeAction,
};

pub enum SyncAction {
    Connect {
        config: ConnectionConfig,
        response_tx: ConnectReply,
    },
    Disconnect {
        response_tx: Option<oneshot::Sender<()>>,
    },
    Send(ElevatorCommand),
    Register {
        id: ListenerId,
        listener: Listener,
    },
    Unregister(ListenerId),
    Shutdown,
}

/// Front end of the sync worker.
#[derive(Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncAction>,
    next_listener: Arc<AtomicU64>,
}

impl SyncHandle {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn<T>(transport: T) -> (Self, JoinHandle<()>)
    where
        T: Transport + 'static,
    {
        let (sync, event_rx) = StatusSync::new(transport);
        let (tx, action_rx) = mpsc::unbounded_channel();

        info!("Spawning status sync worker");
        let worker = tokio::spawn(run_worker(sync, action_rx, event_rx));

        let handle = SyncHandle {
            tx,
            next_listener: Arc::new(AtomicU64::new(1)),
        };
        (handle, worker)
    }

    fn submit(&self, action: SyncAction) -> Result<(), SyncError> {
        self.tx.send(action).map_err(|_| {
            error!("Status sync worker is not running");
            SyncError::WorkerStopped
        })
    }

    /// Connects and waits until the wildcard subscription is acknowledged.
    pub async fn connect(&self, config: ConnectionConfig) -> Result<(), SyncError> {
        let (response_tx, response_rx) = oneshot::channel();
        self.submit(SyncAction::Connect {
            config,
            response_tx,
        })?;
        response_rx.await.map_err(|_| SyncError::WorkerStopped)?
    }

    /// Disconnects and waits until the worker has closed the session.
    pub async fn disconnect(&self) {
        let (response_tx, response_rx) = oneshot::channel();
        if self
            .submit(SyncAction::Disconnect {
                response_tx: Some(response_tx),
            })
            .is_ok()
        {
            let _ = response_rx.await;
        }
    }

    /// Queues a disconnect without waiting for it.
    pub fn request_disconnect(&self) {
        let _ = self.submit(SyncAction::Disconnect { response_tx: None });
    }

    /// Fire-and-forget: refusal while disconnected is reported by the
    /// worker's log, not to the caller.
    pub fn send_command(&self, command: ElevatorCommand) {
        let _ = self.submit(SyncAction::Send(command));
    }

    pub fn send_floor_command(&self, floor: u32) {
        self.send_command(ElevatorCommand::Floor(floor));
    }

    pub fn send_door_command(&self, action: DoorAction) {
        self.send_command(ElevatorCommand::Door(action));
    }

    pub fn send_emergency_command(&self, action: ModeAction) {
        self.send_command(ElevatorCommand::Emergency(action));
    }

    pub fn send_maintenance_command(&self, action: ModeAction) {
        self.send_command(ElevatorCommand::Maintenance(action));
    }

    fn register(&self, listener: Listener) -> Subscription {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        if let Err(e) = self.submit(SyncAction::Register { id, listener }) {
            warn!("Listener {} not registered: {}", id, e);
        }
        Subscription {
            id,
            tx: self.tx.clone(),
        }
    }

    pub fn on_status_update<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ElevatorStatus) + Send + 'static,
    {
        self.register(Listener::Status(Box::new(listener)))
    }

    pub fn on_diagnostics_update<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&ElevatorDiagnostics) + Send + 'static,
    {
        self.register(Listener::Diagnostics(Box::new(listener)))
    }

    pub fn on_log_update<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&LogEntry) + Send + 'static,
    {
        self.register(Listener::Log(Box::new(listener)))
    }

    pub fn on_connection_status_change<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&bool) + Send + 'static,
    {
        self.register(Listener::Connection(Box::new(listener)))
    }

    pub fn on_message_received<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&RawMessageRecord) + Send + 'static,
    {
        self.register(Listener::Message(Box::new(listener)))
    }

    /// Stops the worker after closing any session.
    pub fn shutdown(&self) {
        let _ = self.submit(SyncAction::Shutdown);
    }
}

/// Deregistration handle returned by the `on_*` methods.
///
/// Dropping it keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    id: ListenerId,
    tx: mpsc::UnboundedSender<SyncAction>,
}

impl Subscription {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub fn unsubscribe(self) {
        if self.tx.send(SyncAction::Unregister(self.id)).is_err() {
            debug!("Worker already stopped, {} dropped with it", self.id);
        }
    }
}

async fn run_worker<T: Transport>(
    mut sync: StatusSync<T>,
    mut action_rx: mpsc::UnboundedReceiver<SyncAction>,
    mut event_rx: mpsc::UnboundedReceiver<TransportEvent>,
) {
    loop {
        tokio::select! {
            action = action_rx.recv() => match action {
                Some(SyncAction::Shutdown) | None => break,
                Some(action) => apply_action(&mut sync, action),
            },
            Some(event) = event_rx.recv() => sync.handle_event(event),
        }
    }

    sync.disconnect();
    info!("Status sync worker stopped");
}

fn apply_action<T: Transport>(sync: &mut StatusSync<T>, action: SyncAction) {
    match action {
        SyncAction::Connect {
            config,
            response_tx,
        } => sync.connect(config, response_tx),
        SyncAction::Disconnect { response_tx } => {
            sync.disconnect();
            if let Some(tx) = response_tx {
                let _ = tx.send(());
            }
        }
        SyncAction::Send(command) => {
            // Refusals are already logged by the core.
            let _ = sync.send(command);
        }
        SyncAction::Register { id, listener } => sync.register(id, listener),
        SyncAction::Unregister(id) => {
            sync.unregister(id);
        }
        SyncAction::Shutdown => {}
    }
}
