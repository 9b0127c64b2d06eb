//! Listener registries for the five event categories of the sync module.
//!
//! Each category keeps its own ordered list; listeners of one category are
//! called in registration order.

use std::fmt;

use super::message_manager::RawMessageRecord;
use crate::elevator::{ElevatorDiagnostics, ElevatorStatus, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

pub type Callback<E> = Box<dyn FnMut(&E) + Send>;

pub struct ListenerList<E: ?Sized> {
    entries: Vec<(ListenerId, Callback<E>)>,
}

impl<E: ?Sized> Default for ListenerList<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: ?Sized> ListenerList<E> {
    pub fn add(&mut self, id: ListenerId, callback: Callback<E>) {
        self.entries.push((id, callback));
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn notify(&mut self, event: &E) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A callback for one of the five categories, as handed to the sync module.
pub enum Listener {
    Status(Callback<ElevatorStatus>),
    Diagnostics(Callback<ElevatorDiagnostics>),
    Log(Callback<LogEntry>),
    Connection(Callback<bool>),
    Message(Callback<RawMessageRecord>),
}

impl Listener {
    pub fn category(&self) -> &'static str {
        match self {
            Listener::Status(_) => "status",
            Listener::Diagnostics(_) => "diagnostics",
            Listener::Log(_) => "log",
            Listener::Connection(_) => "connection",
            Listener::Message(_) => "message",
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Listener({})", self.category())
    }
}

#[derive(Default)]
pub struct Listeners {
    pub status: ListenerList<ElevatorStatus>,
    pub diagnostics: ListenerList<ElevatorDiagnostics>,
    pub log: ListenerList<LogEntry>,
    pub connection: ListenerList<bool>,
    pub message: ListenerList<RawMessageRecord>,
}

impl Listeners {
    pub fn register(&mut self, id: ListenerId, listener: Listener) {
        match listener {
            Listener::Status(cb) => self.status.add(id, cb),
            Listener::Diagnostics(cb) => self.diagnostics.add(id, cb),
            Listener::Log(cb) => self.log.add(id, cb),
            Listener::Connection(cb) => self.connection.add(id, cb),
            Listener::Message(cb) => self.message.add(id, cb),
        }
    }

    /// Removes `id` from whichever list holds it.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        self.status.remove(id)
            || self.diagnostics.remove(id)
            || self.log.remove(id)
            || self.connection.remove(id)
            || self.message.remove(id)
    }
}
