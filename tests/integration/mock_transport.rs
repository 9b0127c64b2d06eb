//! In-memory transport for integration tests.
//!
//! Records every session call so tests can assert on the full request
//! history, and keeps each attempt's event sender so tests can play the
//! broker's side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use elevator_dashboard::mqtt::transport::{EventSender, TransportSession};
use elevator_dashboard::mqtt::{
    AttemptId, ConnectionConfig, Transport, TransportError, TransportEvent, TransportEventKind,
};
use elevator_dashboard::sound::{SoundEffect, SoundPlayer};

// ── Session call record ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Open(AttemptId),
    Subscribe(AttemptId, String),
    Publish {
        attempt: AttemptId,
        topic: String,
        payload: Vec<u8>,
    },
    Close(AttemptId),
}

#[derive(Default)]
struct BrokerState {
    calls: Vec<SessionCall>,
    senders: HashMap<AttemptId, EventSender>,
    latest: Option<AttemptId>,
    auto_ack: bool,
    fail_open: bool,
    reject_subscribe: bool,
}

// ── MockBroker ────────────────────────────────────────────────

/// Shared view of everything the transport was asked to do.
#[derive(Clone, Default)]
pub struct MockBroker {
    state: Arc<Mutex<BrokerState>>,
}

#[allow(dead_code)]
impl MockBroker {
    /// Broker that answers connect and subscribe requests by itself.
    pub fn auto_ack() -> Self {
        let broker = Self::default();
        broker.lock().auto_ack = true;
        broker
    }

    fn lock(&self) -> MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap()
    }

    pub fn transport(&self) -> MockTransport {
        MockTransport {
            broker: self.clone(),
        }
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    pub fn set_reject_subscribe(&self, reject: bool) {
        self.lock().reject_subscribe = reject;
    }

    pub fn calls(&self) -> Vec<SessionCall> {
        self.lock().calls.clone()
    }

    pub fn latest_attempt(&self) -> Option<AttemptId> {
        self.lock().latest
    }

    pub fn publishes(&self) -> Vec<(String, String)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                SessionCall::Publish { topic, payload, .. } => {
                    Some((topic.clone(), String::from_utf8_lossy(payload).into_owned()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self, attempt: AttemptId) -> bool {
        self.lock().calls.contains(&SessionCall::Close(attempt))
    }

    /// Sends `kind` as if it came from `attempt`'s network task.
    pub fn emit_from(&self, attempt: AttemptId, kind: TransportEventKind) {
        let state = self.lock();
        let sender = state
            .senders
            .get(&attempt)
            .unwrap_or_else(|| panic!("no session opened for {}", attempt));
        sender.send(TransportEvent::new(attempt, kind)).unwrap();
    }

    /// Sends `kind` from the most recently opened session.
    pub fn emit(&self, kind: TransportEventKind) {
        let attempt = self.latest_attempt().expect("no session opened yet");
        self.emit_from(attempt, kind);
    }

    pub fn publish(&self, topic: &str, payload: &str) {
        self.emit(TransportEventKind::Message {
            topic: topic.to_string(),
            payload: payload.as_bytes().to_vec(),
        });
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    broker: MockBroker,
}

impl Transport for MockTransport {
    fn open(
        &mut self,
        attempt: AttemptId,
        _config: &ConnectionConfig,
        events: EventSender,
    ) -> Result<Box<dyn TransportSession>, TransportError> {
        let mut state = self.broker.lock();
        if state.fail_open {
            return Err(TransportError::Setup("broker unreachable".into()));
        }
        state.calls.push(SessionCall::Open(attempt));
        state.senders.insert(attempt, events.clone());
        state.latest = Some(attempt);
        if state.auto_ack {
            events
                .send(TransportEvent::new(attempt, TransportEventKind::Connected))
                .unwrap();
        }
        Ok(Box::new(MockSession {
            attempt,
            events,
            broker: self.broker.clone(),
        }))
    }
}

struct MockSession {
    attempt: AttemptId,
    events: EventSender,
    broker: MockBroker,
}

impl TransportSession for MockSession {
    fn subscribe(&mut self, filter: &str) -> Result<(), TransportError> {
        let mut state = self.broker.lock();
        state
            .calls
            .push(SessionCall::Subscribe(self.attempt, filter.to_string()));
        if state.auto_ack {
            let kind = if state.reject_subscribe {
                TransportEventKind::SubscribeFailed("not authorized".into())
            } else {
                TransportEventKind::Subscribed
            };
            let _ = self.events.send(TransportEvent::new(self.attempt, kind));
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.broker.lock().calls.push(SessionCall::Publish {
            attempt: self.attempt,
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    fn close(&mut self) {
        self.broker.lock().calls.push(SessionCall::Close(self.attempt));
    }
}

// ── Sound recorder ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingPlayer {
    pub played: Arc<Mutex<Vec<SoundEffect>>>,
}

#[allow(dead_code)]
impl RecordingPlayer {
    pub fn played(&self) -> Vec<SoundEffect> {
        self.played.lock().unwrap().clone()
    }
}

impl SoundPlayer for RecordingPlayer {
    fn play(&mut self, effect: SoundEffect) {
        self.played.lock().unwrap().push(effect);
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        hostname: "broker.test".into(),
        client_id: "elevator_dashboard_test".into(),
        ..ConnectionConfig::default()
    }
}

/// Polls `check` until it holds or a second has passed.
#[allow(dead_code)]
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
