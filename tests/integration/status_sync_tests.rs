//! Connection lifecycle, decode and publish behaviour of `StatusSync`,
//! driven event by event without a runtime.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use elevator_dashboard::elevator::{
    DoorAction, ElevatorDiagnostics, ElevatorStatus, LogEntry, ModeAction, MotionState,
};
use elevator_dashboard::mqtt::listeners::{Listener, ListenerId};
use elevator_dashboard::mqtt::topics;
use elevator_dashboard::mqtt::{
    ConnectionConfig, ConnectionState, RawMessageRecord, StatusSync, SyncError, TransportEvent,
    TransportEventKind,
};

use crate::mock_transport::{test_config, MockBroker, MockTransport, SessionCall};

type Reply = oneshot::Receiver<Result<(), SyncError>>;

struct Harness {
    sync: StatusSync<MockTransport>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    broker: MockBroker,
    connection: Arc<Mutex<Vec<bool>>>,
    raw: Arc<Mutex<Vec<RawMessageRecord>>>,
    statuses: Arc<Mutex<Vec<ElevatorStatus>>>,
    diagnostics: Arc<Mutex<Vec<ElevatorDiagnostics>>>,
    logs: Arc<Mutex<Vec<LogEntry>>>,
}

impl Harness {
    fn new(broker: MockBroker) -> Self {
        let (mut sync, events) = StatusSync::new(broker.transport());

        let connection = Arc::new(Mutex::new(Vec::new()));
        let raw = Arc::new(Mutex::new(Vec::new()));
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let diagnostics = Arc::new(Mutex::new(Vec::new()));
        let logs = Arc::new(Mutex::new(Vec::new()));

        let sink = connection.clone();
        sync.register(
            ListenerId(1),
            Listener::Connection(Box::new(move |up| sink.lock().unwrap().push(*up))),
        );
        let sink = raw.clone();
        sync.register(
            ListenerId(2),
            Listener::Message(Box::new(move |record| sink.lock().unwrap().push(record.clone()))),
        );
        let sink = statuses.clone();
        sync.register(
            ListenerId(3),
            Listener::Status(Box::new(move |status| sink.lock().unwrap().push(status.clone()))),
        );
        let sink = diagnostics.clone();
        sync.register(
            ListenerId(4),
            Listener::Diagnostics(Box::new(move |d| sink.lock().unwrap().push(d.clone()))),
        );
        let sink = logs.clone();
        sync.register(
            ListenerId(5),
            Listener::Log(Box::new(move |entry| sink.lock().unwrap().push(entry.clone()))),
        );

        Harness {
            sync,
            events,
            broker,
            connection,
            raw,
            statuses,
            diagnostics,
            logs,
        }
    }

    fn connect(&mut self) -> Reply {
        self.connect_with(test_config())
    }

    fn connect_with(&mut self, config: ConnectionConfig) -> Reply {
        let (tx, rx) = oneshot::channel();
        self.sync.connect(config, tx);
        rx
    }

    /// Feeds every queued transport event to the core.
    fn pump(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.sync.handle_event(event);
        }
    }

    /// Connects through an auto-acking broker and checks the result.
    fn connected(broker: MockBroker) -> Self {
        let mut harness = Harness::new(broker);
        let mut reply = harness.connect();
        harness.pump();
        assert_eq!(reply.try_recv().unwrap(), Ok(()));
        harness
    }

    fn connection_changes(&self) -> Vec<bool> {
        self.connection.lock().unwrap().clone()
    }
}

const STATUS_FLOOR_2: &str = r#"{"floor":2,"target_floor":3,"state":"moving_up","door":"closed","emergency":false,"maintenance":false,"overload":false,"door_obstructed":false}"#;

// ── Connect ───────────────────────────────────────────────────

#[test]
fn connect_resolves_only_after_subscribe_ack() {
    let mut h = Harness::new(MockBroker::default());
    let mut reply = h.connect();
    assert_eq!(h.sync.state(), &ConnectionState::Connecting);

    h.broker.emit(TransportEventKind::Connected);
    h.pump();
    let attempt = h.broker.latest_attempt().unwrap();
    assert!(h.broker.calls().contains(&SessionCall::Subscribe(
        attempt,
        topics::SUBSCRIPTION_FILTER.to_string()
    )));
    assert!(reply.try_recv().is_err(), "must wait for the subscribe ack");
    assert!(!h.sync.is_connected());

    h.broker.emit(TransportEventKind::Subscribed);
    h.pump();
    assert_eq!(reply.try_recv().unwrap(), Ok(()));
    assert_eq!(h.sync.state(), &ConnectionState::Connected);
    assert_eq!(h.connection_changes(), vec![true]);
}

#[test]
fn invalid_config_is_rejected_without_touching_state() {
    let mut h = Harness::new(MockBroker::auto_ack());
    let config = ConnectionConfig {
        hostname: "  ".into(),
        ..test_config()
    };
    let mut reply = h.connect_with(config);

    assert!(matches!(
        reply.try_recv().unwrap(),
        Err(SyncError::InvalidConfig(_))
    ));
    assert_eq!(h.sync.state(), &ConnectionState::Disconnected);
    assert!(h.broker.calls().is_empty());
}

#[test]
fn open_failure_reports_connect_failed() {
    let broker = MockBroker::default();
    broker.set_fail_open(true);
    let mut h = Harness::new(broker);
    let mut reply = h.connect();

    assert!(matches!(
        reply.try_recv().unwrap(),
        Err(SyncError::ConnectFailed(_))
    ));
    assert!(matches!(h.sync.state(), ConnectionState::Errored(_)));
    assert!(h.connection_changes().is_empty());
}

#[test]
fn handshake_error_rejects_pending_connect() {
    let mut h = Harness::new(MockBroker::default());
    let mut reply = h.connect();
    let attempt = h.broker.latest_attempt().unwrap();

    h.broker
        .emit(TransportEventKind::Error("connect timeout".into()));
    h.pump();

    assert_eq!(
        reply.try_recv().unwrap(),
        Err(SyncError::ConnectFailed("connect timeout".into()))
    );
    assert!(matches!(h.sync.state(), ConnectionState::Errored(_)));
    assert!(h.broker.closed(attempt));
    assert!(h.connection_changes().is_empty());
}

#[test]
fn subscribe_failure_rejects_and_tears_down() {
    let broker = MockBroker::auto_ack();
    broker.set_reject_subscribe(true);
    let mut h = Harness::new(broker);
    let mut reply = h.connect();
    h.pump();

    assert!(matches!(
        reply.try_recv().unwrap(),
        Err(SyncError::SubscribeFailed(_))
    ));
    assert!(matches!(h.sync.state(), ConnectionState::Errored(_)));
    assert!(h.broker.closed(h.broker.latest_attempt().unwrap()));
    assert_eq!(h.sync.current_attempt(), None);
}

#[test]
fn second_connect_supersedes_pending_attempt() {
    let mut h = Harness::new(MockBroker::default());
    let mut first = h.connect();
    let first_attempt = h.broker.latest_attempt().unwrap();

    let mut second = h.connect();
    let second_attempt = h.broker.latest_attempt().unwrap();
    assert_ne!(first_attempt, second_attempt);
    assert_eq!(first.try_recv().unwrap(), Err(SyncError::Superseded));
    assert!(h.broker.closed(first_attempt));

    // The first attempt's handshake finishing late changes nothing.
    h.broker
        .emit_from(first_attempt, TransportEventKind::Connected);
    h.broker
        .emit_from(first_attempt, TransportEventKind::Subscribed);
    h.pump();
    assert!(!h.sync.is_connected());
    assert!(h.connection_changes().is_empty());

    h.broker.emit(TransportEventKind::Connected);
    h.broker.emit(TransportEventKind::Subscribed);
    h.pump();
    assert_eq!(second.try_recv().unwrap(), Ok(()));
    assert_eq!(h.connection_changes(), vec![true]);
}

#[test]
fn reconnecting_a_live_session_reports_down_then_up() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    let first_attempt = h.broker.latest_attempt().unwrap();

    let mut reply = h.connect();
    h.pump();

    assert_eq!(reply.try_recv().unwrap(), Ok(()));
    assert!(h.broker.closed(first_attempt));
    assert_eq!(h.connection_changes(), vec![true, false, true]);
}

// ── Stale attempts ────────────────────────────────────────────

#[test]
fn events_from_replaced_session_are_ignored() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    let old = h.broker.latest_attempt().unwrap();
    let _reply = h.connect();
    h.pump();

    h.broker.emit_from(
        old,
        TransportEventKind::Message {
            topic: topics::STATUS.into(),
            payload: STATUS_FLOOR_2.as_bytes().to_vec(),
        },
    );
    h.broker
        .emit_from(old, TransportEventKind::Error("socket reset".into()));
    h.broker.emit_from(old, TransportEventKind::Closed);
    h.pump();

    assert!(h.raw.lock().unwrap().is_empty());
    assert!(h.sync.status().is_none());
    assert!(h.sync.is_connected());
}

// ── Disconnect ────────────────────────────────────────────────

#[test]
fn disconnect_without_session_is_a_no_op() {
    let mut h = Harness::new(MockBroker::auto_ack());
    h.sync.disconnect();
    h.sync.disconnect();

    assert_eq!(h.sync.state(), &ConnectionState::Disconnected);
    assert!(h.connection_changes().is_empty());
    assert!(h.broker.calls().is_empty());
}

#[test]
fn disconnect_closes_live_session() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    let attempt = h.broker.latest_attempt().unwrap();

    h.sync.disconnect();
    assert!(h.broker.closed(attempt));
    assert_eq!(h.sync.state(), &ConnectionState::Disconnected);
    assert_eq!(h.connection_changes(), vec![true, false]);

    // The closed session's final event is stale by now.
    h.broker.emit_from(attempt, TransportEventKind::Closed);
    h.pump();
    assert_eq!(h.connection_changes(), vec![true, false]);
}

#[test]
fn disconnect_cancels_pending_attempt() {
    let mut h = Harness::new(MockBroker::default());
    let mut reply = h.connect();

    h.sync.disconnect();
    assert_eq!(reply.try_recv().unwrap(), Err(SyncError::Cancelled));
    assert_eq!(h.sync.state(), &ConnectionState::Disconnected);
    assert!(h.connection_changes().is_empty());
}

// ── Connection loss ───────────────────────────────────────────

#[test]
fn connection_loss_then_reconnect() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    let attempt = h.broker.latest_attempt().unwrap();

    h.broker
        .emit(TransportEventKind::Error("connection reset".into()));
    h.pump();
    assert_eq!(
        h.sync.state(),
        &ConnectionState::Errored("connection reset".into())
    );
    assert_eq!(h.connection_changes(), vec![true, false]);

    // The transport retries on its own and reports a fresh handshake; the
    // broker acks the new subscription.
    h.broker.emit(TransportEventKind::Connected);
    h.pump();
    let subscribes = h
        .broker
        .calls()
        .into_iter()
        .filter(|call| matches!(call, SessionCall::Subscribe(a, _) if *a == attempt))
        .count();
    assert_eq!(subscribes, 2);
    assert!(h.sync.is_connected());
    assert_eq!(h.connection_changes(), vec![true, false, true]);
}

#[test]
fn closed_session_reports_disconnect() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.emit(TransportEventKind::Closed);
    h.pump();

    assert_eq!(h.sync.state(), &ConnectionState::Disconnected);
    assert_eq!(h.sync.current_attempt(), None);
    assert_eq!(h.connection_changes(), vec![true, false]);
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn status_message_replaces_snapshot() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.publish(topics::STATUS, STATUS_FLOOR_2);
    h.pump();

    let status = h.sync.status().cloned().unwrap();
    assert_eq!(status.floor, 2);
    assert_eq!(status.target_floor, 3);
    assert_eq!(status.state, MotionState::MovingUp);
    assert_eq!(*h.statuses.lock().unwrap(), vec![status]);
    assert_eq!(h.raw.lock().unwrap().len(), 1);
}

#[test]
fn malformed_status_keeps_last_snapshot() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.publish(topics::STATUS, STATUS_FLOOR_2);
    h.broker.publish(topics::STATUS, "{\"floor\": \"two\"");
    h.broker.publish(topics::STATUS, r#"{"floor":3}"#);
    h.pump();

    assert_eq!(h.sync.status().map(|s| s.floor), Some(2));
    assert_eq!(h.statuses.lock().unwrap().len(), 1);
    // Raw listeners see every message, decodable or not.
    assert_eq!(h.raw.lock().unwrap().len(), 3);
}

#[test]
fn diagnostics_and_status_are_independent() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.publish(
        topics::DIAGNOSTICS,
        r#"{"uptime_seconds":3661,"total_trips":12,"door_operations":30,"wifi_rssi":-67,"free_heap":120000,"current_floor":1}"#,
    );
    h.pump();

    assert!(h.sync.status().is_none());
    let diagnostics = h.sync.diagnostics().cloned().unwrap();
    assert_eq!(diagnostics.total_trips, 12);
    assert_eq!(diagnostics.uptime_display(), "0d 1h 1m 1s");
    assert_eq!(*h.diagnostics.lock().unwrap(), vec![diagnostics]);
}

#[test]
fn log_message_reaches_log_listeners() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.publish(
        topics::LOG,
        r#"{"timestamp":1700000000000,"message":"Arrived at floor 2"}"#,
    );
    h.pump();

    let logs = h.logs.lock().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "Arrived at floor 2");
}

#[test]
fn unknown_topic_is_raw_only() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    h.broker.publish("building/elevator/debug/heartbeat", "tick");
    h.broker.publish("building/elevator/status/extra", STATUS_FLOOR_2);
    h.pump();

    let raw = h.raw.lock().unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].topic, "building/elevator/debug/heartbeat");
    assert_eq!(raw[0].payload, "tick");
    assert!(h.statuses.lock().unwrap().is_empty());
    assert!(h.sync.status().is_none());
}

#[test]
fn raw_listeners_run_before_typed_ones() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    let order = Arc::new(Mutex::new(Vec::new()));

    let sink = order.clone();
    h.sync.register(
        ListenerId(10),
        Listener::Status(Box::new(move |_| sink.lock().unwrap().push("status"))),
    );
    let sink = order.clone();
    h.sync.register(
        ListenerId(11),
        Listener::Message(Box::new(move |_| sink.lock().unwrap().push("raw"))),
    );

    h.broker.publish(topics::STATUS, STATUS_FLOOR_2);
    h.pump();
    assert_eq!(*order.lock().unwrap(), vec!["raw", "status"]);
}

#[test]
fn unregistered_listener_is_not_called() {
    let mut h = Harness::connected(MockBroker::auto_ack());
    assert!(h.sync.unregister(ListenerId(2)));
    assert!(!h.sync.unregister(ListenerId(2)));

    h.broker.publish(topics::STATUS, STATUS_FLOOR_2);
    h.pump();
    assert!(h.raw.lock().unwrap().is_empty());
    assert_eq!(h.statuses.lock().unwrap().len(), 1);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn commands_while_disconnected_are_refused() {
    let mut h = Harness::new(MockBroker::auto_ack());
    assert_eq!(h.sync.send_floor_command(2), Err(SyncError::NotConnected));

    // Still handshaking counts as disconnected.
    let _reply = h.connect();
    assert_eq!(
        h.sync.send_door_command(DoorAction::Open),
        Err(SyncError::NotConnected)
    );
    assert!(h.broker.publishes().is_empty());
}

#[test]
fn commands_use_their_topics_and_payloads() {
    let mut h = Harness::connected(MockBroker::auto_ack());

    h.sync.send_floor_command(2).unwrap();
    h.sync.send_door_command(DoorAction::Open).unwrap();
    h.sync.send_door_command(DoorAction::Close).unwrap();
    h.sync.send_emergency_command(ModeAction::Activate).unwrap();
    h.sync
        .send_maintenance_command(ModeAction::Deactivate)
        .unwrap();

    let sent = h.broker.publishes();
    assert_eq!(
        sent,
        vec![
            (topics::COMMAND.to_string(), r#"{"floor":2}"#.to_string()),
            (topics::COMMAND.to_string(), r#"{"door":"open"}"#.to_string()),
            (topics::COMMAND.to_string(), r#"{"door":"close"}"#.to_string()),
            (topics::EMERGENCY.to_string(), "activate".to_string()),
            (topics::MAINTENANCE.to_string(), "deactivate".to_string()),
        ]
    );
}
