//! Transport wrapper around `rumqttc`.
//!
//! A [`Transport`] opens one session per connect attempt. The session's
//! network side runs in its own tokio task and reports everything the sync
//! module cares about as [`TransportEvent`]s, tagged with the attempt that
//! produced them, on a single channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rumqttc::tokio_rustls::rustls;
use rumqttc::tokio_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use rumqttc::tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    SubscribeReasonCode, TlsConfiguration,
};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::config::ConnectionConfig;
use super::error::TransportError;

/// How long a closing session may take to flush its DISCONNECT packet.
const DISCONNECT_GRACE: Duration = Duration::from_millis(500);

/// Monotonically increasing tag of a connect call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl AttemptId {
    pub fn next(self) -> Self {
        AttemptId(self.0 + 1)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "attempt#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// The broker acknowledged the connect handshake.
    Connected,
    Subscribed,
    SubscribeFailed(String),
    Message { topic: String, payload: Vec<u8> },
    Error(String),
    /// The session's event loop has ended.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub attempt: AttemptId,
    pub kind: TransportEventKind,
}

impl TransportEvent {
    pub fn new(attempt: AttemptId, kind: TransportEventKind) -> Self {
        TransportEvent { attempt, kind }
    }
}

pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Opens broker sessions.
pub trait Transport: Send {
    fn open(
        &mut self,
        attempt: AttemptId,
        config: &ConnectionConfig,
        events: EventSender,
    ) -> Result<Box<dyn TransportSession>, TransportError>;
}

/// A live (or still handshaking) broker session.
///
/// All requests are queued without waiting for the network.
pub trait TransportSession: Send {
    fn subscribe(&mut self, filter: &str) -> Result<(), TransportError>;

    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    fn close(&mut self);
}

/// MQTT over secure WebSockets.
#[derive(Debug, Clone)]
pub struct RumqttTransport {
    request_capacity: usize,
}

impl Default for RumqttTransport {
    fn default() -> Self {
        Self {
            request_capacity: 100,
        }
    }
}

impl Transport for RumqttTransport {
    fn open(
        &mut self,
        attempt: AttemptId,
        config: &ConnectionConfig,
        events: EventSender,
    ) -> Result<Box<dyn TransportSession>, TransportError> {
        let url = config.broker_url();
        info!("Opening {} to {}", attempt, config);

        let mut mqtt_options = MqttOptions::new(config.client_id.trim(), url, config.port);
        mqtt_options
            .set_keep_alive(config.keepalive())
            .set_clean_session(true)
            .set_transport(rumqttc::Transport::Wss(tls_configuration(config.verify_tls)));
        if let Some((user, pw)) = config.credentials() {
            mqtt_options.set_credentials(user, pw);
        }

        let (client, eventloop) = AsyncClient::new(mqtt_options, self.request_capacity);
        let cancel = CancellationToken::new();
        let timing = SessionTiming {
            connect_timeout: config.connect_timeout(),
            reconnect_period: config.reconnect_period(),
        };

        tokio::spawn(drive_event_loop(
            eventloop,
            attempt,
            events,
            cancel.clone(),
            timing,
        ));

        Ok(Box::new(RumqttSession {
            attempt,
            client,
            cancel,
            closing: false,
        }))
    }
}

struct RumqttSession {
    attempt: AttemptId,
    client: AsyncClient,
    cancel: CancellationToken,
    closing: bool,
}

impl TransportSession for RumqttSession {
    fn subscribe(&mut self, filter: &str) -> Result<(), TransportError> {
        self.client.try_subscribe(filter, QoS::AtLeastOnce)?;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)?;
        Ok(())
    }

    fn close(&mut self) {
        if self.closing {
            return;
        }
        self.closing = true;
        match self.client.try_disconnect() {
            // The event loop stops itself once DISCONNECT is written, or
            // after the grace period.
            Ok(()) => {
                let cancel = self.cancel.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(DISCONNECT_GRACE).await;
                    cancel.cancel();
                });
            }
            Err(e) => {
                debug!("{}: disconnect request not queued: {}", self.attempt, e);
                self.cancel.cancel();
            }
        }
    }
}

impl Drop for RumqttSession {
    fn drop(&mut self) {
        if !self.closing {
            self.cancel.cancel();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionTiming {
    connect_timeout: Duration,
    reconnect_period: Option<Duration>,
}

async fn drive_event_loop(
    mut eventloop: EventLoop,
    attempt: AttemptId,
    events: EventSender,
    cancel: CancellationToken,
    timing: SessionTiming,
) {
    let emit = |kind: TransportEventKind| events.send(TransportEvent::new(attempt, kind)).is_ok();

    let mut deadline = Some(Instant::now() + timing.connect_timeout);
    let mut was_connected = false;

    loop {
        let polled = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("{}: event loop cancelled", attempt);
                return;
            }
            polled = poll_once(&mut eventloop, deadline) => polled,
        };

        let delivered = match polled {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code != ConnectReturnCode::Success {
                    emit(TransportEventKind::Error(format!(
                        "broker refused connection: {:?}",
                        ack.code
                    )));
                    break;
                }
                was_connected = true;
                emit(TransportEventKind::Connected)
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                let rejected = ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure));
                deadline = None;
                if rejected {
                    emit(TransportEventKind::SubscribeFailed(
                        "broker rejected the topic filter".to_string(),
                    ))
                } else {
                    emit(TransportEventKind::Subscribed)
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => emit(TransportEventKind::Message {
                topic: publish.topic,
                payload: publish.payload.to_vec(),
            }),
            Ok(Event::Incoming(Packet::Disconnect)) => {
                info!("{}: broker closed the session", attempt);
                break;
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("{}: disconnect sent", attempt);
                break;
            }
            Ok(other) => {
                trace!("{}: {:?}", attempt, other);
                true
            }
            Err(reason) => {
                warn!("{}: {}", attempt, reason);
                if !emit(TransportEventKind::Error(reason)) {
                    return;
                }
                match (was_connected, timing.reconnect_period) {
                    (true, Some(period)) => {
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = tokio::time::sleep(period) => {}
                        }
                        debug!("{}: reconnecting", attempt);
                        deadline = Some(Instant::now() + timing.connect_timeout);
                        true
                    }
                    _ => break,
                }
            }
        };

        if !delivered {
            debug!("{}: sync module gone, stopping event loop", attempt);
            return;
        }
    }

    emit(TransportEventKind::Closed);
}

/// One poll of the event loop; until the subscription is acknowledged it is
/// bounded by the connect deadline.
async fn poll_once(eventloop: &mut EventLoop, deadline: Option<Instant>) -> Result<Event, String> {
    match deadline {
        None => eventloop.poll().await.map_err(|e| e.to_string()),
        Some(deadline) => match tokio::time::timeout_at(deadline, eventloop.poll()).await {
            Ok(polled) => polled.map_err(|e| e.to_string()),
            Err(_) => Err("connect timed out".to_string()),
        },
    }
}

fn tls_configuration(verify_tls: bool) -> TlsConfiguration {
    if verify_tls {
        return TlsConfiguration::default();
    }
    warn!("TLS certificate verification is disabled");
    let config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert))
        .with_no_client_auth();
    TlsConfiguration::Rustls(Arc::new(config))
}

/// Certificate verifier used when the operator turned verification off.
#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        use rustls::SignatureScheme::*;
        vec![
            RSA_PKCS1_SHA256,
            RSA_PKCS1_SHA384,
            RSA_PKCS1_SHA512,
            ECDSA_NISTP256_SHA256,
            ECDSA_NISTP384_SHA384,
            RSA_PSS_SHA256,
            RSA_PSS_SHA384,
            RSA_PSS_SHA512,
            ED25519,
        ]
    }
}
