//! Error types of the MQTT layer.

use thiserror::Error;

/// Failures inside the transport wrapper.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The session could not be set up (bad address, TLS setup).
    #[error("transport setup failed: {0}")]
    Setup(String),

    /// A request could not be queued on the client.
    #[error("transport request failed: {0}")]
    Request(String),
}

impl From<rumqttc::ClientError> for TransportError {
    fn from(err: rumqttc::ClientError) -> Self {
        TransportError::Request(err.to_string())
    }
}

/// Errors surfaced by the status synchronization module.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("invalid connection config: {0}")]
    InvalidConfig(String),

    /// Handshake, TLS or timeout failure.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    #[error("subscription failed: {0}")]
    SubscribeFailed(String),

    /// A newer connect call replaced this attempt before it completed.
    #[error("connection attempt superseded by a newer one")]
    Superseded,

    /// `disconnect` was called while the attempt was pending.
    #[error("connection attempt cancelled")]
    Cancelled,

    #[error("not connected to MQTT broker")]
    NotConnected,

    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// The sync worker is gone.
    #[error("status sync worker stopped")]
    WorkerStopped,
}
