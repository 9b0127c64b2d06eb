//! # MQTT Integration Module
//!
//! Connects the dashboard to the elevator's broker and keeps a typed view of
//! its state.
//!
//! ## Module Architecture
//!
//! ```text
//! mqtt/
//! ├── config.rs           - Broker connection parameters
//! ├── topics.rs           - The fixed `building/elevator/` namespace
//! ├── message_manager.rs  - Raw message records and bounded histories
//! ├── transport.rs        - rumqttc session wrapper (WebSocket + TLS)
//! ├── listeners.rs        - Per-category listener registries
//! ├── status_sync.rs      - Connection lifecycle, decode, fan-out, commands
//! ├── sync_handle.rs      - Worker task owning the core, cloneable handle
//! └── error.rs            - Error types
//! ```
//!
//! ## Connection lifecycle
//!
//! Every connect call gets a fresh attempt id. The transport tags each event
//! with the attempt that produced it and the core drops events whose attempt
//! is no longer live, so a slow handshake from an earlier call can never
//! override a newer connection.
//!
//! A connect resolves only once the broker has acknowledged the subscription
//! to `building/elevator/#`.

pub mod config;
pub mod error;
pub mod listeners;
pub mod message_manager;
pub mod status_sync;
pub mod sync_handle;
pub mod topics;
pub mod transport;

pub use config::ConnectionConfig;
pub use error::{SyncError, TransportError};
pub use message_manager::{BoundedHistory, RawMessageRecord};
pub use status_sync::{ConnectionState, StatusSync};
pub use sync_handle::{Subscription, SyncHandle};
pub use transport::{AttemptId, RumqttTransport, Transport, TransportEvent, TransportEventKind};
