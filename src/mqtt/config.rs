use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::error::SyncError;

/// Broker connection parameters for one connect attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub hostname: String,
    pub port: u16,
    /// WebSocket path, including the leading slash (e.g. `/mqtt`).
    pub path: String,
    pub client_id: String,
    pub username: String,
    /// Never written to the config file.
    #[serde(skip)]
    pub password: String,
    pub keepalive_secs: u64,
    /// Delay before the transport retries a lost connection. `0` disables
    /// reconnecting.
    pub reconnect_period_ms: u64,
    pub connect_timeout_ms: u64,
    pub verify_tls: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hostname: "broker.hivemq.com".to_string(),
            port: 8884,
            path: "/mqtt".to_string(),
            client_id: default_client_id(),
            username: String::new(),
            password: String::new(),
            keepalive_secs: 60,
            reconnect_period_ms: 1_000,
            connect_timeout_ms: 30_000,
            verify_tls: true,
        }
    }
}

impl fmt::Display for ConnectionConfig {
    /// `user@wss://host:port/path`, without the password.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.username.is_empty() {
            write!(f, "{}", self.broker_url())
        } else {
            write!(f, "{}@{}", self.username, self.broker_url())
        }
    }
}

impl ConnectionConfig {
    pub fn broker_url(&self) -> String {
        let path = if self.path.is_empty() || self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("wss://{}:{}{}", self.hostname, self.port, path)
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        if self.hostname.trim().is_empty() {
            return Err(SyncError::InvalidConfig("broker hostname is empty".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(SyncError::InvalidConfig("client id is empty".into()));
        }
        Ok(())
    }

    /// Username/password pair, only when a username was given.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        if self.username.is_empty() {
            None
        } else {
            Some((self.username.as_str(), self.password.as_str()))
        }
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs.max(5))
    }

    pub fn reconnect_period(&self) -> Option<Duration> {
        (self.reconnect_period_ms > 0).then(|| Duration::from_millis(self.reconnect_period_ms))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms.max(1))
    }
}

/// `elevator_dashboard_<n>` with a small per-launch suffix.
pub fn default_client_id() -> String {
    let suffix = chrono::Utc::now().timestamp_subsec_micros() % 1000;
    format!("elevator_dashboard_{}", suffix)
}
