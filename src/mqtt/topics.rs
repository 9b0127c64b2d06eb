//! Fixed topic namespace of the elevator.

pub const ROOT: &str = "building/elevator";

/// Filter subscribed on every connect: everything under [`ROOT`].
pub const SUBSCRIPTION_FILTER: &str = "building/elevator/#";

pub const STATUS: &str = "building/elevator/status";
pub const DIAGNOSTICS: &str = "building/elevator/diagnostics";
pub const LOG: &str = "building/elevator/log";
pub const COMMAND: &str = "building/elevator/command";
pub const EMERGENCY: &str = "building/elevator/emergency";
pub const MAINTENANCE: &str = "building/elevator/maintenance";

/// Inbound topics that carry a typed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodedTopic {
    Status,
    Diagnostics,
    Log,
}

impl DecodedTopic {
    /// Exact match only; sub-topics such as `status/extra` are not decoded.
    pub fn classify(topic: &str) -> Option<Self> {
        match topic {
            STATUS => Some(DecodedTopic::Status),
            DIAGNOSTICS => Some(DecodedTopic::Diagnostics),
            LOG => Some(DecodedTopic::Log),
            _ => None,
        }
    }
}
