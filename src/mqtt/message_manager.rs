use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// Inbound message as seen on the wire, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessageRecord {
    pub topic: String,
    pub payload: String,
    /// Receipt time, epoch milliseconds.
    pub timestamp: i64,
}

impl RawMessageRecord {
    pub fn new(topic: impl Into<String>, payload: impl Into<String>, timestamp: i64) -> Self {
        RawMessageRecord {
            topic: topic.into(),
            payload: payload.into(),
            timestamp,
        }
    }

    /// Stamps the record with the current time.
    pub fn received(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(topic, payload, chrono::Utc::now().timestamp_millis())
    }

    pub fn received_at(&self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp_millis(self.timestamp).map(|utc| utc.with_timezone(&Local))
    }

    pub fn render(&self) -> String {
        let stamp = self
            .received_at()
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_default();
        format!("{}: {}\n{}", stamp, self.topic, self.payload)
    }
}

impl fmt::Display for RawMessageRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let preview: String = self.payload.chars().take(40).collect();
        write!(f, "{} - {}", self.topic, preview)
    }
}

/// Fixed-capacity history, newest entry first.
///
/// Pushing beyond capacity drops the oldest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory<T> {
    entries: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn new(capacity: usize) -> Self {
        BoundedHistory {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: T) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<&T> {
        self.entries.front()
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
