//! Operator dashboard for a three-floor elevator controlled over MQTT.
//!
//! The [`mqtt`] module keeps a typed view of the elevator in sync with the
//! broker, [`store`] republishes it for the widgets in [`ui`], and [`voice`]
//! turns free-text transcripts into commands.

pub mod config;
pub mod elevator;
pub mod mqtt;
pub mod sound;
pub mod store;
pub mod ui;
pub mod voice;
