//! Voice command support: transcript matching and the control that issues
//! matched commands through the store.

pub mod control;
pub mod matcher;

pub use control::{TranscriptSource, TypedTranscripts, VoiceControl, VoiceOutcome};
pub use matcher::{match_transcript, VoiceIntent};
