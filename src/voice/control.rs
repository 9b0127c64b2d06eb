use tracing::{debug, info, warn};

use super::matcher::{match_transcript, VoiceIntent};
use crate::elevator::ElevatorCommand;
use crate::sound::{SoundEffect, SoundService};
use crate::store::{DashboardStore, NoticeLevel};

/// Supplies final transcripts from whatever captures speech.
pub trait TranscriptSource {
    /// The next finished transcript, if one is ready.
    fn poll_transcript(&mut self) -> Option<String>;
}

/// Transcripts typed into the voice panel.
#[derive(Debug, Default)]
pub struct TypedTranscripts {
    pending: Vec<String>,
}

impl TypedTranscripts {
    /// Queues `text` unless it is blank.
    pub fn submit(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            self.pending.push(text.to_string());
        }
    }
}

impl TranscriptSource for TypedTranscripts {
    fn poll_transcript(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

/// Result of handing a transcript to [`VoiceControl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceOutcome {
    Issued(ElevatorCommand),
    /// A floor call for a floor the building does not have. Dropped without
    /// a notice.
    Ignored,
    Unrecognized,
    NotConnected,
    Unsupported,
}

#[derive(Debug)]
pub struct VoiceControl {
    supported: bool,
    last_transcript: Option<String>,
    last_command: Option<ElevatorCommand>,
}

impl VoiceControl {
    /// `supported` is decided once at startup.
    pub fn new(supported: bool) -> Self {
        if !supported {
            warn!("Voice commands are not supported in this session");
        }
        Self {
            supported,
            last_transcript: None,
            last_command: None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn last_transcript(&self) -> Option<&str> {
        self.last_transcript.as_deref()
    }

    pub fn last_command(&self) -> Option<ElevatorCommand> {
        self.last_command
    }

    /// Matches `transcript` and issues the resulting command through `store`.
    pub fn handle_transcript(
        &mut self,
        transcript: &str,
        store: &DashboardStore,
        sound: &mut SoundService,
    ) -> VoiceOutcome {
        if !self.supported {
            return VoiceOutcome::Unsupported;
        }
        if !store.is_connected() {
            store.notify(
                NoticeLevel::Error,
                "Not Connected",
                "Please connect to MQTT broker first",
            );
            return VoiceOutcome::NotConnected;
        }

        sound.play(SoundEffect::VoiceCommand);
        self.last_transcript = Some(transcript.to_string());
        info!("Voice transcript: {:?}", transcript);

        match match_transcript(transcript) {
            VoiceIntent::Command(command) => {
                if !store.issue(command) {
                    return VoiceOutcome::NotConnected;
                }
                self.last_command = Some(command);
                store.notify(
                    NoticeLevel::Info,
                    "Voice Command Recognized",
                    &format!("Executing: {}", command),
                );
                VoiceOutcome::Issued(command)
            }
            VoiceIntent::Unrecognized if transcript.to_lowercase().contains("floor") => {
                debug!("No valid floor in {:?}, ignoring", transcript);
                VoiceOutcome::Ignored
            }
            VoiceIntent::Unrecognized => {
                store.notify(
                    NoticeLevel::Error,
                    "Voice Command Not Recognized",
                    &format!("Could not understand: \"{}\"", transcript),
                );
                VoiceOutcome::Unrecognized
            }
        }
    }

    /// Drains `source` and handles every transcript in order.
    pub fn drain<S: TranscriptSource>(
        &mut self,
        source: &mut S,
        store: &DashboardStore,
        sound: &mut SoundService,
    ) -> Vec<VoiceOutcome> {
        let mut outcomes = Vec::new();
        while let Some(transcript) = source.poll_transcript() {
            outcomes.push(self.handle_transcript(&transcript, store, sound));
        }
        outcomes
    }
}
