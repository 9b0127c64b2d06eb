use std::fmt;

use tracing::{debug, info};

use crate::elevator::ElevatorStatus;

/// Audio cues the dashboard can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    ElevatorMove,
    ElevatorArrive,
    DoorOpen,
    DoorClose,
    ButtonClick,
    Alarm,
    VoiceCommand,
    Connection,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::ElevatorMove,
        SoundEffect::ElevatorArrive,
        SoundEffect::DoorOpen,
        SoundEffect::DoorClose,
        SoundEffect::ButtonClick,
        SoundEffect::Alarm,
        SoundEffect::VoiceCommand,
        SoundEffect::Connection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::ElevatorMove => "elevator-move",
            SoundEffect::ElevatorArrive => "elevator-arrive",
            SoundEffect::DoorOpen => "door-open",
            SoundEffect::DoorClose => "door-close",
            SoundEffect::ButtonClick => "button-click",
            SoundEffect::Alarm => "alarm",
            SoundEffect::VoiceCommand => "voice-command",
            SoundEffect::Connection => "connection",
        }
    }
}

impl fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Cues for the change from `prev` to `next`: departure, arrival and door
/// movement.
pub fn transition_cues(prev: &ElevatorStatus, next: &ElevatorStatus) -> Vec<SoundEffect> {
    let mut cues = Vec::new();
    match (prev.state.is_moving(), next.state.is_moving()) {
        (false, true) => cues.push(SoundEffect::ElevatorMove),
        (true, false) => cues.push(SoundEffect::ElevatorArrive),
        _ => {}
    }
    match (prev.door_open(), next.door_open()) {
        (false, true) => cues.push(SoundEffect::DoorOpen),
        (true, false) => cues.push(SoundEffect::DoorClose),
        _ => {}
    }
    if next.emergency && !prev.emergency {
        cues.push(SoundEffect::Alarm);
    }
    cues
}

/// Output device for sound cues.
pub trait SoundPlayer: Send {
    fn play(&mut self, effect: SoundEffect);
}

/// Player that writes every cue to the log.
#[derive(Debug, Default)]
pub struct TracingPlayer;

impl SoundPlayer for TracingPlayer {
    fn play(&mut self, effect: SoundEffect) {
        info!(sound = %effect, "Playing sound");
    }
}

pub struct SoundService {
    muted: bool,
    player: Box<dyn SoundPlayer>,
}

impl Default for SoundService {
    fn default() -> Self {
        Self::new(Box::new(TracingPlayer), false)
    }
}

impl SoundService {
    pub fn new(player: Box<dyn SoundPlayer>, muted: bool) -> Self {
        Self { muted, player }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            debug!("Muted, skipping {}", effect);
            return;
        }
        self.player.play(effect);
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Flips the mute flag and returns the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}
