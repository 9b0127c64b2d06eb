//! Voice control against a connected store.

use elevator_dashboard::elevator::{DoorAction, ElevatorCommand, ModeAction};
use elevator_dashboard::mqtt::topics;
use elevator_dashboard::sound::{SoundEffect, SoundService};
use elevator_dashboard::voice::{TypedTranscripts, VoiceControl, VoiceOutcome};

use crate::mock_transport::{eventually, MockBroker, RecordingPlayer};
use crate::store_tests::{attach, connected};

fn sound() -> (SoundService, RecordingPlayer) {
    let player = RecordingPlayer::default();
    (SoundService::new(Box::new(player.clone()), false), player)
}

#[tokio::test]
async fn recognized_transcript_issues_command() {
    let setup = connected().await;
    let (mut sound, player) = sound();
    let mut voice = VoiceControl::new(true);

    let outcome = voice.handle_transcript("Call elevator to floor 2", &setup.store, &mut sound);
    assert_eq!(outcome, VoiceOutcome::Issued(ElevatorCommand::Floor(2)));
    assert_eq!(voice.last_transcript(), Some("Call elevator to floor 2"));
    assert_eq!(voice.last_command(), Some(ElevatorCommand::Floor(2)));
    assert_eq!(player.played(), vec![SoundEffect::VoiceCommand]);

    let broker = setup.broker.clone();
    assert!(eventually(|| !broker.publishes().is_empty()).await);
    assert_eq!(
        setup.broker.publishes(),
        vec![(topics::COMMAND.to_string(), r#"{"floor":2}"#.to_string())]
    );
    assert!(setup
        .store
        .snapshot()
        .notices
        .iter()
        .any(|n| n.title == "Voice Command Recognized"));
}

#[tokio::test]
async fn unrecognized_transcript_only_notifies() {
    let setup = connected().await;
    let (mut sound, _player) = sound();
    let mut voice = VoiceControl::new(true);

    assert_eq!(
        voice.handle_transcript("do a barrel roll", &setup.store, &mut sound),
        VoiceOutcome::Unrecognized
    );
    assert_eq!(voice.last_command(), None);

    let state = setup.store.snapshot();
    let misses = state
        .notices
        .iter()
        .filter(|n| n.title == "Voice Command Not Recognized")
        .count();
    assert_eq!(misses, 1);
    setup.handle.disconnect().await;
    assert!(setup.broker.publishes().is_empty());
}

#[tokio::test]
async fn missing_floor_is_dropped_quietly() {
    let setup = connected().await;
    let (mut sound, _player) = sound();
    let mut voice = VoiceControl::new(true);
    let before = setup.store.snapshot().notices.len();

    assert_eq!(
        voice.handle_transcript("floor 9", &setup.store, &mut sound),
        VoiceOutcome::Ignored
    );
    assert_eq!(
        voice.handle_transcript("take me to the top floor", &setup.store, &mut sound),
        VoiceOutcome::Ignored
    );
    assert_eq!(voice.last_transcript(), Some("take me to the top floor"));
    assert_eq!(voice.last_command(), None);
    assert_eq!(setup.store.snapshot().notices.len(), before);

    setup.handle.disconnect().await;
    assert!(setup.broker.publishes().is_empty());
}

#[tokio::test]
async fn transcript_while_disconnected_is_refused() {
    let setup = attach(MockBroker::auto_ack());
    let (mut sound, player) = sound();
    let mut voice = VoiceControl::new(true);

    assert_eq!(
        voice.handle_transcript("open the door please", &setup.store, &mut sound),
        VoiceOutcome::NotConnected
    );
    assert!(player.played().is_empty());
    assert_eq!(voice.last_transcript(), None);
    assert!(setup
        .store
        .snapshot()
        .notices
        .iter()
        .any(|n| n.title == "Not Connected"));
}

#[tokio::test]
async fn unsupported_voice_does_nothing() {
    let setup = connected().await;
    let (mut sound, player) = sound();
    let mut voice = VoiceControl::new(false);

    assert_eq!(
        voice.handle_transcript("floor 1", &setup.store, &mut sound),
        VoiceOutcome::Unsupported
    );
    assert!(player.played().is_empty());
}

#[tokio::test]
async fn typed_transcripts_drain_in_order() {
    let setup = connected().await;
    let (mut sound, _player) = sound();
    let mut voice = VoiceControl::new(true);
    let mut typed = TypedTranscripts::default();
    typed.submit("open the door please");
    typed.submit("stop emergency");
    typed.submit("start maintenance");

    let outcomes = voice.drain(&mut typed, &setup.store, &mut sound);
    assert_eq!(
        outcomes,
        vec![
            VoiceOutcome::Issued(ElevatorCommand::Door(DoorAction::Open)),
            VoiceOutcome::Issued(ElevatorCommand::Emergency(ModeAction::Deactivate)),
            VoiceOutcome::Issued(ElevatorCommand::Maintenance(ModeAction::Activate)),
        ]
    );

    let broker = setup.broker.clone();
    assert!(eventually(|| broker.publishes().len() == 3).await);
    assert_eq!(
        setup.broker.publishes()[1],
        (topics::EMERGENCY.to_string(), "deactivate".to_string())
    );
}
