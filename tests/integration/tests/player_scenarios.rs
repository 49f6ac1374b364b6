//! End-to-end playback scenarios over the fully wired player

use anyhow::Result;
use playerkit::{
    AudioState, ControlEvent, MediaEngine, PlayerConfig, PlayerEvent, PlayerState,
    TransportAffordance,
};
use playerkit_integration_tests::{record_events, Harness};

#[test]
fn test_prepare_play_stall_and_finish() {
    let h = Harness::new();
    let (events, _sub) = record_events(&h.view);

    assert_eq!(h.view.state(), PlayerState::Paused);
    assert_eq!(h.view.clock().duration, 60.0);

    h.view.control().play();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Playing);

    // Stall mid-stream: notification fires, state is untouched.
    h.engine.stall();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Playing);
    assert!(events
        .lock()
        .unwrap()
        .contains(&ControlEvent::Player(PlayerEvent::Stalled)));

    // Run the item out.
    h.engine.tick(120.0);
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Ended);
    assert_eq!(
        h.view.snapshot().affordance,
        TransportAffordance::Replay
    );

    // Replay returns to the start and resumes.
    h.view.control().toggle_play();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Playing);
    assert_eq!(h.view.clock().current_time, 0.0);
}

#[test]
fn test_failure_is_terminal_until_retry() {
    let h = Harness::new();
    let (events, _sub) = record_events(&h.view);

    h.view.control().play();
    h.engine.fail_playback("network reset");
    h.drain();

    assert_eq!(h.view.state(), PlayerState::Error);
    assert!(h.view.snapshot().error_visible);

    // Commands bounce off the failed session.
    h.view.control().play();
    h.view.control().toggle_play();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Error);

    // Retry builds a brand-new engine/attachment pair.
    h.view.retry();
    assert_eq!(*h.engines_built.lock().unwrap(), 1);
    assert!(!h.view.snapshot().error_visible);
    assert_eq!(h.view.state(), PlayerState::Idle);
    assert_eq!(h.engine.signals().subscriber_count(), 0);

    let failed = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| **e == ControlEvent::Player(PlayerEvent::Failed))
        .count();
    assert_eq!(failed, 1);
}

#[test]
fn test_mute_policy_and_toggling() {
    let h = Harness::new();

    // The attach policy muted the engine.
    assert_eq!(h.view.snapshot().audio_state, AudioState::Muted);

    let (events, _sub) = record_events(&h.view);
    h.view.control().toggle_mute();
    assert_eq!(h.view.snapshot().audio_state, AudioState::Unmuted);
    h.view.control().toggle_mute();
    assert_eq!(h.view.snapshot().audio_state, AudioState::Muted);

    let audio_changes = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, ControlEvent::Player(PlayerEvent::AudioStateChanged(_))))
        .count();
    assert_eq!(audio_changes, 2);
}

#[test]
fn test_scrub_and_step_seeks() {
    let h = Harness::new();
    h.view.control().play();
    h.engine.tick(5.0);
    h.drain();

    h.view.control().begin_seek();
    h.view.control().move_seek(42.0);
    h.engine.tick(1.0);
    h.drain();
    assert_eq!(h.view.snapshot().seek_position, 42.0);

    h.view.control().end_seek();
    h.drain();
    assert_eq!(h.view.clock().current_time, 42.0);

    h.view.control().step_backward();
    h.drain();
    assert_eq!(h.view.clock().current_time, 32.0);
}

#[test]
fn test_background_pause_policy() {
    let h = Harness::new();
    h.view.control().play();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Playing);

    h.view.control().did_enter_background();
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Paused);
}

#[test]
fn test_autoplay_configuration() {
    let mut config = PlayerConfig::default();
    config.playback.autoplay = true;
    let h = Harness::with_config(config);

    // The harness already delivered readiness; autoplay kicked in.
    h.drain();
    assert_eq!(h.view.state(), PlayerState::Playing);
}

#[test]
fn test_config_round_trip_through_disk() -> Result<()> {
    let dir = tempfile::TempDir::new()?;
    let path = dir.path().join("player.json");

    let mut config = PlayerConfig::default();
    config.playback.seek_step_secs = 5.0;
    config.playback.start_muted = false;
    config.save(&path)?;

    let loaded = PlayerConfig::load_or_default(&path)?;
    let h = Harness::with_config(loaded);

    // start_muted=false leaves the engine audible on attach.
    assert_eq!(h.view.snapshot().audio_state, AudioState::Unmuted);

    h.view.control().play();
    h.engine.tick(20.0);
    h.drain();
    h.view.control().step_backward();
    h.drain();
    assert_eq!(h.view.clock().current_time, 15.0);
    Ok(())
}
