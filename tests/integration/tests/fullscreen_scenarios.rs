//! End-to-end full screen scenarios over the fully wired player

use playerkit::{
    ControlEvent, FullScreenEvent, OpenReason, Orientation, PlayerState, Rect, TransitionPhase,
};
use playerkit_integration_tests::{
    record_events, Harness, INLINE_FRAME, SCREEN_BOUNDS_LANDSCAPE,
};

#[test]
fn test_user_round_trip_restores_geometry_and_playback() {
    let h = Harness::new();
    let (events, _sub) = record_events(&h.view);

    h.view.control().play();
    h.drain();

    h.view.control().open_full_screen();
    h.drain();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Open);
    assert_eq!(h.surface.parent().unwrap().name(), "screen");
    // Playback was paused for the transition and resumed on presentation.
    assert_eq!(h.view.state(), PlayerState::Playing);

    h.view.control().close_full_screen();
    h.drain();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
    assert_eq!(h.surface.parent().unwrap().name(), "inline");
    assert_eq!(h.surface.frame(), INLINE_FRAME);

    let lifecycle: Vec<FullScreenEvent> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            ControlEvent::FullScreen(fs) => Some(*fs),
            _ => None,
        })
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            FullScreenEvent::WillPresent,
            FullScreenEvent::DidPresent,
            FullScreenEvent::WillDismiss,
            FullScreenEvent::DidDismiss,
        ]
    );
}

#[test]
fn test_rotation_opens_and_closes_a_session() {
    let h = Harness::new();

    h.rotate(Orientation::LandscapeLeft);
    assert!(h.view.control().is_expand());
    assert_eq!(
        h.view.coordinator().session_reason(),
        Some(OpenReason::DeviceRotation)
    );
    // Landscape presentation goes edge-to-edge.
    assert_eq!(h.surface.frame(), SCREEN_BOUNDS_LANDSCAPE);

    h.rotate(Orientation::Portrait);
    assert!(!h.view.control().is_expand());
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
    assert_eq!(h.surface.parent().unwrap().name(), "inline");
    assert_eq!(h.surface.frame(), INLINE_FRAME);
}

#[test]
fn test_orientation_bounce_does_not_evict_a_user_session() {
    let h = Harness::new();

    h.view.control().open_full_screen();
    assert_eq!(h.view.coordinator().session_reason(), Some(OpenReason::User));

    h.rotate(Orientation::LandscapeLeft);
    h.rotate(Orientation::Portrait);
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Open);

    h.view.control().close_full_screen();
    h.drain();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
}

#[test]
fn test_user_close_rides_the_rotation_handshake() {
    let h = Harness::new();

    h.view.control().open_full_screen();
    h.rotate(Orientation::LandscapeRight);
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Open);

    // Close from landscape: the coordinator requests the portrait
    // orientation captured at open time and resumes from its confirmation.
    h.view.control().close_full_screen();
    h.drain();
    assert_eq!(h.orientation.current(), Orientation::Portrait);
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
    assert_eq!(h.surface.parent().unwrap().name(), "inline");
}

#[test]
fn test_programmatic_expand_round_trip() {
    let h = Harness::new();
    let (events, _sub) = record_events(&h.view);

    h.view.control().set_expand(true);
    h.drain();
    assert_eq!(
        h.view.coordinator().session_reason(),
        Some(OpenReason::ProgrammaticExpand)
    );
    assert!(events
        .lock()
        .unwrap()
        .contains(&ControlEvent::ExpandStateChanged(true)));

    h.view.control().set_expand(false);
    h.drain();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
}

#[test]
fn test_close_during_open_animation_waits_for_the_open() {
    let h = Harness::animated();

    h.view.control().open_full_screen();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Opening);

    h.view.control().close_full_screen();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Opening);

    h.drain();
    assert_eq!(h.view.fullscreen_phase(), TransitionPhase::Closed);
    assert_eq!(h.surface.parent().unwrap().name(), "inline");
    assert_eq!(h.surface.frame(), INLINE_FRAME);
}

#[test]
fn test_portrait_presentation_letterboxes_16_9() {
    let h = Harness::new();

    h.view.control().open_full_screen();
    h.drain();
    let bounds = h.screen.bounds();
    assert_eq!(h.surface.frame(), Rect::aspect_fit_16_9(bounds));
    assert!(h.view.coordinator().close_affordance_visible());

    h.rotate(Orientation::LandscapeLeft);
    assert_eq!(h.surface.frame(), SCREEN_BOUNDS_LANDSCAPE);
    assert!(!h.view.coordinator().close_affordance_visible());
}
