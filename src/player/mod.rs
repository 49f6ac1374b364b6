//! Player core module for playerkit
//!
//! This module derives one canonical playback state from the media engine's
//! raw signal soup and exposes it to consumers through typed events. It also
//! hosts the control surface view-model and the high-level player facade.

mod control_surface;
mod player_view;
mod state_machine;

pub use control_surface::{
    ControlEvent, ControlSnapshot, ControlSurface, EngineFactory, TransportAffordance,
};
pub use player_view::{PlayerView, PlayerViewBuilder};
pub use state_machine::PlayerStateMachine;

/// Canonical playback state
///
/// Ordered by typical progression, but transitions are event-driven rather
/// than strictly linear. `Error` is terminal until a fresh engine is
/// attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// No engine attached, or engine attached but not yet ready
    Idle,

    /// The engine wants to play but is waiting for buffered media
    Buffering,

    /// Playback is advancing
    Playing,

    /// Playback is paused
    Paused,

    /// Playback reached the end of the item
    Ended,

    /// Playback failed; recoverable only by attaching a fresh engine
    Error,
}

/// Audio mute state, derived from the engine's mute flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioState {
    /// Audio output muted
    Muted,

    /// Audio output audible
    Unmuted,
}

/// Time values refreshed by periodic ticks and completed seeks
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackClock {
    /// Current playback position in seconds
    pub current_time: f64,

    /// Upper bound of the buffered range in seconds
    pub buffered_upper_bound: f64,

    /// Item duration in seconds, 0.0 when unknown
    pub duration: f64,
}

/// Notifications emitted by the player state machine
///
/// Each fires at most once per underlying change; notifications for
/// unchanged values are suppressed.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The engine became ready; fired once per engine attachment
    Prepared,

    /// Playback failed
    Failed,

    /// Periodic refresh of the playback clock
    PeriodicTick(PlaybackClock),

    /// The canonical playback state changed
    StateChanged(PlayerState),

    /// The derived audio state changed
    AudioStateChanged(AudioState),

    /// The user-requested playback rate changed
    RateChanged(f32),

    /// The actual instantaneous playback rate changed
    EffectiveRateChanged(f32),

    /// Playback stalled; the playback state is not altered
    Stalled,

    /// The playback time moved discontinuously
    TimeJumped,
}
