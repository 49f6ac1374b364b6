//! Media engine facade for playerkit
//!
//! The platform media object is an opaque collaborator. This module defines
//! the trait the core observes and commands it through, and the typed signal
//! grammar it emits. Adapters are responsible for re-dispatching their
//! signals onto the player's serial queue before emitting them.

pub mod sim;

pub use sim::SimulatedEngine;

use crate::events::EventHub;

/// Completion callback for a seek command, called with whether the seek
/// finished (false when it was superseded or the engine was torn down)
pub type SeekCompletion = Box<dyn FnOnce(bool) + Send>;

/// Load status of the current media item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// Status not yet determined
    Unknown,

    /// Item can be played
    ReadyToPlay,

    /// Item can no longer be played
    Failed,
}

/// The engine's own classification of what it is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeControlStatus {
    /// Playback is paused
    Paused,

    /// Playback is advancing at the requested rate
    Playing,

    /// The engine wants to play but is waiting for buffered media
    WaitingToPlayAtRate,
}

/// Raw asynchronous signals emitted by a media engine
///
/// Signals arrive independently; the player state machine is the single
/// consumer that reconciles them into one canonical state.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineSignal {
    /// The media item's load status changed
    ItemStatusChanged(ItemStatus),

    /// The user-requested playback rate changed
    RateChanged(f32),

    /// The engine's playback classification changed
    TimeControlStatusChanged(TimeControlStatus),

    /// Playback stalled waiting for media data
    PlaybackStalled,

    /// Playback reached the end of the item
    DidPlayToEnd,

    /// Playback failed before reaching the end of the item
    DidFailToPlayToEnd(String),

    /// The actual instantaneous playback rate changed (zero while buffering)
    EffectiveRateChanged(f32),

    /// Fixed-interval time callback carrying the current playback time
    PeriodicTick(f64),

    /// The playback time moved discontinuously (seek landed)
    TimeJumped,
}

/// Facade over a platform media object
///
/// Queries are synchronous reads of engine-owned values; commands are
/// fire-and-forget except for [`MediaEngine::seek`], which reports through a
/// completion callback delivered on the serial queue.
pub trait MediaEngine: Send + Sync {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Duration of the current item in seconds, 0.0 when unknown
    fn duration(&self) -> f64;

    /// Upper bound of the buffered range in seconds
    fn buffered_upper_bound(&self) -> f64;

    /// User-requested playback rate
    fn rate(&self) -> f32;

    /// Whether audio output is muted
    fn is_muted(&self) -> bool;

    /// Begin or resume playback
    fn play(&self);

    /// Pause playback
    fn pause(&self);

    /// Mute or unmute audio output
    fn set_muted(&self, muted: bool);

    /// Seek to `target` seconds with the given tolerances in seconds
    ///
    /// A zero tolerance on both sides requests a frame-accurate seek. The
    /// adapter clamps out-of-range targets; callers pass them through
    /// unvalidated. The completion runs on the serial queue, and a new seek
    /// does not cancel the completion of a prior in-flight one.
    fn seek(
        &self,
        target: f64,
        tolerance_before: f64,
        tolerance_after: f64,
        completion: SeekCompletion,
    );

    /// Subscription interface for the engine's signal stream
    fn signals(&self) -> &EventHub<EngineSignal>;
}
