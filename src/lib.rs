//! playerkit - an embeddable video player core
//!
//! Wraps an opaque platform media engine, derives one canonical playback
//! state from its asynchronous signals, drives a control surface view-model,
//! and coordinates moving the live video surface into and out of a full
//! screen presentation without interrupting playback.

pub mod dispatch;
pub mod engine;
pub mod events;
pub mod fullscreen;
pub mod orientation;
pub mod player;
pub mod surface;
pub mod utils;

pub use dispatch::Dispatcher;
pub use engine::{EngineSignal, ItemStatus, MediaEngine, SimulatedEngine, TimeControlStatus};
pub use events::{EventHub, Subscription};
pub use fullscreen::{
    FullScreenEvent, FullScreenSession, FullScreenTransitionCoordinator, OpenReason,
    PresenterResolver, TransitionPhase,
};
pub use orientation::{
    LoopbackOrientationController, Orientation, OrientationController, OrientationObserver,
};
pub use player::{
    AudioState, ControlEvent, ControlSnapshot, ControlSurface, EngineFactory, PlaybackClock,
    PlayerEvent, PlayerState, PlayerStateMachine, PlayerView, PlayerViewBuilder,
    TransportAffordance,
};
pub use surface::{
    AnimationDriver, ImmediateAnimator, QueuedAnimator, Rect, SurfaceContainer, VideoSurface,
};
pub use utils::{PlayerConfig, PlayerKitError, Result};
