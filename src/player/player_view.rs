//! High-level player facade
//!
//! Wires the state machine, control surface, full screen coordinator, and
//! orientation observer into one embeddable component. Hosts construct it
//! through [`PlayerViewBuilder`], injecting the platform capabilities
//! (presenter resolution, animation, orientation control) as values.

use crate::engine::MediaEngine;
use crate::events::EventHub;
use crate::fullscreen::{FullScreenTransitionCoordinator, PresenterResolver, TransitionPhase};
use crate::orientation::{
    LoopbackOrientationController, Orientation, OrientationController, OrientationObserver,
};
use crate::player::{
    ControlEvent, ControlSnapshot, ControlSurface, EngineFactory, PlaybackClock,
    PlayerState, PlayerStateMachine,
};
use crate::surface::{AnimationDriver, ImmediateAnimator, VideoSurface};
use crate::utils::error::{PlayerKitError, Result};
use crate::utils::PlayerConfig;
use log::info;
use std::sync::Arc;

/// Builder for a [`PlayerView`]
pub struct PlayerViewBuilder {
    config: PlayerConfig,
    surface: Option<Arc<VideoSurface>>,
    presenter_resolver: Option<PresenterResolver>,
    animator: Option<Arc<dyn AnimationDriver>>,
    orientation: Option<OrientationObserver>,
    orientation_ctl: Option<Arc<dyn OrientationController>>,
    engine_factory: Option<EngineFactory>,
}

impl Default for PlayerViewBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerViewBuilder {
    pub fn new() -> Self {
        Self {
            config: PlayerConfig::default(),
            surface: None,
            presenter_resolver: None,
            animator: None,
            orientation: None,
            orientation_ctl: None,
            engine_factory: None,
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the live video surface (required)
    pub fn with_surface(mut self, surface: Arc<VideoSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Set the presenter resolution capability (required)
    pub fn with_presenter_resolver(mut self, resolver: PresenterResolver) -> Self {
        self.presenter_resolver = Some(resolver);
        self
    }

    /// Set the animation driver; defaults to an immediate one
    pub fn with_animator(mut self, animator: Arc<dyn AnimationDriver>) -> Self {
        self.animator = Some(animator);
        self
    }

    /// Set the orientation observer; defaults to a portrait-initialized one
    pub fn with_orientation_observer(mut self, observer: OrientationObserver) -> Self {
        self.orientation = Some(observer);
        self
    }

    /// Set the platform rotation capability; defaults to a loopback
    /// controller over the orientation observer
    pub fn with_orientation_controller(mut self, controller: Arc<dyn OrientationController>) -> Self {
        self.orientation_ctl = Some(controller);
        self
    }

    /// Set the factory used by `retry` to rebuild the engine
    pub fn with_engine_factory(mut self, factory: EngineFactory) -> Self {
        self.engine_factory = Some(factory);
        self
    }

    /// Build the player view
    pub fn build(self) -> Result<PlayerView> {
        if self.config.playback.tick_interval_secs <= 0.0 {
            return Err(PlayerKitError::InvalidInput(
                "tick interval must be positive".to_string(),
            ));
        }
        if self.config.playback.seek_step_secs < 0.0 {
            return Err(PlayerKitError::InvalidInput(
                "seek step must not be negative".to_string(),
            ));
        }
        let surface = self.surface.ok_or_else(|| {
            PlayerKitError::InvalidInput("a video surface is required".to_string())
        })?;
        let presenter_resolver = self.presenter_resolver.ok_or_else(|| {
            PlayerKitError::InvalidInput("a presenter resolver is required".to_string())
        })?;

        let orientation = self
            .orientation
            .unwrap_or_else(|| OrientationObserver::new(Orientation::Portrait));
        let orientation_ctl: Arc<dyn OrientationController> = match self.orientation_ctl {
            Some(controller) => controller,
            None => LoopbackOrientationController::new(orientation.clone()),
        };
        let animator: Arc<dyn AnimationDriver> = match self.animator {
            Some(animator) => animator,
            None => Arc::new(ImmediateAnimator),
        };

        let machine = PlayerStateMachine::new();
        let coordinator = FullScreenTransitionCoordinator::new(
            surface,
            Arc::clone(&presenter_resolver),
            animator,
            orientation.clone(),
            orientation_ctl,
        );
        let control = ControlSurface::new(
            machine.clone(),
            coordinator.clone(),
            orientation.clone(),
            presenter_resolver,
            self.engine_factory,
            self.config.clone(),
        );

        info!("player view assembled");
        Ok(PlayerView {
            machine,
            control,
            coordinator,
            orientation,
            config: self.config,
        })
    }
}

/// One embeddable player instance
pub struct PlayerView {
    machine: PlayerStateMachine,
    control: ControlSurface,
    coordinator: FullScreenTransitionCoordinator,
    orientation: OrientationObserver,
    config: PlayerConfig,
}

impl std::fmt::Debug for PlayerView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerView").finish_non_exhaustive()
    }
}

impl PlayerView {
    pub fn builder() -> PlayerViewBuilder {
        PlayerViewBuilder::new()
    }

    /// Attach a media engine, applying the configured attach policy
    pub fn attach_engine(&self, engine: Arc<dyn MediaEngine>) {
        self.control.attach_engine(engine);
    }

    /// Rebuild the engine after a playback failure
    pub fn retry(&self) {
        self.control.retry();
    }

    /// Events for the host renderer
    pub fn events(&self) -> &EventHub<ControlEvent> {
        self.control.events()
    }

    /// Current renderable control state
    pub fn snapshot(&self) -> ControlSnapshot {
        self.control.snapshot()
    }

    /// Canonical playback state
    pub fn state(&self) -> PlayerState {
        self.machine.state()
    }

    /// Latest playback clock values
    pub fn clock(&self) -> PlaybackClock {
        self.machine.clock()
    }

    /// Full screen lifecycle phase
    pub fn fullscreen_phase(&self) -> TransitionPhase {
        self.coordinator.phase()
    }

    /// The state machine, for direct command access
    pub fn machine(&self) -> &PlayerStateMachine {
        &self.machine
    }

    /// The control surface, for user intents
    pub fn control(&self) -> &ControlSurface {
        &self.control
    }

    /// The full screen coordinator
    pub fn coordinator(&self) -> &FullScreenTransitionCoordinator {
        &self.coordinator
    }

    /// The orientation observer the platform should feed
    pub fn orientation(&self) -> &OrientationObserver {
        &self.orientation
    }

    /// The configuration the view was built with
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::Dispatcher;
    use crate::engine::SimulatedEngine;
    use crate::surface::{Rect, SurfaceContainer};

    fn parts() -> (Arc<Dispatcher>, Arc<SurfaceContainer>, Arc<SurfaceContainer>, Arc<VideoSurface>) {
        let dispatcher = Dispatcher::new();
        let inline = SurfaceContainer::new("inline", Rect::new(0.0, 100.0, 320.0, 180.0));
        let screen = SurfaceContainer::new("screen", Rect::new(0.0, 0.0, 320.0, 640.0));
        let surface = VideoSurface::attached(&inline, inline.bounds());
        (dispatcher, inline, screen, surface)
    }

    #[test]
    fn test_builder_requires_a_surface() {
        let err = PlayerView::builder().build().unwrap_err();
        assert!(matches!(err, PlayerKitError::InvalidInput(_)));
    }

    #[test]
    fn test_builder_rejects_bad_tick_interval() {
        let (_dispatcher, _inline, screen, surface) = parts();
        let mut config = PlayerConfig::default();
        config.playback.tick_interval_secs = 0.0;

        let resolver: PresenterResolver = Arc::new(move || Some(Arc::clone(&screen)));
        let err = PlayerView::builder()
            .with_surface(surface)
            .with_presenter_resolver(resolver)
            .with_config(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, PlayerKitError::InvalidInput(_)));
    }

    #[test]
    fn test_built_view_plays_end_to_end() {
        let (dispatcher, _inline, screen, surface) = parts();
        let resolver: PresenterResolver = Arc::new(move || Some(Arc::clone(&screen)));

        let view = PlayerView::builder()
            .with_surface(surface)
            .with_presenter_resolver(resolver)
            .build()
            .unwrap();

        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
        view.attach_engine(engine.clone());
        engine.make_ready();
        dispatcher.drain();
        assert_eq!(view.state(), PlayerState::Paused);

        view.control().play();
        engine.tick(1.0);
        dispatcher.drain();
        assert_eq!(view.state(), PlayerState::Playing);
        assert_eq!(view.clock().current_time, 1.0);

        view.control().open_full_screen();
        dispatcher.drain();
        assert_eq!(view.fullscreen_phase(), TransitionPhase::Open);

        view.control().close_full_screen();
        dispatcher.drain();
        assert_eq!(view.fullscreen_phase(), TransitionPhase::Closed);
    }
}
