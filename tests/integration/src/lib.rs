//! Integration test utilities for playerkit
//!
//! Provides a fully wired player harness: simulated engine, host view tree,
//! orientation loopback, and a drainable serial queue, so scenario tests can
//! drive the whole component the way a host app would.

use playerkit::{
    ControlEvent, Dispatcher, EngineFactory, ImmediateAnimator, LoopbackOrientationController,
    MediaEngine, Orientation, OrientationObserver, PlayerConfig, PlayerView, PresenterResolver,
    QueuedAnimator, Rect, SimulatedEngine, Subscription, SurfaceContainer, VideoSurface,
};
use std::sync::{Arc, Mutex};

/// Inline container frame used by the harness
pub const INLINE_FRAME: Rect = Rect {
    x: 0.0,
    y: 120.0,
    width: 390.0,
    height: 219.0,
};

/// Portrait screen bounds used by the harness
pub const SCREEN_BOUNDS: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 390.0,
    height: 844.0,
};

/// Landscape screen bounds used by the harness
pub const SCREEN_BOUNDS_LANDSCAPE: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 844.0,
    height: 390.0,
};

/// A fully wired player with a simulated engine attached and ready
pub struct Harness {
    pub dispatcher: Arc<Dispatcher>,
    pub screen: Arc<SurfaceContainer>,
    pub inline: Arc<SurfaceContainer>,
    pub surface: Arc<VideoSurface>,
    pub orientation: OrientationObserver,
    pub view: PlayerView,
    pub engine: Arc<SimulatedEngine>,
    pub engines_built: Arc<Mutex<usize>>,
}

impl Harness {
    /// Harness with synchronous (immediate) transition animations
    pub fn new() -> Self {
        Self::build(false, PlayerConfig::default())
    }

    /// Harness whose transition animations complete on the next drain
    pub fn animated() -> Self {
        Self::build(true, PlayerConfig::default())
    }

    /// Harness with a custom configuration
    pub fn with_config(config: PlayerConfig) -> Self {
        Self::build(false, config)
    }

    fn build(animated: bool, config: PlayerConfig) -> Self {
        let dispatcher = Dispatcher::new();
        let screen = SurfaceContainer::new("screen", SCREEN_BOUNDS);
        let inline = SurfaceContainer::new("inline", INLINE_FRAME);
        let surface = VideoSurface::attached(&inline, INLINE_FRAME);
        let orientation = OrientationObserver::new(Orientation::Portrait);

        let resolver: PresenterResolver = {
            let screen = Arc::clone(&screen);
            Arc::new(move || Some(Arc::clone(&screen)))
        };
        let engines_built = Arc::new(Mutex::new(0usize));
        let factory: EngineFactory = {
            let dispatcher = Arc::clone(&dispatcher);
            let engines_built = Arc::clone(&engines_built);
            Arc::new(move || {
                *engines_built.lock().unwrap() += 1;
                let engine: Arc<dyn MediaEngine> =
                    SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
                engine
            })
        };

        let mut builder = PlayerView::builder()
            .with_config(config)
            .with_surface(Arc::clone(&surface))
            .with_presenter_resolver(resolver)
            .with_orientation_observer(orientation.clone())
            .with_orientation_controller(LoopbackOrientationController::new(orientation.clone()))
            .with_engine_factory(factory);
        builder = if animated {
            builder.with_animator(Arc::new(QueuedAnimator::new(Arc::clone(&dispatcher))))
        } else {
            builder.with_animator(Arc::new(ImmediateAnimator))
        };
        let view = builder.build().expect("harness wiring is valid");

        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
        view.attach_engine(engine.clone());
        engine.make_ready();
        dispatcher.drain();

        Self {
            dispatcher,
            screen,
            inline,
            surface,
            orientation,
            view,
            engine,
            engines_built,
        }
    }

    /// Drain the serial queue
    pub fn drain(&self) {
        self.dispatcher.drain();
    }

    /// Rotate the device, updating the screen bounds the way a host would
    pub fn rotate(&self, orientation: Orientation) {
        if orientation.is_landscape() {
            self.screen.set_bounds(SCREEN_BOUNDS_LANDSCAPE);
        } else {
            self.screen.set_bounds(SCREEN_BOUNDS);
        }
        self.orientation.rotate_to(orientation);
        self.drain();
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Record every control event the view produces
pub fn record_events(view: &PlayerView) -> (Arc<Mutex<Vec<ControlEvent>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = view
        .events()
        .subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    (seen, sub)
}
