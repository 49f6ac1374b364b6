use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use playerkit::{
    ControlEvent, Dispatcher, EngineFactory, FullScreenEvent, LoopbackOrientationController,
    MediaEngine, Orientation, OrientationObserver, PlayerConfig, PlayerEvent, PlayerView,
    PresenterResolver, QueuedAnimator, Rect, SimulatedEngine, SurfaceContainer, VideoSurface,
};
use std::sync::Arc;
use std::time::Duration;

/// playerkit demo - scripted playback against a simulated engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Simulated item duration in seconds
    #[arg(short, long, default_value = "12.0")]
    duration: f64,

    /// Start unmuted
    #[arg(long)]
    unmuted: bool,

    /// Fail playback mid-stream to demonstrate the retry path
    #[arg(long)]
    fail_midway: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting playerkit demo v{}", env!("CARGO_PKG_VERSION"));

    let mut config = PlayerConfig::load_or_default(&PlayerConfig::default_path())?;
    config.playback.start_muted = !args.unmuted;

    // Host view tree: an inline container inside a portrait screen.
    let screen = SurfaceContainer::new("screen", Rect::new(0.0, 0.0, 390.0, 844.0));
    let inline = SurfaceContainer::new("inline", Rect::new(0.0, 120.0, 390.0, 219.0));
    let surface = VideoSurface::attached(&inline, inline.bounds());

    let dispatcher = Dispatcher::new();
    let orientation = OrientationObserver::new(Orientation::Portrait);

    let resolver: PresenterResolver = {
        let screen = Arc::clone(&screen);
        Arc::new(move || Some(Arc::clone(&screen)))
    };
    let factory: EngineFactory = {
        let dispatcher = Arc::clone(&dispatcher);
        let duration = args.duration;
        Arc::new(move || {
            let engine: Arc<dyn MediaEngine> =
                SimulatedEngine::new(Arc::clone(&dispatcher), duration);
            engine
        })
    };

    let view = PlayerView::builder()
        .with_config(config.clone())
        .with_surface(Arc::clone(&surface))
        .with_presenter_resolver(resolver)
        .with_animator(Arc::new(QueuedAnimator::new(Arc::clone(&dispatcher))))
        .with_orientation_observer(orientation.clone())
        .with_orientation_controller(LoopbackOrientationController::new(orientation.clone()))
        .with_engine_factory(factory)
        .build()?;

    let _events = view.events().subscribe(|event| match event {
        ControlEvent::Player(PlayerEvent::Prepared) => info!("prepared"),
        ControlEvent::Player(PlayerEvent::Failed) => info!("playback failed"),
        ControlEvent::Player(PlayerEvent::StateChanged(state)) => {
            info!("player state: {:?}", state)
        }
        ControlEvent::Player(PlayerEvent::AudioStateChanged(audio)) => {
            info!("audio state: {:?}", audio)
        }
        ControlEvent::Player(PlayerEvent::Stalled) => info!("stalled"),
        ControlEvent::ExpandStateChanged(expand) => info!("expand: {}", expand),
        ControlEvent::FullScreen(FullScreenEvent::DidPresent) => info!("full screen open"),
        ControlEvent::FullScreen(FullScreenEvent::DidDismiss) => info!("full screen closed"),
        ControlEvent::SettingsRequested => info!("settings sheet requested"),
        _ => {}
    });

    let engine = SimulatedEngine::new(Arc::clone(&dispatcher), args.duration);
    view.attach_engine(engine.clone());
    engine.make_ready();
    dispatcher.drain();

    view.control().play();
    dispatcher.drain();

    let tick = config.playback.tick_interval_secs;
    let total_ticks = (args.duration / tick).ceil() as u32 + 4;
    for step in 0..total_ticks {
        tokio::time::sleep(Duration::from_secs_f64(tick)).await;
        engine.tick(tick);
        dispatcher.drain();

        let elapsed = f64::from(step) * tick;
        if args.fail_midway && elapsed >= args.duration / 2.0 {
            engine.fail_playback("simulated mid-stream fault");
            dispatcher.drain();
            info!("retrying with a fresh engine");
            view.retry();
            break;
        }

        // Script: rotate to landscape a third of the way in, back shortly after.
        if step == total_ticks / 3 {
            screen.set_bounds(Rect::new(0.0, 0.0, 844.0, 390.0));
            orientation.rotate_to(Orientation::LandscapeLeft);
            dispatcher.drain();
        }
        if step == total_ticks / 2 {
            screen.set_bounds(Rect::new(0.0, 0.0, 390.0, 844.0));
            orientation.rotate_to(Orientation::Portrait);
            dispatcher.drain();
        }
    }

    let snapshot = view.snapshot();
    info!(
        "done: state {:?}, position {:.1}s of {:.1}s, surface in {:?}",
        view.state(),
        snapshot.seek_position,
        snapshot.duration,
        surface.parent().map(|p| p.name().to_string()),
    );
    Ok(())
}
