//! Control surface view-model
//!
//! Sits between the state machine and whatever renders the controls. It
//! consumes player, full screen, and orientation events, keeps the
//! renderable control state (overlay visibility, seek/buffer bars, error
//! affordance), and turns user intents into machine and coordinator
//! commands. The expand flag lives here, per player view instance.

use crate::engine::MediaEngine;
use crate::events::{EventHub, Subscription};
use crate::fullscreen::{
    FullScreenEvent, FullScreenTransitionCoordinator, OpenReason, PresenterResolver,
    TransitionPhase,
};
use crate::orientation::{Orientation, OrientationObserver};
use crate::player::{AudioState, PlayerEvent, PlayerState, PlayerStateMachine};
use crate::utils::PlayerConfig;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Builds a fresh media engine, used by `retry` after a playback failure
pub type EngineFactory = Arc<dyn Fn() -> Arc<dyn MediaEngine> + Send + Sync>;

/// What the primary transport button should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAffordance {
    Play,
    Pause,
    Replay,
}

/// Events produced for the host renderer
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Forwarded state machine notification
    Player(PlayerEvent),

    /// The expand flag changed
    ExpandStateChanged(bool),

    /// Forwarded full screen lifecycle notification
    FullScreen(FullScreenEvent),

    /// The user asked for the settings sheet and a presenter is available
    SettingsRequested,
}

/// Renderable control state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    /// Seek bar position: the scrub position while seeking, the playback
    /// clock otherwise
    pub seek_position: f64,

    /// Buffer bar position
    pub buffer_position: f64,

    /// Seek and buffer bar maximum
    pub duration: f64,

    /// Whether the control overlay is shown
    pub overlay_visible: bool,

    /// Whether the transport buttons are shown (hidden while scrubbing)
    pub transport_buttons_visible: bool,

    /// Whether the error affordance replaces the seek and buffer bars
    pub error_visible: bool,

    /// Whether inline chrome reacts to taps (disabled during full screen)
    pub inline_chrome_enabled: bool,

    /// The expand flag
    pub is_expand: bool,

    /// Whether a scrub gesture is in progress
    pub is_seeking: bool,

    /// Primary transport button rendering
    pub affordance: TransportAffordance,

    /// Mute button rendering
    pub audio_state: AudioState,
}

/// The control surface for one player view
///
/// Cheap to clone; clones share the same surface.
#[derive(Clone)]
pub struct ControlSurface {
    core: Arc<ControlCore>,
}

struct ControlCore {
    machine: PlayerStateMachine,
    coordinator: FullScreenTransitionCoordinator,
    presenter_resolver: PresenterResolver,
    engine_factory: Option<EngineFactory>,
    config: PlayerConfig,
    events: EventHub<ControlEvent>,
    state: Mutex<ControlState>,
}

struct ControlState {
    is_expand: bool,
    is_seeking: bool,
    scrub_position: f64,
    overlay_visible: bool,
    transport_buttons_visible: bool,
    error_visible: bool,
    inline_chrome_enabled: bool,
    resume_on_present: bool,
    /// Keeps the machine/coordinator/orientation subscriptions alive
    #[allow(dead_code)]
    subs: Vec<Subscription>,
}

impl ControlSurface {
    pub fn new(
        machine: PlayerStateMachine,
        coordinator: FullScreenTransitionCoordinator,
        orientation: OrientationObserver,
        presenter_resolver: PresenterResolver,
        engine_factory: Option<EngineFactory>,
        config: PlayerConfig,
    ) -> Self {
        let core = Arc::new(ControlCore {
            machine,
            coordinator,
            presenter_resolver,
            engine_factory,
            config,
            events: EventHub::new(),
            state: Mutex::new(ControlState {
                is_expand: false,
                is_seeking: false,
                scrub_position: 0.0,
                overlay_visible: false,
                transport_buttons_visible: true,
                error_visible: false,
                inline_chrome_enabled: true,
                resume_on_present: false,
                subs: Vec::new(),
            }),
        });

        let weak = Arc::downgrade(&core);
        let machine_sub = core.machine.events().subscribe(move |event| {
            let Some(core) = weak.upgrade() else { return };
            core.handle_player_event(event);
        });

        let weak = Arc::downgrade(&core);
        let fullscreen_sub = core.coordinator.events().subscribe(move |event| {
            let Some(core) = weak.upgrade() else { return };
            core.handle_fullscreen_event(event);
        });

        let weak = Arc::downgrade(&core);
        let orientation_sub = orientation.events().subscribe(move |new_orientation| {
            let Some(core) = weak.upgrade() else { return };
            core.handle_orientation_changed(*new_orientation);
        });

        core.state.lock().subs = vec![machine_sub, fullscreen_sub, orientation_sub];
        Self { core }
    }

    /// Events for the host renderer
    pub fn events(&self) -> &EventHub<ControlEvent> {
        &self.core.events
    }

    /// Current renderable control state
    pub fn snapshot(&self) -> ControlSnapshot {
        self.core.snapshot()
    }

    /// Attach a fresh media engine, applying the configured attach policy
    pub fn attach_engine(&self, engine: Arc<dyn MediaEngine>) {
        self.core.attach_engine(engine);
    }

    /// Rebuild the engine after a playback failure
    ///
    /// The state machine never retries on its own; this is the only
    /// recovery path, and it requires an engine factory.
    pub fn retry(&self) {
        let Some(factory) = self.core.engine_factory.clone() else {
            warn!("retry requested but no engine factory was provided");
            return;
        };
        info!("rebuilding media engine after playback failure");
        self.core.attach_engine(factory());
    }

    /// Primary transport button tap
    pub fn toggle_play(&self) {
        match self.core.machine.state() {
            PlayerState::Playing => self.core.machine.pause(),
            PlayerState::Paused => self.core.machine.play(),
            PlayerState::Ended => self.core.machine.replay(),
            _ => {}
        }
    }

    pub fn play(&self) {
        self.core.machine.play();
    }

    pub fn pause(&self) {
        self.core.machine.pause();
    }

    /// Seek forward by the configured step
    pub fn step_forward(&self) {
        let target = self.core.machine.clock().current_time + self.core.config.playback.seek_step_secs;
        self.core.machine.seek(target, |_| {});
    }

    /// Seek backward by the configured step
    pub fn step_backward(&self) {
        let target = self.core.machine.clock().current_time - self.core.config.playback.seek_step_secs;
        self.core.machine.seek(target, |_| {});
    }

    pub fn toggle_mute(&self) {
        self.core.machine.toggle_mute();
    }

    /// A scrub gesture started: freeze the seek bar and hide the transport
    /// buttons until the gesture ends
    pub fn begin_seek(&self) {
        let current = self.core.machine.clock().current_time;
        let mut state = self.core.state.lock();
        state.is_seeking = true;
        state.scrub_position = current;
        state.transport_buttons_visible = false;
    }

    /// The scrub thumb moved
    pub fn move_seek(&self, position: f64) {
        let mut state = self.core.state.lock();
        if state.is_seeking {
            state.scrub_position = position;
        }
    }

    /// The scrub gesture ended: issue the seek and restore the buttons
    pub fn end_seek(&self) {
        let target = {
            let mut state = self.core.state.lock();
            if !state.is_seeking {
                return;
            }
            state.is_seeking = false;
            state.transport_buttons_visible = true;
            state.scrub_position
        };
        self.core.machine.seek(target, |_| {});
    }

    /// A tap landed on the video surface: toggle the control overlay
    pub fn tap_surface(&self) {
        // The error affordance owns the surface while a failure is shown.
        if self.core.machine.state() == PlayerState::Error {
            return;
        }
        let mut state = self.core.state.lock();
        if !state.inline_chrome_enabled {
            return;
        }
        state.overlay_visible = !state.overlay_visible;
    }

    /// Expand or collapse programmatically
    pub fn set_expand(&self, expand: bool) {
        self.core.apply_expand(expand, OpenReason::ProgrammaticExpand);
    }

    pub fn is_expand(&self) -> bool {
        self.core.state.lock().is_expand
    }

    /// The user tapped the full screen affordance
    pub fn open_full_screen(&self) {
        self.core.open_session(OpenReason::User);
    }

    /// The user tapped the close affordance
    pub fn close_full_screen(&self) {
        self.core.coordinator.close();
    }

    /// The user asked for the settings sheet
    pub fn open_settings(&self) {
        if (self.core.presenter_resolver)().is_none() {
            warn!("settings sheet skipped: no foreground presenter");
            return;
        }
        self.core.events.emit(&ControlEvent::SettingsRequested);
    }

    /// The app moved to the background
    pub fn did_enter_background(&self) {
        if self.core.config.playback.pause_in_background {
            self.core.machine.pause();
        }
    }

    /// The app is returning to the foreground; playback stays paused until
    /// the user resumes it
    pub fn will_enter_foreground(&self) {}
}

impl ControlCore {
    fn snapshot(&self) -> ControlSnapshot {
        let clock = self.machine.clock();
        let player_state = self.machine.state();
        let audio_state = self.machine.audio_state();
        let state = self.state.lock();
        ControlSnapshot {
            seek_position: if state.is_seeking {
                state.scrub_position
            } else {
                clock.current_time
            },
            buffer_position: clock.buffered_upper_bound,
            duration: clock.duration,
            overlay_visible: state.overlay_visible,
            transport_buttons_visible: state.transport_buttons_visible,
            error_visible: state.error_visible,
            inline_chrome_enabled: state.inline_chrome_enabled,
            is_expand: state.is_expand,
            is_seeking: state.is_seeking,
            affordance: match player_state {
                PlayerState::Playing | PlayerState::Buffering => TransportAffordance::Pause,
                PlayerState::Ended => TransportAffordance::Replay,
                _ => TransportAffordance::Play,
            },
            audio_state,
        }
    }

    fn attach_engine(&self, engine: Arc<dyn MediaEngine>) {
        self.state.lock().error_visible = false;
        self.machine.attach_engine(engine);
        if self.config.playback.start_muted {
            self.machine.mute();
        }
    }

    fn handle_player_event(&self, event: &PlayerEvent) {
        {
            let mut state = self.state.lock();
            match event {
                PlayerEvent::Failed => {
                    state.error_visible = true;
                    state.overlay_visible = false;
                }
                PlayerEvent::Prepared => {
                    state.error_visible = false;
                }
                _ => {}
            }
        }
        if matches!(event, PlayerEvent::Prepared) && self.config.playback.autoplay {
            self.machine.play();
        }
        self.events.emit(&ControlEvent::Player(event.clone()));
    }

    fn handle_fullscreen_event(&self, event: &FullScreenEvent) {
        match event {
            FullScreenEvent::WillPresent => {
                let mut state = self.state.lock();
                state.inline_chrome_enabled = false;
                state.overlay_visible = false;
            }
            FullScreenEvent::DidPresent => {
                let resume = {
                    let mut state = self.state.lock();
                    std::mem::take(&mut state.resume_on_present)
                };
                if resume {
                    self.machine.play();
                }
            }
            FullScreenEvent::DidDismiss => {
                self.state.lock().inline_chrome_enabled = true;
            }
            _ => {}
        }
        self.events.emit(&ControlEvent::FullScreen(*event));
    }

    fn handle_orientation_changed(&self, orientation: Orientation) {
        if !self.config.transition.expand_on_rotation {
            return;
        }
        if orientation.is_landscape() {
            self.apply_expand(true, OpenReason::DeviceRotation);
        } else if orientation.is_portrait() {
            self.apply_expand(false, OpenReason::DeviceRotation);
        }
    }

    fn apply_expand(&self, expand: bool, reason: OpenReason) {
        let changed = {
            let mut state = self.state.lock();
            if state.is_expand == expand {
                false
            } else {
                state.is_expand = expand;
                true
            }
        };
        if !changed {
            return;
        }
        self.events.emit(&ControlEvent::ExpandStateChanged(expand));

        if expand {
            self.open_session(reason);
        } else {
            // Collapse never evicts a deliberately opened full screen.
            self.coordinator.close_unless_user_opened();
        }
    }

    fn open_session(&self, reason: OpenReason) {
        if self.coordinator.phase() != TransitionPhase::Closed {
            debug!("full screen already presenting; open({:?}) ignored", reason);
            return;
        }

        let resume = self.machine.state() == PlayerState::Playing;
        self.state.lock().resume_on_present = resume;
        self.machine.pause();
        self.coordinator.open(reason);

        if self.coordinator.phase() == TransitionPhase::Closed {
            // The open was aborted (no presenter); undo the transition pause.
            self.state.lock().resume_on_present = false;
            if resume {
                self.machine.play();
            }
        }
    }
}
