//! Player state machine
//!
//! Single source of truth for the canonical playback state. Engine signals
//! arrive independently and asynchronously; this module reconciles them into
//! one monotonic `PlayerState` plus the derived audio state, rates, and
//! playback clock, and insulates every consumer from the raw signal soup.

use crate::engine::{EngineSignal, ItemStatus, MediaEngine, TimeControlStatus};
use crate::events::{EventHub, Subscription};
use crate::player::{AudioState, PlaybackClock, PlayerEvent, PlayerState};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Derives the canonical playback state from engine signals
///
/// Cheap to clone; clones share the same underlying machine. Observation is
/// scoped to one engine attachment: attaching a new engine tears down the
/// previous attachment's signal subscription before wiring the new one, and
/// resets every derived value.
#[derive(Clone)]
pub struct PlayerStateMachine {
    inner: Arc<Mutex<MachineInner>>,
    events: EventHub<PlayerEvent>,
}

struct MachineInner {
    engine: Option<Arc<dyn MediaEngine>>,
    signal_sub: Option<Subscription>,
    state: PlayerState,
    last_audio_state: AudioState,
    last_rate: f32,
    effective_rate: f32,
    prepared_fired: bool,
    clock: PlaybackClock,
}

impl Default for PlayerStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStateMachine {
    /// Create a machine with no engine attached
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MachineInner {
                engine: None,
                signal_sub: None,
                state: PlayerState::Idle,
                last_audio_state: AudioState::Unmuted,
                last_rate: 0.0,
                effective_rate: 0.0,
                prepared_fired: false,
                clock: PlaybackClock::default(),
            })),
            events: EventHub::new(),
        }
    }

    /// Notifications derived from engine signals and commands
    pub fn events(&self) -> &EventHub<PlayerEvent> {
        &self.events
    }

    /// Attach a media engine, replacing any previous attachment
    ///
    /// The previous attachment's signal subscription is torn down before the
    /// new engine is observed, so stale callbacks can never fire against a
    /// replaced engine. All derived state resets; `Prepared` will fire once
    /// when the new engine reports ready.
    pub fn attach_engine(&self, engine: Arc<dyn MediaEngine>) {
        let out = {
            let mut inner = self.inner.lock();
            inner.signal_sub = None;
            inner.engine = None;

            let mut out = Vec::new();
            inner.set_state(PlayerState::Idle, &mut out);
            inner.prepared_fired = false;
            inner.last_rate = 0.0;
            inner.effective_rate = 0.0;
            inner.clock = PlaybackClock::default();
            inner.last_audio_state = if engine.is_muted() {
                AudioState::Muted
            } else {
                AudioState::Unmuted
            };

            let weak = Arc::downgrade(&self.inner);
            let events = self.events.clone();
            let sub = engine.signals().subscribe(move |signal| {
                let Some(strong) = weak.upgrade() else { return };
                let out = strong.lock().apply_signal(signal);
                for event in &out {
                    events.emit(event);
                }
            });
            inner.signal_sub = Some(sub);
            inner.engine = Some(engine);
            out
        };
        for event in &out {
            self.events.emit(event);
        }
        info!("media engine attached");
    }

    /// Detach the current engine and reset all derived state
    pub fn release_engine(&self) {
        let out = {
            let mut inner = self.inner.lock();
            inner.signal_sub = None;
            inner.engine = None;

            let mut out = Vec::new();
            inner.set_state(PlayerState::Idle, &mut out);
            inner.prepared_fired = false;
            inner.last_rate = 0.0;
            inner.effective_rate = 0.0;
            inner.clock = PlaybackClock::default();
            out
        };
        for event in &out {
            self.events.emit(event);
        }
        info!("media engine released");
    }

    /// Current canonical playback state
    pub fn state(&self) -> PlayerState {
        self.inner.lock().state
    }

    /// Latest playback clock values
    pub fn clock(&self) -> PlaybackClock {
        self.inner.lock().clock
    }

    /// User-requested playback rate, read through the engine
    pub fn rate(&self) -> f32 {
        self.inner
            .lock()
            .engine
            .as_ref()
            .map(|engine| engine.rate())
            .unwrap_or(0.0)
    }

    /// Actual instantaneous playback rate last reported by the engine
    pub fn effective_rate(&self) -> f32 {
        self.inner.lock().effective_rate
    }

    /// Audio state, read through the engine's mute flag
    pub fn audio_state(&self) -> AudioState {
        self.inner
            .lock()
            .engine
            .as_ref()
            .map(|engine| {
                if engine.is_muted() {
                    AudioState::Muted
                } else {
                    AudioState::Unmuted
                }
            })
            .unwrap_or(AudioState::Unmuted)
    }

    /// Begin or resume playback
    pub fn play(&self) {
        if let Some(engine) = self.playback_engine("play") {
            engine.play();
        }
    }

    /// Pause playback
    pub fn pause(&self) {
        if let Some(engine) = self.playback_engine("pause") {
            engine.pause();
        }
    }

    /// Mute audio output
    pub fn mute(&self) {
        self.set_muted(true);
    }

    /// Unmute audio output
    pub fn unmute(&self) {
        self.set_muted(false);
    }

    /// Flip the mute flag
    pub fn toggle_mute(&self) {
        let muted = self.audio_state() == AudioState::Muted;
        self.set_muted(!muted);
    }

    /// Set the engine mute flag, then re-derive the audio state
    ///
    /// The notification fires only when the read-back value differs from the
    /// last reported one.
    pub fn set_muted(&self, muted: bool) {
        let event = {
            let mut inner = self.inner.lock();
            let Some(engine) = inner.engine.clone() else {
                debug!("set_muted with no engine");
                return;
            };
            engine.set_muted(muted);
            let derived = if engine.is_muted() {
                AudioState::Muted
            } else {
                AudioState::Unmuted
            };
            if derived != inner.last_audio_state {
                inner.last_audio_state = derived;
                Some(PlayerEvent::AudioStateChanged(derived))
            } else {
                None
            }
        };
        if let Some(event) = event {
            self.events.emit(&event);
        }
    }

    /// Seek to `target` seconds, frame accurate
    ///
    /// The target is not validated here; the engine clamps out-of-range
    /// values. A new seek does not cancel a prior in-flight one: every
    /// completion is honored in arrival order, and a completion arriving
    /// while the state is `Ended` demotes it to `Paused` (last completion
    /// wins). The caller's completion receives the engine's finished flag.
    pub fn seek(&self, target: f64, completion: impl FnOnce(bool) + Send + 'static) {
        let gate = {
            let inner = self.inner.lock();
            if inner.state == PlayerState::Error {
                None
            } else {
                inner.engine.clone()
            }
        };
        let Some(engine) = gate else {
            debug!("seek rejected: no engine or failed session");
            completion(false);
            return;
        };

        let weak = Arc::downgrade(&self.inner);
        let events = self.events.clone();
        engine.seek(
            target,
            0.0,
            0.0,
            Box::new(move |finished| {
                if let Some(strong) = weak.upgrade() {
                    let out = strong.lock().complete_seek(finished);
                    for event in &out {
                        events.emit(event);
                    }
                }
                completion(finished);
            }),
        );
    }

    /// Seek to the start of the item and resume playback
    pub fn replay(&self) {
        let machine = self.clone();
        self.seek(0.0, move |finished| {
            if finished {
                machine.play();
            }
        });
    }

    fn playback_engine(&self, command: &str) -> Option<Arc<dyn MediaEngine>> {
        let inner = self.inner.lock();
        if inner.state == PlayerState::Error {
            warn!("{} ignored after playback failure", command);
            return None;
        }
        if inner.engine.is_none() {
            debug!("{} with no engine", command);
        }
        inner.engine.clone()
    }
}

impl MachineInner {
    fn set_state(&mut self, state: PlayerState, out: &mut Vec<PlayerEvent>) {
        if self.state == state {
            return;
        }
        debug!("player state {:?} -> {:?}", self.state, state);
        self.state = state;
        out.push(PlayerEvent::StateChanged(state));
    }

    fn apply_signal(&mut self, signal: &EngineSignal) -> Vec<PlayerEvent> {
        let mut out = Vec::new();
        match signal {
            EngineSignal::ItemStatusChanged(status) => match status {
                ItemStatus::ReadyToPlay => {
                    // Only the first ready while idle counts; later status
                    // flaps to ready are not a fresh preparation.
                    if self.state == PlayerState::Idle && !self.prepared_fired {
                        if let Some(engine) = &self.engine {
                            self.clock.duration = engine.duration();
                        }
                        self.set_state(PlayerState::Paused, &mut out);
                        self.prepared_fired = true;
                        out.push(PlayerEvent::Prepared);
                    }
                }
                ItemStatus::Failed | ItemStatus::Unknown => {
                    self.set_state(PlayerState::Error, &mut out);
                    out.push(PlayerEvent::Failed);
                }
            },
            EngineSignal::RateChanged(rate) => {
                // Engines force the rate to zero right after a playback
                // failure; the failed session must not report it.
                if self.state != PlayerState::Error && *rate != self.last_rate {
                    self.last_rate = *rate;
                    out.push(PlayerEvent::RateChanged(*rate));
                }
            }
            EngineSignal::TimeControlStatusChanged(status) => {
                if self.state != PlayerState::Error {
                    match status {
                        TimeControlStatus::Paused => {
                            // A paused classification must not cancel the
                            // ended state; only a seek leaves `Ended`.
                            if self.state != PlayerState::Ended {
                                self.set_state(PlayerState::Paused, &mut out);
                            }
                        }
                        TimeControlStatus::Playing => {
                            self.set_state(PlayerState::Playing, &mut out);
                        }
                        TimeControlStatus::WaitingToPlayAtRate => {
                            self.set_state(PlayerState::Buffering, &mut out);
                        }
                    }
                }
            }
            EngineSignal::PlaybackStalled => {
                out.push(PlayerEvent::Stalled);
            }
            EngineSignal::DidPlayToEnd => {
                if self.state != PlayerState::Error {
                    self.set_state(PlayerState::Ended, &mut out);
                }
            }
            EngineSignal::DidFailToPlayToEnd(reason) => {
                warn!("playback failed before end of item: {}", reason);
                self.set_state(PlayerState::Error, &mut out);
                out.push(PlayerEvent::Failed);
            }
            EngineSignal::EffectiveRateChanged(rate) => {
                if *rate != self.effective_rate {
                    self.effective_rate = *rate;
                    out.push(PlayerEvent::EffectiveRateChanged(*rate));
                }
            }
            EngineSignal::PeriodicTick(current_time) => {
                self.clock.current_time = *current_time;
                if let Some(engine) = &self.engine {
                    self.clock.buffered_upper_bound = engine.buffered_upper_bound();
                    self.clock.duration = engine.duration();
                }
                out.push(PlayerEvent::PeriodicTick(self.clock));
            }
            EngineSignal::TimeJumped => {
                out.push(PlayerEvent::TimeJumped);
            }
        }
        out
    }

    fn complete_seek(&mut self, finished: bool) -> Vec<PlayerEvent> {
        let mut out = Vec::new();
        if self.state == PlayerState::Ended {
            self.set_state(PlayerState::Paused, &mut out);
        }
        if finished {
            if let Some(engine) = &self.engine {
                self.clock.current_time = engine.current_time();
                self.clock.buffered_upper_bound = engine.buffered_upper_bound();
                self.clock.duration = engine.duration();
            }
        }
        out
    }
}
