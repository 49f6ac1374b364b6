//! Simulated media engine
//!
//! A software engine that speaks the real signal grammar without decoding
//! anything. The demo binary drives it as a stand-in for a platform engine,
//! and tests use it to script exact signal sequences. Every emission is
//! posted through the serial dispatcher, matching how a platform adapter
//! must deliver its callbacks.

use crate::dispatch::Dispatcher;
use crate::engine::{EngineSignal, ItemStatus, MediaEngine, SeekCompletion, TimeControlStatus};
use crate::events::EventHub;
use log::debug;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Simulated playback engine
pub struct SimulatedEngine {
    dispatcher: Arc<Dispatcher>,
    signals: EventHub<EngineSignal>,
    inner: Mutex<SimInner>,
}

struct SimInner {
    status: ItemStatus,
    time_control: TimeControlStatus,
    current_time: f64,
    duration: f64,
    buffered: f64,
    /// Seconds of media buffered per second of simulated time
    buffer_ahead_per_sec: f64,
    rate: f32,
    effective_rate: f32,
    muted: bool,
    pending_seeks: VecDeque<(f64, SeekCompletion)>,
    /// When set, seeks land on the next drain instead of waiting for
    /// an explicit `finish_next_seek`
    auto_complete_seeks: bool,
}

impl SimulatedEngine {
    /// Create an engine for an item of the given duration in seconds
    pub fn new(dispatcher: Arc<Dispatcher>, duration: f64) -> Arc<Self> {
        Arc::new(Self {
            dispatcher,
            signals: EventHub::new(),
            inner: Mutex::new(SimInner {
                status: ItemStatus::Unknown,
                time_control: TimeControlStatus::Paused,
                current_time: 0.0,
                duration,
                buffered: 0.0,
                buffer_ahead_per_sec: 2.0,
                rate: 0.0,
                effective_rate: 0.0,
                muted: false,
                pending_seeks: VecDeque::new(),
                auto_complete_seeks: true,
            }),
        })
    }

    /// Mark the item as loaded and playable
    pub fn make_ready(&self) {
        let out = {
            let mut inner = self.inner.lock();
            inner.status = ItemStatus::ReadyToPlay;
            inner.buffered = inner.buffered.max(inner.duration.min(5.0));
            vec![EngineSignal::ItemStatusChanged(ItemStatus::ReadyToPlay)]
        };
        self.post_signals(out);
    }

    /// Mark the item as unplayable
    pub fn fail_loading(&self) {
        let out = {
            let mut inner = self.inner.lock();
            inner.status = ItemStatus::Failed;
            vec![EngineSignal::ItemStatusChanged(ItemStatus::Failed)]
        };
        self.post_signals(out);
    }

    /// Fail mid-playback, followed by the forced zero-rate emission real
    /// engines produce right after a playback failure
    pub fn fail_playback(&self, reason: &str) {
        let out = {
            let mut inner = self.inner.lock();
            inner.status = ItemStatus::Failed;
            inner.rate = 0.0;
            vec![
                EngineSignal::DidFailToPlayToEnd(reason.to_string()),
                EngineSignal::RateChanged(0.0),
            ]
        };
        self.post_signals(out);
    }

    /// Report a playback stall without changing the time control status
    pub fn stall(&self) {
        self.post_signals(vec![EngineSignal::PlaybackStalled]);
    }

    /// Enter the waiting-for-media classification
    pub fn begin_buffering(&self) {
        let mut out = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.time_control = TimeControlStatus::WaitingToPlayAtRate;
            out.push(EngineSignal::TimeControlStatusChanged(
                TimeControlStatus::WaitingToPlayAtRate,
            ));
            inner.set_effective_rate(0.0, &mut out);
        }
        self.post_signals(out);
    }

    /// Leave the waiting-for-media classification and advance at the
    /// requested rate again
    pub fn resume_from_buffering(&self) {
        let mut out = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.time_control = TimeControlStatus::Playing;
            out.push(EngineSignal::TimeControlStatusChanged(
                TimeControlStatus::Playing,
            ));
            let rate = inner.rate;
            inner.set_effective_rate(rate, &mut out);
        }
        self.post_signals(out);
    }

    /// Advance the simulation by `dt` seconds and emit one periodic tick
    pub fn tick(&self, dt: f64) {
        let mut out = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.buffered =
                (inner.buffered + dt * inner.buffer_ahead_per_sec).min(inner.duration);

            match inner.time_control {
                TimeControlStatus::Playing => {
                    inner.current_time += dt * f64::from(inner.effective_rate);
                    if inner.duration > 0.0 && inner.current_time >= inner.duration {
                        inner.current_time = inner.duration;
                        inner.rate = 0.0;
                        inner.time_control = TimeControlStatus::Paused;
                        out.push(EngineSignal::RateChanged(0.0));
                        out.push(EngineSignal::TimeControlStatusChanged(
                            TimeControlStatus::Paused,
                        ));
                        inner.set_effective_rate(0.0, &mut out);
                        out.push(EngineSignal::DidPlayToEnd);
                    } else if inner.buffered <= inner.current_time {
                        // Ran out of buffered media mid-playback.
                        inner.time_control = TimeControlStatus::WaitingToPlayAtRate;
                        out.push(EngineSignal::PlaybackStalled);
                        out.push(EngineSignal::TimeControlStatusChanged(
                            TimeControlStatus::WaitingToPlayAtRate,
                        ));
                        inner.set_effective_rate(0.0, &mut out);
                    }
                }
                TimeControlStatus::WaitingToPlayAtRate => {
                    if inner.rate > 0.0 && inner.buffered > inner.current_time {
                        inner.time_control = TimeControlStatus::Playing;
                        out.push(EngineSignal::TimeControlStatusChanged(
                            TimeControlStatus::Playing,
                        ));
                        let rate = inner.rate;
                        inner.set_effective_rate(rate, &mut out);
                    }
                }
                TimeControlStatus::Paused => {}
            }

            out.push(EngineSignal::PeriodicTick(inner.current_time));
        }
        self.post_signals(out);
    }

    /// Complete the oldest in-flight seek
    pub fn finish_next_seek(&self, finished: bool) {
        let completed = {
            let mut inner = self.inner.lock();
            match inner.pending_seeks.pop_front() {
                Some((target, completion)) => {
                    if finished {
                        inner.current_time = target;
                    }
                    Some(completion)
                }
                None => None,
            }
        };
        let Some(completion) = completed else {
            debug!("finish_next_seek with no seek in flight");
            return;
        };
        if finished {
            self.post_signals(vec![EngineSignal::TimeJumped]);
        }
        self.dispatcher.post(move || completion(finished));
    }

    /// Number of seeks waiting for completion
    pub fn pending_seek_count(&self) -> usize {
        self.inner.lock().pending_seeks.len()
    }

    /// Hold seeks in flight until `finish_next_seek` is called
    pub fn hold_seeks(&self) {
        self.inner.lock().auto_complete_seeks = false;
    }

    /// Override the buffered upper bound
    pub fn set_buffered(&self, secs: f64) {
        let mut inner = self.inner.lock();
        inner.buffered = secs.clamp(0.0, inner.duration);
    }

    fn post_signals(&self, signals: Vec<EngineSignal>) {
        for signal in signals {
            let hub = self.signals.clone();
            self.dispatcher.post(move || hub.emit(&signal));
        }
    }
}

impl SimInner {
    fn set_effective_rate(&mut self, rate: f32, out: &mut Vec<EngineSignal>) {
        if self.effective_rate != rate {
            self.effective_rate = rate;
            out.push(EngineSignal::EffectiveRateChanged(rate));
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn current_time(&self) -> f64 {
        self.inner.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.inner.lock().duration
    }

    fn buffered_upper_bound(&self) -> f64 {
        self.inner.lock().buffered
    }

    fn rate(&self) -> f32 {
        self.inner.lock().rate
    }

    fn is_muted(&self) -> bool {
        self.inner.lock().muted
    }

    fn play(&self) {
        let mut out = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.rate = 1.0;
            out.push(EngineSignal::RateChanged(1.0));
            if inner.buffered > inner.current_time {
                inner.time_control = TimeControlStatus::Playing;
                out.push(EngineSignal::TimeControlStatusChanged(
                    TimeControlStatus::Playing,
                ));
                inner.set_effective_rate(1.0, &mut out);
            } else {
                inner.time_control = TimeControlStatus::WaitingToPlayAtRate;
                out.push(EngineSignal::TimeControlStatusChanged(
                    TimeControlStatus::WaitingToPlayAtRate,
                ));
            }
        }
        self.post_signals(out);
    }

    fn pause(&self) {
        let mut out = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.rate = 0.0;
            inner.time_control = TimeControlStatus::Paused;
            out.push(EngineSignal::RateChanged(0.0));
            out.push(EngineSignal::TimeControlStatusChanged(
                TimeControlStatus::Paused,
            ));
            inner.set_effective_rate(0.0, &mut out);
        }
        self.post_signals(out);
    }

    fn set_muted(&self, muted: bool) {
        self.inner.lock().muted = muted;
    }

    fn seek(
        &self,
        target: f64,
        _tolerance_before: f64,
        _tolerance_after: f64,
        completion: SeekCompletion,
    ) {
        {
            let mut inner = self.inner.lock();
            let clamped = target.clamp(0.0, inner.duration.max(0.0));
            if !inner.auto_complete_seeks {
                inner.pending_seeks.push_back((clamped, completion));
                return;
            }
            inner.current_time = clamped;
        }
        self.post_signals(vec![EngineSignal::TimeJumped]);
        self.dispatcher.post(move || completion(true));
    }

    fn signals(&self) -> &EventHub<EngineSignal> {
        &self.signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(hub: &EventHub<EngineSignal>) -> (Arc<Mutex<Vec<EngineSignal>>>, crate::events::Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = hub.subscribe(move |signal| sink.lock().push(signal.clone()));
        (seen, sub)
    }

    #[test]
    fn test_signals_are_delivered_through_the_dispatcher() {
        let dispatcher = Dispatcher::new();
        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
        let (seen, _sub) = collect(engine.signals());

        engine.make_ready();
        assert!(seen.lock().is_empty(), "no delivery before drain");

        dispatcher.drain();
        assert_eq!(
            *seen.lock(),
            vec![EngineSignal::ItemStatusChanged(ItemStatus::ReadyToPlay)]
        );
    }

    #[test]
    fn test_play_with_buffer_starts_playing() {
        let dispatcher = Dispatcher::new();
        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
        let (seen, _sub) = collect(engine.signals());

        engine.make_ready();
        engine.play();
        dispatcher.drain();

        let signals = seen.lock();
        assert!(signals.contains(&EngineSignal::RateChanged(1.0)));
        assert!(signals.contains(&EngineSignal::TimeControlStatusChanged(
            TimeControlStatus::Playing
        )));
        assert!(signals.contains(&EngineSignal::EffectiveRateChanged(1.0)));
    }

    #[test]
    fn test_tick_reaches_end_of_item() {
        let dispatcher = Dispatcher::new();
        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 1.0);
        let (seen, _sub) = collect(engine.signals());

        engine.make_ready();
        engine.play();
        engine.tick(2.0);
        dispatcher.drain();

        assert!(seen.lock().contains(&EngineSignal::DidPlayToEnd));
        assert_eq!(engine.current_time(), 1.0);
        assert_eq!(engine.rate(), 0.0);
    }

    #[test]
    fn test_held_seeks_complete_in_call_order() {
        let dispatcher = Dispatcher::new();
        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 60.0);
        engine.make_ready();
        engine.hold_seeks();

        let completions = Arc::new(Mutex::new(Vec::new()));
        for target in [10.0, 20.0] {
            let log = Arc::clone(&completions);
            engine.seek(
                target,
                0.0,
                0.0,
                Box::new(move |finished| log.lock().push((target, finished))),
            );
        }
        assert_eq!(engine.pending_seek_count(), 2);

        engine.finish_next_seek(false);
        engine.finish_next_seek(true);
        dispatcher.drain();

        assert_eq!(*completions.lock(), vec![(10.0, false), (20.0, true)]);
        assert_eq!(engine.current_time(), 20.0);
    }

    #[test]
    fn test_seek_clamps_to_item_range() {
        let dispatcher = Dispatcher::new();
        let engine = SimulatedEngine::new(Arc::clone(&dispatcher), 30.0);
        engine.make_ready();

        engine.seek(99.0, 0.0, 0.0, Box::new(|_| {}));
        dispatcher.drain();
        assert_eq!(engine.current_time(), 30.0);

        engine.seek(-5.0, 0.0, 0.0, Box::new(|_| {}));
        dispatcher.drain();
        assert_eq!(engine.current_time(), 0.0);
    }
}
