//! Full screen transition coordinator
//!
//! Owns the protocol for presenting and dismissing the full screen
//! container. The live video surface is moved between its inline parent and
//! the presenter without interrupting playback, and the move is unwound
//! symmetrically even when a close request interrupts an open in flight.

use crate::events::{EventHub, Subscription};
use crate::fullscreen::{FullScreenEvent, FullScreenSession, OpenReason, TransitionPhase};
use crate::orientation::{Orientation, OrientationController, OrientationObserver};
use crate::surface::{AnimationDriver, Rect, SurfaceContainer, VideoSurface};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

/// Capability resolving the container that can present full screen content,
/// returning `None` when no foreground window exists
pub type PresenterResolver = Arc<dyn Fn() -> Option<Arc<SurfaceContainer>> + Send + Sync>;

/// Coordinates full screen open/close for one player view
///
/// Cheap to clone; clones share the same coordinator. All methods are
/// expected to run on the player's serial context.
#[derive(Clone)]
pub struct FullScreenTransitionCoordinator {
    inner: Arc<Mutex<CoordinatorInner>>,
    events: EventHub<FullScreenEvent>,
}

struct CoordinatorInner {
    phase: TransitionPhase,
    session: Option<FullScreenSession>,
    surface: Arc<VideoSurface>,
    presenter_resolver: PresenterResolver,
    animator: Arc<dyn AnimationDriver>,
    orientation: OrientationObserver,
    orientation_ctl: Arc<dyn OrientationController>,
    /// Keeps the orientation subscription alive for the coordinator lifetime
    #[allow(dead_code)]
    orientation_sub: Option<Subscription>,
    /// A close arrived while the open animation was in flight
    pending_close: bool,
    /// A close is waiting for the requested rotation to take effect
    deferred_close: bool,
}

impl FullScreenTransitionCoordinator {
    pub fn new(
        surface: Arc<VideoSurface>,
        presenter_resolver: PresenterResolver,
        animator: Arc<dyn AnimationDriver>,
        orientation: OrientationObserver,
        orientation_ctl: Arc<dyn OrientationController>,
    ) -> Self {
        let inner = Arc::new(Mutex::new(CoordinatorInner {
            phase: TransitionPhase::Closed,
            session: None,
            surface,
            presenter_resolver,
            animator,
            orientation: orientation.clone(),
            orientation_ctl,
            orientation_sub: None,
            pending_close: false,
            deferred_close: false,
        }));
        let events = EventHub::new();

        let weak = Arc::downgrade(&inner);
        let events_for_sub = events.clone();
        let sub = orientation.events().subscribe(move |new_orientation| {
            let Some(inner) = weak.upgrade() else { return };
            handle_orientation(&inner, &events_for_sub, *new_orientation);
        });
        inner.lock().orientation_sub = Some(sub);

        Self { inner, events }
    }

    /// Full screen lifecycle notifications
    pub fn events(&self) -> &EventHub<FullScreenEvent> {
        &self.events
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> TransitionPhase {
        self.inner.lock().phase
    }

    /// Reason of the current session, if one exists
    pub fn session_reason(&self) -> Option<OpenReason> {
        self.inner.lock().session.as_ref().map(|s| s.open_reason)
    }

    /// Whether a session is active (open animation complete)
    pub fn is_active(&self) -> bool {
        let inner = self.inner.lock();
        inner.phase == TransitionPhase::Open
            && inner.session.as_ref().map(|s| s.is_active).unwrap_or(false)
    }

    /// Whether the full screen chrome should offer a close affordance
    ///
    /// Hidden in landscape; a rotation-opened session therefore starts
    /// without one and gains it if the device later turns portrait.
    pub fn close_affordance_visible(&self) -> bool {
        let inner = self.inner.lock();
        inner.session.is_some() && inner.orientation.current().is_portrait()
    }

    /// Open a session; a no-op unless the coordinator is `Closed`
    pub fn open(&self, reason: OpenReason) {
        do_open(&self.inner, &self.events, reason);
    }

    /// Close the active session
    ///
    /// While `Opening` the close is queued and runs once the open animation
    /// completes. For a `User` session whose device orientation no longer
    /// matches the one captured at open time, the close first requests a
    /// rotation back and resumes from the orientation-changed confirmation.
    pub fn close(&self) {
        do_close(&self.inner, &self.events);
    }

    /// Close the active session unless it was opened by the user
    ///
    /// Collapse policy: rotating back to portrait must not evict a
    /// deliberately opened full screen.
    pub fn close_unless_user_opened(&self) {
        let user_opened = {
            let inner = self.inner.lock();
            matches!(&inner.session, Some(s) if s.open_reason == OpenReason::User)
        };
        if user_opened {
            debug!("collapse ignored for user-opened session");
        } else {
            self.close();
        }
    }

    /// Report a tap on the full screen container
    pub fn report_tap(&self) {
        let has_session = self.inner.lock().session.is_some();
        if has_session {
            self.events.emit(&FullScreenEvent::DidTap);
        }
    }
}

/// Target frame for the surface inside the presenter: edge-to-edge in
/// landscape, width-filling 16:9 centered otherwise
fn fullscreen_target(presenter_bounds: Rect, orientation: Orientation) -> Rect {
    if orientation.is_landscape() {
        presenter_bounds
    } else {
        Rect::aspect_fit_16_9(presenter_bounds)
    }
}

fn do_open(
    inner_arc: &Arc<Mutex<CoordinatorInner>>,
    events: &EventHub<FullScreenEvent>,
    reason: OpenReason,
) {
    struct Begin {
        presenter: Arc<SurfaceContainer>,
        origin_frame: Rect,
        target: Rect,
        surface: Arc<VideoSurface>,
        animator: Arc<dyn AnimationDriver>,
    }

    let begin = {
        let mut inner = inner_arc.lock();
        if inner.phase != TransitionPhase::Closed {
            debug!("open({:?}) ignored while {:?}", reason, inner.phase);
            return;
        }
        let Some(presenter) = (inner.presenter_resolver)() else {
            warn!("full screen open aborted: no foreground presenter");
            return;
        };
        let Some(origin_parent) = inner.surface.parent() else {
            warn!("full screen open aborted: surface has no parent");
            return;
        };

        let origin_frame = inner.surface.frame();
        let orientation = inner.orientation.current();
        inner.phase = TransitionPhase::Opening;
        inner.session = Some(FullScreenSession {
            open_reason: reason,
            origin_frame,
            origin_parent: Arc::downgrade(&origin_parent),
            orientation_at_open: orientation,
            presenter: Arc::clone(&presenter),
            is_active: false,
        });
        Begin {
            target: fullscreen_target(presenter.bounds(), orientation),
            presenter,
            origin_frame,
            surface: Arc::clone(&inner.surface),
            animator: Arc::clone(&inner.animator),
        }
    };

    info!("full screen opening ({:?})", reason);
    events.emit(&FullScreenEvent::WillPresent);

    // Enter the presenter at the captured on-screen rect first so the move
    // is visually continuous, then animate to the full screen target.
    begin.surface.move_to(&begin.presenter, begin.origin_frame);

    let weak = Arc::downgrade(inner_arc);
    let events = events.clone();
    begin.animator.animate(
        &begin.surface,
        begin.target,
        Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            finish_open(&inner, &events);
        }),
    );
}

fn finish_open(inner_arc: &Arc<Mutex<CoordinatorInner>>, events: &EventHub<FullScreenEvent>) {
    let run_pending_close = {
        let mut inner = inner_arc.lock();
        if inner.phase != TransitionPhase::Opening {
            return;
        }
        inner.phase = TransitionPhase::Open;
        if let Some(session) = inner.session.as_mut() {
            session.is_active = true;
        }
        std::mem::take(&mut inner.pending_close)
    };

    info!("full screen open");
    events.emit(&FullScreenEvent::DidPresent);

    if run_pending_close {
        debug!("running close queued during the open animation");
        do_close(inner_arc, events);
    }
}

fn do_close(inner_arc: &Arc<Mutex<CoordinatorInner>>, events: &EventHub<FullScreenEvent>) {
    enum Action {
        Defer(Orientation, Arc<dyn OrientationController>),
        Begin {
            origin_frame: Rect,
            surface: Arc<VideoSurface>,
            animator: Arc<dyn AnimationDriver>,
        },
    }

    let action = {
        let mut inner = inner_arc.lock();
        match inner.phase {
            TransitionPhase::Closed | TransitionPhase::Closing => {
                debug!("close ignored while {:?}", inner.phase);
                return;
            }
            TransitionPhase::Opening => {
                // Closing mid-open would corrupt the captured origin rect;
                // queue it for after the open completes.
                debug!("close requested mid-open; queued");
                inner.pending_close = true;
                return;
            }
            TransitionPhase::Open => {
                let Some(session) = inner.session.as_ref() else {
                    warn!("open phase without a session; resetting");
                    inner.phase = TransitionPhase::Closed;
                    return;
                };
                let session_open_reason = session.open_reason;
                let session_orientation_at_open = session.orientation_at_open;
                let session_origin_frame = session.origin_frame;
                let current = inner.orientation.current();
                if session_open_reason == OpenReason::User
                    && current != session_orientation_at_open
                {
                    inner.deferred_close = true;
                    Action::Defer(
                        session_orientation_at_open,
                        Arc::clone(&inner.orientation_ctl),
                    )
                } else {
                    inner.phase = TransitionPhase::Closing;
                    Action::Begin {
                        origin_frame: session_origin_frame,
                        surface: Arc::clone(&inner.surface),
                        animator: Arc::clone(&inner.animator),
                    }
                }
            }
        }
    };

    match action {
        Action::Defer(target, controller) => {
            info!("close deferred until the device returns to {:?}", target);
            controller.request_orientation(target);
        }
        Action::Begin {
            origin_frame,
            surface,
            animator,
        } => {
            info!("full screen closing");
            events.emit(&FullScreenEvent::WillDismiss);

            let weak = Arc::downgrade(inner_arc);
            let events = events.clone();
            animator.animate(
                &surface,
                origin_frame,
                Box::new(move || {
                    let Some(inner) = weak.upgrade() else { return };
                    finish_close(&inner, &events);
                }),
            );
        }
    }
}

fn finish_close(inner_arc: &Arc<Mutex<CoordinatorInner>>, events: &EventHub<FullScreenEvent>) {
    {
        let mut inner = inner_arc.lock();
        if inner.phase != TransitionPhase::Closing {
            return;
        }
        if let Some(mut session) = inner.session.take() {
            session.is_active = false;
            match session.origin_parent.upgrade() {
                Some(origin_parent) => {
                    inner.surface.move_to(&origin_parent, session.origin_frame);
                }
                None => {
                    // The restore target is gone; the surface stays in the
                    // presenter rather than being orphaned.
                    log::error!("origin container deallocated; surface not restored");
                }
            }
        }
        inner.phase = TransitionPhase::Closed;
        inner.pending_close = false;
        inner.deferred_close = false;
    }

    info!("full screen closed");
    events.emit(&FullScreenEvent::DidDismiss);
}

fn handle_orientation(
    inner_arc: &Arc<Mutex<CoordinatorInner>>,
    events: &EventHub<FullScreenEvent>,
    orientation: Orientation,
) {
    enum After {
        ResumeClose,
        Relayout(Arc<VideoSurface>, Rect),
        Nothing,
    }

    let after = {
        let mut inner = inner_arc.lock();
        if inner.phase != TransitionPhase::Open {
            After::Nothing
        } else if std::mem::take(&mut inner.deferred_close) {
            After::ResumeClose
        } else if let Some(session) = inner.session.as_ref() {
            let target = fullscreen_target(session.presenter.bounds(), orientation);
            After::Relayout(Arc::clone(&inner.surface), target)
        } else {
            After::Nothing
        }
    };

    match after {
        After::ResumeClose => {
            debug!("rotation confirmed; resuming deferred close");
            do_close(inner_arc, events);
        }
        After::Relayout(surface, target) => surface.set_frame(target),
        After::Nothing => {}
    }
}
