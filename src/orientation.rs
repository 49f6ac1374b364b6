//! Device orientation observation for playerkit
//!
//! The host platform feeds orientation changes into an [`OrientationObserver`];
//! the control surface derives its expand/collapse policy from them and the
//! full screen coordinator uses them to confirm requested rotations.

use crate::events::EventHub;
use log::debug;
use parking_lot::Mutex;
use std::sync::Arc;

/// Physical device orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Unknown,
}

impl Orientation {
    pub fn is_landscape(&self) -> bool {
        matches!(self, Orientation::LandscapeLeft | Orientation::LandscapeRight)
    }

    pub fn is_portrait(&self) -> bool {
        matches!(self, Orientation::Portrait | Orientation::PortraitUpsideDown)
    }
}

/// Publishes device orientation changes
///
/// Cheap to clone; clones share the same observer. The platform (or a test)
/// drives it with [`OrientationObserver::rotate_to`].
#[derive(Clone)]
pub struct OrientationObserver {
    current: Arc<Mutex<Orientation>>,
    events: EventHub<Orientation>,
}

impl OrientationObserver {
    pub fn new(initial: Orientation) -> Self {
        Self {
            current: Arc::new(Mutex::new(initial)),
            events: EventHub::new(),
        }
    }

    /// Last observed orientation
    pub fn current(&self) -> Orientation {
        *self.current.lock()
    }

    /// Record a new device orientation and notify subscribers on change
    pub fn rotate_to(&self, orientation: Orientation) {
        {
            let mut current = self.current.lock();
            if *current == orientation {
                return;
            }
            debug!("device orientation {:?} -> {:?}", *current, orientation);
            *current = orientation;
        }
        self.events.emit(&orientation);
    }

    /// Orientation change notifications
    pub fn events(&self) -> &EventHub<Orientation> {
        &self.events
    }
}

/// Capability for asking the platform to rotate the interface
///
/// Injected into the full screen coordinator so that a user-initiated close
/// can first restore the orientation the player view was opened in.
pub trait OrientationController: Send + Sync {
    fn request_orientation(&self, target: Orientation);
}

/// Controller that immediately reports the requested orientation back to an
/// observer, the way a device that honors every rotation request would
pub struct LoopbackOrientationController {
    observer: OrientationObserver,
}

impl LoopbackOrientationController {
    pub fn new(observer: OrientationObserver) -> Arc<Self> {
        Arc::new(Self { observer })
    }
}

impl OrientationController for LoopbackOrientationController {
    fn request_orientation(&self, target: Orientation) {
        self.observer.rotate_to(target);
    }
}
