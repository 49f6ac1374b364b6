//! Full screen presentation module for playerkit
//!
//! One open→close lifecycle of the re-parented video surface is a session.
//! The coordinator arbitrates who may start and end a session and guarantees
//! the surface returns to the container and frame it was captured from.

mod coordinator;

pub use coordinator::{FullScreenTransitionCoordinator, PresenterResolver};

use crate::orientation::Orientation;
use crate::surface::{Rect, SurfaceContainer};
use std::sync::{Arc, Weak};

/// Why a full screen session was opened
///
/// The reason is retained for the lifetime of the session and gates the
/// close-time rotation policy: only user-opened sessions wait for the device
/// to rotate back before dismissing, and only non-user sessions may be
/// closed by a collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenReason {
    /// Explicit tap on the full screen affordance
    User,

    /// The device rotated to landscape while inline
    DeviceRotation,

    /// API-driven expand request
    ProgrammaticExpand,
}

/// Lifecycle phase of the full screen presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    /// No session
    Closed,

    /// Session created, open animation in flight
    Opening,

    /// Session active, surface in the presenter
    Open,

    /// Close animation in flight
    Closing,
}

/// One open→close lifecycle of the re-parented surface
///
/// At most one session exists per player view; `is_active` only ever goes
/// from true to false, a session is never reopened.
pub struct FullScreenSession {
    pub(crate) open_reason: OpenReason,
    pub(crate) origin_frame: Rect,
    /// Non-owning restore target; the surface must return here on close
    pub(crate) origin_parent: Weak<SurfaceContainer>,
    pub(crate) orientation_at_open: Orientation,
    pub(crate) presenter: Arc<SurfaceContainer>,
    pub(crate) is_active: bool,
}

impl FullScreenSession {
    pub fn open_reason(&self) -> OpenReason {
        self.open_reason
    }

    pub fn origin_frame(&self) -> Rect {
        self.origin_frame
    }

    pub fn orientation_at_open(&self) -> Orientation {
        self.orientation_at_open
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Full screen lifecycle notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullScreenEvent {
    /// Session created, surface about to move into the presenter
    WillPresent,

    /// Open animation finished, session active
    DidPresent,

    /// Close accepted, surface about to move back
    WillDismiss,

    /// Surface restored to its origin, session gone
    DidDismiss,

    /// The full screen container itself was tapped
    DidTap,
}
