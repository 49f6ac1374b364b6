//! Video surface model for playerkit
//!
//! The live video surface is owned by exactly one parent container at a
//! time. Re-parenting is atomic from the caller's perspective: there is no
//! observable state where the surface has two parents or none. The full
//! screen coordinator is the only component that transfers ownership.

use crate::dispatch::Dispatcher;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// A rectangle in screen points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The width-filling 16:9 rect vertically centered in `bounds`
    pub fn aspect_fit_16_9(bounds: Rect) -> Rect {
        let width = bounds.width;
        let height = width * 9.0 / 16.0;
        Rect {
            x: bounds.x,
            y: bounds.y + (bounds.height - height) / 2.0,
            width,
            height,
        }
    }
}

/// A container in the host view tree that can hold the video surface
pub struct SurfaceContainer {
    name: String,
    bounds: Mutex<Rect>,
}

impl SurfaceContainer {
    pub fn new(name: &str, bounds: Rect) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            bounds: Mutex::new(bounds),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        *self.bounds.lock()
    }

    /// Update the container bounds, e.g. after a device rotation
    pub fn set_bounds(&self, bounds: Rect) {
        *self.bounds.lock() = bounds;
    }
}

/// The live video surface
pub struct VideoSurface {
    inner: Mutex<SurfaceInner>,
}

struct SurfaceInner {
    frame: Rect,
    parent: Weak<SurfaceContainer>,
}

impl VideoSurface {
    /// Create a surface attached to `parent` with the given frame
    pub fn attached(parent: &Arc<SurfaceContainer>, frame: Rect) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SurfaceInner {
                frame,
                parent: Arc::downgrade(parent),
            }),
        })
    }

    /// Current frame in screen points
    pub fn frame(&self) -> Rect {
        self.inner.lock().frame
    }

    /// Resize or move the surface within its current parent
    pub fn set_frame(&self, frame: Rect) {
        self.inner.lock().frame = frame;
    }

    /// Current parent container, if it is still alive
    pub fn parent(&self) -> Option<Arc<SurfaceContainer>> {
        self.inner.lock().parent.upgrade()
    }

    /// Re-parent the surface and set its frame in one step
    pub fn move_to(&self, parent: &Arc<SurfaceContainer>, frame: Rect) {
        let mut inner = self.inner.lock();
        inner.parent = Arc::downgrade(parent);
        inner.frame = frame;
    }
}

/// Completion callback for an animated frame change
pub type AnimationCompletion = Box<dyn FnOnce() + Send>;

/// Drives the visual move of the surface to a target frame
///
/// The visual choreography itself belongs to the host platform; the core
/// only needs the final frame applied and the completion invoked once the
/// move is done.
pub trait AnimationDriver: Send + Sync {
    fn animate(&self, surface: &Arc<VideoSurface>, to: Rect, completion: AnimationCompletion);
}

/// Applies the target frame and completes synchronously
pub struct ImmediateAnimator;

impl AnimationDriver for ImmediateAnimator {
    fn animate(&self, surface: &Arc<VideoSurface>, to: Rect, completion: AnimationCompletion) {
        surface.set_frame(to);
        completion();
    }
}

/// Applies the target frame and posts the completion on the serial queue
///
/// Models a real animation whose completion arrives asynchronously after
/// the call that started it.
pub struct QueuedAnimator {
    dispatcher: Arc<Dispatcher>,
}

impl QueuedAnimator {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl AnimationDriver for QueuedAnimator {
    fn animate(&self, surface: &Arc<VideoSurface>, to: Rect, completion: AnimationCompletion) {
        surface.set_frame(to);
        self.dispatcher.post(completion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_fit_16_9_centers_vertically() {
        let bounds = Rect::new(0.0, 0.0, 320.0, 640.0);
        let fit = Rect::aspect_fit_16_9(bounds);
        assert_eq!(fit.width, 320.0);
        assert_eq!(fit.height, 180.0);
        assert_eq!(fit.y, 230.0);
        assert_eq!(fit.x, 0.0);
    }

    #[test]
    fn test_move_to_swaps_parent_and_frame_together() {
        let inline = SurfaceContainer::new("inline", Rect::new(0.0, 100.0, 320.0, 180.0));
        let screen = SurfaceContainer::new("screen", Rect::new(0.0, 0.0, 320.0, 640.0));
        let surface = VideoSurface::attached(&inline, Rect::new(0.0, 100.0, 320.0, 180.0));

        assert_eq!(surface.parent().unwrap().name(), "inline");

        surface.move_to(&screen, screen.bounds());
        assert_eq!(surface.parent().unwrap().name(), "screen");
        assert_eq!(surface.frame(), Rect::new(0.0, 0.0, 320.0, 640.0));
    }

    #[test]
    fn test_parent_is_non_owning() {
        let inline = SurfaceContainer::new("inline", Rect::default());
        let surface = VideoSurface::attached(&inline, Rect::default());
        drop(inline);
        assert!(surface.parent().is_none());
    }

    #[test]
    fn test_queued_animator_defers_completion() {
        let dispatcher = Dispatcher::new();
        let inline = SurfaceContainer::new("inline", Rect::default());
        let surface = VideoSurface::attached(&inline, Rect::default());
        let animator = QueuedAnimator::new(Arc::clone(&dispatcher));

        let done = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&done);
        let target = Rect::new(0.0, 0.0, 100.0, 100.0);
        animator.animate(&surface, target, Box::new(move || *flag.lock() = true));

        assert_eq!(surface.frame(), target);
        assert!(!*done.lock());
        dispatcher.drain();
        assert!(*done.lock());
    }
}
