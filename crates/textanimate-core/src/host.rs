//! Platform primitives consumed by the animation engine
//!
//! Timers and frame callbacks carry no closures. When one fires, whoever
//! drives the host hands a [`Wakeup`] to every mounted controller, and the
//! controller that owns the id reacts to it.

use std::time::Duration;

use serde::Serialize;

use crate::physics::Particle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FrameId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SurfaceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObserverId(pub u64);

/// Width and height in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A scheduled callback that has come due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    Timer(TimerId),
    Frame(FrameId),
}

/// Scheduling, drawing and visibility services of the rendering platform
pub trait Host {
    /// Monotonic time since the host origin
    fn now(&self) -> Duration;

    /// One-shot timer firing once after `after`
    fn set_timeout(&mut self, after: Duration) -> TimerId;

    /// Repeating timer firing every `every`
    fn set_interval(&mut self, every: Duration) -> TimerId;

    /// Cancel a timer; unknown or already fired ids are ignored
    fn clear_timer(&mut self, id: TimerId);

    /// Ask for a callback on the next animation frame
    fn request_frame(&mut self) -> FrameId;

    fn cancel_frame(&mut self, id: FrameId);

    /// Create a drawing surface covering `size`
    ///
    /// Returns `None` when no drawing context can be obtained. The host
    /// keeps nothing in that case.
    fn create_surface(&mut self, size: Size) -> Option<SurfaceId>;

    fn clear_surface(&mut self, id: SurfaceId);

    fn draw_particle(&mut self, id: SurfaceId, particle: &Particle);

    fn remove_surface(&mut self, id: SurfaceId);

    /// Start intersection detection for the element
    ///
    /// Returns `None` when the platform has no intersection detection.
    fn observe_visibility(&mut self) -> Option<ObserverId>;

    fn unobserve(&mut self, id: ObserverId);
}
