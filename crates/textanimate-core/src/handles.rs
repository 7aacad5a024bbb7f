//! Scoped resource handles owned by one animation run

use std::time::Duration;

use crate::host::{FrameId, Host, SurfaceId, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Once,
    Repeating,
}

/// Every timer, frame callback and surface a run has acquired
///
/// All scheduling goes through the set so that [`HandleSet::release`] can
/// tear the run down completely. Fired one-shot timers and frames must be
/// claimed so the set stops tracking them.
#[derive(Debug, Default)]
pub struct HandleSet {
    timers: Vec<(TimerId, TimerKind)>,
    frame: Option<FrameId>,
    surface: Option<SurfaceId>,
}

impl HandleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(&mut self, host: &mut dyn Host, after: Duration) -> TimerId {
        let id = host.set_timeout(after);
        self.timers.push((id, TimerKind::Once));
        id
    }

    pub fn interval(&mut self, host: &mut dyn Host, every: Duration) -> TimerId {
        let id = host.set_interval(every);
        self.timers.push((id, TimerKind::Repeating));
        id
    }

    /// Cancel one owned timer
    pub fn clear_timer(&mut self, host: &mut dyn Host, id: TimerId) {
        if let Some(pos) = self.timers.iter().position(|(t, _)| *t == id) {
            self.timers.swap_remove(pos);
            host.clear_timer(id);
        }
    }

    /// Request the next frame, replacing any frame still pending
    pub fn frame(&mut self, host: &mut dyn Host) -> FrameId {
        if let Some(old) = self.frame.take() {
            host.cancel_frame(old);
        }
        let id = host.request_frame();
        self.frame = Some(id);
        id
    }

    pub fn attach_surface(&mut self, id: SurfaceId) {
        self.surface = Some(id);
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn remove_surface(&mut self, host: &mut dyn Host) {
        if let Some(id) = self.surface.take() {
            host.remove_surface(id);
        }
    }

    /// Claim a fired timer
    ///
    /// Returns false when the timer belongs to someone else. One-shot
    /// timers are forgotten once claimed; intervals stay owned.
    pub fn claim_timer(&mut self, id: TimerId) -> bool {
        match self.timers.iter().position(|(t, _)| *t == id) {
            Some(pos) => {
                if self.timers[pos].1 == TimerKind::Once {
                    self.timers.swap_remove(pos);
                }
                true
            }
            None => false,
        }
    }

    /// Claim a fired frame callback
    pub fn claim_frame(&mut self, id: FrameId) -> bool {
        if self.frame == Some(id) {
            self.frame = None;
            true
        } else {
            false
        }
    }

    pub fn owns_timer(&self, id: TimerId) -> bool {
        self.timers.iter().any(|(t, _)| *t == id)
    }

    /// True when nothing is scheduled and no surface is held
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.frame.is_none() && self.surface.is_none()
    }

    /// Cancel every timer and frame and remove the surface
    ///
    /// Safe to call any number of times.
    pub fn release(&mut self, host: &mut dyn Host) {
        for (id, _) in self.timers.drain(..) {
            host.clear_timer(id);
        }
        if let Some(id) = self.frame.take() {
            host.cancel_frame(id);
        }
        if let Some(id) = self.surface.take() {
            host.remove_surface(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Size;
    use crate::runtime::Runtime;

    #[test]
    fn test_release_clears_everything() {
        let mut host = Runtime::new();
        let mut handles = HandleSet::new();
        handles.timeout(&mut host, Duration::from_millis(10));
        handles.interval(&mut host, Duration::from_millis(20));
        handles.frame(&mut host);
        let surface = host.create_surface(Size::new(10.0, 10.0)).unwrap();
        handles.attach_surface(surface);

        handles.release(&mut host);
        assert!(handles.is_empty());
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.pending_frames(), 0);
        assert_eq!(host.live_surfaces(), 0);

        // Second release is a no-op
        handles.release(&mut host);
        assert_eq!(host.stats().timers_cleared, 2);
        assert_eq!(host.stats().frames_cancelled, 1);
        assert_eq!(host.stats().surfaces_removed, 1);
    }

    #[test]
    fn test_claim_forgets_one_shot_only() {
        let mut host = Runtime::new();
        let mut handles = HandleSet::new();
        let once = handles.timeout(&mut host, Duration::from_millis(10));
        let every = handles.interval(&mut host, Duration::from_millis(10));

        assert!(handles.claim_timer(once));
        assert!(!handles.owns_timer(once));
        assert!(handles.claim_timer(every));
        assert!(handles.owns_timer(every));
        assert!(!handles.claim_timer(TimerId(9999)));
    }

    #[test]
    fn test_frame_replaces_pending() {
        let mut host = Runtime::new();
        let mut handles = HandleSet::new();
        let first = handles.frame(&mut host);
        let second = handles.frame(&mut host);
        assert_ne!(first, second);
        assert_eq!(host.pending_frames(), 1);
        assert!(!handles.claim_frame(first));
        assert!(handles.claim_frame(second));
    }
}
