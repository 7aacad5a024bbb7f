//! Deterministic host implementation
//!
//! The clock only moves when the owner advances it, which makes every
//! animation reproducible in tests. The terminal player drives the same
//! runtime from wall-clock ticks.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use crate::host::{FrameId, Host, ObserverId, Size, SurfaceId, TimerId, Wakeup};
use crate::physics::Particle;

/// Time between animation frames (~60fps)
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Intervals shorter than this are stretched so a zero period cannot spin
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Counters for every primitive the runtime hands out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HostStats {
    pub timeouts_scheduled: u64,
    pub intervals_scheduled: u64,
    pub timers_cleared: u64,
    pub timeouts_fired: u64,
    pub interval_ticks: u64,
    pub frames_requested: u64,
    pub frames_cancelled: u64,
    pub frames_fired: u64,
    pub surfaces_created: u64,
    pub surfaces_refused: u64,
    pub surfaces_removed: u64,
    pub observers_attached: u64,
    pub observers_detached: u64,
}

impl HostStats {
    /// True when every acquired resource was either released or consumed
    pub fn balanced(&self) -> bool {
        self.timeouts_scheduled + self.intervals_scheduled == self.timers_cleared + self.timeouts_fired
            && self.frames_requested == self.frames_cancelled + self.frames_fired
            && self.surfaces_created == self.surfaces_removed
            && self.observers_attached == self.observers_detached
    }
}

/// A glyph drawn onto a surface during the current frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnGlyph {
    pub x: f64,
    pub y: f64,
    pub glyph: char,
    pub size: f64,
    pub color: String,
}

/// Retained draw list of one surface
#[derive(Debug, Clone, Default, Serialize)]
pub struct Surface {
    pub size: Size,
    pub glyphs: Vec<DrawnGlyph>,
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Timeout(TimerId),
    Interval(TimerId, Duration),
    Frame(FrameId),
}

type QueueKey = (Duration, u64);

/// Host backed by a virtual clock and an ordered wakeup queue
#[derive(Debug)]
pub struct Runtime {
    now: Duration,
    frame_interval: Duration,
    next_id: u64,
    next_seq: u64,
    queue: BTreeMap<QueueKey, Entry>,
    keys: HashMap<u64, QueueKey>,
    surfaces: BTreeMap<SurfaceId, Surface>,
    observers: BTreeSet<ObserverId>,
    drawing_context: bool,
    intersection_detection: bool,
    stats: HostStats,
}

impl Default for Runtime {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            next_id: 1,
            next_seq: 0,
            queue: BTreeMap::new(),
            keys: HashMap::new(),
            surfaces: BTreeMap::new(),
            observers: BTreeSet::new(),
            drawing_context: true,
            intersection_detection: true,
            stats: HostStats::default(),
        }
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Refuse every surface, as a platform without a 2D context would
    pub fn without_drawing_context(mut self) -> Self {
        self.drawing_context = false;
        self
    }

    /// Report intersection detection as unsupported
    pub fn without_intersection_detection(mut self) -> Self {
        self.intersection_detection = false;
        self
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    /// Timers (one-shot and repeating) still scheduled
    pub fn pending_timers(&self) -> usize {
        self.queue
            .values()
            .filter(|e| matches!(e, Entry::Timeout(_) | Entry::Interval(..)))
            .count()
    }

    pub fn pending_frames(&self) -> usize {
        self.queue.values().filter(|e| matches!(e, Entry::Frame(_))).count()
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn active_observers(&self) -> usize {
        self.observers.len()
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// True when nothing is scheduled and nothing is held
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.surfaces.is_empty() && self.observers.is_empty()
    }

    /// Due time of the earliest pending wakeup
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Pop the earliest wakeup due at or before `until`
    ///
    /// The clock moves to the wakeup's due time. Repeating timers are
    /// rescheduled before they are returned.
    pub fn poll(&mut self, until: Duration) -> Option<Wakeup> {
        let key = *self.queue.keys().next()?;
        if key.0 > until {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.now = self.now.max(key.0);

        match entry {
            Entry::Timeout(id) => {
                self.keys.remove(&id.0);
                self.stats.timeouts_fired += 1;
                Some(Wakeup::Timer(id))
            }
            Entry::Interval(id, every) => {
                self.stats.interval_ticks += 1;
                self.insert(id.0, key.0 + every, Entry::Interval(id, every));
                Some(Wakeup::Timer(id))
            }
            Entry::Frame(id) => {
                self.keys.remove(&id.0);
                self.stats.frames_fired += 1;
                Some(Wakeup::Frame(id))
            }
        }
    }

    /// Run the clock forward to `until`, handing each wakeup to `dispatch`
    ///
    /// Wakeups scheduled by `dispatch` itself are delivered in the same
    /// call when they fall due before `until`.
    pub fn advance_to<F>(&mut self, until: Duration, mut dispatch: F)
    where
        F: FnMut(Wakeup, &mut Runtime),
    {
        while let Some(wakeup) = self.poll(until) {
            dispatch(wakeup, self);
        }
        self.now = self.now.max(until);
    }

    pub fn advance_by<F>(&mut self, delta: Duration, dispatch: F)
    where
        F: FnMut(Wakeup, &mut Runtime),
    {
        let until = self.now + delta;
        self.advance_to(until, dispatch);
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert(&mut self, id: u64, due: Duration, entry: Entry) {
        let key = (due, self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key, entry);
        self.keys.insert(id, key);
    }

    fn remove_scheduled(&mut self, id: u64, is_match: impl Fn(&Entry) -> bool) -> bool {
        let Some(key) = self.keys.get(&id).copied() else {
            return false;
        };
        match self.queue.get(&key) {
            Some(entry) if is_match(entry) => {
                self.queue.remove(&key);
                self.keys.remove(&id);
                true
            }
            _ => false,
        }
    }
}

impl Host for Runtime {
    fn now(&self) -> Duration {
        self.now
    }

    fn set_timeout(&mut self, after: Duration) -> TimerId {
        let id = TimerId(self.allocate_id());
        self.insert(id.0, self.now + after, Entry::Timeout(id));
        self.stats.timeouts_scheduled += 1;
        id
    }

    fn set_interval(&mut self, every: Duration) -> TimerId {
        let every = every.max(MIN_INTERVAL);
        let id = TimerId(self.allocate_id());
        self.insert(id.0, self.now + every, Entry::Interval(id, every));
        self.stats.intervals_scheduled += 1;
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        let removed = self.remove_scheduled(id.0, |e| {
            matches!(e, Entry::Timeout(t) | Entry::Interval(t, _) if *t == id)
        });
        if removed {
            self.stats.timers_cleared += 1;
        }
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId(self.allocate_id());
        self.insert(id.0, self.now + self.frame_interval, Entry::Frame(id));
        self.stats.frames_requested += 1;
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.remove_scheduled(id.0, |e| matches!(e, Entry::Frame(f) if *f == id)) {
            self.stats.frames_cancelled += 1;
        }
    }

    fn create_surface(&mut self, size: Size) -> Option<SurfaceId> {
        if !self.drawing_context {
            self.stats.surfaces_refused += 1;
            return None;
        }
        let id = SurfaceId(self.allocate_id());
        self.surfaces.insert(id, Surface { size, glyphs: Vec::new() });
        self.stats.surfaces_created += 1;
        Some(id)
    }

    fn clear_surface(&mut self, id: SurfaceId) {
        if let Some(surface) = self.surfaces.get_mut(&id) {
            surface.glyphs.clear();
        }
    }

    fn draw_particle(&mut self, id: SurfaceId, particle: &Particle) {
        if let Some(surface) = self.surfaces.get_mut(&id) {
            surface.glyphs.push(DrawnGlyph {
                x: particle.x,
                y: particle.y,
                glyph: particle.glyph,
                size: particle.size,
                color: particle.color.clone(),
            });
        }
    }

    fn remove_surface(&mut self, id: SurfaceId) {
        if self.surfaces.remove(&id).is_some() {
            self.stats.surfaces_removed += 1;
            trace!(surface = id.0, "surface removed");
        }
    }

    fn observe_visibility(&mut self) -> Option<ObserverId> {
        if !self.intersection_detection {
            return None;
        }
        let id = ObserverId(self.allocate_id());
        self.observers.insert(id);
        self.stats.observers_attached += 1;
        Some(id)
    }

    fn unobserve(&mut self, id: ObserverId) {
        if self.observers.remove(&id) {
            self.stats.observers_detached += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(runtime: &mut Runtime, until_ms: u64) -> Vec<(u64, Wakeup)> {
        let mut fired = Vec::new();
        runtime.advance_to(Duration::from_millis(until_ms), |w, rt| {
            fired.push((rt.now().as_millis() as u64, w));
        });
        fired
    }

    #[test]
    fn test_timeouts_fire_in_due_order() {
        let mut rt = Runtime::new();
        let late = rt.set_timeout(Duration::from_millis(30));
        let early = rt.set_timeout(Duration::from_millis(10));
        let fired = collect(&mut rt, 50);
        assert_eq!(fired, vec![(10, Wakeup::Timer(early)), (30, Wakeup::Timer(late))]);
        assert_eq!(rt.now(), Duration::from_millis(50));
        assert_eq!(rt.pending_timers(), 0);
    }

    #[test]
    fn test_same_due_time_keeps_schedule_order() {
        let mut rt = Runtime::new();
        let a = rt.set_timeout(Duration::from_millis(5));
        let b = rt.set_timeout(Duration::from_millis(5));
        let fired: Vec<_> = collect(&mut rt, 5).into_iter().map(|(_, w)| w).collect();
        assert_eq!(fired, vec![Wakeup::Timer(a), Wakeup::Timer(b)]);
    }

    #[test]
    fn test_interval_repeats_until_cleared() {
        let mut rt = Runtime::new();
        let id = rt.set_interval(Duration::from_millis(100));
        assert_eq!(collect(&mut rt, 350).len(), 3);
        rt.clear_timer(id);
        assert!(collect(&mut rt, 1000).is_empty());
        assert_eq!(rt.stats().interval_ticks, 3);
        assert!(rt.stats().balanced());
    }

    #[test]
    fn test_frames_fire_one_interval_later() {
        let mut rt = Runtime::new().with_frame_interval(Duration::from_millis(20));
        let frame = rt.request_frame();
        assert!(collect(&mut rt, 19).is_empty());
        assert_eq!(collect(&mut rt, 20), vec![(20, Wakeup::Frame(frame))]);
    }

    #[test]
    fn test_dispatch_can_reschedule() {
        let mut rt = Runtime::new().with_frame_interval(Duration::from_millis(10));
        rt.request_frame();
        let mut frames = 0;
        rt.advance_to(Duration::from_millis(55), |w, rt| {
            if let Wakeup::Frame(_) = w {
                frames += 1;
                rt.request_frame();
            }
        });
        assert_eq!(frames, 5);
        assert_eq!(rt.pending_frames(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent_and_counted_once() {
        let mut rt = Runtime::new();
        let t = rt.set_timeout(Duration::from_millis(10));
        let f = rt.request_frame();
        rt.clear_timer(t);
        rt.clear_timer(t);
        rt.cancel_frame(f);
        rt.cancel_frame(f);
        assert_eq!(rt.stats().timers_cleared, 1);
        assert_eq!(rt.stats().frames_cancelled, 1);
        assert!(rt.is_idle());
    }

    #[test]
    fn test_kind_mismatch_is_ignored() {
        let mut rt = Runtime::new();
        let f = rt.request_frame();
        rt.clear_timer(TimerId(f.0));
        assert_eq!(rt.pending_frames(), 1);
    }

    #[test]
    fn test_surfaces_and_observers() {
        let mut rt = Runtime::new();
        let s = rt.create_surface(Size::new(40.0, 20.0)).unwrap();
        let p = Particle {
            x: 1.0,
            y: 2.0,
            target_x: 0.0,
            target_y: 0.0,
            vx: 0.0,
            vy: 0.0,
            glyph: 'x',
            size: 16.0,
            color: "red".into(),
        };
        rt.draw_particle(s, &p);
        assert_eq!(rt.surface(s).unwrap().glyphs.len(), 1);
        rt.clear_surface(s);
        assert!(rt.surface(s).unwrap().glyphs.is_empty());
        rt.remove_surface(s);
        assert_eq!(rt.live_surfaces(), 0);

        let o = rt.observe_visibility().unwrap();
        assert_eq!(rt.active_observers(), 1);
        rt.unobserve(o);
        assert!(rt.stats().balanced());
    }

    #[test]
    fn test_degraded_platform() {
        let mut rt = Runtime::new()
            .without_drawing_context()
            .without_intersection_detection();
        assert!(rt.create_surface(Size::new(1.0, 1.0)).is_none());
        assert!(rt.observe_visibility().is_none());
        assert_eq!(rt.stats().surfaces_refused, 1);
        assert!(rt.is_idle());
    }
}
