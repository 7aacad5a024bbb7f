//! Trigger and lifecycle controller
//!
//! One phase variable and one transition table decide whether the
//! animation may run. The controller owns at most one renderer at a time
//! and tears it down before another run starts.

use serde::Serialize;
use tracing::debug;

use crate::host::{Host, Size, Wakeup};
use crate::render::{self, Renderer, Visual};
use crate::request::{AnimationRequest, TriggerMode};
use crate::text::measure_text;
use crate::visibility::{Rect, ViewportObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Not triggered; the fallback text is shown
    Idle,
    /// Waiting for the element to become visible
    Armed,
    Running,
    /// The run reached its final state and stays on screen
    Settled,
}

impl Phase {
    /// Whether the renderer output is shown rather than the fallback
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Running | Phase::Settled)
    }
}

/// Externally observed input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    PointerEnter,
    PointerLeave,
    Click,
    /// Intersection ratio reported by the platform
    Intersection { ratio: f64 },
    /// Element and viewport geometry; the ratio is computed here
    Viewport { target: Rect, root: Rect },
}

/// Controller-internal events driving the transition table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Mount,
    PointerEnter,
    PointerLeave,
    Click,
    Visible,
    Hidden,
    Completed,
    Unmount,
}

/// Which inputs a trigger mode listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Subscriptions {
    pub pointer: bool,
    pub click: bool,
    pub visibility: bool,
}

impl Subscriptions {
    pub fn for_trigger(trigger: TriggerMode) -> Self {
        Self {
            pointer: trigger == TriggerMode::Hover,
            click: trigger == TriggerMode::Click,
            visibility: trigger == TriggerMode::View,
        }
    }
}

/// Next phase for `event` in `phase` under `trigger`
///
/// Pairs not listed leave the phase unchanged.
pub fn transition(trigger: TriggerMode, phase: Phase, event: Event) -> Phase {
    use Event as E;
    use Phase as P;

    if event == E::Unmount {
        return P::Idle;
    }
    match (trigger, phase, event) {
        (TriggerMode::Manual, _, _) => P::Idle,

        (_, P::Running, E::Completed) => P::Settled,

        (TriggerMode::Auto, P::Idle, E::Mount) => P::Running,

        (TriggerMode::Hover, P::Idle, E::PointerEnter) => P::Running,
        (TriggerMode::Hover, P::Running | P::Settled, E::PointerLeave) => P::Idle,

        (TriggerMode::Click, P::Idle, E::Click) => P::Running,

        (TriggerMode::View, P::Idle, E::Mount) => P::Armed,
        (TriggerMode::View, P::Armed, E::Visible) => P::Running,
        (TriggerMode::View, P::Running | P::Settled, E::Hidden) => P::Armed,

        (_, phase, _) => phase,
    }
}

/// A mounted piece of animated text
pub struct TextAnimate {
    request: AnimationRequest,
    bounds: Option<Size>,
    phase: Phase,
    mounted: bool,
    runs: u32,
    observer: Option<ViewportObserver>,
    renderer: Option<Box<dyn Renderer>>,
}

impl std::fmt::Debug for TextAnimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnimate")
            .field("kind", &self.request.kind)
            .field("trigger", &self.request.trigger)
            .field("phase", &self.phase)
            .field("mounted", &self.mounted)
            .field("runs", &self.runs)
            .finish_non_exhaustive()
    }
}

impl TextAnimate {
    pub fn new(request: AnimationRequest) -> Self {
        Self {
            request,
            bounds: None,
            phase: Phase::Idle,
            mounted: false,
            runs: 0,
            observer: None,
            renderer: None,
        }
    }

    pub fn request(&self) -> &AnimationRequest {
        &self.request
    }

    /// Layout box of the element, used for particle surfaces
    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = Some(bounds);
    }

    /// Bounds set by the host, or the measured extent of the text
    pub fn bounds(&self) -> Size {
        self.bounds.unwrap_or_else(|| {
            let metrics = measure_text(&self.request.text, self.request.particle.size);
            Size::new(metrics.width, metrics.height)
        })
    }

    pub fn subscriptions(&self) -> Subscriptions {
        Subscriptions::for_trigger(self.request.trigger)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn should_animate(&self) -> bool {
        self.phase.is_active()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of runs started since construction
    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn is_visible(&self) -> Option<bool> {
        self.observer.as_ref().map(ViewportObserver::is_visible)
    }

    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    pub fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        debug!(kind = %self.request.kind, trigger = %self.request.trigger, "Mounted");

        if self.subscriptions().visibility {
            let mut observer = ViewportObserver::new(self.request.visibility.clone());
            observer.attach(host);
            self.observer = Some(observer);
        }
        self.apply(Event::Mount, host);

        // Without intersection detection the observer is visible already
        if self.is_visible() == Some(true) {
            self.apply(Event::Visible, host);
        }
    }

    /// Feed an external signal; ignored unless the trigger listens to it
    pub fn handle(&mut self, signal: Signal, host: &mut dyn Host) {
        if !self.mounted {
            return;
        }
        let subs = self.subscriptions();
        let event = match signal {
            Signal::PointerEnter if subs.pointer => Event::PointerEnter,
            Signal::PointerLeave if subs.pointer => Event::PointerLeave,
            Signal::Click if subs.click => Event::Click,
            Signal::Intersection { ratio } if subs.visibility => {
                match self.observe(|o| o.report(ratio)) {
                    Some(event) => event,
                    None => return,
                }
            }
            Signal::Viewport { target, root } if subs.visibility => {
                match self.observe(|o| o.report_geometry(target, root)) {
                    Some(event) => event,
                    None => return,
                }
            }
            _ => return,
        };
        self.apply(event, host);
    }

    fn observe(&mut self, report: impl FnOnce(&mut ViewportObserver) -> bool) -> Option<Event> {
        let observer = self.observer.as_mut()?;
        let visible = report(observer);
        Some(if visible { Event::Visible } else { Event::Hidden })
    }

    /// Route a fired timer or frame to the running renderer
    ///
    /// Returns true when this instance owned the wakeup.
    pub fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool {
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        if !renderer.on_wakeup(wakeup, host) {
            return false;
        }
        if renderer.is_complete() {
            self.apply(Event::Completed, host);
        }
        true
    }

    /// What should be on screen right now
    pub fn view(&self) -> Visual {
        match (&self.renderer, self.phase.is_active()) {
            (Some(renderer), true) => renderer.visual(),
            _ => Visual::plain(self.request.text.clone()),
        }
    }

    /// Supersede the current run with a fresh one
    ///
    /// Only an active controller restarts; otherwise nothing happens.
    pub fn restart(&mut self, host: &mut dyn Host) {
        if self.mounted && self.phase.is_active() {
            self.phase = Phase::Running;
            self.start_run(host);
        }
    }

    /// Tear everything down; safe to call repeatedly
    pub fn unmount(&mut self, host: &mut dyn Host) {
        if let Some(mut observer) = self.observer.take() {
            observer.detach(host);
        }
        self.apply(Event::Unmount, host);
        self.stop_run(host);
        if self.mounted {
            debug!(kind = %self.request.kind, "Unmounted");
        }
        self.mounted = false;
    }

    fn apply(&mut self, event: Event, host: &mut dyn Host) {
        let next = transition(self.request.trigger, self.phase, event);
        if next == self.phase {
            return;
        }
        debug!(from = ?self.phase, to = ?next, ?event, "Phase transition");
        let was_active = self.phase.is_active();
        self.phase = next;

        match (was_active, next.is_active()) {
            (false, true) => self.start_run(host),
            (true, false) => self.stop_run(host),
            _ => {}
        }
    }

    fn start_run(&mut self, host: &mut dyn Host) {
        self.stop_run(host);
        self.runs += 1;

        let Some(mut renderer) = render::create(&self.request, self.bounds()) else {
            return;
        };
        renderer.start(host);
        let complete = renderer.is_complete();
        self.renderer = Some(renderer);
        if complete {
            self.apply(Event::Completed, host);
        }
    }

    fn stop_run(&mut self, host: &mut dyn Host) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.teardown(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AnimationKind;
    use crate::runtime::Runtime;

    const ALL_EVENTS: [Event; 8] = [
        Event::Mount,
        Event::PointerEnter,
        Event::PointerLeave,
        Event::Click,
        Event::Visible,
        Event::Hidden,
        Event::Completed,
        Event::Unmount,
    ];

    const ALL_PHASES: [Phase; 4] = [Phase::Idle, Phase::Armed, Phase::Running, Phase::Settled];

    #[test]
    fn test_manual_never_leaves_idle() {
        for phase in ALL_PHASES {
            for event in ALL_EVENTS {
                assert_eq!(transition(TriggerMode::Manual, phase, event), Phase::Idle);
            }
        }
    }

    #[test]
    fn test_hover_has_no_armed_phase() {
        for phase in ALL_PHASES {
            for event in ALL_EVENTS {
                if phase != Phase::Armed {
                    assert_ne!(transition(TriggerMode::Hover, phase, event), Phase::Armed);
                }
            }
        }
    }

    #[test]
    fn test_click_is_permanent() {
        let running = transition(TriggerMode::Click, Phase::Idle, Event::Click);
        assert_eq!(running, Phase::Running);
        assert_eq!(transition(TriggerMode::Click, running, Event::Click), Phase::Running);
        assert_eq!(transition(TriggerMode::Click, running, Event::PointerLeave), Phase::Running);
    }

    #[test]
    fn test_view_transitions() {
        assert_eq!(transition(TriggerMode::View, Phase::Idle, Event::Mount), Phase::Armed);
        assert_eq!(transition(TriggerMode::View, Phase::Idle, Event::Visible), Phase::Idle);
        assert_eq!(transition(TriggerMode::View, Phase::Armed, Event::Visible), Phase::Running);
        assert_eq!(transition(TriggerMode::View, Phase::Settled, Event::Hidden), Phase::Armed);
    }

    #[test]
    fn test_auto_runs_on_mount() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(AnimationRequest::new("go", AnimationKind::FadeIn));
        assert_eq!(ctl.view(), Visual::plain("go"));
        ctl.mount(&mut host);
        assert_eq!(ctl.phase(), Phase::Running);
        assert!(matches!(ctl.view(), Visual::Timeline { .. }));
    }

    #[test]
    fn test_hover_reverts_on_leave() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("hover me", AnimationKind::Typewriter).trigger(TriggerMode::Hover),
        );
        ctl.mount(&mut host);
        assert_eq!(ctl.phase(), Phase::Idle);

        ctl.handle(Signal::PointerEnter, &mut host);
        assert_eq!(ctl.phase(), Phase::Running);
        assert!(host.pending_timers() > 0);

        ctl.handle(Signal::PointerLeave, &mut host);
        assert_eq!(ctl.phase(), Phase::Idle);
        assert_eq!(ctl.view(), Visual::plain("hover me"));
        assert_eq!(host.pending_timers(), 0);

        ctl.handle(Signal::PointerEnter, &mut host);
        assert_eq!(ctl.runs(), 2);
    }

    #[test]
    fn test_signals_outside_subscription_are_ignored() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("x", AnimationKind::FadeIn).trigger(TriggerMode::Click),
        );
        ctl.mount(&mut host);
        ctl.handle(Signal::PointerEnter, &mut host);
        ctl.handle(Signal::Intersection { ratio: 1.0 }, &mut host);
        assert_eq!(ctl.phase(), Phase::Idle);
        ctl.handle(Signal::Click, &mut host);
        assert_eq!(ctl.phase(), Phase::Running);
    }

    #[test]
    fn test_view_fails_open_without_detection() {
        let mut host = Runtime::new().without_intersection_detection();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("seen", AnimationKind::SlideUp).trigger(TriggerMode::View),
        );
        ctl.mount(&mut host);
        assert_eq!(ctl.phase(), Phase::Running);
    }

    #[test]
    fn test_view_threshold_gates_start() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("scroll", AnimationKind::Blur).trigger(TriggerMode::View),
        );
        ctl.mount(&mut host);
        assert_eq!(ctl.phase(), Phase::Armed);
        ctl.handle(Signal::Intersection { ratio: 0.05 }, &mut host);
        assert_eq!(ctl.phase(), Phase::Armed);
        ctl.handle(Signal::Intersection { ratio: 0.1 }, &mut host);
        assert_eq!(ctl.phase(), Phase::Running);
    }

    #[test]
    fn test_view_geometry_signal() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("geo", AnimationKind::FadeIn).trigger(TriggerMode::View),
        );
        ctl.mount(&mut host);
        let root = Rect::new(0.0, 0.0, 80.0, 24.0);
        ctl.handle(
            Signal::Viewport { target: Rect::new(0.0, 30.0, 10.0, 1.0), root },
            &mut host,
        );
        assert_eq!(ctl.phase(), Phase::Armed);
        ctl.handle(
            Signal::Viewport { target: Rect::new(0.0, 10.0, 10.0, 1.0), root },
            &mut host,
        );
        assert_eq!(ctl.phase(), Phase::Running);
    }

    #[test]
    fn test_unsupported_kind_shows_plain_text() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(AnimationRequest::new("flip", AnimationKind::from_tag("flip")));
        ctl.mount(&mut host);
        assert_eq!(ctl.phase(), Phase::Running);
        assert_eq!(ctl.view(), Visual::plain("flip"));
        assert!(host.is_idle());
    }

    #[test]
    fn test_restart_supersedes_run() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(AnimationRequest::new("again", AnimationKind::Scramble));
        ctl.mount(&mut host);
        let scheduled = host.pending_timers();
        ctl.restart(&mut host);
        assert_eq!(host.pending_timers(), scheduled);
        assert_eq!(ctl.runs(), 2);
        assert_eq!(host.stats().timers_cleared, 1);
    }

    #[test]
    fn test_unmount_is_idempotent() {
        let mut host = Runtime::new();
        let mut ctl = TextAnimate::new(
            AnimationRequest::new("bye", AnimationKind::Particle).trigger(TriggerMode::View),
        );
        ctl.mount(&mut host);
        ctl.handle(Signal::Intersection { ratio: 1.0 }, &mut host);
        ctl.unmount(&mut host);
        ctl.unmount(&mut host);
        assert!(host.is_idle());
        assert!(host.stats().balanced());
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(!ctl.is_mounted());
    }

    #[test]
    fn test_measured_bounds() {
        let ctl = TextAnimate::new(AnimationRequest::new("abcd", AnimationKind::Particle).particles(
            10,
            10.0,
            None,
        ));
        let bounds = ctl.bounds();
        assert!((bounds.width - 24.0).abs() < 1e-9);
        assert!((bounds.height - 12.0).abs() < 1e-9);
    }
}
