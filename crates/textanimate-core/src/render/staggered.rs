//! Timeline-driven reveals: fade, slide-up, blur, wave and glitch
//!
//! The renderer only computes the per-character schedule. Interpolation
//! belongs to the presentation layer; the single timer here marks the end
//! of the schedule so completion can be reported.

use tracing::debug;

use super::{rng_for, Completion, Renderer, Visual};
use crate::handles::HandleSet;
use crate::host::{Host, Wakeup};
use crate::request::{AnimationKind, AnimationRequest};
use crate::schedule::{self, CharUnit};
use crate::timing::{as_millis_f64, millis};

#[derive(Debug)]
pub struct StaggeredRenderer {
    kind: AnimationKind,
    units: Vec<CharUnit>,
    started_at_ms: f64,
    done: bool,
    handles: HandleSet,
    completion: Completion,
}

impl StaggeredRenderer {
    pub fn new(request: &AnimationRequest) -> Self {
        let mut rng = rng_for(request.seed);
        Self {
            kind: request.kind.clone(),
            units: schedule::build(request, &mut rng),
            started_at_ms: 0.0,
            done: false,
            handles: HandleSet::new(),
            completion: Completion::new(request.on_complete.clone()),
        }
    }

    pub fn units(&self) -> &[CharUnit] {
        &self.units
    }
}

impl Renderer for StaggeredRenderer {
    fn kind(&self) -> AnimationKind {
        self.kind.clone()
    }

    fn start(&mut self, host: &mut dyn Host) {
        self.started_at_ms = as_millis_f64(host.now());
        if self.units.is_empty() {
            self.done = true;
            self.completion.fire_once();
            return;
        }
        match schedule::schedule_end_ms(&self.units) {
            Some(end_ms) => {
                self.handles.timeout(host, millis(end_ms));
            }
            None => debug!(kind = %self.kind, "Looping timeline, no completion scheduled"),
        }
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, _host: &mut dyn Host) -> bool {
        let Wakeup::Timer(id) = wakeup else {
            return false;
        };
        if !self.handles.claim_timer(id) {
            return false;
        }
        self.done = true;
        self.completion.fire_once();
        true
    }

    fn visual(&self) -> Visual {
        Visual::Timeline {
            started_at_ms: self.started_at_ms,
            units: self.units.clone(),
        }
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn teardown(&mut self, host: &mut dyn Host) {
        self.handles.release(host);
    }
}
