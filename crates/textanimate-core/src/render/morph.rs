//! Morph between a list of strings

use std::time::Duration;

use tracing::debug;

use super::{Completion, Renderer, Visual};
use crate::handles::HandleSet;
use crate::host::{Host, TimerId, Wakeup};
use crate::request::{AnimationKind, AnimationRequest};
use crate::timing::as_millis_f64;

#[derive(Debug)]
pub struct MorphRenderer {
    texts: Vec<String>,
    index: usize,
    fading: bool,
    delay: Duration,
    interval: Duration,
    transition: Duration,
    start: Option<TimerId>,
    ticker: Option<TimerId>,
    swap: Option<TimerId>,
    handles: HandleSet,
    completion: Completion,
}

impl MorphRenderer {
    pub fn new(request: &AnimationRequest) -> Self {
        Self {
            texts: request.morph_cycle(),
            index: 0,
            fading: false,
            delay: request.delay(),
            interval: request.morph.interval,
            transition: request.duration() / 2,
            start: None,
            ticker: None,
            swap: None,
            handles: HandleSet::new(),
            completion: Completion::new(request.on_complete.clone()),
        }
    }

    pub fn current(&self) -> &str {
        self.texts.get(self.index).map(String::as_str).unwrap_or_default()
    }

    pub fn is_fading(&self) -> bool {
        self.fading
    }

    fn is_static(&self) -> bool {
        self.texts.len() <= 1
    }

    fn begin_fade(&mut self, host: &mut dyn Host) {
        self.fading = true;
        if let Some(previous) = self.swap.take() {
            self.handles.clear_timer(host, previous);
        }
        self.swap = Some(self.handles.timeout(host, self.transition));
    }

    fn swap_text(&mut self) {
        self.index = (self.index + 1) % self.texts.len();
        self.fading = false;
    }
}

impl Renderer for MorphRenderer {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Morph
    }

    fn start(&mut self, host: &mut dyn Host) {
        if self.is_static() {
            if self.current().is_empty() {
                self.completion.fire_once();
            }
            return;
        }
        self.start = Some(self.handles.timeout(host, self.delay));
        debug!(texts = self.texts.len(), interval = ?self.interval, "Morph started");
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool {
        let Wakeup::Timer(id) = wakeup else {
            return false;
        };
        if !self.handles.claim_timer(id) {
            return false;
        }

        if self.start == Some(id) {
            self.start = None;
            self.ticker = Some(self.handles.interval(host, self.interval));
        } else if self.ticker == Some(id) {
            self.begin_fade(host);
        } else if self.swap == Some(id) {
            self.swap = None;
            self.swap_text();
        }
        true
    }

    fn visual(&self) -> Visual {
        Visual::Morph {
            text: self.current().to_string(),
            fading: self.fading,
            transition_ms: as_millis_f64(self.transition),
        }
    }

    /// A cycling morph never finishes; a static one is settled from the start
    fn is_complete(&self) -> bool {
        self.is_static()
    }

    fn teardown(&mut self, host: &mut dyn Host) {
        self.start = None;
        self.ticker = None;
        self.swap = None;
        self.handles.release(host);
    }
}
