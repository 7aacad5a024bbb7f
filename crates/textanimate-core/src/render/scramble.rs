//! Scramble-decode reveal

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::{rng_for, Completion, Renderer, Visual};
use crate::handles::HandleSet;
use crate::host::{Host, Wakeup};
use crate::request::{AnimationKind, AnimationRequest};
use crate::text::random_char;
use crate::timing::progress;

/// Text at reveal progress `p`
///
/// Character `i` shows its true value once `p >= (i + 1) / len`; any other
/// non-whitespace character is replaced by a fresh decoy. Whitespace is
/// always kept.
pub fn scramble_text<R: Rng + ?Sized>(target: &str, p: f64, rng: &mut R) -> String {
    let len = target.chars().count();
    target
        .chars()
        .enumerate()
        .map(|(i, ch)| {
            let threshold = (i + 1) as f64 / len as f64;
            if p >= threshold || ch.is_whitespace() {
                ch
            } else {
                random_char(rng)
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct ScrambleRenderer {
    target: String,
    delay: Duration,
    duration: Duration,
    displayed: String,
    started_at: Option<Duration>,
    done: bool,
    rng: StdRng,
    handles: HandleSet,
    completion: Completion,
}

impl ScrambleRenderer {
    pub fn new(request: &AnimationRequest) -> Self {
        let mut rng = rng_for(request.seed);
        let displayed = scramble_text(&request.text, 0.0, &mut rng);
        Self {
            target: request.text.clone(),
            delay: request.delay(),
            duration: request.duration(),
            displayed,
            started_at: None,
            done: false,
            rng,
            handles: HandleSet::new(),
            completion: Completion::new(request.on_complete.clone()),
        }
    }

    fn finish(&mut self) {
        self.displayed = self.target.clone();
        self.done = true;
        self.completion.fire_once();
    }

    fn tick(&mut self, host: &mut dyn Host) {
        let now = host.now();
        let started = *self.started_at.get_or_insert(now);
        let p = progress(now.saturating_sub(started), self.duration);

        if p >= 1.0 {
            self.finish();
            return;
        }
        self.displayed = scramble_text(&self.target, p, &mut self.rng);
        self.handles.frame(host);
    }
}

impl Renderer for ScrambleRenderer {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Scramble
    }

    fn start(&mut self, host: &mut dyn Host) {
        if self.target.is_empty() {
            self.finish();
            return;
        }
        self.handles.timeout(host, self.delay);
        debug!(chars = self.target.chars().count(), "Scramble started");
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool {
        let claimed = match wakeup {
            Wakeup::Timer(id) => self.handles.claim_timer(id),
            Wakeup::Frame(id) => self.handles.claim_frame(id),
        };
        if !claimed {
            return false;
        }
        match wakeup {
            Wakeup::Timer(_) => {
                self.handles.frame(host);
            }
            Wakeup::Frame(_) => self.tick(host),
        }
        true
    }

    fn visual(&self) -> Visual {
        Visual::Text {
            text: self.displayed.clone(),
            cursor: None,
        }
    }

    fn is_complete(&self) -> bool {
        self.done
    }

    fn teardown(&mut self, host: &mut dyn Host) {
        self.handles.release(host);
    }
}
