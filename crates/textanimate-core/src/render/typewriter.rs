//! Typewriter reveal with blinking cursor

use std::time::Duration;

use tracing::debug;

use super::{Completion, Cursor, Renderer, Visual};
use crate::handles::HandleSet;
use crate::host::{Host, TimerId, Wakeup};
use crate::request::{AnimationKind, AnimationRequest, CursorParams, Repeat};
use crate::timing::per_char_interval;

/// Time between cursor visibility toggles
pub const CURSOR_BLINK: Duration = Duration::from_millis(530);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Reveal the next character, or finish the pass
    Type,
    /// Clear the text and start the next pass
    Retype,
}

#[derive(Debug)]
pub struct TypewriterRenderer {
    chars: Vec<char>,
    delay: Duration,
    interval: Option<Duration>,
    reverse: bool,
    repeat: Repeat,
    cursor: CursorParams,
    shown: usize,
    repeats_done: u32,
    cursor_visible: bool,
    pending: Option<(TimerId, Step)>,
    blink: Option<TimerId>,
    handles: HandleSet,
    completion: Completion,
}

impl TypewriterRenderer {
    pub fn new(request: &AnimationRequest) -> Self {
        let chars: Vec<char> = request.text.chars().collect();
        let interval = per_char_interval(request.duration(), request.stagger(), chars.len());
        Self {
            chars,
            delay: request.delay(),
            interval,
            reverse: request.reverse,
            repeat: request.repeat,
            cursor: request.cursor,
            shown: 0,
            repeats_done: 0,
            cursor_visible: true,
            pending: None,
            blink: None,
            handles: HandleSet::new(),
            completion: Completion::new(request.on_complete.clone()),
        }
    }

    /// Text revealed so far
    pub fn displayed(&self) -> String {
        let n = self.chars.len();
        let range = if self.reverse { n - self.shown..n } else { 0..self.shown };
        self.chars[range].iter().collect()
    }

    fn schedule(&mut self, host: &mut dyn Host, after: Duration, step: Step) {
        let id = self.handles.timeout(host, after);
        self.pending = Some((id, step));
    }

    fn type_next(&mut self, host: &mut dyn Host) {
        let Some(interval) = self.interval else {
            return;
        };
        if self.shown < self.chars.len() {
            self.shown += 1;
            self.schedule(host, interval, Step::Type);
            return;
        }

        self.completion.fire();
        if self.repeat.allows(self.repeats_done) {
            self.repeats_done += 1;
            self.schedule(host, self.repeat.pause(), Step::Retype);
        } else if let Some(blink) = self.blink.take() {
            self.handles.clear_timer(host, blink);
        }
    }
}

impl Renderer for TypewriterRenderer {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Typewriter
    }

    fn start(&mut self, host: &mut dyn Host) {
        if self.chars.is_empty() {
            self.completion.fire_once();
            return;
        }
        self.schedule(host, self.delay, Step::Type);
        if self.cursor.show {
            self.blink = Some(self.handles.interval(host, CURSOR_BLINK));
        }
        debug!(chars = self.chars.len(), interval = ?self.interval, "Typewriter started");
    }

    fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool {
        let Wakeup::Timer(id) = wakeup else {
            return false;
        };
        if !self.handles.claim_timer(id) {
            return false;
        }

        if self.blink == Some(id) {
            self.cursor_visible = !self.cursor_visible;
            return true;
        }
        match self.pending.take() {
            Some((pending, Step::Type)) if pending == id => self.type_next(host),
            Some((pending, Step::Retype)) if pending == id => {
                self.shown = 0;
                self.type_next(host);
            }
            other => self.pending = other,
        }
        true
    }

    fn visual(&self) -> Visual {
        let cursor = (self.cursor.show && self.shown < self.chars.len()).then_some(Cursor {
            glyph: self.cursor.glyph,
            visible: self.cursor_visible,
        });
        Visual::Text {
            text: self.displayed(),
            cursor,
        }
    }

    fn is_complete(&self) -> bool {
        self.shown == self.chars.len() && self.pending.is_none()
    }

    fn teardown(&mut self, host: &mut dyn Host) {
        self.pending = None;
        self.blink = None;
        self.handles.release(host);
    }
}
