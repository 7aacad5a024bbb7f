mod morph;
mod particle;
mod scramble;
mod staggered;
mod typewriter;

pub use morph::MorphRenderer;
pub use particle::ParticleRenderer;
pub use scramble::{scramble_text, ScrambleRenderer};
pub use staggered::StaggeredRenderer;
pub use typewriter::TypewriterRenderer;

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::warn;

use crate::host::{Host, Size, SurfaceId, Wakeup};
use crate::request::{AnimationKind, AnimationRequest, CompletionCallback};
use crate::schedule::CharUnit;

/// Blinking text cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub glyph: char,
    pub visible: bool,
}

/// What a renderer currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    /// Unanimated fallback text
    Plain { text: String },
    Text { text: String, cursor: Option<Cursor> },
    Morph {
        text: String,
        fading: bool,
        transition_ms: f64,
    },
    /// Particles are drawn on `surface`; the text is shown once revealed
    Particles {
        text: String,
        surface: Option<SurfaceId>,
        revealed: bool,
    },
    /// Per-character timeline, interpolated by the presentation layer
    Timeline {
        started_at_ms: f64,
        units: Vec<CharUnit>,
    },
}

impl Visual {
    pub fn plain(text: impl Into<String>) -> Self {
        Visual::Plain { text: text.into() }
    }

    /// Text currently visible as characters, ignoring cursors and effects
    pub fn text(&self) -> String {
        match self {
            Visual::Plain { text } | Visual::Text { text, .. } | Visual::Morph { text, .. } => {
                text.clone()
            }
            Visual::Particles { text, revealed, .. } => {
                if *revealed {
                    text.clone()
                } else {
                    String::new()
                }
            }
            Visual::Timeline { units, .. } => units.iter().map(|u| u.glyph).collect(),
        }
    }
}

/// Completion callback with a fire counter
#[derive(Clone, Default)]
pub struct Completion {
    callback: Option<CompletionCallback>,
    fired: u32,
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("callback", &self.callback.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

impl Completion {
    pub fn new(callback: Option<CompletionCallback>) -> Self {
        Self { callback, fired: 0 }
    }

    pub fn fire(&mut self) {
        self.fired += 1;
        if let Some(callback) = &self.callback {
            callback();
        }
    }

    /// Fire unless already fired
    pub fn fire_once(&mut self) {
        if self.fired == 0 {
            self.fire();
        }
    }

    pub fn fired(&self) -> u32 {
        self.fired
    }
}

/// One running animation
///
/// A renderer owns every timer, frame and surface it acquires and must give
/// them all back in [`Renderer::teardown`].
pub trait Renderer {
    fn kind(&self) -> AnimationKind;

    /// Schedule the first step; called once
    fn start(&mut self, host: &mut dyn Host);

    /// React to a fired timer or frame
    ///
    /// Returns true when the wakeup belonged to this renderer.
    fn on_wakeup(&mut self, wakeup: Wakeup, host: &mut dyn Host) -> bool;

    fn visual(&self) -> Visual;

    /// True once the run has reached its final state
    fn is_complete(&self) -> bool;

    /// Release everything; safe to call more than once
    fn teardown(&mut self, host: &mut dyn Host);
}

/// Instantiate the renderer for the request's kind
///
/// `bounds` is the layout box of the element, used by particle surfaces.
/// Returns `None` for kinds without a renderer.
pub fn create(request: &AnimationRequest, bounds: Size) -> Option<Box<dyn Renderer>> {
    let renderer: Box<dyn Renderer> = match &request.kind {
        AnimationKind::Typewriter => Box::new(TypewriterRenderer::new(request)),
        AnimationKind::Particle => Box::new(ParticleRenderer::new(request, bounds)),
        AnimationKind::Morph => Box::new(MorphRenderer::new(request)),
        AnimationKind::Scramble => Box::new(ScrambleRenderer::new(request)),
        AnimationKind::SlideUp
        | AnimationKind::FadeIn
        | AnimationKind::Glitch
        | AnimationKind::Wave
        | AnimationKind::Blur => Box::new(StaggeredRenderer::new(request)),
        AnimationKind::Unsupported(tag) => {
            warn!(kind = %tag, "No renderer for animation kind, showing plain text");
            return None;
        }
    };
    Some(renderer)
}

/// RNG for randomized effects, seeded when the request asks for it
pub(crate) fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_create_dispatches_every_catalog_kind() {
        for kind in AnimationKind::CATALOG {
            let request = AnimationRequest::new("abc", kind.clone());
            let renderer = create(&request, Size::new(100.0, 20.0)).unwrap();
            assert_eq!(renderer.kind(), kind);
        }
    }

    #[test]
    fn test_unsupported_kind_has_no_renderer() {
        let request = AnimationRequest::new("abc", AnimationKind::from_tag("flip"));
        assert!(create(&request, Size::default()).is_none());
    }

    #[test]
    fn test_completion_fire_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut completion = Completion::new(Some(Rc::new(move || counter.set(counter.get() + 1))));
        completion.fire_once();
        completion.fire_once();
        assert_eq!(calls.get(), 1);
        completion.fire();
        assert_eq!(calls.get(), 2);
        assert_eq!(completion.fired(), 2);
    }

    #[test]
    fn test_visual_text() {
        let hidden = Visual::Particles {
            text: "hi".into(),
            surface: None,
            revealed: false,
        };
        assert_eq!(hidden.text(), "");
        assert_eq!(Visual::plain("hi").text(), "hi");
    }

    #[test]
    fn test_visual_serializes_with_type_tag() {
        let json = serde_json::to_value(Visual::plain("x")).unwrap();
        assert_eq!(json["type"], "plain");
        assert_eq!(json["text"], "x");
    }
}
