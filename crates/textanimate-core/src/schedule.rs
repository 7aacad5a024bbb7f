//! Per-character timeline model
//!
//! The staggered reveals (fade, slide-up, blur, wave, glitch) never touch
//! pixels. Each character becomes a [`CharUnit`] with its own start offset
//! and keyframes, and the presentation layer interpolates between them.

use rand::Rng;
use serde::Serialize;

use crate::easing::EasingType;
use crate::request::{AnimationKind, AnimationRequest};
use crate::text::layout_glyph;
use crate::timing::{as_millis_f64, char_delay};

/// Upper bound of the random start offset added to each glitch character
pub const GLITCH_JITTER_MS: f64 = 200.0;

/// Visual properties of one character at one point of its timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisualState {
    pub opacity: f64,
    /// Horizontal translation in layout units
    pub x: f64,
    /// Vertical translation in layout units, positive is down
    pub y: f64,
    /// Blur radius in layout units
    pub blur: f64,
}

impl VisualState {
    pub const VISIBLE: VisualState = VisualState {
        opacity: 1.0,
        x: 0.0,
        y: 0.0,
        blur: 0.0,
    };

    pub const HIDDEN: VisualState = VisualState {
        opacity: 0.0,
        x: 0.0,
        y: 0.0,
        blur: 0.0,
    };

    const fn at(opacity: f64, x: f64, y: f64) -> Self {
        Self { opacity, x, y, blur: 0.0 }
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::VISIBLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Keyframe {
    /// Position in the unit's duration, 0.0 to 1.0
    pub offset: f64,
    pub state: VisualState,
}

const fn kf(offset: f64, state: VisualState) -> Keyframe {
    Keyframe { offset, state }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Iteration {
    Once,
    Infinite,
}

/// One character's slot on the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharUnit {
    pub index: usize,
    pub glyph: char,
    pub delay_ms: f64,
    pub duration_ms: f64,
    pub keyframes: Vec<Keyframe>,
    pub iteration: Iteration,
    pub easing: EasingType,
}

impl CharUnit {
    /// Time at which a one-shot unit reaches its final keyframe
    pub fn end_ms(&self) -> Option<f64> {
        match self.iteration {
            Iteration::Once => Some(self.delay_ms + self.duration_ms),
            Iteration::Infinite => None,
        }
    }
}

/// Keyframes, iteration and easing for a timeline kind
///
/// Returns `None` for kinds that are not timeline driven.
pub fn keyframes_for(request: &AnimationRequest) -> Option<(Vec<Keyframe>, Iteration, EasingType)> {
    let easing = request.easing;
    let frames = match request.kind {
        AnimationKind::FadeIn => (
            vec![kf(0.0, VisualState::HIDDEN), kf(1.0, VisualState::VISIBLE)],
            Iteration::Once,
            easing,
        ),
        AnimationKind::SlideUp => (
            vec![kf(0.0, VisualState::at(0.0, 0.0, 20.0)), kf(1.0, VisualState::VISIBLE)],
            Iteration::Once,
            easing,
        ),
        AnimationKind::Blur => (
            vec![
                kf(0.0, VisualState { blur: 10.0, ..VisualState::HIDDEN }),
                kf(1.0, VisualState::VISIBLE),
            ],
            Iteration::Once,
            easing,
        ),
        AnimationKind::Wave => {
            let amp = request.wave.amplitude;
            (
                vec![
                    kf(0.0, VisualState::VISIBLE),
                    kf(0.5, VisualState::at(1.0, 0.0, -amp)),
                    kf(1.0, VisualState::VISIBLE),
                ],
                Iteration::Infinite,
                EasingType::EaseInOut,
            )
        }
        AnimationKind::Glitch => {
            let g = request.glitch.intensity;
            (
                vec![
                    kf(0.0, VisualState::HIDDEN),
                    kf(0.1, VisualState::at(0.5, g * 5.0, g * 2.0)),
                    kf(0.2, VisualState::at(0.8, -g * 3.0, -g * 2.0)),
                    kf(0.3, VisualState::at(0.6, g * 2.0, g * 3.0)),
                    kf(0.4, VisualState::at(1.0, -g, 0.0)),
                    kf(0.5, VisualState::at(0.9, g, -g)),
                    kf(0.6, VisualState::at(1.0, 0.0, g)),
                    kf(0.7, VisualState::at(0.95, -g * 0.5, 0.0)),
                    kf(1.0, VisualState::VISIBLE),
                ],
                Iteration::Once,
                EasingType::Linear,
            )
        }
        _ => return None,
    };
    Some(frames)
}

/// Build the per-character timeline for a request
///
/// Whitespace is kept as a non-breaking placeholder so the layout does not
/// collapse. Glitch offsets are drawn from `rng`; every other kind uses
/// `delay + index * stagger`.
pub fn build<R: Rng + ?Sized>(request: &AnimationRequest, rng: &mut R) -> Vec<CharUnit> {
    let Some((keyframes, iteration, easing)) = keyframes_for(request) else {
        return Vec::new();
    };

    let duration_ms = match request.kind {
        AnimationKind::Wave => as_millis_f64(request.duration()) / request.wave.frequency,
        _ => as_millis_f64(request.duration()),
    };
    let delay = request.delay();
    let stagger = request.stagger();

    request
        .text
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            let delay_ms = match request.kind {
                AnimationKind::Glitch => {
                    as_millis_f64(delay) + rng.random_range(0.0..GLITCH_JITTER_MS)
                }
                _ => as_millis_f64(char_delay(delay, stagger, index)),
            };
            CharUnit {
                index,
                glyph: layout_glyph(ch),
                delay_ms,
                duration_ms,
                keyframes: keyframes.clone(),
                iteration,
                easing,
            }
        })
        .collect()
}

/// Time at which every unit has finished
///
/// `Some(0.0)` for an empty timeline, `None` when any unit loops forever.
pub fn schedule_end_ms(units: &[CharUnit]) -> Option<f64> {
    units
        .iter()
        .try_fold(0.0_f64, |end, unit| unit.end_ms().map(|e| end.max(e)))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::text::NBSP;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_stagger_offsets() {
        let request = AnimationRequest::new("abc", AnimationKind::FadeIn)
            .delay_ms(100)
            .stagger_ms(30);
        let units = build(&request, &mut rng());
        let delays: Vec<f64> = units.iter().map(|u| u.delay_ms).collect();
        assert_eq!(delays, vec![100.0, 130.0, 160.0]);
        assert_eq!(schedule_end_ms(&units), Some(1160.0));
    }

    #[test]
    fn test_whitespace_becomes_placeholder() {
        let request = AnimationRequest::new("a b", AnimationKind::SlideUp);
        let units = build(&request, &mut rng());
        assert_eq!(units[1].glyph, NBSP);
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn test_slide_up_keyframes() {
        let request = AnimationRequest::new("x", AnimationKind::SlideUp);
        let (frames, iteration, _) = keyframes_for(&request).unwrap();
        assert_eq!(iteration, Iteration::Once);
        assert_eq!(frames[0].state.y, 20.0);
        assert_eq!(frames[0].state.opacity, 0.0);
        assert_eq!(frames.last().unwrap().state, VisualState::VISIBLE);
    }

    #[test]
    fn test_wave_loops_forever() {
        let request = AnimationRequest::new("hey", AnimationKind::Wave).wave(12.0, 2.0);
        let units = build(&request, &mut rng());
        assert!(units.iter().all(|u| u.iteration == Iteration::Infinite));
        assert_eq!(units[0].duration_ms, 500.0);
        assert_eq!(units[0].keyframes[1].state.y, -12.0);
        assert_eq!(schedule_end_ms(&units), None);
    }

    #[test]
    fn test_glitch_delays_are_jittered_within_window() {
        let request = AnimationRequest::new("glitchy text", AnimationKind::Glitch).delay_ms(50);
        let units = build(&request, &mut rng());
        for unit in &units {
            assert!(unit.delay_ms >= 50.0 && unit.delay_ms < 250.0);
        }
        assert_eq!(units[0].keyframes.len(), 9);
    }

    #[test]
    fn test_glitch_offsets_scale_with_intensity() {
        let request = AnimationRequest::new("g", AnimationKind::Glitch).glitch_intensity(2.0);
        let (frames, _, _) = keyframes_for(&request).unwrap();
        assert_eq!(frames[1].state.x, 10.0);
        assert_eq!(frames[2].state.y, -4.0);
    }

    #[test]
    fn test_empty_text_ends_immediately() {
        let request = AnimationRequest::new("", AnimationKind::Wave);
        let units = build(&request, &mut rng());
        assert!(units.is_empty());
        assert_eq!(schedule_end_ms(&units), Some(0.0));
    }

    #[test]
    fn test_non_timeline_kinds() {
        for kind in [AnimationKind::Typewriter, AnimationKind::Morph, AnimationKind::Particle] {
            assert!(keyframes_for(&AnimationRequest::new("x", kind)).is_none());
        }
    }
}
