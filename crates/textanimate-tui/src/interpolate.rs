//! Timeline sampling for the terminal
//!
//! Samples a [`CharUnit`] at a point in time and maps the resulting visual
//! state onto what a terminal cell can show: an offset in cells and a
//! visibility level.

use textanimate_core::schedule::{CharUnit, Iteration, Keyframe, VisualState};
use textanimate_core::text::lerp;
use textanimate_core::EasingType;

/// Layout units per terminal column
pub const UNITS_PER_COL: f64 = 8.0;

/// Layout units per terminal row
pub const UNITS_PER_ROW: f64 = 16.0;

/// How visible a cell is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Dim,
    Normal,
}

/// A sampled state mapped onto the cell grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellEffect {
    pub dx: i16,
    pub dy: i16,
    pub visibility: Visibility,
}

/// State of `unit` at `elapsed_ms` after the run started
///
/// Before its delay a unit holds its first keyframe. One-shot units hold
/// their last keyframe once finished; looping units wrap.
pub fn sample(unit: &CharUnit, elapsed_ms: f64) -> VisualState {
    let Some(first) = unit.keyframes.first() else {
        return VisualState::VISIBLE;
    };
    let local = elapsed_ms - unit.delay_ms;
    if local < 0.0 {
        return first.state;
    }

    let t = if unit.duration_ms <= 0.0 {
        1.0
    } else {
        match unit.iteration {
            Iteration::Once => (local / unit.duration_ms).min(1.0),
            Iteration::Infinite => (local % unit.duration_ms) / unit.duration_ms,
        }
    };
    at_offset(&unit.keyframes, t, unit.easing)
}

/// Keyframe interpolation with easing applied per segment
fn at_offset(frames: &[Keyframe], t: f64, easing: EasingType) -> VisualState {
    for pair in frames.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        if t <= to.offset {
            let span = to.offset - from.offset;
            let local = if span <= 0.0 { 1.0 } else { (t - from.offset) / span };
            return mix(from.state, to.state, easing.apply(local));
        }
    }
    frames.last().map(|k| k.state).unwrap_or(VisualState::VISIBLE)
}

fn mix(a: VisualState, b: VisualState, t: f64) -> VisualState {
    if t >= 1.0 {
        return b;
    }
    VisualState {
        opacity: lerp(a.opacity, b.opacity, t),
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
        blur: lerp(a.blur, b.blur, t),
    }
}

/// Map a visual state onto a terminal cell
pub fn cell_effect(state: &VisualState) -> CellEffect {
    let visibility = if state.opacity < 0.2 {
        Visibility::Hidden
    } else if state.opacity < 0.7 || state.blur >= 2.0 {
        Visibility::Dim
    } else {
        Visibility::Normal
    };
    CellEffect {
        dx: (state.x / UNITS_PER_COL).round() as i16,
        dy: (state.y / UNITS_PER_ROW).round() as i16,
        visibility,
    }
}
