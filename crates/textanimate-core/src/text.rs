//! Text manipulation utilities
//!
//! Character and word segmentation, decoy characters for the scramble
//! effect, numeric helpers and monospace font metrics.

use rand::Rng;
use unicode_width::UnicodeWidthStr;

/// Characters a decoy may be drawn from
pub const DECOY_CHARSET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()";

/// Placeholder for whitespace in per-character layouts
pub const NBSP: char = '\u{00A0}';

/// Advance width of one glyph relative to the font size
pub const GLYPH_ASPECT: f64 = 0.6;

/// Line height relative to the font size
pub const LINE_HEIGHT: f64 = 1.2;

/// Split text into characters, keeping whitespace
pub fn split_chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Split text into words and the whitespace runs between them
///
/// Joining the result gives back the input.
pub fn split_words(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                parts.push(&text[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Layout glyph for a character: whitespace becomes a non-breaking space
#[inline]
pub fn layout_glyph(ch: char) -> char {
    if ch.is_whitespace() { NBSP } else { ch }
}

/// A random character from [`DECOY_CHARSET`]
pub fn random_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    let bytes = DECOY_CHARSET.as_bytes();
    bytes[rng.random_range(0..bytes.len())] as char
}

/// A string of `len` random decoy characters
pub fn random_string<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len).map(|_| random_char(rng)).collect()
}

/// Measured text extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
}

/// Measure text set in a monospace font of `font_size`
///
/// Width counts terminal cells, so wide glyphs take two advances.
pub fn measure_text(text: &str, font_size: f64) -> TextMetrics {
    let cells = text.width();
    TextMetrics {
        width: cells as f64 * font_size * GLYPH_ASPECT,
        height: font_size * LINE_HEIGHT,
    }
}

#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Map a value from one range to another
///
/// A degenerate input range maps everything to `out_min`.
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / span + out_min
}
