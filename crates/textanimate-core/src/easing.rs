//! Pure easing functions
//!
//! Every curve maps a progress value in [0, 1] to an eased value in [0, 1].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Named easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EasingType {
    Linear,
    /// Alias of `EaseInCubic`
    EaseIn,
    /// Alias of `EaseOutCubic`
    EaseOut,
    /// Alias of `EaseInOutCubic`
    EaseInOut,
    EaseInCubic,
    #[default]
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
}

impl EasingType {
    pub const ALL: [EasingType; 13] = [
        EasingType::Linear,
        EasingType::EaseIn,
        EasingType::EaseOut,
        EasingType::EaseInOut,
        EasingType::EaseInCubic,
        EasingType::EaseOutCubic,
        EasingType::EaseInOutCubic,
        EasingType::EaseInQuad,
        EasingType::EaseOutQuad,
        EasingType::EaseInOutQuad,
        EasingType::EaseInQuart,
        EasingType::EaseOutQuart,
        EasingType::EaseInOutQuart,
    ];

    /// Apply the easing function to a progress value
    ///
    /// Input outside [0, 1] is clamped first.
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::EaseIn | EasingType::EaseInCubic => t * t * t,
            EasingType::EaseOut | EasingType::EaseOutCubic => ease_out_cubic(t),
            EasingType::EaseInOut | EasingType::EaseInOutCubic => ease_in_out_cubic(t),
            EasingType::EaseInQuad => t * t,
            EasingType::EaseOutQuad => t * (2.0 - t),
            EasingType::EaseInOutQuad => ease_in_out_quad(t),
            EasingType::EaseInQuart => t * t * t * t,
            EasingType::EaseOutQuart => ease_out_quart(t),
            EasingType::EaseInOutQuart => ease_in_out_quart(t),
        }
    }

    /// Camel-case name as used in config files
    pub fn name(&self) -> &'static str {
        match self {
            EasingType::Linear => "linear",
            EasingType::EaseIn => "easeIn",
            EasingType::EaseOut => "easeOut",
            EasingType::EaseInOut => "easeInOut",
            EasingType::EaseInCubic => "easeInCubic",
            EasingType::EaseOutCubic => "easeOutCubic",
            EasingType::EaseInOutCubic => "easeInOutCubic",
            EasingType::EaseInQuad => "easeInQuad",
            EasingType::EaseOutQuad => "easeOutQuad",
            EasingType::EaseInOutQuad => "easeInOutQuad",
            EasingType::EaseInQuart => "easeInQuart",
            EasingType::EaseOutQuart => "easeOutQuart",
            EasingType::EaseInOutQuart => "easeInOutQuart",
        }
    }

    /// Look up a curve by name, falling back to the default curve
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for EasingType {
    type Err = Error;

    /// Accepts `easeOutCubic`, `ease-out-cubic` and `ease_out_cubic`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        EasingType::ALL
            .into_iter()
            .find(|easing| normalize(easing.name()) == wanted)
            .ok_or_else(|| Error::UnknownEasing(s.to_string()))
    }
}

impl fmt::Display for EasingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[inline]
fn ease_out_cubic(t: f64) -> f64 {
    let u = t - 1.0;
    u * u * u + 1.0
}

#[inline]
fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

#[inline]
fn ease_in_out_quad(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

#[inline]
fn ease_out_quart(t: f64) -> f64 {
    let u = t - 1.0;
    1.0 - u * u * u * u
}

#[inline]
fn ease_in_out_quart(t: f64) -> f64 {
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let u = t - 1.0;
        1.0 - 8.0 * u * u * u * u
    }
}
