//! Viewport visibility observer
//!
//! Wraps the platform's intersection detection with once/repeat semantics.
//! Without intersection detection the observer reports visible right away so
//! a view-gated animation still plays.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::host::{Host, ObserverId};

/// Observer options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObserverOptions {
    /// Fraction of the element that must be inside the root (0.0 - 1.0)
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// CSS-style margin grown around the root, e.g. `"0px"` or `"10px 0px"`
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    /// Once visible, stay visible for the element's lifetime
    #[serde(default = "default_trigger_once")]
    pub trigger_once: bool,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            root_margin: default_root_margin(),
            trigger_once: default_trigger_once(),
        }
    }
}

fn default_threshold() -> f64 {
    0.1
}

fn default_root_margin() -> String {
    "0px".to_string()
}

fn default_trigger_once() -> bool {
    true
}

/// Axis-aligned rectangle in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow each edge outward by the margin (negative values shrink)
    pub fn expand(&self, margin: &Margin) -> Rect {
        Rect {
            x: self.x - margin.left,
            y: self.y - margin.top,
            width: self.width + margin.left + margin.right,
            height: self.height + margin.top + margin.bottom,
        }
    }
}

/// Margin around the root rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    /// Parse one to four CSS lengths in `px` (the unit may be omitted)
    pub fn parse(css: &str) -> Result<Margin> {
        let values = css
            .split_whitespace()
            .map(|part| {
                let number = part.strip_suffix("px").unwrap_or(part);
                number
                    .parse::<f64>()
                    .map_err(|_| Error::InvalidParameter(format!("root margin \"{css}\"")))
            })
            .collect::<Result<Vec<f64>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => {
                return Err(Error::InvalidParameter(format!(
                    "root margin \"{css}\" needs one to four values"
                )))
            }
        };
        Ok(Margin { top, right, bottom, left })
    }
}

/// Fraction of `target` inside `root` grown by `margin`
///
/// A zero-area target counts as fully inside when its origin lies within the root.
pub fn intersection_ratio(target: Rect, root: Rect, margin: &Margin) -> f64 {
    let root = root.expand(margin);
    if target.area() == 0.0 {
        let inside = target.x >= root.x
            && target.x <= root.right()
            && target.y >= root.y
            && target.y <= root.bottom();
        return if inside { 1.0 } else { 0.0 };
    }

    let width = (target.right().min(root.right()) - target.x.max(root.x)).max(0.0);
    let height = (target.bottom().min(root.bottom()) - target.y.max(root.y)).max(0.0);
    (width * height / target.area()).clamp(0.0, 1.0)
}

/// Visibility signal for one observed element
#[derive(Debug)]
pub struct ViewportObserver {
    options: ObserverOptions,
    margin: Margin,
    observer: Option<ObserverId>,
    visible: bool,
    has_triggered: bool,
}

impl ViewportObserver {
    pub fn new(options: ObserverOptions) -> Self {
        let margin = Margin::parse(&options.root_margin).unwrap_or_else(|e| {
            warn!("{e}; using a zero margin");
            Margin::default()
        });
        Self {
            options,
            margin,
            observer: None,
            visible: false,
            has_triggered: false,
        }
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    pub fn margin(&self) -> &Margin {
        &self.margin
    }

    /// Start observing; returns the visibility signal afterwards
    pub fn attach(&mut self, host: &mut dyn Host) -> bool {
        if self.observer.is_some() {
            return self.visible;
        }
        match host.observe_visibility() {
            Some(id) => {
                self.observer = Some(id);
            }
            None => {
                warn!("intersection detection unavailable, treating element as visible");
                self.visible = true;
                self.has_triggered = true;
            }
        }
        self.visible
    }

    /// Feed an intersection observation; returns the visibility signal
    ///
    /// With `trigger_once` the signal is sticky once it turns true.
    pub fn report(&mut self, ratio: f64) -> bool {
        let intersecting = ratio > 0.0 && ratio >= self.options.threshold;
        if self.options.trigger_once {
            if intersecting && !self.has_triggered {
                self.visible = true;
                self.has_triggered = true;
            }
        } else {
            self.visible = intersecting;
            self.has_triggered |= intersecting;
        }
        self.visible
    }

    /// Compute the ratio from geometry and report it
    pub fn report_geometry(&mut self, target: Rect, root: Rect) -> bool {
        let ratio = intersection_ratio(target, root, &self.margin);
        self.report(ratio)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_attached(&self) -> bool {
        self.observer.is_some()
    }

    /// Stop observing; safe to call repeatedly
    pub fn detach(&mut self, host: &mut dyn Host) {
        if let Some(id) = self.observer.take() {
            host.unobserve(id);
        }
    }
}
