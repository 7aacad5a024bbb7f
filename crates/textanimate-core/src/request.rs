//! Animation request descriptor

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::easing::EasingType;
use crate::error::{Error, Result};
use crate::visibility::ObserverOptions;

/// Callback invoked when an animation run completes
pub type CompletionCallback = Rc<dyn Fn()>;

/// The catalog of animation kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Typewriter,
    Particle,
    SlideUp,
    FadeIn,
    Morph,
    Scramble,
    Glitch,
    Wave,
    Blur,
    /// A tag without a renderer; displayed as plain text
    Unsupported(String),
}

impl AnimationKind {
    /// Every kind that has a renderer
    pub const CATALOG: [AnimationKind; 9] = [
        AnimationKind::Typewriter,
        AnimationKind::Particle,
        AnimationKind::SlideUp,
        AnimationKind::FadeIn,
        AnimationKind::Morph,
        AnimationKind::Scramble,
        AnimationKind::Glitch,
        AnimationKind::Wave,
        AnimationKind::Blur,
    ];

    /// Parse a tag; anything unrecognized becomes `Unsupported`
    ///
    /// Accepts `slideUp`, `slide-up` and `slide_up`.
    pub fn from_tag(tag: &str) -> Self {
        let key: String = tag
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "typewriter" => AnimationKind::Typewriter,
            "particle" => AnimationKind::Particle,
            "slideup" => AnimationKind::SlideUp,
            "fadein" => AnimationKind::FadeIn,
            "morph" => AnimationKind::Morph,
            "scramble" => AnimationKind::Scramble,
            "glitch" => AnimationKind::Glitch,
            "wave" => AnimationKind::Wave,
            "blur" => AnimationKind::Blur,
            _ => AnimationKind::Unsupported(tag.trim().to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            AnimationKind::Typewriter => "typewriter",
            AnimationKind::Particle => "particle",
            AnimationKind::SlideUp => "slideUp",
            AnimationKind::FadeIn => "fadeIn",
            AnimationKind::Morph => "morph",
            AnimationKind::Scramble => "scramble",
            AnimationKind::Glitch => "glitch",
            AnimationKind::Wave => "wave",
            AnimationKind::Blur => "blur",
            AnimationKind::Unsupported(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, AnimationKind::Unsupported(_))
    }

    pub fn default_duration(&self) -> Duration {
        match self {
            AnimationKind::Morph => Duration::from_millis(800),
            _ => Duration::from_millis(1000),
        }
    }

    pub fn default_stagger(&self) -> Duration {
        match self {
            AnimationKind::Typewriter | AnimationKind::SlideUp | AnimationKind::Wave => {
                Duration::from_millis(50)
            }
            AnimationKind::FadeIn | AnimationKind::Blur => Duration::from_millis(30),
            _ => Duration::ZERO,
        }
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for AnimationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Condition under which an animation may run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerMode {
    #[default]
    Auto,
    Hover,
    Click,
    View,
    Manual,
}

impl TriggerMode {
    pub fn name(&self) -> &'static str {
        match self {
            TriggerMode::Auto => "auto",
            TriggerMode::Hover => "hover",
            TriggerMode::Click => "click",
            TriggerMode::View => "view",
            TriggerMode::Manual => "manual",
        }
    }
}

impl FromStr for TriggerMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(TriggerMode::Auto),
            "hover" => Ok(TriggerMode::Hover),
            "click" => Ok(TriggerMode::Click),
            "view" => Ok(TriggerMode::View),
            "manual" => Ok(TriggerMode::Manual),
            _ => Err(Error::UnknownTrigger(s.to_string())),
        }
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Repeat policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Repeat {
    #[default]
    Off,
    Forever,
    /// Repeat this many additional times
    Times(u32),
}

impl Repeat {
    /// Whether another pass may start after `repeats_done` repeats
    pub fn allows(&self, repeats_done: u32) -> bool {
        match self {
            Repeat::Off => false,
            Repeat::Forever => true,
            Repeat::Times(n) => repeats_done < *n,
        }
    }

    /// Pause between passes
    pub fn pause(&self) -> Duration {
        match self {
            Repeat::Times(_) => Duration::from_millis(1000),
            _ => Duration::from_millis(2000),
        }
    }
}

impl From<bool> for Repeat {
    fn from(value: bool) -> Self {
        if value { Repeat::Forever } else { Repeat::Off }
    }
}

impl From<u32> for Repeat {
    fn from(value: u32) -> Self {
        if value == 0 { Repeat::Off } else { Repeat::Times(value) }
    }
}

impl FromStr for Repeat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "false" | "no" => Ok(Repeat::Off),
            "forever" | "true" | "infinite" | "yes" => Ok(Repeat::Forever),
            other => other
                .parse::<u32>()
                .map(Repeat::from)
                .map_err(|_| Error::InvalidParameter(format!("repeat \"{s}\""))),
        }
    }
}

/// Timing in milliseconds; unset values fall back to the kind's defaults
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timing {
    pub duration: Option<Duration>,
    pub delay: Duration,
    pub stagger: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleParams {
    pub count: usize,
    pub size: f64,
    /// `None` inherits the host foreground color
    pub color: Option<String>,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            count: 100,
            size: 16.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphParams {
    /// Strings to cycle through; empty means just the request text
    pub texts: Vec<String>,
    pub interval: Duration,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            texts: Vec::new(),
            interval: Duration::from_millis(3000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub amplitude: f64,
    pub frequency: f64,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 20.0,
            frequency: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchParams {
    pub intensity: f64,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self { intensity: 0.5 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorParams {
    pub show: bool,
    pub glyph: char,
}

impl Default for CursorParams {
    fn default() -> Self {
        Self { show: true, glyph: '|' }
    }
}

/// Everything needed to animate one piece of text
#[derive(Clone)]
pub struct AnimationRequest {
    pub text: String,
    pub kind: AnimationKind,
    pub trigger: TriggerMode,
    pub timing: Timing,
    pub easing: EasingType,
    pub repeat: Repeat,
    pub reverse: bool,
    pub class_name: Option<String>,
    /// Opaque presentation hints passed through to the output
    pub style: Vec<(String, String)>,
    pub particle: ParticleParams,
    pub morph: MorphParams,
    pub wave: WaveParams,
    pub glitch: GlitchParams,
    pub cursor: CursorParams,
    pub visibility: ObserverOptions,
    /// Seed for every randomized effect; `None` draws from the OS
    pub seed: Option<u64>,
    pub on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for AnimationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRequest")
            .field("text", &self.text)
            .field("kind", &self.kind)
            .field("trigger", &self.trigger)
            .field("timing", &self.timing)
            .field("easing", &self.easing)
            .field("repeat", &self.repeat)
            .field("reverse", &self.reverse)
            .field("seed", &self.seed)
            .field("on_complete", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}

impl AnimationRequest {
    pub fn new(text: impl Into<String>, kind: AnimationKind) -> Self {
        Self {
            text: text.into(),
            kind,
            trigger: TriggerMode::default(),
            timing: Timing::default(),
            easing: EasingType::default(),
            repeat: Repeat::default(),
            reverse: false,
            class_name: None,
            style: Vec::new(),
            particle: ParticleParams::default(),
            morph: MorphParams::default(),
            wave: WaveParams::default(),
            glitch: GlitchParams::default(),
            cursor: CursorParams::default(),
            visibility: ObserverOptions::default(),
            seed: None,
            on_complete: None,
        }
    }

    /// Build a request from configured defaults
    pub fn from_config(text: impl Into<String>, config: &AnimationConfig) -> Result<Self> {
        let mut request = Self::new(text, AnimationKind::from_tag(&config.kind));
        request.trigger = config.trigger.parse()?;
        request.easing = config.easing.parse()?;
        request.timing = Timing {
            duration: config.duration_ms.map(Duration::from_millis),
            delay: Duration::from_millis(config.delay_ms),
            stagger: config.stagger_ms.map(Duration::from_millis),
        };
        request.particle.count = config.particle_count;
        request.particle.size = config.particle_size;
        request.particle.color = config.particle_color.clone();
        request.morph.interval = Duration::from_millis(config.morph_interval_ms);
        request.wave = WaveParams {
            amplitude: config.wave_amplitude,
            frequency: config.wave_frequency,
        };
        request.glitch.intensity = config.glitch_intensity;
        request.visibility = ObserverOptions {
            threshold: config.visibility_threshold,
            root_margin: config.root_margin.clone(),
            trigger_once: config.trigger_once,
        };
        request.validate()?;
        Ok(request)
    }

    /// Reject parameters no renderer can work with
    pub fn validate(&self) -> Result<()> {
        if !self.particle.size.is_finite() || self.particle.size <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "particle size {}",
                self.particle.size
            )));
        }
        if !(0.0..=1.0).contains(&self.visibility.threshold) {
            return Err(Error::InvalidParameter(format!(
                "visibility threshold {}",
                self.visibility.threshold
            )));
        }
        if !self.wave.frequency.is_finite() || self.wave.frequency <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "wave frequency {}",
                self.wave.frequency
            )));
        }
        Ok(())
    }

    pub fn trigger(mut self, trigger: TriggerMode) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn duration_ms(mut self, ms: u64) -> Self {
        self.timing.duration = Some(Duration::from_millis(ms));
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.timing.delay = Duration::from_millis(ms);
        self
    }

    pub fn stagger_ms(mut self, ms: u64) -> Self {
        self.timing.stagger = Some(Duration::from_millis(ms));
        self
    }

    pub fn easing(mut self, easing: EasingType) -> Self {
        self.easing = easing;
        self
    }

    pub fn repeat(mut self, repeat: impl Into<Repeat>) -> Self {
        self.repeat = repeat.into();
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.push((key.into(), value.into()));
        self
    }

    pub fn particles(mut self, count: usize, size: f64, color: Option<String>) -> Self {
        self.particle = ParticleParams { count, size, color };
        self
    }

    pub fn morph_texts<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.morph.texts = texts.into_iter().map(Into::into).collect();
        self
    }

    pub fn morph_interval_ms(mut self, ms: u64) -> Self {
        self.morph.interval = Duration::from_millis(ms);
        self
    }

    pub fn wave(mut self, amplitude: f64, frequency: f64) -> Self {
        self.wave = WaveParams { amplitude, frequency };
        self
    }

    pub fn glitch_intensity(mut self, intensity: f64) -> Self {
        self.glitch.intensity = intensity;
        self
    }

    pub fn cursor(mut self, show: bool, glyph: char) -> Self {
        self.cursor = CursorParams { show, glyph };
        self
    }

    pub fn visibility(mut self, options: ObserverOptions) -> Self {
        self.visibility = options;
        self
    }

    pub fn trigger_once(mut self, once: bool) -> Self {
        self.visibility.trigger_once = once;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn on_complete(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_complete = Some(Rc::new(callback));
        self
    }

    pub fn duration(&self) -> Duration {
        self.timing.duration.unwrap_or_else(|| self.kind.default_duration())
    }

    pub fn delay(&self) -> Duration {
        self.timing.delay
    }

    pub fn stagger(&self) -> Duration {
        self.timing.stagger.unwrap_or_else(|| self.kind.default_stagger())
    }

    /// Strings a morph cycles through
    pub fn morph_cycle(&self) -> Vec<String> {
        if self.morph.texts.is_empty() {
            vec![self.text.clone()]
        } else {
            self.morph.texts.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip() {
        for kind in AnimationKind::CATALOG {
            assert_eq!(AnimationKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(AnimationKind::from_tag("slide-up"), AnimationKind::SlideUp);
        assert_eq!(AnimationKind::from_tag("FADE_IN"), AnimationKind::FadeIn);
    }

    #[test]
    fn test_unrendered_tags_are_unsupported() {
        for tag in ["flip", "magnetic", "split", "bounce", "sparkle"] {
            let kind = AnimationKind::from_tag(tag);
            assert!(!kind.is_supported());
            assert_eq!(kind.tag(), tag);
        }
    }

    #[test]
    fn test_kind_defaults() {
        assert_eq!(AnimationKind::Morph.default_duration(), Duration::from_millis(800));
        assert_eq!(AnimationKind::Wave.default_duration(), Duration::from_millis(1000));
        assert_eq!(AnimationKind::FadeIn.default_stagger(), Duration::from_millis(30));
        assert_eq!(AnimationKind::Typewriter.default_stagger(), Duration::from_millis(50));
        assert_eq!(AnimationKind::Glitch.default_stagger(), Duration::ZERO);
    }

    #[test]
    fn test_trigger_parse() {
        assert_eq!("View".parse::<TriggerMode>().unwrap(), TriggerMode::View);
        assert!(matches!("hovering".parse::<TriggerMode>(), Err(Error::UnknownTrigger(_))));
    }

    #[test]
    fn test_repeat_policy() {
        assert_eq!(Repeat::from(true), Repeat::Forever);
        assert_eq!(Repeat::from(0), Repeat::Off);
        assert_eq!("3".parse::<Repeat>().unwrap(), Repeat::Times(3));
        assert_eq!("forever".parse::<Repeat>().unwrap(), Repeat::Forever);
        assert!("twice".parse::<Repeat>().is_err());

        assert!(Repeat::Times(2).allows(1));
        assert!(!Repeat::Times(2).allows(2));
        assert!(!Repeat::Off.allows(0));
        assert_eq!(Repeat::Times(1).pause(), Duration::from_millis(1000));
        assert_eq!(Repeat::Forever.pause(), Duration::from_millis(2000));
    }

    #[test]
    fn test_timing_falls_back_to_kind() {
        let request = AnimationRequest::new("hi", AnimationKind::Blur);
        assert_eq!(request.duration(), Duration::from_millis(1000));
        assert_eq!(request.stagger(), Duration::from_millis(30));

        let request = request.stagger_ms(0).duration_ms(400);
        assert_eq!(request.stagger(), Duration::ZERO);
        assert_eq!(request.duration(), Duration::from_millis(400));
    }

    #[test]
    fn test_morph_cycle_defaults_to_text() {
        let request = AnimationRequest::new("solo", AnimationKind::Morph);
        assert_eq!(request.morph_cycle(), vec!["solo".to_string()]);
        let request = request.morph_texts(["a", "b"]);
        assert_eq!(request.morph_cycle().len(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = AnimationConfig {
            kind: "scramble".into(),
            trigger: "click".into(),
            delay_ms: 120,
            ..Default::default()
        };
        let request = AnimationRequest::from_config("hello", &config).unwrap();
        assert_eq!(request.kind, AnimationKind::Scramble);
        assert_eq!(request.trigger, TriggerMode::Click);
        assert_eq!(request.delay(), Duration::from_millis(120));

        let bad = AnimationConfig {
            trigger: "sometimes".into(),
            ..Default::default()
        };
        assert!(AnimationRequest::from_config("hello", &bad).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let request = AnimationRequest::new("x", AnimationKind::Particle).particles(10, 0.0, None);
        assert!(request.validate().is_err());
        let request = AnimationRequest::new("x", AnimationKind::Wave).wave(10.0, 0.0);
        assert!(request.validate().is_err());
    }
}
