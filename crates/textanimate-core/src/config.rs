use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files live here)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Defaults for animations started without explicit flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Animation kind tag, e.g. "typewriter" or "slideUp"
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Trigger: "auto", "hover", "click", "view" or "manual"
    #[serde(default = "default_trigger")]
    pub trigger: String,
    /// Easing curve name
    #[serde(default = "default_easing")]
    pub easing: String,
    /// Duration override in milliseconds (kind default when unset)
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub delay_ms: u64,
    /// Stagger override in milliseconds (kind default when unset)
    #[serde(default)]
    pub stagger_ms: Option<u64>,
    #[serde(default = "default_particle_count")]
    pub particle_count: usize,
    #[serde(default = "default_particle_size")]
    pub particle_size: f64,
    /// Particle color; the terminal foreground when unset
    #[serde(default)]
    pub particle_color: Option<String>,
    #[serde(default = "default_morph_interval")]
    pub morph_interval_ms: u64,
    #[serde(default = "default_wave_amplitude")]
    pub wave_amplitude: f64,
    #[serde(default = "default_wave_frequency")]
    pub wave_frequency: f64,
    #[serde(default = "default_glitch_intensity")]
    pub glitch_intensity: f64,
    /// View trigger fires once and stays
    #[serde(default = "default_true")]
    pub trigger_once: bool,
    /// Visible fraction needed for the view trigger (0.0-1.0)
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            trigger: default_trigger(),
            easing: default_easing(),
            duration_ms: None,
            delay_ms: 0,
            stagger_ms: None,
            particle_count: default_particle_count(),
            particle_size: default_particle_size(),
            particle_color: None,
            morph_interval_ms: default_morph_interval(),
            wave_amplitude: default_wave_amplitude(),
            wave_frequency: default_wave_frequency(),
            glitch_intensity: default_glitch_intensity(),
            trigger_once: default_true(),
            visibility_threshold: default_visibility_threshold(),
            root_margin: default_root_margin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    /// Animation frame interval in milliseconds
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// Accent color for borders and the status bar
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            frame_interval_ms: default_frame_interval(),
            accent: default_accent(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("textanimate")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_kind() -> String {
    "typewriter".to_string()
}

fn default_trigger() -> String {
    "auto".to_string()
}

fn default_easing() -> String {
    "easeOutCubic".to_string()
}

fn default_particle_count() -> usize {
    100
}

fn default_particle_size() -> f64 {
    16.0
}

fn default_morph_interval() -> u64 {
    3000
}

fn default_wave_amplitude() -> f64 {
    20.0
}

fn default_wave_frequency() -> f64 {
    1.0
}

fn default_glitch_intensity() -> f64 {
    0.5
}

fn default_visibility_threshold() -> f64 {
    0.1
}

fn default_root_margin() -> String {
    "0px".to_string()
}

fn default_tick_rate() -> u64 {
    16
}

fn default_frame_interval() -> u64 {
    16
}

fn default_accent() -> String {
    "cyan".to_string()
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults when it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/textanimate/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("textanimate")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Log file used while the terminal player owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("textanimate.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.animation.kind, "typewriter");
        assert_eq!(config.animation.particle_count, 100);
        assert_eq!(config.ui.tick_rate_ms, 16);
        assert!(config.animation.trigger_once);
    }

    #[test]
    fn test_partial_sections() {
        let config = AppConfig::from_toml(
            r#"
            [animation]
            kind = "wave"
            stagger_ms = 80
            trigger_once = false

            [ui]
            accent = "magenta"
            "#,
        )
        .unwrap();
        assert_eq!(config.animation.kind, "wave");
        assert_eq!(config.animation.stagger_ms, Some(80));
        assert_eq!(config.animation.duration_ms, None);
        assert!(!config.animation.trigger_once);
        assert_eq!(config.ui.accent, "magenta");
        assert_eq!(config.ui.frame_interval_ms, 16);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml("[animation\nkind=").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = AppConfig::default().to_toml().unwrap();
        let back = AppConfig::from_toml(&text).unwrap();
        assert_eq!(back.animation.morph_interval_ms, 3000);
        assert_eq!(back.general.data_dir, AppConfig::default().general.data_dir);
    }

    #[test]
    fn test_tilde_expansion() {
        let mut config = AppConfig::default();
        config.general.data_dir = PathBuf::from("~/anim");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.data_dir(), home.join("anim"));
        }
        config.general.data_dir = PathBuf::from("/tmp/anim");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/anim/textanimate.log"));
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/textanimate.toml")).unwrap();
        assert_eq!(config.animation.trigger, "auto");
    }
}
