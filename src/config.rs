//! Configuration file handling for viralflow.
//!
//! Loads configuration from `~/.config/viralflow/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::content::UserInputs;
use crate::gemini::{GatewayConfig, DEFAULT_TEXT_MODEL, DEFAULT_VIDEO_MODEL, GEMINI_API_BASE_URL, GEMINI_API_KEY_ENV};
use crate::video::PollPolicy;

/// Configuration file structure for viralflow.
/// Loaded from ~/.config/viralflow/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub video: VideoConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_video_model")]
    pub video_model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            text_model: default_text_model(),
            video_model: default_video_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
    /// Polling deadline. Unset polls until the job finishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_true")]
    pub cache: bool,
    #[serde(default = "default_cache_max_mb")]
    pub cache_max_mb: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            status_interval_secs: default_status_interval(),
            timeout_secs: None,
            cache: true,
            cache_max_mb: default_cache_max_mb(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Upscale factor applied when rasterising slides.
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            scale: default_scale(),
        }
    }
}

/// Default slide colours and watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrandingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    GEMINI_API_BASE_URL.to_string()
}

fn default_text_model() -> String {
    DEFAULT_TEXT_MODEL.to_string()
}

fn default_video_model() -> String {
    DEFAULT_VIDEO_MODEL.to_string()
}

fn default_api_key_env() -> String {
    GEMINI_API_KEY_ENV.to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_status_interval() -> u64 {
    5
}

fn default_cache_max_mb() -> u64 {
    500
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_scale() -> u32 {
    crate::export::SCALE_FACTOR
}

impl Config {
    /// Load configuration from a file path.
    /// Without a path, the default location is used and a missing file means defaults.
    /// An explicit path that does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = path.is_some();
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if !path.exists() {
            if explicit {
                return Err(ConfigError::NotFound(path));
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Gateway configuration with the key read from the configured variable.
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            api_key: None,
            base_url: self.gemini.base_url.clone(),
            text_model: self.gemini.text_model.clone(),
            video_model: self.gemini.video_model.clone(),
        }
        .with_api_key_from(&self.gemini.api_key_env)
    }

    /// Polling policy. Intervals below one second are raised to one second.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::default()
            .with_interval(Duration::from_secs(self.video.poll_interval_secs.max(1)))
            .with_timeout(self.video.timeout_secs.map(Duration::from_secs))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.video.status_interval_secs.max(1))
    }

    /// Default create-form inputs with the branding applied.
    pub fn default_inputs(&self) -> UserInputs {
        let mut inputs = UserInputs::default();
        let branding = &self.branding;
        if let Some(color) = &branding.text_color {
            inputs.text_color = color.clone();
        }
        if let Some(color) = &branding.highlight_color {
            inputs.highlight_color = color.clone();
        }
        if let Some(color) = &branding.title_color {
            inputs.title_color = color.clone();
        }
        inputs.watermark = branding.watermark.clone();
        inputs.normalize_colors();
        inputs
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("viralflow")
        .join("config.toml")
}

/// Commented template written by `viralflow config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# viralflow configuration

[gemini]
# base_url = "https://generativelanguage.googleapis.com"
text_model = "gemini-2.5-flash"
video_model = "veo-2.0-generate-001"
# Environment variable holding the API key
api_key_env = "GEMINI_API_KEY"

[video]
# Seconds between job status checks
poll_interval_secs = 10
# Seconds between status message rotations
status_interval_secs = 5
# Give up polling after this many seconds (unset = wait until done)
# timeout_secs = 900
# Keep downloaded videos; `viralflow video --reuse` picks them up
cache = true
cache_max_mb = 500

[export]
output_dir = "."
# Upscale factor for rendered slides
scale = 4

[branding]
# text_color = "#1E293B"
# highlight_color = "#FF7A00"
# title_color = "#0F172A"
# watermark = "@yourhandle"
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[video]\ntimeout_secs = 60\n\n[branding]\nwatermark = \"@me\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.video.poll_interval_secs, 10);
        assert_eq!(config.poll_policy().timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.default_inputs().watermark(), Some("@me"));
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[video\n").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut config = Config::default();
        config.branding.highlight_color = Some("#00FF00".to_string());
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_zero_intervals_are_raised_to_one_second() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[video]\npoll_interval_secs = 0\nstatus_interval_secs = 0\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.poll_policy().interval, Duration::from_secs(1));
        assert_eq!(config.status_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_branding_colors_fall_back_to_defaults() {
        let mut config = Config::default();
        config.branding.text_color = Some("#a\u{e9}bcd".to_string());
        config.branding.highlight_color = Some("orange".to_string());
        config.branding.title_color = Some("#abc".to_string());

        let inputs = config.default_inputs();
        let defaults = UserInputs::default();
        assert_eq!(inputs.text_color, defaults.text_color);
        assert_eq!(inputs.highlight_color, defaults.highlight_color);
        assert_eq!(inputs.title_color, "#abc000");
    }

    #[test]
    fn test_default_path_ends_with_app_dir() {
        assert!(default_path().ends_with("viralflow/config.toml"));
    }
}
