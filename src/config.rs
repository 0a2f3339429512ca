//! Player configuration with persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bridge::CallMode;
use crate::error::{MpvError, Result};
use crate::state::LogLevel;

const APP_DIR: &str = "mpv-declarative";
const CONFIG_FILE: &str = "config.json";

/// Startup defaults applied to a freshly constructed player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfig {
  /// Hardware decoding API (`auto`, `no`, `vaapi`, ...).
  #[serde(default = "default_hwdec")]
  pub hwdec: String,

  #[serde(default = "default_screenshot_format")]
  pub screenshot_format: String,

  /// 0 (fast) to 9 (small).
  #[serde(default = "default_screenshot_png_compression")]
  pub screenshot_png_compression: i64,

  #[serde(default = "default_true")]
  pub screenshot_tag_colorspace: bool,

  #[serde(default = "default_screenshot_template")]
  pub screenshot_template: String,

  /// Where screenshots land. None = the user's pictures directory.
  #[serde(default)]
  pub screenshot_directory: Option<PathBuf>,

  #[serde(default = "default_true")]
  pub hr_seek: bool,

  #[serde(default = "default_true")]
  pub ytdl: bool,

  #[serde(default = "default_true")]
  pub load_scripts: bool,

  #[serde(default = "default_log_level")]
  pub log_level: LogLevel,

  #[serde(default)]
  pub call_mode: CallMode,

  /// How long one `wait_event` may block while draining the event queue.
  #[serde(default = "default_event_poll_timeout_ms")]
  pub event_poll_timeout_ms: u64,

  /// Extra engine options set before initialization, e.g. `{"vo": "libmpv"}`.
  #[serde(default)]
  pub extra_options: BTreeMap<String, String>,
}

fn default_hwdec() -> String {
  "auto".to_string()
}

fn default_screenshot_format() -> String {
  "png".to_string()
}

fn default_screenshot_png_compression() -> i64 {
  9
}

fn default_screenshot_template() -> String {
  "Screenshot_%F_%P".to_string()
}

fn default_true() -> bool {
  true
}

fn default_log_level() -> LogLevel {
  LogLevel::Debug
}

fn default_event_poll_timeout_ms() -> u64 {
  5
}

impl Default for PlayerConfig {
  fn default() -> Self {
    Self {
      hwdec: default_hwdec(),
      screenshot_format: default_screenshot_format(),
      screenshot_png_compression: default_screenshot_png_compression(),
      screenshot_tag_colorspace: true,
      screenshot_template: default_screenshot_template(),
      screenshot_directory: None,
      hr_seek: true,
      ytdl: true,
      load_scripts: true,
      log_level: default_log_level(),
      call_mode: CallMode::default(),
      event_poll_timeout_ms: default_event_poll_timeout_ms(),
      extra_options: BTreeMap::new(),
    }
  }
}

impl PlayerConfig {
  /// Validate configuration values.
  pub fn validate(&self) -> std::result::Result<(), String> {
    if self.hwdec.trim().is_empty() {
      return Err("Hardware decoding mode cannot be empty".to_string());
    }
    if self.screenshot_format.trim().is_empty() {
      return Err("Screenshot format cannot be empty".to_string());
    }
    if !(0..=9).contains(&self.screenshot_png_compression) {
      return Err("PNG compression must be between 0 and 9".to_string());
    }
    if self.screenshot_template.trim().is_empty() {
      return Err("Screenshot template cannot be empty".to_string());
    }
    if self.event_poll_timeout_ms > 1000 {
      return Err("Event poll timeout must be at most 1000 ms".to_string());
    }
    if self.extra_options.keys().any(|name| name.trim().is_empty()) {
      return Err("Engine option names cannot be empty".to_string());
    }
    Ok(())
  }

  /// Screenshot directory, falling back to the pictures directory.
  pub fn resolved_screenshot_directory(&self) -> Option<PathBuf> {
    self.screenshot_directory.clone().or_else(dirs::picture_dir)
  }

  /// `<config dir>/mpv-declarative/config.json`, when the platform has one.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
  }

  /// Read and validate a config file.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)?;
    let config: Self = serde_json::from_str(&content)?;
    config.validate().map_err(MpvError::InvalidConfig)?;
    Ok(config)
  }

  /// Load from the default location. A missing file yields the defaults.
  pub fn load_or_default() -> Result<Self> {
    match Self::default_path() {
      Some(path) if path.exists() => Self::load(&path),
      _ => Ok(Self::default()),
    }
  }

  pub fn save(&self, path: &Path) -> Result<()> {
    self.validate().map_err(MpvError::InvalidConfig)?;
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(self)?)?;
    log::debug!("Config saved to {}", path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn test_defaults_are_valid() {
    let config = PlayerConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.hwdec, "auto");
    assert_eq!(config.screenshot_png_compression, 9);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.call_mode, CallMode::Synchronous);
    assert_eq!(config.event_poll_timeout_ms, 5);
  }

  #[test]
  fn test_missing_fields_take_defaults() {
    let config: PlayerConfig = serde_json::from_str(r#"{"hwdec": "vaapi", "ytdl": false}"#).unwrap();
    assert_eq!(config.hwdec, "vaapi");
    assert!(!config.ytdl);
    assert!(config.hr_seek);
    assert_eq!(config.screenshot_format, "png");
  }

  #[test]
  fn test_validate_rejects_out_of_range() {
    let config = PlayerConfig {
      screenshot_png_compression: 10,
      ..PlayerConfig::default()
    };
    assert!(config.validate().is_err());

    let config = PlayerConfig {
      hwdec: "  ".to_string(),
      ..PlayerConfig::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let mut config = PlayerConfig {
      call_mode: CallMode::Asynchronous,
      log_level: LogLevel::Warning,
      ..PlayerConfig::default()
    };
    config.extra_options.insert("vo".to_string(), "libmpv".to_string());

    config.save(&path).unwrap();
    let loaded = PlayerConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
  }

  #[test]
  fn test_load_reports_bad_json_and_invalid_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(PlayerConfig::load(&path), Err(MpvError::Json(_))));

    fs::write(&path, r#"{"screenshotPngCompression": 42}"#).unwrap();
    assert!(matches!(
      PlayerConfig::load(&path),
      Err(MpvError::InvalidConfig(_))
    ));

    assert!(matches!(
      PlayerConfig::load(&dir.path().join("missing.json")),
      Err(MpvError::Io(_))
    ));
  }
}
