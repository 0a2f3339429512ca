//! Playback state enums mirrored from the engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
  Stopped,
  Playing,
  Paused,
}

impl PlaybackState {
  /// Derive the state from the engine's `idle-active` and `pause` flags.
  pub fn from_flags(idle: bool, paused: bool) -> Self {
    if idle {
      PlaybackState::Stopped
    } else if paused {
      PlaybackState::Paused
    } else {
      PlaybackState::Playing
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaStatus {
  Unknown,
  #[default]
  NoMedia,
  Loading,
  Loaded,
  Stalled,
  Buffering,
  Buffered,
  End,
  Invalid,
}

impl MediaStatus {
  /// Whether a file is open and decodable.
  pub fn is_loaded(&self) -> bool {
    matches!(
      self,
      MediaStatus::Loaded | MediaStatus::Buffering | MediaStatus::Buffered
    )
  }
}

/// Verbosity of engine log output, in UI terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogLevel {
  Off,
  Debug,
  Warning,
  Critical,
  Fatal,
  Info,
}

impl LogLevel {
  /// Level name understood by `msg-level` and `request_log_messages`.
  /// Debug maps to `v`; `debug` and `trace` flood the log.
  pub fn engine_name(&self) -> &'static str {
    match self {
      LogLevel::Off => "no",
      LogLevel::Debug => "v",
      LogLevel::Warning => "warn",
      LogLevel::Critical => "error",
      LogLevel::Fatal => "fatal",
      LogLevel::Info => "info",
    }
  }

  /// Parse a `msg-level` value such as `all=warn`; the last `module=level`
  /// assignment wins.
  pub fn from_msg_level(value: &str) -> Self {
    let level = match value.rfind('=') {
      Some(index) => &value[index + 1..],
      None => value,
    };
    match level {
      "" | "no" | "off" => LogLevel::Off,
      "v" | "debug" | "trace" => LogLevel::Debug,
      "warn" => LogLevel::Warning,
      "error" => LogLevel::Critical,
      "fatal" => LogLevel::Fatal,
      "info" => LogLevel::Info,
      _ => LogLevel::Debug,
    }
  }

  pub fn to_filter(self) -> log::LevelFilter {
    match self {
      LogLevel::Off => log::LevelFilter::Off,
      LogLevel::Debug => log::LevelFilter::Debug,
      LogLevel::Warning => log::LevelFilter::Warn,
      LogLevel::Critical | LogLevel::Fatal => log::LevelFilter::Error,
      LogLevel::Info => log::LevelFilter::Info,
    }
  }
}
