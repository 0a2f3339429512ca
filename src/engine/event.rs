//! Engine events as drained from the client event queue.

use std::fmt;

use super::node::Node;
use super::EngineError;

/// Severity attached to an engine log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLogLevel {
  Fatal,
  Error,
  Warn,
  Info,
  /// mpv's default "status" level.
  Status,
  Verbose,
  Debug,
  Trace,
}

impl EngineLogLevel {
  /// Parse the level name mpv uses in `mpv_event_log_message::level`.
  pub fn from_name(name: &str) -> Self {
    match name {
      "fatal" => Self::Fatal,
      "error" => Self::Error,
      "warn" => Self::Warn,
      "info" => Self::Info,
      "v" => Self::Verbose,
      "debug" => Self::Debug,
      "trace" => Self::Trace,
      _ => Self::Status,
    }
  }
}

/// A log line emitted by the engine after `request_log_messages`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogMessage {
  /// Module prefix, e.g. "cplayer" or "vd".
  pub prefix: String,
  pub level: EngineLogLevel,
  pub text: String,
}

/// Why a file stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndFileReason {
  Eof,
  Stop,
  Quit,
  Error(i32),
  Redirect,
  Unknown,
}

/// One entry of the engine event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
  Shutdown,
  LogMessage(LogMessage),
  GetPropertyReply {
    reply: u64,
    name: String,
    result: Result<Node, EngineError>,
  },
  SetPropertyReply {
    reply: u64,
    result: Result<(), EngineError>,
  },
  CommandReply {
    reply: u64,
    result: Result<Node, EngineError>,
  },
  StartFile,
  EndFile(EndFileReason),
  FileLoaded,
  Idle,
  Tick,
  ClientMessage(Vec<String>),
  VideoReconfig,
  AudioReconfig,
  Seek,
  PlaybackRestart,
  PropertyChange {
    name: String,
    value: Node,
  },
  QueueOverflow,
  Hook {
    name: String,
    id: u64,
  },
  /// Event ids this layer has no model for.
  Other(i32),
}

impl Event {
  /// Event name as mpv spells it.
  pub fn name(&self) -> &'static str {
    match self {
      Event::Shutdown => "shutdown",
      Event::LogMessage(_) => "log-message",
      Event::GetPropertyReply { .. } => "get-property-reply",
      Event::SetPropertyReply { .. } => "set-property-reply",
      Event::CommandReply { .. } => "command-reply",
      Event::StartFile => "start-file",
      Event::EndFile(_) => "end-file",
      Event::FileLoaded => "file-loaded",
      Event::Idle => "idle",
      Event::Tick => "tick",
      Event::ClientMessage(_) => "client-message",
      Event::VideoReconfig => "video-reconfig",
      Event::AudioReconfig => "audio-reconfig",
      Event::Seek => "seek",
      Event::PlaybackRestart => "playback-restart",
      Event::PropertyChange { .. } => "property-change",
      Event::QueueOverflow => "event-queue-overflow",
      Event::Hook { .. } => "hook",
      Event::Other(_) => "unknown",
    }
  }
}

impl fmt::Display for Event {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Event::PropertyChange { name, .. } => write!(f, "property-change({})", name),
      Event::EndFile(reason) => write!(f, "end-file({:?})", reason),
      Event::Other(id) => write!(f, "event #{}", id),
      other => f.write_str(other.name()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_log_level_names() {
    assert_eq!(EngineLogLevel::from_name("v"), EngineLogLevel::Verbose);
    assert_eq!(EngineLogLevel::from_name("fatal"), EngineLogLevel::Fatal);
    assert_eq!(EngineLogLevel::from_name("status"), EngineLogLevel::Status);
    assert_eq!(EngineLogLevel::from_name("whatever"), EngineLogLevel::Status);
  }

  #[test]
  fn test_event_display() {
    let event = Event::PropertyChange {
      name: "volume".to_string(),
      value: Node::Double(50.0),
    };
    assert_eq!(event.to_string(), "property-change(volume)");
    assert_eq!(Event::FileLoaded.to_string(), "file-loaded");
    assert_eq!(Event::Other(99).to_string(), "event #99");
  }
}
