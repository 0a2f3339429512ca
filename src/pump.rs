//! Engine event pump.
//!
//! Runs on the UI thread after a wakeup: pull events until the queue is empty
//! and turn each one into exactly one handler action.

use std::time::Duration;

use crate::bridge::PropertyBridge;
use crate::engine::{EngineLogLevel, Event, LogMessage};
use crate::properties;
use crate::signal::Signal;
use crate::state::MediaStatus;

/// What the pump needs from the object that owns the UI-side state.
pub trait EventSink {
  fn set_media_status(&mut self, status: MediaStatus);
  fn emit(&mut self, signal: Signal);
  /// Announce the current playback state (`Playing`/`Paused`/`Stopped`) and
  /// `PlaybackStateChanged`.
  fn playback_state_changed(&mut self);
  fn complete_reply(&mut self, reply: u64, outcome: Result<String, String>);
}

pub struct EventPump {
  timeout: Duration,
}

impl EventPump {
  pub fn new(timeout: Duration) -> Self {
    Self { timeout }
  }

  /// Next queued event; `None` ends the current drain.
  pub fn poll(&self, bridge: &PropertyBridge) -> Option<Event> {
    bridge.wait_event(self.timeout)
  }
}

/// Apply one event to the sink.
pub fn dispatch(event: Event, sink: &mut dyn EventSink) {
  let mut log_event = true;
  match &event {
    Event::Shutdown => {}
    Event::LogMessage(message) => {
      route_log_message(message);
      log_event = false;
    }
    Event::GetPropertyReply { reply, result, .. } | Event::CommandReply { reply, result } => {
      sink.complete_reply(*reply, outcome(result));
      log_event = false;
    }
    Event::SetPropertyReply { reply, result } => {
      sink.complete_reply(*reply, outcome(result));
      log_event = false;
    }
    Event::StartFile => sink.set_media_status(MediaStatus::Loading),
    Event::EndFile(reason) => {
      log::debug!("File ended: {:?}", reason);
      sink.set_media_status(MediaStatus::End);
      sink.playback_state_changed();
    }
    Event::FileLoaded => {
      sink.set_media_status(MediaStatus::Loaded);
      sink.emit(Signal::Loaded);
      sink.playback_state_changed();
    }
    Event::Idle => sink.playback_state_changed(),
    Event::Tick => log_event = false,
    Event::VideoReconfig => sink.emit(Signal::VideoSizeChanged),
    Event::AudioReconfig => {}
    Event::PropertyChange { name, .. } => {
      if !properties::is_noisy(name) {
        log::debug!("Property changed: {}", name);
      }
      if let Some(signal) = properties::signal_for(name) {
        sink.emit(signal);
      }
      log_event = false;
    }
    Event::QueueOverflow => {
      log::warn!("Engine event queue overflowed; some events were dropped");
      log_event = false;
    }
    Event::ClientMessage(_)
    | Event::Seek
    | Event::PlaybackRestart
    | Event::Hook { .. }
    | Event::Other(_) => {}
  }
  if log_event {
    log::debug!("Event received: {}", event);
  }
}

fn outcome<T: std::fmt::Debug>(result: &Result<T, crate::engine::EngineError>) -> Result<String, String> {
  match result {
    Ok(value) => Ok(format!("{:?}", value)),
    Err(e) => Err(e.to_string()),
  }
}

/// `[libmpv] prefix: text`, without the engine's trailing newline.
fn log_line(message: &LogMessage) -> String {
  format!("[libmpv] {}: {}", message.prefix, message.text.trim_end())
}

/// Forward an engine log line to the `log` facade at the matching severity.
/// A fatal engine message aborts the process.
pub fn route_log_message(message: &LogMessage) {
  let line = log_line(message);
  match message.level {
    EngineLogLevel::Trace | EngineLogLevel::Debug | EngineLogLevel::Verbose => {
      log::debug!(target: "libmpv", "{}", line)
    }
    EngineLogLevel::Warn => log::warn!(target: "libmpv", "{}", line),
    EngineLogLevel::Error => log::error!(target: "libmpv", "{}", line),
    EngineLogLevel::Info => log::info!(target: "libmpv", "{}", line),
    EngineLogLevel::Fatal => crate::logging::fatal("libmpv", &format!("fatal: {}", line)),
    EngineLogLevel::Status => log::debug!(target: "libmpv", "{}", line),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::{EndFileReason, EngineError, Node};

  #[derive(Default)]
  struct Recorder {
    statuses: Vec<MediaStatus>,
    signals: Vec<Signal>,
    transitions: usize,
    replies: Vec<(u64, Result<String, String>)>,
  }

  impl EventSink for Recorder {
    fn set_media_status(&mut self, status: MediaStatus) {
      self.statuses.push(status);
    }

    fn emit(&mut self, signal: Signal) {
      self.signals.push(signal);
    }

    fn playback_state_changed(&mut self) {
      self.transitions += 1;
    }

    fn complete_reply(&mut self, reply: u64, outcome: Result<String, String>) {
      self.replies.push((reply, outcome));
    }
  }

  fn run(events: Vec<Event>) -> Recorder {
    let mut recorder = Recorder::default();
    for event in events {
      dispatch(event, &mut recorder);
    }
    recorder
  }

  #[test]
  fn test_every_table_entry_fires_only_its_signal() {
    for (name, expected) in properties::PROPERTY_SIGNALS {
      let recorder = run(vec![Event::PropertyChange {
        name: name.to_string(),
        value: Node::None,
      }]);
      assert_eq!(recorder.signals, vec![*expected], "property {}", name);
      assert!(recorder.statuses.is_empty());
      assert_eq!(recorder.transitions, 0);
    }
  }

  #[test]
  fn test_unlisted_property_is_ignored() {
    let recorder = run(vec![Event::PropertyChange {
      name: "playback-time".to_string(),
      value: Node::Double(1.0),
    }]);
    assert!(recorder.signals.is_empty());
  }

  #[test]
  fn test_file_lifecycle() {
    let recorder = run(vec![
      Event::StartFile,
      Event::FileLoaded,
      Event::EndFile(EndFileReason::Eof),
      Event::Idle,
    ]);
    assert_eq!(
      recorder.statuses,
      vec![MediaStatus::Loading, MediaStatus::Loaded, MediaStatus::End]
    );
    assert_eq!(recorder.signals, vec![Signal::Loaded]);
    assert_eq!(recorder.transitions, 3);
  }

  #[test]
  fn test_reconfig_events() {
    let recorder = run(vec![Event::VideoReconfig, Event::AudioReconfig, Event::Shutdown]);
    assert_eq!(recorder.signals, vec![Signal::VideoSizeChanged]);
    assert!(recorder.statuses.is_empty());
    assert_eq!(recorder.transitions, 0);
  }

  #[test]
  fn test_replies_are_completed() {
    let recorder = run(vec![
      Event::SetPropertyReply {
        reply: 3,
        result: Err(EngineError::new(-7, "property format not supported")),
      },
      Event::CommandReply {
        reply: 4,
        result: Ok(Node::None),
      },
    ]);
    assert_eq!(recorder.replies.len(), 2);
    assert!(recorder.replies[0].1.is_err());
    assert!(recorder.replies[1].1.is_ok());
    assert!(recorder.signals.is_empty());
  }

  #[test]
  fn test_non_fatal_log_messages_route_without_side_effects() {
    let recorder = run(vec![
      Event::LogMessage(LogMessage {
        prefix: "cplayer".to_string(),
        level: EngineLogLevel::Warn,
        text: "something odd\n".to_string(),
      }),
      Event::LogMessage(LogMessage {
        prefix: "vd".to_string(),
        level: EngineLogLevel::Verbose,
        text: "decoder opened".to_string(),
      }),
      Event::QueueOverflow,
    ]);
    assert!(recorder.signals.is_empty());
    assert!(recorder.replies.is_empty());
  }

  #[test]
  fn test_log_line_format() {
    let message = LogMessage {
      prefix: "cplayer".to_string(),
      level: EngineLogLevel::Info,
      text: "Playing: movie.mkv\n".to_string(),
    };
    assert_eq!(log_line(&message), "[libmpv] cplayer: Playing: movie.mkv");
  }
}
