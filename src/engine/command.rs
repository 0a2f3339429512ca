//! Engine command argument lists.
//!
//! Reference: https://mpv.io/manual/master/#list-of-input-commands

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::node::Node;

/// Reply ids for asynchronous engine calls. 0 is left to the engine's own
/// notifications.
static REPLY_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a unique reply id for an asynchronous call.
pub fn next_reply_id() -> u64 {
  REPLY_ID.fetch_add(1, Ordering::SeqCst)
}

/// How a `seek` target is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
  Relative,
  Absolute,
  AbsolutePercent,
}

impl SeekMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      SeekMode::Relative => "relative",
      SeekMode::Absolute => "absolute",
      SeekMode::AbsolutePercent => "absolute-percent",
    }
  }
}

/// Command sent to the engine as a node array.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
  pub args: Vec<Node>,
}

impl Command {
  pub fn new(args: Vec<Node>) -> Self {
    Self { args }
  }

  /// Load a file or URL, replacing the current one.
  pub fn loadfile(location: &str) -> Self {
    Self::new(vec!["loadfile".into(), location.into()])
  }

  /// Stop playback and clear the playlist.
  pub fn stop() -> Self {
    Self::new(vec!["stop".into()])
  }

  /// Seek by `value` seconds (or percent) in the given mode.
  pub fn seek(value: i64, mode: SeekMode) -> Self {
    Self::new(vec!["seek".into(), value.into(), mode.as_str().into()])
  }

  /// Take a screenshot into the configured directory, subtitles included.
  pub fn screenshot() -> Self {
    Self::new(vec!["screenshot".into(), "subtitles".into()])
  }

  /// Take a screenshot into `path`. The extension selects the image format.
  pub fn screenshot_to_file(path: &str) -> Self {
    Self::new(vec!["screenshot-to-file".into(), path.into(), "subtitles".into()])
  }

  /// Apply a named configuration profile.
  pub fn apply_profile(profile: &str) -> Self {
    Self::new(vec!["apply-profile".into(), profile.into()])
  }

  pub fn is_empty(&self) -> bool {
    self.args.is_empty()
  }

  /// Command name, i.e. the first argument.
  pub fn name(&self) -> String {
    self.args.first().map(Node::as_string).unwrap_or_default()
  }

  pub fn to_node(&self) -> Node {
    Node::Array(self.args.clone())
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.args.iter().map(Node::as_string).collect();
    f.write_str(&parts.join(" "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_seek_arguments() {
    let cmd = Command::seek(-10, SeekMode::Relative);
    assert_eq!(cmd.name(), "seek");
    assert_eq!(cmd.args[1], Node::Int64(-10));
    assert_eq!(cmd.args[2], Node::from("relative"));
    assert_eq!(cmd.to_string(), "seek -10 relative");
  }

  #[test]
  fn test_screenshot_includes_subtitles() {
    let cmd = Command::screenshot_to_file("/tmp/shot.png");
    assert_eq!(cmd.to_string(), "screenshot-to-file /tmp/shot.png subtitles");
  }

  #[test]
  fn test_reply_ids_are_unique() {
    let a = next_reply_id();
    let b = next_reply_id();
    assert_ne!(a, b);
    assert!(a > 0 && b > 0);
  }
}
