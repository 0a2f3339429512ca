//! File name patterns for the media types the player opens.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use serde::Serialize;

pub const VIDEO_SUFFIXES: &[&str] = &[
  "*.3g2", "*.3ga", "*.3gp", "*.3gp2", "*.3gpp", "*.amv", "*.asf", "*.asx", "*.avf", "*.avi",
  "*.bdm", "*.bdmv", "*.bik", "*.clpi", "*.cpi", "*.dat", "*.divx", "*.drc", "*.dv", "*.dvr-ms",
  "*.f4v", "*.flv", "*.gvi", "*.gxf", "*.hdmov", "*.hlv", "*.iso", "*.letv", "*.lrv", "*.m1v",
  "*.m2p", "*.m2t", "*.m2ts", "*.m2v", "*.m3u", "*.m3u8", "*.m4v", "*.mkv", "*.moov", "*.mov",
  "*.mp2", "*.mp2v", "*.mp4", "*.mp4v", "*.mpe", "*.mpeg", "*.mpeg1", "*.mpeg2", "*.mpeg4",
  "*.mpg", "*.mpl", "*.mpls", "*.mpv", "*.mpv2", "*.mqv", "*.mts", "*.mtv", "*.mxf", "*.mxg",
  "*.nsv", "*.nuv", "*.ogm", "*.ogv", "*.ogx", "*.ps", "*.qt", "*.qtvr", "*.ram", "*.rec", "*.rm",
  "*.rmj", "*.rmm", "*.rms", "*.rmvb", "*.rmx", "*.rp", "*.rpl", "*.rv", "*.rvx", "*.thp", "*.tod",
  "*.tp", "*.trp", "*.ts", "*.tts", "*.txd", "*.vcd", "*.vdr", "*.vob", "*.vp8", "*.vro", "*.webm",
  "*.wm", "*.wmv", "*.wtv", "*.xesc", "*.xspf",
];

pub const AUDIO_SUFFIXES: &[&str] = &[
  "*.mp3", "*.aac", "*.mka", "*.dts", "*.flac", "*.ogg", "*.m4a", "*.ac3", "*.opus", "*.wav", "*.wv",
];

pub const SUBTITLE_SUFFIXES: &[&str] = &[
  "*.utf", "*.utf8", "*.utf-8", "*.idx", "*.sub", "*.srt", "*.rt", "*.ssa", "*.ass", "*.mks", "*.vtt",
  "*.sup", "*.scc", "*.smi",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
  Video,
  Audio,
  Subtitle,
}

impl MediaKind {
  pub fn suffixes(&self) -> &'static [&'static str] {
    match self {
      MediaKind::Video => VIDEO_SUFFIXES,
      MediaKind::Audio => AUDIO_SUFFIXES,
      MediaKind::Subtitle => SUBTITLE_SUFFIXES,
    }
  }

  /// File dialog filter, e.g. `Audio files (*.mp3 *.aac ...)`.
  pub fn dialog_filter(&self) -> String {
    let label = match self {
      MediaKind::Video => "Video files",
      MediaKind::Audio => "Audio files",
      MediaKind::Subtitle => "Subtitle files",
    };
    format!("{} ({})", label, self.suffixes().join(" "))
  }
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
  case_sensitive: false,
  require_literal_separator: false,
  require_literal_leading_dot: false,
};

fn matches_any(patterns: &[&str], file_name: &str) -> bool {
  patterns.iter().any(|pattern| {
    Pattern::new(pattern)
      .map(|pattern| pattern.matches_with(file_name, MATCH_OPTIONS))
      .unwrap_or(false)
  })
}

/// Media kind of a file, judged by its name only. Video wins over audio for
/// names both lists would accept.
pub fn classify(path: impl AsRef<Path>) -> Option<MediaKind> {
  let file_name = path.as_ref().file_name()?.to_str()?;
  [MediaKind::Video, MediaKind::Audio, MediaKind::Subtitle]
    .into_iter()
    .find(|kind| matches_any(kind.suffixes(), file_name))
}

/// Whether the player can open the file as main media.
pub fn is_playable(path: impl AsRef<Path>) -> bool {
  matches!(classify(path), Some(MediaKind::Video | MediaKind::Audio))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_list_boundaries() {
    assert_eq!(VIDEO_SUFFIXES.first(), Some(&"*.3g2"));
    assert_eq!(VIDEO_SUFFIXES.last(), Some(&"*.xspf"));
    assert_eq!(AUDIO_SUFFIXES.len(), 11);
    assert_eq!(SUBTITLE_SUFFIXES.len(), 14);
  }

  #[test]
  fn test_patterns_compile() {
    for kind in [MediaKind::Video, MediaKind::Audio, MediaKind::Subtitle] {
      for pattern in kind.suffixes() {
        assert!(Pattern::new(pattern).is_ok(), "{}", pattern);
      }
    }
  }

  #[test]
  fn test_classify_ignores_case() {
    assert_eq!(classify("/media/Movie.MKV"), Some(MediaKind::Video));
    assert_eq!(classify("song.Flac"), Some(MediaKind::Audio));
    assert_eq!(classify("movie.en.srt"), Some(MediaKind::Subtitle));
    assert_eq!(classify("notes.txt"), None);
    assert_eq!(classify("/"), None);
  }

  #[test]
  fn test_playable() {
    assert!(is_playable("clip.webm"));
    assert!(is_playable("track.opus"));
    assert!(!is_playable("clip.ass"));
  }

  #[test]
  fn test_dialog_filter() {
    let filter = MediaKind::Subtitle.dialog_filter();
    assert!(filter.starts_with("Subtitle files (*.utf *.utf8"));
    assert!(filter.ends_with("*.smi)"));
  }
}
