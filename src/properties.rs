//! The observed property surface.
//!
//! One table maps every engine property the player subscribes to onto the
//! signal its change raises. Construction observes each key; the event pump
//! looks changes up here.

use crate::signal::Signal;

pub static PROPERTY_SIGNALS: &[(&str, Signal)] = &[
  ("dwidth", Signal::VideoSizeChanged),
  ("dheight", Signal::VideoSizeChanged),
  ("duration", Signal::DurationChanged),
  ("time-pos", Signal::PositionChanged),
  ("volume", Signal::VolumeChanged),
  ("mute", Signal::MuteChanged),
  ("seekable", Signal::SeekableChanged),
  ("hwdec", Signal::HwdecChanged),
  ("vid", Signal::VidChanged),
  ("aid", Signal::AidChanged),
  ("sid", Signal::SidChanged),
  ("video-rotate", Signal::VideoRotateChanged),
  ("video-aspect", Signal::VideoAspectChanged),
  ("speed", Signal::SpeedChanged),
  ("deinterlace", Signal::DeinterlaceChanged),
  ("audio-exclusive", Signal::AudioExclusiveChanged),
  ("audio-file-auto", Signal::AudioFileAutoChanged),
  ("sub-auto", Signal::SubAutoChanged),
  ("sub-codepage", Signal::SubCodepageChanged),
  ("filename", Signal::FileNameChanged),
  ("media-title", Signal::MediaTitleChanged),
  ("vo", Signal::VoChanged),
  ("ao", Signal::AoChanged),
  ("screenshot-format", Signal::ScreenshotFormatChanged),
  ("screenshot-png-compression", Signal::ScreenshotPngCompressionChanged),
  ("screenshot-template", Signal::ScreenshotTemplateChanged),
  ("screenshot-directory", Signal::ScreenshotDirectoryChanged),
  ("profile", Signal::ProfileChanged),
  ("hr-seek", Signal::HrSeekChanged),
  ("ytdl", Signal::YtdlChanged),
  ("load-scripts", Signal::LoadScriptsChanged),
  ("path", Signal::PathChanged),
  ("file-format", Signal::FileFormatChanged),
  ("file-size", Signal::FileSizeChanged),
  ("video-bitrate", Signal::VideoBitrateChanged),
  ("audio-bitrate", Signal::AudioBitrateChanged),
  ("audio-device-list", Signal::AudioDeviceListChanged),
  ("screenshot-tag-colorspace", Signal::ScreenshotTagColorspaceChanged),
  ("screenshot-jpeg-quality", Signal::ScreenshotJpegQualityChanged),
  ("video-format", Signal::VideoFormatChanged),
  ("pause", Signal::PlaybackStateChanged),
  ("idle-active", Signal::PlaybackStateChanged),
  ("track-list", Signal::MediaTracksChanged),
  ("chapter-list", Signal::ChaptersChanged),
  ("metadata", Signal::MetadataChanged),
  ("avsync", Signal::AvsyncChanged),
  ("percent-pos", Signal::PercentPosChanged),
  ("estimated-vf-fps", Signal::EstimatedVfFpsChanged),
];

/// Properties that change every frame; their notifications are not logged.
const NOISY_PROPERTIES: &[&str] = &[
  "time-pos",
  "playback-time",
  "percent-pos",
  "avsync",
  "estimated-vf-fps",
  "video-bitrate",
  "audio-bitrate",
];

/// Signal raised when `name` changes, if the property is part of the surface.
pub fn signal_for(name: &str) -> Option<Signal> {
  PROPERTY_SIGNALS
    .iter()
    .find(|(property, _)| *property == name)
    .map(|(_, signal)| *signal)
}

/// Every property to observe at construction.
pub fn observed_properties() -> impl Iterator<Item = &'static str> {
  PROPERTY_SIGNALS.iter().map(|(property, _)| *property)
}

pub fn is_noisy(name: &str) -> bool {
  NOISY_PROPERTIES.iter().any(|noisy| noisy.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_keys_are_unique() {
    let keys: HashSet<_> = observed_properties().collect();
    assert_eq!(keys.len(), PROPERTY_SIGNALS.len());
    assert_eq!(keys.len(), 48);
  }

  #[test]
  fn test_lookup() {
    assert_eq!(signal_for("dheight"), Some(Signal::VideoSizeChanged));
    assert_eq!(signal_for("idle-active"), Some(Signal::PlaybackStateChanged));
    assert_eq!(signal_for("playback-time"), None);
  }

  #[test]
  fn test_noise_filter() {
    assert!(is_noisy("time-pos"));
    assert!(is_noisy("Playback-Time"));
    assert!(!is_noisy("volume"));
  }
}
