//! Notifications the player raises towards the UI host.

use serde::Serialize;

/// A change notification or lifecycle signal. The serialized form is the
/// camelCase name a declarative UI binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Signal {
  // Lifecycle
  Loaded,
  Playing,
  Paused,
  Stopped,
  /// A new frame is ready; the host should repaint the video surface.
  UpdateRequested,
  RendererInitialized,

  // Owned state
  SourceChanged,
  PlaybackStateChanged,
  MediaStatusChanged,
  LogLevelChanged,
  MpvCallTypeChanged,

  // Engine properties
  VideoSizeChanged,
  DurationChanged,
  PositionChanged,
  VolumeChanged,
  MuteChanged,
  SeekableChanged,
  HwdecChanged,
  VidChanged,
  AidChanged,
  SidChanged,
  VideoRotateChanged,
  VideoAspectChanged,
  SpeedChanged,
  DeinterlaceChanged,
  AudioExclusiveChanged,
  AudioFileAutoChanged,
  SubAutoChanged,
  SubCodepageChanged,
  FileNameChanged,
  MediaTitleChanged,
  VoChanged,
  AoChanged,
  ScreenshotFormatChanged,
  ScreenshotPngCompressionChanged,
  ScreenshotTemplateChanged,
  ScreenshotDirectoryChanged,
  ProfileChanged,
  HrSeekChanged,
  YtdlChanged,
  LoadScriptsChanged,
  PathChanged,
  FileFormatChanged,
  FileSizeChanged,
  VideoBitrateChanged,
  AudioBitrateChanged,
  AudioDeviceListChanged,
  ScreenshotTagColorspaceChanged,
  ScreenshotJpegQualityChanged,
  VideoFormatChanged,
  MediaTracksChanged,
  ChaptersChanged,
  MetadataChanged,
  AvsyncChanged,
  PercentPosChanged,
  EstimatedVfFpsChanged,
}

impl Signal {
  /// Name as seen from the UI side, e.g. `videoSizeChanged`.
  pub fn name(&self) -> String {
    match serde_json::to_value(self) {
      Ok(serde_json::Value::String(name)) => name,
      _ => format!("{:?}", self),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ui_names() {
    assert_eq!(Signal::VideoSizeChanged.name(), "videoSizeChanged");
    assert_eq!(Signal::Loaded.name(), "loaded");
    assert_eq!(Signal::EstimatedVfFpsChanged.name(), "estimatedVfFpsChanged");
  }
}
