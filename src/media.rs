//! Fixed-shape records built from the engine's generic property trees.
//!
//! Nothing here is cached: the player rebuilds a projection on every read.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::Node;

/// What the player was asked to open: a local file or a URL the engine
/// resolves itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
  File(PathBuf),
  Url(String),
}

impl MediaSource {
  /// Parse a locator. `file://` URLs and bare paths become `File`; anything
  /// with a scheme stays a URL. Blank input is not a source.
  pub fn parse(location: &str) -> Option<Self> {
    let location = location.trim();
    if location.is_empty() {
      return None;
    }
    if let Some(path) = location.strip_prefix("file://") {
      if path.is_empty() {
        return None;
      }
      return Some(MediaSource::File(PathBuf::from(path)));
    }
    match location.split_once("://") {
      Some((scheme, rest)) if is_scheme(scheme) && !rest.is_empty() => {
        Some(MediaSource::Url(location.to_string()))
      }
      _ => Some(MediaSource::File(PathBuf::from(location))),
    }
  }

  pub fn from_path(path: impl AsRef<Path>) -> Self {
    MediaSource::File(path.as_ref().to_path_buf())
  }

  pub fn is_local_file(&self) -> bool {
    matches!(self, MediaSource::File(_))
  }

  /// Argument for `loadfile`: plain path for local files, the URL otherwise.
  pub fn locator(&self) -> String {
    match self {
      MediaSource::File(path) => path.to_string_lossy().into_owned(),
      MediaSource::Url(url) => url.clone(),
    }
  }
}

fn is_scheme(scheme: &str) -> bool {
  let mut chars = scheme.chars();
  matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl fmt::Display for MediaSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MediaSource::File(path) => write!(f, "file://{}", path.display()),
      MediaSource::Url(url) => f.write_str(url),
    }
  }
}

/// Displayed video size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VideoSize {
  pub width: i64,
  pub height: i64,
}

impl VideoSize {
  pub fn transposed(self) -> Self {
    Self {
      width: self.height,
      height: self.width,
    }
  }
}

/// Stream type of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
  Video,
  Audio,
  Sub,
}

impl TrackKind {
  fn parse(value: &str) -> Option<Self> {
    match value {
      "video" => Some(TrackKind::Video),
      "audio" => Some(TrackKind::Audio),
      "sub" => Some(TrackKind::Sub),
      _ => None,
    }
  }
}

/// Fields only video or audio tracks carry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TrackDetails {
  Video {
    albumart: bool,
    demux_w: i64,
    demux_h: i64,
    demux_fps: f64,
  },
  Audio {
    demux_channel_count: i64,
    demux_channels: String,
    demux_samplerate: i64,
  },
  Sub,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
  pub id: i64,
  pub kind: TrackKind,
  pub src_id: i64,
  /// Display title; falls back to the language or a placeholder.
  pub title: String,
  pub lang: String,
  pub default: bool,
  pub forced: bool,
  pub codec: String,
  pub external: bool,
  pub external_filename: String,
  pub selected: bool,
  pub decoder_desc: String,
  pub details: TrackDetails,
}

impl TrackInfo {
  /// Build from one `track-list` entry. Entries of other types (e.g. images
  /// of unknown kind) yield `None`.
  pub fn from_node(node: &Node) -> Option<Self> {
    let kind = TrackKind::parse(&node.get("type").as_string())?;
    let lang = node.get("lang").as_string();
    let external = node.get("external").as_bool();
    let title = match node.get("title").as_string() {
      title if !title.is_empty() => title,
      _ if !lang.is_empty() && lang != "und" => lang.clone(),
      _ if !external => "[internal]".to_string(),
      _ => "[untitled]".to_string(),
    };
    let details = match kind {
      TrackKind::Video => TrackDetails::Video {
        albumart: node.get("albumart").as_bool(),
        demux_w: node.get("demux-w").as_i64(),
        demux_h: node.get("demux-h").as_i64(),
        demux_fps: node.get("demux-fps").as_f64(),
      },
      TrackKind::Audio => TrackDetails::Audio {
        demux_channel_count: node.get("demux-channel-count").as_i64(),
        demux_channels: node.get("demux-channels").as_string(),
        demux_samplerate: node.get("demux-samplerate").as_i64(),
      },
      TrackKind::Sub => TrackDetails::Sub,
    };
    Some(Self {
      id: node.get("id").as_i64(),
      kind,
      src_id: node.get("src-id").as_i64(),
      title,
      lang,
      default: node.get("default").as_bool(),
      forced: node.get("forced").as_bool(),
      codec: node.get("codec").as_string(),
      external,
      external_filename: node.get("external-filename").as_string(),
      selected: node.get("selected").as_bool(),
      decoder_desc: node.get("decoder-desc").as_string(),
      details,
    })
  }
}

/// Tracks of the current file, grouped by type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTracks {
  pub video_channels: Vec<TrackInfo>,
  pub audio_tracks: Vec<TrackInfo>,
  pub subtitle_streams: Vec<TrackInfo>,
}

impl MediaTracks {
  pub fn from_node(track_list: &Node) -> Self {
    let mut tracks = Self::default();
    for track in track_list.as_array().iter().filter_map(TrackInfo::from_node) {
      match track.kind {
        TrackKind::Video => tracks.video_channels.push(track),
        TrackKind::Audio => tracks.audio_tracks.push(track),
        TrackKind::Sub => tracks.subtitle_streams.push(track),
      }
    }
    tracks
  }

  pub fn count(&self) -> usize {
    self.video_channels.len() + self.audio_tracks.len() + self.subtitle_streams.len()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
  pub title: String,
  /// Start time in seconds.
  pub time: f64,
}

pub fn chapters_from_node(chapter_list: &Node) -> Vec<Chapter> {
  chapter_list
    .as_array()
    .iter()
    .map(|chapter| Chapter {
      title: chapter.get("title").as_string(),
      time: chapter.get("time").as_f64(),
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioDevice {
  pub name: String,
  pub description: String,
}

pub fn audio_devices_from_node(device_list: &Node) -> Vec<AudioDevice> {
  device_list
    .as_array()
    .iter()
    .map(|device| AudioDevice {
      name: device.get("name").as_string(),
      description: device.get("description").as_string(),
    })
    .collect()
}

/// Tag map of the current file, re-keyed verbatim.
pub fn metadata_from_node(metadata: &Node) -> BTreeMap<String, Node> {
  metadata.as_map().cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn track_list() -> Node {
    Node::from(json!([
      {"id": 1, "type": "video", "src-id": 0, "title": "Main", "lang": "und", "codec": "h264",
       "albumart": false, "demux-w": 1920, "demux-h": 1080, "demux-fps": 24.0, "selected": true},
      {"id": 1, "type": "audio", "src-id": 1, "lang": "jpn", "codec": "aac",
       "demux-channel-count": 2, "demux-channels": "stereo", "demux-samplerate": 48000},
      {"id": 2, "type": "audio", "src-id": 2, "lang": "und", "external": false},
      {"id": 1, "type": "sub", "src-id": 3, "lang": "und", "external": true,
       "external-filename": "/media/movie.srt"},
      {"id": 9, "type": "attachment"}
    ]))
  }

  #[test]
  fn test_tracks_grouped_by_type() {
    let tracks = MediaTracks::from_node(&track_list());
    assert_eq!(tracks.video_channels.len(), 1);
    assert_eq!(tracks.audio_tracks.len(), 2);
    assert_eq!(tracks.subtitle_streams.len(), 1);
    assert_eq!(tracks.count(), 4);

    let video = &tracks.video_channels[0];
    assert_eq!(video.title, "Main");
    assert!(video.selected);
    assert_eq!(
      video.details,
      TrackDetails::Video {
        albumart: false,
        demux_w: 1920,
        demux_h: 1080,
        demux_fps: 24.0
      }
    );
  }

  #[test]
  fn test_title_fallbacks() {
    let tracks = MediaTracks::from_node(&track_list());
    assert_eq!(tracks.audio_tracks[0].title, "jpn");
    assert_eq!(tracks.audio_tracks[1].title, "[internal]");
    assert_eq!(tracks.subtitle_streams[0].title, "[untitled]");
    assert_eq!(tracks.subtitle_streams[0].external_filename, "/media/movie.srt");
  }

  #[test]
  fn test_non_list_yields_empty_projection() {
    assert_eq!(MediaTracks::from_node(&Node::None).count(), 0);
    assert!(chapters_from_node(&Node::Int64(3)).is_empty());
    assert!(metadata_from_node(&Node::None).is_empty());
  }

  #[test]
  fn test_chapters_and_devices() {
    let chapters = chapters_from_node(&Node::from(json!([
      {"title": "Opening", "time": 0.0},
      {"title": "Part A", "time": 90.5}
    ])));
    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[1].title, "Part A");
    assert_eq!(chapters[1].time, 90.5);

    let devices = audio_devices_from_node(&Node::from(json!([
      {"name": "auto", "description": "Autoselect device"},
      {"name": "pulse", "description": "Default (pulse)"}
    ])));
    assert_eq!(devices[0].name, "auto");
    assert_eq!(devices[1].description, "Default (pulse)");
  }

  #[test]
  fn test_source_parsing() {
    assert_eq!(MediaSource::parse("  "), None);
    assert_eq!(MediaSource::parse("file://"), None);
    assert_eq!(
      MediaSource::parse("file:///media/a.mkv"),
      Some(MediaSource::File(PathBuf::from("/media/a.mkv")))
    );
    assert_eq!(
      MediaSource::parse("/media/a.mkv").map(|s| s.locator()),
      Some("/media/a.mkv".to_string())
    );
    let url = MediaSource::parse("https://example.com/live.m3u8").unwrap();
    assert!(!url.is_local_file());
    assert_eq!(url.locator(), "https://example.com/live.m3u8");
    assert_eq!(MediaSource::from_path("/a b.mp4").to_string(), "file:///a b.mp4");
  }

  #[test]
  fn test_metadata_keys_preserved() {
    let metadata = metadata_from_node(&Node::from(json!({"title": "Song", "artist": "Band"})));
    assert_eq!(metadata.get("artist"), Some(&Node::from("Band")));
    assert_eq!(metadata.len(), 2);
  }
}
