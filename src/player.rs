//! The host-facing player object.
//!
//! `MpvPlayer` lives on the UI thread. Every property read goes to the engine
//! (clamped or defaulted at the boundary), every write is forwarded, and the
//! only state kept here is the current source, the cached media status and
//! the call mode.

use std::collections::BTreeMap;
use std::time::Duration;

use async_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;

use crate::bridge::{CallMode, PropertyBridge};
use crate::config::PlayerConfig;
use crate::dispatch::{UiQueue, UiTask, UiTasks};
use crate::engine::{Command, Engine, Event, Node, RenderTarget, SeekMode};
use crate::error::{MpvError, Result};
use crate::formats;
use crate::handle::EngineHandle;
use crate::media::{
  audio_devices_from_node, chapters_from_node, metadata_from_node, AudioDevice, Chapter,
  MediaSource, MediaTracks, VideoSize,
};
use crate::properties;
use crate::pump::{self, EventPump, EventSink};
use crate::render::{GlHost, RendererAdapter};
use crate::signal::Signal;
use crate::state::{LogLevel, MediaStatus, PlaybackState};

/// Options set before initialization so the engine leaves input to the host.
const INPUT_OPTIONS: &[&str] = &[
  "input-default-bindings",
  "input-vo-keyboard",
  "input-cursor",
  "cursor-autohide",
];

/// Aspect ratio reported while nothing is loaded.
const DEFAULT_ASPECT: f64 = 1.7777;

/// Undelivered signals kept per subscriber; newer ones are dropped when full.
const SIGNAL_BUFFER: usize = 256;

pub struct MpvPlayer {
  // Field order is drop order: the render context goes before the engine.
  renderer: RendererAdapter,
  bridge: PropertyBridge,
  pump: EventPump,
  queue: UiQueue,
  subscribers: Mutex<Vec<Sender<Signal>>>,
  current_source: Option<MediaSource>,
  media_status: MediaStatus,
}

impl MpvPlayer {
  /// Take ownership of a created (not yet initialized) engine, subscribe to
  /// the property surface, initialize it and apply `config`.
  pub fn new(engine: Box<dyn Engine>, config: &PlayerConfig) -> Result<Self> {
    let mut handle = EngineHandle::new(engine);

    for name in INPUT_OPTIONS {
      if let Err(e) = handle.set_option(name, "no") {
        log::warn!("Failed to set option {}: {}", name, e);
      }
    }
    for (name, value) in &config.extra_options {
      if let Err(e) = handle.set_option(name, value) {
        log::warn!("Failed to set option {}={}: {}", name, value, e);
      }
    }

    let queue = UiQueue::new();
    let wakeup = queue.notifier(UiTask::ProcessEvents);
    handle.set_wakeup_callback(Box::new(move || wakeup.notify()));

    let bridge = PropertyBridge::new(handle);
    for name in properties::observed_properties() {
      bridge.observe(name);
    }

    // From here on the wakeup callback may fire.
    bridge
      .handle()
      .initialize()
      .map_err(|e| MpvError::EngineUnavailable(e.to_string()))?;
    log::info!("Engine initialized: {}", bridge.get_or_none("mpv-version").as_string());

    let mut player = Self {
      renderer: RendererAdapter::new(queue.notifier(UiTask::Redraw)),
      bridge,
      pump: EventPump::new(Duration::from_millis(config.event_poll_timeout_ms)),
      queue,
      subscribers: Mutex::new(Vec::new()),
      current_source: None,
      media_status: MediaStatus::default(),
    };
    player.apply_config(config);
    Ok(player)
  }

  /// Push the configured startup defaults into the engine. Values equal to
  /// the current ones are skipped.
  pub fn apply_config(&mut self, config: &PlayerConfig) {
    self.pump = EventPump::new(Duration::from_millis(config.event_poll_timeout_ms));
    self.set_screenshot_format(&config.screenshot_format);
    self.set_screenshot_png_compression(config.screenshot_png_compression);
    self.set_screenshot_tag_colorspace(config.screenshot_tag_colorspace);
    self.set_screenshot_template(&config.screenshot_template);
    if let Some(dir) = config.resolved_screenshot_directory() {
      self.set_screenshot_directory(&dir.to_string_lossy());
    }
    self.set_hwdec(&config.hwdec);
    self.set_hr_seek(config.hr_seek);
    self.set_ytdl(config.ytdl);
    self.set_load_scripts(config.load_scripts);
    self.set_log_level(config.log_level);
    self.set_mpv_call_type(config.call_mode);
  }

  // ---------------------------------------------------------------------------
  // Host plumbing
  // ---------------------------------------------------------------------------

  /// Subscribe to the signals raised from now on, in emission order. Every
  /// subscriber receives every signal; dropping the receiver unsubscribes.
  pub fn signals(&self) -> Receiver<Signal> {
    let (tx, rx) = async_channel::bounded(SIGNAL_BUFFER);
    self.subscribers.lock().push(tx);
    rx
  }

  /// Work posted by engine callbacks; feed each task to `handle_task`.
  pub fn tasks(&self) -> UiTasks {
    self.queue.tasks()
  }

  /// Run one task taken from `tasks()`.
  pub fn handle_task(&mut self, task: UiTask) {
    match task {
      UiTask::ProcessEvents => self.process_events(),
      UiTask::Redraw => self.send(Signal::UpdateRequested),
    }
  }

  /// Handle every task queued so far without waiting.
  pub fn run_pending_tasks(&mut self) {
    let tasks = self.queue.tasks();
    while let Some(task) = tasks.try_next() {
      self.handle_task(task);
    }
  }

  /// Drain the engine event queue.
  pub fn process_events(&mut self) {
    while let Some(event) = self.pump.poll(&self.bridge) {
      let shutdown = matches!(event, Event::Shutdown);
      pump::dispatch(event, self);
      if shutdown {
        log::info!("Engine is shutting down");
        break;
      }
    }
  }

  /// Direct access to the property bridge for properties outside the
  /// typed surface.
  pub fn bridge(&self) -> &PropertyBridge {
    &self.bridge
  }

  /// Create the render context if needed. Emits `RendererInitialized` once.
  pub fn init_renderer(&mut self, host: &dyn GlHost) -> Result<()> {
    if self.renderer.ensure_initialized(&self.bridge, host)? {
      self.send(Signal::RendererInitialized);
    }
    Ok(())
  }

  /// Render the current frame into `target`, creating the render context on
  /// first use. A failed creation is not retried; later frames return `false`.
  pub fn render(&mut self, host: &mut dyn GlHost, target: &RenderTarget) -> bool {
    if !self.renderer.is_initialized() && !self.renderer.has_failed() {
      if let Err(e) = self.init_renderer(host) {
        log::error!("{}", e);
        return false;
      }
    }
    self.renderer.render(host, target)
  }

  fn send(&self, signal: Signal) {
    self.subscribers.lock().retain(|tx| match tx.try_send(signal) {
      Ok(()) => true,
      Err(TrySendError::Full(_)) => {
        log::debug!("Signal {} dropped for a full subscriber", signal.name());
        true
      }
      Err(TrySendError::Closed(_)) => false,
    });
  }

  fn prop(&self, name: &str) -> Node {
    self.bridge.get_or_none(name)
  }

  // ---------------------------------------------------------------------------
  // State
  // ---------------------------------------------------------------------------

  /// Derived from `idle-active` and `pause`.
  pub fn playback_state(&self) -> PlaybackState {
    PlaybackState::from_flags(self.prop("idle-active").as_bool(), self.prop("pause").as_bool())
  }

  /// `true` while a file plays unpaused.
  pub fn is_playing(&self) -> bool {
    self.playback_state() == PlaybackState::Playing
  }

  /// `true` while a loaded file is paused.
  pub fn is_paused(&self) -> bool {
    self.playback_state() == PlaybackState::Paused
  }

  /// `true` while the engine is idle.
  pub fn is_stopped(&self) -> bool {
    self.playback_state() == PlaybackState::Stopped
  }

  /// Last media status seen in the event stream.
  pub fn media_status(&self) -> MediaStatus {
    self.media_status
  }

  /// Whether the current file finished loading.
  pub fn is_loaded(&self) -> bool {
    self.media_status.is_loaded()
  }

  /// Whether engine calls are issued synchronously or asynchronously.
  pub fn mpv_call_type(&self) -> CallMode {
    self.bridge.call_mode()
  }

  /// Engine log level, parsed from `msg-level`.
  pub fn log_level(&self) -> LogLevel {
    LogLevel::from_msg_level(&self.prop("msg-level").as_string())
  }

  /// The source being played; `None` while stopped.
  pub fn source(&self) -> Option<&MediaSource> {
    if self.is_stopped() {
      return None;
    }
    self.current_source.as_ref()
  }

  // ---------------------------------------------------------------------------
  // Read-only properties
  // ---------------------------------------------------------------------------

  /// Display size of the video; 0x0 while stopped.
  pub fn video_size(&self) -> VideoSize {
    if self.is_stopped() {
      return VideoSize::default();
    }
    let size = VideoSize {
      width: self.prop("video-out-params/dw").as_i64().max(0),
      height: self.prop("video-out-params/dh").as_i64().max(0),
    };
    match self.video_rotate() {
      90 | 270 => size.transposed(),
      _ => size,
    }
  }

  /// Length of the current file in seconds.
  pub fn duration(&self) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop("duration").as_i64().max(0)
  }

  /// Whether the current file supports seeking.
  pub fn seekable(&self) -> bool {
    !self.is_stopped() && self.prop("seekable").as_bool()
  }

  /// File name of the current file.
  pub fn file_name(&self) -> String {
    self.stopped_or_string("filename")
  }

  /// Title from the file's metadata, or its file name.
  pub fn media_title(&self) -> String {
    self.stopped_or_string("media-title")
  }

  /// Path or URL as passed to the engine.
  pub fn path(&self) -> String {
    self.stopped_or_string("path")
  }

  /// Container format name.
  pub fn file_format(&self) -> String {
    self.stopped_or_string("file-format")
  }

  /// Video codec name.
  pub fn video_format(&self) -> String {
    self.stopped_or_string("video-format")
  }

  /// Size of the current file in bytes.
  pub fn file_size(&self) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop("file-size").as_i64().max(0)
  }

  /// Current video bitrate in bits per second.
  pub fn video_bitrate(&self) -> f64 {
    self.stopped_or_non_negative("video-bitrate")
  }

  /// Current audio bitrate in bits per second.
  pub fn audio_bitrate(&self) -> f64 {
    self.stopped_or_non_negative("audio-bitrate")
  }

  /// Audio/video desync in seconds.
  pub fn avsync(&self) -> f64 {
    self.stopped_or_non_negative("avsync")
  }

  /// Estimated output frame rate after filters.
  pub fn estimated_vf_fps(&self) -> f64 {
    self.stopped_or_non_negative("estimated-vf-fps")
  }

  /// Version string of the linked engine.
  pub fn mpv_version(&self) -> String {
    self.prop("mpv-version").as_string()
  }

  /// Build configuration of the linked engine.
  pub fn mpv_configuration(&self) -> String {
    self.prop("mpv-configuration").as_string()
  }

  /// Version of the FFmpeg libraries the engine uses.
  pub fn ffmpeg_version(&self) -> String {
    self.prop("ffmpeg-version").as_string()
  }

  /// Version of this binding layer.
  pub fn host_version(&self) -> &'static str {
    env!("CARGO_PKG_VERSION")
  }

  /// Audio output devices the engine can use.
  pub fn audio_device_list(&self) -> Vec<AudioDevice> {
    audio_devices_from_node(&self.prop("audio-device-list"))
  }

  /// Video, audio and subtitle tracks of the current file.
  pub fn media_tracks(&self) -> MediaTracks {
    MediaTracks::from_node(&self.prop("track-list"))
  }

  /// Chapter list of the current file.
  pub fn chapters(&self) -> Vec<Chapter> {
    chapters_from_node(&self.prop("chapter-list"))
  }

  /// Tag metadata of the current file.
  pub fn metadata(&self) -> BTreeMap<String, Node> {
    metadata_from_node(&self.prop("metadata"))
  }

  /// File patterns of playable video files.
  pub fn video_suffixes(&self) -> &'static [&'static str] {
    formats::VIDEO_SUFFIXES
  }

  /// File patterns of playable audio files.
  pub fn audio_suffixes(&self) -> &'static [&'static str] {
    formats::AUDIO_SUFFIXES
  }

  /// File patterns of loadable subtitle files.
  pub fn subtitle_suffixes(&self) -> &'static [&'static str] {
    formats::SUBTITLE_SUFFIXES
  }

  fn stopped_or_string(&self, name: &str) -> String {
    if self.is_stopped() {
      return String::new();
    }
    self.prop(name).as_string()
  }

  fn stopped_or_non_negative(&self, name: &str) -> f64 {
    if self.is_stopped() {
      return 0.0;
    }
    self.prop(name).as_f64().max(0.0)
  }

  // ---------------------------------------------------------------------------
  // Read/write properties
  // ---------------------------------------------------------------------------

  /// Playback position in seconds, within `[0, duration]`.
  pub fn position(&self) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop("time-pos").as_i64().max(0).min(self.duration())
  }

  /// Seek to `position` seconds, clamped to the file length.
  pub fn set_position(&self, position: i64) {
    if self.is_stopped() || position == self.position() {
      return;
    }
    self.seek(position.max(0).min(self.duration()), true, false);
  }

  /// Volume in percent, `0..=100`.
  pub fn volume(&self) -> i64 {
    self.prop("volume").as_i64().clamp(0, 100)
  }

  /// Set the volume, clamped to `0..=100`.
  pub fn set_volume(&self, volume: i64) {
    if volume == self.volume() {
      return;
    }
    self.bridge.set("volume", volume.clamp(0, 100));
  }

  /// Whether audio output is muted.
  pub fn mute(&self) -> bool {
    self.prop("mute").as_bool()
  }

  pub fn set_mute(&self, mute: bool) {
    if mute == self.mute() {
      return;
    }
    self.bridge.set("mute", mute);
  }

  /// Decoder actually in use; the `hwdec` option itself reads back empty.
  pub fn hwdec(&self) -> String {
    self.prop("hwdec-current").as_string()
  }

  /// Select a hardware decoding mode. Empty values are ignored.
  pub fn set_hwdec(&self, hwdec: &str) {
    if hwdec.is_empty() || hwdec == self.hwdec() {
      return;
    }
    self.bridge.set("hwdec", hwdec);
  }

  /// Selected video track id; 0 while stopped.
  pub fn vid(&self) -> i64 {
    self.stopped_or_i64("vid")
  }

  /// Select a video track. Negative ids are clamped to 0.
  pub fn set_vid(&self, vid: i64) {
    self.set_track("vid", vid, self.vid());
  }

  /// Selected audio track id; 0 while stopped.
  pub fn aid(&self) -> i64 {
    self.stopped_or_i64("aid")
  }

  /// Select an audio track. Negative ids are clamped to 0.
  pub fn set_aid(&self, aid: i64) {
    self.set_track("aid", aid, self.aid());
  }

  /// Selected subtitle track id; 0 while stopped.
  pub fn sid(&self) -> i64 {
    self.stopped_or_i64("sid")
  }

  /// Select a subtitle track. Negative ids are clamped to 0.
  pub fn set_sid(&self, sid: i64) {
    self.set_track("sid", sid, self.sid());
  }

  fn stopped_or_i64(&self, name: &str) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop(name).as_i64()
  }

  fn set_track(&self, name: &str, id: i64, current: i64) {
    if self.is_stopped() || id == current {
      return;
    }
    self.bridge.set(name, id.max(0));
  }

  /// Rotation of the displayed video in degrees, `0..=359`.
  pub fn video_rotate(&self) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop("video-out-params/rotate").as_i64().rem_euclid(360)
  }

  /// Rotate the video; degrees wrap into `0..=359`.
  pub fn set_video_rotate(&self, degrees: i64) {
    if self.is_stopped() || degrees == self.video_rotate() {
      return;
    }
    self.bridge.set("video-rotate", degrees.rem_euclid(360));
  }

  /// Display aspect ratio of the video.
  pub fn video_aspect(&self) -> f64 {
    if self.is_stopped() {
      return DEFAULT_ASPECT;
    }
    self.prop("video-out-params/aspect").as_f64().max(0.0)
  }

  /// Override the aspect ratio. Ignored while stopped.
  pub fn set_video_aspect(&self, aspect: f64) {
    if self.is_stopped() || aspect == self.video_aspect() {
      return;
    }
    self.bridge.set("video-aspect", aspect.max(0.0));
  }

  /// Playback speed multiplier.
  pub fn speed(&self) -> f64 {
    self.prop("speed").as_f64().max(0.0)
  }

  /// Set the playback speed. Ignored while stopped.
  pub fn set_speed(&self, speed: f64) {
    if self.is_stopped() || speed == self.speed() {
      return;
    }
    self.bridge.set("speed", speed.max(0.0));
  }

  /// Whether deinterlacing is on.
  pub fn deinterlace(&self) -> bool {
    self.prop("deinterlace").as_bool()
  }

  pub fn set_deinterlace(&self, deinterlace: bool) {
    self.set_flag("deinterlace", deinterlace, self.deinterlace());
  }

  /// Whether the audio output requests exclusive device access.
  pub fn audio_exclusive(&self) -> bool {
    self.prop("audio-exclusive").as_bool()
  }

  pub fn set_audio_exclusive(&self, exclusive: bool) {
    self.set_flag("audio-exclusive", exclusive, self.audio_exclusive());
  }

  /// External audio file auto-loading mode.
  pub fn audio_file_auto(&self) -> String {
    self.prop("audio-file-auto").as_string()
  }

  pub fn set_audio_file_auto(&self, mode: &str) {
    self.set_text("audio-file-auto", mode, &self.audio_file_auto());
  }

  /// External subtitle auto-loading mode.
  pub fn sub_auto(&self) -> String {
    self.prop("sub-auto").as_string()
  }

  pub fn set_sub_auto(&self, mode: &str) {
    self.set_text("sub-auto", mode, &self.sub_auto());
  }

  /// Subtitle code page without the engine's `+` force marker.
  pub fn sub_codepage(&self) -> String {
    let code_page = self.prop("sub-codepage").as_string();
    match code_page.strip_prefix('+') {
      Some(stripped) => stripped.to_string(),
      None => code_page,
    }
  }

  /// `cp*` code pages are forced with a `+` prefix.
  pub fn set_sub_codepage(&self, code_page: &str) {
    if code_page.is_empty() || code_page == self.sub_codepage() {
      return;
    }
    let value = if code_page.starts_with("cp") {
      format!("+{}", code_page)
    } else {
      code_page.to_string()
    };
    self.bridge.set("sub-codepage", value);
  }

  /// Video output driver list.
  pub fn vo(&self) -> String {
    self.prop("vo").as_string()
  }

  pub fn set_vo(&self, vo: &str) {
    self.set_text("vo", vo, &self.vo());
  }

  /// Audio output driver list.
  pub fn ao(&self) -> String {
    self.prop("ao").as_string()
  }

  pub fn set_ao(&self, ao: &str) {
    self.set_text("ao", ao, &self.ao());
  }

  /// Image format of screenshots, e.g. `png` or `jpg`.
  pub fn screenshot_format(&self) -> String {
    self.prop("screenshot-format").as_string()
  }

  pub fn set_screenshot_format(&self, format: &str) {
    self.set_text("screenshot-format", format, &self.screenshot_format());
  }

  /// PNG compression level, `0..=9`.
  pub fn screenshot_png_compression(&self) -> i64 {
    self.prop("screenshot-png-compression").as_i64().clamp(0, 9)
  }

  /// Set the PNG compression level, clamped to `0..=9`.
  pub fn set_screenshot_png_compression(&self, level: i64) {
    if level == self.screenshot_png_compression() {
      return;
    }
    self.bridge.set("screenshot-png-compression", level.clamp(0, 9));
  }

  /// JPEG quality, `0..=100`.
  pub fn screenshot_jpeg_quality(&self) -> i64 {
    self.prop("screenshot-jpeg-quality").as_i64().clamp(0, 100)
  }

  /// Set the JPEG quality, clamped to `0..=100`.
  pub fn set_screenshot_jpeg_quality(&self, quality: i64) {
    if quality == self.screenshot_jpeg_quality() {
      return;
    }
    self.bridge.set("screenshot-jpeg-quality", quality.clamp(0, 100));
  }

  /// Whether screenshots carry colorspace tags.
  pub fn screenshot_tag_colorspace(&self) -> bool {
    self.prop("screenshot-tag-colorspace").as_bool()
  }

  pub fn set_screenshot_tag_colorspace(&self, tag: bool) {
    self.set_flag("screenshot-tag-colorspace", tag, self.screenshot_tag_colorspace());
  }

  /// File name template for screenshots.
  pub fn screenshot_template(&self) -> String {
    self.prop("screenshot-template").as_string()
  }

  pub fn set_screenshot_template(&self, template: &str) {
    self.set_text("screenshot-template", template, &self.screenshot_template());
  }

  /// Directory screenshots are saved to.
  pub fn screenshot_directory(&self) -> String {
    self.prop("screenshot-directory").as_string()
  }

  pub fn set_screenshot_directory(&self, dir: &str) {
    self.set_text("screenshot-directory", dir, &self.screenshot_directory());
  }

  /// Profile option of the engine.
  pub fn profile(&self) -> String {
    self.prop("profile").as_string()
  }

  /// Profiles are applied with a command; the `profile` option is read-only
  /// at runtime.
  pub fn set_profile(&self, profile: &str) {
    if profile.is_empty() || profile == self.profile() {
      return;
    }
    self.bridge.command(Command::apply_profile(profile));
  }

  /// Whether seeks are precise rather than keyframe based.
  pub fn hr_seek(&self) -> bool {
    self.prop("hr-seek").as_bool()
  }

  pub fn set_hr_seek(&self, hr_seek: bool) {
    if hr_seek == self.hr_seek() {
      return;
    }
    self.bridge.set("hr-seek", if hr_seek { "yes" } else { "no" });
  }

  /// Whether URLs are resolved through youtube-dl.
  pub fn ytdl(&self) -> bool {
    self.prop("ytdl").as_bool()
  }

  pub fn set_ytdl(&self, ytdl: bool) {
    self.set_flag("ytdl", ytdl, self.ytdl());
  }

  /// Whether the engine loads user scripts.
  pub fn load_scripts(&self) -> bool {
    self.prop("load-scripts").as_bool()
  }

  pub fn set_load_scripts(&self, load_scripts: bool) {
    self.set_flag("load-scripts", load_scripts, self.load_scripts());
  }

  /// Position in percent of the file, `0..=100`.
  pub fn percent_pos(&self) -> i64 {
    if self.is_stopped() {
      return 0;
    }
    self.prop("percent-pos").as_i64().clamp(0, 100)
  }

  /// Seek to a percentage, clamped to `0..=100`.
  pub fn set_percent_pos(&self, percent: i64) {
    if self.is_stopped() || percent == self.percent_pos() {
      return;
    }
    self.bridge.set("percent-pos", percent.clamp(0, 100));
  }

  fn set_flag(&self, name: &str, value: bool, current: bool) {
    if value == current {
      return;
    }
    self.bridge.set(name, value);
  }

  fn set_text(&self, name: &str, value: &str, current: &str) {
    if value.is_empty() || value == current {
      return;
    }
    self.bridge.set(name, value);
  }

  // ---------------------------------------------------------------------------
  // Owned-state setters
  // ---------------------------------------------------------------------------

  /// Load `source`, replacing the current file. Does nothing if it is
  /// already the current source.
  pub fn set_source(&mut self, source: MediaSource) {
    if self.current_source.as_ref() == Some(&source) {
      return;
    }
    if self.bridge.command(Command::loadfile(&source.locator())) {
      log::info!("Source changed: {}", source);
      self.current_source = Some(source);
      self.send(Signal::SourceChanged);
    }
  }

  /// Move to `state` through `play`, `pause` or `stop`. Ignored while stopped.
  pub fn set_playback_state(&mut self, state: PlaybackState) {
    if self.is_stopped() || self.playback_state() == state {
      return;
    }
    let result = match state {
      PlaybackState::Stopped => self.stop(),
      PlaybackState::Paused => self.pause(),
      PlaybackState::Playing => self.play(),
    };
    if result {
      self.send(Signal::PlaybackStateChanged);
    }
  }

  /// Route engine log output through the `log` facade at `level`.
  pub fn set_log_level(&self, level: LogLevel) {
    if level == self.log_level() {
      return;
    }
    let name = level.engine_name();
    let terminal = self.bridge.set("terminal", level != LogLevel::Off);
    let msg_level = self.bridge.set("msg-level", format!("all={}", name));
    let messages = self.bridge.request_log_messages(name);
    if terminal && msg_level && messages {
      self.send(Signal::LogLevelChanged);
    } else {
      log::warn!("Failed to set log level to {:?}", level);
    }
  }

  /// Switch between synchronous and asynchronous engine calls.
  pub fn set_mpv_call_type(&mut self, mode: CallMode) {
    if self.bridge.call_mode() == mode {
      return;
    }
    self.bridge.set_call_mode(mode);
    self.send(Signal::MpvCallTypeChanged);
  }

  // ---------------------------------------------------------------------------
  // Actions
  // ---------------------------------------------------------------------------

  /// Open `url` and make sure it plays. `false` only for an unusable locator.
  pub fn open(&mut self, url: &str) -> bool {
    let Some(source) = MediaSource::parse(url) else {
      return false;
    };
    if self.current_source.as_ref() != Some(&source) {
      self.set_source(source);
    }
    if !self.is_playing() {
      self.play();
    }
    true
  }

  /// Resume a paused file.
  pub fn play(&self) -> bool {
    if !self.is_paused() || self.current_source.is_none() {
      return false;
    }
    let result = self.bridge.set("pause", false);
    if result {
      self.send(Signal::Playing);
    }
    result
  }

  /// Resume `url` if it is the paused current source, otherwise open it.
  pub fn play_url(&mut self, url: &str) -> bool {
    let Some(source) = MediaSource::parse(url) else {
      return false;
    };
    if self.current_source.as_ref() == Some(&source) && !self.is_playing() {
      self.play()
    } else {
      self.open(url)
    }
  }

  /// Pause playback. `false` unless something was playing.
  pub fn pause(&self) -> bool {
    if !self.is_playing() {
      return false;
    }
    let result = self.bridge.set("pause", true);
    if result {
      self.send(Signal::Paused);
    }
    result
  }

  /// Stop playback and forget the current source.
  pub fn stop(&mut self) -> bool {
    if self.is_stopped() {
      return false;
    }
    let result = self.bridge.command(Command::stop());
    if result {
      self.send(Signal::Stopped);
    }
    self.current_source = None;
    result
  }

  /// Seek with the target clamped to the valid range of the mode: `[0, 100]`
  /// for percent, `[0, duration]` for absolute, and
  /// `[-position, duration - position]` for relative seeks.
  pub fn seek(&self, value: i64, absolute: bool, percent: bool) -> bool {
    if self.is_stopped() {
      return false;
    }
    let position = self.position();
    let duration = self.duration();
    let (mode, min, max) = if percent {
      (SeekMode::AbsolutePercent, 0, 100)
    } else if absolute {
      (SeekMode::Absolute, 0, duration)
    } else {
      (SeekMode::Relative, -position, duration - position)
    };
    self.bridge.command(Command::seek(value.max(min).min(max), mode))
  }

  /// Seek to `position` seconds.
  pub fn seek_absolute(&self, position: i64) -> bool {
    if self.is_stopped() || position == self.position() {
      return false;
    }
    self.seek(position.max(0).min(self.duration()), true, false)
  }

  /// Seek by `offset` seconds from the current position.
  pub fn seek_relative(&self, offset: i64) -> bool {
    if self.is_stopped() || offset == 0 {
      return false;
    }
    let position = self.position();
    self.seek(offset.max(-position).min(self.duration() - position), false, false)
  }

  /// Seek to `percent` of the file.
  pub fn seek_percent(&self, percent: i64) -> bool {
    if self.is_stopped() || percent == self.percent_pos() {
      return false;
    }
    self.seek(percent.clamp(0, 100), true, true)
  }

  /// Save a screenshot, subtitles included, to the screenshot directory.
  pub fn screenshot(&self) -> bool {
    if self.is_stopped() {
      return false;
    }
    self.bridge.command(Command::screenshot())
  }

  /// Save a screenshot, subtitles included, to `path`.
  pub fn screenshot_to_file(&self, path: &str) -> bool {
    if self.is_stopped() || path.is_empty() {
      return false;
    }
    self.bridge.command(Command::screenshot_to_file(path))
  }
}

impl EventSink for MpvPlayer {
  fn set_media_status(&mut self, status: MediaStatus) {
    if self.media_status == status {
      return;
    }
    self.media_status = status;
    self.send(Signal::MediaStatusChanged);
  }

  fn emit(&mut self, signal: Signal) {
    self.send(signal);
  }

  fn playback_state_changed(&mut self) {
    let signal = match self.playback_state() {
      PlaybackState::Playing => Signal::Playing,
      PlaybackState::Paused => Signal::Paused,
      PlaybackState::Stopped => Signal::Stopped,
    };
    self.send(signal);
    self.send(Signal::PlaybackStateChanged);
  }

  fn complete_reply(&mut self, reply: u64, outcome: std::result::Result<String, String>) {
    self.bridge.complete(reply, &outcome);
  }
}
