//! libmpv playback exposed as observable properties, commands and signals.
//!
//! A host UI owns one [`MpvPlayer`] on its UI thread, reads and writes its
//! properties, listens on [`MpvPlayer::signals`] and feeds the tasks from
//! [`MpvPlayer::tasks`] back into [`MpvPlayer::handle_task`].
//!
//! The real engine lives behind the `libmpv` feature; without it the crate
//! builds against the [`engine::Engine`] trait only.

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod formats;
pub mod handle;
pub mod logging;
pub mod media;
pub mod player;
pub mod properties;
pub mod pump;
pub mod render;
pub mod signal;
pub mod state;

pub use bridge::{CallMode, PropertyBridge};
pub use config::PlayerConfig;
pub use dispatch::{UiTask, UiTasks};
pub use engine::{Engine, EngineError, Node, RenderTarget};
pub use error::{MpvError, Result};
pub use media::MediaSource;
pub use player::MpvPlayer;
pub use render::GlHost;
pub use signal::Signal;
pub use state::{LogLevel, MediaStatus, PlaybackState};

/// Create a player over the system libmpv. A missing or failing engine
/// aborts the process.
#[cfg(feature = "libmpv")]
pub fn create_player(config: &PlayerConfig) -> MpvPlayer {
  match engine::libmpv::LibMpv::new().and_then(|engine| MpvPlayer::new(Box::new(engine), config)) {
    Ok(player) => player,
    Err(e) => logging::fatal("mpv_declarative", &e.to_string()),
  }
}
