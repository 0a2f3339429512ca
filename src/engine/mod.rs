//! Engine seam - everything this crate asks of libmpv.
//!
//! Architecture:
//! - `node.rs` - tagged value model and default-on-mismatch decoding
//! - `event.rs` - event queue entries
//! - `command.rs` - command argument lists and async reply ids
//! - `libmpv.rs` - the real backend over the libmpv C API (feature `libmpv`)
//!
//! The player never touches a raw `mpv_handle`; it talks to `dyn Engine`.

use std::ffi::c_void;
use std::time::Duration;

use thiserror::Error;

mod command;
mod event;
#[cfg(test)]
pub(crate) mod fake;
#[cfg(feature = "libmpv")]
pub mod libmpv;
mod node;

pub use command::{next_reply_id, Command, SeekMode};
pub use event::{EndFileReason, EngineLogLevel, Event, LogMessage};
pub use node::Node;

/// A negative libmpv status code together with its description.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({code})")]
pub struct EngineError {
  pub code: i32,
  pub message: String,
}

impl EngineError {
  pub fn new(code: i32, message: impl Into<String>) -> Self {
    Self {
      code,
      message: message.into(),
    }
  }
}

/// Callback the engine may invoke from any of its threads, including
/// reentrantly from inside an API call.
pub type WakeupCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Parameters for binding a render context to the host's GL context.
///
/// The resolver is only consulted while the context is being created.
pub struct GlInit<'a> {
  pub get_proc_address: &'a dyn Fn(&str) -> *mut c_void,
  /// `Display*` of an X11 host, when there is one.
  pub x11_display: Option<*mut c_void>,
}

/// Framebuffer description passed to the engine on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
  /// GL framebuffer object name; 0 is the default framebuffer.
  pub fbo: i32,
  pub width: i32,
  pub height: i32,
  pub flip_y: bool,
}

/// The engine-side GPU rendering session. Dropping it frees the context.
pub trait RenderContext {
  fn set_update_callback(&mut self, callback: WakeupCallback);
  fn render(&mut self, target: &RenderTarget) -> Result<(), EngineError>;
}

/// Client API of a playback engine.
pub trait Engine {
  /// Set an option before `initialize`.
  fn set_option(&self, name: &str, value: &str) -> Result<(), EngineError>;
  fn initialize(&self) -> Result<(), EngineError>;

  fn get_property(&self, name: &str) -> Result<Node, EngineError>;
  fn get_property_async(&self, reply: u64, name: &str) -> Result<(), EngineError>;
  fn set_property(&self, name: &str, value: &Node) -> Result<(), EngineError>;
  fn set_property_async(&self, reply: u64, name: &str, value: &Node) -> Result<(), EngineError>;
  fn command(&self, args: &Node) -> Result<Node, EngineError>;
  fn command_async(&self, reply: u64, args: &Node) -> Result<(), EngineError>;
  fn observe_property(&self, reply: u64, name: &str) -> Result<(), EngineError>;
  fn request_log_messages(&self, min_level: &str) -> Result<(), EngineError>;

  fn set_wakeup_callback(&mut self, callback: WakeupCallback);
  /// Next queued event, waiting at most `timeout`. `None` when the queue is empty.
  fn wait_event(&self, timeout: Duration) -> Option<Event>;

  fn create_render_context(&self, init: GlInit<'_>) -> Result<Box<dyn RenderContext>, EngineError>;

  /// Tear the engine down. Called once by the owning handle.
  fn terminate(&mut self);
}
