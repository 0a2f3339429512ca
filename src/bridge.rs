//! Typed get/set/observe/command access to engine properties.
//!
//! Every outgoing call goes through here so that argument validation, call
//! mode and failure logging are applied in one place.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::engine::{next_reply_id, Command, Event, GlInit, Node, RenderContext, EngineError};
use crate::handle::EngineHandle;

/// Whether outgoing engine calls wait for the engine or return immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallMode {
  #[default]
  Synchronous,
  Asynchronous,
}

/// An asynchronous call waiting for its reply event.
#[derive(Debug, Clone)]
struct PendingCall {
  description: String,
}

pub struct PropertyBridge {
  handle: EngineHandle,
  mode: CallMode,
  pending: Mutex<HashMap<u64, PendingCall>>,
}

impl PropertyBridge {
  pub fn new(handle: EngineHandle) -> Self {
    Self {
      handle,
      mode: CallMode::default(),
      pending: Mutex::new(HashMap::new()),
    }
  }

  pub fn call_mode(&self) -> CallMode {
    self.mode
  }

  pub fn set_call_mode(&mut self, mode: CallMode) {
    self.mode = mode;
  }

  pub(crate) fn handle(&self) -> &EngineHandle {
    &self.handle
  }

  /// Read a property. Unknown or unavailable properties yield `None`.
  pub fn get(&self, name: &str) -> Option<Node> {
    if name.is_empty() {
      return None;
    }
    match self.handle.get_property(name) {
      Ok(Node::None) => {
        log::warn!("Failed to query property {}: no value", name);
        None
      }
      Ok(value) => Some(value),
      Err(e) => {
        log::warn!("Failed to query property {}: {}", name, e);
        None
      }
    }
  }

  /// Read a property, falling back to `Node::None` for the typed accessors.
  pub fn get_or_none(&self, name: &str) -> Node {
    self.get(name).unwrap_or_default()
  }

  /// Request a property value through the event queue. The value arrives as a
  /// reply event that is logged and dropped; callers only learn whether the
  /// request was dispatched.
  pub fn get_async(&self, name: &str) -> bool {
    if name.is_empty() {
      return false;
    }
    let reply = next_reply_id();
    self.track(reply, format!("get {}", name));
    let result = self.handle.get_property_async(reply, name);
    self.finish_dispatch(reply, result, || format!("query property {}", name))
  }

  /// Write a property. Empty names and `Node::None` are rejected without
  /// reaching the engine.
  pub fn set(&self, name: &str, value: impl Into<Node>) -> bool {
    let value = value.into();
    if name.is_empty() || value.is_none() {
      return false;
    }
    log::debug!("Setting property {} to {:?}", name, value);
    match self.mode {
      CallMode::Synchronous => match self.handle.set_property(name, &value) {
        Ok(()) => true,
        Err(e) => {
          log::warn!("Failed to set property {}: {}", name, e);
          false
        }
      },
      CallMode::Asynchronous => {
        let reply = next_reply_id();
        self.track(reply, format!("set {}", name));
        let result = self.handle.set_property_async(reply, name, &value);
        self.finish_dispatch(reply, result, || format!("set property {}", name))
      }
    }
  }

  /// Run a command.
  pub fn command(&self, command: Command) -> bool {
    if command.is_empty() {
      return false;
    }
    log::debug!("Sending command: {}", command);
    let args = command.to_node();
    match self.mode {
      CallMode::Synchronous => match self.handle.command(&args) {
        Ok(_) => true,
        Err(e) => {
          log::warn!("Failed to execute command {}: {}", command, e);
          false
        }
      },
      CallMode::Asynchronous => {
        let reply = next_reply_id();
        self.track(reply, format!("command {}", command));
        let result = self.handle.command_async(reply, &args);
        self.finish_dispatch(reply, result, || format!("execute command {}", command))
      }
    }
  }

  /// Subscribe to change notifications for a property.
  pub fn observe(&self, name: &str) -> bool {
    if name.is_empty() {
      return false;
    }
    log::debug!("Observing property {}", name);
    match self.handle.observe_property(0, name) {
      Ok(()) => true,
      Err(e) => {
        log::warn!("Failed to observe property {}: {}", name, e);
        false
      }
    }
  }

  pub fn request_log_messages(&self, min_level: &str) -> bool {
    match self.handle.request_log_messages(min_level) {
      Ok(()) => true,
      Err(e) => {
        log::warn!("Failed to request log messages at {}: {}", min_level, e);
        false
      }
    }
  }

  pub fn wait_event(&self, timeout: Duration) -> Option<Event> {
    self.handle.wait_event(timeout)
  }

  pub fn create_render_context(&self, init: GlInit<'_>) -> Result<Box<dyn RenderContext>, EngineError> {
    self.handle.create_render_context(init)
  }

  /// Settle an asynchronous call from its reply event. The outcome is logged
  /// and discarded.
  pub fn complete<T: fmt::Debug, E: fmt::Display>(&self, reply: u64, result: &Result<T, E>) {
    let pending = self.pending.lock().remove(&reply);
    let description = match pending {
      Some(call) => call.description,
      None => {
        log::debug!("Reply {} does not belong to a pending call", reply);
        return;
      }
    };
    match result {
      Ok(value) => log::debug!("Async {} finished: {:?}", description, value),
      Err(e) => log::warn!("Async {} failed: {}", description, e),
    }
  }

  /// Number of asynchronous calls still waiting for a reply.
  pub fn pending_calls(&self) -> usize {
    self.pending.lock().len()
  }

  fn track(&self, reply: u64, description: String) {
    self.pending.lock().insert(reply, PendingCall { description });
  }

  fn finish_dispatch(
    &self,
    reply: u64,
    result: Result<(), EngineError>,
    what: impl FnOnce() -> String,
  ) -> bool {
    match result {
      Ok(()) => true,
      Err(e) => {
        self.pending.lock().remove(&reply);
        log::warn!("Failed to {}: {}", what(), e);
        false
      }
    }
  }
}
