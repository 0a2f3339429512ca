//! In-process engine for unit tests.
//!
//! Keeps a property store, records every mutating call and queues the events a
//! real engine would emit for the commands the player issues.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{
  EndFileReason, Engine, EngineError, Event, GlInit, Node, RenderContext, RenderTarget,
  WakeupCallback,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  SetOption(String, String),
  Initialize,
  GetAsync(u64, String),
  Set(String, Node),
  SetAsync(u64, String, Node),
  Command(Node),
  CommandAsync(u64, Node),
  Observe(String),
  RequestLogMessages(String),
  CreateRenderContext,
  Render(RenderTarget),
  Terminate,
}

#[derive(Default)]
pub struct FakeState {
  pub props: HashMap<String, Node>,
  pub calls: Vec<Call>,
  pub events: VecDeque<Event>,
  pub failing: HashSet<String>,
  pub fail_render_context: bool,
  pub fail_initialize: bool,
  pub wakeup: Option<WakeupCallback>,
  pub render_update: Option<WakeupCallback>,
}

impl FakeState {
  /// Queue an event and ring the wakeup callback like the engine does.
  pub fn push_event(&mut self, event: Event) {
    self.events.push_back(event);
    if let Some(wakeup) = &self.wakeup {
      wakeup();
    }
  }

  pub fn set_prop(&mut self, name: &str, value: impl Into<Node>) {
    self.props.insert(name.to_string(), value.into());
  }

  pub fn clear_calls(&mut self) {
    self.calls.clear();
  }

  pub fn set_calls(&self) -> Vec<(String, Node)> {
    self
      .calls
      .iter()
      .filter_map(|call| match call {
        Call::Set(name, value) | Call::SetAsync(_, name, value) => Some((name.clone(), value.clone())),
        _ => None,
      })
      .collect()
  }

  pub fn commands(&self) -> Vec<String> {
    self
      .calls
      .iter()
      .filter_map(|call| match call {
        Call::Command(args) | Call::CommandAsync(_, args) => {
          let parts: Vec<String> = args.as_array().iter().map(Node::as_string).collect();
          Some(parts.join(" "))
        }
        _ => None,
      })
      .collect()
  }

  fn run_command(&mut self, args: &Node) {
    let items = args.as_array();
    let name = items.first().map(Node::as_string).unwrap_or_default();
    match name.as_str() {
      "loadfile" => {
        let location = items.get(1).map(Node::as_string).unwrap_or_default();
        let file_name = location.rsplit('/').next().unwrap_or_default().to_string();
        self.set_prop("idle-active", false);
        self.set_prop("path", location.as_str());
        self.set_prop("filename", file_name.as_str());
        self.set_prop("media-title", file_name.as_str());
        self.push_event(Event::StartFile);
        self.push_event(Event::FileLoaded);
      }
      "stop" => {
        self.set_prop("idle-active", true);
        self.props.remove("path");
        self.props.remove("filename");
        self.push_event(Event::EndFile(EndFileReason::Stop));
        self.push_event(Event::Idle);
      }
      _ => {}
    }
  }
}

pub struct FakeEngine {
  state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
  /// An idle engine with mpv's usual defaults for the properties the player reads.
  pub fn new() -> Self {
    let mut state = FakeState::default();
    state.set_prop("idle-active", true);
    state.set_prop("pause", false);
    state.set_prop("volume", 100.0);
    state.set_prop("mute", false);
    state.set_prop("speed", 1.0);
    state.set_prop("hwdec-current", "no");
    state.set_prop("msg-level", "");
    state.set_prop("mpv-version", "mpv 0.38.0");
    Self {
      state: Arc::new(Mutex::new(state)),
    }
  }

  pub fn state(&self) -> Arc<Mutex<FakeState>> {
    self.state.clone()
  }

  fn check(&self, name: &str) -> Result<(), EngineError> {
    if self.state.lock().failing.contains(name) {
      return Err(EngineError::new(-7, "property format not supported"));
    }
    Ok(())
  }
}

impl Engine for FakeEngine {
  fn set_option(&self, name: &str, value: &str) -> Result<(), EngineError> {
    self.check(name)?;
    let mut state = self.state.lock();
    state.calls.push(Call::SetOption(name.to_string(), value.to_string()));
    state.set_prop(name, value);
    Ok(())
  }

  fn initialize(&self) -> Result<(), EngineError> {
    let mut state = self.state.lock();
    state.calls.push(Call::Initialize);
    if state.fail_initialize {
      return Err(EngineError::new(-1, "error running playback loop"));
    }
    Ok(())
  }

  fn get_property(&self, name: &str) -> Result<Node, EngineError> {
    self
      .state
      .lock()
      .props
      .get(name)
      .cloned()
      .ok_or_else(|| EngineError::new(-8, "property not found"))
  }

  fn get_property_async(&self, reply: u64, name: &str) -> Result<(), EngineError> {
    let mut state = self.state.lock();
    state.calls.push(Call::GetAsync(reply, name.to_string()));
    let result = state
      .props
      .get(name)
      .cloned()
      .ok_or_else(|| EngineError::new(-8, "property not found"));
    state.push_event(Event::GetPropertyReply {
      reply,
      name: name.to_string(),
      result,
    });
    Ok(())
  }

  fn set_property(&self, name: &str, value: &Node) -> Result<(), EngineError> {
    self.check(name)?;
    let mut state = self.state.lock();
    state.calls.push(Call::Set(name.to_string(), value.clone()));
    state.props.insert(name.to_string(), value.clone());
    Ok(())
  }

  fn set_property_async(&self, reply: u64, name: &str, value: &Node) -> Result<(), EngineError> {
    let result = self.check(name);
    let mut state = self.state.lock();
    state.calls.push(Call::SetAsync(reply, name.to_string(), value.clone()));
    if result.is_ok() {
      state.props.insert(name.to_string(), value.clone());
    }
    state.push_event(Event::SetPropertyReply { reply, result });
    Ok(())
  }

  fn command(&self, args: &Node) -> Result<Node, EngineError> {
    let mut state = self.state.lock();
    state.calls.push(Call::Command(args.clone()));
    state.run_command(args);
    Ok(Node::None)
  }

  fn command_async(&self, reply: u64, args: &Node) -> Result<(), EngineError> {
    let mut state = self.state.lock();
    state.calls.push(Call::CommandAsync(reply, args.clone()));
    state.run_command(args);
    state.push_event(Event::CommandReply {
      reply,
      result: Ok(Node::None),
    });
    Ok(())
  }

  fn observe_property(&self, _reply: u64, name: &str) -> Result<(), EngineError> {
    self.state.lock().calls.push(Call::Observe(name.to_string()));
    Ok(())
  }

  fn request_log_messages(&self, min_level: &str) -> Result<(), EngineError> {
    self
      .state
      .lock()
      .calls
      .push(Call::RequestLogMessages(min_level.to_string()));
    Ok(())
  }

  fn set_wakeup_callback(&mut self, callback: WakeupCallback) {
    self.state.lock().wakeup = Some(callback);
  }

  fn wait_event(&self, _timeout: Duration) -> Option<Event> {
    self.state.lock().events.pop_front()
  }

  fn create_render_context(&self, init: GlInit<'_>) -> Result<Box<dyn RenderContext>, EngineError> {
    // Exercise the resolver the way the engine does during creation.
    let _ = (init.get_proc_address)("glGetString");
    let mut state = self.state.lock();
    state.calls.push(Call::CreateRenderContext);
    if state.fail_render_context {
      return Err(EngineError::new(-18, "unsupported"));
    }
    Ok(Box::new(FakeRenderContext {
      state: self.state.clone(),
    }))
  }

  fn terminate(&mut self) {
    self.state.lock().calls.push(Call::Terminate);
  }
}

struct FakeRenderContext {
  state: Arc<Mutex<FakeState>>,
}

impl RenderContext for FakeRenderContext {
  fn set_update_callback(&mut self, callback: WakeupCallback) {
    self.state.lock().render_update = Some(callback);
  }

  fn render(&mut self, target: &RenderTarget) -> Result<(), EngineError> {
    self.state.lock().calls.push(Call::Render(*target));
    Ok(())
  }
}
