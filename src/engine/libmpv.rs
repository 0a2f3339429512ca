//! `Engine` over the libmpv C client API.
//!
//! All values cross the boundary as `MPV_FORMAT_NODE`. Outgoing nodes are
//! built in a `NodeArena` that owns every string and list for the duration of
//! one call; incoming nodes are copied into `Node` and freed right away.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::mem;
use std::ptr::{self, NonNull};
use std::time::Duration;

use libmpv2_sys as sys;

use super::{
  EndFileReason, Engine, EngineError, EngineLogLevel, Event, GlInit, LogMessage, Node,
  RenderContext, RenderTarget, WakeupCallback,
};
use crate::error::{MpvError, Result as MpvResult};

const MPV_ERROR_UNINITIALIZED: c_int = -3;
const MPV_ERROR_INVALID_PARAMETER: c_int = -4;

// Deprecated event ids; not every header version exports them by name.
const MPV_EVENT_IDLE: sys::mpv_event_id = 11;
const MPV_EVENT_TICK: sys::mpv_event_id = 14;

/// One mpv client handle.
pub struct LibMpv {
  ctx: Option<NonNull<sys::mpv_handle>>,
  wakeup: Option<Box<WakeupCallback>>,
}

impl LibMpv {
  /// Create an uninitialized engine. Options may be set until
  /// `Engine::initialize` is called.
  pub fn new() -> MpvResult<Self> {
    let ctx = unsafe { sys::mpv_create() };
    let ctx = NonNull::new(ctx)
      .ok_or_else(|| MpvError::EngineUnavailable("mpv_create returned null".to_string()))?;
    Ok(Self {
      ctx: Some(ctx),
      wakeup: None,
    })
  }

  fn raw(&self) -> Result<*mut sys::mpv_handle, EngineError> {
    self
      .ctx
      .map(NonNull::as_ptr)
      .ok_or_else(|| EngineError::new(MPV_ERROR_UNINITIALIZED, "engine already terminated"))
  }
}

impl Drop for LibMpv {
  fn drop(&mut self) {
    self.terminate();
  }
}

impl Engine for LibMpv {
  fn set_option(&self, name: &str, value: &str) -> Result<(), EngineError> {
    let name = c_string(name)?;
    let value = c_string(value)?;
    check(unsafe { sys::mpv_set_option_string(self.raw()?, name.as_ptr(), value.as_ptr()) })
  }

  fn initialize(&self) -> Result<(), EngineError> {
    check(unsafe { sys::mpv_initialize(self.raw()?) })
  }

  fn get_property(&self, name: &str) -> Result<Node, EngineError> {
    let name = c_string(name)?;
    let mut node: sys::mpv_node = unsafe { mem::zeroed() };
    check(unsafe {
      sys::mpv_get_property(
        self.raw()?,
        name.as_ptr(),
        sys::mpv_format_MPV_FORMAT_NODE,
        &mut node as *mut sys::mpv_node as *mut c_void,
      )
    })?;
    let value = unsafe { node_to_value(&node) };
    unsafe { sys::mpv_free_node_contents(&mut node) };
    Ok(value)
  }

  fn get_property_async(&self, reply: u64, name: &str) -> Result<(), EngineError> {
    let name = c_string(name)?;
    check(unsafe {
      sys::mpv_get_property_async(self.raw()?, reply, name.as_ptr(), sys::mpv_format_MPV_FORMAT_NODE)
    })
  }

  fn set_property(&self, name: &str, value: &Node) -> Result<(), EngineError> {
    let name = c_string(name)?;
    let mut arena = NodeArena::default();
    let mut node = arena.build(value)?;
    check(unsafe {
      sys::mpv_set_property(
        self.raw()?,
        name.as_ptr(),
        sys::mpv_format_MPV_FORMAT_NODE,
        &mut node as *mut sys::mpv_node as *mut c_void,
      )
    })
  }

  fn set_property_async(&self, reply: u64, name: &str, value: &Node) -> Result<(), EngineError> {
    let name = c_string(name)?;
    let mut arena = NodeArena::default();
    let mut node = arena.build(value)?;
    // The engine copies the value before returning.
    check(unsafe {
      sys::mpv_set_property_async(
        self.raw()?,
        reply,
        name.as_ptr(),
        sys::mpv_format_MPV_FORMAT_NODE,
        &mut node as *mut sys::mpv_node as *mut c_void,
      )
    })
  }

  fn command(&self, args: &Node) -> Result<Node, EngineError> {
    let mut arena = NodeArena::default();
    let mut node = arena.build(args)?;
    let mut result: sys::mpv_node = unsafe { mem::zeroed() };
    check(unsafe { sys::mpv_command_node(self.raw()?, &mut node, &mut result) })?;
    let value = unsafe { node_to_value(&result) };
    unsafe { sys::mpv_free_node_contents(&mut result) };
    Ok(value)
  }

  fn command_async(&self, reply: u64, args: &Node) -> Result<(), EngineError> {
    let mut arena = NodeArena::default();
    let mut node = arena.build(args)?;
    check(unsafe { sys::mpv_command_node_async(self.raw()?, reply, &mut node) })
  }

  fn observe_property(&self, reply: u64, name: &str) -> Result<(), EngineError> {
    let name = c_string(name)?;
    check(unsafe {
      sys::mpv_observe_property(self.raw()?, reply, name.as_ptr(), sys::mpv_format_MPV_FORMAT_NODE)
    })
  }

  fn request_log_messages(&self, min_level: &str) -> Result<(), EngineError> {
    let level = c_string(min_level)?;
    check(unsafe { sys::mpv_request_log_messages(self.raw()?, level.as_ptr()) })
  }

  fn set_wakeup_callback(&mut self, callback: WakeupCallback) {
    let Ok(ctx) = self.raw() else {
      return;
    };
    let boxed = Box::new(callback);
    let data = &*boxed as *const WakeupCallback as *mut c_void;
    unsafe { sys::mpv_set_wakeup_callback(ctx, Some(invoke_callback), data) };
    // The previous callback can no longer be called once the new one is set.
    self.wakeup = Some(boxed);
  }

  fn wait_event(&self, timeout: Duration) -> Option<Event> {
    let ctx = self.raw().ok()?;
    let event = unsafe { sys::mpv_wait_event(ctx, timeout.as_secs_f64()) };
    if event.is_null() {
      return None;
    }
    let event = unsafe { &*event };
    if event.event_id == sys::mpv_event_id_MPV_EVENT_NONE {
      return None;
    }
    Some(unsafe { convert_event(event) })
  }

  fn create_render_context(&self, init: GlInit<'_>) -> Result<Box<dyn RenderContext>, EngineError> {
    let ctx = self.raw()?;
    // Only dereferenced by `resolve_proc_address` while the context is created.
    let resolver: &dyn Fn(&str) -> *mut c_void = init.get_proc_address;
    let mut gl_params = sys::mpv_opengl_init_params {
      get_proc_address: Some(resolve_proc_address),
      get_proc_address_ctx: &resolver as *const &dyn Fn(&str) -> *mut c_void as *mut c_void,
    };
    let mut params = vec![
      sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_API_TYPE,
        data: c"opengl".as_ptr() as *mut c_void,
      },
      sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_INIT_PARAMS,
        data: &mut gl_params as *mut sys::mpv_opengl_init_params as *mut c_void,
      },
    ];
    if let Some(display) = init.x11_display {
      params.push(sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_X11_DISPLAY,
        data: display,
      });
    }
    params.push(sys::mpv_render_param {
      type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
      data: ptr::null_mut(),
    });

    let mut render: *mut sys::mpv_render_context = ptr::null_mut();
    check(unsafe { sys::mpv_render_context_create(&mut render, ctx, params.as_mut_ptr()) })?;
    let render = NonNull::new(render)
      .ok_or_else(|| EngineError::new(MPV_ERROR_INVALID_PARAMETER, "render context is null"))?;
    Ok(Box::new(LibMpvRenderContext {
      ctx: render,
      update: None,
    }))
  }

  fn terminate(&mut self) {
    if let Some(ctx) = self.ctx.take() {
      unsafe {
        sys::mpv_set_wakeup_callback(ctx.as_ptr(), None, ptr::null_mut());
        sys::mpv_terminate_destroy(ctx.as_ptr());
      }
      self.wakeup = None;
    }
  }
}

/// Render session bound to the host GL context.
struct LibMpvRenderContext {
  ctx: NonNull<sys::mpv_render_context>,
  update: Option<Box<WakeupCallback>>,
}

impl RenderContext for LibMpvRenderContext {
  fn set_update_callback(&mut self, callback: WakeupCallback) {
    let boxed = Box::new(callback);
    let data = &*boxed as *const WakeupCallback as *mut c_void;
    unsafe { sys::mpv_render_context_set_update_callback(self.ctx.as_ptr(), Some(invoke_callback), data) };
    self.update = Some(boxed);
  }

  fn render(&mut self, target: &RenderTarget) -> Result<(), EngineError> {
    let mut fbo = sys::mpv_opengl_fbo {
      fbo: target.fbo,
      w: target.width,
      h: target.height,
      internal_format: 0,
    };
    let mut flip_y: c_int = c_int::from(target.flip_y);
    let mut params = [
      sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_FBO,
        data: &mut fbo as *mut sys::mpv_opengl_fbo as *mut c_void,
      },
      sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_FLIP_Y,
        data: &mut flip_y as *mut c_int as *mut c_void,
      },
      sys::mpv_render_param {
        type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
        data: ptr::null_mut(),
      },
    ];
    check(unsafe { sys::mpv_render_context_render(self.ctx.as_ptr(), params.as_mut_ptr()) })
  }
}

impl Drop for LibMpvRenderContext {
  fn drop(&mut self) {
    unsafe {
      sys::mpv_render_context_set_update_callback(self.ctx.as_ptr(), None, ptr::null_mut());
      sys::mpv_render_context_free(self.ctx.as_ptr());
    }
    self.update = None;
  }
}

unsafe extern "C" fn invoke_callback(data: *mut c_void) {
  if data.is_null() {
    return;
  }
  let callback = &*(data as *const WakeupCallback);
  callback();
}

unsafe extern "C" fn resolve_proc_address(ctx: *mut c_void, name: *const c_char) -> *mut c_void {
  if ctx.is_null() || name.is_null() {
    return ptr::null_mut();
  }
  let resolver = &*(ctx as *const &dyn Fn(&str) -> *mut c_void);
  match CStr::from_ptr(name).to_str() {
    Ok(name) => resolver(name),
    Err(_) => ptr::null_mut(),
  }
}

fn c_string(value: &str) -> Result<CString, EngineError> {
  CString::new(value)
    .map_err(|_| EngineError::new(MPV_ERROR_INVALID_PARAMETER, "string contains a NUL byte"))
}

fn check(code: c_int) -> Result<(), EngineError> {
  if code >= 0 {
    Ok(())
  } else {
    Err(error_from_code(code))
  }
}

fn error_from_code(code: c_int) -> EngineError {
  let message = unsafe { lossy(sys::mpv_error_string(code)) };
  EngineError::new(code, message)
}

unsafe fn lossy(text: *const c_char) -> String {
  if text.is_null() {
    return String::new();
  }
  CStr::from_ptr(text).to_string_lossy().into_owned()
}

/// Backing storage for an outgoing node tree.
#[derive(Default)]
struct NodeArena {
  strings: Vec<CString>,
  values: Vec<Vec<sys::mpv_node>>,
  keys: Vec<Vec<*mut c_char>>,
  lists: Vec<Box<sys::mpv_node_list>>,
}

impl NodeArena {
  fn build(&mut self, value: &Node) -> Result<sys::mpv_node, EngineError> {
    let mut node: sys::mpv_node = unsafe { mem::zeroed() };
    match value {
      Node::None => node.format = sys::mpv_format_MPV_FORMAT_NONE,
      Node::Flag(flag) => {
        node.format = sys::mpv_format_MPV_FORMAT_FLAG;
        node.u.flag = c_int::from(*flag);
      }
      Node::Int64(n) => {
        node.format = sys::mpv_format_MPV_FORMAT_INT64;
        node.u.int64 = *n;
      }
      Node::Double(d) => {
        node.format = sys::mpv_format_MPV_FORMAT_DOUBLE;
        node.u.double_ = *d;
      }
      Node::String(s) => {
        node.format = sys::mpv_format_MPV_FORMAT_STRING;
        node.u.string = self.string(s)?;
      }
      Node::Array(items) => {
        let values = items
          .iter()
          .map(|item| self.build(item))
          .collect::<Result<Vec<_>, _>>()?;
        node.format = sys::mpv_format_MPV_FORMAT_NODE_ARRAY;
        node.u.list = self.list(values, None);
      }
      Node::Map(map) => {
        let mut values = Vec::with_capacity(map.len());
        let mut keys = Vec::with_capacity(map.len());
        for (key, item) in map {
          keys.push(self.string(key)?);
          values.push(self.build(item)?);
        }
        node.format = sys::mpv_format_MPV_FORMAT_NODE_MAP;
        node.u.list = self.list(values, Some(keys));
      }
    }
    Ok(node)
  }

  fn string(&mut self, value: &str) -> Result<*mut c_char, EngineError> {
    let value = c_string(value)?;
    let ptr = value.as_ptr() as *mut c_char;
    self.strings.push(value);
    Ok(ptr)
  }

  fn list(
    &mut self,
    mut values: Vec<sys::mpv_node>,
    keys: Option<Vec<*mut c_char>>,
  ) -> *mut sys::mpv_node_list {
    let keys_ptr = match keys {
      Some(mut keys) => {
        let ptr = keys.as_mut_ptr();
        self.keys.push(keys);
        ptr
      }
      None => ptr::null_mut(),
    };
    let mut list = Box::new(sys::mpv_node_list {
      num: values.len() as c_int,
      values: values.as_mut_ptr(),
      keys: keys_ptr,
    });
    self.values.push(values);
    let ptr = &mut *list as *mut sys::mpv_node_list;
    self.lists.push(list);
    ptr
  }
}

/// Copy an engine-owned node tree.
unsafe fn node_to_value(node: &sys::mpv_node) -> Node {
  match node.format {
    sys::mpv_format_MPV_FORMAT_STRING | sys::mpv_format_MPV_FORMAT_OSD_STRING => {
      Node::String(lossy(node.u.string))
    }
    sys::mpv_format_MPV_FORMAT_FLAG => Node::Flag(node.u.flag != 0),
    sys::mpv_format_MPV_FORMAT_INT64 => Node::Int64(node.u.int64),
    sys::mpv_format_MPV_FORMAT_DOUBLE => Node::Double(node.u.double_),
    sys::mpv_format_MPV_FORMAT_NODE_ARRAY => {
      let list = node.u.list;
      if list.is_null() {
        return Node::Array(Vec::new());
      }
      let list = &*list;
      let items = (0..list.num.max(0) as usize)
        .map(|i| node_to_value(&*list.values.add(i)))
        .collect();
      Node::Array(items)
    }
    sys::mpv_format_MPV_FORMAT_NODE_MAP => {
      let list = node.u.list;
      if list.is_null() {
        return Node::Map(Default::default());
      }
      let list = &*list;
      let map = (0..list.num.max(0) as usize)
        .map(|i| (lossy(*list.keys.add(i)), node_to_value(&*list.values.add(i))))
        .collect();
      Node::Map(map)
    }
    _ => Node::None,
  }
}

/// Value carried by an `mpv_event_property`.
unsafe fn property_value(property: &sys::mpv_event_property) -> Node {
  if property.format != sys::mpv_format_MPV_FORMAT_NODE || property.data.is_null() {
    return Node::None;
  }
  node_to_value(&*(property.data as *const sys::mpv_node))
}

unsafe fn convert_event(event: &sys::mpv_event) -> Event {
  let data = event.data;
  match event.event_id {
    sys::mpv_event_id_MPV_EVENT_SHUTDOWN => Event::Shutdown,
    sys::mpv_event_id_MPV_EVENT_LOG_MESSAGE if !data.is_null() => {
      let message = &*(data as *const sys::mpv_event_log_message);
      Event::LogMessage(LogMessage {
        prefix: lossy(message.prefix),
        level: EngineLogLevel::from_name(&lossy(message.level)),
        text: lossy(message.text),
      })
    }
    sys::mpv_event_id_MPV_EVENT_GET_PROPERTY_REPLY if !data.is_null() => {
      let property = &*(data as *const sys::mpv_event_property);
      let result = if event.error < 0 {
        Err(error_from_code(event.error))
      } else {
        Ok(property_value(property))
      };
      Event::GetPropertyReply {
        reply: event.reply_userdata,
        name: lossy(property.name),
        result,
      }
    }
    sys::mpv_event_id_MPV_EVENT_SET_PROPERTY_REPLY => Event::SetPropertyReply {
      reply: event.reply_userdata,
      result: check(event.error),
    },
    sys::mpv_event_id_MPV_EVENT_COMMAND_REPLY => {
      let result = if event.error < 0 {
        Err(error_from_code(event.error))
      } else if data.is_null() {
        Ok(Node::None)
      } else {
        Ok(node_to_value(&(*(data as *const sys::mpv_event_command)).result))
      };
      Event::CommandReply {
        reply: event.reply_userdata,
        result,
      }
    }
    sys::mpv_event_id_MPV_EVENT_START_FILE => Event::StartFile,
    sys::mpv_event_id_MPV_EVENT_END_FILE => {
      let reason = if data.is_null() {
        EndFileReason::Unknown
      } else {
        let end = &*(data as *const sys::mpv_event_end_file);
        // The field is an enum in some header versions and an int in others.
        match end.reason as i64 {
          0 => EndFileReason::Eof,
          2 => EndFileReason::Stop,
          3 => EndFileReason::Quit,
          4 => EndFileReason::Error(end.error),
          5 => EndFileReason::Redirect,
          _ => EndFileReason::Unknown,
        }
      };
      Event::EndFile(reason)
    }
    sys::mpv_event_id_MPV_EVENT_FILE_LOADED => Event::FileLoaded,
    MPV_EVENT_IDLE => Event::Idle,
    MPV_EVENT_TICK => Event::Tick,
    sys::mpv_event_id_MPV_EVENT_CLIENT_MESSAGE if !data.is_null() => {
      let message = &*(data as *const sys::mpv_event_client_message);
      let args = (0..message.num_args.max(0) as usize)
        .map(|i| lossy(*message.args.add(i)))
        .collect();
      Event::ClientMessage(args)
    }
    sys::mpv_event_id_MPV_EVENT_VIDEO_RECONFIG => Event::VideoReconfig,
    sys::mpv_event_id_MPV_EVENT_AUDIO_RECONFIG => Event::AudioReconfig,
    sys::mpv_event_id_MPV_EVENT_SEEK => Event::Seek,
    sys::mpv_event_id_MPV_EVENT_PLAYBACK_RESTART => Event::PlaybackRestart,
    sys::mpv_event_id_MPV_EVENT_PROPERTY_CHANGE if !data.is_null() => {
      let property = &*(data as *const sys::mpv_event_property);
      Event::PropertyChange {
        name: lossy(property.name),
        value: property_value(property),
      }
    }
    sys::mpv_event_id_MPV_EVENT_QUEUE_OVERFLOW => Event::QueueOverflow,
    sys::mpv_event_id_MPV_EVENT_HOOK if !data.is_null() => {
      let hook = &*(data as *const sys::mpv_event_hook);
      Event::Hook {
        name: lossy(hook.name),
        id: hook.id,
      }
    }
    other => {
      log::debug!("Unhandled engine event: {}", lossy(sys::mpv_event_name(other)));
      Event::Other(other as i32)
    }
  }
}
