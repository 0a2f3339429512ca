//! Video rendering into the host's OpenGL framebuffer.

use std::ffi::c_void;

use crate::bridge::PropertyBridge;
use crate::dispatch::Notifier;
use crate::engine::{GlInit, RenderContext, RenderTarget};
use crate::error::{MpvError, Result};

/// What the renderer needs from the UI toolkit's GL context.
pub trait GlHost {
  /// Address of a GL entry point in the current context, or null.
  fn proc_address(&self, name: &str) -> *mut c_void;

  /// Restore the toolkit's GL state around engine rendering.
  fn reset_gl_state(&mut self);

  /// `Display*` of the X11 connection, if the host runs on X11.
  fn x11_display(&self) -> Option<*mut c_void> {
    None
  }
}

/// Lazily created engine render session for one video surface.
pub struct RendererAdapter {
  context: Option<Box<dyn RenderContext>>,
  /// Set once creation failed; creation is never attempted again.
  failed: bool,
  redraw: Notifier,
}

impl RendererAdapter {
  pub fn new(redraw: Notifier) -> Self {
    Self {
      context: None,
      failed: false,
      redraw,
    }
  }

  pub fn is_initialized(&self) -> bool {
    self.context.is_some()
  }

  pub fn has_failed(&self) -> bool {
    self.failed
  }

  /// Create the render context on first use. Returns `true` only for the call
  /// that did the creation. After a failed creation every later call returns
  /// `Ok(false)` without touching the engine.
  pub fn ensure_initialized(&mut self, bridge: &PropertyBridge, host: &dyn GlHost) -> Result<bool> {
    if self.context.is_some() || self.failed {
      return Ok(false);
    }
    let resolver = |name: &str| host.proc_address(name);
    let init = GlInit {
      get_proc_address: &resolver,
      x11_display: host.x11_display(),
    };
    let mut context = match bridge.create_render_context(init) {
      Ok(context) => context,
      Err(e) => {
        self.failed = true;
        return Err(MpvError::Render(e));
      }
    };

    let redraw = self.redraw.clone();
    context.set_update_callback(Box::new(move || redraw.notify()));
    self.context = Some(context);
    log::info!("Render context created");
    Ok(true)
  }

  /// Render one frame into `target`. Does nothing before initialization.
  pub fn render(&mut self, host: &mut dyn GlHost, target: &RenderTarget) -> bool {
    let Some(context) = self.context.as_mut() else {
      return false;
    };
    host.reset_gl_state();
    let result = context.render(target);
    host.reset_gl_state();
    match result {
      Ok(()) => true,
      Err(e) => {
        log::warn!("Failed to render frame: {}", e);
        false
      }
    }
  }

  /// Free the render context. Must happen before the engine is destroyed.
  pub fn release(&mut self) {
    if self.context.take().is_some() {
      log::debug!("Render context released");
    }
  }
}

impl Drop for RendererAdapter {
  fn drop(&mut self) {
    self.release();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dispatch::{UiQueue, UiTask};
  use crate::engine::fake::{Call, FakeEngine, FakeState};
  use crate::handle::EngineHandle;
  use parking_lot::Mutex;
  use std::sync::Arc;

  #[derive(Default)]
  struct Host {
    resets: usize,
    resolved: std::cell::RefCell<Vec<String>>,
  }

  impl GlHost for Host {
    fn proc_address(&self, name: &str) -> *mut c_void {
      self.resolved.borrow_mut().push(name.to_string());
      std::ptr::null_mut()
    }

    fn reset_gl_state(&mut self) {
      self.resets += 1;
    }
  }

  fn setup() -> (PropertyBridge, Arc<Mutex<FakeState>>, UiQueue) {
    let engine = FakeEngine::new();
    let state = engine.state();
    let bridge = PropertyBridge::new(EngineHandle::new(Box::new(engine)));
    (bridge, state, UiQueue::new())
  }

  const TARGET: RenderTarget = RenderTarget {
    fbo: 3,
    width: 1280,
    height: 720,
    flip_y: false,
  };

  #[test]
  fn test_initializes_once() {
    let (bridge, state, queue) = setup();
    let mut renderer = RendererAdapter::new(queue.notifier(UiTask::Redraw));
    let host = Host::default();

    assert!(renderer.ensure_initialized(&bridge, &host).unwrap());
    assert!(!renderer.ensure_initialized(&bridge, &host).unwrap());
    assert!(renderer.is_initialized());
    assert_eq!(host.resolved.borrow().as_slice(), ["glGetString"]);

    let creations = state
      .lock()
      .calls
      .iter()
      .filter(|call| **call == Call::CreateRenderContext)
      .count();
    assert_eq!(creations, 1);
  }

  #[test]
  fn test_render_brackets_with_state_resets() {
    let (bridge, state, queue) = setup();
    let mut renderer = RendererAdapter::new(queue.notifier(UiTask::Redraw));
    let mut host = Host::default();

    assert!(!renderer.render(&mut host, &TARGET));
    assert_eq!(host.resets, 0);

    renderer.ensure_initialized(&bridge, &host).unwrap();
    assert!(renderer.render(&mut host, &TARGET));
    assert_eq!(host.resets, 2);
    assert!(state.lock().calls.contains(&Call::Render(TARGET)));
  }

  #[test]
  fn test_update_callback_posts_redraw() {
    let (bridge, state, queue) = setup();
    let tasks = queue.tasks();
    let mut renderer = RendererAdapter::new(queue.notifier(UiTask::Redraw));
    renderer.ensure_initialized(&bridge, &Host::default()).unwrap();

    let update = state.lock().render_update.take().unwrap();
    update();
    update();
    assert_eq!(tasks.try_next(), Some(UiTask::Redraw));
    assert_eq!(tasks.try_next(), None);
  }

  #[test]
  fn test_creation_failure() {
    let (bridge, state, queue) = setup();
    state.lock().fail_render_context = true;
    let mut renderer = RendererAdapter::new(queue.notifier(UiTask::Redraw));

    let result = renderer.ensure_initialized(&bridge, &Host::default());
    assert!(matches!(result, Err(MpvError::Render(_))));
    assert!(!renderer.is_initialized());
    assert!(renderer.has_failed());
  }

  #[test]
  fn test_failed_creation_is_not_retried() {
    let (bridge, state, queue) = setup();
    state.lock().fail_render_context = true;
    let mut renderer = RendererAdapter::new(queue.notifier(UiTask::Redraw));
    let mut host = Host::default();

    assert!(renderer.ensure_initialized(&bridge, &host).is_err());
    for _ in 0..5 {
      assert!(!renderer.ensure_initialized(&bridge, &host).unwrap());
      assert!(!renderer.render(&mut host, &TARGET));
    }
    assert_eq!(host.resets, 0);

    let creations = state
      .lock()
      .calls
      .iter()
      .filter(|call| **call == Call::CreateRenderContext)
      .count();
    assert_eq!(creations, 1);
  }
}
