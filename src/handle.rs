//! Exclusive ownership of the native engine.

use std::ops::Deref;

use crate::engine::{Engine, WakeupCallback};

/// Owns one engine instance and terminates it exactly once, on drop.
///
/// The handle is deliberately not `Clone`: one playback surface, one engine.
pub struct EngineHandle {
  engine: Option<Box<dyn Engine>>,
}

impl EngineHandle {
  pub fn new(engine: Box<dyn Engine>) -> Self {
    Self {
      engine: Some(engine),
    }
  }

  pub(crate) fn set_wakeup_callback(&mut self, callback: WakeupCallback) {
    if let Some(engine) = self.engine.as_mut() {
      engine.set_wakeup_callback(callback);
    }
  }
}

impl Deref for EngineHandle {
  type Target = dyn Engine;

  fn deref(&self) -> &Self::Target {
    // Only `Drop` takes the engine out.
    match self.engine.as_deref() {
      Some(engine) => engine,
      None => unreachable!("engine accessed after termination"),
    }
  }
}

impl Drop for EngineHandle {
  fn drop(&mut self) {
    if let Some(mut engine) = self.engine.take() {
      log::info!("Terminating engine");
      engine.terminate();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::fake::{Call, FakeEngine};

  #[test]
  fn test_terminates_exactly_once() {
    let engine = FakeEngine::new();
    let state = engine.state();
    let handle = EngineHandle::new(Box::new(engine));

    assert!(handle.initialize().is_ok());
    drop(handle);

    let terminations = state
      .lock()
      .calls
      .iter()
      .filter(|call| **call == Call::Terminate)
      .count();
    assert_eq!(terminations, 1);
  }
}
