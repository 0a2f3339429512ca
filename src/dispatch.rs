//! Cross-thread notifications into the UI thread.
//!
//! The engine rings its wakeup and render-update callbacks from arbitrary
//! threads. Those callbacks only post a task here; the UI thread picks the task
//! up and does the real work. Each task kind has one slot: while a task is
//! queued and not yet taken, further notifications of the same kind are
//! dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};

/// Work the UI thread must do on behalf of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiTask {
  /// The engine has queued events; drain them.
  ProcessEvents,
  /// The render context has a new frame; schedule a repaint.
  Redraw,
}

#[derive(Default)]
struct Slots {
  process_events: AtomicBool,
  redraw: AtomicBool,
}

impl Slots {
  fn slot(&self, task: UiTask) -> &AtomicBool {
    match task {
      UiTask::ProcessEvents => &self.process_events,
      UiTask::Redraw => &self.redraw,
    }
  }
}

/// Owner of the queue; lives with the player on the UI thread.
pub struct UiQueue {
  tx: Sender<UiTask>,
  rx: Receiver<UiTask>,
  slots: Arc<Slots>,
}

impl UiQueue {
  pub fn new() -> Self {
    let (tx, rx) = async_channel::unbounded();
    Self {
      tx,
      rx,
      slots: Arc::new(Slots::default()),
    }
  }

  /// A thread-safe handle that posts `task`.
  pub fn notifier(&self, task: UiTask) -> Notifier {
    Notifier {
      task,
      tx: self.tx.clone(),
      slots: self.slots.clone(),
    }
  }

  /// Consumer side for the host's UI loop.
  pub fn tasks(&self) -> UiTasks {
    UiTasks {
      rx: self.rx.clone(),
      slots: self.slots.clone(),
    }
  }
}

impl Default for UiQueue {
  fn default() -> Self {
    Self::new()
  }
}

/// Posts one kind of task; safe to call from any thread, any number of times.
#[derive(Clone)]
pub struct Notifier {
  task: UiTask,
  tx: Sender<UiTask>,
  slots: Arc<Slots>,
}

impl Notifier {
  pub fn notify(&self) {
    if self.slots.slot(self.task).swap(true, Ordering::AcqRel) {
      return;
    }
    if self.tx.try_send(self.task).is_err() {
      // Queue closed: the UI side is gone.
      self.slots.slot(self.task).store(false, Ordering::Release);
    }
  }
}

/// Receiving end of the UI task queue.
#[derive(Clone)]
pub struct UiTasks {
  rx: Receiver<UiTask>,
  slots: Arc<Slots>,
}

impl UiTasks {
  /// Take the next task without blocking.
  pub fn try_next(&self) -> Option<UiTask> {
    let task = self.rx.try_recv().ok()?;
    self.release(task);
    Some(task)
  }

  /// Wait for the next task. `None` once every sender is gone.
  pub async fn next(&self) -> Option<UiTask> {
    let task = self.rx.recv().await.ok()?;
    self.release(task);
    Some(task)
  }

  pub fn is_empty(&self) -> bool {
    self.rx.is_empty()
  }

  // Free the slot before the task runs so notifications raised while it runs
  // are queued again.
  fn release(&self, task: UiTask) {
    self.slots.slot(task).store(false, Ordering::Release);
  }
}
