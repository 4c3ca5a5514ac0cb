//! Execution contexts for deferred work.
//!
//! A [`Scheduler`] decides when (and on which call stack) a task runs. Two
//! back-ends are provided:
//!
//! - [`ImmediateScheduler`] runs every task inline, ignoring delays.
//! - [`QueueScheduler`] keeps a virtual-time queue ordered by due time and
//!   submission order. Whoever owns the designated execution context drains
//!   it with [`QueueScheduler::advance_by`] or [`QueueScheduler::flush`].
//!
//! Every scheduled task yields a [`TaskHandle`]. Disposing the handle before
//! the task starts prevents it from ever running.

use std::{
  sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
  },
  time::Duration,
};

use crate::subscription::Disposable;

mod immediate;
mod queue;
mod trampoline;

pub use immediate::ImmediateScheduler;
pub use queue::QueueScheduler;
pub(crate) use trampoline::Trampoline;

pub trait Scheduler: Clone + Send + Sync + 'static {
  /// Current time as seen by this scheduler.
  fn now(&self) -> Duration;

  /// Runs `task` after `delay` (or as soon as possible when `None`).
  fn schedule<F>(&self, delay: Option<Duration>, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static;
}

const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const FINISHED: u8 = 2;
const CANCELLED: u8 = 3;

/// Cancellation token of one scheduled task.
#[derive(Clone, Debug, Default)]
pub struct TaskHandle(Arc<AtomicU8>);

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// Moves the task from pending to running. Returns `false` if it was
  /// cancelled (or already started) and must not run.
  pub(crate) fn try_start(&self) -> bool {
    self
      .0
      .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  pub(crate) fn mark_finished(&self) { self.0.store(FINISHED, Ordering::Release) }

  pub fn is_finished(&self) -> bool { self.0.load(Ordering::Acquire) == FINISHED }

  pub fn is_cancelled(&self) -> bool { self.0.load(Ordering::Acquire) == CANCELLED }
}

impl Disposable for TaskHandle {
  /// Cancels the task if it has not started yet.
  fn dispose(&self) {
    let _ = self
      .0
      .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire);
  }

  fn is_disposed(&self) -> bool { self.0.load(Ordering::Acquire) != PENDING }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cancelled_task_cannot_start() {
    let handle = TaskHandle::new();
    handle.dispose();
    assert!(handle.is_cancelled());
    assert!(!handle.try_start());
  }

  #[test]
  fn started_task_ignores_cancel() {
    let handle = TaskHandle::new();
    assert!(handle.try_start());
    handle.dispose();
    assert!(!handle.is_cancelled());
    handle.mark_finished();
    assert!(handle.is_finished());
    assert!(handle.is_disposed());
  }
}
