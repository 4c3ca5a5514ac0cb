use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::{Scheduler, TaskHandle};

/// Runs every task synchronously on the caller's stack.
///
/// Delays are ignored: a task scheduled with `Some(delay)` still runs before
/// `schedule` returns. Use [`QueueScheduler`](super::QueueScheduler) when
/// ordering in time matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
  fn now(&self) -> Duration { SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default() }

  fn schedule<F>(&self, _delay: Option<Duration>, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = TaskHandle::new();
    if handle.try_start() {
      task();
      handle.mark_finished();
    }
    handle
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  use super::*;

  #[test]
  fn runs_inline_even_with_delay() {
    let ran = Arc::new(AtomicBool::new(false));
    let r = ran.clone();
    let handle = ImmediateScheduler.schedule(Some(Duration::from_secs(60)), move || {
      r.store(true, Ordering::SeqCst)
    });
    assert!(ran.load(Ordering::SeqCst));
    assert!(handle.is_finished());
  }
}
