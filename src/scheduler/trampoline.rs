//! Constant-stack execution of work requested from inside other work.
//!
//! Operators that resubscribe synchronously (`retry`, `concat`, `retry_when`,
//! back-off on the immediate scheduler) would otherwise recurse once per
//! attempt: attempt `n + 1` is subscribed from within attempt `n`'s terminal
//! callback. A [`Trampoline`] queues such a request while an outer frame is
//! already running and lets that frame pick it up once the current step
//! returns.

use std::collections::VecDeque;

use parking_lot::Mutex;

type Task = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct TrampolineState {
  running: bool,
  queue: VecDeque<Task>,
}

/// FIFO runner shared by all steps of one subscription.
#[derive(Default)]
pub(crate) struct Trampoline(Mutex<TrampolineState>);

impl Trampoline {
  pub(crate) fn new() -> Self { Self::default() }

  /// Runs `task` now, or after the step that is currently running when called
  /// from inside one (on any thread).
  pub(crate) fn run<F: FnOnce() + Send + 'static>(&self, task: F) {
    {
      let mut state = self.0.lock();
      state.queue.push_back(Box::new(task));
      if state.running {
        return;
      }
      state.running = true;
    }

    let _unwind = UnwindGuard(self);
    loop {
      let next = {
        let mut state = self.0.lock();
        let next = state.queue.pop_front();
        // released under the same lock a late request checks `running` with
        if next.is_none() {
          state.running = false;
        }
        next
      };
      match next {
        Some(task) => task(),
        None => return,
      }
    }
  }
}

/// Hands the runner role back when a task unwinds.
struct UnwindGuard<'a>(&'a Trampoline);

impl Drop for UnwindGuard<'_> {
  fn drop(&mut self) {
    if std::thread::panicking() {
      let mut state = self.0 .0.lock();
      state.running = false;
      state.queue.clear();
    }
  }
}
