//! Virtual-time task queue.
//!
//! Time only moves when the owner of the queue says so, which makes it both
//! the "designated execution context" a host drains from its own loop and a
//! deterministic clock for testing time-based operators.
//!
//! ```rust
//! use std::time::Duration;
//! use rxkit::prelude::*;
//!
//! let scheduler = QueueScheduler::new();
//! let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
//! let s = seen.clone();
//! observable::of::<_, ()>(42)
//!   .delay(Duration::from_millis(100), scheduler.clone())
//!   .subscribe(move |v| s.lock().push(v));
//!
//! scheduler.advance_by(Duration::from_millis(99));
//! assert!(seen.lock().is_empty());
//! scheduler.advance_by(Duration::from_millis(1));
//! assert_eq!(*seen.lock(), vec![42]);
//! ```

use std::{cmp::Ordering, collections::BinaryHeap, sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{Scheduler, TaskHandle};
use crate::subscription::Disposable;

struct ScheduledTask {
  due: Duration,
  seq: u64,
  task: Box<dyn FnOnce() + Send>,
  handle: TaskHandle,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier due time first, then FIFO by submission order
    other
      .due
      .cmp(&self.due)
      .then_with(|| other.seq.cmp(&self.seq))
  }
}

#[derive(Default)]
struct QueueState {
  now: Duration,
  tasks: BinaryHeap<ScheduledTask>,
  next_seq: u64,
}

/// A virtual-time scheduler.
///
/// Clones share the same clock and queue. Tasks run on whichever thread calls
/// [`advance_by`](Self::advance_by), [`advance_to`](Self::advance_to),
/// [`run_due`](Self::run_due) or [`flush`](Self::flush), never while the
/// queue lock is held, so a task may schedule further tasks.
#[derive(Clone, Default)]
pub struct QueueScheduler(Arc<Mutex<QueueState>>);

impl QueueScheduler {
  pub fn new() -> Self { Self::default() }

  /// Number of tasks waiting to run. Cancelled tasks are not counted.
  pub fn pending_count(&self) -> usize {
    self
      .0
      .lock()
      .tasks
      .iter()
      .filter(|t| !t.handle.is_disposed())
      .count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Moves the clock forward by `duration`, running every task that falls
  /// due on the way in (due time, submission) order.
  pub fn advance_by(&self, duration: Duration) {
    let target = self.0.lock().now.saturating_add(duration);
    self.advance_to(target);
  }

  /// Moves the clock to `target` (never backwards), running due tasks.
  pub fn advance_to(&self, target: Duration) {
    self.execute_until(Some(target));
    let mut state = self.0.lock();
    if state.now < target {
      state.now = target;
    }
  }

  /// Runs the tasks already due at the current time.
  pub fn run_due(&self) {
    let now = self.0.lock().now;
    self.execute_until(Some(now));
  }

  /// Runs every queued task, jumping the clock to each due time.
  ///
  /// A task that keeps rescheduling itself (such as an unbounded
  /// `interval`) makes this loop forever; bound it with `take` or drive the
  /// clock with `advance_by` instead.
  pub fn flush(&self) { self.execute_until(None) }

  fn execute_until(&self, limit: Option<Duration>) {
    loop {
      let next = {
        let mut state = self.0.lock();
        let due = match state.tasks.peek() {
          Some(task) if limit.map_or(true, |limit| task.due <= limit) => task.due,
          _ => return,
        };
        if state.now < due {
          state.now = due;
        }
        state.tasks.pop()
      };
      let Some(ScheduledTask { task, handle, .. }) = next else {
        return;
      };
      if handle.try_start() {
        task();
        handle.mark_finished();
      }
    }
  }
}

impl Scheduler for QueueScheduler {
  fn now(&self) -> Duration { self.0.lock().now }

  fn schedule<F>(&self, delay: Option<Duration>, task: F) -> TaskHandle
  where
    F: FnOnce() + Send + 'static,
  {
    let handle = TaskHandle::new();
    let mut state = self.0.lock();
    // saturates: a task due past the end of time runs last, never panics
    let due = state.now.saturating_add(delay.unwrap_or(Duration::ZERO));
    let seq = state.next_seq;
    state.next_seq += 1;
    state
      .tasks
      .push(ScheduledTask { due, seq, task: Box::new(task), handle: handle.clone() });
    handle
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, QueueScheduler) {
    (Arc::new(Mutex::new(vec![])), QueueScheduler::new())
  }

  #[test]
  fn runs_in_due_time_order() {
    let (log, scheduler) = recorder();
    for (name, ms) in [("late", 30), ("early", 10), ("middle", 20)] {
      let log = log.clone();
      scheduler.schedule(Some(Duration::from_millis(ms)), move || log.lock().push(name));
    }
    scheduler.flush();
    assert_eq!(*log.lock(), vec!["early", "middle", "late"]);
    assert_eq!(scheduler.now(), Duration::from_millis(30));
  }

  #[test]
  fn ties_keep_submission_order() {
    let (log, scheduler) = recorder();
    for name in ["a", "b", "c"] {
      let log = log.clone();
      scheduler.schedule(Some(Duration::from_millis(5)), move || log.lock().push(name));
    }
    scheduler.advance_by(Duration::from_millis(5));
    assert_eq!(*log.lock(), vec!["a", "b", "c"]);
  }

  #[test]
  fn advance_only_runs_due_tasks() {
    let (log, scheduler) = recorder();
    let l = log.clone();
    scheduler.schedule(Some(Duration::from_millis(100)), move || l.lock().push("fired"));

    scheduler.advance_by(Duration::from_millis(50));
    assert!(log.lock().is_empty());
    assert_eq!(scheduler.pending_count(), 1);
    assert_eq!(scheduler.now(), Duration::from_millis(50));

    scheduler.advance_by(Duration::from_millis(50));
    assert_eq!(*log.lock(), vec!["fired"]);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn cancelled_task_never_runs() {
    let (log, scheduler) = recorder();
    let l = log.clone();
    let handle = scheduler.schedule(Some(Duration::from_millis(10)), move || l.lock().push("x"));
    handle.dispose();
    assert_eq!(scheduler.pending_count(), 0);

    scheduler.advance_by(Duration::from_millis(10));
    assert!(log.lock().is_empty());
    assert!(handle.is_cancelled());
  }

  #[test]
  fn tasks_may_schedule_more_tasks() {
    let (log, scheduler) = recorder();
    let (l, s) = (log.clone(), scheduler.clone());
    scheduler.schedule(None, move || {
      l.lock().push("outer");
      let l = l.clone();
      s.schedule(Some(Duration::from_millis(1)), move || l.lock().push("inner"));
    });
    scheduler.run_due();
    assert_eq!(*log.lock(), vec!["outer"]);
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(*log.lock(), vec!["outer", "inner"]);
  }

  #[test]
  fn huge_delay_saturates_instead_of_overflowing() {
    let (log, scheduler) = recorder();
    scheduler.advance_by(Duration::from_millis(1));
    let l = log.clone();
    scheduler.schedule(Some(Duration::MAX), move || l.lock().push("end of time"));
    let l = log.clone();
    scheduler.schedule(Some(Duration::from_secs(1)), move || l.lock().push("soon"));

    scheduler.advance_by(Duration::MAX);
    assert_eq!(*log.lock(), vec!["soon", "end of time"]);
    assert_eq!(scheduler.now(), Duration::MAX);
  }

  #[test]
  fn clock_never_moves_backwards() {
    let scheduler = QueueScheduler::new();
    scheduler.advance_to(Duration::from_millis(10));
    scheduler.advance_to(Duration::from_millis(5));
    assert_eq!(scheduler.now(), Duration::from_millis(10));
  }
}
