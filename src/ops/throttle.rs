use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::{Observer, Signal},
  scheduler::Scheduler,
  subscriber::Subscriber,
};

/// Which end of a throttle window lets a value through.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ThrottleEdge {
  leading: bool,
  tailing: bool,
}

impl ThrottleEdge {
  /// The value that opens a window, immediately.
  #[inline]
  pub fn leading() -> Self { Self { leading: true, tailing: false } }

  /// The latest value seen during a window, when the window closes.
  #[inline]
  pub fn tailing() -> Self { Self { leading: false, tailing: true } }

  /// Both of the above.
  #[inline]
  pub fn all() -> Self { Self { leading: true, tailing: true } }
}

/// Rate-limits a source to at most one window of `duration` at a time.
///
/// A value arriving while no window is open opens one. What gets through is
/// decided by the [`ThrottleEdge`]. Completion first flushes a pending
/// trailing value; errors are forwarded at once.
#[derive(Debug, Clone)]
pub struct ThrottleOp<S, Sch> {
  source: S,
  duration: Duration,
  edge: ThrottleEdge,
  scheduler: Sch,
}

impl<S, Sch> ThrottleOp<S, Sch> {
  pub(crate) fn new(source: S, duration: Duration, edge: ThrottleEdge, scheduler: Sch) -> Self {
    Self { source, duration, edge, scheduler }
  }
}

impl<S, Sch> Observable for ThrottleOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> = subscriber.chain(ThrottleObserver {
      observer: subscriber.clone(),
      state: Arc::new(Mutex::new(ThrottleState { window_open: false, trailing: None })),
      duration: self.duration,
      edge: self.edge,
      scheduler: self.scheduler.clone(),
    });
    self.source.actual_subscribe(upstream);
  }
}

struct ThrottleState<Item> {
  window_open: bool,
  trailing: Option<Item>,
}

pub struct ThrottleObserver<Item, Err, Sch> {
  observer: Subscriber<Item, Err>,
  state: Arc<Mutex<ThrottleState<Item>>>,
  duration: Duration,
  edge: ThrottleEdge,
  scheduler: Sch,
}

fn close_window<Item, Err>(observer: &Subscriber<Item, Err>, state: &Mutex<ThrottleState<Item>>) {
  let claimed = {
    let mut state = state.lock();
    state.window_open = false;
    state.trailing.take().and_then(|value| observer.enqueue(Signal::Next(value)))
  };
  observer.release_claim(claimed);
}

impl<Item, Err, Sch> Observer<Item, Err> for ThrottleObserver<Item, Err, Sch>
where
  Item: Send + 'static,
  Err: Send + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let claimed = {
      let mut state = self.state.lock();
      if state.window_open {
        if self.edge.tailing {
          state.trailing = Some(value);
        }
        return;
      }
      state.window_open = true;
      if self.edge.leading {
        self.observer.enqueue(Signal::Next(value))
      } else {
        state.trailing = Some(value);
        None
      }
    };
    self.observer.release_claim(claimed);

    // scheduled outside the lock: an inline scheduler closes the window at once
    let (observer, state) = (self.observer.clone(), self.state.clone());
    let handle = self
      .scheduler
      .schedule(Some(self.duration), move || close_window(&observer, &state));
    self.observer.add(handle);
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let claimed = {
      let mut state = self.state.lock();
      let flushed = state.trailing.take().and_then(|value| self.observer.enqueue(Signal::Next(value)));
      let completed = self.observer.enqueue(Signal::Completed);
      flushed.or(completed)
    };
    self.observer.release_claim(claimed);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
