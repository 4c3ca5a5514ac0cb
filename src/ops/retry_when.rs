//! Notifier-driven resubscription.
//!
//! Every upstream error is pushed into an error stream handed to the
//! notifier. The observable the notifier returns acts as the trigger:
//!
//! - trigger `next` resubscribes the source (the failed attempt is already
//!   gone);
//! - trigger `error` is forwarded downstream;
//! - trigger `complete` completes downstream.
//!
//! ```rust
//! use std::sync::{
//!   atomic::{AtomicUsize, Ordering},
//!   Arc,
//! };
//!
//! use rxkit::prelude::*;
//!
//! let attempts = Arc::new(AtomicUsize::new(0));
//! let a = attempts.clone();
//! observable::create(move |s: Subscriber<i32, &'static str>| {
//!   a.fetch_add(1, Ordering::SeqCst);
//!   s.error("offline");
//! })
//! // give up quietly after two retries
//! .retry_when(|errors| errors.take(2))
//! .subscribe(|_| {});
//! assert_eq!(attempts.load(Ordering::SeqCst), 3);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{BoxedObservable, Observable, ObservableExt},
  observer::{Observer, Signal},
  scheduler::Trampoline,
  subject::PublishSubject,
  subscriber::Subscriber,
  subscription::{Disposable, Subscription},
};

/// Created by
/// [`ObservableExt::retry_when`](crate::observable::ObservableExt::retry_when).
pub struct RetryWhenOp<S, F> {
  source: S,
  notifier: Arc<F>,
}

impl<S, F> RetryWhenOp<S, F> {
  pub(crate) fn new(source: S, notifier: F) -> Self {
    Self { source, notifier: Arc::new(notifier) }
  }
}

impl<S: Clone, F> Clone for RetryWhenOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), notifier: self.notifier.clone() } }
}

impl<S, F, T> Observable for RetryWhenOp<S, F>
where
  S: Observable,
  S::Err: Clone,
  F: Fn(BoxedObservable<S::Err, S::Err>) -> T + Send + Sync + 'static,
  T: Observable<Err = S::Err>,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let errors = PublishSubject::<S::Err, S::Err>::new();
    let trigger = (self.notifier)(errors.clone().box_it());
    let state = Arc::new(RetryWhenState {
      source: self.source.clone(),
      observer: subscriber,
      errors,
      attempt: Mutex::new(None),
      trampoline: Trampoline::new(),
    });

    let trigger_subscriber: Subscriber<T::Item, S::Err> =
      state.observer.chain(TriggerObserver { state: state.clone() });
    trigger.actual_subscribe(trigger_subscriber);
    let s = state.clone();
    state.trampoline.run(move || resubscribe(&s));
  }
}

struct RetryWhenState<S: Observable> {
  source: S,
  observer: Subscriber<S::Item, S::Err>,
  errors: PublishSubject<S::Err, S::Err>,
  /// The live attempt, if any.
  attempt: Mutex<Option<Subscription>>,
  /// Runs resubscriptions and trigger terminals in arrival order, one frame
  /// at a time.
  trampoline: Trampoline,
}

fn resubscribe<S>(state: &Arc<RetryWhenState<S>>)
where
  S: Observable,
  S::Err: Clone,
{
  if state.observer.is_closed() {
    return;
  }
  let upstream: Subscriber<S::Item, S::Err> =
    state.observer.chain(AttemptObserver { state: state.clone() });
  let previous = state.attempt.lock().replace(upstream.subscription().clone());
  if let Some(previous) = previous {
    previous.dispose();
  }
  state.source.actual_subscribe(upstream);
}

/// Forwards one attempt downstream, diverting its error into the error
/// stream.
struct AttemptObserver<S: Observable> {
  state: Arc<RetryWhenState<S>>,
}

impl<S> Observer<S::Item, S::Err> for AttemptObserver<S>
where
  S: Observable,
  S::Err: Clone,
{
  fn next(&mut self, value: S::Item) { self.state.observer.emit(Signal::Next(value)) }

  fn error(self, err: S::Err) { self.state.errors.on_next(err) }

  fn complete(self) { self.state.observer.emit(Signal::Completed) }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

struct TriggerObserver<S: Observable> {
  state: Arc<RetryWhenState<S>>,
}

impl<S, Item> Observer<Item, S::Err> for TriggerObserver<S>
where
  S: Observable,
  S::Err: Clone,
{
  fn next(&mut self, _: Item) {
    let s = self.state.clone();
    self.state.trampoline.run(move || resubscribe(&s));
  }

  fn error(self, err: S::Err) {
    let s = self.state.clone();
    self.state.trampoline.run(move || s.observer.emit(Signal::Error(err)));
  }

  fn complete(self) {
    let s = self.state.clone();
    self.state.trampoline.run(move || s.observer.emit(Signal::Completed));
  }

  fn is_closed(&self) -> bool { self.state.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
    time::Duration,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  fn flaky(attempts: Arc<AtomicUsize>, succeed_on: usize) -> impl Observable<Item = usize, Err = String> {
    observable::create(move |mut s: Subscriber<usize, String>| {
      let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
      if n < succeed_on {
        s.error(format!("attempt {n}"));
      } else {
        s.next(n);
        s.complete();
      }
    })
  }

  #[test]
  fn trigger_completion_completes() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    flaky(attempts.clone(), usize::MAX)
      .retry_when(|errors| errors.take(2))
      .subscribe_all(|_| {}, |_| {}, move || *c.lock() = true);

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert!(*completed.lock());
  }

  #[test]
  fn trigger_error_is_forwarded() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    flaky(attempts.clone(), usize::MAX)
      .retry_when(|errors| {
        errors.enumerate().flat_map(|(index, err)| {
          if index < 2 {
            observable::of(()).box_it()
          } else {
            observable::throw_err(format!("gave up: {err}")).box_it()
          }
        })
      })
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(error.lock().as_deref(), Some("gave up: attempt 3"));
  }

  #[test]
  fn many_synchronous_retries_run_in_constant_stack() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    flaky(attempts.clone(), 10_000)
      .retry_when(|errors| errors)
      .subscribe(move |v| s.lock().push(v));

    assert_eq!(attempts.load(Ordering::SeqCst), 10_000);
    assert_eq!(*seen.lock(), vec![10_000]);
  }

  #[test]
  fn delayed_retry_through_scheduler() {
    let scheduler = QueueScheduler::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    let delays = scheduler.clone();
    flaky(attempts.clone(), 2)
      .retry_when(move |errors| errors.delay(Duration::from_secs(1), delays.clone()))
      .subscribe(move |v| s.lock().push(v));

    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(*seen.lock(), vec![2]);
  }

  #[test]
  fn dispose_cancels_pending_retry() {
    let scheduler = QueueScheduler::new();
    let attempts = Arc::new(AtomicUsize::new(0));
    let delays = scheduler.clone();
    let subscription = flaky(attempts.clone(), usize::MAX)
      .retry_when(move |errors| errors.delay(Duration::from_secs(1), delays.clone()))
      .subscribe(|_| {});

    subscription.dispose();
    scheduler.flush();
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
  }
}
