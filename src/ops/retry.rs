//! Retry operator implementation
//!
//! `retry(count)` resubscribes to the source immediately when it errors, up to
//! `count` extra times. The error of the last attempt is forwarded once the
//! budget is spent. For delayed or policy-driven retries see
//! [`retry_with_backoff`](crate::observable::ObservableExt::retry_with_backoff)
//! and [`retry_when`](crate::observable::ObservableExt::retry_when).
//!
//! # Examples
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
//! let source = observable::create(move |mut s: Subscriber<i32, &'static str>| {
//!   if a.fetch_add(1, Ordering::SeqCst) < 2 {
//!     s.error("error");
//!   } else {
//!     s.next(1);
//!     s.complete();
//!   }
//! });
//!
//! let result = Arc::new(parking_lot::Mutex::new(vec![]));
//! let r = result.clone();
//! source.retry(3).subscribe(move |v| r.lock().push(v));
//! assert_eq!(*result.lock(), vec![1]);
//! assert_eq!(attempts.load(Ordering::SeqCst), 3);
//! ```

use std::sync::Arc;

use crate::{
  observable::Observable, observer::Observer, scheduler::Trampoline, subscriber::Subscriber,
};

/// The Retry operator struct.
#[derive(Clone)]
pub struct RetryOp<S> {
  source: S,
  count: usize,
}

impl<S> RetryOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Self { source, count } }
}

impl<S: Observable> Observable for RetryOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let trampoline = Arc::new(Trampoline::new());
    let (source, count, t) = (self.source.clone(), self.count, trampoline.clone());
    trampoline.run(move || attempt(source, subscriber, count, t));
  }
}

fn attempt<S: Observable>(
  source: S, subscriber: Subscriber<S::Item, S::Err>, remaining: usize, trampoline: Arc<Trampoline>,
) {
  if subscriber.is_closed() {
    return;
  }
  let upstream: Subscriber<S::Item, S::Err> = subscriber.chain(RetryObserver {
    source: source.clone(),
    observer: subscriber.clone(),
    remaining,
    trampoline,
  });
  source.actual_subscribe(upstream);
}

/// Observer for retry operator.
///
/// This struct is public to satisfy type trait bounds in the public API,
/// but it is an internal implementation detail of the `retry` operator.
pub struct RetryObserver<S: Observable> {
  source: S,
  observer: Subscriber<S::Item, S::Err>,
  remaining: usize,
  trampoline: Arc<Trampoline>,
}

impl<S: Observable> Observer<S::Item, S::Err> for RetryObserver<S> {
  fn next(&mut self, value: S::Item) { self.observer.next(value) }

  fn error(self, err: S::Err) {
    if self.remaining == 0 {
      self.observer.error(err);
    } else {
      let Self { source, observer, remaining, trampoline } = self;
      let t = trampoline.clone();
      trampoline.run(move || attempt(source, observer, remaining - 1, t));
    }
  }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  fn always_failing(attempts: Arc<AtomicUsize>) -> impl Observable<Item = i32, Err = String> {
    observable::create(move |s: Subscriber<i32, String>| {
      let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
      s.error(format!("attempt {n} failed"));
    })
  }

  #[test]
  fn retries_exactly_count_times() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    always_failing(attempts.clone())
      .retry(3)
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));

    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(error.lock().as_deref(), Some("attempt 4 failed"));
  }

  #[test]
  fn zero_retries_is_a_single_attempt() {
    let attempts = Arc::new(AtomicUsize::new(0));
    always_failing(attempts.clone()).retry(0).subscribe_err(|_| {}, |_| {});
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn many_synchronous_retries_run_in_constant_stack() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    always_failing(attempts.clone())
      .retry(10_000)
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));

    assert_eq!(attempts.load(Ordering::SeqCst), 10_001);
    assert_eq!(error.lock().as_deref(), Some("attempt 10001 failed"));
  }

  #[test]
  fn values_from_failed_attempts_are_kept() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let a = attempts.clone();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::create(move |mut s: Subscriber<usize, ()>| {
      let n = a.fetch_add(1, Ordering::SeqCst);
      s.next(n);
      if n < 2 {
        s.error(());
      } else {
        s.complete();
      }
    })
    .retry(5)
    .subscribe(move |v| s.lock().push(v));
    assert_eq!(*seen.lock(), vec![0, 1, 2]);
  }
}
