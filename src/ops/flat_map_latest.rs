//! FlatMapLatest operator
//!
//! Transforms each value emitted by the source into an inner Observable, and
//! forwards items from only the most recently created inner Observable. When a
//! new inner Observable is produced, the previous one is unsubscribed.
//!
//! Behavior summary:
//! - Only the latest inner Observable's emissions are forwarded downstream.
//! - The operator completes only after the source completes and the current
//!   inner Observable completes.
//! - Errors from the source or from the current inner Observable are propagated
//!   immediately.
//!
//! Common uses: canceling in-flight operations (e.g. API calls) when new data
//! arrives, implementing type-ahead search, or switching between streams based
//! on user input.
//!
//! Example:
//!
//! ```rust
//! use std::time::Duration;
//! use rxkit::prelude::*;
//!
//! let scheduler = QueueScheduler::new();
//! let source = PublishSubject::<i32, ()>::new();
//! let timers = scheduler.clone();
//! source
//!   .clone()
//!   .flat_map_latest(move |value| {
//!     observable::timer(Duration::from_millis(100), timers.clone())
//!       .map(move |_| format!("Result from {value}"))
//!   })
//!   .subscribe(|result| println!("{result}"));
//!
//! source.on_next(1);
//! source.on_next(2);
//! scheduler.flush(); // prints only "Result from 2"
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::Observer,
  subscriber::Subscriber,
  subscription::{Disposable, Subscription},
};

/// Created by
/// [`ObservableExt::flat_map_latest`](crate::observable::ObservableExt::flat_map_latest)
/// and [`switch_latest`](crate::observable::ObservableExt::switch_latest).
pub struct FlatMapLatestOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> FlatMapLatestOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for FlatMapLatestOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), func: self.func.clone() } }
}

pub(crate) fn identity<T>(v: T) -> T { v }

#[derive(Default)]
struct SwitchState {
  generation: u64,
  inner: Option<Subscription>,
  outer_completed: bool,
}

impl<S, F, Inner> Observable for FlatMapLatestOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> Inner + Send + Sync + 'static,
  Inner: Observable<Err = S::Err>,
{
  type Item = Inner::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Inner::Item, S::Err>) {
    let outer: Subscriber<S::Item, S::Err> = subscriber.chain(SwitchObserver {
      observer: subscriber.clone(),
      func: self.func.clone(),
      state: Arc::new(Mutex::new(SwitchState::default())),
    });
    self.source.actual_subscribe(outer);
  }
}

pub struct SwitchObserver<Item, Err, F> {
  observer: Subscriber<Item, Err>,
  func: Arc<F>,
  state: Arc<Mutex<SwitchState>>,
}

impl<Item, OutItem, Err, F, Inner> Observer<Item, Err> for SwitchObserver<OutItem, Err, F>
where
  OutItem: Send + 'static,
  Err: Send + 'static,
  F: Fn(Item) -> Inner,
  Inner: Observable<Item = OutItem, Err = Err>,
{
  fn next(&mut self, value: Item) {
    let inner = (self.func)(value);
    let (generation, previous) = {
      let mut state = self.state.lock();
      state.generation += 1;
      (state.generation, state.inner.take())
    };
    if let Some(previous) = previous {
      previous.dispose();
    }

    let upstream: Subscriber<OutItem, Err> = self.observer.chain(SwitchInnerObserver {
      observer: self.observer.clone(),
      state: self.state.clone(),
      generation,
    });
    {
      let mut state = self.state.lock();
      if state.generation != generation {
        // a newer value arrived on another thread meanwhile
        drop(state);
        upstream.subscription().dispose();
        return;
      }
      state.inner = Some(upstream.subscription().clone());
    }
    inner.actual_subscribe(upstream);
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let done = {
      let mut state = self.state.lock();
      state.outer_completed = true;
      state.inner.is_none()
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct SwitchInnerObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  state: Arc<Mutex<SwitchState>>,
  generation: u64,
}

impl<Item, Err> Observer<Item, Err> for SwitchInnerObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let done = {
      let mut state = self.state.lock();
      if state.generation != self.generation {
        return;
      }
      state.inner = None;
      state.outer_completed
    };
    if done {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn only_latest_inner_is_forwarded() {
    let outer = PublishSubject::<PublishSubject<&'static str, ()>, ()>::new();
    let first = PublishSubject::<&'static str, ()>::new();
    let second = PublishSubject::<&'static str, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    outer
      .clone()
      .switch_latest()
      .subscribe(move |v| s.lock().push(v));

    outer.on_next(first.clone());
    first.on_next("first a");
    outer.on_next(second.clone());
    first.on_next("first b");
    second.on_next("second a");

    assert_eq!(*seen.lock(), vec!["first a", "second a"]);
    assert_eq!(first.observer_count(), 0);
    assert_eq!(second.observer_count(), 1);
  }

  #[test]
  fn completes_after_outer_and_current_inner() {
    let outer = PublishSubject::<i32, ()>::new();
    let inner = PublishSubject::<i32, ()>::new();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    let i = inner.clone();
    outer
      .clone()
      .flat_map_latest(move |_| i.clone())
      .subscribe_all(|_| {}, |_| {}, move || *c.lock() = true);

    outer.on_next(1);
    outer.on_completed();
    assert!(!*completed.lock());
    inner.on_completed();
    assert!(*completed.lock());
  }

  #[test]
  fn completion_waits_for_latest_inner() {
    let outer = PublishSubject::<bool, ()>::new();
    let completed = Arc::new(Mutex::new(false));
    let pending = PublishSubject::<i32, ()>::new();
    let c = completed.clone();
    let p = pending.clone();
    outer
      .clone()
      .flat_map_latest(move |finite| {
        if finite {
          observable::of(1).box_it()
        } else {
          p.clone().box_it()
        }
      })
      .subscribe_all(|_| {}, |_| {}, move || *c.lock() = true);

    outer.on_next(true);
    outer.on_next(false);
    outer.on_completed();
    assert!(!*completed.lock());
    pending.on_completed();
    assert!(*completed.lock());
  }
}
