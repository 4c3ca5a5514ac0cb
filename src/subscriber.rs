//! The safe sink every subscription delivers through.
//!
//! A [`Subscriber`] wraps a downstream observer and guarantees:
//!
//! - at most one terminal signal, and nothing after it;
//! - nothing at all once its [`Subscription`] is disposed;
//! - serialized delivery. A signal that arrives while another is being
//!   delivered (from another thread, or re-entrantly from inside the
//!   downstream callback) is queued and delivered by the thread that is
//!   already emitting, in arrival order.
//!
//! No lock is held while downstream code runs, so callbacks may freely
//! subscribe, dispose or push into subjects.

use std::{collections::VecDeque, mem, sync::Arc};

use parking_lot::Mutex;

use crate::{
  observer::{BoxedObserver, Observer, Signal},
  subscription::{Disposable, Subscription},
};

struct State<Item, Err> {
  /// `None` while a delivery is in flight, after a terminal signal, or after
  /// disposal.
  observer: Option<BoxedObserver<Item, Err>>,
  emitting: bool,
  /// A terminal signal has been accepted.
  done: bool,
  queue: VecDeque<Signal<Item, Err>>,
}

/// Serializing, terminal-once wrapper around a downstream observer.
///
/// Cloning is cheap; all clones feed the same observer.
pub struct Subscriber<Item, Err> {
  state: Arc<Mutex<State<Item, Err>>>,
  subscription: Subscription,
}

impl<Item, Err> Clone for Subscriber<Item, Err> {
  fn clone(&self) -> Self {
    Self { state: self.state.clone(), subscription: self.subscription.clone() }
  }
}

impl<Item: Send + 'static, Err: Send + 'static> Subscriber<Item, Err> {
  pub fn new<O>(observer: O) -> Self
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let state = Arc::new(Mutex::new(State {
      observer: Some(Box::new(observer) as BoxedObserver<Item, Err>),
      emitting: false,
      done: false,
      queue: VecDeque::new(),
    }));
    let subscription = Subscription::new();
    let weak = Arc::downgrade(&state);
    subscription.add_teardown(move || {
      if let Some(state) = weak.upgrade() {
        let mut state = state.lock();
        state.done = true;
        state.observer = None;
        state.queue.clear();
      }
    });
    Self { state, subscription }
  }

  /// Wraps an upstream observer in a new subscriber whose lifetime is owned
  /// by this one: disposing `self` disposes the returned subscriber too.
  pub fn chain<O, I2, E2>(&self, observer: O) -> Subscriber<I2, E2>
  where
    O: Observer<I2, E2> + Send + 'static,
    I2: Send + 'static,
    E2: Send + 'static,
  {
    let upstream = Subscriber::new(observer);
    self.subscription.add(upstream.subscription.clone());
    upstream
  }
}

impl<Item, Err> Subscriber<Item, Err> {
  #[inline]
  pub fn subscription(&self) -> &Subscription { &self.subscription }

  /// Ties `resource` to this subscriber's lifetime.
  #[inline]
  pub fn add<D: Disposable + Send + 'static>(&self, resource: D) { self.subscription.add(resource) }

  /// Runs `f` when this subscriber is disposed or terminates.
  #[inline]
  pub fn add_teardown<F: FnOnce() + Send + 'static>(&self, f: F) {
    self.subscription.add_teardown(f)
  }

  /// Pushes a signal, delivering it now or queueing it behind a delivery
  /// that is already in progress.
  pub fn emit(&self, signal: Signal<Item, Err>) {
    let mut state = self.state.lock();
    if state.done {
      return;
    }
    if signal.is_terminal() {
      state.done = true;
    }
    if state.emitting {
      state.queue.push_back(signal);
      return;
    }
    let Some(observer) = state.observer.take() else {
      return;
    };
    state.emitting = true;
    drop(state);
    self.drain(observer, VecDeque::from([signal]));
  }

  /// Queues `signal` behind everything queued so far without delivering it.
  ///
  /// Returns the observer when the caller took over the emitting role; it
  /// must then be passed to [`release`](Self::release), outside any lock the
  /// caller holds. Operators call this while holding their own state lock so
  /// that the order of the queue matches the order of their state changes.
  pub(crate) fn enqueue(&self, signal: Signal<Item, Err>) -> Option<BoxedObserver<Item, Err>> {
    let mut state = self.state.lock();
    if state.done {
      return None;
    }
    if signal.is_terminal() {
      state.done = true;
    }
    state.queue.push_back(signal);
    if state.emitting {
      return None;
    }
    let observer = state.observer.take()?;
    state.emitting = true;
    Some(observer)
  }

  /// Completes an [`enqueue`](Self::enqueue) that took over the emitting
  /// role; does nothing when it did not.
  pub(crate) fn release_claim(&self, claimed: Option<BoxedObserver<Item, Err>>) {
    if let Some(observer) = claimed {
      self.release(observer, vec![]);
    }
  }

  /// Claims the emitting role before this subscriber is published anywhere.
  ///
  /// Used by subjects to register a subscriber and replay buffered values
  /// atomically: signals pushed by other producers while the claim is held
  /// queue up behind the replay.
  pub(crate) fn claim(&self) -> Option<BoxedObserver<Item, Err>> {
    let mut state = self.state.lock();
    if state.done || state.emitting {
      return None;
    }
    let observer = state.observer.take()?;
    state.emitting = true;
    Some(observer)
  }

  /// Delivers `signals` through a claimed observer, then whatever queued up
  /// meanwhile, and releases the claim.
  pub(crate) fn release(&self, observer: BoxedObserver<Item, Err>, signals: Vec<Signal<Item, Err>>) {
    if signals.iter().any(Signal::is_terminal) {
      self.state.lock().done = true;
    }
    self.drain(observer, signals.into())
  }

  fn drain(&self, mut observer: BoxedObserver<Item, Err>, mut pending: VecDeque<Signal<Item, Err>>) {
    loop {
      while let Some(signal) = pending.pop_front() {
        if self.subscription.is_disposed() {
          self.state.lock().emitting = false;
          return;
        }
        match signal {
          Signal::Next(value) => observer.next(value),
          Signal::Error(err) => {
            self.finish();
            observer.error(err);
            self.subscription.dispose();
            return;
          }
          Signal::Completed => {
            self.finish();
            observer.complete();
            self.subscription.dispose();
            return;
          }
        }
      }

      let mut state = self.state.lock();
      if self.subscription.is_disposed() {
        state.emitting = false;
        state.queue.clear();
        return;
      }
      if state.queue.is_empty() {
        state.observer = Some(observer);
        state.emitting = false;
        return;
      }
      pending = mem::take(&mut state.queue);
    }
  }

  fn finish(&self) {
    let mut state = self.state.lock();
    state.done = true;
    state.emitting = false;
    state.queue.clear();
  }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { self.emit(Signal::Next(value)) }

  #[inline]
  fn error(self, err: Err) { self.emit(Signal::Error(err)) }

  #[inline]
  fn complete(self) { self.emit(Signal::Completed) }

  fn is_closed(&self) -> bool { self.subscription.is_disposed() || self.state.lock().done }
}

#[cfg(test)]
mod tests {
  use std::thread;

  use super::*;
  use crate::observer::FnObserver;

  fn recorder() -> (Arc<Mutex<Vec<Signal<i32, &'static str>>>>, Subscriber<i32, &'static str>) {
    let log: Arc<Mutex<Vec<Signal<i32, &'static str>>>> = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscriber = Subscriber::new(FnObserver::new(
      move |v: i32| l1.lock().push(Signal::Next(v)),
      move |e: &'static str| l2.lock().push(Signal::Error(e)),
      move || l3.lock().push(Signal::Completed),
    ));
    (log, subscriber)
  }

  #[test]
  fn nothing_after_terminal() {
    let (log, mut subscriber) = recorder();
    subscriber.next(1);
    subscriber.clone().complete();
    subscriber.next(2);
    subscriber.clone().error("late");

    assert_eq!(*log.lock(), vec![Signal::Next(1), Signal::Completed]);
    assert!(subscriber.is_closed());
    assert!(subscriber.subscription().is_disposed());
  }

  #[test]
  fn nothing_after_dispose() {
    let (log, mut subscriber) = recorder();
    subscriber.next(1);
    subscriber.subscription().dispose();
    subscriber.next(2);
    subscriber.clone().complete();

    assert_eq!(*log.lock(), vec![Signal::Next(1)]);
  }

  #[test]
  fn reentrant_signals_are_queued_in_order() {
    let log: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(vec![]));
    let slot: Arc<Mutex<Option<Subscriber<i32, ()>>>> = Arc::new(Mutex::new(None));
    let (l, s) = (log.clone(), slot.clone());
    let subscriber = Subscriber::new(FnObserver::new(
      move |v: i32| {
        l.lock().push(v);
        if v == 1 {
          let mut me = s.lock().clone().expect("installed");
          me.next(2);
          me.next(3);
          // still inside the first delivery
          assert_eq!(*l.lock(), vec![1]);
        }
      },
      |_: ()| {},
      || {},
    ));
    *slot.lock() = Some(subscriber.clone());

    subscriber.clone().next(1);
    assert_eq!(*log.lock(), vec![1, 2, 3]);
    slot.lock().take();
  }

  #[test]
  fn enqueued_signals_wait_for_release() {
    let (log, subscriber) = recorder();
    let observer = subscriber.enqueue(Signal::Next(1)).expect("idle subscriber");
    assert!(subscriber.enqueue(Signal::Next(2)).is_none());
    assert!(subscriber.enqueue(Signal::Completed).is_none());
    assert!(log.lock().is_empty());

    subscriber.release_claim(Some(observer));
    assert_eq!(*log.lock(), vec![Signal::Next(1), Signal::Next(2), Signal::Completed]);
    assert!(subscriber.enqueue(Signal::Next(3)).is_none());
  }

  #[test]
  fn chained_subscriber_is_disposed_with_parent() {
    let (_log, parent) = recorder();
    let child: Subscriber<i32, ()> = parent.chain(FnObserver::new(|_: i32| {}, |_: ()| {}, || {}));
    parent.subscription().dispose();
    assert!(child.is_closed());
  }

  #[test]
  fn concurrent_producers_are_serialized() {
    let count = Arc::new(Mutex::new(0usize));
    let c = count.clone();
    let subscriber: Subscriber<usize, ()> =
      Subscriber::new(FnObserver::new(move |_: usize| *c.lock() += 1, |_: ()| {}, || {}));

    let handles: Vec<_> = (0..4)
      .map(|_| {
        let mut s = subscriber.clone();
        thread::spawn(move || {
          for i in 0..250 {
            s.next(i);
          }
        })
      })
      .collect();
    for h in handles {
      h.join().expect("producer thread");
    }
    assert_eq!(*count.lock(), 1000);
  }
}
