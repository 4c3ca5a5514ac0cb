//! Sequences with a known number of values.
//!
//! | wrapper          | delivers                                   |
//! |------------------|--------------------------------------------|
//! | [`Single`]       | exactly one value, or an error             |
//! | [`Maybe`]        | one value, completion without one, or an error |
//! | [`Completable`]  | completion or an error, never a value      |
//!
//! Each wraps an ordinary [`Observable`], so every operator still applies;
//! the wrappers add a subscribe method shaped after their outcome. Convert an
//! existing stream with
//! [`as_single`](crate::observable::ObservableExt::as_single),
//! [`as_maybe`](crate::observable::ObservableExt::as_maybe) or
//! [`as_completable`](crate::observable::ObservableExt::as_completable), or
//! build one from an emitter with [`single`], [`maybe`] or [`completable`].
//!
//! ```rust
//! use rxkit::prelude::*;
//!
//! let token = std::sync::Arc::new(parking_lot::Mutex::new(None));
//! let t = token.clone();
//! observable::single(|emitter: SingleEmitter<&'static str, ()>| emitter.success("secret"))
//!   .subscribe_success(move |v| *t.lock() = Some(v), |_| {});
//! assert_eq!(*token.lock(), Some("secret"));
//!
//! let error = std::sync::Arc::new(parking_lot::Mutex::new(None));
//! let e = error.clone();
//! observable::from_iter::<_, ()>(vec![1, 2])
//!   .as_single()
//!   .subscribe_success(|_| {}, move |err| *e.lock() = Some(err));
//! assert_eq!(*error.lock(), Some(SingleError::MoreThanOneElement));
//! ```

use std::convert::Infallible;

use crate::{
  error::SingleError,
  observable::{create, Observable, ObservableExt},
  observer::{ignore_complete, Observer, Signal},
  ops::ignore_elements::IgnoreElementsOp,
  subscriber::Subscriber,
  subscription::{Disposable, Subscription},
};

/// Exactly one value, or an error.
#[derive(Clone)]
pub struct Single<S>(S);

/// At most one value.
#[derive(Clone)]
pub struct Maybe<S>(S);

/// Only the outcome; values are never delivered.
#[derive(Clone)]
pub struct Completable<S>(S);

macro_rules! forward_observable {
  ($name:ident) => {
    impl<S: Observable> Observable for $name<S> {
      type Item = S::Item;
      type Err = S::Err;

      #[inline]
      fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
        self.0.actual_subscribe(subscriber)
      }
    }
  };
}

forward_observable!(Single);
forward_observable!(Maybe);
forward_observable!(Completable);

impl<S: Observable> Single<S> {
  /// `on_success` receives the value; `on_error` any failure.
  pub fn subscribe_success<N, E>(self, on_success: N, on_error: E) -> Subscription
  where
    N: FnOnce(S::Item) + Send + 'static,
    E: FnOnce(S::Err) + Send + 'static,
  {
    self.subscribe_with(OutcomeObserver {
      on_success: Some(on_success),
      on_error,
      on_completed: ignore_complete,
    })
  }
}

impl<S: Observable> Maybe<S> {
  /// Exactly one of the callbacks runs. `on_completed` only runs when the
  /// source completed without a value.
  pub fn subscribe_maybe<N, E, C>(self, on_success: N, on_error: E, on_completed: C) -> Subscription
  where
    N: FnOnce(S::Item) + Send + 'static,
    E: FnOnce(S::Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_with(OutcomeObserver { on_success: Some(on_success), on_error, on_completed })
  }
}

impl<S: Observable> Completable<S> {
  pub fn subscribe_completed<C, E>(self, on_completed: C, on_error: E) -> Subscription
  where
    C: FnOnce() + Send + 'static,
    E: FnOnce(S::Err) + Send + 'static,
  {
    self.subscribe_all(|_| {}, on_error, on_completed)
  }
}

struct OutcomeObserver<N, E, C> {
  /// Taken by the first value.
  on_success: Option<N>,
  on_error: E,
  on_completed: C,
}

impl<Item, Err, N, E, C> Observer<Item, Err> for OutcomeObserver<N, E, C>
where
  N: FnOnce(Item),
  E: FnOnce(Err),
  C: FnOnce(),
{
  fn next(&mut self, value: Item) {
    if let Some(on_success) = self.on_success.take() {
      on_success(value);
    }
  }

  fn error(self, err: Err) { (self.on_error)(err) }

  fn complete(self) {
    if self.on_success.is_some() {
      (self.on_completed)();
    }
  }

  fn is_closed(&self) -> bool { false }
}

// ==================== Count check ====================

/// Holds back the value until completion and fails the stream as soon as a
/// second one arrives.
#[derive(Clone)]
pub struct AtMostOneOp<S> {
  source: S,
  require_value: bool,
}

impl<S> AtMostOneOp<S> {
  pub(crate) fn single(source: S) -> Single<Self> { Single(Self { source, require_value: true }) }

  pub(crate) fn maybe(source: S) -> Maybe<Self> { Maybe(Self { source, require_value: false }) }
}

impl<S: Observable> Observable for AtMostOneOp<S> {
  type Item = S::Item;
  type Err = SingleError<S::Err>;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, SingleError<S::Err>>) {
    let upstream: Subscriber<S::Item, S::Err> = subscriber.chain(AtMostOneObserver {
      observer: subscriber.clone(),
      value: None,
      require_value: self.require_value,
    });
    self.source.actual_subscribe(upstream);
  }
}

pub struct AtMostOneObserver<Item, Err> {
  observer: Subscriber<Item, SingleError<Err>>,
  value: Option<Item>,
  require_value: bool,
}

impl<Item, Err> Observer<Item, Err> for AtMostOneObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.value.is_some() {
      // terminating downstream disposes the upstream chained to it
      self.observer.emit(Signal::Error(SingleError::MoreThanOneElement));
    } else {
      self.value = Some(value);
    }
  }

  fn error(self, err: Err) { self.observer.emit(Signal::Error(SingleError::Source(err))) }

  fn complete(self) {
    match self.value {
      Some(value) => {
        self.observer.emit(Signal::Next(value));
        self.observer.emit(Signal::Completed);
      }
      None if self.require_value => self.observer.emit(Signal::Error(SingleError::NoElements)),
      None => self.observer.emit(Signal::Completed),
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub(crate) fn completable_of<S>(source: S) -> Completable<IgnoreElementsOp<S>> {
  Completable(IgnoreElementsOp::new(source))
}

// ==================== Emitters ====================

/// Handed to the [`single`] subscribe function. Consumed by its outcome.
pub struct SingleEmitter<Item, Err>(Subscriber<Item, Err>);

impl<Item, Err> SingleEmitter<Item, Err> {
  pub fn success(self, value: Item) {
    self.0.emit(Signal::Next(value));
    self.0.emit(Signal::Completed);
  }

  pub fn error(self, err: Err) { self.0.emit(Signal::Error(err)) }

  /// The subscriber went away; any outcome would be dropped.
  pub fn is_disposed(&self) -> bool { self.0.is_closed() }
}

/// Handed to the [`maybe`] subscribe function. Consumed by its outcome.
pub struct MaybeEmitter<Item, Err>(Subscriber<Item, Err>);

impl<Item, Err> MaybeEmitter<Item, Err> {
  pub fn success(self, value: Item) {
    self.0.emit(Signal::Next(value));
    self.0.emit(Signal::Completed);
  }

  pub fn complete(self) { self.0.emit(Signal::Completed) }

  pub fn error(self, err: Err) { self.0.emit(Signal::Error(err)) }

  pub fn is_disposed(&self) -> bool { self.0.is_closed() }
}

/// Handed to the [`completable`] subscribe function. Consumed by its outcome.
pub struct CompletableEmitter<Err>(Subscriber<Infallible, Err>);

impl<Err> CompletableEmitter<Err> {
  pub fn complete(self) { self.0.emit(Signal::Completed) }

  pub fn error(self, err: Err) { self.0.emit(Signal::Error(err)) }

  pub fn is_disposed(&self) -> bool { self.0.is_closed() }
}

/// A [`Single`] from a subscribe function, in the manner of
/// [`create`](crate::observable::create). The emitter can report one
/// outcome only.
pub fn single<F, D, Item, Err>(subscribe: F) -> Single<impl Observable<Item = Item, Err = Err>>
where
  F: Fn(SingleEmitter<Item, Err>) -> D + Send + Sync + 'static,
  D: Disposable + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  Single(create(move |subscriber: Subscriber<Item, Err>| subscribe(SingleEmitter(subscriber))))
}

/// A [`Maybe`] from a subscribe function.
pub fn maybe<F, D, Item, Err>(subscribe: F) -> Maybe<impl Observable<Item = Item, Err = Err>>
where
  F: Fn(MaybeEmitter<Item, Err>) -> D + Send + Sync + 'static,
  D: Disposable + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  Maybe(create(move |subscriber: Subscriber<Item, Err>| subscribe(MaybeEmitter(subscriber))))
}

/// A [`Completable`] from a subscribe function.
pub fn completable<F, D, Err>(subscribe: F) -> Completable<impl Observable<Item = Infallible, Err = Err>>
where
  F: Fn(CompletableEmitter<Err>) -> D + Send + Sync + 'static,
  D: Disposable + Send + 'static,
  Err: Send + 'static,
{
  Completable(create(move |subscriber: Subscriber<Infallible, Err>| {
    subscribe(CompletableEmitter(subscriber))
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  type Outcome = Arc<Mutex<Vec<String>>>;

  fn single_outcome<S>(single: Single<S>) -> Outcome
  where
    S: Observable<Item = i32, Err = SingleError<()>>,
  {
    let log: Outcome = Arc::new(Mutex::new(vec![]));
    let (l1, l2) = (log.clone(), log.clone());
    single.subscribe_success(
      move |v| l1.lock().push(format!("success {v}")),
      move |e| l2.lock().push(format!("error {e}")),
    );
    log
  }

  #[test]
  fn as_single_passes_exactly_one_value() {
    let log = single_outcome(observable::just::<_, ()>(7).as_single());
    assert_eq!(*log.lock(), vec!["success 7"]);
  }

  #[test]
  fn as_single_fails_on_empty() {
    let log = single_outcome(observable::empty::<i32, ()>().as_single());
    assert_eq!(*log.lock(), vec!["error sequence contains no elements"]);
  }

  #[test]
  fn as_single_fails_on_the_second_value() {
    let subject = PublishSubject::<i32, ()>::new();
    let log = single_outcome(subject.clone().as_single());
    subject.on_next(1);
    assert!(log.lock().is_empty());
    subject.on_next(2);
    assert_eq!(*log.lock(), vec!["error sequence contains more than one element"]);
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn as_single_wraps_source_errors() {
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    observable::throw_err::<i32, _>("down")
      .as_single()
      .subscribe_success(|_| {}, move |err| *e.lock() = Some(err));
    assert_eq!(*error.lock(), Some(SingleError::Source("down")));
  }

  #[test]
  fn maybe_runs_exactly_one_callback() {
    let outcome = |source: BoxedObservable<i32, ()>| {
      let log: Outcome = Arc::new(Mutex::new(vec![]));
      let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
      source.as_maybe().subscribe_maybe(
        move |v| l1.lock().push(format!("success {v}")),
        move |e| l2.lock().push(format!("error {e}")),
        move || l3.lock().push("completed".to_string()),
      );
      let log = log.lock().clone();
      log
    };

    assert_eq!(outcome(observable::just(1).box_it()), vec!["success 1"]);
    assert_eq!(outcome(observable::empty().box_it()), vec!["completed"]);
    assert_eq!(
      outcome(observable::from_iter(vec![1, 2]).box_it()),
      vec!["error sequence contains more than one element"]
    );
  }

  #[test]
  fn single_from_emitter_retries_until_success() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let value = Arc::new(Mutex::new(None));
    let v = value.clone();
    observable::single(move |emitter: SingleEmitter<&'static str, &'static str>| {
      if c.fetch_add(1, Ordering::SeqCst) == 3 {
        emitter.success("success");
      } else {
        emitter.error("unknown");
      }
    })
    .retry(3)
    .as_single()
    .subscribe_success(move |s| *v.lock() = Some(s), |_| {});

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(*value.lock(), Some("success"));
  }

  #[test]
  fn maybe_emitter_may_complete_empty() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    observable::maybe(|emitter: MaybeEmitter<String, ()>| emitter.complete()).subscribe_maybe(
      |v| panic!("unexpected value {v}"),
      |_| {},
      move || *c.lock() = true,
    );
    assert!(*completed.lock());
  }

  #[test]
  fn completable_reports_the_outcome_only() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    observable::completable(|emitter: CompletableEmitter<()>| emitter.complete())
      .subscribe_completed(move || *c.lock() = true, |_| {});
    assert!(*completed.lock());

    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    observable::from_iter::<_, &str>(0..3)
      .as_completable()
      .subscribe_completed(|| {}, move |err| *e.lock() = Some(err));
    assert!(error.lock().is_none());

    observable::completable(|emitter: CompletableEmitter<&'static str>| emitter.error("failed"))
      .subscribe_completed(|| {}, {
        let e = error.clone();
        move |err| *e.lock() = Some(err)
      });
    assert_eq!(*error.lock(), Some("failed"));
  }
}
