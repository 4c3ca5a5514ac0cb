//! Observable trait, the chainable operator surface and the constructors.
//!
//! An [`Observable`] is an immutable description of how to produce a stream
//! of signals. Subscribing runs that description again for every subscriber
//! (cold semantics) unless the source is a subject or the result of
//! [`ObservableExt::share`].
//!
//! ```rust
//! use rxkit::prelude::*;
//!
//! let sum = std::sync::Arc::new(parking_lot::Mutex::new(0));
//! let s = sum.clone();
//! observable::from_iter::<_, ()>(1..=4)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 10)
//!   .subscribe(move |v| *s.lock() += v);
//! assert_eq!(*sum.lock(), 60);
//! ```

use std::{fmt::Debug, time::Duration};

use crate::{
  observer::{ignore_complete, unhandled_error, FnObserver, Observer},
  ops::{
    catch_error::CatchErrorOp,
    combine_latest::CombineLatestOp,
    concat::Concat,
    debug::DebugOp,
    delay::DelayOp,
    enumerate::EnumerateOp,
    filter::FilterOp,
    flat_map::FlatMapOp,
    flat_map_latest::{identity, FlatMapLatestOp},
    ignore_elements::IgnoreElementsOp,
    map::MapOp,
    merge::Merge,
    observe_on::ObserveOnOp,
    retry::RetryOp,
    retry_backoff::{RetryPolicy, RetryWithBackoffOp},
    retry_when::RetryWhenOp,
    share::ShareOp,
    single::{completable_of, AtMostOneOp, Completable, Maybe, Single},
    skip::SkipOp,
    start_with::StartWithOp,
    take::TakeOp,
    throttle::{ThrottleEdge, ThrottleOp},
    with_latest_from::WithLatestFromOp,
    zip::ZipOp,
  },
  scheduler::Scheduler,
  subscriber::Subscriber,
  subscription::Subscription,
};

mod boxed;
mod create;
mod defer;
mod from_iter;
mod timer;
mod trivial;

pub use boxed::{BoxedObservable, DynObservable};
pub use create::{create, Create};
pub use defer::{defer, Defer};
pub use from_iter::{from_iter, just, of, FromIter, Just};
pub use timer::{interval, interval_at, timer, Interval, Timer};
pub use trivial::{empty, never, throw_err, Empty, Never, ThrowErr};

pub use crate::ops::{
  concat::concat_all,
  merge::merge_all,
  single::{completable, maybe, single},
};

/// A source of `Item` values that may fail with `Err`.
///
/// Implementors only provide [`actual_subscribe`](Self::actual_subscribe):
/// push signals into the given [`Subscriber`] and tie any resources to it
/// with [`Subscriber::add`]. Everything else comes from [`ObservableExt`].
pub trait Observable: Clone + Send + Sync + 'static {
  type Item: Send + 'static;
  type Err: Send + 'static;

  fn actual_subscribe(&self, subscriber: Subscriber<Self::Item, Self::Err>);
}

/// Operators and the subscribe family, available on every [`Observable`].
pub trait ObservableExt: Observable {
  /// Subscribes with a `next` handler only. An error that reaches this
  /// subscription is logged and dropped.
  fn subscribe<N>(self, next: N) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
  {
    self.subscribe_with(FnObserver::new(next, unhandled_error::<Self::Err>, ignore_complete))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
  {
    self.subscribe_with(FnObserver::new(next, error, ignore_complete))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Subscription
  where
    N: FnMut(Self::Item) + Send + 'static,
    E: FnOnce(Self::Err) + Send + 'static,
    C: FnOnce() + Send + 'static,
  {
    self.subscribe_with(FnObserver::new(next, error, complete))
  }

  /// Subscribes any [`Observer`]. The returned handle stops delivery as soon
  /// as it is disposed.
  fn subscribe_with<O>(self, observer: O) -> Subscription
  where
    O: Observer<Self::Item, Self::Err> + Send + 'static,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = subscriber.subscription().clone();
    self.actual_subscribe(subscriber);
    subscription
  }

  /// Erases the concrete operator type.
  fn box_it(self) -> BoxedObservable<Self::Item, Self::Err> { BoxedObservable::new(self) }

  /// Transforms every value with `f`.
  fn map<B, F>(self, f: F) -> MapOp<Self, F>
  where
    F: Fn(Self::Item) -> B + Send + Sync + 'static,
    B: Send + 'static,
  {
    MapOp::new(self, f)
  }

  /// Keeps the values for which `predicate` returns `true`.
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: Fn(&Self::Item) -> bool + Send + Sync + 'static,
  {
    FilterOp::new(self, predicate)
  }

  /// Interleaves the values of `self` and `other` in arrival order.
  ///
  /// Fails fast on the first error; completes once both have completed.
  fn merge<S>(self, other: S) -> Merge<BoxedObservable<Self::Item, Self::Err>>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    Merge::new(vec![self.box_it(), other.box_it()])
  }

  /// Emits all of `self`, then subscribes `other`.
  fn concat<S>(self, other: S) -> Concat<BoxedObservable<Self::Item, Self::Err>>
  where
    S: Observable<Item = Self::Item, Err = Self::Err>,
  {
    Concat::new(vec![self.box_it(), other.box_it()])
  }

  /// Pairs values of `self` and `other` by position.
  fn zip<S>(self, other: S) -> ZipOp<Self, S>
  where
    S: Observable<Err = Self::Err>,
  {
    ZipOp::new(self, other)
  }

  /// Combines the latest value of each side with `binary_op` whenever either
  /// side emits, once both have emitted at least once.
  ///
  /// Pass `|a, b| (a, b)` to get the latest-value tuple itself.
  fn combine_latest<S, BinaryOp, OutputItem>(
    self, other: S, binary_op: BinaryOp,
  ) -> CombineLatestOp<Self, S, BinaryOp>
  where
    S: Observable<Err = Self::Err>,
    Self::Item: Clone,
    S::Item: Clone,
    BinaryOp: Fn(Self::Item, S::Item) -> OutputItem + Send + Sync + 'static,
    OutputItem: Send + 'static,
  {
    CombineLatestOp::new(self, other, binary_op)
  }

  /// Pairs every value of `self` with the latest value of `other`. Values of
  /// `self` that arrive before `other` has emitted are dropped.
  fn with_latest_from<S>(self, other: S) -> WithLatestFromOp<Self, S>
  where
    S: Observable<Err = Self::Err>,
    S::Item: Clone,
  {
    WithLatestFromOp::new(self, other)
  }

  /// Maps each value to an inner observable and merges all of them.
  fn flat_map<Inner, F>(self, f: F) -> FlatMapOp<Self, F>
  where
    F: Fn(Self::Item) -> Inner + Send + Sync + 'static,
    Inner: Observable<Err = Self::Err>,
  {
    FlatMapOp::new(self, f)
  }

  /// Maps each value to an inner observable, keeping only the newest inner
  /// subscription alive.
  fn flat_map_latest<Inner, F>(self, f: F) -> FlatMapLatestOp<Self, F>
  where
    F: Fn(Self::Item) -> Inner + Send + Sync + 'static,
    Inner: Observable<Err = Self::Err>,
  {
    FlatMapLatestOp::new(self, f)
  }

  /// Flattens an observable of observables, following only the newest one.
  fn switch_latest(self) -> FlatMapLatestOp<Self, fn(Self::Item) -> Self::Item>
  where
    Self::Item: Observable<Err = Self::Err>,
  {
    FlatMapLatestOp::new(self, identity::<Self::Item> as fn(Self::Item) -> Self::Item)
  }

  /// Replaces an upstream error with the observable returned by `f`.
  fn catch_error<R, F>(self, f: F) -> CatchErrorOp<Self, F>
  where
    F: Fn(Self::Err) -> R + Send + Sync + 'static,
    R: Observable<Item = Self::Item>,
  {
    CatchErrorOp::new(self, f)
  }

  /// Replaces an upstream error with a single `value` followed by completion.
  fn catch_error_just_return(
    self, value: Self::Item,
  ) -> impl Observable<Item = Self::Item, Err = Self::Err>
  where
    Self::Item: Clone + Sync,
  {
    self.catch_error(move |_| just::<Self::Item, Self::Err>(value.clone()))
  }

  /// Resubscribes up to `count` extra times after an error.
  fn retry(self, count: usize) -> RetryOp<Self> { RetryOp::new(self, count) }

  /// Lets `notifier` decide when to resubscribe.
  ///
  /// `notifier` receives the stream of upstream errors and returns a
  /// trigger: each trigger value resubscribes, a trigger error is forwarded
  /// downstream and trigger completion completes the result.
  fn retry_when<T, F>(self, notifier: F) -> RetryWhenOp<Self, F>
  where
    F: Fn(BoxedObservable<Self::Err, Self::Err>) -> T + Send + Sync + 'static,
    T: Observable<Err = Self::Err>,
    Self::Err: Clone,
  {
    RetryWhenOp::new(self, notifier)
  }

  /// Resubscribes after policy-driven delays until the policy gives up or the
  /// retry budget runs out.
  fn retry_with_backoff<P, Sch>(self, policy: P, scheduler: Sch) -> RetryWithBackoffOp<Self, P, Sch>
  where
    P: RetryPolicy<Self::Err>,
    Sch: Scheduler,
  {
    RetryWithBackoffOp::new(self, policy, scheduler)
  }

  /// Shares a single upstream subscription among all subscribers.
  ///
  /// The upstream is connected by the first subscriber and disconnected when
  /// the last one leaves; a later subscriber connects again.
  fn share(self) -> ShareOp<Self>
  where
    Self::Item: Clone,
    Self::Err: Clone,
  {
    ShareOp::new(self)
  }

  /// Emits the first `count` values, then completes.
  fn take(self, count: usize) -> TakeOp<Self> { TakeOp::new(self, count) }

  /// Drops the first `count` values.
  fn skip(self, count: usize) -> SkipOp<Self> { SkipOp::new(self, count) }

  /// Pairs every value with its zero-based position.
  fn enumerate(self) -> EnumerateOp<Self> { EnumerateOp::new(self) }

  /// Emits `value` before anything from upstream.
  fn start_with(self, value: Self::Item) -> StartWithOp<Self>
  where
    Self::Item: Clone + Sync,
  {
    StartWithOp::new(self, value)
  }

  /// Shifts values and completion by `delay` on `scheduler`. Errors are not
  /// delayed.
  fn delay<Sch: Scheduler>(self, delay: Duration, scheduler: Sch) -> DelayOp<Self, Sch> {
    DelayOp::new(self, delay, scheduler)
  }

  /// Delivers every signal through `scheduler`.
  fn observe_on<Sch: Scheduler>(self, scheduler: Sch) -> ObserveOnOp<Self, Sch> {
    ObserveOnOp::new(self, scheduler)
  }

  /// Emits at most one value per `duration` window: the value opening the
  /// window right away and the latest one seen during it when it closes.
  fn throttle<Sch: Scheduler>(self, duration: Duration, scheduler: Sch) -> ThrottleOp<Self, Sch> {
    ThrottleOp::new(self, duration, ThrottleEdge::all(), scheduler)
  }

  /// [`throttle`](Self::throttle) with a chosen [`ThrottleEdge`].
  fn throttle_edge<Sch: Scheduler>(
    self, duration: Duration, edge: ThrottleEdge, scheduler: Sch,
  ) -> ThrottleOp<Self, Sch> {
    ThrottleOp::new(self, duration, edge, scheduler)
  }

  /// Drops every value; only the terminal signal passes.
  fn ignore_elements(self) -> IgnoreElementsOp<Self> { IgnoreElementsOp::new(self) }

  /// A [`Single`]: fails with
  /// [`SingleError::NoElements`](crate::error::SingleError::NoElements) or
  /// [`SingleError::MoreThanOneElement`](crate::error::SingleError::MoreThanOneElement)
  /// unless exactly one value arrives before completion.
  fn as_single(self) -> Single<AtMostOneOp<Self>> { AtMostOneOp::single(self) }

  /// A [`Maybe`]: like [`as_single`](Self::as_single) but completing empty
  /// is fine.
  fn as_maybe(self) -> Maybe<AtMostOneOp<Self>> { AtMostOneOp::maybe(self) }

  /// A [`Completable`] that ignores the values.
  fn as_completable(self) -> Completable<IgnoreElementsOp<Self>> { completable_of(self) }

  /// Logs every signal, subscription and disposal at `debug` level.
  fn debug(self, label: &'static str) -> DebugOp<Self>
  where
    Self::Item: Debug,
    Self::Err: Debug,
  {
    DebugOp::new(self, label)
  }

  /// Converts into a `futures::Stream` of `Result<Item, Err>`.
  #[cfg(feature = "stream")]
  fn into_stream(self) -> crate::ops::into_stream::IntoStream<Self::Item, Self::Err> {
    crate::ops::into_stream::IntoStream::new(self)
  }
}

impl<T: Observable> ObservableExt for T {}
