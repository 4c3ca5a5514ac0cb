use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Created by [`ObservableExt::flat_map`](crate::observable::ObservableExt::flat_map).
///
/// Every inner observable stays subscribed until it terminates; their values
/// are interleaved in arrival order. Completes once the source and every
/// inner observable have completed.
pub struct FlatMapOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> FlatMapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for FlatMapOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, F, Inner> Observable for FlatMapOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> Inner + Send + Sync + 'static,
  Inner: Observable<Err = S::Err>,
{
  type Item = Inner::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Inner::Item, S::Err>) {
    let outer: Subscriber<S::Item, S::Err> = subscriber.chain(FlatMapObserver {
      observer: subscriber.clone(),
      func: self.func.clone(),
      active: Arc::new(AtomicUsize::new(1)),
    });
    self.source.actual_subscribe(outer);
  }
}

pub struct FlatMapObserver<Item, Err, F> {
  observer: Subscriber<Item, Err>,
  func: Arc<F>,
  /// Live inner subscriptions plus one for the source itself.
  active: Arc<AtomicUsize>,
}

impl<Item, OutItem, Err, F, Inner> Observer<Item, Err> for FlatMapObserver<OutItem, Err, F>
where
  OutItem: Send + 'static,
  Err: Send + 'static,
  F: Fn(Item) -> Inner,
  Inner: Observable<Item = OutItem, Err = Err>,
{
  fn next(&mut self, value: Item) {
    let inner = (self.func)(value);
    self.active.fetch_add(1, Ordering::AcqRel);
    let upstream: Subscriber<OutItem, Err> = self
      .observer
      .chain(InnerObserver { observer: self.observer.clone(), active: self.active.clone() });
    inner.actual_subscribe(upstream);
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

pub struct InnerObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  active: Arc<AtomicUsize>,
}

impl<Item, Err> Observer<Item, Err> for InnerObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.active.fetch_sub(1, Ordering::AcqRel) == 1 {
      self.observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
