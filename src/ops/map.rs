use std::sync::Arc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Created by [`ObservableExt::map`](crate::observable::ObservableExt::map).
pub struct MapOp<S, F> {
  source: S,
  func: Arc<F>,
}

impl<S, F> MapOp<S, F> {
  pub(crate) fn new(source: S, func: F) -> Self { Self { source, func: Arc::new(func) } }
}

impl<S: Clone, F> Clone for MapOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), func: self.func.clone() } }
}

impl<S, F, B> Observable for MapOp<S, F>
where
  S: Observable,
  F: Fn(S::Item) -> B + Send + Sync + 'static,
  B: Send + 'static,
{
  type Item = B;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<B, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(MapObserver { observer: subscriber.clone(), func: self.func.clone() });
    self.source.actual_subscribe(upstream);
  }
}

pub struct MapObserver<O, F> {
  observer: O,
  func: Arc<F>,
}

impl<Item, Err, O, F, B> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: Fn(Item) -> B,
{
  fn next(&mut self, value: Item) { self.observer.next((self.func)(value)) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn primitive_type() {
    let i = Arc::new(Mutex::new(0));
    let c = i.clone();
    observable::from_iter::<_, ()>(100..101)
      .map(|v| v * 2)
      .subscribe(move |v| *c.lock() += v);
    assert_eq!(*i.lock(), 200);
  }

  #[test]
  fn map_types_mixed() {
    let i = Arc::new(Mutex::new(0));
    let c = i.clone();
    observable::from_iter::<_, ()>(vec!['a', 'b', 'c'])
      .map(|_| 1)
      .subscribe(move |v| *c.lock() += v);
    assert_eq!(*i.lock(), 3);
  }

  #[test]
  fn error_passes_through() {
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    observable::throw_err::<i32, _>("bad")
      .map(|v| v + 1)
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));
    assert_eq!(*error.lock(), Some("bad"));
  }

  #[test]
  fn map_can_be_shared_across_subscriptions() {
    let mapped = observable::from_iter::<_, ()>(0..3).map(|v| v + 1);
    let seen = Arc::new(Mutex::new(vec![]));
    for _ in 0..2 {
      let seen = seen.clone();
      mapped.clone().subscribe(move |v| seen.lock().push(v));
    }
    assert_eq!(*seen.lock(), vec![1, 2, 3, 1, 2, 3]);
  }
}
