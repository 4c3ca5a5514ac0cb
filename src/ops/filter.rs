use std::sync::Arc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Created by [`ObservableExt::filter`](crate::observable::ObservableExt::filter).
pub struct FilterOp<S, F> {
  source: S,
  filter: Arc<F>,
}

impl<S, F> FilterOp<S, F> {
  pub(crate) fn new(source: S, filter: F) -> Self { Self { source, filter: Arc::new(filter) } }
}

impl<S: Clone, F> Clone for FilterOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), filter: self.filter.clone() } }
}

impl<S, F> Observable for FilterOp<S, F>
where
  S: Observable,
  F: Fn(&S::Item) -> bool + Send + Sync + 'static,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(FilterObserver { observer: subscriber.clone(), filter: self.filter.clone() });
    self.source.actual_subscribe(upstream);
  }
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: Arc<F>,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: Fn(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

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
  fn keeps_matching_values_in_order() {
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (s, c) = (seen.clone(), completed.clone());
    observable::from_iter::<_, ()>(0..10)
      .filter(|v| v % 3 == 0)
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);

    assert_eq!(*seen.lock(), vec![0, 3, 6, 9]);
    assert!(*completed.lock());
  }

  #[test]
  fn filter_on_subject() {
    let subject = PublishSubject::<i32, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    subject
      .clone()
      .filter(|v| *v > 1)
      .subscribe(move |v| s.lock().push(v));

    subject.on_next(1);
    subject.on_next(2);
    subject.on_next(3);
    assert_eq!(*seen.lock(), vec![2, 3]);
  }
}
