use std::sync::Arc;

use parking_lot::Mutex;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Pairs every source value with the latest value of another observable.
///
/// This struct is created by the with_latest_from method on
/// [ObservableExt](crate::observable::ObservableExt::with_latest_from). See its
/// documentation for more.
#[derive(Clone)]
pub struct WithLatestFromOp<S, FS> {
  source: S,
  from: FS,
}

impl<S, FS> WithLatestFromOp<S, FS> {
  pub(crate) fn new(source: S, from: FS) -> Self { Self { source, from } }
}

impl<S, FS> Observable for WithLatestFromOp<S, FS>
where
  S: Observable,
  FS: Observable<Err = S::Err>,
  FS::Item: Clone,
{
  type Item = (S::Item, FS::Item);
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Self::Item, S::Err>) {
    let latest = Arc::new(Mutex::new(None));
    let b: Subscriber<FS::Item, S::Err> =
      subscriber.chain(FromObserver { observer: subscriber.clone(), latest: latest.clone() });
    self.from.actual_subscribe(b);
    let a: Subscriber<S::Item, S::Err> =
      subscriber.chain(SourceObserver { observer: subscriber.clone(), latest });
    self.source.actual_subscribe(a);
  }
}

/// Forwards source values paired with the latest `from` value.
pub struct SourceObserver<ItemA, ItemB, Err> {
  observer: Subscriber<(ItemA, ItemB), Err>,
  latest: Arc<Mutex<Option<ItemB>>>,
}

impl<ItemA, ItemB: Clone, Err> Observer<ItemA, Err> for SourceObserver<ItemA, ItemB, Err> {
  fn next(&mut self, value: ItemA) {
    let latest = self.latest.lock().clone();
    if let Some(b) = latest {
      self.observer.next((value, b));
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// Records the latest `from` value. Completion of `from` is not forwarded.
pub struct FromObserver<ItemA, ItemB, Err> {
  observer: Subscriber<(ItemA, ItemB), Err>,
  latest: Arc<Mutex<Option<ItemB>>>,
}

impl<ItemA, ItemB, Err> Observer<ItemB, Err> for FromObserver<ItemA, ItemB, Err> {
  fn next(&mut self, value: ItemB) { *self.latest.lock() = Some(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {}

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn pairs_with_latest_other_value() {
    let source = PublishSubject::<i32, ()>::new();
    let other = PublishSubject::<char, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    source
      .clone()
      .with_latest_from(other.clone())
      .subscribe(move |v| s.lock().push(v));

    source.on_next(0);
    other.on_next('a');
    other.on_next('b');
    source.on_next(1);
    source.on_next(2);
    other.on_next('c');
    source.on_next(3);
    assert_eq!(*seen.lock(), vec![(1, 'b'), (2, 'b'), (3, 'c')]);
  }

  #[test]
  fn other_completion_does_not_complete() {
    let source = PublishSubject::<i32, ()>::new();
    let completed = Arc::new(Mutex::new(false));
    let seen = Arc::new(Mutex::new(vec![]));
    let (s, c) = (seen.clone(), completed.clone());
    source
      .clone()
      .with_latest_from(observable::of(7))
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);

    source.on_next(1);
    assert!(!*completed.lock());
    source.on_completed();
    assert_eq!(*seen.lock(), vec![(1, 7)]);
    assert!(*completed.lock());
  }
}
