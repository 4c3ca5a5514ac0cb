use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Emits only the first `count` values emitted by the source Observable.
///
/// If the source emits fewer than `count` values then all of its values are
/// emitted. After that, it completes, regardless if the source completes, and
/// the upstream subscription is released.
///
/// # Example
///
/// ```
/// use rxkit::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).take(5).subscribe(|v| println!("{}", v));
///
/// // print logs:
/// // 0
/// // 1
/// // 2
/// // 3
/// // 4
/// ```
#[derive(Clone)]
pub struct TakeOp<S> {
  source: S,
  count: usize,
}

impl<S> TakeOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Self { source, count } }
}

impl<S: Observable> Observable for TakeOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    if self.count == 0 {
      subscriber.complete();
      return;
    }
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(TakeObserver { observer: subscriber.clone(), remaining: self.count });
    self.source.actual_subscribe(upstream);
  }
}

pub struct TakeObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  remaining: usize,
}

impl<Item, Err> Observer<Item, Err> for TakeObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      return;
    }
    self.remaining -= 1;
    self.observer.next(value);
    if self.remaining == 0 {
      self.observer.clone().complete();
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.remaining == 0 || self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn base_function() {
    let completed = Arc::new(AtomicUsize::new(0));
    let next_count = Arc::new(AtomicUsize::new(0));
    let (c, n) = (completed.clone(), next_count.clone());

    observable::from_iter::<_, ()>(0..100).take(5).subscribe_all(
      move |_| {
        n.fetch_add(1, Ordering::SeqCst);
      },
      |_| {},
      move || {
        c.fetch_add(1, Ordering::SeqCst);
      },
    );

    assert_eq!(completed.load(Ordering::SeqCst), 1);
    assert_eq!(next_count.load(Ordering::SeqCst), 5);
  }

  #[test]
  fn take_zero_completes_without_subscribing() {
    let subject = PublishSubject::<i32, ()>::new();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    subject
      .clone()
      .take(0)
      .subscribe_all(|_| {}, |_| {}, move || *c.lock() = true);
    assert!(*completed.lock());
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn releases_hot_source() {
    let subject = PublishSubject::<i32, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    subject.clone().take(2).subscribe(move |v| s.lock().push(v));

    subject.on_next(1);
    assert_eq!(subject.observer_count(), 1);
    subject.on_next(2);
    subject.on_next(3);
    assert_eq!(*seen.lock(), vec![1, 2]);
    assert_eq!(subject.observer_count(), 0);
  }

  #[test]
  fn stops_infinite_source() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter::<_, ()>(0..).take(3).subscribe(move |v| s.lock().push(v));
    assert_eq!(*seen.lock(), vec![0, 1, 2]);
  }
}
