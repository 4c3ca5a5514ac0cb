use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Ignore the first `count` values emitted by the source Observable.
///
/// If the source emits fewer than `count` values, nothing is emitted and the
/// result completes together with the source.
///
/// # Example
///
/// ```
/// use rxkit::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).skip(5).subscribe(|v| println!("{}", v));
///
/// // print logs:
/// // 5
/// // 6
/// // 7
/// // 8
/// // 9
/// ```
#[derive(Clone)]
pub struct SkipOp<S> {
  source: S,
  count: usize,
}

impl<S> SkipOp<S> {
  pub(crate) fn new(source: S, count: usize) -> Self { Self { source, count } }
}

impl<S: Observable> Observable for SkipOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(SkipObserver { observer: subscriber.clone(), remaining: self.count });
    self.source.actual_subscribe(upstream);
  }
}

pub struct SkipObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  remaining: usize,
}

impl<Item, Err> Observer<Item, Err> for SkipObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    if self.remaining == 0 {
      self.observer.next(value);
    } else {
      self.remaining -= 1;
    }
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
