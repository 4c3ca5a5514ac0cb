use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Pairs every value with its zero-based position in the sequence.
///
/// The counter is per subscription, so every subscriber starts at `0`.
#[derive(Clone)]
pub struct EnumerateOp<S> {
  source: S,
}

impl<S> EnumerateOp<S> {
  pub(crate) fn new(source: S) -> Self { Self { source } }
}

impl<S: Observable> Observable for EnumerateOp<S> {
  type Item = (usize, S::Item);
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Self::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(EnumerateObserver { observer: subscriber.clone(), index: 0 });
    self.source.actual_subscribe(upstream);
  }
}

pub struct EnumerateObserver<Item, Err> {
  observer: Subscriber<(usize, Item), Err>,
  index: usize,
}

impl<Item, Err> Observer<Item, Err> for EnumerateObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    let index = self.index;
    self.index += 1;
    self.observer.next((index, value));
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
