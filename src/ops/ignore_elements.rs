use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Drops every value, keeping only the terminal signal.
#[derive(Clone)]
pub struct IgnoreElementsOp<S> {
  source: S,
}

impl<S> IgnoreElementsOp<S> {
  pub(crate) fn new(source: S) -> Self { Self { source } }
}

impl<S: Observable> Observable for IgnoreElementsOp<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(IgnoreElementsObserver { observer: subscriber.clone() });
    self.source.actual_subscribe(upstream);
  }
}

pub struct IgnoreElementsObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
}

impl<Item, Err> Observer<Item, Err> for IgnoreElementsObserver<Item, Err> {
  fn next(&mut self, _value: Item) {}

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn only_the_terminal_signal_passes() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    observable::from_iter::<_, ()>(0..20)
      .ignore_elements()
      .subscribe_all(|v| panic!("unexpected value {v}"), |_| {}, move || *c.lock() = true);
    assert!(*completed.lock());
  }

  #[test]
  fn errors_pass() {
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    observable::throw_err::<i32, _>("broken")
      .ignore_elements()
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));
    assert_eq!(*error.lock(), Some("broken"));
  }
}
