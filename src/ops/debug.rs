use std::fmt::Debug;

use tracing::debug;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Logs every signal passing through, plus subscription and release, with
/// `tracing::debug!` under `label`.
#[derive(Clone)]
pub struct DebugOp<S> {
  source: S,
  label: &'static str,
}

impl<S> DebugOp<S> {
  pub(crate) fn new(source: S, label: &'static str) -> Self { Self { source, label } }
}

impl<S> Observable for DebugOp<S>
where
  S: Observable,
  S::Item: Debug,
  S::Err: Debug,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let label = self.label;
    debug!(label, "subscribed");
    subscriber.add_teardown(move || debug!(label, "released"));
    let upstream: Subscriber<S::Item, S::Err> =
      subscriber.chain(DebugObserver { observer: subscriber.clone(), label });
    self.source.actual_subscribe(upstream);
  }
}

pub struct DebugObserver<Item, Err> {
  observer: Subscriber<Item, Err>,
  label: &'static str,
}

impl<Item: Debug, Err: Debug> Observer<Item, Err> for DebugObserver<Item, Err> {
  fn next(&mut self, value: Item) {
    debug!(label = self.label, ?value, "next");
    self.observer.next(value)
  }

  fn error(self, err: Err) {
    debug!(label = self.label, ?err, "error");
    self.observer.error(err)
  }

  fn complete(self) {
    debug!(label = self.label, "completed");
    self.observer.complete()
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn is_transparent() {
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (s, c) = (seen.clone(), completed.clone());
    observable::from_iter::<_, ()>(vec!["a", "b"])
      .debug("letters")
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);
    assert_eq!(*seen.lock(), vec!["a", "b"]);
    assert!(*completed.lock());
  }
}
