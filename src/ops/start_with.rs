use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Emits `value` to every new subscriber before subscribing the source.
///
/// ```
/// use rxkit::prelude::*;
///
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let s = seen.clone();
/// observable::from_iter::<_, ()>(vec![2, 3])
///   .start_with(1)
///   .subscribe(move |v| s.lock().push(v));
/// assert_eq!(*seen.lock(), vec![1, 2, 3]);
/// ```
pub struct StartWithOp<S: Observable> {
  source: S,
  value: S::Item,
}

impl<S: Observable> StartWithOp<S> {
  pub(crate) fn new(source: S, value: S::Item) -> Self { Self { source, value } }
}

impl<S> Clone for StartWithOp<S>
where
  S: Observable,
  S::Item: Clone,
{
  fn clone(&self) -> Self { Self { source: self.source.clone(), value: self.value.clone() } }
}

impl<S> Observable for StartWithOp<S>
where
  S: Observable,
  S::Item: Clone + Sync,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, mut subscriber: Subscriber<S::Item, S::Err>) {
    subscriber.next(self.value.clone());
    if subscriber.is_closed() {
      return;
    }
    self.source.actual_subscribe(subscriber);
  }
}
