use crate::{observer::Observer, subscriber::Subscriber};

/// Subscribers container with ID-based removal.
///
/// Insertion order is delivery order. Broadcasting works on a snapshot taken
/// under the subject lock and runs after the lock is released, so observers
/// may subscribe, unsubscribe or emit into the subject from their callbacks.
pub(crate) struct Subscribers<Item, Err> {
  next_id: usize,
  inner: Vec<(usize, Subscriber<Item, Err>)>,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { next_id: 0, inner: Vec::new() } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add a subscriber and return its unique ID.
  pub(crate) fn add(&mut self, subscriber: Subscriber<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.inner.push((id, subscriber));
    id
  }

  pub(crate) fn remove(&mut self, id: usize) -> Option<Subscriber<Item, Err>> {
    let index = self.inner.iter().position(|(i, _)| *i == id)?;
    Some(self.inner.remove(index).1)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.inner.len() }

  /// Clones of the current subscribers, in subscription order.
  pub(crate) fn snapshot(&self) -> Vec<Subscriber<Item, Err>> {
    self.inner.iter().map(|(_, s)| s.clone()).collect()
  }

  /// Removes every subscriber, handing them over for a terminal broadcast.
  pub(crate) fn drain(&mut self) -> Vec<Subscriber<Item, Err>> {
    self.inner.drain(..).map(|(_, s)| s).collect()
  }
}

/// Delivers `value` to every subscriber: `n - 1` clones and one move.
pub(crate) fn broadcast_value<Item: Clone, Err>(subscribers: Vec<Subscriber<Item, Err>>, value: Item) {
  let mut iter = subscribers.into_iter().peekable();
  while let Some(mut subscriber) = iter.next() {
    if iter.peek().is_some() {
      subscriber.next(value.clone());
    } else {
      subscriber.next(value);
      break;
    }
  }
}

pub(crate) fn broadcast_error<Item, Err: Clone>(subscribers: Vec<Subscriber<Item, Err>>, err: Err) {
  let mut iter = subscribers.into_iter().peekable();
  while let Some(subscriber) = iter.next() {
    if iter.peek().is_some() {
      subscriber.error(err.clone());
    } else {
      subscriber.error(err);
      break;
    }
  }
}

pub(crate) fn broadcast_complete<Item, Err>(subscribers: Vec<Subscriber<Item, Err>>) {
  for subscriber in subscribers {
    subscriber.complete();
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use super::*;
  use crate::observer::FnObserver;

  fn recording(log: &Arc<Mutex<Vec<(usize, i32)>>>, tag: usize) -> Subscriber<i32, ()> {
    let log = log.clone();
    Subscriber::new(FnObserver::new(move |v: i32| log.lock().push((tag, v)), |_: ()| {}, || {}))
  }

  #[test]
  fn broadcast_in_subscription_order() {
    let log = Arc::new(Mutex::new(vec![]));
    let mut subscribers = Subscribers::default();
    subscribers.add(recording(&log, 0));
    let id = subscribers.add(recording(&log, 1));
    subscribers.add(recording(&log, 2));

    broadcast_value(subscribers.snapshot(), 7);
    assert!(subscribers.remove(id).is_some());
    assert!(subscribers.remove(id).is_none());
    broadcast_value(subscribers.snapshot(), 8);

    assert_eq!(*log.lock(), vec![(0, 7), (1, 7), (2, 7), (0, 8), (2, 8)]);
    assert_eq!(subscribers.len(), 2);
  }

  #[test]
  fn drain_empties_the_list() {
    let log = Arc::new(Mutex::new(vec![]));
    let mut subscribers = Subscribers::default();
    subscribers.add(recording(&log, 0));
    let drained = subscribers.drain();
    assert_eq!(drained.len(), 1);
    assert_eq!(subscribers.len(), 0);
    broadcast_complete(drained);
  }
}
