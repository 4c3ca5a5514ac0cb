use std::collections::VecDeque;

use super::subject_core::{Replay, SubjectCore};

/// A subject that replays buffered values to every new subscriber.
///
/// A bounded subject keeps the newest `capacity` values; once full, each new
/// value evicts the oldest. `ReplaySubject::new(0)` keeps nothing and acts
/// like a [`PublishSubject`](crate::subject::PublishSubject).
///
/// ```rust
/// use rxkit::prelude::*;
///
/// let subject = ReplaySubject::<i32, ()>::new(2);
/// (1..=4).for_each(|v| subject.on_next(v));
///
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let s = seen.clone();
/// subject.clone().subscribe(move |v| s.lock().push(v));
/// assert_eq!(*seen.lock(), vec![3, 4]);
/// ```
pub struct ReplaySubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  /// Replays at most the last `capacity` values.
  pub fn new(capacity: usize) -> Self {
    let values = VecDeque::with_capacity(capacity.min(64));
    Self { core: SubjectCore::new(Replay::Buffer { capacity: Some(capacity), values }) }
  }

  /// Replays every value ever pushed.
  pub fn unbounded() -> Self {
    Self { core: SubjectCore::new(Replay::Buffer { capacity: None, values: VecDeque::new() }) }
  }
}

impl_subject!(ReplaySubject);

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  fn collect(subject: &ReplaySubject<i32, ()>) -> Arc<Mutex<Vec<i32>>> {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    subject.clone().subscribe(move |v| s.lock().push(v));
    seen
  }

  #[test]
  fn replays_buffer_then_live_values() {
    let subject = ReplaySubject::<i32, ()>::new(2);
    subject.on_next(1);
    subject.on_next(2);
    subject.on_next(3);
    let seen = collect(&subject);
    subject.on_next(4);
    assert_eq!(*seen.lock(), vec![2, 3, 4]);
  }

  #[test]
  fn unbounded_keeps_everything() {
    let subject = ReplaySubject::<i32, ()>::unbounded();
    (0..100).for_each(|v| subject.on_next(v));
    let seen = collect(&subject);
    assert_eq!(*seen.lock(), (0..100).collect::<Vec<_>>());
  }

  #[test]
  fn zero_capacity_behaves_like_publish() {
    let subject = ReplaySubject::<i32, ()>::new(0);
    subject.on_next(1);
    let seen = collect(&subject);
    subject.on_next(2);
    assert_eq!(*seen.lock(), vec![2]);
  }

  #[test]
  fn late_subscriber_after_completion_only_completes() {
    let subject = ReplaySubject::<i32, ()>::new(3);
    subject.on_next(1);
    subject.on_completed();
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    subject.subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);
    assert!(seen.lock().is_empty());
    assert!(*completed.lock());
  }
}
