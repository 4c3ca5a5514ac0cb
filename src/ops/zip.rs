//! Zip operator implementation
//!
//! Zip combines items from two observables pairwise, emitting a tuple when
//! both sources have emitted a value.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::{BoxedObserver, Observer, Signal},
  subscriber::Subscriber,
};

// ==================== Zip Operator ====================

/// Zip operator
///
/// Combines items from two observables pairwise. It buffers items from each
/// source and emits a tuple `(ItemA, ItemB)` as soon as both buffers hold a
/// value, consuming the oldest value of each. Completes once one side has
/// completed and has no buffered values left to pair. An error from either
/// side is forwarded immediately.
#[derive(Clone)]
pub struct ZipOp<A, B> {
  source_a: A,
  source_b: B,
}

impl<A, B> ZipOp<A, B> {
  pub(crate) fn new(source_a: A, source_b: B) -> Self { Self { source_a, source_b } }
}

// ==================== Shared State ====================

/// Shared state between A and B observers
struct ZipState<ItemA, ItemB> {
  buffer_a: VecDeque<ItemA>,
  buffer_b: VecDeque<ItemB>,
  completed_a: bool,
  completed_b: bool,
}

impl<ItemA, ItemB> ZipState<ItemA, ItemB> {
  /// No more pairs can be formed.
  fn exhausted(&self) -> bool {
    self.completed_a && self.buffer_a.is_empty() || self.completed_b && self.buffer_b.is_empty()
  }
}

type SharedState<ItemA, ItemB> = Arc<Mutex<ZipState<ItemA, ItemB>>>;

type Claim<ItemA, ItemB, Err> = Option<BoxedObserver<(ItemA, ItemB), Err>>;

/// Queues `pair`, and completion once nothing more can pair, while the
/// caller still holds the state lock; pairs therefore leave in the order they
/// were formed even when both sides race.
fn queue_pair<ItemA, ItemB, Err>(
  observer: &Subscriber<(ItemA, ItemB), Err>, state: &ZipState<ItemA, ItemB>, pair: (ItemA, ItemB),
) -> Claim<ItemA, ItemB, Err> {
  let claimed = observer.enqueue(Signal::Next(pair));
  let completion = if state.exhausted() { observer.enqueue(Signal::Completed) } else { None };
  claimed.or(completion)
}

fn queue_completion<ItemA, ItemB, Err>(
  observer: &Subscriber<(ItemA, ItemB), Err>, state: &ZipState<ItemA, ItemB>,
) -> Claim<ItemA, ItemB, Err> {
  if state.exhausted() { observer.enqueue(Signal::Completed) } else { None }
}

impl<A, B> Observable for ZipOp<A, B>
where
  A: Observable,
  B: Observable<Err = A::Err>,
{
  type Item = (A::Item, B::Item);
  type Err = A::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Self::Item, A::Err>) {
    let state = Arc::new(Mutex::new(ZipState {
      buffer_a: VecDeque::new(),
      buffer_b: VecDeque::new(),
      completed_a: false,
      completed_b: false,
    }));

    let a: Subscriber<A::Item, A::Err> =
      subscriber.chain(ZipAObserver { observer: subscriber.clone(), state: state.clone() });
    let b: Subscriber<B::Item, A::Err> =
      subscriber.chain(ZipBObserver { observer: subscriber.clone(), state });
    self.source_a.actual_subscribe(a);
    self.source_b.actual_subscribe(b);
  }
}

// ==================== Observer Structs ====================

/// Observer for source A
pub struct ZipAObserver<ItemA, ItemB, Err> {
  observer: Subscriber<(ItemA, ItemB), Err>,
  state: SharedState<ItemA, ItemB>,
}

/// Observer for source B
pub struct ZipBObserver<ItemA, ItemB, Err> {
  observer: Subscriber<(ItemA, ItemB), Err>,
  state: SharedState<ItemA, ItemB>,
}

// ==================== Observer Implementations ====================

impl<ItemA, ItemB, Err> Observer<ItemA, Err> for ZipAObserver<ItemA, ItemB, Err> {
  fn next(&mut self, value: ItemA) {
    let claimed = {
      let mut state = self.state.lock();
      match state.buffer_b.pop_front() {
        Some(b) => queue_pair(&self.observer, &state, (value, b)),
        None => {
          state.buffer_a.push_back(value);
          None
        }
      }
    };
    self.observer.release_claim(claimed);
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let claimed = {
      let mut state = self.state.lock();
      state.completed_a = true;
      queue_completion(&self.observer, &state)
    };
    self.observer.release_claim(claimed);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<ItemA, ItemB, Err> Observer<ItemB, Err> for ZipBObserver<ItemA, ItemB, Err> {
  fn next(&mut self, value: ItemB) {
    let claimed = {
      let mut state = self.state.lock();
      match state.buffer_a.pop_front() {
        Some(a) => queue_pair(&self.observer, &state, (a, value)),
        None => {
          state.buffer_b.push_back(value);
          None
        }
      }
    };
    self.observer.release_claim(claimed);
  }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let claimed = {
      let mut state = self.state.lock();
      state.completed_b = true;
      queue_completion(&self.observer, &state)
    };
    self.observer.release_claim(claimed);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn zip_basic() {
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    observable::from_iter::<_, ()>(vec![1, 2, 3])
      .zip(observable::from_iter(vec!["a", "b", "c"]))
      .subscribe(move |v| s.lock().push(v));
    assert_eq!(*seen.lock(), vec![(1, "a"), (2, "b"), (3, "c")]);
  }

  #[test]
  fn zip_different_lengths() {
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (s, c) = (seen.clone(), completed.clone());
    observable::from_iter::<_, ()>(vec![1, 2, 3])
      .zip(observable::from_iter(vec![10, 20]))
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);
    assert_eq!(*seen.lock(), vec![(1, 10), (2, 20)]);
    assert!(*completed.lock());
  }

  #[test]
  fn zip_with_subjects_consumes_oldest_first() {
    let a = PublishSubject::<i32, ()>::new();
    let b = PublishSubject::<char, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    a.clone().zip(b.clone()).subscribe(move |v| s.lock().push(v));

    a.on_next(1);
    a.on_next(2);
    a.on_next(3);
    assert!(seen.lock().is_empty());
    b.on_next('x');
    b.on_next('y');
    assert_eq!(*seen.lock(), vec![(1, 'x'), (2, 'y')]);
  }

  #[test]
  fn zip_with_own_tail() {
    let first = observable::from_iter::<_, ()>(vec![1, 2, 3, 4]);
    let seen = Arc::new(Mutex::new(vec![]));
    let s = seen.clone();
    first
      .clone()
      .zip(first.skip(1))
      .subscribe(move |v| s.lock().push(v));
    assert_eq!(*seen.lock(), vec![(1, 2), (2, 3), (3, 4)]);
  }

  #[test]
  fn racing_sides_deliver_pairs_in_order() {
    let a = PublishSubject::<usize, ()>::new();
    let b = PublishSubject::<usize, ()>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (s, c) = (seen.clone(), completed.clone());
    a.clone()
      .zip(b.clone())
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);

    let producers: Vec<_> = [a, b]
      .into_iter()
      .map(|subject| {
        std::thread::spawn(move || {
          (0..1000).for_each(|i| subject.on_next(i));
          subject.on_completed();
        })
      })
      .collect();
    for p in producers {
      p.join().expect("producer thread");
    }

    let expected: Vec<_> = (0..1000).map(|i| (i, i)).collect();
    assert_eq!(*seen.lock(), expected);
    assert!(*completed.lock());
  }

  #[test]
  fn error_is_forwarded_regardless_of_buffers() {
    let a = PublishSubject::<i32, &'static str>::new();
    let b = PublishSubject::<i32, &'static str>::new();
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    a.clone()
      .zip(b.clone())
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));

    a.on_next(1);
    b.on_error("b broke");
    assert_eq!(*error.lock(), Some("b broke"));
    assert_eq!(a.observer_count(), 0);
  }
}
