//! Type-erased observables.
//!
//! Operators produce deeply nested concrete types. [`BoxedObservable`] hides
//! them behind a trait object so that heterogeneous pipelines can be stored in
//! one collection, returned from a function, or merged together.

use std::sync::Arc;

use super::Observable;
use crate::subscriber::Subscriber;

// ============================================================================
// DynObservable Trait
// ============================================================================

/// Object-safe mirror of [`Observable`].
pub trait DynObservable<Item, Err>: Send + Sync {
  fn dyn_subscribe(&self, subscriber: Subscriber<Item, Err>);
}

impl<S: Observable> DynObservable<S::Item, S::Err> for S {
  #[inline]
  fn dyn_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) { self.actual_subscribe(subscriber) }
}

// ============================================================================
// BoxedObservable
// ============================================================================

/// A cloneable, thread-safe observable trait object.
pub struct BoxedObservable<Item, Err>(Arc<dyn DynObservable<Item, Err>>);

impl<Item, Err> BoxedObservable<Item, Err> {
  pub fn new<S>(source: S) -> Self
  where
    S: Observable<Item = Item, Err = Err>,
  {
    Self(Arc::new(source))
  }
}

impl<Item, Err> Clone for BoxedObservable<Item, Err> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, Err> Observable for BoxedObservable<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) { self.0.dyn_subscribe(subscriber) }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn heterogeneous_sources_share_one_type() {
    let sources: Vec<BoxedObservable<i32, ()>> = vec![
      observable::of(1).box_it(),
      observable::from_iter(vec![2, 3]).map(|v| v * 10).box_it(),
      observable::empty().box_it(),
    ];

    let seen = Arc::new(Mutex::new(vec![]));
    for source in sources {
      let seen = seen.clone();
      source.subscribe(move |v| seen.lock().push(v));
    }
    assert_eq!(*seen.lock(), vec![1, 20, 30]);
  }

  #[test]
  fn boxed_is_cold() {
    let boxed: BoxedObservable<i32, ()> = observable::from_iter(0..3).box_it();
    let count = Arc::new(Mutex::new(0));
    for _ in 0..2 {
      let count = count.clone();
      boxed.clone().subscribe(move |_| *count.lock() += 1);
    }
    assert_eq!(*count.lock(), 6);
  }
}
