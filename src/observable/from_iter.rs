use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error. The
/// iterator is cloned for every subscription, and emission stops early once
/// the subscriber is closed (for example by a downstream `take`).
///
/// # Examples
///
/// A simple example for a range:
///
/// ```
/// use rxkit::prelude::*;
///
/// observable::from_iter::<_, ()>(0..10).subscribe(|v| println!("{v},"));
/// ```
///
/// Or with a vector:
///
/// ```
/// use rxkit::prelude::*;
///
/// observable::from_iter::<_, ()>(vec![0, 1, 2, 3]).subscribe(|v| println!("{v},"));
/// ```
pub fn from_iter<Iter, Err>(iter: Iter) -> FromIter<Iter, Err>
where
  Iter: IntoIterator,
{
  FromIter(iter, PhantomData)
}

pub struct FromIter<Iter, Err>(Iter, PhantomData<fn() -> Err>);

impl<Iter: Clone, Err> Clone for FromIter<Iter, Err> {
  fn clone(&self) -> Self { FromIter(self.0.clone(), PhantomData) }
}

impl<Iter, Err> Observable for FromIter<Iter, Err>
where
  Iter: IntoIterator + Clone + Send + Sync + 'static,
  Iter::Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Iter::Item;
  type Err = Err;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Iter::Item, Err>) {
    for v in self.0.clone() {
      if subscriber.is_closed() {
        return;
      }
      subscriber.next(v);
    }
    subscriber.complete();
  }
}

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
/// For several values use [`of_sequence!`](crate::of_sequence) or
/// [`from_iter`].
///
/// # Examples
///
/// ```
/// use rxkit::prelude::*;
///
/// observable::of::<_, ()>(123).subscribe(|v| println!("{v}"));
/// ```
pub fn of<Item, Err>(v: Item) -> Just<Item, Err> { Just(v, PhantomData) }

/// Same as [`of`].
pub fn just<Item, Err>(v: Item) -> Just<Item, Err> { Just(v, PhantomData) }

pub struct Just<Item, Err>(Item, PhantomData<fn() -> Err>);

impl<Item: Clone, Err> Clone for Just<Item, Err> {
  fn clone(&self) -> Self { Just(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for Just<Item, Err>
where
  Item: Clone + Send + Sync + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(&self, mut subscriber: Subscriber<Item, Err>) {
    subscriber.next(self.0.clone());
    subscriber.complete();
  }
}

/// Creates an observable producing multiple values.
///
/// Completes immediately after emitting the values given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxkit::{of_sequence, prelude::*};
///
/// of_sequence!(1, 2, 3).subscribe_err(|v| println!("{v}"), |_: ()| {});
///
/// // print log:
/// // 1
/// // 2
/// // 3
/// ```
#[macro_export]
macro_rules! of_sequence {
  ( $( $item:expr ),* $(,)? ) => {
    $crate::observable::from_iter([ $( $item ),* ])
  };
}
