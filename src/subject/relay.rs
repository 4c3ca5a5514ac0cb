//! Subjects that can never terminate.
//!
//! A relay has a single producer call, `accept`, and its error type is
//! [`Infallible`], so subscribers only ever see values. Relays are not
//! observers: they cannot be subscribed to a source whose terminal signal
//! would have nowhere to go.

use std::convert::Infallible;

use super::subject_core::{Latest, Replay, SubjectCore};
use crate::{observable::Observable, subscriber::Subscriber};

/// A relay without memory, the never-terminating [`PublishSubject`].
///
/// [`PublishSubject`]: crate::subject::PublishSubject
pub struct PublishRelay<Item> {
  core: SubjectCore<Item, Infallible>,
}

impl<Item> PublishRelay<Item> {
  pub fn new() -> Self { Self { core: SubjectCore::new(Replay::None) } }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl<Item: Clone + Send + 'static> PublishRelay<Item> {
  pub fn accept(&self, value: Item) { self.core.next(value) }
}

impl<Item> Default for PublishRelay<Item> {
  fn default() -> Self { Self::new() }
}

impl<Item> Clone for PublishRelay<Item> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item: Clone + Send + 'static> Observable for PublishRelay<Item> {
  type Item = Item;
  type Err = Infallible;

  fn actual_subscribe(&self, subscriber: Subscriber<Item, Infallible>) {
    self.core.subscribe(subscriber)
  }
}

/// A relay holding a current value, the never-terminating
/// [`BehaviorSubject`](crate::subject::BehaviorSubject).
///
/// ```rust
/// use rxkit::prelude::*;
///
/// let relay = BehaviorRelay::new("x");
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let s = seen.clone();
/// relay.clone().subscribe(move |v| s.lock().push(v));
/// relay.accept("y");
/// assert_eq!(*seen.lock(), vec!["x", "y"]);
/// assert_eq!(relay.value(), "y");
/// ```
pub struct BehaviorRelay<Item> {
  core: SubjectCore<Item, Infallible, Latest<Item>>,
}

impl<Item> BehaviorRelay<Item> {
  pub fn new(initial: Item) -> Self { Self { core: SubjectCore::new(Latest(initial)) } }

  pub fn observer_count(&self) -> usize { self.core.observer_count() }
}

impl<Item: Clone> BehaviorRelay<Item> {
  pub fn value(&self) -> Item { self.core.latest() }
}

impl<Item: Clone + Send + 'static> BehaviorRelay<Item> {
  pub fn accept(&self, value: Item) { self.core.next(value) }
}

impl<Item> Clone for BehaviorRelay<Item> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item: Clone + Send + 'static> Observable for BehaviorRelay<Item> {
  type Item = Item;
  type Err = Infallible;

  fn actual_subscribe(&self, subscriber: Subscriber<Item, Infallible>) {
    self.core.subscribe(subscriber)
  }
}
