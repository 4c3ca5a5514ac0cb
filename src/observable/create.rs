use std::{marker::PhantomData, sync::Arc};

use crate::{observable::Observable, subscriber::Subscriber, subscription::Disposable};

/// Creates an observable from a subscribe function.
///
/// `subscribe` runs once per subscription. It receives an owned
/// [`Subscriber`] to push signals into (the subscriber may be moved to
/// another thread or kept for later) and returns the teardown for whatever it
/// set up. Return `()` when there is nothing to release.
///
/// ```rust
/// use rxkit::prelude::*;
///
/// let source = observable::create(|mut s: Subscriber<i32, ()>| {
///   s.next(1);
///   s.next(2);
///   s.complete();
/// });
/// source.subscribe(|v| println!("{v}"));
/// ```
pub fn create<F, D, Item, Err>(subscribe: F) -> Create<F, Item, Err>
where
  F: Fn(Subscriber<Item, Err>) -> D,
{
  Create { f: Arc::new(subscribe), _marker: PhantomData }
}

/// Observable created from a function. See [`create`].
pub struct Create<F, Item, Err> {
  f: Arc<F>,
  _marker: PhantomData<fn() -> (Item, Err)>,
}

impl<F, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Self { f: self.f.clone(), _marker: PhantomData } }
}

impl<F, D, Item, Err> Observable for Create<F, Item, Err>
where
  F: Fn(Subscriber<Item, Err>) -> D + Send + Sync + 'static,
  D: Disposable + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) {
    let teardown = (self.f)(subscriber.clone());
    subscriber.add(teardown);
  }
}
