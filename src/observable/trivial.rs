use std::marker::PhantomData;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Creates an observable that emits no items, just terminates with an error.
///
/// # Arguments
///
/// * `err` - An error to emit and terminate with
pub fn throw_err<Item, Err>(err: Err) -> ThrowErr<Item, Err> { ThrowErr(err, PhantomData) }

pub struct ThrowErr<Item, Err>(Err, PhantomData<fn() -> Item>);

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { ThrowErr(self.0.clone(), PhantomData) }
}

impl<Item, Err> Observable for ThrowErr<Item, Err>
where
  Item: Send + 'static,
  Err: Clone + Send + Sync + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) { subscriber.error(self.0.clone()) }
}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// # Examples
/// ```
/// use rxkit::prelude::*;
///
/// observable::empty::<i32, ()>().subscribe(|v| println!("{v},"));
///
/// // Result: nothing printed
/// ```
pub fn empty<Item, Err>() -> Empty<Item, Err> { Empty(PhantomData) }

pub struct Empty<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for Empty<Item, Err> {
  fn clone(&self) -> Self { Empty(PhantomData) }
}

impl<Item, Err> Observable for Empty<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(&self, subscriber: Subscriber<Item, Err>) { subscriber.complete() }
}

/// Creates an observable that never emits anything.
///
/// Neither emits a value, nor completes, nor emits an error.
pub fn never<Item, Err>() -> Never<Item, Err> { Never(PhantomData) }

pub struct Never<Item, Err>(PhantomData<fn() -> (Item, Err)>);

impl<Item, Err> Clone for Never<Item, Err> {
  fn clone(&self) -> Self { Never(PhantomData) }
}

impl<Item, Err> Observable for Never<Item, Err>
where
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;

  fn actual_subscribe(&self, _subscriber: Subscriber<Item, Err>) {}
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn throw_err_only_errors() {
    let log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    observable::throw_err::<i32, _>("boom").subscribe_all(
      move |v| l1.lock().push(format!("next {v}")),
      move |e| l2.lock().push(format!("error {e}")),
      move || l3.lock().push("complete".to_owned()),
    );
    assert_eq!(*log.lock(), vec!["error boom"]);
  }

  #[test]
  fn empty_completes_without_values() {
    let completed = Arc::new(Mutex::new(false));
    let c = completed.clone();
    observable::empty::<i32, ()>().subscribe_all(
      |_| panic!("no values"),
      |_| panic!("no errors"),
      move || *c.lock() = true,
    );
    assert!(*completed.lock());
  }

  #[test]
  fn never_stays_silent() {
    let subscription = observable::never::<i32, ()>().subscribe(|_| panic!("never emits"));
    assert!(!subscription.is_disposed());
    subscription.dispose();
  }
}
