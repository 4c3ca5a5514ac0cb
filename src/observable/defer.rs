use std::sync::Arc;

use crate::{observable::Observable, subscriber::Subscriber};

/// Creates an observable that will on subscription defer to another observable
/// that is supplied by a supplier-function which will be run once at each
/// subscription
///
/// ```rust
/// # use rxkit::prelude::*;
///
/// observable::defer(|| {
///   println!("Hi!");
///   observable::of::<_, ()>("Hello!")
/// })
/// .subscribe(move |v| {
///   println!("{}", v);
/// });
/// // Prints: Hi!\nHello!\n
/// ```
pub fn defer<F, S>(supplier: F) -> Defer<F>
where
  F: Fn() -> S,
{
  Defer(Arc::new(supplier))
}

pub struct Defer<F>(Arc<F>);

impl<F> Clone for Defer<F> {
  fn clone(&self) -> Self { Defer(self.0.clone()) }
}

impl<F, S> Observable for Defer<F>
where
  F: Fn() -> S + Send + Sync + 'static,
  S: Observable,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    (self.0)().actual_subscribe(subscriber)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::prelude::*;

  #[test]
  fn supplier_runs_per_subscription() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let deferred = observable::defer(move || {
      let n = c.fetch_add(1, Ordering::SeqCst);
      observable::of::<_, ()>(n)
    });
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let seen = Arc::new(parking_lot::Mutex::new(vec![]));
    for _ in 0..2 {
      let seen = seen.clone();
      deferred.clone().subscribe(move |v| seen.lock().push(v));
    }
    assert_eq!(*seen.lock(), vec![0, 1]);
  }
}
