use std::sync::Arc;

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Created by
/// [`ObservableExt::catch_error`](crate::observable::ObservableExt::catch_error).
///
/// On an upstream error the upstream subscription ends and the fallback
/// returned by the handler is subscribed in its place, feeding the same
/// downstream subscriber.
pub struct CatchErrorOp<S, F> {
  source: S,
  handler: Arc<F>,
}

impl<S, F> CatchErrorOp<S, F> {
  pub(crate) fn new(source: S, handler: F) -> Self { Self { source, handler: Arc::new(handler) } }
}

impl<S: Clone, F> Clone for CatchErrorOp<S, F> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), handler: self.handler.clone() } }
}

impl<S, F, R> Observable for CatchErrorOp<S, F>
where
  S: Observable,
  F: Fn(S::Err) -> R + Send + Sync + 'static,
  R: Observable<Item = S::Item>,
{
  type Item = S::Item;
  type Err = R::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, R::Err>) {
    let upstream: Subscriber<S::Item, S::Err> = subscriber
      .chain(CatchErrorObserver { observer: subscriber.clone(), handler: self.handler.clone() });
    self.source.actual_subscribe(upstream);
  }
}

pub struct CatchErrorObserver<Item, Err, F> {
  observer: Subscriber<Item, Err>,
  handler: Arc<F>,
}

impl<Item, SrcErr, Err, F, R> Observer<Item, SrcErr> for CatchErrorObserver<Item, Err, F>
where
  F: Fn(SrcErr) -> R,
  R: Observable<Item = Item, Err = Err>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: SrcErr) {
    let fallback = (self.handler)(err);
    fallback.actual_subscribe(self.observer);
  }

  fn complete(self) { self.observer.complete() }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  #[test]
  fn switches_to_fallback() {
    let seen = Arc::new(Mutex::new(vec![]));
    let completed = Arc::new(Mutex::new(false));
    let (s, c) = (seen.clone(), completed.clone());
    observable::from_iter(vec![1, 2])
      .concat(observable::throw_err("oops"))
      .catch_error(|_: &str| observable::from_iter::<_, ()>(vec![-1, -2]))
      .subscribe_all(move |v| s.lock().push(v), |_| {}, move || *c.lock() = true);

    assert_eq!(*seen.lock(), vec![1, 2, -1, -2]);
    assert!(*completed.lock());
  }

  #[test]
  fn just_return() {
    let subject = PublishSubject::<&'static str, &'static str>::new();
    let seen = Arc::new(Mutex::new(vec![]));
    let errors = Arc::new(Mutex::new(0));
    let (s, e) = (seen.clone(), errors.clone());
    subject
      .clone()
      .catch_error_just_return("recovered")
      .subscribe_err(move |v| s.lock().push(v), move |_| *e.lock() += 1);

    subject.on_next("a");
    subject.on_error("failed");
    assert_eq!(*seen.lock(), vec!["a", "recovered"]);
    assert_eq!(*errors.lock(), 0);
  }

  #[test]
  fn fallback_error_is_forwarded() {
    let error = Arc::new(Mutex::new(None));
    let e = error.clone();
    observable::throw_err::<i32, _>(1)
      .catch_error(|code| observable::throw_err::<i32, _>(format!("wrapped {code}")))
      .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));
    assert_eq!(error.lock().as_deref(), Some("wrapped 1"));
  }
}
