use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

use crate::{observable::Observable, observer::Observer, subscriber::Subscriber};

/// Merges all `sources` into one stream.
///
/// Values are forwarded in arrival order. The first error from any source is
/// forwarded at once and unsubscribes every other source; completion is
/// forwarded once every source has completed.
///
/// # Example
///
/// ```
/// # use rxkit::prelude::*;
/// let numbers = PublishSubject::<i32, ()>::new();
/// // crate an even stream by filter
/// let even = numbers.clone().filter(|v| *v % 2 == 0).box_it();
/// // crate an odd stream by filter
/// let odd = numbers.clone().filter(|v| *v % 2 != 0).box_it();
///
/// // merge odd and even stream again
/// observable::merge_all(vec![even, odd]).subscribe(|v| println!("{v} "));
/// numbers.on_next(1);
/// numbers.on_next(2);
/// ```
pub fn merge_all<S: Observable>(sources: Vec<S>) -> Merge<S> { Merge::new(sources) }

/// Created by [`merge_all`] and
/// [`ObservableExt::merge`](crate::observable::ObservableExt::merge).
pub struct Merge<S> {
  sources: Arc<[S]>,
}

impl<S> Merge<S> {
  pub(crate) fn new(sources: Vec<S>) -> Self { Self { sources: sources.into() } }
}

impl<S> Clone for Merge<S> {
  fn clone(&self) -> Self { Self { sources: self.sources.clone() } }
}

impl<S: Observable> Observable for Merge<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    if self.sources.is_empty() {
      subscriber.complete();
      return;
    }
    let remaining = Arc::new(AtomicUsize::new(self.sources.len()));
    for source in self.sources.iter() {
      if subscriber.is_closed() {
        break;
      }
      let upstream: Subscriber<S::Item, S::Err> = subscriber
        .chain(MergeObserver { observer: subscriber.clone(), remaining: remaining.clone() });
      source.actual_subscribe(upstream);
    }
  }
}

pub struct MergeObserver<O> {
  observer: O,
  remaining: Arc<AtomicUsize>,
}

impl<Item, Err, O> Observer<Item, Err> for MergeObserver<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
      self.observer.complete()
    }
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  type Log = Arc<Mutex<Vec<String>>>;

  fn log_all<S>(source: S) -> (Log, Subscription)
  where
    S: Observable<Item = i32, Err = &'static str>,
  {
    let log: Log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    let subscription = source.subscribe_all(
      move |v| l1.lock().push(format!("{v}")),
      move |e| l2.lock().push(format!("error {e}")),
      move || l3.lock().push("complete".to_owned()),
    );
    (log, subscription)
  }

  #[test]
  fn interleaves_in_arrival_order() {
    let a = PublishSubject::<i32, &'static str>::new();
    let b = PublishSubject::<i32, &'static str>::new();
    let (log, _subscription) = log_all(a.clone().merge(b.clone()));

    a.on_next(1);
    b.on_next(2);
    a.on_next(3);
    a.on_completed();
    assert_eq!(*log.lock(), vec!["1", "2", "3"]);

    b.on_completed();
    assert_eq!(*log.lock(), vec!["1", "2", "3", "complete"]);
  }

  #[test]
  fn error_wins_and_unsubscribes_the_rest() {
    let a = PublishSubject::<i32, &'static str>::new();
    let b = PublishSubject::<i32, &'static str>::new();
    let (log, _subscription) = log_all(a.clone().merge(b.clone()));

    a.on_next(1);
    b.on_error("b failed");
    a.on_next(2);
    a.on_completed();

    assert_eq!(*log.lock(), vec!["1", "error b failed"]);
    assert_eq!(a.observer_count(), 0);
  }

  #[test]
  fn merge_all_of_cold_sources() {
    let sources = vec![
      observable::from_iter(vec![1, 2]).box_it(),
      observable::from_iter(vec![3]).box_it(),
      observable::from_iter(vec![4, 5]).box_it(),
    ];
    let (log, _subscription) = log_all(observable::merge_all(sources));
    assert_eq!(*log.lock(), vec!["1", "2", "3", "4", "5", "complete"]);
  }

  #[test]
  fn merge_all_of_nothing_completes() {
    let (log, _subscription) =
      log_all(observable::merge_all(Vec::<BoxedObservable<i32, &'static str>>::new()));
    assert_eq!(*log.lock(), vec!["complete"]);
  }

  #[test]
  fn dispose_stops_every_source() {
    let a = PublishSubject::<i32, &'static str>::new();
    let b = PublishSubject::<i32, &'static str>::new();
    let (log, subscription) = log_all(a.clone().merge(b.clone()));

    subscription.dispose();
    a.on_next(1);
    b.on_next(2);
    assert!(log.lock().is_empty());
    assert_eq!(a.observer_count() + b.observer_count(), 0);
  }
}
