use crate::{
  observable::Observable, observer::Observer, scheduler::Scheduler, subscriber::Subscriber,
};

/// Re-emits all signals through `scheduler`.
///
/// Every value, the error and the completion become one scheduled task
/// each, queued in arrival order. With a
/// [`QueueScheduler`](crate::scheduler::QueueScheduler) this moves delivery
/// onto whichever context drains the queue.
///
/// ```
/// use rxkit::prelude::*;
///
/// let main = QueueScheduler::new();
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let s = seen.clone();
/// observable::from_iter::<_, ()>(1..=3)
///   .observe_on(main.clone())
///   .subscribe(move |v| s.lock().push(v));
///
/// assert!(seen.lock().is_empty());
/// main.run_due();
/// assert_eq!(*seen.lock(), vec![1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct ObserveOnOp<S, Sch> {
  source: S,
  scheduler: Sch,
}

impl<S, Sch> ObserveOnOp<S, Sch> {
  pub(crate) fn new(source: S, scheduler: Sch) -> Self { Self { source, scheduler } }
}

impl<S, Sch> Observable for ObserveOnOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> = subscriber
      .chain(ObserveOnObserver { observer: subscriber.clone(), scheduler: self.scheduler.clone() });
    self.source.actual_subscribe(upstream);
  }
}

pub struct ObserveOnObserver<Item, Err, Sch> {
  observer: Subscriber<Item, Err>,
  scheduler: Sch,
}

impl<Item, Err, Sch> Observer<Item, Err> for ObserveOnObserver<Item, Err, Sch>
where
  Item: Send + 'static,
  Err: Send + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let mut observer = self.observer.clone();
    let handle = self.scheduler.schedule(None, move || observer.next(value));
    self.observer.add(handle);
  }

  fn error(self, err: Err) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule(None, move || observer.error(err));
    self.observer.add(handle);
  }

  fn complete(self) {
    let observer = self.observer.clone();
    let handle = self.scheduler.schedule(None, move || observer.complete());
    self.observer.add(handle);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
