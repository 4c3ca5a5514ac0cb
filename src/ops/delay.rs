use std::time::Duration;

use crate::{
  observable::Observable, observer::Observer, scheduler::Scheduler, subscriber::Subscriber,
};

/// Shifts every value and the completion by a fixed `delay` on a scheduler.
///
/// Errors are forwarded as soon as they arrive. Values still waiting for
/// their delay are cancelled when the subscription is disposed.
#[derive(Debug, Clone)]
pub struct DelayOp<S, Sch> {
  source: S,
  delay: Duration,
  scheduler: Sch,
}

impl<S, Sch> DelayOp<S, Sch> {
  pub(crate) fn new(source: S, delay: Duration, scheduler: Sch) -> Self {
    Self { source, delay, scheduler }
  }
}

impl<S, Sch> Observable for DelayOp<S, Sch>
where
  S: Observable,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let upstream: Subscriber<S::Item, S::Err> = subscriber.chain(DelayObserver {
      observer: subscriber.clone(),
      delay: self.delay,
      scheduler: self.scheduler.clone(),
    });
    self.source.actual_subscribe(upstream);
  }
}

pub struct DelayObserver<Item, Err, Sch> {
  observer: Subscriber<Item, Err>,
  delay: Duration,
  scheduler: Sch,
}

impl<Item, Err, Sch> Observer<Item, Err> for DelayObserver<Item, Err, Sch>
where
  Item: Send + 'static,
  Err: Send + 'static,
  Sch: Scheduler,
{
  fn next(&mut self, value: Item) {
    let mut observer = self.observer.clone();
    let handle = self
      .scheduler
      .schedule(Some(self.delay), move || observer.next(value));
    self.observer.add(handle);
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  fn complete(self) {
    let observer = self.observer.clone();
    let handle = self
      .scheduler
      .schedule(Some(self.delay), move || observer.complete());
    self.observer.add(handle);
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
