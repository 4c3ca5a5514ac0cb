use std::{marker::PhantomData, time::Duration};

use crate::{
  observable::Observable, observer::Observer, scheduler::Scheduler, subscriber::Subscriber,
};

/// Creates an observable that emits `0` after `delay` on `scheduler`, then
/// completes.
pub fn timer<Sch, Err>(delay: Duration, scheduler: Sch) -> Timer<Sch, Err> {
  Timer { delay, scheduler, _err: PhantomData }
}

pub struct Timer<Sch, Err> {
  delay: Duration,
  scheduler: Sch,
  _err: PhantomData<fn() -> Err>,
}

impl<Sch: Clone, Err> Clone for Timer<Sch, Err> {
  fn clone(&self) -> Self {
    Timer { delay: self.delay, scheduler: self.scheduler.clone(), _err: PhantomData }
  }
}

impl<Sch, Err> Observable for Timer<Sch, Err>
where
  Sch: Scheduler,
  Err: Send + 'static,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe(&self, subscriber: Subscriber<usize, Err>) {
    let mut s = subscriber.clone();
    let handle = self.scheduler.schedule(Some(self.delay), move || {
      s.next(0);
      s.complete();
    });
    subscriber.add(handle);
  }
}

/// Creates an observable that emits `0, 1, 2, ...` every `period` on
/// `scheduler`, starting one `period` after subscription.
///
/// The sequence never completes by itself. On the
/// [`ImmediateScheduler`](crate::scheduler::ImmediateScheduler) every tick
/// runs inline, so bound it with `take`.
pub fn interval<Sch, Err>(period: Duration, scheduler: Sch) -> Interval<Sch, Err> {
  interval_at(period, period, scheduler)
}

/// Like [`interval`], but the first tick fires after `delay`.
pub fn interval_at<Sch, Err>(delay: Duration, period: Duration, scheduler: Sch) -> Interval<Sch, Err> {
  Interval { delay, period, scheduler, _err: PhantomData }
}

pub struct Interval<Sch, Err> {
  delay: Duration,
  period: Duration,
  scheduler: Sch,
  _err: PhantomData<fn() -> Err>,
}

impl<Sch: Clone, Err> Clone for Interval<Sch, Err> {
  fn clone(&self) -> Self {
    Interval {
      delay: self.delay,
      period: self.period,
      scheduler: self.scheduler.clone(),
      _err: PhantomData,
    }
  }
}

impl<Sch, Err> Observable for Interval<Sch, Err>
where
  Sch: Scheduler,
  Err: Send + 'static,
{
  type Item = usize;
  type Err = Err;

  fn actual_subscribe(&self, subscriber: Subscriber<usize, Err>) {
    schedule_tick(self.scheduler.clone(), subscriber, self.delay, self.period, 0);
  }
}

fn schedule_tick<Sch, Err>(
  scheduler: Sch, subscriber: Subscriber<usize, Err>, delay: Duration, period: Duration, seq: usize,
) where
  Sch: Scheduler,
  Err: Send + 'static,
{
  let mut s = subscriber.clone();
  let next_scheduler = scheduler.clone();
  let handle = scheduler.schedule(Some(delay), move || {
    if s.is_closed() {
      return;
    }
    s.next(seq);
    schedule_tick(next_scheduler, s, period, period, seq + 1);
  });
  subscriber.add(handle);
}
