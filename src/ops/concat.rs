use std::sync::Arc;

use crate::{
  observable::Observable, observer::Observer, scheduler::Trampoline, subscriber::Subscriber,
};

/// Subscribes `sources` one after another.
///
/// Source `i + 1` is subscribed only once source `i` has completed. An error
/// from any source is forwarded immediately and later sources are never
/// subscribed.
pub fn concat_all<S: Observable>(sources: Vec<S>) -> Concat<S> { Concat::new(sources) }

/// Created by [`concat_all`] and
/// [`ObservableExt::concat`](crate::observable::ObservableExt::concat).
pub struct Concat<S> {
  sources: Arc<[S]>,
}

impl<S> Concat<S> {
  pub(crate) fn new(sources: Vec<S>) -> Self { Self { sources: sources.into() } }
}

impl<S> Clone for Concat<S> {
  fn clone(&self) -> Self { Self { sources: self.sources.clone() } }
}

impl<S: Observable> Observable for Concat<S> {
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let trampoline = Arc::new(Trampoline::new());
    let (sources, t) = (self.sources.clone(), trampoline.clone());
    trampoline.run(move || subscribe_from(sources, 0, subscriber, t));
  }
}

fn subscribe_from<S: Observable>(
  sources: Arc<[S]>, index: usize, subscriber: Subscriber<S::Item, S::Err>,
  trampoline: Arc<Trampoline>,
) {
  if subscriber.is_closed() {
    return;
  }
  let Some(source) = sources.get(index).cloned() else {
    subscriber.complete();
    return;
  };
  let upstream: Subscriber<S::Item, S::Err> =
    subscriber.chain(ConcatObserver { observer: subscriber.clone(), sources, index, trampoline });
  source.actual_subscribe(upstream);
}

pub struct ConcatObserver<S: Observable> {
  observer: Subscriber<S::Item, S::Err>,
  sources: Arc<[S]>,
  index: usize,
  trampoline: Arc<Trampoline>,
}

impl<S: Observable> Observer<S::Item, S::Err> for ConcatObserver<S> {
  fn next(&mut self, value: S::Item) { self.observer.next(value) }

  fn error(self, err: S::Err) { self.observer.error(err) }

  fn complete(self) {
    let Self { observer, sources, index, trampoline } = self;
    let t = trampoline.clone();
    trampoline.run(move || subscribe_from(sources, index + 1, observer, t));
  }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
