//! Reference-counted multicasting.
//!
//! `share()` turns a cold observable hot for as long as someone listens:
//! the first subscriber connects a single upstream subscription through a
//! [`PublishSubject`], later subscribers join it, and the upstream is
//! disposed when the last subscriber leaves. Subscribing after that, or after
//! the upstream terminated, connects again.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
  observable::Observable,
  subject::PublishSubject,
  subscriber::Subscriber,
  subscription::{Disposable, Subscription},
};

struct ShareState<Item, Err> {
  subject: Option<PublishSubject<Item, Err>>,
  connection: Option<Subscription>,
  ref_count: usize,
  /// Bumped on every fresh connection so stale teardowns are ignored.
  generation: u64,
}

/// Created by [`ObservableExt::share`](crate::observable::ObservableExt::share).
///
/// Clones share the same connection.
pub struct ShareOp<S: Observable> {
  source: S,
  state: Arc<Mutex<ShareState<S::Item, S::Err>>>,
}

impl<S: Observable> ShareOp<S> {
  pub(crate) fn new(source: S) -> Self {
    let state = ShareState { subject: None, connection: None, ref_count: 0, generation: 0 };
    Self { source, state: Arc::new(Mutex::new(state)) }
  }
}

impl<S: Observable> Clone for ShareOp<S> {
  fn clone(&self) -> Self { Self { source: self.source.clone(), state: self.state.clone() } }
}

impl<S> Observable for ShareOp<S>
where
  S: Observable,
  S::Item: Clone,
  S::Err: Clone,
{
  type Item = S::Item;
  type Err = S::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, S::Err>) {
    let (subject, generation, connect) = {
      let mut state = self.state.lock();
      let subject = match &state.subject {
        Some(subject) if !subject.is_terminated() => subject.clone(),
        _ => {
          let subject = PublishSubject::new();
          state.subject = Some(subject.clone());
          state.connection = None;
          state.ref_count = 0;
          state.generation += 1;
          subject
        }
      };
      state.ref_count += 1;
      let connect = if state.connection.is_none() {
        let upstream = Subscriber::new(subject.clone());
        state.connection = Some(upstream.subscription().clone());
        Some(upstream)
      } else {
        None
      };
      (subject, state.generation, connect)
    };

    subject.actual_subscribe(subscriber.clone());
    let weak = Arc::downgrade(&self.state);
    subscriber.add_teardown(move || release(&weak, generation));

    if let Some(upstream) = connect {
      debug!(generation, "share: connecting upstream");
      self.source.actual_subscribe(upstream);
    }
  }
}

fn release<Item, Err>(state: &Weak<Mutex<ShareState<Item, Err>>>, generation: u64) {
  let Some(state) = state.upgrade() else {
    return;
  };
  let connection = {
    let mut state = state.lock();
    if state.generation != generation {
      return;
    }
    state.ref_count = state.ref_count.saturating_sub(1);
    if state.ref_count > 0 {
      return;
    }
    state.subject = None;
    state.connection.take()
  };
  if let Some(connection) = connection {
    debug!(generation, "share: last subscriber left, disconnecting upstream");
    connection.dispose();
  }
}
