//! State and protocol shared by every subject flavour.
//!
//! A subject is a subscriber list plus a replay policy plus an optional
//! terminal signal, all behind one mutex:
//!
//! - subscribing registers the subscriber and computes what it must replay
//!   in the same critical section, then replays with the lock released;
//! - producer calls update the replay buffer and snapshot the subscriber
//!   list under the lock, then deliver with the lock released;
//! - once terminal, producer calls are no-ops and late subscribers receive
//!   the cached outcome.

use std::{
  collections::VecDeque,
  sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::subscribers::{broadcast_complete, broadcast_error, broadcast_value, Subscribers};
use crate::{
  observer::{Observer, Signal},
  subscriber::Subscriber,
};

/// What a subject keeps for late subscribers.
pub(crate) trait ReplayPolicy<Item> {
  fn record(&mut self, value: &Item);

  /// Values a subscriber joining a live subject receives first.
  fn live_replay<Err>(&self) -> Vec<Signal<Item, Err>>;

  /// Values are withheld from live subscribers until completion.
  fn holds_back_values(&self) -> bool { false }

  /// Released on completion and to every subscriber arriving after it.
  fn final_value(&self) -> Option<Item> { None }
}

/// The current value of a behavior subject or relay. Always present.
pub(crate) struct Latest<Item>(pub(crate) Item);

impl<Item: Clone> ReplayPolicy<Item> for Latest<Item> {
  fn record(&mut self, value: &Item) { self.0 = value.clone() }

  fn live_replay<Err>(&self) -> Vec<Signal<Item, Err>> { vec![Signal::Next(self.0.clone())] }
}

/// Replay storage of the flavours whose memory may be empty.
pub(crate) enum Replay<Item> {
  /// Nothing (publish).
  None,
  /// The last `capacity` values, all of them when `None` (replay).
  Buffer { capacity: Option<usize>, values: VecDeque<Item> },
  /// Only the final value, released on completion (async).
  Last(Option<Item>),
}

impl<Item: Clone> ReplayPolicy<Item> for Replay<Item> {
  fn record(&mut self, value: &Item) {
    match self {
      Replay::None => {}
      Replay::Buffer { capacity, values } => {
        if *capacity == Some(0) {
          return;
        }
        if capacity.map_or(false, |capacity| values.len() >= capacity) {
          values.pop_front();
        }
        values.push_back(value.clone());
      }
      Replay::Last(last) => *last = Some(value.clone()),
    }
  }

  fn live_replay<Err>(&self) -> Vec<Signal<Item, Err>> {
    match self {
      Replay::Buffer { values, .. } => values.iter().cloned().map(Signal::Next).collect(),
      Replay::None | Replay::Last(_) => Vec::new(),
    }
  }

  fn holds_back_values(&self) -> bool { matches!(self, Replay::Last(_)) }

  fn final_value(&self) -> Option<Item> {
    match self {
      Replay::Last(last) => last.clone(),
      _ => None,
    }
  }
}

#[derive(Clone)]
enum Terminal<Err> {
  Error(Err),
  Completed,
}

struct SubjectState<Item, Err, R> {
  observers: Subscribers<Item, Err>,
  replay: R,
  terminal: Option<Terminal<Err>>,
}

impl<Item, Err: Clone, R: ReplayPolicy<Item>> SubjectState<Item, Err, R> {
  /// What a subscriber arriving after the terminal signal receives.
  fn terminal_replay(&self, terminal: &Terminal<Err>) -> Vec<Signal<Item, Err>> {
    match terminal {
      Terminal::Error(err) => vec![Signal::Error(err.clone())],
      Terminal::Completed => match self.replay.final_value() {
        Some(last) => vec![Signal::Next(last), Signal::Completed],
        None => vec![Signal::Completed],
      },
    }
  }
}

pub(crate) struct SubjectCore<Item, Err, R = Replay<Item>>(Arc<Mutex<SubjectState<Item, Err, R>>>);

impl<Item, Err, R> Clone for SubjectCore<Item, Err, R> {
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<Item, Err, R> SubjectCore<Item, Err, R> {
  pub(crate) fn new(replay: R) -> Self {
    Self(Arc::new(Mutex::new(SubjectState {
      observers: Subscribers::default(),
      replay,
      terminal: None,
    })))
  }

  pub(crate) fn observer_count(&self) -> usize { self.0.lock().observers.len() }

  pub(crate) fn is_terminated(&self) -> bool { self.0.lock().terminal.is_some() }

}

impl<Item: Clone, Err> SubjectCore<Item, Err, Latest<Item>> {
  /// The current value of a behavior subject or relay.
  pub(crate) fn latest(&self) -> Item { self.0.lock().replay.0.clone() }
}

impl<Item, Err, R> SubjectCore<Item, Err, R>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
  R: ReplayPolicy<Item> + Send + 'static,
{
  pub(crate) fn subscribe(&self, subscriber: Subscriber<Item, Err>) {
    let claimed = subscriber.claim();
    if claimed.is_none() && subscriber.is_closed() {
      return;
    }

    let (signals, id) = {
      let mut state = self.0.lock();
      match state.terminal.clone() {
        Some(terminal) => (state.terminal_replay(&terminal), None),
        None => {
          let signals = state.replay.live_replay();
          (signals, Some(state.observers.add(subscriber.clone())))
        }
      }
    };

    if let Some(id) = id {
      let weak = Arc::downgrade(&self.0);
      subscriber.add_teardown(move || remove_observer(&weak, id));
    }

    match claimed {
      Some(observer) => subscriber.release(observer, signals),
      // Already emitting on another stack; queue the replay behind it.
      None => signals.into_iter().for_each(|signal| subscriber.emit(signal)),
    }
  }

  pub(crate) fn next(&self, value: Item) {
    let targets = {
      let mut state = self.0.lock();
      if state.terminal.is_some() {
        trace!("value pushed into a terminated subject; ignored");
        return;
      }
      state.replay.record(&value);
      if state.replay.holds_back_values() {
        return;
      }
      state.observers.snapshot()
    };
    broadcast_value(targets, value);
  }

  pub(crate) fn error(&self, err: Err) {
    let targets = {
      let mut state = self.0.lock();
      if state.terminal.is_some() {
        trace!("error pushed into a terminated subject; ignored");
        return;
      }
      state.terminal = Some(Terminal::Error(err.clone()));
      state.observers.drain()
    };
    debug!(subscribers = targets.len(), "subject terminated with an error");
    broadcast_error(targets, err);
  }

  pub(crate) fn complete(&self) {
    let (targets, last) = {
      let mut state = self.0.lock();
      if state.terminal.is_some() {
        trace!("completion pushed into a terminated subject; ignored");
        return;
      }
      state.terminal = Some(Terminal::Completed);
      (state.observers.drain(), state.replay.final_value())
    };
    debug!(subscribers = targets.len(), "subject completed");
    if let Some(last) = last {
      broadcast_value(targets.clone(), last);
    }
    broadcast_complete(targets);
  }
}

fn remove_observer<Item, Err, R>(state: &Weak<Mutex<SubjectState<Item, Err, R>>>, id: usize) {
  if let Some(state) = state.upgrade() {
    // Dropped outside the lock: the observer it owns may run arbitrary drop code.
    let removed = state.lock().observers.remove(id);
    drop(removed);
  }
}
