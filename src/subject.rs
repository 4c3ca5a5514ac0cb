//! Hot, multicast observables.
//!
//! Every subject is both an [`Observer`](crate::observer::Observer) (feed it
//! with `on_next`, `on_error`, `on_completed`) and an
//! [`Observable`](crate::observable::Observable) that broadcasts to all of
//! its current subscribers. The flavours differ only in what a late
//! subscriber receives:
//!
//! | subject           | on subscribe while live        | after completion        |
//! |-------------------|--------------------------------|-------------------------|
//! | [`PublishSubject`]  | nothing                      | `Completed`             |
//! | [`BehaviorSubject`] | the current value            | `Completed`             |
//! | [`ReplaySubject`]   | the last `n` values          | `Completed`             |
//! | [`AsyncSubject`]    | nothing                      | last value, `Completed` |
//!
//! After an error every flavour hands late subscribers that error. Producer
//! calls on a terminated subject are silently ignored.
//!
//! Relays ([`PublishRelay`], [`BehaviorRelay`]) share the multicast
//! semantics but can never terminate; `accept` is their only producer call.
//!
//! ```rust
//! use rxkit::prelude::*;
//!
//! let subject = PublishSubject::<&str, ()>::new();
//! let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
//! let s = seen.clone();
//!
//! subject.on_next("a");
//! subject.clone().subscribe(move |v| s.lock().push(v));
//! subject.on_next("b");
//! subject.on_next("c");
//! assert_eq!(*seen.lock(), vec!["b", "c"]);
//! ```

/// Producer methods plus the `Observable`, `Observer` and `Clone` impls every
/// subject flavour shares; all of them delegate to the inner `core`.
macro_rules! impl_subject {
  ($name:ident) => {
    impl<Item, Err> $name<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      /// Broadcasts `value` to the current subscribers.
      pub fn on_next(&self, value: Item) { self.core.next(value) }

      /// Terminates the subject with `err`.
      pub fn on_error(&self, err: Err) { self.core.error(err) }

      /// Terminates the subject successfully.
      pub fn on_completed(&self) { self.core.complete() }
    }

    impl<Item, Err> $name<Item, Err> {
      /// Number of live subscriptions.
      pub fn observer_count(&self) -> usize { self.core.observer_count() }

      /// Whether `on_error` or `on_completed` has been called.
      pub fn is_terminated(&self) -> bool { self.core.is_terminated() }
    }

    impl<Item, Err> Clone for $name<Item, Err> {
      fn clone(&self) -> Self { Self { core: self.core.clone() } }
    }

    impl<Item, Err> $crate::observable::Observable for $name<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      type Item = Item;
      type Err = Err;

      fn actual_subscribe(&self, subscriber: $crate::subscriber::Subscriber<Item, Err>) {
        self.core.subscribe(subscriber)
      }
    }

    impl<Item, Err> $crate::observer::Observer<Item, Err> for $name<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      fn next(&mut self, value: Item) { self.on_next(value) }

      fn error(self, err: Err) { self.on_error(err) }

      fn complete(self) { self.on_completed() }

      fn is_closed(&self) -> bool { self.is_terminated() }
    }
  };
}

mod async_subject;
mod behavior_subject;
mod publish_subject;
mod relay;
mod replay_subject;
mod subject_core;
mod subscribers;

pub use async_subject::AsyncSubject;
pub use behavior_subject::BehaviorSubject;
pub use publish_subject::PublishSubject;
pub use relay::{BehaviorRelay, PublishRelay};
pub use replay_subject::ReplaySubject;
