//! # rxkit: a small reactive-stream core
//!
//! Push-based streams with explicit lifetimes, multicasting subjects,
//! virtual-time scheduling and retry with back-off.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxkit::prelude::*;
//!
//! let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
//! let s = seen.clone();
//! observable::from_iter::<_, ()>(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(move |v| s.lock().push(v));
//! assert_eq!(*seen.lock(), vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | An immutable, cold description of a stream |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` signals |
//! | [`Subscriber`] | Serializing, terminal-once sink every source pushes into |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Decides when deferred work runs |
//!
//! ## Feature Flags
//!
//! - **`stream`** (default): [`ObservableExt::into_stream`] bridges to
//!   `futures::Stream`.
//!
//! [`Observable`]: observable::Observable
//! [`ObservableExt::into_stream`]: observable::ObservableExt::into_stream
//! [`Observer`]: observer::Observer
//! [`Subscriber`]: subscriber::Subscriber
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;

pub use prelude::*;

#[cfg(doctest)]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
