//! Disposable resources and subscription handles.
//!
//! [`Subscription`] is what `subscribe` hands back. It is a cheap, cloneable
//! handle over a set of teardowns; disposing it runs them once, in insertion
//! order. [`CompositeDisposable`] is the owning bag a longer-lived scope keeps
//! its subscriptions in.

use std::{
  fmt::{Debug, Formatter},
  panic::{catch_unwind, AssertUnwindSafe},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::warn;

mod composite;
pub use composite::CompositeDisposable;

/// A cancellable resource.
///
/// `dispose` is idempotent: calling it again has no effect and never panics.
pub trait Disposable {
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

/// Unit is a resource that holds nothing and is always disposed.
impl Disposable for () {
  #[inline]
  fn dispose(&self) {}

  #[inline]
  fn is_disposed(&self) -> bool { true }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<T: Disposable> Disposable for Option<T> {
  fn dispose(&self) {
    if let Some(inner) = self {
      inner.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.as_ref().map_or(true, Disposable::is_disposed) }
}

enum Teardown {
  Callback(Box<dyn FnOnce() + Send>),
  Resource(Box<dyn Disposable + Send>),
}

impl Teardown {
  fn is_disposed(&self) -> bool {
    match self {
      Teardown::Callback(_) => false,
      Teardown::Resource(r) => r.is_disposed(),
    }
  }

  fn run(self) {
    let outcome = catch_unwind(AssertUnwindSafe(move || match self {
      Teardown::Callback(f) => f(),
      Teardown::Resource(r) => r.dispose(),
    }));
    if outcome.is_err() {
      warn!("teardown panicked during dispose; continuing with remaining teardowns");
    }
  }
}

#[derive(Default)]
struct Inner {
  closed: AtomicBool,
  teardown: Mutex<SmallVec<[Teardown; 1]>>,
}

/// Handle to an active subscription.
///
/// Clones share the same underlying state, so disposing any clone disposes
/// them all. Anything added after disposal is disposed immediately instead of
/// being retained.
#[derive(Clone, Default)]
pub struct Subscription(Arc<Inner>);

impl Subscription {
  pub fn new() -> Self { Self::default() }

  /// Takes ownership of `resource`; it is disposed together with this
  /// subscription.
  pub fn add<D: Disposable + Send + 'static>(&self, resource: D) {
    if resource.is_disposed() {
      return;
    }
    self.push(Teardown::Resource(Box::new(resource)));
  }

  /// Registers a closure to run when this subscription is disposed.
  pub fn add_teardown<F: FnOnce() + Send + 'static>(&self, f: F) {
    self.push(Teardown::Callback(Box::new(f)));
  }

  /// Activates RAII behaviour: the returned guard disposes this subscription
  /// when it goes out of scope.
  ///
  /// **Attention:** If you don't bind the return value to a variable, the
  /// subscription is disposed immediately.
  pub fn dispose_when_dropped(self) -> SubscriptionGuard { SubscriptionGuard(Some(self)) }

  /// Number of teardowns still held.
  pub fn teardown_size(&self) -> usize { self.0.teardown.lock().len() }

  fn push(&self, teardown: Teardown) {
    let mut list = self.0.teardown.lock();
    if self.0.closed.load(Ordering::Acquire) {
      drop(list);
      teardown.run();
    } else {
      list.retain(|t| !t.is_disposed());
      list.push(teardown);
    }
  }
}

impl Disposable for Subscription {
  fn dispose(&self) {
    if self.0.closed.swap(true, Ordering::AcqRel) {
      return;
    }
    let teardown = std::mem::take(&mut *self.0.teardown.lock());
    for t in teardown {
      t.run();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.0.closed.load(Ordering::Acquire) }
}

impl Debug for Subscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("is_disposed", &self.is_disposed())
      .field("teardown_size", &self.teardown_size())
      .finish()
  }
}

/// A scoped subscription: disposed when dropped.
///
/// Implements the [must_use](
/// https://doc.rust-lang.org/reference/attributes/diagnostics.html
/// #the-must_use-attribute)
/// attribute
///
/// If you want to drop it immediately, wrap it in its own scope
#[derive(Debug)]
#[must_use]
pub struct SubscriptionGuard(Option<Subscription>);

impl SubscriptionGuard {
  /// Consumes the guard without disposing the subscription.
  pub fn into_inner(mut self) -> Subscription { self.0.take().unwrap_or_default() }
}

impl Drop for SubscriptionGuard {
  fn drop(&mut self) {
    if let Some(subscription) = self.0.take() {
      subscription.dispose();
    }
  }
}
