use super::{Disposable, Subscription};

/// An owning bag of disposables, disposed together.
///
/// The bag exclusively owns everything added to it. Disposing the bag (or
/// dropping it) disposes the children in insertion order and then marks the
/// bag disposed, so anything added later is disposed straight away instead of
/// leaking.
///
/// # Examples
///
/// ```rust
/// use rxkit::prelude::*;
///
/// let bag = CompositeDisposable::new();
/// let subject = PublishSubject::<i32, ()>::new();
///
/// bag.add(subject.clone().subscribe(|v| println!("{v}")));
/// subject.on_next(1);
///
/// bag.dispose();
/// subject.on_next(2); // nobody is listening any more
/// assert_eq!(subject.observer_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct CompositeDisposable {
  inner: Subscription,
}

impl CompositeDisposable {
  pub fn new() -> Self { Self::default() }

  /// Moves `disposable` into the bag.
  pub fn add<D: Disposable + Send + 'static>(&self, disposable: D) {
    if self.inner.is_disposed() {
      disposable.dispose();
    } else {
      self.inner.add(disposable);
    }
  }

  /// Number of children that are still live.
  pub fn len(&self) -> usize { self.inner.teardown_size() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Disposable for CompositeDisposable {
  #[inline]
  fn dispose(&self) { self.inner.dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { self.inner.is_disposed() }
}

impl Drop for CompositeDisposable {
  fn drop(&mut self) { self.inner.dispose() }
}
