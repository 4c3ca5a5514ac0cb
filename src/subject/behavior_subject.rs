use super::subject_core::{Latest, SubjectCore};

/// A subject that always holds a current value.
///
/// Subscribers immediately receive the current value, then every later one.
/// The value is updated by each `on_next`, and stays readable through
/// [`value`](Self::value) after the subject terminated.
pub struct BehaviorSubject<Item, Err> {
  core: SubjectCore<Item, Err, Latest<Item>>,
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(initial: Item) -> Self { Self { core: SubjectCore::new(Latest(initial)) } }
}

impl<Item: Clone, Err> BehaviorSubject<Item, Err> {
  /// The most recent value, or the initial one when nothing was pushed yet.
  pub fn value(&self) -> Item { self.core.latest() }
}

impl_subject!(BehaviorSubject);
