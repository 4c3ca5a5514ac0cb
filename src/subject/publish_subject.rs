use super::subject_core::{Replay, SubjectCore};

/// A subject without memory: subscribers only see what is pushed after they
/// subscribed.
pub struct PublishSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> PublishSubject<Item, Err> {
  pub fn new() -> Self { Self { core: SubjectCore::new(Replay::None) } }
}

impl<Item, Err> Default for PublishSubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl_subject!(PublishSubject);
