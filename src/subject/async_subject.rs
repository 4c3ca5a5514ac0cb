use super::subject_core::{Replay, SubjectCore};

/// A subject that emits only its final value, and only on completion.
///
/// Values pushed while live are held back; `on_completed` delivers the last
/// one (if any) followed by `Completed` to every subscriber, including those
/// arriving later. An error discards the held value.
///
/// ```rust
/// use rxkit::prelude::*;
///
/// let subject = AsyncSubject::<&str, ()>::new();
/// let seen = std::sync::Arc::new(parking_lot::Mutex::new(vec![]));
/// let s = seen.clone();
/// subject.clone().subscribe(move |v| s.lock().push(v));
///
/// subject.on_next("a");
/// subject.on_next("b");
/// subject.on_next("c");
/// assert!(seen.lock().is_empty());
/// subject.on_completed();
/// assert_eq!(*seen.lock(), vec!["c"]);
/// ```
pub struct AsyncSubject<Item, Err> {
  core: SubjectCore<Item, Err>,
}

impl<Item, Err> AsyncSubject<Item, Err> {
  pub fn new() -> Self { Self { core: SubjectCore::new(Replay::Last(None)) } }
}

impl<Item, Err> Default for AsyncSubject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl_subject!(AsyncSubject);

#[cfg(test)]
mod test {
  use std::sync::Arc;

  use parking_lot::Mutex;

  use crate::prelude::*;

  type Log = Arc<Mutex<Vec<Signal<&'static str, &'static str>>>>;

  fn record(subject: &AsyncSubject<&'static str, &'static str>) -> Log {
    let log: Log = Arc::new(Mutex::new(vec![]));
    let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
    subject.clone().subscribe_all(
      move |v| l1.lock().push(Signal::Next(v)),
      move |e| l2.lock().push(Signal::Error(e)),
      move || l3.lock().push(Signal::Completed),
    );
    log
  }

  #[test]
  fn emits_last_value_on_completion() {
    let subject = AsyncSubject::new();
    let early = record(&subject);
    subject.on_next("a");
    subject.on_next("b");
    subject.on_next("c");
    assert!(early.lock().is_empty());
    subject.on_completed();
    let late = record(&subject);

    let expected = vec![Signal::Next("c"), Signal::Completed];
    assert_eq!(*early.lock(), expected);
    assert_eq!(*late.lock(), expected);
  }

  #[test]
  fn completes_without_value_when_nothing_was_pushed() {
    let subject = AsyncSubject::new();
    let log = record(&subject);
    subject.on_completed();
    assert_eq!(*log.lock(), vec![Signal::Completed]);
  }

  #[test]
  fn error_discards_the_held_value() {
    let subject = AsyncSubject::new();
    let early = record(&subject);
    subject.on_next("a");
    subject.on_error("failed");
    let late = record(&subject);
    assert_eq!(*early.lock(), vec![Signal::Error("failed")]);
    assert_eq!(*late.lock(), vec![Signal::Error("failed")]);
  }
}
