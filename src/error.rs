use thiserror::Error;

/// Error surfaced by the retry family once it stops resubscribing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RxError<E> {
  /// The source error, passed through unchanged (the policy gave up).
  #[error("source failed: {0:?}")]
  Source(E),
  /// The retry budget ran out; `last` is the final source error.
  #[error("gave up after {retries} retries, last error: {last:?}")]
  ExhaustedRetries { retries: usize, last: E },
}

impl<E> RxError<E> {
  /// The underlying source error, whichever way retrying stopped.
  pub fn into_source(self) -> E {
    match self {
      RxError::Source(e) | RxError::ExhaustedRetries { last: e, .. } => e,
    }
  }

  pub fn is_exhausted(&self) -> bool { matches!(self, RxError::ExhaustedRetries { .. }) }
}

/// Error of a [`Single`](crate::ops::single::Single) or
/// [`Maybe`](crate::ops::single::Maybe) whose source broke the value count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SingleError<E> {
  #[error("source failed: {0:?}")]
  Source(E),
  /// The source completed without a value where one was required.
  #[error("sequence contains no elements")]
  NoElements,
  #[error("sequence contains more than one element")]
  MoreThanOneElement,
}
