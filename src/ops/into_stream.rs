//! IntoStream Operator
//!
//! Converts an `Observable` into a `futures::Stream`, so emissions can be
//! consumed with `while let` loops and the rest of the async ecosystem.
//!
//! # Example
//!
//! ```rust
//! use futures::{executor::block_on, StreamExt};
//! use rxkit::prelude::*;
//!
//! let values: Vec<_> =
//!   block_on(observable::from_iter::<_, ()>(1..=3).into_stream().collect());
//! assert_eq!(values, vec![Ok(1), Ok(2), Ok(3)]);
//! ```

use std::{
  collections::VecDeque,
  pin::Pin,
  sync::Arc,
  task::{Context, Poll, Waker},
};

use futures::stream::Stream;
use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::{Disposable, Subscription},
};

/// Buffer shared between the subscription and the stream consumer.
struct IntoStreamState<T, E> {
  /// Items and errors waiting to be polled.
  queue: VecDeque<Result<T, E>>,
  /// The task waiting on the stream.
  waker: Option<Waker>,
  /// The upstream has completed or errored.
  is_closed: bool,
}

impl<T, E> Default for IntoStreamState<T, E> {
  fn default() -> Self { Self { queue: VecDeque::new(), waker: None, is_closed: false } }
}

/// A `Stream` that yields values emitted by an `Observable`.
///
/// This struct is created via the
/// [`into_stream`](crate::observable::ObservableExt::into_stream) method.
///
/// - `Ok(T)`: for each `next` value from the observable.
/// - `Err(E)`: when the observable signals an `error`.
/// - `None`: end of stream, after completion or after the error.
///
/// Values are buffered without bound until polled. Dropping the stream
/// disposes the subscription.
pub struct IntoStream<T, E> {
  state: Arc<Mutex<IntoStreamState<T, E>>>,
  subscription: Option<Subscription>,
}

impl<T: Send + 'static, E: Send + 'static> IntoStream<T, E> {
  pub(crate) fn new<O>(observable: O) -> Self
  where
    O: Observable<Item = T, Err = E>,
  {
    let state = Arc::new(Mutex::new(IntoStreamState::default()));
    let subscription = observable.subscribe_with(IntoStreamObserver { state: state.clone() });
    IntoStream { state, subscription: Some(subscription) }
  }
}

impl<T, E> Stream for IntoStream<T, E> {
  type Item = Result<T, E>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let mut state = self.state.lock();
    if let Some(item) = state.queue.pop_front() {
      return Poll::Ready(Some(item));
    }
    if state.is_closed {
      return Poll::Ready(None);
    }
    state.waker = Some(cx.waker().clone());
    Poll::Pending
  }
}

impl<T, E> Drop for IntoStream<T, E> {
  fn drop(&mut self) {
    if let Some(subscription) = self.subscription.take() {
      subscription.dispose();
    }
  }
}

struct IntoStreamObserver<T, E> {
  state: Arc<Mutex<IntoStreamState<T, E>>>,
}

impl<T, E> IntoStreamObserver<T, E> {
  fn push(&self, item: Option<Result<T, E>>) {
    let waker = {
      let mut state = self.state.lock();
      match item {
        Some(item) => state.queue.push_back(item),
        None => state.is_closed = true,
      }
      state.waker.take()
    };
    if let Some(waker) = waker {
      waker.wake();
    }
  }
}

impl<T, E> Observer<T, E> for IntoStreamObserver<T, E> {
  fn next(&mut self, value: T) { self.push(Some(Ok(value))) }

  fn error(self, err: E) {
    self.push(Some(Err(err)));
    self.push(None);
  }

  fn complete(self) { self.push(None) }

  fn is_closed(&self) -> bool { self.state.lock().is_closed }
}
