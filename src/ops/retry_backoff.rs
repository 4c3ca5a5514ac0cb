//! Policy-driven retry with scheduled back-off.
//!
//! [`RetryController`] is the state machine behind
//! [`retry_with_backoff`](crate::observable::ObservableExt::retry_with_backoff):
//!
//! ```text
//!            error, index < max       delay elapsed (index += 1)
//! Attempting ----------------------> DelayingRetry -------------> Attempting
//!     |
//!     | error, index >= max (or the policy gives up)
//!     v
//! Exhausted
//! ```
//!
//! Delays are scheduled, never slept. The pending task is owned by the
//! subscription, so disposing while a retry is pending cancels it.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//!
//! use rxkit::prelude::*;
//!
//! let scheduler = QueueScheduler::new();
//! let error = std::sync::Arc::new(parking_lot::Mutex::new(None));
//! let e = error.clone();
//! observable::throw_err::<i32, _>("timeout")
//!   .retry_with_backoff(
//!     BackoffConfig::new()
//!       .max_retries(2)
//!       .delay(Duration::from_millis(100))
//!       .exponential(2.),
//!     scheduler.clone(),
//!   )
//!   .subscribe_err(|_| {}, move |err| *e.lock() = Some(err));
//!
//! // retries fire after 100ms and then 200ms
//! scheduler.advance_by(Duration::from_millis(300));
//! assert_eq!(
//!   *error.lock(),
//!   Some(RxError::ExhaustedRetries { retries: 2, last: "timeout" })
//! );
//! ```

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
  error::RxError,
  observable::Observable,
  observer::{Observer, Signal},
  scheduler::{Scheduler, Trampoline},
  subscriber::Subscriber,
};

/// What to do about one failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision<Err> {
  /// Resubscribe once the delay has elapsed.
  RetryAfter(Duration),
  /// Stop and surface this error as [`RxError::Source`].
  GiveUp(Err),
}

/// Decides whether and when a failed source is attempted again.
///
/// `decide` is only consulted while `index < max_retries()`; once the budget
/// is spent the controller gives up with [`RxError::ExhaustedRetries`] on its
/// own.
///
/// # Custom Policy Example
///
/// ```rust
/// use std::time::Duration;
///
/// use rxkit::prelude::*;
///
/// struct HttpRetry;
///
/// impl RetryPolicy<u16> for HttpRetry {
///   fn max_retries(&self) -> usize { 3 }
///
///   fn decide(&self, index: usize, status: u16) -> RetryDecision<u16> {
///     match status {
///       500..=599 => RetryDecision::RetryAfter(Duration::from_millis(500) * (index as u32 + 1)),
///       429 => RetryDecision::RetryAfter(Duration::from_secs(2)),
///       _ => RetryDecision::GiveUp(status),
///     }
///   }
/// }
/// ```
pub trait RetryPolicy<Err>: Send + Sync + 'static {
  /// Number of retries allowed after the first attempt. `0` means exactly
  /// one attempt.
  fn max_retries(&self) -> usize;

  /// Called with the zero-based retry index and the error of the attempt
  /// that just failed.
  fn decide(&self, index: usize, err: Err) -> RetryDecision<Err>;

  /// Whether a value from the source resets the retry index to zero.
  fn reset_on_success(&self) -> bool { false }
}

/// A plain count retries immediately, that many times.
impl<Err> RetryPolicy<Err> for usize {
  fn max_retries(&self) -> usize { *self }

  fn decide(&self, _index: usize, _err: Err) -> RetryDecision<Err> {
    RetryDecision::RetryAfter(Duration::ZERO)
  }
}

/// Longest delay a [`BackoffConfig`] without `max_delay` ever asks for.
pub const UNCAPPED_MAX_DELAY: Duration = Duration::from_secs(u32::MAX as u64);

/// Builder for the common back-off shapes.
///
/// The delay before retry `i` is `delay * factor^i`, capped at `max_delay`
/// (or [`UNCAPPED_MAX_DELAY`] when no cap is set).
///
/// ```rust
/// use std::time::Duration;
///
/// use rxkit::prelude::*;
///
/// let config = BackoffConfig::new()
///   .max_retries(5)
///   .delay(Duration::from_millis(250))
///   .exponential(2.)
///   .max_delay(Duration::from_secs(5))
///   .reset_on_success();
/// assert_eq!(
///   RetryPolicy::<()>::decide(&config, 3, ()),
///   RetryDecision::RetryAfter(Duration::from_secs(2))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct BackoffConfig {
  max_retries: usize,
  delay: Duration,
  factor: f64,
  max_delay: Option<Duration>,
  reset_on_success: bool,
}

impl BackoffConfig {
  /// No retries, no delay.
  pub fn new() -> Self {
    Self { max_retries: 0, delay: Duration::ZERO, factor: 1., max_delay: None, reset_on_success: false }
  }

  /// `max_retries(3)` allows up to 4 subscriptions (1 initial + 3 retries).
  pub fn max_retries(mut self, count: usize) -> Self {
    self.max_retries = count;
    self
  }

  /// Delay before the first retry.
  pub fn delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  /// Multiplies the delay by `factor` after every retry. Factors below `1`
  /// are treated as `1`.
  pub fn exponential(mut self, factor: f64) -> Self {
    self.factor = factor.max(1.);
    self
  }

  /// Upper bound for any single delay.
  pub fn max_delay(mut self, max_delay: Duration) -> Self {
    self.max_delay = Some(max_delay);
    self
  }

  /// Resets the retry index whenever the source emits a value.
  pub fn reset_on_success(mut self) -> Self {
    self.reset_on_success = true;
    self
  }

  fn delay_for(&self, index: usize) -> Duration {
    let cap = self.max_delay.unwrap_or(UNCAPPED_MAX_DELAY);
    if self.delay.is_zero() {
      return Duration::ZERO;
    }
    let exponent = i32::try_from(index).unwrap_or(i32::MAX);
    let secs = self.delay.as_secs_f64() * self.factor.powi(exponent);
    // overflowing products fall back to the cap
    Duration::try_from_secs_f64(secs).map_or(cap, |delay| delay.min(cap))
  }
}

impl Default for BackoffConfig {
  fn default() -> Self { Self::new() }
}

impl<Err> RetryPolicy<Err> for BackoffConfig {
  fn max_retries(&self) -> usize { self.max_retries }

  fn decide(&self, index: usize, _err: Err) -> RetryDecision<Err> {
    RetryDecision::RetryAfter(self.delay_for(index))
  }

  fn reset_on_success(&self) -> bool { self.reset_on_success }
}

/// A policy from a closure and a retry budget.
pub fn retry_policy<Err, F>(max_retries: usize, decide: F) -> FnPolicy<F>
where
  F: Fn(usize, Err) -> RetryDecision<Err> + Send + Sync + 'static,
{
  FnPolicy { max_retries, decide }
}

#[derive(Clone)]
pub struct FnPolicy<F> {
  max_retries: usize,
  decide: F,
}

impl<Err, F> RetryPolicy<Err> for FnPolicy<F>
where
  F: Fn(usize, Err) -> RetryDecision<Err> + Send + Sync + 'static,
{
  fn max_retries(&self) -> usize { self.max_retries }

  fn decide(&self, index: usize, err: Err) -> RetryDecision<Err> { (self.decide)(index, err) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
  Attempting,
  DelayingRetry,
  Exhausted,
}

/// Retry bookkeeping for one subscription.
#[derive(Debug)]
pub struct RetryController {
  state: RetryState,
  index: usize,
}

impl RetryController {
  pub fn new() -> Self { Self { state: RetryState::Attempting, index: 0 } }

  pub fn state(&self) -> RetryState { self.state }

  /// Retries started so far.
  pub fn retries(&self) -> usize { self.index }

  /// Feeds the error of the current attempt. `Ok(delay)` means a retry is
  /// due after `delay`; `Err` is the terminal error to surface.
  pub fn on_error<Err, P>(&mut self, err: Err, policy: &P) -> Result<Duration, RxError<Err>>
  where
    P: RetryPolicy<Err> + ?Sized,
  {
    if self.state != RetryState::Attempting {
      // a stray error after the machine moved on
      return Err(RxError::Source(err));
    }
    if self.index >= policy.max_retries() {
      self.state = RetryState::Exhausted;
      debug!(retries = self.index, "retry: Attempting -> Exhausted (budget spent)");
      return Err(RxError::ExhaustedRetries { retries: self.index, last: err });
    }
    match policy.decide(self.index, err) {
      RetryDecision::RetryAfter(delay) => {
        self.state = RetryState::DelayingRetry;
        debug!(index = self.index, ?delay, "retry: Attempting -> DelayingRetry");
        Ok(delay)
      }
      RetryDecision::GiveUp(err) => {
        self.state = RetryState::Exhausted;
        debug!(index = self.index, "retry: Attempting -> Exhausted (policy gave up)");
        Err(RxError::Source(err))
      }
    }
  }

  /// The back-off delay is over; the next attempt starts now.
  pub fn on_delay_elapsed(&mut self) {
    if self.state == RetryState::DelayingRetry {
      self.index += 1;
      self.state = RetryState::Attempting;
      debug!(index = self.index, "retry: DelayingRetry -> Attempting");
    }
  }

  /// The source produced a value.
  pub fn on_success(&mut self) {
    if self.index != 0 {
      debug!(retries = self.index, "retry: index reset after a value");
      self.index = 0;
    }
  }
}

impl Default for RetryController {
  fn default() -> Self { Self::new() }
}

/// Created by
/// [`ObservableExt::retry_with_backoff`](crate::observable::ObservableExt::retry_with_backoff).
pub struct RetryWithBackoffOp<S, P, Sch> {
  source: S,
  policy: Arc<P>,
  scheduler: Sch,
}

impl<S, P, Sch> RetryWithBackoffOp<S, P, Sch> {
  pub(crate) fn new(source: S, policy: P, scheduler: Sch) -> Self {
    Self { source, policy: Arc::new(policy), scheduler }
  }
}

impl<S: Clone, P, Sch: Clone> Clone for RetryWithBackoffOp<S, P, Sch> {
  fn clone(&self) -> Self {
    Self { source: self.source.clone(), policy: self.policy.clone(), scheduler: self.scheduler.clone() }
  }
}

impl<S, P, Sch> Observable for RetryWithBackoffOp<S, P, Sch>
where
  S: Observable,
  P: RetryPolicy<S::Err>,
  Sch: Scheduler,
{
  type Item = S::Item;
  type Err = RxError<S::Err>;

  fn actual_subscribe(&self, subscriber: Subscriber<S::Item, RxError<S::Err>>) {
    let shared = Arc::new(BackoffShared {
      source: self.source.clone(),
      policy: self.policy.clone(),
      scheduler: self.scheduler.clone(),
      observer: subscriber,
      controller: Mutex::new(RetryController::new()),
      trampoline: Trampoline::new(),
    });
    let s = shared.clone();
    shared.trampoline.run(move || attempt(&s));
  }
}

struct BackoffShared<S: Observable, P, Sch> {
  source: S,
  policy: Arc<P>,
  scheduler: Sch,
  observer: Subscriber<S::Item, RxError<S::Err>>,
  controller: Mutex<RetryController>,
  /// Keeps inline schedulers from nesting one attempt inside the previous.
  trampoline: Trampoline,
}

fn attempt<S, P, Sch>(shared: &Arc<BackoffShared<S, P, Sch>>)
where
  S: Observable,
  P: RetryPolicy<S::Err>,
  Sch: Scheduler,
{
  if shared.observer.is_closed() {
    return;
  }
  let upstream: Subscriber<S::Item, S::Err> =
    shared.observer.chain(BackoffObserver { shared: shared.clone() });
  shared.source.actual_subscribe(upstream);
}

struct BackoffObserver<S: Observable, P, Sch> {
  shared: Arc<BackoffShared<S, P, Sch>>,
}

impl<S, P, Sch> Observer<S::Item, S::Err> for BackoffObserver<S, P, Sch>
where
  S: Observable,
  P: RetryPolicy<S::Err>,
  Sch: Scheduler,
{
  fn next(&mut self, value: S::Item) {
    if self.shared.policy.reset_on_success() {
      self.shared.controller.lock().on_success();
    }
    self.shared.observer.emit(Signal::Next(value));
  }

  fn error(self, err: S::Err) {
    let step = self.shared.controller.lock().on_error(err, &*self.shared.policy);
    match step {
      Ok(delay) => {
        let shared = self.shared.clone();
        let handle = self.shared.scheduler.schedule(Some(delay), move || {
          shared.controller.lock().on_delay_elapsed();
          let s = shared.clone();
          shared.trampoline.run(move || attempt(&s));
        });
        self.shared.observer.add(handle);
      }
      Err(err) => self.shared.observer.emit(Signal::Error(err)),
    }
  }

  fn complete(self) { self.shared.observer.emit(Signal::Completed) }

  fn is_closed(&self) -> bool { self.shared.observer.is_closed() }
}
