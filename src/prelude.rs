//! Everything needed to build and consume pipelines with one `use`.

pub use crate::{
  error::{RxError, SingleError},
  observable::{self, BoxedObservable, Observable, ObservableExt},
  observer::{FnObserver, Observer, Signal},
  ops::{
    retry_backoff::{
      retry_policy, BackoffConfig, RetryController, RetryDecision, RetryPolicy, RetryState,
      UNCAPPED_MAX_DELAY,
    },
    single::{Completable, CompletableEmitter, Maybe, MaybeEmitter, Single, SingleEmitter},
    throttle::ThrottleEdge,
  },
  scheduler::{ImmediateScheduler, QueueScheduler, Scheduler, TaskHandle},
  subject::{
    AsyncSubject, BehaviorRelay, BehaviorSubject, PublishRelay, PublishSubject, ReplaySubject,
  },
  subscriber::Subscriber,
  subscription::{CompositeDisposable, Disposable, Subscription, SubscriptionGuard},
};
