use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::Observable,
  observer::{Observer, Signal},
  subscriber::Subscriber,
};

/// Created by
/// [`ObservableExt::combine_latest`](crate::observable::ObservableExt::combine_latest).
pub struct CombineLatestOp<A, B, BinaryOp> {
  a: A,
  b: B,
  binary_op: Arc<BinaryOp>,
}

impl<A, B, BinaryOp> CombineLatestOp<A, B, BinaryOp> {
  pub(crate) fn new(a: A, b: B, binary_op: BinaryOp) -> Self {
    Self { a, b, binary_op: Arc::new(binary_op) }
  }
}

impl<A: Clone, B: Clone, BinaryOp> Clone for CombineLatestOp<A, B, BinaryOp> {
  fn clone(&self) -> Self {
    Self { a: self.a.clone(), b: self.b.clone(), binary_op: self.binary_op.clone() }
  }
}

impl<A, B, BinaryOp, OutputItem> Observable for CombineLatestOp<A, B, BinaryOp>
where
  A: Observable,
  B: Observable<Err = A::Err>,
  A::Item: Clone,
  B::Item: Clone,
  BinaryOp: Fn(A::Item, B::Item) -> OutputItem + Send + Sync + 'static,
  OutputItem: Send + 'static,
{
  type Item = OutputItem;
  type Err = A::Err;

  fn actual_subscribe(&self, subscriber: Subscriber<OutputItem, A::Err>) {
    let combine = CombineLatestObserver {
      observer: subscriber.clone(),
      state: Arc::new(Mutex::new(CombineState { a: None, b: None, completed: 0 })),
      binary_op: self.binary_op.clone(),
    };
    let a: Subscriber<A::Item, A::Err> = subscriber.chain(AObserver(combine.clone()));
    let b: Subscriber<B::Item, A::Err> = subscriber.chain(BObserver(combine));
    self.a.actual_subscribe(a);
    self.b.actual_subscribe(b);
  }
}

struct CombineState<ItemA, ItemB> {
  a: Option<ItemA>,
  b: Option<ItemB>,
  completed: u8,
}

pub struct CombineLatestObserver<ItemA, ItemB, OutputItem, Err, BinaryOp> {
  observer: Subscriber<OutputItem, Err>,
  state: Arc<Mutex<CombineState<ItemA, ItemB>>>,
  binary_op: Arc<BinaryOp>,
}

impl<ItemA, ItemB, OutputItem, Err, BinaryOp> Clone
  for CombineLatestObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>
{
  fn clone(&self) -> Self {
    Self {
      observer: self.observer.clone(),
      state: self.state.clone(),
      binary_op: self.binary_op.clone(),
    }
  }
}

impl<ItemA, ItemB, OutputItem, Err, BinaryOp>
  CombineLatestObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>
where
  ItemA: Clone,
  ItemB: Clone,
  BinaryOp: Fn(ItemA, ItemB) -> OutputItem,
{
  /// Combinations are queued downstream while the state lock is held, so
  /// racing sides can never deliver an older pair after a newer one.
  fn emit_latest(&mut self, update: impl FnOnce(&mut CombineState<ItemA, ItemB>)) {
    let claimed = {
      let mut state = self.state.lock();
      update(&mut state);
      match (&state.a, &state.b) {
        (Some(a), Some(b)) => {
          let combined = (self.binary_op)(a.clone(), b.clone());
          self.observer.enqueue(Signal::Next(combined))
        }
        _ => None,
      }
    };
    self.observer.release_claim(claimed);
  }

  /// Completes once both sides completed, or as soon as one side completes
  /// without ever having emitted.
  fn side_completed(self, never_emitted: impl FnOnce(&CombineState<ItemA, ItemB>) -> bool) {
    let claimed = {
      let mut state = self.state.lock();
      state.completed += 1;
      if state.completed == 2 || never_emitted(&state) {
        self.observer.enqueue(Signal::Completed)
      } else {
        None
      }
    };
    self.observer.release_claim(claimed);
  }
}

pub struct AObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>(
  CombineLatestObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>,
);

pub struct BObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>(
  CombineLatestObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>,
);

impl<ItemA, ItemB, OutputItem, Err, BinaryOp> Observer<ItemA, Err>
  for AObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>
where
  ItemA: Clone,
  ItemB: Clone,
  BinaryOp: Fn(ItemA, ItemB) -> OutputItem,
{
  fn next(&mut self, value: ItemA) { self.0.emit_latest(|state| state.a = Some(value)) }

  fn error(self, err: Err) { self.0.observer.error(err) }

  fn complete(self) { self.0.side_completed(|state| state.a.is_none()) }

  fn is_closed(&self) -> bool { self.0.observer.is_closed() }
}

impl<ItemA, ItemB, OutputItem, Err, BinaryOp> Observer<ItemB, Err>
  for BObserver<ItemA, ItemB, OutputItem, Err, BinaryOp>
where
  ItemA: Clone,
  ItemB: Clone,
  BinaryOp: Fn(ItemA, ItemB) -> OutputItem,
{
  fn next(&mut self, value: ItemB) { self.0.emit_latest(|state| state.b = Some(value)) }

  fn error(self, err: Err) { self.0.observer.error(err) }

  fn complete(self) { self.0.side_completed(|state| state.b.is_none()) }

  fn is_closed(&self) -> bool { self.0.observer.is_closed() }
}
