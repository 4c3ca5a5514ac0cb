//! Operator implementations.
//!
//! One module per operator. Each exposes the operator struct returned by the
//! matching [`ObservableExt`](crate::observable::ObservableExt) method, plus
//! the observer it subscribes upstream with.

pub mod catch_error;
pub mod combine_latest;
pub mod concat;
pub mod debug;
pub mod delay;
pub mod enumerate;
pub mod filter;
pub mod flat_map;
pub mod flat_map_latest;
pub mod ignore_elements;
#[cfg(feature = "stream")]
pub mod into_stream;
pub mod map;
pub mod merge;
pub mod observe_on;
pub mod retry;
pub mod retry_backoff;
pub mod retry_when;
pub mod share;
pub mod single;
pub mod skip;
pub mod start_with;
pub mod take;
pub mod throttle;
pub mod with_latest_from;
pub mod zip;
