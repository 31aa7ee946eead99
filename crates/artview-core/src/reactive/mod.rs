#![forbid(unsafe_code)]

//! Shared cells for cross-panel state.
//!
//! - [`Observable`]: a shared value slot with subscriber callbacks and an
//!   advisory [`Strength`] flag on every change.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Value`] / [`SharedCell`]: the dynamically typed payload panels share.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Every notification runs synchronously on the thread that
//! called `change()`; there is no queue and no deferral.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. The subscriber list is snapshotted at the start of a pass.
//! 3. Two handles are the same cell iff [`Observable::ptr_eq`] says so.

pub mod observable;
pub mod value;

pub use observable::{Observable, Strength, Subscription, SubscriptionId};
pub use value::{SharedCell, Value};
