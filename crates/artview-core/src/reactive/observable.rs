#![forbid(unsafe_code)]

//! Observable cell with synchronous change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value of type `T` in shared, reference-counted
//! storage (`Rc<RefCell<..>>`). Every call to [`Observable::change`] stores the
//! new value and then notifies all subscribers in registration order, on the
//! caller's thread, before returning.
//!
//! Unlike a diffing signal, a cell notifies on every `change`, including when
//! the new value equals the old one. Panels use a repeated `change` to force
//! a redraw, so `T` is not required to implement `PartialEq`.
//!
//! # Performance
//!
//! | Operation       | Complexity                 |
//! |-----------------|----------------------------|
//! | `get()`         | O(1) + clone of `T`        |
//! | `change()`      | O(S) where S = subscribers |
//! | `subscribe()`   | O(1) amortized             |
//! | `unsubscribe()` | O(S)                       |
//!
//! # Failure Modes
//!
//! - **Re-entrant edits**: the subscriber list is snapshotted before delivery.
//!   A handler that subscribes, unsubscribes, or calls `change()` on the cell
//!   that is notifying it only affects later passes. A nested `change()`
//!   starts its own full pass before the outer pass resumes.
//! - **Panicking handler**: the panic unwinds out of `change()`. Handlers after
//!   the panicking one are not called for that pass; the value is already
//!   stored.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// How urgently subscribers should react to a change.
///
/// The cell never interprets this flag; it is passed through to every
/// handler unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
    /// Recompute and redraw now.
    #[default]
    Strong,
    /// Record the new value; expensive work may be deferred or skipped.
    Weak,
}

impl Strength {
    /// Whether this is a strong change.
    #[inline]
    #[must_use]
    pub fn is_strong(self) -> bool {
        matches!(self, Self::Strong)
    }
}

/// Identifies one subscription on one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric id, unique within the owning cell.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

type HandlerRc<T> = Rc<dyn Fn(&Observable<T>, &T, Strength)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, HandlerRc<T>)>,
}

/// A shared value slot with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** inner state:
/// both handles see the same value and share subscribers. Use
/// [`Observable::ptr_eq`] to test whether two handles are the same cell.
///
/// # Invariants
///
/// 1. `get()` returns exactly the value of the most recent `change()`.
/// 2. `version` increments by exactly 1 on each `change()`/`update()`.
/// 3. Subscribers are notified in registration order.
/// 4. An unsubscribed handler is not called in later passes. A pass
///    already under way still reaches every handler it snapshotted.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    /// Whether `self` and `other` are handles to the same cell.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Whether `id` is currently subscribed to this cell.
    #[must_use]
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .any(|(sid, _)| *sid == id)
    }

    /// Remove a subscriber. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        inner.subscribers.len() != before
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create a new cell with the given initial value.
    ///
    /// The initial version is 0 and no subscribers are registered.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    ///
    /// Calling `change()` on the same cell from inside `f` panics.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify every subscriber with `strength`.
    pub fn change(&self, value: T, strength: Strength) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.value = value;
            inner.version += 1;
        }
        self.notify(strength);
    }

    /// Shorthand for `change(value, Strength::Strong)`.
    pub fn set(&self, value: T) {
        self.change(value, Strength::Strong);
    }

    /// Modify the value in place, then notify every subscriber.
    pub fn update(&self, f: impl FnOnce(&mut T), strength: Strength) {
        {
            let mut inner = self.inner.borrow_mut();
            f(&mut inner.value);
            inner.version += 1;
        }
        self.notify(strength);
    }

    /// Subscribe a handler. It receives the cell, the new value, and the
    /// strength of every subsequent change.
    pub fn subscribe(
        &self,
        handler: impl Fn(&Observable<T>, &T, Strength) + 'static,
    ) -> SubscriptionId {
        self.subscribe_rc(Rc::new(handler))
    }

    /// Subscribe an already shared handler.
    ///
    /// The same `Rc` may be subscribed to several cells; each subscription
    /// gets its own id.
    pub fn subscribe_rc(
        &self,
        handler: Rc<dyn Fn(&Observable<T>, &T, Strength)>,
    ) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push((id, handler));
        id
    }

    /// Subscribe and return a guard that unsubscribes on drop.
    pub fn subscribe_scoped(
        &self,
        handler: impl Fn(&Observable<T>, &T, Strength) + 'static,
    ) -> Subscription {
        let id = self.subscribe(handler);
        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            id,
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    Observable { inner }.unsubscribe(id);
                }
            })),
        }
    }

    /// Re-deliver the current value to every subscriber.
    pub fn notify(&self, strength: Strength) {
        // Snapshot so handlers can edit the subscriber list mid-pass.
        let (handlers, value) = {
            let inner = self.inner.borrow();
            let handlers: Vec<HandlerRc<T>> = inner
                .subscribers
                .iter()
                .map(|(_, h)| Rc::clone(h))
                .collect();
            (handlers, inner.value.clone())
        };
        for handler in &handlers {
            handler(self, &value, strength);
        }
    }

    /// Re-deliver the current value to a single subscriber.
    ///
    /// Returns `false` if `id` is not subscribed.
    pub fn notify_one(&self, id: SubscriptionId, strength: Strength) -> bool {
        let found = {
            let inner = self.inner.borrow();
            inner
                .subscribers
                .iter()
                .find(|(sid, _)| *sid == id)
                .map(|(_, h)| (Rc::clone(h), inner.value.clone()))
        };
        match found {
            Some((handler, value)) => {
                handler(self, &value, strength);
                true
            }
            None => false,
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` removes the handler from the cell. If the
/// cell is already gone, dropping is a no-op.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// The id of the guarded subscription.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the handler subscribed for the lifetime of the cell.
    pub fn forget(mut self) -> SubscriptionId {
        self.cancel = None;
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_change_basic() {
        let obs = Observable::new(42);
        assert_eq!(obs.get(), 42);
        assert_eq!(obs.version(), 0);

        obs.change(99, Strength::Weak);
        assert_eq!(obs.get(), 99);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_value_still_notifies() {
        let obs = Observable::new(7);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        obs.subscribe(move |_, _, _| count_clone.set(count_clone.get() + 1));

        obs.set(7);
        obs.set(7);
        assert_eq!(count.get(), 2);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn with_access() {
        let obs = Observable::new(vec![1, 2, 3]);
        let sum = obs.with(|v| v.iter().sum::<i32>());
        assert_eq!(sum, 6);
    }

    #[test]
    fn update_mutates_in_place() {
        let obs = Observable::new(vec![1, 2, 3]);
        let last_len = Rc::new(Cell::new(0usize));
        let last_clone = Rc::clone(&last_len);
        obs.subscribe(move |_, v: &Vec<i32>, _| last_clone.set(v.len()));

        obs.update(|v| v.push(4), Strength::Strong);
        assert_eq!(obs.get(), vec![1, 2, 3, 4]);
        assert_eq!(last_len.get(), 4);
    }

    #[test]
    fn handler_receives_cell_value_and_strength() {
        let obs = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        let handle = obs.clone();
        obs.subscribe(move |cell, v, s| {
            assert!(cell.ptr_eq(&handle));
            seen_clone.borrow_mut().push((*v, s));
        });

        obs.change(1, Strength::Strong);
        obs.change(2, Strength::Weak);
        assert_eq!(
            *seen.borrow(),
            vec![(1, Strength::Strong), (2, Strength::Weak)]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let obs = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        let id = obs.subscribe(move |_, _, _| count_clone.set(count_clone.get() + 1));

        assert!(obs.unsubscribe(id));
        obs.set(1);
        assert_eq!(count.get(), 0);
        // Second unsubscribe is a no-op.
        assert!(!obs.unsubscribe(id));
    }

    #[test]
    fn scoped_subscription_drop_unsubscribes() {
        let obs = Observable::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        let sub = obs.subscribe_scoped(move |_, _, _| count_clone.set(count_clone.get() + 1));
        obs.set(1);
        assert_eq!(count.get(), 1);

        drop(sub);
        obs.set(2);
        assert_eq!(count.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn forgotten_subscription_survives() {
        let obs = Observable::new(0);
        let id = obs.subscribe_scoped(|_, _, _| {}).forget();
        assert!(obs.is_subscribed(id));
    }

    #[test]
    fn clone_shares_state_and_subscribers() {
        let obs1 = Observable::new(0);
        let obs2 = obs1.clone();
        assert!(obs1.ptr_eq(&obs2));

        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);
        obs1.subscribe(move |_, _, _| count_clone.set(count_clone.get() + 1));

        obs2.set(42);
        assert_eq!(obs1.get(), 42);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn distinct_cells_are_not_ptr_eq() {
        let a = Observable::new(1);
        let b = Observable::new(1);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        for tag in ['A', 'B', 'C'] {
            let log = Rc::clone(&log);
            obs.subscribe(move |_, _, _| log.borrow_mut().push(tag));
        }

        obs.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn self_unsubscribe_during_pass_keeps_later_handlers() {
        let obs = Observable::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let own_id = Rc::new(Cell::new(None));

        let log_a = Rc::clone(&log);
        let own_id_a = Rc::clone(&own_id);
        let id = obs.subscribe(move |cell, _, _| {
            log_a.borrow_mut().push('A');
            if let Some(id) = own_id_a.get() {
                cell.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        let log_b = Rc::clone(&log);
        obs.subscribe(move |_, _, _| log_b.borrow_mut().push('B'));

        obs.set(1);
        obs.set(2);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'B']);
    }

    #[test]
    fn subscribe_during_pass_applies_to_next_pass() {
        let obs = Observable::new(0);
        let late = Rc::new(Cell::new(0u32));
        let added = Rc::new(Cell::new(false));

        let late_outer = Rc::clone(&late);
        let added_clone = Rc::clone(&added);
        obs.subscribe(move |cell, _, _| {
            if !added_clone.replace(true) {
                let late = Rc::clone(&late_outer);
                cell.subscribe(move |_, _, _| late.set(late.get() + 1));
            }
        });

        obs.set(1);
        assert_eq!(late.get(), 0);
        obs.set(2);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn nested_change_from_handler() {
        let obs = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = Rc::clone(&seen);
        obs.subscribe(move |cell, v, _| {
            seen_clone.borrow_mut().push(*v);
            if *v == 1 {
                cell.change(2, Strength::Weak);
            }
        });

        obs.set(1);
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(obs.get(), 2);
    }

    #[test]
    fn notify_one_targets_single_handler() {
        let obs = Observable::new(5);
        let a = Rc::new(Cell::new(0u32));
        let b = Rc::new(Cell::new(0u32));
        let a_clone = Rc::clone(&a);
        let b_clone = Rc::clone(&b);
        let id_a = obs.subscribe(move |_, _, _| a_clone.set(a_clone.get() + 1));
        obs.subscribe(move |_, _, _| b_clone.set(b_clone.get() + 1));

        assert!(obs.notify_one(id_a, Strength::Strong));
        assert_eq!((a.get(), b.get()), (1, 0));
        assert_eq!(obs.version(), 0);

        obs.unsubscribe(id_a);
        assert!(!obs.notify_one(id_a, Strength::Strong));
    }

    #[test]
    fn debug_format() {
        let obs = Observable::new(42);
        let dbg = format!("{:?}", obs);
        assert!(dbg.contains("Observable"));
        assert!(dbg.contains("42"));
        assert!(dbg.contains("version"));
    }

    #[test]
    fn strength_default_is_strong() {
        assert_eq!(Strength::default(), Strength::Strong);
        assert!(Strength::Strong.is_strong());
        assert!(!Strength::Weak.is_strong());
    }
}
