#![forbid(unsafe_code)]

//! Callback lists with RAII unsubscription.
//!
//! A [`Notifier<A, R>`] keeps callbacks as `Weak` pointers; the strong pointer
//! lives inside the [`Subscription`] returned by
//! [`subscribe`](Notifier::subscribe). Dropping the subscription drops the
//! callback, and the dead entry is pruned on the next notification.
//!
//! # Invariants
//!
//! 1. Callbacks run in registration order.
//! 2. A callback whose subscription was dropped never runs again, even when
//!    the drop happens during an ongoing notification.
//! 3. Notification iterates over a snapshot, so callbacks may subscribe or
//!    unsubscribe without corrupting the walk.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<A, R> = Box<dyn Fn(&A) -> R>;

/// Ordered list of weakly-held callbacks taking `&A` and returning `R`.
pub struct Notifier<A, R = ()> {
    slots: Rc<RefCell<Vec<Weak<Callback<A, R>>>>>,
}

impl<A, R> Clone for Notifier<A, R> {
    fn clone(&self) -> Self {
        Self {
            slots: Rc::clone(&self.slots),
        }
    }
}

impl<A, R> Default for Notifier<A, R> {
    fn default() -> Self {
        Self {
            slots: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<A, R> std::fmt::Debug for Notifier<A, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<A: 'static, R: 'static> Notifier<A, R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered while the returned
    /// [`Subscription`] is alive.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&A) -> R + 'static) -> Subscription {
        let strong: Rc<Callback<A, R>> = Rc::new(Box::new(callback));
        self.slots.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            guard: Some(strong),
        }
    }

    /// Invoke every live callback in registration order, collecting results.
    pub fn notify(&self, arg: &A) -> Vec<R> {
        let snapshot: Vec<Weak<Callback<A, R>>> = {
            let mut slots = self.slots.borrow_mut();
            slots.retain(|slot| slot.strong_count() > 0);
            slots.clone()
        };
        // Upgrade lazily so a subscription dropped mid-walk is skipped.
        snapshot
            .iter()
            .filter_map(Weak::upgrade)
            .map(|callback| callback(arg))
            .collect()
    }
}

impl<A, R> Notifier<A, R> {
    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

/// RAII guard keeping a [`Notifier`] callback alive.
///
/// Type-erased so subscriptions to notifiers of different types can be held
/// together (see [`SubscriptionScope`](super::SubscriptionScope)).
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    guard: Option<Rc<dyn Any>>,
}

impl Subscription {
    /// A subscription that holds nothing, for controls that never report.
    pub fn detached() -> Self {
        Self { guard: None }
    }

    /// Whether this guard still keeps a callback alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Release the callback now rather than on drop.
    pub fn cancel(&mut self) {
        self.guard = None;
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn notifies_in_registration_order() {
        let notifier: Notifier<u32> = Notifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let l1 = Rc::clone(&log);
        let _s1 = notifier.subscribe(move |v| l1.borrow_mut().push(("first", *v)));
        let l2 = Rc::clone(&log);
        let _s2 = notifier.subscribe(move |v| l2.borrow_mut().push(("second", *v)));

        notifier.notify(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn collects_results() {
        let notifier: Notifier<i32, i32> = Notifier::new();
        let _a = notifier.subscribe(|v| v + 1);
        let _b = notifier.subscribe(|v| v * 10);
        assert_eq!(notifier.notify(&2), vec![3, 20]);
    }

    #[test]
    fn drop_unsubscribes() {
        let notifier: Notifier<()> = Notifier::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = notifier.subscribe(move |_| h.set(h.get() + 1));

        notifier.notify(&());
        drop(sub);
        notifier.notify(&());

        assert_eq!(hits.get(), 1);
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn cancel_releases_early() {
        let notifier: Notifier<()> = Notifier::new();
        let mut sub = notifier.subscribe(|_| {});
        assert!(sub.is_active());
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn subscribe_during_notify_is_safe() {
        let notifier: Notifier<()> = Notifier::new();
        let late = Rc::new(RefCell::new(Vec::new()));

        let n = notifier.clone();
        let store = Rc::clone(&late);
        let _s = notifier.subscribe(move |_| {
            store.borrow_mut().push(n.subscribe(|_| {}));
        });

        notifier.notify(&());
        assert_eq!(notifier.subscriber_count(), 2);
    }

    #[test]
    fn drop_during_notify_skips_later_callback() {
        let notifier: Notifier<()> = Notifier::new();
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let fired = Rc::new(Cell::new(false));

        let v = Rc::clone(&victim);
        let _killer = notifier.subscribe(move |_| {
            drop(v.borrow_mut().take());
        });
        let f = Rc::clone(&fired);
        *victim.borrow_mut() = Some(notifier.subscribe(move |_| f.set(true)));

        notifier.notify(&());
        assert!(!fired.get());
    }

    #[test]
    fn detached_subscription_is_inert() {
        let sub = Subscription::detached();
        assert!(!sub.is_active());
        assert_eq!(format!("{sub:?}"), "Subscription { active: false }");
    }
}
