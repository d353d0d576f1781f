#![forbid(unsafe_code)]

//! Lifetime grouping for control subscriptions.
//!
//! A [`SubscriptionScope`] owns every [`Subscription`] created while wiring a
//! bound session to its controls. Clearing or dropping the scope disconnects
//! all of them at once, which is exactly what `unbind` needs.
//!
//! # Invariants
//!
//! 1. Subscriptions are released in reverse registration order.
//! 2. After `clear()` or drop, no callback held by this scope fires again.
//! 3. `clear()` leaves the scope reusable for the next bind cycle.

use super::subscription::Subscription;

/// Collects subscriptions for one bind cycle.
#[derive(Default)]
pub struct SubscriptionScope {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionScope {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Keep `sub` alive until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every subscription now. The scope stays usable.
    pub fn clear(&mut self) {
        while let Some(sub) = self.subscriptions.pop() {
            drop(sub);
        }
    }
}

impl Drop for SubscriptionScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for SubscriptionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionScope")
            .field("subscription_count", &self.subscriptions.len())
            .finish()
    }
}
