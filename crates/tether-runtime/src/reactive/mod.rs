#![forbid(unsafe_code)]

//! Change-notification primitives used to wire controls to a session.
//!
//! - [`Notifier`]: an ordered list of weakly-held callbacks; controls use it
//!   to broadcast user edits.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`SubscriptionScope`]: owns all subscriptions of one bind cycle so
//!   `unbind` can disconnect every control in one step.
//!
//! # Architecture
//!
//! Everything here is single-threaded and uses `Rc<RefCell<..>>`. Callbacks
//! are stored as `Weak` pointers and pruned lazily during notification; the
//! only strong pointer lives in the `Subscription`.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    notification.
//! 3. A notifier may be subscribed to from inside its own callbacks.

pub mod scope;
pub mod subscription;

pub use scope::SubscriptionScope;
pub use subscription::{Notifier, Subscription};
