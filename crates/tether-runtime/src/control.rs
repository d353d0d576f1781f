#![forbid(unsafe_code)]

//! The boundary to external controls.
//!
//! The engine never renders anything. It talks to controls through the
//! [`Control`] trait: read a declaration attribute once at bind time, push
//! values, and subscribe to user edits.
//!
//! # Contract
//!
//! 1. [`Control::attribute`] is read once per bind; the engine never changes
//!    it.
//! 2. [`Control::push`] is a programmatic update and must not report a user
//!    change back through the subscribed handler. Reports that arrive while a
//!    push is in progress are ignored.
//! 3. The handler given to [`Control::subscribe`] must be invoked once per
//!    user edit, synchronously. Dropping the returned [`Subscription`] must
//!    stop further invocations.

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{BindResult, ControlKind, ControlValue};

use crate::outcome::WriteOutcome;
use crate::reactive::Subscription;

/// Callback a control invokes when the user edits it.
///
/// The result reports what the engine did with the edit, including
/// path conflicts raised by the write.
pub type ChangeHandler = Rc<dyn Fn(ControlValue) -> BindResult<WriteOutcome>>;

/// An addressable external control.
pub trait Control {
    /// Coercion family of this control.
    fn kind(&self) -> ControlKind;

    /// Side-channel declaration lookup (e.g. `mapping`).
    fn attribute(&self, name: &str) -> Option<String>;

    /// Display `value`.
    fn push(&self, value: ControlValue);

    /// Observe user edits until the subscription is dropped.
    fn subscribe(&self, handler: ChangeHandler) -> Subscription;

    /// Short label for logs.
    fn describe(&self) -> String {
        self.kind().to_string()
    }
}

/// Shared, ordered collection of controls a session scans at bind time.
///
/// Cloning yields another handle to the same collection.
#[derive(Clone, Default)]
pub struct ControlSet {
    controls: Rc<RefCell<Vec<Rc<dyn Control>>>>,
}

impl ControlSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control. Takes effect at the next `bind`.
    pub fn add(&self, control: Rc<dyn Control>) {
        self.controls.borrow_mut().push(control);
    }

    /// Remove a control by identity. Takes effect at the next `bind`.
    pub fn remove(&self, control: &Rc<dyn Control>) -> bool {
        let mut controls = self.controls.borrow_mut();
        let before = controls.len();
        controls.retain(|c| !Rc::ptr_eq(c, control));
        controls.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.borrow().is_empty()
    }

    /// Current controls in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Rc<dyn Control>> {
        self.controls.borrow().clone()
    }
}

impl std::fmt::Debug for ControlSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlSet")
            .field("len", &self.len())
            .finish()
    }
}

impl FromIterator<Rc<dyn Control>> for ControlSet {
    fn from_iter<I: IntoIterator<Item = Rc<dyn Control>>>(iter: I) -> Self {
        let set = Self::new();
        for control in iter {
            set.add(control);
        }
        set
    }
}
