#![forbid(unsafe_code)]

//! Control discovery and bookkeeping.
//!
//! At bind time every control carrying the mapping attribute becomes a
//! [`ControlBinding`]. The binder keeps those bindings plus the
//! [`SubscriptionScope`] holding their user-edit subscriptions, and answers
//! "which controls display this path?" for the dispatch pipeline.
//!
//! The binder itself never calls into controls while borrowed; the session
//! collects push targets first and pushes afterwards.

use std::cell::Cell;
use std::rc::Rc;

use tether_core::{BindResult, ControlId, ControlKind, Path};

use crate::control::Control;
use crate::reactive::{Subscription, SubscriptionScope};

/// One discovered control and the path it displays.
#[derive(Clone)]
pub struct ControlBinding {
    pub id: ControlId,
    pub control: Rc<dyn Control>,
    pub path: Path,
    pub kind: ControlKind,
}

impl std::fmt::Debug for ControlBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlBinding")
            .field("id", &self.id)
            .field("path", &self.path.to_string())
            .field("kind", &self.kind)
            .finish()
    }
}

/// Which bindings a push after a change should reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    /// Bindings at exactly the changed path.
    Exact,
    /// Bindings at, above or below the changed path.
    Overlapping,
}

/// Bindings and subscriptions of the current bind cycle.
#[derive(Debug, Default)]
pub struct ControlBinder {
    bindings: Vec<ControlBinding>,
    scope: SubscriptionScope,
}

impl ControlBinder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `attribute` from each control and parse the declared paths.
    ///
    /// Controls without the attribute are skipped. Ids follow the order of
    /// `controls`.
    ///
    /// # Errors
    ///
    /// [`BindError::MalformedPath`](tether_core::BindError::MalformedPath)
    /// for the first unparseable declaration.
    pub fn discover(
        controls: &[Rc<dyn Control>],
        attribute: &str,
    ) -> BindResult<Vec<ControlBinding>> {
        let mut bindings = Vec::new();
        for control in controls {
            let Some(raw) = control.attribute(attribute) else {
                continue;
            };
            let path = Path::parse(&raw)?;
            bindings.push(ControlBinding {
                id: ControlId(bindings.len()),
                kind: control.kind(),
                control: Rc::clone(control),
                path,
            });
        }
        Ok(bindings)
    }

    /// Replace the current bindings. Existing subscriptions are released.
    pub fn install(&mut self, bindings: Vec<ControlBinding>) {
        self.scope.clear();
        self.bindings = bindings;
    }

    /// Keep a control subscription alive for this cycle.
    pub fn hold(&mut self, sub: Subscription) {
        self.scope.hold(sub);
    }

    #[must_use]
    pub fn bindings(&self) -> &[ControlBinding] {
        &self.bindings
    }

    /// Bindings a push for a change at `path` should reach.
    ///
    /// `skip` omits the originating control, but only at the exact path:
    /// it already shows what the user typed.
    pub fn targets<'a>(
        &'a self,
        path: &'a Path,
        reach: Reach,
        skip: Option<ControlId>,
    ) -> impl Iterator<Item = &'a ControlBinding> + 'a {
        self.bindings.iter().filter(move |binding| {
            let exact = binding.path == *path;
            let reached = match reach {
                Reach::Exact => exact,
                Reach::Overlapping => binding.path.overlaps(path),
            };
            reached && !(exact && skip == Some(binding.id))
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of live user-edit subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.scope.len()
    }

    /// Drop every binding and subscription.
    pub fn clear(&mut self) {
        self.scope.clear();
        self.bindings.clear();
    }
}

/// Increments a counter for its lifetime.
pub(crate) struct CountGuard<'a>(&'a Cell<usize>);

impl<'a> CountGuard<'a> {
    pub(crate) fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}
