#![forbid(unsafe_code)]

//! Listener and validator registries.
//!
//! Both registries are the same [`Registry<F>`] holding `(matcher, callback)`
//! entries in registration order; they differ only in what a callback
//! returns and in how a dispatch pass treats the results.
//!
//! Dispatch happens on a [`Snapshot`] of the entries matching one path. The
//! session takes the snapshot, releases its borrow of the registry and only
//! then runs callbacks, so a callback may register or remove entries (or
//! write to the graph) without disturbing the pass in flight.
//!
//! # Failure Modes
//!
//! | Failure | Listener pass | Validator pass |
//! |---------|---------------|----------------|
//! | Callback panics | recorded, siblings still run | recorded, counts as veto, siblings still run |
//! | Callback returns `Err` | recorded, siblings still run | recorded, counts as veto, siblings still run |
//! | Validator returns `false` | n/a | veto, remaining validators skipped |

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use tether_core::{BindResult, ChangeEvent, Hit, Matcher, Pattern, PatternMatch};

/// Handle returned by `listen`/`validate`, usable to remove the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registration#{}", self.0)
    }
}

/// Type-erased listener callback.
pub type ListenerFn = dyn Fn(&ChangeEvent, Option<&PatternMatch>) -> Result<(), String>;

/// Type-erased validator callback.
pub type ValidatorFn = dyn Fn(&ChangeEvent, Option<&PatternMatch>) -> Result<bool, String>;

/// Return types accepted from listener closures.
pub trait IntoListenerResult {
    fn into_listener_result(self) -> Result<(), String>;
}

impl IntoListenerResult for () {
    fn into_listener_result(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: fmt::Display> IntoListenerResult for Result<(), E> {
    fn into_listener_result(self) -> Result<(), String> {
        self.map_err(|err| err.to_string())
    }
}

/// Return types accepted from validator closures.
pub trait IntoVerdict {
    fn into_verdict(self) -> Result<bool, String>;
}

impl IntoVerdict for bool {
    fn into_verdict(self) -> Result<bool, String> {
        Ok(self)
    }
}

impl<E: fmt::Display> IntoVerdict for Result<bool, E> {
    fn into_verdict(self) -> Result<bool, String> {
        self.map_err(|err| err.to_string())
    }
}

/// Which registry a failed callback belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackRole {
    Listener,
    Validator,
}

impl fmt::Display for CallbackRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Listener => "listener",
            Self::Validator => "validator",
        })
    }
}

/// A callback that panicked or returned an error during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    pub registration: RegistrationId,
    pub role: CallbackRole,
    /// Canonical path of the change being dispatched.
    pub path: String,
    pub message: String,
}

impl fmt::Display for CallbackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} failed on '{}': {}",
            self.role, self.registration, self.path, self.message
        )
    }
}

struct Entry<F: ?Sized> {
    id: RegistrationId,
    matcher: Matcher,
    callback: Rc<F>,
}

/// Ordered `(matcher, callback)` entries.
pub struct Registry<F: ?Sized> {
    entries: Vec<Entry<F>>,
}

/// Registry of change listeners.
pub type ListenerRegistry = Registry<ListenerFn>;

/// Registry of change validators.
pub type ValidatorRegistry = Registry<ValidatorFn>;

impl<F: ?Sized> Default for Registry<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: ?Sized> fmt::Debug for Registry<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|entry| format!("{} {}", entry.id, entry.matcher)),
            )
            .finish()
    }
}

impl<F: ?Sized> Registry<F> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern` and append an entry.
    ///
    /// # Errors
    ///
    /// Propagates [`Pattern::compile`] failures; nothing is registered then.
    pub fn register(
        &mut self,
        id: RegistrationId,
        pattern: Pattern,
        callback: Rc<F>,
    ) -> BindResult<RegistrationId> {
        let matcher = pattern.compile()?;
        self.entries.push(Entry {
            id,
            matcher,
            callback,
        });
        Ok(id)
    }

    /// Remove the entry registered as `id`.
    pub fn remove(&mut self, id: RegistrationId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching `path`, in registration order.
    #[must_use]
    pub fn snapshot(&self, path: &str) -> Snapshot<F> {
        let hits = self
            .entries
            .iter()
            .filter_map(|entry| {
                entry
                    .matcher
                    .test(path)
                    .map(|hit| (entry.id, Rc::clone(&entry.callback), hit))
            })
            .collect();
        Snapshot {
            path: path.to_owned(),
            hits,
        }
    }
}

impl ListenerRegistry {
    /// Register a listener closure.
    ///
    /// # Errors
    ///
    /// Pattern compilation errors.
    pub fn listen<R: IntoListenerResult + 'static>(
        &mut self,
        id: RegistrationId,
        pattern: impl Into<Pattern>,
        callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> R + 'static,
    ) -> BindResult<RegistrationId> {
        let erased: Rc<ListenerFn> =
            Rc::new(move |event: &ChangeEvent, caps: Option<&PatternMatch>| {
                callback(event, caps).into_listener_result()
            });
        self.register(id, pattern.into(), erased)
    }

    /// Notify every matching listener of `event`.
    pub fn notify(&self, event: &ChangeEvent) -> Vec<CallbackFailure> {
        self.snapshot(&event.mapping().to_string()).notify(event)
    }
}

impl ValidatorRegistry {
    /// Register a validator closure.
    ///
    /// # Errors
    ///
    /// Pattern compilation errors.
    pub fn validate<V: IntoVerdict + 'static>(
        &mut self,
        id: RegistrationId,
        pattern: impl Into<Pattern>,
        callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> V + 'static,
    ) -> BindResult<RegistrationId> {
        let erased: Rc<ValidatorFn> =
            Rc::new(move |event: &ChangeEvent, caps: Option<&PatternMatch>| {
                callback(event, caps).into_verdict()
            });
        self.register(id, pattern.into(), erased)
    }

    /// Consult every matching validator about `event`.
    pub fn check(&self, event: &ChangeEvent) -> Verdict {
        self.snapshot(&event.mapping().to_string()).check(event)
    }
}

/// Callbacks matching one path, detached from the registry.
pub struct Snapshot<F: ?Sized> {
    path: String,
    hits: Vec<(RegistrationId, Rc<F>, Hit)>,
}

impl<F: ?Sized> Snapshot<F> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    fn failure(&self, id: RegistrationId, role: CallbackRole, message: String) -> CallbackFailure {
        tracing::warn!(
            registration = id.0,
            role = %role,
            path = %self.path,
            %message,
            "callback failed"
        );
        CallbackFailure {
            registration: id,
            role,
            path: self.path.clone(),
            message,
        }
    }
}

impl Snapshot<ListenerFn> {
    /// Run every listener; a failing one never stops the rest.
    pub fn notify(&self, event: &ChangeEvent) -> Vec<CallbackFailure> {
        let mut failures = Vec::new();
        for (id, callback, hit) in &self.hits {
            let result = catch_unwind(AssertUnwindSafe(|| callback(event, hit.captures())));
            let message = match result {
                Ok(Ok(())) => continue,
                Ok(Err(message)) => message,
                Err(payload) => panic_message(payload.as_ref()),
            };
            failures.push(self.failure(*id, CallbackRole::Listener, message));
        }
        failures
    }
}

impl Snapshot<ValidatorFn> {
    /// Run validators in order.
    ///
    /// An explicit `false` stops the pass. A crash counts as a rejection but
    /// the remaining validators still run.
    pub fn check(&self, event: &ChangeEvent) -> Verdict {
        let mut verdict = Verdict {
            accepted: true,
            consulted: 0,
            failures: Vec::new(),
        };
        for (id, callback, hit) in &self.hits {
            verdict.consulted += 1;
            let result = catch_unwind(AssertUnwindSafe(|| callback(event, hit.captures())));
            let message = match result {
                Ok(Ok(true)) => continue,
                Ok(Ok(false)) => {
                    verdict.accepted = false;
                    break;
                }
                Ok(Err(message)) => message,
                Err(payload) => panic_message(payload.as_ref()),
            };
            verdict.accepted = false;
            verdict
                .failures
                .push(self.failure(*id, CallbackRole::Validator, message));
        }
        verdict
    }
}

/// Result of a validator pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub accepted: bool,
    /// How many validators ran before the pass ended.
    pub consulted: usize,
    pub failures: Vec<CallbackFailure>,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_owned()
    }
}
