#![forbid(unsafe_code)]

//! Thread-local default session.
//!
//! Each thread lazily gets one [`BindingSession`] configured from the
//! environment ([`SessionConfig::from_env`]). The free functions here are
//! thin forwards to it; [`session`] hands out a clone for anything else.

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::{BindResult, ChangeEvent, Pattern, PatternMatch, Value};
use tether_runtime::{
    BindingSession, Control, ControlSet, IntoListenerResult, IntoVerdict, Node, RegistrationId,
    SessionConfig,
};

thread_local! {
    static DEFAULT_SESSION: RefCell<BindingSession> = RefCell::new(fresh());
}

fn fresh() -> BindingSession {
    BindingSession::with_config(ControlSet::new(), SessionConfig::from_env())
}

/// Handle to this thread's default session.
#[must_use]
pub fn session() -> BindingSession {
    DEFAULT_SESSION.with(|cell| cell.borrow().clone())
}

/// Replace this thread's default session with a fresh, unbound one.
///
/// The old session is unbound first if needed, and its controls are
/// forgotten.
pub fn reset() {
    let old = DEFAULT_SESSION.with(|cell| cell.replace(fresh()));
    if old.is_bound() {
        // The model is discarded along with the session.
        let _ = old.unbind();
    }
}

/// Register a control with the default session. Takes effect at the next
/// [`bind`].
pub fn attach(control: Rc<dyn Control>) {
    session().controls().add(control);
}

/// Forget a control. Takes effect at the next [`bind`].
pub fn detach(control: &Rc<dyn Control>) -> bool {
    session().controls().remove(control)
}

/// Bind `model` to the attached controls.
///
/// # Errors
///
/// See [`BindingSession::bind`].
pub fn bind(model: Value) -> BindResult<Node> {
    session().bind(model)
}

/// Release the default binding and return the model.
///
/// # Errors
///
/// See [`BindingSession::unbind`].
pub fn unbind() -> BindResult<Value> {
    session().unbind()
}

/// Listen for committed changes on the default session.
///
/// # Errors
///
/// See [`BindingSession::listen`].
pub fn listen<R: IntoListenerResult + 'static>(
    pattern: impl Into<Pattern>,
    callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> R + 'static,
) -> BindResult<RegistrationId> {
    session().listen(pattern, callback)
}

/// Validate changes on the default session.
///
/// # Errors
///
/// See [`BindingSession::validate`].
pub fn validate<V: IntoVerdict + 'static>(
    pattern: impl Into<Pattern>,
    callback: impl Fn(&ChangeEvent, Option<&PatternMatch>) -> V + 'static,
) -> BindResult<RegistrationId> {
    session().validate(pattern, callback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::{BindError, json};

    #[test]
    fn default_session_is_per_thread_and_resettable() {
        reset();
        bind(json!({ "a": 1 })).unwrap();
        assert!(session().is_bound());

        let other = std::thread::spawn(|| session().is_bound()).join().unwrap();
        assert!(!other);

        reset();
        assert!(!session().is_bound());
        assert_eq!(unbind().unwrap_err(), BindError::NotBound);
    }
}
