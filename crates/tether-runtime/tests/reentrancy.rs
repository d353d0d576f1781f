#![forbid(unsafe_code)]

//! Integration tests: callbacks that write back into the session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tether_core::{BindError, json};
use tether_harness::{Form, single};
use tether_runtime::{BindingSession, SessionConfig, WriteStatus};

// ============================================================================
// Cascades
// ============================================================================

#[test]
fn listener_write_cascades_to_controls() {
    let form = Form::new();
    let level = form.text("level");
    let title = form.span("title");
    let session = form.session();
    let root = session.bind(json!({ "level": 1, "title": "Novice" })).unwrap();

    let r = root.clone();
    session
        .listen("level", move |event, _| {
            let level = event.new_value().as_i64().unwrap_or(0);
            let title = if level >= 10 { "Veteran" } else { "Novice" };
            r.set("title", title).map(|_| ())
        })
        .unwrap();

    let outcome = single(level.type_text("12")).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(title.value(), "Veteran");
    assert_eq!(
        session.snapshot().unwrap(),
        json!({ "level": 12, "title": "Veteran" })
    );
}

#[test]
fn validator_may_read_the_graph() {
    let session = Form::new().session();
    let root = session.bind(json!({ "min": 5, "value": 7 })).unwrap();
    let r = root.clone();
    session
        .validate("value", move |event, _| {
            let min = r.read("min").ok().flatten().and_then(|v| v.as_i64());
            let new = event.new_value().as_i64();
            matches!((min, new), (Some(min), Some(new)) if new >= min)
        })
        .unwrap();

    assert!(root.set("value", 3).unwrap().is_vetoed());
    assert!(root.set("value", 9).unwrap().is_committed());
}

#[test]
fn listener_registered_during_dispatch_sees_next_change() {
    let session = Form::new().session();
    let root = session.bind(json!({ "n": 0 })).unwrap();
    let late_calls = Rc::new(Cell::new(0));

    let (s, l, armed) = (session.clone(), late_calls.clone(), Rc::new(Cell::new(false)));
    session
        .listen("n", move |_, _| {
            if !armed.replace(true) {
                let l = l.clone();
                s.listen("n", move |_, _| l.set(l.get() + 1)).map(|_| ())
            } else {
                Ok(())
            }
        })
        .unwrap();

    root.set("n", 1).unwrap();
    assert_eq!(late_calls.get(), 0);
    root.set("n", 2).unwrap();
    assert_eq!(late_calls.get(), 1);
}

// ============================================================================
// Recursion limit
// ============================================================================

fn self_incrementing(config: SessionConfig) -> (BindingSession, Rc<RefCell<Vec<BindError>>>) {
    let session = Form::new().session_with(config);
    let root = session.bind(json!({ "counter": 0 })).unwrap();
    let errors = Rc::new(RefCell::new(Vec::new()));
    let (r, e) = (root.clone(), errors.clone());
    session
        .listen("counter", move |event, _| {
            let next = event.new_value().as_i64().unwrap_or(0) + 1;
            if let Err(err) = r.set("counter", next) {
                e.borrow_mut().push(err);
            }
        })
        .unwrap();
    root.set("counter", 1).unwrap();
    (session, errors)
}

#[test]
fn runaway_listener_stops_at_default_depth() {
    let (session, errors) = self_incrementing(SessionConfig::default());
    assert_eq!(session.snapshot().unwrap(), json!({ "counter": 32 }));
    assert_eq!(*errors.borrow(), vec![BindError::RecursionLimit { depth: 33 }]);
}

#[test]
fn runaway_listener_stops_at_configured_depth() {
    let (session, errors) = self_incrementing(SessionConfig::new().with_max_dispatch_depth(3));
    assert_eq!(session.snapshot().unwrap(), json!({ "counter": 3 }));
    assert_eq!(*errors.borrow(), vec![BindError::RecursionLimit { depth: 4 }]);
}

#[test]
fn depth_resets_after_a_failed_cascade() {
    let (session, _errors) = self_incrementing(SessionConfig::new().with_max_dispatch_depth(2));
    let root = session.root().unwrap();
    // Top-level writes start from depth one again.
    assert_eq!(root.set("other", 1).unwrap().status, WriteStatus::Committed);
}

// ============================================================================
// Lifecycle changes from callbacks
// ============================================================================

#[test]
fn unbind_from_listener() {
    let form = Form::new();
    let name = form.text("name");
    let session = form.session();
    let root = session.bind(json!({ "name": "Dave" })).unwrap();

    let returned = Rc::new(RefCell::new(None));
    let (s, out) = (session.clone(), returned.clone());
    session
        .listen("name", move |_, _| {
            *out.borrow_mut() = s.unbind().ok();
        })
        .unwrap();

    let outcome = single(name.type_text("Steve")).unwrap();
    assert!(outcome.is_committed());
    assert_eq!(*returned.borrow(), Some(json!({ "name": "Steve" })));
    assert!(!session.is_bound());
    assert!(!name.is_subscribed());
    assert_eq!(root.set("name", "Bob").unwrap_err(), BindError::NotBound);
}

#[test]
fn unbind_from_validator_aborts_the_write() {
    let session = Form::new().session();
    let root = session.bind(json!({ "name": "Dave" })).unwrap();
    let returned = Rc::new(RefCell::new(None));
    let (s, out) = (session.clone(), returned.clone());
    session
        .validate("name", move |_, _| {
            *out.borrow_mut() = s.unbind().ok();
            true
        })
        .unwrap();

    assert_eq!(root.set("name", "Bob").unwrap_err(), BindError::NotBound);
    assert_eq!(*returned.borrow(), Some(json!({ "name": "Dave" })));
}
