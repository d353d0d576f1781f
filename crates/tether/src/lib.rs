#![forbid(unsafe_code)]

//! Tether: two-way binding between a `serde_json::Value` model and UI
//! controls.
//!
//! Controls declare the model path they display through a `mapping`
//! attribute. Binding a model pushes its values to every declared control;
//! after that, user edits flow into the model and model writes (through
//! [`Node`] handles) flow back out, with validators able to veto and
//! listeners notified of every committed change.
//!
//! Most programs hold an explicit [`BindingSession`]. For the common case of
//! one binding per thread, the free functions in this crate ([`attach`],
//! [`bind`], [`listen`], [`validate`], [`unbind`]) drive a thread-local
//! default session.
//!
//! ```
//! use tether::prelude::*;
//!
//! let session = BindingSession::default();
//! let root = session.bind(json!({ "name": "Dave" })).unwrap();
//! session.listen("name", |event, _| {
//!     assert_eq!(event.new_value(), &json!("Bob"));
//! }).unwrap();
//! root.set("name", "Bob").unwrap();
//! ```

mod global;
pub mod prelude;

pub use global::{attach, bind, detach, listen, reset, session, unbind, validate};

pub use tether_core::{
    BindError, BindResult, ChangeEvent, ChangeOrigin, ControlId, ControlKind, ControlValue, Hit,
    Matcher, Path, Pattern, PatternMatch, Segment, Value, json,
};
pub use tether_runtime::{
    BindingSession, CallbackFailure, CallbackRole, ChangeHandler, Control, ControlSet, Node,
    RegistrationId, SessionConfig, SessionState, Subscription, WriteOutcome, WriteStatus,
};

pub use tether_core::{resolve, value};

#[cfg(feature = "harness")]
pub use tether_harness as harness;
