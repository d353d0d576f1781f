#![forbid(unsafe_code)]

//! Stateful side of Tether.
//!
//! A [`BindingSession`] binds one `serde_json::Value` model to a
//! [`ControlSet`]. Writes through [`Node`] handles or from user edits on
//! controls run a single pipeline: validators, commit, listeners, then
//! control sync.
//!
//! # Example
//!
//! ```
//! use tether_runtime::{BindingSession, WriteStatus};
//! use tether_core::json;
//!
//! let session = BindingSession::default();
//! let root = session.bind(json!({ "level": 1 })).unwrap();
//! session
//!     .validate("level", |event, _| event.new_value().as_i64().is_some_and(|l| l <= 20))
//!     .unwrap();
//!
//! assert_eq!(root.set("level", 99).unwrap().status, WriteStatus::Vetoed);
//! assert_eq!(root.set("level", 2).unwrap().status, WriteStatus::Committed);
//! assert_eq!(session.unbind().unwrap(), json!({ "level": 2 }));
//! ```

pub mod binder;
pub mod config;
pub mod control;
pub mod node;
pub mod outcome;
pub mod reactive;
pub mod registry;
pub mod session;

#[cfg(test)]
mod test_support;

pub use binder::{ControlBinder, ControlBinding, Reach};
pub use config::SessionConfig;
pub use control::{ChangeHandler, Control, ControlSet};
pub use node::Node;
pub use outcome::{WriteOutcome, WriteStatus};
pub use reactive::{Notifier, Subscription, SubscriptionScope};
pub use registry::{
    CallbackFailure, CallbackRole, IntoListenerResult, IntoVerdict, ListenerRegistry,
    RegistrationId, ValidatorRegistry, Verdict,
};
pub use session::{BindingSession, SessionState};
